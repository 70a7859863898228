pub mod backend;
pub mod flags;
pub mod invites;
pub mod packing;
pub mod suggestions;
pub mod supabase;
pub mod trips;
