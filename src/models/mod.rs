pub mod invitation;
pub mod recommendation;
pub mod trip;
pub mod user;
