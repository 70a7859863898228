use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub listen_addr: SocketAddr,
    pub cookie_secret: String,
    pub cookie_secure: bool,
    pub backend_timeout: Duration,
    pub invite_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let raw_url = first_var(&["SUPABASE_URL", "PUBLIC_SUPABASE_URL"])
            .ok_or_else(|| AppError::Config("SUPABASE_URL is not set".into()))?;
        let supabase_url = Url::parse(&raw_url)
            .map_err(|err| AppError::Config(format!("invalid SUPABASE_URL: {err}")))?;

        let supabase_anon_key = first_var(&["SUPABASE_ANON_KEY", "PUBLIC_SUPABASE_ANON_KEY"])
            .ok_or_else(|| AppError::Config("SUPABASE_ANON_KEY is not set".into()))?;

        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-wayfarer-development-cookie-secret".to_string());

        let cookie_secure = parse_var("COOKIE_SECURE", false)?;
        let backend_timeout = Duration::from_secs(parse_var("BACKEND_TIMEOUT_SECS", 10)?);
        let invite_delay = Duration::from_millis(parse_var("INVITE_DELAY_MS", 1000)?);

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            listen_addr,
            cookie_secret,
            cookie_secure,
            backend_timeout,
            invite_delay,
        })
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {name}: {err}"))),
        Err(_) => Ok(default),
    }
}
