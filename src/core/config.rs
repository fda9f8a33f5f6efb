use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:1234/v1/";
pub const DEFAULT_API_KEY: &str = "EMPTY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60 * 10;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    /// Maximum number of non-system turns kept in a transcript. `None`
    /// keeps everything.
    pub max_turns: Option<NonZeroUsize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_base_url =
            env::var("LMCHAT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_key = env::var("LMCHAT_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
        let timeout_secs = parse_env::<u64>("LMCHAT_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_turns = parse_env::<NonZeroUsize>("LMCHAT_MAX_TURNS");

        Self {
            api_base_url,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
            max_turns,
        }
    }
}

/// Reads a numeric env var. Unparseable values are logged and
/// treated as unset.
fn parse_env<T: FromStr>(var: &str) -> Option<T> {
    let value = env::var(var).ok()?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}, using the default", value, var);
            None
        }
    }
}
