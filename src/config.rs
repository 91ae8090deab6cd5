use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SCROLL_DURATION: u32 = 30;
pub const DEFAULT_ALERT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_ANIMATION_MS: u64 = 2000;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        base_url: get_env_or_default("SEARCHBOT_BASE_URL", DEFAULT_BASE_URL),
        default_scroll_duration: parse_env_or(
            "SEARCHBOT_DEFAULT_SCROLL_DURATION",
            DEFAULT_SCROLL_DURATION,
        ),
        alert_timeout_ms: parse_env_or("SEARCHBOT_ALERT_TIMEOUT_MS", DEFAULT_ALERT_TIMEOUT_MS),
        animation_ms: parse_env_or("SEARCHBOT_ANIMATION_MS", DEFAULT_ANIMATION_MS),
        request_timeout_secs: parse_env("SEARCHBOT_REQUEST_TIMEOUT_SECS"),
    }
});

pub struct Config {
    pub base_url: String,
    pub default_scroll_duration: u32,
    pub alert_timeout_ms: u64,
    pub animation_ms: u64,
    /// `None` keeps requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring unparsable value for {key}: {raw:?}");
            None
        }
    }
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_env(key).unwrap_or(default)
}
