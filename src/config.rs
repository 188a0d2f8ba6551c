use std::env;
use std::time::Duration;

/// Published export of the vocabulary sheet, fetched through a CORS proxy.
pub const DEFAULT_VOCAB_URL: &str = "https://corsproxy.io/?https://docs.google.com/spreadsheets/d/1YziLEaFBhDvaWCUfNgLkJSlyLo_bzNNaPSp7w52nhTc/export?format=csv";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from the environment (and `.env` if present).
/// The bot token itself is picked up by `Bot::from_env` from `TELOXIDE_TOKEN`.
#[derive(Debug, Clone)]
pub struct Config {
    pub vocab_url: String,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_values(env::var("VOCAB_URL").ok(), env::var("FETCH_TIMEOUT_SECS").ok())
    }

    fn from_values(vocab_url: Option<String>, fetch_timeout_secs: Option<String>) -> Self {
        let vocab_url = vocab_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VOCAB_URL.to_string());

        let fetch_timeout = fetch_timeout_secs
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        Self {
            vocab_url,
            fetch_timeout: Duration::from_secs(fetch_timeout),
        }
    }
}
