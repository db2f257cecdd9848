use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Endpoints probed when `CHATBOT_PROBE_URLS` is not set.
pub const DEFAULT_PROBE_URLS: &[&str] = &["https://api.github.com/", "https://discord.com/api"];

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connectivity probe configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub urls: Vec<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_PROBE_URLS.iter().map(|url| url.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let urls = match lookup("CHATBOT_PROBE_URLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.urls,
        };

        let timeout = match lookup("CHATBOT_PROBE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("CHATBOT_PROBE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            urls,
            timeout,
            user_agent: lookup("CHATBOT_PROBE_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

fn default_user_agent() -> String {
    format!("chatbot-errors/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("chatbot-errors/"));
    }

    #[test]
    fn test_overrides() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("CHATBOT_PROBE_URLS", " http://a.test/ , ,http://b.test/"),
            ("CHATBOT_PROBE_TIMEOUT_SECS", "3"),
            ("CHATBOT_PROBE_USER_AGENT", "probe-test"),
        ]))
        .unwrap();

        assert_eq!(config.urls, vec!["http://a.test/", "http://b.test/"]);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "probe-test");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ProbeConfig::from_lookup(lookup_from(&[("CHATBOT_PROBE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CHATBOT_PROBE_TIMEOUT_SECS"));
    }
}
