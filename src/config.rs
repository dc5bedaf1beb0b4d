//! Runtime configuration, loaded from environment variables at startup.
//!
//! `main` loads a `.env` file first, so every variable below may also live there.

use std::time::Duration;

use crate::connector::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_RELAY_URL};

/// Every field has a default so the binary works without any variables set;
/// without `OPENROUTER_API_KEY` the relay answers with a misconfiguration notice.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream credential (`OPENROUTER_API_KEY`). Empty counts as absent.
    pub openrouter_api_key: Option<String>,

    /// Upstream base URL (`OPENROUTER_BASE_URL`, default `https://openrouter.ai`).
    pub openrouter_base_url: String,

    /// Upstream model id (`OPENROUTER_MODEL`, default `gpt-4o-mini`).
    pub openrouter_model: String,

    /// Upstream request timeout in seconds (`OPENROUTER_TIMEOUT_SECS`, default 60, 0 = none).
    pub upstream_timeout_secs: u64,

    /// Relay listening port (`PORT`, default 8080).
    pub port: u16,

    /// Relay the chat client talks to (`SWASTHYA_RELAY_URL`).
    pub relay_url: String,

    /// Directory holding `swasthya.duckdb` (`SWASTHYA_DATA_DIR`, default `~/.swasthya`).
    pub data_dir: String,

    /// `tracing` filter string (`SWASTHYA_LOG`, default `info`).
    pub log_level: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Self {
            openrouter_api_key: lookup("OPENROUTER_API_KEY")
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            openrouter_base_url: var_or("OPENROUTER_BASE_URL", DEFAULT_BASE_URL),
            openrouter_model: var_or("OPENROUTER_MODEL", DEFAULT_MODEL),
            upstream_timeout_secs: parse_or(lookup("OPENROUTER_TIMEOUT_SECS"), 60),
            port: parse_or(lookup("PORT"), 8080),
            relay_url: var_or("SWASTHYA_RELAY_URL", DEFAULT_RELAY_URL),
            data_dir: var_or("SWASTHYA_DATA_DIR", "~/.swasthya"),
            log_level: var_or("SWASTHYA_LOG", "info"),
        }
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout_secs > 0).then(|| Duration::from_secs(self.upstream_timeout_secs))
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Expands a leading `~` to `$HOME`.
pub fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = config_from(&[]);
        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.openrouter_base_url, "https://openrouter.ai");
        assert_eq!(config.openrouter_model, "gpt-4o-mini");
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENROUTER_API_KEY", "   ")]);
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn invalid_numbers_fall_back_and_zero_timeout_disables() {
        let config = config_from(&[("PORT", "not-a-port"), ("OPENROUTER_TIMEOUT_SECS", "0")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout(), None);
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/var/lib/swasthya"), "/var/lib/swasthya");
    }
}
