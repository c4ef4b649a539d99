// Runtime configuration. Values come from the process environment, with
// `.env` in the working directory and `~/.pexels.env` as fallbacks. Only
// this module reads the environment; the API client receives plain values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const API_KEY_VAR: &str = "PEXELS_API_KEY";
pub const API_URL_VAR: &str = "PEXELS_API_URL";
pub const TIMEOUT_VAR: &str = "PEXELS_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "https://api.pexels.com/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    /// Caller-imposed deadline for the search request.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load `.env` files (existing variables win) and read the config from
    /// the environment.
    pub fn load() -> Result<Self> {
        load_env_files()?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("{} is not set (add it to .env or the environment)", API_KEY_VAR))?;

        let base_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let timeout = match lookup(TIMEOUT_VAR).map(|v| v.trim().to_string()) {
            Some(raw) if !raw.is_empty() => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw))?;
                if secs == 0 {
                    bail!("{} must be greater than zero", TIMEOUT_VAR);
                }
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Config {
            api_key,
            base_url,
            timeout,
        })
    }
}

/// Per-user fallback file in the home directory.
fn home_env_file() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(".pexels.env"))
}

fn load_env_files() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("Failed to read .env"),
    }

    if let Some(path) = home_env_file().filter(|p| p.is_file()) {
        dotenvy::from_path(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        log::debug!("loaded {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn key_only_uses_defaults() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, " abc123 ")])).unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn missing_or_blank_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));

        assert!(Config::from_lookup(lookup(&[(API_KEY_VAR, "  ")])).is_err());
    }

    #[test]
    fn overrides_url_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "k"),
            (API_URL_VAR, "http://localhost:9000/v1"),
            (TIMEOUT_VAR, "15"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_timeout() {
        assert!(Config::from_lookup(lookup(&[(API_KEY_VAR, "k"), (TIMEOUT_VAR, "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[(API_KEY_VAR, "k"), (TIMEOUT_VAR, "0")])).is_err());
    }
}
