// src/config.rs
//! Fetch settings, layered: defaults < TOML file at `$RSS_READER_CONFIG` <
//! `RSS_READER_*` env vars < CLI flags.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "RSS_READER_CONFIG";
pub const ENV_TIMEOUT_SECS: &str = "RSS_READER_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "RSS_READER_USER_AGENT";
pub const ENV_MAX_BODY_BYTES: &str = "RSS_READER_MAX_BODY_BYTES";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

fn default_user_agent() -> String {
    format!("rss-reader/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Upper bound for the whole request, connect through body.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    max_body_bytes: Option<usize>,
}

impl FetchConfig {
    /// Defaults overlaid with the TOML file at `path`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let file: FileConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(Self::default().merge_file(file))
    }

    /// Resolve file + environment layers from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`FetchConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(ENV_CONFIG_PATH) {
            Some(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    );
                }
                Self::load_from_file(&pb)?
            }
            None => Self::default(),
        };

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            cfg.timeout_secs = parse_env_num(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_USER_AGENT) {
            let ua = raw.trim();
            if !ua.is_empty() {
                cfg.user_agent = ua.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_MAX_BODY_BYTES) {
            cfg.max_body_bytes = parse_env_num(ENV_MAX_BODY_BYTES, &raw)?;
        }
        Ok(cfg)
    }

    /// Apply CLI flags on top.
    pub fn with_overrides(mut self, timeout_secs: Option<u64>, user_agent: Option<String>) -> Self {
        if let Some(t) = timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(ua) = user_agent {
            self.user_agent = ua;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout must be at least 1 second");
        }
        if self.max_body_bytes == 0 {
            bail!("max body size must be positive");
        }
        if self.user_agent.trim().is_empty() {
            bail!("user agent must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn merge_file(mut self, file: FileConfig) -> Self {
        if let Some(t) = file.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(ua) = file.user_agent {
            self.user_agent = ua;
        }
        if let Some(m) = file.max_body_bytes {
            self.max_body_bytes = m;
        }
        self
    }
}

fn parse_env_num<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("{name} must be a non-negative integer, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = FetchConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, FetchConfig::default());
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.user_agent.starts_with("rss-reader/"));
    }

    #[test]
    fn env_overrides_file_and_cli_overrides_env() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("rss_reader.toml");
        fs::write(&p, "timeout_secs = 5\nuser_agent = \"from-file\"\n").unwrap();
        let path = p.display().to_string();

        let cfg = FetchConfig::from_lookup(lookup_from(&[
            (ENV_CONFIG_PATH, path.as_str()),
            (ENV_TIMEOUT_SECS, " 7 "),
        ]))
        .unwrap();
        assert_eq!(cfg.timeout_secs, 7);
        assert_eq!(cfg.user_agent, "from-file");
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);

        let cfg = cfg.with_overrides(Some(9), None);
        assert_eq!(cfg.timeout_secs, 9);
        assert_eq!(cfg.user_agent, "from-file");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(FetchConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());
        assert!(
            FetchConfig::from_lookup(lookup_from(&[(ENV_CONFIG_PATH, "/definitely/missing.toml")]))
                .is_err()
        );
        let zero = FetchConfig::default().with_overrides(Some(0), None);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn unknown_keys_in_file_fail() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.toml");
        fs::write(&p, "timeout = 5\n").unwrap();
        assert!(FetchConfig::load_from_file(&p).is_err());
    }
}
