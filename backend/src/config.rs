//! Runtime configuration.
//!
//! Defaults are overridden by environment variables (a `.env` file is loaded
//! at start-up), which are in turn overridden by CLI flags.

use std::path::PathBuf;

use crate::api::logs::log_warning;

/// Source dataset location.
pub const DEFAULT_DATA_PATH: &str = "data/raw/supply_chain_data.csv";

/// HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Built dashboard assets.
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

pub const ENV_DATA_PATH: &str = "SUPPLY_CHAIN_DATA";
pub const ENV_PORT: &str = "PORT";
pub const ENV_STATIC_DIR: &str = "DASHBOARD_STATIC_DIR";

/// Resolved settings for the CLI and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. An unparsable port keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_PATH).filter(|v| !v.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR).filter(|v| !v.trim().is_empty()) {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(p) => config.port = p,
                Err(_) => log_warning(format!(
                    "Ignoring {}='{}': not a valid port, using {}",
                    ENV_PORT, port, DEFAULT_PORT
                )),
            }
        }

        config
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.data_path = p;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.port = p;
        }
        self
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.static_dir = d;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_path, PathBuf::from("data/raw/supply_chain_data.csv"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SUPPLY_CHAIN_DATA", "/tmp/data.csv"),
            ("PORT", "8080"),
            ("DASHBOARD_STATIC_DIR", "web"),
        ]));
        assert_eq!(config.data_path, PathBuf::from("/tmp/data.csv"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("web"));
    }

    #[test]
    fn test_bad_port_keeps_default() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_cli_flags_win() {
        let config = Config::from_lookup(lookup(&[("PORT", "8080")]))
            .with_port(Some(9000))
            .with_data_path(None);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}
