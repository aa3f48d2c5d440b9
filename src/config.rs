// ⚙️ Configuration
//
// Defaults, then an optional JSON file (SAVINGS_CONFIG), then env overrides
// (SAVINGS_DB, SAVINGS_ADDR).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SAVINGS_CONFIG";
pub const DB_ENV: &str = "SAVINGS_DB";
pub const ADDR_ENV: &str = "SAVINGS_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Shown in front of amounts
    #[serde(default = "default_currency")]
    pub currency: String,

    /// REST server bind address
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("savings.db")
}

fn default_currency() -> String {
    "₱".to_string()
}

fn default_server_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: default_db_path(),
            currency: default_currency(),
            server_addr: default_server_addr(),
        }
    }
}

impl Config {
    /// Load from JSON file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Resolve the effective configuration from the process environment
    pub fn load() -> Result<Self> {
        let base = match env::var_os(CONFIG_ENV) {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        Ok(base.with_overrides(env::var(DB_ENV).ok(), env::var(ADDR_ENV).ok()))
    }

    pub fn with_overrides(mut self, db_path: Option<String>, server_addr: Option<String>) -> Self {
        if let Some(db) = db_path.filter(|s| !s.trim().is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(addr) = server_addr.filter(|s| !s.trim().is_empty()) {
            self.server_addr = addr;
        }
        self
    }

    /// "₱1,250"-style display of a whole amount
    pub fn money(&self, amount: u64) -> String {
        format!("{}{}", self.currency, group_thousands(amount))
    }

    /// Two decimals for fund balances
    pub fn money_f64(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency, amount)
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("savings.db"));
        assert_eq!(config.server_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = env::temp_dir().join(format!("savings-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{ "currency": "$" }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.currency, "$");
        assert_eq!(config.db_path, default_db_path());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::from_file("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("/tmp/x.db".to_string()), Some(" ".to_string()));
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.server_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_money_formatting() {
        let config = Config::default();
        assert_eq!(config.money(0), "₱0");
        assert_eq!(config.money(1250), "₱1,250");
        assert_eq!(config.money(1234567), "₱1,234,567");
        assert_eq!(config.money_f64(40.909), "₱40.91");
    }
}
