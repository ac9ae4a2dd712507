use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Engine settings, loadable from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chain_id: u64,
    /// Base URL of the credential-bearing aggregator proxy.
    pub gateway_url: String,
    /// Name of an environment variable holding a bearer key, for deployments
    /// that talk to the aggregator directly from a server.
    pub api_key_env: Option<String>,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub confirmation_timeout_ms: u64,
    pub confirmation_poll_ms: u64,
    /// Slippage tolerance in percent.
    pub slippage: f64,
    /// Fractional digits shown for quoted amounts.
    pub display_precision: u8,
    pub default_source_symbol: Option<String>,
    pub default_dest_symbol: Option<String>,
    pub explorer_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_id: 8453,
            gateway_url: "http://localhost:3000/api/1inch".to_string(),
            api_key_env: None,
            debounce_ms: 500,
            request_timeout_ms: 10_000,
            confirmation_timeout_ms: 180_000,
            confirmation_poll_ms: 2_000,
            slippage: 1.0,
            display_precision: 5,
            default_source_symbol: Some("ETH".to_string()),
            default_dest_symbol: Some("USDC".to_string()),
            explorer_url: "https://base.blockscout.com".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce_ms must be positive".to_string()));
        }
        if self.request_timeout_ms == 0 || self.confirmation_timeout_ms == 0 {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        if self.confirmation_poll_ms == 0 {
            return Err(Error::Config(
                "confirmation_poll_ms must be positive".to_string(),
            ));
        }
        if !(self.slippage > 0.0 && self.slippage <= 50.0) {
            return Err(Error::Config(format!(
                "slippage must be in (0, 50], got {}",
                self.slippage
            )));
        }
        if self.display_precision > 36 {
            return Err(Error::Config(format!(
                "display_precision must be at most 36, got {}",
                self.display_precision
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn confirmation_poll(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms)
    }

    /// Block explorer page for a transaction hash.
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{hash}", self.explorer_url.trim_end_matches('/'))
    }

    /// Bearer key read from `api_key_env`, if configured and set.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        std::env::var(var).ok().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.chain_id, 8453);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            debounce_ms = 250
            slippage = 0.5
            default_dest_symbol = "DAI"
            "#,
        )
        .unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.slippage, 0.5);
        assert_eq!(config.default_dest_symbol.as_deref(), Some("DAI"));
        assert_eq!(config.display_precision, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("slippage = 0.0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("debounce_ms = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("display_precision = 40"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("chain_id = \"base\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explorer_tx_url() {
        let mut config = EngineConfig::default();
        assert_eq!(
            config.explorer_tx_url("0xabc"),
            "https://base.blockscout.com/tx/0xabc"
        );
        config.explorer_url = "https://basescan.org/".to_string();
        assert_eq!(config.explorer_tx_url("0xabc"), "https://basescan.org/tx/0xabc");
    }
}
