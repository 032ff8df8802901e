//! Service configuration from the environment.

use reward_delegate::{ConfigError, DelegateConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN: &str = "0.0.0.0:8002";
const DEFAULT_MOCK_LISTEN: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen: SocketAddr,
    pub delegates: DelegateConfig,
    /// SQLite file for events and claim logs; in-memory stores when unset.
    pub sqlite_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen = parse_addr(lookup("REWARD_LISTEN"), "REWARD_LISTEN", DEFAULT_LISTEN)?;
        let delegates = DelegateConfig::from_lookup(&lookup)?;
        let sqlite_path = lookup("REWARD_SQLITE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            listen,
            delegates,
            sqlite_path,
        })
    }
}

/// Listen address of the mock platform binary (`MOCK_PLATFORM_LISTEN`).
pub fn mock_platform_listen() -> Result<SocketAddr, ConfigError> {
    parse_addr(
        std::env::var("MOCK_PLATFORM_LISTEN").ok(),
        "MOCK_PLATFORM_LISTEN",
        DEFAULT_MOCK_LISTEN,
    )
}

fn parse_addr(
    raw: Option<String>,
    key: &'static str,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    raw.unwrap_or_else(|| default.to_string())
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cfg = ServiceConfig::from_lookup(|k| match k {
            "EVENT_VALIDATION_URL" => Some("http://localhost:3000/validate-event-condition/success".to_string()),
            "EVENT_REWARD_URL" => Some("http://localhost:3000/provide-event-reward/success".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:8002".parse::<SocketAddr>().unwrap());
        assert!(cfg.sqlite_path.is_none());
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        let err = ServiceConfig::from_lookup(|k| match k {
            "REWARD_LISTEN" => Some("nowhere".to_string()),
            "EVENT_VALIDATION_URL" | "EVENT_REWARD_URL" => Some("http://x".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REWARD_LISTEN", .. }));
    }

    #[test]
    fn missing_delegate_url_fails() {
        let err = ServiceConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::Missing("EVENT_VALIDATION_URL"));
    }
}
