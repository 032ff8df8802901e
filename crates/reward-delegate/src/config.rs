//! Delegate endpoints and timeout, read once at startup.

use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Where the two delegates live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateConfig {
    pub validation_url: String,
    pub reward_url: String,
    /// Applied per request; a timeout is treated like any transport failure.
    pub timeout: Duration,
}

impl DelegateConfig {
    pub fn new(validation_url: impl Into<String>, reward_url: impl Into<String>) -> Self {
        Self {
            validation_url: validation_url.into(),
            reward_url: reward_url.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `EVENT_VALIDATION_URL` and `EVENT_REWARD_URL` are required; `DELEGATE_TIMEOUT_MS` is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let validation_url = required(&lookup, "EVENT_VALIDATION_URL")?;
        let reward_url = required(&lookup, "EVENT_REWARD_URL")?;
        let timeout = match lookup("DELEGATE_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    key: "DELEGATE_TIMEOUT_MS",
                    reason: format!("{}", e),
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "DELEGATE_TIMEOUT_MS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };
        Ok(Self {
            validation_url,
            reward_url,
            timeout,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}
