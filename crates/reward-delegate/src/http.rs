//! HTTP clients for the two delegates (POST JSON, parse JSON).

use crate::DelegateConfig;
use reward_types::{
    ConditionValidator, DelegateError, DisbursementRequest, DisbursementResponse, RewardDisburser,
    ValidationRequest, ValidationResponse,
};
use serde::{de::DeserializeOwned, Serialize};

fn send_error(e: reqwest::Error) -> DelegateError {
    if e.is_timeout() {
        DelegateError::Timeout
    } else {
        DelegateError::Transport(e.to_string())
    }
}

fn build_client(config: &DelegateConfig) -> Result<reqwest::Client, DelegateError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| DelegateError::Transport(e.to_string()))
}

async fn post_json<B, R>(client: &reqwest::Client, url: &str, body: &B) -> Result<R, DelegateError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let res = client.post(url).json(body).send().await.map_err(send_error)?;
    let status = res.status();
    let text = res.text().await.map_err(send_error)?;
    if !status.is_success() {
        return Err(DelegateError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|e| DelegateError::Malformed(e.to_string()))
}

/// Calls the validation endpoint: `{ userId, condition }` -> `{ isValid }`.
pub struct HttpConditionValidator {
    client: reqwest::Client,
    url: String,
}

impl HttpConditionValidator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &DelegateConfig) -> Result<Self, DelegateError> {
        Ok(Self::new(build_client(config)?, config.validation_url.clone()))
    }
}

#[async_trait::async_trait]
impl ConditionValidator for HttpConditionValidator {
    async fn validate(
        &self,
        user_id: &str,
        condition: &serde_json::Value,
    ) -> Result<ValidationResponse, DelegateError> {
        let body = ValidationRequest { user_id, condition };
        let res = post_json(&self.client, &self.url, &body).await;
        if let Err(ref e) = res {
            tracing::warn!(url = %self.url, user_id, error = %e, "validation request failed");
        }
        res
    }
}

/// Calls the disbursement endpoint: `{ userId, reward }` -> `{ success }`.
pub struct HttpRewardDisburser {
    client: reqwest::Client,
    url: String,
}

impl HttpRewardDisburser {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &DelegateConfig) -> Result<Self, DelegateError> {
        Ok(Self::new(build_client(config)?, config.reward_url.clone()))
    }
}

#[async_trait::async_trait]
impl RewardDisburser for HttpRewardDisburser {
    async fn disburse(
        &self,
        user_id: &str,
        reward: &serde_json::Value,
    ) -> Result<DisbursementResponse, DelegateError> {
        let body = DisbursementRequest { user_id, reward };
        let res = post_json(&self.client, &self.url, &body).await;
        if let Err(ref e) = res {
            tracing::warn!(url = %self.url, user_id, error = %e, "disbursement request failed");
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Nothing listens on the discard port.
        let config = DelegateConfig::new("http://127.0.0.1:9/validate", "http://127.0.0.1:9/reward")
            .with_timeout(std::time::Duration::from_secs(2));
        let validator = HttpConditionValidator::from_config(&config).unwrap();
        let err = validator
            .validate("u1", &serde_json::json!({ "level": 10 }))
            .await
            .unwrap_err();
        assert!(matches!(err, DelegateError::Transport(_) | DelegateError::Timeout));
    }
}
