//! Scripted delegates for tests: fixed reply, call counting, no network.
//! A poisoned call record panics instead of reading as empty.

use reward_types::{
    ConditionValidator, DelegateError, DisbursementResponse, RewardDisburser, ValidationResponse,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a mock delegate answers on every call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// `isValid = true` / `success = true`.
    Yes,
    /// `isValid = false` / `success = false`.
    No,
    Fail(DelegateError),
}

struct Script {
    reply: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, serde_json::Value)>>,
}

impl Script {
    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    async fn call(&self, user_id: &str, payload: &serde_json::Value) -> Result<bool, DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("mock call record poisoned")
            .push((user_id.to_string(), payload.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            MockReply::Yes => Ok(true),
            MockReply::No => Ok(false),
            MockReply::Fail(e) => Err(e.clone()),
        }
    }

    fn seen(&self) -> Vec<(String, serde_json::Value)> {
        self.seen.lock().expect("mock call record poisoned").clone()
    }
}

/// Mock condition validator.
pub struct MockConditionValidator {
    script: Script,
}

impl MockConditionValidator {
    pub fn new(reply: MockReply) -> Self {
        Self {
            script: Script::new(reply),
        }
    }

    pub fn valid() -> Self {
        Self::new(MockReply::Yes)
    }

    pub fn invalid() -> Self {
        Self::new(MockReply::No)
    }

    pub fn failing(err: DelegateError) -> Self {
        Self::new(MockReply::Fail(err))
    }

    /// Sleep before answering (lets tests overlap concurrent claims).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    /// `(user_id, condition)` pairs received, in call order.
    pub fn seen(&self) -> Vec<(String, serde_json::Value)> {
        self.script.seen()
    }
}

#[async_trait::async_trait]
impl ConditionValidator for MockConditionValidator {
    async fn validate(
        &self,
        user_id: &str,
        condition: &serde_json::Value,
    ) -> Result<ValidationResponse, DelegateError> {
        let is_valid = self.script.call(user_id, condition).await?;
        Ok(ValidationResponse { is_valid })
    }
}

/// Mock reward disburser.
pub struct MockRewardDisburser {
    script: Script,
}

impl MockRewardDisburser {
    pub fn new(reply: MockReply) -> Self {
        Self {
            script: Script::new(reply),
        }
    }

    pub fn granting() -> Self {
        Self::new(MockReply::Yes)
    }

    pub fn refusing() -> Self {
        Self::new(MockReply::No)
    }

    pub fn failing(err: DelegateError) -> Self {
        Self::new(MockReply::Fail(err))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    /// `(user_id, reward)` pairs received, in call order.
    pub fn seen(&self) -> Vec<(String, serde_json::Value)> {
        self.script.seen()
    }
}

#[async_trait::async_trait]
impl RewardDisburser for MockRewardDisburser {
    async fn disburse(
        &self,
        user_id: &str,
        reward: &serde_json::Value,
    ) -> Result<DisbursementResponse, DelegateError> {
        let success = self.script.call(user_id, reward).await?;
        Ok(DisbursementResponse { success })
    }
}
