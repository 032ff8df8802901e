//! Delegate clients: condition validation and reward disbursement over HTTP.

mod config;
mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use config::{ConfigError, DelegateConfig};
pub use http::{HttpConditionValidator, HttpRewardDisburser};
pub use reward_types::{ConditionValidator, DelegateError, RewardDisburser};

#[cfg(feature = "test-util")]
pub use mock::{MockConditionValidator, MockRewardDisburser, MockReply};
