//! Validator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lifetime of an unconsumed challenge.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Default bound on a single profile retrieval.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for [`TokenOwnershipValidator`](crate::TokenOwnershipValidator).
///
/// Serialized with durations as whole seconds:
///
/// ```toml
/// token_ttl_secs = 1800
/// fetch_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// How long an issued secret stays valid in the store.
    #[serde(rename = "token_ttl_secs", with = "secs")]
    pub token_ttl: Duration,
    /// Upper bound on one profile fetch, including the body read.
    #[serde(rename = "fetch_timeout_secs", with = "secs")]
    pub fetch_timeout: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
