//! Codec configuration.
//!
//! Configuration is resolved once at process startup and passed into [`crate::UeidCodec::new`].
//! The library never reads environment variables itself; binaries read them and hand the raw
//! values to the helpers here.

use crate::constants::DEFAULT_MAX_ATTEMPTS;
use crate::{UeidError, UeidResult};

/// Codec configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UeidConfig {
    salt: String,
    max_attempts: u32,
}

impl UeidConfig {
    /// Create a new `UeidConfig`.
    ///
    /// `salt` is mixed into every generation attempt. It may be empty, but deployments should
    /// set one so that identifiers from different environments do not line up.
    pub fn new(salt: String, max_attempts: u32) -> UeidResult<Self> {
        if max_attempts == 0 {
            return Err(UeidError::InvalidArgument(
                "max_attempts must be at least 1".into(),
            ));
        }

        Ok(Self { salt, max_attempts })
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for UeidConfig {
    fn default() -> Self {
        Self {
            salt: String::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Parse the attempt cap from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_ATTEMPTS`].
pub fn max_attempts_from_env_value(value: Option<String>) -> UeidResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_MAX_ATTEMPTS);
    };

    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(UeidError::InvalidArgument(format!(
            "max attempts must be a positive integer, got: '{}'",
            value
        ))),
        Ok(n) => Ok(n),
    }
}
