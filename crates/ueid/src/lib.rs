//! Unique Entity Identifiers (UEIDs).
//!
//! Every account and other long-lived entity is given a UEID at creation time. UEIDs are read
//! out over the phone, copied from printed payslips and typed into search boxes, so the format
//! is built for people first:
//!
//! - A fixed `VS` prefix and three dash-separated groups of four: `VS-WERC-8GMR-ZGEW`
//! - A 32-symbol Crockford alphabet (`0-9` and `A-Z` without `I`, `L`, `O`, `U`)
//! - A Luhn mod 32 check character that catches every single-character typo
//!
//! This crate provides:
//! - [`Ueid`], a wrapper type that *guarantees* canonical, checksum-valid form once constructed.
//! - [`normalize`] and [`validate`] for user-typed candidates (case, spaces, stray dashes and
//!   `I`/`L`/`O` look-alikes are repaired before validation).
//! - [`UeidCodec`], which encodes high-entropy input and generates new identifiers with a
//!   caller-supplied collision check.
//!
//! ## Canonical UEID form
//! - Length: 17
//! - Layout: `VS-` followed by 12 data characters in groups of four
//! - Data: 11 payload characters derived from a SHA-256 digest, then 1 check character
//!
//! ## Uniqueness
//! The codec does not know which identifiers are already taken. Callers pass a collision
//! check backed by their system of record to
//! [`UeidCodec::generate_with_collision_avoidance`]; generation retries a bounded number of
//! times and fails loudly with [`UeidError::ExhaustedRetries`] rather than looping forever.

mod alphabet;
mod checksum;
mod codec;
mod config;
mod constants;
mod generator;

// Re-export public types
pub use alphabet::{remap_ambiguous, ALPHABET};
pub use checksum::checksum;
pub use codec::{normalize, validate, Ueid, UeidCodec, ValidationError, ValidationOutcome};
pub use config::{max_attempts_from_env_value, UeidConfig};
pub use constants::{DEFAULT_MAX_ATTEMPTS, PAYLOAD_LEN, UEID_LEN, UEID_PREFIX};
pub use generator::{EntropySource, UuidEntropy};

/// Error type for UEID operations.
#[derive(Debug, thiserror::Error)]
pub enum UeidError {
    /// A caller broke the contract of an internal operation (for example, a checksum payload of
    /// the wrong length).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Every generation attempt collided with an existing identifier.
    #[error("no free UEID after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
    /// The codec could not be set up.
    #[error("codec configuration error: {0}")]
    Configuration(String),
}

/// Result type for UEID operations.
pub type UeidResult<T> = Result<T, UeidError>;

/// Error returned by collision-avoiding generation.
///
/// Failures of the caller's collision check are passed through untouched in
/// [`GenerateError::CollisionCheck`] so the caller can match on its own error type.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError<E> {
    #[error(transparent)]
    Ueid(#[from] UeidError),
    #[error("collision check failed: {0}")]
    CollisionCheck(#[source] E),
}
