//! Generation of new UEIDs with bounded collision avoidance.
//!
//! Each attempt hashes `salt ‖ entropy ‖ context ‖ attempt` through [`UeidCodec::encode`] and
//! asks the caller whether the candidate is already taken. The codec never stores identifiers
//! itself; uniqueness comes entirely from the caller's check.

use crate::codec::{Ueid, UeidCodec};
use crate::constants::ENTROPY_LEN;
use crate::{GenerateError, UeidError, UeidResult};
use std::convert::Infallible;
use std::future::Future;
use uuid::Uuid;

/// Source of fresh random bytes for each generation attempt.
pub trait EntropySource: Send + Sync {
    fn fill(&self) -> [u8; ENTROPY_LEN];
}

/// Draws entropy from random (version 4) UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidEntropy;

impl EntropySource for UuidEntropy {
    fn fill(&self) -> [u8; ENTROPY_LEN] {
        Uuid::new_v4().into_bytes()
    }
}

impl UeidCodec {
    /// Generates a UEID for `context` without a collision check.
    ///
    /// Suitable when the storage layer enforces uniqueness on insert and reports conflicts
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns [`UeidError::InvalidArgument`] if `context` is blank.
    pub fn generate(&self, context: &str) -> UeidResult<Ueid> {
        self.generate_with_collision_avoidance(context, |_| Ok::<bool, Infallible>(false))
            .map_err(|e| match e {
                GenerateError::Ueid(e) => e,
                GenerateError::CollisionCheck(never) => match never {},
            })
    }

    /// Generates a UEID for `context` that `is_taken` reports as free.
    ///
    /// `context` identifies the entity the identifier is for (for example an account id).
    /// `is_taken` is called once per candidate, in order, and should look the candidate up in
    /// the system of record. Candidates are retried with an incrementing attempt counter until
    /// one is free or [`crate::UeidConfig::max_attempts`] is reached.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::Ueid`] with [`UeidError::InvalidArgument`] if `context` is blank.
    /// - [`GenerateError::Ueid`] with [`UeidError::ExhaustedRetries`] if every attempt collided.
    /// - [`GenerateError::CollisionCheck`] with the check's own error, unchanged, if `is_taken`
    ///   fails. The failed attempt is not retried.
    pub fn generate_with_collision_avoidance<F, E>(
        &self,
        context: &str,
        mut is_taken: F,
    ) -> Result<Ueid, GenerateError<E>>
    where
        F: FnMut(&Ueid) -> Result<bool, E>,
    {
        let context = checked_context(context)?;

        for attempt in 0..self.config.max_attempts() {
            let candidate = self.candidate(context, attempt)?;
            tracing::debug!(context, attempt, candidate = %candidate, "checking UEID candidate");

            if !is_taken(&candidate).map_err(GenerateError::CollisionCheck)? {
                return Ok(candidate);
            }
            tracing::warn!(context, attempt, candidate = %candidate, "UEID candidate already taken");
        }

        Err(self.exhausted(context).into())
    }

    /// Asynchronous form of [`UeidCodec::generate_with_collision_avoidance`].
    ///
    /// Only `is_taken` is awaited; candidates are computed synchronously. Each candidate is
    /// fully built before it is handed to the check.
    pub async fn generate_with_collision_avoidance_async<F, Fut, E>(
        &self,
        context: &str,
        mut is_taken: F,
    ) -> Result<Ueid, GenerateError<E>>
    where
        F: FnMut(Ueid) -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let context = checked_context(context)?;

        for attempt in 0..self.config.max_attempts() {
            let candidate = self.candidate(context, attempt)?;
            tracing::debug!(context, attempt, candidate = %candidate, "checking UEID candidate");

            if !is_taken(candidate.clone())
                .await
                .map_err(GenerateError::CollisionCheck)?
            {
                return Ok(candidate);
            }
            tracing::warn!(context, attempt, candidate = %candidate, "UEID candidate already taken");
        }

        Err(self.exhausted(context).into())
    }

    /// Builds the candidate for one attempt.
    fn candidate(&self, context: &str, attempt: u32) -> UeidResult<Ueid> {
        let salt = self.config.salt().as_bytes();
        let entropy = self.entropy.fill();

        let mut source = Vec::with_capacity(salt.len() + ENTROPY_LEN + context.len() + 4);
        source.extend_from_slice(salt);
        source.extend_from_slice(&entropy);
        source.extend_from_slice(context.as_bytes());
        source.extend_from_slice(&attempt.to_be_bytes());

        self.encode(&source)
    }

    fn exhausted(&self, context: &str) -> UeidError {
        let attempts = self.config.max_attempts();
        tracing::error!(
            context,
            attempts,
            "every UEID candidate collided; check the collision lookup and entropy source"
        );
        UeidError::ExhaustedRetries { attempts }
    }
}

fn checked_context(context: &str) -> UeidResult<&str> {
    let trimmed = context.trim();
    if trimmed.is_empty() {
        return Err(UeidError::InvalidArgument(
            "generation context cannot be empty".into(),
        ));
    }
    Ok(trimmed)
}
