//! Luhn mod 32 check character.
//!
//! Works like the Luhn algorithm on card numbers, generalised to base 32: walking from the
//! rightmost symbol, every second symbol is doubled and folded back into `0..32` by adding its
//! base-32 digits. Doubling-with-fold is a permutation of `0..32`, so every single-symbol
//! substitution changes the sum and is detected.
//!
//! Verification is "recompute and compare"; there is no separate verify routine.

use crate::alphabet;
use crate::constants::PAYLOAD_LEN;
use crate::{UeidError, UeidResult};

/// Computes the check character for an 11-character payload.
///
/// # Errors
///
/// Returns [`UeidError::InvalidArgument`] if `payload` is not exactly 11 characters long or
/// contains a character outside [`crate::ALPHABET`] (lowercase included).
pub fn checksum(payload: &str) -> UeidResult<char> {
    let len = payload.chars().count();
    if len != PAYLOAD_LEN {
        return Err(UeidError::InvalidArgument(format!(
            "checksum payload must be {} characters, got {}: '{}'",
            PAYLOAD_LEN, len, payload
        )));
    }

    let indices = payload
        .bytes()
        .map(|b| {
            alphabet::index_of(b).ok_or_else(|| {
                UeidError::InvalidArgument(format!(
                    "checksum payload contains a character outside the alphabet: '{}'",
                    payload
                ))
            })
        })
        .collect::<UeidResult<Vec<u8>>>()?;

    Ok(alphabet::symbol(check_index(&indices)) as char)
}

/// Luhn mod 32 over alphabet indices; returns the index of the check symbol.
pub(crate) fn check_index(indices: &[u8]) -> u8 {
    let mut sum: u32 = 0;
    let mut double = false;

    for &index in indices.iter().rev() {
        let mut value = u32::from(index);
        if double {
            value *= 2;
            if value >= 32 {
                value = value / 32 + value % 32;
            }
        }
        sum += value;
        double = !double;
    }

    ((32 - sum % 32) % 32) as u8
}
