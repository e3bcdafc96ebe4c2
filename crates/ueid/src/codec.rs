//! Encoding, normalisation and validation of UEIDs.
//!
//! [`UeidCodec::encode`] is the only way new identifiers come into existence; [`normalize`],
//! [`validate`] and [`Ueid::parse`] deal with identifiers typed in by people.

use crate::alphabet::{self, remap_ambiguous};
use crate::checksum::check_index;
use crate::config::UeidConfig;
use crate::constants::{DATA_LEN, GROUP_LEN, PAYLOAD_LEN, UEID_LEN, UEID_PREFIX};
use crate::generator::{EntropySource, UuidEntropy};
use crate::{UeidError, UeidResult};
use data_encoding::{Encoding, Specification};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::{fmt, str::FromStr};

/// SHA-256 output size in bytes.
const DIGEST_LEN: usize = 32;

// The digest must always cover the payload, so it is never truncated below 11 symbols.
const _: () = assert!(DIGEST_LEN * 8 / 5 >= PAYLOAD_LEN);

/// A canonical, checksum-valid UEID (`VS-XXXX-XXXX-XXXX`).
///
/// This wrapper type guarantees that once constructed, the identifier is in canonical form and
/// its check character matches its payload.
///
/// # Construction
/// - [`UeidCodec::encode`] and the generation methods produce new identifiers.
/// - [`Ueid::parse`] (or [`FromStr`]) validates user-supplied input, repairing case, spacing
///   and look-alike characters on the way.
///
/// # Display format
/// Always the 17-character canonical form, for example `VS-WERC-8GMR-ZGEW`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ueid(String);

impl Ueid {
    /// Normalises and validates `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadFormat`] if `input` cannot be coerced into
    /// `VS-XXXX-XXXX-XXXX`, and [`ValidationError::BadChecksum`] if it can but the check
    /// character does not match.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = normalize(input).ok_or(ValidationError::BadFormat)?;
        if !has_valid_check(&normalized) {
            return Err(ValidationError::BadChecksum);
        }
        Ok(Self(normalized))
    }

    /// Builds a UEID from 12 data symbols that are already known to be valid.
    fn from_data(data: &str) -> Self {
        Self(format_canonical(data))
    }

    /// Returns the canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 12 data characters without prefix or dashes.
    pub fn data(&self) -> String {
        self.0[UEID_PREFIX.len()..]
            .chars()
            .filter(|&c| c != '-')
            .collect()
    }

    /// Returns the 11 payload characters.
    pub fn payload(&self) -> String {
        let mut data = self.data();
        data.truncate(PAYLOAD_LEN);
        data
    }

    /// Returns the check character.
    pub fn check_char(&self) -> char {
        // The canonical form always ends with the check character.
        self.0.chars().last().unwrap_or('0')
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Ueid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ueid {
    type Err = ValidationError;

    /// Equivalent to [`Ueid::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ueid::parse(s)
    }
}

impl AsRef<str> for Ueid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Ueid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Ueid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ueid::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Why a candidate UEID was rejected.
///
/// These are expected outcomes for user-entered data, not faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ValidationError {
    /// The input could not be coerced into `VS` plus 12 alphabet characters.
    #[error("bad format")]
    #[cfg_attr(feature = "serde", serde(rename = "bad format"))]
    BadFormat,
    /// The input is well formed but its check character is wrong.
    #[error("bad checksum")]
    #[cfg_attr(feature = "serde", serde(rename = "bad checksum"))]
    BadChecksum,
}

impl ValidationError {
    /// Short machine-friendly reason, `"bad format"` or `"bad checksum"`.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::BadFormat => "bad format",
            ValidationError::BadChecksum => "bad checksum",
        }
    }
}

/// Result of [`validate`].
///
/// `normalized` is present whenever the input could be normalised, including on a checksum
/// mismatch, so a UI can show the user what was understood.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationOutcome {
    pub valid: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub normalized: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<ValidationError>,
}

/// Repairs transcription noise in a candidate UEID and returns its canonical form.
///
/// Whitespace and dashes are dropped, letters are uppercased and `I`/`L`/`O` are read as
/// `1`/`1`/`0`. The result must then be `VS` followed by exactly 12 alphabet characters.
///
/// The check character is *not* verified; use [`validate`] for that.
pub fn normalize(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .filter(|&c| !c.is_whitespace() && c != '-')
        .map(|c| remap_ambiguous(c.to_ascii_uppercase()))
        .collect();

    let data = cleaned.strip_prefix(UEID_PREFIX)?;
    if data.len() != DATA_LEN || !data.bytes().all(alphabet::is_symbol) {
        return None;
    }

    Some(format_canonical(data))
}

/// Normalises `input` and verifies its check character.
pub fn validate(input: &str) -> ValidationOutcome {
    let Some(normalized) = normalize(input) else {
        return ValidationOutcome {
            valid: false,
            normalized: None,
            error: Some(ValidationError::BadFormat),
        };
    };

    if has_valid_check(&normalized) {
        ValidationOutcome {
            valid: true,
            normalized: Some(normalized),
            error: None,
        }
    } else {
        ValidationOutcome {
            valid: false,
            normalized: Some(normalized),
            error: Some(ValidationError::BadChecksum),
        }
    }
}

/// Formats 12 data characters as `VS-XXXX-XXXX-XXXX`.
fn format_canonical(data: &str) -> String {
    let mut out = String::with_capacity(UEID_LEN);
    out.push_str(UEID_PREFIX);
    for (i, c) in data.chars().enumerate() {
        if i % GROUP_LEN == 0 {
            out.push('-');
        }
        out.push(c);
    }
    out
}

/// Recomputes the check character of a normalised UEID and compares it with the supplied one.
fn has_valid_check(normalized: &str) -> bool {
    let indices: Vec<u8> = normalized[UEID_PREFIX.len()..]
        .bytes()
        .filter_map(alphabet::index_of)
        .collect();

    match indices.split_last() {
        Some((&check, payload)) if payload.len() == PAYLOAD_LEN => check_index(payload) == check,
        _ => false,
    }
}

/// Encoder and generator for new UEIDs.
///
/// Construct once at startup from a [`UeidConfig`] and share freely; the codec holds no
/// mutable state and is `Send + Sync`.
#[derive(Clone)]
pub struct UeidCodec {
    pub(crate) config: UeidConfig,
    base32: Encoding,
    pub(crate) entropy: Arc<dyn EntropySource>,
}

impl fmt::Debug for UeidCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UeidCodec")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UeidCodec {
    /// Creates a codec drawing randomness from UUID v4.
    ///
    /// # Errors
    ///
    /// Returns [`UeidError::Configuration`] if the base-32 encoding cannot be built.
    pub fn new(config: UeidConfig) -> UeidResult<Self> {
        let mut spec = Specification::new();
        spec.symbols.extend(alphabet::ALPHABET.iter().map(|&b| char::from(b)));
        let base32 = spec
            .encoding()
            .map_err(|e| UeidError::Configuration(format!("base-32 encoding: {}", e)))?;

        Ok(Self {
            config,
            base32,
            entropy: Arc::new(UuidEntropy),
        })
    }

    /// Replaces the entropy source used by generation.
    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Arc::new(entropy);
        self
    }

    pub fn config(&self) -> &UeidConfig {
        &self.config
    }

    /// Encodes `source` into a UEID.
    ///
    /// The source is hashed with SHA-256, the digest is written out in Crockford base-32 and
    /// its first 11 symbols become the payload, followed by the check character. The result
    /// is a pure function of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`UeidError::Configuration`] only if the base-32 encoding produced output the
    /// checksum cannot read, which means the codec was built wrongly.
    pub fn encode(&self, source: &[u8]) -> UeidResult<Ueid> {
        let digest = Sha256::digest(source);
        let symbols = self.base32.encode(&digest);

        let payload = symbols.get(..PAYLOAD_LEN).ok_or_else(|| {
            UeidError::Configuration(format!(
                "digest encoded to {} symbols, need {}",
                symbols.len(),
                PAYLOAD_LEN
            ))
        })?;

        let indices = payload
            .bytes()
            .map(|b| {
                alphabet::index_of(b).ok_or_else(|| {
                    UeidError::Configuration(format!(
                        "base-32 output '{}' is outside the UEID alphabet",
                        payload
                    ))
                })
            })
            .collect::<UeidResult<Vec<u8>>>()?;

        let mut data = String::with_capacity(DATA_LEN);
        data.push_str(payload);
        data.push(char::from(alphabet::symbol(check_index(&indices))));

        Ok(Ueid::from_data(&data))
    }
}
