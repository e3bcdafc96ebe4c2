//! Constants describing the UEID format.

/// Literal prefix carried by every UEID.
pub const UEID_PREFIX: &str = "VS";

/// Number of payload characters taken from the digest.
pub const PAYLOAD_LEN: usize = 11;

/// Number of data characters after the prefix (payload plus check character).
pub const DATA_LEN: usize = PAYLOAD_LEN + 1;

/// Data characters per dash-separated group.
pub const GROUP_LEN: usize = 4;

/// Length of the canonical string, `VS-XXXX-XXXX-XXXX`.
pub const UEID_LEN: usize = UEID_PREFIX.len() + DATA_LEN + DATA_LEN / GROUP_LEN;

/// Generation attempts allowed before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Bytes drawn from the entropy source for each generation attempt.
pub const ENTROPY_LEN: usize = 16;
