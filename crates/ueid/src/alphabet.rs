//! The 32-symbol Crockford alphabet used for UEID data characters.

/// Crockford base-32 symbols, in index order.
///
/// `I`, `L` and `O` are left out because they are easily confused with `1` and `0`; `U` is left
/// out so the alphabet has exactly 32 symbols.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const INVALID: u8 = u8::MAX;

/// Reverse lookup from ASCII byte to alphabet index.
const INDEX: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Returns the alphabet index (0-31) of `symbol`, or `None` if it is not an alphabet symbol.
///
/// Only uppercase symbols are accepted; callers normalise first.
pub(crate) fn index_of(symbol: u8) -> Option<u8> {
    match INDEX.get(symbol as usize) {
        Some(&index) if index != INVALID => Some(index),
        _ => None,
    }
}

/// Returns the symbol for `index`, wrapping indices above 31.
pub(crate) fn symbol(index: u8) -> u8 {
    ALPHABET[(index % 32) as usize]
}

pub(crate) fn is_symbol(byte: u8) -> bool {
    index_of(byte).is_some()
}

/// Maps the look-alike letters `I`, `L` and `O` onto the digits they are mistaken for.
///
/// Expects uppercase input; any other character is returned unchanged.
pub fn remap_ambiguous(c: char) -> char {
    match c {
        'I' | 'L' => '1',
        'O' => '0',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_32_distinct_symbols() {
        let mut seen = std::collections::HashSet::new();
        for &b in ALPHABET.iter() {
            assert!(seen.insert(b), "duplicate symbol {}", b as char);
        }
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_letters() {
        for excluded in [b'I', b'L', b'O', b'U'] {
            assert!(!is_symbol(excluded));
        }
    }

    #[test]
    fn test_index_of_round_trips_with_symbol() {
        for index in 0..32u8 {
            assert_eq!(index_of(symbol(index)), Some(index));
        }
    }

    #[test]
    fn test_index_of_rejects_lowercase_and_non_ascii() {
        assert_eq!(index_of(b'a'), None);
        assert_eq!(index_of(b'-'), None);
        assert_eq!(index_of(0xC3), None);
    }

    #[test]
    fn test_remap_ambiguous() {
        assert_eq!(remap_ambiguous('I'), '1');
        assert_eq!(remap_ambiguous('L'), '1');
        assert_eq!(remap_ambiguous('O'), '0');
        assert_eq!(remap_ambiguous('V'), 'V');
        assert_eq!(remap_ambiguous('S'), 'S');
        assert_eq!(remap_ambiguous('i'), 'i');
    }
}
