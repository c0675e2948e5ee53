//! The lowercase input alphabet.
//!
//! Every input byte must lie in `a`–`z`. Histogram slots are indexed by
//! `byte - b'a'`, so validation happens once at the entry point, before any
//! worker is spawned.

use crate::{PzError, PzResult};

/// Number of letters in the alphabet (`a`–`z`).
pub const ALPHABET_LEN: usize = 26;

/// Map a letter to its histogram slot, or `None` if it is outside `a`–`z`.
#[inline]
pub fn letter_index(byte: u8) -> Option<usize> {
    if byte.is_ascii_lowercase() {
        Some((byte - b'a') as usize)
    } else {
        None
    }
}

/// Inverse of [`letter_index`].
#[inline]
pub fn letter_at(index: usize) -> Option<u8> {
    if index < ALPHABET_LEN {
        Some(b'a' + index as u8)
    } else {
        None
    }
}

/// Check that every byte of `input` is a lowercase ASCII letter.
///
/// Reports the first offending position.
pub fn validate(input: &[u8]) -> PzResult<()> {
    match input.iter().position(|&b| letter_index(b).is_none()) {
        Some(position) => Err(PzError::InvalidSymbol {
            position,
            byte: input[position],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_index_bounds() {
        assert_eq!(letter_index(b'a'), Some(0));
        assert_eq!(letter_index(b'z'), Some(25));
        assert_eq!(letter_index(b'A'), None);
        assert_eq!(letter_index(b'{'), None);
        assert_eq!(letter_index(b'`'), None);
    }

    #[test]
    fn test_letter_at_inverse() {
        for i in 0..ALPHABET_LEN {
            assert_eq!(letter_index(letter_at(i).unwrap()), Some(i));
        }
        assert_eq!(letter_at(ALPHABET_LEN), None);
    }

    #[test]
    fn test_validate_accepts_lowercase() {
        assert!(validate(b"").is_ok());
        assert!(validate(b"abcdefghijklmnopqrstuvwxyz").is_ok());
    }

    #[test]
    fn test_validate_reports_first_bad_byte() {
        let result = validate(b"abc1d2");
        assert_eq!(
            result,
            Err(PzError::InvalidSymbol {
                position: 3,
                byte: b'1'
            })
        );
    }

    #[test]
    fn test_validate_rejects_newline() {
        // Files read from disk commonly end with a newline.
        let result = validate(b"aaab\n");
        assert!(matches!(
            result,
            Err(PzError::InvalidSymbol { position: 4, byte: b'\n' })
        ));
    }
}
