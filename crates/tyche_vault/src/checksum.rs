//! # Integrity Checksum
//!
//! Salted rolling-hash checksum over the plaintext, independent of the
//! codec.
//!
//! ## Format
//!
//! ```text
//! [8 chars: rolling hash, lowercase hex]
//! [4 chars: salt, last four decimal digits of the write time]
//! ```
//!
//! The salt is NOT mixed into the hash input. It exists only so that two
//! saves of identical plaintext at different times differ in their
//! stored bytes, which defeats naive diffing of the record; verification
//! ignores it entirely. This is intentional obfuscation, not a bug, and
//! deliberately not upgraded to a real MAC: the server re-validates
//! everything, and this layer only needs to catch casual edits.

/// Hex characters in the hash portion.
const HASH_WIDTH: usize = 8;

/// Decimal digits in the salt portion.
const SALT_WIDTH: usize = 4;

/// 32-bit rolling hash over the plaintext bytes.
///
/// The classic `h = h * 31 + byte` accumulator, written in its
/// shift-and-subtract form with wrapping arithmetic.
#[allow(clippy::cast_sign_loss)]
fn rolling_hash(plaintext: &str) -> u32 {
    let mut hash: i32 = 0;
    for &byte in plaintext.as_bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(byte));
    }
    hash as u32
}

/// Computes the checksum string for a plaintext written at `written_at`
/// (epoch milliseconds).
#[must_use]
pub fn checksum(plaintext: &str, written_at: u64) -> String {
    format!("{:08x}{:04}", rolling_hash(plaintext), written_at % 10_000)
}

/// Verifies a plaintext against a stored checksum string.
///
/// Splits off the salt, recomputes the hash over `plaintext`, and
/// compares numerically (no allocation beyond the accumulator). Returns
/// `false` for any malformed stored string - wrong length, non-ASCII,
/// non-hex hash, non-digit salt - and never panics.
#[must_use]
pub fn verify(plaintext: &str, stored: &str) -> bool {
    if !stored.is_ascii() || stored.len() != HASH_WIDTH + SALT_WIDTH {
        return false;
    }
    let (hash_part, salt_part) = stored.split_at(HASH_WIDTH);
    if !salt_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if !hash_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    match u32::from_str_radix(hash_part, 16) {
        Ok(stored_hash) => stored_hash == rolling_hash(plaintext),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_verifies_own_plaintext() {
        let sum = checksum("{\"balance\":100}", 1_700_000_123_456);
        assert_eq!(sum.len(), HASH_WIDTH + SALT_WIDTH);
        assert!(verify("{\"balance\":100}", &sum));
    }

    #[test]
    fn test_different_plaintext_fails() {
        let sum = checksum("{\"balance\":100}", 1_700_000_123_456);
        assert!(!verify("{\"balance\":101}", &sum));
    }

    #[test]
    fn test_salt_varies_with_write_time_but_not_verification() {
        let a = checksum("same", 1111);
        let b = checksum("same", 2222);
        // Same hash, different salt - and both verify.
        assert_ne!(a, b);
        assert_eq!(a[..HASH_WIDTH], b[..HASH_WIDTH]);
        assert!(verify("same", &a));
        assert!(verify("same", &b));
    }

    #[test]
    fn test_salt_is_zero_padded() {
        let sum = checksum("x", 1_000_007);
        assert!(sum.ends_with("0007"));
    }

    #[test]
    fn test_malformed_checksums_fail_closed() {
        for stored in [
            "",
            "short",
            "0123456789abcdef0000",   // too long
            "zzzzzzzz1234",           // non-hex hash
            "01234567abcd",           // non-digit salt
            "0123456\u{00e9}123",     // 12 bytes, non-ascii, would split mid-char
        ] {
            assert!(!verify("anything", stored), "accepted {stored:?}");
        }
    }

    #[test]
    fn test_hash_flip_is_detected() {
        let sum = checksum("payload", 42);
        let mut tampered = sum.clone().into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(!verify("payload", &tampered));
    }
}
