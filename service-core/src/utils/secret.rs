use subtle::ConstantTimeEq;

/// Byte-for-byte secret comparison that does not short-circuit on the first
/// differing byte.
///
/// Only the length is allowed to leak.
pub fn secrets_match(expected: &[u8], provided: &[u8]) -> bool {
    if expected.len() != provided.len() {
        return false;
    }

    expected.ct_eq(provided).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_secrets_match() {
        assert!(secrets_match(b"s3cr3t", b"s3cr3t"));
    }

    #[test]
    fn differing_secrets_do_not_match() {
        assert!(!secrets_match(b"s3cr3t", b"s3cr3T"));
        assert!(!secrets_match(b"s3cr3t", b"s3cr3t "));
        assert!(!secrets_match(b"s3cr3t", b""));
    }

    #[test]
    fn empty_matches_only_empty() {
        assert!(secrets_match(b"", b""));
        assert!(!secrets_match(b"", b"x"));
    }
}
