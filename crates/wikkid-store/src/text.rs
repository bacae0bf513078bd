//! Text/binary classification of file content.
//!
//! Content is text unless it contains a NUL byte. The whole buffer is
//! scanned, so a NUL anywhere marks the content binary. Empty content is
//! text.

/// Returns `true` if `data` looks like text.
pub fn is_text(data: &[u8]) -> bool {
    !data.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_text() {
        assert!(is_text(b""));
    }

    #[test]
    fn plain_ascii_is_text() {
        assert!(is_text(b"Content"));
        assert!(is_text("unicode: \u{e9}\u{e8}".as_bytes()));
    }

    #[test]
    fn embedded_nul_is_binary() {
        assert!(!is_text(b"some\0zero\0containing\0string"));
    }

    #[test]
    fn late_nul_is_binary() {
        let mut data = vec![b'a'; 4096];
        data.push(0);
        assert!(!is_text(&data));
    }

    proptest! {
        #[test]
        fn any_nul_means_binary(prefix in proptest::collection::vec(1u8..=255u8, 0..64),
                                suffix in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut data = prefix.clone();
            prop_assert!(is_text(&data));
            data.push(0);
            data.extend(suffix);
            prop_assert!(!is_text(&data));
        }
    }
}
