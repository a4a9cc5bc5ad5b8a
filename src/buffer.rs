//! Canonical byte representation for leaves, nodes and proof material.
//!
//! Callers can hand the tree raw bytes, optionally `0x`-prefixed hex text,
//! plain text, or unsigned integers. Everything funnels through
//! [`normalize`] into a plain byte vector, which is the only representation
//! the rest of the crate works with.

/// A leaf value in one of the supported input forms.
///
/// `From` impls cover the common call sites so that leaves can be passed as
/// `b"..."`, `"0x..."`, `vec![..]` or integers without ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafInput {
    /// Raw bytes, used verbatim.
    Bytes(Vec<u8>),
    /// Text; hex-like strings are decoded, anything else is taken as UTF-8
    /// bytes.
    Text(String),
    /// Unsigned integer, normalized to its minimal big-endian byte form.
    Uint(u128),
}

impl From<Vec<u8>> for LeafInput {
    fn from(value: Vec<u8>) -> Self {
        LeafInput::Bytes(value)
    }
}

impl From<&[u8]> for LeafInput {
    fn from(value: &[u8]) -> Self {
        LeafInput::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for LeafInput {
    fn from(value: [u8; N]) -> Self {
        LeafInput::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for LeafInput {
    fn from(value: &[u8; N]) -> Self {
        LeafInput::Bytes(value.to_vec())
    }
}

impl From<String> for LeafInput {
    fn from(value: String) -> Self {
        LeafInput::Text(value)
    }
}

impl From<&str> for LeafInput {
    fn from(value: &str) -> Self {
        LeafInput::Text(value.to_string())
    }
}

impl From<u128> for LeafInput {
    fn from(value: u128) -> Self {
        LeafInput::Uint(value)
    }
}

/// Convert any supported input form into canonical bytes.
///
/// Total: never fails for any value of [`LeafInput`].
///
/// - `Bytes` pass through unchanged.
/// - Hex-like `Text` is decoded after stripping an optional `0x` prefix; a
///   dangling trailing nibble is dropped. Non-hex text becomes its UTF-8
///   bytes.
/// - `Uint` becomes its big-endian bytes with leading zero bytes stripped
///   (zero normalizes to empty).
pub fn normalize(value: LeafInput) -> Vec<u8> {
    match value {
        LeafInput::Bytes(bytes) => bytes,
        LeafInput::Text(text) => {
            if is_hex_like(&text) {
                let digits = text.strip_prefix("0x").unwrap_or(&text);
                // Incomplete trailing nibble is dropped, not an error.
                let digits = &digits[..digits.len() & !1];
                hex::decode(digits).unwrap_or_default()
            } else {
                text.into_bytes()
            }
        }
        LeafInput::Uint(value) => {
            let bytes = value.to_be_bytes();
            let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
            bytes[first..].to_vec()
        }
    }
}

/// The leaf's raw byte form, with no hex interpretation of text.
///
/// Build-time leaf hashing feeds the hash function this form, so a text
/// leaf like `"a"` hashes as its UTF-8 bytes rather than decoding as a hex
/// digit.
pub(crate) fn raw_bytes(value: LeafInput) -> Vec<u8> {
    match value {
        LeafInput::Text(text) => text.into_bytes(),
        other => normalize(other),
    }
}

/// Returns true if `value` is an optionally `0x`-prefixed run of hex digits.
///
/// The empty string (and a bare `0x`) qualify.
pub fn is_hex_like(value: &str) -> bool {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Wrap a hash function so its output is always canonical bytes, whatever
/// supported form it returns.
pub fn wrap_hash_fn<T, F>(f: F) -> impl Fn(&[u8]) -> Vec<u8>
where
    T: Into<LeafInput>,
    F: Fn(&[u8]) -> T,
{
    move |data| normalize(f(data).into())
}

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Byte reversal, used by the Bitcoin combination rule.
pub(crate) fn reverse(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_raw_bytes_pass_through() {
        assert_eq!(normalize(LeafInput::Bytes(vec![1, 2, 3])), vec![1, 2, 3]);
        assert_eq!(normalize(b"abc".as_slice().into()), b"abc".to_vec());
    }

    #[test]
    fn test_normalize_hex_text() {
        assert_eq!(normalize("0xdeadbeef".into()), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(normalize("deadbeef".into()), vec![0xde, 0xad, 0xbe, 0xef]);
        // Dangling nibble is dropped.
        assert_eq!(normalize("0xabc".into()), vec![0xab]);
        // Empty hex decodes to empty bytes.
        assert_eq!(normalize("".into()), Vec::<u8>::new());
        assert_eq!(normalize("0x".into()), Vec::<u8>::new());
    }

    #[test]
    fn test_normalize_plain_text() {
        // 'z' is not a hex digit, so the whole string is raw UTF-8.
        assert_eq!(normalize("zebra".into()), b"zebra".to_vec());
    }

    #[test]
    fn test_normalize_uint() {
        assert_eq!(normalize(0u128.into()), Vec::<u8>::new());
        assert_eq!(normalize(0x01u128.into()), vec![0x01]);
        assert_eq!(normalize(0xdead_beefu128.into()), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_is_hex_like() {
        assert!(is_hex_like(""));
        assert!(is_hex_like("0x"));
        assert!(is_hex_like("0x1234"));
        assert!(is_hex_like("AbCd"));
        assert!(is_hex_like("abc")); // odd-length runs qualify
        assert!(!is_hex_like("0xzz"));
        assert!(!is_hex_like("hello world"));
    }

    #[test]
    fn test_wrap_hash_fn_normalizes_hex_output() {
        let wrapped = wrap_hash_fn(|_data: &[u8]| "0xff00".to_string());
        assert_eq!(wrapped(b"anything"), vec![0xff, 0x00]);

        let raw = wrap_hash_fn(|data: &[u8]| data.to_vec());
        assert_eq!(raw(&[9, 9]), vec![9, 9]);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0xde, 0xad]), "0xdead");
        assert_eq!(to_hex(&[]), "0x");
    }

    #[test]
    fn test_reverse() {
        assert_eq!(reverse(&[1, 2, 3]), vec![3, 2, 1]);
        assert_eq!(reverse(&[]), Vec::<u8>::new());
    }
}
