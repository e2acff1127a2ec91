use alloy::primitives::{I256, U256};
use eyre::{bail, eyre, Result};
use std::fmt::Write;

/// Reinterprets an unsigned word as a two's complement signed integer
pub fn sign_uint(unsigned: U256) -> I256 {
    I256::from_raw(unsigned)
}

/// Decodes a hex string into a vector of bytes
///
/// ```
/// use ferret_common::utils::strings::decode_hex;
///
/// let hex = "0x6001600201"; // PUSH1 0x01 PUSH1 0x02 ADD
/// let result = decode_hex(hex).expect("should decode hex");
/// assert_eq!(result, vec![0x60, 0x01, 0x60, 0x02, 0x01]);
/// ```
pub fn decode_hex(mut s: &str) -> Result<Vec<u8>> {
    // normalize
    s = s.trim().trim_start_matches("0x");

    if s.is_empty() {
        return Ok(vec![]);
    }

    if s.len() % 2 != 0 {
        bail!("invalid hex string: odd number of digits in '{}'", s);
    }

    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| eyre!("invalid hex string: {}", s))
}

/// Encodes a slice of bytes into a lowercase hex string, without a `0x` prefix
///
/// ```
/// use ferret_common::utils::strings::encode_hex;
///
/// let bytes = vec![0x60, 0x01, 0x00];
/// assert_eq!(encode_hex(&bytes), "600100");
/// ```
pub fn encode_hex(s: &[u8]) -> String {
    s.iter().fold(String::with_capacity(s.len() * 2), |mut acc, b| {
        // writing to a String cannot fail
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use crate::utils::strings::*;

    #[test]
    fn test_sign_uint() {
        let unsigned = U256::from(10);
        let signed = sign_uint(unsigned);
        assert_eq!(signed, I256::try_from(10).expect("invalid"));

        let signed = sign_uint(U256::MAX);
        assert_eq!(signed, I256::MINUS_ONE);
    }

    #[test]
    fn test_decode_hex() {
        let result = decode_hex("0x5b5b00").expect("should decode hex");
        assert_eq!(result, vec![0x5b, 0x5b, 0x00]);

        let result = decode_hex("abcdef").expect("should decode hex");
        assert_eq!(result, vec![171, 205, 239]);

        let result = decode_hex("0x").expect("should decode hex");
        assert!(result.is_empty());
    }

    #[test]
    fn test_decode_hex_rejects_malformed_input() {
        assert!(decode_hex("0x600").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn test_encode_hex() {
        let bytes = vec![72, 101, 108, 108, 111];
        assert_eq!(encode_hex(&bytes), "48656c6c6f");
        assert_eq!(encode_hex(&[]), "");
    }
}
