use super::strings::encode_hex;
use alloy::primitives::{Address, Bytes, B256, U256};

/// A convenience trait which encodes a given EVM type into a `0x`-prefixed, lowercase hex string.
pub trait ToLowerHex {
    /// Returns the `0x`-prefixed lowercase hex representation of `self`.
    fn to_lower_hex(&self) -> String;
}

impl ToLowerHex for Bytes {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", encode_hex(self))
    }
}

impl ToLowerHex for Vec<u8> {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", encode_hex(self))
    }
}

impl ToLowerHex for U256 {
    fn to_lower_hex(&self) -> String {
        format!("{self:#066x}")
    }
}

impl ToLowerHex for B256 {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", encode_hex(self.as_slice()))
    }
}

impl ToLowerHex for Address {
    fn to_lower_hex(&self) -> String {
        format!("0x{}", encode_hex(self.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lower_hex() {
        assert_eq!(Bytes::from(vec![0xde, 0xad]).to_lower_hex(), "0xdead");
        assert_eq!(
            Address::repeat_byte(0xab).to_lower_hex(),
            "0xabababababababababababababababababababab"
        );
        assert_eq!(U256::from(1u8).to_lower_hex().len(), 66);
        assert!(B256::ZERO.to_lower_hex().ends_with("00"));
    }
}
