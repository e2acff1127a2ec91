use alloy::primitives::{keccak256, Bytes, B256, U256};

use super::storage::Storage;

/// The [`Contract`] struct is the machine's record of one account: its code, persistent
/// storage and accounting fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contract {
    /// The account's code. Empty for externally owned accounts.
    pub code: Bytes,

    /// The account's storage.
    pub storage: Storage,

    /// The account's balance, in wei.
    pub balance: U256,

    /// The account's nonce.
    pub nonce: u64,

    /// `keccak256(code)`, identifying the code independent of the address it lives at.
    pub codehash: B256,
}

impl Contract {
    /// Builds a fresh record for `code`, as if it had just been deployed: empty storage, zero
    /// balance and nonce.
    ///
    /// ```
    /// use ferret_vm::Contract;
    /// use alloy::primitives::{keccak256, Bytes, U256};
    ///
    /// let contract = Contract::new(Bytes::from(vec![0x00]));
    /// assert_eq!(contract.codehash, keccak256([0x00]));
    /// assert_eq!(contract.balance, U256::ZERO);
    /// assert_eq!(contract.nonce, 0);
    /// ```
    pub fn new(code: Bytes) -> Contract {
        let codehash = keccak256(&code);
        Contract { code, storage: Storage::new(), balance: U256::ZERO, nonce: 0, codehash }
    }

    /// Whether the record holds no code.
    pub fn is_empty_code(&self) -> bool {
        self.code.is_empty()
    }
}

impl Default for Contract {
    fn default() -> Self {
        Contract::new(Bytes::new())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::KECCAK256_EMPTY;

    use super::*;

    #[test]
    fn test_default_contract_is_empty_account() {
        let contract = Contract::default();
        assert!(contract.is_empty_code());
        assert_eq!(contract.codehash, KECCAK256_EMPTY);
        assert!(contract.storage.storage.is_empty());
    }
}
