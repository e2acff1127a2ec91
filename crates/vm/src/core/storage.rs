use alloy::primitives::U256;
use hashbrown::{HashMap, HashSet};

use super::constants::{
    COLD_SLOAD_COST, SSTORE_RESET_COST, SSTORE_SET_COST, WARM_STORAGE_READ_COST,
};

/// The [`Storage`] struct represents the storage of a contract. \
/// \
/// We keep track of the persistent and transient storage as HashMaps, as well as a HashSet of keys
/// that have been accessed in the current transaction for gas calculation purposes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    /// Persistent storage slots. Absent keys read as zero.
    pub storage: HashMap<U256, U256>,

    /// Transient storage slots (EIP-1153), cleared between transactions.
    pub transient: HashMap<U256, U256>,

    access_set: HashSet<U256>,
}

impl Storage {
    /// Creates a new [`Storage`] struct.
    ///
    /// ```
    /// use ferret_vm::core::storage::Storage;
    ///
    /// let storage = Storage::new();
    /// assert!(storage.storage.is_empty());
    /// ```
    pub fn new() -> Storage {
        Storage::default()
    }

    /// Store a key-value pair in the storage map. Storing zero removes the slot.
    ///
    /// ```
    /// use ferret_vm::core::storage::Storage;
    /// use alloy::primitives::U256;
    ///
    /// let mut storage = Storage::new();
    /// storage.store(U256::from(1), U256::from(2));
    ///
    /// assert_eq!(storage.storage.get(&U256::from(1)), Some(&U256::from(2)));
    /// ```
    pub fn store(&mut self, key: U256, value: U256) {
        self.access_set.insert(key);

        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    /// Store a key-value pair in the transient storage map.
    pub fn tstore(&mut self, key: U256, value: U256) {
        if value.is_zero() {
            self.transient.remove(&key);
        } else {
            self.transient.insert(key, value);
        }
    }

    /// Load a value from the storage map, warming the key.
    ///
    /// ```
    /// use ferret_vm::core::storage::Storage;
    /// use alloy::primitives::U256;
    ///
    /// let mut storage = Storage::new();
    /// storage.store(U256::from(1), U256::from(2));
    ///
    /// assert_eq!(storage.load(U256::from(1)), U256::from(2));
    /// assert_eq!(storage.load(U256::from(3)), U256::ZERO);
    /// ```
    pub fn load(&mut self, key: U256) -> U256 {
        self.access_set.insert(key);
        self.storage.get(&key).copied().unwrap_or_default()
    }

    /// Load a value from the transient storage map.
    pub fn tload(&self, key: U256) -> U256 {
        self.transient.get(&key).copied().unwrap_or_default()
    }

    /// calculate the cost of reading a key from storage
    ///
    /// ```
    /// use ferret_vm::core::storage::Storage;
    /// use alloy::primitives::U256;
    ///
    /// let mut storage = Storage::new();
    ///
    /// // key `1` is not warm, so the cost should be 2100
    /// assert_eq!(storage.access_cost(U256::from(1)), 2100);
    ///
    /// // key `1` is now warm, so the cost should be 100
    /// assert_eq!(storage.access_cost(U256::from(1)), 100);
    /// ```
    pub fn access_cost(&mut self, key: U256) -> u64 {
        if self.access_set.insert(key) {
            COLD_SLOAD_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    }

    /// calculate the cost of storing a value at `key`
    ///
    /// ```
    /// use ferret_vm::core::storage::Storage;
    /// use alloy::primitives::U256;
    ///
    /// let mut storage = Storage::new();
    ///
    /// // writing into an empty, cold slot: 20000 + 2100
    /// assert_eq!(storage.storage_cost(U256::from(1), U256::from(2)), 22100);
    /// storage.store(U256::from(1), U256::from(2));
    ///
    /// // overwriting a warm slot: 2900
    /// assert_eq!(storage.storage_cost(U256::from(1), U256::from(3)), 2900);
    ///
    /// // writing the value the slot already holds: 100
    /// assert_eq!(storage.storage_cost(U256::from(1), U256::from(2)), 100);
    /// ```
    pub fn storage_cost(&mut self, key: U256, value: U256) -> u64 {
        let cold_surcharge = if self.access_set.insert(key) { COLD_SLOAD_COST } else { 0 };
        let current = self.storage.get(&key).copied().unwrap_or_default();

        let base = if current == value {
            WARM_STORAGE_READ_COST
        } else if current.is_zero() {
            SSTORE_SET_COST
        } else {
            SSTORE_RESET_COST
        };

        base + cold_surcharge
    }

    /// Forgets transient values and warm keys. Called at the start of every transaction.
    pub fn clear_transaction_state(&mut self) {
        self.transient.clear();
        self.access_set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sstore_sload() {
        let mut storage = Storage::new();

        storage.store(U256::from(1), U256::from(1));
        assert_eq!(storage.load(U256::from(1)), U256::from(1));

        let value = U256::from_be_slice(&[
            1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 2, 3, 4, 5, 6, 7, 8,
            2, 1,
        ]);
        storage.store(U256::from(255), value);
        assert_eq!(storage.load(U256::from(255)), value);

        assert_eq!(storage.load(U256::MAX), U256::ZERO);
    }

    #[test]
    fn test_store_zero_clears_slot() {
        let mut storage = Storage::new();
        storage.store(U256::from(1), U256::from(1));
        storage.store(U256::from(1), U256::ZERO);
        assert!(storage.storage.is_empty());
    }

    #[test]
    fn test_storage_cost_cold_zero() {
        let mut storage = Storage::new();
        assert_eq!(storage.storage_cost(U256::from(1), U256::ZERO), 2200);
    }

    #[test]
    fn test_storage_cost_reset_to_zero() {
        let mut storage = Storage::new();
        storage.store(U256::from(1), U256::from(1));
        assert_eq!(storage.storage_cost(U256::from(1), U256::ZERO), 2900);
    }

    #[test]
    fn test_transient_storage() {
        let mut storage = Storage::new();
        storage.tstore(U256::from(7), U256::from(9));
        assert_eq!(storage.tload(U256::from(7)), U256::from(9));
        assert_eq!(storage.load(U256::from(7)), U256::ZERO);

        storage.clear_transaction_state();
        assert_eq!(storage.tload(U256::from(7)), U256::ZERO);
        assert_eq!(storage.access_cost(U256::from(7)), 2100);
    }
}
