use alloy::primitives::{Address, B256, U256};

/// The block the machine executes in. Transactions advance `number` and `timestamp` through
/// their delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The block number.
    pub number: u64,

    /// The block timestamp, in seconds.
    pub timestamp: u64,

    /// The block beneficiary.
    pub coinbase: Address,

    /// The block gas limit.
    pub gas_limit: u64,

    /// The block base fee.
    pub base_fee: U256,

    /// The chain id.
    pub chain_id: u64,

    /// The beacon chain randomness value.
    pub prev_randao: B256,
}

impl Default for Block {
    fn default() -> Self {
        Block {
            number: 0,
            timestamp: 0,
            coinbase: Address::ZERO,
            gas_limit: 30_000_000,
            base_fee: U256::ZERO,
            chain_id: 1,
            prev_randao: B256::ZERO,
        }
    }
}

/// Per-transaction context visible to every frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxContext {
    /// The externally owned account that signed the transaction.
    pub origin: Address,

    /// The transaction's gas price.
    pub gas_price: U256,
}
