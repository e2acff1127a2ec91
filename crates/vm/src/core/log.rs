use alloy::primitives::{Address, Bytes, B256};

/// The [`Log`] struct represents a log emitted by a `LOG0-LOG4` opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// The contract that emitted the log.
    pub address: Address,

    /// Indexed topics, at most four.
    pub topics: Vec<B256>,

    /// Unindexed log data.
    pub data: Bytes,
}

impl Log {
    /// Creates a new [`Log`] emitted by `address` with the given topics and data.
    pub fn new(address: Address, topics: Vec<B256>, data: &[u8]) -> Log {
        Log { address, topics, data: Bytes::copy_from_slice(data) }
    }
}
