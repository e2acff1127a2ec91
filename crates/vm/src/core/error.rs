use std::fmt::{self, Display};

use alloy::primitives::{Address, Bytes};

/// A request for state the machine does not hold. Raised instead of assuming an empty account
/// when [`VM::query_unknown_accounts`](crate::VM::query_unknown_accounts) is set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Query {
    /// Balance, code and nonce of an account with no local record.
    AccountInfo(Address),
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::AccountInfo(address) => write!(f, "account info for {address}"),
        }
    }
}

/// The closed set of failures an execution frame can end with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// REVERT was executed, carrying the revert data.
    #[error("execution reverted ({} bytes of data)", .0.len())]
    Revert(Bytes),

    /// The opcode is not part of the instruction set, or is the designated INVALID opcode.
    #[error("unrecognized opcode {0:#04x}")]
    UnrecognizedOpcode(u8),

    /// The frame ran out of gas.
    #[error("out of gas: {needed} needed, {available} available")]
    OutOfGas {
        /// Gas left in the frame.
        available: u64,
        /// Gas the instruction required.
        needed: u64,
    },

    /// The frame touched state the machine was told not to assume.
    #[error("unresolved query: {0}")]
    Query(Query),

    /// An instruction needed more stack items than were present.
    #[error("stack underrun")]
    StackUnderrun,

    /// A jump targeted something other than a JUMPDEST.
    #[error("bad jump destination")]
    BadJumpDestination,

    /// An instruction would grow the stack past its limit.
    #[error("stack limit exceeded")]
    StackLimitExceeded,

    /// A memory offset or size is beyond the addressable range.
    #[error("memory offset or size overflow")]
    IllegalOverflow,

    /// A state-modifying instruction was executed inside a static call.
    #[error("state change attempted in static context")]
    StateChangeWhileStatic,

    /// RETURNDATACOPY read past the end of the return data buffer.
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Deployed code is larger than the allowed maximum.
    #[error("max code size exceeded: {size} > {limit}")]
    MaxCodeSizeExceeded {
        /// The maximum allowed code size.
        limit: usize,
        /// The size of the code that was returned.
        size: usize,
    },

    /// Deployed code starts with the reserved `0xef` byte.
    #[error("invalid code format")]
    InvalidFormat,

    /// The address has no contract record.
    #[error("no contract at {0}")]
    NoSuchContract(Address),
}
