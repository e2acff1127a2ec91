use alloy::primitives::{Address, U256};
use ferret_vm::VmError;

/// Error type for the execution core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transaction failed in a way a correct contract never should, e.g. a stack underflow or
    /// a jump into the middle of push data.
    #[error("Illegal execution: {0}")]
    IllegalExec(VmError),

    /// The interpreter failed with an error that has no classification. This is a bug in the
    /// harness and should be reported along with the error.
    #[error("Unreachable interpreter failure (please report this): {0}")]
    UnknownFailure(VmError),

    /// An operation required a contract record that does not exist.
    #[error("No contract at {0}")]
    MissingContract(Address),

    /// The sender of a transaction cannot pay the value it sends.
    #[error("Sender {sender} has balance {balance}, which cannot cover value {value}")]
    InsufficientBalance {
        /// The transaction's sender.
        sender: Address,
        /// The sender's balance before the transaction.
        balance: U256,
        /// The value the transaction sends.
        value: U256,
    },
}
