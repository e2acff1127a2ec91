use ferret_vm::{ExecutionResult, VmError};

/// How the harness treats a failed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// An expected way for a transaction to fail. The outcome is returned as-is.
    Revert,

    /// A failure a well-formed contract cannot produce, e.g. a stack underflow.
    Illegal,

    /// A failure with no classification, which signals a bug in the harness.
    Unknown,
}

/// Classifies an interpreter failure.
///
/// ```
/// use ferret_exec::{classify_error, ErrorClass};
/// use ferret_vm::VmError;
///
/// assert_eq!(classify_error(&VmError::UnrecognizedOpcode(0xfe)), ErrorClass::Revert);
/// assert_eq!(classify_error(&VmError::StackUnderrun), ErrorClass::Illegal);
/// assert_eq!(classify_error(&VmError::InvalidFormat), ErrorClass::Unknown);
/// ```
pub fn classify_error(error: &VmError) -> ErrorClass {
    match error {
        // environment queries are answered outside the harness, so they end the transaction
        // like a revert would
        VmError::Revert(_)
        | VmError::UnrecognizedOpcode(_)
        | VmError::OutOfGas { .. }
        | VmError::Query(_) => ErrorClass::Revert,

        VmError::StackUnderrun
        | VmError::BadJumpDestination
        | VmError::StackLimitExceeded
        | VmError::IllegalOverflow => ErrorClass::Illegal,

        VmError::StateChangeWhileStatic
        | VmError::InvalidMemoryAccess
        | VmError::MaxCodeSizeExceeded { .. }
        | VmError::InvalidFormat
        | VmError::NoSuchContract(_) => ErrorClass::Unknown,
    }
}

/// Whether `outcome` is a failure classified as [`ErrorClass::Revert`].
pub fn is_reversion(outcome: &ExecutionResult) -> bool {
    outcome.error().is_some_and(|error| classify_error(error) == ErrorClass::Revert)
}

/// Whether `outcome` is a failure classified as [`ErrorClass::Illegal`].
pub fn is_illegal(outcome: &ExecutionResult) -> bool {
    outcome.error().is_some_and(|error| classify_error(error) == ErrorClass::Illegal)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes};
    use ferret_vm::Query;

    use super::*;

    #[test]
    fn test_classify_reverts() {
        let errors = [
            VmError::Revert(Bytes::from(vec![0x01])),
            VmError::UnrecognizedOpcode(0x0c),
            VmError::OutOfGas { available: 1, needed: 3 },
            VmError::Query(Query::AccountInfo(Address::ZERO)),
        ];

        for error in errors {
            assert_eq!(classify_error(&error), ErrorClass::Revert, "{error}");
        }
    }

    #[test]
    fn test_classify_illegal() {
        let errors = [
            VmError::StackUnderrun,
            VmError::BadJumpDestination,
            VmError::StackLimitExceeded,
            VmError::IllegalOverflow,
        ];

        for error in errors {
            assert_eq!(classify_error(&error), ErrorClass::Illegal, "{error}");
        }
    }

    #[test]
    fn test_classify_unknown() {
        let errors = [
            VmError::StateChangeWhileStatic,
            VmError::InvalidMemoryAccess,
            VmError::MaxCodeSizeExceeded { limit: 24576, size: 24577 },
            VmError::InvalidFormat,
            VmError::NoSuchContract(Address::ZERO),
        ];

        for error in errors {
            assert_eq!(classify_error(&error), ErrorClass::Unknown, "{error}");
        }
    }

    #[test]
    fn test_outcome_predicates() {
        let reverted = ExecutionResult::Failure(VmError::Revert(Bytes::new()));
        let illegal = ExecutionResult::Failure(VmError::BadJumpDestination);
        let success = ExecutionResult::Success(Bytes::new());

        assert!(is_reversion(&reverted));
        assert!(!is_illegal(&reverted));

        assert!(is_illegal(&illegal));
        assert!(!is_reversion(&illegal));

        assert!(!is_reversion(&success));
        assert!(!is_illegal(&success));
    }
}
