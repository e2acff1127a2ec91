use ferret_vm::{ExecutionResult, VmError, VM};
use tracing::{debug, warn};

use crate::{
    core::{
        classify::{classify_error, ErrorClass},
        coverage::{record_coverage_point, run_with_coverage, CoverageMap},
        replace::replace_code_of_self,
    },
    error::Error,
    transaction::{setup_tx, Transaction, TxCall},
};

/// The default per-transaction gas ceiling of the harness.
pub const MAX_GAS: u64 = 0xffff_ffff;

/// Sets up `tx` on `vm`, drives it with `strategy` and dispatches on the outcome.
///
/// - A failure classified as [`ErrorClass::Revert`] is returned as-is. The machine is *not* rolled
///   back; callers that need the pre-transaction state should clone `vm` beforehand.
/// - Any other failure is handed to `on_failure`, whose error is propagated.
/// - A successful [`TxCall::Create`] replaces the init code at `tx.dst` with the returned runtime
///   code and reloads the contract.
pub fn execute_tx_with<F, S>(
    vm: &mut VM,
    gas_limit: u64,
    on_failure: F,
    strategy: S,
    tx: &Transaction,
) -> Result<ExecutionResult, Error>
where
    F: FnOnce(&VmError) -> Result<(), Error>,
    S: FnOnce(&mut VM) -> ExecutionResult,
{
    setup_tx(vm, gas_limit, tx)?;
    let outcome = strategy(vm);

    match (&outcome, &tx.call) {
        (ExecutionResult::Failure(error), _) if classify_error(error) == ErrorClass::Revert => {
            debug!(dst = %tx.dst, %error, "transaction reverted");
        }
        (ExecutionResult::Failure(error), _) => on_failure(error)?,
        (ExecutionResult::Success(runtime_code), TxCall::Create(_)) => {
            debug!(dst = %tx.dst, size = runtime_code.len(), "deployed contract");
            replace_code_of_self(vm, runtime_code.clone())?;
            vm.load_contract(tx.dst).map_err(|_| Error::MissingContract(tx.dst))?;
        }
        (ExecutionResult::Success(_), TxCall::Call(_)) => {}
    }

    Ok(outcome)
}

/// Executes `tx` to completion, failing on any outcome that is not a success or a revert.
///
/// ```
/// use ferret_exec::{execute_tx, Transaction, MAX_GAS};
/// use ferret_vm::{Contract, VM};
/// use alloy::primitives::{Address, Bytes};
///
/// let mut vm = VM::new();
/// let target = Address::repeat_byte(0x01);
/// vm.contracts.insert(target, Contract::new(Bytes::from(vec![0x60, 0x01, 0x00])));
///
/// let tx = Transaction::call(Address::ZERO, target, Bytes::new());
/// let outcome = execute_tx(&mut vm, MAX_GAS, &tx).expect("transaction is legal");
/// assert!(outcome.is_success());
/// ```
pub fn execute_tx(
    vm: &mut VM,
    gas_limit: u64,
    tx: &Transaction,
) -> Result<ExecutionResult, Error> {
    execute_tx_with(vm, gas_limit, vm_except, VM::run, tx)
}

/// Like [`execute_tx`], recording every executed instruction into `coverage`.
pub fn execute_tx_with_coverage(
    vm: &mut VM,
    gas_limit: u64,
    coverage: &mut CoverageMap,
    tx: &Transaction,
) -> Result<ExecutionResult, Error> {
    execute_tx_with(
        vm,
        gas_limit,
        vm_except,
        |vm| run_with_coverage(vm, |vm| record_coverage_point(vm, coverage)),
        tx,
    )
}

/// The default failure handler: turns illegal failures into [`Error::IllegalExec`] and
/// everything else into [`Error::UnknownFailure`].
pub fn vm_except(error: &VmError) -> Result<(), Error> {
    match classify_error(error) {
        ErrorClass::Illegal => {
            warn!(%error, "illegal execution");
            Err(Error::IllegalExec(error.clone()))
        }
        _ => {
            warn!(%error, "unclassified interpreter failure");
            Err(Error::UnknownFailure(error.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes};
    use ferret_vm::Contract;

    use super::*;

    const TARGET: Address = Address::repeat_byte(0x42);

    fn vm_with_target(code: Vec<u8>) -> VM {
        let mut vm = VM::new();
        vm.contracts.insert(TARGET, Contract::new(Bytes::from(code)));
        vm
    }

    #[test]
    fn test_revert_skips_failure_handler() {
        // REVERT(0, 0)
        let mut vm = vm_with_target(vec![0x60, 0x00, 0x60, 0x00, 0xfd]);
        let tx = Transaction::call(Address::ZERO, TARGET, Bytes::new());

        let outcome = execute_tx_with(
            &mut vm,
            MAX_GAS,
            |_| panic!("reverts are not failures"),
            VM::run,
            &tx,
        )
        .expect("reverts are returned");

        assert_eq!(outcome, ExecutionResult::Failure(VmError::Revert(Bytes::new())));
        assert_eq!(vm.contracts[&TARGET].code.len(), 5);
    }

    #[test]
    fn test_failure_handler_decides() {
        let mut vm = vm_with_target(vec![0x01]);
        let tx = Transaction::call(Address::ZERO, TARGET, Bytes::new());

        let mut seen = None;
        let outcome = execute_tx_with(
            &mut vm,
            MAX_GAS,
            |error| {
                seen = Some(error.clone());
                Ok(())
            },
            VM::run,
            &tx,
        )
        .expect("handler recovers");

        assert_eq!(seen, Some(VmError::StackUnderrun));
        assert_eq!(outcome, ExecutionResult::Failure(VmError::StackUnderrun));
    }

    #[test]
    fn test_call_success_keeps_code() {
        let code = vec![0x60, 0x01, 0x60, 0x00, 0xf3];
        let mut vm = vm_with_target(code.clone());
        let tx = Transaction::call(Address::ZERO, TARGET, Bytes::new());

        let outcome = execute_tx(&mut vm, MAX_GAS, &tx).expect("transaction is legal");

        assert!(outcome.is_success());
        assert_eq!(vm.contracts[&TARGET].code, Bytes::from(code));
    }

    #[test]
    fn test_vm_except() {
        assert!(matches!(
            vm_except(&VmError::BadJumpDestination),
            Err(Error::IllegalExec(VmError::BadJumpDestination))
        ));
        assert!(matches!(
            vm_except(&VmError::InvalidFormat),
            Err(Error::UnknownFailure(VmError::InvalidFormat))
        ));
    }
}
