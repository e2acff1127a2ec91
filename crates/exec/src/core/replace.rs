use alloy::primitives::{Address, Bytes};
use ferret_vm::{Contract, VM};
use tracing::trace;

use crate::error::Error;

/// Replaces the code of the contract at `address` with `code`, keeping its storage, balance and
/// nonce. The record's codehash becomes the hash of `code`.
///
/// Fails with [`Error::MissingContract`] if `address` has no record.
///
/// ```
/// use ferret_exec::replace_code;
/// use ferret_vm::{Contract, VM};
/// use alloy::primitives::{keccak256, Address, Bytes, U256};
///
/// let mut vm = VM::new();
/// let mut contract = Contract::new(Bytes::from(vec![0x00]));
/// contract.balance = U256::from(7);
/// vm.contracts.insert(Address::ZERO, contract);
///
/// replace_code(&mut vm, Address::ZERO, Bytes::from(vec![0x5b, 0x00])).expect("contract exists");
///
/// let replaced = &vm.contracts[&Address::ZERO];
/// assert_eq!(replaced.codehash, keccak256([0x5b, 0x00]));
/// assert_eq!(replaced.balance, U256::from(7));
/// ```
pub fn replace_code(vm: &mut VM, address: Address, code: Bytes) -> Result<(), Error> {
    let previous = vm.contracts.remove(&address).ok_or(Error::MissingContract(address))?;
    trace!(%address, size = code.len(), "replacing contract code");

    let mut contract = Contract::new(code);
    contract.storage = previous.storage;
    contract.balance = previous.balance;
    contract.nonce = previous.nonce;

    vm.contracts.insert(address, contract);
    Ok(())
}

/// Replaces the code of the currently executing contract. See [`replace_code`].
pub fn replace_code_of_self(vm: &mut VM, code: Bytes) -> Result<(), Error> {
    let address = vm.state.contract;
    replace_code(vm, address, code)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{keccak256, U256};

    use super::*;

    #[test]
    fn test_replace_code_keeps_accounting() {
        let address = Address::repeat_byte(0x11);
        let mut contract = Contract::new(Bytes::from(vec![0x60, 0x00]));
        contract.storage.store(U256::from(1), U256::from(2));
        contract.balance = U256::from(100);
        contract.nonce = 3;

        let mut vm = VM::new();
        vm.contracts.insert(address, contract.clone());

        let code = Bytes::from(vec![0x5b, 0x00]);
        replace_code(&mut vm, address, code.clone()).expect("contract exists");

        let replaced = &vm.contracts[&address];
        assert_eq!(replaced.code, code);
        assert_eq!(replaced.codehash, keccak256(&code));
        assert_eq!(replaced.storage.storage, contract.storage.storage);
        assert_eq!(replaced.balance, contract.balance);
        assert_eq!(replaced.nonce, contract.nonce);
    }

    #[test]
    fn test_replace_code_missing_contract() {
        let address = Address::repeat_byte(0x11);
        let mut vm = VM::new();

        let result = replace_code(&mut vm, address, Bytes::new());

        assert!(matches!(result, Err(Error::MissingContract(a)) if a == address));
        assert!(vm.contracts.is_empty());
    }

    #[test]
    fn test_replace_code_of_self() {
        let address = Address::repeat_byte(0x22);
        let mut vm = VM::new();
        vm.contracts.insert(address, Contract::new(Bytes::from(vec![0x00])));
        vm.load_contract(address).expect("contract exists");

        replace_code_of_self(&mut vm, Bytes::from(vec![0x01])).expect("contract exists");

        assert_eq!(vm.contracts[&address].code, Bytes::from(vec![0x01]));
    }
}
