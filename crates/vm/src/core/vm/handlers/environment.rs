use alloy::primitives::{B256, U256};

use crate::core::{constants::COPY_WORD_COST, error::VmError};

use super::super::core::VM;

/// Charges for copying `size` bytes of `source[offset..]` (zero-padded) to memory at
/// `dest_offset`, then copies them.
fn copy_to_memory(
    vm: &mut VM,
    source: &[u8],
    dest_offset: U256,
    offset: U256,
    size: U256,
) -> Result<(), VmError> {
    let (dest_offset, size) = vm.memory_region(dest_offset, size)?;

    // consume dynamic gas
    vm.consume_gas(COPY_WORD_COST * size.div_ceil(32) as u64)?;

    let offset: usize = offset.try_into().unwrap_or(usize::MAX);
    let value = VM::safe_copy_data(source, offset, size);
    vm.state.memory.store(dest_offset, size, &value);
    Ok(())
}

/// ADDRESS - Get address of currently executing account
pub fn address(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(VM::address_to_u256(&vm.state.contract))
}

/// BALANCE - Get balance of the given account
pub fn balance(vm: &mut VM) -> Result<(), VmError> {
    let address = VM::u256_to_address(vm.state.stack.pop()?);

    // consume dynamic gas
    let surcharge = vm.access_account(address);
    vm.consume_gas(surcharge)?;

    let balance = vm.account(address)?.map(|contract| contract.balance).unwrap_or_default();
    vm.state.stack.push(balance)
}

/// ORIGIN - Get execution origination address
pub fn origin(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(VM::address_to_u256(&vm.tx.origin))
}

/// CALLER - Get caller address
pub fn caller(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(VM::address_to_u256(&vm.state.caller))
}

/// CALLVALUE - Get deposited value by the instruction/transaction responsible for this execution
pub fn callvalue(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(vm.state.callvalue)
}

/// CALLDATALOAD - Get input data of current environment
pub fn calldataload(vm: &mut VM) -> Result<(), VmError> {
    let i = vm.state.stack.pop()?;

    // Safely convert U256 to usize
    let i: usize = i.try_into().unwrap_or(usize::MAX);

    let word = VM::safe_copy_data(&vm.state.calldata, i, 32);
    vm.state.stack.push(U256::from_be_slice(&word))
}

/// CALLDATASIZE - Get size of input data in current environment
pub fn calldatasize(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.state.calldata.len()))
}

/// CALLDATACOPY - Copy input data in current environment to memory
pub fn calldatacopy(vm: &mut VM) -> Result<(), VmError> {
    let dest_offset = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    let calldata = vm.state.calldata.clone();
    copy_to_memory(vm, &calldata, dest_offset, offset, size)
}

/// CODESIZE - Get size of code running in current environment
pub fn codesize(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.state.code.len()))
}

/// CODECOPY - Copy code running in current environment to memory
pub fn codecopy(vm: &mut VM) -> Result<(), VmError> {
    let dest_offset = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    let code = vm.state.code.clone();
    copy_to_memory(vm, &code, dest_offset, offset, size)
}

/// GASPRICE - Get price of gas in current environment
pub fn gasprice(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(vm.tx.gas_price)
}

/// EXTCODESIZE - Get size of an account's code
pub fn extcodesize(vm: &mut VM) -> Result<(), VmError> {
    let address = VM::u256_to_address(vm.state.stack.pop()?);

    // consume dynamic gas
    let surcharge = vm.access_account(address);
    vm.consume_gas(surcharge)?;

    let size = vm.account(address)?.map(|contract| contract.code.len()).unwrap_or_default();
    vm.state.stack.push(U256::from(size))
}

/// EXTCODECOPY - Copy an account's code to memory
pub fn extcodecopy(vm: &mut VM) -> Result<(), VmError> {
    let address = VM::u256_to_address(vm.state.stack.pop()?);
    let dest_offset = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    // consume dynamic gas
    let surcharge = vm.access_account(address);
    vm.consume_gas(surcharge)?;

    let code = vm.account(address)?.map(|contract| contract.code.clone()).unwrap_or_default();
    copy_to_memory(vm, &code, dest_offset, offset, size)
}

/// RETURNDATASIZE - Get size of output data from the previous call
pub fn returndatasize(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.state.returndata.len()))
}

/// RETURNDATACOPY - Copy output data from the previous call to memory. Reading past the end of
/// the return data is an error, unlike the other copy instructions.
pub fn returndatacopy(vm: &mut VM) -> Result<(), VmError> {
    let dest_offset = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    let end = offset.checked_add(size).ok_or(VmError::InvalidMemoryAccess)?;
    if end > U256::from(vm.state.returndata.len()) {
        return Err(VmError::InvalidMemoryAccess);
    }

    let returndata = vm.state.returndata.clone();
    copy_to_memory(vm, &returndata, dest_offset, offset, size)
}

/// EXTCODEHASH - Get hash of an account's code
pub fn extcodehash(vm: &mut VM) -> Result<(), VmError> {
    let address = VM::u256_to_address(vm.state.stack.pop()?);

    // consume dynamic gas
    let surcharge = vm.access_account(address);
    vm.consume_gas(surcharge)?;

    let hash = vm.account(address)?.map(|contract| contract.codehash).unwrap_or(B256::ZERO);
    vm.state.stack.push(U256::from_be_bytes(hash.0))
}
