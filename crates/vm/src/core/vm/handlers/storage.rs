use crate::core::{constants::CALL_STIPEND, error::VmError, storage::Storage};

use super::super::core::VM;

fn storage_mut(vm: &mut VM) -> &mut Storage {
    let address = vm.state.contract;
    &mut vm.contracts.entry(address).or_default().storage
}

/// SLOAD - Load word from storage
pub fn sload(vm: &mut VM) -> Result<(), VmError> {
    let key = vm.state.stack.pop()?;

    let storage = storage_mut(vm);
    let gas_cost = storage.access_cost(key);
    let value = storage.load(key);

    // consume dynamic gas
    vm.consume_gas(gas_cost)?;
    vm.state.stack.push(value)
}

/// SSTORE - Save word to storage
pub fn sstore(vm: &mut VM) -> Result<(), VmError> {
    if vm.state.is_static {
        return Err(VmError::StateChangeWhileStatic);
    }

    // a frame running on the call stipend may not write storage
    if vm.state.gas <= CALL_STIPEND {
        return Err(VmError::OutOfGas { available: vm.state.gas, needed: CALL_STIPEND + 1 });
    }

    let key = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;

    // consume dynamic gas
    let gas_cost = storage_mut(vm).storage_cost(key, value);
    vm.consume_gas(gas_cost)?;

    storage_mut(vm).store(key, value);
    Ok(())
}

/// TLOAD - Load word from transient storage
pub fn tload(vm: &mut VM) -> Result<(), VmError> {
    let key = vm.state.stack.pop()?;
    let value = storage_mut(vm).tload(key);
    vm.state.stack.push(value)
}

/// TSTORE - Save word to transient storage
pub fn tstore(vm: &mut VM) -> Result<(), VmError> {
    if vm.state.is_static {
        return Err(VmError::StateChangeWhileStatic);
    }

    let key = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    storage_mut(vm).tstore(key, value);
    Ok(())
}
