use alloy::primitives::{Bytes, U256};

use crate::core::error::VmError;

use super::super::core::VM;

/// STOP - Halts execution
pub fn stop(vm: &mut VM) -> Result<(), VmError> {
    vm.halt(Ok(Bytes::new()));
    Ok(())
}

fn jump_to(vm: &mut VM, destination: U256) -> Result<(), VmError> {
    let destination: usize =
        destination.try_into().map_err(|_| VmError::BadJumpDestination)?;

    if !vm.state.jumpdests.contains(&destination) {
        return Err(VmError::BadJumpDestination);
    }

    vm.state.pc = destination;
    Ok(())
}

/// JUMP - Alter the program counter
pub fn jump(vm: &mut VM) -> Result<(), VmError> {
    let destination = vm.state.stack.pop()?;
    jump_to(vm, destination)
}

/// JUMPI - Conditionally alter the program counter
pub fn jumpi(vm: &mut VM) -> Result<(), VmError> {
    let destination = vm.state.stack.pop()?;
    let condition = vm.state.stack.pop()?;

    if condition.is_zero() {
        return Ok(());
    }
    jump_to(vm, destination)
}

/// PC - Get the value of the program counter prior to the increment
pub fn pc(vm: &mut VM, pc: usize) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(pc))
}

/// GAS - Get the amount of available gas
pub fn gas(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.state.gas))
}
