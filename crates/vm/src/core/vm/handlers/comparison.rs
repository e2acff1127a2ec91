use alloy::primitives::U256;
use ferret_common::utils::strings::sign_uint;

use crate::core::error::VmError;

use super::super::core::VM;

fn push_boolean(vm: &mut VM, condition: bool) -> Result<(), VmError> {
    vm.state.stack.push(if condition { U256::from(1u8) } else { U256::ZERO })
}

/// LT - Less than comparison
pub fn lt(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    push_boolean(vm, a < b)
}

/// GT - Greater than comparison
pub fn gt(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    push_boolean(vm, a > b)
}

/// SLT - Signed less than comparison
pub fn slt(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    push_boolean(vm, sign_uint(a) < sign_uint(b))
}

/// SGT - Signed greater than comparison
pub fn sgt(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    push_boolean(vm, sign_uint(a) > sign_uint(b))
}

/// EQ - Equality comparison
pub fn eq(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    push_boolean(vm, a == b)
}

/// ISZERO - Check if zero
pub fn iszero(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    push_boolean(vm, a.is_zero())
}
