use alloy::primitives::U256;

use crate::core::error::VmError;

use super::super::core::VM;

/// AND - Bitwise AND operation
pub fn and(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a & b)
}

/// OR - Bitwise OR operation
pub fn or(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a | b)
}

/// XOR - Bitwise XOR operation
pub fn xor(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a ^ b)
}

/// NOT - Bitwise NOT operation
pub fn not(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    vm.state.stack.push(!a)
}

/// BYTE - Retrieve single byte from word
pub fn byte(vm: &mut VM) -> Result<(), VmError> {
    let i = vm.state.stack.pop()?;
    let word = vm.state.stack.pop()?;
    let result = if i >= U256::from(32u32) {
        U256::ZERO
    } else {
        U256::from(word.to_be_bytes::<32>()[i.to::<usize>()])
    };
    vm.state.stack.push(result)
}

/// SHL - Shift left operation
pub fn shl(vm: &mut VM) -> Result<(), VmError> {
    let shift = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    let result =
        if shift > U256::from(255u8) { U256::ZERO } else { value << shift.to::<usize>() };
    vm.state.stack.push(result)
}

/// SHR - Shift right operation
pub fn shr(vm: &mut VM) -> Result<(), VmError> {
    let shift = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    let result =
        if shift > U256::from(255u8) { U256::ZERO } else { value >> shift.to::<usize>() };
    vm.state.stack.push(result)
}

/// SAR - Arithmetic shift right operation
pub fn sar(vm: &mut VM) -> Result<(), VmError> {
    let shift = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    let negative = value.bit(255);

    let result = if shift > U256::from(255u8) {
        if negative {
            U256::MAX
        } else {
            U256::ZERO
        }
    } else if negative {
        !(!value >> shift.to::<usize>())
    } else {
        value >> shift.to::<usize>()
    };
    vm.state.stack.push(result)
}
