use alloy::primitives::U256;

use crate::core::{
    error::VmError,
    opcodes::{self, immediate_size},
};

use super::super::core::VM;

/// POP - Remove item from stack
pub fn pop(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.pop()?;
    Ok(())
}

/// PUSH0 - Push 0 onto stack
pub fn push0(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::ZERO)
}

/// PUSH1-PUSH32 - Push N bytes onto stack. Immediates cut off by the end of the code are
/// zero-filled on the right.
pub fn push_n(vm: &mut VM, opcode: u8, pc: usize) -> Result<(), VmError> {
    let num_bytes = immediate_size(opcode);

    let code = &vm.state.code;
    let start = (pc + 1).min(code.len());
    let end = (pc + 1 + num_bytes).min(code.len());

    let mut bytes = vec![0u8; num_bytes];
    bytes[..end - start].copy_from_slice(&code[start..end]);

    vm.state.pc = pc + 1 + num_bytes;
    vm.state.stack.push(U256::from_be_slice(&bytes))
}

/// DUP1-DUP16 - Duplicate Nth stack item
pub fn dup_n(vm: &mut VM, opcode: u8) -> Result<(), VmError> {
    let index = opcode - opcodes::DUP1 + 1;
    vm.state.stack.dup(index as usize)
}

/// SWAP1-SWAP16 - Exchange 1st and Nth stack items
pub fn swap_n(vm: &mut VM, opcode: u8) -> Result<(), VmError> {
    let index = opcode - opcodes::SWAP1 + 1;
    vm.state.stack.swap(index as usize)
}
