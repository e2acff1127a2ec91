use alloy::primitives::U256;

use crate::core::{constants::COPY_WORD_COST, error::VmError};

use super::super::core::VM;

/// MLOAD - Load word from memory
pub fn mload(vm: &mut VM) -> Result<(), VmError> {
    let offset = vm.state.stack.pop()?;
    let (offset, _) = vm.memory_region(offset, U256::from(32))?;

    let result = U256::from_be_slice(&vm.state.memory.read(offset, 32));
    vm.state.stack.push(result)
}

/// MSTORE - Save word to memory
pub fn mstore(vm: &mut VM) -> Result<(), VmError> {
    let offset = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    let (offset, _) = vm.memory_region(offset, U256::from(32))?;

    vm.state.memory.store(offset, 32, &value.to_be_bytes::<32>());
    Ok(())
}

/// MSTORE8 - Save byte to memory
pub fn mstore8(vm: &mut VM) -> Result<(), VmError> {
    let offset = vm.state.stack.pop()?;
    let value = vm.state.stack.pop()?;
    let (offset, _) = vm.memory_region(offset, U256::from(1))?;

    vm.state.memory.store(offset, 1, &[value.to_be_bytes::<32>()[31]]);
    Ok(())
}

/// MSIZE - Get the size of active memory in bytes
pub fn msize(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.state.memory.size()))
}

/// MCOPY - Copy memory areas
pub fn mcopy(vm: &mut VM) -> Result<(), VmError> {
    let dest_offset = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    let (offset, size) = vm.memory_region(offset, size)?;
    let (dest_offset, _) = vm.memory_region(dest_offset, U256::from(size))?;

    // consume dynamic gas
    vm.consume_gas(COPY_WORD_COST * size.div_ceil(32) as u64)?;

    vm.state.memory.copy_within(offset, dest_offset, size);
    Ok(())
}
