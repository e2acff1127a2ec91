use alloy::primitives::{keccak256, U256};

use crate::core::{constants::KECCAK_WORD_COST, error::VmError};

use super::super::core::VM;

/// SHA3 - Compute Keccak-256 hash
pub fn sha3(vm: &mut VM) -> Result<(), VmError> {
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;
    let (offset, size) = vm.memory_region(offset, size)?;

    // consume dynamic gas
    vm.consume_gas(KECCAK_WORD_COST * size.div_ceil(32) as u64)?;

    let data = vm.state.memory.read(offset, size);
    vm.state.stack.push(U256::from_be_bytes(keccak256(data).0))
}
