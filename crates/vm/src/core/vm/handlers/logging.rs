use alloy::primitives::B256;

use crate::core::{constants::LOG_DATA_COST, error::VmError, log::Log};

use super::super::core::VM;

/// LOG0-LOG4 - Append log record with N topics
pub fn log_n(vm: &mut VM, topic_count: u8) -> Result<(), VmError> {
    if vm.state.is_static {
        return Err(VmError::StateChangeWhileStatic);
    }

    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;
    let topics = vm
        .state
        .stack
        .pop_n(topic_count as usize)?
        .into_iter()
        .map(|topic| B256::from(topic.to_be_bytes::<32>()))
        .collect();

    let (offset, size) = vm.memory_region(offset, size)?;

    // consume dynamic gas
    vm.consume_gas(LOG_DATA_COST * size as u64)?;

    let data = vm.state.memory.read(offset, size);
    vm.logs.push(Log::new(vm.state.contract, topics, &data));
    Ok(())
}
