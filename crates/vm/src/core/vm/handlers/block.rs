use alloy::primitives::{keccak256, U256};

use crate::core::error::VmError;

use super::super::core::VM;

/// BLOCKHASH - Get the hash of one of the 256 most recent blocks. Hashes are derived from the
/// block number, since the machine keeps no chain history.
pub fn blockhash(vm: &mut VM) -> Result<(), VmError> {
    let requested = vm.state.stack.pop()?;
    let current = U256::from(vm.block.number);

    let result = if requested < current && current - requested <= U256::from(256) {
        U256::from_be_bytes(keccak256(requested.to_be_bytes::<32>()).0)
    } else {
        U256::ZERO
    };
    vm.state.stack.push(result)
}

/// COINBASE - Get the block's beneficiary address
pub fn coinbase(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(VM::address_to_u256(&vm.block.coinbase))
}

/// TIMESTAMP - Get the block's timestamp
pub fn timestamp(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.block.timestamp))
}

/// NUMBER - Get the block's number
pub fn number(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.block.number))
}

/// PREVRANDAO - Get the beacon chain randomness value
pub fn prevrandao(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from_be_bytes(vm.block.prev_randao.0))
}

/// GASLIMIT - Get the block's gas limit
pub fn gaslimit(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.block.gas_limit))
}

/// CHAINID - Get the chain id
pub fn chainid(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(vm.block.chain_id))
}

/// SELFBALANCE - Get balance of currently executing account
pub fn selfbalance(vm: &mut VM) -> Result<(), VmError> {
    let balance = vm.current_contract().map(|contract| contract.balance).unwrap_or_default();
    vm.state.stack.push(balance)
}

/// BASEFEE - Get the block's base fee
pub fn basefee(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(vm.block.base_fee)
}

/// BLOBHASH - Get a versioned blob hash of the transaction. Transactions carry no blobs.
pub fn blobhash(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.pop()?;
    vm.state.stack.push(U256::ZERO)
}

/// BLOBBASEFEE - Get the blob base fee, fixed at the protocol minimum
pub fn blobbasefee(vm: &mut VM) -> Result<(), VmError> {
    vm.state.stack.push(U256::from(1))
}
