use alloy::primitives::{keccak256, Address, Bytes, U256};

use crate::core::{
    constants::{
        CALL_DEPTH_LIMIT, CALL_STIPEND, CALL_VALUE_TRANSFER_COST, KECCAK_WORD_COST,
        SELFDESTRUCT_COLD_SURCHARGE,
    },
    error::VmError,
};

use super::super::{
    core::VM,
    execution::{FrameKind, FrameState},
};

/// The flavours of message call, which differ in whose storage and value the callee sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallScheme {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// Gas left after withholding one 64th of `gas`.
fn all_but_one_64th(gas: u64) -> u64 {
    gas - gas / 64
}

/// Shared implementation of the CALL family.
fn message_call(vm: &mut VM, scheme: CallScheme) -> Result<(), VmError> {
    let requested_gas = vm.state.stack.pop()?;
    let target = VM::u256_to_address(vm.state.stack.pop()?);
    let value = match scheme {
        CallScheme::Call | CallScheme::CallCode => vm.state.stack.pop()?,
        CallScheme::DelegateCall | CallScheme::StaticCall => U256::ZERO,
    };
    let args_offset = vm.state.stack.pop()?;
    let args_size = vm.state.stack.pop()?;
    let ret_offset = vm.state.stack.pop()?;
    let ret_size = vm.state.stack.pop()?;

    if scheme == CallScheme::Call && vm.state.is_static && !value.is_zero() {
        return Err(VmError::StateChangeWhileStatic);
    }

    let (args_offset, args_size) = vm.memory_region(args_offset, args_size)?;
    let (ret_offset, ret_size) = vm.memory_region(ret_offset, ret_size)?;

    // consume dynamic gas
    let mut cost = vm.access_account(target);
    if !value.is_zero() {
        cost += CALL_VALUE_TRANSFER_COST;
    }
    vm.consume_gas(cost)?;

    let code = vm.account(target)?.map(|contract| contract.code.clone()).unwrap_or_default();

    let forwarded =
        u64::try_from(requested_gas).unwrap_or(u64::MAX).min(all_but_one_64th(vm.state.gas));
    vm.consume_gas(forwarded)?;
    let callee_gas =
        if value.is_zero() { forwarded } else { forwarded.saturating_add(CALL_STIPEND) };

    vm.state.returndata = Bytes::new();
    let input = Bytes::from(vm.state.memory.read(args_offset, args_size));

    let current = vm.state.contract;
    let (contract, caller, callvalue) = match scheme {
        CallScheme::Call | CallScheme::StaticCall => (target, current, value),
        CallScheme::CallCode => (current, current, value),
        CallScheme::DelegateCall => (current, vm.state.caller, vm.state.callvalue),
    };

    // value moves from the current contract to the callee's storage context
    let reversion = vm.contracts.clone();
    if vm.depth() >= CALL_DEPTH_LIMIT || !vm.transfer(current, contract, value) {
        vm.state.gas += forwarded;
        return vm.state.stack.push(U256::ZERO);
    }

    if code.is_empty() {
        vm.state.gas = vm.state.gas.saturating_add(callee_gas);
        return vm.state.stack.push(U256::from(1));
    }

    let mut callee = FrameState::new(callee_gas);
    callee.contract = contract;
    callee.code_contract = target;
    callee.set_code(code);
    callee.calldata = input;
    callee.callvalue = callvalue;
    callee.caller = caller;
    callee.is_static = vm.state.is_static || scheme == CallScheme::StaticCall;

    vm.enter_frame(callee, FrameKind::Call { ret_offset, ret_size }, reversion);
    Ok(())
}

/// Shared implementation of CREATE and CREATE2.
fn create_contract(vm: &mut VM, with_salt: bool) -> Result<(), VmError> {
    if vm.state.is_static {
        return Err(VmError::StateChangeWhileStatic);
    }

    let value = vm.state.stack.pop()?;
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;
    let salt = if with_salt { Some(vm.state.stack.pop()?) } else { None };

    let (offset, size) = vm.memory_region(offset, size)?;
    if salt.is_some() {
        // CREATE2 hashes the init code
        vm.consume_gas(KECCAK_WORD_COST * size.div_ceil(32) as u64)?;
    }

    let init_code = Bytes::from(vm.state.memory.read(offset, size));
    vm.state.returndata = Bytes::new();

    let creator = vm.state.contract;
    let (balance, nonce) = vm
        .current_contract()
        .map(|contract| (contract.balance, contract.nonce))
        .unwrap_or_default();
    if vm.depth() >= CALL_DEPTH_LIMIT || balance < value || nonce == u64::MAX {
        return vm.state.stack.push(U256::ZERO);
    }

    let address: Address = match salt {
        Some(salt) => creator.create2_from_code(salt.to_be_bytes::<32>(), &init_code),
        None => creator.create(nonce),
    };

    vm.contracts.entry(creator).or_default().nonce += 1;
    vm.access_account(address);

    let forwarded = all_but_one_64th(vm.state.gas);
    vm.consume_gas(forwarded)?;

    let collision = vm
        .contracts
        .get(&address)
        .is_some_and(|existing| existing.nonce != 0 || !existing.is_empty_code());
    if collision {
        return vm.state.stack.push(U256::ZERO);
    }

    let reversion = vm.contracts.clone();
    let account = vm.contracts.entry(address).or_default();
    account.nonce = 1;
    // identifies the init code until the runtime code is deposited
    account.codehash = keccak256(&init_code);
    if !vm.transfer(creator, address, value) {
        vm.contracts = reversion;
        vm.state.gas += forwarded;
        return vm.state.stack.push(U256::ZERO);
    }

    let mut callee = FrameState::new(forwarded);
    callee.contract = address;
    callee.code_contract = address;
    callee.set_code(init_code);
    callee.callvalue = value;
    callee.caller = creator;

    vm.enter_frame(callee, FrameKind::Create { address }, reversion);
    Ok(())
}

/// Reads the `offset`, `size` memory region named by the top two stack items.
fn pop_output(vm: &mut VM) -> Result<Bytes, VmError> {
    let offset = vm.state.stack.pop()?;
    let size = vm.state.stack.pop()?;

    let (offset, size) = vm.memory_region(offset, size)?;
    Ok(Bytes::from(vm.state.memory.read(offset, size)))
}

/// CREATE - Create a new account with associated code
pub fn create(vm: &mut VM) -> Result<(), VmError> {
    create_contract(vm, false)
}

/// CALL - Message-call into an account
pub fn call(vm: &mut VM) -> Result<(), VmError> {
    message_call(vm, CallScheme::Call)
}

/// CALLCODE - Message-call into this account with an alternative account's code
pub fn callcode(vm: &mut VM) -> Result<(), VmError> {
    message_call(vm, CallScheme::CallCode)
}

/// RETURN - Halt execution returning output data
pub fn op_return(vm: &mut VM) -> Result<(), VmError> {
    let output = pop_output(vm)?;
    vm.halt(Ok(output));
    Ok(())
}

/// DELEGATECALL - Message-call into this account with an alternative account's code, but
/// persisting the current values for sender and value
pub fn delegatecall(vm: &mut VM) -> Result<(), VmError> {
    message_call(vm, CallScheme::DelegateCall)
}

/// CREATE2 - Create a new account with associated code at a predictable address
pub fn create2(vm: &mut VM) -> Result<(), VmError> {
    create_contract(vm, true)
}

/// STATICCALL - Static message-call into an account
pub fn staticcall(vm: &mut VM) -> Result<(), VmError> {
    message_call(vm, CallScheme::StaticCall)
}

/// REVERT - Halt execution reverting state changes but returning data and remaining gas
pub fn revert(vm: &mut VM) -> Result<(), VmError> {
    let output = pop_output(vm)?;
    vm.halt(Err(VmError::Revert(output)));
    Ok(())
}

/// SELFDESTRUCT - Halt execution and remove the account, sending its balance to the
/// beneficiary. A contract that names itself as beneficiary burns its balance.
pub fn selfdestruct(vm: &mut VM) -> Result<(), VmError> {
    if vm.state.is_static {
        return Err(VmError::StateChangeWhileStatic);
    }

    let beneficiary = VM::u256_to_address(vm.state.stack.pop()?);

    // consume dynamic gas
    if vm.access_account(beneficiary) != 0 {
        vm.consume_gas(SELFDESTRUCT_COLD_SURCHARGE)?;
    }

    let contract = vm.state.contract;
    let balance = vm.contracts.remove(&contract).map(|record| record.balance).unwrap_or_default();
    if beneficiary != contract && !balance.is_zero() {
        let recipient = vm.contracts.entry(beneficiary).or_default();
        recipient.balance = recipient.balance.saturating_add(balance);
    }

    vm.halt(Ok(Bytes::new()));
    Ok(())
}
