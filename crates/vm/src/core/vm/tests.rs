use alloy::{
    hex,
    primitives::{keccak256, Address, Bytes, B256, U256},
};
use ferret_common::utils::strings::decode_hex;

use crate::core::{
    contract::Contract,
    error::{Query, VmError},
};

use super::{ExecutionResult, VM};

const CONTRACT: Address = Address::repeat_byte(0xaa);
const CALLEE: Address = Address::repeat_byte(0xbb);
const CALLER: Address = Address::repeat_byte(0xcc);

fn contract(bytecode: &str) -> Contract {
    Contract::new(Bytes::from(decode_hex(bytecode).expect("failed to decode bytecode")))
}

// creates a new test VM executing `bytecode` at CONTRACT.
fn new_test_vm(bytecode: &str) -> VM {
    let mut vm = VM::new();
    vm.contracts.insert(CONTRACT, contract(bytecode));
    vm.load_contract(CONTRACT).expect("contract exists");
    vm.state.gas = 10_000_000;
    vm.state.caller = CALLER;
    vm.tx.origin = CALLER;
    vm
}

// CALL(0xffff, CALLEE, 0, 0, 0, 0, 32) followed by MLOAD(0) and STOP.
fn call_callee_bytecode() -> String {
    format!("0x6020600060006000600073{}61fffff160005100", hex::encode(CALLEE))
}

fn slot(vm: &VM, address: Address, key: u64) -> Option<U256> {
    vm.contracts.get(&address)?.storage.storage.get(&U256::from(key)).copied()
}

#[test]
fn test_stop_vm() {
    let mut vm = new_test_vm("0x00");

    assert_eq!(vm.run(), ExecutionResult::Success(Bytes::new()));
    assert_eq!(vm.state.pc, 1);
}

#[test]
fn test_pc_out_of_range() {
    let mut vm = new_test_vm("0x");

    assert_eq!(vm.run(), ExecutionResult::Success(Bytes::new()));
    assert_eq!(vm.state.pc, 1);
}

#[test]
fn test_step_after_halt_is_noop() {
    let mut vm = new_test_vm("0x600100");
    vm.run();
    let gas = vm.state.gas;

    vm.step();
    assert_eq!(vm.state.pc, 3);
    assert_eq!(vm.state.gas, gas);
}

#[test]
fn test_add() {
    let mut vm = new_test_vm("0x600a600a01");
    vm.run();

    assert_eq!(vm.state.stack.peek(0), Ok(U256::from(0x14)));
}

#[test]
fn test_return() {
    let mut vm = new_test_vm("0x602a60005260206000f3");

    let mut expected = [0u8; 32];
    expected[31] = 0x2a;
    assert_eq!(vm.run(), ExecutionResult::Success(Bytes::from(expected.to_vec())));
}

#[test]
fn test_revert() {
    let mut vm = new_test_vm("0x602a60005260206000fd");

    let mut expected = [0u8; 32];
    expected[31] = 0x2a;
    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::Revert(Bytes::from(expected.to_vec()))));
}

#[test]
fn test_outermost_failure_keeps_state() {
    // SSTORE(1, 0x2a) then REVERT(0, 0)
    let mut vm = new_test_vm("0x602a60015560006000fd");

    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::Revert(Bytes::new())));
    assert_eq!(slot(&vm, CONTRACT, 1), Some(U256::from(0x2a)));
}

#[test]
fn test_jump() {
    let mut vm = new_test_vm("0x600456005b600100");

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(0), Ok(U256::from(1)));
}

#[test]
fn test_bad_jump_destination() {
    let mut vm = new_test_vm("0x60035600");
    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::BadJumpDestination));

    // 0x5b inside PUSH1 data is not a JUMPDEST
    let mut vm = new_test_vm("0x605b600156");
    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::BadJumpDestination));
}

#[test]
fn test_stack_underrun() {
    let mut vm = new_test_vm("0x01");

    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::StackUnderrun));
}

#[test]
fn test_out_of_gas() {
    let mut vm = new_test_vm("0x600160010100");
    vm.state.gas = 5;

    assert_eq!(
        vm.run(),
        ExecutionResult::Failure(VmError::OutOfGas { available: 2, needed: 3 })
    );
}

#[test]
fn test_unrecognized_opcode() {
    let mut vm = new_test_vm("0xfe");
    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::UnrecognizedOpcode(0xfe)));

    let mut vm = new_test_vm("0x0c");
    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::UnrecognizedOpcode(0x0c)));
}

#[test]
fn test_sstore_sload() {
    let mut vm = new_test_vm("0x602a600155600154");

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(0), Ok(U256::from(0x2a)));
    assert_eq!(slot(&vm, CONTRACT, 1), Some(U256::from(0x2a)));
}

#[test]
fn test_sstore_while_static() {
    let mut vm = new_test_vm("0x6001600155");
    vm.state.is_static = true;

    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::StateChangeWhileStatic));
}

#[test]
fn test_log() {
    // MSTORE(0, 0x2a) LOG1(0, 32, 0xff)
    let mut vm = new_test_vm("0x602a60005260ff60206000a100");

    assert!(vm.run().is_success());
    assert_eq!(vm.logs.len(), 1);
    assert_eq!(vm.logs[0].address, CONTRACT);
    assert_eq!(vm.logs[0].topics, vec![B256::with_last_byte(0xff)]);
    assert_eq!(vm.logs[0].data.len(), 32);
}

#[test]
fn test_nested_call_success() {
    let mut vm = new_test_vm(&call_callee_bytecode());
    // SSTORE(0, 0x2a) MSTORE(0, 0x2a) RETURN(0, 32)
    vm.contracts.insert(CALLEE, contract("0x602a600055602a60005260206000f3"));

    assert!(vm.run().is_success());
    assert_eq!(vm.depth(), 0);
    assert_eq!(vm.state.stack.peek(0), Ok(U256::from(0x2a)));
    assert_eq!(vm.state.stack.peek(1), Ok(U256::from(1)));
    assert_eq!(vm.state.returndata.len(), 32);
    assert_eq!(slot(&vm, CALLEE, 0), Some(U256::from(0x2a)));
}

#[test]
fn test_nested_call_revert_rolls_back() {
    let mut vm = new_test_vm(&call_callee_bytecode());
    // SSTORE(0, 0x2a) MSTORE(0, 0x2a) REVERT(0, 32)
    vm.contracts.insert(CALLEE, contract("0x602a600055602a60005260206000fd"));

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(0), Ok(U256::from(0x2a)));
    assert_eq!(vm.state.stack.peek(1), Ok(U256::ZERO));
    assert_eq!(vm.state.returndata.len(), 32);
    assert_eq!(slot(&vm, CALLEE, 0), None);
}

#[test]
fn test_nested_call_exceptional_halt() {
    let mut vm = new_test_vm(&call_callee_bytecode());
    vm.contracts.insert(CALLEE, contract("0xfe"));
    let gas = vm.state.gas;

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(1), Ok(U256::ZERO));
    assert!(vm.state.returndata.is_empty());

    // the forwarded gas is gone
    assert!(gas - vm.state.gas > 0xffff);
}

#[test]
fn test_call_to_account_without_code() {
    let mut vm = new_test_vm(&call_callee_bytecode());

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(1), Ok(U256::from(1)));
    assert!(vm.state.returndata.is_empty());
}

#[test]
fn test_create() {
    // init code: MSTORE8(0, 0x2a) RETURN(0, 1)
    // caller: MSTORE(0, init) CREATE(0, 22, 10)
    let mut vm = new_test_vm("0x69602a60005360016000f3600052600a60166000f000");

    assert!(vm.run().is_success());

    let created = CONTRACT.create(0);
    assert_eq!(vm.state.stack.peek(0), Ok(U256::from_be_bytes(created.into_word().0)));
    assert_eq!(vm.contracts[&CONTRACT].nonce, 1);

    let record = &vm.contracts[&created];
    assert_eq!(record.code, Bytes::from(vec![0x2a]));
    assert_eq!(record.nonce, 1);
}

#[test]
fn test_constructor_runs_under_init_codehash() {
    let mut vm = new_test_vm("0x69602a60005360016000f3600052600a60166000f000");
    while vm.depth() == 0 && vm.result.is_none() {
        vm.step();
    }

    let init_code = decode_hex("0x602a60005360016000f3").expect("failed to decode bytecode");
    let created = CONTRACT.create(0);
    assert_eq!(vm.state.code_contract, created);
    assert_eq!(vm.contracts[&created].codehash, keccak256(&init_code));
    assert!(vm.contracts[&created].code.is_empty());

    // the runtime code replaces the init code identity once deposited
    assert!(vm.run().is_success());
    assert_eq!(vm.contracts[&created].codehash, keccak256([0x2a]));
}

#[test]
fn test_selfdestruct() {
    let mut vm = new_test_vm(&format!("0x73{}ff", hex::encode(CALLEE)));
    vm.contracts.get_mut(&CONTRACT).expect("contract exists").balance = U256::from(100);

    assert!(vm.run().is_success());
    assert!(!vm.contracts.contains_key(&CONTRACT));
    assert_eq!(vm.contracts[&CALLEE].balance, U256::from(100));
}

#[test]
fn test_query_unknown_account() {
    let mut vm = new_test_vm(&format!("0x73{}3100", hex::encode(CALLEE)));
    vm.query_unknown_accounts = true;

    assert_eq!(vm.run(), ExecutionResult::Failure(VmError::Query(Query::AccountInfo(CALLEE))));
}

#[test]
fn test_unknown_account_reads_as_empty() {
    let mut vm = new_test_vm(&format!("0x73{}3100", hex::encode(CALLEE)));

    assert!(vm.run().is_success());
    assert_eq!(vm.state.stack.peek(0), Ok(U256::ZERO));
}
