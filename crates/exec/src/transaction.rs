use alloy::primitives::{Address, Bytes, U256};
use ferret_vm::{Contract, FrameState, TxContext, VM};
use tracing::debug;

use crate::{core::execute::MAX_GAS, error::Error};

/// What a [`Transaction`] does at its destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxCall {
    /// Call the contract at the destination with the given calldata.
    Call(Bytes),

    /// Deploy the given init code at the destination.
    Create(Bytes),
}

/// A transaction as produced by the fuzzer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// The call or creation to perform.
    pub call: TxCall,

    /// The externally owned account sending the transaction.
    pub sender: Address,

    /// The called contract, or where a creation deploys to.
    pub dst: Address,

    /// The transaction's gas limit.
    pub gas: u64,

    /// The transaction's gas price.
    pub gas_price: U256,

    /// The value sent, in wei.
    pub value: U256,

    /// How far the block advances before the transaction, as `(seconds, blocks)`.
    pub delay: (u64, u64),
}

impl Transaction {
    /// A call from `sender` to `dst` with `calldata`, no value, no delay and [`MAX_GAS`].
    pub fn call(sender: Address, dst: Address, calldata: Bytes) -> Self {
        Transaction {
            call: TxCall::Call(calldata),
            sender,
            dst,
            gas: MAX_GAS,
            gas_price: U256::ZERO,
            value: U256::ZERO,
            delay: (0, 0),
        }
    }

    /// A deployment of `init_code` by `sender` at `dst`, no value, no delay and [`MAX_GAS`].
    pub fn create(sender: Address, dst: Address, init_code: Bytes) -> Self {
        Transaction {
            call: TxCall::Create(init_code),
            ..Transaction::call(sender, dst, Bytes::new())
        }
    }

    /// Whether this transaction deploys a contract.
    pub fn is_create(&self) -> bool {
        matches!(self.call, TxCall::Create(_))
    }
}

/// Prepares `vm` to execute `tx` from its first instruction.
///
/// Resets the frame and the result slot, advances the block by the transaction's delay, charges
/// the sender and then installs (for a creation) or credits (for a call) the destination before
/// loading it as the executing contract. The frame's gas is `min(tx.gas, gas_limit)`.
///
/// Nothing is modified if the sender cannot pay `tx.value`.
pub fn setup_tx(vm: &mut VM, gas_limit: u64, tx: &Transaction) -> Result<(), Error> {
    let balance =
        vm.contracts.get(&tx.sender).map(|sender| sender.balance).unwrap_or_default();
    if balance < tx.value {
        return Err(Error::InsufficientBalance { sender: tx.sender, balance, value: tx.value });
    }

    debug!(
        sender = %tx.sender,
        dst = %tx.dst,
        value = %tx.value,
        create = tx.is_create(),
        "setting up transaction"
    );

    vm.result = None;
    vm.frames.clear();
    vm.logs.clear();
    vm.state = FrameState::new(tx.gas.min(gas_limit));
    vm.state.caller = tx.sender;
    vm.state.callvalue = tx.value;
    vm.tx = TxContext { origin: tx.sender, gas_price: tx.gas_price };

    let (seconds, blocks) = tx.delay;
    vm.block.timestamp = vm.block.timestamp.saturating_add(seconds);
    vm.block.number = vm.block.number.saturating_add(blocks);

    vm.clear_transaction_state();
    vm.accessed_addresses.insert(tx.sender);

    let sender = vm.contracts.entry(tx.sender).or_default();
    sender.balance -= tx.value;
    sender.nonce = sender.nonce.saturating_add(1);

    match &tx.call {
        TxCall::Create(init_code) => {
            let mut contract = Contract::new(init_code.clone());
            contract.balance = tx.value;
            vm.contracts.insert(tx.dst, contract);
        }
        TxCall::Call(calldata) => {
            let recipient = vm.contracts.entry(tx.dst).or_default();
            recipient.balance = recipient.balance.saturating_add(tx.value);
            vm.state.calldata = calldata.clone();
        }
    }

    vm.load_contract(tx.dst).map_err(|_| Error::MissingContract(tx.dst))
}

#[cfg(test)]
mod tests {
    use ferret_vm::ExecutionResult;

    use super::*;

    const SENDER: Address = Address::repeat_byte(0x10);
    const TARGET: Address = Address::repeat_byte(0x20);

    fn funded_vm(balance: u64) -> VM {
        let mut vm = VM::new();
        let mut sender = Contract::default();
        sender.balance = U256::from(balance);
        vm.contracts.insert(SENDER, sender);
        vm
    }

    #[test]
    fn test_setup_call() {
        let mut vm = funded_vm(100);
        vm.contracts.insert(TARGET, Contract::new(Bytes::from(vec![0x00])));
        vm.result = Some(ExecutionResult::Success(Bytes::new()));

        let mut tx = Transaction::call(SENDER, TARGET, Bytes::from(vec![0xaa, 0xbb]));
        tx.value = U256::from(40);
        tx.delay = (12, 1);
        setup_tx(&mut vm, 1_000, &tx).expect("sender can pay");

        assert!(vm.result.is_none());
        assert_eq!(vm.state.gas, 1_000);
        assert_eq!(vm.state.contract, TARGET);
        assert_eq!(vm.state.caller, SENDER);
        assert_eq!(vm.state.calldata, Bytes::from(vec![0xaa, 0xbb]));
        assert_eq!(vm.tx.origin, SENDER);
        assert_eq!((vm.block.timestamp, vm.block.number), (12, 1));
        assert_eq!(vm.contracts[&SENDER].balance, U256::from(60));
        assert_eq!(vm.contracts[&SENDER].nonce, 1);
        assert_eq!(vm.contracts[&TARGET].balance, U256::from(40));
    }

    #[test]
    fn test_setup_create() {
        let mut vm = funded_vm(0);
        vm.contracts.insert(TARGET, Contract::new(Bytes::from(vec![0xfe])));

        let init_code = Bytes::from(vec![0x60, 0x00]);
        let tx = Transaction::create(SENDER, TARGET, init_code.clone());
        setup_tx(&mut vm, MAX_GAS, &tx).expect("sender can pay");

        assert_eq!(vm.contracts[&TARGET].code, init_code);
        assert_eq!(vm.state.code, init_code);
        assert!(vm.state.calldata.is_empty());
    }

    #[test]
    fn test_setup_gas_is_capped() {
        let mut vm = funded_vm(0);

        let mut tx = Transaction::call(SENDER, TARGET, Bytes::new());
        tx.gas = 500;
        setup_tx(&mut vm, 1_000, &tx).expect("sender can pay");

        assert_eq!(vm.state.gas, 500);
    }

    #[test]
    fn test_setup_insufficient_balance() {
        let mut vm = funded_vm(10);

        let mut tx = Transaction::call(SENDER, TARGET, Bytes::new());
        tx.value = U256::from(11);
        let result = setup_tx(&mut vm, MAX_GAS, &tx);

        assert!(matches!(result, Err(Error::InsufficientBalance { .. })));
        assert_eq!(vm.contracts[&SENDER].nonce, 0);
        assert!(!vm.contracts.contains_key(&TARGET));
    }
}
