use alloy::primitives::{Address, Bytes, B256, U256};
use hashbrown::{HashMap, HashSet};

#[cfg(feature = "step-tracing")]
use tracing::trace;

use crate::core::{
    constants::{COLD_ACCOUNT_ACCESS_SURCHARGE, MAX_MEMORY_SIZE, STACK_LIMIT},
    contract::Contract,
    env::{Block, TxContext},
    error::{Query, VmError},
    log::Log,
    opcodes::{self, OpCodeInfo},
};

use super::{
    execution::{ExecutionResult, Frame, FrameState},
    handlers,
};

/// The [`VM`] struct represents an EVM instance. \
/// It holds every account record, the currently executing frame and its suspended callers, and
/// the terminal result slot which is `None` while the transaction is still running.
#[derive(Clone, Debug, Default)]
pub struct VM {
    /// Account records, keyed by address.
    pub contracts: HashMap<Address, Contract>,

    /// The currently executing frame.
    pub state: FrameState,

    /// Suspended caller frames, outermost first. The call depth is `frames.len()`.
    pub frames: Vec<Frame>,

    /// The outcome of the transaction, once the outermost frame has halted.
    pub result: Option<ExecutionResult>,

    /// The block the machine executes in.
    pub block: Block,

    /// The current transaction's context.
    pub tx: TxContext,

    /// The events (logs) emitted during execution.
    pub logs: Vec<Log>,

    /// When set, touching an account with no record fails with [`VmError::Query`] instead of
    /// treating it as empty.
    pub query_unknown_accounts: bool,

    /// Addresses accessed in the current transaction (used for gas calculation).
    pub accessed_addresses: HashSet<Address>,
}

impl VM {
    /// Creates a new [`VM`] with no accounts and a default block.
    ///
    /// ```
    /// use ferret_vm::VM;
    ///
    /// let vm = VM::new();
    /// assert!(vm.contracts.is_empty());
    /// assert!(vm.result.is_none());
    /// ```
    pub fn new() -> VM {
        VM::default()
    }

    /// Makes `address` the executing contract, loading its code into the current frame.
    ///
    /// ```
    /// use ferret_vm::{Contract, VmError, VM};
    /// use alloy::primitives::{Address, Bytes};
    ///
    /// let mut vm = VM::new();
    /// let address = Address::repeat_byte(0x11);
    /// assert_eq!(vm.load_contract(address), Err(VmError::NoSuchContract(address)));
    ///
    /// vm.contracts.insert(address, Contract::new(Bytes::from(vec![0x5b, 0x00])));
    /// vm.load_contract(address).expect("contract exists");
    /// assert_eq!(vm.state.contract, address);
    /// assert_eq!(vm.state.code.len(), 2);
    /// ```
    pub fn load_contract(&mut self, address: Address) -> Result<(), VmError> {
        let code =
            self.contracts.get(&address).ok_or(VmError::NoSuchContract(address))?.code.clone();

        self.state.contract = address;
        self.state.code_contract = address;
        self.state.set_code(code);
        self.accessed_addresses.insert(address);
        Ok(())
    }

    /// Returns the record of the currently executing contract, if it has one.
    pub fn current_contract(&self) -> Option<&Contract> {
        self.contracts.get(&self.state.contract)
    }

    /// The current call depth. Zero while the outermost frame executes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Forgets everything scoped to a single transaction: transient storage and warm
    /// slots and addresses.
    pub fn clear_transaction_state(&mut self) {
        self.accessed_addresses.clear();
        self.contracts.values_mut().for_each(|contract| contract.storage.clear_transaction_state());
    }

    /// Executes exactly one instruction of the current frame. Does nothing once
    /// [`VM::result`] is set.
    ///
    /// ```
    /// use ferret_vm::{Contract, ExecutionResult, VM};
    /// use alloy::primitives::{Address, Bytes};
    ///
    /// let mut vm = VM::new();
    /// vm.contracts.insert(Address::ZERO, Contract::new(Bytes::from(vec![0x5b, 0x00])));
    /// vm.load_contract(Address::ZERO).expect("contract exists");
    /// vm.state.gas = 100;
    ///
    /// vm.step(); // JUMPDEST
    /// assert_eq!(vm.state.pc, 1);
    /// assert!(vm.result.is_none());
    ///
    /// vm.step(); // STOP
    /// assert_eq!(vm.state.pc, 2);
    /// assert_eq!(vm.result, Some(ExecutionResult::Success(Bytes::new())));
    /// ```
    pub fn step(&mut self) {
        if self.result.is_some() {
            return;
        }

        if let Err(error) = self.execute_next() {
            self.halt(Err(error));
        }
    }

    /// Steps until the transaction has a result, and returns it.
    pub fn run(&mut self) -> ExecutionResult {
        loop {
            if let Some(result) = &self.result {
                return result.clone();
            }
            self.step();
        }
    }

    /// Consume gas units from the current frame, failing if not enough is left.
    pub fn consume_gas(&mut self, amount: u64) -> Result<(), VmError> {
        if amount > self.state.gas {
            return Err(VmError::OutOfGas { available: self.state.gas, needed: amount });
        }

        self.state.gas -= amount;
        Ok(())
    }

    /// Returns the record at `address`, honouring [`VM::query_unknown_accounts`].
    pub(crate) fn account(&self, address: Address) -> Result<Option<&Contract>, VmError> {
        match self.contracts.get(&address) {
            Some(contract) => Ok(Some(contract)),
            None if self.query_unknown_accounts => {
                Err(VmError::Query(Query::AccountInfo(address)))
            }
            None => Ok(None),
        }
    }

    /// Marks `address` as accessed, returning the cold access surcharge if it was not yet warm.
    pub(crate) fn access_account(&mut self, address: Address) -> u64 {
        if self.accessed_addresses.insert(address) {
            COLD_ACCOUNT_ACCESS_SURCHARGE
        } else {
            0
        }
    }

    /// Moves `value` wei from `from` to `to`, creating `to` if needed. Returns `false` without
    /// changing anything if `from` cannot cover it.
    pub(crate) fn transfer(&mut self, from: Address, to: Address, value: U256) -> bool {
        let balance = self.contracts.get(&from).map(|c| c.balance).unwrap_or_default();
        if balance < value {
            return false;
        }
        if value.is_zero() || from == to {
            return true;
        }

        self.contracts.entry(from).or_default().balance -= value;
        let recipient = self.contracts.entry(to).or_default();
        recipient.balance = recipient.balance.saturating_add(value);
        true
    }

    /// Validates the memory range `offset..offset + size`, charges its expansion cost and
    /// extends memory to cover it. A zero `size` touches nothing and yields `(0, 0)`.
    pub(crate) fn memory_region(
        &mut self,
        offset: U256,
        size: U256,
    ) -> Result<(usize, usize), VmError> {
        if size.is_zero() {
            return Ok((0, 0));
        }

        let offset = u64::try_from(offset).map_err(|_| VmError::IllegalOverflow)?;
        let size = u64::try_from(size).map_err(|_| VmError::IllegalOverflow)?;
        if offset.checked_add(size).filter(|end| *end <= MAX_MEMORY_SIZE).is_none() {
            return Err(VmError::IllegalOverflow);
        }

        let (offset, size) = (offset as usize, size as usize);
        self.consume_gas(self.state.memory.expansion_cost(offset, size))?;
        self.state.memory.extend(offset, size);
        Ok((offset, size))
    }

    /// Convert an address to U256
    pub(crate) fn address_to_u256(address: &Address) -> U256 {
        U256::from_be_bytes(address.into_word().0)
    }

    /// Convert the low 20 bytes of a word to an address
    pub(crate) fn u256_to_address(value: U256) -> Address {
        Address::from_word(B256::from(value.to_be_bytes::<32>()))
    }

    /// Safely copy data from source with bounds checking, zero-padding past the end
    pub(crate) fn safe_copy_data(source: &[u8], offset: usize, size: usize) -> Vec<u8> {
        let end_offset = offset.saturating_add(size).min(source.len());
        let mut value = source.get(offset..end_offset).unwrap_or(&[]).to_owned();
        if value.len() < size {
            value.resize(size, 0u8);
        }
        value
    }

    /// Executes the next instruction in the current frame. Any error ends the frame.
    fn execute_next(&mut self) -> Result<(), VmError> {
        let pc = self.state.pc;

        // reading past the end of the code is an implicit STOP
        let opcode = self.state.code.get(pc).copied().unwrap_or(opcodes::STOP);
        self.state.pc = pc + 1;

        let info = OpCodeInfo::get(opcode).ok_or(VmError::UnrecognizedOpcode(opcode))?;

        #[cfg(feature = "step-tracing")]
        trace!(
            pc,
            opcode = info.name(),
            stack = self.state.stack.size(),
            gas = self.state.gas,
            depth = self.frames.len(),
            "executing opcode"
        );

        let (inputs, outputs) = (info.inputs() as usize, info.outputs() as usize);
        let stack_size = self.state.stack.size();
        if stack_size < inputs {
            return Err(VmError::StackUnderrun);
        }
        if stack_size - inputs + outputs > STACK_LIMIT {
            return Err(VmError::StackLimitExceeded);
        }

        self.consume_gas(info.min_gas() as u64)?;

        match opcode {
            opcodes::STOP => handlers::control::stop(self),

            opcodes::ADD => handlers::arithmetic::add(self),
            opcodes::MUL => handlers::arithmetic::mul(self),
            opcodes::SUB => handlers::arithmetic::sub(self),
            opcodes::DIV => handlers::arithmetic::div(self),
            opcodes::SDIV => handlers::arithmetic::sdiv(self),
            opcodes::MOD => handlers::arithmetic::modulo(self),
            opcodes::SMOD => handlers::arithmetic::smod(self),
            opcodes::ADDMOD => handlers::arithmetic::addmod(self),
            opcodes::MULMOD => handlers::arithmetic::mulmod(self),
            opcodes::EXP => handlers::arithmetic::exp(self),
            opcodes::SIGNEXTEND => handlers::arithmetic::signextend(self),

            opcodes::LT => handlers::comparison::lt(self),
            opcodes::GT => handlers::comparison::gt(self),
            opcodes::SLT => handlers::comparison::slt(self),
            opcodes::SGT => handlers::comparison::sgt(self),
            opcodes::EQ => handlers::comparison::eq(self),
            opcodes::ISZERO => handlers::comparison::iszero(self),

            opcodes::AND => handlers::bitwise::and(self),
            opcodes::OR => handlers::bitwise::or(self),
            opcodes::XOR => handlers::bitwise::xor(self),
            opcodes::NOT => handlers::bitwise::not(self),
            opcodes::BYTE => handlers::bitwise::byte(self),
            opcodes::SHL => handlers::bitwise::shl(self),
            opcodes::SHR => handlers::bitwise::shr(self),
            opcodes::SAR => handlers::bitwise::sar(self),

            opcodes::SHA3 => handlers::crypto::sha3(self),

            opcodes::ADDRESS => handlers::environment::address(self),
            opcodes::BALANCE => handlers::environment::balance(self),
            opcodes::ORIGIN => handlers::environment::origin(self),
            opcodes::CALLER => handlers::environment::caller(self),
            opcodes::CALLVALUE => handlers::environment::callvalue(self),
            opcodes::CALLDATALOAD => handlers::environment::calldataload(self),
            opcodes::CALLDATASIZE => handlers::environment::calldatasize(self),
            opcodes::CALLDATACOPY => handlers::environment::calldatacopy(self),
            opcodes::CODESIZE => handlers::environment::codesize(self),
            opcodes::CODECOPY => handlers::environment::codecopy(self),
            opcodes::GASPRICE => handlers::environment::gasprice(self),
            opcodes::EXTCODESIZE => handlers::environment::extcodesize(self),
            opcodes::EXTCODECOPY => handlers::environment::extcodecopy(self),
            opcodes::RETURNDATASIZE => handlers::environment::returndatasize(self),
            opcodes::RETURNDATACOPY => handlers::environment::returndatacopy(self),
            opcodes::EXTCODEHASH => handlers::environment::extcodehash(self),

            opcodes::BLOCKHASH => handlers::block::blockhash(self),
            opcodes::COINBASE => handlers::block::coinbase(self),
            opcodes::TIMESTAMP => handlers::block::timestamp(self),
            opcodes::NUMBER => handlers::block::number(self),
            opcodes::PREVRANDAO => handlers::block::prevrandao(self),
            opcodes::GASLIMIT => handlers::block::gaslimit(self),
            opcodes::CHAINID => handlers::block::chainid(self),
            opcodes::SELFBALANCE => handlers::block::selfbalance(self),
            opcodes::BASEFEE => handlers::block::basefee(self),
            opcodes::BLOBHASH => handlers::block::blobhash(self),
            opcodes::BLOBBASEFEE => handlers::block::blobbasefee(self),

            opcodes::POP => handlers::stack::pop(self),
            opcodes::MLOAD => handlers::memory::mload(self),
            opcodes::MSTORE => handlers::memory::mstore(self),
            opcodes::MSTORE8 => handlers::memory::mstore8(self),
            opcodes::SLOAD => handlers::storage::sload(self),
            opcodes::SSTORE => handlers::storage::sstore(self),
            opcodes::JUMP => handlers::control::jump(self),
            opcodes::JUMPI => handlers::control::jumpi(self),
            opcodes::PC => handlers::control::pc(self, pc),
            opcodes::MSIZE => handlers::memory::msize(self),
            opcodes::GAS => handlers::control::gas(self),
            opcodes::JUMPDEST => Ok(()),
            opcodes::TLOAD => handlers::storage::tload(self),
            opcodes::TSTORE => handlers::storage::tstore(self),
            opcodes::MCOPY => handlers::memory::mcopy(self),

            opcodes::PUSH0 => handlers::stack::push0(self),
            (opcodes::PUSH1..=opcodes::PUSH32) => handlers::stack::push_n(self, opcode, pc),
            (opcodes::DUP1..=opcodes::DUP16) => handlers::stack::dup_n(self, opcode),
            (opcodes::SWAP1..=opcodes::SWAP16) => handlers::stack::swap_n(self, opcode),

            (opcodes::LOG0..=opcodes::LOG4) => {
                handlers::logging::log_n(self, opcode - opcodes::LOG0)
            }

            opcodes::CREATE => handlers::system::create(self),
            opcodes::CALL => handlers::system::call(self),
            opcodes::CALLCODE => handlers::system::callcode(self),
            opcodes::RETURN => handlers::system::op_return(self),
            opcodes::DELEGATECALL => handlers::system::delegatecall(self),
            opcodes::CREATE2 => handlers::system::create2(self),
            opcodes::STATICCALL => handlers::system::staticcall(self),
            opcodes::REVERT => handlers::system::revert(self),
            opcodes::SELFDESTRUCT => handlers::system::selfdestruct(self),

            _ => Err(VmError::UnrecognizedOpcode(opcode)),
        }
    }
}
