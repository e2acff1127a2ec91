use alloy::primitives::{Address, Bytes, U256};
use hashbrown::{HashMap, HashSet};

use super::super::{
    contract::Contract, error::VmError, memory::Memory, opcodes, stack::Stack,
};

/// [`ExecutionResult`] is the terminal outcome of a transaction, stored in
/// [`VM::result`](super::VM::result) once the outermost frame halts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The outermost frame halted normally, returning the given bytes.
    Success(Bytes),

    /// The outermost frame ended with a failure.
    Failure(VmError),
}

impl ExecutionResult {
    /// Whether this is [`ExecutionResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    /// The failure of an unsuccessful execution.
    pub fn error(&self) -> Option<&VmError> {
        match self {
            ExecutionResult::Success(_) => None,
            ExecutionResult::Failure(error) => Some(error),
        }
    }
}

impl From<Result<Bytes, VmError>> for ExecutionResult {
    fn from(outcome: Result<Bytes, VmError>) -> Self {
        match outcome {
            Ok(output) => ExecutionResult::Success(output),
            Err(error) => ExecutionResult::Failure(error),
        }
    }
}

/// [`FrameState`] is the state of the currently executing frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameState {
    /// The address whose storage and balance the frame acts on (`ADDRESS`).
    pub contract: Address,

    /// The address the executing code was loaded from. Differs from `contract` under
    /// DELEGATECALL and CALLCODE.
    pub code_contract: Address,

    /// The executing code.
    pub code: Bytes,

    /// Valid jump destinations in `code`.
    pub jumpdests: HashSet<usize>,

    /// The 0-based offset of the next instruction in `code`.
    pub pc: usize,

    /// The frame's stack.
    pub stack: Stack,

    /// The frame's memory.
    pub memory: Memory,

    /// The input data of the frame.
    pub calldata: Bytes,

    /// The value sent with the frame, in wei.
    pub callvalue: U256,

    /// The address that called into this frame.
    pub caller: Address,

    /// Gas remaining in this frame.
    pub gas: u64,

    /// Output of the most recent sub-call.
    pub returndata: Bytes,

    /// Whether state modifications are forbidden.
    pub is_static: bool,
}

impl FrameState {
    /// Creates an empty frame with `gas` available.
    pub fn new(gas: u64) -> Self {
        FrameState { gas, ..Default::default() }
    }

    /// Replaces the executing code, recomputing the valid jump destinations.
    pub fn set_code(&mut self, code: Bytes) {
        self.jumpdests = analyze_jumpdests(&code);
        self.code = code;
    }
}

/// What a suspended caller is waiting for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// A CALL-family instruction; output is copied to the caller's memory at `ret_offset`.
    Call {
        /// Memory offset of the caller's output buffer.
        ret_offset: usize,
        /// Size of the caller's output buffer.
        ret_size: usize,
    },

    /// A CREATE or CREATE2; on success the output becomes the code at `address`.
    Create {
        /// The address of the contract under construction.
        address: Address,
    },
}

/// A suspended caller frame, plus what to restore if the callee fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The caller's state at the point of the call.
    pub state: FrameState,

    /// What the caller expects back.
    pub kind: FrameKind,

    /// Account records as they were before the call.
    pub reversion: HashMap<Address, Contract>,

    /// Number of logs emitted before the call.
    pub log_checkpoint: usize,
}

/// Returns the offsets of every JUMPDEST in `code` that is not part of PUSH data.
///
/// ```
/// use ferret_vm::core::vm::analyze_jumpdests;
///
/// // PUSH1 0x5b JUMPDEST
/// let jumpdests = analyze_jumpdests(&[0x60, 0x5b, 0x5b]);
/// assert!(!jumpdests.contains(&1));
/// assert!(jumpdests.contains(&2));
/// ```
pub fn analyze_jumpdests(code: &[u8]) -> HashSet<usize> {
    let mut jumpdests = HashSet::new();
    let mut pc = 0;

    while let Some(&opcode) = code.get(pc) {
        if opcode == opcodes::JUMPDEST {
            jumpdests.insert(pc);
        }
        pc += 1 + opcodes::immediate_size(opcode);
    }

    jumpdests
}
