//! ferret EVM interpreter
//!
//! This crate provides the concrete Ethereum Virtual Machine the ferret harness executes
//! transactions on: machine state (accounts, frames, block and transaction context), the
//! single-step and run-to-completion primitives, and the closed set of in-machine failures.

/// Core VM implementation, including memory, stack, storage, and opcodes
pub mod core;

pub use crate::core::{
    contract::Contract,
    env::{Block, TxContext},
    error::{Query, VmError},
    log::Log,
    vm::{ExecutionResult, Frame, FrameKind, FrameState, VM},
};
