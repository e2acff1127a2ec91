/// Gas schedule and execution limits
pub mod constants;

/// Account records stored in the machine
pub mod contract;

/// Block and transaction context
pub mod env;

/// In-machine failure values
pub mod error;

/// Log implementation for event handling
pub mod log;

/// Memory implementation for VM memory management
pub mod memory;

/// Opcode definitions and implementations
pub mod opcodes;

/// Stack implementation for the VM
pub mod stack;

/// Storage implementation for contract storage
pub mod storage;

/// Core virtual machine implementation
pub mod vm;
