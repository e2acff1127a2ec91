/// The maximum number of words the stack can hold.
pub const STACK_LIMIT: usize = 1024;

/// The maximum depth of nested message calls.
pub const CALL_DEPTH_LIMIT: usize = 1024;

/// The maximum size of deployed runtime code (EIP-170).
pub const MAX_CODE_SIZE: usize = 24576;

/// The largest memory offset + size an instruction may address.
pub const MAX_MEMORY_SIZE: u64 = u32::MAX as u64;

/// Cost of touching a cold account, on top of the warm access cost.
pub const COLD_ACCOUNT_ACCESS_SURCHARGE: u64 = 2500;

/// Cost of reading an already accessed storage slot.
pub const WARM_STORAGE_READ_COST: u64 = 100;

/// Cost of reading a storage slot for the first time in a transaction.
pub const COLD_SLOAD_COST: u64 = 2100;

/// Cost of writing a non-zero value into a zero slot.
pub const SSTORE_SET_COST: u64 = 20000;

/// Cost of overwriting a slot that already holds a value.
pub const SSTORE_RESET_COST: u64 = 2900;

/// Extra cost of a call that transfers value.
pub const CALL_VALUE_TRANSFER_COST: u64 = 9000;

/// Gas given to the callee for free when value is transferred.
pub const CALL_STIPEND: u64 = 2300;

/// Cost per byte of deployed runtime code.
pub const CODE_DEPOSIT_COST: u64 = 200;

/// Per-word cost of memory copies.
pub const COPY_WORD_COST: u64 = 3;

/// Per-word cost of hashing.
pub const KECCAK_WORD_COST: u64 = 6;

/// Per-byte cost of the EXP exponent.
pub const EXP_BYTE_COST: u64 = 50;

/// Per-byte cost of log data.
pub const LOG_DATA_COST: u64 = 8;

/// Cost of a cold SELFDESTRUCT beneficiary.
pub const SELFDESTRUCT_COLD_SURCHARGE: u64 = 2600;
