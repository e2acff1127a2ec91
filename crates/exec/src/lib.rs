//! The execution core of the ferret fuzzing harness.
//!
//! Drives one transaction through the [`ferret_vm::VM`], classifies how it failed, fixes up
//! freshly created contracts so their runtime code replaces the init code, and optionally records
//! which program counters of which code were visited.

/// Error types for the execution core
pub mod error;

/// Transactions and the machine setup that precedes executing them
pub mod transaction;

mod core;

// re-export the public interface
pub use crate::core::{
    classify::{classify_error, is_illegal, is_reversion, ErrorClass},
    coverage::{
        coverage_points, record_coverage_point, run_with_coverage, CoverageMap, UNKNOWN_CODEHASH,
    },
    execute::{execute_tx, execute_tx_with, execute_tx_with_coverage, vm_except, MAX_GAS},
    replace::{replace_code, replace_code_of_self},
};
pub use error::Error;
pub use transaction::{setup_tx, Transaction, TxCall};
