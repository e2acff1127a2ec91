//! Common utilities used across the ferret crates.
//!
//! This crate provides small, dependency-light helpers shared by the interpreter, the execution
//! core and the command line, such as hex encoding and file io.

/// General utility functions and types for common tasks.
pub mod utils;
