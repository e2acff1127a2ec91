use std::ops::{Div, Rem};

use alloy::primitives::U256;
use ferret_common::utils::strings::sign_uint;

use crate::core::{constants::EXP_BYTE_COST, error::VmError};

use super::super::core::VM;

/// ADD - Addition operation
pub fn add(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a.wrapping_add(b))
}

/// MUL - Multiplication operation
pub fn mul(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a.wrapping_mul(b))
}

/// SUB - Subtraction operation
pub fn sub(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    vm.state.stack.push(a.wrapping_sub(b))
}

/// DIV - Integer division operation
pub fn div(vm: &mut VM) -> Result<(), VmError> {
    let numerator = vm.state.stack.pop()?;
    let denominator = vm.state.stack.pop()?;
    let result = if !denominator.is_zero() { numerator.div(denominator) } else { U256::ZERO };
    vm.state.stack.push(result)
}

/// SDIV - Signed integer division operation
pub fn sdiv(vm: &mut VM) -> Result<(), VmError> {
    let numerator = vm.state.stack.pop()?;
    let denominator = vm.state.stack.pop()?;
    let result = if !denominator.is_zero() {
        sign_uint(numerator).wrapping_div(sign_uint(denominator)).into_raw()
    } else {
        U256::ZERO
    };
    vm.state.stack.push(result)
}

/// MOD - Modulo operation
pub fn modulo(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let modulus = vm.state.stack.pop()?;
    let result = if !modulus.is_zero() { a.rem(modulus) } else { U256::ZERO };
    vm.state.stack.push(result)
}

/// SMOD - Signed modulo operation
pub fn smod(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let modulus = vm.state.stack.pop()?;
    let result = if !modulus.is_zero() {
        sign_uint(a).wrapping_rem(sign_uint(modulus)).into_raw()
    } else {
        U256::ZERO
    };
    vm.state.stack.push(result)
}

/// ADDMOD - Addition modulo operation
pub fn addmod(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    let modulus = vm.state.stack.pop()?;
    let result = if !modulus.is_zero() { a.add_mod(b, modulus) } else { U256::ZERO };
    vm.state.stack.push(result)
}

/// MULMOD - Multiplication modulo operation
pub fn mulmod(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;
    let modulus = vm.state.stack.pop()?;
    let result = if !modulus.is_zero() { a.mul_mod(b, modulus) } else { U256::ZERO };
    vm.state.stack.push(result)
}

/// EXP - Exponential operation
pub fn exp(vm: &mut VM) -> Result<(), VmError> {
    let a = vm.state.stack.pop()?;
    let exponent = vm.state.stack.pop()?;

    // consume dynamic gas
    let exponent_byte_size = exponent.bit_len().div_ceil(8) as u64;
    vm.consume_gas(EXP_BYTE_COST * exponent_byte_size)?;

    vm.state.stack.push(a.wrapping_pow(exponent))
}

/// SIGNEXTEND - Extend length of two's complement signed integer
pub fn signextend(vm: &mut VM) -> Result<(), VmError> {
    let x = vm.state.stack.pop()?;
    let b = vm.state.stack.pop()?;

    if x >= U256::from(31u32) {
        return vm.state.stack.push(b);
    }

    let t = x.to::<usize>() * 8 + 7;
    let sign_bit = U256::from(1u32) << t;
    let mask = sign_bit - U256::from(1u32);
    let result = if b.bit(t) { b | !mask } else { b & mask };

    vm.state.stack.push(result)
}
