//! Pure ALU primitives.
//!
//! Every helper takes the flag register and its scalar inputs explicitly and
//! returns the new accumulator value, so the arithmetic core can be tested
//! in isolation from the rest of the machine. Sign, zero and parity always
//! come from the truncated 8-bit result; carry and auxiliary carry follow
//! the rules of each operation.

use crate::flags::Flags;

/// 8-bit increment. Carry is not affected.
pub fn inr(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    flags.aux_carry = (value & 0x0F) + 1 > 0x0F;
    flags.set_szp(result);
    result
}

/// 8-bit decrement. Carry is not affected; auxiliary carry is set on a
/// low-nibble borrow.
pub fn dcr(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    flags.aux_carry = (value & 0x0F) == 0;
    flags.set_szp(result);
    result
}

/// ADD: A + value.
pub fn add(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let wide = u16::from(a) + u16::from(value);
    let result = wide as u8;
    flags.aux_carry = (a & 0x0F) + (value & 0x0F) > 0x0F;
    flags.carry = wide > 0xFF;
    flags.set_szp(result);
    result
}

/// ADC: A + value + carry-in.
pub fn adc(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let carry_in = u8::from(flags.carry);
    let wide = u16::from(a) + u16::from(value) + u16::from(carry_in);
    let result = wide as u8;
    flags.aux_carry = (a & 0x0F) + (value & 0x0F) + carry_in > 0x0F;
    flags.carry = wide > 0xFF;
    flags.set_szp(result);
    result
}

/// SUB: A - value. Carry is the borrow flag.
pub fn sub(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a.wrapping_sub(value);
    flags.aux_carry = (a & 0x0F) < (value & 0x0F);
    flags.carry = a < value;
    flags.set_szp(result);
    result
}

/// SBB: A - value - borrow-in.
pub fn sbb(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let borrow_in = u8::from(flags.carry);
    let result = a.wrapping_sub(value).wrapping_sub(borrow_in);
    flags.aux_carry = (a & 0x0F) < (value & 0x0F) + borrow_in;
    flags.carry = u16::from(a) < u16::from(value) + u16::from(borrow_in);
    flags.set_szp(result);
    result
}

/// ANA: A & value. Carry and auxiliary carry are cleared.
pub fn ana(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a & value;
    flags.carry = false;
    flags.aux_carry = false;
    flags.set_szp(result);
    result
}

/// XRA: A ^ value. Carry and auxiliary carry are cleared.
pub fn xra(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a ^ value;
    flags.carry = false;
    flags.aux_carry = false;
    flags.set_szp(result);
    result
}

/// ORA: A | value. Carry and auxiliary carry are cleared.
pub fn ora(flags: &mut Flags, a: u8, value: u8) -> u8 {
    let result = a | value;
    flags.carry = false;
    flags.aux_carry = false;
    flags.set_szp(result);
    result
}

/// CMP: flags as for `sub`, accumulator untouched.
pub fn cmp(flags: &mut Flags, a: u8, value: u8) {
    let result = a.wrapping_sub(value);
    flags.aux_carry = (a & 0x0F) < (value & 0x0F);
    flags.carry = a < value;
    flags.set_szp(result);
}

/// DAA: decimal-adjust the accumulator after a BCD addition.
///
/// Adds 0x06 when the low nibble exceeds 9 or auxiliary carry is set, then
/// adds 0x60 when the adjusted high nibble exceeds 9 or carry was already
/// set. Carry, once set here, is never cleared by the adjustment.
pub fn daa(flags: &mut Flags, a: u8) -> u8 {
    let mut result = a;
    if (result & 0x0F) > 9 || flags.aux_carry {
        flags.aux_carry = (result & 0x0F) + 0x06 > 0x0F;
        result = result.wrapping_add(0x06);
    }
    if (result >> 4) > 9 || flags.carry {
        result = result.wrapping_add(0x60);
        flags.carry = true;
    }
    flags.set_szp(result);
    result
}
