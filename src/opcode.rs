//! Opcode decoding.
//!
//! The 8080 opcode space is fully defined: every byte value 0..=255 maps to
//! exactly one instruction, including the duplicate encodings that alias to
//! NOP, JMP, RET and CALL. [`describe`] enumerates the whole space with no
//! wildcard arm, so a gap in the table is a compile error rather than a
//! runtime surprise; the descriptors are built once at startup into a flat
//! array indexed by the opcode byte.

use lazy_static::lazy_static;

/// An 8-bit working register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// An 8-bit operand: a register, or the memory byte addressed by HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    R(Reg),
    M,
}

/// A 16-bit register pair (SP standing in for the PSW-less pair slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    BC,
    DE,
    HL,
    SP,
}

/// Branch condition: exactly one flag bit, asserted or negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    /// Zero clear.
    Nz,
    /// Zero set.
    Z,
    /// Carry clear.
    Nc,
    /// Carry set.
    C,
    /// Parity odd (flag clear).
    Po,
    /// Parity even (flag set).
    Pe,
    /// Sign clear (plus).
    P,
    /// Sign set (minus).
    M,
}

/// The effect of an instruction, as a tagged variant per operation and
/// addressing mode. Immediate operands are fetched by the execution step
/// from the bytes following the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    /// MOV dst, src.
    Mov(Operand, Operand),
    /// MVI dst, d8.
    Mvi(Operand),
    /// LXI rp, d16.
    Lxi(Pair),
    Lda,
    Sta,
    Lhld,
    Shld,
    Ldax(Pair),
    Stax(Pair),
    Add(Operand),
    Adc(Operand),
    Sub(Operand),
    Sbb(Operand),
    Ana(Operand),
    Xra(Operand),
    Ora(Operand),
    Cmp(Operand),
    Adi,
    Aci,
    Sui,
    Sbi,
    Ani,
    Xri,
    Ori,
    Cpi,
    Inr(Operand),
    Dcr(Operand),
    Inx(Pair),
    Dcx(Pair),
    Dad(Pair),
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,
    Jmp,
    /// Conditional jump.
    Jcc(Cond),
    Call,
    /// Conditional call; costs 6 extra cycles when taken.
    Ccc(Cond),
    Ret,
    /// Conditional return; costs 6 extra cycles when taken.
    Rcc(Cond),
    /// RST n: call to the fixed vector `8 * n`.
    Rst(u8),
    Pchl,
    Sphl,
    Xthl,
    Xchg,
    Push(Pair),
    Pop(Pair),
    PushPsw,
    PopPsw,
    In,
    Out,
    Ei,
    Di,
    Hlt,
}

/// An immutable instruction descriptor produced by [`decode`].
///
/// `cycles` is the base cost; conditional call/return instructions cost 6
/// more when the branch is taken, which the execution step accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Assembly mnemonic, for diagnostics and trace logs only.
    pub mnemonic: &'static str,
    /// Instruction length in bytes (1..=3), used to advance PC.
    pub length: u16,
    /// Base clock-cycle cost.
    pub cycles: u32,
    pub op: Op,
}

fn instr(mnemonic: &'static str, length: u16, cycles: u32, op: Op) -> Instruction {
    Instruction {
        mnemonic,
        length,
        cycles,
        op,
    }
}

/// Describe a single opcode byte.
///
/// Every one of the 256 values has its own arm; the match is deliberately
/// wildcard-free so the compiler proves the table total.
fn describe(opcode: u8) -> Instruction {
    use Op::*;
    use Operand::{M, R};
    use Pair::*;
    use Reg::*;

    match opcode {
        0x00 => instr("NOP", 1, 4, Nop),
        0x01 => instr("LXI B,d16", 3, 10, Lxi(BC)),
        0x02 => instr("STAX B", 1, 7, Stax(BC)),
        0x03 => instr("INX B", 1, 5, Inx(BC)),
        0x04 => instr("INR B", 1, 5, Inr(R(B))),
        0x05 => instr("DCR B", 1, 5, Dcr(R(B))),
        0x06 => instr("MVI B,d8", 2, 7, Mvi(R(B))),
        0x07 => instr("RLC", 1, 4, Rlc),
        0x08 => instr("NOP", 1, 4, Nop),
        0x09 => instr("DAD B", 1, 10, Dad(BC)),
        0x0A => instr("LDAX B", 1, 7, Ldax(BC)),
        0x0B => instr("DCX B", 1, 5, Dcx(BC)),
        0x0C => instr("INR C", 1, 5, Inr(R(C))),
        0x0D => instr("DCR C", 1, 5, Dcr(R(C))),
        0x0E => instr("MVI C,d8", 2, 7, Mvi(R(C))),
        0x0F => instr("RRC", 1, 4, Rrc),

        0x10 => instr("NOP", 1, 4, Nop),
        0x11 => instr("LXI D,d16", 3, 10, Lxi(DE)),
        0x12 => instr("STAX D", 1, 7, Stax(DE)),
        0x13 => instr("INX D", 1, 5, Inx(DE)),
        0x14 => instr("INR D", 1, 5, Inr(R(D))),
        0x15 => instr("DCR D", 1, 5, Dcr(R(D))),
        0x16 => instr("MVI D,d8", 2, 7, Mvi(R(D))),
        0x17 => instr("RAL", 1, 4, Ral),
        0x18 => instr("NOP", 1, 4, Nop),
        0x19 => instr("DAD D", 1, 10, Dad(DE)),
        0x1A => instr("LDAX D", 1, 7, Ldax(DE)),
        0x1B => instr("DCX D", 1, 5, Dcx(DE)),
        0x1C => instr("INR E", 1, 5, Inr(R(E))),
        0x1D => instr("DCR E", 1, 5, Dcr(R(E))),
        0x1E => instr("MVI E,d8", 2, 7, Mvi(R(E))),
        0x1F => instr("RAR", 1, 4, Rar),

        0x20 => instr("NOP", 1, 4, Nop),
        0x21 => instr("LXI H,d16", 3, 10, Lxi(HL)),
        0x22 => instr("SHLD a16", 3, 16, Shld),
        0x23 => instr("INX H", 1, 5, Inx(HL)),
        0x24 => instr("INR H", 1, 5, Inr(R(H))),
        0x25 => instr("DCR H", 1, 5, Dcr(R(H))),
        0x26 => instr("MVI H,d8", 2, 7, Mvi(R(H))),
        0x27 => instr("DAA", 1, 4, Daa),
        0x28 => instr("NOP", 1, 4, Nop),
        0x29 => instr("DAD H", 1, 10, Dad(HL)),
        0x2A => instr("LHLD a16", 3, 16, Lhld),
        0x2B => instr("DCX H", 1, 5, Dcx(HL)),
        0x2C => instr("INR L", 1, 5, Inr(R(L))),
        0x2D => instr("DCR L", 1, 5, Dcr(R(L))),
        0x2E => instr("MVI L,d8", 2, 7, Mvi(R(L))),
        0x2F => instr("CMA", 1, 4, Cma),

        0x30 => instr("NOP", 1, 4, Nop),
        0x31 => instr("LXI SP,d16", 3, 10, Lxi(SP)),
        0x32 => instr("STA a16", 3, 13, Sta),
        0x33 => instr("INX SP", 1, 5, Inx(SP)),
        0x34 => instr("INR M", 1, 5, Inr(M)),
        0x35 => instr("DCR M", 1, 5, Dcr(M)),
        0x36 => instr("MVI M,d8", 2, 7, Mvi(M)),
        0x37 => instr("STC", 1, 4, Stc),
        0x38 => instr("NOP", 1, 4, Nop),
        0x39 => instr("DAD SP", 1, 10, Dad(SP)),
        0x3A => instr("LDA a16", 3, 13, Lda),
        0x3B => instr("DCX SP", 1, 5, Dcx(SP)),
        0x3C => instr("INR A", 1, 5, Inr(R(A))),
        0x3D => instr("DCR A", 1, 5, Dcr(R(A))),
        0x3E => instr("MVI A,d8", 2, 7, Mvi(R(A))),
        0x3F => instr("CMC", 1, 4, Cmc),

        0x40 => instr("MOV B,B", 1, 5, Mov(R(B), R(B))),
        0x41 => instr("MOV B,C", 1, 5, Mov(R(B), R(C))),
        0x42 => instr("MOV B,D", 1, 5, Mov(R(B), R(D))),
        0x43 => instr("MOV B,E", 1, 5, Mov(R(B), R(E))),
        0x44 => instr("MOV B,H", 1, 5, Mov(R(B), R(H))),
        0x45 => instr("MOV B,L", 1, 5, Mov(R(B), R(L))),
        0x46 => instr("MOV B,M", 1, 7, Mov(R(B), M)),
        0x47 => instr("MOV B,A", 1, 5, Mov(R(B), R(A))),
        0x48 => instr("MOV C,B", 1, 5, Mov(R(C), R(B))),
        0x49 => instr("MOV C,C", 1, 5, Mov(R(C), R(C))),
        0x4A => instr("MOV C,D", 1, 5, Mov(R(C), R(D))),
        0x4B => instr("MOV C,E", 1, 5, Mov(R(C), R(E))),
        0x4C => instr("MOV C,H", 1, 5, Mov(R(C), R(H))),
        0x4D => instr("MOV C,L", 1, 5, Mov(R(C), R(L))),
        0x4E => instr("MOV C,M", 1, 7, Mov(R(C), M)),
        0x4F => instr("MOV C,A", 1, 5, Mov(R(C), R(A))),

        0x50 => instr("MOV D,B", 1, 5, Mov(R(D), R(B))),
        0x51 => instr("MOV D,C", 1, 5, Mov(R(D), R(C))),
        0x52 => instr("MOV D,D", 1, 5, Mov(R(D), R(D))),
        0x53 => instr("MOV D,E", 1, 5, Mov(R(D), R(E))),
        0x54 => instr("MOV D,H", 1, 5, Mov(R(D), R(H))),
        0x55 => instr("MOV D,L", 1, 5, Mov(R(D), R(L))),
        0x56 => instr("MOV D,M", 1, 7, Mov(R(D), M)),
        0x57 => instr("MOV D,A", 1, 5, Mov(R(D), R(A))),
        0x58 => instr("MOV E,B", 1, 5, Mov(R(E), R(B))),
        0x59 => instr("MOV E,C", 1, 5, Mov(R(E), R(C))),
        0x5A => instr("MOV E,D", 1, 5, Mov(R(E), R(D))),
        0x5B => instr("MOV E,E", 1, 5, Mov(R(E), R(E))),
        0x5C => instr("MOV E,H", 1, 5, Mov(R(E), R(H))),
        0x5D => instr("MOV E,L", 1, 5, Mov(R(E), R(L))),
        0x5E => instr("MOV E,M", 1, 7, Mov(R(E), M)),
        0x5F => instr("MOV E,A", 1, 5, Mov(R(E), R(A))),

        0x60 => instr("MOV H,B", 1, 5, Mov(R(H), R(B))),
        0x61 => instr("MOV H,C", 1, 5, Mov(R(H), R(C))),
        0x62 => instr("MOV H,D", 1, 5, Mov(R(H), R(D))),
        0x63 => instr("MOV H,E", 1, 5, Mov(R(H), R(E))),
        0x64 => instr("MOV H,H", 1, 5, Mov(R(H), R(H))),
        0x65 => instr("MOV H,L", 1, 5, Mov(R(H), R(L))),
        0x66 => instr("MOV H,M", 1, 7, Mov(R(H), M)),
        0x67 => instr("MOV H,A", 1, 5, Mov(R(H), R(A))),
        0x68 => instr("MOV L,B", 1, 5, Mov(R(L), R(B))),
        0x69 => instr("MOV L,C", 1, 5, Mov(R(L), R(C))),
        0x6A => instr("MOV L,D", 1, 5, Mov(R(L), R(D))),
        0x6B => instr("MOV L,E", 1, 5, Mov(R(L), R(E))),
        0x6C => instr("MOV L,H", 1, 5, Mov(R(L), R(H))),
        0x6D => instr("MOV L,L", 1, 5, Mov(R(L), R(L))),
        0x6E => instr("MOV L,M", 1, 7, Mov(R(L), M)),
        0x6F => instr("MOV L,A", 1, 5, Mov(R(L), R(A))),

        0x70 => instr("MOV M,B", 1, 5, Mov(M, R(B))),
        0x71 => instr("MOV M,C", 1, 5, Mov(M, R(C))),
        0x72 => instr("MOV M,D", 1, 5, Mov(M, R(D))),
        0x73 => instr("MOV M,E", 1, 5, Mov(M, R(E))),
        0x74 => instr("MOV M,H", 1, 5, Mov(M, R(H))),
        0x75 => instr("MOV M,L", 1, 5, Mov(M, R(L))),
        0x76 => instr("HLT", 1, 7, Hlt),
        0x77 => instr("MOV M,A", 1, 5, Mov(M, R(A))),
        0x78 => instr("MOV A,B", 1, 5, Mov(R(A), R(B))),
        0x79 => instr("MOV A,C", 1, 5, Mov(R(A), R(C))),
        0x7A => instr("MOV A,D", 1, 5, Mov(R(A), R(D))),
        0x7B => instr("MOV A,E", 1, 5, Mov(R(A), R(E))),
        0x7C => instr("MOV A,H", 1, 5, Mov(R(A), R(H))),
        0x7D => instr("MOV A,L", 1, 5, Mov(R(A), R(L))),
        0x7E => instr("MOV A,M", 1, 7, Mov(R(A), M)),
        0x7F => instr("MOV A,A", 1, 5, Mov(R(A), R(A))),

        0x80 => instr("ADD B", 1, 4, Add(R(B))),
        0x81 => instr("ADD C", 1, 4, Add(R(C))),
        0x82 => instr("ADD D", 1, 4, Add(R(D))),
        0x83 => instr("ADD E", 1, 4, Add(R(E))),
        0x84 => instr("ADD H", 1, 4, Add(R(H))),
        0x85 => instr("ADD L", 1, 4, Add(R(L))),
        0x86 => instr("ADD M", 1, 7, Add(M)),
        0x87 => instr("ADD A", 1, 4, Add(R(A))),
        0x88 => instr("ADC B", 1, 4, Adc(R(B))),
        0x89 => instr("ADC C", 1, 4, Adc(R(C))),
        0x8A => instr("ADC D", 1, 4, Adc(R(D))),
        0x8B => instr("ADC E", 1, 4, Adc(R(E))),
        0x8C => instr("ADC H", 1, 4, Adc(R(H))),
        0x8D => instr("ADC L", 1, 4, Adc(R(L))),
        0x8E => instr("ADC M", 1, 7, Adc(M)),
        0x8F => instr("ADC A", 1, 4, Adc(R(A))),

        0x90 => instr("SUB B", 1, 4, Sub(R(B))),
        0x91 => instr("SUB C", 1, 4, Sub(R(C))),
        0x92 => instr("SUB D", 1, 4, Sub(R(D))),
        0x93 => instr("SUB E", 1, 4, Sub(R(E))),
        0x94 => instr("SUB H", 1, 4, Sub(R(H))),
        0x95 => instr("SUB L", 1, 4, Sub(R(L))),
        0x96 => instr("SUB M", 1, 7, Sub(M)),
        0x97 => instr("SUB A", 1, 4, Sub(R(A))),
        0x98 => instr("SBB B", 1, 4, Sbb(R(B))),
        0x99 => instr("SBB C", 1, 4, Sbb(R(C))),
        0x9A => instr("SBB D", 1, 4, Sbb(R(D))),
        0x9B => instr("SBB E", 1, 4, Sbb(R(E))),
        0x9C => instr("SBB H", 1, 4, Sbb(R(H))),
        0x9D => instr("SBB L", 1, 4, Sbb(R(L))),
        0x9E => instr("SBB M", 1, 7, Sbb(M)),
        0x9F => instr("SBB A", 1, 4, Sbb(R(A))),

        0xA0 => instr("ANA B", 1, 4, Ana(R(B))),
        0xA1 => instr("ANA C", 1, 4, Ana(R(C))),
        0xA2 => instr("ANA D", 1, 4, Ana(R(D))),
        0xA3 => instr("ANA E", 1, 4, Ana(R(E))),
        0xA4 => instr("ANA H", 1, 4, Ana(R(H))),
        0xA5 => instr("ANA L", 1, 4, Ana(R(L))),
        0xA6 => instr("ANA M", 1, 7, Ana(M)),
        0xA7 => instr("ANA A", 1, 4, Ana(R(A))),
        0xA8 => instr("XRA B", 1, 4, Xra(R(B))),
        0xA9 => instr("XRA C", 1, 4, Xra(R(C))),
        0xAA => instr("XRA D", 1, 4, Xra(R(D))),
        0xAB => instr("XRA E", 1, 4, Xra(R(E))),
        0xAC => instr("XRA H", 1, 4, Xra(R(H))),
        0xAD => instr("XRA L", 1, 4, Xra(R(L))),
        0xAE => instr("XRA M", 1, 7, Xra(M)),
        0xAF => instr("XRA A", 1, 4, Xra(R(A))),

        0xB0 => instr("ORA B", 1, 4, Ora(R(B))),
        0xB1 => instr("ORA C", 1, 4, Ora(R(C))),
        0xB2 => instr("ORA D", 1, 4, Ora(R(D))),
        0xB3 => instr("ORA E", 1, 4, Ora(R(E))),
        0xB4 => instr("ORA H", 1, 4, Ora(R(H))),
        0xB5 => instr("ORA L", 1, 4, Ora(R(L))),
        0xB6 => instr("ORA M", 1, 7, Ora(M)),
        0xB7 => instr("ORA A", 1, 4, Ora(R(A))),
        0xB8 => instr("CMP B", 1, 4, Cmp(R(B))),
        0xB9 => instr("CMP C", 1, 4, Cmp(R(C))),
        0xBA => instr("CMP D", 1, 4, Cmp(R(D))),
        0xBB => instr("CMP E", 1, 4, Cmp(R(E))),
        0xBC => instr("CMP H", 1, 4, Cmp(R(H))),
        0xBD => instr("CMP L", 1, 4, Cmp(R(L))),
        0xBE => instr("CMP M", 1, 7, Cmp(M)),
        0xBF => instr("CMP A", 1, 4, Cmp(R(A))),

        0xC0 => instr("RNZ", 1, 5, Rcc(Cond::Nz)),
        0xC1 => instr("POP B", 1, 10, Pop(BC)),
        0xC2 => instr("JNZ a16", 3, 10, Jcc(Cond::Nz)),
        0xC3 => instr("JMP a16", 3, 10, Jmp),
        0xC4 => instr("CNZ a16", 3, 11, Ccc(Cond::Nz)),
        0xC5 => instr("PUSH B", 1, 11, Push(BC)),
        0xC6 => instr("ADI d8", 2, 7, Adi),
        0xC7 => instr("RST 0", 1, 11, Rst(0)),
        0xC8 => instr("RZ", 1, 5, Rcc(Cond::Z)),
        0xC9 => instr("RET", 1, 10, Ret),
        0xCA => instr("JZ a16", 3, 10, Jcc(Cond::Z)),
        0xCB => instr("JMP a16", 3, 10, Jmp),
        0xCC => instr("CZ a16", 3, 11, Ccc(Cond::Z)),
        0xCD => instr("CALL a16", 3, 17, Call),
        0xCE => instr("ACI d8", 2, 7, Aci),
        0xCF => instr("RST 1", 1, 11, Rst(1)),

        0xD0 => instr("RNC", 1, 5, Rcc(Cond::Nc)),
        0xD1 => instr("POP D", 1, 10, Pop(DE)),
        0xD2 => instr("JNC a16", 3, 10, Jcc(Cond::Nc)),
        0xD3 => instr("OUT d8", 2, 10, Out),
        0xD4 => instr("CNC a16", 3, 11, Ccc(Cond::Nc)),
        0xD5 => instr("PUSH D", 1, 11, Push(DE)),
        0xD6 => instr("SUI d8", 2, 7, Sui),
        0xD7 => instr("RST 2", 1, 11, Rst(2)),
        0xD8 => instr("RC", 1, 5, Rcc(Cond::C)),
        0xD9 => instr("RET", 1, 10, Ret),
        0xDA => instr("JC a16", 3, 10, Jcc(Cond::C)),
        0xDB => instr("IN d8", 2, 10, In),
        0xDC => instr("CC a16", 3, 11, Ccc(Cond::C)),
        0xDD => instr("CALL a16", 3, 17, Call),
        0xDE => instr("SBI d8", 2, 7, Sbi),
        0xDF => instr("RST 3", 1, 11, Rst(3)),

        0xE0 => instr("RPO", 1, 5, Rcc(Cond::Po)),
        0xE1 => instr("POP H", 1, 10, Pop(HL)),
        0xE2 => instr("JPO a16", 3, 10, Jcc(Cond::Po)),
        0xE3 => instr("XTHL", 1, 18, Xthl),
        0xE4 => instr("CPO a16", 3, 11, Ccc(Cond::Po)),
        0xE5 => instr("PUSH H", 1, 11, Push(HL)),
        0xE6 => instr("ANI d8", 2, 7, Ani),
        0xE7 => instr("RST 4", 1, 11, Rst(4)),
        0xE8 => instr("RPE", 1, 5, Rcc(Cond::Pe)),
        0xE9 => instr("PCHL", 1, 5, Pchl),
        0xEA => instr("JPE a16", 3, 10, Jcc(Cond::Pe)),
        0xEB => instr("XCHG", 1, 5, Xchg),
        0xEC => instr("CPE a16", 3, 11, Ccc(Cond::Pe)),
        0xED => instr("CALL a16", 3, 17, Call),
        0xEE => instr("XRI d8", 2, 7, Xri),
        0xEF => instr("RST 5", 1, 11, Rst(5)),

        0xF0 => instr("RP", 1, 5, Rcc(Cond::P)),
        0xF1 => instr("POP PSW", 1, 10, PopPsw),
        0xF2 => instr("JP a16", 3, 10, Jcc(Cond::P)),
        0xF3 => instr("DI", 1, 4, Di),
        0xF4 => instr("CP a16", 3, 11, Ccc(Cond::P)),
        0xF5 => instr("PUSH PSW", 1, 11, PushPsw),
        0xF6 => instr("ORI d8", 2, 7, Ori),
        0xF7 => instr("RST 6", 1, 11, Rst(6)),
        0xF8 => instr("RM", 1, 5, Rcc(Cond::M)),
        0xF9 => instr("SPHL", 1, 5, Sphl),
        0xFA => instr("JM a16", 3, 10, Jcc(Cond::M)),
        0xFB => instr("EI", 1, 4, Ei),
        0xFC => instr("CM a16", 3, 11, Ccc(Cond::M)),
        0xFD => instr("CALL a16", 3, 17, Call),
        0xFE => instr("CPI d8", 2, 7, Cpi),
        0xFF => instr("RST 7", 1, 11, Rst(7)),
    }
}

lazy_static! {
    /// Descriptor for every opcode byte, built once at startup.
    static ref OPCODE_TABLE: [Instruction; 256] = {
        let mut table = [instr("NOP", 1, 4, Op::Nop); 256];
        for (opcode, slot) in table.iter_mut().enumerate() {
            *slot = describe(opcode as u8);
        }
        table
    };
}

/// Decode an opcode byte into its instruction descriptor.
///
/// Total over the whole byte range; O(1) table lookup.
#[inline]
pub fn decode(opcode: u8) -> &'static Instruction {
    &OPCODE_TABLE[opcode as usize]
}
