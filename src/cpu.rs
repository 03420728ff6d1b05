//! The CPU state aggregate and the execution step.
//!
//! All mutable machine state lives in [`Cpu`] and is threaded explicitly
//! through decode and step, so multiple independent instances can coexist
//! and tests stay deterministic. The step itself is the whole execution
//! contract: apply the decoded effect, move PC, account the cycles.

use crate::alu;
use crate::flags::Flags;
use crate::memory::AddressSpace;
use crate::opcode::{decode, Cond, Instruction, Op, Operand, Pair, Reg};
use crate::registers::Registers;

/// Extra cycles consumed by a conditional call or return whose branch is
/// taken.
const CONDITIONAL_EXTRA_CYCLES: u32 = 6;

/// How an executed instruction leaves the program counter.
enum Flow {
    /// Fall through; PC advances by the instruction length.
    Sequential,
    /// Control transfer; PC is set to the target and the auto-advance is
    /// suppressed.
    Jump(u16),
    /// Taken conditional call/return: as `Jump`, plus the cycle penalty.
    Branch(u16),
}

/// An Intel 8080 machine instance.
///
/// Owns the register file, the flag register, the 64K memory image, the
/// separate 64K stack image addressed directly by SP, the running cycle
/// counter and the halted latch. Exactly one driver is expected to call
/// into it; the engine never spawns work of its own.
#[derive(Default)]
pub struct Cpu {
    pub regs: Registers,
    pub flags: Flags,
    pub memory: AddressSpace,
    pub stack: AddressSpace,
    /// Clock cycles consumed since the instance was created.
    pub cycles: u64,
    /// Set by HLT; cleared by [`Cpu::reset`].
    pub halted: bool,
}

impl Cpu {
    /// Create a machine in its power-on state: registers zeroed, flag byte
    /// 0x02, both images cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinitialise registers, flags and the halted latch to power-on
    /// values. Memory and stack contents are left untouched, as is the
    /// cycle counter.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.flags = Flags::default();
        self.halted = false;
    }

    /// Copy a program into the memory image starting at `origin`.
    pub fn load(&mut self, origin: u16, program: &[u8]) {
        self.memory.load(origin, program);
    }

    /// Fetch the opcode at PC, decode it and execute one step.
    ///
    /// Returns the cycles consumed, or 0 without fetching when the machine
    /// is halted. The surrounding fetch loop belongs to the driver.
    pub fn tick(&mut self) -> u32 {
        if self.halted {
            return 0;
        }
        let opcode = self.memory.read(self.regs.pc);
        self.step(decode(opcode))
    }

    /// Execute one decoded instruction against the current state.
    ///
    /// Applies the effect, then either advances PC by the instruction
    /// length (sequential flow) or leaves it at the committed jump target,
    /// and accumulates the cycle cost (+6 for a taken conditional
    /// call/return). Returns the cycles consumed.
    pub fn step(&mut self, instr: &Instruction) -> u32 {
        log::trace!("{:04X}  {}", self.regs.pc, instr.mnemonic);

        let mut cycles = instr.cycles;
        match self.execute(instr) {
            Flow::Sequential => self.regs.pc = self.regs.pc.wrapping_add(instr.length),
            Flow::Jump(target) => self.regs.pc = target,
            Flow::Branch(target) => {
                self.regs.pc = target;
                cycles += CONDITIONAL_EXTRA_CYCLES;
            }
        }
        self.cycles += u64::from(cycles);
        cycles
    }

    fn execute(&mut self, instr: &Instruction) -> Flow {
        match instr.op {
            Op::Nop => {}

            Op::Mov(dst, src) => {
                let value = self.read_operand(src);
                self.write_operand(dst, value);
            }
            Op::Mvi(dst) => {
                let value = self.imm_byte();
                self.write_operand(dst, value);
            }
            Op::Lxi(pair) => {
                let value = self.imm_word();
                self.set_pair(pair, value);
            }

            Op::Lda => {
                let addr = self.imm_word();
                self.regs.a = self.memory.read(addr);
            }
            Op::Sta => {
                let addr = self.imm_word();
                self.memory.write(addr, self.regs.a);
            }
            Op::Lhld => {
                let addr = self.imm_word();
                let value = self.memory.read_word(addr);
                self.regs.set_hl(value);
            }
            Op::Shld => {
                let addr = self.imm_word();
                self.memory.write_word(addr, self.regs.hl());
            }
            Op::Ldax(pair) => {
                let addr = self.pair(pair);
                self.regs.a = self.memory.read(addr);
            }
            Op::Stax(pair) => {
                let addr = self.pair(pair);
                self.memory.write(addr, self.regs.a);
            }

            Op::Add(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::add(&mut self.flags, self.regs.a, value);
            }
            Op::Adc(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::adc(&mut self.flags, self.regs.a, value);
            }
            Op::Sub(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::sub(&mut self.flags, self.regs.a, value);
            }
            Op::Sbb(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::sbb(&mut self.flags, self.regs.a, value);
            }
            Op::Ana(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::ana(&mut self.flags, self.regs.a, value);
            }
            Op::Xra(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::xra(&mut self.flags, self.regs.a, value);
            }
            Op::Ora(src) => {
                let value = self.read_operand(src);
                self.regs.a = alu::ora(&mut self.flags, self.regs.a, value);
            }
            Op::Cmp(src) => {
                let value = self.read_operand(src);
                alu::cmp(&mut self.flags, self.regs.a, value);
            }

            Op::Adi => {
                let value = self.imm_byte();
                self.regs.a = alu::add(&mut self.flags, self.regs.a, value);
            }
            Op::Aci => {
                let value = self.imm_byte();
                self.regs.a = alu::adc(&mut self.flags, self.regs.a, value);
            }
            Op::Sui => {
                let value = self.imm_byte();
                self.regs.a = alu::sub(&mut self.flags, self.regs.a, value);
            }
            Op::Sbi => {
                let value = self.imm_byte();
                self.regs.a = alu::sbb(&mut self.flags, self.regs.a, value);
            }
            Op::Ani => {
                let value = self.imm_byte();
                self.regs.a = alu::ana(&mut self.flags, self.regs.a, value);
            }
            Op::Xri => {
                let value = self.imm_byte();
                self.regs.a = alu::xra(&mut self.flags, self.regs.a, value);
            }
            Op::Ori => {
                let value = self.imm_byte();
                self.regs.a = alu::ora(&mut self.flags, self.regs.a, value);
            }
            Op::Cpi => {
                let value = self.imm_byte();
                alu::cmp(&mut self.flags, self.regs.a, value);
            }

            Op::Inr(operand) => {
                let value = self.read_operand(operand);
                let result = alu::inr(&mut self.flags, value);
                self.write_operand(operand, result);
            }
            Op::Dcr(operand) => {
                let value = self.read_operand(operand);
                let result = alu::dcr(&mut self.flags, value);
                self.write_operand(operand, result);
            }
            Op::Inx(pair) => {
                let value = self.pair(pair).wrapping_add(1);
                self.set_pair(pair, value);
            }
            Op::Dcx(pair) => {
                let value = self.pair(pair).wrapping_sub(1);
                self.set_pair(pair, value);
            }
            Op::Dad(pair) => {
                let wide = u32::from(self.regs.hl()) + u32::from(self.pair(pair));
                self.flags.carry = wide > 0xFFFF;
                self.regs.set_hl(wide as u16);
            }

            Op::Rlc => {
                let a = self.regs.a;
                self.regs.a = a.rotate_left(1);
                self.flags.carry = (a & 0x80) != 0;
            }
            Op::Rrc => {
                let a = self.regs.a;
                self.regs.a = a.rotate_right(1);
                self.flags.carry = (a & 0x01) != 0;
            }
            Op::Ral => {
                let a = self.regs.a;
                let carry_in = u8::from(self.flags.carry);
                self.regs.a = (a << 1) | carry_in;
                self.flags.carry = (a & 0x80) != 0;
            }
            Op::Rar => {
                // The previous carry fills the vacated bit 7.
                let a = self.regs.a;
                let carry_in = if self.flags.carry { 0x80 } else { 0x00 };
                self.regs.a = (a >> 1) | carry_in;
                self.flags.carry = (a & 0x01) != 0;
            }

            Op::Daa => {
                self.regs.a = alu::daa(&mut self.flags, self.regs.a);
            }
            Op::Cma => {
                // Complements A; no flags are affected.
                self.regs.a = !self.regs.a;
            }
            Op::Stc => {
                self.flags.carry = true;
            }
            Op::Cmc => {
                self.flags.carry = !self.flags.carry;
            }

            Op::Jmp => return Flow::Jump(self.imm_word()),
            Op::Jcc(cond) => {
                if self.test(cond) {
                    return Flow::Jump(self.imm_word());
                }
            }
            Op::Call => {
                let target = self.imm_word();
                let return_addr = self.regs.pc.wrapping_add(instr.length);
                return Flow::Jump(self.call(target, return_addr));
            }
            Op::Ccc(cond) => {
                if self.test(cond) {
                    let target = self.imm_word();
                    let return_addr = self.regs.pc.wrapping_add(instr.length);
                    return Flow::Branch(self.call(target, return_addr));
                }
            }
            Op::Ret => return Flow::Jump(self.ret()),
            Op::Rcc(cond) => {
                if self.test(cond) {
                    return Flow::Branch(self.ret());
                }
            }
            Op::Rst(n) => {
                let return_addr = self.regs.pc.wrapping_add(instr.length);
                return Flow::Jump(self.call(u16::from(n) * 8, return_addr));
            }
            Op::Pchl => return Flow::Jump(self.regs.hl()),

            Op::Sphl => {
                self.regs.sp = self.regs.hl();
            }
            Op::Xthl => {
                let top = self.pop_word();
                let hl = self.regs.hl();
                self.push_word(hl);
                self.regs.set_hl(top);
            }
            Op::Xchg => {
                core::mem::swap(&mut self.regs.d, &mut self.regs.h);
                core::mem::swap(&mut self.regs.e, &mut self.regs.l);
            }

            Op::Push(pair) => {
                let value = self.pair(pair);
                self.push_word(value);
            }
            Op::Pop(pair) => {
                let value = self.pop_word();
                self.set_pair(pair, value);
            }
            Op::PushPsw => {
                let psw = u16::from_be_bytes([self.regs.a, self.flags.to_byte()]);
                self.push_word(psw);
            }
            Op::PopPsw => {
                let [a, f] = self.pop_word().to_be_bytes();
                self.regs.a = a;
                self.flags.set_from_byte(f);
            }

            // Port I/O and the interrupt enable latch belong to the driver;
            // the core only consumes the documented length and cycles.
            Op::In | Op::Out | Op::Ei | Op::Di => {}

            Op::Hlt => {
                self.halted = true;
            }
        }
        Flow::Sequential
    }

    /// Immediate byte operand: the byte following the opcode.
    #[inline]
    fn imm_byte(&self) -> u8 {
        self.memory.read(self.regs.pc.wrapping_add(1))
    }

    /// Immediate word operand: the two bytes following the opcode,
    /// little-endian.
    #[inline]
    fn imm_word(&self) -> u16 {
        self.memory.read_word(self.regs.pc.wrapping_add(1))
    }

    fn reg(&self, reg: Reg) -> u8 {
        match reg {
            Reg::A => self.regs.a,
            Reg::B => self.regs.b,
            Reg::C => self.regs.c,
            Reg::D => self.regs.d,
            Reg::E => self.regs.e,
            Reg::H => self.regs.h,
            Reg::L => self.regs.l,
        }
    }

    fn set_reg(&mut self, reg: Reg, value: u8) {
        match reg {
            Reg::A => self.regs.a = value,
            Reg::B => self.regs.b = value,
            Reg::C => self.regs.c = value,
            Reg::D => self.regs.d = value,
            Reg::E => self.regs.e = value,
            Reg::H => self.regs.h = value,
            Reg::L => self.regs.l = value,
        }
    }

    fn read_operand(&self, operand: Operand) -> u8 {
        match operand {
            Operand::R(reg) => self.reg(reg),
            Operand::M => self.memory.read(self.regs.hl()),
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::R(reg) => self.set_reg(reg, value),
            Operand::M => self.memory.write(self.regs.hl(), value),
        }
    }

    fn pair(&self, pair: Pair) -> u16 {
        match pair {
            Pair::BC => self.regs.bc(),
            Pair::DE => self.regs.de(),
            Pair::HL => self.regs.hl(),
            Pair::SP => self.regs.sp,
        }
    }

    fn set_pair(&mut self, pair: Pair, value: u16) {
        match pair {
            Pair::BC => self.regs.set_bc(value),
            Pair::DE => self.regs.set_de(value),
            Pair::HL => self.regs.set_hl(value),
            Pair::SP => self.regs.sp = value,
        }
    }

    fn test(&self, cond: Cond) -> bool {
        match cond {
            Cond::Nz => !self.flags.zero,
            Cond::Z => self.flags.zero,
            Cond::Nc => !self.flags.carry,
            Cond::C => self.flags.carry,
            Cond::Po => !self.flags.parity,
            Cond::Pe => self.flags.parity,
            Cond::P => !self.flags.sign,
            Cond::M => self.flags.sign,
        }
    }

    /// Push a word onto the stack image: low byte at [SP], high byte at
    /// [SP+1], then SP advances by 2. The stack grows upward and all SP
    /// arithmetic wraps in 16 bits.
    pub fn push_word(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.stack.write(self.regs.sp, lo);
        self.stack.write(self.regs.sp.wrapping_add(1), hi);
        self.regs.sp = self.regs.sp.wrapping_add(2);
    }

    /// Pop a word from the stack image: SP retreats by 2 first, then the
    /// low byte is read at [SP] and the high byte at [SP+1].
    pub fn pop_word(&mut self) -> u16 {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        let lo = self.stack.read(self.regs.sp);
        let hi = self.stack.read(self.regs.sp.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    /// Push the return address and hand back the call target.
    fn call(&mut self, target: u16, return_addr: u16) -> u16 {
        self.push_word(return_addr);
        target
    }

    /// Pop the return address.
    fn ret(&mut self) -> u16 {
        self.pop_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// A machine with `program` loaded at 0x0000 and SP parked mid-stack.
    fn cpu_with(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load(0x0000, program);
        cpu.regs.sp = 0x8000;
        cpu
    }

    #[test]
    fn step_advances_pc_and_accumulates_cycles() {
        let mut cpu = cpu_with(&[0x00, 0x00]); // NOP; NOP
        let consumed = cpu.step(decode(0x00));
        assert_eq!(consumed, 4);
        assert_eq!(cpu.regs.pc, 1);
        cpu.step(decode(0x00));
        assert_eq!(cpu.regs.pc, 2);
        assert_eq!(cpu.cycles, 8);
    }

    #[test]
    fn mov_register_to_register() {
        let mut cpu = cpu_with(&[0x41]); // MOV B,C
        cpu.regs.c = 0x77;
        cpu.step(decode(0x41));
        assert_eq!(cpu.regs.b, 0x77);
        assert_eq!(cpu.regs.pc, 1);
    }

    #[test]
    fn mov_through_memory_operand() {
        let mut cpu = cpu_with(&[0x77, 0x4E]); // MOV M,A; MOV C,M
        cpu.regs.a = 0xAB;
        cpu.regs.set_hl(0x2345);
        cpu.step(decode(0x77));
        assert_eq!(cpu.memory.read(0x2345), 0xAB);
        cpu.step(decode(0x4E));
        assert_eq!(cpu.regs.c, 0xAB);
    }

    #[test]
    fn mvi_and_lxi_load_immediates() {
        let mut cpu = cpu_with(&[0x3E, 0x42, 0x21, 0x34, 0x12]); // MVI A,42h; LXI H,1234h
        cpu.step(decode(0x3E));
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 2);
        cpu.step(decode(0x21));
        assert_eq!(cpu.regs.hl(), 0x1234);
        assert_eq!(cpu.regs.pc, 5);
    }

    #[test]
    fn sta_and_lda_use_direct_addressing() {
        let mut cpu = cpu_with(&[0x32, 0x00, 0x40, 0x3A, 0x00, 0x40]); // STA 4000h; LDA 4000h
        cpu.regs.a = 0x5A;
        cpu.step(decode(0x32));
        assert_eq!(cpu.memory.read(0x4000), 0x5A);
        cpu.regs.a = 0;
        cpu.step(decode(0x3A));
        assert_eq!(cpu.regs.a, 0x5A);
    }

    #[test]
    fn shld_and_lhld_move_hl_through_memory() {
        let mut cpu = cpu_with(&[0x22, 0x00, 0x30, 0x2A, 0x00, 0x30]); // SHLD 3000h; LHLD 3000h
        cpu.regs.set_hl(0xCAFE);
        cpu.step(decode(0x22));
        assert_eq!(cpu.memory.read(0x3000), 0xFE);
        assert_eq!(cpu.memory.read(0x3001), 0xCA);
        cpu.regs.set_hl(0);
        cpu.step(decode(0x2A));
        assert_eq!(cpu.regs.hl(), 0xCAFE);
    }

    #[test]
    fn stax_and_ldax_address_through_pairs() {
        let mut cpu = cpu_with(&[0x02, 0x1A]); // STAX B; LDAX D
        cpu.regs.a = 0x99;
        cpu.regs.set_bc(0x1234);
        cpu.regs.set_de(0x1234);
        cpu.step(decode(0x02));
        assert_eq!(cpu.memory.read(0x1234), 0x99);
        cpu.regs.a = 0;
        cpu.step(decode(0x1A));
        assert_eq!(cpu.regs.a, 0x99);
    }

    #[test]
    fn adi_small_add_leaves_carries_clear() {
        let mut cpu = cpu_with(&[0xC6, 0x01]); // ADI 01h
        cpu.regs.a = 0x14;
        cpu.step(decode(0xC6));
        assert_eq!(cpu.regs.a, 0x15);
        assert!(!cpu.flags.zero);
        assert!(!cpu.flags.carry);
        assert!(!cpu.flags.aux_carry);
    }

    #[test]
    fn cmp_keeps_accumulator() {
        let mut cpu = cpu_with(&[0xB8]); // CMP B
        cpu.regs.a = 0x10;
        cpu.regs.b = 0x10;
        cpu.step(decode(0xB8));
        assert_eq!(cpu.regs.a, 0x10);
        assert!(cpu.flags.zero);
    }

    #[test]
    fn inr_and_dcr_on_memory_operand() {
        let mut cpu = cpu_with(&[0x34, 0x35]); // INR M; DCR M
        cpu.regs.set_hl(0x2000);
        cpu.memory.write(0x2000, 0xFF);
        cpu.step(decode(0x34));
        assert_eq!(cpu.memory.read(0x2000), 0x00);
        assert!(cpu.flags.zero);
        assert!(!cpu.flags.carry);
        cpu.step(decode(0x35));
        assert_eq!(cpu.memory.read(0x2000), 0xFF);
        assert!(cpu.flags.sign);
    }

    #[test]
    fn inx_carries_into_the_high_byte() {
        let mut cpu = cpu_with(&[0x03]); // INX B
        cpu.regs.set_bc(0x00FF);
        cpu.step(decode(0x03));
        assert_eq!(cpu.regs.bc(), 0x0100);
    }

    #[test]
    fn inx_and_dcx_wrap_the_full_pair() {
        let mut cpu = cpu_with(&[0x23, 0x2B, 0x2B]); // INX H; DCX H; DCX H
        cpu.regs.set_hl(0xFFFF);
        cpu.step(decode(0x23));
        assert_eq!(cpu.regs.hl(), 0x0000);
        cpu.step(decode(0x2B));
        assert_eq!(cpu.regs.hl(), 0xFFFF);
        cpu.regs.set_hl(0x0100);
        cpu.step(decode(0x2B));
        assert_eq!(cpu.regs.hl(), 0x00FF);
    }

    #[test]
    fn dad_adds_pairs_and_sets_only_carry() {
        let mut cpu = cpu_with(&[0x09]); // DAD B
        cpu.regs.set_hl(0xF000);
        cpu.regs.set_bc(0x2000);
        cpu.flags.zero = true;
        cpu.step(decode(0x09));
        assert_eq!(cpu.regs.hl(), 0x1000);
        assert!(cpu.flags.carry);
        assert!(cpu.flags.zero); // untouched
    }

    #[test]
    fn rotate_family() {
        let mut cpu = cpu_with(&[0x07, 0x0F, 0x17, 0x1F]); // RLC; RRC; RAL; RAR
        cpu.regs.a = 0x80;
        cpu.step(decode(0x07));
        assert_eq!(cpu.regs.a, 0x01);
        assert!(cpu.flags.carry);

        cpu.regs.a = 0x01;
        cpu.step(decode(0x0F));
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.flags.carry);

        cpu.regs.a = 0x80;
        cpu.flags.carry = true;
        cpu.step(decode(0x17));
        assert_eq!(cpu.regs.a, 0x01);
        assert!(cpu.flags.carry);

        // Previous carry enters bit 7 on RAR.
        cpu.regs.a = 0x02;
        cpu.flags.carry = true;
        cpu.step(decode(0x1F));
        assert_eq!(cpu.regs.a, 0x81);
        assert!(!cpu.flags.carry);
    }

    #[test]
    fn cma_flips_bits_and_preserves_flags() {
        let mut cpu = cpu_with(&[0x2F]); // CMA
        cpu.regs.a = 0b1010_0101;
        cpu.flags.carry = true;
        cpu.flags.zero = true;
        cpu.flags.sign = true;
        cpu.flags.parity = true;
        cpu.flags.aux_carry = true;
        let before = cpu.flags;
        cpu.step(decode(0x2F));
        assert_eq!(cpu.regs.a, 0b0101_1010);
        assert_eq!(cpu.flags, before);
    }

    #[test]
    fn stc_sets_and_cmc_toggles_only_carry() {
        let mut cpu = cpu_with(&[0x37, 0x3F, 0x3F]); // STC; CMC; CMC
        cpu.flags.zero = true;
        cpu.step(decode(0x37));
        assert!(cpu.flags.carry);
        assert!(cpu.flags.zero);
        cpu.step(decode(0x3F));
        assert!(!cpu.flags.carry);
        cpu.step(decode(0x3F));
        assert!(cpu.flags.carry);
        assert!(cpu.flags.zero);
    }

    #[test]
    fn push_then_pop_round_trips() {
        let mut cpu = Cpu::new();
        cpu.regs.sp = 0x0100;
        for value in [0x0000u16, 0x00FF, 0xFF00, 0xFFFF, 0x1234] {
            cpu.push_word(value);
            assert_eq!(cpu.pop_word(), value);
            assert_eq!(cpu.regs.sp, 0x0100);
        }

        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let value: u16 = rng.gen();
            cpu.push_word(value);
            assert_eq!(cpu.pop_word(), value);
        }
    }

    #[test]
    fn push_pop_wrap_at_the_ends_of_the_stack_space() {
        let mut cpu = Cpu::new();
        cpu.regs.sp = 0xFFFF;
        cpu.push_word(0xBEEF);
        assert_eq!(cpu.regs.sp, 0x0001);
        assert_eq!(cpu.pop_word(), 0xBEEF);
        assert_eq!(cpu.regs.sp, 0xFFFF);

        // The wrapped push above left 0xEF in the top byte of the stack
        // image; popping from SP = 0 reads [0xFFFE] and [0xFFFF] and gets
        // that byte back as the high half.
        cpu.regs.sp = 0x0000;
        assert_eq!(cpu.pop_word(), 0xEF00);
        assert_eq!(cpu.regs.sp, 0xFFFE);
    }

    #[test]
    fn push_and_pop_opcodes_move_pairs() {
        let mut cpu = cpu_with(&[0xC5, 0xD1]); // PUSH B; POP D
        cpu.regs.set_bc(0xABCD);
        cpu.step(decode(0xC5));
        cpu.step(decode(0xD1));
        assert_eq!(cpu.regs.de(), 0xABCD);
        assert_eq!(cpu.regs.pc, 2);
    }

    #[test]
    fn psw_round_trip_restores_accumulator_and_flags() {
        let mut cpu = cpu_with(&[0xF5, 0xF1]); // PUSH PSW; POP PSW
        cpu.regs.a = 0x5A;
        cpu.flags.sign = true;
        cpu.flags.carry = true;
        cpu.step(decode(0xF5));
        let saved = cpu.flags;
        cpu.regs.a = 0;
        cpu.flags = Flags::default();
        cpu.step(decode(0xF1));
        assert_eq!(cpu.regs.a, 0x5A);
        assert_eq!(cpu.flags, saved);
    }

    #[test]
    fn jmp_sets_pc_without_overshoot() {
        let mut cpu = cpu_with(&[0xC3, 0x00, 0x20]); // JMP 2000h
        cpu.step(decode(0xC3));
        assert_eq!(cpu.regs.pc, 0x2000);
    }

    #[test]
    fn jnz_branches_only_when_zero_clear() {
        let mut cpu = cpu_with(&[0xC2, 0x00, 0x20]); // JNZ 2000h
        cpu.flags.zero = true;
        let consumed = cpu.step(decode(0xC2));
        assert_eq!(cpu.regs.pc, 3);
        assert_eq!(consumed, 10);

        cpu.regs.pc = 0;
        cpu.flags.zero = false;
        let consumed = cpu.step(decode(0xC2));
        assert_eq!(cpu.regs.pc, 0x2000);
        assert_eq!(consumed, 10);
    }

    #[test]
    fn call_then_ret_resumes_after_the_call() {
        // 0x0000: CALL 0x0010; target holds RET.
        let mut cpu = cpu_with(&[0xCD, 0x10, 0x00]);
        cpu.memory.write(0x0010, 0xC9);
        let consumed = cpu.step(decode(0xCD));
        assert_eq!(cpu.regs.pc, 0x0010);
        assert_eq!(consumed, 17);
        let consumed = cpu.step(decode(0xC9));
        assert_eq!(cpu.regs.pc, 0x0003);
        assert_eq!(consumed, 10);
    }

    #[test]
    fn conditional_call_costs_six_more_when_taken() {
        let mut cpu = cpu_with(&[0xC4, 0x00, 0x20]); // CNZ 2000h
        cpu.flags.zero = true;
        let consumed = cpu.step(decode(0xC4));
        assert_eq!(consumed, 11);
        assert_eq!(cpu.regs.pc, 3);

        cpu.regs.pc = 0;
        cpu.flags.zero = false;
        let consumed = cpu.step(decode(0xC4));
        assert_eq!(consumed, 17);
        assert_eq!(cpu.regs.pc, 0x2000);
    }

    #[test]
    fn conditional_return_costs_six_more_when_taken() {
        let mut cpu = cpu_with(&[0xC8]); // RZ
        cpu.push_word(0x1234);
        cpu.flags.zero = false;
        let consumed = cpu.step(decode(0xC8));
        assert_eq!(consumed, 5);
        assert_eq!(cpu.regs.pc, 1);

        cpu.regs.pc = 0;
        cpu.flags.zero = true;
        let consumed = cpu.step(decode(0xC8));
        assert_eq!(consumed, 11);
        assert_eq!(cpu.regs.pc, 0x1234);
    }

    #[test]
    fn rst_pushes_return_address_and_jumps_to_vector() {
        let mut cpu = cpu_with(&[0x00, 0xEF]); // NOP; RST 5
        cpu.step(decode(0x00));
        let consumed = cpu.step(decode(0xEF));
        assert_eq!(cpu.regs.pc, 0x0028);
        assert_eq!(consumed, 11);
        // Registers are untouched and the return address is on the stack.
        assert_eq!(cpu.pop_word(), 0x0002);
    }

    #[test]
    fn pchl_and_sphl_take_hl() {
        let mut cpu = cpu_with(&[0xF9, 0xE9]); // SPHL; PCHL
        cpu.regs.set_hl(0x4321);
        cpu.step(decode(0xF9));
        assert_eq!(cpu.regs.sp, 0x4321);
        assert_eq!(cpu.regs.pc, 1);
        cpu.step(decode(0xE9));
        assert_eq!(cpu.regs.pc, 0x4321);
    }

    #[test]
    fn xthl_exchanges_hl_with_stack_top() {
        let mut cpu = cpu_with(&[0xE3]); // XTHL
        cpu.regs.sp = 0x8000;
        cpu.push_word(0x1111);
        cpu.regs.set_hl(0x2222);
        cpu.step(decode(0xE3));
        assert_eq!(cpu.regs.hl(), 0x1111);
        assert_eq!(cpu.pop_word(), 0x2222);
        assert_eq!(cpu.regs.sp, 0x8000);
    }

    #[test]
    fn xchg_swaps_de_and_hl() {
        let mut cpu = cpu_with(&[0xEB]); // XCHG
        cpu.regs.set_de(0x1234);
        cpu.regs.set_hl(0x5678);
        cpu.step(decode(0xEB));
        assert_eq!(cpu.regs.de(), 0x5678);
        assert_eq!(cpu.regs.hl(), 0x1234);
    }

    #[test]
    fn port_and_interrupt_opcodes_only_consume_length_and_cycles() {
        let mut cpu = cpu_with(&[0xDB, 0x07, 0xD3, 0x07, 0xFB, 0xF3]); // IN 7; OUT 7; EI; DI
        let before_regs = cpu.regs;
        cpu.step(decode(0xDB));
        assert_eq!(cpu.regs.pc, 2);
        cpu.step(decode(0xD3));
        assert_eq!(cpu.regs.pc, 4);
        cpu.step(decode(0xFB));
        cpu.step(decode(0xF3));
        assert_eq!(cpu.regs.pc, 6);
        assert_eq!(cpu.regs.a, before_regs.a);
        assert_eq!(cpu.cycles, 10 + 10 + 4 + 4);
    }

    #[test]
    fn hlt_latches_halted_and_tick_stops_fetching() {
        let mut cpu = cpu_with(&[0x76, 0x3E, 0x42]); // HLT; MVI A,42h
        let consumed = cpu.tick();
        assert_eq!(consumed, 7);
        assert!(cpu.halted);
        assert_eq!(cpu.regs.pc, 1);

        // Halted: no fetch, no cycles, no movement.
        let consumed = cpu.tick();
        assert_eq!(consumed, 0);
        assert_eq!(cpu.regs.pc, 1);
        assert_eq!(cpu.cycles, 7);
        assert_eq!(cpu.regs.a, 0);
    }

    #[test]
    fn reset_restores_power_on_registers_but_keeps_memory() {
        let mut cpu = cpu_with(&[0x76]);
        cpu.memory.write(0x4000, 0xAA);
        cpu.stack.write(0x0000, 0xBB);
        cpu.regs.a = 0x12;
        cpu.flags.carry = true;
        cpu.tick();
        assert!(cpu.halted);

        cpu.reset();
        assert!(!cpu.halted);
        assert_eq!(cpu.regs, Registers::default());
        assert_eq!(cpu.flags.to_byte(), 0x02);
        assert_eq!(cpu.memory.read(0x4000), 0xAA);
        assert_eq!(cpu.stack.read(0x0000), 0xBB);
    }
}
