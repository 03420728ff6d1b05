//! A cycle-counting Intel 8080 instruction-set simulator core.
//!
//! The crate decodes the full 256-value opcode space into instruction
//! descriptors and executes them one step at a time against an explicit
//! machine state: register file, flag register, a 64K memory image and a
//! separate 64K stack image. Every step reports its clock-cycle cost and
//! feeds a running counter, so callers can pace the machine however they
//! like.
//!
//! ```
//! use i8080_core::Cpu;
//!
//! let mut cpu = Cpu::new();
//! // MVI A,2Ah; HLT
//! cpu.load(0x0000, &[0x3E, 0x2A, 0x76]);
//! while cpu.tick() != 0 {}
//! assert_eq!(cpu.regs.a, 0x2A);
//! assert_eq!(cpu.cycles, 7 + 7);
//! ```
//!
//! The core is single-threaded and side-effect free beyond its own state:
//! port I/O and interrupts decode and cost cycles but have no device model
//! behind them.

pub mod alu;
pub mod cpu;
pub mod flags;
pub mod memory;
pub mod opcode;
pub mod registers;

pub use cpu::Cpu;
pub use flags::Flags;
pub use memory::AddressSpace;
pub use opcode::{decode, Instruction, Op};
pub use registers::Registers;
