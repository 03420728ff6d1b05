use std::path::PathBuf;

use i8080_core::Cpu;

const USAGE: &str = "Usage: trace <program_path> [origin_hex] [max_steps]";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let program_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });
    let origin: u16 = match args.next() {
        Some(text) => u16::from_str_radix(text.trim_start_matches("0x"), 16).unwrap_or_else(|_| {
            eprintln!("Invalid origin; expected a hex address like 0100.");
            std::process::exit(2);
        }),
        None => 0,
    };
    let max_steps: u64 = match args.next() {
        Some(text) => text.parse().unwrap_or_else(|_| {
            eprintln!("Invalid step budget; expected an integer.");
            std::process::exit(2);
        }),
        None => 1_000_000,
    };

    let program = std::fs::read(&program_path).unwrap_or_else(|err| {
        eprintln!("Failed to read program '{}': {err}", program_path.display());
        std::process::exit(1);
    });

    let mut cpu = Cpu::new();
    cpu.load(origin, &program);
    cpu.regs.pc = origin;

    let mut steps = 0u64;
    while !cpu.halted && steps < max_steps {
        cpu.tick();
        steps += 1;
    }
    if !cpu.halted {
        eprintln!("Did not reach HLT within {max_steps} steps.");
    }

    println!(
        "A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X}",
        cpu.regs.a, cpu.regs.b, cpu.regs.c, cpu.regs.d, cpu.regs.e, cpu.regs.h, cpu.regs.l
    );
    println!(
        "PC={:04X} SP={:04X} F={:02X} steps={} cycles={}",
        cpu.regs.pc,
        cpu.regs.sp,
        cpu.flags.to_byte(),
        steps,
        cpu.cycles
    );
}
