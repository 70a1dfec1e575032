use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use z80_emu::{AddressedMemory, EmuError, Flags, Reg16, Reg8, RegisterFile};

/// Inspect Z80 memory images and register state.
#[derive(Parser)]
#[command(name = "z80-emu", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a raw image into a memory block and print a hex dump of it
    Dump {
        /// Image file, exactly as large as the block
        image: PathBuf,
        #[command(flatten)]
        block: Block,
        #[command(flatten)]
        range: Range,
        /// Also write the dumped range to this (new) file
        #[arg(long)]
        save_copy: Option<PathBuf>,
    },
    /// Print a freshly initialised memory block
    Fill {
        #[command(flatten)]
        block: Block,
        #[command(flatten)]
        range: Range,
        /// Fill byte; the block is randomised when omitted
        #[arg(long, value_parser = parse_u8)]
        byte: Option<u8>,
        /// Seed for the randomised fill
        #[arg(long, default_value_t = z80_emu::DEFAULT_SEED)]
        seed: u64,
    },
    /// Print the register and flag dumps after applying assignments
    Registers {
        /// Register assignment such as `A=0x3E` or `HL=$4000` (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<Assignment>,
        /// Flag to raise, by name: CARRY, NEGATE, PARITY_OVERFLOW, HALF_CARRY, ZERO, SIGN
        #[arg(long = "flag", value_parser = parse_flag)]
        flags: Vec<Flags>,
        /// Swap AF with AF' afterwards
        #[arg(long)]
        ex_af: bool,
        /// Swap BC, DE and HL with their shadows afterwards
        #[arg(long)]
        exx: bool,
    },
}

#[derive(Args)]
struct Block {
    /// First address of the block
    #[arg(long, value_parser = parse_u16, default_value = "0x0000")]
    base: u16,
    /// Block size
    #[arg(long, value_enum, default_value_t = Capacity::K8)]
    capacity: Capacity,
}

#[derive(Args)]
struct Range {
    /// First address to show (defaults to the start of the block)
    #[arg(long, value_parser = parse_u16)]
    begin: Option<u16>,
    /// Last address to show, inclusive (defaults to the end of the block)
    #[arg(long, value_parser = parse_u16)]
    end: Option<u16>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Capacity {
    #[value(name = "1k")]
    K1,
    #[value(name = "2k")]
    K2,
    #[value(name = "4k")]
    K4,
    #[value(name = "8k")]
    K8,
    #[value(name = "16k")]
    K16,
    #[value(name = "32k")]
    K32,
}

#[derive(Clone, Copy)]
enum Assignment {
    Byte(Reg8, u8),
    Word(Reg16, u16),
}

/// Picks the block size at compile time for each supported capacity.
macro_rules! with_capacity {
    ($capacity:expr, $run:ident ( $($arg:expr),* )) => {
        match $capacity {
            Capacity::K1 => $run::<0x0400>($($arg),*),
            Capacity::K2 => $run::<0x0800>($($arg),*),
            Capacity::K4 => $run::<0x1000>($($arg),*),
            Capacity::K8 => $run::<0x2000>($($arg),*),
            Capacity::K16 => $run::<0x4000>($($arg),*),
            Capacity::K32 => $run::<0x8000>($($arg),*),
        }
    };
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), EmuError> {
    match command {
        Command::Dump {
            image,
            block,
            range,
            save_copy,
        } => with_capacity!(block.capacity, dump(&image, block.base, &range, save_copy.as_deref())),
        Command::Fill {
            block,
            range,
            byte,
            seed,
        } => with_capacity!(block.capacity, fill(block.base, &range, byte, seed)),
        Command::Registers {
            assignments,
            flags,
            ex_af,
            exx,
        } => {
            registers(&assignments, &flags, ex_af, exx);
            Ok(())
        }
    }
}

fn dump<const SIZE: usize>(
    image: &Path,
    base: u16,
    range: &Range,
    save_copy: Option<&Path>,
) -> Result<(), EmuError> {
    let memory = AddressedMemory::<SIZE>::from_file(base, image)?;
    let (begin, end) = resolve(&memory, range);
    println!(
        "{} bytes ${:04X} - ${:04X}",
        memory.size(),
        memory.address_begin(),
        memory.address_end()
    );
    memory.write_dump(&mut io::stdout().lock(), begin, end)?;
    if let Some(path) = save_copy {
        memory.save_range(path, begin, end)?;
        eprintln!("saved ${:04X}-${:04X} to {}", begin, end, path.display());
    }
    Ok(())
}

fn fill<const SIZE: usize>(
    base: u16,
    range: &Range,
    byte: Option<u8>,
    seed: u64,
) -> Result<(), EmuError> {
    let memory = match byte {
        Some(byte) => AddressedMemory::<SIZE>::filled(base, byte)?,
        None => AddressedMemory::<SIZE>::with_seed(base, seed)?,
    };
    let (begin, end) = resolve(&memory, range);
    memory.write_dump(&mut io::stdout().lock(), begin, end)
}

fn resolve<const SIZE: usize>(memory: &AddressedMemory<SIZE>, range: &Range) -> (u16, u16) {
    (
        range.begin.unwrap_or(memory.address_begin()),
        range.end.unwrap_or(memory.address_end()),
    )
}

fn registers(assignments: &[Assignment], flags: &[Flags], ex_af: bool, exx: bool) {
    let mut regs = RegisterFile::new();
    for assignment in assignments {
        match *assignment {
            Assignment::Byte(reg, value) => regs.set8(reg, value),
            Assignment::Word(reg, value) => regs.set16(reg, value),
        }
    }
    for &flag in flags {
        regs.set_flag(flag);
    }
    if ex_af {
        regs.exchange_af();
    }
    if exx {
        regs.exchange_general();
    }
    print!("{}", regs.dump_registers());
    print!("{}", regs.dump_flags());
}

// ARGUMENT PARSERS //

/// Accepts `$FF`, `0xFF` or decimal.
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix('$').or_else(|| s.strip_prefix("0x")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let value = parse_number(s)?;
    u16::try_from(value).map_err(|_| format!("{} does not fit in 16 bits", s))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let value = parse_number(s)?;
    u8::try_from(value).map_err(|_| format!("{} does not fit in 8 bits", s))
}

fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if let Ok(reg) = name.parse::<Reg16>() {
        return Ok(Assignment::Word(reg, parse_u16(value)?));
    }
    let reg = name.parse::<Reg8>().map_err(|e| e.to_string())?;
    Ok(Assignment::Byte(reg, parse_u8(value)?))
}

fn parse_flag(s: &str) -> Result<Flags, String> {
    Flags::from_name(&s.trim().to_ascii_uppercase()).ok_or_else(|| format!("unknown flag '{}'", s))
}
