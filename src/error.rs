use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmuError>;

/// Failures surfaced by memory blocks and the register file.
///
/// Nothing in the core recovers from these; the caller decides.
#[derive(Debug, Error)]
pub enum EmuError {
    #[error("address ${address:04X} outside memory block ${begin:04X}-${end:04X}")]
    OutOfRange { address: u16, begin: u16, end: u16 },
    #[error("register offset {offset} outside {len} byte register file")]
    RegisterOutOfRange { offset: usize, len: usize },
    #[error("memory overflow: requested {requested} bytes larger than memory size {capacity} bytes")]
    Overflow { requested: usize, capacity: usize },
    #[error("invalid range: end ${end:04X} before begin ${begin:04X}")]
    InvalidRange { begin: u16, end: u16 },
    #[error("file load error: \"{}\" file not found", .0.display())]
    FileNotFound(PathBuf),
    #[error("file load error: \"{}\" is {actual} bytes, memory size is {expected} bytes", .path.display())]
    SizeMismatch {
        path: PathBuf,
        actual: u64,
        expected: usize,
    },
    #[error("file save error: \"{}\" file already exists", .0.display())]
    FileAlreadyExists(PathBuf),
    #[error("{size} byte block at ${base:04X} extends past $FFFF")]
    AddressSpaceOverflow { base: u16, size: usize },
    #[error("random bounds {min}..={max} are reversed")]
    InvalidRandomBounds { min: u8, max: u8 },
    #[error("unknown register '{0}'")]
    UnknownRegister(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
