//! Storage building blocks for a Z80 emulator.
//!
//! - [`AddressedMemory`]: a fixed-size byte block answering to a window of the 16-bit address
//!   space, with checked access, fill, dump and raw image load/save.
//! - [`RegisterFile`]: the 26 bytes of Z80 register storage with named byte, word and flag views.
//!
//! The two are independent; a CPU core would own one register file and any number of memory
//! blocks.

pub mod error;
pub mod hardware;

pub use error::{EmuError, Result};
pub use hardware::{
    AddressedMemory, Flags, Reg16, Reg8, RegisterFile, WordMut, DEFAULT_SEED, REGISTER_FILE_SIZE,
};
