
pub mod memory;
pub mod registers;

pub use memory::{AddressedMemory, DEFAULT_SEED};
pub use registers::{Flags, Reg16, Reg8, RegisterFile, WordMut, REGISTER_FILE_SIZE};
