pub mod flags;
pub mod layout;

use std::fmt::Write as _;

use crate::error::{EmuError, Result};

pub use flags::Flags;
pub use layout::{Reg16, Reg8, REGISTER_FILE_SIZE, SHADOW};

/// Z80 register storage: 26 bytes of static RAM with named byte, word and flag views.
///
/// Registers are addressed by offset into the store. Two adjacent bytes read as a word put the
/// lower offset in the low half, so `B` (offset 2) and `C` (offset 3) holding `0x43` and `0x44`
/// read back as `BC == 0x4443`. Words are always composed and split with shifts, never by
/// reinterpreting the storage.
///
/// Each `RegisterFile` is an ordinary owned value; an emulator core holds its own and passes it
/// where it is needed.
///
/// # Examples
///
/// ```rust
/// use z80_emu::{Flags, RegisterFile};
///
/// let mut regs = RegisterFile::new();
/// regs.set_byte(2, 0x43)?;
/// regs.set_byte(3, 0x44)?;
/// assert_eq!(regs.word(2)?, 0x4443);
/// assert_eq!(regs.bc(), 0x4443);
///
/// regs.set_flag(Flags::ZERO);
/// assert!(regs.get_flag(Flags::ZERO));
/// # Ok::<(), z80_emu::EmuError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    sram: [u8; REGISTER_FILE_SIZE],
}

impl RegisterFile {
    /// Register file with every byte cleared.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(sram: [u8; REGISTER_FILE_SIZE]) -> Self {
        Self { sram }
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_FILE_SIZE] {
        &self.sram
    }

    pub const fn len(&self) -> usize {
        REGISTER_FILE_SIZE
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn reset(&mut self) {
        self.sram = [0; REGISTER_FILE_SIZE];
    }

    fn out_of_range(offset: usize) -> EmuError {
        EmuError::RegisterOutOfRange {
            offset,
            len: REGISTER_FILE_SIZE,
        }
    }

    /// Checks that both bytes of a word at `offset` lie in storage.
    fn word_span(offset: usize) -> Result<std::ops::Range<usize>> {
        match offset.checked_add(1) {
            Some(high) if high < REGISTER_FILE_SIZE => Ok(offset..high + 1),
            _ => Err(Self::out_of_range(offset)),
        }
    }

    // RAW ACCESS //

    pub fn byte(&self, offset: usize) -> Result<u8> {
        self.sram.get(offset).copied().ok_or_else(|| Self::out_of_range(offset))
    }

    pub fn set_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        *self.byte_mut(offset)? = value;
        Ok(())
    }

    pub fn byte_mut(&mut self, offset: usize) -> Result<&mut u8> {
        self.sram.get_mut(offset).ok_or_else(|| Self::out_of_range(offset))
    }

    /// Word at `offset`, low byte from `offset` and high byte from `offset + 1`.
    pub fn word(&self, offset: usize) -> Result<u16> {
        let span = Self::word_span(offset)?;
        Ok(compose(self.sram[span.start], self.sram[span.start + 1]))
    }

    pub fn set_word(&mut self, offset: usize, value: u16) -> Result<()> {
        self.word_mut(offset)?.set(value);
        Ok(())
    }

    /// Mutable 16-bit view over the two bytes at `offset`.
    pub fn word_mut(&mut self, offset: usize) -> Result<WordMut<'_>> {
        let span = Self::word_span(offset)?;
        Ok(WordMut {
            cells: &mut self.sram[span],
        })
    }

    // NAMED ACCESS //
    // Register offsets are fixed and in range, so these index directly.

    pub fn get8(&self, reg: Reg8) -> u8 {
        self.sram[reg.offset()]
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        self.sram[reg.offset()] = value;
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        let offset = reg.offset();
        compose(self.sram[offset], self.sram[offset + 1])
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        let offset = reg.offset();
        let (low, high) = split(value);
        self.sram[offset] = low;
        self.sram[offset + 1] = high;
    }

    // FLAGS //

    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.f())
    }

    /// True when every bit of `flag` is set in F.
    pub fn get_flag(&self, flag: Flags) -> bool {
        self.f() & flag.bits() == flag.bits()
    }

    pub fn set_flag(&mut self, flag: Flags) {
        self.sram[Reg8::F.offset()] |= flag.bits();
    }

    pub fn clear_flag(&mut self, flag: Flags) {
        self.sram[Reg8::F.offset()] &= !flag.bits();
    }

    pub fn assign_flag(&mut self, flag: Flags, value: bool) {
        if value {
            self.set_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }

    // SHADOW SET //

    /// Swaps AF with AF'.
    pub fn exchange_af(&mut self) {
        self.swap_with_shadow(Reg8::F.offset(), 2);
    }

    /// Swaps BC, DE and HL with their shadows.
    pub fn exchange_general(&mut self) {
        self.swap_with_shadow(Reg8::B.offset(), 6);
    }

    fn swap_with_shadow(&mut self, offset: usize, len: usize) {
        let (main, shadow) = self.sram.split_at_mut(SHADOW);
        main[offset..offset + len].swap_with_slice(&mut shadow[offset..offset + len]);
    }

    // DIAGNOSTICS //

    pub fn dump_flags(&self) -> String {
        self.flags().render()
    }

    /// Every register pair as `NAME=$XXXX`, followed by I and R.
    pub fn dump_registers(&self) -> String {
        let mut out = String::new();
        for row in Reg16::ALL.chunks(4) {
            let line: Vec<String> = row
                .iter()
                .map(|&reg| format!("{}=${:04X}", reg, self.get16(reg)))
                .collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        let _ = writeln!(out, "I=${:02X} R=${:02X}", self.i(), self.r());
        out
    }
}

fn compose(low: u8, high: u8) -> u16 {
    u16::from(low) | u16::from(high) << 8
}

fn split(value: u16) -> (u8, u8) {
    ((value & 0xFF) as u8, (value >> 8) as u8)
}

/// Two adjacent register bytes seen as one little-endian word.
#[derive(Debug)]
pub struct WordMut<'a> {
    cells: &'a mut [u8],
}

impl WordMut<'_> {
    pub fn get(&self) -> u16 {
        compose(self.cells[0], self.cells[1])
    }

    pub fn set(&mut self, value: u16) {
        let (low, high) = split(value);
        self.cells[0] = low;
        self.cells[1] = high;
    }

    /// Replaces the word with `f(old)`, returning the new value.
    pub fn update<F: FnOnce(u16) -> u16>(&mut self, f: F) -> u16 {
        let value = f(self.get());
        self.set(value);
        value
    }

    pub fn low(&self) -> u8 {
        self.cells[0]
    }

    pub fn high(&self) -> u8 {
        self.cells[1]
    }
}

/// Generates `name()` / `set_name()` pairs for fixed registers.
macro_rules! named {
    ($ty:ty, $getter:ident, $setter:ident, $($get:ident, $set:ident => $reg:expr;)*) => {
        impl RegisterFile {
            $(
                pub fn $get(&self) -> $ty {
                    self.$getter($reg)
                }

                pub fn $set(&mut self, value: $ty) {
                    self.$setter($reg, value)
                }
            )*
        }
    };
}

named!(u8, get8, set8,
    f, set_f => Reg8::F;
    a, set_a => Reg8::A;
    b, set_b => Reg8::B;
    c, set_c => Reg8::C;
    d, set_d => Reg8::D;
    e, set_e => Reg8::E;
    h, set_h => Reg8::H;
    l, set_l => Reg8::L;
    i, set_i => Reg8::I;
    r, set_r => Reg8::R;
);

named!(u16, get16, set16,
    af, set_af => Reg16::AF;
    bc, set_bc => Reg16::BC;
    de, set_de => Reg16::DE;
    hl, set_hl => Reg16::HL;
    sp, set_sp => Reg16::SP;
    pc, set_pc => Reg16::PC;
    ix, set_ix => Reg16::IX;
    iy, set_iy => Reg16::IY;
    af_alt, set_af_alt => Reg16::AFAlt;
    bc_alt, set_bc_alt => Reg16::BCAlt;
    de_alt, set_de_alt => Reg16::DEAlt;
    hl_alt, set_hl_alt => Reg16::HLAlt;
);

#[cfg(test)]
mod tests {
    use super::*;

    const NAMED_FLAGS: [Flags; 6] = [
        Flags::CARRY,
        Flags::NEGATE,
        Flags::PARITY_OVERFLOW,
        Flags::HALF_CARRY,
        Flags::ZERO,
        Flags::SIGN,
    ];

    #[test]
    fn test_new_register_file_is_zeroed() {
        let regs = RegisterFile::new();
        assert_eq!(regs.len(), 26);
        assert!(regs.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bytes_compose_little_endian_word() {
        let mut regs = RegisterFile::new();
        regs.set_byte(2, b'A').unwrap();
        regs.set_byte(3, b'B').unwrap();
        assert_eq!(regs.b(), b'A');
        assert_eq!(regs.c(), b'B');
        assert_eq!(regs.word(2).unwrap(), 0x4241);

        regs.set_byte(2, 0x43).unwrap();
        regs.set_byte(3, 0x44).unwrap();
        assert_eq!(regs.word(2).unwrap(), 0x4443);
        assert_eq!(regs.bc(), 0x4443);
    }

    #[test]
    fn test_word_write_splits_into_bytes() {
        let mut regs = RegisterFile::new();
        regs.set_word(2, 0x4443).unwrap();
        assert_eq!(regs.b(), b'C');
        assert_eq!(regs.c(), b'D');

        regs.set_a(b'E');
        regs.set_f(b'F');
        assert_eq!(regs.af(), 0x4546);
        regs.set_af(0x4645);
        assert_eq!(regs.f(), 0x45);
        assert_eq!(regs.a(), 0x46);
    }

    #[test]
    fn test_word_round_trip_at_every_offset() {
        let mut regs = RegisterFile::new();
        for offset in 0..REGISTER_FILE_SIZE - 1 {
            let value = 0xA55A ^ (offset as u16 * 0x0101);
            regs.set_word(offset, value).unwrap();
            assert_eq!(regs.word(offset).unwrap(), value);
            assert_eq!(regs.byte(offset).unwrap(), (value & 0xFF) as u8);
            assert_eq!(regs.byte(offset + 1).unwrap(), (value >> 8) as u8);
        }
    }

    #[test]
    fn test_word_mut_view() {
        let mut regs = RegisterFile::new();
        {
            let mut pc = regs.word_mut(Reg16::PC.offset()).unwrap();
            pc.set(0x00FF);
            assert_eq!(pc.update(|v| v.wrapping_add(1)), 0x0100);
            assert_eq!(pc.low(), 0x00);
            assert_eq!(pc.high(), 0x01);
        }
        assert_eq!(regs.pc(), 0x0100);
    }

    #[test]
    fn test_byte_mut_aliases_named_register() {
        let mut regs = RegisterFile::new();
        *regs.byte_mut(Reg8::H.offset()).unwrap() = 0x12;
        *regs.byte_mut(Reg8::L.offset()).unwrap() = 0x34;
        assert_eq!(regs.h(), 0x12);
        assert_eq!(regs.l(), 0x34);
        assert_eq!(regs.hl(), 0x3412);
    }

    #[test]
    fn test_out_of_range_offsets_fail() {
        let mut regs = RegisterFile::new();
        assert!(matches!(
            regs.byte(26),
            Err(EmuError::RegisterOutOfRange { offset: 26, len: 26 })
        ));
        assert!(regs.set_byte(100, 1).is_err());
        assert!(regs.byte_mut(26).is_err());
        assert!(regs.byte(25).is_ok());

        assert!(regs.word(24).is_ok());
        assert!(matches!(
            regs.word(25),
            Err(EmuError::RegisterOutOfRange { offset: 25, .. })
        ));
        assert!(regs.set_word(25, 0xFFFF).is_err());
        assert!(regs.word_mut(usize::MAX).is_err());
        assert_eq!(regs, RegisterFile::new());
    }

    #[test]
    fn test_named_registers_share_storage() {
        let mut regs = RegisterFile::new();
        regs.set_sp(0xFFFE);
        regs.set_ix(0x1234);
        regs.set_iy(0x5678);
        regs.set_i(0x3F);
        regs.set_r(0x7F);
        assert_eq!(regs.word(10).unwrap(), 0xFFFE);
        assert_eq!(regs.word(14).unwrap(), 0x1234);
        assert_eq!(regs.word(16).unwrap(), 0x5678);
        assert_eq!(regs.byte(8).unwrap(), 0x3F);
        assert_eq!(regs.byte(9).unwrap(), 0x7F);
        assert_eq!(regs.get8(Reg8::D), 0);
        regs.set16(Reg16::DE, 0xBEEF);
        assert_eq!(regs.get8(Reg8::D), 0xEF);
        assert_eq!(regs.get8(Reg8::E), 0xBE);
    }

    #[test]
    fn test_set_flag_then_get() {
        for flag in NAMED_FLAGS {
            let mut regs = RegisterFile::new();
            regs.set_flag(flag);
            assert!(regs.get_flag(flag));
            assert_eq!(regs.f(), flag.bits());
            regs.clear_flag(flag);
            assert!(!regs.get_flag(flag));
            assert_eq!(regs.f(), 0);
        }
    }

    #[test]
    fn test_flags_are_isolated() {
        for start in [0x00u8, 0xFF, 0xA5, 0x5A] {
            for flag in NAMED_FLAGS {
                let mut regs = RegisterFile::new();
                regs.set_f(start);
                let before = regs.flags();

                regs.set_flag(flag);
                for other in NAMED_FLAGS.into_iter().filter(|&other| other != flag) {
                    assert_eq!(regs.get_flag(other), before.contains(other));
                }
                assert_eq!(regs.f() & !flag.bits(), start & !flag.bits());

                regs.clear_flag(flag);
                for other in NAMED_FLAGS.into_iter().filter(|&other| other != flag) {
                    assert_eq!(regs.get_flag(other), before.contains(other));
                }
                assert_eq!(regs.f() & !flag.bits(), start & !flag.bits());
            }
        }
    }

    #[test]
    fn test_flags_do_not_touch_a() {
        let mut regs = RegisterFile::new();
        regs.set_a(0x99);
        regs.set_flag(Flags::SIGN | Flags::ZERO);
        regs.assign_flag(Flags::CARRY, true);
        regs.assign_flag(Flags::ZERO, false);
        assert_eq!(regs.a(), 0x99);
        assert_eq!(regs.f(), 0b1000_0001);
    }

    #[test]
    fn test_every_documented_flag_sets_expected_byte() {
        let mut regs = RegisterFile::new();
        for flag in NAMED_FLAGS {
            regs.set_flag(flag);
        }
        assert_eq!(regs.f(), 0b1101_0111);
    }

    #[test]
    fn test_exchange_af_with_shadow() {
        let mut regs = RegisterFile::new();
        regs.set_af(0x1122);
        regs.set_af_alt(0x3344);
        regs.set_bc(0xAAAA);
        regs.exchange_af();
        assert_eq!(regs.af(), 0x3344);
        assert_eq!(regs.af_alt(), 0x1122);
        assert_eq!(regs.bc(), 0xAAAA);
        assert_eq!(regs.bc_alt(), 0);
    }

    #[test]
    fn test_exchange_general_with_shadow() {
        let mut regs = RegisterFile::new();
        regs.set_bc(0x0102);
        regs.set_de(0x0304);
        regs.set_hl(0x0506);
        regs.set_hl_alt(0x0708);
        regs.set_af(0xF0F0);
        regs.exchange_general();
        assert_eq!(regs.bc(), 0);
        assert_eq!(regs.de(), 0);
        assert_eq!(regs.hl(), 0x0708);
        assert_eq!(regs.bc_alt(), 0x0102);
        assert_eq!(regs.de_alt(), 0x0304);
        assert_eq!(regs.hl_alt(), 0x0506);
        assert_eq!(regs.af(), 0xF0F0);
        assert_eq!(regs.af_alt(), 0);
    }

    #[test]
    fn test_independent_instances() {
        let mut first = RegisterFile::new();
        let second = RegisterFile::new();
        first.set_pc(0x8000);
        assert_eq!(first.pc(), 0x8000);
        assert_eq!(second.pc(), 0);
    }

    #[test]
    fn test_dump_flags_reflects_f() {
        let mut regs = RegisterFile::new();
        regs.set_flag(Flags::ZERO);
        regs.set_flag(Flags::NEGATE);
        assert_eq!(
            regs.dump_flags(),
            "SZ H PNC\n01000010\nS:F Z:T - H:F - P/V:F N:T C:F\n"
        );
    }

    #[test]
    fn test_dump_registers_lists_pairs() {
        let mut regs = RegisterFile::new();
        regs.set_hl(0xBEEF);
        regs.set_r(0x12);
        let dump = regs.dump_registers();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "AF=$0000 BC=$0000 DE=$0000 HL=$BEEF");
        assert_eq!(lines[2], "AF'=$0000 BC'=$0000 DE'=$0000 HL'=$0000");
        assert_eq!(lines[3], "I=$00 R=$12");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut regs = RegisterFile::from_bytes([0xFF; REGISTER_FILE_SIZE]);
        regs.reset();
        assert_eq!(regs, RegisterFile::new());
    }
}
