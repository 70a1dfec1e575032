use std::fmt;
use std::str::FromStr;

use crate::error::EmuError;

/// Bytes of register storage: two AF/BC/DE/HL sets plus I, R, SP, PC, IX and IY.
pub const REGISTER_FILE_SIZE: usize = 26;

/// Offset of the shadow (primed) register set.
pub const SHADOW: usize = 18;

/// 8-bit register names and where they live in the register file.
///
/// The shadow set mirrors the main set from [`SHADOW`] onwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    F,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    I,
    R,
    FAlt,
    AAlt,
    BAlt,
    CAlt,
    DAlt,
    EAlt,
    HAlt,
    LAlt,
}

impl Reg8 {
    pub const ALL: [Reg8; 18] = [
        Reg8::F,
        Reg8::A,
        Reg8::B,
        Reg8::C,
        Reg8::D,
        Reg8::E,
        Reg8::H,
        Reg8::L,
        Reg8::I,
        Reg8::R,
        Reg8::FAlt,
        Reg8::AAlt,
        Reg8::BAlt,
        Reg8::CAlt,
        Reg8::DAlt,
        Reg8::EAlt,
        Reg8::HAlt,
        Reg8::LAlt,
    ];

    pub const fn offset(self) -> usize {
        match self {
            Reg8::F => 0,
            Reg8::A => 1,
            Reg8::B => 2,
            Reg8::C => 3,
            Reg8::D => 4,
            Reg8::E => 5,
            Reg8::H => 6,
            Reg8::L => 7,
            Reg8::I => 8,
            Reg8::R => 9,
            Reg8::FAlt => SHADOW,
            Reg8::AAlt => SHADOW + 1,
            Reg8::BAlt => SHADOW + 2,
            Reg8::CAlt => SHADOW + 3,
            Reg8::DAlt => SHADOW + 4,
            Reg8::EAlt => SHADOW + 5,
            Reg8::HAlt => SHADOW + 6,
            Reg8::LAlt => SHADOW + 7,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Reg8::F => "F",
            Reg8::A => "A",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::I => "I",
            Reg8::R => "R",
            Reg8::FAlt => "F'",
            Reg8::AAlt => "A'",
            Reg8::BAlt => "B'",
            Reg8::CAlt => "C'",
            Reg8::DAlt => "D'",
            Reg8::EAlt => "E'",
            Reg8::HAlt => "H'",
            Reg8::LAlt => "L'",
        }
    }
}

/// 16-bit register names. Pairs start at their first named byte (AF at F, BC at B), which
/// holds the low half of the word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
    IX,
    IY,
    AFAlt,
    BCAlt,
    DEAlt,
    HLAlt,
}

impl Reg16 {
    pub const ALL: [Reg16; 12] = [
        Reg16::AF,
        Reg16::BC,
        Reg16::DE,
        Reg16::HL,
        Reg16::SP,
        Reg16::PC,
        Reg16::IX,
        Reg16::IY,
        Reg16::AFAlt,
        Reg16::BCAlt,
        Reg16::DEAlt,
        Reg16::HLAlt,
    ];

    pub const fn offset(self) -> usize {
        match self {
            Reg16::AF => Reg8::F.offset(),
            Reg16::BC => Reg8::B.offset(),
            Reg16::DE => Reg8::D.offset(),
            Reg16::HL => Reg8::H.offset(),
            Reg16::SP => 10,
            Reg16::PC => 12,
            Reg16::IX => 14,
            Reg16::IY => 16,
            Reg16::AFAlt => Reg8::FAlt.offset(),
            Reg16::BCAlt => Reg8::BAlt.offset(),
            Reg16::DEAlt => Reg8::DAlt.offset(),
            Reg16::HLAlt => Reg8::HAlt.offset(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
            Reg16::PC => "PC",
            Reg16::IX => "IX",
            Reg16::IY => "IY",
            Reg16::AFAlt => "AF'",
            Reg16::BCAlt => "BC'",
            Reg16::DEAlt => "DE'",
            Reg16::HLAlt => "HL'",
        }
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reg8 {
    type Err = EmuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Reg8::ALL
            .into_iter()
            .find(|reg| reg.name() == wanted)
            .ok_or_else(|| EmuError::UnknownRegister(s.into()))
    }
}

impl FromStr for Reg16 {
    type Err = EmuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Reg16::ALL
            .into_iter()
            .find(|reg| reg.name() == wanted)
            .ok_or_else(|| EmuError::UnknownRegister(s.into()))
    }
}
