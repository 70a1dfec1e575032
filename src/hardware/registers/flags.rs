use bitflags::bitflags;

bitflags! {
    /// Bits of the F register.
    ///
    /// Bits 3 and 5 hold leftovers from the last result on real silicon; they are named `Y`
    /// and `X` here so raw F values survive a round trip, but carry no meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const CARRY           = 0b0000_0001;
        const NEGATE          = 0b0000_0010;
        const PARITY_OVERFLOW = 0b0000_0100;
        const Y               = 0b0000_1000;
        const HALF_CARRY      = 0b0001_0000;
        const X               = 0b0010_0000;
        const ZERO            = 0b0100_0000;
        const SIGN            = 0b1000_0000;
    }
}

/// Column labels for F, most significant bit first. `None` marks the unused bits.
const LABELS: [(Option<&str>, Flags); 8] = [
    (Some("S"), Flags::SIGN),
    (Some("Z"), Flags::ZERO),
    (None, Flags::X),
    (Some("H"), Flags::HALF_CARRY),
    (None, Flags::Y),
    (Some("P/V"), Flags::PARITY_OVERFLOW),
    (Some("N"), Flags::NEGATE),
    (Some("C"), Flags::CARRY),
];

impl Flags {
    /// Diagnostic rendering of F: a header, the byte in binary and one `T`/`F` per flag.
    ///
    /// ```text
    /// SZ H PNC
    /// 10000001
    /// S:T Z:F - H:F - P/V:F N:F C:T
    /// ```
    pub fn render(self) -> String {
        let labelled: Vec<String> = LABELS
            .iter()
            .map(|&(label, flag)| match label {
                Some(label) => format!("{}:{}", label, if self.contains(flag) { 'T' } else { 'F' }),
                None => "-".to_string(),
            })
            .collect();
        format!("SZ H PNC\n{:08b}\n{}\n", self.bits(), labelled.join(" "))
    }
}
