use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EmuError, Result};

/// Bytes rendered per dump line.
const PARAGRAPH: usize = 16;

/// Seed used by [`AddressedMemory::new`], so two blocks built the same way hold the same noise.
pub const DEFAULT_SEED: u64 = 0x5A80;

/// A fixed-size block of memory mapped at an arbitrary base address.
///
/// `SIZE` bytes answer to addresses `$begin..=$begin + SIZE - 1`. Every access is checked
/// against that window and reports [`EmuError::OutOfRange`] instead of wrapping or panicking,
/// so a block can stand in for ROM or RAM anywhere in the 64K Z80 address space.
///
/// # Examples
///
/// ```rust
/// use z80_emu::AddressedMemory;
///
/// let mut ram = AddressedMemory::<1024>::filled(0x4000, 0x00)?;
/// ram.write(0x4010, 0x41)?;
/// assert_eq!(ram.read(0x4010)?, 0x41);
/// assert!(ram.read(0x4400).is_err());
/// # Ok::<(), z80_emu::EmuError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AddressedMemory<const SIZE: usize> {
    begin: u16,
    end: u16,
    bytes: Box<[u8]>,
}

impl<const SIZE: usize> AddressedMemory<SIZE> {
    const VALID_SIZE: () = assert!(
        SIZE > 0 && SIZE <= 0x10000,
        "memory block size must be between 1 and 65536 bytes"
    );

    /// Zeroed block, after checking the window fits below $FFFF.
    fn blank(begin: u16) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SIZE;
        let end = begin as usize + SIZE - 1;
        if end > u16::MAX as usize {
            return Err(EmuError::AddressSpaceOverflow { base: begin, size: SIZE });
        }
        Ok(Self {
            begin,
            end: end as u16,
            bytes: vec![0; SIZE].into_boxed_slice(),
        })
    }

    /// Block at `begin` holding pseudo-random bytes, like uninitialised RAM at power on.
    ///
    /// Seeded with [`DEFAULT_SEED`], so the contents are reproducible.
    pub fn new(begin: u16) -> Result<Self> {
        Self::with_seed(begin, DEFAULT_SEED)
    }

    pub fn with_seed(begin: u16, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(begin, &mut rng)
    }

    /// Block at `begin` randomised from a caller supplied generator.
    pub fn with_rng<R: Rng>(begin: u16, rng: &mut R) -> Result<Self> {
        let mut memory = Self::blank(begin)?;
        memory.randomize(rng);
        Ok(memory)
    }

    /// Block at `begin` with every cell set to `byte`.
    pub fn filled(begin: u16, byte: u8) -> Result<Self> {
        let mut memory = Self::blank(begin)?;
        memory.fill(byte);
        Ok(memory)
    }

    /// Block at `begin` loaded from a raw image of exactly `SIZE` bytes.
    pub fn from_file<P: AsRef<Path>>(begin: u16, path: P) -> Result<Self> {
        let mut memory = Self::blank(begin)?;
        memory.load(path)?;
        Ok(memory)
    }

    pub fn address_begin(&self) -> u16 {
        self.begin
    }

    /// Last valid address, always `address_begin() + size() - 1`.
    pub fn address_end(&self) -> u16 {
        self.end
    }

    pub const fn size(&self) -> usize {
        SIZE
    }

    /// Bytes per dump line.
    pub const fn columns(&self) -> usize {
        if SIZE < PARAGRAPH {
            SIZE
        } else {
            PARAGRAPH
        }
    }

    pub fn contains(&self, address: u16) -> bool {
        (self.begin..=self.end).contains(&address)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    fn index(&self, address: u16) -> Result<usize> {
        if self.contains(address) {
            Ok((address - self.begin) as usize)
        } else {
            Err(EmuError::OutOfRange {
                address,
                begin: self.begin,
                end: self.end,
            })
        }
    }

    /// Translates `begin..=end` into storage indices, rejecting it whole before anything
    /// touches the buffer.
    fn span(&self, begin: u16, end: u16) -> Result<RangeInclusive<usize>> {
        if end < begin {
            return Err(EmuError::InvalidRange { begin, end });
        }
        let requested = (end - begin) as usize + 1;
        if requested > SIZE {
            return Err(EmuError::Overflow {
                requested,
                capacity: SIZE,
            });
        }
        Ok(self.index(begin)?..=self.index(end)?)
    }

    pub fn read(&self, address: u16) -> Result<u8> {
        Ok(self.bytes[self.index(address)?])
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<()> {
        *self.get_mut(address)? = value;
        Ok(())
    }

    /// Mutable access to the cell behind `address`.
    pub fn get_mut(&mut self, address: u16) -> Result<&mut u8> {
        let index = self.index(address)?;
        Ok(&mut self.bytes[index])
    }

    pub fn fill(&mut self, byte: u8) {
        self.bytes.fill(byte);
    }

    /// Sets every cell in `begin..=end` to `byte`.
    pub fn fill_range(&mut self, byte: u8, begin: u16, end: u16) -> Result<()> {
        let span = self.span(begin, end)?;
        self.bytes[span].fill(byte);
        Ok(())
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        rng.fill(&mut self.bytes[..]);
    }

    /// Randomises every cell with values drawn from `min..=max`.
    pub fn randomize_between<R: Rng>(&mut self, rng: &mut R, min: u8, max: u8) -> Result<()> {
        if min > max {
            return Err(EmuError::InvalidRandomBounds { min, max });
        }
        for byte in self.bytes.iter_mut() {
            *byte = rng.random_range(min..=max);
        }
        Ok(())
    }

    /// Replaces the whole block with the contents of a raw image.
    ///
    /// The image must be exactly `SIZE` bytes; anything shorter or longer is a
    /// [`EmuError::SizeMismatch`]. The block is left untouched on failure.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EmuError::FileNotFound(path.to_path_buf()))
            }
            other => other?,
        };
        self.check_image_size(path, metadata.len())?;
        let image = fs::read(path)?;
        // The file may have changed between the two calls.
        self.check_image_size(path, image.len() as u64)?;
        self.bytes.copy_from_slice(&image);
        Ok(())
    }

    fn check_image_size(&self, path: &Path, actual: u64) -> Result<()> {
        if actual != SIZE as u64 {
            return Err(EmuError::SizeMismatch {
                path: path.to_path_buf(),
                actual,
                expected: SIZE,
            });
        }
        Ok(())
    }

    /// Writes the whole block to a new file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_range(path, self.begin, self.end)
    }

    /// Writes `begin..=end` to a new file. Existing files are never overwritten.
    pub fn save_range<P: AsRef<Path>>(&self, path: P, begin: u16, end: u16) -> Result<()> {
        let span = self.span(begin, end)?;
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => EmuError::FileAlreadyExists(path.to_path_buf()),
                _ => EmuError::Io(e),
            })?;
        file.write_all(&self.bytes[span])?;
        Ok(())
    }

    /// Hex and ASCII rendering of the whole block.
    pub fn dump(&self) -> String {
        self.to_string()
    }

    /// Hex and ASCII rendering of `begin..=end`.
    pub fn dump_range(&self, begin: u16, end: u16) -> Result<String> {
        let span = self.span(begin, end)?;
        Ok(self.paragraphs(span).to_string())
    }

    /// Streams the rendering of `begin..=end` into `out`.
    pub fn write_dump<W: Write>(&self, out: &mut W, begin: u16, end: u16) -> Result<()> {
        let span = self.span(begin, end)?;
        write!(out, "{}", self.paragraphs(span))?;
        Ok(())
    }

    fn paragraphs(&self, span: RangeInclusive<usize>) -> Paragraphs<'_> {
        Paragraphs {
            origin: self.begin as usize + span.start(),
            bytes: &self.bytes[span],
            columns: self.columns(),
        }
    }
}

impl<const SIZE: usize> fmt::Display for AddressedMemory<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.paragraphs(0..=SIZE - 1), f)
    }
}

impl<const SIZE: usize> fmt::Debug for AddressedMemory<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressedMemory")
            .field("begin", &format_args!("${:04X}", self.begin))
            .field("end", &format_args!("${:04X}", self.end))
            .field("size", &SIZE)
            .finish()
    }
}

/// Dump lines for a run of bytes starting at address `origin`.
///
/// `$1000 41 42 ... | AB.. |`, one line per `columns` bytes. A short final line is padded
/// so the ASCII column stays aligned.
struct Paragraphs<'a> {
    origin: usize,
    bytes: &'a [u8],
    columns: usize,
}

impl fmt::Display for Paragraphs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, row) in self.bytes.chunks(self.columns).enumerate() {
            write!(f, "${:04X} ", self.origin + line * self.columns)?;
            for byte in row {
                write!(f, "{:02X} ", byte)?;
            }
            for _ in row.len()..self.columns {
                f.write_str("   ")?;
            }
            f.write_str("| ")?;
            for &byte in row {
                f.write_char(printable(byte))?;
            }
            for _ in row.len()..self.columns {
                f.write_char(' ')?;
            }
            f.write_str(" |\n")?;
        }
        Ok(())
    }
}

/// Control characters, DEL and the high half render as `.`.
fn printable(byte: u8) -> char {
    if (0x20..0x7F).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}
