use crate::error::HeaderError;
use crate::header::Header;
use byteorder::{ByteOrder, ReadBytesExt, LE};
use goblin::pe::header::{DOS_MAGIC, PE_MAGIC, PE_POINTER_OFFSET, SIZEOF_COFF_HEADER};
use goblin::pe::optional_header::{MAGIC_32, MAGIC_64};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Size of `IMAGE_DOS_HEADER`.
pub const SIZEOF_DOS_HEADER: usize = 64;

/// Size of `IMAGE_OPTIONAL_HEADER32`, data directories included.
pub const SIZEOF_OPTIONAL_HEADER_32: u16 = 224;

/// Size of `IMAGE_OPTIONAL_HEADER64`, data directories included.
pub const SIZEOF_OPTIONAL_HEADER_64: u16 = 240;

const OPTIONAL_SIZE_OF_IMAGE: usize = 56;
const OPTIONAL_CHECKSUM: usize = 64;

/// The COFF file header that follows the `PE\0\0` signature.
///
/// Reference: [PE Format](https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#coff-file-header-object-and-image)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoffFileHeader {
    /// Target machine type, e.g. `0x14c` (i386) or `0x8664` (x64).
    pub machine: u16,

    pub number_of_sections: u16,

    /// Seconds since the Unix epoch at which the linker produced the image.
    pub time_date_stamp: u32,

    pub pointer_to_symbol_table: u32,

    pub number_of_symbols: u32,

    /// Bytes the optional header occupies on disk.
    ///
    /// Nothing past this many bytes is read, and an image that declares less
    /// than a full optional header of its own variant is rejected.
    pub size_of_optional_header: u16,

    pub characteristics: u16,
}

impl CoffFileHeader {
    pub fn from_reader<R: Read>(cur: &mut R) -> io::Result<Self> {
        Ok(CoffFileHeader {
            machine: cur.read_u16::<LE>()?,
            number_of_sections: cur.read_u16::<LE>()?,
            time_date_stamp: cur.read_u32::<LE>()?,
            pointer_to_symbol_table: cur.read_u32::<LE>()?,
            number_of_symbols: cur.read_u32::<LE>()?,
            size_of_optional_header: cur.read_u16::<LE>()?,
            characteristics: cur.read_u16::<LE>()?,
        })
    }
}

/// The optional header, kept as the bytes found in the file.
///
/// Only the fields needed to remap a dump are decoded; both the PE32 and PE32+
/// layouts place them at the same offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalHeader {
    pub magic: u16,
    pub raw: Vec<u8>,
}

impl OptionalHeader {
    pub fn is_64(&self) -> bool {
        self.magic == MAGIC_64
    }

    pub fn size_of_image(&self) -> u32 {
        LE::read_u32(&self.raw[OPTIONAL_SIZE_OF_IMAGE..])
    }

    pub fn checksum(&self) -> u32 {
        LE::read_u32(&self.raw[OPTIONAL_CHECKSUM..])
    }
}

/// Required size of the optional header for a given magic.
pub fn required_optional_size(magic: u16) -> Option<u16> {
    match magic {
        MAGIC_32 => Some(SIZEOF_OPTIONAL_HEADER_32),
        MAGIC_64 => Some(SIZEOF_OPTIONAL_HEADER_64),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeHeaders {
    pub nt_offset: u32,
    pub file_header: CoffFileHeader,
    pub optional_header: OptionalHeader,
}

impl PeHeaders {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HeaderError> {
        let file = File::open(path)?;
        Self::from_reader(&mut BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(cur: &mut R) -> Result<Self, HeaderError> {
        let mut dos = [0u8; SIZEOF_DOS_HEADER];
        cur.read_exact(&mut dos)?;

        let e_magic = LE::read_u16(&dos);
        if e_magic != DOS_MAGIC {
            return Err(HeaderError::BadDosMagic { found: e_magic });
        }
        let nt_offset = LE::read_u32(&dos[PE_POINTER_OFFSET as usize..]);

        cur.seek(SeekFrom::Start(nt_offset as u64))?;
        let signature = cur.read_u32::<LE>()?;
        if signature != PE_MAGIC {
            return Err(HeaderError::BadPeSignature { found: signature });
        }

        let mut coff = [0u8; SIZEOF_COFF_HEADER];
        cur.read_exact(&mut coff)?;
        let file_header = CoffFileHeader::from_reader(&mut &coff[..])?;

        let magic = cur.read_u16::<LE>()?;
        let required =
            required_optional_size(magic).ok_or(HeaderError::UnknownOptionalMagic { magic })?;
        if file_header.size_of_optional_header < required {
            return Err(HeaderError::OptionalHeaderTooSmall {
                declared: file_header.size_of_optional_header,
                required,
            });
        }

        let mut raw = vec![0u8; required as usize];
        LE::write_u16(&mut raw, magic);
        cur.read_exact(&mut raw[2..])?;

        Ok(PeHeaders {
            nt_offset,
            file_header,
            optional_header: OptionalHeader { magic, raw },
        })
    }
}

impl Header for PeHeaders {
    fn time_date_stamp(&self) -> u32 {
        self.file_header.time_date_stamp
    }

    fn checksum(&self) -> u32 {
        self.optional_header.checksum()
    }

    fn size_of_image(&self) -> u32 {
        self.optional_header.size_of_image()
    }

    fn is_64(&self) -> bool {
        self.optional_header.is_64()
    }

    fn format_name(&self) -> &'static str {
        if self.is_64() { "PE32+" } else { "PE32" }
    }
}
