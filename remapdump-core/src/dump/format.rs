use byteorder::{ByteOrder, ReadBytesExt, LE};
use std::io::{self, Read};

/// `MINIDUMP_SIGNATURE`, the bytes "MDMP" read as a little-endian `u32`.
pub const MINIDUMP_SIGNATURE: u32 = 0x504d_444d;

/// `ModuleListStream` in the stream directory.
pub const MODULE_LIST_STREAM: u32 = 4;

pub const SIZEOF_HEADER: usize = 32;
pub const SIZEOF_DIRECTORY_ENTRY: usize = 12;
pub const SIZEOF_MODULE: usize = 108;

/// Offset of `CheckSum` within the container header.
pub const HEADER_CHECKSUM: usize = 16;

// Field offsets within a MINIDUMP_MODULE record.
pub const MODULE_SIZE_OF_IMAGE: usize = 8;
pub const MODULE_CHECKSUM: usize = 12;
pub const MODULE_TIME_DATE_STAMP: usize = 16;
pub const MODULE_NAME_RVA: usize = 20;

/// Width of the leftover prefix the cleanup pass strips from a dump.
pub const STALE_PREFIX_LEN: usize = 8;

/// The fixed header at the start of every dump (`MINIDUMP_HEADER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinidumpHeader {
    pub signature: u32,
    pub version: u32,
    pub number_of_streams: u32,
    pub stream_directory_rva: u32,
    pub checksum: u32,
    pub time_date_stamp: u32,
    pub flags: u64,
}

impl MinidumpHeader {
    pub fn from_reader<R: Read>(cur: &mut R) -> io::Result<Self> {
        Ok(MinidumpHeader {
            signature: cur.read_u32::<LE>()?,
            version: cur.read_u32::<LE>()?,
            number_of_streams: cur.read_u32::<LE>()?,
            stream_directory_rva: cur.read_u32::<LE>()?,
            checksum: cur.read_u32::<LE>()?,
            time_date_stamp: cur.read_u32::<LE>()?,
            flags: cur.read_u64::<LE>()?,
        })
    }
}

/// One stream descriptor (`MINIDUMP_DIRECTORY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub stream_type: u32,
    pub data_size: u32,
    pub rva: u32,
}

impl DirectoryEntry {
    pub fn from_reader<R: Read>(cur: &mut R) -> io::Result<Self> {
        Ok(DirectoryEntry {
            stream_type: cur.read_u32::<LE>()?,
            data_size: cur.read_u32::<LE>()?,
            rva: cur.read_u32::<LE>()?,
        })
    }
}

/// Returns the container signature stored at `offset`, if the buffer is long enough.
pub fn signature_at(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?).map(LE::read_u32)
}
