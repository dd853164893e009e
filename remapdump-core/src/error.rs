use std::io;

/// Failures while reading build metadata out of an executable image.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("missing DOS magic (found {found:#06x})")]
    BadDosMagic { found: u16 },

    #[error("missing PE signature (found {found:#010x})")]
    BadPeSignature { found: u32 },

    #[error("unknown optional header magic {magic:#06x}")]
    UnknownOptionalMagic { magic: u16 },

    #[error("optional header declares {declared} bytes, need at least {required}")]
    OptionalHeaderTooSmall { declared: u16, required: u16 },
}

/// Failures while patching a dump container.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("not a minidump (signature {found:#010x})")]
    BadSignature { found: u32 },

    #[error("stream directory at {rva:#x} with {count} entries exceeds file size {len}")]
    DirectoryOutOfBounds { rva: u32, count: u32, len: usize },

    #[error("stream of type {stream_type} at {rva:#x} exceeds file size {len}")]
    StreamOutOfBounds { stream_type: u32, rva: u32, len: usize },

    #[error("dump is {len} bytes, larger than a 32-bit RVA can address")]
    TooLarge { len: usize },

    #[error("path is not valid unicode: {0}")]
    NonUnicodePath(String),
}
