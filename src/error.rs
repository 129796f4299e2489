//! Library-wide error and result types.

use std::io;

use thiserror::Error;

use crate::formats::Tag;

/// Result alias used throughout narckit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Unknown and unsupported member formats are not errors: they surface as
/// `Ok(None)` and [`crate::formats::Chunk::Unsupported`] respectively, with a
/// warning emitted through `tracing`.
#[derive(Debug, Error)]
pub enum Error {
    /// The container magic is not `NARC`.
    #[error("not a NARC archive")]
    NotAnArchive,

    /// A structural section ended early or carried the wrong tag.
    #[error("truncated or malformed {section} section")]
    Truncated { section: &'static str },

    /// A buffer sized from an on-disk field could not be allocated.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A member was recognised but its decoder failed.
    #[error("failed to read {tag} member")]
    ReadFailed {
        tag: Tag,
        #[source]
        source: Box<Error>,
    },

    /// The CHAR header declares a bit-depth code other than 4bpp or 8bpp.
    #[error("unsupported bit depth code: {0}")]
    UnsupportedBitDepth(u32),

    /// A payload does not hold the number of bytes its header implies.
    #[error("{what}: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A member index past the end of the allocation table.
    #[error("member index {index} out of range (archive has {count} members)")]
    IndexOutOfRange { index: usize, count: usize },

    /// An allocation-table record is inverted or runs past the archive.
    #[error("invalid allocation record {index}: {start:#x}..{end:#x}")]
    InvalidRecord { index: usize, start: u32, end: u32 },

    /// The LZSS input ended before the declared output length was produced.
    #[error("compressed stream ended after {produced} of {expected} bytes")]
    TruncatedStream { produced: usize, expected: usize },

    /// The LZSS mode byte is neither `0x10` nor `0x11`.
    #[error("unknown compression type: {0:#04x}")]
    UnknownCompression(u8),

    /// A back-reference points before the start of the output.
    #[error("back-reference displacement {displacement} exceeds {produced} decoded bytes")]
    InvalidBackReference {
        displacement: usize,
        produced: usize,
    },

    /// A pixel refers to a color the palette does not have.
    #[error("pixel index {index} outside palette of {len} colors")]
    PaletteIndex { index: u8, len: usize },

    /// A render options file could not be parsed.
    #[error("options line {line}: {reason}")]
    Config { line: usize, reason: String },

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Re-label a short read as a truncated `section`.
    ///
    /// Any other error passes through unchanged.
    pub(crate) fn at(self, section: &'static str) -> Self {
        match self {
            Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Error::Truncated { section }
            }
            other => other,
        }
    }
}
