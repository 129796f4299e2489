//! Chunk tags and the standard Nitro file header.
//!
//! Every Nitro file (NARC, NCGR, NCLR, ...) and every sub-chunk starts with
//! a 4-byte tag. The tags are written as little-endian `u32` values of the
//! multi-character constant, so on disk they appear byte-reversed: an
//! `NCGR` file starts with the bytes `RGCN`, its `CHAR` block with `RAHC`.
//! The NARC container is the one exception that is stored forwards.
//!
//! ## Standard header (0x10 bytes)
//! ```text
//! [0x00] Magic                 (4 bytes)
//! [0x04] BOM (0xFEFF)          (u16 LE)
//! [0x06] Version               (u16 LE)
//! [0x08] FileSize              (u32 LE)
//! [0x0C] HeaderSize (0x10)     (u16 LE)
//! [0x0E] ChunkCount            (u16 LE)
//! ```

use std::fmt;
use std::io::Read;

use crate::Result;
use crate::utils::{bytesa, le_u16, le_u32};

/// A 4-byte chunk tag, held in on-disk byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const NCGR: Tag = Tag::named(b"NCGR");
    pub const NCLR: Tag = Tag::named(b"NCLR");
    pub const NCER: Tag = Tag::named(b"NCER");
    pub const NMAR: Tag = Tag::named(b"NMAR");
    pub const NMCR: Tag = Tag::named(b"NMCR");
    pub const NANR: Tag = Tag::named(b"NANR");
    pub const CHAR: Tag = Tag::named(b"CHAR");
    pub const PLTT: Tag = Tag::named(b"PLTT");
    pub const FATB: Tag = Tag::named(b"FATB");
    pub const FNTB: Tag = Tag::named(b"FNTB");
    pub const FIMG: Tag = Tag::named(b"FIMG");

    /// Build a tag from its readable name, reversing it into disk order.
    pub const fn named(name: &[u8; 4]) -> Self {
        Tag([name[3], name[2], name[1], name[0]])
    }

    /// The tag in readable order (`*b"NCGR"` for an `RGCN` file).
    pub fn name(self) -> [u8; 4] {
        let [a, b, c, d] = self.0;
        [d, c, b, a]
    }

    pub(crate) fn read<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        Ok(Tag(bytesa::<4, R>(r)?))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.name() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// The 16-byte header shared by every Nitro file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NitroHeader {
    pub magic: Tag,
    pub bom: u16,
    pub version: u16,
    /// Total file size in bytes, header included.
    pub size: u32,
    pub header_size: u16,
    /// Number of sub-chunks following the header.
    pub chunk_count: u16,
}

impl NitroHeader {
    /// Size of the header on disk.
    pub const SIZE: usize = 0x10;

    /// Parse a standard header from `r`.
    pub fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        Ok(Self {
            magic: Tag::read(r)?,
            bom: le_u16(r)?,
            version: le_u16(r)?,
            size: le_u32(r)?,
            header_size: le_u16(r)?,
            chunk_count: le_u16(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_reversed_on_disk() {
        assert_eq!(Tag::NCGR.0, *b"RGCN");
        assert_eq!(Tag::NCGR.name(), *b"NCGR");
        assert_eq!(Tag::NCGR.to_string(), "NCGR");
    }

    #[test]
    fn display_escapes_binary_bytes() {
        assert_eq!(Tag([0x00, b'A', b'B', b'C']).to_string(), "CBA\\x00");
    }
}
