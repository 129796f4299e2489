//! Tag-driven dispatch from a member's leading tag to its decoder.
//!
//! The table is small and fixed, so lookup is a linear scan. Formats that
//! exist in the asset family but have no decoder are registered without a
//! reader: they are reported as [`Chunk::Unsupported`] (header only) rather
//! than dropped as unknown.

use std::io::Read;

use tracing::{debug, warn};

use super::header::{NitroHeader, Tag};
use super::ncgr::Ncgr;
use super::nclr::Nclr;
use crate::{Error, Result};

/// Decoder entry point for one format.
pub type ReadFn = fn(&mut dyn Read) -> Result<Chunk>;

/// Registry entry for one chunk format.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub tag: Tag,
    /// Short human-readable description.
    pub name: &'static str,
    /// [`None`] for formats that are known but not decoded.
    pub read: Option<ReadFn>,
}

impl FormatDescriptor {
    /// Whether members of this format are fully decoded.
    pub fn is_supported(&self) -> bool {
        self.read.is_some()
    }
}

/// A decoded archive member.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// NCGR indexed-color character data.
    Image(Ncgr),
    /// NCLR palette.
    Palette(Nclr),
    /// A known format without a decoder; only its standard header is read.
    Unsupported(NitroHeader),
}

impl Chunk {
    /// Tag of the decoded member.
    pub fn tag(&self) -> Tag {
        match self {
            Chunk::Image(c) => c.header.magic,
            Chunk::Palette(c) => c.header.magic,
            Chunk::Unsupported(h) => h.magic,
        }
    }

    pub fn as_image(&self) -> Option<&Ncgr> {
        match self {
            Chunk::Image(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<Ncgr> {
        match self {
            Chunk::Image(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_palette(&self) -> Option<&Nclr> {
        match self {
            Chunk::Palette(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_palette(self) -> Option<Nclr> {
        match self {
            Chunk::Palette(c) => Some(c),
            _ => None,
        }
    }
}

static FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        tag: Tag::NCGR,
        name: "character graphics",
        read: Some(|r| Ncgr::parse(r).map(Chunk::Image)),
    },
    FormatDescriptor {
        tag: Tag::NCLR,
        name: "color palette",
        read: Some(|r| Nclr::parse(r).map(Chunk::Palette)),
    },
    FormatDescriptor {
        tag: Tag::NCER,
        name: "cell data",
        read: None,
    },
    FormatDescriptor {
        tag: Tag::NMAR,
        name: "multi-cell animation",
        read: None,
    },
    FormatDescriptor {
        tag: Tag::NMCR,
        name: "multi-cell data",
        read: None,
    },
    FormatDescriptor {
        tag: Tag::NANR,
        name: "cell animation",
        read: None,
    },
];

/// All registered formats, supported ones first.
pub fn formats() -> &'static [FormatDescriptor] {
    FORMATS
}

/// Find the descriptor registered for `tag`.
pub fn lookup(tag: Tag) -> Option<&'static FormatDescriptor> {
    FORMATS.iter().find(|f| f.tag == tag)
}

/// Decode one chunk from `r`, dispatching on its leading tag.
///
/// `r` must be positioned at the tag. The tag is peeked and handed back to
/// the decoder in front of the rest of the stream, so `r` never needs to
/// seek. Returns `Ok(None)` (with a warning) for tags that are not
/// registered. Decoder failures are wrapped in [`Error::ReadFailed`].
pub fn decode<R: Read + ?Sized>(r: &mut R) -> Result<Option<Chunk>> {
    let tag = Tag::read(r).map_err(|e| e.at("chunk tag"))?;
    let peeked = tag.0;
    let mut r = (&peeked[..]).chain(r);

    let Some(format) = lookup(tag) else {
        warn!(%tag, "unknown format");
        return Ok(None);
    };

    let result = match format.read {
        Some(read) => {
            debug!(%tag, format = format.name, "decoding chunk");
            read(&mut r)
        }
        None => {
            warn!(%tag, "unsupported format");
            NitroHeader::parse(&mut r).map(Chunk::Unsupported)
        }
    };

    result.map(Some).map_err(|e| Error::ReadFailed {
        tag,
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn header(tag: Tag, chunk_count: u16) -> Vec<u8> {
        let mut b = tag.0.to_vec();
        b.extend_from_slice(&0xFEFFu16.to_le_bytes());
        b.extend_from_slice(&0x0100u16.to_le_bytes());
        b.extend_from_slice(&0x10u32.to_le_bytes());
        b.extend_from_slice(&0x10u16.to_le_bytes());
        b.extend_from_slice(&chunk_count.to_le_bytes());
        b
    }

    #[test]
    fn lookup_matches_exact_tag() {
        assert!(lookup(Tag::NCGR).is_some_and(FormatDescriptor::is_supported));
        assert!(lookup(Tag::NANR).is_some_and(|f| !f.is_supported()));
        assert!(lookup(Tag::named(b"NSCR")).is_none());
        // Readable order on disk is a different tag.
        assert!(lookup(Tag(*b"NCGR")).is_none());
    }

    #[test]
    fn unknown_tag_decodes_to_none() {
        let mut r = Cursor::new(b"ABCDEFGHIJKLMNOP".to_vec());
        assert!(decode(&mut r).unwrap().is_none());
    }

    #[test]
    fn unsupported_tag_yields_header_stub() {
        let mut r = Cursor::new(header(Tag::NCER, 3));
        let chunk = decode(&mut r).unwrap().unwrap();
        match chunk {
            Chunk::Unsupported(h) => {
                assert_eq!(h.magic, Tag::NCER);
                assert_eq!(h.chunk_count, 3);
            }
            other => panic!("expected stub, got {other:?}"),
        }
    }

    #[test]
    fn decoder_failure_is_wrapped() {
        // Header only, CHAR block missing.
        let mut r = Cursor::new(header(Tag::NCGR, 1));
        match decode(&mut r) {
            Err(Error::ReadFailed { tag, .. }) => assert_eq!(tag, Tag::NCGR),
            other => panic!("expected ReadFailed, got {other:?}"),
        }
    }
}
