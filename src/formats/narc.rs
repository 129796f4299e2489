//! NARC (Nitro ARChive) - indexed file container used by DS games.
//!
//! Members have no useful names here: the FNTB name table is skipped and
//! members are addressed by their position in the FATB.
//!
//! ## Layout
//! ```text
//! [0x00] Standard header, magic "NARC"  (0x10 bytes, stored forwards)
//! [0x10] FATB block                     (0x0C bytes + FileCount × 8)
//! [...]  FNTB block                     (ChunkSize bytes, skipped)
//! [...]  FIMG block header              (0x08 bytes)
//! [...]  Member data
//! ```
//!
//! ## FATB (File Allocation Table Block)
//! ```text
//! [0x00] Magic "BTAF"                   (4 bytes)
//! [0x04] ChunkSize                      (u32 LE)
//! [0x08] FileCount                      (u32 LE)
//! [0x0C] Records                        (FileCount × 8 bytes)
//! ```
//!
//! ## FATB record (0x08 bytes)
//! ```text
//! [0x00] Start - relative to FIMG data   (u32 LE)
//! [0x04] End   - exclusive               (u32 LE)
//! ```
//!
//! ## FNTB / FIMG
//! ```text
//! [0x00] Magic "BTNF" / "GMIF"          (4 bytes)
//! [0x04] ChunkSize, header included     (u32 LE)
//! ```

use std::io::{Read, Seek, SeekFrom, Take};
use std::ops::Index;

use tracing::debug;

use super::header::{NitroHeader, Tag};
use super::registry::{self, Chunk};
use crate::utils::{alloc, bytesv, le_u32};
use crate::{Error, Result};

/// The container magic. Unlike every other Nitro tag it is stored in
/// readable order.
pub const NARC_MAGIC: Tag = Tag(*b"NARC");

/// Members this small hold at most a tag and carry no data.
const EMPTY_MEMBER_MAX: u32 = 4;

/// Parsed NARC archive (metadata only).
///
/// Member data is accessed via [`NarcReader`].
#[derive(Debug)]
pub struct Narc {
    pub header: NitroHeader,
    /// One record per member; the index is the member's identity.
    pub records: Vec<FatRecord>,
    /// Absolute stream offset where member data begins.
    pub(crate) data_offset: u64,
}

/// Byte range of one member, relative to the FIMG data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatRecord {
    pub start: u32,
    pub end: u32,
}

impl FatRecord {
    /// Size of the member in bytes.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start) as u64
    }
}

impl Narc {
    /// Parse a NARC archive from `r`.
    ///
    /// `r` must be positioned at the very beginning of the NARC magic. On
    /// return it sits at the start of the member data.
    pub fn parse<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let narc_start = r.stream_position()?;

        let header = NitroHeader::parse(r).map_err(|e| e.at("NARC header"))?;
        if header.magic != NARC_MAGIC {
            return Err(Error::NotAnArchive);
        }

        let records = read_fatb(r).map_err(|e| e.at("FATB"))?;
        skip_fntb(r).map_err(|e| e.at("FNTB"))?;

        if Tag::read(r).map_err(|e| e.at("FIMG"))? != Tag::FIMG {
            return Err(Error::Truncated { section: "FIMG" });
        }
        let _fimg_size = le_u32(r).map_err(|e| e.at("FIMG"))?;
        let data_offset = r.stream_position()?;

        let archive_end = narc_start + header.size as u64;
        for (index, rec) in records.iter().enumerate() {
            if rec.start > rec.end || data_offset + rec.end as u64 > archive_end {
                return Err(Error::InvalidRecord {
                    index,
                    start: rec.start,
                    end: rec.end,
                });
            }
        }

        debug!(members = records.len(), data_offset, "opened NARC");

        Ok(Self {
            header,
            records,
            data_offset,
        })
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a member's record.
    pub fn record(&self, index: usize) -> Result<FatRecord> {
        self.records
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                count: self.records.len(),
            })
    }
}

fn read_fatb<R: Read>(r: &mut R) -> Result<Vec<FatRecord>> {
    if Tag::read(r)? != Tag::FATB {
        return Err(Error::Truncated { section: "FATB" });
    }
    let size = le_u32(r)? as u64;
    let count = le_u32(r)?;
    if size < 12 + count as u64 * 8 {
        return Err(Error::Truncated { section: "FATB" });
    }

    let mut records = alloc(count as usize)?;
    for _ in 0..count {
        records.push(FatRecord {
            start: le_u32(r)?,
            end: le_u32(r)?,
        });
    }
    Ok(records)
}

fn skip_fntb<R: Read + Seek>(r: &mut R) -> Result<()> {
    if Tag::read(r)? != Tag::FNTB {
        return Err(Error::Truncated { section: "FNTB" });
    }
    let size = le_u32(r)?;
    let body = size
        .checked_sub(8)
        .ok_or(Error::Truncated { section: "FNTB" })?;
    r.seek(SeekFrom::Current(body as i64))?;
    Ok(())
}

/// Streaming reader wrapper over a parsed [`Narc`] archive.
///
/// Every access repositions the one underlying reader, so a `NarcReader`
/// serves one caller at a time; open one per thread for parallel work.
/// Decoded chunks are owned values and outlive the reader.
pub struct NarcReader<R> {
    inner: R,
    /// Parsed metadata.
    pub narc: Narc,
}

impl<R: Read + Seek> NarcReader<R> {
    /// Parse a NARC archive and wrap the provided reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let narc = Narc::parse(&mut reader)?;
        Ok(Self {
            inner: reader,
            narc,
        })
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.narc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.narc.is_empty()
    }

    /// Iterate over all member records.
    pub fn records(&self) -> impl Iterator<Item = &FatRecord> {
        self.narc.records.iter()
    }

    /// Open a member for streaming access.
    ///
    /// Seeks to the member's start and returns a [`Take`] limited to its
    /// byte range. The borrow ends when the [`Take`] is dropped.
    pub fn read_member(&mut self, index: usize) -> Result<Take<&mut R>> {
        let rec = self.narc.record(index)?;
        self.inner
            .seek(SeekFrom::Start(self.narc.data_offset + rec.start as u64))?;
        Ok(self.inner.by_ref().take(rec.size()))
    }

    /// Read a member's raw bytes, e.g. to decompress them first.
    pub fn member_bytes(&mut self, index: usize) -> Result<Vec<u8>> {
        let size = self.narc.record(index)?.size() as usize;
        let mut member = self.read_member(index)?;
        bytesv(&mut member, size).map_err(|e| e.at("member data"))
    }

    /// Peek the tag a member starts with, without decoding it.
    ///
    /// Returns [`None`] for members shorter than a tag.
    pub fn tag_of(&mut self, index: usize) -> Result<Option<Tag>> {
        let mut member = self.read_member(index)?;
        if member.limit() < 4 {
            return Ok(None);
        }
        Tag::read(&mut member)
            .map(Some)
            .map_err(|e| e.at("member data"))
    }

    /// Decode a member through the format registry.
    ///
    /// * `Ok(None)` - the member is empty (a bare tag or less) or its tag is
    ///   not registered (a warning is logged).
    /// * `Ok(Some(Chunk::Unsupported(_)))` - a known format without a
    ///   decoder; only the standard header was read.
    /// * `Err(Error::ReadFailed { .. })` - the decoder failed. The reader
    ///   stays usable for other members.
    ///
    /// Reads never go past the member's end.
    pub fn get(&mut self, index: usize) -> Result<Option<Chunk>> {
        let rec = self.narc.record(index)?;
        if rec.size() <= EMPTY_MEMBER_MAX as u64 {
            return Ok(None);
        }
        debug!(index, start = rec.start, end = rec.end, "decoding member");
        let mut member = self.read_member(index)?;
        registry::decode(&mut member)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Index<usize> for NarcReader<R> {
    type Output = FatRecord;

    /// Index by member number.
    ///
    /// # Panics
    /// Panics if the index is past the last member.
    fn index(&self, index: usize) -> &Self::Output {
        self.narc
            .records
            .get(index)
            .unwrap_or_else(|| panic!("no member {index} in NARC"))
    }
}
