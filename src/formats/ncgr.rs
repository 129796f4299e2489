//! NCGR (Nitro Character Graphic Resource) - indexed-color pixel data.
//!
//! Holds palette indices only; colors come from a matching NCLR.
//!
//! ## Layout
//! ```text
//! [0x00] Standard header, magic "RGCN"   (0x10 bytes, ChunkCount 1 or 2)
//! [0x10] CHAR header                     (0x20 bytes)
//! [0x30] Pixel data                      (DataSize bytes)
//! [...]  CPOS chunk (when ChunkCount = 2, ignored)
//! ```
//!
//! ## CHAR header (0x20 bytes)
//! ```text
//! [0x00] Magic "RAHC"                    (4 bytes)
//! [0x04] ChunkSize                       (u32 LE)
//! [0x08] Height in tiles (0xFFFF = ?)    (u16 LE)
//! [0x0A] Width in tiles  (0xFFFF = ?)    (u16 LE)
//! [0x0C] BitDepth (3 = 4bpp, 4 = 8bpp)   (u32 LE)
//! [0x10] Padding                         (u32)
//! [0x14] Tiled (low byte 0 = 8x8 tiles)  (u32 LE)
//! [0x18] DataSize                        (u32 LE)
//! [0x1C] Unknown                         (u32 LE)
//! ```

use std::io::Read;

use super::header::{NitroHeader, Tag};
use crate::config::RenderOptions;
use crate::crypto::scramble::{ScrambleOrder, descramble};
use crate::utils::{alloc, bytesv, le_u16, le_u32};
use crate::{Error, Result};

/// Width/height value meaning "not recorded".
pub const UNKNOWN_DIMENSION: u16 = 0xFFFF;

/// Edge length of a tile in pixels.
pub const TILE: usize = 8;

/// Pixel packing selected by the CHAR bit-depth code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Two pixels per byte, low nibble first.
    Bpp4,
    /// One pixel per byte.
    Bpp8,
}

impl BitDepth {
    /// Map an on-disk bit-depth code.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            3 => Ok(BitDepth::Bpp4),
            4 => Ok(BitDepth::Bpp8),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }

    /// Number of pixels packed into `bytes` payload bytes.
    pub fn pixel_count(self, bytes: usize) -> usize {
        match self {
            BitDepth::Bpp4 => bytes * 2,
            BitDepth::Bpp8 => bytes,
        }
    }
}

/// CHAR block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharHeader {
    pub size: u32,
    /// Height in tiles, or [`UNKNOWN_DIMENSION`].
    pub height: u16,
    /// Width in tiles, or [`UNKNOWN_DIMENSION`].
    pub width: u16,
    pub bit_depth: u32,
    pub padding: u32,
    pub tiled: u32,
    pub data_size: u32,
    pub unknown: u32,
}

impl CharHeader {
    fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        if Tag::read(r)? != Tag::CHAR {
            return Err(Error::Truncated { section: "CHAR" });
        }
        Ok(Self {
            size: le_u32(r)?,
            height: le_u16(r)?,
            width: le_u16(r)?,
            bit_depth: le_u32(r)?,
            padding: le_u32(r)?,
            tiled: le_u32(r)?,
            data_size: le_u32(r)?,
            unknown: le_u32(r)?,
        })
    }
}

/// Decoded NCGR file.
#[derive(Debug, Clone)]
pub struct Ncgr {
    pub header: NitroHeader,
    pub char_header: CharHeader,
    /// Raw pixel payload exactly as stored.
    pub data: Vec<u8>,
}

/// Reconstructed image: row-major palette indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixels {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Pixels {
    /// Palette index at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        let at = y.checked_mul(self.width)?.checked_add(x)?;
        self.data.get(at).copied()
    }

    /// Iterate over rows of `width` indices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(self.width.max(1))
    }
}

impl Ncgr {
    /// Parse an NCGR file from `r`.
    ///
    /// `r` must be positioned at the standard header.
    pub fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let header = NitroHeader::parse(r).map_err(|e| e.at("NCGR header"))?;
        if !matches!(header.chunk_count, 1 | 2) {
            return Err(Error::Truncated {
                section: "NCGR header",
            });
        }

        let char_header = CharHeader::parse(r).map_err(|e| e.at("CHAR"))?;
        let data = bytesv(r, char_header.data_size as usize).map_err(|e| e.at("CHAR data"))?;

        Ok(Self {
            header,
            char_header,
            data,
        })
    }

    /// Pixel packing of the payload.
    pub fn bit_depth(&self) -> Result<BitDepth> {
        BitDepth::from_code(self.char_header.bit_depth)
    }

    /// Whether the payload is stored as consecutive 8x8 tiles.
    pub fn is_tiled(&self) -> bool {
        self.char_header.tiled & 0xFF == 0
    }

    /// Reverse the payload obfuscation in place.
    pub fn descramble(&mut self, order: ScrambleOrder) {
        descramble(&mut self.data, order);
    }

    /// Image dimensions in pixels as `(width, height)`.
    ///
    /// When the header does not record a width, rows of
    /// [`RenderOptions::untiled_width`] pixels are assumed and the height is
    /// rounded up to fit every pixel.
    pub fn dimensions(&self, opts: &RenderOptions) -> Result<(usize, usize)> {
        let h = &self.char_header;
        if h.width == UNKNOWN_DIMENSION {
            let width = opts.untiled_width.max(1);
            let count = self.bit_depth()?.pixel_count(self.data.len());
            Ok((width, count.div_ceil(width)))
        } else {
            Ok((h.width as usize * TILE, h.height as usize * TILE))
        }
    }

    /// Reconstruct the image with default options.
    pub fn pixels(&self) -> Result<Pixels> {
        self.pixels_with(&RenderOptions::default())
    }

    /// Unpack, then de-tile if needed, into a row-major index buffer.
    pub fn pixels_with(&self, opts: &RenderOptions) -> Result<Pixels> {
        let depth = self.bit_depth()?;
        let (width, height) = self.dimensions(opts)?;
        let size = width * height;

        let mut data = alloc(size)?;
        data.resize(size, 0);

        match depth {
            BitDepth::Bpp4 => {
                if self.data.len() * 2 > size
                    || (self.char_header.width != UNKNOWN_DIMENSION && self.data.len() * 2 != size)
                {
                    return Err(Error::SizeMismatch {
                        what: "4bpp pixel data",
                        expected: size / 2,
                        actual: self.data.len(),
                    });
                }
                for (i, &b) in self.data.iter().enumerate() {
                    data[i * 2] = b & 0x0F;
                    data[i * 2 + 1] = b >> 4;
                }
            }
            BitDepth::Bpp8 => {
                if self.data.len() > size
                    || (self.char_header.width != UNKNOWN_DIMENSION && self.data.len() != size)
                {
                    return Err(Error::SizeMismatch {
                        what: "8bpp pixel data",
                        expected: size,
                        actual: self.data.len(),
                    });
                }
                data[..self.data.len()].copy_from_slice(&self.data);
            }
        }

        if self.is_tiled() {
            data = untile(&data, width, height)?;
        }

        Ok(Pixels {
            width,
            height,
            data,
        })
    }
}

/// Rearrange consecutive 8x8 tiles (row-major tile order) into row-major
/// pixels.
///
/// Only whole tiles are placed; a partial tile row at the bottom stays zero.
pub fn untile(tiles: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut out = alloc(width * height)?;
    out.resize(width * height, 0);

    let mut src = tiles.chunks_exact(TILE);
    for ty in 0..height / TILE {
        for tx in 0..width / TILE {
            for y in 0..TILE {
                let Some(row) = src.next() else {
                    return Ok(out);
                };
                let at = (ty * TILE + y) * width + tx * TILE;
                out[at..at + TILE].copy_from_slice(row);
            }
        }
    }
    Ok(out)
}
