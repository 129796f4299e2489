//! NCLR (Nitro Color Resource) - BGR555 palette.
//!
//! ## Layout
//! ```text
//! [0x00] Standard header, magic "RLCN"   (0x10 bytes)
//! [0x10] PLTT header                     (0x18 bytes)
//! [0x28] Color data                      (DataSize bytes, u16 LE per color)
//! ```
//!
//! ## PLTT header (0x18 bytes)
//! ```text
//! [0x00] Magic "TTLP"                    (4 bytes)
//! [0x04] ChunkSize                       (u32 LE)
//! [0x08] BitDepth (3 = 4bpp, 4 = 8bpp)   (u16 LE)
//! [0x0A] Unknown                         (u16 LE)
//! [0x0C] Padding                         (u32)
//! [0x10] DataSize                        (u32 LE)
//! [0x14] ColorCount                      (u32 LE)
//! ```
//!
//! Color counts above 256 carry an extra high bit and are reduced by 256.

use std::io::Read;

use super::header::{NitroHeader, Tag};
use crate::config::RenderOptions;
use crate::image::Rgba;
use crate::utils::{alloc, bytesv, le_u16, le_u32};
use crate::{Error, Result};

/// Bit-depth code of 8bpp palettes, which always hold 256 colors.
const BIT_DEPTH_8BPP: u16 = 4;

/// PLTT block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlttHeader {
    pub size: u32,
    pub bit_depth: u16,
    pub unknown: u16,
    pub padding: u32,
    pub data_size: u32,
    pub color_count: u32,
}

impl PlttHeader {
    fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        if Tag::read(r)? != Tag::PLTT {
            return Err(Error::Truncated { section: "PLTT" });
        }
        Ok(Self {
            size: le_u32(r)?,
            bit_depth: le_u16(r)?,
            unknown: le_u16(r)?,
            padding: le_u32(r)?,
            data_size: le_u32(r)?,
            color_count: le_u32(r)?,
        })
    }
}

/// Decoded NCLR file.
#[derive(Debug, Clone)]
pub struct Nclr {
    pub header: NitroHeader,
    pub pltt_header: PlttHeader,
    /// Packed BGR555 colors exactly as stored.
    pub data: Vec<u8>,
}

impl Nclr {
    /// Parse an NCLR file from `r`.
    pub fn parse<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let header = NitroHeader::parse(r).map_err(|e| e.at("NCLR header"))?;
        let pltt_header = PlttHeader::parse(r).map_err(|e| e.at("PLTT"))?;
        let data = bytesv(r, pltt_header.data_size as usize).map_err(|e| e.at("PLTT data"))?;

        Ok(Self {
            header,
            pltt_header,
            data,
        })
    }

    /// Number of colors the palette expands to.
    pub fn color_count(&self) -> usize {
        let h = &self.pltt_header;
        if h.bit_depth == BIT_DEPTH_8BPP {
            256
        } else if h.color_count > 256 {
            h.color_count as usize - 256
        } else {
            h.color_count as usize
        }
    }

    /// Unpack the palette with default options.
    pub fn colors(&self) -> Result<Vec<Rgba>> {
        self.colors_with(&RenderOptions::default())
    }

    /// Unpack each BGR555 word into 5-bit channels.
    ///
    /// The color at [`RenderOptions::transparent_index`] gets alpha 0, every
    /// other color alpha 31.
    pub fn colors_with(&self, opts: &RenderOptions) -> Result<Vec<Rgba>> {
        let count = self.color_count();
        if self.data.len() < count * 2 {
            return Err(Error::SizeMismatch {
                what: "palette data",
                expected: count * 2,
                actual: self.data.len(),
            });
        }

        let mut colors = alloc(count)?;
        for (i, w) in self.data.chunks_exact(2).take(count).enumerate() {
            let transparent = opts.transparent_index.is_some_and(|t| t as usize == i);
            colors.push(Rgba::from_bgr555(u16::from_le_bytes([w[0], w[1]]), !transparent));
        }
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nclr(bit_depth: u16, color_count: u32, words: &[u16]) -> Nclr {
        let data: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Nclr {
            header: NitroHeader {
                magic: Tag::NCLR,
                bom: 0xFEFF,
                version: 0x0100,
                size: 0,
                header_size: 0x10,
                chunk_count: 1,
            },
            pltt_header: PlttHeader {
                size: 0,
                bit_depth,
                unknown: 0,
                padding: 0,
                data_size: data.len() as u32,
                color_count,
            },
            data,
        }
    }

    #[test]
    fn unpacks_white_and_alpha() {
        let colors = nclr(3, 2, &[0x7FFF, 0x7FFF]).colors().unwrap();
        assert_eq!(colors[0], Rgba::new(31, 31, 31, 0));
        assert_eq!(colors[1], Rgba::new(31, 31, 31, 31));
    }

    #[test]
    fn channel_bit_positions() {
        let colors = nclr(3, 4, &[0, 0x001F, 0x03E0, 0x7C00]).colors().unwrap();
        assert_eq!(colors[1], Rgba::new(31, 0, 0, 31));
        assert_eq!(colors[2], Rgba::new(0, 31, 0, 31));
        assert_eq!(colors[3], Rgba::new(0, 0, 31, 31));
        // Black at index 0 is still transparent, black elsewhere opaque.
        assert_eq!(colors[0].a, 0);
    }

    #[test]
    fn counts_above_256_drop_the_high_bit() {
        let words = vec![0u16; 16];
        assert_eq!(nclr(3, 256 + 16, &words).color_count(), 16);
        assert_eq!(nclr(3, 256, &words).color_count(), 256);
    }

    #[test]
    fn eight_bpp_always_has_256_colors() {
        let words = vec![0x1234u16; 256];
        let pal = nclr(4, 16, &words);
        assert_eq!(pal.colors().unwrap().len(), 256);
    }

    #[test]
    fn transparent_index_can_be_moved_or_disabled() {
        let pal = nclr(3, 3, &[1, 2, 3]);
        let moved = pal
            .colors_with(&RenderOptions {
                transparent_index: Some(2),
                ..RenderOptions::default()
            })
            .unwrap();
        assert_eq!(moved.iter().map(|c| c.a).collect::<Vec<_>>(), [31, 31, 0]);

        let none = pal
            .colors_with(&RenderOptions {
                transparent_index: None,
                ..RenderOptions::default()
            })
            .unwrap();
        assert!(none.iter().all(|c| c.a == 31));
    }

    #[test]
    fn short_palette_data_is_an_error() {
        let err = nclr(4, 16, &[0; 16]).colors().unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 512, .. }));
    }
}
