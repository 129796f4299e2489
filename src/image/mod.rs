//! Colors and the encoder seam for reconstructed images.
//!
//! Reconstruction produces a [`crate::formats::ncgr::Pixels`] buffer of
//! palette indices and a table of [`Rgba`] colors in the native 5-bit
//! depth. Turning those into a file is the job of an [`ImageEncoder`]; the
//! crate ships [`pam::PamEncoder`] and leaves other formats to callers.

pub mod pam;

use std::io::Write;

use crate::Result;

/// Largest channel value of an unpacked Nitro color.
pub const MAX_5BIT: u8 = 31;

/// One palette color. Channels are 0..=31 until widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a BGR555 word: red in bits 0-4, green 5-9, blue 10-14.
    ///
    /// Bit 15 is ignored.
    pub fn from_bgr555(word: u16, opaque: bool) -> Self {
        Self {
            r: (word & 0x1F) as u8,
            g: ((word >> 5) & 0x1F) as u8,
            b: ((word >> 10) & 0x1F) as u8,
            a: if opaque { MAX_5BIT } else { 0 },
        }
    }

    /// Rescale every channel from 0..=31 to 0..=`max`, rounding to nearest.
    pub fn widen(self, max: u8) -> Self {
        let den = MAX_5BIT as u32;
        let scale = |v: u8| ((v.min(MAX_5BIT) as u32 * max as u32 * 2 + den) / (den * 2)) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: scale(self.a),
        }
    }
}

/// Output sink for a reconstructed image.
pub trait ImageEncoder {
    /// Encode `pixels` (row-major indices into `colors`) of the given size.
    fn encode(
        &self,
        pixels: &[u8],
        colors: &[Rgba],
        width: usize,
        height: usize,
        out: &mut dyn Write,
    ) -> Result<()>;
}
