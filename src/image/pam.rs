//! Netpbm PAM (`P7`, `RGB_ALPHA`) encoder.
//!
//! With `MAXVAL 31` the native 5-bit channels are written untouched, so no
//! precision is lost. Any other maximum widens each color first.

use std::io::Write;

use super::{ImageEncoder, MAX_5BIT, Rgba};
use crate::config::RenderOptions;
use crate::{Error, Result};

/// Writes palette-expanded RGBA PAM images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PamEncoder {
    /// `MAXVAL` of the output (1..=255).
    pub max_value: u8,
}

impl Default for PamEncoder {
    fn default() -> Self {
        Self {
            max_value: MAX_5BIT,
        }
    }
}

impl PamEncoder {
    pub fn from_options(opts: &RenderOptions) -> Self {
        Self {
            max_value: opts.max_value,
        }
    }
}

impl ImageEncoder for PamEncoder {
    fn encode(
        &self,
        pixels: &[u8],
        colors: &[Rgba],
        width: usize,
        height: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        let size = width * height;
        if pixels.len() < size {
            return Err(Error::SizeMismatch {
                what: "pixel buffer",
                expected: size,
                actual: pixels.len(),
            });
        }

        let max = self.max_value.max(1);
        let table: Vec<Rgba> = if max == MAX_5BIT {
            colors.to_vec()
        } else {
            colors.iter().map(|c| c.widen(max)).collect()
        };

        write!(
            out,
            "P7\nWIDTH {width}\nHEIGHT {height}\nDEPTH 4\nMAXVAL {max}\nTUPLTYPE RGB_ALPHA\nENDHDR\n"
        )?;

        let mut body = Vec::with_capacity(size * 4);
        for &index in &pixels[..size] {
            let c = table.get(index as usize).ok_or(Error::PaletteIndex {
                index,
                len: table.len(),
            })?;
            body.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        out.write_all(&body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_2X1_31: &[u8] =
        b"P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\nMAXVAL 31\nTUPLTYPE RGB_ALPHA\nENDHDR\n";

    #[test]
    fn writes_native_depth() {
        let colors = [Rgba::new(0, 0, 0, 0), Rgba::new(31, 15, 1, 31)];
        let mut out = Vec::new();
        PamEncoder::default()
            .encode(&[1, 0], &colors, 2, 1, &mut out)
            .unwrap();
        assert_eq!(&out[..HEADER_2X1_31.len()], HEADER_2X1_31);
        assert_eq!(&out[HEADER_2X1_31.len()..], [31, 15, 1, 31, 0, 0, 0, 0]);
    }

    #[test]
    fn widens_when_asked() {
        let colors = [Rgba::new(31, 31, 31, 31)];
        let mut out = Vec::new();
        PamEncoder { max_value: 255 }
            .encode(&[0], &colors, 1, 1, &mut out)
            .unwrap();
        assert!(out.starts_with(b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\n"));
        assert_eq!(&out[out.len() - 4..], [255, 255, 255, 255]);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut out = Vec::new();
        let err = PamEncoder::default()
            .encode(&[3], &[Rgba::default()], 1, 1, &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::PaletteIndex { index: 3, len: 1 }));
    }
}
