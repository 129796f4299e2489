//! Rendering options for pixel and palette reconstruction.
//!
//! This module is a plain data container. The defaults reproduce what the
//! Nitro tools assume; a caller can override them in code or load them from
//! a small text file.
//!
//! ## Options file format
//! One `name = value` entry per line, blank lines and lines starting with
//! `;` or `#` ignored:
//!
//! ```text
//! ; rows of 32 pixels for NCGRs without dimensions
//! untiled_width = 32
//! transparent_index = none
//! max_value = 255
//! ```
//!
//! Unknown names are skipped so that older builds accept newer files.

use std::io::{BufRead, BufReader, Read};

use crate::image::MAX_5BIT;
use crate::{Error, Result};

/// Row width assumed for NCGRs that do not record their dimensions.
pub const DEFAULT_UNTILED_WIDTH: usize = 64;

/// Knobs for [`crate::formats::ncgr::Ncgr::pixels_with`],
/// [`crate::formats::nclr::Nclr::colors_with`] and
/// [`crate::image::pam::PamEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixel row width used when the CHAR header has no width.
    pub untiled_width: usize,
    /// Palette index rendered fully transparent, or [`None`] for none.
    pub transparent_index: Option<u8>,
    /// Output channel maximum; 31 keeps the native 5-bit values.
    pub max_value: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            untiled_width: DEFAULT_UNTILED_WIDTH,
            transparent_index: Some(0),
            max_value: MAX_5BIT,
        }
    }
}

impl RenderOptions {
    /// Create options with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every entry of an options file on top of `self`.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<()> {
        let buf = BufReader::new(reader);
        for (n, line) in buf.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                return Err(config_error(
                    n,
                    format!("expected `name = value`, got `{line}`"),
                ));
            };
            let value = value.trim();

            match name.trim() {
                "untiled_width" => match value.parse::<usize>() {
                    Ok(w) if w > 0 => self.untiled_width = w,
                    _ => return Err(config_error(n, format!("invalid untiled_width `{value}`"))),
                },
                "transparent_index" => {
                    self.transparent_index = if value.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        let index = value.parse::<u8>().map_err(|_| {
                            config_error(n, format!("invalid transparent_index `{value}`"))
                        })?;
                        Some(index)
                    };
                }
                "max_value" => match value.parse::<u8>() {
                    Ok(m) if m > 0 => self.max_value = m,
                    _ => return Err(config_error(n, format!("invalid max_value `{value}`"))),
                },
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse an options file into a fresh set of options.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut opts = Self::default();
        opts.load(reader)?;
        Ok(opts)
    }
}

fn config_error(index: usize, reason: String) -> Error {
    Error::Config {
        line: index + 1,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = RenderOptions::new();
        assert_eq!(opts.untiled_width, 64);
        assert_eq!(opts.transparent_index, Some(0));
        assert_eq!(opts.max_value, 31);
    }

    #[test]
    fn loads_all_keys_and_skips_unknown() {
        let text = "; comment\n\n# another\nuntiled_width = 32\ntransparent_index = NONE\nmax_value=255\nfuture_key = 1\n";
        let opts = RenderOptions::from_reader(text.as_bytes()).unwrap();
        assert_eq!(
            opts,
            RenderOptions {
                untiled_width: 32,
                transparent_index: None,
                max_value: 255,
            }
        );
    }

    #[test]
    fn later_loads_override_earlier_ones() {
        let mut opts = RenderOptions::new();
        opts.load("transparent_index = 5".as_bytes()).unwrap();
        opts.load("max_value = 63".as_bytes()).unwrap();
        assert_eq!(opts.transparent_index, Some(5));
        assert_eq!(opts.max_value, 63);
        assert_eq!(opts.untiled_width, 64);
    }

    #[test]
    fn reports_line_of_bad_value() {
        let err = RenderOptions::from_reader("max_value = 31\nuntiled_width = 0\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::Config { line: 2, .. }));

        let err = RenderOptions::from_reader("garbage".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Config { line: 1, .. }));
    }
}
