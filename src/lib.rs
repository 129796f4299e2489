//! **narckit** - a Rust library for decoding Nintendo DS Nitro assets.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::narc`] | NARC - Nitro archive |
//! | [`formats::ncgr`] | NCGR - indexed-color character graphics |
//! | [`formats::nclr`] | NCLR - BGR555 palette |
//! | [`compression::lzss`] | LZ10 / LZ11 compressed streams |
//! | [`crypto::scramble`] | LCG-scrambled image payloads |
//!
//! # Example
//! ```no_run
//! use std::fs::File;
//!
//! use narckit::formats::narc::NarcReader;
//! use narckit::image::{ImageEncoder, pam::PamEncoder};
//!
//! # fn main() -> narckit::Result<()> {
//! let mut narc = NarcReader::new(File::open("pokegra.narc")?)?;
//! let sprite = narc.get(6)?.and_then(|c| c.into_image());
//! let palette = narc.get(10)?.and_then(|c| c.into_palette());
//!
//! if let (Some(sprite), Some(palette)) = (sprite, palette) {
//!     let pixels = sprite.pixels()?;
//!     let colors = palette.colors()?;
//!     let mut out = File::create("6.pam")?;
//!     PamEncoder::default().encode(&pixels.data, &colors, pixels.width, pixels.height, &mut out)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
pub mod crypto;
pub mod error;
pub mod formats;
pub mod image;
mod utils;

pub use error::{Error, Result};
