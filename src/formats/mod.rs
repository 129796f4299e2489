//! Parsers for Nintendo DS Nitro file formats.
//!
//! All parsers follow the same conventions:
//!
//! * **Generic over** [`std::io::Read`] (+ [`std::io::Seek`] for the
//!   archive) - pass a [`std::fs::File`], a [`std::io::Cursor`], a byte
//!   slice, or anything else that implements the traits.
//! * **Owned results** - decoded chunks own their payload and keep no
//!   reference to the reader they came from.
//! * **Reader wrapper** - [`narc::NarcReader`] owns the underlying reader
//!   and gives bounded access to individual members via
//!   [`std::io::Take<&mut R>`], or decodes them through [`registry`].
//! * **Compression and scrambling are separate** - see
//!   [`crate::compression`] and [`crate::crypto`].
//!
//! ## Format overview
//!
//! | Module     | Format | Description |
//! |------------|--------|-------------|
//! | [`narc`]   | NARC   | Indexed member container |
//! | [`ncgr`]   | NCGR   | Indexed-color pixel data, 4bpp or 8bpp, tiled or linear |
//! | [`nclr`]   | NCLR   | BGR555 palette |
//! | [`header`] | -      | Tags and the standard Nitro header |
//! | [`registry`] | -    | Tag to decoder dispatch |

pub mod header;
pub mod narc;
pub mod ncgr;
pub mod nclr;
pub mod registry;

pub use header::{NitroHeader, Tag};
pub use registry::Chunk;
