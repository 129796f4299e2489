//! Decompression of Nitro LZ-compressed members.
//!
//! Compressed data is not marked in the archive; callers that know a member
//! is compressed read its bytes with
//! [`crate::formats::narc::NarcReader::member_bytes`], expand them here and
//! hand the result to [`crate::formats::registry::decode`].
//!
//! ## Submodules
//!
//! | Module | Algorithm | Typical use |
//! |--------|-----------|-------------|
//! | [`lzss`] | LZ10 / LZ11 (BIOS LZ77 variants) | Overlay files, compressed NARC members |

pub mod lzss;
