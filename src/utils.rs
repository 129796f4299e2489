//! Low-level I/O primitives shared by all parsers.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity. A short read surfaces as
//! [`Error::Io`] with [`io::ErrorKind::UnexpectedEof`]; callers re-label it
//! with [`Error::at`] where the section matters.

use std::io::{self, Read};

use crate::{Error, Result};

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read + ?Sized>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a little-endian `u16`.
#[inline]
pub(crate) fn le_u16<R: Read + ?Sized>(r: &mut R) -> Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

/// Read a little-endian `u32`.
#[inline]
pub(crate) fn le_u32<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize, R: Read + ?Sized>(r: &mut R) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Largest single reservation made by [`bytesv`].
const READ_STEP: usize = 0x10000;

/// Read exactly `len` bytes into a `Vec`.
///
/// `len` usually comes straight from an on-disk size field, so the buffer
/// grows in steps of at most [`READ_STEP`] as data actually arrives. A size
/// field larger than the stream fails with a short read after one step, and
/// a reservation that cannot be met yields [`Error::OutOfMemory`].
pub(crate) fn bytesv<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut b = alloc(len.min(READ_STEP))?;
    while b.len() < len {
        let step = (len - b.len()).min(READ_STEP);
        b.try_reserve_exact(step)
            .map_err(|_| Error::OutOfMemory { requested: len })?;
        if Read::take(&mut *r, step as u64).read_to_end(&mut b)? != step {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
    }
    Ok(b)
}

/// Allocate an empty `Vec` with room for exactly `len` elements.
pub(crate) fn alloc<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::OutOfMemory {
        requested: len.saturating_mul(size_of::<T>()),
    })?;
    Ok(v)
}
