//! LZSS decompression in the two Nitro layouts, LZ10 and LZ11.
//!
//! ## Stream layout
//! ```text
//! [0x00] Type (0x10 = LZ10, 0x11 = LZ11)   (u8)
//! [0x01] DecompressedSize                  (u24 LE)
//!        if zero, followed by              (u32 LE)
//! [...]  Flag groups
//! ```
//!
//! Each flag group is one flag byte followed by up to eight tokens. Flag
//! bits are read most significant first: 0 is a literal byte, 1 is a
//! back-reference copying `length` bytes from `displacement` bytes behind
//! the output position.
//!
//! ## Back-references
//! ```text
//! LZ10  LLLLDDDD DDDDDDDD                      len = L + 3
//! LZ11  IIIIDDDD DDDDDDDD           (I >= 2)   len = I + 1
//!       0000LLLL LLLLDDDD DDDDDDDD             len = L + 0x11
//!       0001LLLL LLLLLLLL LLLLDDDD DDDDDDDD    len = L + 0x111
//!                                              disp = D + 1
//! ```
//!
//! Copies go one byte at a time: a reference may overlap the bytes it is
//! producing, which is how runs are encoded.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::utils::{alloc, le_u32, u8};
use crate::{Error, Result};

/// Size of the history window. Displacements reach 4096 bytes back, so the
/// classic 4 KiB window is not enough headroom.
pub const WINDOW_SIZE: usize = 8192;

const FLUSH_AT: usize = 4096;

/// Back-reference layout, selected by the stream's type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzssMode {
    /// Type `0x10`: fixed 2-byte references, lengths 3..=18.
    Lz10,
    /// Type `0x11`: 2 to 4-byte references, lengths 3..=0x10110.
    Lz11,
}

impl LzssMode {
    /// Map a stream type byte.
    pub fn from_marker(marker: u8) -> Result<Self> {
        match marker {
            0x10 => Ok(LzssMode::Lz10),
            0x11 => Ok(LzssMode::Lz11),
            other => Err(Error::UnknownCompression(other)),
        }
    }

    /// The stream type byte for this mode.
    pub fn marker(self) -> u8 {
        match self {
            LzssMode::Lz10 => 0x10,
            LzssMode::Lz11 => 0x11,
        }
    }

    /// Shortest match a back-reference can encode.
    pub fn min_match(self) -> usize {
        match self {
            LzssMode::Lz10 => 3,
            LzssMode::Lz11 => 3,
        }
    }

    /// Read one back-reference as `(length, displacement)`.
    fn reference<R: Read + ?Sized>(self, r: &mut R) -> Result<(usize, usize)> {
        let b0 = u8(r)? as usize;
        let b1 = u8(r)? as usize;
        match self {
            LzssMode::Lz10 => Ok(((b0 >> 4) + 3, ((b0 & 0xF) << 8 | b1) + 1)),
            LzssMode::Lz11 => match b0 >> 4 {
                0 => {
                    let b2 = u8(r)? as usize;
                    let len = ((b0 & 0xF) << 4 | b1 >> 4) + 0x11;
                    Ok((len, ((b1 & 0xF) << 8 | b2) + 1))
                }
                1 => {
                    let b2 = u8(r)? as usize;
                    let b3 = u8(r)? as usize;
                    let len = ((b0 & 0xF) << 12 | b1 << 4 | b2 >> 4) + 0x111;
                    Ok((len, ((b2 & 0xF) << 8 | b3) + 1))
                }
                indicator => Ok((indicator + 1, ((b0 & 0xF) << 8 | b1) + 1)),
            },
        }
    }
}

/// Read the type byte and decompressed size.
pub fn read_header<R: Read + ?Sized>(r: &mut R) -> Result<(LzssMode, usize)> {
    let word = le_u32(r).map_err(|e| e.at("LZSS header"))?;
    let mode = LzssMode::from_marker(word as u8)?;
    let mut size = (word >> 8) as usize;
    if size == 0 {
        size = le_u32(r).map_err(|e| e.at("LZSS header"))? as usize;
    }
    Ok((mode, size))
}

/// Decompress a complete stream, header included.
pub fn decompress_file<R: Read + ?Sized>(r: &mut R) -> Result<Vec<u8>> {
    let (mode, size) = read_header(r)?;
    debug!(?mode, size, "lzss stream");
    decompress_to_vec(r, size, mode)
}

/// Decompress a complete stream held in memory.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut r = data;
    decompress_file(&mut r)
}

/// Decompress exactly `n` bytes of header-less token data into a `Vec`.
pub fn decompress_to_vec<R: Read + ?Sized>(r: &mut R, n: usize, mode: LzssMode) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = alloc(n)?;
    decompress(r, &mut out, n, mode)?;
    Ok(out)
}

/// Decompress exactly `n` bytes of header-less token data from `r` to `w`.
///
/// Fails with [`Error::TruncatedStream`] if `r` runs dry first. Tokens left
/// in the final flag group once `n` bytes exist are ignored, as is the tail
/// of a reference that would overshoot `n`.
pub fn decompress<R, W>(r: &mut R, w: &mut W, n: usize, mode: LzssMode) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut state = Expander::new(n)?;

    while state.produced < n {
        let flags = state.input(r, u8)?;
        for bit in (0..8).rev() {
            if state.produced >= n {
                break;
            }
            if flags & (1 << bit) == 0 {
                let b = state.input(r, u8)?;
                state.emit(b, w)?;
            } else {
                let (len, disp) = state.input(r, |r| mode.reference(r))?;
                state.copy(len, disp, w)?;
            }
        }
    }

    state.flush(w)
}

/// Window and output bookkeeping for one decompression.
struct Expander {
    window: Vec<u8>,
    pending: Vec<u8>,
    produced: usize,
    expected: usize,
}

impl Expander {
    fn new(expected: usize) -> Result<Self> {
        let mut window = alloc(WINDOW_SIZE)?;
        window.resize(WINDOW_SIZE, 0);
        Ok(Self {
            window,
            pending: alloc(FLUSH_AT.min(expected))?,
            produced: 0,
            expected,
        })
    }

    /// Run an input read, turning a short read into `TruncatedStream`.
    fn input<R, T, F>(&self, r: &mut R, read: F) -> Result<T>
    where
        R: Read + ?Sized,
        F: FnOnce(&mut R) -> Result<T>,
    {
        read(r).map_err(|e| match e {
            Error::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Error::TruncatedStream {
                    produced: self.produced,
                    expected: self.expected,
                }
            }
            other => other,
        })
    }

    fn emit<W: Write + ?Sized>(&mut self, b: u8, w: &mut W) -> Result<()> {
        self.window[self.produced % WINDOW_SIZE] = b;
        self.pending.push(b);
        self.produced += 1;
        if self.pending.len() >= FLUSH_AT {
            self.flush(w)?;
        }
        Ok(())
    }

    fn copy<W: Write + ?Sized>(&mut self, len: usize, disp: usize, w: &mut W) -> Result<()> {
        if disp > self.produced {
            return Err(Error::InvalidBackReference {
                displacement: disp,
                produced: self.produced,
            });
        }
        for _ in 0..len {
            if self.produced >= self.expected {
                break;
            }
            let b = self.window[(self.produced - disp) % WINDOW_SIZE];
            self.emit(b, w)?;
        }
        Ok(())
    }

    fn flush<W: Write + ?Sized>(&mut self, w: &mut W) -> Result<()> {
        w.write_all(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Greedy reference compressor, slow but good enough for fixtures.
    fn compress(data: &[u8], mode: LzssMode) -> Vec<u8> {
        let max_len = match mode {
            LzssMode::Lz10 => 18,
            LzssMode::Lz11 => 0x400,
        };
        let mut out = vec![mode.marker()];
        out.extend_from_slice(&(data.len() as u32).to_le_bytes()[..3]);

        let mut i = 0;
        while i < data.len() {
            let flag_at = out.len();
            out.push(0);
            for bit in (0..8).rev() {
                if i >= data.len() {
                    break;
                }
                let (len, disp) = longest_match(data, i, max_len);
                if len >= mode.min_match() {
                    out[flag_at] |= 1 << bit;
                    encode_reference(&mut out, mode, len, disp);
                    i += len;
                } else {
                    out.push(data[i]);
                    i += 1;
                }
            }
        }
        out
    }

    fn longest_match(data: &[u8], i: usize, max_len: usize) -> (usize, usize) {
        let mut best = (0, 0);
        for disp in 1..=i.min(4096) {
            let mut len = 0;
            while len < max_len && i + len < data.len() && data[i + len] == data[i + len - disp] {
                len += 1;
            }
            if len > best.0 {
                best = (len, disp);
            }
        }
        best
    }

    fn encode_reference(out: &mut Vec<u8>, mode: LzssMode, len: usize, disp: usize) {
        let d = disp - 1;
        match mode {
            LzssMode::Lz10 => out.extend([((len - 3) << 4 | d >> 8) as u8, d as u8]),
            LzssMode::Lz11 if len <= 16 => out.extend([((len - 1) << 4 | d >> 8) as u8, d as u8]),
            LzssMode::Lz11 if len <= 0x110 => {
                let l = len - 0x11;
                out.extend([(l >> 4) as u8, ((l & 0xF) << 4 | d >> 8) as u8, d as u8]);
            }
            LzssMode::Lz11 => {
                let l = len - 0x111;
                out.extend([
                    (0x10 | l >> 12) as u8,
                    (l >> 4) as u8,
                    ((l & 0xF) << 4 | d >> 8) as u8,
                    d as u8,
                ]);
            }
        }
    }

    fn sample() -> Vec<u8> {
        let mut data = b"narc narc narc nclr ncgr ".repeat(20);
        let mut seed = 0x1234u16;
        for _ in 0..600 {
            seed = crate::crypto::scramble::next_seed(seed);
            data.push((seed >> 8) as u8);
        }
        data.extend(std::iter::repeat_n(0xAB, 1500));
        data.extend_from_slice(b"tail");
        data
    }

    #[test]
    fn lz10_round_trip() {
        let data = sample();
        let packed = compress(&data, LzssMode::Lz10);
        assert!(packed.len() < data.len());
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn lz11_round_trip() {
        let data = sample();
        let packed = compress(&data, LzssMode::Lz11);
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn overlapping_reference_repeats() {
        // 'a', then copy 10 from 1 back.
        let stream = [0x10, 11, 0, 0, 0b0100_0000, b'a', 0x70, 0x00];
        assert_eq!(decompress_bytes(&stream).unwrap(), b"a".repeat(11));
    }

    #[test]
    fn stops_at_declared_length() {
        let stream = [0x10, 5, 0, 0, 0b0100_0000, b'a', 0x70, 0x00];
        assert_eq!(decompress_bytes(&stream).unwrap(), b"aaaaa");

        // Unused literal slots in the last group are ignored.
        let stream = [0x10, 2, 0, 0, 0x00, b'x', b'y', b'z'];
        assert_eq!(decompress_bytes(&stream).unwrap(), b"xy");
    }

    #[test]
    fn shortest_reference_is_three_bytes() {
        assert_eq!(LzssMode::Lz10.min_match(), 3);
        assert_eq!(LzssMode::Lz11.min_match(), 3);
        // Indicators 0 and 1 select the long forms, so the 2-byte form
        // starts at a length of 3.
        let mut r = &[0x20u8, 0x00][..];
        assert_eq!(LzssMode::Lz11.reference(&mut r).unwrap(), (3, 1));
    }

    #[test]
    fn lz11_short_reference() {
        // indicator 2 -> length 3, displacement 2.
        let stream = [0x11, 5, 0, 0, 0b0010_0000, b'a', b'b', 0x20, 0x01];
        assert_eq!(decompress_bytes(&stream).unwrap(), b"ababa");
    }

    #[test]
    fn truncated_input_fails() {
        let data = sample();
        let packed = compress(&data, LzssMode::Lz10);
        let err = decompress_bytes(&packed[..packed.len() - 1]).unwrap_err();
        match err {
            Error::TruncatedStream { produced, expected } => {
                assert!(produced < expected);
                assert_eq!(expected, data.len());
            }
            other => panic!("expected TruncatedStream, got {other:?}"),
        }
    }

    #[test]
    fn extended_size_header() {
        let mut stream = vec![0x10, 0, 0, 0];
        stream.extend_from_slice(&3u32.to_le_bytes());
        stream.extend_from_slice(&[0x00, b'a', b'b', b'c']);
        assert_eq!(decompress_bytes(&stream).unwrap(), b"abc");
    }

    #[test]
    fn reference_before_start_fails() {
        let stream = [0x10, 4, 0, 0, 0b1000_0000, 0x00, 0x00];
        assert!(matches!(
            decompress_bytes(&stream),
            Err(Error::InvalidBackReference {
                displacement: 1,
                produced: 0
            })
        ));
    }

    #[test]
    fn unknown_type_byte() {
        let stream = [0x30, 4, 0, 0];
        assert!(matches!(
            decompress_bytes(&stream),
            Err(Error::UnknownCompression(0x30))
        ));
    }

    #[test]
    fn streams_to_writer() {
        let data = b"abcabcabcabcabcabc".repeat(400);
        let packed = compress(&data, LzssMode::Lz11);
        let mut r = &packed[..];
        let (mode, n) = read_header(&mut r).unwrap();
        assert_eq!((mode, n), (LzssMode::Lz11, data.len()));
        let mut out = Vec::new();
        decompress(&mut r, &mut out, n, mode).unwrap();
        assert_eq!(out, data);
    }
}
