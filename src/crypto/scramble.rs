//! LCG XOR scrambling of `u16` payload words.
//!
//! The key stream starts at a seed and advances with
//! `seed = seed * 0x41C64E6D + 0x6073`, truncated to 16 bits. Each word is
//! XORed with the current seed before the seed advances, so the walk has to
//! be sequential.
//!
//! The seed is not stored separately: it is the scrambled value of the
//! first word visited (the first word for [`ScrambleOrder::Forward`], the
//! last for [`ScrambleOrder::Backward`]). That word therefore always
//! descrambles to zero.
//!
//! A trailing odd byte is never touched.

/// LCG multiplier.
pub const MULTIPLIER: u32 = 0x41C6_4E6D;
/// LCG increment.
pub const INCREMENT: u32 = 0x6073;

/// Direction in which the key stream walks over the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrambleOrder {
    /// Seeded from the last word, walking towards the first (Diamond/Pearl).
    Backward,
    /// Seeded from the first word, walking towards the last (Platinum).
    Forward,
}

/// Advance the key stream by one word.
#[inline]
pub fn next_seed(seed: u16) -> u16 {
    (seed as u32)
        .wrapping_mul(MULTIPLIER)
        .wrapping_add(INCREMENT) as u16
}

/// Reverse the scrambling of `data` in place.
pub fn descramble(data: &mut [u8], order: ScrambleOrder) {
    let words = data.len() / 2;
    if words == 0 {
        return;
    }
    let at = match order {
        ScrambleOrder::Forward => 0,
        ScrambleOrder::Backward => (words - 1) * 2,
    };
    let seed = u16::from_le_bytes([data[at], data[at + 1]]);
    xor_stream(data, seed, order);
}

/// Scramble `data` in place starting from `seed`.
///
/// [`descramble`] only recovers the input when the first word visited is
/// zero, since that word is where the seed ends up.
pub fn scramble(data: &mut [u8], seed: u16, order: ScrambleOrder) {
    xor_stream(data, seed, order);
}

fn xor_stream(data: &mut [u8], mut seed: u16, order: ScrambleOrder) {
    let mut step = |w: &mut [u8]| {
        let v = u16::from_le_bytes([w[0], w[1]]) ^ seed;
        w.copy_from_slice(&v.to_le_bytes());
        seed = next_seed(seed);
    };
    match order {
        ScrambleOrder::Forward => data.chunks_exact_mut(2).for_each(&mut step),
        ScrambleOrder::Backward => data.chunks_exact_mut(2).rev().for_each(&mut step),
    }
}
