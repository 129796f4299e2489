//! Payload de-obfuscation.
//!
//! Some Nitro image payloads (Pokémon sprite NCGRs in particular) are
//! XOR-scrambled with a 16-bit linear congruential key stream before being
//! stored. Nothing in the file says whether or how a payload is scrambled;
//! the caller picks the variant per game.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`scramble`] | Forward and backward LCG XOR over little-endian `u16` words |

pub mod scramble;
