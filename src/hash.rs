//! Content hashing, bit-compatible with the external agent tracker.
//!
//! The tracker identifies edited content only by a 32-bit `MurmurHash3`
//! digest of `"{file}:{operation}{content}"`, rendered as 8 lowercase hex
//! characters. Recovering content therefore requires reproducing that digest
//! exactly, including its string representation: the upstream tool hashes
//! JavaScript strings, so input is iterated as UTF-16 code units (low byte
//! of each unit), never as UTF-8 bytes. Hashing the UTF-8 encoding instead
//! silently mismatches on any non-ASCII content.

use crate::models::EditOperation;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Hasher producing the tracker's 32-bit content digests.
///
/// # Determinism
///
/// `hash32` is a pure function: identical input and seed always yield the
/// identical digest. All candidate trials in the inference path rely on this.
///
/// # Example
///
/// ```rust
/// use linetrace::CodeHasher;
/// use linetrace::EditOperation;
///
/// let digest = CodeHasher::code_hash("main.ts", EditOperation::Added, "const x = 1;");
/// assert_eq!(digest.len(), 8);
/// assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub struct CodeHasher;

impl CodeHasher {
    /// Computes the 32-bit `MurmurHash3` digest of `input` with `seed`.
    ///
    /// Input is consumed as UTF-16 code units in blocks of four, taking the
    /// low byte of each unit, with tail handling for the remaining 1-3 units
    /// and the standard xor-shift/multiply/xor-shift finalization. This
    /// mirrors the upstream JavaScript implementation unit for unit.
    #[must_use]
    pub fn hash32(input: &str, seed: u32) -> u32 {
        let units: Vec<u16> = input.encode_utf16().collect();
        let len = units.len();
        let mut h1 = seed;

        let mut blocks = units.chunks_exact(4);
        for block in blocks.by_ref() {
            let k1 = (u32::from(block[0]) & 0xff)
                | ((u32::from(block[1]) & 0xff) << 8)
                | ((u32::from(block[2]) & 0xff) << 16)
                | ((u32::from(block[3]) & 0xff) << 24);
            h1 ^= Self::mix(k1);
            h1 = h1.rotate_left(13);
            h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            let mut k1: u32 = 0;
            if tail.len() >= 3 {
                k1 ^= (u32::from(tail[2]) & 0xff) << 16;
            }
            if tail.len() >= 2 {
                k1 ^= (u32::from(tail[1]) & 0xff) << 8;
            }
            k1 ^= u32::from(tail[0]) & 0xff;
            h1 ^= Self::mix(k1);
        }

        h1 ^= u32::try_from(len).unwrap_or(u32::MAX);
        h1 ^= h1 >> 16;
        h1 = h1.wrapping_mul(0x85eb_ca6b);
        h1 ^= h1 >> 13;
        h1 = h1.wrapping_mul(0xc2b2_ae35);
        h1 ^= h1 >> 16;
        h1
    }

    /// Digest of one observed edit: `hash32("{file}:{op}{content}", 0)`,
    /// rendered as 8 lowercase hex characters.
    ///
    /// The operation symbol is baked into the input so that an addition and
    /// a removal of the same text at the same file hash differently.
    #[must_use]
    pub fn code_hash(file_name: &str, operation: EditOperation, content: &str) -> String {
        let input = format!("{file_name}:{}{content}", operation.symbol());
        format!("{:08x}", Self::hash32(&input, 0))
    }

    /// One round of block mixing: wrapping multiply, rotate, multiply.
    const fn mix(k1: u32) -> u32 {
        k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
    }
}
