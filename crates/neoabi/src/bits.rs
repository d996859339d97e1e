//! # Boolean Bit Packing
//!
//! Arrays of `bool` are packed rather than written one byte per element.
//!
//! ## Wire Format
//! The `count` booleans, in order, are the bits of a big-endian unsigned integer
//! (first element = most significant bit), zero-extended on the left to
//! `ceil(count / 8)` bytes. A count of zero occupies no bytes.

use crate::error::Error;
use crate::error::Result;

/// Bytes needed to pack `count` booleans.
pub const fn packed_len(count: usize) -> usize {
    count.div_ceil(8)
}

/// Packs booleans into a big-endian bit string.
pub fn pack_bools<I>(bits: I, count: usize) -> Vec<u8>
where
    I: IntoIterator<Item = bool>,
{
    let len = packed_len(count);
    let pad = len * 8 - count;
    let mut packed = vec![0u8; len];

    for (i, bit) in bits.into_iter().take(count).enumerate() {
        if bit {
            let pos = pad + i;
            packed[pos / 8] |= 0x80 >> (pos % 8);
        }
    }
    packed
}

/// Unpacks `count` booleans from `packed`, which must be exactly
/// `packed_len(count)` bytes read at `offset`.
///
/// # Errors
/// Returns `Error::NonCanonicalPadding` if any of the leading pad bits is set.
pub fn unpack_bools(packed: &[u8], count: usize, offset: usize) -> Result<Vec<bool>> {
    debug_assert_eq!(packed.len(), packed_len(count));
    let pad = packed.len() * 8 - count;

    let bit_at = |pos: usize| packed[pos / 8] & (0x80 >> (pos % 8)) != 0;

    if (0..pad).any(bit_at) {
        return Err(Error::NonCanonicalPadding { offset });
    }
    Ok((pad..pad + count).map(bit_at).collect())
}
