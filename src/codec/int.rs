//! Endianness and sign extension over raw byte slices.
//!
//! All functions are pure and expect at most 8 bytes of input. Excess high-order bytes are
//! shifted out.

/// Assemble an unsigned integer with byte `i` at bit offset `8 * i`.
#[inline]
pub fn uint_le(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0, |acc, b| acc << 8 | *b as u64)
}

/// Assemble an unsigned integer with the first byte being the most significant.
#[inline]
pub fn uint_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| acc << 8 | *b as u64)
}

/// Interpret the low `width` bytes of `value` as two's complement and extend the sign bit
/// into all higher bits.
///
/// A `width` of 0 yields 0. A `width` of 8 or more leaves the value as is.
#[inline]
pub fn sign_extend(value: u64, width: usize) -> i64 {
    match width {
        0 => 0,
        1..=7 => {
            let shift = 64 - 8 * width as u32;
            ((value << shift) as i64) >> shift
        }
        _ => value as i64,
    }
}

/// Little-endian signed integer with sign extension from the top bit of the last byte.
#[inline]
pub fn int_le(bytes: &[u8]) -> i64 {
    sign_extend(uint_le(bytes), bytes.len())
}
