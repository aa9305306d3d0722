use super::int::uint_le;
use std::hash::{Hash, Hasher};

/// A bit-packed column value.
///
/// `len` significant bits are stored in `ceil(len / 8)` bytes. Bit `i` is bit `i % 8` of byte
/// `i / 8`. Padding bits in the last byte are kept in storage but never reported.
#[derive(Clone)]
pub struct BitField {
    len: usize,
    bytes: Vec<u8>,
}

impl BitField {
    /// Wrap bytes in storage order.
    ///
    /// Returns `None` if the byte count does not match `ceil(len / 8)`.
    pub fn new(len: usize, bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() == byte_len(len) {
            Some(Self { len, bytes })
        } else {
            None
        }
    }

    /// Number of significant bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `None` for indices beyond `len`.
    pub fn get(&self, i: usize) -> Option<bool> {
        if i < self.len {
            Some(self.bytes[i >> 3] & (1 << (i & 7)) != 0)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bytes[i >> 3] & (1 << (i & 7)) != 0)
    }

    pub fn count_ones(&self) -> usize {
        self.iter().filter(|x| *x).count()
    }

    /// The significant bits as an integer with bit `i` at position `i`.
    ///
    /// Returns `None` if the field is wider than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.len {
            0 => Some(0),
            1..=63 => Some(uint_le(&self.bytes) & ((1u64 << self.len) - 1)),
            64 => Some(uint_le(&self.bytes)),
            _ => None,
        }
    }

    /// Storage bytes with the padding bits of the last byte cleared.
    fn significant_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let last = self.bytes.len().wrapping_sub(1);
        let mask = match self.len % 8 {
            0 => 0xff,
            r => (1u8 << r) - 1,
        };
        self.bytes
            .iter()
            .enumerate()
            .map(move |(i, b)| if i == last { b & mask } else { *b })
    }
}

impl PartialEq for BitField {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.significant_bytes().eq(other.significant_bytes())
    }
}

impl Eq for BitField {}

impl Hash for BitField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for b in self.significant_bytes() {
            b.hash(state);
        }
    }
}

/// Number of bytes needed to store `bits` bits.
#[inline]
pub fn byte_len(bits: usize) -> usize {
    bits / 8 + (bits % 8 != 0) as usize
}

impl std::fmt::Display for BitField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in (0..self.len).rev() {
            let c = if self.bytes[i >> 3] & (1 << (i & 7)) != 0 { '1' } else { '0' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BitField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitField({}, b{})", self.len, self)
    }
}
