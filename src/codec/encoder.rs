use super::lenenc::{length_coded_size, NULL_MARKER, WIDE_2, WIDE_3, WIDE_8};
use super::Endian;

/// An `Encoder` is anything that is able to process a sequence of basic encoding operations
/// and assembles them into a result. It is the inverse of the decoder and mostly used to
/// assemble packets in the same wire format.
///
/// All operations shall return `Option` instead of panicking.
pub trait Encoder: Sized {
    /// Push a `u8` to the encoder state.
    ///
    /// Returns `None` if the encoder had insufficient capacity.
    #[must_use]
    fn push_u8(&mut self, x: u8) -> Option<()>;
    /// Push raw bytes to the encoder state.
    ///
    /// Returns `None` if the encoder had insufficient capacity.
    #[must_use]
    fn push_bytes(&mut self, x: &[u8]) -> Option<()>;

    /// Push the low `len` bytes of `x` (`len` <= 8).
    #[must_use]
    fn push_uint(&mut self, x: u64, len: usize, endian: Endian) -> Option<()> {
        if len > 8 {
            return None;
        }
        match endian {
            Endian::Little => self.push_bytes(&x.to_le_bytes()[..len]),
            Endian::Big => self.push_bytes(&x.to_be_bytes()[8 - len..]),
        }
    }
    /// Push a length-coded integer. `None` is encoded as the null marker.
    #[must_use]
    fn push_length_coded(&mut self, x: Option<u64>) -> Option<()> {
        let x = match x {
            None => return self.push_u8(NULL_MARKER),
            Some(x) => x,
        };
        match length_coded_size(Some(x)) {
            1 => self.push_u8(x as u8),
            3 => {
                self.push_u8(WIDE_2)?;
                self.push_uint(x, 2, Endian::Little)
            }
            4 => {
                self.push_u8(WIDE_3)?;
                self.push_uint(x, 3, Endian::Little)
            }
            _ => {
                self.push_u8(WIDE_8)?;
                self.push_uint(x, 8, Endian::Little)
            }
        }
    }
    /// Push a length-coded byte string. `None` is encoded as the null marker.
    #[must_use]
    fn push_length_coded_bytes(&mut self, x: Option<&[u8]>) -> Option<()> {
        match x {
            None => self.push_length_coded(None),
            Some(x) => {
                self.push_length_coded(Some(x.len() as u64))?;
                self.push_bytes(x)
            }
        }
    }
    /// Push bytes followed by a zero terminator.
    ///
    /// Returns `None` if `x` itself contains a zero byte.
    #[must_use]
    fn push_null_terminated(&mut self, x: &[u8]) -> Option<()> {
        if x.contains(&0) {
            return None;
        }
        self.push_bytes(x)?;
        self.push_u8(0)
    }
}

/// An encoder that appends to a growable buffer and never runs out of capacity.
#[derive(Debug, Default)]
pub struct VecEncoder(Vec<u8>);

impl VecEncoder {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for VecEncoder {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encoder for VecEncoder {
    fn push_u8(&mut self, x: u8) -> Option<()> {
        self.0.push(x);
        Some(())
    }
    fn push_bytes(&mut self, x: &[u8]) -> Option<()> {
        self.0.extend_from_slice(x);
        Some(())
    }
}

#[derive(Debug)]
pub struct SliceEncoder<'a> {
    pos: usize,
    buf: &'a mut [u8],
}

impl<'a> SliceEncoder<'a> {
    /// Create a new slice encoder from a mutable piece of memory.
    pub fn new(x: &'a mut [u8]) -> Self {
        Self { pos: 0, buf: x }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Encoder for SliceEncoder<'a> {
    #[inline(always)]
    fn push_u8(&mut self, x: u8) -> Option<()> {
        let slot = self.buf.get_mut(self.pos)?;
        *slot = x;
        self.pos += 1;
        Some(())
    }

    #[inline(always)]
    fn push_bytes(&mut self, x: &[u8]) -> Option<()> {
        let dst = self.buf.get_mut(self.pos..self.pos + x.len())?;
        dst.copy_from_slice(x);
        self.pos += x.len();
        Some(())
    }
}

/// A very simple [Encoder] instance that accumulates the required memory requirement
/// for a seqence of encoding operations without actually allocating this memory.
#[derive(Debug, Default)]
pub struct SizeEncoder(usize);

impl SizeEncoder {
    pub fn new() -> Self {
        Self(0)
    }
}

impl From<SizeEncoder> for usize {
    fn from(x: SizeEncoder) -> usize {
        x.0
    }
}

impl Encoder for SizeEncoder {
    #[inline]
    fn push_u8(&mut self, _: u8) -> Option<()> {
        self.0 += std::mem::size_of::<u8>();
        Some(())
    }
    #[inline]
    fn push_bytes(&mut self, bytes: &[u8]) -> Option<()> {
        self.0 += bytes.len();
        Some(())
    }
}
