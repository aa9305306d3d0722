use std::io::{Cursor, Result};

/// An opaque sequential byte provider.
///
/// The decoder never looks ahead and never rewinds a source. End of data is signalled
/// out-of-band (`None` or a short count), never as a byte value.
pub trait ByteSource {
    /// Consume a single byte.
    ///
    /// Returns `Ok(None)` if the source has no more data.
    fn read_u8(&mut self) -> Result<Option<u8>>;
    /// Transfer bytes into `buf` and return the actual number of bytes transferred.
    ///
    /// A return value less than `buf.len()` means the source ran dry.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Advance by up to `n` bytes and return the actual number of bytes skipped.
    fn skip(&mut self, n: usize) -> Result<usize>;
    /// The number of bytes left in the source.
    fn remaining(&self) -> usize;
}

/// A source over a borrowed packet buffer.
#[derive(Copy, Clone, Debug)]
pub struct SliceSource<'a>(&'a [u8]);

impl<'a> SliceSource<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self(buf)
    }

    /// The not yet consumed part of the buffer.
    pub fn as_slice(&self) -> &'a [u8] {
        self.0
    }
}

impl<'a> From<&'a [u8]> for SliceSource<'a> {
    fn from(x: &'a [u8]) -> Self {
        Self(x)
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn read_u8(&mut self) -> Result<Option<u8>> {
        match self.0.split_first() {
            Some((head, tail)) => {
                self.0 = tail;
                Ok(Some(*head))
            }
            None => Ok(None),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.0.len());
        let (head, tail) = self.0.split_at(n);
        buf[..n].copy_from_slice(head);
        self.0 = tail;
        Ok(n)
    }

    fn skip(&mut self, n: usize) -> Result<usize> {
        let n = n.min(self.0.len());
        self.0 = &self.0[n..];
        Ok(n)
    }

    fn remaining(&self) -> usize {
        self.0.len()
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn read_u8(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read_into(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        std::io::Read::read(self, buf)
    }

    fn skip(&mut self, n: usize) -> Result<usize> {
        let n = n.min(ByteSource::remaining(self));
        self.set_position(self.position() + n as u64);
        Ok(n)
    }

    fn remaining(&self) -> usize {
        let len = self.get_ref().as_ref().len() as u64;
        len.saturating_sub(self.position()) as usize
    }
}
