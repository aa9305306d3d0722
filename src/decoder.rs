mod config;
mod error;
mod quota;

pub use self::config::*;
pub use self::error::*;
pub use self::quota::*;

use crate::codec::bits::{byte_len, BitField};
use crate::codec::int::{int_le, uint_be, uint_le};
use crate::codec::lenenc::LengthPrefix;
use crate::codec::raw::RawString;
use crate::codec::{Decode, Endian};
use crate::source::ByteSource;

/// Decoder for the field encodings of a single packet.
///
/// The decoder exclusively owns its byte source and never buffers ahead: a read of `n` bytes
/// consumes exactly `n` bytes from the source. A quota can be armed to fence off the current
/// record. Reads that would cross the quota boundary advance the source exactly up to the
/// boundary and then fail with [DecodeError::QuotaExceeded].
///
/// No operation yields a partial value on failure.
#[derive(Debug)]
pub struct BoundedDecoder<S> {
    source: S,
    quota: Quota,
    config: DecoderConfig,
}

impl<S: ByteSource> BoundedDecoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        let mut quota = Quota::default();
        quota.arm(config.initial_quota);
        Self {
            source,
            quota,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Bytes consumed since the quota was last armed.
    pub fn consumed(&self) -> usize {
        self.quota.consumed()
    }

    /// The armed quota (if any).
    pub fn quota(&self) -> Option<usize> {
        self.quota.limit()
    }

    /// Fence off the next `limit` bytes. A `limit` of 0 removes the fence.
    ///
    /// Resets the consumed byte count but does not touch the source position.
    pub fn arm_quota(&mut self, limit: usize) {
        log::trace!("Arming quota of {} bytes", limit);
        self.quota.arm(limit)
    }

    /// Bytes left in the quota window or, without quota, in the source.
    pub fn remaining(&self) -> usize {
        self.quota
            .remaining()
            .unwrap_or_else(|| self.source.remaining())
    }

    /// Whether the physical source has more data, regardless of the quota.
    pub fn has_more(&self) -> bool {
        self.source.remaining() > 0
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if let Admission::Partial(_) = self.quota.admit(1) {
            return Err(self.quota_exceeded(1));
        }
        match self.source.read_u8()? {
            Some(x) => {
                self.quota.consume(1);
                Ok(x)
            }
            None => Err(self.source_exhausted(1)),
        }
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        match self.quota.admit(n) {
            Admission::Full => self.skip_exact(n),
            Admission::Partial(r) => {
                self.skip_exact(r)?;
                Err(self.quota_exceeded(n))
            }
        }
    }

    /// Fill the whole buffer or fail. The buffer content is unspecified on failure.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        match self.quota.admit(buf.len()) {
            Admission::Full => self.fill_exact(buf),
            Admission::Partial(r) => {
                self.fill_exact(&mut buf[..r])?;
                Err(self.quota_exceeded(buf.len()))
            }
        }
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let bound = match self.quota.admit(n) {
            Admission::Full => self.source.remaining(),
            Admission::Partial(r) => r,
        };
        if n > bound {
            // Advance like `fill` would but without allocating for a bogus length.
            self.skip(n)?;
            return Err(self.source_exhausted(n));
        }
        let mut buf = vec![0; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn fixed_string(&mut self, n: usize) -> Result<RawString, DecodeError> {
        self.read_bytes(n).map(RawString::from)
    }

    /// Read up to and including the next zero byte. The terminator is not part of the result.
    pub fn null_terminated_string(&mut self) -> Result<RawString, DecodeError> {
        let mut buf = Vec::new();
        loop {
            match self.read_u8()? {
                0 => return Ok(buf.into()),
                x => {
                    if let Some(max) = self.config.max_null_terminated_len {
                        if buf.len() >= max {
                            log::debug!("Null-terminated string exceeds {} bytes", max);
                            return Err(DecodeError::StringTooLong(max));
                        }
                    }
                    buf.push(x)
                }
            }
        }
    }

    /// Read a length-coded string. Returns `None` for the null marker.
    pub fn length_coded_string(&mut self) -> Result<Option<RawString>, DecodeError> {
        match self.read_length_coded()? {
            None => Ok(None),
            Some(len) => {
                // Lengths beyond the address space still advance to the boundary first.
                let len = usize::try_from(len).unwrap_or(usize::MAX);
                self.fixed_string(len).map(Some)
            }
        }
    }

    /// Read a length-coded integer. Returns `None` for the null marker.
    pub fn read_length_coded(&mut self) -> Result<Option<u64>, DecodeError> {
        match LengthPrefix::classify(self.read_u8()?) {
            LengthPrefix::Inline(x) => Ok(Some(x as u64)),
            LengthPrefix::Null => Ok(None),
            LengthPrefix::Wide(len) => self.read_uint(len).map(Some),
            LengthPrefix::Reserved(x) => {
                log::warn!("Reserved length-coded lead byte {}", x);
                Err(DecodeError::InvalidEncoding(x))
            }
        }
    }

    /// Little-endian unsigned integer of `len` bytes (0..=8).
    pub fn read_uint(&mut self, len: usize) -> Result<u64, DecodeError> {
        self.read_uint_endian(len, Endian::Little)
    }

    /// Unsigned integer of `len` bytes (0..=8) in the given byte order.
    pub fn read_uint_endian(&mut self, len: usize, endian: Endian) -> Result<u64, DecodeError> {
        let buf = self.read_width(len, 8)?;
        let buf = &buf[..len];
        Ok(match endian {
            Endian::Little => uint_le(buf),
            Endian::Big => uint_be(buf),
        })
    }

    /// Little-endian signed integer of `len` bytes (0..=4), sign extended to 32 bits.
    pub fn read_int(&mut self, len: usize) -> Result<i32, DecodeError> {
        let buf = self.read_width(len, 4)?;
        Ok(int_le(&buf[..len]) as i32)
    }

    /// Little-endian signed integer of `len` bytes (0..=8), sign extended to 64 bits.
    pub fn read_long(&mut self, len: usize) -> Result<i64, DecodeError> {
        let buf = self.read_width(len, 8)?;
        Ok(int_le(&buf[..len]))
    }

    /// Read a bit-packed column of `bit_len` significant bits.
    ///
    /// With `Endian::Big` the byte order is reversed before interpretation.
    pub fn read_bits(&mut self, bit_len: usize, endian: Endian) -> Result<BitField, DecodeError> {
        let mut bytes = self.read_bytes(byte_len(bit_len))?;
        if endian == Endian::Big {
            bytes.reverse();
        }
        BitField::new(bit_len, bytes).ok_or(DecodeError::InvalidWidth(bit_len))
    }

    /// Decode any type that implements [Decode].
    pub fn take<T: Decode>(&mut self) -> Result<T, DecodeError> {
        T::decode(self)
    }

    fn read_width(&mut self, len: usize, max: usize) -> Result<[u8; 8], DecodeError> {
        if len > max {
            return Err(DecodeError::InvalidWidth(len));
        }
        let mut buf = [0u8; 8];
        self.fill(&mut buf[..len])?;
        Ok(buf)
    }

    fn skip_exact(&mut self, n: usize) -> Result<(), DecodeError> {
        let m = self.source.skip(n)?;
        self.quota.consume(m);
        if m < n {
            return Err(self.source_exhausted(n));
        }
        Ok(())
    }

    fn fill_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let m = self.source.read_into(buf)?;
        self.quota.consume(m);
        if m < buf.len() {
            return Err(self.source_exhausted(buf.len()));
        }
        Ok(())
    }

    fn quota_exceeded(&self, requested: usize) -> DecodeError {
        log::debug!(
            "Read of {} bytes exceeds quota (consumed {} of {:?})",
            requested,
            self.quota.consumed(),
            self.quota.limit()
        );
        DecodeError::QuotaExceeded
    }

    fn source_exhausted(&self, requested: usize) -> DecodeError {
        log::debug!(
            "Read of {} bytes exceeds input ({} bytes left)",
            requested,
            self.source.remaining()
        );
        DecodeError::SourceExhausted
    }
}

impl<'a> From<&'a [u8]> for BoundedDecoder<crate::source::SliceSource<'a>> {
    fn from(x: &'a [u8]) -> Self {
        Self::new(x.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;

    fn decoder(a: &[u8]) -> BoundedDecoder<SliceSource<'_>> {
        BoundedDecoder::from(a)
    }

    #[test]
    fn test_read_u8_01() {
        let a = [0, 1, 255 as u8];
        let mut d = decoder(&a);

        assert_eq!(d.read_u8(), Ok(0));
        assert_eq!(d.read_u8(), Ok(1));
        assert_eq!(d.read_u8(), Ok(255));
        assert_eq!(d.read_u8(), Err(DecodeError::SourceExhausted));
    }

    #[test]
    fn test_read_uint_01() {
        let a = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        for len in 1..=8 {
            let mut d = decoder(&a);
            assert_eq!(d.read_uint(len), Ok(uint_le(&a[..len])), "len = {}", len);
            assert_eq!(d.source().remaining(), 8 - len);
        }
    }

    #[test]
    fn test_read_uint_02() {
        let a = [0x01, 0x02, 0x03];
        let mut d = decoder(&a);

        assert_eq!(d.read_uint_endian(3, Endian::Big), Ok(0x010203));
    }

    #[test]
    fn test_read_uint_03() {
        let a = [0xff, 0xff];
        let mut d = decoder(&a);

        assert_eq!(d.read_uint(0), Ok(0));
        assert_eq!(d.read_uint(9), Err(DecodeError::InvalidWidth(9)));
        assert_eq!(d.source().remaining(), 2);
        assert_eq!(d.read_uint(2), Ok(0xffff));
    }

    #[test]
    fn test_read_uint_04() {
        // Truncated input
        let a = [0x01, 0x02];
        let mut d = decoder(&a);

        assert_eq!(d.read_uint(4), Err(DecodeError::SourceExhausted));
        assert_eq!(d.consumed(), 2);
    }

    #[test]
    fn test_read_int_01() {
        let a = [0xff, 0xfe, 0xff, 0x00, 0x00, 0x00, 0x80];
        let mut d = decoder(&a);

        assert_eq!(d.read_int(1), Ok(-1));
        assert_eq!(d.read_int(2), Ok(-2));
        assert_eq!(d.read_int(4), Ok(-2147483648));
        assert_eq!(d.read_int(5), Err(DecodeError::InvalidWidth(5)));
    }

    #[test]
    fn test_read_int_02() {
        let a = [0x7f, 0xff, 0x7f, 0x01, 0x00, 0x00];
        let mut d = decoder(&a);

        assert_eq!(d.read_int(1), Ok(127));
        assert_eq!(d.read_int(2), Ok(32767));
        assert_eq!(d.read_int(3), Ok(1));
    }

    #[test]
    fn test_read_long_01() {
        let a = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let mut d = decoder(&a);

        assert_eq!(d.read_long(8), Ok(-1));
    }

    #[test]
    fn test_read_long_02() {
        let a = [0x00, 0x00, 0x00, 0x00, 0x00, 0x80];
        let mut d = decoder(&a);

        assert_eq!(d.read_long(6), Ok(-(1i64 << 47)));
    }

    #[test]
    fn test_read_long_03() {
        // Top bit set: uint - 2^(8*len)
        let a = [0x34, 0x12, 0xf0, 0x9a, 0x78, 0x56, 0x34, 0xf2];
        for len in 1..=7 {
            let mut b = a;
            b[len - 1] |= 0x80;
            let mut d = decoder(&b);
            let u = uint_le(&b[..len]) as i64;
            assert_eq!(d.read_long(len), Ok(u - (1i64 << (8 * len))), "len = {}", len);
        }
    }

    #[test]
    fn test_read_length_coded_01() {
        let a = [0, 250, 251, 252, 0xff, 0xff, 253, 0xff, 0xff, 0xff];
        let mut d = decoder(&a);

        assert_eq!(d.read_length_coded(), Ok(Some(0)));
        assert_eq!(d.read_length_coded(), Ok(Some(250)));
        assert_eq!(d.read_length_coded(), Ok(None));
        assert_eq!(d.read_length_coded(), Ok(Some(65535)));
        assert_eq!(d.read_length_coded(), Ok(Some(16777215)));
        assert!(!d.has_more());
    }

    #[test]
    fn test_read_length_coded_02() {
        let a = [254, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f];
        let mut d = decoder(&a);

        assert_eq!(d.read_length_coded(), Ok(Some(i64::MAX as u64)));
    }

    #[test]
    fn test_read_length_coded_03() {
        let a = [255, 0];
        let mut d = decoder(&a);

        let e = d.read_length_coded().unwrap_err();
        assert_eq!(e, DecodeError::InvalidEncoding(255));
        assert!(e.is_fatal());
        assert_eq!(d.source().remaining(), 1);
    }

    #[test]
    fn test_length_coded_string_01() {
        let a = [3, 0x41, 0x42, 0x43, 251, 0];
        let mut d = decoder(&a);

        assert_eq!(d.length_coded_string(), Ok(Some(RawString::from("ABC"))));
        assert_eq!(d.length_coded_string(), Ok(None));
        assert_eq!(d.length_coded_string(), Ok(Some(RawString::default())));
    }

    #[test]
    fn test_length_coded_string_02() {
        // Declared length larger than the input
        let a = [5, 0x41, 0x42];
        let mut d = decoder(&a);

        assert_eq!(d.length_coded_string(), Err(DecodeError::SourceExhausted));
    }

    #[test]
    fn test_null_terminated_string_01() {
        let a = [0x41, 0x42, 0x00, 0x43];
        let mut d = decoder(&a);

        assert_eq!(d.null_terminated_string(), Ok(RawString::from("AB")));
        assert_eq!(d.source().as_slice(), &[0x43]);
    }

    #[test]
    fn test_null_terminated_string_02() {
        let a = [0x41, 0x42];
        let mut d = decoder(&a);

        assert_eq!(d.null_terminated_string(), Err(DecodeError::SourceExhausted));
    }

    #[test]
    fn test_null_terminated_string_03() {
        let a = [0x41, 0x42, 0x43, 0x00];
        let config = DecoderConfig {
            max_null_terminated_len: Some(2),
            ..Default::default()
        };
        let mut d = BoundedDecoder::with_config(SliceSource::new(&a), config);

        assert_eq!(d.null_terminated_string(), Err(DecodeError::StringTooLong(2)));
    }

    #[test]
    fn test_null_terminated_string_04() {
        let a = [0x41, 0x42, 0x00];
        let config = DecoderConfig {
            max_null_terminated_len: Some(2),
            ..Default::default()
        };
        let mut d = BoundedDecoder::with_config(SliceSource::new(&a), config);

        assert_eq!(d.null_terminated_string(), Ok(RawString::from("AB")));
    }

    #[test]
    fn test_fixed_string_01() {
        let a = "ABCDE".as_bytes();
        let mut d = decoder(a);

        assert_eq!(d.fixed_string(3), Ok(RawString::from("ABC")));
        assert_eq!(d.remaining(), 2);
        assert_eq!(d.fixed_string(3), Err(DecodeError::SourceExhausted));
    }

    #[test]
    fn test_read_bits_01() {
        let a = [0xff, 0x0f];
        let mut d = decoder(&a);

        let b = d.read_bits(12, Endian::Little).unwrap();
        assert_eq!(b.len(), 12);
        assert_eq!(b.to_u64(), Some(0x0fff));
        assert_eq!(b.count_ones(), 12);
    }

    #[test]
    fn test_read_bits_02() {
        let a = [0xff, 0x0f];
        let mut d = decoder(&a);

        let b = d.read_bits(12, Endian::Big).unwrap();
        assert_eq!(b.as_bytes(), &[0x0f, 0xff]);
        assert_eq!(b.to_u64(), Some(0x0f0f));
        assert_eq!(format!("{}", b), "111100001111");
    }

    #[test]
    fn test_read_bits_03() {
        let a = [0x01];
        let mut d = decoder(&a);

        let b = d.read_bits(0, Endian::Little).unwrap();
        assert!(b.is_empty());
        assert_eq!(d.source().remaining(), 1);
    }

    #[test]
    fn test_skip_01() {
        let a = [1, 2, 3, 4];
        let mut d = decoder(&a);

        assert_eq!(d.skip(3), Ok(()));
        assert_eq!(d.read_u8(), Ok(4));
        assert_eq!(d.skip(1), Err(DecodeError::SourceExhausted));
    }

    #[test]
    fn test_skip_02() {
        let a = [1, 2, 3, 4, 5, 6];
        let mut d = decoder(&a);

        d.arm_quota(4);
        assert_eq!(d.skip(5), Err(DecodeError::QuotaExceeded));
        assert_eq!(d.source().as_slice(), &[5, 6]);
        assert_eq!(d.remaining(), 0);
    }

    #[test]
    fn test_quota_01() {
        let a = [1, 2, 3, 4, 5, 6];
        let mut d = decoder(&a);

        d.arm_quota(4);
        assert_eq!(d.quota(), Some(4));
        assert_eq!(d.remaining(), 4);
        assert_eq!(d.read_bytes(3), Ok(vec![1, 2, 3]));
        assert_eq!(d.remaining(), 1);
        assert_eq!(d.read_bytes(2), Err(DecodeError::QuotaExceeded));
        assert_eq!(d.source().as_slice(), &[5, 6]);
        assert_eq!(d.remaining(), 0);
        assert!(d.has_more());
    }

    #[test]
    fn test_quota_02() {
        let a = [1, 2, 3, 4, 5, 6];
        let mut d = decoder(&a);

        d.arm_quota(2);
        assert_eq!(d.read_uint(2), Ok(0x0201));
        assert_eq!(d.read_u8(), Err(DecodeError::QuotaExceeded));
        assert_eq!(d.source().remaining(), 4);

        d.arm_quota(0);
        assert_eq!(d.quota(), None);
        assert_eq!(d.consumed(), 0);
        assert_eq!(d.remaining(), 4);
        assert_eq!(d.read_bytes(4), Ok(vec![3, 4, 5, 6]));
    }

    #[test]
    fn test_quota_03() {
        // Quota larger than the input: exhaustion wins
        let a = [1, 2];
        let mut d = decoder(&a);

        d.arm_quota(10);
        assert_eq!(d.read_uint(4), Err(DecodeError::SourceExhausted));
        assert_eq!(d.remaining(), 8);
    }

    #[test]
    fn test_initial_quota_01() {
        let a = [1, 2, 3];
        let config = DecoderConfig {
            initial_quota: 1,
            ..Default::default()
        };
        let mut d = BoundedDecoder::with_config(SliceSource::new(&a), config);

        assert_eq!(d.quota(), Some(1));
        assert_eq!(d.read_u8(), Ok(1));
        assert_eq!(d.read_u8(), Err(DecodeError::QuotaExceeded));
    }

    /// A source that fails every operation with an I/O error.
    struct BrokenSource;

    impl ByteSource for BrokenSource {
        fn read_u8(&mut self) -> std::io::Result<Option<u8>> {
            Err(std::io::ErrorKind::Other.into())
        }
        fn read_into(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::Other.into())
        }
        fn skip(&mut self, _: usize) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::Other.into())
        }
        fn remaining(&self) -> usize {
            8
        }
    }

    fn is_other_io_error<T>(x: Result<T, DecodeError>) -> bool {
        match x {
            Err(DecodeError::IoError(e)) => e.kind() == std::io::ErrorKind::Other,
            _ => false,
        }
    }

    #[test]
    fn test_io_error_01() {
        let mut d = BoundedDecoder::new(BrokenSource);

        assert!(is_other_io_error(d.read_u8()));
        assert_eq!(d.consumed(), 0);
        assert!(is_other_io_error(d.read_bytes(4)));
        assert_eq!(d.consumed(), 0);
        assert!(is_other_io_error(d.skip(4)));
        assert_eq!(d.consumed(), 0);
    }

    #[test]
    fn test_io_error_02() {
        let mut d = BoundedDecoder::new(BrokenSource);

        d.arm_quota(2);
        assert!(is_other_io_error(d.read_uint(4)));
        assert!(is_other_io_error(d.skip(4)));
        assert_eq!(d.consumed(), 0);
        assert_eq!(d.remaining(), 2);
    }

    #[test]
    fn test_read_bits_04() {
        let a = [0xff, 0x0f];
        let mut d = decoder(&a);

        assert_eq!(d.read_bits(usize::MAX, Endian::Little), Err(DecodeError::SourceExhausted));
        assert!(!d.has_more());
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn test_length_coded_string_03() {
        // Length beyond the address space
        let a = [254, 0, 0, 0, 0, 1, 0, 0, 0, 0x41, 0x42];
        let mut d = decoder(&a);

        d.arm_quota(10);
        assert_eq!(d.length_coded_string(), Err(DecodeError::QuotaExceeded));
        assert_eq!(d.source().as_slice(), &[0x42]);
    }

    #[test]
    fn test_length_coded_string_04() {
        // Declared length far beyond the quota: advance to the boundary
        let a = [254, 0, 0, 0, 0, 0, 0, 0, 0x40, 0x41, 0x42];
        let mut d = decoder(&a);

        d.arm_quota(10);
        assert_eq!(d.length_coded_string(), Err(DecodeError::QuotaExceeded));
        assert_eq!(d.source().as_slice(), &[0x42]);
    }

    #[test]
    fn test_has_more_01() {
        let a = [1, 2];
        let mut d = decoder(&a);

        d.arm_quota(1);
        assert_eq!(d.read_u8(), Ok(1));
        assert_eq!(d.remaining(), 0);
        assert!(d.has_more());
        assert_eq!(d.into_inner().as_slice(), &[2]);
    }
}
