use super::lenenc::NULL_MARKER;
use super::raw::RawString;
use crate::decoder::{BoundedDecoder, DecodeError};
use crate::source::ByteSource;

/// Typed decoding on top of the primitive decoder operations.
///
/// Integers use their full native width in little-endian order. Strings are length-coded.
pub trait Decode: Sized {
    fn decode<S: ByteSource>(d: &mut BoundedDecoder<S>) -> Result<Self, DecodeError>;
}

macro_rules! decode_unsigned {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            #[inline]
            fn decode<S: ByteSource>(d: &mut BoundedDecoder<S>) -> Result<Self, DecodeError> {
                Ok(d.read_uint(std::mem::size_of::<$t>())? as $t)
            }
        }
    )*};
}

macro_rules! decode_signed {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            #[inline]
            fn decode<S: ByteSource>(d: &mut BoundedDecoder<S>) -> Result<Self, DecodeError> {
                Ok(d.read_long(std::mem::size_of::<$t>())? as $t)
            }
        }
    )*};
}

decode_unsigned!(u8, u16, u32, u64);
decode_signed!(i8, i16, i32, i64);

impl Decode for Option<RawString> {
    #[inline]
    fn decode<S: ByteSource>(d: &mut BoundedDecoder<S>) -> Result<Self, DecodeError> {
        d.length_coded_string()
    }
}

/// A non-nullable length-coded string; the null marker is rejected.
impl Decode for RawString {
    #[inline]
    fn decode<S: ByteSource>(d: &mut BoundedDecoder<S>) -> Result<Self, DecodeError> {
        d.length_coded_string()?
            .ok_or(DecodeError::InvalidEncoding(NULL_MARKER))
    }
}
