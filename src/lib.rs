pub mod codec;
pub mod decoder;
pub mod source;

pub use self::codec::bits::BitField;
pub use self::codec::raw::RawString;
pub use self::codec::{Decode, Encoder, Endian, SizeEncoder, SliceEncoder, VecEncoder};
pub use self::decoder::{BoundedDecoder, DecodeError, DecoderConfig};
pub use self::source::{ByteSource, SliceSource};
