pub mod bits;
pub mod int;
pub mod lenenc;
pub mod raw;

mod decode;
mod encoder;

pub use self::decode::*;
pub use self::encoder::*;

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}
