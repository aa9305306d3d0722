/// Classification of the lead byte of a length-coded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// The lead byte is the value itself (0..=250).
    Inline(u8),
    /// The value is absent (SQL `NULL`).
    Null,
    /// The value follows as an unsigned little-endian integer of the given width.
    Wide(usize),
    /// Reserved lead byte. Never emitted by a well-behaved peer.
    Reserved(u8),
}

pub const NULL_MARKER: u8 = 251;
pub const WIDE_2: u8 = 252;
pub const WIDE_3: u8 = 253;
pub const WIDE_8: u8 = 254;

impl LengthPrefix {
    pub fn classify(lead: u8) -> Self {
        match lead {
            0..=250 => Self::Inline(lead),
            NULL_MARKER => Self::Null,
            WIDE_2 => Self::Wide(2),
            WIDE_3 => Self::Wide(3),
            WIDE_8 => Self::Wide(8),
            255 => Self::Reserved(lead),
        }
    }
}

/// Number of bytes the length-coded encoding of `x` occupies (including the lead byte).
pub fn length_coded_size(x: Option<u64>) -> usize {
    match x {
        None => 1,
        Some(0..=250) => 1,
        Some(0..=0xffff) => 3,
        Some(0..=0xff_ffff) => 4,
        Some(_) => 9,
    }
}
