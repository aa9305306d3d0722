use std::error::Error;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum DecodeError {
    /// The read would cross the armed quota boundary.
    QuotaExceeded,
    /// The byte source ran out of data before the read could be satisfied.
    SourceExhausted,
    /// Reserved lead byte of a length-coded integer (or a null marker where none is allowed).
    InvalidEncoding(u8),
    /// Integer width outside of the supported range.
    InvalidWidth(usize),
    /// A null-terminated string exceeded the configured maximum length.
    StringTooLong(usize),
    IoError(Arc<std::io::Error>),
}

impl DecodeError {
    /// Returns `true` for errors that indicate a broken format invariant rather than a
    /// malformed or truncated record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidEncoding(_))
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(Arc::new(e))
    }
}

impl PartialEq for DecodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::QuotaExceeded, Self::QuotaExceeded) => true,
            (Self::SourceExhausted, Self::SourceExhausted) => true,
            (Self::InvalidEncoding(a), Self::InvalidEncoding(b)) => a == b,
            (Self::InvalidWidth(a), Self::InvalidWidth(b)) => a == b,
            (Self::StringTooLong(a), Self::StringTooLong(b)) => a == b,
            (Self::IoError(a), Self::IoError(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded => write!(f, "Read exceeds record length"),
            Self::SourceExhausted => write!(f, "Unexpected end of input"),
            Self::InvalidEncoding(x) => write!(f, "Invalid encoding (lead byte {})", x),
            Self::InvalidWidth(x) => write!(f, "Invalid integer width: {}", x),
            Self::StringTooLong(x) => write!(f, "String exceeds {} bytes", x),
            Self::IoError(e) => write!(f, "{}", e),
        }
    }
}
