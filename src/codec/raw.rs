use std::borrow::Cow;

/// The payload of a string field exactly as found on the wire.
///
/// The column charset is not known at this layer, so no conversion takes place.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawString(Vec<u8>);

impl RawString {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns `None` unless the payload is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<Vec<u8>> for RawString {
    fn from(x: Vec<u8>) -> Self {
        Self(x)
    }
}

impl From<&[u8]> for RawString {
    fn from(x: &[u8]) -> Self {
        Self(x.to_vec())
    }
}

impl From<&str> for RawString {
    fn from(x: &str) -> Self {
        Self(x.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for RawString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for RawString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for RawString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl std::fmt::Debug for RawString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawString({:?})", self.to_string_lossy())
    }
}
