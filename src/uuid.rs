//! The 200-bit identifier value and its textual representations.

use std::{fmt, str};

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine};
use thiserror::Error;

use crate::bits;

/// Standard alphabet, padded on encode, tolerant of missing padding on decode.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Represents a 200-bit time-ordered identifier.
///
/// The value is an opaque 25-byte buffer, fully populated at construction and
/// never mutated afterwards. Bit positions count from the least significant
/// bit of byte 0; see the crate documentation for the field layout.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Uuid([u8; 25]);

/// Payload layout selector stored in the two version bits at [64, 66).
///
/// These are the only two assignable tags; a generator's version is fixed at
/// construction and cannot produce anything else. The remaining two bit
/// patterns are reachable only by decoding foreign bytes, in which case
/// [`Uuid::version`] returns `None`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Version {
    /// A 16-bit site prefix at [66, 82) followed by 118 random bits.
    V1 = 1,
    /// 134 random bits, no prefix.
    V2 = 2,
}

impl Uuid {
    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 25] {
        &self.0
    }

    /// Reads a field of up to 64 bits, LSB-first, from the buffer.
    fn field(&self, start: usize, end: usize) -> u64 {
        let mut buf = [0u8; 8];
        bits::read_bits(&self.0, start, end, &mut buf)
            .expect("field range within the 200-bit layout");
        u64::from_le_bytes(buf)
    }

    /// Returns the timestamp field: microseconds since the Unix epoch.
    pub fn timestamp_micros(&self) -> u64 {
        self.field(0, 52)
    }

    /// Returns the 12-bit rotation counter that disambiguates identifiers
    /// created within the same microsecond.
    pub fn counter(&self) -> u16 {
        self.field(52, 64) as u16
    }

    /// Returns the chronological sort key `timestamp << 12 | counter`.
    ///
    /// The timestamp and counter occupy the same bit positions in both layout
    /// versions, so the key is extracted without consulting the version tag.
    /// Keys collide once the counter wraps past 4096 identifiers in one
    /// microsecond; the random payload is what keeps such identifiers
    /// distinct.
    ///
    /// The identifier's byte order does not follow its chronological order,
    /// so collections are sorted with `sort_by_key(Uuid::order)` rather than
    /// by raw bytes.
    pub fn order(&self) -> u64 {
        self.timestamp_micros() << 12 | self.counter() as u64
    }

    /// Returns the layout version, or `None` if the stored tag matches
    /// neither supported version.
    pub fn version(&self) -> Option<Version> {
        match self.field(64, 66) {
            1 => Some(Version::V1),
            2 => Some(Version::V2),
            _ => None,
        }
    }

    /// Returns the 16-bit site prefix of a [`Version::V1`] identifier, or
    /// `None` for any other layout.
    pub fn prefix(&self) -> Option<u16> {
        match self.version() {
            Some(Version::V1) => Some(self.field(66, 82) as u16),
            _ => None,
        }
    }

    /// Formats the identifier as `"{order}-{payload}"`, where the payload is
    /// the unpadded base64 encoding of bytes 8 through 24.
    ///
    /// The decimal order prefix makes plain lexicographic sort agree with
    /// chronological order as long as the compared prefixes have equal width;
    /// the payload segment disambiguates identifiers sharing an order key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let id = uuid200::uuid200();
    /// let s = id.to_sortable_string();
    /// assert_eq!(s[..s.find('-').unwrap()].parse::<u64>().unwrap(), id.order());
    /// ```
    pub fn to_sortable_string(&self) -> String {
        format!("{}-{}", self.order(), STANDARD_NO_PAD.encode(&self.0[8..]))
    }
}

impl fmt::Display for Uuid {
    /// Returns the padded base64 encoding of the 25 raw bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE64.encode(self.0))
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the base64 representation, with or without
    /// padding.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let bytes = BASE64.decode(src)?;
        match <[u8; 25]>::try_from(bytes.as_slice()) {
            Ok(e) => Ok(Self(e)),
            Err(_) => Err(ParseError::Length(bytes.len())),
        }
    }
}

impl From<Uuid> for [u8; 25] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 25]> for Uuid {
    fn from(src: [u8; 25]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Error parsing an invalid string representation of an identifier.
///
/// A failed parse never yields a partially populated value: the input either
/// decodes to exactly 25 bytes or is rejected.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ParseError {
    /// The input is not valid base64.
    #[error("invalid base64 representation")]
    Base64(#[from] base64::DecodeError),
    /// The input decoded cleanly but to the wrong number of bytes.
    #[error("decoded to {0} bytes, expected 25")]
    Length(usize),
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.to_string())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a base64 string or 25 raw bytes")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 25]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
