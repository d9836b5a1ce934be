//! Fixed-length integer <-> byte conversion.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Byte order of a multi-byte register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

impl FromStr for ByteOrder {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "big" => Ok(Self::BigEndian),
            "little" => Ok(Self::LittleEndian),
            _ => Err(CodecError::InvalidByteOrder),
        }
    }
}

/// Largest field the codec handles, in bytes.
pub const MAX_LEN: usize = 8;

/// Encodes the low `len` bytes of `value`.
///
/// Bits above `8 * len` are dropped, so negative values come out in two's
/// complement.
pub fn encode(value: i64, len: usize, order: ByteOrder) -> Result<Vec<u8>, CodecError> {
    if len == 0 || len > MAX_LEN {
        return Err(CodecError::InvalidLength(len));
    }

    let little = (0..len).map(|i| ((value >> (i * 8)) & 0xFF) as u8);
    Ok(match order {
        ByteOrder::LittleEndian => little.collect(),
        ByteOrder::BigEndian => {
            let mut bytes: Vec<u8> = little.collect();
            bytes.reverse();
            bytes
        }
    })
}

/// Decodes `bytes` into an integer.
///
/// With `signed` set, the top bit of the most significant byte is a sign bit
/// and `1 << (8 * len)` is subtracted when it is set. An empty slice is 0.
pub fn decode(bytes: &[u8], order: ByteOrder, signed: bool) -> Result<i64, CodecError> {
    if bytes.len() > MAX_LEN {
        return Err(CodecError::InvalidLength(bytes.len()));
    }

    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let shift = match order {
            ByteOrder::LittleEndian => i * 8,
            ByteOrder::BigEndian => (bytes.len() - 1 - i) * 8,
        };
        value |= (*byte as u64) << shift;
    }

    let msb = match order {
        ByteOrder::LittleEndian => bytes.last(),
        ByteOrder::BigEndian => bytes.first(),
    };

    match msb {
        Some(msb) if signed && msb & 0x80 != 0 => {
            if bytes.len() == MAX_LEN {
                Ok(value as i64)
            } else {
                Ok(value as i64 - (1i64 << (8 * bytes.len())))
            }
        }
        _ => Ok(value as i64),
    }
}

/// Errors produced by [`encode`] and [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Byte order selector was neither `big` nor `little`.
    InvalidByteOrder,
    /// Field length outside `1..=MAX_LEN`.
    InvalidLength(usize),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::InvalidByteOrder => {
                f.write_str("byteorder must be either 'little' or 'big'")
            }
            CodecError::InvalidLength(len) => {
                write!(f, "field length {} is outside 1..={}", len, MAX_LEN)
            }
        }
    }
}

impl std::error::Error for CodecError {}
