use std::fmt::{Debug, Display, Formatter};

use crate::codec::CodecError;

/// Describes errors returned by the sensor drivers
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus rejected a read transaction
    Read(E),
    /// The bus rejected a write transaction
    Write(E),
    /// The identity register or command returned an unexpected value
    ///
    /// Nothing past the identity check is sent to the device when this happens.
    IdentityMismatch { device: &'static str, found: u16 },
    /// A request that can never be put on the bus, e.g. a zero-length read
    InvalidArgument(&'static str),
    /// The interrupt line could not be sampled
    InterruptLine,
}

impl<E: Debug> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Error::*;
        match self {
            Read(error) => write!(f, "I2C read failed: {:?}", error),
            Write(error) => write!(f, "I2C write failed: {:?}", error),
            IdentityMismatch { device, found } => {
                write!(f, "{} got wrong chip id: 0x{:02X}", device, found)
            }
            InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            InterruptLine => f.write_str("interrupt line could not be read"),
        }
    }
}

impl<E: Debug> std::error::Error for Error<E> {}

impl<E> From<CodecError> for Error<E> {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::InvalidByteOrder => Error::InvalidArgument("unknown byte order"),
            CodecError::InvalidLength(_) => Error::InvalidArgument("field length out of range"),
        }
    }
}
