//! Register-level access to one device on a two-wire bus.

use core::fmt::Debug;

use embedded_hal::blocking::i2c::*;
use log::debug;

use crate::codec::{self, ByteOrder};
use crate::error::Error;

/// A bus handle bound to a single, fixed slave address.
///
/// Every call is exactly one blocking bus transaction. There are no retries
/// and nothing is cached. `reg` is `None` for command-only devices, in which
/// case the payload goes out (or comes back) with no address byte in front.
pub struct Transport<T>
where
    T: WriteRead + Read + Write,
{
    i2c: T,
    address: u8,
}

impl<T> Transport<T>
where
    T: WriteRead + Read + Write,
{
    /// Binds `i2c` to the 7-bit slave `address`.
    pub fn new(i2c: T, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the underlying I2C bus.
    pub fn release(self) -> T {
        self.i2c
    }
}

impl<I2C, E> Transport<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    /// Fills `buf` from the device.
    pub fn read(&mut self, reg: Option<u8>, buf: &mut [u8]) -> Result<(), Error<E>> {
        if buf.is_empty() {
            return Err(Error::InvalidArgument("read size should be greater than 0"));
        }

        match reg {
            Some(reg) => self.i2c.write_read(self.address, &[reg], buf),
            None => self.i2c.read(self.address, buf),
        }
        .map_err(|e| {
            debug!("i2c 0x{:02X}: read from {:02X?} failed", self.address, reg);
            Error::Read(e)
        })?;

        debug!(
            "i2c 0x{:02X}: read {:02X?} from {:02X?}",
            self.address, buf, reg
        );
        Ok(())
    }

    /// Reads a frame of exactly `N` bytes.
    pub fn read_frame<const N: usize>(&mut self, reg: Option<u8>) -> Result<[u8; N], Error<E>> {
        let mut buf = [0u8; N];
        self.read(reg, &mut buf)?;
        Ok(buf)
    }

    /// Sends `data`, prefixed by `reg` when there is one.
    pub fn write(&mut self, reg: Option<u8>, data: &[u8]) -> Result<(), Error<E>> {
        let mut buf = Vec::with_capacity(data.len() + 1);
        buf.extend(reg);
        buf.extend_from_slice(data);

        if buf.is_empty() {
            return Err(Error::InvalidArgument("nothing to write"));
        }

        debug!("i2c 0x{:02X}: write {:02X?}", self.address, buf);
        self.i2c.write(self.address, &buf).map_err(Error::Write)
    }

    /// Reads a `len`-byte integer field.
    pub fn read_int(
        &mut self,
        reg: Option<u8>,
        len: usize,
        order: ByteOrder,
        signed: bool,
    ) -> Result<i64, Error<E>> {
        if len > codec::MAX_LEN {
            return Err(Error::InvalidArgument("field length out of range"));
        }
        let mut buf = [0u8; codec::MAX_LEN];
        self.read(reg, &mut buf[..len])?;
        Ok(codec::decode(&buf[..len], order, signed)?)
    }

    /// Writes the low `len` bytes of `value`.
    pub fn write_int(
        &mut self,
        reg: Option<u8>,
        value: i64,
        len: usize,
        order: ByteOrder,
    ) -> Result<(), Error<E>> {
        let bytes = codec::encode(value, len, order)?;
        self.write(reg, &bytes)
    }

    pub fn read_byte(&mut self, reg: Option<u8>) -> Result<u8, Error<E>> {
        self.read_int(reg, 1, ByteOrder::BigEndian, false)
            .map(|v| v as u8)
    }

    pub fn write_byte(&mut self, reg: Option<u8>, value: u8) -> Result<(), Error<E>> {
        self.write(reg, &[value])
    }

    pub fn read_word(&mut self, reg: Option<u8>, order: ByteOrder) -> Result<u16, Error<E>> {
        self.read_int(reg, 2, order, false).map(|v| v as u16)
    }

    pub fn write_word(&mut self, reg: Option<u8>, value: u16, order: ByteOrder) -> Result<(), Error<E>> {
        self.write_int(reg, value as i64, 2, order)
    }
}
