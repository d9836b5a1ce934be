//! SHTC3 relative humidity and temperature sensor.
//!
//! The SHTC3 has no register map. Every exchange is a 16-bit command written
//! on its own, followed (for measurements and the ID) by a bare read. Data
//! words come back as two bytes plus a CRC-8.

use core::fmt::Debug;

use embedded_hal::blocking::{delay::DelayMs, i2c::*};
use log::*;

use super::{i2c_sensor::I2CSensor, round2};
use crate::error::Error;
use crate::transport::Transport;

pub const ADDRESS: u8 = 0x70;

// Bits of the ID register that identify an SHTC3.
pub const CHIP_ID_MASK: u16 = 0x0807;

// The device needs this long after wakeup or soft reset.
const POWER_UP_MS: u32 = 30;
// Conversion time of a normal-mode measurement.
const MEASUREMENT_MS: u32 = 20;

const CRC8_POLYNOMIAL: u16 = 0x131;
const CRC8_INIT: u8 = 0xFF;

/// Command set of the SHTC3.
///
/// Measurements come in normal (NM) and low-power (LM) mode, each with clock
/// stretching enabled (CE) or disabled (CD). `TH` reads temperature first,
/// `RH` humidity first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Command {
    Wakeup = 0x3517,
    Sleep = 0xB098,
    NmCeReadTh = 0x7CA2,
    NmCeReadRh = 0x5C24,
    NmCdReadTh = 0x7866,
    NmCdReadRh = 0x58E0,
    LmCeReadTh = 0x6458,
    LmCeReadRh = 0x44DE,
    LmCdReadTh = 0x609C,
    SoftwareReset = 0x401A,
    ReadId = 0xEFC8,
}

impl Command {
    /// The command as it goes on the wire.
    pub fn bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}

/// CRC-8 over `data`: polynomial 0x131, initial value 0xFF, no final XOR.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT as u16;
    for byte in data {
        crc ^= *byte as u16;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC8_POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc as u8
}

/// Verifies a `[msb, lsb, crc]` frame and returns the data word.
pub fn check_frame(frame: &[u8; 3]) -> Option<u16> {
    if crc8(&frame[..2]) == frame[2] {
        Some(u16::from_be_bytes([frame[0], frame[1]]))
    } else {
        None
    }
}

/// Temperature in °C for a raw data word, rounded to 2 decimals.
pub fn temperature_from_raw(raw: u16) -> f64 {
    round2(175.0 * raw as f64 / 65536.0 - 45.0)
}

/// Relative humidity in % for a raw data word, rounded to 2 decimals.
pub fn humidity_from_raw(raw: u16) -> f64 {
    round2(100.0 * raw as f64 / 65536.0)
}

pub struct Shtc3<T, D>
where
    T: WriteRead + Read + Write,
{
    transport: Transport<T>,
    delay: D,
}

impl<T, D> Shtc3<T, D>
where
    T: WriteRead + Read + Write,
    D: DelayMs<u32>,
{
    /// Creates a new sensor driver at [`ADDRESS`].
    pub fn new(i2c: T, delay: D) -> Self {
        Self {
            transport: Transport::new(i2c, ADDRESS),
            delay,
        }
    }
}

impl<I2C, D, E> I2CSensor<I2C, E> for Shtc3<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    E: Debug,
{
    const ADDRESS: u8 = ADDRESS;

    fn init(&mut self) -> Result<(), Error<E>> {
        let chip_id = self.chip_id()?;
        if chip_id != CHIP_ID_MASK {
            error!("Shtc3 got wrong chip id: 0x{:04X}", chip_id);
            return Err(Error::IdentityMismatch {
                device: "Shtc3",
                found: chip_id,
            });
        }
        self.soft_reset()?;
        info!("Shtc3: initialized");
        Ok(())
    }

    fn release(self) -> I2C {
        self.transport.release()
    }
}

impl<I2C, D, E> Shtc3<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    E: Debug,
{
    fn command(&mut self, command: Command) -> Result<(), Error<E>> {
        self.transport.write(None, &command.bytes())
    }

    /// The ID register masked with [`CHIP_ID_MASK`].
    pub fn chip_id(&mut self) -> Result<u16, Error<E>> {
        self.command(Command::ReadId)?;
        let id: [u8; 2] = self.transport.read_frame(None)?;
        Ok(u16::from_be_bytes(id) & CHIP_ID_MASK)
    }

    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        self.command(Command::SoftwareReset)?;
        self.delay.delay_ms(POWER_UP_MS);
        Ok(())
    }

    pub fn wakeup(&mut self) -> Result<(), Error<E>> {
        self.command(Command::Wakeup)?;
        self.delay.delay_ms(POWER_UP_MS);
        Ok(())
    }

    pub fn sleep(&mut self) -> Result<(), Error<E>> {
        self.command(Command::Sleep)
    }

    fn measure(&mut self, command: Command) -> Result<Option<u16>, Error<E>> {
        self.command(command)?;
        self.delay.delay_ms(MEASUREMENT_MS);
        let frame: [u8; 3] = self.transport.read_frame(None)?;
        let value = check_frame(&frame);
        if value.is_none() {
            warn!("Shtc3: checksum mismatch in frame {:02X?}", frame);
        }
        Ok(value)
    }

    /// Temperature in °C, or `None` when the frame failed its checksum.
    pub fn try_temperature(&mut self) -> Result<Option<f64>, Error<E>> {
        Ok(self
            .measure(Command::NmCdReadTh)?
            .map(temperature_from_raw))
    }

    /// Relative humidity in %, or `None` when the frame failed its checksum.
    pub fn try_humidity(&mut self) -> Result<Option<f64>, Error<E>> {
        Ok(self.measure(Command::NmCdReadRh)?.map(humidity_from_raw))
    }

    /// Temperature in °C; a corrupt frame reads as 0.0.
    pub fn temperature(&mut self) -> Result<f64, Error<E>> {
        Ok(self.try_temperature()?.unwrap_or(0.0))
    }

    /// Relative humidity in %; a corrupt frame reads as 0.0.
    pub fn humidity(&mut self) -> Result<f64, Error<E>> {
        Ok(self.try_humidity()?.unwrap_or(0.0))
    }

    /// Wakes the sensor, reads temperature then humidity, and puts it back to
    /// sleep. The sleep command is sent even when a measurement fails.
    pub fn temperature_and_humidity(&mut self) -> Result<(f64, f64), Error<E>> {
        self.wakeup()?;
        let measured = self.measure_both();
        let slept = self.sleep();
        let values = measured?;
        slept?;
        Ok(values)
    }

    fn measure_both(&mut self) -> Result<(f64, f64), Error<E>> {
        let temperature = self.temperature()?;
        let humidity = self.humidity()?;
        Ok((temperature, humidity))
    }
}
