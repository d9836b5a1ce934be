//! LPS22HB barometric pressure and temperature sensor.

use core::fmt::Debug;

use bitfield::bitfield;
use embedded_hal::blocking::i2c::*;
use log::*;

use super::{i2c_sensor::I2CSensor, round2};
use crate::error::Error;
use crate::transport::Transport;

pub const ADDRESS: u8 = 0x5C;

// Value of the WHO_AM_I register.
pub const CHIP_ID: u8 = 0xB1;

// LPS22HB register addresses
// Device identification.
const LPS_WHO_AM_I: u8 = 0x0F;
// ODR, low-pass filter and block data update.
const LPS_CTRL_REG1: u8 = 0x10;
// Boot, FIFO, software reset and one-shot trigger.
const LPS_CTRL_REG2: u8 = 0x11;
// Interrupt control.
const LPS_CTRL_REG3: u8 = 0x12;
// Data availability flags.
const LPS_STATUS: u8 = 0x27;
// Pressure output, 24 bits.
const LPS_PRESS_OUT_XL: u8 = 0x28;
const LPS_PRESS_OUT_L: u8 = 0x29;
const LPS_PRESS_OUT_H: u8 = 0x2A;
// Temperature output, 16 bits.
const LPS_TEMP_OUT_L: u8 = 0x2B;
const LPS_TEMP_OUT_H: u8 = 0x2C;

// CTRL_REG2 bits
const CTRL2_ONE_SHOT: u8 = 0x01;
const CTRL2_SWRESET: u8 = 0x04;

// CTRL_REG1 after reset: one-shot mode (ODR 0), low-pass filter off, block data update on.
const CTRL1_DEFAULT: u8 = 0x02;

/// Status register reads before a conversion is given up on.
pub const STATUS_POLL_ATTEMPTS: usize = 10;

const PRESSURE_LSB_PER_HPA: f64 = 4096.0;
const TEMPERATURE_LSB_PER_DEGREE: f64 = 100.0;

bitfield! {
    /// Contents of the STATUS register.
    pub struct Status(u8);
    impl Debug;
    pub bool, temperature_overrun, _: 5;
    pub bool, pressure_overrun, _: 4;
    pub bool, pressure_available, _: 1;
    pub bool, temperature_available, _: 0;
}

impl Status {
    /// Both outputs hold a fresh conversion.
    pub fn data_ready(&self) -> bool {
        self.pressure_available() && self.temperature_available()
    }
}

/// A single pressure/temperature conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Pressure in hPa, rounded to 2 decimals.
    pub pressure: f64,
    /// Temperature in °C, rounded to 2 decimals.
    pub temperature: f64,
}

impl Reading {
    /// Decodes the five output registers.
    pub fn from_raw(press_xl: u8, press_l: u8, press_h: u8, temp_l: u8, temp_h: u8) -> Self {
        let raw_pressure = ((press_h as u32) << 16) | ((press_l as u32) << 8) | press_xl as u32;
        let raw_temperature = ((temp_h as u16) << 8) | temp_l as u16;
        Self {
            pressure: round2(raw_pressure as f64 / PRESSURE_LSB_PER_HPA),
            temperature: round2(raw_temperature as f64 / TEMPERATURE_LSB_PER_DEGREE),
        }
    }
}

pub struct Lps22hb<T>
where
    T: WriteRead + Read + Write,
{
    transport: Transport<T>,
}

impl<T> Lps22hb<T>
where
    T: WriteRead + Read + Write,
{
    /// Creates a new sensor driver at [`ADDRESS`].
    pub fn new(i2c: T) -> Self {
        Self {
            transport: Transport::new(i2c, ADDRESS),
        }
    }
}

impl<I2C, E> I2CSensor<I2C, E> for Lps22hb<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    const ADDRESS: u8 = ADDRESS;

    fn init(&mut self) -> Result<(), Error<E>> {
        let chip_id = self.chip_id()?;
        if chip_id != CHIP_ID {
            error!("Lps22hb got wrong chip id: 0x{:02X}", chip_id);
            return Err(Error::IdentityMismatch {
                device: "Lps22hb",
                found: chip_id as u16,
            });
        }
        self.reset()?;
        self.transport.write_byte(Some(LPS_CTRL_REG1), CTRL1_DEFAULT)?;
        info!("Lps22hb: initialized");
        Ok(())
    }

    fn release(self) -> I2C {
        self.transport.release()
    }
}

impl<I2C, E> Lps22hb<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    pub fn chip_id(&mut self) -> Result<u8, Error<E>> {
        self.transport.read_byte(Some(LPS_WHO_AM_I))
    }

    /// Software reset.
    ///
    /// Blocks until the device clears SWRESET. There is no attempt bound: a
    /// device that never finishes keeps this call spinning, so callers that
    /// need a bounded start-up must enforce their own timeout.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        let ctrl2 = self.transport.read_byte(Some(LPS_CTRL_REG2))?;
        self.transport
            .write_byte(Some(LPS_CTRL_REG2), ctrl2 | CTRL2_SWRESET)?;
        while self.transport.read_byte(Some(LPS_CTRL_REG2))? & CTRL2_SWRESET != 0 {}
        debug!("Lps22hb: reset complete");
        Ok(())
    }

    pub fn status(&mut self) -> Result<Status, Error<E>> {
        self.transport.read_byte(Some(LPS_STATUS)).map(Status)
    }

    fn start_oneshot(&mut self) -> Result<(), Error<E>> {
        // CTRL_REG3 is read and dropped; the sensor has always been driven this way.
        let _ = self.transport.read_byte(Some(LPS_CTRL_REG3))?;
        let ctrl2 = self.transport.read_byte(Some(LPS_CTRL_REG2))?;
        self.transport
            .write_byte(Some(LPS_CTRL_REG2), ctrl2 | CTRL2_ONE_SHOT)
    }

    /// Triggers a one-shot conversion and reads it back.
    ///
    /// Returns `None` when the status register did not report both outputs
    /// ready within [`STATUS_POLL_ATTEMPTS`] reads.
    pub fn try_read_pressure_and_temperature(&mut self) -> Result<Option<Reading>, Error<E>> {
        self.start_oneshot()?;

        for _ in 0..STATUS_POLL_ATTEMPTS {
            if !self.status()?.data_ready() {
                continue;
            }

            let press_xl = self.transport.read_byte(Some(LPS_PRESS_OUT_XL))?;
            let press_l = self.transport.read_byte(Some(LPS_PRESS_OUT_L))?;
            let press_h = self.transport.read_byte(Some(LPS_PRESS_OUT_H))?;
            let temp_l = self.transport.read_byte(Some(LPS_TEMP_OUT_L))?;
            let temp_h = self.transport.read_byte(Some(LPS_TEMP_OUT_H))?;
            return Ok(Some(Reading::from_raw(
                press_xl, press_l, press_h, temp_l, temp_h,
            )));
        }

        warn!(
            "Lps22hb: no conversion after {} status reads",
            STATUS_POLL_ATTEMPTS
        );
        Ok(None)
    }

    /// Returns `(pressure hPa, temperature °C)`.
    ///
    /// A conversion that never completes comes back as `(0.0, 0.0)`, which
    /// cannot be told apart from a real zero. Use
    /// [`try_read_pressure_and_temperature`](Self::try_read_pressure_and_temperature)
    /// to see the difference.
    pub fn read_pressure_and_temperature(&mut self) -> Result<(f64, f64), Error<E>> {
        Ok(self
            .try_read_pressure_and_temperature()?
            .map(|r| (r.pressure, r.temperature))
            .unwrap_or((0.0, 0.0)))
    }
}
