//! Blocking I2C drivers for the environment sensor board.
//!
//! Three devices share one two-wire bus:
//!
//! * [`lps22hb::Lps22hb`] - barometric pressure and temperature (0x5C)
//! * [`shtc3::Shtc3`] - relative humidity and temperature (0x70)
//! * [`tcs34725::Tcs34725`] - RGB colour and ambient light (0x29)
//!
//! Every driver sits on a [`transport::Transport`], which binds an
//! `embedded-hal` bus to the device's fixed slave address. None of the drivers
//! lock the bus; share it through `shared-bus` (see [`service`]).

pub mod codec;
pub mod config;
pub mod error;
pub mod sensors;
pub mod service;
pub mod transport;

pub use error::Error;
pub use sensors::{i2c_sensor::I2CSensor, lps22hb, shtc3, tcs34725};
