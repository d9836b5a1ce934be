//! Board-level sampling and change reporting.
//!
//! [`SensorService`] owns the three drivers on one bus and turns a polling
//! cycle into a [`Snapshot`]. [`ChangeTracker`] decides which values are worth
//! sending and hands a [`Report`] to a caller-supplied [`TelemetrySink`].
//! When and how often to poll is left to the caller.

use core::fmt::Debug;

use anyhow::{Error, Result};
use embedded_hal::blocking::{delay::DelayMs, i2c::*};
use log::*;
use serde::Serialize;
use shared_bus::{BusManager, BusMutex, I2cProxy};

use crate::config::{Config, CONFIG};
use crate::sensors::{
    i2c_sensor::I2CSensor, lps22hb::Lps22hb, round2, shtc3::Shtc3, tcs34725::Tcs34725,
};

// Pause between two sensors within one cycle.
const SAMPLE_GAP_MS: u32 = 100;
// Back-off after a report the sink did not take.
const RETRY_DELAY_MS: u32 = 1000;

/// An 8-bit per channel colour, keyed `1`/`2`/`3` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    #[serde(rename = "1")]
    pub r: u8,
    #[serde(rename = "2")]
    pub g: u8,
    #[serde(rename = "3")]
    pub b: u8,
}

impl Rgb {
    /// Splits a packed RGB888 word into its low three bytes.
    pub fn from_rgb888(value: i32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// Everything one polling cycle managed to read.
///
/// A sensor that failed leaves its fields `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    /// SHTC3 temperature, °C
    pub temperature: Option<f64>,
    /// SHTC3 relative humidity, %
    pub humidity: Option<f64>,
    /// LPS22HB temperature, °C
    pub pressure_temperature: Option<f64>,
    /// LPS22HB pressure, hPa
    pub pressure: Option<f64>,
    pub color: Option<Rgb>,
}

/// The values that changed enough to be sent, keyed by their model id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Report {
    #[serde(rename = "3", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "4", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(rename = "5", skip_serializing_if = "Option::is_none")]
    pub pressure_temperature: Option<f64>,
    #[serde(rename = "6", skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(rename = "7", skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        *self == Report::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Where reports go, e.g. a cloud telemetry session.
pub trait TelemetrySink {
    /// Sends one report. `Ok(false)` means the peer did not accept it.
    fn send(&mut self, report: &Report) -> Result<bool>;
}

pub struct SensorService<T, D>
where
    T: WriteRead + Read + Write,
{
    shtc3: Shtc3<T, D>,
    lps22hb: Lps22hb<T>,
    tcs34725: Tcs34725<T, D>,
    delay: D,
}

impl<T, D> SensorService<T, D>
where
    T: WriteRead + Read + Write,
    D: DelayMs<u32> + Clone,
{
    /// Binds each driver to its own handle of the same physical bus.
    pub fn new(shtc3_bus: T, lps22hb_bus: T, tcs34725_bus: T, delay: D) -> Self {
        Self {
            shtc3: Shtc3::new(shtc3_bus, delay.clone()),
            lps22hb: Lps22hb::new(lps22hb_bus),
            tcs34725: Tcs34725::new(tcs34725_bus, delay.clone()),
            delay,
        }
    }
}

impl<'a, M, D> SensorService<I2cProxy<'a, M>, D>
where
    M: BusMutex,
    M::Bus: WriteRead + Read + Write,
    D: DelayMs<u32> + Clone,
{
    /// Takes one proxy per driver from a `shared-bus` manager.
    pub fn from_bus(bus: &'a BusManager<M>, delay: D) -> Self {
        Self::new(
            bus.acquire_i2c(),
            bus.acquire_i2c(),
            bus.acquire_i2c(),
            delay,
        )
    }
}

impl<I2C, D, E> SensorService<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    E: Debug,
{
    /// Initializes the humidity, pressure and colour sensors, in that order.
    ///
    /// The pressure sensor's reset wait is unbounded; wrap this call in a
    /// watchdog if start-up time matters.
    pub fn init(&mut self) -> Result<()> {
        info!("SensorService: init sensors, this will take some time");
        self.shtc3
            .init()
            .map_err(|e| Error::msg(format!("Shtc3 init failed: {e}")))?;
        self.lps22hb
            .init()
            .map_err(|e| Error::msg(format!("Lps22hb init failed: {e}")))?;
        self.tcs34725
            .init()
            .map_err(|e| Error::msg(format!("Tcs34725 init failed: {e}")))?;
        Ok(())
    }

    /// Reads every sensor once. Failures are logged and leave gaps.
    pub fn sample(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        match self.shtc3.temperature_and_humidity() {
            Ok((temperature, humidity)) => {
                debug!("temp1: {:0.2}, humi: {:0.2}", temperature, humidity);
                snapshot.temperature = Some(temperature);
                snapshot.humidity = Some(humidity);
            }
            Err(e) => error!("temperature_and_humidity error: {}", e),
        }

        self.delay.delay_ms(SAMPLE_GAP_MS);

        match self.lps22hb.read_pressure_and_temperature() {
            Ok((pressure, temperature)) => {
                debug!("press: {:0.2}, temp2: {:0.2}", pressure, temperature);
                snapshot.pressure = Some(pressure);
                snapshot.pressure_temperature = Some(temperature);
            }
            Err(e) => error!("read_pressure_and_temperature error: {}", e),
        }

        self.delay.delay_ms(SAMPLE_GAP_MS);

        match self.tcs34725.rgb_value() {
            Ok(rgb888) => {
                let rgb = Rgb::from_rgb888(rgb888);
                debug!("R: {}, G: {}, B: {}", rgb.r, rgb.g, rgb.b);
                snapshot.color = Some(rgb);
            }
            Err(e) => error!("rgb_value error: {}", e),
        }

        snapshot
    }

    pub fn shtc3(&mut self) -> &mut Shtc3<I2C, D> {
        &mut self.shtc3
    }

    pub fn lps22hb(&mut self) -> &mut Lps22hb<I2C> {
        &mut self.lps22hb
    }

    pub fn tcs34725(&mut self) -> &mut Tcs34725<I2C, D> {
        &mut self.tcs34725
    }
}

/// Remembers what was last reported and filters out small changes.
pub struct ChangeTracker {
    temperature_delta: f64,
    humidity_delta: f64,
    pressure_delta: f64,
    color_distance: f64,
    send_attempts: u32,
    reported: Snapshot,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new(&CONFIG)
    }
}

impl ChangeTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            temperature_delta: config.temperature_delta as f64,
            humidity_delta: config.humidity_delta as f64,
            pressure_delta: config.pressure_delta as f64,
            color_distance: config.color_distance as f64,
            send_attempts: config.send_attempts,
            reported: Snapshot::default(),
        }
    }

    /// Builds the report for `snapshot` and records what went into it.
    ///
    /// Anything never reported before is always included.
    pub fn update(&mut self, snapshot: &Snapshot) -> Report {
        Report {
            temperature: changed(
                &mut self.reported.temperature,
                snapshot.temperature,
                self.temperature_delta,
            ),
            humidity: changed(
                &mut self.reported.humidity,
                snapshot.humidity,
                self.humidity_delta,
            ),
            pressure_temperature: changed(
                &mut self.reported.pressure_temperature,
                snapshot.pressure_temperature,
                self.temperature_delta,
            ),
            pressure: changed(
                &mut self.reported.pressure,
                snapshot.pressure,
                self.pressure_delta,
            ),
            color: self.color_changed(snapshot.color),
        }
    }

    fn color_changed(&mut self, current: Option<Rgb>) -> Option<Rgb> {
        let current = current?;
        match self.reported.color {
            Some(last) if last.distance(&current) < self.color_distance => None,
            _ => {
                self.reported.color = Some(current);
                Some(current)
            }
        }
    }

    /// Forgets everything, so the next report carries every value.
    pub fn reset(&mut self) {
        self.reported = Snapshot::default();
    }

    /// Hands a non-empty report to `sink`, retrying up to the configured
    /// number of attempts.
    ///
    /// Every failed attempt is followed by a one second wait on `delay`.
    /// Returns whether the report was delivered. If it never was, tracked
    /// values are reset.
    pub fn publish<S, D>(&mut self, report: &Report, sink: &mut S, delay: &mut D) -> bool
    where
        S: TelemetrySink,
        D: DelayMs<u32>,
    {
        if report.is_empty() {
            return true;
        }

        for attempt in 1..=self.send_attempts {
            match sink.send(report) {
                Ok(true) => return true,
                Ok(false) => warn!("report rejected (attempt {})", attempt),
                Err(e) => warn!("report send error (attempt {}): {:?}", attempt, e),
            }
            delay.delay_ms(RETRY_DELAY_MS);
        }

        error!(
            "report not delivered after {} attempts, resetting",
            self.send_attempts
        );
        self.reset();
        false
    }
}

fn changed(reported: &mut Option<f64>, current: Option<f64>, delta: f64) -> Option<f64> {
    let current = current?;
    match *reported {
        Some(last) if (last - current).abs() <= delta => None,
        _ => {
            *reported = Some(current);
            Some(round2(current))
        }
    }
}
