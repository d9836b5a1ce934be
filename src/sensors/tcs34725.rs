//! TCS34725 RGB colour and ambient light sensor.

use core::fmt::Debug;

use bitfield::bitfield;
use embedded_hal::{
    blocking::{delay::DelayMs, i2c::*},
    digital::v2::InputPin,
};
use log::*;

use super::i2c_sensor::I2CSensor;
use crate::codec::ByteOrder;
use crate::error::Error;
use crate::transport::Transport;

pub const ADDRESS: u8 = 0x29;

// 0x44 = TCS34721/TCS34725, 0x4D = TCS34723/TCS34727
pub const CHIP_IDS: [u8; 2] = [0x44, 0x4D];

// Set on every byte sent to the command register.
const COMMAND_BIT: u8 = 0x80;

// TCS34725 register addresses
// Power and function enables.
const TCS_ENABLE: u8 = 0x00;
// RGBC integration time.
const TCS_ATIME: u8 = 0x01;
// Clear channel interrupt thresholds.
const TCS_AILTL: u8 = 0x04;
const TCS_AILTH: u8 = 0x05;
const TCS_AIHTL: u8 = 0x06;
const TCS_AIHTH: u8 = 0x07;
// Interrupt persistence filter.
const TCS_PERS: u8 = 0x0C;
// Gain control.
const TCS_CONTROL: u8 = 0x0F;
// Device ID.
const TCS_ID: u8 = 0x12;
// Device status.
const TCS_STATUS: u8 = 0x13;
// Channel data, two bytes per channel.
const TCS_CDATAL: u8 = 0x14;
const TCS_RDATAL: u8 = 0x16;
const TCS_GDATAL: u8 = 0x18;
const TCS_BDATAL: u8 = 0x1A;

// Special function: clear the RGBC interrupt.
const TCS_SF_CLEAR_INT: u8 = 0x06;

// A clear channel value outside the thresholds this many consecutive cycles raises the interrupt.
pub const PERS_NONE: u8 = 0b0000;
pub const PERS_1_CYCLE: u8 = 0b0001;
pub const PERS_2_CYCLE: u8 = 0b0010;
pub const PERS_3_CYCLE: u8 = 0b0011;
pub const PERS_5_CYCLE: u8 = 0b0100;
pub const PERS_60_CYCLE: u8 = 0b1111;

// Lux equation coefficients.
const R_COEF: f64 = 0.136;
const G_COEF: f64 = 1.000;
const B_COEF: f64 = -0.444;
// Glass attenuation.
const GA: f64 = 1.0;
// Device factor.
const DF: f64 = 310.0;
// Colour temperature fit.
const CT_COEF: f64 = 3810.0;
const CT_OFFSET: f64 = 1391.0;

// RGB normalisation: dark offset and rescale ratio.
const RGB_OFFSET: i32 = 30;
const RGB_SCALE_NUM: i32 = 255;
const RGB_SCALE_DEN: i32 = 225;

/// How a register address is turned into a command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Command bit only; repeated access hits the same register.
    RepeatedByte,
    /// Command bit plus auto-increment, for reading a low/high byte pair.
    AutoIncrement,
    /// Command bit plus special-function type; the address is a function code.
    SpecialFunction,
}

impl AddressMode {
    fn type_bits(self) -> u8 {
        match self {
            AddressMode::RepeatedByte => 0x00,
            AddressMode::AutoIncrement => 0x20,
            AddressMode::SpecialFunction => 0x60,
        }
    }

    /// Command byte addressing `reg` in this mode.
    pub fn command(self, reg: u8) -> u8 {
        COMMAND_BIT | self.type_bits() | reg
    }
}

/// Analog gain of the RGBC channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Gain {
    X1 = 0x00,
    X4 = 0x01,
    X16 = 0x02,
    X60 = 0x03,
}

impl Gain {
    pub fn multiplier(self) -> f64 {
        match self {
            Gain::X1 => 1.0,
            Gain::X4 => 4.0,
            Gain::X16 => 16.0,
            Gain::X60 => 60.0,
        }
    }
}

/// ATIME register setting. Each cycle is 2.4 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IntegrationTime {
    /// 1 cycle, max count 1024
    Ms2_4 = 0xFF,
    /// 10 cycles, max count 10240
    Ms24 = 0xF6,
    /// 20 cycles, max count 20480
    Ms50 = 0xEB,
    /// 42 cycles, max count 43008
    Ms101 = 0xD5,
    /// 64 cycles, max count 65535
    Ms154 = 0xC0,
    /// 256 cycles, max count 65535
    Ms700 = 0x00,
}

impl IntegrationTime {
    pub fn cycles(self) -> u16 {
        256 - self as u16
    }

    /// Integration time as used by the lux equation.
    pub fn atime_ms(self) -> f64 {
        self.cycles() as f64 * 2.4
    }

    /// How long to wait after a read before the next one is valid.
    pub fn settle_ms(self) -> u32 {
        match self {
            IntegrationTime::Ms2_4 => 10,
            IntegrationTime::Ms24 => 40,
            IntegrationTime::Ms50 => 50,
            IntegrationTime::Ms101 => 100,
            IntegrationTime::Ms154 => 200,
            IntegrationTime::Ms700 => 700,
        }
    }
}

/// Gain and integration time as last written to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
}

impl Default for Settings {
    /// Power-on values of the CONTROL and ATIME registers.
    fn default() -> Self {
        Self {
            gain: Gain::X1,
            integration_time: IntegrationTime::Ms700,
        }
    }
}

bitfield! {
    /// Contents of the ENABLE register.
    #[derive(Clone, Copy)]
    pub struct Enable(u8);
    impl Debug;
    pub bool, interrupt_enable, set_interrupt_enable: 4;
    pub bool, wait_enable, set_wait_enable: 3;
    pub bool, adc_enable, set_adc_enable: 1;
    pub bool, power_on, set_power_on: 0;
}

bitfield! {
    /// Contents of the STATUS register.
    pub struct Status(u8);
    impl Debug;
    pub bool, interrupt, _: 4;
    pub bool, valid, _: 0;
}

/// Raw clear/red/green/blue channel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorReading {
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl ColorReading {
    /// Red, green and blue brought into roughly 0..=255.
    ///
    /// Channels are divided by `max / 255 + 1`, the dark offset is taken off
    /// and the result stretched by 255/225. Nothing is clamped: a channel that
    /// ends up below the offset stays negative.
    pub fn normalized(&self) -> [i32; 3] {
        let rgb = [self.red as i32, self.green as i32, self.blue as i32];
        let max = rgb.iter().copied().max().unwrap_or(0);
        let divisor = max / 255 + 1;
        rgb.map(|channel| {
            let channel = channel / divisor - RGB_OFFSET;
            (channel * RGB_SCALE_NUM).div_euclid(RGB_SCALE_DEN)
        })
    }

    /// `R << 16 | G << 8 | B` of the normalised channels.
    ///
    /// Packing is done in signed arithmetic, so a negative channel spreads its
    /// sign bits over the whole word.
    pub fn rgb888(&self) -> i32 {
        let [r, g, b] = self.normalized();
        (r << 16) | (g << 8) | b
    }

    /// 5-6-5 packing of the normalised channels.
    pub fn rgb565(&self) -> u16 {
        let [r, g, b] = self.normalized();
        ((((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)) & 0xFFFF) as u16
    }

    /// Infrared estimate from the clear channel surplus.
    pub fn ir(&self) -> f64 {
        let sum = self.red as i32 + self.green as i32 + self.blue as i32;
        let clear = self.clear as i32;
        if sum > clear {
            (sum - clear) as f64 / 2.0
        } else {
            0.0
        }
    }

    /// Illuminance in lux for readings taken with `settings`.
    pub fn lux(&self, settings: &Settings) -> f64 {
        let ir = self.ir();
        let r_comp = self.red as f64 - ir;
        let g_comp = self.green as f64 - ir;
        let b_comp = self.blue as f64 - ir;

        let cpl = settings.integration_time.atime_ms() * settings.gain.multiplier() / (GA * DF);
        (R_COEF * r_comp + G_COEF * g_comp + B_COEF * b_comp) / cpl
    }

    /// Correlated colour temperature in kelvin.
    ///
    /// `None` when the IR-compensated red channel is zero.
    pub fn color_temperature(&self) -> Option<f64> {
        let sum = self.red as i32 + self.green as i32 + self.blue as i32;
        let clear = self.clear as i32;
        let ir = if sum > clear {
            (sum - clear - 1) as f64 / 2.0
        } else {
            0.0
        };
        let r_comp = self.red as f64 - ir;
        let b_comp = self.blue as f64 - ir;

        if r_comp == 0.0 {
            return None;
        }
        Some(CT_COEF * b_comp / r_comp + CT_OFFSET)
    }
}

pub struct Tcs34725<T, D>
where
    T: WriteRead + Read + Write,
{
    transport: Transport<T>,
    delay: D,
    settings: Settings,
    channel_order: ByteOrder,
}

impl<T, D> Tcs34725<T, D>
where
    T: WriteRead + Read + Write,
    D: DelayMs<u32>,
{
    /// Creates a new sensor driver at [`ADDRESS`].
    pub fn new(i2c: T, delay: D) -> Self {
        Self {
            transport: Transport::new(i2c, ADDRESS),
            delay,
            settings: Settings::default(),
            channel_order: ByteOrder::BigEndian,
        }
    }

    /// Gain and integration time currently programmed.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// How channel words are assembled from the two data bytes.
    ///
    /// Defaults to big-endian, the order the board firmware has always
    /// decoded with. Select [`ByteOrder::LittleEndian`] for the order the
    /// device actually stores them in.
    pub fn set_channel_order(&mut self, order: ByteOrder) {
        self.channel_order = order;
    }

    pub fn channel_order(&self) -> ByteOrder {
        self.channel_order
    }
}

impl<I2C, D, E> I2CSensor<I2C, E> for Tcs34725<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    E: Debug,
{
    const ADDRESS: u8 = ADDRESS;

    fn init(&mut self) -> Result<(), Error<E>> {
        let chip_id = self.chip_id()?;
        if !CHIP_IDS.contains(&chip_id) {
            error!("Tcs34725 got wrong chip id: 0x{:02X}", chip_id);
            return Err(Error::IdentityMismatch {
                device: "Tcs34725",
                found: chip_id as u16,
            });
        }
        self.set_integration_time(IntegrationTime::Ms154)?;
        self.set_gain(Gain::X60)?;
        self.enable()?;
        self.interrupt_enable()?;
        info!("Tcs34725: initialized");
        Ok(())
    }

    fn release(self) -> I2C {
        self.transport.release()
    }
}

impl<I2C, D, E> Tcs34725<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
    E: Debug,
{
    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        self.transport
            .read_byte(Some(AddressMode::RepeatedByte.command(reg)))
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.transport
            .write_byte(Some(AddressMode::RepeatedByte.command(reg)), value)
    }

    fn read_channel(&mut self, reg: u8) -> Result<u16, Error<E>> {
        self.transport.read_word(
            Some(AddressMode::AutoIncrement.command(reg)),
            self.channel_order,
        )
    }

    pub fn chip_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(TCS_ID)
    }

    pub fn status(&mut self) -> Result<Status, Error<E>> {
        self.read_register(TCS_STATUS).map(Status)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<E>> {
        self.write_register(TCS_CONTROL, gain as u8)?;
        self.settings.gain = gain;
        Ok(())
    }

    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), Error<E>> {
        self.write_register(TCS_ATIME, time as u8)?;
        self.settings.integration_time = time;
        Ok(())
    }

    /// Powers the oscillator, then the ADC.
    ///
    /// The two stages need 10 ms each; skipping the first wait makes the
    /// first integration cycle return garbage.
    pub fn enable(&mut self) -> Result<(), Error<E>> {
        let mut enable = Enable(0);
        enable.set_power_on(true);
        self.write_register(TCS_ENABLE, enable.0)?;
        self.delay.delay_ms(10);
        enable.set_adc_enable(true);
        self.write_register(TCS_ENABLE, enable.0)?;
        self.delay.delay_ms(10);
        Ok(())
    }

    /// Turns the device off to save power.
    pub fn disable(&mut self) -> Result<(), Error<E>> {
        let mut enable = Enable(self.read_register(TCS_ENABLE)?);
        enable.set_power_on(false);
        enable.set_adc_enable(false);
        self.write_register(TCS_ENABLE, enable.0)
    }

    pub fn interrupt_enable(&mut self) -> Result<(), Error<E>> {
        let mut enable = Enable(self.read_register(TCS_ENABLE)?);
        enable.set_interrupt_enable(true);
        self.write_register(TCS_ENABLE, enable.0)
    }

    pub fn interrupt_disable(&mut self) -> Result<(), Error<E>> {
        let mut enable = Enable(self.read_register(TCS_ENABLE)?);
        enable.set_interrupt_enable(false);
        self.write_register(TCS_ENABLE, enable.0)
    }

    /// Programs the persistence filter. Anything past the register's 4 bits
    /// selects [`PERS_60_CYCLE`].
    pub fn set_persistence(&mut self, persistence: u8) -> Result<(), Error<E>> {
        let persistence = if persistence < 0x10 {
            persistence
        } else {
            PERS_60_CYCLE
        };
        self.write_register(TCS_PERS, persistence)
    }

    /// Sets the clear channel window outside which the interrupt fires.
    pub fn set_interrupt_threshold(&mut self, high: u16, low: u16) -> Result<(), Error<E>> {
        let [low_l, low_h] = low.to_le_bytes();
        let [high_l, high_h] = high.to_le_bytes();
        self.write_register(TCS_AILTL, low_l)?;
        self.write_register(TCS_AILTH, low_h)?;
        self.write_register(TCS_AIHTL, high_l)?;
        self.write_register(TCS_AIHTH, high_h)
    }

    pub fn clear_interrupt_flag(&mut self) -> Result<(), Error<E>> {
        self.transport.write_byte(
            Some(AddressMode::SpecialFunction.command(TCS_SF_CLEAR_INT)),
            0x00,
        )
    }

    /// Arms the thresholds and samples the (active-low) interrupt line.
    ///
    /// When the line is asserted the interrupt is cleared, persistence is set
    /// to two cycles and `true` is returned.
    pub fn lux_interrupt<P: InputPin>(
        &mut self,
        line: &P,
        high: u16,
        low: u16,
    ) -> Result<bool, Error<E>> {
        self.set_interrupt_threshold(high, low)?;
        if line.is_low().map_err(|_| Error::InterruptLine)? {
            self.clear_interrupt_flag()?;
            self.set_persistence(PERS_2_CYCLE)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Reads all four channels, then waits out the current integration time.
    pub fn read_channels(&mut self) -> Result<ColorReading, Error<E>> {
        let reading = ColorReading {
            clear: self.read_channel(TCS_CDATAL)?,
            red: self.read_channel(TCS_RDATAL)?,
            green: self.read_channel(TCS_GDATAL)?,
            blue: self.read_channel(TCS_BDATAL)?,
        };
        debug!("Tcs34725: {:?}", reading);
        self.delay
            .delay_ms(self.settings.integration_time.settle_ms());
        Ok(reading)
    }

    /// Reads the channels and packs them as RGB888.
    pub fn rgb_value(&mut self) -> Result<i32, Error<E>> {
        self.read_channels().map(|reading| reading.rgb888())
    }

    /// Lux for a reading taken with the current settings.
    pub fn lux(&self, reading: &ColorReading) -> f64 {
        reading.lux(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction};
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::MockError;
    use std::io::ErrorKind;

    #[derive(Default)]
    struct Delays(Vec<u32>);

    impl DelayMs<u32> for &mut Delays {
        fn delay_ms(&mut self, ms: u32) {
            self.0.push(ms);
        }
    }

    fn read(cmd: u8, value: u8) -> Transaction {
        Transaction::write_read(ADDRESS, vec![cmd], vec![value])
    }

    fn write(cmd: u8, value: u8) -> Transaction {
        Transaction::write(ADDRESS, vec![cmd, value])
    }

    fn channel(cmd: u8, value: u16) -> Transaction {
        Transaction::write_read(ADDRESS, vec![cmd], value.to_be_bytes().to_vec())
    }

    fn rgb(red: u16, green: u16, blue: u16, clear: u16) -> ColorReading {
        ColorReading {
            clear,
            red,
            green,
            blue,
        }
    }

    #[test]
    fn command_bytes() {
        assert_eq!(AddressMode::RepeatedByte.command(TCS_ID), 0x92);
        assert_eq!(AddressMode::AutoIncrement.command(TCS_CDATAL), 0xB4);
        assert_eq!(AddressMode::SpecialFunction.command(TCS_SF_CLEAR_INT), 0xE6);
    }

    #[test]
    fn integration_time_table() {
        assert_eq!(IntegrationTime::Ms2_4.cycles(), 1);
        assert_eq!(IntegrationTime::Ms154.cycles(), 64);
        assert_eq!(IntegrationTime::Ms700.cycles(), 256);
        assert!((IntegrationTime::Ms154.atime_ms() - 153.6).abs() < 1e-9);
        assert_eq!(IntegrationTime::Ms24.settle_ms(), 40);
        assert_eq!(IntegrationTime::Ms700.settle_ms(), 700);
    }

    #[test]
    fn rgb888_keeps_negative_channel() {
        // divisor 2 -> (150, 75, 25) -> (120, 45, -5) -> (136, 51, -6)
        let reading = rgb(300, 150, 50, 0);
        assert_eq!(reading.normalized(), [136, 51, -6]);
        assert_eq!(reading.rgb888(), (136 << 16) | (51 << 8) | -6);
        assert_eq!(reading.rgb888(), -6);
        assert_eq!(reading.rgb565(), 0xFFFF);
    }

    #[test]
    fn rgb888_packing() {
        // divisor 4 -> (250, 200, 150) -> (220, 170, 120) -> (249, 192, 136)
        let reading = rgb(1000, 800, 600, 0);
        assert_eq!(reading.normalized(), [249, 192, 136]);
        assert_eq!(reading.rgb888(), 0xF9C088);
        assert_eq!(reading.rgb565(), 0xFE11);
    }

    #[test]
    fn small_counts_use_divisor_one() {
        let reading = rgb(254, 30, 31, 0);
        // (224, 0, 1) -> (253, 0, 1)
        assert_eq!(reading.normalized(), [253, 0, 1]);
    }

    #[test]
    fn lux_uses_settings() {
        let reading = rgb(100, 100, 100, 400);
        assert_eq!(reading.ir(), 0.0);

        let settings = Settings {
            gain: Gain::X60,
            integration_time: IntegrationTime::Ms154,
        };
        assert!((reading.lux(&settings) - 2.327690972).abs() < 1e-6);

        let settings = Settings {
            gain: Gain::X1,
            integration_time: IntegrationTime::Ms2_4,
        };
        assert!((reading.lux(&settings) - 8938.333333).abs() < 1e-3);
    }

    #[test]
    fn lux_subtracts_ir() {
        let reading = rgb(150, 100, 50, 200);
        assert_eq!(reading.ir(), 50.0);
        let settings = Settings {
            gain: Gain::X60,
            integration_time: IntegrationTime::Ms154,
        };
        assert!((reading.lux(&settings) - 2.139322917).abs() < 1e-6);
    }

    #[test]
    fn color_temperature() {
        assert_eq!(rgb(200, 100, 100, 400).color_temperature(), Some(3296.0));
        let cct = rgb(150, 100, 50, 200).color_temperature().unwrap();
        assert!((cct - 1409.955223881).abs() < 1e-6);
        assert_eq!(rgb(0, 0, 0, 0).color_temperature(), None);
    }

    #[test]
    fn init_sequence() {
        let expectations = [
            read(0x92, 0x44),
            write(0x81, 0xC0),
            write(0x8F, 0x03),
            write(0x80, 0x01),
            write(0x80, 0x03),
            read(0x80, 0x03),
            write(0x80, 0x13),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.init().unwrap();
        assert_eq!(
            sensor.settings(),
            Settings {
                gain: Gain::X60,
                integration_time: IntegrationTime::Ms154,
            }
        );
        drop(sensor);
        assert_eq!(delays.0, vec![10, 10]);
        i2c.done();
    }

    #[test]
    fn init_accepts_alternate_id() {
        let expectations = [
            read(0x92, 0x4D),
            write(0x81, 0xC0),
            write(0x8F, 0x03),
            write(0x80, 0x01),
            write(0x80, 0x03),
            read(0x80, 0x03),
            write(0x80, 0x13),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.init().unwrap();
        i2c.done();
    }

    #[test]
    fn init_rejects_unknown_id() {
        let expectations = [read(0x92, 0x12)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert!(matches!(
            sensor.init(),
            Err(Error::IdentityMismatch { found: 0x12, .. })
        ));
        assert_eq!(sensor.settings(), Settings::default());
        i2c.done();
    }

    #[test]
    fn failed_write_keeps_previous_setting() {
        let expectations = [write(0x8F, 0x02).with_error(MockError::Io(ErrorKind::Other))];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert!(sensor.set_gain(Gain::X16).is_err());
        assert_eq!(sensor.settings().gain, Gain::X1);
        i2c.done();
    }

    #[test]
    fn reads_channels_then_settles() {
        let expectations = [
            write(0x81, 0xEB),
            channel(0xB4, 0x0400),
            channel(0xB6, 300),
            channel(0xB8, 150),
            channel(0xBA, 50),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.set_integration_time(IntegrationTime::Ms50).unwrap();
        let reading = sensor.read_channels().unwrap();
        assert_eq!(reading, rgb(300, 150, 50, 0x0400));
        drop(sensor);
        assert_eq!(delays.0, vec![50]);
        i2c.done();
    }

    #[test]
    fn channel_words_are_big_endian_by_default() {
        let expectations = [
            Transaction::write_read(ADDRESS, vec![0xB4], vec![0x01, 0x02]),
            Transaction::write_read(ADDRESS, vec![0xB6], vec![0x01, 0x2C]),
            Transaction::write_read(ADDRESS, vec![0xB8], vec![0x00, 0x96]),
            Transaction::write_read(ADDRESS, vec![0xBA], vec![0x00, 0x32]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert_eq!(sensor.channel_order(), ByteOrder::BigEndian);
        assert_eq!(sensor.read_channels().unwrap(), rgb(300, 150, 50, 0x0102));
        i2c.done();
    }

    #[test]
    fn little_endian_channels_on_request() {
        let expectations = [
            Transaction::write_read(ADDRESS, vec![0xB4], vec![0x02, 0x01]),
            Transaction::write_read(ADDRESS, vec![0xB6], vec![0x2C, 0x01]),
            Transaction::write_read(ADDRESS, vec![0xB8], vec![0x96, 0x00]),
            Transaction::write_read(ADDRESS, vec![0xBA], vec![0x32, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.set_channel_order(ByteOrder::LittleEndian);
        assert_eq!(sensor.read_channels().unwrap(), rgb(300, 150, 50, 0x0102));
        i2c.done();
    }

    #[test]
    fn rgb_value_packs_read() {
        let expectations = [
            channel(0xB4, 0),
            channel(0xB6, 1000),
            channel(0xB8, 800),
            channel(0xBA, 600),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert_eq!(sensor.rgb_value().unwrap(), 0xF9C088);
        drop(sensor);
        // power-on default is the 700 ms integration time
        assert_eq!(delays.0, vec![700]);
        i2c.done();
    }

    #[test]
    fn disable_clears_power_bits_only() {
        let expectations = [read(0x80, 0x1B), write(0x80, 0x18)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.disable().unwrap();
        i2c.done();
    }

    #[test]
    fn persistence_is_clamped() {
        let expectations = [write(0x8C, 0x05), write(0x8C, 0x0F)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        sensor.set_persistence(0x05).unwrap();
        sensor.set_persistence(0x20).unwrap();
        i2c.done();
    }

    fn thresholds() -> Vec<Transaction> {
        vec![
            write(0x84, 0xFF),
            write(0x85, 0x00),
            write(0x86, 0x00),
            write(0x87, 0xFF),
        ]
    }

    #[test]
    fn lux_interrupt_asserted() {
        let mut expectations = thresholds();
        expectations.extend([write(0xE6, 0x00), write(0x8C, 0x02)]);
        let mut i2c = I2cMock::new(&expectations);
        let mut line = PinMock::new(&[PinTransaction::get(State::Low)]);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert!(sensor.lux_interrupt(&line, 0xFF00, 0x00FF).unwrap());
        i2c.done();
        line.done();
    }

    #[test]
    fn lux_interrupt_idle() {
        let expectations = thresholds();
        let mut i2c = I2cMock::new(&expectations);
        let mut line = PinMock::new(&[PinTransaction::get(State::High)]);
        let mut delays = Delays::default();
        let mut sensor = Tcs34725::new(i2c.clone(), &mut delays);

        assert!(!sensor.lux_interrupt(&line, 0xFF00, 0x00FF).unwrap());
        i2c.done();
        line.done();
    }

    #[test]
    fn status_bits() {
        let status = Status(0x11);
        assert!(status.valid());
        assert!(status.interrupt());
    }
}
