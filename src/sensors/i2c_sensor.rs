use embedded_hal::blocking::i2c::*;

use crate::error::Error;

pub trait I2CSensor<T, E>
where
    T: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
{
    /// Fixed 7-bit slave address of the device.
    const ADDRESS: u8;

    /// Checks the device identity, then resets it into its default
    /// configuration. The driver is only usable once this has succeeded.
    fn init(&mut self) -> Result<(), Error<E>>;

    /// Releases the underlying I2C bus and destroys the driver.
    fn release(self) -> T;
}
