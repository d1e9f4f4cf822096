//! The control-transfer seam between the EEPROM protocol and the USB device.
//!
//! [`AsixDevice`](crate::AsixDevice) implements [`ControlTransport`] on top of
//! nusb. The EEPROM routines in [`eeprom`](crate::eeprom) only need this
//! trait, so they can run against a simulated device as well.

use std::time::Duration;

use crate::error::Result;

/// Vendor-type, device-recipient control transfers.
pub trait ControlTransport {
    /// Send an IN request and return the bytes received (at most `length`).
    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>>;

    /// Send an OUT request with an empty data stage.
    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()>;

    /// Block for a hardware settling period.
    fn settle(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for &T {
    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        (**self).control_in(request, value, index, length)
    }

    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        (**self).control_out(request, value, index)
    }

    fn settle(&self, duration: Duration) {
        (**self).settle(duration)
    }
}
