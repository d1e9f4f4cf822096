//! Core ASIX device handle.
//!
//! [`AsixDevice`] represents an opened USB adapter with interface 0 claimed.
//! It is the only way to reach the EEPROM, and releases the interface when
//! dropped.

use std::fmt;
use std::time::Duration;

use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::{self, DeviceInfo, MaybeFuture};

use crate::constants::*;
use crate::device_info::{self, Selector, UsbLocation};
use crate::error::{Error, Result};
use crate::transfer::ControlTransport;

/// Where an opened device lives and what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Bus number, if the platform reports one.
    pub bus: Option<u8>,
    /// Device address on the bus.
    pub address: u8,
    /// USB vendor ID.
    pub vendor_id: u16,
    /// USB product ID.
    pub product_id: u16,
    /// Serial number string, if the OS reported one.
    pub serial_number: Option<String>,
}

impl DeviceIdentity {
    fn from_info(info: &DeviceInfo) -> Self {
        Self {
            bus: info.bus_number(),
            address: UsbLocation::device_address(info),
            vendor_id: UsbLocation::vendor_id(info),
            product_id: UsbLocation::product_id(info),
            serial_number: info.serial_number().map(str::to_owned),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bus {
            Some(bus) => write!(f, "bus {bus}, ")?,
            None => write!(f, "bus unknown, ")?,
        }
        write!(
            f,
            "device {}, vid:pid {:04x}:{:04x}",
            self.address, self.vendor_id, self.product_id
        )?;
        if let Some(serial) = &self.serial_number {
            write!(f, ", serial number {serial}")?;
        }
        Ok(())
    }
}

/// An opened ASIX USB adapter.
///
/// Owns the USB device and the claimed interface. Dropping the handle (or
/// calling [`close`](Self::close)) releases both, on every exit path.
///
/// ```no_run
/// use asix_eeprom::{AddressSelect, AsixDevice, Selector};
///
/// let selector = Selector::new(0x0b95, 0x772b)
///     .bus(AddressSelect::Exact(2))
///     .device_number(AddressSelect::Exact(10));
/// let dev = AsixDevice::open(&selector)?;
/// println!("Accessing {}", dev.identity());
/// # Ok::<(), asix_eeprom::Error>(())
/// ```
pub struct AsixDevice {
    #[allow(dead_code)] // Kept to ensure the USB device stays open
    device: nusb::Device,
    interface: nusb::Interface,
    identity: DeviceIdentity,
    timeout: Duration,
}

impl fmt::Debug for AsixDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsixDevice")
            .field("identity", &self.identity)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ---- Construction / Opening ----

impl AsixDevice {
    /// Locate the device described by `selector`, open it and claim
    /// interface 0.
    ///
    /// Without a bus or device number the first matching device in
    /// enumeration order is used; see [`Selector`].
    pub fn open(selector: &Selector) -> Result<Self> {
        let dev_info = device_info::find_device(selector)?;
        Self::from_device_info(dev_info)
    }

    /// Open a device by USB bus number and device address.
    pub fn open_bus_addr(vendor: u16, product: u16, bus: u8, addr: u8) -> Result<Self> {
        use crate::device_info::AddressSelect::Exact;

        Self::open(&Selector::new(vendor, product).bus(Exact(bus)).device_number(Exact(addr)))
    }

    /// Open a device from an already-discovered [`nusb::DeviceInfo`].
    pub fn from_device_info(dev_info: DeviceInfo) -> Result<Self> {
        let identity = DeviceIdentity::from_info(&dev_info);
        log::info!("Accessing {identity}");

        let device = dev_info.open().wait().map_err(Error::OpenFailed)?;

        detach_kernel_driver(&device);

        let interface = device
            .claim_interface(ASIX_INTERFACE)
            .wait()
            .map_err(Error::ClaimFailed)?;

        Ok(Self {
            device,
            interface,
            identity,
            timeout: DEFAULT_TRANSFER_TIMEOUT,
        })
    }

    /// Bus, address and IDs of the opened device.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// The per-transfer timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the per-transfer timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Release the interface and close the device.
    pub fn close(self) {
        log::debug!("releasing {}", self.identity);
    }
}

/// Detach a kernel driver from the EEPROM interface.
///
/// Not all platforms bind one, so a failure here is only logged; claiming
/// the interface will report the real problem if there is one.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn detach_kernel_driver(device: &nusb::Device) {
    match device.detach_kernel_driver(ASIX_INTERFACE) {
        Ok(()) => log::debug!("detached kernel driver from interface {ASIX_INTERFACE}"),
        Err(e) => log::debug!("no kernel driver detached from interface {ASIX_INTERFACE}: {e}"),
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn detach_kernel_driver(_device: &nusb::Device) {
    log::debug!("kernel driver detach not supported on this platform");
}

// ---- Internal USB helpers ----

impl ControlTransport for AsixDevice {
    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                self.timeout,
            )
            .wait()?;
        Ok(())
    }

    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()?;
        Ok(data)
    }
}
