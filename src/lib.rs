//! Read and write the EEPROM of ASIX USB Ethernet adapters.
//!
//! ASIX AX88172/AX88772/AX88178 adapters keep their configuration (MAC
//! address, USB IDs, PHY setup) in a small serial EEPROM that the chip
//! exposes through vendor control transfers, one 16-bit word at a time.
//! This crate finds an adapter, claims it, and moves the whole EEPROM to or
//! from an [`EepromImage`]. It uses [nusb](https://crates.io/crates/nusb)
//! as the USB backend.
//!
//! # Quick Start
//!
//! ```no_run
//! use asix_eeprom::{constants::{pid, ASIX_VID}, AsixDevice, Selector};
//!
//! let dev = AsixDevice::open(&Selector::new(ASIX_VID, pid::AX88772B))?;
//! let image = dev.read_eeprom(256)?;
//! dev.write_eeprom(256, &image)?;
//! # Ok::<(), asix_eeprom::Error>(())
//! ```
//!
//! # Selecting a device
//!
//! With several adapters attached, give a bus number and device address,
//! or use [`AddressSelect::Last`] for the highest bus and the highest
//! address on it. Without either, the first adapter the OS enumerates is
//! used, and that order is not stable.

pub mod constants;
pub mod context;
pub mod device_info;
pub mod eeprom;
pub mod error;
pub mod transfer;

// ---- Convenience re-exports ----

pub use constants::ASIX_VID;
pub use context::{AsixDevice, DeviceIdentity};
pub use device_info::{find_device, find_devices, resolve_location, AddressSelect, Selector, UsbLocation};
pub use eeprom::{EepromImage, WriteTiming};
pub use error::{Error, Result};
pub use transfer::ControlTransport;
