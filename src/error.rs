//! Error types for the asix-eeprom crate.

use std::error::Error as StdError;

use nusb::transfer::TransferError;

/// The error type for ASIX EEPROM operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The USB device list could not be obtained.
    #[error("failed to enumerate USB devices")]
    UsbInit(#[source] nusb::Error),

    /// No device matched the vendor/product ID and address.
    #[error("device not found")]
    DeviceNotFound,

    /// `--bus -1` was given but no matching device is attached to any bus.
    #[error("no bus with a {vendor_id:04x}:{product_id:04x} device")]
    NoMatchingBus {
        /// Vendor ID searched for.
        vendor_id: u16,
        /// Product ID searched for.
        product_id: u16,
    },

    /// `--device-number -1` was given but the bus has no matching device.
    #[error("failed to get a valid address on bus {bus}")]
    NoMatchingDevice {
        /// The resolved bus number.
        bus: u8,
    },

    /// The device could not be opened.
    #[error("unable to open USB device; is it connected and do you have permission?")]
    OpenFailed(#[source] nusb::Error),

    /// Interface 0 could not be claimed.
    #[error("unable to claim USB interface; make sure no other program is using it")]
    ClaimFailed(#[source] nusb::Error),

    /// A USB control transfer failed.
    #[error("USB transfer failed")]
    Transfer(#[from] TransferError),

    /// A READ_EEPROM transfer returned fewer than two bytes.
    #[error("EEPROM read of word {word} returned {len} bytes")]
    ShortRead {
        /// Word index that was being read.
        word: u16,
        /// Number of bytes actually received.
        len: usize,
    },

    /// The EEPROM size is zero, odd, or too large.
    #[error("invalid EEPROM size {0}: must be a positive multiple of 2")]
    InvalidSize(usize),

    /// The image to write holds fewer bytes than the EEPROM size.
    #[error("EEPROM image is {actual} bytes, expected at least {expected}")]
    ImageTooShort {
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Invalid argument(s) were provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A word write failed after writes were enabled.
    ///
    /// The disable request is still sent; if that failed too, its error is
    /// kept in `disable`.
    #[error("EEPROM write aborted at word {word}{}", disable_note(.disable))]
    WriteAborted {
        /// Word index whose write failed.
        word: u16,
        /// The error from the failed word write.
        #[source]
        source: Box<Error>,
        /// The error from the follow-up WRITE_EEPROM_DIS, if it failed.
        disable: Option<Box<Error>>,
    },
}

/// The disable error is not part of the source chain, so its causes are
/// spelled out here.
fn disable_note(disable: &Option<Box<Error>>) -> String {
    let Some(e) = disable else {
        return String::new();
    };
    let mut note = format!(" (disabling writes also failed: {e}");
    let mut cause = StdError::source(e.as_ref());
    while let Some(c) = cause {
        note.push_str(&format!(": {c}"));
        cause = StdError::source(c);
    }
    note.push(')');
    note
}

/// A specialized `Result` type for ASIX EEPROM operations.
pub type Result<T> = std::result::Result<T, Error>;
