//! Protocol constants for ASIX EEPROM access.
//!
//! These are the vendor request codes and timing values of the ASIX EEPROM
//! protocol. Most users should not need them directly.

use std::time::Duration;

// ---- ASIX Vendor ID and known Product IDs ----

/// ASIX Electronics vendor ID.
pub const ASIX_VID: u16 = 0x0b95;

/// Known ASIX product IDs.
pub mod pid {
    /// AX88772.
    pub const AX88772: u16 = 0x7720;
    /// AX88772A.
    pub const AX88772A: u16 = 0x772a;
    /// AX88772B.
    pub const AX88772B: u16 = 0x772b;
    /// AX88178.
    pub const AX88178: u16 = 0x1780;
}

// ---- Vendor request codes ----

/// Read one EEPROM word.
pub const ASIX_CMD_READ_EEPROM: u8 = 0x0b;
/// Write one EEPROM word.
pub const ASIX_CMD_WRITE_EEPROM: u8 = 0x0c;
/// Enable EEPROM writes.
pub const ASIX_CMD_WRITE_EEPROM_EN: u8 = 0x0d;
/// Disable EEPROM writes.
pub const ASIX_CMD_WRITE_EEPROM_DIS: u8 = 0x0e;

// ---- Interface / sizes ----

/// The interface claimed for EEPROM access.
pub const ASIX_INTERFACE: u8 = 0;

/// Largest EEPROM addressable by a 16-bit word index, in bytes.
pub const ASIX_MAX_EEPROM_SIZE: usize = 2 * (u16::MAX as usize + 1);

// ---- Timing ----

/// Default timeout for a single control transfer.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_millis(100);

/// Settling time after WRITE_EEPROM_EN before the first word is written.
pub const WRITE_ENABLE_SETTLE: Duration = Duration::from_secs(1);

/// Write-cycle time of one EEPROM word.
pub const WRITE_WORD_SETTLE: Duration = Duration::from_millis(50);
