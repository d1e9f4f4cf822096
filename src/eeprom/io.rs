//! EEPROM USB I/O operations: reading and writing the physical EEPROM.

use std::time::Duration;

use super::image::{word_from_wire, word_to_index, words_for_size, EepromImage};
use crate::constants::*;
use crate::context::AsixDevice;
use crate::error::{Error, Result};
use crate::transfer::ControlTransport;

/// Waits inserted while writing the EEPROM.
///
/// The defaults are the settling times the EEPROM needs; writing faster may
/// leave cells half-programmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTiming {
    /// Wait after WRITE_EEPROM_EN.
    pub enable_settle: Duration,
    /// Wait after each WRITE_EEPROM.
    pub word_settle: Duration,
}

impl Default for WriteTiming {
    fn default() -> Self {
        Self {
            enable_settle: WRITE_ENABLE_SETTLE,
            word_settle: WRITE_WORD_SETTLE,
        }
    }
}

/// Read `size` bytes of EEPROM, one word per control transfer.
///
/// Stops at the first failed transfer. Nothing read before the failure is
/// returned.
pub fn read_eeprom<T: ControlTransport + ?Sized>(dev: &T, size: usize) -> Result<EepromImage> {
    let count = words_for_size(size)?;
    log::debug!("reading {count} EEPROM words");

    let mut words = Vec::with_capacity(count);
    for i in 0..count {
        let word = i as u16;
        let data = dev.control_in(ASIX_CMD_READ_EEPROM, word, 0, 2)?;
        if data.len() < 2 {
            return Err(Error::ShortRead { word, len: data.len() });
        }
        let value = word_from_wire([data[0], data[1]]);
        log::trace!("word {word:#06x} = {value:#06x}");
        words.push(value);
    }

    Ok(EepromImage::from_words(words))
}

/// Write the first `size` bytes of `image` to the EEPROM.
///
/// Writes are enabled, each word is written and given time to program, and
/// writes are disabled again. If a word fails, the disable request is still
/// sent and the failure is reported as [`Error::WriteAborted`]. If enabling
/// fails nothing else is sent.
pub fn write_eeprom<T: ControlTransport + ?Sized>(
    dev: &T,
    size: usize,
    image: &EepromImage,
    timing: WriteTiming,
) -> Result<()> {
    let count = words_for_size(size)?;
    if image.len_bytes() < size {
        return Err(Error::ImageTooShort {
            expected: size,
            actual: image.len_bytes(),
        });
    }

    log::debug!("enabling EEPROM writes");
    dev.control_out(ASIX_CMD_WRITE_EEPROM_EN, 0, 0)?;
    dev.settle(timing.enable_settle);

    for (i, &value) in image.words()[..count].iter().enumerate() {
        let word = i as u16;
        log::trace!("word {word:#06x} <- {value:#06x}");
        if let Err(source) = dev.control_out(ASIX_CMD_WRITE_EEPROM, word, word_to_index(value)) {
            let disable = dev.control_out(ASIX_CMD_WRITE_EEPROM_DIS, 0, 0).err();
            if let Some(ref e) = disable {
                log::warn!("failed to disable EEPROM writes after error: {e}");
            }
            return Err(Error::WriteAborted {
                word,
                source: Box::new(source),
                disable: disable.map(Box::new),
            });
        }
        dev.settle(timing.word_settle);
    }

    log::debug!("disabling EEPROM writes");
    dev.control_out(ASIX_CMD_WRITE_EEPROM_DIS, 0, 0)
}

impl AsixDevice {
    /// Read the whole EEPROM of `size` bytes.
    ///
    /// Performs `size / 2` control transfers of 2 bytes each.
    ///
    /// ```no_run
    /// use asix_eeprom::{AsixDevice, Selector};
    ///
    /// let dev = AsixDevice::open(&Selector::new(0x0b95, 0x772b))?;
    /// let image = dev.read_eeprom(256)?;
    /// println!("{:04x?}", image.words());
    /// # Ok::<(), asix_eeprom::Error>(())
    /// ```
    pub fn read_eeprom(&self, size: usize) -> Result<EepromImage> {
        read_eeprom(self, size)
    }

    /// Write `size` bytes of `image` to the EEPROM with the default timing.
    ///
    /// Takes about one second plus 50 ms per word.
    pub fn write_eeprom(&self, size: usize, image: &EepromImage) -> Result<()> {
        write_eeprom(self, size, image, WriteTiming::default())
    }
}
