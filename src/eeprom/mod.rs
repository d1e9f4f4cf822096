//! ASIX EEPROM support: whole-image read and write.
//!
//! The adapter exposes its EEPROM one 16-bit word per vendor control
//! transfer. This module provides:
//!
//! - [`EepromImage`] - The image as a word array, with its file layout.
//! - [`read_eeprom`] / [`write_eeprom`] - The transfer sequences, generic
//!   over any [`ControlTransport`](crate::ControlTransport).
//! - I/O shortcuts on [`AsixDevice`](crate::AsixDevice).

mod image;
mod io;

pub use image::{word_from_wire, word_to_index, words_for_size, EepromImage};
pub use io::{read_eeprom, write_eeprom, WriteTiming};
