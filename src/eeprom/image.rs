//! In-memory EEPROM image and the word byte order used on the wire.

use crate::constants::ASIX_MAX_EEPROM_SIZE;
use crate::error::{Error, Result};

/// Decode the two bytes returned by READ_EEPROM.
///
/// The device sends the word most significant byte first.
#[inline]
pub fn word_from_wire(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Encode a word as the `wIndex` of a WRITE_EEPROM request.
///
/// `wIndex` goes out little-endian, so the returned value is chosen such
/// that its two wire bytes are the word's big-endian bytes. This mirrors
/// [`word_from_wire`].
#[inline]
pub fn word_to_index(word: u16) -> u16 {
    u16::from_le_bytes(word.to_be_bytes())
}

/// Check an EEPROM size and return its length in words.
pub fn words_for_size(size: usize) -> Result<usize> {
    if size == 0 || size % 2 != 0 || size > ASIX_MAX_EEPROM_SIZE {
        return Err(Error::InvalidSize(size));
    }
    Ok(size / 2)
}

/// The contents of an EEPROM as 16-bit words.
///
/// In a file the image is a raw blob with each word stored low byte first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EepromImage {
    words: Vec<u16>,
}

impl EepromImage {
    /// Wrap a word vector.
    pub fn from_words(words: Vec<u16>) -> Self {
        Self { words }
    }

    /// Parse a raw image file. The length must be non-zero and even.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(Error::InvalidSize(bytes.len()));
        }
        let words = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { words })
    }

    /// Serialize in the raw file layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    /// The image words.
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// Size of the image in bytes.
    pub fn len_bytes(&self) -> usize {
        self.words.len() * 2
    }

    /// Consume the image and return its words.
    pub fn into_words(self) -> Vec<u16> {
        self.words
    }
}
