//! A simulated ASIX adapter that records every control transfer.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::time::Duration;

use asix_eeprom::constants::*;
use asix_eeprom::{ControlTransport, Error, Result};
use nusb::transfer::TransferError;

/// One control transfer seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    In { request: u8, value: u16, index: u16, length: u16 },
    Out { request: u8, value: u16, index: u16 },
}

impl Call {
    pub fn request(&self) -> u8 {
        match *self {
            Call::In { request, .. } | Call::Out { request, .. } => request,
        }
    }
}

/// EEPROM cells hold the raw bytes that arrived in `wIndex`, and READ_EEPROM
/// returns them in the same order, as the chip does.
pub struct MockAdapter {
    cells: RefCell<Vec<[u8; 2]>>,
    write_enabled: Cell<bool>,
    pub calls: RefCell<Vec<Call>>,
    pub waits: RefCell<Vec<Duration>>,
    /// Fail the n-th (0-based) transfer carrying this request code.
    fail: Option<(u8, usize)>,
    /// Also fail every WRITE_EEPROM_DIS.
    fail_disable: bool,
    short_reads: bool,
}

impl MockAdapter {
    pub fn new(words: usize) -> Self {
        Self {
            cells: RefCell::new(vec![[0xff, 0xff]; words]),
            write_enabled: Cell::new(false),
            calls: RefCell::new(Vec::new()),
            waits: RefCell::new(Vec::new()),
            fail: None,
            fail_disable: false,
            short_reads: false,
        }
    }

    /// Preload cells so that reading word `i` yields `words[i]`.
    pub fn with_words(words: &[u16]) -> Self {
        let mock = Self::new(words.len());
        *mock.cells.borrow_mut() = words.iter().map(|w| w.to_be_bytes()).collect();
        mock
    }

    pub fn failing(mut self, request: u8, nth: usize) -> Self {
        self.fail = Some((request, nth));
        self
    }

    pub fn failing_disable(mut self) -> Self {
        self.fail_disable = true;
        self
    }

    pub fn short_reads(mut self) -> Self {
        self.short_reads = true;
        self
    }

    pub fn write_enabled(&self) -> bool {
        self.write_enabled.get()
    }

    pub fn count(&self, request: u8) -> usize {
        self.calls.borrow().iter().filter(|c| c.request() == request).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        let request = call.request();
        let seen = self.count(request);
        self.calls.borrow_mut().push(call);
        if self.fail == Some((request, seen))
            || (self.fail_disable && request == ASIX_CMD_WRITE_EEPROM_DIS)
        {
            return Err(Error::Transfer(TransferError::Stall));
        }
        Ok(())
    }
}

impl ControlTransport for MockAdapter {
    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        self.record(Call::In { request, value, index, length })?;
        match request {
            ASIX_CMD_READ_EEPROM => {
                let cell = self
                    .cells
                    .borrow()
                    .get(value as usize)
                    .copied()
                    .ok_or(Error::Transfer(TransferError::Stall))?;
                let len = if self.short_reads { 1 } else { length as usize };
                Ok(cell[..len.min(2)].to_vec())
            }
            _ => Err(Error::Transfer(TransferError::Stall)),
        }
    }

    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        self.record(Call::Out { request, value, index })?;
        match request {
            ASIX_CMD_WRITE_EEPROM_EN => self.write_enabled.set(true),
            ASIX_CMD_WRITE_EEPROM_DIS => self.write_enabled.set(false),
            ASIX_CMD_WRITE_EEPROM if self.write_enabled.get() => {
                let mut cells = self.cells.borrow_mut();
                let cell = cells
                    .get_mut(value as usize)
                    .ok_or(Error::Transfer(TransferError::Stall))?;
                *cell = index.to_le_bytes();
            }
            _ => return Err(Error::Transfer(TransferError::Stall)),
        }
        Ok(())
    }

    fn settle(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}
