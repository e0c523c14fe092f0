//! Character VFDs
//!
//! These modules only show their built in font. The compositor hands text
//! straight through; bitmap refreshes are accepted and dropped.

use alloc::vec::Vec;

use panelport_core::{Bitmap, ByteLink, ControllerBus, DriverError, Rect};
use panelport_drivers::controller::{S20a, T20a};

use crate::panel::{AfterClear, Panel};

/// Printable ASCII, anything else shown as `?`
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .collect()
}

pub struct T20aPanel<L> {
    vfd: T20a<L>,
    lines: u32,
}

impl<L: ByteLink> T20aPanel<L> {
    pub fn new(vfd: T20a<L>, lines: u32) -> Self {
        Self { vfd, lines }
    }

    pub fn vfd_mut(&mut self) -> &mut T20a<L> {
        &mut self.vfd
    }
}

impl<L: ByteLink> Panel for T20aPanel<L> {
    fn size(&self) -> (u32, u32) {
        (self.vfd.width(), self.lines)
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.vfd.clear()?;
        Ok(AfterClear::Dark)
    }

    fn flush(&mut self, _image: &Bitmap, _dirty: Rect) -> Result<(), DriverError> {
        Ok(())
    }

    fn character_cells(&self) -> Option<(u32, u32)> {
        Some(self.size())
    }

    fn write_text(&mut self, col: u32, row: u32, text: &str) -> Result<(), DriverError> {
        if row >= self.lines {
            return Err(DriverError::InvalidArgument);
        }
        self.vfd.move_cursor(col, row)?;
        self.vfd.write(&encode(text))
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }
}

pub struct S20aPanel<B> {
    vfd: S20a<B>,
    lines: u32,
}

impl<B: ControllerBus> S20aPanel<B> {
    pub fn new(vfd: S20a<B>, lines: u32) -> Self {
        Self { vfd, lines }
    }

    pub fn vfd_mut(&mut self) -> &mut S20a<B> {
        &mut self.vfd
    }
}

impl<B: ControllerBus> Panel for S20aPanel<B> {
    fn size(&self) -> (u32, u32) {
        (self.vfd.width(), self.lines)
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.vfd.clear()?;
        Ok(AfterClear::Dark)
    }

    fn flush(&mut self, _image: &Bitmap, _dirty: Rect) -> Result<(), DriverError> {
        Ok(())
    }

    fn character_cells(&self) -> Option<(u32, u32)> {
        Some(self.size())
    }

    fn write_text(&mut self, col: u32, row: u32, text: &str) -> Result<(), DriverError> {
        if row >= self.lines {
            return Err(DriverError::InvalidArgument);
        }
        self.vfd.move_cursor(col, row)?;
        self.vfd.write(&encode(text))
    }
}
