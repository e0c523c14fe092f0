//! Byte link, controller bus and raster sink traits

use alloc::boxed::Box;
use alloc::vec::Vec;

/// Errors that can occur while driving a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The underlying port, tty or USB transfer failed
    Communication,
    /// A busy line never reached its ready level
    Timeout,
    /// Argument outside the range the chip accepts
    InvalidArgument,
    /// The adapter answered something other than `OK`
    NotAcknowledged,
    /// Operation not available on this firmware or bus
    Unsupported,
    /// Data larger than an internal buffer
    BufferOverflow,
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            DriverError::Communication => "communication with the panel failed",
            DriverError::Timeout => "timed out waiting for the panel",
            DriverError::InvalidArgument => "argument out of range",
            DriverError::NotAcknowledged => "command not acknowledged",
            DriverError::Unsupported => "operation not supported",
            DriverError::BufferOverflow => "buffer overflow",
        };
        f.write_str(msg)
    }
}

/// Byte stream into a panel that interprets its own commands
pub trait ByteLink {
    /// Send all of `data`
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError>;

    /// Push out anything buffered
    fn flush(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Give the panel time to process (init, mode switches)
    fn delay_ms(&mut self, ms: u32);
}

/// Register-select style parallel bus
///
/// Commands and data differ only in the level of a register select line
/// (A0, C/D, RS). `select_chip` takes a bit mask for modules built from
/// several controller chips.
pub trait ControllerBus {
    /// Latch one command byte
    fn write_command(&mut self, command: u8) -> Result<(), DriverError>;

    /// Latch data bytes into display memory
    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError>;

    /// Route following transfers to the chips in `mask` (bit 0 = chip 1)
    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError>;

    /// Deassert held chip enables at the end of a transfer
    fn release(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32);
}

/// Destination for complete raster frames
pub trait RasterSink {
    /// Accept one frame of pin states, replacing any previous frame
    fn submit(&mut self, frame: Vec<u8>) -> Result<(), DriverError>;
}

impl<T: ByteLink + ?Sized> ByteLink for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        T::write(self, data)
    }

    fn flush(&mut self) -> Result<(), DriverError> {
        T::flush(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

impl<T: ByteLink + ?Sized> ByteLink for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        T::write(self, data)
    }

    fn flush(&mut self) -> Result<(), DriverError> {
        T::flush(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

impl<T: ControllerBus + ?Sized> ControllerBus for &mut T {
    fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
        T::write_command(self, command)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        T::write_data(self, data)
    }

    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
        T::select_chip(self, mask)
    }

    fn release(&mut self) -> Result<(), DriverError> {
        T::release(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

impl<T: ControllerBus + ?Sized> ControllerBus for Box<T> {
    fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
        T::write_command(self, command)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        T::write_data(self, data)
    }

    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
        T::select_chip(self, mask)
    }

    fn release(&mut self) -> Result<(), DriverError> {
        T::release(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

impl<T: RasterSink + ?Sized> RasterSink for &mut T {
    fn submit(&mut self, frame: Vec<u8>) -> Result<(), DriverError> {
        T::submit(self, frame)
    }
}

impl<T: RasterSink + ?Sized> RasterSink for Box<T> {
    fn submit(&mut self, frame: Vec<u8>) -> Result<(), DriverError> {
        T::submit(self, frame)
    }
}
