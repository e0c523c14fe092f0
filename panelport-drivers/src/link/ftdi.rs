//! Byte link through an FT232R in bit-bang mode
//!
//! The VFDs latch each byte off the data pins; the baud divisor paces the
//! writes slowly enough for the panel to keep up without a BUSY line.

use embedded_hal::delay::DelayNs;
use panelport_core::{ByteLink, DriverError};
use panelport_hal::UsbBulkDevice;
use panelport_protocol::ftdi::CHUNK_SIZE;

use crate::ftdi::Ft232r;

pub struct FtdiLink<U, D> {
    ftdi: Ft232r<U>,
    delay: D,
}

impl<U: UsbBulkDevice, D: DelayNs> FtdiLink<U, D> {
    /// Put the device in bit-bang mode, all pins outputs, at `baud_divisor`
    pub fn new(device: U, delay: D, baud_divisor: u16) -> Result<Self, DriverError> {
        let mut ftdi = Ft232r::new(device)?;
        ftdi.set_baud_rate(baud_divisor)?;
        ftdi.enable_bitbang(true, 0xFF)?;
        Ok(Self { ftdi, delay })
    }

    pub fn ftdi_mut(&mut self) -> &mut Ft232r<U> {
        &mut self.ftdi
    }
}

impl<U: UsbBulkDevice, D: DelayNs> ByteLink for FtdiLink<U, D> {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        data.chunks(CHUNK_SIZE)
            .try_for_each(|chunk| self.ftdi.write(chunk))
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockUsb};
    use alloc::vec;

    #[test]
    fn test_bring_up_sequence() {
        let link = FtdiLink::new(MockUsb::default(), MockDelay::default(), 0x2800).unwrap();
        let usb = &link.ftdi.device().control;
        assert_eq!(
            usb.as_slice(),
            [(0x40, 0x03, 0, 0), (0x40, 0x03, 0x2800, 0), (0x40, 0x0B, 0x01FF, 0)]
        );
    }

    #[test]
    fn test_writes_in_64_byte_chunks() {
        let mut link = FtdiLink::new(MockUsb::default(), MockDelay::default(), 0x2800).unwrap();
        link.write(&vec![0xAA; 150]).unwrap();
        let sizes: alloc::vec::Vec<usize> =
            link.ftdi.device().bulk.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, [64, 64, 22]);
    }
}
