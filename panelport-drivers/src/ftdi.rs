//! FTDI FT232R/FT245R bit-bang device
//!
//! Only the asynchronous bit-bang mode is used: once enabled, every byte
//! sent to the bulk endpoint appears on the eight data pins.
//!
//! # Usage
//!
//! ```ignore
//! let mut ftdi = Ft232r::new(usb)?;
//! ftdi.set_baud_rate(VFD_BAUD_DIVISOR)?;
//! ftdi.enable_bitbang(true, 0xFF)?;
//! ftdi.write(&[0x1B, 0x40])?;
//! ```

use panelport_core::DriverError;
use panelport_hal::UsbBulkDevice;
use panelport_protocol::ftdi::{ControlRequest, BULK_OUT_ENDPOINT};

/// An opened FT232R
pub struct Ft232r<D> {
    device: D,
}

impl<D: UsbBulkDevice> Ft232r<D> {
    /// Take over an opened device, resetting its baud divisor to 0
    pub fn new(device: D) -> Result<Self, DriverError> {
        let mut ftdi = Self { device };
        ftdi.set_baud_rate(0)?;
        Ok(ftdi)
    }

    fn control(&mut self, request: ControlRequest) -> Result<(), DriverError> {
        log::debug!("ftdi control {:#04x} value {:#06x}", request.request, request.value);
        self.device
            .control_out(
                request.request_type,
                request.request,
                request.value,
                request.index,
            )
            .map_err(|_| DriverError::Communication)
    }

    /// Enter or leave bit-bang mode; `direction` bit set = output
    pub fn enable_bitbang(&mut self, enable: bool, direction: u8) -> Result<(), DriverError> {
        self.control(ControlRequest::set_bitmode(enable, direction))
    }

    /// Raw baud divisor, which in bit-bang mode sets the pin update rate
    pub fn set_baud_rate(&mut self, divisor: u16) -> Result<(), DriverError> {
        self.control(ControlRequest::set_baud_rate(divisor))
    }

    pub fn write_cbus(&mut self, mask: u8, data: u8) -> Result<(), DriverError> {
        self.control(ControlRequest::cbus(mask, data))
    }

    /// Set the data pins through the control pipe
    pub fn write_byte(&mut self, byte: u8) -> Result<(), DriverError> {
        self.control(ControlRequest::write_byte(byte))
    }

    /// Bulk write pin states, retrying short transfers
    pub fn write(&mut self, mut data: &[u8]) -> Result<(), DriverError> {
        while !data.is_empty() {
            let sent = self
                .device
                .bulk_out(BULK_OUT_ENDPOINT, data)
                .map_err(|_| DriverError::Communication)?;
            if sent == 0 {
                return Err(DriverError::Communication);
            }
            data = &data[sent.min(data.len())..];
        }
        Ok(())
    }

    /// Product string descriptor, empty if the device has none
    pub fn product<'b>(&mut self, buf: &'b mut [u8]) -> Result<&'b str, DriverError> {
        let n = self
            .device
            .product_string(buf)
            .map_err(|_| DriverError::Communication)?;
        Ok(core::str::from_utf8(&buf[..n.min(buf.len())]).unwrap_or(""))
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockUsb;

    #[test]
    fn test_new_resets_baud() {
        let ftdi = Ft232r::new(MockUsb::default()).unwrap();
        assert_eq!(ftdi.device.control, [(0x40, 0x03, 0, 0)]);
    }

    #[test]
    fn test_control_requests() {
        let mut ftdi = Ft232r::new(MockUsb::default()).unwrap();
        ftdi.enable_bitbang(true, 0xFF).unwrap();
        ftdi.set_baud_rate(0x2800).unwrap();
        ftdi.write_cbus(0xF0, 0x05).unwrap();
        ftdi.write_byte(0x0F).unwrap();
        assert_eq!(
            &ftdi.device.control[1..],
            [
                (0x40, 0x0B, 0x01FF, 0),
                (0x40, 0x03, 0x2800, 0),
                (0x40, 0x0B, 0x20F5, 0),
                (0x40, 0x0B, 0x04F0, 0),
            ]
        );
    }

    #[test]
    fn test_product_string() {
        let mut usb = MockUsb::default();
        usb.product = "FT232R USB UART";
        let mut ftdi = Ft232r::new(usb).unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(ftdi.product(&mut buf).unwrap(), "FT232R USB UART");
    }
}
