//! FTDI adapters through libusb
//!
//! The `ftdi_sio` kernel driver binds to these devices as a serial port;
//! it is detached on open where the platform allows it.

use std::time::Duration;

use log::{info, warn};
use panelport_hal::UsbBulkDevice;
use rusb::{Device, DeviceDescriptor, DeviceHandle, GlobalContext};

use crate::LinuxHalError;

/// FTDI vendor ID
pub const FTDI_VENDOR_ID: u16 = 0x0403;

const TRANSFER_TIMEOUT: Duration = Duration::from_secs(1);

/// One enumerated FTDI device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtdiDeviceInfo {
    /// Position among FTDI devices, as taken by [`FtdiUsb::open`]
    pub index: usize,
    pub bus: u8,
    pub address: u8,
    pub product_id: u16,
    pub product: Option<String>,
}

fn ftdi_devices() -> Result<Vec<(Device<GlobalContext>, DeviceDescriptor)>, LinuxHalError> {
    let mut found = Vec::new();
    for device in rusb::devices()?.iter() {
        let descriptor = device.device_descriptor()?;
        if descriptor.vendor_id() == FTDI_VENDOR_ID {
            found.push((device, descriptor));
        }
    }
    Ok(found)
}

/// An opened FTDI device with interface 0 claimed
pub struct FtdiUsb {
    handle: DeviceHandle<GlobalContext>,
    descriptor: DeviceDescriptor,
}

impl FtdiUsb {
    /// Every attached FTDI device
    pub fn list() -> Result<Vec<FtdiDeviceInfo>, LinuxHalError> {
        let devices = ftdi_devices()?;
        Ok(devices
            .into_iter()
            .enumerate()
            .map(|(index, (device, descriptor))| {
                let product = device
                    .open()
                    .and_then(|handle| handle.read_product_string_ascii(&descriptor))
                    .ok();
                FtdiDeviceInfo {
                    index,
                    bus: device.bus_number(),
                    address: device.address(),
                    product_id: descriptor.product_id(),
                    product,
                }
            })
            .collect())
    }

    /// Open the `index`th FTDI device
    pub fn open(index: usize) -> Result<Self, LinuxHalError> {
        let (device, descriptor) = ftdi_devices()?
            .into_iter()
            .nth(index)
            .ok_or(LinuxHalError::NoDevice(index))?;
        let mut handle = device.open()?;
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            warn!("cannot detach kernel driver: {}", e);
        }
        handle.claim_interface(0)?;
        info!(
            "opened FTDI {:04x}:{:04x} on bus {} address {}",
            descriptor.vendor_id(),
            descriptor.product_id(),
            device.bus_number(),
            device.address()
        );
        Ok(Self { handle, descriptor })
    }
}

/// Copy as much of `text` as fits into `buf`
fn copy_into(buf: &mut [u8], text: &str) -> usize {
    let len = text.len().min(buf.len());
    buf[..len].copy_from_slice(&text.as_bytes()[..len]);
    len
}

impl UsbBulkDevice for FtdiUsb {
    type Error = LinuxHalError;

    fn control_out(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
    ) -> Result<(), LinuxHalError> {
        self.handle
            .write_control(request_type, request, value, index, &[], TRANSFER_TIMEOUT)?;
        Ok(())
    }

    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, LinuxHalError> {
        Ok(self.handle.write_bulk(endpoint, data, TRANSFER_TIMEOUT)?)
    }

    fn product_string(&mut self, buf: &mut [u8]) -> Result<usize, LinuxHalError> {
        match self.handle.read_product_string_ascii(&self.descriptor) {
            Ok(product) => Ok(copy_into(buf, &product)),
            Err(rusb::Error::NotFound) | Err(rusb::Error::InvalidParam) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FtdiUsb {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(0) {
            warn!("FTDI release failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_into_truncates() {
        let mut buf = [0u8; 6];
        assert_eq!(copy_into(&mut buf, "FT232R USB UART"), 6);
        assert_eq!(&buf, b"FT232R");
        let mut buf = [0u8; 16];
        assert_eq!(copy_into(&mut buf, "UM245R"), 6);
        assert_eq!(&buf[..6], b"UM245R");
    }
}
