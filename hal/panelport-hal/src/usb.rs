//! USB transfer abstractions
//!
//! Only what an FTDI bit-bang adapter needs: vendor control requests to
//! switch modes and bulk OUT transfers for the pin data.

/// A claimed USB device with vendor control and bulk OUT access
pub trait UsbBulkDevice {
    /// Error type for transfers
    type Error;

    /// Issue a host-to-device control request with no data stage
    fn control_out(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
    ) -> Result<(), Self::Error>;

    /// Write `data` to a bulk OUT endpoint
    ///
    /// Returns the number of bytes the device accepted.
    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, Self::Error>;

    /// Copy the product string descriptor into `buf`
    ///
    /// Returns the number of bytes written. Devices without a product
    /// string return 0.
    fn product_string(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let _ = buf;
        Ok(0)
    }
}

impl<T: UsbBulkDevice + ?Sized> UsbBulkDevice for &mut T {
    type Error = T::Error;

    fn control_out(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
    ) -> Result<(), Self::Error> {
        T::control_out(self, request_type, request, value, index)
    }

    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, Self::Error> {
        T::bulk_out(self, endpoint, data)
    }

    fn product_string(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::product_string(self, buf)
    }
}
