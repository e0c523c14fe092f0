//! FTDI FT232R/FT245R bit-bang control encoding
//!
//! In asynchronous bit-bang mode every byte written to the bulk endpoint is
//! latched onto the eight data pins at the rate set by the baud divisor.
//! Mode switches are vendor control requests with no data stage.

/// FTDI USB vendor ID
pub const VENDOR_ID: u16 = 0x0403;

/// bmRequestType for vendor host-to-device requests
pub const REQUEST_TYPE_OUT: u8 = 0x40;

/// `SIO_SET_BAUD_RATE`
pub const REQUEST_SET_BAUD_RATE: u8 = 0x03;

/// `SIO_SET_BITMODE`
pub const REQUEST_SET_BITMODE: u8 = 0x0B;

/// Bulk OUT endpoint carrying pin data
pub const BULK_OUT_ENDPOINT: u8 = 0x02;

/// Largest bulk transfer sent in one piece
pub const CHUNK_SIZE: usize = 64;

/// Baud divisor pacing byte-stream VFDs
pub const VFD_BAUD_DIVISOR: u16 = 0x2800;

/// Baud divisor for raster panels, as fast as the chip goes
pub const RASTER_BAUD_DIVISOR: u16 = 3;

/// String descriptor index of the product name
pub const PRODUCT_STRING_INDEX: u8 = 2;

/// Bit mode selector, upper byte of the `SET_BITMODE` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BitMode {
    /// Back to UART operation
    Reset = 0x00,
    /// Asynchronous bit-bang on the data pins
    BitBang = 0x01,
    /// Bit-bang on the CBUS pins
    Cbus = 0x20,
}

/// A vendor control request without data stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRequest {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
}

impl ControlRequest {
    const fn vendor(request: u8, value: u16) -> Self {
        Self {
            request_type: REQUEST_TYPE_OUT,
            request,
            value,
            index: 0,
        }
    }

    /// Enter (or leave) bit-bang mode; `direction` bit set = output
    pub const fn set_bitmode(enable: bool, direction: u8) -> Self {
        let mode = if enable {
            BitMode::BitBang
        } else {
            BitMode::Reset
        };
        Self::vendor(REQUEST_SET_BITMODE, ((mode as u16) << 8) | direction as u16)
    }

    /// Set the raw baud divisor
    pub const fn set_baud_rate(divisor: u16) -> Self {
        Self::vendor(REQUEST_SET_BAUD_RATE, divisor)
    }

    /// Drive the CBUS pins; `mask` selects outputs in the high nibble
    pub const fn cbus(mask: u8, data: u8) -> Self {
        Self::vendor(
            REQUEST_SET_BITMODE,
            ((BitMode::Cbus as u16) << 8) | mask as u16 | data as u16,
        )
    }

    /// Drive the data pins through the control pipe, inverted
    pub const fn write_byte(byte: u8) -> Self {
        Self::vendor(REQUEST_SET_BITMODE, 0x0400 | (!byte) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmode_value() {
        let req = ControlRequest::set_bitmode(true, 0xFF);
        assert_eq!(req.request_type, 0x40);
        assert_eq!(req.request, 0x0B);
        assert_eq!(req.value, 0x01FF);
        assert_eq!(req.index, 0);

        assert_eq!(ControlRequest::set_bitmode(false, 0x0F).value, 0x000F);
    }

    #[test]
    fn test_baud_and_cbus() {
        let baud = ControlRequest::set_baud_rate(VFD_BAUD_DIVISOR);
        assert_eq!(baud.request, 0x03);
        assert_eq!(baud.value, 0x2800);

        assert_eq!(ControlRequest::cbus(0xF0, 0x05).value, 0x20F5);
    }

    #[test]
    fn test_write_byte_inverts() {
        assert_eq!(ControlRequest::write_byte(0x00).value, 0x04FF);
        assert_eq!(ControlRequest::write_byte(0xA5).value, 0x045A);
    }
}
