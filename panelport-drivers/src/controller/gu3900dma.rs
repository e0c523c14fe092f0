//! Noritake GU3000 series modules with the DMA interface option
//!
//! DMA commands all start with `02 44 00` and write straight into display
//! RAM, which is column-wise with `H/8` bytes per column.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ByteLink, DriverError};

use crate::link::HandshakeConfig;

const PREFIX: [u8; 3] = [0x02, 0x44, 0x00];

mod cmd {
    pub const WRITE_BIT_IMAGE: u8 = 0x46;
    pub const START_ADDRESS: u8 = 0x53;
    pub const SYNCHRONIZE: u8 = 0x57;
    pub const BRIGHTNESS: u8 = 0x58;
}

/// /WR pulsed low once RDY is high
pub fn handshake(wiring: &WiringConfig, timeout_polls: u32) -> Result<HandshakeConfig, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let ready = wiring.busy.ok_or(ConfigError::MissingWiring("busy"))?;
    Ok(HandshakeConfig::ready_high(wr, ready, timeout_polls))
}

pub struct Gu3900Dma<L> {
    link: L,
}

impl<L: ByteLink> Gu3900Dma<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.set_display_start_address(0)?;
        self.set_brightness(100)
    }

    fn command(&mut self, command: u8, args: &[u8]) -> Result<(), DriverError> {
        let [a, b, c] = PREFIX;
        self.link.write(&[a, b, c, command])?;
        self.link.write(args)
    }

    /// Copy column bytes into display RAM at `address`
    pub fn write_bit_image(&mut self, image: &[u8], address: u16) -> Result<(), DriverError> {
        let len = u16::try_from(image.len()).map_err(|_| DriverError::InvalidArgument)?;
        let [al, ah] = address.to_le_bytes();
        let [ll, lh] = len.to_le_bytes();
        self.command(cmd::WRITE_BIT_IMAGE, &[al, ah, ll, lh])?;
        self.link.write(image)
    }

    /// RAM address shown in the top left corner
    pub fn set_display_start_address(&mut self, address: u16) -> Result<(), DriverError> {
        self.command(cmd::START_ADDRESS, &address.to_le_bytes())
    }

    /// Hold RAM writes until the next frame
    pub fn synchronize_display(&mut self, sync: bool) -> Result<(), DriverError> {
        self.command(cmd::SYNCHRONIZE, &[sync as u8])
    }

    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(cmd::BRIGHTNESS, &[0x10 + percent * 2 / 25])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;

    #[test]
    fn test_init() {
        let mut vfd = Gu3900Dma::new(MockLink::default());
        vfd.init().unwrap();
        assert_eq!(
            vfd.link.bytes,
            [2, 0x44, 0, 0x53, 0, 0, 2, 0x44, 0, 0x58, 0x18]
        );
    }

    #[test]
    fn test_write_bit_image_header() {
        let mut vfd = Gu3900Dma::new(MockLink::default());
        vfd.write_bit_image(&[0x55; 300], 0x0808).unwrap();
        assert_eq!(&vfd.link.bytes[..8], [2, 0x44, 0, 0x46, 0x08, 0x08, 0x2C, 0x01]);
        assert_eq!(vfd.link.bytes.len(), 308);
    }

    #[test]
    fn test_sync_and_brightness_range() {
        let mut vfd = Gu3900Dma::new(MockLink::default());
        vfd.synchronize_display(true).unwrap();
        assert_eq!(vfd.link.bytes, [2, 0x44, 0, 0x57, 1]);
        assert_eq!(vfd.set_brightness(101), Err(DriverError::InvalidArgument));
    }
}
