//! Noritake GU128x32-311 graphic VFD
//!
//! Every command is a `01 4F c` frame on the byte stream. Character and
//! graphic writes carry their own address and length header.
//!
//! Graphic RAM is page-wise: address `x * 4 + page`, one vertical byte per
//! column and page, LSB on top.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ByteLink, DriverError};

use crate::link::HandshakeConfig;

/// Characters per text row
pub const TEXT_COLUMNS: u8 = 22;

/// Settle time after switching the flickerless mode
const FLICKERLESS_DELAY_MS: u32 = 100;

const FRAME: [u8; 2] = [0x01, 0x4F];

mod cmd {
    pub const CHARACTER_WRITE: u8 = b'C';
    pub const GRAPHIC_WRITE: u8 = b'H';
    pub const CLEAR: u8 = b'P';
    pub const FLICKERLESS_OFF: u8 = b'Q';
    pub const FLICKERLESS_ON: u8 = b'R';
    pub const DISPLAY_OFF: u8 = b'S';
    pub const DISPLAY_ON: u8 = b'T';
    pub const CHAR_PAGE_0: u8 = b'0';
    pub const BRIGHTNESS_BASE: u8 = 0x61;
}

/// How written data combines with the RAM contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteMode {
    /// Replace
    #[default]
    Set,
    Or,
    And,
    Xor,
}

impl WriteMode {
    const fn code(self) -> u8 {
        match self {
            WriteMode::Set => b'S',
            WriteMode::Or => b'O',
            WriteMode::And => b'A',
            WriteMode::Xor => b'E',
        }
    }
}

/// /WR pulsed low once BUSY drops
pub fn handshake(wiring: &WiringConfig, timeout_polls: u32) -> Result<HandshakeConfig, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let busy = wiring.busy.ok_or(ConfigError::MissingWiring("busy"))?;
    Ok(HandshakeConfig::busy_low(wr, busy, timeout_polls))
}

pub struct Gu311<L> {
    link: L,
    brightness: u8,
}

impl<L: ByteLink> Gu311<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            brightness: 100,
        }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.set_brightness(100)?;
        self.select_char_page(1)?;
        self.set_flickerless(true)?;
        self.enable(true)?;
        self.clear()
    }

    fn command(&mut self, command: u8) -> Result<(), DriverError> {
        let [a, b] = FRAME;
        self.link.write(&[a, b, command])
    }

    pub fn enable(&mut self, on: bool) -> Result<(), DriverError> {
        self.command(if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF })
    }

    pub fn set_flickerless(&mut self, on: bool) -> Result<(), DriverError> {
        self.command(if on {
            cmd::FLICKERLESS_ON
        } else {
            cmd::FLICKERLESS_OFF
        })?;
        self.link.delay_ms(FLICKERLESS_DELAY_MS);
        Ok(())
    }

    /// Character generator page 0 or 1
    pub fn select_char_page(&mut self, page: u8) -> Result<(), DriverError> {
        if page > 1 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(cmd::CHAR_PAGE_0 + page)
    }

    pub fn clear(&mut self) -> Result<(), DriverError> {
        self.command(cmd::CLEAR)
    }

    /// 0..=100 percent, in 16 steps
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        let dim = (100 - percent) as u32;
        self.command(cmd::BRIGHTNESS_BASE + (dim * 16 / 100) as u8)?;
        self.brightness = percent;
        Ok(())
    }

    /// Write `text` starting at character cell `col`, `row`
    pub fn character_write(
        &mut self,
        text: &[u8],
        col: u8,
        row: u8,
        mode: WriteMode,
    ) -> Result<(), DriverError> {
        if col >= TEXT_COLUMNS {
            return Err(DriverError::InvalidArgument);
        }
        let address = row as u32 * TEXT_COLUMNS as u32 + col as u32;
        let address = u8::try_from(address).map_err(|_| DriverError::InvalidArgument)?;
        let len = u8::try_from(text.len()).map_err(|_| DriverError::InvalidArgument)?;
        self.link
            .write(&[0x01, cmd::CHARACTER_WRITE, address, len, mode.code()])?;
        self.link.write(text)
    }

    /// Write vertical bytes from graphic RAM `address` on
    pub fn graphic_write(&mut self, image: &[u8], address: u16, mode: WriteMode) -> Result<(), DriverError> {
        let len = u16::try_from(image.len()).map_err(|_| DriverError::InvalidArgument)?;
        let [ah, al] = address.to_be_bytes();
        let [lh, ll] = len.to_be_bytes();
        self.link
            .write(&[0x01, cmd::GRAPHIC_WRITE, ah, al, lh, ll, mode.code()])?;
        self.link.write(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;

    #[test]
    fn test_init_sequence() {
        let mut vfd = Gu311::new(MockLink::default());
        vfd.init().unwrap();
        assert_eq!(
            vfd.link.bytes,
            [1, 0x4F, 0x61, 1, 0x4F, b'1', 1, 0x4F, b'R', 1, 0x4F, b'T', 1, 0x4F, b'P']
        );
        assert_eq!(vfd.link.delay_ms, 100);
    }

    #[test]
    fn test_brightness_scale() {
        let mut vfd = Gu311::new(MockLink::default());
        vfd.set_brightness(50).unwrap();
        vfd.set_brightness(0).unwrap();
        assert_eq!(vfd.link.bytes, [1, 0x4F, 0x69, 1, 0x4F, 0x71]);
        assert_eq!(vfd.brightness(), 0);
        assert_eq!(vfd.set_brightness(101), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_character_write_header() {
        let mut vfd = Gu311::new(MockLink::default());
        vfd.character_write(b"Noritake", 7, 2, WriteMode::Set).unwrap();
        assert_eq!(&vfd.link.bytes[..5], [0x01, b'C', 51, 8, b'S']);
        assert_eq!(&vfd.link.bytes[5..], b"Noritake");
        assert_eq!(
            vfd.character_write(b"x", 22, 0, WriteMode::Set),
            Err(DriverError::InvalidArgument)
        );
    }

    #[test]
    fn test_graphic_write_is_big_endian() {
        let mut vfd = Gu311::new(MockLink::default());
        vfd.graphic_write(&[0x80; 0x102], 0x1FC, WriteMode::Xor).unwrap();
        assert_eq!(&vfd.link.bytes[..7], [0x01, b'H', 0x01, 0xFC, 0x01, 0x02, b'E']);
        assert_eq!(vfd.link.bytes.len(), 7 + 0x102);
    }
}
