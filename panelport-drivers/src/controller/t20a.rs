//! Noritake T20A character VFD
//!
//! One line of 40 characters. Control codes below 0x20 select modes;
//! everything else prints.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ByteLink, DriverError};

use crate::link::HandshakeConfig;

/// Characters per line
pub const DEFAULT_WIDTH: u32 = 40;

pub const BS: u8 = 0x08;
pub const TAB: u8 = 0x09;
pub const LF: u8 = 0x0A;
pub const FF: u8 = 0x0C;
pub const CR: u8 = 0x0D;
pub const CLR: u8 = 0x0E;
pub const ESC: u8 = 0x1B;

/// Processing time after a reset
const INIT_DELAY_MS: u32 = 100;

/// /WR pulsed low once BUSY drops
pub fn handshake(wiring: &WiringConfig, timeout_polls: u32) -> Result<HandshakeConfig, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let busy = wiring.busy.ok_or(ConfigError::MissingWiring("busy"))?;
    Ok(HandshakeConfig::busy_low(wr, busy, timeout_polls))
}

pub struct T20a<L> {
    link: L,
    width: u32,
}

impl<L: ByteLink> T20a<L> {
    pub fn new(link: L, width: u32) -> Self {
        Self { link, width }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.link.write(data)
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.link.write(&[ESC, b'I'])?;
        self.link.delay_ms(INIT_DELAY_MS);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), DriverError> {
        self.link.write(&[CLR, FF])
    }

    /// 0..=3: off, blinking block, underline, blinking underline
    pub fn set_cursor_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 3 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[0x14 + mode])
    }

    pub fn set_character_table(&mut self, table: u8) -> Result<(), DriverError> {
        if table > 1 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[0x18 + table])
    }

    /// 0 overwrite at the end of the line, 1 scroll
    pub fn set_line_ending_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 1 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[0x11 + mode])
    }

    /// User-defined glyph for character code `code`
    pub fn define_character(&mut self, code: u8, pattern: &[u8]) -> Result<(), DriverError> {
        self.link.write(&[ESC, b'C', code])?;
        self.link.write(pattern)
    }

    pub fn move_cursor(&mut self, x: u32, y: u32) -> Result<(), DriverError> {
        if x >= self.width {
            return Err(DriverError::InvalidArgument);
        }
        let position = u8::try_from(y * self.width + x).map_err(|_| DriverError::InvalidArgument)?;
        self.link.write(&[ESC, b'H', position])
    }

    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[ESC, b'L', (percent as u32 * 255 / 100) as u8])
    }

    pub fn select_flickerless_mode(&mut self) -> Result<(), DriverError> {
        self.link.write(&[ESC, b'S'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;

    fn vfd() -> T20a<MockLink> {
        T20a::new(MockLink::default(), DEFAULT_WIDTH)
    }

    #[test]
    fn test_init_waits() {
        let mut vfd = vfd();
        vfd.init().unwrap();
        assert_eq!(vfd.link.bytes, [0x1B, b'I']);
        assert_eq!(vfd.link.delay_ms, 100);
    }

    #[test]
    fn test_mode_bytes() {
        let mut vfd = vfd();
        vfd.set_cursor_mode(2).unwrap();
        vfd.set_character_table(0).unwrap();
        vfd.set_line_ending_mode(1).unwrap();
        vfd.clear().unwrap();
        assert_eq!(vfd.link.bytes, [0x16, 0x18, 0x12, 0x0E, 0x0C]);
        assert_eq!(vfd.set_cursor_mode(4), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.set_character_table(2), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.set_line_ending_mode(2), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_move_cursor_and_brightness() {
        let mut vfd = vfd();
        vfd.move_cursor(11, 1).unwrap();
        vfd.set_brightness(50).unwrap();
        assert_eq!(vfd.link.bytes, [0x1B, b'H', 51, 0x1B, b'L', 127]);
        assert_eq!(vfd.move_cursor(40, 0), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.move_cursor(0, 7), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_define_character() {
        let mut vfd = vfd();
        vfd.define_character(b'!', &[0x0F, 0x0F, 0x0F, 0x0F, 0x07]).unwrap();
        assert_eq!(vfd.link.bytes, [0x1B, b'C', b'!', 0x0F, 0x0F, 0x0F, 0x0F, 0x07]);
    }
}
