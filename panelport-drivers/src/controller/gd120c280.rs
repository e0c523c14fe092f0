//! Babcock GD120C280 DC plasma display (280x120)
//!
//! The controller has no bulk image command. Pixels are set one opcode at
//! a time (`1F` lit, `1D` dark) while an auto cursor walks down a column,
//! so a full screen is 33600 opcodes. Column addresses are big-endian.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ByteLink, DriverError};
use panelport_hal::{ControlLine, ParallelPort};

use crate::link::HandshakeConfig;

pub const WIDTH: u32 = 280;
pub const HEIGHT: u32 = 120;

/// Bytes per column in column-wise image data
pub const COLUMN_BYTES: u32 = HEIGHT / 8;

mod cmd {
    pub const CURSOR_MODE: u8 = 0x13;
    pub const OFFSCREEN_PAGE: u8 = 0x17;
    pub const DISPLAY_PAGE: u8 = 0x18;
    pub const CURSOR_POSITION: u8 = 0x1A;
    pub const AUTO_CURSOR: u8 = 0x1C;
    pub const PIXEL_OFF: u8 = 0x1D;
    pub const PIXEL_ON: u8 = 0x1F;
}

/// /WR pulsed low once BUSY drops; repeated data bytes are not rewritten
pub fn handshake(wiring: &WiringConfig, timeout_polls: u32) -> Result<HandshakeConfig, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let busy = wiring.busy.ok_or(ConfigError::MissingWiring("busy"))?;
    Ok(HandshakeConfig::busy_low(wr, busy, timeout_polls).with_skip_repeated_data())
}

/// Drive every control line except the strobe low (A0 and /US are tied to
/// them on the stock cable)
pub fn park_unused_lines<P: ParallelPort>(port: &mut P, strobe: ControlLine) -> Result<(), DriverError> {
    for line in ControlLine::ALL {
        if line != strobe {
            port.set_control(line, false)
                .map_err(|_| DriverError::Communication)?;
        }
    }
    Ok(())
}

/// Pixel opcodes for one byte, MSB first
fn pixel_opcodes(byte: u8) -> [u8; 8] {
    core::array::from_fn(|bit| {
        if byte & (0x80 >> bit) != 0 {
            cmd::PIXEL_ON
        } else {
            cmd::PIXEL_OFF
        }
    })
}

pub struct Gd120c280<L> {
    link: L,
    col: u16,
    row: u8,
    page: u8,
}

impl<L: ByteLink> Gd120c280<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            col: 0,
            row: 0,
            page: 0,
        }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Column and row of the last cursor position set
    pub fn cursor(&self) -> (u16, u8) {
        (self.col, self.row)
    }

    pub fn display_page(&self) -> u8 {
        self.page
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.link.write(data)
    }

    /// Both pages selected once with cursor mode 1, ending on page 1
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.col = 0;
        self.row = 0;
        for page in [0, 1] {
            self.select_offscreen_page(page)?;
            self.select_display_page(page)?;
            self.set_cursor_mode(1)?;
        }
        Ok(())
    }

    pub fn set_cursor_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 3 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[cmd::CURSOR_MODE + mode])
    }

    pub fn set_cursor_position(&mut self, col: u16, row: u8) -> Result<(), DriverError> {
        if col as u32 >= WIDTH || row as u32 >= HEIGHT {
            return Err(DriverError::InvalidArgument);
        }
        self.col = col;
        self.row = row;
        let [ch, cl] = col.to_be_bytes();
        self.link.write(&[cmd::CURSOR_POSITION, row, ch, cl])
    }

    /// Cursor step after each pixel, in columns and rows (0..=15)
    pub fn set_auto_cursor(&mut self, col: u8, row: u8) -> Result<(), DriverError> {
        if col > 0x0F || row > 0x0F {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[cmd::AUTO_CURSOR, row << 4 | col])
    }

    pub fn select_offscreen_page(&mut self, page: u8) -> Result<(), DriverError> {
        self.link.write(&[cmd::OFFSCREEN_PAGE, page])
    }

    pub fn select_display_page(&mut self, page: u8) -> Result<(), DriverError> {
        self.link.write(&[cmd::DISPLAY_PAGE, page])?;
        self.page = page;
        Ok(())
    }

    pub fn set_pixel(&mut self, on: bool) -> Result<(), DriverError> {
        self.link
            .write(&[if on { cmd::PIXEL_ON } else { cmd::PIXEL_OFF }])
    }

    /// Column-wise image data from the cursor on, `COLUMN_BYTES` per column
    ///
    /// Each column's 120 pixel opcodes are followed by a cursor move to the
    /// top of the next column.
    pub fn write_pixels(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.set_auto_cursor(0, 1)?;
        for column in data.chunks(COLUMN_BYTES as usize) {
            let opcodes: alloc::vec::Vec<u8> = column.iter().flat_map(|&b| pixel_opcodes(b)).collect();
            self.link.write(&opcodes)?;

            self.col = self.col.wrapping_add(1);
            let [ch, cl] = self.col.to_be_bytes();
            self.link.write(&[cmd::CURSOR_POSITION, 0, ch, cl])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLink, MockPort, PortEvent};

    #[test]
    fn test_pixel_opcodes_msb_first() {
        assert_eq!(
            pixel_opcodes(0xA0),
            [0x1F, 0x1D, 0x1F, 0x1D, 0x1D, 0x1D, 0x1D, 0x1D]
        );
    }

    #[test]
    fn test_init_pages() {
        let mut pdp = Gd120c280::new(MockLink::default());
        pdp.init().unwrap();
        assert_eq!(
            pdp.link.bytes,
            [0x17, 0, 0x18, 0, 0x14, 0x17, 1, 0x18, 1, 0x14]
        );
        assert_eq!(pdp.display_page(), 1);
    }

    #[test]
    fn test_write_pixels_advances_columns() {
        let mut pdp = Gd120c280::new(MockLink::default());
        pdp.set_cursor_position(255, 0).unwrap();
        pdp.link.bytes.clear();
        pdp.write_pixels(&[0xFF; 30]).unwrap();

        let bytes = &pdp.link.bytes;
        assert_eq!(bytes[..2], [0x1C, 0x10]);
        assert_eq!(bytes.len(), 2 + 2 * (120 + 4));
        assert!(bytes[2..122].iter().all(|&b| b == 0x1F));
        assert_eq!(bytes[122..126], [0x1A, 0, 0x01, 0x00]);
        assert_eq!(bytes[246..250], [0x1A, 0, 0x01, 0x01]);
        assert_eq!(pdp.cursor(), (257, 0));
    }

    #[test]
    fn test_cursor_position_is_big_endian() {
        let mut pdp = Gd120c280::new(MockLink::default());
        pdp.set_cursor_position(0x0113, 7).unwrap();
        assert_eq!(pdp.link.bytes, [0x1A, 7, 0x01, 0x13]);
        assert_eq!(pdp.set_cursor_position(280, 0), Err(DriverError::InvalidArgument));
        assert_eq!(pdp.set_auto_cursor(16, 0), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_park_unused_lines() {
        let mut port = MockPort::new();
        park_unused_lines(&mut port, ControlLine::Strobe).unwrap();
        assert_eq!(
            port.events,
            [
                PortEvent::Control(ControlLine::AutoFeed, false),
                PortEvent::Control(ControlLine::InitOut, false),
                PortEvent::Control(ControlLine::Select, false),
            ]
        );
    }
}
