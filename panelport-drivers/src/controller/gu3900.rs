//! Noritake GU3000/GU3900 series graphic VFD modules
//!
//! The module interprets an ESC/US command language on its input stream;
//! anything that is not a command is printed as text at the cursor. The
//! same stream arrives over the handshaked parallel port, RS-232 or an
//! FT232R.
//!
//! Bit images are column-wise: each column is `H/8` bytes, MSB on top, and
//! the cursor `y` counts 8-pixel rows.
//!
//! # Usage
//!
//! ```ignore
//! let mut vfd = Gu3900::new(link);
//! vfd.init()?;
//! vfd.set_brightness(60)?;
//! vfd.move_cursor(0, 2)?;
//! vfd.write_text("hello")?;
//! vfd.draw_rect(0, 0, 255, 63, true)?;
//! ```

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ByteLink, DriverError};

use crate::link::HandshakeConfig;

/// Command opcodes
pub mod op {
    // control codes
    pub const BACK_SPACE: &[u8] = &[0x08];
    pub const HORIZONTAL_TAB: &[u8] = &[0x09];
    pub const LINE_FEED: &[u8] = &[0x0A];
    pub const HOME_POSITION: &[u8] = &[0x0B];
    pub const CLEAR_SCREEN: &[u8] = &[0x0C];
    pub const CARRIAGE_RETURN: &[u8] = &[0x0D];

    // general settings
    pub const BRIGHTNESS_LEVEL: &[u8] = &[0x1F, 0x58];
    pub const INIT_DISPLAY: &[u8] = &[0x1B, 0x40];
    pub const MOVE_CURSOR: &[u8] = &[0x1F, 0x24];
    pub const SHOW_CURSOR: &[u8] = &[0x1F, 0x43];

    // character display
    pub const WRITE_SCREEN_MODE: &[u8] = &[0x1F, 0x28, 0x77, 0x10];
    pub const INTL_FONT: &[u8] = &[0x1B, 0x52];
    pub const CHAR_CODE_TYPE: &[u8] = &[0x1B, 0x74];
    pub const OVERWRITE_MODE: &[u8] = &[0x1F, 0x01];
    pub const VSCROLL_MODE: &[u8] = &[0x1F, 0x02];
    pub const HSCROLL_MODE: &[u8] = &[0x1F, 0x03];
    pub const HSCROLL_SPEED: &[u8] = &[0x1F, 0x73];
    pub const FONT_SIZE: &[u8] = &[0x1F, 0x28, 0x67, 0x01];
    pub const TWO_BYTE_CHAR_MODE: &[u8] = &[0x1F, 0x28, 0x67, 0x02];
    pub const TWO_BYTE_CHAR_TYPE: &[u8] = &[0x1F, 0x28, 0x67, 0x03];
    pub const FONT_MAGNIFY: &[u8] = &[0x1F, 0x28, 0x67, 0x40];
    pub const CHAR_BOLD: &[u8] = &[0x1F, 0x28, 0x67, 0x41];

    // display actions
    pub const WAIT: &[u8] = &[0x1F, 0x28, 0x61, 0x01];
    pub const SHORT_WAIT: &[u8] = &[0x1F, 0x28, 0x61, 0x02];
    pub const SCROLL_ACTION: &[u8] = &[0x1F, 0x28, 0x61, 0x10];
    pub const BLINK: &[u8] = &[0x1F, 0x28, 0x61, 0x11];
    pub const CURTAIN_ACTION: &[u8] = &[0x1F, 0x28, 0x61, 0x12];
    pub const SPRING_ACTION: &[u8] = &[0x1F, 0x28, 0x61, 0x13];
    pub const RANDOM_ACTION: &[u8] = &[0x1F, 0x28, 0x61, 0x14];
    pub const DISPLAY_POWER: &[u8] = &[0x1F, 0x28, 0x61, 0x40];

    // bit images
    pub const DRAW_DOT: &[u8] = &[0x1F, 0x28, 0x64, 0x10];
    pub const DRAW_LINE_BOX: &[u8] = &[0x1F, 0x28, 0x64, 0x11];
    pub const REALTIME_BIT_IMAGE: &[u8] = &[0x1F, 0x28, 0x66, 0x11];
    pub const DEFINE_RAM_BIT_IMAGE: &[u8] = &[0x1F, 0x28, 0x66, 0x01];
    pub const DEFINE_FROM_BIT_IMAGE: &[u8] = &[0x1F, 0x28, 0x65, 0x10];
    pub const DOWNLOADED_BIT_IMAGE: &[u8] = &[0x1F, 0x28, 0x66, 0x10];
    pub const SCROLL_DOWNLOADED_BIT_IMAGE: &[u8] = &[0x1F, 0x28, 0x66, 0x90];

    // general display
    pub const HSCROLL_QUALITY: &[u8] = &[0x1F, 0x6D];
    pub const REVERSE_DISPLAY: &[u8] = &[0x1F, 0x72];
    pub const WRITE_MIX_MODE: &[u8] = &[0x1F, 0x77];

    // windows
    pub const SELECT_WINDOW: &[u8] = &[0x1F, 0x28, 0x77, 0x01];
    pub const DEFINE_WINDOW: &[u8] = &[0x1F, 0x28, 0x77, 0x02];

    // macros
    pub const DEFINE_RAM_MACRO: &[u8] = &[0x1F, 0x3A];
    pub const DEFINE_FROM_MACRO: &[u8] = &[0x1F, 0x28, 0x65, 0x12];
    pub const EXECUTE_MACRO: &[u8] = &[0x1F, 0x5E];
}

/// Highest cursor x in pixels
pub const MAX_X: u16 = 511;

/// Highest cursor y in 8-pixel rows
pub const MAX_Y: u8 = 7;

/// How new pixels combine with the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteMix {
    #[default]
    Over = 0,
    Or = 1,
    And = 2,
    Xor = 3,
}

/// Shape drawn by the line/box command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Figure {
    Line = 0,
    Box = 1,
    FilledBox = 2,
}

/// RDY high before an active-high strobe pulse
pub fn handshake(wiring: &WiringConfig, timeout_polls: u32) -> Result<HandshakeConfig, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let ready = wiring.busy.ok_or(ConfigError::MissingWiring("busy"))?;
    Ok(HandshakeConfig::ready_high(wr, ready, timeout_polls).with_active_high_strobe())
}

pub struct Gu3900<L> {
    link: L,
    power: bool,
    bold: bool,
    brightness: u8,
    font_size: u8,
    reverse: bool,
}

impl<L: ByteLink> Gu3900<L> {
    /// Wrap a link; cached properties start at the power-on defaults
    pub fn new(link: L) -> Self {
        Self {
            link,
            power: true,
            bold: false,
            brightness: 100,
            font_size: 1,
            reverse: false,
        }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn power(&self) -> bool {
        self.power
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Send `opcode` followed by its argument bytes
    pub fn command(&mut self, opcode: &[u8], args: &[u8]) -> Result<(), DriverError> {
        self.link.write(opcode)?;
        if !args.is_empty() {
            self.link.write(args)?;
        }
        Ok(())
    }

    /// Raw bytes: text, control codes or prebuilt commands
    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.link.write(data)
    }

    pub fn write_text(&mut self, text: &str) -> Result<(), DriverError> {
        self.link.write(text.as_bytes())
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.command(op::INIT_DISPLAY, &[])?;
        self.set_write_mode(WriteMix::Over)
    }

    pub fn clear(&mut self) -> Result<(), DriverError> {
        self.command(op::CLEAR_SCREEN, &[])
    }

    pub fn show_cursor(&mut self, on: bool) -> Result<(), DriverError> {
        self.command(op::SHOW_CURSOR, &[on as u8])
    }

    /// Cursor to pixel column `x`, character row `y`
    pub fn move_cursor(&mut self, x: u16, y: u8) -> Result<(), DriverError> {
        if x > MAX_X || y > MAX_Y {
            return Err(DriverError::InvalidArgument);
        }
        let [xl, xh] = x.to_le_bytes();
        self.command(op::MOVE_CURSOR, &[xl, xh, y, 0])
    }

    pub fn set_bold(&mut self, bold: bool) -> Result<(), DriverError> {
        self.command(op::CHAR_BOLD, &[bold as u8])?;
        self.bold = bold;
        Ok(())
    }

    /// 1 (6x8), 2 (8x16) or 4 (16x32)
    pub fn set_font_size(&mut self, size: u8) -> Result<(), DriverError> {
        if !matches!(size, 1 | 2 | 4) {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::FONT_SIZE, &[size])?;
        self.font_size = size;
        Ok(())
    }

    /// 0..=100 percent in eight steps
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::BRIGHTNESS_LEVEL, &[0x10 + percent * 2 / 25])?;
        self.brightness = percent;
        Ok(())
    }

    pub fn set_power(&mut self, on: bool) -> Result<(), DriverError> {
        self.command(op::DISPLAY_POWER, &[on as u8])?;
        self.power = on;
        Ok(())
    }

    pub fn set_reverse(&mut self, on: bool) -> Result<(), DriverError> {
        self.command(op::REVERSE_DISPLAY, &[on as u8])?;
        self.reverse = on;
        Ok(())
    }

    /// 0 selects the base screen, 1..=4 a user window
    pub fn select_window(&mut self, window: u8) -> Result<(), DriverError> {
        if window > 4 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::SELECT_WINDOW, &[window])
    }

    pub fn set_write_mode(&mut self, mix: WriteMix) -> Result<(), DriverError> {
        self.command(op::WRITE_MIX_MODE, &[mix as u8])
    }

    /// Character magnification, 1..=4 in each direction
    pub fn magnify_font(&mut self, x: u8, y: u8) -> Result<(), DriverError> {
        if !(1..=4).contains(&x) || !(1..=4).contains(&y) {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::FONT_MAGNIFY, &[x, y])
    }

    /// Pause the command interpreter for `half_seconds` * 0.5 s
    pub fn wait(&mut self, half_seconds: u8) -> Result<(), DriverError> {
        self.command(op::WAIT, &[half_seconds])
    }

    /// 0 display screen only, 1 whole RAM
    pub fn set_write_screen_mode(&mut self, all_screens: bool) -> Result<(), DriverError> {
        self.command(op::WRITE_SCREEN_MODE, &[all_screens as u8])
    }

    pub fn set_international_font(&mut self, font: u8) -> Result<(), DriverError> {
        self.command(op::INTL_FONT, &[font])
    }

    /// Character code table, 0 is PC437
    pub fn set_char_code_type(&mut self, table: u8) -> Result<(), DriverError> {
        self.command(op::CHAR_CODE_TYPE, &[table])
    }

    pub fn set_hscroll_speed(&mut self, speed: u8) -> Result<(), DriverError> {
        self.command(op::HSCROLL_SPEED, &[speed])
    }

    /// Run a macro stored in RAM
    pub fn execute_macro(&mut self, args: &[u8]) -> Result<(), DriverError> {
        self.command(op::EXECUTE_MACRO, args)
    }

    pub fn draw_point(&mut self, x: u8, y: u8, on: bool) -> Result<(), DriverError> {
        if y >= 64 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::DRAW_DOT, &[on as u8, x, 0, y, 0])
    }

    /// User window `window` (1..=4) at pixel `x`, row `y`, `w` pixels by
    /// `h` rows
    pub fn define_window(&mut self, window: u8, x: u16, y: u8, w: u16, h: u8) -> Result<(), DriverError> {
        if !(1..=4).contains(&window)
            || x > MAX_X
            || y > MAX_Y
            || !(1..=512).contains(&w)
            || !(1..=8).contains(&h)
        {
            return Err(DriverError::InvalidArgument);
        }
        let [xl, xh] = x.to_le_bytes();
        let [wl, wh] = w.to_le_bytes();
        self.command(op::DEFINE_WINDOW, &[window, 1, xl, xh, y, 0, wl, wh, h, 0])
    }

    pub fn cancel_window(&mut self, window: u8) -> Result<(), DriverError> {
        if !(1..=4).contains(&window) {
            return Err(DriverError::InvalidArgument);
        }
        self.command(op::DEFINE_WINDOW, &[window, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    fn figure(&mut self, figure: Figure, x1: u8, y1: u8, x2: u8, y2: u8, on: bool) -> Result<(), DriverError> {
        self.command(
            op::DRAW_LINE_BOX,
            &[figure as u8, on as u8, x1, 0, y1, 0, x2, 0, y2, 0],
        )
    }

    pub fn draw_line(&mut self, x1: u8, y1: u8, x2: u8, y2: u8, on: bool) -> Result<(), DriverError> {
        self.figure(Figure::Line, x1, y1, x2, y2, on)
    }

    pub fn draw_rect(&mut self, x1: u8, y1: u8, x2: u8, y2: u8, on: bool) -> Result<(), DriverError> {
        self.figure(Figure::Box, x1, y1, x2, y2, on)
    }

    pub fn fill_rect(&mut self, x1: u8, y1: u8, x2: u8, y2: u8, on: bool) -> Result<(), DriverError> {
        self.figure(Figure::FilledBox, x1, y1, x2, y2, on)
    }

    /// Column-wise image at the cursor, `w` pixels by `h` rows of 8
    pub fn display_realtime_bit_image(&mut self, w: u16, h: u16, image: &[u8]) -> Result<(), DriverError> {
        let [wl, wh] = w.to_le_bytes();
        let [hl, hh] = h.to_le_bytes();
        self.command(op::REALTIME_BIT_IMAGE, &[wl, wh, hl, hh, 0x01])?;
        self.link.write(image)
    }

    /// Move the cursor to `x`, `y`, then show the image
    pub fn draw_image(&mut self, x: u16, y: u8, w: u16, h: u16, image: &[u8]) -> Result<(), DriverError> {
        self.move_cursor(x, y)?;
        self.display_realtime_bit_image(w, h, image)
    }

    /// Store an image in RAM for later copies
    pub fn write_ram_image(&mut self, address: u16, image: &[u8]) -> Result<(), DriverError> {
        let len = u16::try_from(image.len()).map_err(|_| DriverError::InvalidArgument)?;
        let [al, ah] = address.to_le_bytes();
        let [ll, lh] = len.to_le_bytes();
        self.command(op::DEFINE_RAM_BIT_IMAGE, &[al, ah, 0, ll, lh, 0])?;
        self.link.write(image)
    }

    fn downloaded_image(
        &mut self,
        source: u8,
        address: u16,
        src_h: u8,
        dst_w: u16,
        dst_h: u8,
    ) -> Result<(), DriverError> {
        let [al, ah] = address.to_le_bytes();
        let [wl, wh] = dst_w.to_le_bytes();
        self.command(
            op::DOWNLOADED_BIT_IMAGE,
            &[source, al, ah, 0, src_h, 0, wl, wh, dst_h, 0, 0x01],
        )
    }

    /// Show part of a flash-ROM image at the cursor
    pub fn copy_image(&mut self, address: u16, src_h: u8, dst_w: u16, dst_h: u8) -> Result<(), DriverError> {
        self.downloaded_image(0x02, address, src_h, dst_w, dst_h)
    }

    /// Show part of a [`write_ram_image`](Self::write_ram_image) image at
    /// the cursor
    pub fn copy_ram_image(&mut self, address: u16, src_h: u8, dst_w: u16, dst_h: u8) -> Result<(), DriverError> {
        self.downloaded_image(0x00, address, src_h, dst_w, dst_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;

    fn vfd() -> Gu3900<MockLink> {
        Gu3900::new(MockLink::default())
    }

    #[test]
    fn test_init_and_defaults() {
        let mut vfd = vfd();
        vfd.init().unwrap();
        assert_eq!(vfd.link.bytes, [0x1B, 0x40, 0x1F, 0x77, 0x00]);
        assert!(vfd.power());
        assert!(!vfd.bold());
        assert_eq!(vfd.brightness(), 100);
        assert_eq!(vfd.font_size(), 1);
        assert!(!vfd.reverse());
    }

    #[test]
    fn test_brightness_encoding() {
        let mut vfd = vfd();
        vfd.set_brightness(100).unwrap();
        vfd.set_brightness(50).unwrap();
        vfd.set_brightness(0).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [0x1F, 0x58, 0x18, 0x1F, 0x58, 0x14, 0x1F, 0x58, 0x10]
        );
        assert_eq!(vfd.brightness(), 0);
    }

    #[test]
    fn test_move_cursor_range() {
        let mut vfd = vfd();
        vfd.move_cursor(300, 7).unwrap();
        assert_eq!(vfd.link.bytes, [0x1F, 0x24, 0x2C, 0x01, 7, 0]);
        assert_eq!(vfd.move_cursor(512, 0), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.move_cursor(0, 8), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_property_setters_update_cache_only_when_valid() {
        let mut vfd = vfd();
        assert_eq!(vfd.set_font_size(3), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.font_size(), 1);
        vfd.set_font_size(4).unwrap();
        vfd.set_bold(true).unwrap();
        vfd.set_power(false).unwrap();
        vfd.set_reverse(true).unwrap();
        assert_eq!((vfd.font_size(), vfd.bold(), vfd.power(), vfd.reverse()), (4, true, false, true));
        assert!(vfd.link.bytes.starts_with(&[0x1F, 0x28, 0x67, 0x01, 4]));
    }

    #[test]
    fn test_windows() {
        let mut vfd = vfd();
        vfd.define_window(1, 0, 4, 256, 4).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [0x1F, 0x28, 0x77, 0x02, 1, 1, 0, 0, 4, 0, 0x00, 0x01, 4, 0]
        );
        vfd.link.bytes.clear();
        vfd.cancel_window(1).unwrap();
        assert_eq!(vfd.link.bytes[4..], [1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(vfd.define_window(5, 0, 0, 1, 1), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.define_window(1, 0, 0, 0, 1), Err(DriverError::InvalidArgument));
        assert_eq!(vfd.select_window(5), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_figures_and_points() {
        let mut vfd = vfd();
        vfd.fill_rect(0, 0, 31, 31, true).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [0x1F, 0x28, 0x64, 0x11, 2, 1, 0, 0, 0, 0, 31, 0, 31, 0]
        );
        vfd.link.bytes.clear();
        vfd.draw_point(10, 63, false).unwrap();
        assert_eq!(vfd.link.bytes, [0x1F, 0x28, 0x64, 0x10, 0, 10, 0, 63, 0]);
        assert_eq!(vfd.draw_point(0, 64, true), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_draw_image_moves_cursor_first() {
        let mut vfd = vfd();
        vfd.draw_image(8, 1, 2, 1, &[0xC0, 0xC0]).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [
                0x1F, 0x24, 8, 0, 1, 0, // cursor
                0x1F, 0x28, 0x66, 0x11, 2, 0, 1, 0, 1, // header
                0xC0, 0xC0,
            ]
        );
    }

    #[test]
    fn test_ram_images() {
        let mut vfd = vfd();
        vfd.write_ram_image(0x0104, &[1, 2, 3, 4]).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [0x1F, 0x28, 0x66, 0x01, 0x04, 0x01, 0, 4, 0, 0, 1, 2, 3, 4]
        );
        vfd.link.bytes.clear();
        vfd.copy_ram_image(4, 4, 256, 4).unwrap();
        assert_eq!(
            vfd.link.bytes,
            [0x1F, 0x28, 0x66, 0x10, 0x00, 4, 0, 0, 4, 0, 0, 1, 4, 0, 1]
        );
        vfd.link.bytes.clear();
        vfd.copy_image(0, 8, 128, 8).unwrap();
        assert_eq!(vfd.link.bytes[4], 0x02);
    }

    #[test]
    fn test_text_and_magnify() {
        let mut vfd = vfd();
        vfd.write_text("ok").unwrap();
        vfd.magnify_font(2, 2).unwrap();
        assert_eq!(vfd.link.bytes, [b'o', b'k', 0x1F, 0x28, 0x67, 0x40, 2, 2]);
        assert_eq!(vfd.magnify_font(0, 1), Err(DriverError::InvalidArgument));
    }
}
