//! Text on a bare KS0108 module
//!
//! The controller has no character generator, so glyphs come from a 5x7
//! font stored column-wise, six bytes per character including the leading
//! spacer column. Text wraps to the next page after column 125.

use panelport_core::{ControllerBus, DriverError};

use super::{Ks0108, CHIP_COLUMNS, PAGES};

/// Columns per glyph
pub const GLYPH_WIDTH: usize = 6;

/// Last column a glyph may start writing past before wrapping
const WRAP_COLUMN: u32 = 125;

const FIRST_GLYPH: u8 = b' ';

/// Degree sign, outside the ASCII range of [`FONT_5X7`]
const DEGREE: [u8; GLYPH_WIDTH] = [0x00, 0x00, 0x07, 0x05, 0x07, 0x00];

/// Printable ASCII, `' '..='~'`
#[rustfmt::skip]
const FONT_5X7: [[u8; GLYPH_WIDTH]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x00, 0x4F, 0x00, 0x00], // !
    [0x00, 0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x00, 0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x00, 0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x00, 0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x00, 0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x00, 0x14, 0x08, 0x3E, 0x08, 0x14], // *
    [0x00, 0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x00, 0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x00, 0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x00, 0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x00, 0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x00, 0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x00, 0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x00, 0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x00, 0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x00, 0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x00, 0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x00, 0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x00, 0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x00, 0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x00, 0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x00, 0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x00, 0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x00, 0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x00, 0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x00, 0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x00, 0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x00, 0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x00, 0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x00, 0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x00, 0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x00, 0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x00, 0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x00, 0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x00, 0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x00, 0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x00, 0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x00, 0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x00, 0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x00, 0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x00, 0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x00, 0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x00, 0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x00, 0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x00, 0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x00, 0x7F, 0x48, 0x48, 0x48, 0x30], // b
    [0x00, 0x38, 0x44, 0x44, 0x44, 0x00], // c
    [0x00, 0x30, 0x48, 0x48, 0x48, 0x7F], // d
    [0x00, 0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x00, 0x08, 0x7E, 0x09, 0x09, 0x02], // f
    [0x00, 0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x00, 0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x00, 0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x00, 0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x00, 0x7C, 0x04, 0x04, 0x04, 0x78], // n
    [0x00, 0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x00, 0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x00, 0x08, 0x14, 0x14, 0x14, 0x7C], // q
    [0x00, 0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x00, 0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x00, 0x04, 0x3F, 0x44, 0x44, 0x20], // t
    [0x00, 0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x00, 0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x00, 0x3C, 0x40, 0x20, 0x40, 0x3C], // w
    [0x00, 0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x00, 0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x00, 0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x00, 0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

/// Column bytes of `c`, LSB on top
pub fn glyph(c: char) -> Option<&'static [u8; GLYPH_WIDTH]> {
    match c {
        '\u{B0}' => Some(&DEGREE),
        ' '..='~' => FONT_5X7.get((c as u8 - FIRST_GLYPH) as usize),
        _ => None,
    }
}

/// Character cursor on top of a [`Ks0108`]
pub struct Ks0108Text<B> {
    lcd: Ks0108<B>,
    col: u32,
    row: u32,
}

impl<B: ControllerBus> Ks0108Text<B> {
    pub fn new(lcd: Ks0108<B>) -> Self {
        Self { lcd, col: 0, row: 0 }
    }

    pub fn lcd_mut(&mut self) -> &mut Ks0108<B> {
        &mut self.lcd
    }

    pub fn cursor(&self) -> (u32, u32) {
        (self.col, self.row)
    }

    /// Put the write position at pixel column `col` of page `row`
    pub fn move_cursor(&mut self, col: u32, row: u32) -> Result<(), DriverError> {
        if col >= 2 * CHIP_COLUMNS || row >= PAGES {
            return Err(DriverError::InvalidArgument);
        }
        self.col = col;
        self.row = row;

        self.lcd.select_chips(true, true)?;
        self.lcd.set_page(row as u8)?;
        if col < CHIP_COLUMNS {
            self.lcd.select_chips(true, false)?;
            self.lcd.set_address(col as u8)
        } else {
            self.lcd.select_chips(false, true)?;
            self.lcd.set_address((col - CHIP_COLUMNS) as u8)
        }
    }

    pub fn write_char(&mut self, c: char) -> Result<(), DriverError> {
        let glyph = glyph(c).ok_or(DriverError::InvalidArgument)?;
        for &column in glyph {
            self.lcd
                .select_chips(self.col < CHIP_COLUMNS, self.col >= CHIP_COLUMNS)?;
            if self.col == CHIP_COLUMNS {
                self.lcd.set_address(0)?;
            }
            self.col += 1;
            self.lcd.write_display_data(&[column])?;
        }
        if self.col > WRAP_COLUMN {
            self.move_cursor(0, (self.row + 1) % PAGES)?;
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), DriverError> {
        s.chars().try_for_each(|c| self.write_char(c))
    }

    /// Fill both chips with `pattern` and home the cursor
    pub fn clear(&mut self, pattern: u8) -> Result<(), DriverError> {
        let line = [pattern; CHIP_COLUMNS as usize];
        self.lcd.select_chips(true, true)?;
        for page in 0..PAGES as u8 {
            self.lcd.set_page(page)?;
            self.lcd.write_display_data(&line)?;
        }
        self.move_cursor(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, MockBus};
    use alloc::vec;

    fn module() -> Ks0108Text<MockBus> {
        Ks0108Text::new(Ks0108::new(MockBus::default()))
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph('A'), Some(&[0x00, 0x7E, 0x11, 0x11, 0x11, 0x7E]));
        assert_eq!(glyph('°'), Some(&DEGREE));
        assert_eq!(glyph('\u{7F}'), None);
        assert_eq!(glyph('é'), None);
    }

    #[test]
    fn test_move_cursor_second_chip() {
        let mut text = module();
        text.move_cursor(70, 3).unwrap();
        assert_eq!(
            text.lcd.bus_mut().events,
            [
                BusEvent::Chip(0b11),
                BusEvent::Command(0xBB),
                BusEvent::Chip(0b10),
                BusEvent::Command(0x46),
            ]
        );
        assert_eq!(text.move_cursor(128, 0), Err(DriverError::InvalidArgument));
        assert_eq!(text.move_cursor(0, 8), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_write_char_crosses_chip_boundary() {
        let mut text = module();
        text.move_cursor(62, 0).unwrap();
        text.lcd.bus_mut().events.clear();
        text.write_char('-').unwrap();
        let events = &text.lcd.bus_mut().events;
        assert_eq!(events[0], BusEvent::Chip(0b01));
        assert_eq!(events[1], BusEvent::Data(vec![0x00]));
        assert_eq!(events[2], BusEvent::Chip(0b01));
        assert_eq!(events[4], BusEvent::Chip(0b10));
        assert_eq!(events[5], BusEvent::Command(0x40));
        assert_eq!(text.cursor(), (68, 0));
    }

    #[test]
    fn test_wraps_after_column_125() {
        let mut text = module();
        text.move_cursor(120, 7).unwrap();
        text.write_char('x').unwrap();
        assert_eq!(text.cursor(), (0, 0));
    }

    #[test]
    fn test_unknown_char() {
        let mut text = module();
        assert_eq!(text.write_str("ok\u{1}"), Err(DriverError::InvalidArgument));
        assert_eq!(text.cursor(), (12, 0));
    }

    #[test]
    fn test_clear_fills_every_page() {
        let mut text = module();
        text.clear(0xFF).unwrap();
        let bus = text.lcd.bus_mut();
        assert_eq!(bus.data_len(), 8 * 64);
        assert_eq!(bus.events[1], BusEvent::Command(0xB8));
        assert_eq!(bus.events[15], BusEvent::Command(0xBF));
    }
}
