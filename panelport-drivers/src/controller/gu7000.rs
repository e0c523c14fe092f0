//! Noritake GU7000 series graphic VFD modules
//!
//! A subset of the GU3900 command language: cursor, brightness and
//! real-time bit images. The parallel interface handshakes in hardware,
//! so it is fed through the kernel's stream write.

use panelport_core::{ByteLink, DriverError};

pub const BS: u8 = 0x08;
pub const HT: u8 = 0x09;
pub const LF: u8 = 0x0A;
pub const HOME: u8 = 0x0B;
pub const CLR: u8 = 0x0C;
pub const CR: u8 = 0x0D;

pub struct Gu7000<L> {
    link: L,
}

impl<L: ByteLink> Gu7000<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Text and control codes
    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.link.write(data)
    }

    pub fn show_cursor(&mut self, show: bool) -> Result<(), DriverError> {
        self.link.write(&[0x1F, 0x43, show as u8])
    }

    /// Cursor to pixel column `x`, 8-pixel row `y`
    pub fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), DriverError> {
        let [xl, xh] = x.to_le_bytes();
        let [yl, yh] = y.to_le_bytes();
        self.link.write(&[0x1F, 0x24, xl, xh, yl, yh])
    }

    pub fn clear_display(&mut self) -> Result<(), DriverError> {
        self.link.write(&[CLR])
    }

    pub fn init_display(&mut self) -> Result<(), DriverError> {
        self.link.write(&[0x1B, 0x40])
    }

    /// 0 overwrite, 1 OR, 2 AND, 3 XOR
    pub fn set_write_mix_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 3 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[0x1F, 0x77, mode])
    }

    /// 0..=100 percent, eight steps
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        self.link.write(&[0x1F, 0x58, (percent as u32 * 8 / 100) as u8])
    }

    /// Column-wise image at the cursor, `w` pixels by `h` rows of 8
    pub fn display_bit_image(&mut self, w: u16, h: u16, image: &[u8]) -> Result<(), DriverError> {
        let [wl, wh] = w.to_le_bytes();
        let [hl, hh] = h.to_le_bytes();
        self.link.write(&[0x1F, 0x28, 0x66, 0x11, wl, wh, hl, hh, 0x01])?;
        self.link.write(image)
    }

    pub fn reverse_display(&mut self, reverse: bool) -> Result<(), DriverError> {
        self.link.write(&[0x1F, 0x72, reverse as u8])
    }
}
