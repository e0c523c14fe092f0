//! Page-wise panels
//!
//! Each eight-row page touched by the dirty rectangle is resent as one
//! vertical byte per column, top pixel in the LSB.

use alloc::vec::Vec;

use panelport_core::{pack, Bitmap, ByteLink, ControllerBus, DriverError, Rect};
use panelport_drivers::controller::gu311::WriteMode;
use panelport_drivers::controller::sed1520::CHIP_COLUMNS;
use panelport_drivers::controller::{Gu311, Ks0108, Sed1520};

use super::{to_u16, to_u8};
use crate::panel::{AfterClear, DiffPolicy, Panel};

/// Columns per KS0108 chip
const KS0108_CHIP_COLUMNS: u32 = 64;

pub struct Ks0108Panel<B> {
    lcd: Ks0108<B>,
    size: (u32, u32),
}

impl<B: ControllerBus> Ks0108Panel<B> {
    pub fn new(lcd: Ks0108<B>, width: u32, height: u32) -> Self {
        Self {
            lcd,
            size: (width, height),
        }
    }

    pub fn lcd_mut(&mut self) -> &mut Ks0108<B> {
        &mut self.lcd
    }
}

impl<B: ControllerBus> Panel for Ks0108Panel<B> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let span = dirty.align_columns(8, image.width());
        for page in span.pages() {
            if span.left < KS0108_CHIP_COLUMNS {
                let stop = span.right.min(KS0108_CHIP_COLUMNS);
                self.lcd.select_chips(true, false)?;
                self.lcd.set_page(to_u8(page)?)?;
                self.lcd.set_address(to_u8(span.left)?)?;
                self.lcd
                    .write_display_data(&pack::page(image, page, span.left, stop))?;
            }
            if span.right > KS0108_CHIP_COLUMNS {
                let start = span.left.max(KS0108_CHIP_COLUMNS);
                self.lcd.select_chips(false, true)?;
                self.lcd.set_page(to_u8(page)?)?;
                self.lcd.set_address(to_u8(start - KS0108_CHIP_COLUMNS)?)?;
                self.lcd
                    .write_display_data(&pack::page(image, page, start, span.right))?;
            }
        }
        Ok(())
    }
}

/// 122x32 module; each touched half is rewritten whole, mirrored
pub struct Sed1520Panel<B> {
    lcd: Sed1520<B>,
}

impl<B: ControllerBus> Sed1520Panel<B> {
    pub const WIDTH: u32 = 2 * CHIP_COLUMNS as u32;
    pub const HEIGHT: u32 = 32;

    pub fn new(lcd: Sed1520<B>) -> Self {
        Self { lcd }
    }

    pub fn lcd_mut(&mut self) -> &mut Sed1520<B> {
        &mut self.lcd
    }

    fn write_half(&mut self, image: &Bitmap, chip: u8, page: u32) -> Result<(), DriverError> {
        let left = (chip as u32 - 1) * CHIP_COLUMNS as u32;
        let mut data: Vec<u8> = pack::page(image, page, left, left + CHIP_COLUMNS as u32);
        data.reverse();
        self.lcd.select_chip(chip)?;
        self.lcd.set_page_address(to_u8(page)?)?;
        self.lcd.set_column_address(0)?;
        self.lcd.write_display_data(&data)
    }
}

impl<B: ControllerBus> Panel for Sed1520Panel<B> {
    fn size(&self) -> (u32, u32) {
        (Self::WIDTH, Self::HEIGHT)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let split = CHIP_COLUMNS as u32;
        for page in dirty.pages() {
            if dirty.left < split {
                self.write_half(image, 1, page)?;
            }
            if dirty.right > split {
                self.write_half(image, 2, page)?;
            }
        }
        Ok(())
    }
}

/// Graphic RAM addressed as `x * 4 + page`
pub struct Gu311Panel<L> {
    vfd: Gu311<L>,
}

impl<L: ByteLink> Gu311Panel<L> {
    pub const WIDTH: u32 = 128;
    pub const HEIGHT: u32 = 32;

    pub fn new(vfd: Gu311<L>) -> Self {
        Self { vfd }
    }

    pub fn vfd_mut(&mut self) -> &mut Gu311<L> {
        &mut self.vfd
    }
}

impl<L: ByteLink> Panel for Gu311Panel<L> {
    fn size(&self) -> (u32, u32) {
        (Self::WIDTH, Self::HEIGHT)
    }

    fn diff_policy(&self) -> DiffPolicy {
        DiffPolicy::Diff
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.vfd.clear()?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let span = dirty.align_columns(8, image.width());
        for page in span.pages() {
            let data = pack::page(image, page, span.left, span.right);
            let address = to_u16(span.left * 4 + page)?;
            self.vfd.graphic_write(&data, address, WriteMode::Set)?;
        }
        Ok(())
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::testing::{Op, RecBus, RecLink};
    use crate::Compositor;
    use alloc::vec;

    #[test]
    fn test_ks0108_splits_across_chips() {
        let mut panel = Ks0108Panel::new(Ks0108::new(RecBus::default()), 128, 64);
        let mut image = Bitmap::new(128, 64);
        image.set(60, 9, true);
        image.set(70, 9, true);
        panel.flush(&image, Rect::new(60, 9, 71, 10)).unwrap();
        let ops = &panel.lcd.bus_mut().ops;
        assert_eq!(ops[0], Op::Chip(0b01));
        // page 1, column 56
        assert_eq!(ops[1], Op::Command(0xB9));
        assert_eq!(ops[2], Op::Command(0x40 | 56));
        assert_eq!(ops[3], Op::Data(vec![0, 0, 0, 0, 0x02, 0, 0, 0]));
        assert_eq!(ops[4], Op::Chip(0b10));
        assert_eq!(ops[6], Op::Command(0x40));
        assert_eq!(ops[7], Op::Data(vec![0, 0, 0, 0, 0, 0, 0x02, 0]));
    }

    #[test]
    fn test_ks0108_right_chip_only() {
        let mut panel = Ks0108Panel::new(Ks0108::new(RecBus::default()), 128, 64);
        let image = Bitmap::new(128, 64);
        panel.flush(&image, Rect::new(100, 0, 101, 1)).unwrap();
        let ops = &panel.lcd.bus_mut().ops;
        assert_eq!(ops[0], Op::Chip(0b10));
        assert_eq!(ops[2], Op::Command(0x40 | 32));
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn test_sed1520_halves_are_mirrored() {
        let mut panel = Sed1520Panel::new(Sed1520::new(RecBus::default()));
        let mut image = Bitmap::new(122, 32);
        image.set(0, 0, true);
        image.set(61, 0, true);
        panel.flush(&image, Rect::new(0, 0, 62, 1)).unwrap();
        let data = panel.lcd.bus_mut().data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].len(), 61);
        assert_eq!(data[0][60], 0x01);
        assert_eq!(data[1][60], 0x01);
    }

    #[test]
    fn test_gu311_graphic_write_per_page() {
        let mut display = Compositor::new(Gu311Panel::new(Gu311::new(RecLink::default()))).unwrap();
        display.panel_mut().vfd_mut().link_mut().writes.clear();
        let mut tile = Bitmap::new(8, 16);
        tile.set(0, 0, true);
        tile.set(0, 15, true);
        display.bitmap((16, 8), &tile).unwrap();
        let writes = &display.panel_mut().vfd_mut().link_mut().writes;
        // pages 1 and 2, columns 16..24
        assert_eq!(writes[0], [0x01, b'H', 0x00, 65, 0x00, 8, b'S']);
        assert_eq!(writes[1][0], 0x01);
        assert_eq!(writes[2], [0x01, b'H', 0x00, 66, 0x00, 8, b'S']);
        assert_eq!(writes[3][0], 0x80);
    }
}
