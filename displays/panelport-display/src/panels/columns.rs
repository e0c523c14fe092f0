//! Column-wise panels
//!
//! The changed range is widened to byte boundaries and sent as full height
//! columns, each `H / 8` bytes with the top pixel in the MSB.

use alloc::vec;
use alloc::vec::Vec;
use crate::widget::Widget;

use panelport_core::{pack, Bitmap, ByteLink, ControllerBus, DriverError, Rect};
use panelport_drivers::controller::gd120c280::{COLUMN_BYTES, HEIGHT, WIDTH};
use panelport_drivers::controller::gu300::{RAM_SIZE, SCREEN_2_ADDRESS};
use panelport_drivers::controller::{Gd120c280, Gu300, Gu3900, Gu3900Dma, Gu7000};

use super::{to_u16, to_u8};
use crate::panel::{AfterClear, DiffPolicy, Panel};
use crate::widget::Ticker;

/// GU3900 user window the ticker scrolls in
const TICKER_WINDOW: u8 = 1;

/// Column range to resend and its packed bytes
fn column_update(image: &Bitmap, dirty: Rect) -> (Rect, Vec<u8>) {
    let span = dirty.align_columns(8, image.width());
    (span, pack::columns(image, span.left, span.right))
}

pub struct Gu3900Panel<L> {
    vfd: Gu3900<L>,
    size: (u32, u32),
}

impl<L: ByteLink> Gu3900Panel<L> {
    pub fn new(vfd: Gu3900<L>, width: u32, height: u32) -> Self {
        Self {
            vfd,
            size: (width, height),
        }
    }

    pub fn vfd_mut(&mut self) -> &mut Gu3900<L> {
        &mut self.vfd
    }
}

impl<L: ByteLink> Panel for Gu3900Panel<L> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.vfd.clear()?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let (span, data) = column_update(image, dirty);
        let bands = pack::column_height_bytes(self.size.1);
        self.vfd.move_cursor(to_u16(span.left)?, 0)?;
        self.vfd
            .display_realtime_bit_image(to_u16(span.width())?, to_u16(bands)?, &data)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }

    /// A user window over `rect` and a ring of its columns in image RAM
    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        let (w, h) = self.size;
        let aligned = rect.top % 8 == 0 && rect.height() % 8 == 0;
        if rect.is_empty() || rect.right > w || rect.bottom > h || !aligned {
            return Err(DriverError::InvalidArgument);
        }
        self.vfd.define_window(
            TICKER_WINDOW,
            to_u16(rect.left)?,
            to_u8(rect.top / 8)?,
            to_u16(rect.width())?,
            to_u8(rect.height() / 8)?,
        )?;
        self.vfd
            .write_ram_image(0, &vec![0u8; (rect.width() * rect.height() / 8) as usize])
    }

    /// Replace the oldest ring column, then copy the ring into the window
    /// starting from the new oldest one
    fn scroll(&mut self, _frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        let rect = ticker.rect();
        let w = rect.width();
        let bands = rect.height() / 8;
        let rows = to_u8(bands)?;
        let slot = (ticker.offset() + w - 1) % w;
        let oldest = (slot + 1) % w;

        self.vfd.select_window(TICKER_WINDOW)?;
        let column = pack::columns(&ticker.leading_column(), 0, 1);
        self.vfd.write_ram_image(to_u16(slot * bands)?, &column)?;
        self.vfd.move_cursor(0, 0)?;
        self.vfd
            .copy_ram_image(to_u16(oldest * bands)?, rows, to_u16(w - oldest)?, rows)?;
        if oldest > 0 {
            self.vfd.move_cursor(to_u16(w - oldest)?, 0)?;
            self.vfd.copy_ram_image(0, rows, to_u16(oldest)?, rows)?;
        }
        self.vfd.select_window(0)
    }
}

/// Display RAM written directly; the start address is pinned to 0
pub struct Gu3900DmaPanel<L> {
    vfd: Gu3900Dma<L>,
    size: (u32, u32),
}

impl<L: ByteLink> Gu3900DmaPanel<L> {
    pub fn new(vfd: Gu3900Dma<L>, width: u32, height: u32) -> Self {
        Self {
            vfd,
            size: (width, height),
        }
    }

    pub fn vfd_mut(&mut self) -> &mut Gu3900Dma<L> {
        &mut self.vfd
    }
}

impl<L: ByteLink> Panel for Gu3900DmaPanel<L> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        // Two screens of RAM
        let (w, h) = self.size;
        self.vfd.write_bit_image(&vec![0u8; (w * h / 4) as usize], 0)?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let (span, data) = column_update(image, dirty);
        self.vfd.set_display_start_address(0)?;
        let address = pack::column_address(span.left, self.size.1);
        self.vfd.write_bit_image(&data, to_u16(address)?)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }

    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        let (w, h) = self.size;
        if rect.is_empty() || rect.right > w || rect.bottom > h {
            return Err(DriverError::InvalidArgument);
        }
        Ok(())
    }

    /// Whole frames on even steps, flipping between the two RAM pages
    fn scroll(&mut self, frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        if ticker.offset() % 2 != 0 {
            return Ok(());
        }
        let (w, h) = self.size;
        let rect = ticker.rect();
        let mut image = frame.clone();
        image.paste(rect.left as i32, rect.top as i32, &ticker.window());
        // Page 1 first; page 0 is what the compositor writes to
        let page = (ticker.offset() / 2 + 1) % 2;
        let address = to_u16(page * pack::column_address(w, h))?;
        self.vfd.write_bit_image(&pack::columns(&image, 0, w), address)?;
        self.vfd.set_display_start_address(address)
    }
}

pub struct Gu7000Panel<L> {
    vfd: Gu7000<L>,
    size: (u32, u32),
}

impl<L: ByteLink> Gu7000Panel<L> {
    pub fn new(vfd: Gu7000<L>, width: u32, height: u32) -> Self {
        Self {
            vfd,
            size: (width, height),
        }
    }

    pub fn vfd_mut(&mut self) -> &mut Gu7000<L> {
        &mut self.vfd
    }

    fn write_columns(&mut self, left: u32, columns: u32, data: &[u8]) -> Result<(), DriverError> {
        let bands = pack::column_height_bytes(self.size.1);
        self.vfd.set_cursor(to_u16(left)?, 0)?;
        self.vfd
            .display_bit_image(to_u16(columns)?, to_u16(bands)?, data)
    }
}

impl<L: ByteLink> Panel for Gu7000Panel<L> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        let (w, h) = self.size;
        let blank = vec![0u8; (w * pack::column_height_bytes(h)) as usize];
        self.write_columns(0, w, &blank)?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let (span, data) = column_update(image, dirty);
        self.write_columns(span.left, span.width(), &data)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }
}

pub struct Gu300Panel<B> {
    vfd: Gu300<B>,
    size: (u32, u32),
}

impl<B: ControllerBus> Gu300Panel<B> {
    pub fn new(vfd: Gu300<B>, width: u32, height: u32) -> Self {
        Self {
            vfd,
            size: (width, height),
        }
    }

    pub fn vfd_mut(&mut self) -> &mut Gu300<B> {
        &mut self.vfd
    }
}

impl<B: ControllerBus> Panel for Gu300Panel<B> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.vfd.set_cursor_address(0)?;
        self.vfd.write_data(&[0u8; RAM_SIZE])?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let (span, data) = column_update(image, dirty);
        self.vfd
            .set_cursor_address(pack::column_address(span.left, self.size.1))?;
        self.vfd.write_data(&data)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.vfd.set_brightness(percent)
    }

    /// Screen 2 becomes a ring of two screen widths; `rect` spans the width
    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        let (w, h) = self.size;
        if rect.left != 0 || rect.width() != w || rect.bottom > h {
            return Err(DriverError::InvalidArgument);
        }
        let ring = 2 * pack::column_address(w, h);
        if SCREEN_2_ADDRESS as u32 + ring > RAM_SIZE as u32 {
            return Err(DriverError::InvalidArgument);
        }
        self.vfd.set_cursor_address(SCREEN_2_ADDRESS as u32)?;
        self.vfd.write_data(&vec![0u8; ring as usize])?;
        self.vfd.set_display_start_address(0, SCREEN_2_ADDRESS)
    }

    /// Each column is written twice, one screen apart, so the screen 2
    /// start address can slide through the ring one column per step
    fn scroll(&mut self, _frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        let (w, h) = self.size;
        let mut column = Bitmap::new(1, h);
        column.paste(0, ticker.rect().top as i32, &ticker.leading_column());
        let data = pack::columns(&column, 0, 1);
        let slot = (ticker.offset() + w - 1) % w;
        let address = |slot: u32| SCREEN_2_ADDRESS as u32 + pack::column_address(slot, h);

        self.vfd.set_cursor_address(address(slot + w))?;
        self.vfd.write_data(&data)?;
        self.vfd
            .set_display_start_address(0, to_u16(address(slot + 1))?)?;
        self.vfd.set_cursor_address(address(slot))?;
        self.vfd.write_data(&data)
    }
}

/// Both pages get every update so page flips never show stale pixels
pub struct Gd120c280Panel<L> {
    pdp: Gd120c280<L>,
}

impl<L: ByteLink> Gd120c280Panel<L> {
    pub fn new(pdp: Gd120c280<L>) -> Self {
        Self { pdp }
    }

    pub fn pdp_mut(&mut self) -> &mut Gd120c280<L> {
        &mut self.pdp
    }

    fn write(&mut self, left: u32, data: &[u8]) -> Result<(), DriverError> {
        for page in 0..2 {
            self.pdp.select_offscreen_page(page)?;
            self.pdp.set_cursor_mode(1)?;
            self.pdp.set_cursor_position(to_u16(left)?, 0)?;
            self.pdp.write_pixels(data)?;
            self.pdp.select_display_page(page)?;
        }
        Ok(())
    }
}

impl<L: ByteLink> Panel for Gd120c280Panel<L> {
    fn size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn diff_policy(&self) -> DiffPolicy {
        DiffPolicy::Diff
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.write(0, &vec![0u8; (WIDTH * COLUMN_BYTES) as usize])?;
        Ok(AfterClear::Dark)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let (span, data) = column_update(image, dirty);
        self.write(span.left, &data)
    }
}
