//! Row-wise panels
//!
//! Controllers that store pixels as horizontal bytes get whole rows: the
//! update always spans the full width from the first to the last changed
//! row.

use alloc::vec;
use crate::widget::Widget;

use panelport_core::{pack, Bitmap, ByteLink, ControllerBus, DriverError, RasterSink, Rect};
use panelport_drivers::controller::sed1330::PAGE_SIZE;
use panelport_drivers::controller::{Sed1330, T6963c};
use panelport_drivers::raster::{FourBitLcd, Planar, PlanarModel};

use crate::panel::{AfterClear, DiffPolicy, Panel};
use crate::widget::Ticker;

/// SED1330 display memory wiped by a hardware clear
const SED1330_MEMORY: usize = 0x8000;

pub struct T6963cPanel<B> {
    lcd: T6963c<B>,
    size: (u32, u32),
}

impl<B: ControllerBus> T6963cPanel<B> {
    pub fn new(lcd: T6963c<B>, width: u32, height: u32) -> Self {
        Self {
            lcd,
            size: (width, height),
        }
    }

    pub fn lcd_mut(&mut self) -> &mut T6963c<B> {
        &mut self.lcd
    }
}

impl<B: ControllerBus> Panel for T6963cPanel<B> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let data = pack::rows(image, dirty.top, dirty.bottom);
        self.lcd
            .set_address_pointer(pack::row_address(dirty.top, self.size.0))?;
        self.lcd.auto_write(&data)
    }
}

pub struct Sed1330Panel<B> {
    lcd: Sed1330<B>,
    size: (u32, u32),
}

impl<B: ControllerBus> Sed1330Panel<B> {
    pub fn new(lcd: Sed1330<B>, width: u32, height: u32) -> Self {
        Self {
            lcd,
            size: (width, height),
        }
    }

    pub fn lcd_mut(&mut self) -> &mut Sed1330<B> {
        &mut self.lcd
    }
}

impl<B: ControllerBus> Panel for Sed1330Panel<B> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        self.lcd.set_cursor_address(0)?;
        self.lcd.write_display_memory(&vec![0u8; SED1330_MEMORY])?;
        Ok(AfterClear::Repaint)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let data = pack::rows(image, dirty.top, dirty.bottom);
        self.lcd
            .set_cursor_address(pack::row_address(dirty.top, self.size.0))?;
        self.lcd.write_display_memory(&data)
    }

    /// The ticker lives on the second layer; `rect` spans the width
    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        let (w, h) = self.size;
        if rect.left != 0 || rect.width() != w || rect.bottom > h {
            return Err(DriverError::InvalidArgument);
        }
        self.lcd
            .set_cursor_address(PAGE_SIZE + pack::row_address(rect.top, w))?;
        self.lcd
            .write_display_memory(&vec![0u8; pack::row_address(rect.height(), w) as usize])
    }

    fn scroll(&mut self, _frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        let window = ticker.window();
        self.lcd
            .set_cursor_address(PAGE_SIZE + pack::row_address(ticker.rect().top, self.size.0))?;
        self.lcd
            .write_display_memory(&pack::rows(&window, 0, window.height()))
    }
}

/// EL320.240 takes the changed rows, EL640.200-SK everything above the
/// last changed row
pub struct PlanarPanel<L> {
    el: Planar<L>,
}

impl<L: ByteLink> PlanarPanel<L> {
    pub fn new(el: Planar<L>) -> Self {
        Self { el }
    }
}

impl<L: ByteLink> Panel for PlanarPanel<L> {
    fn size(&self) -> (u32, u32) {
        self.el.model().size()
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        let top = match self.el.model() {
            PlanarModel::El320x240 => dirty.top,
            PlanarModel::El640x200Sk => 0,
        };
        let data = pack::rows(image, top, dirty.bottom);
        let address = pack::row_address(top, image.width()) as usize;
        self.el.write(&data, address)
    }
}

/// Whole frame on every change
pub struct Lcd4Panel<S> {
    lcd: FourBitLcd<S>,
}

impl<S: RasterSink> Lcd4Panel<S> {
    pub fn new(lcd: FourBitLcd<S>) -> Self {
        Self { lcd }
    }
}

impl<S: RasterSink> Panel for Lcd4Panel<S> {
    fn size(&self) -> (u32, u32) {
        self.lcd.size()
    }

    fn diff_policy(&self) -> DiffPolicy {
        DiffPolicy::FullFrame
    }

    fn flush(&mut self, image: &Bitmap, _dirty: Rect) -> Result<(), DriverError> {
        self.lcd.write(image.as_bytes())
    }
}
