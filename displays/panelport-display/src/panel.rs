//! Panel trait
//!
//! Defines the interface between the compositor and a model's controller.

use alloc::boxed::Box;

use panelport_core::{Bitmap, DriverError, PanelModel, Rect};

use crate::widget::Ticker;

/// How the compositor finds the region to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiffPolicy {
    /// Trust a caller supplied rectangle, diff otherwise
    Hinted,
    /// Always diff against the last frame
    Diff,
    /// Any change resends the whole frame
    FullFrame,
}

/// State of the glass after [`Panel::clear_hardware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfterClear {
    /// Unknown; force a full repaint with an all-dark frame
    Repaint,
    /// Known dark; no repaint needed
    Dark,
}

/// Order a model's controller stores pixels in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    /// Whole rows from the first changed row
    Rows,
    /// Every row from the top down to the last changed row
    PrefixRows,
    /// Complete frame on any change
    FullFrame,
    /// Full height columns across the changed range
    Columns,
    /// Eight-row pages of vertical bytes
    Pages,
    /// Text only
    Characters,
}

impl Layout {
    pub const fn of(model: PanelModel) -> Self {
        match model {
            PanelModel::T6963c | PanelModel::Sed1330 | PanelModel::El320x240 => Layout::Rows,
            PanelModel::El640x200Sk => Layout::PrefixRows,
            PanelModel::Lcd4 => Layout::FullFrame,
            PanelModel::Gu3900
            | PanelModel::Gu3900Dma
            | PanelModel::Gu7000
            | PanelModel::Gu300
            | PanelModel::Gd120c280 => Layout::Columns,
            PanelModel::Ks0108 | PanelModel::Sed1520 | PanelModel::Gu311 => Layout::Pages,
            PanelModel::T20a | PanelModel::S20a => Layout::Characters,
        }
    }
}

/// Diff policy a model's panel reports
pub const fn diff_policy(model: PanelModel) -> DiffPolicy {
    match model {
        PanelModel::Lcd4 => DiffPolicy::FullFrame,
        PanelModel::Gu311 | PanelModel::Gd120c280 => DiffPolicy::Diff,
        _ => DiffPolicy::Hinted,
    }
}

/// A display the compositor can refresh
///
/// Implementations hold the chip driver and its transport. Only `size` and
/// `flush` are required; text, brightness and hardware scrolling are
/// optional capabilities.
pub trait Panel {
    /// (width, height) in pixels, or character cells for text panels
    fn size(&self) -> (u32, u32);

    fn diff_policy(&self) -> DiffPolicy {
        DiffPolicy::Hinted
    }

    /// Model specific wipe of display memory
    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        Ok(AfterClear::Repaint)
    }

    /// Show `image`, of which at least `dirty` changed
    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError>;

    /// Character grid of a text panel
    fn character_cells(&self) -> Option<(u32, u32)> {
        None
    }

    /// Write text at a character cell
    fn write_text(&mut self, _col: u32, _row: u32, _text: &str) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    /// 0..=100 percent
    fn set_brightness(&mut self, _percent: u8) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Set aside display memory for a ticker scrolling through `rect`
    fn begin_scroll(&mut self, _rect: Rect) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Show the ticker's current step over `frame`
    ///
    /// Steps arrive in order from offset 0 after [`Panel::begin_scroll`].
    fn scroll(&mut self, _frame: &Bitmap, _ticker: &Ticker) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }
}

impl<P: Panel + ?Sized> Panel for &mut P {
    fn size(&self) -> (u32, u32) {
        P::size(self)
    }

    fn diff_policy(&self) -> DiffPolicy {
        P::diff_policy(self)
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        P::clear_hardware(self)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        P::flush(self, image, dirty)
    }

    fn character_cells(&self) -> Option<(u32, u32)> {
        P::character_cells(self)
    }

    fn write_text(&mut self, col: u32, row: u32, text: &str) -> Result<(), DriverError> {
        P::write_text(self, col, row, text)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        P::set_brightness(self, percent)
    }

    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        P::begin_scroll(self, rect)
    }

    fn scroll(&mut self, frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        P::scroll(self, frame, ticker)
    }
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn size(&self) -> (u32, u32) {
        P::size(self)
    }

    fn diff_policy(&self) -> DiffPolicy {
        P::diff_policy(self)
    }

    fn clear_hardware(&mut self) -> Result<AfterClear, DriverError> {
        P::clear_hardware(self)
    }

    fn flush(&mut self, image: &Bitmap, dirty: Rect) -> Result<(), DriverError> {
        P::flush(self, image, dirty)
    }

    fn character_cells(&self) -> Option<(u32, u32)> {
        P::character_cells(self)
    }

    fn write_text(&mut self, col: u32, row: u32, text: &str) -> Result<(), DriverError> {
        P::write_text(self, col, row, text)
    }

    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        P::set_brightness(self, percent)
    }

    fn begin_scroll(&mut self, rect: Rect) -> Result<(), DriverError> {
        P::begin_scroll(self, rect)
    }

    fn scroll(&mut self, frame: &Bitmap, ticker: &Ticker) -> Result<(), DriverError> {
        P::scroll(self, frame, ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_per_model() {
        assert_eq!(Layout::of(PanelModel::El640x200Sk), Layout::PrefixRows);
        assert_eq!(Layout::of(PanelModel::Gd120c280), Layout::Columns);
        assert_eq!(Layout::of(PanelModel::Sed1520), Layout::Pages);
        assert_eq!(Layout::of(PanelModel::S20a), Layout::Characters);
    }

    #[test]
    fn test_diff_policy_per_model() {
        assert_eq!(diff_policy(PanelModel::Lcd4), DiffPolicy::FullFrame);
        assert_eq!(diff_policy(PanelModel::Gu311), DiffPolicy::Diff);
        assert_eq!(diff_policy(PanelModel::T6963c), DiffPolicy::Hinted);
    }
}
