//! Widgets: self-contained regions re-rendered on a timer

use core::time::Duration;

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_8X13, FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::MonoFont;
use panelport_core::Rect;

use crate::canvas::Canvas;

mod clock;
mod date;
mod sysstat;
mod ticker;
mod truchet;

pub use clock::Clock;
pub use date::Date;
pub use sysstat::{Chart, CpuModel, Gauge, Reading, Usage, UsageList};
pub use ticker::Ticker;
pub use truchet::Truchet;

/// Something that draws itself into a fixed rectangle
pub trait Widget {
    /// Screen area, in pixels
    fn rect(&self) -> Rect;

    /// Draw onto a canvas the size of [`Widget::rect`], initially dark
    fn render(&mut self, canvas: &mut Canvas<'_>);

    /// How often the content changes
    fn interval(&self) -> Duration;
}

/// Largest to smallest
const FONTS: [&MonoFont<'static>; 6] = [
    &FONT_10X20,
    &FONT_9X18_BOLD,
    &FONT_8X13,
    &FONT_6X10,
    &FONT_5X8,
    &FONT_4X6,
];

/// Rendered width of `text` in `font`
fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let n = text.chars().count() as u32;
    n * (font.character_size.width + font.character_spacing)
}

/// Largest font that renders `sample` narrower than `width`
fn fit_font(sample: &str, width: u32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .copied()
        .find(|font| text_width(font, sample) < width)
        .unwrap_or(&FONT_4X6)
}

/// Largest font no taller than `height`
fn fit_font_height(height: u32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .copied()
        .find(|font| font.character_size.height <= height)
        .unwrap_or(&FONT_4X6)
}
