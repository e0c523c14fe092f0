//! Scrolling text strip
//!
//! The strip is the rendered text with one window width of blank columns on
//! either side, so the text enters at the right edge and leaves at the left.
//! Step `n` shows strip columns `n..n + width`.
//!
//! ```text
//!   strip  |<-- blank -->|<---- text ---->|<-- blank -->|
//!   step 0 [=============]
//!   step n        [=============]
//! ```
//!
//! Panels with spare display memory scroll in hardware, see
//! [`Panel::begin_scroll`](crate::Panel::begin_scroll). Everything else
//! redraws the window through [`Widget::render`].

use core::time::Duration;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use panelport_core::{Bitmap, Rect};

use super::{fit_font_height, text_width, Widget};
use crate::canvas::Canvas;

pub struct Ticker {
    rect: Rect,
    strip: Bitmap,
    offset: u32,
    hardware: bool,
}

impl Ticker {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            strip: Bitmap::new(2 * rect.width(), rect.height()),
            offset: 0,
            hardware: false,
        }
    }

    /// Render `text` in the largest font that fits the strip height
    pub fn set_text(&mut self, text: &str) {
        let font = fit_font_height(self.rect.height());
        let mut image = Bitmap::new(text_width(font, text), self.rect.height());
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top)
            .draw(&mut Canvas::new(&mut image));
        self.set_strip(&image);
    }

    /// Scroll a prerendered image, clipped to the strip height; rewinds
    pub fn set_strip(&mut self, image: &Bitmap) {
        let w = self.rect.width();
        let mut strip = Bitmap::new(image.width() + 2 * w, self.rect.height());
        strip.paste(w as i32, 0, image);
        self.strip = strip;
        self.offset = 0;
    }

    /// Number of steps from the first blank window to the last
    pub fn steps(&self) -> u32 {
        self.strip.width() - self.rect.width() + 1
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn finished(&self) -> bool {
        self.offset >= self.steps()
    }

    pub fn advance(&mut self) {
        self.offset += 1;
    }

    pub fn rewind(&mut self) {
        self.offset = 0;
    }

    /// Strip columns shown at the current step
    pub fn window(&self) -> Bitmap {
        self.strip
            .crop(Rect::from_size(self.offset, 0, self.rect.width(), self.rect.height()))
    }

    /// Rightmost column of [`Ticker::window`], the one that just scrolled in
    pub fn leading_column(&self) -> Bitmap {
        let x = self.offset + self.rect.width().saturating_sub(1);
        self.strip.crop(Rect::from_size(x, 0, 1, self.rect.height()))
    }

    /// Whether the panel scrolls this ticker in hardware
    pub fn hardware(&self) -> bool {
        self.hardware
    }

    pub(crate) fn set_hardware(&mut self, hardware: bool) {
        self.hardware = hardware;
    }
}

impl Widget for Ticker {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let window = self.window();
        canvas.bitmap_mut().paste(0, 0, &window);
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> Ticker {
        let mut ticker = Ticker::new(Rect::from_size(0, 8, 16, 8));
        ticker.set_strip(&Bitmap::filled(4, 8, true));
        ticker
    }

    #[test]
    fn test_text_enters_right_and_leaves_left() {
        let mut ticker = ticker();
        assert_eq!(ticker.steps(), 4 + 16 + 1);
        assert_eq!(ticker.window(), Bitmap::new(16, 8));

        ticker.advance();
        assert!(ticker.window().get(15, 0));
        assert!(!ticker.window().get(14, 0));
        assert_eq!(ticker.leading_column(), Bitmap::filled(1, 8, true));

        while ticker.offset() < ticker.steps() - 1 {
            ticker.advance();
        }
        assert_eq!(ticker.window(), Bitmap::new(16, 8));
        assert!(!ticker.finished());
        ticker.advance();
        assert!(ticker.finished());
    }

    #[test]
    fn test_set_text_rewinds_and_fits_height() {
        let mut ticker = ticker();
        ticker.advance();
        ticker.set_text("news");
        assert_eq!(ticker.offset(), 0);
        // 5x8 font: four glyphs of five pixels
        assert_eq!(ticker.steps(), 20 + 16 + 1);
        while ticker.offset() < 20 {
            ticker.advance();
        }
        assert!(ticker.window().as_bytes().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_render_draws_window() {
        let mut ticker = ticker();
        for _ in 0..4 {
            ticker.advance();
        }
        let mut bitmap = Bitmap::new(16, 8);
        ticker.render(&mut Canvas::new(&mut bitmap));
        assert_eq!(bitmap, ticker.window());
        assert!(bitmap.get(12, 7));
    }
}
