use core::fmt::Write;
use core::time::Duration;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use panelport_core::Rect;

use super::{fit_font, Widget};
use crate::canvas::Canvas;

/// 12-hour `h:mm`
pub struct Clock {
    rect: Rect,
    font: &'static MonoFont<'static>,
    hour: u8,
    minute: u8,
}

impl Clock {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            font: fit_font("12:55", rect.width()),
            hour: 0,
            minute: 0,
        }
    }

    /// `hour` on the 24-hour clock
    pub fn set_time(&mut self, hour: u8, minute: u8) {
        self.hour = hour % 24;
        self.minute = minute % 60;
    }

    pub fn text(&self) -> String<5> {
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let mut s = String::new();
        let _ = write!(s, "{}:{:02}", hour, self.minute);
        s
    }
}

impl Widget for Clock {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let _ = Text::with_baseline(&self.text(), Point::zero(), style, Baseline::Top).draw(canvas);
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelport_core::Bitmap;

    #[test]
    fn test_twelve_hour_format() {
        let mut clock = Clock::new(Rect::from_size(0, 0, 64, 20));
        clock.set_time(0, 5);
        assert_eq!(clock.text(), "12:05");
        clock.set_time(13, 45);
        assert_eq!(clock.text(), "1:45");
        clock.set_time(12, 0);
        assert_eq!(clock.text(), "12:00");
    }

    #[test]
    fn test_render_draws_something() {
        let mut clock = Clock::new(Rect::from_size(0, 0, 64, 20));
        clock.set_time(9, 30);
        let mut bitmap = Bitmap::new(64, 20);
        clock.render(&mut Canvas::new(&mut bitmap));
        assert!(bitmap.as_bytes().iter().any(|&b| b != 0));
    }
}
