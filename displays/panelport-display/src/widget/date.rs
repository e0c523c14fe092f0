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

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Weekday over `dd Mon yyyy`
pub struct Date {
    rect: Rect,
    font: &'static MonoFont<'static>,
    weekday: u8,
    day: u8,
    month: u8,
    year: i32,
}

impl Date {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            font: fit_font("Wednesday", rect.width()),
            weekday: 0,
            day: 1,
            month: 1,
            year: 2000,
        }
    }

    /// `weekday` counts from Monday = 0, `month` from January = 1
    pub fn set_date(&mut self, weekday: u8, day: u8, month: u8, year: i32) {
        self.weekday = weekday % 7;
        self.day = day;
        self.month = month.clamp(1, 12);
        self.year = year;
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAYS[self.weekday as usize]
    }

    pub fn date_line(&self) -> String<16> {
        let mut s = String::new();
        let month = MONTHS[self.month as usize - 1];
        let _ = write!(s, "{:02} {} {}", self.day, month, self.year);
        s
    }
}

impl Widget for Date {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let second = (self.rect.height() * 5 / 11) as i32;
        let _ = Text::with_baseline(self.weekday_name(), Point::new(0, 1), style, Baseline::Top)
            .draw(canvas);
        let _ = Text::with_baseline(&self.date_line(), Point::new(0, second), style, Baseline::Top)
            .draw(canvas);
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_lines() {
        let mut date = Date::new(Rect::from_size(0, 0, 100, 40));
        date.set_date(2, 7, 3, 2006);
        assert_eq!(date.weekday_name(), "Wednesday");
        assert_eq!(date.date_line(), "07 Mar 2006");
    }
}
