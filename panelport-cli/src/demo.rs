//! Test patterns and the widget scheduler

use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, Timelike};
use clap::ValueEnum;
use color_eyre::Result;
use log::debug;
use panelport_core::{Bitmap, Rect};
use panelport_display::{Canvas, Clock, Compositor, Date, Panel, Widget};

use crate::hardware::ReportDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// 8x8 checkerboard
    Checker,
    /// 4 pixel wide vertical stripes
    Stripes,
    /// One pixel outline of the screen
    Border,
    /// Every pixel lit
    Fill,
}

pub fn pattern(kind: Pattern, width: u32, height: u32) -> Bitmap {
    let mut image = Bitmap::new(width, height);
    match kind {
        Pattern::Fill => image.fill(true),
        Pattern::Border => {
            image.fill_rect(Rect::new(0, 0, width, 1), true);
            image.fill_rect(Rect::new(0, height.saturating_sub(1), width, height), true);
            image.fill_rect(Rect::new(0, 0, 1, height), true);
            image.fill_rect(Rect::new(width.saturating_sub(1), 0, width, height), true);
        }
        Pattern::Checker | Pattern::Stripes => {
            for y in 0..height {
                for x in 0..width {
                    let on = match kind {
                        Pattern::Checker => (x / 8 + y / 8) % 2 == 0,
                        _ => (x / 4) % 2 == 0,
                    };
                    image.set(x, y, on);
                }
            }
        }
    }
    image
}

/// [`Clock`] following the local time
pub struct LiveClock(pub Clock);

impl Widget for LiveClock {
    fn rect(&self) -> Rect {
        self.0.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let now = Local::now();
        self.0.set_time(now.hour() as u8, now.minute() as u8);
        self.0.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.0.interval()
    }
}

/// [`Date`] following the local date
pub struct LiveDate(pub Date);

impl Widget for LiveDate {
    fn rect(&self) -> Rect {
        self.0.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let today = Local::now();
        self.0.set_date(
            today.weekday().num_days_from_monday() as u8,
            today.day() as u8,
            today.month() as u8,
            today.year(),
        );
        self.0.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.0.interval()
    }
}

/// Clock and date side by side on wide screens, stacked otherwise
pub fn clock_layout(width: u32, height: u32) -> Vec<Box<dyn Widget>> {
    let (clock, date) = if width >= 2 * height {
        let half = width / 2;
        (
            Rect::from_size(0, 0, half, height),
            Rect::from_size(half, 0, width - half, height),
        )
    } else {
        let half = height / 2;
        (
            Rect::from_size(0, 0, width, half),
            Rect::from_size(0, half, width, height - half),
        )
    };
    vec![
        Box::new(LiveClock(Clock::new(clock))),
        Box::new(LiveDate(Date::new(date))),
    ]
}

/// The clock as one text line, for character panels
pub fn clock_line() -> String {
    let now = Local::now();
    let mut clock = Clock::new(Rect::default());
    clock.set_time(now.hour() as u8, now.minute() as u8);
    let mut date = Date::new(Rect::default());
    date.set_date(
        now.weekday().num_days_from_monday() as u8,
        now.day() as u8,
        now.month() as u8,
        now.year(),
    );
    format!("{} {} {}", clock.text(), date.weekday_name(), date.date_line())
}

/// Re-render each widget whenever its interval has passed
///
/// Runs until `deadline`, or forever without one.
pub fn run_widgets<P: Panel>(
    display: &mut Compositor<P>,
    widgets: &mut [Box<dyn Widget>],
    deadline: Option<Instant>,
) -> Result<()> {
    let start = Instant::now();
    let mut due = vec![start; widgets.len()];
    loop {
        let now = Instant::now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            return Ok(());
        }
        for (widget, due) in widgets.iter_mut().zip(due.iter_mut()) {
            if now >= *due {
                display.widget(widget.as_mut()).report("widget refresh")?;
                *due = now + widget.interval();
            }
        }
        let next = due.iter().min().copied().unwrap_or(now + Duration::from_secs(1));
        let wake = deadline.map_or(next, |deadline| next.min(deadline));
        let nap = wake.saturating_duration_since(Instant::now());
        debug!("widgets idle for {:?}", nap);
        thread::sleep(nap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelport_display::{AfterClear, DriverError};

    #[test]
    fn test_checker_and_stripes() {
        let checker = pattern(Pattern::Checker, 32, 16);
        assert!(checker.get(0, 0));
        assert!(!checker.get(8, 0));
        assert!(!checker.get(0, 8));
        assert!(checker.get(8, 8));

        let stripes = pattern(Pattern::Stripes, 16, 2);
        assert!(stripes.get(3, 1));
        assert!(!stripes.get(4, 1));
        assert!(stripes.get(8, 0));
    }

    #[test]
    fn test_border_and_fill() {
        let border = pattern(Pattern::Border, 16, 8);
        assert!(border.get(0, 0) && border.get(15, 7) && border.get(7, 0) && border.get(0, 4));
        assert!(!border.get(7, 4));
        let fill = pattern(Pattern::Fill, 16, 8);
        assert_eq!(fill, Bitmap::filled(16, 8, true));
    }

    #[test]
    fn test_clock_layout_splits_screen() {
        let wide = clock_layout(256, 64);
        assert_eq!(wide[0].rect(), Rect::new(0, 0, 128, 64));
        assert_eq!(wide[1].rect(), Rect::new(128, 0, 256, 64));
        let tall = clock_layout(128, 64);
        assert_eq!(tall[0].rect(), Rect::new(0, 0, 128, 32));
        assert_eq!(tall[1].rect(), Rect::new(0, 32, 128, 64));
    }

    #[test]
    fn test_clock_line_shape() {
        let line = clock_line();
        assert!(line.contains(':'));
        assert_eq!(line.split(' ').count(), 5);
    }

    struct Counting {
        flushes: usize,
    }

    impl Panel for Counting {
        fn size(&self) -> (u32, u32) {
            (64, 32)
        }

        fn clear_hardware(&mut self) -> core::result::Result<AfterClear, DriverError> {
            Ok(AfterClear::Dark)
        }

        fn flush(&mut self, _image: &Bitmap, _dirty: Rect) -> core::result::Result<(), DriverError> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_widgets_render_once_before_deadline() {
        let mut display = Compositor::new(Counting { flushes: 0 }).unwrap();
        let mut widgets = clock_layout(64, 32);
        let deadline = Instant::now() + Duration::from_millis(50);
        run_widgets(&mut display, &mut widgets, Some(deadline)).unwrap();
        // Both intervals are longer than the run; the clock always draws
        assert!(display.panel().flushes >= 1);
        assert!(display.frame().as_bytes().iter().any(|&b| b != 0));
    }
}
