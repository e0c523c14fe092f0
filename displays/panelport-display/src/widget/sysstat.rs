//! System gauges
//!
//! Charts with a title and a reading beside them, and lists of usage bars.
//! The numbers come from the host; these widgets only draw.
//!
//! ```text
//!   ┌─┐ load avg        ╭───╮ cpu busy       /home: 12 / 40 GB free
//!   │ │ 0.42            │ ◣ │ 37%            [######          ]
//!   │█│                 ╰───╯
//!   └─┘
//! ```

use alloc::vec::Vec;
use core::fmt::Write;
use core::time::Duration;

use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10, FONT_8X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle, Sector};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use panelport_core::Rect;

use super::Widget;
use crate::canvas::Canvas;

/// Chart diameter or bar height, in pixels
const CHART: u32 = 25;
const BAR_WIDTH: u32 = 9;
/// Vertical pitch of [`UsageList`] entries
const USAGE_PITCH: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Pie,
    Bar,
}

/// One sampled value and the scale it is drawn against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// One minute load average; the bar is full at 2
    LoadAverage(f32),
    /// Percent of CPU time not idle
    CpuBusy(f32),
    /// Scaled from 15 C up to the critical trip point
    CpuTemperature { celsius: i32, critical: i32 },
    MemoryFree { free_mb: u64, total_mb: u64 },
    DiskUsed { used_gb: u64, total_gb: u64 },
}

impl Reading {
    pub fn title(&self) -> &'static str {
        match self {
            Reading::LoadAverage(_) => "load avg",
            Reading::CpuBusy(_) => "cpu busy",
            Reading::CpuTemperature { .. } => "cpu temp",
            Reading::MemoryFree { .. } => "mem free (MB)",
            Reading::DiskUsed { .. } => "disk used",
        }
    }

    pub fn chart(&self) -> Chart {
        match self {
            Reading::LoadAverage(_) | Reading::CpuTemperature { .. } => Chart::Bar,
            _ => Chart::Pie,
        }
    }

    pub fn text(&self) -> String<24> {
        let mut s = String::new();
        let _ = match *self {
            Reading::LoadAverage(load) => write!(s, "{:.2}", load),
            Reading::CpuBusy(percent) => write!(s, "{}%", percent as u32),
            Reading::CpuTemperature { celsius, .. } => write!(s, "{} C", celsius),
            Reading::MemoryFree { free_mb, total_mb } => write!(s, "{}/{}", free_mb, total_mb),
            Reading::DiskUsed { used_gb, total_gb } => write!(s, "{} / {} GB", used_gb, total_gb),
        };
        s
    }

    /// Position on the chart's scale, `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        match *self {
            Reading::LoadAverage(load) => scale(load, 0.0, 2.0),
            Reading::CpuBusy(percent) => scale(percent, 0.0, 100.0),
            Reading::CpuTemperature { celsius, critical } => {
                scale(celsius as f32, 15.0, critical as f32)
            }
            Reading::MemoryFree { free_mb, total_mb } => scale(free_mb as f32, 0.0, total_mb as f32),
            Reading::DiskUsed { used_gb, total_gb } => scale(used_gb as f32, 0.0, total_gb as f32),
        }
    }
}

fn scale(value: f32, min: f32, max: f32) -> f32 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

fn label(canvas: &mut Canvas<'_>, font: &MonoFont<'_>, at: Point, text: &str) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    let _ = Text::with_baseline(text, at, style, Baseline::Top).draw(canvas);
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

fn fill() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_fill(BinaryColor::On)
}

/// Outlined circle, filled clockwise up to 3 o'clock
fn pie(canvas: &mut Canvas<'_>, fraction: f32) {
    let _ = Circle::new(Point::zero(), CHART).into_styled(stroke()).draw(canvas);
    if fraction > 0.0 {
        let sweep = 360.0 * fraction;
        let _ = Sector::new(Point::zero(), CHART, (360.0 - sweep).deg(), sweep.deg())
            .into_styled(fill())
            .draw(canvas);
    }
}

/// Outlined column, filled from the bottom
fn bar(canvas: &mut Canvas<'_>, fraction: f32) {
    let _ = Rectangle::new(Point::zero(), Size::new(BAR_WIDTH, CHART))
        .into_styled(stroke())
        .draw(canvas);
    let level = ((CHART - 1) as f32 * (1.0 - fraction)) as u32;
    let _ = Rectangle::new(Point::new(0, level as i32), Size::new(BAR_WIDTH, CHART - level))
        .into_styled(fill())
        .draw(canvas);
}

/// A [`Reading`] drawn as its chart
pub struct Gauge {
    rect: Rect,
    title: Option<String<32>>,
    reading: Option<Reading>,
    interval: Duration,
}

impl Gauge {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            title: None,
            reading: None,
            interval: Duration::from_secs(2),
        }
    }

    /// Replace the reading's own title; cut to 32 bytes
    pub fn with_title(mut self, title: &str) -> Self {
        let mut s = String::new();
        for c in title.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        self.title = Some(s);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set(&mut self, reading: Reading) {
        self.reading = Some(reading);
    }

    pub fn reading(&self) -> Option<Reading> {
        self.reading
    }
}

impl Widget for Gauge {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let Some(reading) = self.reading else {
            return;
        };
        let text_x = match reading.chart() {
            Chart::Pie => {
                pie(canvas, reading.fraction());
                CHART + 5
            }
            Chart::Bar => {
                bar(canvas, reading.fraction());
                BAR_WIDTH + 7
            }
        } as i32;
        let title = self.title.as_deref().unwrap_or(reading.title());
        label(canvas, &FONT_5X8, Point::new(text_x, 0), title);
        label(canvas, &FONT_8X13, Point::new(text_x, 9), &reading.text());
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Used part of some capacity, e.g. swap or a mounted file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub label: String<24>,
    pub used: u64,
    pub total: u64,
    pub unit: &'static str,
}

impl Usage {
    /// `label` is cut to 24 bytes
    pub fn new(label: &str, used: u64, total: u64, unit: &'static str) -> Self {
        let mut s = String::new();
        for c in label.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self {
            label: s,
            used,
            total,
            unit,
        }
    }

    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }
}

/// A line of text and a horizontal bar per [`Usage`]
pub struct UsageList {
    rect: Rect,
    entries: Vec<Usage>,
    hide_unused: bool,
    interval: Duration,
}

impl UsageList {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            entries: Vec::new(),
            hide_unused: false,
            interval: Duration::from_secs(10),
        }
    }

    /// Leave out entries with nothing used
    pub fn hide_unused(mut self) -> Self {
        self.hide_unused = true;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set(&mut self, entries: Vec<Usage>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[Usage] {
        &self.entries
    }
}

impl Widget for UsageList {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        let bar_width = self.rect.width().saturating_sub(8);
        let shown = self
            .entries
            .iter()
            .filter(|usage| !self.hide_unused || usage.used > 0);
        for (row, usage) in shown.enumerate() {
            let y = row as u32 * USAGE_PITCH;
            if y >= self.rect.height() {
                break;
            }
            let mut text: String<64> = String::new();
            let _ = write!(
                text,
                "{}: {} / {} {} free",
                usage.label,
                usage.free(),
                usage.total,
                usage.unit
            );
            label(canvas, &FONT_5X8, Point::new(0, y as i32), &text);

            let top = y as i32 + 10;
            let _ = Rectangle::new(Point::new(0, top), Size::new(bar_width, 5))
                .into_styled(stroke())
                .draw(canvas);
            let used = if usage.total == 0 {
                0
            } else {
                (usage.used.min(usage.total) * bar_width as u64 / usage.total) as u32
            };
            let _ = Rectangle::new(Point::new(0, top), Size::new(used, 5))
                .into_styled(fill())
                .draw(canvas);
        }
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Processor model and clock
pub struct CpuModel {
    rect: Rect,
    model: String<48>,
    mhz: u32,
}

impl CpuModel {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            model: String::new(),
            mhz: 0,
        }
    }

    /// `model` is cut to 48 bytes
    pub fn set(&mut self, model: &str, mhz: u32) {
        self.model.clear();
        for c in model.chars() {
            if self.model.push(c).is_err() {
                break;
            }
        }
        self.mhz = mhz;
    }
}

impl Widget for CpuModel {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        label(canvas, &FONT_6X10, Point::zero(), &self.model);
        let mut speed: String<16> = String::new();
        let _ = write!(speed, "{} MHz", self.mhz);
        label(canvas, &FONT_6X10, Point::new(0, 12), &speed);
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use panelport_core::Bitmap;

    fn render(widget: &mut dyn Widget) -> Bitmap {
        let rect = widget.rect();
        let mut bitmap = Bitmap::new(rect.width(), rect.height());
        widget.render(&mut Canvas::new(&mut bitmap));
        bitmap
    }

    #[test]
    fn test_reading_text_and_scale() {
        let load = Reading::LoadAverage(0.5);
        assert_eq!(load.text(), "0.50");
        assert_eq!(load.fraction(), 0.25);
        assert_eq!(load.chart(), Chart::Bar);
        assert_eq!(Reading::LoadAverage(7.0).fraction(), 1.0);

        let temp = Reading::CpuTemperature { celsius: 55, critical: 95 };
        assert_eq!(temp.text(), "55 C");
        assert_eq!(temp.fraction(), 0.5);
        assert_eq!(Reading::CpuTemperature { celsius: 10, critical: 95 }.fraction(), 0.0);

        assert_eq!(Reading::CpuBusy(37.8).text(), "37%");
        let mem = Reading::MemoryFree { free_mb: 512, total_mb: 2048 };
        assert_eq!(mem.text(), "512/2048");
        assert_eq!(mem.fraction(), 0.25);
        assert_eq!(Reading::DiskUsed { used_gb: 3, total_gb: 0 }.fraction(), 0.0);
        assert_eq!(Reading::DiskUsed { used_gb: 3, total_gb: 40 }.text(), "3 / 40 GB");
    }

    #[test]
    fn test_gauge_blank_until_set() {
        let mut gauge = Gauge::new(Rect::from_size(0, 0, 96, 26));
        assert_eq!(render(&mut gauge), Bitmap::new(96, 26));
    }

    #[test]
    fn test_bar_fills_from_bottom() {
        let mut gauge = Gauge::new(Rect::from_size(0, 0, 96, 26));
        gauge.set(Reading::LoadAverage(1.0));
        let bitmap = render(&mut gauge);
        // half full: inside dark above the level, lit below
        assert!(!bitmap.get(4, 5));
        assert!(bitmap.get(4, 20));
        assert!(bitmap.get(0, 0) && bitmap.get(8, 24));
    }

    #[test]
    fn test_full_pie_is_solid() {
        let mut gauge = Gauge::new(Rect::from_size(0, 0, 96, 26)).with_title("sda1 used");
        gauge.set(Reading::DiskUsed { used_gb: 40, total_gb: 40 });
        let bitmap = render(&mut gauge);
        assert!(bitmap.get(12, 12) && bitmap.get(6, 12) && bitmap.get(12, 18));
        gauge.set(Reading::DiskUsed { used_gb: 0, total_gb: 40 });
        let empty = render(&mut gauge);
        assert!(!empty.get(12, 12));
    }

    #[test]
    fn test_usage_bars_and_hidden_entries() {
        let mut list = UsageList::new(Rect::from_size(0, 0, 108, 36));
        list.set(vec![
            Usage::new("/", 50, 100, "GB"),
            Usage::new("/home", 0, 100, "GB"),
        ]);
        assert_eq!(list.entries()[0].free(), 50);
        let bitmap = render(&mut list);
        // bar 100 wide, half of it filled
        assert!(bitmap.get(49, 12));
        assert!(!bitmap.get(51, 12));
        assert!(bitmap.get(99, 10));
        // second entry drawn with an empty bar
        assert!(bitmap.get(0, USAGE_PITCH + 12));
        assert!(!bitmap.get(10, USAGE_PITCH + 12));

        let mut swap = UsageList::new(Rect::from_size(0, 0, 108, 18)).hide_unused();
        swap.set(vec![Usage::new("swap", 0, 2047, "MB")]);
        assert_eq!(render(&mut swap), Bitmap::new(108, 18));
    }

    #[test]
    fn test_cpu_model_lines() {
        let mut cpu = CpuModel::new(Rect::from_size(0, 0, 120, 22));
        cpu.set("AMD Athlon(tm) 64 Processor 3200+", 2000);
        let bitmap = render(&mut cpu);
        assert!(bitmap.row_bytes(0, 10).iter().any(|&b| b != 0));
        assert!(bitmap.row_bytes(12, 22).iter().any(|&b| b != 0));
    }
}
