//! Dirty-rectangle compositor
//!
//! Keeps a copy of what the glass shows. Every drawing operation works on a
//! copy of that frame, then [`Compositor::refresh`] sends the difference and
//! adopts the copy once the panel accepted it.
//!
//! # Usage
//!
//! ```ignore
//! let mut display = Compositor::new(panel)?;
//! display.text(Point::new(0, 0), "Hello")?;
//! display.rectangle(Rectangle::new(Point::new(0, 12), Size::new(40, 8)), true)?;
//! ```

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Arc, Ellipse, Line, Polyline, PrimitiveStyle, Rectangle,
};
use embedded_graphics::text::{Baseline, Text};
use log::debug;
use panelport_core::{diff_bbox, Bitmap, DriverError, Rect};

use crate::canvas::Canvas;
use crate::panel::{AfterClear, DiffPolicy, Panel};
use crate::widget::{Ticker, Widget};

pub struct Compositor<P> {
    panel: P,
    frame: Bitmap,
}

impl<P: Panel> Compositor<P> {
    /// Take over `panel` and clear it
    pub fn new(panel: P) -> Result<Self, DriverError> {
        let (w, h) = panel.size();
        let mut compositor = Self {
            panel,
            frame: Bitmap::filled(w, h, true),
        };
        compositor.clear()?;
        Ok(compositor)
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Frame currently on the glass
    pub fn frame(&self) -> &Bitmap {
        &self.frame
    }

    pub fn size(&self) -> (u32, u32) {
        self.frame.size()
    }

    pub fn into_panel(self) -> P {
        self.panel
    }

    /// Wipe the panel and repaint it dark
    pub fn clear(&mut self) -> Result<(), DriverError> {
        let (w, h) = self.frame.size();
        match self.panel.clear_hardware()? {
            AfterClear::Dark => {
                self.frame = Bitmap::new(w, h);
                Ok(())
            }
            AfterClear::Repaint => {
                // Every pixel differs from an all-lit frame
                self.frame = Bitmap::filled(w, h, true);
                self.refresh(Bitmap::new(w, h), None)
            }
        }
    }

    /// Show `image`, sending only what changed
    ///
    /// `hint` names the region that changed, for panels that trust it.
    /// `image` must match the panel size.
    pub fn refresh(&mut self, image: Bitmap, hint: Option<Rect>) -> Result<(), DriverError> {
        if image.size() != self.frame.size() {
            return Err(DriverError::InvalidArgument);
        }
        let bounds = self.frame.bounds();
        let dirty = match (self.panel.diff_policy(), hint) {
            (DiffPolicy::Hinted, Some(hint)) => hint.intersect(&bounds),
            _ => diff_bbox(&self.frame, &image),
        };
        let Some(dirty) = dirty else {
            return Ok(());
        };
        let dirty = match self.panel.diff_policy() {
            DiffPolicy::FullFrame => bounds,
            _ => dirty,
        };
        debug!("refresh {:?}", dirty);
        self.panel.flush(&image, dirty)?;
        self.frame = image;
        Ok(())
    }

    /// Paste `bitmap` with its top left corner at `at`
    pub fn bitmap(&mut self, at: (i32, i32), bitmap: &Bitmap) -> Result<(), DriverError> {
        let mut image = self.frame.clone();
        let Some(pasted) = image.paste(at.0, at.1, bitmap) else {
            return Ok(());
        };
        self.refresh(image, Some(pasted))
    }

    /// Arbitrary drawing on a copy of the frame
    pub fn draw<F>(&mut self, f: F) -> Result<(), DriverError>
    where
        F: FnOnce(&mut Canvas<'_>),
    {
        let mut image = self.frame.clone();
        f(&mut Canvas::new(&mut image));
        self.refresh(image, None)
    }

    /// Text with its top left corner at `at`
    ///
    /// Character panels take `at` as a cell position and print directly.
    pub fn text(&mut self, at: Point, text: &str) -> Result<(), DriverError> {
        if self.panel.character_cells().is_some() {
            let col = u32::try_from(at.x).map_err(|_| DriverError::InvalidArgument)?;
            let row = u32::try_from(at.y).map_err(|_| DriverError::InvalidArgument)?;
            return self.panel.write_text(col, row, text);
        }
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        self.draw(|canvas| {
            let _ = Text::with_baseline(text, at, style, Baseline::Top).draw(canvas);
        })
    }

    pub fn line(&mut self, start: Point, end: Point) -> Result<(), DriverError> {
        self.draw(|canvas| {
            let _ = Line::new(start, end).into_styled(stroke()).draw(canvas);
        })
    }

    pub fn rectangle(&mut self, rect: Rectangle, fill: bool) -> Result<(), DriverError> {
        self.draw(|canvas| {
            let _ = rect.into_styled(style(fill)).draw(canvas);
        })
    }

    pub fn ellipse(&mut self, bounds: Rectangle, fill: bool) -> Result<(), DriverError> {
        self.draw(|canvas| {
            let _ = Ellipse::new(bounds.top_left, bounds.size)
                .into_styled(style(fill))
                .draw(canvas);
        })
    }

    pub fn point(&mut self, at: Point) -> Result<(), DriverError> {
        self.draw(|canvas| {
            let _ = Pixel(at, BinaryColor::On).draw(canvas);
        })
    }

    /// Closed outline through `points`
    pub fn polygon(&mut self, points: &[Point]) -> Result<(), DriverError> {
        let Some(&first) = points.first() else {
            return Ok(());
        };
        let mut closed = alloc::vec::Vec::with_capacity(points.len() + 1);
        closed.extend_from_slice(points);
        closed.push(first);
        self.draw(|canvas| {
            let _ = Polyline::new(&closed).into_styled(stroke()).draw(canvas);
        })
    }

    /// Arc inside the circle of `diameter` at `top_left`, angles in degrees
    pub fn arc(
        &mut self,
        top_left: Point,
        diameter: u32,
        start_deg: f32,
        sweep_deg: f32,
    ) -> Result<(), DriverError> {
        self.draw(|canvas| {
            let _ = Arc::new(top_left, diameter, start_deg.deg(), sweep_deg.deg())
                .into_styled(stroke())
                .draw(canvas);
        })
    }

    /// Render `widget` into its rectangle
    pub fn widget<W: Widget + ?Sized>(&mut self, widget: &mut W) -> Result<(), DriverError> {
        let rect = widget.rect();
        let mut image = Bitmap::new(rect.width(), rect.height());
        widget.render(&mut Canvas::new(&mut image));
        self.bitmap((rect.left as i32, rect.top as i32), &image)
    }

    /// Rewind `ticker` and scroll it in hardware if the panel can
    pub fn start_ticker(&mut self, ticker: &mut Ticker) -> Result<(), DriverError> {
        ticker.rewind();
        match self.panel.begin_scroll(ticker.rect()) {
            Ok(()) => ticker.set_hardware(true),
            Err(DriverError::Unsupported) => ticker.set_hardware(false),
            Err(e) => return Err(e),
        }
        debug!("ticker {:?}, hardware {}", ticker.rect(), ticker.hardware());
        Ok(())
    }

    /// Show the ticker's current step and advance it
    ///
    /// Returns `false`, sending nothing, once the text has scrolled out.
    pub fn step_ticker(&mut self, ticker: &mut Ticker) -> Result<bool, DriverError> {
        if ticker.finished() {
            return Ok(false);
        }
        if ticker.hardware() {
            self.panel.scroll(&self.frame, ticker)?;
        } else {
            self.widget(ticker)?;
        }
        ticker.advance();
        Ok(true)
    }
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

fn style(fill: bool) -> PrimitiveStyle<BinaryColor> {
    if fill {
        PrimitiveStyle::with_fill(BinaryColor::On)
    } else {
        stroke()
    }
}
