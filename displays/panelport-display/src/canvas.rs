//! embedded-graphics draw target over a [`Bitmap`]

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use panelport_core::Bitmap;

/// Drawing surface; pixels outside the bitmap are clipped
pub struct Canvas<'a> {
    bitmap: &'a mut Bitmap,
}

impl<'a> Canvas<'a> {
    pub fn new(bitmap: &'a mut Bitmap) -> Self {
        Self { bitmap }
    }

    pub fn bitmap(&self) -> &Bitmap {
        self.bitmap
    }

    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        self.bitmap
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        let (w, h) = self.bitmap.size();
        Size::new(w, h)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.bitmap.size();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < w && y < h {
                self.bitmap.set(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.bitmap.fill(color.is_on());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_clips_outside_pixels() {
        let mut bitmap = Bitmap::new(8, 4);
        let mut canvas = Canvas::new(&mut bitmap);
        Line::new(Point::new(-4, 1), Point::new(12, 1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(bitmap.row_bytes(1, 2), [0xFF]);
        assert_eq!(bitmap.row_bytes(0, 1), [0x00]);
    }

    #[test]
    fn test_clear_fills() {
        let mut bitmap = Bitmap::new(10, 2);
        Canvas::new(&mut bitmap).clear(BinaryColor::On).unwrap();
        assert!(bitmap.get(9, 1));
        assert_eq!(Canvas::new(&mut bitmap).size(), Size::new(10, 2));
    }
}
