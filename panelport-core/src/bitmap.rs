//! 1-bit framebuffer
//!
//! Rows are packed most significant bit first and padded to a whole byte,
//! so row-wise controllers can take [`Bitmap::row_bytes`] unchanged. A set
//! bit is a lit pixel. Padding bits are always clear, which lets
//! [`diff_bbox`] compare whole bytes.

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::Rect;
use crate::traits::DriverError;

/// Monochrome image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// All-dark bitmap
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height as usize],
        }
    }

    /// Bitmap with every pixel set to `on`
    pub fn filled(width: u32, height: u32, on: bool) -> Self {
        let mut bitmap = Self::new(width, height);
        bitmap.fill(on);
        bitmap
    }

    /// Wrap packed rows
    ///
    /// `bytes` must hold exactly `ceil(width / 8) * height` bytes. Padding
    /// bits are cleared.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, DriverError> {
        let mut bitmap = Self::new(width, height);
        if bytes.len() != bitmap.data.len() {
            return Err(DriverError::InvalidArgument);
        }
        bitmap.data.copy_from_slice(bytes);
        bitmap.clear_padding();
        Ok(bitmap)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The whole image as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Pixel value; out of range reads as dark
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.stride + (x / 8) as usize;
        self.data[index] & (0x80 >> (x % 8)) != 0
    }

    /// Set a pixel; out of range writes are ignored
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.stride + (x / 8) as usize;
        let mask = 0x80 >> (x % 8);
        if on {
            self.data[index] |= mask;
        } else {
            self.data[index] &= !mask;
        }
    }

    /// Set every pixel
    pub fn fill(&mut self, on: bool) {
        self.data.fill(if on { 0xFF } else { 0x00 });
        self.clear_padding();
    }

    /// Set every pixel inside `rect`, clipped to the image
    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        let Some(rect) = rect.intersect(&self.bounds()) else {
            return;
        };
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                self.set(x, y, on);
            }
        }
    }

    /// Copy `src` with its top-left corner at `(x, y)`, clipped
    ///
    /// Returns the area actually written, `None` if nothing overlapped.
    pub fn paste(&mut self, x: i32, y: i32, src: &Bitmap) -> Option<Rect> {
        let src_w = clamp_i32(src.width);
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(src_w).min(clamp_i32(self.width));
        let bottom = y
            .saturating_add(clamp_i32(src.height))
            .min(clamp_i32(self.height));
        if right <= left || bottom <= top {
            return None;
        }

        if x % 8 == 0 && x >= 0 && right - left == src_w {
            // Byte aligned and unclipped horizontally: copy row slices
            let byte_x = (x / 8) as usize;
            let full = src.width as usize / 8;
            for dy in top..bottom {
                let sy = (dy - y) as usize;
                let src_row = &src.data[sy * src.stride..(sy + 1) * src.stride];
                let dst_start = dy as usize * self.stride + byte_x;
                self.data[dst_start..dst_start + full].copy_from_slice(&src_row[..full]);
                for sx in (full as u32 * 8)..src.width {
                    self.set(x as u32 + sx, dy as u32, src.get(sx, sy as u32));
                }
            }
        } else {
            for dy in top..bottom {
                for dx in left..right {
                    let on = src.get((dx - x) as u32, (dy - y) as u32);
                    self.set(dx as u32, dy as u32, on);
                }
            }
        }

        Some(Rect::new(left as u32, top as u32, right as u32, bottom as u32))
    }

    /// Copy out a region, clipped to the image
    pub fn crop(&self, rect: Rect) -> Bitmap {
        let rect = rect.intersect(&self.bounds()).unwrap_or_default();
        let mut out = Bitmap::new(rect.width(), rect.height());
        for y in 0..out.height {
            for x in 0..out.width {
                out.set(x, y, self.get(rect.left + x, rect.top + y));
            }
        }
        out
    }

    /// Packed bytes of rows `top..bottom`
    pub fn row_bytes(&self, top: u32, bottom: u32) -> &[u8] {
        let bottom = bottom.min(self.height) as usize;
        let top = (top as usize).min(bottom);
        &self.data[top * self.stride..bottom * self.stride]
    }

    /// All packed rows
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn clear_padding(&mut self) {
        let used = self.width % 8;
        if used == 0 || self.stride == 0 {
            return;
        }
        let mask = 0xFFu8 << (8 - used);
        for row in self.data.chunks_mut(self.stride) {
            if let Some(last) = row.last_mut() {
                *last &= mask;
            }
        }
    }
}

/// Bounding box of the pixels that differ between two frames
///
/// Bitmaps of different sizes differ everywhere; the larger bounds are
/// returned.
pub fn diff_bbox(a: &Bitmap, b: &Bitmap) -> Option<Rect> {
    if a.size() != b.size() {
        return Some(a.bounds().union(&b.bounds()));
    }

    let mut bbox: Option<Rect> = None;
    for (y, (ra, rb)) in a
        .data
        .chunks(a.stride.max(1))
        .zip(b.data.chunks(b.stride.max(1)))
        .enumerate()
    {
        let first = ra.iter().zip(rb).position(|(p, q)| p != q);
        let Some(first) = first else {
            continue;
        };
        let last = ra
            .iter()
            .zip(rb)
            .rposition(|(p, q)| p != q)
            .unwrap_or(first);

        let left = first as u32 * 8 + (ra[first] ^ rb[first]).leading_zeros();
        let right = last as u32 * 8 + 8 - (ra[last] ^ rb[last]).trailing_zeros();
        let row = Rect::new(left, y as u32, right, y as u32 + 1);
        bbox = Some(match bbox {
            Some(r) => r.union(&row),
            None => row,
        });
    }
    bbox
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
