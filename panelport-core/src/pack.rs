//! Controller memory layouts
//!
//! Display controllers address their RAM in one of three orders. Each
//! packer takes a region of the framebuffer and emits the bytes in the
//! order the controller auto-increments through them.
//!
//! ```text
//! rows     byte = 8 pixels across, MSB left      T6963C, SED1330, EL panels
//! columns  byte = 8 pixels down, MSB top         GU3900, GU7000, GU300
//! page     byte = 8 pixels down, LSB top         KS0108, SED1520, GU311
//! ```

use alloc::vec::Vec;

use crate::bitmap::Bitmap;

/// Rows `top..bottom` at full width
pub fn rows(bitmap: &Bitmap, top: u32, bottom: u32) -> Vec<u8> {
    bitmap.row_bytes(top, bottom).to_vec()
}

/// Memory address of row `top` in a row-wise controller
pub fn row_address(top: u32, width: u32) -> u32 {
    top * width.div_ceil(8)
}

/// Bytes per column in a column-wise controller
pub fn column_height_bytes(height: u32) -> u32 {
    height.div_ceil(8)
}

/// Columns `left..right`, each as `ceil(H / 8)` bytes with the top pixel in
/// the MSB of the first byte
pub fn columns(bitmap: &Bitmap, left: u32, right: u32) -> Vec<u8> {
    let right = right.min(bitmap.width());
    let per_column = column_height_bytes(bitmap.height());
    let mut out = Vec::with_capacity((right.saturating_sub(left) * per_column) as usize);
    for x in left..right {
        for band in 0..per_column {
            let mut byte = 0u8;
            for bit in 0..8 {
                if bitmap.get(x, band * 8 + bit) {
                    byte |= 0x80 >> bit;
                }
            }
            out.push(byte);
        }
    }
    out
}

/// Memory address of column `left` in a column-wise controller
pub fn column_address(left: u32, height: u32) -> u32 {
    left * column_height_bytes(height)
}

/// One byte per column of page `page` (rows `8p..8p+8`), top pixel in the LSB
pub fn page(bitmap: &Bitmap, page: u32, left: u32, right: u32) -> Vec<u8> {
    let right = right.min(bitmap.width());
    (left..right)
        .map(|x| page_byte(bitmap, page, x))
        .collect()
}

/// The vertical byte at column `x` of page `page`
pub fn page_byte(bitmap: &Bitmap, page: u32, x: u32) -> u8 {
    let mut byte = 0u8;
    for bit in 0..8 {
        if bitmap.get(x, page * 8 + bit) {
            byte |= 1 << bit;
        }
    }
    byte
}

/// Split bytes into 4-bit values, high nibble first
pub fn nibbles(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bytes.iter().flat_map(|b| [b >> 4, b & 0x0F])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rows() {
        let mut b = Bitmap::new(16, 4);
        b.set(0, 2, true);
        assert_eq!(rows(&b, 2, 3), [0x80, 0x00]);
        assert_eq!(row_address(2, 16), 4);
    }

    #[test]
    fn test_columns_msb_top() {
        let mut b = Bitmap::new(4, 16);
        b.set(1, 0, true);
        b.set(1, 15, true);
        b.set(2, 9, true);
        let packed = columns(&b, 0, 4);
        assert_eq!(packed, [0x00, 0x00, 0x80, 0x01, 0x00, 0x40, 0x00, 0x00]);
        assert_eq!(column_address(2, 16), 4);
    }

    #[test]
    fn test_page_lsb_top() {
        let mut b = Bitmap::new(8, 16);
        b.set(0, 8, true);
        b.set(0, 15, true);
        b.set(3, 9, true);
        assert_eq!(page(&b, 1, 0, 4), [0x81, 0x00, 0x00, 0x02]);
        assert_eq!(page(&b, 0, 0, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn test_page_matches_diagonal_tile() {
        // Truchet square tile, one row per byte
        let tile = [0x08, 0x04, 0x02, 0x01, 0x80, 0x40, 0x20, 0x10];
        let b = Bitmap::from_bytes(8, 8, &tile).unwrap();
        assert_eq!(page(&b, 0, 0, 8), [0x10, 0x20, 0x40, 0x80, 0x01, 0x02, 0x04, 0x08]);
    }

    #[test]
    fn test_nibbles() {
        let out: Vec<u8> = nibbles(&[0xA5, 0x0F]).collect();
        assert_eq!(out, [0x0A, 0x05, 0x00, 0x0F]);
    }

    proptest! {
        #[test]
        fn test_columns_preserve_pixels(
            seed in proptest::collection::vec(proptest::num::u8::ANY, 32),
        ) {
            let b = Bitmap::from_bytes(16, 16, &seed).unwrap();
            let packed = columns(&b, 0, 16);
            prop_assert_eq!(packed.len(), 32);
            for x in 0..16u32 {
                for y in 0..16u32 {
                    let byte = packed[(x * 2 + y / 8) as usize];
                    prop_assert_eq!(byte & (0x80 >> (y % 8)) != 0, b.get(x, y));
                }
            }
        }
    }
}
