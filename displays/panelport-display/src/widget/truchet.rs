//! Truchet tiler
//!
//! Covers the screen with randomly chosen 8x8 tiles, one tile set per pass.
//! Every tile is its own `bitmap` call, which makes this a good stress test
//! of small-region refresh.

use alloc::vec::Vec;

use log::debug;
use panelport_core::{Bitmap, DriverError};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::compositor::Compositor;
use crate::panel::Panel;

type Tile = [u8; 8];
type TileSet = [Tile; 2];

const SQUARE: TileSet = [
    [0x08, 0x04, 0x02, 0x01, 0x80, 0x40, 0x20, 0x10],
    [0x10, 0x20, 0x40, 0x80, 0x01, 0x02, 0x04, 0x08],
];
const ROUND: TileSet = [
    [0x08, 0x08, 0x04, 0x03, 0xC0, 0x20, 0x10, 0x10],
    [0x10, 0x10, 0x20, 0xC0, 0x03, 0x04, 0x08, 0x08],
];
const BINARY: TileSet = [
    [0x00, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x00],
    [0x00, 0x18, 0x24, 0x24, 0x24, 0x24, 0x18, 0x00],
];
const DOTS_CENTER: TileSet = [
    [0x00, 0x00, 0x00, 0x18, 0x18, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0x18, 0x3C, 0x3C, 0x18, 0x00, 0x00],
];
const DOTS_TOP_RIGHT: TileSet = [
    [0x00, 0x06, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00],
    [0x06, 0x0F, 0x0F, 0x06, 0x00, 0x00, 0x00, 0x00],
];
const DOTS_BOTTOM_RIGHT: TileSet = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x06, 0x00],
    [0x00, 0x00, 0x00, 0x00, 0x06, 0x0F, 0x0F, 0x06],
];
const DOTS_TOP_LEFT: TileSet = [
    [0x00, 0x60, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00],
    [0x60, 0xF0, 0xF0, 0x60, 0x00, 0x00, 0x00, 0x00],
];
const DOTS_BOTTOM_LEFT: TileSet = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x60, 0x60, 0x00],
    [0x00, 0x00, 0x00, 0x00, 0x60, 0xF0, 0xF0, 0x60],
];
const EMPTY: Tile = [0; 8];

const TILE_SETS: [TileSet; 8] = [
    BINARY,
    DOTS_CENTER,
    DOTS_TOP_RIGHT,
    DOTS_BOTTOM_RIGHT,
    DOTS_TOP_LEFT,
    DOTS_BOTTOM_LEFT,
    ROUND,
    SQUARE,
];

pub struct Truchet {
    rng: SmallRng,
    cells: Vec<(i32, i32)>,
    order: [usize; 8],
    next: usize,
}

impl Truchet {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let cells = (0..width)
            .step_by(8)
            .flat_map(|x| (0..height).step_by(8).map(move |y| (x as i32, y as i32)))
            .collect();
        Self {
            rng: SmallRng::seed_from_u64(seed),
            cells,
            order: [0, 1, 2, 3, 4, 5, 6, 7],
            next: 8,
        }
    }

    /// Tiles for the next pass, in drawing order
    ///
    /// Each cell gets one to three random tiles from the pass's set, then
    /// possibly an empty tile.
    pub fn pass(&mut self) -> Vec<((i32, i32), Bitmap)> {
        if self.next >= self.order.len() {
            self.order.shuffle(&mut self.rng);
            self.next = 0;
        }
        let set = &TILE_SETS[self.order[self.next]];
        self.next += 1;

        self.cells.shuffle(&mut self.rng);
        let repeats = self.rng.gen_range(1..=3);
        let blanks = self.rng.gen_range(0..=1);

        let mut tiles = Vec::with_capacity(self.cells.len() * (repeats + blanks));
        for _ in 0..repeats {
            for &cell in &self.cells {
                let tile = set[self.rng.gen_range(0..set.len())];
                tiles.push((cell, tile_bitmap(&tile)));
            }
        }
        for _ in 0..blanks {
            for &cell in &self.cells {
                tiles.push((cell, tile_bitmap(&EMPTY)));
            }
        }
        tiles
    }

    /// Draw one pass
    pub fn step<P: Panel>(&mut self, display: &mut Compositor<P>) -> Result<(), DriverError> {
        let tiles = self.pass();
        debug!("truchet: {} tiles", tiles.len());
        for (at, tile) in &tiles {
            display.bitmap(*at, tile)?;
        }
        Ok(())
    }
}

fn tile_bitmap(tile: &Tile) -> Bitmap {
    // Eight rows of one byte each
    Bitmap::from_bytes(8, 8, tile).unwrap_or_else(|_| Bitmap::new(8, 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_cover_the_screen() {
        let truchet = Truchet::new(32, 16, 1);
        assert_eq!(truchet.cells.len(), 4 * 2);
        assert!(truchet.cells.contains(&(24, 8)));
    }

    #[test]
    fn test_pass_uses_one_tile_set() {
        let mut truchet = Truchet::new(64, 32, 7);
        let tiles = truchet.pass();
        let cells = truchet.cells.len();
        assert_eq!(tiles.len() % cells, 0);
        assert!((1..=4).contains(&(tiles.len() / cells)));
        let set = &TILE_SETS[truchet.order[0]];
        for (_, tile) in tiles.iter().take(cells) {
            assert!(set.iter().any(|t| tile.as_bytes() == t));
        }
    }

    #[test]
    fn test_every_set_before_repeating() {
        let mut truchet = Truchet::new(8, 8, 3);
        for _ in 0..8 {
            truchet.pass();
        }
        let mut seen = truchet.order;
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(truchet.next, 8);
    }
}
