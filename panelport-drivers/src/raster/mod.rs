//! Raster scan frames for controllerless glass
//!
//! Panels without a controller are fed one pin state per byte. The low
//! nibble carries four pixels, the upper bits the sync and clock lines:
//!
//! ```text
//!   bit   7      6      5      4    3..0
//!       CLOCK  HSYNC  VSYNC    -    D3..D0
//! ```
//!
//! Frames are built completely in memory and then handed over in one go,
//! either to a [`ByteLink`](panelport_core::ByteLink) (EL panels keep the
//! image once scanned) or to a [`RasterSink`](panelport_core::RasterSink)
//! that rescans it forever (LCD glass fades without refresh).

use alloc::vec::Vec;

pub mod lcd4;
pub mod planar;

pub use lcd4::FourBitLcd;
pub use planar::{Planar, PlanarModel};

pub const VSYNC: u8 = 0x20;
pub const HSYNC: u8 = 0x40;
pub const CLOCK: u8 = 0x80;

/// Where the pixel clock comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelClock {
    /// The port strobe clocks each byte (parallel port in kernel mode)
    External,
    /// CLOCK is toggled in the data itself (FT232R bit-bang)
    BitBang,
}

/// Accumulates pin states for one frame
pub(crate) struct FrameWriter {
    frame: Vec<u8>,
    clock: PixelClock,
}

impl FrameWriter {
    pub(crate) fn new(clock: PixelClock, capacity: usize) -> Self {
        Self {
            frame: Vec::with_capacity(capacity),
            clock,
        }
    }

    /// Clock in pixel nibbles
    pub(crate) fn data(&mut self, nibbles: &[u8]) {
        match self.clock {
            PixelClock::External => self.frame.extend_from_slice(nibbles),
            PixelClock::BitBang => {
                for &n in nibbles {
                    self.frame.push(CLOCK | n);
                    self.frame.push(n);
                }
            }
        }
    }

    /// Raw sync pin states, never clocked
    pub(crate) fn pulse(&mut self, states: &[u8]) {
        self.frame.extend_from_slice(states);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitbang_doubles_each_nibble() {
        let mut w = FrameWriter::new(PixelClock::BitBang, 0);
        w.data(&[0x2A, 0x05]);
        w.pulse(&[HSYNC]);
        assert_eq!(w.finish(), [0xAA, 0x2A, 0x85, 0x05, 0x40]);
    }

    #[test]
    fn test_external_clock_is_raw() {
        let mut w = FrameWriter::new(PixelClock::External, 0);
        w.data(&[0x0F, 0x01]);
        w.pulse(&[VSYNC | HSYNC, VSYNC]);
        assert_eq!(w.finish(), [0x0F, 0x01, 0x60, 0x20]);
    }
}
