//! Planar EL320.240 and EL640.200-SK electroluminescent panels
//!
//! The glass latches a row on HSYNC and restarts at the top on VSYNC, so a
//! partial update only has to clock data for the rows that changed; the
//! rows above and below get a bare HSYNC. Because the panel holds its image
//! the frame is sent once per write (twice, to ride out a missed sync).
//!
//! | Model        | Size    | Idle VSYNC | Trailing HSYNCs |
//! |--------------|---------|------------|-----------------|
//! | EL320.240    | 320x240 | high       | H - stop        |
//! | EL640.200-SK | 640x200 | low        | H - stop + 1    |

use alloc::vec::Vec;

use log::debug;
use panelport_core::{pack, ByteLink, DriverError};

use super::{FrameWriter, PixelClock, HSYNC, VSYNC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanarModel {
    El320x240,
    El640x200Sk,
}

impl PlanarModel {
    pub const fn size(self) -> (u32, u32) {
        match self {
            PlanarModel::El320x240 => (320, 240),
            PlanarModel::El640x200Sk => (640, 200),
        }
    }

    /// Sync bits every data nibble carries
    const fn idle(self) -> u8 {
        match self {
            PlanarModel::El320x240 => VSYNC,
            PlanarModel::El640x200Sk => 0,
        }
    }

    const fn hsync(self) -> [u8; 2] {
        match self {
            PlanarModel::El320x240 => [VSYNC | HSYNC, VSYNC],
            PlanarModel::El640x200Sk => [HSYNC, 0],
        }
    }

    const fn vsync(self) -> [u8; 3] {
        match self {
            PlanarModel::El320x240 => [0, HSYNC, 0],
            PlanarModel::El640x200Sk => [VSYNC, VSYNC | HSYNC, VSYNC],
        }
    }

    /// Row after the last HSYNC of a frame
    const fn scan_end(self) -> u32 {
        match self {
            PlanarModel::El320x240 => 240,
            PlanarModel::El640x200Sk => 201,
        }
    }
}

pub struct Planar<L> {
    link: L,
    model: PlanarModel,
    clock: PixelClock,
}

impl<L: ByteLink> Planar<L> {
    pub fn new(link: L, model: PlanarModel, clock: PixelClock) -> Self {
        Self { link, model, clock }
    }

    pub fn model(&self) -> PlanarModel {
        self.model
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Build the scan for whole rows of 8-bit bitmap data starting at byte
    /// `address`
    ///
    /// `address` and `data.len()` must be multiples of the row size.
    pub fn build_frame(&self, data: &[u8], address: usize) -> Result<Vec<u8>, DriverError> {
        let (width, height) = self.model.size();
        let row_bytes = (width / 8) as usize;
        let row_nibbles = row_bytes * 2;
        if data.is_empty() || address % row_bytes != 0 || data.len() % row_bytes != 0 {
            return Err(DriverError::InvalidArgument);
        }
        let first = (address / row_bytes) as u32;
        let stop = first + (data.len() / row_bytes) as u32;
        if stop > height {
            return Err(DriverError::InvalidArgument);
        }

        let idle = self.model.idle();
        let nibbles: Vec<u8> = pack::nibbles(data).map(|n| idle | n).collect();
        let hsync = self.model.hsync();
        let row = |r: u32| {
            let offset = (r - first) as usize * row_nibbles;
            &nibbles[offset..offset + row_nibbles]
        };

        let mut frame = FrameWriter::new(self.clock, nibbles.len() * 2 + height as usize * 2 + 3);
        let mut start = first;
        if start == 0 {
            frame.data(row(0));
            start = 1;
        }
        frame.pulse(&self.model.vsync());
        for _ in 1..start {
            frame.pulse(&hsync);
        }
        for r in start..stop {
            frame.data(row(r));
            frame.pulse(&hsync);
        }
        for _ in stop..self.model.scan_end() {
            frame.pulse(&hsync);
        }
        Ok(frame.finish())
    }

    pub fn write(&mut self, data: &[u8], address: usize) -> Result<(), DriverError> {
        let frame = self.build_frame(data, address)?;
        debug!(
            "{:?}: {} rows at {}, {} byte frame",
            self.model,
            data.len() * 8 / self.model.size().0 as usize,
            address,
            frame.len()
        );
        self.link.write(&frame)?;
        self.link.write(&frame)?;
        self.link.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;
    use alloc::vec;

    fn el320() -> Planar<MockLink> {
        Planar::new(MockLink::default(), PlanarModel::El320x240, PixelClock::External)
    }

    #[test]
    fn test_full_frame_el320() {
        let panel = el320();
        let frame = panel.build_frame(&vec![0xF0; 40 * 240], 0).unwrap();
        assert_eq!(frame.len(), 80 + 3 + 239 * (80 + 2));
        assert_eq!(frame[..2], [0x2F, 0x20]);
        assert_eq!(frame[80..83], [0x00, 0x40, 0x00]);
        assert_eq!(frame[frame.len() - 2..], [0x60, 0x20]);
    }

    #[test]
    fn test_partial_update_skips_rows() {
        let panel = el320();
        let frame = panel.build_frame(&vec![0xA5; 80], 10 * 40).unwrap();
        assert_eq!(frame[..3], [0x00, 0x40, 0x00]);
        // rows 1..10 latch nothing
        assert!(frame[3..21].chunks(2).all(|p| p == [0x60, 0x20]));
        assert_eq!(frame[21..23], [0x2A, 0x25]);
        assert_eq!(frame.len(), 3 + 9 * 2 + 2 * 82 + 228 * 2);
    }

    #[test]
    fn test_second_row_gets_its_own_data() {
        let panel = el320();
        let mut data = vec![0x00; 40];
        data.extend_from_slice(&[0xFF; 40]);
        let frame = panel.build_frame(&data, 0).unwrap();
        assert!(frame[..80].iter().all(|&b| b == 0x20));
        assert!(frame[83..163].iter().all(|&b| b == 0x2F));
    }

    #[test]
    fn test_el640_sync_levels_and_extra_hsync() {
        let panel = Planar::new(MockLink::default(), PlanarModel::El640x200Sk, PixelClock::External);
        let frame = panel.build_frame(&vec![0x00; 80 * 200], 0).unwrap();
        assert_eq!(frame[160..163], [0x20, 0x60, 0x20]);
        assert_eq!(frame.len(), 160 + 3 + 199 * (160 + 2) + 2);
        assert_eq!(frame[frame.len() - 4..], [0x40, 0x00, 0x40, 0x00]);
    }

    #[test]
    fn test_bitbang_clocks_each_nibble() {
        let panel = Planar::new(MockLink::default(), PlanarModel::El320x240, PixelClock::BitBang);
        let frame = panel.build_frame(&vec![0x10; 40], 0).unwrap();
        assert_eq!(frame[..4], [0xA1, 0x21, 0xA0, 0x20]);
        assert_eq!(frame[160..163], [0x00, 0x40, 0x00]);
    }

    #[test]
    fn test_write_sends_frame_twice() {
        let mut panel = el320();
        panel.write(&vec![0xFF; 40], 239 * 40).unwrap();
        let frame = panel.build_frame(&vec![0xFF; 40], 239 * 40).unwrap();
        assert_eq!(panel.link.bytes.len(), frame.len() * 2);
        assert_eq!(panel.link.bytes[..frame.len()], frame[..]);
        assert_eq!(panel.link.flushes, 1);
    }

    #[test]
    fn test_rejects_unaligned_or_overflowing_updates() {
        let panel = el320();
        assert_eq!(panel.build_frame(&[0; 40], 20), Err(DriverError::InvalidArgument));
        assert_eq!(panel.build_frame(&[0; 41], 0), Err(DriverError::InvalidArgument));
        assert_eq!(panel.build_frame(&[0; 80], 239 * 40), Err(DriverError::InvalidArgument));
        assert_eq!(panel.build_frame(&[], 0), Err(DriverError::InvalidArgument));
    }
}
