//! Four-bit monochrome LCD glass without a controller
//!
//! Every write is a complete frame: row 0, a VSYNC pulse, then each
//! following row with an HSYNC. The glass has no memory, so the frame goes
//! to a [`RasterSink`] that keeps rescanning it.

use alloc::vec;
use alloc::vec::Vec;

use log::debug;
use panelport_core::{pack, DriverError, RasterSink};

use super::{FrameWriter, PixelClock, HSYNC, VSYNC};

const VSYNC_PULSE: [u8; 2] = [VSYNC | HSYNC, VSYNC];
const HSYNC_PULSE: [u8; 2] = [HSYNC, 0];

pub struct FourBitLcd<S> {
    sink: S,
    width: u32,
    height: u32,
    clock: PixelClock,
}

impl<S: RasterSink> FourBitLcd<S> {
    /// `width` must be a multiple of 8
    pub fn new(sink: S, width: u32, height: u32, clock: PixelClock) -> Result<Self, DriverError> {
        if width == 0 || width % 8 != 0 || height == 0 {
            return Err(DriverError::InvalidArgument);
        }
        Ok(Self {
            sink,
            width,
            height,
            clock,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Scan for a full 8-bit bitmap, rows top to bottom
    pub fn build_frame(&self, data: &[u8]) -> Result<Vec<u8>, DriverError> {
        let row_bytes = (self.width / 8) as usize;
        if data.len() != row_bytes * self.height as usize {
            return Err(DriverError::InvalidArgument);
        }
        let scale = if self.clock == PixelClock::BitBang { 2 } else { 1 };
        let mut frame = FrameWriter::new(self.clock, data.len() * 2 * scale + self.height as usize * 2);
        let mut nibbles = vec![0u8; row_bytes * 2];
        for (r, row) in data.chunks(row_bytes).enumerate() {
            for (slot, n) in nibbles.iter_mut().zip(pack::nibbles(row)) {
                *slot = n;
            }
            frame.data(&nibbles);
            frame.pulse(if r == 0 { &VSYNC_PULSE } else { &HSYNC_PULSE });
        }
        Ok(frame.finish())
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        let frame = self.build_frame(data)?;
        debug!("lcd4: {} byte frame", frame.len());
        self.sink.submit(frame)
    }

    /// Scan an all-dark frame
    pub fn blank(&mut self) -> Result<(), DriverError> {
        let bytes = (self.width / 8 * self.height) as usize;
        self.write(&vec![0u8; bytes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Frames(Vec<Vec<u8>>);

    impl RasterSink for Frames {
        fn submit(&mut self, frame: Vec<u8>) -> Result<(), DriverError> {
            self.0.push(frame);
            Ok(())
        }
    }

    #[test]
    fn test_frame_layout() {
        let lcd = FourBitLcd::new(Frames::default(), 8, 3, PixelClock::External).unwrap();
        let frame = lcd.build_frame(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(
            frame,
            [0x1, 0x2, 0x60, 0x20, 0x3, 0x4, 0x40, 0x00, 0x5, 0x6, 0x40, 0x00]
        );
    }

    #[test]
    fn test_bitbang_frame() {
        let lcd = FourBitLcd::new(Frames::default(), 8, 1, PixelClock::BitBang).unwrap();
        let frame = lcd.build_frame(&[0xF0]).unwrap();
        assert_eq!(frame, [0x8F, 0x0F, 0x80, 0x00, 0x60, 0x20]);
    }

    #[test]
    fn test_blank_submits_full_frame() {
        let mut lcd = FourBitLcd::new(Frames::default(), 320, 240, PixelClock::External).unwrap();
        lcd.blank().unwrap();
        assert_eq!(lcd.sink.0.len(), 1);
        assert_eq!(lcd.sink.0[0].len(), 240 * (80 + 2));
    }

    #[test]
    fn test_rejects_partial_frames() {
        let lcd = FourBitLcd::new(Frames::default(), 16, 2, PixelClock::External).unwrap();
        assert_eq!(lcd.build_frame(&[0; 3]), Err(DriverError::InvalidArgument));
        assert!(FourBitLcd::new(Frames::default(), 12, 2, PixelClock::External).is_err());
    }
}
