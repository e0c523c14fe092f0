//! Noritake S20A character VFD
//!
//! Parallel only. Text goes out with A0 low; a byte with A0 high is either
//! the reset command or a cursor position. The module needs a few extra
//! strobe-width delays per character, added as padding writes.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, EnableMode, StrobeLine};

pub const BS: u8 = 0x08;
pub const TAB: u8 = 0x09;
pub const LF: u8 = 0x0A;
pub const CR: u8 = 0x0D;

/// Characters per line
pub const DEFAULT_WIDTH: u32 = 40;

const RESET: u8 = 0x50;
const INIT_DELAY_MS: u32 = 100;
const PADDING_STROBES: u8 = 3;

/// /WR strobe, A0 high for commands, /CS held per transfer, /RD parked
/// high, three padding writes per character
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let a0 = WiringConfig::require(wiring.a0, "a0")?;
    let rd = WiringConfig::require(wiring.rd, "rd")?;
    let cs = WiringConfig::require(wiring.cs, "cs")?;
    Ok(BusWiring::new(StrobeLine::active_low(wr))
        .register_select(a0, true)
        .chip_enable(cs, false, EnableMode::Held)
        .idle(rd, true)
        .padding(PADDING_STROBES))
}

pub struct S20a<B> {
    bus: B,
    width: u32,
}

impl<B: ControllerBus> S20a<B> {
    pub fn new(bus: B, width: u32) -> Self {
        Self { bus, width }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn init(&mut self) -> Result<(), DriverError> {
        self.bus.write_command(RESET)?;
        self.bus.release()?;
        self.bus.delay_ms(INIT_DELAY_MS);
        Ok(())
    }

    /// Text and control codes
    pub fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bus.write_data(data)?;
        self.bus.release()
    }

    /// Blank both lines
    pub fn clear(&mut self) -> Result<(), DriverError> {
        let mut line = alloc::vec![b' '; 1 + 2 * self.width as usize];
        line[0] = CR;
        self.write(&line)
    }

    /// 0..=3
    pub fn set_cursor_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 3 {
            return Err(DriverError::InvalidArgument);
        }
        self.write(&[0x13 + mode])
    }

    pub fn set_line_ending_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode > 1 {
            return Err(DriverError::InvalidArgument);
        }
        self.write(&[0x11 + mode])
    }

    /// Position byte with A0 high; /CS stays asserted for the text that
    /// follows
    pub fn move_cursor(&mut self, x: u32, y: u32) -> Result<(), DriverError> {
        if x >= self.width {
            return Err(DriverError::InvalidArgument);
        }
        let position = u8::try_from(y * self.width + x).map_err(|_| DriverError::InvalidArgument)?;
        self.bus.write_command(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, MockBus};
    use alloc::vec;

    fn vfd() -> S20a<MockBus> {
        S20a::new(MockBus::default(), DEFAULT_WIDTH)
    }

    #[test]
    fn test_init() {
        let mut vfd = vfd();
        vfd.init().unwrap();
        assert_eq!(
            vfd.bus.events,
            [BusEvent::Command(0x50), BusEvent::Release, BusEvent::Delay(100)]
        );
    }

    #[test]
    fn test_write_releases_and_move_does_not() {
        let mut vfd = vfd();
        vfd.move_cursor(11, 1).unwrap();
        vfd.write(b"hi").unwrap();
        assert_eq!(
            vfd.bus.events,
            [
                BusEvent::Command(51),
                BusEvent::Data(vec![b'h', b'i']),
                BusEvent::Release,
            ]
        );
        assert_eq!(vfd.move_cursor(40, 0), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_clear_writes_two_lines_of_spaces() {
        let mut vfd = vfd();
        vfd.clear().unwrap();
        let data = vfd.bus.bytes();
        assert_eq!(data.len(), 81);
        assert_eq!(data[0], CR);
        assert!(data[1..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_modes() {
        let mut vfd = vfd();
        vfd.set_cursor_mode(2).unwrap();
        vfd.set_line_ending_mode(1).unwrap();
        assert_eq!(vfd.bus.bytes(), [0x15, 0x12]);
        assert_eq!(vfd.set_cursor_mode(4), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_wiring_has_padding() {
        use panelport_core::PanelModel;
        let wiring = bus_wiring(&WiringConfig::default_for(PanelModel::S20a)).unwrap();
        assert_eq!(wiring.padding, 3);
    }
}
