//! Noritake GU300 series graphic VFD modules (GU355, GU372)
//!
//! Registers are written as a command byte with C/D high followed by one
//! data byte. Display RAM holds two screens, column-wise, at 0x0000 and
//! 0x1000.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, EnableMode, StrobeLine};

/// Display RAM size in bytes
pub const RAM_SIZE: usize = 0x2000;

/// Start address of the second screen
pub const SCREEN_2_ADDRESS: u16 = 0x1000;

pub const ENABLE_SCREEN_1: u8 = 1;
pub const ENABLE_SCREEN_2: u8 = 2;

mod cmd {
    pub const DISPLAY_MODE: u8 = 0x06;
    pub const WRITE_DATA: u8 = 0x08;
    pub const SCREEN_1_LOW: u8 = 0x0A;
    pub const SCREEN_1_HIGH: u8 = 0x0B;
    pub const SCREEN_2_LOW: u8 = 0x0C;
    pub const SCREEN_2_HIGH: u8 = 0x0D;
    pub const CURSOR_LOW: u8 = 0x0E;
    pub const CURSOR_HIGH: u8 = 0x0F;
    pub const BRIGHTNESS_100: u8 = 0x18;
    pub const BRIGHTNESS_87: u8 = 0x19;
    pub const BRIGHTNESS_75: u8 = 0x1A;
    pub const BRIGHTNESS_62: u8 = 0x1B;
}

/// What the display RAM is shown as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    Character = 0,
    Graphic = 1,
}

/// /WR strobe, C/D high for commands, /CS held until the transfer ends,
/// /RD parked high
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let cd = WiringConfig::require(wiring.a0, "a0")?;
    let rd = WiringConfig::require(wiring.rd, "rd")?;
    let cs = WiringConfig::require(wiring.cs, "cs")?;
    Ok(BusWiring::new(StrobeLine::active_low(wr))
        .register_select(cd, true)
        .chip_enable(cs, false, EnableMode::Held)
        .idle(rd, true))
}

pub struct Gu300<B> {
    bus: B,
}

impl<B: ControllerBus> Gu300<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Full brightness, both screens cleared and shown as graphics
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.set_brightness(100)?;
        self.set_display_start_address(0, SCREEN_2_ADDRESS)?;
        self.set_cursor_address(0)?;
        self.write_data(&[0u8; RAM_SIZE])?;
        self.set_cursor_address(0)?;
        self.enable_screen(ENABLE_SCREEN_1 | ENABLE_SCREEN_2)?;
        self.select_display_mode(DisplayMode::Graphic)
    }

    fn register(&mut self, command: u8, value: u8) -> Result<(), DriverError> {
        self.bus.write_command(command)?;
        self.bus.write_data(&[value])
    }

    /// `ENABLE_SCREEN_*` bits
    pub fn enable_screen(&mut self, screens: u8) -> Result<(), DriverError> {
        if screens > (ENABLE_SCREEN_1 | ENABLE_SCREEN_2) {
            return Err(DriverError::InvalidArgument);
        }
        self.bus.write_command(screens)
    }

    pub fn set_display_start_address(&mut self, screen1: u16, screen2: u16) -> Result<(), DriverError> {
        let [s1l, s1h] = screen1.to_le_bytes();
        let [s2l, s2h] = screen2.to_le_bytes();
        self.register(cmd::SCREEN_1_LOW, s1l)?;
        self.register(cmd::SCREEN_1_HIGH, s1h)?;
        self.register(cmd::SCREEN_2_LOW, s2l)?;
        self.register(cmd::SCREEN_2_HIGH, s2h)
    }

    pub fn select_display_mode(&mut self, mode: DisplayMode) -> Result<(), DriverError> {
        self.bus.write_command(cmd::DISPLAY_MODE + mode as u8)
    }

    /// Write at the cursor, then release /CS
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bus.write_command(cmd::WRITE_DATA)?;
        self.bus.write_data(data)?;
        self.bus.release()
    }

    pub fn set_cursor_address(&mut self, address: u32) -> Result<(), DriverError> {
        if address >= RAM_SIZE as u32 {
            return Err(DriverError::InvalidArgument);
        }
        let [lo, hi, ..] = address.to_le_bytes();
        self.register(cmd::CURSOR_LOW, lo)?;
        self.register(cmd::CURSOR_HIGH, hi & 0x1F)
    }

    /// Four steps; levels round up to the next step
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        if percent > 100 {
            return Err(DriverError::InvalidArgument);
        }
        // Thresholds at 62.5, 75 and 87.5 percent, in tenths
        let tenths = percent as u32 * 10;
        let command = if tenths <= 625 {
            cmd::BRIGHTNESS_62
        } else if tenths <= 750 {
            cmd::BRIGHTNESS_75
        } else if tenths <= 875 {
            cmd::BRIGHTNESS_87
        } else {
            cmd::BRIGHTNESS_100
        };
        self.bus.write_command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, MockBus};
    use alloc::vec;

    #[test]
    fn test_brightness_steps() {
        let mut vfd = Gu300::new(MockBus::default());
        for level in [0, 62, 63, 75, 76, 87, 88, 100] {
            vfd.set_brightness(level).unwrap();
        }
        assert_eq!(vfd.bus.bytes(), [0x1B, 0x1B, 0x1A, 0x1A, 0x19, 0x19, 0x18, 0x18]);
        assert_eq!(vfd.set_brightness(101), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_write_data_releases() {
        let mut vfd = Gu300::new(MockBus::default());
        vfd.write_data(&[0xAA]).unwrap();
        assert_eq!(
            vfd.bus.events,
            [BusEvent::Command(0x08), BusEvent::Data(vec![0xAA]), BusEvent::Release]
        );
    }

    #[test]
    fn test_cursor_address() {
        let mut vfd = Gu300::new(MockBus::default());
        vfd.set_cursor_address(0x1234).unwrap();
        assert_eq!(vfd.bus.bytes(), [0x0E, 0x34, 0x0F, 0x12]);
        assert_eq!(vfd.set_cursor_address(0x2000), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_init_sequence() {
        let mut vfd = Gu300::new(MockBus::default());
        vfd.init().unwrap();
        let bytes = vfd.bus.bytes();
        assert_eq!(
            bytes[..13],
            [0x18, 0x0A, 0x00, 0x0B, 0x00, 0x0C, 0x00, 0x0D, 0x10, 0x0E, 0x00, 0x0F, 0x00]
        );
        assert_eq!(bytes[13], 0x08);
        assert_eq!(vfd.bus.data_len(), 4 + 2 + 0x2000 + 2);
        assert_eq!(bytes[bytes.len() - 2..], [0x03, 0x07]);
    }
}
