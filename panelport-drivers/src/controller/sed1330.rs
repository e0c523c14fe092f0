//! Seiko/Epson SED1330 family (SED1335, S1D13305) graphic LCD controllers
//!
//! The controller splits its RAM into layers. Graphics go through a single
//! layer starting at address 0, `W/8` bytes per line; the second page is
//! cleared at init and left for overlay use.
//!
//! ```text
//! 0x0000 ┌─────────────┐  SAD1, layer 1 graphics
//!        │   page 0    │
//! 0x2580 ├─────────────┤  SAD2, layer 2
//!        │   page 1    │
//! 0x4B00 └─────────────┘  SAD3
//! ```

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, EnableMode, StrobeLine};

/// Bytes per display page
pub const PAGE_SIZE: u32 = 0x2580;

mod cmd {
    pub const SYSTEM_SET: u8 = 0x40;
    pub const MEMORY_WRITE: u8 = 0x42;
    pub const SCROLL: u8 = 0x44;
    pub const CURSOR_WRITE: u8 = 0x46;
    pub const CURSOR_DIRECTION: u8 = 0x4C;
    pub const SLEEP_IN: u8 = 0x53;
    pub const DISPLAY_OFF: u8 = 0x58;
    pub const DISPLAY_ON: u8 = 0x59;
    pub const HDOT_SCROLL: u8 = 0x5A;
    pub const OVERLAY: u8 = 0x5B;
    pub const CGRAM_ADDRESS: u8 = 0x5C;
    pub const CURSOR_FORM: u8 = 0x5D;
}

/// Overlay format bits
pub mod overlay {
    pub const TWO_LAYER: u8 = 0x00;
    pub const THREE_LAYER: u8 = 0x10;
    pub const TEXT: u8 = 0x00;
    pub const GRAPHICS: u8 = 0x0C;
    pub const OR: u8 = 0;
    pub const XOR: u8 = 1;
    pub const AND: u8 = 2;
    pub const PRIORITY_OR: u8 = 3;
}

/// Display on flags: all layers on, cursor off
const DISPLAY_ON_FLAGS: u8 = 0x14;

/// /WR strobe with data set first, A0 high for commands, /CS held low,
/// /RD parked high
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let rd = WiringConfig::require(wiring.rd, "rd")?;
    let cs = WiringConfig::require(wiring.cs, "cs")?;
    let a0 = WiringConfig::require(wiring.a0, "a0")?;
    Ok(BusWiring::new(StrobeLine::active_low(wr))
        .register_select(a0, true)
        .chip_enable(cs, false, EnableMode::Held)
        .idle(rd, true))
}

/// SYSTEM SET parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemSet {
    /// Character field width minus one
    pub fx: u8,
    /// Character field height minus one
    pub fy: u8,
    /// Bytes per display line minus one
    pub cr: u8,
    /// Line length including horizontal blanking
    pub tcr: u8,
    /// Lines per frame minus one
    pub lf: u8,
    /// Address pitch of the virtual screen
    pub ap: u16,
    /// External character generator
    pub m0: bool,
    /// 64-character CG RAM
    pub m1: bool,
    /// 16-pixel character height
    pub m2: bool,
    /// Dual panel drive
    pub ws: bool,
    /// No top-line correction for inverted screens
    pub iv: bool,
    /// Two-frame AC drive
    pub wf: bool,
}

impl SystemSet {
    /// Parameters for a single-panel graphics screen of `width` x `height`
    pub fn for_size(width: u32, height: u32) -> Result<Self, DriverError> {
        let columns = width / 8;
        let cr = columns
            .checked_sub(1)
            .and_then(|cr| u8::try_from(cr).ok())
            .ok_or(DriverError::InvalidArgument)?;
        let tcr = u8::try_from(columns + 35).map_err(|_| DriverError::InvalidArgument)?;
        let lf = height
            .checked_sub(1)
            .and_then(|lf| u8::try_from(lf).ok())
            .ok_or(DriverError::InvalidArgument)?;
        Ok(Self {
            fx: 7,
            fy: 7,
            cr,
            tcr,
            lf,
            ap: columns as u16,
            m0: false,
            m1: true,
            m2: false,
            ws: false,
            iv: true,
            wf: false,
        })
    }

    fn encode(&self) -> [u8; 8] {
        let p1 = 0x10
            | (self.iv as u8) << 5
            | (self.ws as u8) << 3
            | (self.m2 as u8) << 2
            | (self.m1 as u8) << 1
            | self.m0 as u8;
        let p2 = (self.wf as u8) << 7 | (self.fx & 0x07);
        let [ap_lo, ap_hi] = self.ap.to_le_bytes();
        [p1, p2, self.fy, self.cr, self.tcr, self.lf, ap_lo, ap_hi]
    }
}

/// Display start addresses and region heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollRegions {
    pub sad1: u16,
    pub sl1: u8,
    pub sad2: u16,
    pub sl2: u8,
    pub sad3: u16,
    pub sad4: u16,
}

pub struct Sed1330<B> {
    bus: B,
    width: u32,
    height: u32,
}

impl<B: ControllerBus> Sed1330<B> {
    pub fn new(bus: B, width: u32, height: u32) -> Self {
        Self { bus, width, height }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Configure for `width` x `height`, clear both pages, graphics on
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.system_set(&SystemSet::for_size(self.width, self.height)?)?;

        let page = alloc::vec![0u8; PAGE_SIZE as usize];
        self.set_cursor_address(0)?;
        self.write_display_memory(&page)?;
        self.write_display_memory(&page)?;

        let lines = u8::try_from(self.height).map_err(|_| DriverError::InvalidArgument)?;
        self.scroll(&ScrollRegions {
            sad1: 0,
            sl1: lines,
            sad2: PAGE_SIZE as u16,
            sl2: lines,
            sad3: (PAGE_SIZE * 2) as u16,
            sad4: 0,
        })?;
        self.set_cursor_direction(0)?;
        self.set_cursor_form(0x07, 0x07)?;
        self.set_hscroll(0)?;
        self.set_overlay(overlay::TWO_LAYER | overlay::GRAPHICS | overlay::OR)?;
        self.set_cursor_address(0)?;
        self.display_on(DISPLAY_ON_FLAGS)
    }

    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DriverError> {
        self.bus.write_command(command)?;
        self.bus.write_data(params)
    }

    pub fn system_set(&mut self, params: &SystemSet) -> Result<(), DriverError> {
        self.command(cmd::SYSTEM_SET, &params.encode())
    }

    /// Standby until the next SYSTEM SET
    pub fn sleep_in(&mut self) -> Result<(), DriverError> {
        self.bus.write_command(cmd::SLEEP_IN)
    }

    /// Display on with per-layer and cursor flash flags
    pub fn display_on(&mut self, flags: u8) -> Result<(), DriverError> {
        self.command(cmd::DISPLAY_ON, &[flags])
    }

    pub fn display_off(&mut self) -> Result<(), DriverError> {
        self.bus.write_command(cmd::DISPLAY_OFF)
    }

    pub fn scroll(&mut self, regions: &ScrollRegions) -> Result<(), DriverError> {
        let [s1l, s1h] = regions.sad1.to_le_bytes();
        let [s2l, s2h] = regions.sad2.to_le_bytes();
        let [s3l, s3h] = regions.sad3.to_le_bytes();
        let [s4l, s4h] = regions.sad4.to_le_bytes();
        self.command(
            cmd::SCROLL,
            &[s1l, s1h, regions.sl1, s2l, s2h, regions.sl2, s3l, s3h, s4l, s4h],
        )
    }

    pub fn set_cursor_form(&mut self, width: u8, height: u8) -> Result<(), DriverError> {
        self.command(cmd::CURSOR_FORM, &[width, height])
    }

    /// CG RAM start address
    pub fn set_cgram_address(&mut self, address: u16) -> Result<(), DriverError> {
        self.command(cmd::CGRAM_ADDRESS, &address.to_le_bytes())
    }

    /// 0 right, 1 left, 2 up, 3 down
    pub fn set_cursor_direction(&mut self, direction: u8) -> Result<(), DriverError> {
        if direction > 3 {
            return Err(DriverError::InvalidArgument);
        }
        self.bus.write_command(cmd::CURSOR_DIRECTION + direction)
    }

    /// Horizontal scroll in pixels, 0..=7
    pub fn set_hscroll(&mut self, pixels: u8) -> Result<(), DriverError> {
        if pixels > 7 {
            return Err(DriverError::InvalidArgument);
        }
        self.command(cmd::HDOT_SCROLL, &[pixels])
    }

    /// Combination of the [`overlay`] bits
    pub fn set_overlay(&mut self, format: u8) -> Result<(), DriverError> {
        self.command(cmd::OVERLAY, &[format])
    }

    pub fn set_cursor_address(&mut self, address: u32) -> Result<(), DriverError> {
        let address = u16::try_from(address).map_err(|_| DriverError::InvalidArgument)?;
        self.command(cmd::CURSOR_WRITE, &address.to_le_bytes())
    }

    /// Write at the cursor, which advances per byte
    pub fn write_display_memory(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.command(cmd::MEMORY_WRITE, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusEvent, MockBus};
    use alloc::vec;

    #[test]
    fn test_system_set_for_320x240() {
        let params = SystemSet::for_size(320, 240).unwrap();
        assert_eq!(params.encode(), [0x32, 0x07, 0x07, 39, 75, 239, 40, 0]);
        assert_eq!(SystemSet::for_size(0, 240), Err(DriverError::InvalidArgument));
        assert_eq!(SystemSet::for_size(320, 257), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn test_init_sequence() {
        let mut lcd = Sed1330::new(MockBus::default(), 160, 80);
        lcd.init().unwrap();
        let events = &lcd.bus.events;
        assert_eq!(events[0], BusEvent::Command(0x40));
        assert_eq!(events[2], BusEvent::Command(0x46));
        assert_eq!(events[3], BusEvent::Data(vec![0, 0]));
        assert_eq!(events[4], BusEvent::Command(0x42));
        assert_eq!(events[6], BusEvent::Command(0x42));
        assert_eq!(events[8], BusEvent::Command(0x44));
        assert_eq!(
            events[9],
            BusEvent::Data(vec![0x00, 0x00, 80, 0x80, 0x25, 80, 0x00, 0x4B, 0x00, 0x00])
        );
        assert_eq!(events[10], BusEvent::Command(0x4C));
        assert_eq!(events[12], BusEvent::Data(vec![7, 7]));
        assert_eq!(events[16], BusEvent::Data(vec![0x0C]));
        assert_eq!(&events[events.len() - 2..], [BusEvent::Command(0x59), BusEvent::Data(vec![0x14])]);
    }

    #[test]
    fn test_range_checks() {
        let mut lcd = Sed1330::new(MockBus::default(), 320, 240);
        assert_eq!(lcd.set_cursor_direction(4), Err(DriverError::InvalidArgument));
        assert_eq!(lcd.set_hscroll(8), Err(DriverError::InvalidArgument));
        assert_eq!(lcd.set_cursor_address(0x1_0000), Err(DriverError::InvalidArgument));
        assert!(lcd.bus.events.is_empty());
        lcd.set_cursor_direction(3).unwrap();
        lcd.sleep_in().unwrap();
        lcd.display_off().unwrap();
        assert_eq!(lcd.bus.bytes(), [0x4F, 0x53, 0x58]);
    }
}
