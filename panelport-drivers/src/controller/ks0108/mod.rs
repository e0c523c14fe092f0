//! Samsung KS0108 (Hitachi HD61202) graphic LCD controller
//!
//! One chip drives 64 columns by 8 pages of vertical bytes, LSB on top. A
//! 128x64 module carries two chips side by side, picked with CS1/CS2.
//!
//! ```text
//!        chip 1 (CS1)            chip 2 (CS2)
//!      col 0 ........ 63      col 0 ........ 63
//! page 0 ┌──────────────────┬──────────────────┐
//!   ...  │                  │                  │
//! page 7 └──────────────────┴──────────────────┘
//! ```

pub mod text;

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, DataPhase, StrobeLine};

pub use text::{glyph, Ks0108Text, GLYPH_WIDTH};

/// Columns per chip
pub const CHIP_COLUMNS: u32 = 64;

/// Pages (8-row bands) per chip
pub const PAGES: u32 = 8;

mod cmd {
    pub const DISPLAY_ON_OFF: u8 = 0x3E;
    pub const SET_ADDRESS: u8 = 0x40;
    pub const SET_PAGE: u8 = 0xB8;
    pub const START_LINE: u8 = 0xC0;
}

/// E strobes high with data inside the pulse, RS low for commands,
/// CS1/CS2 active high
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let e = WiringConfig::require(wiring.e, "e")?;
    let rs = WiringConfig::require(wiring.a0, "a0")?;
    let cs1 = WiringConfig::require(wiring.cs1, "cs1")?;
    let cs2 = WiringConfig::require(wiring.cs2, "cs2")?;
    Ok(BusWiring::new(StrobeLine::active_high(e))
        .register_select(rs, false)
        .chip_select(0, cs1, true)
        .chip_select(1, cs2, true)
        .data_phase(DataPhase::DuringStrobe))
}

pub struct Ks0108<B> {
    bus: B,
}

impl<B: ControllerBus> Ks0108<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Page 0, address 0, start line 0, display on
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.select_chips(true, true)?;
        self.set_page(0)?;
        self.set_address(0)?;
        self.set_display_start_line(0)?;
        self.enable(true)
    }

    /// Display on or off; RAM contents are kept
    pub fn enable(&mut self, on: bool) -> Result<(), DriverError> {
        self.bus.write_command(cmd::DISPLAY_ON_OFF | on as u8)
    }

    /// Column counter (Y address) of the selected chips
    pub fn set_address(&mut self, address: u8) -> Result<(), DriverError> {
        self.bus.write_command(cmd::SET_ADDRESS | (address & 0x3F))
    }

    /// Page register (X address) of the selected chips
    pub fn set_page(&mut self, page: u8) -> Result<(), DriverError> {
        self.bus.write_command(cmd::SET_PAGE | (page & 0x07))
    }

    /// RAM line shown at the top of the glass, for hardware scrolling
    pub fn set_display_start_line(&mut self, line: u8) -> Result<(), DriverError> {
        self.bus.write_command(cmd::START_LINE | (line & 0x3F))
    }

    pub fn select_chips(&mut self, cs1: bool, cs2: bool) -> Result<(), DriverError> {
        self.bus.select_chip(cs1 as u8 | (cs2 as u8) << 1)
    }

    /// Write vertical bytes; the column counter advances per byte
    pub fn write_display_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bus.write_data(data)
    }
}
