//! Seiko/Epson SED1520 LCD controller pair (122x32 modules)
//!
//! Two chips share the data bus and A0; each has its own E strobe. A chip
//! covers 61 columns by 4 pages of vertical bytes.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, StrobeLine};

/// Columns per chip
pub const CHIP_COLUMNS: usize = 61;

/// Pages per chip
pub const PAGES: u8 = 4;

mod cmd {
    pub const DISPLAY_ON_OFF: u8 = 0xAE;
    pub const ADC_FORWARD: u8 = 0xA0;
    pub const STATIC_OFF: u8 = 0xA4;
    pub const DUTY_1_32: u8 = 0xA9;
    pub const RESET: u8 = 0xE2;
    pub const START_LINE: u8 = 0xC0;
    pub const PAGE_ADDRESS: u8 = 0xB8;
}

/// E1/E2 strobe high with data set first, A0 low for commands
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let a0 = WiringConfig::require(wiring.a0, "a0")?;
    let e1 = WiringConfig::require(wiring.e, "e")?;
    let e2 = WiringConfig::require(wiring.e2, "e2")?;
    Ok(BusWiring::new(StrobeLine::active_high(e1))
        .second_strobe(StrobeLine::active_high(e2))
        .register_select(a0, false))
}

pub struct Sed1520<B> {
    bus: B,
}

impl<B: ControllerBus> Sed1520<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Reset and clear both chips, leaving chip 2 selected
    pub fn init(&mut self) -> Result<(), DriverError> {
        let blank = [0u8; CHIP_COLUMNS];
        for chip in [1, 2] {
            self.select_chip(chip)?;
            self.enable_display(false)?;
            self.reset()?;
            self.bus.write_command(cmd::ADC_FORWARD)?;
            self.bus.write_command(cmd::STATIC_OFF)?;
            self.bus.write_command(cmd::DUTY_1_32)?;
            self.enable_display(true)?;
            self.set_display_start_line(0)?;
            for page in 0..PAGES {
                self.set_page_address(page)?;
                self.set_column_address(0)?;
                self.write_display_data(&blank)?;
            }
            self.set_page_address(0)?;
            self.set_column_address(0)?;
        }
        Ok(())
    }

    /// Route following transfers to chip 1 or 2
    pub fn select_chip(&mut self, chip: u8) -> Result<(), DriverError> {
        match chip {
            1 | 2 => self.bus.select_chip(1 << (chip - 1)),
            _ => Err(DriverError::InvalidArgument),
        }
    }

    pub fn enable_display(&mut self, on: bool) -> Result<(), DriverError> {
        self.bus.write_command(cmd::DISPLAY_ON_OFF + on as u8)
    }

    pub fn set_display_start_line(&mut self, line: u8) -> Result<(), DriverError> {
        self.bus.write_command(cmd::START_LINE + (line & 0x1F))
    }

    pub fn set_page_address(&mut self, page: u8) -> Result<(), DriverError> {
        self.bus.write_command(cmd::PAGE_ADDRESS + (page & 0x03))
    }

    pub fn set_column_address(&mut self, column: u8) -> Result<(), DriverError> {
        self.bus.write_command(column & 0x7F)
    }

    pub fn write_display_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bus.write_data(data)
    }

    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.bus.write_command(cmd::RESET)
    }
}
