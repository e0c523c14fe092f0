//! Toshiba T6963C graphic LCD controller
//!
//! Commands take their argument bytes first: the data bytes land in the
//! controller's argument registers, then the command byte consumes them.
//!
//! ```text
//! C/D   ___data___‾‾cmd‾‾
//! bus   [ lo ][ hi ][0x24]      set address pointer
//! ```
//!
//! Graphics RAM is row-wise, `W/8` bytes per line, starting at the
//! graphics home address.

use panelport_core::config::{ConfigError, WiringConfig};
use panelport_core::{ControllerBus, DriverError};

use crate::bus::{BusWiring, DataPhase, EnableMode, StrobeLine};

mod cmd {
    pub const CURSOR_POINTER: u8 = 0x21;
    pub const OFFSET_POINTER: u8 = 0x22;
    pub const ADDRESS_POINTER: u8 = 0x24;
    pub const TEXT_HOME: u8 = 0x40;
    pub const TEXT_AREA: u8 = 0x41;
    pub const GRAPHICS_HOME: u8 = 0x42;
    pub const GRAPHICS_AREA: u8 = 0x43;
    pub const CURSOR_PATTERN: u8 = 0xA0;
    pub const AUTO_WRITE: u8 = 0xB0;
    pub const AUTO_RESET: u8 = 0xB2;
}

/// Mode set: internal character generator
pub const MODE_CG_ROM: u8 = 0x80;
/// Mode set: text and graphics ORed
pub const MODE_OR: u8 = 0x80;
/// Mode set: text and graphics ANDed
pub const MODE_AND: u8 = 0x83;

pub const DISPLAY_MODE_OFF: u8 = 0x90;
pub const DISPLAY_MODE_CURSOR: u8 = 0x92;
pub const DISPLAY_MODE_CURSOR_BLINK: u8 = 0x93;
pub const DISPLAY_MODE_TEXT: u8 = 0x94;
pub const DISPLAY_MODE_GRAPHICS: u8 = 0x98;

/// /WR strobe with data inside the pulse, C/D high for commands, /CE per
/// byte, /RD parked high
pub fn bus_wiring(wiring: &WiringConfig) -> Result<BusWiring, ConfigError> {
    let wr = WiringConfig::require(wiring.wr, "wr")?;
    let rd = WiringConfig::require(wiring.rd, "rd")?;
    let ce = WiringConfig::require(wiring.cs, "cs")?;
    let cd = WiringConfig::require(wiring.a0, "a0")?;
    Ok(BusWiring::new(StrobeLine::active_low(wr))
        .register_select(cd, true)
        .chip_enable(ce, false, EnableMode::PerByte)
        .data_phase(DataPhase::DuringStrobe)
        .idle(rd, true))
}

pub struct T6963c<B> {
    bus: B,
    width: u32,
    height: u32,
}

impl<B: ControllerBus> T6963c<B> {
    pub fn new(bus: B, width: u32, height: u32) -> Self {
        Self { bus, width, height }
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Bytes per graphics line
    pub fn columns(&self) -> u32 {
        self.width.div_ceil(8)
    }

    /// Graphics-only mode with zeroed RAM
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.set_graphics_home_address(0)?;
        self.set_graphics_area(self.columns())?;
        self.set_mode(MODE_CG_ROM | MODE_OR)?;
        self.set_display_mode(DISPLAY_MODE_GRAPHICS)?;

        self.set_address_pointer(0)?;
        let zeros = alloc::vec![0u8; (self.columns() * self.height) as usize];
        self.auto_write(&zeros)?;
        self.set_address_pointer(0)
    }

    fn command_with(&mut self, args: &[u8], command: u8) -> Result<(), DriverError> {
        self.bus.write_data(args)?;
        self.bus.write_command(command)
    }

    fn address_command(&mut self, address: u32, command: u8) -> Result<(), DriverError> {
        let address = u16::try_from(address).map_err(|_| DriverError::InvalidArgument)?;
        self.command_with(&address.to_le_bytes(), command)
    }

    fn column_command(&mut self, columns: u32, command: u8) -> Result<(), DriverError> {
        let columns = u8::try_from(columns).map_err(|_| DriverError::InvalidArgument)?;
        self.command_with(&[columns, 0], command)
    }

    pub fn set_cursor_pointer(&mut self, x: u8, y: u8) -> Result<(), DriverError> {
        self.command_with(&[x, y], cmd::CURSOR_POINTER)
    }

    /// CG RAM offset register
    pub fn set_offset_pointer(&mut self, offset: u8) -> Result<(), DriverError> {
        self.command_with(&[offset], cmd::OFFSET_POINTER)
    }

    pub fn set_address_pointer(&mut self, address: u32) -> Result<(), DriverError> {
        self.address_command(address, cmd::ADDRESS_POINTER)
    }

    pub fn set_text_home_address(&mut self, address: u32) -> Result<(), DriverError> {
        self.address_command(address, cmd::TEXT_HOME)
    }

    pub fn set_text_area(&mut self, columns: u32) -> Result<(), DriverError> {
        self.column_command(columns, cmd::TEXT_AREA)
    }

    pub fn set_graphics_home_address(&mut self, address: u32) -> Result<(), DriverError> {
        self.address_command(address, cmd::GRAPHICS_HOME)
    }

    pub fn set_graphics_area(&mut self, columns: u32) -> Result<(), DriverError> {
        self.column_command(columns, cmd::GRAPHICS_AREA)
    }

    /// One of the `MODE_*` values
    pub fn set_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        self.bus.write_command(mode)
    }

    /// `DISPLAY_MODE_*` values, ORed together
    pub fn set_display_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        if mode & 0xF0 != DISPLAY_MODE_OFF {
            return Err(DriverError::InvalidArgument);
        }
        self.bus.write_command(mode)
    }

    /// Cursor height in lines minus one, 0..=7
    pub fn select_cursor_pattern(&mut self, pattern: u8) -> Result<(), DriverError> {
        if pattern > 7 {
            return Err(DriverError::InvalidArgument);
        }
        self.bus.write_command(cmd::CURSOR_PATTERN + pattern)
    }

    /// Stream `data` from the address pointer on
    pub fn auto_write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bus.write_command(cmd::AUTO_WRITE)?;
        self.bus.write_data(data)?;
        self.bus.write_command(cmd::AUTO_RESET)
    }
}
