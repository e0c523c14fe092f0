//! Register-select bus over a PC parallel port
//!
//! The controllers differ only in polarity and ordering of a handful of
//! lines, so one bus implementation is parameterised by a [`BusWiring`]:
//!
//! ```text
//!            command           data (per byte)
//! RS/A0/CD   ══cmd══════       ══data═══════════
//! /CS        ‾‾╲________       ‾‾╲______________   held or per byte
//! DATA       ════╤══════       ════╤═════╤══════
//! /WR, E     ‾‾‾‾‾╲_╱‾‾‾       ‾‾‾‾‾╲_╱‾‾‾╲_╱‾‾‾   one strobe per chip
//! ```
//!
//! With fast write enabled the bus remembers the last level of every
//! control line and skips writes that would not change the pin.

use embedded_hal::delay::DelayNs;
use panelport_core::{ControllerBus, DriverError};
use panelport_hal::{ControlLine, ParallelPort};

/// A strobe line and the level that latches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StrobeLine {
    pub line: ControlLine,
    pub active_high: bool,
}

impl StrobeLine {
    pub const fn active_low(line: ControlLine) -> Self {
        Self {
            line,
            active_high: false,
        }
    }

    pub const fn active_high(line: ControlLine) -> Self {
        Self {
            line,
            active_high: true,
        }
    }
}

/// When the chip enable is asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnableMode {
    /// Around each byte
    PerByte,
    /// From the first byte until [`ControllerBus::release`]
    Held,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipEnable {
    pub line: ControlLine,
    pub active_high: bool,
    pub mode: EnableMode,
}

/// Whether the data pins are set before or inside the strobe pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataPhase {
    BeforeStrobe,
    DuringStrobe,
}

/// Line assignment and timing shape of one controller's bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusWiring {
    /// Register select line and its level for commands
    pub register_select: Option<(ControlLine, bool)>,
    /// Strobe per chip; a lone first strobe serves every chip
    pub strobes: [Option<StrobeLine>; 2],
    /// Chip select line per chip and its active level
    pub chip_selects: [Option<(ControlLine, bool)>; 2],
    pub chip_enable: Option<ChipEnable>,
    /// Lines parked at a fixed level for the bus lifetime
    pub idle: [Option<(ControlLine, bool)>; 4],
    pub data_phase: DataPhase,
    /// Extra inactive strobe writes after each data byte
    pub padding: u8,
}

impl BusWiring {
    pub const fn new(strobe: StrobeLine) -> Self {
        Self {
            register_select: None,
            strobes: [Some(strobe), None],
            chip_selects: [None, None],
            chip_enable: None,
            idle: [None; 4],
            data_phase: DataPhase::BeforeStrobe,
            padding: 0,
        }
    }

    pub const fn register_select(mut self, line: ControlLine, command_high: bool) -> Self {
        self.register_select = Some((line, command_high));
        self
    }

    /// Separate strobe for the second chip (SED1520 E2)
    pub const fn second_strobe(mut self, strobe: StrobeLine) -> Self {
        self.strobes[1] = Some(strobe);
        self
    }

    pub const fn chip_select(mut self, chip: usize, line: ControlLine, active_high: bool) -> Self {
        if chip < 2 {
            self.chip_selects[chip] = Some((line, active_high));
        }
        self
    }

    pub const fn chip_enable(mut self, line: ControlLine, active_high: bool, mode: EnableMode) -> Self {
        self.chip_enable = Some(ChipEnable {
            line,
            active_high,
            mode,
        });
        self
    }

    pub const fn idle(mut self, line: ControlLine, high: bool) -> Self {
        self.idle[line_index(line)] = Some((line, high));
        self
    }

    pub const fn data_phase(mut self, phase: DataPhase) -> Self {
        self.data_phase = phase;
        self
    }

    pub const fn padding(mut self, strobes: u8) -> Self {
        self.padding = strobes;
        self
    }
}

const fn line_index(line: ControlLine) -> usize {
    match line {
        ControlLine::Strobe => 0,
        ControlLine::AutoFeed => 1,
        ControlLine::InitOut => 2,
        ControlLine::Select => 3,
    }
}

/// [`ControllerBus`] driven pin by pin
pub struct ParallelBus<P, D> {
    port: P,
    delay: D,
    wiring: BusWiring,
    fast_write: bool,
    levels: [Option<bool>; 4],
    selected: u8,
    enable_held: bool,
}

impl<P: ParallelPort, D: DelayNs> ParallelBus<P, D> {
    /// Park idle lines, strobes and chip enable at their inactive levels
    pub fn new(port: P, delay: D, wiring: BusWiring, fast_write: bool) -> Result<Self, DriverError> {
        let mut bus = Self {
            port,
            delay,
            wiring,
            fast_write,
            levels: [None; 4],
            selected: 0b11,
            enable_held: false,
        };
        for (line, level) in wiring.idle.into_iter().flatten() {
            bus.set(line, level)?;
        }
        for strobe in wiring.strobes.into_iter().flatten() {
            bus.set(strobe.line, !strobe.active_high)?;
        }
        if let Some(enable) = wiring.chip_enable {
            bus.set(enable.line, !enable.active_high)?;
        }
        Ok(bus)
    }

    pub fn wiring(&self) -> &BusWiring {
        &self.wiring
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn release_port(self) -> P {
        self.port
    }

    fn set(&mut self, line: ControlLine, high: bool) -> Result<(), DriverError> {
        let slot = &mut self.levels[line_index(line)];
        if self.fast_write && *slot == Some(high) {
            return Ok(());
        }
        self.port
            .set_control(line, high)
            .map_err(|_| DriverError::Communication)?;
        *slot = Some(high);
        Ok(())
    }

    /// Drive a line even if the cache says it is already there
    fn force(&mut self, line: ControlLine, high: bool) -> Result<(), DriverError> {
        self.port
            .set_control(line, high)
            .map_err(|_| DriverError::Communication)?;
        self.levels[line_index(line)] = Some(high);
        Ok(())
    }

    fn set_enable(&mut self, active: bool) -> Result<(), DriverError> {
        match self.wiring.chip_enable {
            Some(enable) => self.set(enable.line, enable.active_high == active),
            None => Ok(()),
        }
    }

    /// Strobes of the currently selected chips
    fn active_strobes(&self) -> impl Iterator<Item = StrobeLine> {
        let [first, second] = self.wiring.strobes;
        let selected = self.selected;
        let per_chip = second.is_some();
        [first, second]
            .into_iter()
            .enumerate()
            .filter_map(move |(chip, strobe)| {
                let strobe = strobe?;
                (!per_chip || selected & (1 << chip) != 0).then_some(strobe)
            })
    }

    fn strobe(&mut self, active: bool) -> Result<(), DriverError> {
        let strobes: heapless::Vec<StrobeLine, 2> = self.active_strobes().collect();
        for strobe in strobes {
            self.force(strobe.line, strobe.active_high == active)?;
        }
        Ok(())
    }

    fn latch(&mut self, byte: u8) -> Result<(), DriverError> {
        match self.wiring.data_phase {
            DataPhase::BeforeStrobe => {
                self.write_pins(byte)?;
                self.strobe(true)?;
                self.strobe(false)
            }
            DataPhase::DuringStrobe => {
                self.strobe(true)?;
                self.write_pins(byte)?;
                self.strobe(false)
            }
        }
    }

    fn write_pins(&mut self, byte: u8) -> Result<(), DriverError> {
        self.port
            .write_data(byte)
            .map_err(|_| DriverError::Communication)
    }

    fn transfer(&mut self, command: bool, bytes: &[u8]) -> Result<(), DriverError> {
        if let Some((line, command_level)) = self.wiring.register_select {
            self.set(line, command_level == command)?;
        }

        let per_byte = match self.wiring.chip_enable {
            Some(ChipEnable {
                mode: EnableMode::Held,
                ..
            }) => {
                self.set_enable(true)?;
                self.enable_held = true;
                false
            }
            Some(_) => true,
            None => false,
        };

        for &byte in bytes {
            if per_byte {
                self.set_enable(true)?;
            }
            self.latch(byte)?;
            if !command {
                for _ in 0..self.wiring.padding {
                    self.strobe(false)?;
                }
            }
            if per_byte {
                self.set_enable(false)?;
            }
        }
        Ok(())
    }
}

impl<P: ParallelPort, D: DelayNs> ControllerBus for ParallelBus<P, D> {
    fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
        self.transfer(true, &[command])
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.transfer(false, data)
    }

    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
        self.selected = mask;
        for (chip, select) in self.wiring.chip_selects.into_iter().enumerate() {
            if let Some((line, active_high)) = select {
                let selected = mask & (1 << chip) != 0;
                self.set(line, selected == active_high)?;
            }
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), DriverError> {
        if self.enable_held {
            self.set_enable(false)?;
            self.enable_held = false;
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
