//! Controller bus on a USB Bit Whacker
//!
//! ```text
//! port A  bit 0  strobe (E or /WR)
//!         bit 1  register select
//!         bit 2  chip select 1
//!         bit 3  chip select 2
//! port B  data
//! ```
//!
//! Firmware 1.4 clocks whole transfers with one bulk write. When that is
//! unavailable or fails, every byte is latched with two `O` commands; if
//! those fail as well the board is reset, reconfigured and given one more
//! try.

use embedded_hal::delay::DelayNs;
use panelport_core::{ControllerBus, DriverError};
use panelport_hal::{UartRx, UartTx};
use panelport_protocol::ubw::FirmwareVersion;

use crate::ubw::{BulkTiming, UsbBitWhacker};

const STROBE: u8 = 1 << 0;
const REGISTER_SELECT: u8 = 1 << 1;
const CHIP_SELECT_SHIFT: u32 = 2;

/// Settle time after resetting a board that stopped answering
const RECOVERY_DELAY_MS: u32 = 1000;

/// Polarity of the port A lines for one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UbwWiring {
    /// Strobe line rests high and pulses low (/WR) instead of high (E)
    pub strobe_idle_high: bool,
    /// Register select level for commands
    pub command_high: bool,
    /// Bits 2-3 carry chip selects
    pub chip_selects: bool,
}

impl UbwWiring {
    /// KS0108: E pulses high, RS low for commands, CS1/CS2 on bits 2-3
    pub const KS0108: UbwWiring = UbwWiring {
        strobe_idle_high: false,
        command_high: false,
        chip_selects: true,
    };

    /// SED1330: /WR pulses low, A0 high for commands
    pub const SED1330: UbwWiring = UbwWiring {
        strobe_idle_high: true,
        command_high: true,
        chip_selects: false,
    };
}

pub struct UbwBus<S, D> {
    ubw: UsbBitWhacker<S>,
    delay: D,
    wiring: UbwWiring,
    timing: BulkTiming,
    chip_bits: u8,
}

impl<S: UartTx + UartRx, D: DelayNs> UbwBus<S, D> {
    /// Make every port an output and select all chips
    pub fn new(mut ubw: UsbBitWhacker<S>, delay: D, wiring: UbwWiring) -> Result<Self, DriverError> {
        ubw.configure(0, 0, 0, 0)?;
        let chip_bits = if wiring.chip_selects {
            0b11 << CHIP_SELECT_SHIFT
        } else {
            0
        };
        Ok(Self {
            ubw,
            delay,
            wiring,
            timing: BulkTiming::default(),
            chip_bits,
        })
    }

    pub fn ubw_mut(&mut self) -> &mut UsbBitWhacker<S> {
        &mut self.ubw
    }

    /// Port A with the strobe at rest
    fn port_a(&self, command: bool) -> u8 {
        let mut a = self.chip_bits;
        if self.wiring.command_high == command {
            a |= REGISTER_SELECT;
        }
        if self.wiring.strobe_idle_high {
            a |= STROBE;
        }
        a
    }

    /// Two `O` commands per byte: strobe bit high, then low
    fn toggle(&mut self, command: bool, bytes: &[u8]) -> Result<(), DriverError> {
        let base = self.port_a(command) & !STROBE;
        for &byte in bytes {
            self.ubw.output(base | STROBE, byte, 0)?;
            self.ubw.output(base, byte, 0)?;
        }
        Ok(())
    }

    fn transfer(&mut self, command: bool, bytes: &[u8]) -> Result<(), DriverError> {
        if self.ubw.version() >= FirmwareVersion::D1_4 {
            let init = self.port_a(command);
            match self.ubw.bulk_write(init, bytes, self.timing) {
                Ok(()) => return Ok(()),
                Err(err) => log::warn!("ubw: bulk write failed ({}), toggling port", err),
            }
        }

        if let Err(err) = self.toggle(command, bytes) {
            log::warn!("ubw: port write failed ({}), resetting board", err);
            self.ubw.reset()?;
            self.ubw.configure(0, 0, 0, 0)?;
            self.delay.delay_ms(RECOVERY_DELAY_MS);
            self.toggle(command, bytes)?;
        }
        Ok(())
    }
}

impl<S: UartTx + UartRx, D: DelayNs> ControllerBus for UbwBus<S, D> {
    fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
        self.transfer(true, &[command])
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        if data.is_empty() {
            return Ok(());
        }
        self.transfer(false, data)
    }

    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
        if self.wiring.chip_selects {
            self.chip_bits = (mask & 0b11) << CHIP_SELECT_SHIFT;
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockUart};

    fn bus(version: &str, wiring: UbwWiring) -> UbwBus<MockUart, MockDelay> {
        let mut uart = MockUart::default();
        uart.reply(version);
        uart.reply("OK"); // reset
        uart.reply("OK"); // configure
        let ubw = UsbBitWhacker::open(uart).unwrap();
        let mut bus = UbwBus::new(ubw, MockDelay::default(), wiring).unwrap();
        bus.ubw.serial_mut().tx.clear();
        bus
    }

    #[test]
    fn test_ks0108_bulk_lines() {
        let mut bus = bus("UBW FW D Version 1.4.0", UbwWiring::KS0108);
        bus.ubw.serial_mut().reply("OK");
        bus.write_command(0x3F).unwrap();
        bus.ubw.serial_mut().reply("OK");
        bus.write_data(&[0xAA]).unwrap();
        assert_eq!(
            bus.ubw.serial_mut().sent(),
            "BC,12,0,0,1,1\nBO,3F\nBC,14,0,0,1,1\nBO,AA\n"
        );
    }

    #[test]
    fn test_sed1330_bulk_init_levels() {
        let mut bus = bus("UBW FW D Version 1.4.0", UbwWiring::SED1330);
        bus.ubw.serial_mut().reply("OK");
        bus.write_command(0x40).unwrap();
        bus.ubw.serial_mut().reply("OK");
        bus.write_data(&[0x30]).unwrap();
        assert_eq!(
            bus.ubw.serial_mut().sent(),
            "BC,3,0,0,1,1\nBO,40\nBC,1,0,0,1,1\nBO,30\n"
        );
    }

    #[test]
    fn test_chip_select_bits() {
        let mut bus = bus("UBW FW D Version 1.4.0", UbwWiring::KS0108);
        bus.select_chip(0b01).unwrap();
        bus.ubw.serial_mut().reply("OK");
        bus.write_command(0xB8).unwrap();
        assert!(bus.ubw.serial_mut().sent().starts_with("BC,4,"));
    }

    #[test]
    fn test_toggle_on_old_firmware() {
        let mut bus = bus("UBW FW D Version 1.3.0", UbwWiring::KS0108);
        for _ in 0..4 {
            bus.ubw.serial_mut().reply("OK");
        }
        bus.write_data(&[0x01, 0x02]).unwrap();
        assert_eq!(
            bus.ubw.serial_mut().sent(),
            "O,15,1,0\nO,14,1,0\nO,15,2,0\nO,14,2,0\n"
        );
    }

    #[test]
    fn test_bulk_failure_falls_back_to_toggle() {
        let mut bus = bus("UBW FW D Version 1.4.0", UbwWiring::SED1330);
        bus.ubw.serial_mut().fail_prefix = Some(b"BC");
        bus.ubw.serial_mut().fail_count = 1;
        bus.ubw.serial_mut().reply("OK");
        bus.ubw.serial_mut().reply("OK");
        bus.write_command(0x59).unwrap();
        assert_eq!(bus.ubw.serial_mut().sent(), "O,3,89,0\nO,2,89,0\n");
    }

    #[test]
    fn test_toggle_failure_resets_and_retries_once() {
        let mut bus = bus("UBW FW D Version 1.3.0", UbwWiring::SED1330);
        bus.ubw.serial_mut().fail_prefix = Some(b"O,");
        bus.ubw.serial_mut().fail_count = 1;
        for _ in 0..4 {
            bus.ubw.serial_mut().reply("OK");
        }
        bus.write_command(0x59).unwrap();
        assert_eq!(
            bus.ubw.serial_mut().sent(),
            "R\nC,0,0,0,0\nO,3,89,0\nO,2,89,0\n"
        );
        assert_eq!(bus.delay.total_ms(), 1000);

        // A board that keeps failing reports the error
        bus.ubw.serial_mut().fail_count = 2;
        bus.ubw.serial_mut().reply("OK");
        bus.ubw.serial_mut().reply("OK");
        assert_eq!(bus.write_command(0x59), Err(DriverError::Communication));
    }
}
