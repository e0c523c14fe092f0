//! USB Bit Whacker device
//!
//! The board enumerates as a CDC serial port and exposes its three I/O
//! ports through the ASCII commands in `panelport_protocol::ubw`. This
//! type owns the serial port, remembers the firmware revision and checks
//! the `OK` acknowledgements newer firmware sends.
//!
//! # Usage
//!
//! ```ignore
//! let mut ubw = UsbBitWhacker::open(serial)?;
//! ubw.configure(0, 0, 0, 0)?;          // everything an output
//! ubw.output(0xAA, 0x55, 0)?;
//! let [a, b, c] = ubw.input()?;
//! ```

use heapless::{String, Vec};
use panelport_core::DriverError;
use panelport_hal::{UartRx, UartTx};
use panelport_protocol::ubw::{
    is_ack, parse_analog, parse_input, parse_memory, parse_pin, split_bulk, Command,
    FirmwareVersion, UbwError, MAX_ANALOG_CHANNELS, MAX_LINE_LEN,
};

/// Strobe timing of a bulk write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BulkTiming {
    pub wait_mask: u8,
    pub wait_delay: u8,
    pub strobe_mask: u8,
    pub strobe_delay: u8,
}

impl Default for BulkTiming {
    fn default() -> Self {
        Self {
            wait_mask: 0,
            wait_delay: 0,
            strobe_mask: 1,
            strobe_delay: 1,
        }
    }
}

fn ubw_error(err: UbwError) -> DriverError {
    match err {
        UbwError::Unsupported => DriverError::Unsupported,
        UbwError::LineTooLong => DriverError::BufferOverflow,
        UbwError::InvalidReply => DriverError::Communication,
    }
}

/// A USB Bit Whacker with a detected firmware revision
pub struct UsbBitWhacker<S> {
    serial: S,
    version: FirmwareVersion,
}

impl<S: UartTx + UartRx> UsbBitWhacker<S> {
    /// Query the firmware revision and reset the board
    pub fn open(mut serial: S) -> Result<Self, DriverError> {
        serial.clear_input().map_err(|_| DriverError::Communication)?;

        // The version query reads the same on every revision
        let query = Command::Version
            .encode(FirmwareVersion::D1_1)
            .map_err(ubw_error)?;
        serial
            .write_blocking(&query)
            .and_then(|_| serial.flush())
            .map_err(|_| DriverError::Communication)?;

        let mut buf = [0u8; MAX_LINE_LEN];
        let len = serial
            .read_line(&mut buf)
            .map_err(|_| DriverError::Communication)?;
        let reply = core::str::from_utf8(&buf[..len]).unwrap_or("");
        let version = FirmwareVersion::from_reply(reply);
        log::info!("ubw: firmware {} (reported {:?})", version.as_str(), reply);

        let mut ubw = Self { serial, version };
        ubw.reset()?;
        Ok(ubw)
    }

    /// Wrap a board whose revision is already known
    pub fn with_version(serial: S, version: FirmwareVersion) -> Self {
        Self { serial, version }
    }

    pub fn version(&self) -> FirmwareVersion {
        self.version
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    fn send_line(&mut self, line: &[u8]) -> Result<(), DriverError> {
        log::debug!("ubw > {:?}", core::str::from_utf8(line).unwrap_or("<binary>"));
        self.serial
            .write_blocking(line)
            .map_err(|_| DriverError::Communication)
    }

    fn read_reply<'b>(&mut self, buf: &'b mut [u8; MAX_LINE_LEN]) -> Result<&'b str, DriverError> {
        let len = self
            .serial
            .read_line(buf)
            .map_err(|_| DriverError::Communication)?;
        core::str::from_utf8(&buf[..len]).map_err(|_| DriverError::Communication)
    }

    fn check_ack(&mut self) -> Result<(), DriverError> {
        let mut buf = [0u8; MAX_LINE_LEN];
        let reply = self.read_reply(&mut buf)?;
        if is_ack(reply) {
            Ok(())
        } else {
            log::warn!("ubw: expected OK, got {:?}", reply);
            Err(DriverError::NotAcknowledged)
        }
    }

    /// Send a command, reading the `OK` where the firmware sends one
    fn execute(&mut self, command: Command<'_>) -> Result<(), DriverError> {
        let line = command.encode(self.version).map_err(ubw_error)?;
        self.send_line(&line)?;
        if self.version.acknowledges() && command.expects_ok() {
            self.check_ack()?;
        }
        self.serial.flush().map_err(|_| DriverError::Communication)
    }

    /// Send a query and parse its reply line with `parse`
    fn query<T>(
        &mut self,
        command: Command<'_>,
        parse: impl FnOnce(&str) -> Result<T, UbwError>,
    ) -> Result<T, DriverError> {
        let line = command.encode(self.version).map_err(ubw_error)?;
        self.send_line(&line)?;
        let mut buf = [0u8; MAX_LINE_LEN];
        let reply = self.read_reply(&mut buf)?;
        parse(reply).map_err(ubw_error)
    }

    /// Ask the board for its version string again
    pub fn query_version<'b>(
        &mut self,
        buf: &'b mut [u8; MAX_LINE_LEN],
    ) -> Result<&'b str, DriverError> {
        let line = Command::Version.encode(self.version).map_err(ubw_error)?;
        self.send_line(&line)?;
        self.read_reply(buf)
    }

    /// All pins to inputs, outputs cleared
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.execute(Command::Reset)
    }

    /// Port directions, bit set = input
    pub fn configure(
        &mut self,
        dir_a: u8,
        dir_b: u8,
        dir_c: u8,
        analog_inputs: u8,
    ) -> Result<(), DriverError> {
        self.execute(Command::Configure {
            dir_a,
            dir_b,
            dir_c,
            analog_inputs,
        })
    }

    pub fn output(&mut self, a: u8, b: u8, c: u8) -> Result<(), DriverError> {
        self.execute(Command::Output { a, b, c })
    }

    pub fn input(&mut self) -> Result<[u8; 3], DriverError> {
        self.query(Command::Input, parse_input)
    }

    pub fn sample_analog(&mut self) -> Result<Vec<u16, MAX_ANALOG_CHANNELS>, DriverError> {
        self.query(Command::SampleAnalog, parse_analog)
    }

    pub fn memory_read(&mut self, address: u16) -> Result<u8, DriverError> {
        self.query(Command::MemoryRead { address }, parse_memory)
            .map(|(_, value)| value)
    }

    pub fn memory_write(&mut self, address: u16, value: u8) -> Result<(), DriverError> {
        self.execute(Command::MemoryWrite { address, value })
    }

    pub fn pin_direction(&mut self, port: u8, pin: u8, input: bool) -> Result<(), DriverError> {
        self.execute(Command::PinDirection { port, pin, input })
    }

    pub fn pin_input(&mut self, port: u8, pin: u8) -> Result<bool, DriverError> {
        self.query(Command::PinInput { port, pin }, |line| Ok(parse_pin(line)))
    }

    pub fn pin_output(&mut self, port: u8, pin: u8, high: bool) -> Result<(), DriverError> {
        self.execute(Command::PinOutput { port, pin, high })
    }

    /// Port A level and strobe shape for following bulk outputs
    pub fn bulk_configure(&mut self, init: u8, timing: BulkTiming) -> Result<(), DriverError> {
        self.execute(Command::BulkConfigure {
            init,
            wait_mask: timing.wait_mask,
            wait_delay: timing.wait_delay,
            strobe_mask: timing.strobe_mask,
            strobe_delay: timing.strobe_delay,
        })
    }

    /// One `BO` line; never acknowledged
    pub fn bulk_output(&mut self, data: &[u8]) -> Result<(), DriverError> {
        let line = Command::BulkOutput(data)
            .encode(self.version)
            .map_err(ubw_error)?;
        self.send_line(&line)
    }

    /// Clock `data` out of port B, strobing port A from level `init`
    ///
    /// The configure line and the first chunk go out in one write and are
    /// acknowledged together; the remaining chunks are streamed.
    pub fn bulk_write(
        &mut self,
        init: u8,
        data: &[u8],
        timing: BulkTiming,
    ) -> Result<(), DriverError> {
        let (first, rest) = split_bulk(data);

        let mut line: String<MAX_LINE_LEN> = String::new();
        Command::BulkConfigure {
            init,
            wait_mask: timing.wait_mask,
            wait_delay: timing.wait_delay,
            strobe_mask: timing.strobe_mask,
            strobe_delay: timing.strobe_delay,
        }
        .encode_into(self.version, &mut line)
        .and_then(|_| Command::BulkOutput(first).encode_into(self.version, &mut line))
        .map_err(ubw_error)?;
        self.send_line(line.as_bytes())?;
        if self.version.acknowledges() {
            self.check_ack()?;
        }

        for chunk in rest {
            self.bulk_output(chunk)?;
        }
        self.serial.flush().map_err(|_| DriverError::Communication)
    }
}
