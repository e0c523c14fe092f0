//! Serial ttys through the `serialport` crate
//!
//! RTS/CTS is left to the tty driver. DTR/DSR has no termios flag, so
//! [`SerialLink`] raises DTR on open and waits for DSR before each chunk.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use panelport_hal::{DataBits, Handshake, Parity, StopBits, UartConfig, UartRx, UartTx};
use serialport::{ClearBuffer, FlowControl, SerialPort};

use crate::LinuxHalError;

/// Bytes written between two DSR checks
const HANDSHAKE_CHUNK: usize = 16;

/// Interval between DSR polls
const DSR_POLL: Duration = Duration::from_millis(1);

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn flow_control(handshake: Handshake) -> FlowControl {
    match handshake {
        Handshake::RtsCts => FlowControl::Hardware,
        Handshake::None | Handshake::DtrDsr => FlowControl::None,
    }
}

/// An open tty implementing the UART traits
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    handshake: Handshake,
    timeout: Duration,
}

impl SerialLink {
    pub fn open(path: &str, config: &UartConfig) -> Result<Self, LinuxHalError> {
        let timeout = Duration::from_millis(config.write_timeout_ms as u64);
        let mut port = serialport::new(path, config.baudrate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .flow_control(flow_control(config.handshake))
            .timeout(timeout)
            .open()?;
        if config.handshake == Handshake::DtrDsr {
            port.write_data_terminal_ready(true)?;
        }
        info!("opened {} at {} baud", path, config.baudrate);
        Ok(Self {
            port,
            handshake: config.handshake,
            timeout,
        })
    }

    fn wait_dsr(&mut self) -> Result<(), LinuxHalError> {
        let start = Instant::now();
        while !self.port.read_data_set_ready()? {
            if start.elapsed() >= self.timeout {
                return Err(LinuxHalError::HandshakeTimeout);
            }
            thread::sleep(DSR_POLL);
        }
        Ok(())
    }
}

impl UartTx for SerialLink {
    type Error = LinuxHalError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), LinuxHalError> {
        if self.handshake != Handshake::DtrDsr {
            return Ok(self.port.write_all(data)?);
        }
        for chunk in data.chunks(HANDSHAKE_CHUNK) {
            self.wait_dsr()?;
            self.port.write_all(chunk)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinuxHalError> {
        Ok(self.port.flush()?)
    }
}

impl UartRx for SerialLink {
    type Error = LinuxHalError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, LinuxHalError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                debug!("serial read timed out");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn clear_input(&mut self) -> Result<(), LinuxHalError> {
        Ok(self.port.clear(ClearBuffer::Input)?)
    }
}
