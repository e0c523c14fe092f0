//! RS-232 link for serial VFD boards

use embedded_hal::delay::DelayNs;
use panelport_core::{ByteLink, DriverError};
use panelport_hal::UartTx;

pub struct SerialByteLink<U, D> {
    uart: U,
    delay: D,
}

impl<U: UartTx, D: DelayNs> SerialByteLink<U, D> {
    pub fn new(uart: U, delay: D) -> Self {
        Self { uart, delay }
    }

    pub fn release(self) -> U {
        self.uart
    }
}

impl<U: UartTx, D: DelayNs> ByteLink for SerialByteLink<U, D> {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.uart
            .write_blocking(data)
            .map_err(|_| DriverError::Communication)
    }

    fn flush(&mut self) -> Result<(), DriverError> {
        self.uart.flush().map_err(|_| DriverError::Communication)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockUart};

    #[test]
    fn test_writes_through() {
        let mut link = SerialByteLink::new(MockUart::default(), MockDelay::default());
        link.write(b"\x1bI").unwrap();
        link.flush().unwrap();
        assert_eq!(link.uart.tx, b"\x1bI");
    }

    #[test]
    fn test_write_error() {
        let mut uart = MockUart::default();
        uart.fail_prefix = Some(b"\x0c");
        uart.fail_count = 1;
        let mut link = SerialByteLink::new(uart, MockDelay::default());
        assert_eq!(link.write(b"\x0c"), Err(DriverError::Communication));
    }
}
