//! Kernel-handshaked parallel link
//!
//! The port driver strobes each byte and waits on BUSY itself, exactly as
//! for a printer. Panels that tolerate the kernel's timing (GU7000, the
//! raster panels with an external pixel clock) go through here.

use embedded_hal::delay::DelayNs;
use panelport_core::{ByteLink, DriverError};
use panelport_hal::ParallelPort;

pub struct StreamLink<P, D> {
    port: P,
    delay: D,
}

impl<P: ParallelPort, D: DelayNs> StreamLink<P, D> {
    pub fn new(port: P, delay: D) -> Self {
        Self { port, delay }
    }

    pub fn release(self) -> P {
        self.port
    }
}

impl<P: ParallelPort, D: DelayNs> ByteLink for StreamLink<P, D> {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        if data.is_empty() {
            return Ok(());
        }
        self.port
            .write_stream(data)
            .map_err(|_| DriverError::Communication)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
