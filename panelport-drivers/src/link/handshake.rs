//! Software-strobed parallel link with BUSY handshake
//!
//! Per byte the data pins are set first, giving the panel time to release
//! BUSY, then the link polls the ready line and pulses the write strobe.
//!
//! ```text
//! DATA  ═══╤═══════════════╤═══
//! BUSY  ───┘‾‾‾‾‾‾‾‾╲______│___
//! /WR   ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲_╱‾‾‾
//! ```

use embedded_hal::delay::DelayNs;
use panelport_core::{ByteLink, DriverError};
use panelport_hal::{ControlLine, ParallelPort, StatusLine};

/// Line assignment and polarity of a handshaked link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandshakeConfig {
    /// Write strobe line
    pub strobe: ControlLine,
    /// Strobe level that latches the byte
    pub strobe_active_high: bool,
    /// Status line and the level meaning "ready for the next byte"
    pub ready: Option<(StatusLine, bool)>,
    /// Polls of the ready line before giving up
    pub timeout_polls: u32,
    /// Leave the data pins alone when the byte repeats
    pub skip_repeated_data: bool,
}

impl HandshakeConfig {
    /// /WR strobe, wait while BUSY is high (T20A, GU311, GD120C280)
    pub const fn busy_low(strobe: ControlLine, busy: StatusLine, timeout_polls: u32) -> Self {
        Self {
            strobe,
            strobe_active_high: false,
            ready: Some((busy, false)),
            timeout_polls,
            skip_repeated_data: false,
        }
    }

    /// /WR strobe, wait until RDY is high (GU3900DMA)
    pub const fn ready_high(strobe: ControlLine, ready: StatusLine, timeout_polls: u32) -> Self {
        Self {
            strobe,
            strobe_active_high: false,
            ready: Some((ready, true)),
            timeout_polls,
            skip_repeated_data: false,
        }
    }

    pub const fn with_active_high_strobe(mut self) -> Self {
        self.strobe_active_high = true;
        self
    }

    pub const fn with_skip_repeated_data(mut self) -> Self {
        self.skip_repeated_data = true;
        self
    }
}

/// Byte link over a directly driven parallel port
pub struct HandshakeLink<P, D> {
    port: P,
    delay: D,
    config: HandshakeConfig,
    last_data: Option<u8>,
}

impl<P: ParallelPort, D: DelayNs> HandshakeLink<P, D> {
    /// Take over the port and park the strobe at its inactive level
    pub fn new(mut port: P, delay: D, config: HandshakeConfig) -> Result<Self, DriverError> {
        port.set_control(config.strobe, !config.strobe_active_high)
            .map_err(|_| DriverError::Communication)?;
        Ok(Self {
            port,
            delay,
            config,
            last_data: None,
        })
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Access the port, e.g. to park unused lines
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn release(self) -> P {
        self.port
    }

    fn wait_ready(&mut self) -> Result<(), DriverError> {
        let Some((line, level)) = self.config.ready else {
            return Ok(());
        };
        for _ in 0..self.config.timeout_polls.max(1) {
            let current = self
                .port
                .status(line)
                .map_err(|_| DriverError::Communication)?;
            if current == level {
                return Ok(());
            }
        }
        log::warn!("{:?} stuck busy after {} polls", line, self.config.timeout_polls);
        Err(DriverError::Timeout)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DriverError> {
        if !self.config.skip_repeated_data || self.last_data != Some(byte) {
            self.port
                .write_data(byte)
                .map_err(|_| DriverError::Communication)?;
            self.last_data = Some(byte);
        }
        self.wait_ready()?;

        let active = self.config.strobe_active_high;
        self.port
            .set_control(self.config.strobe, active)
            .and_then(|_| self.port.set_control(self.config.strobe, !active))
            .map_err(|_| DriverError::Communication)
    }
}

impl<P: ParallelPort, D: DelayNs> ByteLink for HandshakeLink<P, D> {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        data.iter().try_for_each(|&byte| self.write_byte(byte))
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockPort, PortEvent};

    fn busy_low() -> HandshakeConfig {
        HandshakeConfig::busy_low(ControlLine::Strobe, StatusLine::Busy, 10)
    }

    #[test]
    fn test_strobe_parked_inactive() {
        let link = HandshakeLink::new(MockPort::new(), MockDelay::default(), busy_low()).unwrap();
        assert_eq!(link.port.events, [PortEvent::Control(ControlLine::Strobe, true)]);
    }

    #[test]
    fn test_byte_then_active_low_pulse() {
        let mut link =
            HandshakeLink::new(MockPort::new(), MockDelay::default(), busy_low()).unwrap();
        link.port.events.clear();
        link.write(&[0x1B, 0x49]).unwrap();
        assert_eq!(
            link.port.events,
            [
                PortEvent::Data(0x1B),
                PortEvent::Control(ControlLine::Strobe, false),
                PortEvent::Control(ControlLine::Strobe, true),
                PortEvent::Data(0x49),
                PortEvent::Control(ControlLine::Strobe, false),
                PortEvent::Control(ControlLine::Strobe, true),
            ]
        );
    }

    #[test]
    fn test_active_high_strobe() {
        let config = HandshakeConfig::ready_high(ControlLine::Strobe, StatusLine::Busy, 10)
            .with_active_high_strobe();
        let mut port = MockPort::new();
        port.ready_level = true;
        let mut link = HandshakeLink::new(port, MockDelay::default(), config).unwrap();
        link.write(&[0x0C]).unwrap();
        assert_eq!(
            link.port.levels(ControlLine::Strobe),
            [false, true, false]
        );
    }

    #[test]
    fn test_waits_for_ready() {
        let mut port = MockPort::new();
        port.ready_after = 3;
        let mut link = HandshakeLink::new(port, MockDelay::default(), busy_low()).unwrap();
        link.write(&[0x55]).unwrap();
        assert_eq!(link.port.polls, 4);
    }

    #[test]
    fn test_busy_forever_times_out() {
        let mut port = MockPort::new();
        port.ready_after = u32::MAX;
        let mut link = HandshakeLink::new(port, MockDelay::default(), busy_low()).unwrap();
        assert_eq!(link.write(&[0x55]), Err(DriverError::Timeout));
        assert_eq!(link.port.polls, 10);
        // Nothing strobed after the data byte
        assert_eq!(link.port.levels(ControlLine::Strobe), [true]);
    }

    #[test]
    fn test_skip_repeated_data() {
        let config = busy_low().with_skip_repeated_data();
        let mut link = HandshakeLink::new(MockPort::new(), MockDelay::default(), config).unwrap();
        link.write(&[0x1F, 0x1F, 0x1D, 0x1D, 0x1F]).unwrap();
        assert_eq!(link.port.data(), [0x1F, 0x1D, 0x1F]);
        // One pulse per byte regardless
        assert_eq!(link.port.levels(ControlLine::Strobe).len(), 1 + 5 * 2);
    }

    #[test]
    fn test_port_failure_is_communication_error() {
        let mut link =
            HandshakeLink::new(MockPort::new(), MockDelay::default(), busy_low()).unwrap();
        link.port.fail = true;
        assert_eq!(link.write(&[0x00]), Err(DriverError::Communication));
    }
}
