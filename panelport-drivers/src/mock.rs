//! Recording HAL implementations for driver tests

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use panelport_core::{ByteLink, ControllerBus, DriverError};
use panelport_hal::{ControlLine, StatusLine, UartRx, UartTx, UsbBulkDevice};

/// Something that happened on the parallel port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEvent {
    Data(u8),
    Control(ControlLine, bool),
    Stream(Vec<u8>),
}

/// Parallel port that records every pin write
pub struct MockPort {
    pub events: Vec<PortEvent>,
    /// Level a status read returns once `ready_after` polls have passed
    pub ready_level: bool,
    pub ready_after: u32,
    pub polls: u32,
    pub fail: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            ready_level: false,
            ready_after: 0,
            polls: 0,
            fail: false,
        }
    }

    /// Data bytes written, in order
    pub fn data(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PortEvent::Data(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Writes to one control line, in order
    pub fn levels(&self, line: ControlLine) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PortEvent::Control(l, level) if *l == line => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Last level written to a control line
    pub fn level(&self, line: ControlLine) -> Option<bool> {
        self.levels(line).last().copied()
    }

    /// Bytes passed to `write_stream`, concatenated
    pub fn stream(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PortEvent::Stream(d) => Some(d.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl panelport_hal::ParallelPort for MockPort {
    type Error = ();

    fn write_data(&mut self, byte: u8) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.events.push(PortEvent::Data(byte));
        Ok(())
    }

    fn set_control(&mut self, line: ControlLine, high: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.events.push(PortEvent::Control(line, high));
        Ok(())
    }

    fn status(&mut self, _line: StatusLine) -> Result<bool, ()> {
        self.polls += 1;
        if self.polls > self.ready_after {
            Ok(self.ready_level)
        } else {
            Ok(!self.ready_level)
        }
    }

    fn write_stream(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.events.push(PortEvent::Stream(data.to_vec()));
        Ok(())
    }
}

/// Delay that only adds up the requested time
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Byte link that records everything sent
#[derive(Default)]
pub struct MockLink {
    pub bytes: Vec<u8>,
    pub delay_ms: u32,
    pub flushes: u32,
}

impl ByteLink for MockLink {
    fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DriverError> {
        self.flushes += 1;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_ms += ms;
    }
}

/// One transfer on a controller bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Command(u8),
    Data(Vec<u8>),
    Chip(u8),
    Release,
    Delay(u32),
}

/// Controller bus that records the transfers
#[derive(Default)]
pub struct MockBus {
    pub events: Vec<BusEvent>,
}

impl MockBus {
    /// Command bytes and data bytes in wire order, ignoring chip selects
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for event in &self.events {
            match event {
                BusEvent::Command(c) => out.push(*c),
                BusEvent::Data(d) => out.extend_from_slice(d),
                _ => {}
            }
        }
        out
    }

    /// Total number of data bytes
    pub fn data_len(&self) -> usize {
        self.events
            .iter()
            .map(|e| match e {
                BusEvent::Data(d) => d.len(),
                _ => 0,
            })
            .sum()
    }
}

impl ControllerBus for MockBus {
    fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
        self.events.push(BusEvent::Command(command));
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
        self.events.push(BusEvent::Data(data.to_vec()));
        Ok(())
    }

    fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
        self.events.push(BusEvent::Chip(mask));
        Ok(())
    }

    fn release(&mut self) -> Result<(), DriverError> {
        self.events.push(BusEvent::Release);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(BusEvent::Delay(ms));
    }
}

/// In-memory serial port with scripted replies
#[derive(Default)]
pub struct MockUart {
    pub tx: Vec<u8>,
    pub rx: VecDeque<u8>,
    pub cleared: u32,
    /// Reject writes starting with this prefix, this many times
    pub fail_prefix: Option<&'static [u8]>,
    pub fail_count: u32,
}

impl MockUart {
    pub fn reply(&mut self, line: &str) {
        self.rx.extend(line.bytes());
        self.rx.push_back(b'\n');
    }

    pub fn sent(&self) -> &str {
        core::str::from_utf8(&self.tx).unwrap()
    }
}

impl UartTx for MockUart {
    type Error = ();

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
        if let Some(prefix) = self.fail_prefix {
            if self.fail_count > 0 && data.starts_with(prefix) {
                self.fail_count -= 1;
                return Err(());
            }
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

impl UartRx for MockUart {
    type Error = ();

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        match (self.rx.pop_front(), buf.first_mut()) {
            (Some(byte), Some(slot)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn clear_input(&mut self) -> Result<(), ()> {
        self.cleared += 1;
        Ok(())
    }
}

/// USB device that records control requests and bulk transfers
#[derive(Default)]
pub struct MockUsb {
    pub control: Vec<(u8, u8, u16, u16)>,
    pub bulk: Vec<Vec<u8>>,
    pub product: &'static str,
}

impl UsbBulkDevice for MockUsb {
    type Error = ();

    fn control_out(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
    ) -> Result<(), ()> {
        self.control.push((request_type, request, value, index));
        Ok(())
    }

    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, ()> {
        assert_eq!(endpoint, 0x02);
        self.bulk.push(data.to_vec());
        Ok(data.len())
    }

    fn product_string(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = self.product.len().min(buf.len());
        buf[..n].copy_from_slice(&self.product.as_bytes()[..n]);
        Ok(n)
    }
}
