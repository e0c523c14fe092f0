use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay on the calling thread
///
/// Sleeps of a few microseconds round up to the scheduler tick, which is
/// longer than any controller setup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}
