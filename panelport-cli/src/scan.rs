//! Background rescanning of controllerless LCD glass
//!
//! The glass keeps no image, so a thread owns the link and clocks the most
//! recently submitted frame in over and over until the sink is dropped.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use panelport_core::{ByteLink, DriverError, RasterSink};

/// Idle wait while no frame was submitted yet
const IDLE: Duration = Duration::from_millis(10);

/// Back-off after a failed write
const RETRY: Duration = Duration::from_millis(100);

type Latest = Arc<Mutex<Option<Arc<Vec<u8>>>>>;

pub struct ScanThread {
    latest: Latest,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ScanThread {
    /// Start rescanning over `link`
    pub fn spawn<L: ByteLink + Send + 'static>(mut link: L) -> io::Result<Self> {
        let latest: Latest = Arc::default();
        let stop = Arc::new(AtomicBool::new(false));

        let frame = Arc::clone(&latest);
        let stopped = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("raster-scan".into())
            .spawn(move || scan(&mut link, &frame, &stopped))?;

        Ok(Self {
            latest,
            stop,
            handle: Some(handle),
        })
    }
}

fn scan<L: ByteLink>(link: &mut L, latest: &Mutex<Option<Arc<Vec<u8>>>>, stop: &AtomicBool) {
    let mut scans: u64 = 0;
    while !stop.load(Ordering::Relaxed) {
        let frame = match latest.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                warn!("raster frame lock poisoned, stopping scan");
                return;
            }
        };
        let Some(frame) = frame else {
            thread::sleep(IDLE);
            continue;
        };
        if let Err(e) = link.write(&frame) {
            warn!("raster scan write failed: {}", e);
            thread::sleep(RETRY);
            continue;
        }
        scans += 1;
    }
    debug!("raster scan stopped after {} frames", scans);
}

impl RasterSink for ScanThread {
    fn submit(&mut self, frame: Vec<u8>) -> Result<(), DriverError> {
        let mut latest = self.latest.lock().map_err(|_| DriverError::Communication)?;
        *latest = Some(Arc::new(frame));
        Ok(())
    }
}

impl Drop for ScanThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("raster scan thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct Capture {
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_first: Arc<AtomicBool>,
    }

    impl ByteLink for Capture {
        fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
            if self.fail_first.swap(false, Ordering::Relaxed) {
                return Err(DriverError::Communication);
            }
            self.writes.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        fn delay_ms(&mut self, _ms: u32) {}
    }

    fn wait_for(capture: &Capture, count: usize) {
        let start = Instant::now();
        while capture.writes.lock().unwrap().len() < count {
            assert!(start.elapsed() < Duration::from_secs(5), "scan thread stalled");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_rescans_latest_frame() {
        let capture = Capture::default();
        let mut sink = ScanThread::spawn(capture.clone()).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(capture.writes.lock().unwrap().is_empty());

        sink.submit(vec![1, 2, 3]).unwrap();
        wait_for(&capture, 3);
        sink.submit(vec![4]).unwrap();
        let seen = capture.writes.lock().unwrap().len();
        wait_for(&capture, seen + 3);
        drop(sink);

        let writes = capture.writes.lock().unwrap();
        assert!(writes.iter().all(|w| w == &[1, 2, 3] || w == &[4]));
        assert_eq!(writes.last().unwrap(), &[4]);
    }

    #[test]
    fn test_write_failure_does_not_stop_scanning() {
        let capture = Capture::default();
        capture.fail_first.store(true, Ordering::Relaxed);
        let mut sink = ScanThread::spawn(capture.clone()).unwrap();
        sink.submit(vec![0xAA]).unwrap();
        wait_for(&capture, 2);
    }

    #[test]
    fn test_drop_joins_thread() {
        let capture = Capture::default();
        let sink = ScanThread::spawn(capture.clone()).unwrap();
        drop(sink);
        // Only the test holds the capture now
        assert_eq!(Arc::strong_count(&capture.writes), 1);
    }
}
