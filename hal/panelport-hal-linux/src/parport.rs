//! PC parallel port through the Linux ppdev driver
//!
//! The port is opened from `/dev/parportN`, marked exclusive and claimed
//! for the lifetime of [`Parport`]. Control and status registers are
//! accessed with ioctls; byte streams go through `write(2)`, which makes
//! ppdev run the compatibility-mode handshake (strobe each byte, wait on
//! BUSY) in the kernel.
//!
//! ```text
//! Control register        Status register
//! bit 0  /STROBE  (inv)   bit 3  /ERROR
//! bit 1  /AUTOFD  (inv)   bit 4  SELECT
//! bit 2  /INIT            bit 5  PAPER OUT
//! bit 3  /SELECTIN (inv)  bit 6  /ACK
//!                         bit 7  BUSY    (inv)
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::path::Path;

use log::{debug, info, warn};
use panelport_hal::{ControlLine, ParallelPort, StatusLine};

use crate::LinuxHalError;

/// ppdev ioctl requests (`linux/ppdev.h`)
mod ioctl {
    const PP_IOCTL: u32 = b'p' as u32;
    const WRITE: u32 = 1 << 30;
    const READ: u32 = 2 << 30;

    const fn io(nr: u32) -> u32 {
        (PP_IOCTL << 8) | nr
    }

    const fn iow(nr: u32, size: u32) -> u32 {
        WRITE | (size << 16) | io(nr)
    }

    const fn ior(nr: u32, size: u32) -> u32 {
        READ | (size << 16) | io(nr)
    }

    pub const PPRSTATUS: u32 = ior(0x81, 1);
    pub const PPWDATA: u32 = iow(0x86, 1);
    pub const PPCLAIM: u32 = io(0x8B);
    pub const PPRELEASE: u32 = io(0x8C);
    pub const PPFCONTROL: u32 = iow(0x8E, 2);
    pub const PPEXCL: u32 = io(0x8F);
}

/// `struct ppdev_frob_struct`
#[repr(C)]
struct Frob {
    mask: u8,
    val: u8,
}

/// Control register bit for a line
const fn control_mask(line: ControlLine) -> u8 {
    match line {
        ControlLine::Strobe => 0x01,
        ControlLine::AutoFeed => 0x02,
        ControlLine::InitOut => 0x04,
        ControlLine::Select => 0x08,
    }
}

/// Status register bit for a line
const fn status_mask(line: StatusLine) -> u8 {
    match line {
        StatusLine::Error => 0x08,
        StatusLine::SelectIn => 0x10,
        StatusLine::PaperOut => 0x20,
        StatusLine::Ack => 0x40,
        StatusLine::Busy => 0x80,
    }
}

/// Register value putting `line` at logical level `high`
fn control_value(line: ControlLine, high: bool) -> u8 {
    if high != line.hardware_inverted() {
        control_mask(line)
    } else {
        0
    }
}

/// Logical level of `line` in a status register snapshot
fn status_level(register: u8, line: StatusLine) -> bool {
    let set = register & status_mask(line) != 0;
    set != line.hardware_inverted()
}

/// A claimed ppdev parallel port
pub struct Parport {
    file: File,
}

impl Parport {
    /// Open, mark exclusive and claim the port at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LinuxHalError> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let port = Self { file };
        // PPEXCL has to precede the claim
        port.request(ioctl::PPEXCL)?;
        port.request(ioctl::PPCLAIM)?;
        info!("claimed {}", path.display());
        Ok(port)
    }

    fn request(&self, request: u32) -> io::Result<()> {
        // SAFETY: argument-less ppdev request on an open descriptor
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _) };
        check(rc)
    }

    fn write_register<T>(&self, request: u32, arg: &T) -> io::Result<()> {
        // SAFETY: `arg` matches the size encoded in `request` and outlives
        // the call; the kernel only reads from it
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg as *const T) };
        check(rc)
    }

    fn read_register(&self, request: u32) -> io::Result<u8> {
        let mut value = 0u8;
        // SAFETY: the request writes exactly one byte into `value`
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, &mut value as *mut u8) };
        check(rc)?;
        Ok(value)
    }
}

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl ParallelPort for Parport {
    type Error = LinuxHalError;

    fn write_data(&mut self, byte: u8) -> Result<(), LinuxHalError> {
        Ok(self.write_register(ioctl::PPWDATA, &byte)?)
    }

    fn set_control(&mut self, line: ControlLine, high: bool) -> Result<(), LinuxHalError> {
        let frob = Frob {
            mask: control_mask(line),
            val: control_value(line, high),
        };
        Ok(self.write_register(ioctl::PPFCONTROL, &frob)?)
    }

    fn status(&mut self, line: StatusLine) -> Result<bool, LinuxHalError> {
        let register = self.read_register(ioctl::PPRSTATUS)?;
        Ok(status_level(register, line))
    }

    fn write_stream(&mut self, data: &[u8]) -> Result<(), LinuxHalError> {
        debug!("stream {} bytes", data.len());
        Ok(self.file.write_all(data)?)
    }
}

impl Drop for Parport {
    fn drop(&mut self) {
        if let Err(e) = self.request(ioctl::PPRELEASE) {
            warn!("parport release failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ioctl_numbers() {
        assert_eq!(ioctl::PPEXCL, 0x708F);
        assert_eq!(ioctl::PPCLAIM, 0x708B);
        assert_eq!(ioctl::PPRELEASE, 0x708C);
        assert_eq!(ioctl::PPWDATA, 0x4001_7086);
        assert_eq!(ioctl::PPRSTATUS, 0x8001_7081);
        assert_eq!(ioctl::PPFCONTROL, 0x4002_708E);
    }

    #[test]
    fn test_control_inversion() {
        // /STROBE high at the pin means the register bit is clear
        assert_eq!(control_value(ControlLine::Strobe, true), 0);
        assert_eq!(control_value(ControlLine::Strobe, false), 0x01);
        assert_eq!(control_value(ControlLine::AutoFeed, false), 0x02);
        assert_eq!(control_value(ControlLine::Select, true), 0);
        // /INIT is not inverted
        assert_eq!(control_value(ControlLine::InitOut, true), 0x04);
        assert_eq!(control_value(ControlLine::InitOut, false), 0);
    }

    #[test]
    fn test_status_inversion() {
        assert!(status_level(0x00, StatusLine::Busy));
        assert!(!status_level(0x80, StatusLine::Busy));
        assert!(status_level(0x40, StatusLine::Ack));
        assert!(!status_level(0xBF, StatusLine::Ack));
        assert!(status_level(0x08, StatusLine::Error));
        assert!(status_level(0x30, StatusLine::PaperOut));
        assert!(status_level(0x10, StatusLine::SelectIn));
    }

    #[test]
    fn test_open_missing_node_fails() {
        assert!(matches!(
            Parport::open("/dev/parport-does-not-exist"),
            Err(LinuxHalError::Io(_))
        ));
    }
}
