use std::fmt::{Display, Formatter};
use std::io;

/// Error from any of the host transports
#[derive(Debug)]
pub enum LinuxHalError {
    Io(io::Error),
    Serial(serialport::Error),
    #[cfg(feature = "usb")]
    Usb(rusb::Error),
    /// No device at this index
    NoDevice(usize),
    /// DSR stayed low for the whole write timeout
    HandshakeTimeout,
}

impl From<io::Error> for LinuxHalError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serialport::Error> for LinuxHalError {
    fn from(value: serialport::Error) -> Self {
        Self::Serial(value)
    }
}

#[cfg(feature = "usb")]
impl From<rusb::Error> for LinuxHalError {
    fn from(value: rusb::Error) -> Self {
        Self::Usb(value)
    }
}

impl Display for LinuxHalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Serial(e) => e.fmt(f),
            #[cfg(feature = "usb")]
            Self::Usb(e) => e.fmt(f),
            Self::NoDevice(index) => write!(f, "no device with index {}", index),
            Self::HandshakeTimeout => write!(f, "timed out waiting for DSR"),
        }
    }
}

impl std::error::Error for LinuxHalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serial(e) => Some(e),
            #[cfg(feature = "usb")]
            Self::Usb(e) => Some(e),
            _ => None,
        }
    }
}
