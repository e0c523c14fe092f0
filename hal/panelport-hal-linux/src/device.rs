//! Device node naming

use std::path::PathBuf;

/// Kind of device node a panel can be attached through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// ppdev parallel port
    Parport,
    /// On-board RS-232 UART
    SerialTty,
    /// USB CDC ACM device (USB Bit Whacker)
    UsbAcm,
}

impl DeviceKind {
    const fn prefix(self) -> &'static str {
        match self {
            DeviceKind::Parport => "/dev/parport",
            DeviceKind::SerialTty => "/dev/ttyS",
            DeviceKind::UsbAcm => "/dev/ttyACM",
        }
    }
}

/// Node for device number `index` of `kind`
pub fn device_path(kind: DeviceKind, index: usize) -> PathBuf {
    PathBuf::from(format!("{}{}", kind.prefix(), index))
}

/// Resolve a configured device: a bare number is an index into `kind`,
/// anything else is taken as a path
pub fn resolve(kind: DeviceKind, device: Option<&str>) -> PathBuf {
    match device {
        None => device_path(kind, 0),
        Some(name) => match name.trim().parse::<usize>() {
            Ok(index) => device_path(kind, index),
            Err(_) => PathBuf::from(name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_paths() {
        assert_eq!(device_path(DeviceKind::Parport, 0), PathBuf::from("/dev/parport0"));
        assert_eq!(device_path(DeviceKind::SerialTty, 1), PathBuf::from("/dev/ttyS1"));
        assert_eq!(device_path(DeviceKind::UsbAcm, 3), PathBuf::from("/dev/ttyACM3"));
    }

    #[test]
    fn test_resolve_index_or_path() {
        assert_eq!(resolve(DeviceKind::Parport, None), PathBuf::from("/dev/parport0"));
        assert_eq!(resolve(DeviceKind::UsbAcm, Some("2")), PathBuf::from("/dev/ttyACM2"));
        assert_eq!(
            resolve(DeviceKind::SerialTty, Some("/dev/ttyUSB0")),
            PathBuf::from("/dev/ttyUSB0")
        );
    }
}
