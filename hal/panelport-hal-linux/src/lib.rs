//! Linux implementations of the panelport HAL traits
//!
//! | Trait                         | Implementation | Backend               |
//! |-------------------------------|----------------|-----------------------|
//! | [`ParallelPort`]              | [`Parport`]    | ppdev ioctls          |
//! | [`UartTx`] + [`UartRx`]       | [`SerialLink`] | `serialport` crate    |
//! | [`UsbBulkDevice`]             | `FtdiUsb`      | libusb via `rusb`     |
//! | [`DelayNs`]                   | [`StdDelay`]   | `std::thread::sleep`  |
//!
//! # Usage
//!
//! ```ignore
//! use panelport_hal_linux::{device_path, DeviceKind, Parport, StdDelay};
//!
//! let port = Parport::open(&device_path(DeviceKind::Parport, 0))?;
//! let link = StreamLink::new(port, StdDelay);
//! ```
//!
//! [`ParallelPort`]: panelport_hal::ParallelPort
//! [`UartTx`]: panelport_hal::UartTx
//! [`UartRx`]: panelport_hal::UartRx
//! [`UsbBulkDevice`]: panelport_hal::UsbBulkDevice
//! [`DelayNs`]: panelport_hal::DelayNs

pub mod delay;
pub mod device;
pub mod error;
pub mod parport;
pub mod serial;
#[cfg(feature = "usb")]
pub mod usb;

pub use delay::StdDelay;
pub use device::{device_path, resolve, DeviceKind};
pub use error::LinuxHalError;
pub use parport::Parport;
pub use serial::SerialLink;
#[cfg(feature = "usb")]
pub use usb::{FtdiDeviceInfo, FtdiUsb};
