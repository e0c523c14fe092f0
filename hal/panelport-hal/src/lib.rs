//! panelport Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display drivers are written
//! against. A host implementation (Linux ppdev, serial ttys, libusb) lives in
//! `panelport-hal-linux`; a microcontroller can implement the same traits
//! over its own GPIO and UART peripherals.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  panelport-display / panelport-cli      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  panelport-drivers (links, buses, chips)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  panelport-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ panelport-hal-│
//!             │     linux     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`parallel::ParallelPort`] - PC parallel port data, control and status lines
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`usb::UsbBulkDevice`] - Vendor control and bulk transfers (FTDI bit-bang)
//!
//! Delays use [`embedded_hal::delay::DelayNs`] directly.

#![no_std]
#![deny(unsafe_code)]

pub mod parallel;
pub mod uart;
pub mod usb;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use parallel::{ControlLine, ParallelPort, StatusLine};
pub use uart::{DataBits, Handshake, Parity, StopBits, Uart, UartConfig, UartRx, UartTx};
pub use usb::UsbBulkDevice;
