//! Display controller drivers
//!
//! This crate turns each controller's command vocabulary into traffic on a
//! transport defined in panelport-core:
//!
//! - Byte links (handshaked parallel, kernel stream, serial, FTDI bit-bang)
//! - Controller buses (register-select parallel wiring, USB Bit Whacker)
//! - Chip drivers (KS0108, T6963C, SED13xx, SED1520, Noritake VFDs, Babcock
//!   plasma)
//! - Raster frame builders for controllerless EL and LCD glass
//!
//! ```text
//!   chip driver ──► ControllerBus ──► ParallelBus ──► ParallelPort
//!        │                      └───► UbwBus ──► UsbBitWhacker ──► Uart
//!        └────────► ByteLink ──► HandshakeLink / StreamLink / Serial / Ftdi
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bus;
pub mod controller;
pub mod ftdi;
pub mod link;
pub mod raster;
pub mod ubw;

#[cfg(test)]
pub(crate) mod mock;

pub use ftdi::Ft232r;
pub use ubw::UsbBitWhacker;
