//! Transport traits
//!
//! Chip drivers never see a parallel port or a serial tty. They talk to
//! one of three seams:
//!
//! - [`ByteLink`] for panels with their own command interpreter fed a byte
//!   stream (Noritake VFDs, Babcock plasma)
//! - [`ControllerBus`] for register-select style controllers that need a
//!   command/data distinction and chip selects (KS0108, SED13xx, T6963C)
//! - [`RasterSink`] for controllerless panels that take whole frames

pub mod bus;

pub use bus::{ByteLink, ControllerBus, DriverError, RasterSink};
