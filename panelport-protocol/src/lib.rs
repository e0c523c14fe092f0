//! Adapter wire protocols
//!
//! Two USB adapters can stand in for a parallel port:
//!
//! - The USB Bit Whacker (UBW), a PIC18 board that enumerates as a CDC
//!   serial port and takes line-oriented ASCII commands. See [`ubw`].
//! - FTDI FT232R/FT245R chips put into synchronous bit-bang mode with vendor
//!   control requests, then fed pin states over a bulk endpoint. See [`ftdi`].
//!
//! ```text
//! UBW command line (firmware 1.4):
//! ┌──────┬───┬──────────────────────┬────┐
//! │ NAME │ , │ ARG,ARG,...  or  HEX │ \n │
//! └──────┴───┴──────────────────────┴────┘
//!   reply: "OK" (firmware >= 1.3) or a data line ("I,12,0,255")
//! ```
//!
//! Both modules only encode and decode; the transports live in
//! `panelport-drivers`.

#![no_std]
#![deny(unsafe_code)]

pub mod ftdi;
pub mod ubw;

pub use ftdi::{BitMode, ControlRequest};
pub use ubw::{Command, FirmwareVersion, UbwError, MAX_LINE_LEN};
