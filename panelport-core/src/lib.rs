//! Board-agnostic core of the panel drivers
//!
//! This crate contains everything that does not touch a wire:
//!
//! - [`Bitmap`], the 1-bit framebuffer every panel is drawn through
//! - [`Rect`] and [`diff_bbox`] for dirty-rectangle refresh
//! - [`pack`], reshaping framebuffer regions into controller memory order
//! - Transport traits the chip drivers are written against
//! - Panel configuration types
//!
//! ```text
//!   new frame ──┐
//!               ├── diff_bbox ── Rect ── pack::{rows, columns, page} ── driver
//!   last frame ─┘
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bitmap;
pub mod config;
pub mod geometry;
pub mod pack;
pub mod traits;

pub use bitmap::{diff_bbox, Bitmap};
pub use config::{BusKind, ConfigError, PanelConfig, PanelModel};
pub use geometry::Rect;
pub use traits::{ByteLink, ControllerBus, DriverError, RasterSink};
