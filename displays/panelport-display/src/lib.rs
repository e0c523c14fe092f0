//! Framebuffer compositor and panel refresh strategies
//!
//! This crate provides:
//! - [`Panel`], one implementation per supported model, packing a dirty
//!   region into whatever its controller wants
//! - [`Compositor`], which owns the last shown frame and only sends what
//!   changed
//! - [`Canvas`], an embedded-graphics draw target over a [`Bitmap`]
//! - Widgets (clock, date, system gauges, ticker, Truchet tiler) rendered
//!   through the compositor
//!
//! # Architecture
//!
//! ```text
//!   draw / bitmap / widget
//!            │
//!      ┌─────▼──────┐  diff_bbox   ┌───────┐  pack::*  ┌────────────┐
//!      │ Compositor ├─────────────►│ Panel ├──────────►│ chip driver│
//!      └────────────┘   dirty Rect └───────┘           └────────────┘
//! ```
//!
//! Panels never see the previous frame. They get the complete new image and
//! the rectangle that changed, and decide how much around it to resend.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod canvas;
pub mod compositor;
pub mod panel;
pub mod panels;
pub mod widget;

pub use canvas::Canvas;
pub use compositor::Compositor;
pub use panel::{AfterClear, DiffPolicy, Layout, Panel};
pub use widget::{
    Chart, Clock, CpuModel, Date, Gauge, Reading, Ticker, Truchet, Usage, UsageList, Widget,
};

pub use panelport_core::{Bitmap, DriverError, Rect};
