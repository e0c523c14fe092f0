//! Controller buses
//!
//! [`ControllerBus`](panelport_core::ControllerBus) implementations for
//! controllers that distinguish commands from data by a register select
//! line: directly on a parallel port, or through a USB Bit Whacker.

pub mod parallel;
pub mod ubw;

pub use parallel::{BusWiring, ChipEnable, DataPhase, EnableMode, ParallelBus, StrobeLine};
pub use ubw::{UbwBus, UbwWiring};
