//! Per-chip command vocabularies
//!
//! | Controller  | Transport       | Panels                      |
//! |-------------|-----------------|-----------------------------|
//! | KS0108      | ControllerBus   | 128x64 LCD modules          |
//! | T6963C      | ControllerBus   | 240x128 and similar LCDs    |
//! | SED1330     | ControllerBus   | SED1335, S1D13305 LCDs      |
//! | SED1520     | ControllerBus   | 122x32 LCD modules          |
//! | GU300       | ControllerBus   | Noritake GU355, GU372       |
//! | S20A        | ControllerBus   | Noritake S20A text VFD      |
//! | GU311       | ByteLink        | Noritake GU128x32-311       |
//! | GU3900      | ByteLink        | Noritake GU3000 series      |
//! | GU3900DMA   | ByteLink        | GU3000 with DMA interface   |
//! | GU7000      | ByteLink        | Noritake GU7000 series      |
//! | T20A        | ByteLink        | Noritake T20A text VFD      |
//! | GD120C280   | ByteLink        | Babcock 280x120 plasma      |
//!
//! Controllers with a parallel bus export `bus_wiring`, turning a
//! [`WiringConfig`](panelport_core::config::WiringConfig) into the
//! [`BusWiring`](crate::bus::BusWiring) for that chip. Handshaked byte
//! stream modules export `handshake` instead.

pub mod gd120c280;
pub mod gu300;
pub mod gu311;
pub mod gu3900;
pub mod gu3900dma;
pub mod gu7000;
pub mod ks0108;
pub mod s20a;
pub mod sed1330;
pub mod sed1520;
pub mod t20a;
pub mod t6963c;

pub use gd120c280::Gd120c280;
pub use gu300::Gu300;
pub use gu311::Gu311;
pub use gu3900::Gu3900;
pub use gu3900dma::Gu3900Dma;
pub use gu7000::Gu7000;
pub use ks0108::{Ks0108, Ks0108Text};
pub use s20a::S20a;
pub use sed1330::Sed1330;
pub use sed1520::Sed1520;
pub use t20a::T20a;
pub use t6963c::T6963c;
