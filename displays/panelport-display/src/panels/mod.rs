//! One [`Panel`](crate::Panel) per supported model
//!
//! | Layout     | Panels                                          |
//! |------------|-------------------------------------------------|
//! | rows       | T6963C, SED1330, EL320.240, EL640.200-SK, LCD4  |
//! | columns    | GU3900, GU3900DMA, GU7000, GU300, GD120C280     |
//! | pages      | KS0108, SED1520, GU311                          |
//! | characters | T20A, S20A                                      |

pub mod character;
pub mod columns;
pub mod pages;
pub mod rows;

pub use character::{S20aPanel, T20aPanel};
pub use columns::{Gd120c280Panel, Gu300Panel, Gu3900DmaPanel, Gu3900Panel, Gu7000Panel};
pub use pages::{Gu311Panel, Ks0108Panel, Sed1520Panel};
pub use rows::{Lcd4Panel, PlanarPanel, Sed1330Panel, T6963cPanel};

use panelport_core::DriverError;

fn to_u8(value: u32) -> Result<u8, DriverError> {
    u8::try_from(value).map_err(|_| DriverError::InvalidArgument)
}

fn to_u16(value: u32) -> Result<u16, DriverError> {
    u16::try_from(value).map_err(|_| DriverError::InvalidArgument)
}


/// Compositor end to end against recording transports
#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::Rectangle;
    use panelport_core::{ByteLink, ControllerBus, DriverError};
    use panelport_drivers::controller::{Gu7000, Ks0108, T6963c};

    use super::{Gu7000Panel, Ks0108Panel, T6963cPanel};
    use crate::{Clock, Compositor, Truchet};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Command(u8),
        Data(Vec<u8>),
        Chip(u8),
    }

    /// Bus whose log stays readable after the driver took ownership
    #[derive(Clone, Default)]
    struct SharedBus(Rc<RefCell<Vec<Op>>>);

    impl SharedBus {
        fn take(&self) -> Vec<Op> {
            core::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl ControllerBus for SharedBus {
        fn write_command(&mut self, command: u8) -> Result<(), DriverError> {
            self.0.borrow_mut().push(Op::Command(command));
            Ok(())
        }

        fn write_data(&mut self, data: &[u8]) -> Result<(), DriverError> {
            self.0.borrow_mut().push(Op::Data(data.to_vec()));
            Ok(())
        }

        fn select_chip(&mut self, mask: u8) -> Result<(), DriverError> {
            self.0.borrow_mut().push(Op::Chip(mask));
            Ok(())
        }

        fn delay_ms(&mut self, _ms: u32) {}
    }

    #[derive(Clone, Default)]
    struct SharedLink(Rc<RefCell<Vec<u8>>>);

    impl ByteLink for SharedLink {
        fn write(&mut self, data: &[u8]) -> Result<(), DriverError> {
            self.0.borrow_mut().extend_from_slice(data);
            Ok(())
        }

        fn delay_ms(&mut self, _ms: u32) {}
    }

    fn data_bytes(ops: &[Op]) -> usize {
        ops.iter()
            .map(|op| match op {
                Op::Data(d) => d.len(),
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_ks0108_full_clear_then_small_update() {
        let bus = SharedBus::default();
        let panel = Ks0108Panel::new(Ks0108::new(bus.clone()), 128, 64);
        let mut display = Compositor::new(panel).unwrap();

        // 8 pages on 2 chips, 64 bytes each
        let ops = bus.take();
        assert_eq!(data_bytes(&ops), 8 * 128);

        display.point(Point::new(3, 3)).unwrap();
        let ops = bus.take();
        assert_eq!(
            ops,
            [
                Op::Chip(0b01),
                Op::Command(0xB8),
                Op::Command(0x40),
                Op::Data(vec![0, 0, 0, 0x08, 0, 0, 0, 0]),
            ]
        );

        // nothing changed, nothing sent
        display.point(Point::new(3, 3)).unwrap();
        assert!(bus.take().is_empty());
    }

    #[test]
    fn test_t6963c_rectangle_rows() {
        let bus = SharedBus::default();
        let panel = T6963cPanel::new(T6963c::new(bus.clone(), 240, 128), 240, 128);
        let mut display = Compositor::new(panel).unwrap();
        bus.take();

        display
            .rectangle(Rectangle::new(Point::new(10, 20), Size::new(30, 5)), true)
            .unwrap();
        let ops = bus.take();
        // address pointer row 20 * 30 bytes, then five full rows
        assert_eq!(ops[0], Op::Data(600u16.to_le_bytes().to_vec()));
        assert_eq!(data_bytes(&ops), 2 + 5 * 30);
    }

    #[test]
    fn test_widget_and_tiler_on_a_vfd() {
        let link = SharedLink::default();
        let panel = Gu7000Panel::new(Gu7000::new(link.clone()), 140, 32);
        let mut display = Compositor::new(panel).unwrap();

        let mut clock = Clock::new(panelport_core::Rect::from_size(0, 0, 64, 20));
        clock.set_time(10, 9);
        display.widget(&mut clock).unwrap();
        assert!(display.frame().as_bytes().iter().any(|&b| b != 0));

        let mut truchet = Truchet::new(140, 32, 42);
        let before = link.0.borrow().len();
        truchet.step(&mut display).unwrap();
        assert!(link.0.borrow().len() > before);
    }
}
