//! Hardware bring-up: from a [`PanelConfig`] to a live [`Panel`]
//!
//! ```text
//!  model + bus ──► transport ──► link / bus ──► chip driver ──► panel
//!                  Parport       HandshakeLink   Gu3900          Gu3900Panel
//!                  SerialLink    StreamLink      T6963c          T6963cPanel
//!                  FtdiUsb       ParallelBus     ...             ...
//!                                UbwBus
//! ```

use std::fmt::Display;

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use panelport_core::config::{BusKind, ConfigError, PanelConfig, PanelModel, WiringConfig};
use panelport_core::{ByteLink, ControllerBus, DriverError};
use panelport_display::panels::{
    Gd120c280Panel, Gu300Panel, Gu311Panel, Gu3900DmaPanel, Gu3900Panel, Gu7000Panel,
    Ks0108Panel, Lcd4Panel, PlanarPanel, S20aPanel, Sed1330Panel, Sed1520Panel, T20aPanel,
    T6963cPanel,
};
use panelport_display::Panel;
use panelport_drivers::bus::{BusWiring, ParallelBus, UbwBus, UbwWiring};
use panelport_drivers::controller::{
    gd120c280, gu300, gu311, gu3900, gu3900dma, ks0108, s20a, sed1330, sed1520, t20a, t6963c,
    Gd120c280, Gu300, Gu311, Gu3900, Gu3900Dma, Gu7000, Ks0108, S20a, Sed1330, Sed1520, T20a,
    T6963c,
};
use panelport_drivers::link::{FtdiLink, HandshakeConfig, HandshakeLink, SerialByteLink, StreamLink};
use panelport_drivers::raster::{FourBitLcd, PixelClock, Planar, PlanarModel};
use panelport_drivers::UsbBitWhacker;
use panelport_hal_linux::{resolve, DeviceKind, FtdiUsb, Parport, SerialLink, StdDelay};
use panelport_protocol::ftdi::{RASTER_BAUD_DIVISOR, VFD_BAUD_DIVISOR};

use crate::scan::ScanThread;

pub type Link = Box<dyn ByteLink + Send>;
pub type Bus = Box<dyn ControllerBus + Send>;

type HandshakeFn = fn(&WiringConfig, u32) -> Result<HandshakeConfig, ConfigError>;
type WiringFn = fn(&WiringConfig) -> Result<BusWiring, ConfigError>;

/// Attach context to errors that only implement [`Display`]
pub trait ReportDisplay<T> {
    fn report(self, what: &str) -> Result<T>;
}

impl<T, E: Display> ReportDisplay<T> for core::result::Result<T, E> {
    fn report(self, what: &str) -> Result<T> {
        self.map_err(|e| eyre!("{}: {}", what, e))
    }
}

pub fn parport(config: &PanelConfig) -> Result<Parport> {
    let path = resolve(DeviceKind::Parport, config.device.as_deref());
    Parport::open(&path).wrap_err_with(|| format!("cannot claim {}", path.display()))
}

pub fn serial(config: &PanelConfig, kind: DeviceKind) -> Result<SerialLink> {
    let path = resolve(kind, config.device.as_deref());
    let path = path.to_string_lossy();
    SerialLink::open(&path, &config.uart_config()).wrap_err_with(|| format!("cannot open {}", path))
}

/// FTDI device index; `device` is a number for USB panels
pub fn usb_index(config: &PanelConfig) -> Result<usize> {
    match config.device.as_deref() {
        None => Ok(0),
        Some(device) => device
            .trim()
            .parse()
            .map_err(|_| eyre!("USB device must be an index, got {:?}", device)),
    }
}

pub fn usb(config: &PanelConfig) -> Result<FtdiUsb> {
    let index = usb_index(config)?;
    FtdiUsb::open(index).wrap_err_with(|| format!("cannot open FTDI device {}", index))
}

/// A USB Bit Whacker on its CDC tty; the firmware revision is probed
pub fn ubw(config: &PanelConfig) -> Result<UsbBitWhacker<SerialLink>> {
    UsbBitWhacker::open(serial(config, DeviceKind::UsbAcm)?).report("USB Bit Whacker not answering")
}

fn handshake_link(config: &PanelConfig, port: Parport, handshake: HandshakeFn) -> Result<Link> {
    let handshake = handshake(&config.wiring(), config.busy_timeout_polls).report("wiring")?;
    debug!("handshake {:?}", handshake);
    Ok(Box::new(
        HandshakeLink::new(port, StdDelay, handshake).report("parallel handshake")?,
    ))
}

/// Byte stream to a panel that parses its own commands
///
/// Without a handshake the parallel port runs in kernel compatibility
/// mode, paced by the panel's BUSY line.
fn byte_link(config: &PanelConfig, handshake: Option<HandshakeFn>, baud_divisor: u16) -> Result<Link> {
    match config.bus() {
        BusKind::Parallel => {
            let port = parport(config)?;
            match handshake {
                Some(handshake) => handshake_link(config, port, handshake),
                None => Ok(Box::new(StreamLink::new(port, StdDelay))),
            }
        }
        BusKind::Serial => Ok(Box::new(SerialByteLink::new(
            serial(config, DeviceKind::SerialTty)?,
            StdDelay,
        ))),
        BusKind::Usb => Ok(Box::new(
            FtdiLink::new(usb(config)?, StdDelay, baud_divisor).report("FTDI bit-bang")?,
        )),
        BusKind::Ubw => bail!("{} takes a byte stream, not a USB Bit Whacker", config.model),
    }
}

/// Register-select bus on the parallel port or a USB Bit Whacker
fn controller_bus(config: &PanelConfig, wiring: WiringFn, ubw_wiring: Option<UbwWiring>) -> Result<Bus> {
    match (config.bus(), ubw_wiring) {
        (BusKind::Parallel, _) => {
            let wiring = wiring(&config.wiring()).report("wiring")?;
            let bus = ParallelBus::new(parport(config)?, StdDelay, wiring, config.fast_write)
                .report("parallel bus")?;
            Ok(Box::new(bus))
        }
        (BusKind::Ubw, Some(ubw_wiring)) => {
            let bus = UbwBus::new(ubw(config)?, StdDelay, ubw_wiring).report("USB Bit Whacker bus")?;
            Ok(Box::new(bus))
        }
        (bus, _) => bail!("{} cannot be driven over {}", config.model, bus.name()),
    }
}

/// Raster link and the pixel clock it implies
fn raster_link(config: &PanelConfig, baud_divisor: u16) -> Result<(Link, PixelClock)> {
    match config.bus() {
        BusKind::Parallel => Ok((
            Box::new(StreamLink::new(parport(config)?, StdDelay)),
            PixelClock::External,
        )),
        BusKind::Usb => Ok((
            Box::new(FtdiLink::new(usb(config)?, StdDelay, baud_divisor).report("FTDI bit-bang")?),
            PixelClock::BitBang,
        )),
        bus => bail!("{} cannot be driven over {}", config.model, bus.name()),
    }
}

fn init(result: core::result::Result<(), DriverError>, model: PanelModel) -> Result<()> {
    result.map_err(|e| eyre!("{} did not initialize: {}", model, e))
}

/// Bring up the configured panel, leaving it cleared
pub fn open_panel(config: &PanelConfig) -> Result<Box<dyn Panel>> {
    config
        .validate()
        .map_err(|e| eyre!("invalid configuration for {}: {}", config.model, e))?;
    let model = config.model;
    let (width, height) = config.size();
    info!("bringing up {} ({}x{}) over {}", model, width, height, config.bus().name());

    let mut panel: Box<dyn Panel> = match model {
        PanelModel::T6963c => {
            let mut lcd = T6963c::new(controller_bus(config, t6963c::bus_wiring, None)?, width, height);
            init(lcd.init(), model)?;
            Box::new(T6963cPanel::new(lcd, width, height))
        }
        PanelModel::Ks0108 => {
            let bus = controller_bus(config, ks0108::bus_wiring, Some(UbwWiring::KS0108))?;
            let mut lcd = Ks0108::new(bus);
            init(lcd.init(), model)?;
            Box::new(Ks0108Panel::new(lcd, width, height))
        }
        PanelModel::Sed1330 => {
            let bus = controller_bus(config, sed1330::bus_wiring, Some(UbwWiring::SED1330))?;
            info!("SED1330 oscillator {} Hz", config.oscillator_hz);
            let mut lcd = Sed1330::new(bus, width, height);
            init(lcd.init(), model)?;
            Box::new(Sed1330Panel::new(lcd, width, height))
        }
        PanelModel::Sed1520 => {
            let mut lcd = Sed1520::new(controller_bus(config, sed1520::bus_wiring, None)?);
            init(lcd.init(), model)?;
            Box::new(Sed1520Panel::new(lcd))
        }
        PanelModel::Gu300 => {
            let mut vfd = Gu300::new(controller_bus(config, gu300::bus_wiring, None)?);
            init(vfd.init(), model)?;
            Box::new(Gu300Panel::new(vfd, width, height))
        }
        PanelModel::S20a => {
            let mut vfd = S20a::new(controller_bus(config, s20a::bus_wiring, None)?, width);
            init(vfd.init(), model)?;
            Box::new(S20aPanel::new(vfd, height))
        }
        PanelModel::Gu3900 => {
            let link = byte_link(config, Some(gu3900::handshake), VFD_BAUD_DIVISOR)?;
            let mut vfd = Gu3900::new(link);
            init(vfd.init(), model)?;
            Box::new(Gu3900Panel::new(vfd, width, height))
        }
        PanelModel::Gu3900Dma => {
            let mut vfd = Gu3900Dma::new(byte_link(config, Some(gu3900dma::handshake), VFD_BAUD_DIVISOR)?);
            init(vfd.init(), model)?;
            Box::new(Gu3900DmaPanel::new(vfd, width, height))
        }
        PanelModel::Gu7000 => {
            let mut vfd = Gu7000::new(byte_link(config, None, VFD_BAUD_DIVISOR)?);
            init(vfd.init_display(), model)?;
            Box::new(Gu7000Panel::new(vfd, width, height))
        }
        PanelModel::Gu311 => {
            // The kernel stream write handshakes on BUSY by itself
            let handshake: Option<HandshakeFn> = if config.fast_write {
                None
            } else {
                Some(gu311::handshake)
            };
            let mut vfd = Gu311::new(byte_link(config, handshake, VFD_BAUD_DIVISOR)?);
            init(vfd.init(), model)?;
            Box::new(Gu311Panel::new(vfd))
        }
        PanelModel::T20a => {
            let mut vfd = T20a::new(byte_link(config, Some(t20a::handshake), VFD_BAUD_DIVISOR)?, width);
            init(vfd.init(), model)?;
            Box::new(T20aPanel::new(vfd, height))
        }
        PanelModel::Gd120c280 => {
            let mut port = parport(config)?;
            let strobe = WiringConfig::require(config.wiring().wr, "wr").report("wiring")?;
            gd120c280::park_unused_lines(&mut port, strobe).report("parallel port")?;
            let mut pdp = Gd120c280::new(handshake_link(config, port, gd120c280::handshake)?);
            init(pdp.init(), model)?;
            Box::new(Gd120c280Panel::new(pdp))
        }
        PanelModel::El320x240 | PanelModel::El640x200Sk => {
            let planar = if model == PanelModel::El320x240 {
                PlanarModel::El320x240
            } else {
                PlanarModel::El640x200Sk
            };
            let (link, clock) = raster_link(config, 0)?;
            Box::new(PlanarPanel::new(Planar::new(link, planar, clock)))
        }
        PanelModel::Lcd4 => {
            let (link, clock) = raster_link(config, RASTER_BAUD_DIVISOR)?;
            let scan = ScanThread::spawn(link).wrap_err("cannot start raster scan thread")?;
            let lcd = FourBitLcd::new(scan, width, height, clock).report("LCD4 geometry")?;
            Box::new(Lcd4Panel::new(lcd))
        }
    };

    if config.brightness < 100 {
        match panel.set_brightness(config.brightness) {
            Ok(()) => {}
            Err(DriverError::Unsupported) => {
                debug!("{} has no brightness control", model)
            }
            Err(e) => return Err(eyre!("setting brightness: {}", e)),
        }
    }
    Ok(panel)
}
