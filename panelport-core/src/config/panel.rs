//! Per-panel configuration with model defaults

use alloc::string::String;

use panelport_hal::{ControlLine, Handshake, Parity, StatusLine, UartConfig};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{BusKind, ConfigError, MemoryLayout, PanelModel};

const DEFAULT_OSCILLATOR_HZ: u32 = 10_000_000;
const DEFAULT_BRIGHTNESS: u8 = 100;
const DEFAULT_BUSY_TIMEOUT_POLLS: u32 = 100_000;

fn default_oscillator_hz() -> u32 {
    DEFAULT_OSCILLATOR_HZ
}

fn default_brightness() -> u8 {
    DEFAULT_BRIGHTNESS
}

fn default_fast_write() -> bool {
    true
}

fn default_busy_timeout_polls() -> u32 {
    DEFAULT_BUSY_TIMEOUT_POLLS
}

/// Which parallel port line each controller signal is soldered to
///
/// Unset roles fall back to the stock cable for the model, see
/// [`WiringConfig::default_for`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct WiringConfig {
    /// Write strobe (/WR)
    pub wr: Option<ControlLine>,
    /// Read strobe, held inactive
    pub rd: Option<ControlLine>,
    /// Chip select or chip enable (/CS, /CE)
    pub cs: Option<ControlLine>,
    /// Register select (A0, C/D, RS)
    #[cfg_attr(feature = "serde", serde(alias = "cd", alias = "rs"))]
    pub a0: Option<ControlLine>,
    /// Enable strobe (E, E1)
    #[cfg_attr(feature = "serde", serde(alias = "e1"))]
    pub e: Option<ControlLine>,
    /// Enable strobe of the second chip
    pub e2: Option<ControlLine>,
    /// Chip select of the left half
    pub cs1: Option<ControlLine>,
    /// Chip select of the right half
    pub cs2: Option<ControlLine>,
    /// Busy or ready status output of the panel
    #[cfg_attr(feature = "serde", serde(alias = "rdy"))]
    pub busy: Option<StatusLine>,
}

impl WiringConfig {
    /// Stock cable for `model`
    pub const fn default_for(model: PanelModel) -> Self {
        use ControlLine::*;

        let none = Self {
            wr: None,
            rd: None,
            cs: None,
            a0: None,
            e: None,
            e2: None,
            cs1: None,
            cs2: None,
            busy: None,
        };
        match model {
            PanelModel::T6963c | PanelModel::Sed1330 => Self {
                wr: Some(Strobe),
                rd: Some(AutoFeed),
                cs: Some(InitOut),
                a0: Some(Select),
                ..none
            },
            PanelModel::Ks0108 => Self {
                cs1: Some(Strobe),
                cs2: Some(AutoFeed),
                e: Some(InitOut),
                a0: Some(Select),
                ..none
            },
            PanelModel::Sed1520 => Self {
                a0: Some(AutoFeed),
                e: Some(InitOut),
                e2: Some(Select),
                ..none
            },
            PanelModel::Gu300 | PanelModel::S20a => Self {
                wr: Some(Strobe),
                a0: Some(AutoFeed),
                rd: Some(InitOut),
                cs: Some(Select),
                ..none
            },
            PanelModel::Gu3900
            | PanelModel::Gu3900Dma
            | PanelModel::Gu311
            | PanelModel::T20a
            | PanelModel::Gd120c280 => Self {
                wr: Some(Strobe),
                busy: Some(StatusLine::Busy),
                ..none
            },
            PanelModel::Gu7000
            | PanelModel::El320x240
            | PanelModel::El640x200Sk
            | PanelModel::Lcd4 => none,
        }
    }

    /// Fill unset roles from `defaults`
    pub fn or(self, defaults: WiringConfig) -> Self {
        Self {
            wr: self.wr.or(defaults.wr),
            rd: self.rd.or(defaults.rd),
            cs: self.cs.or(defaults.cs),
            a0: self.a0.or(defaults.a0),
            e: self.e.or(defaults.e),
            e2: self.e2.or(defaults.e2),
            cs1: self.cs1.or(defaults.cs1),
            cs2: self.cs2.or(defaults.cs2),
            busy: self.busy.or(defaults.busy),
        }
    }

    /// Control line assigned to a role by name
    pub fn control(&self, role: &str) -> Option<ControlLine> {
        match role {
            "wr" => self.wr,
            "rd" => self.rd,
            "cs" => self.cs,
            "a0" => self.a0,
            "e" => self.e,
            "e2" => self.e2,
            "cs1" => self.cs1,
            "cs2" => self.cs2,
            _ => None,
        }
    }

    /// Line for `role`, or [`ConfigError::MissingWiring`]
    pub fn require(line: Option<ControlLine>, role: &'static str) -> Result<ControlLine, ConfigError> {
        line.ok_or(ConfigError::MissingWiring(role))
    }

    /// Roles a parallel-attached `model` cannot work without
    pub const fn required_roles(model: PanelModel) -> &'static [&'static str] {
        match model {
            PanelModel::T6963c | PanelModel::Sed1330 => &["wr", "rd", "cs", "a0"],
            PanelModel::Ks0108 => &["cs1", "cs2", "e", "a0"],
            PanelModel::Sed1520 => &["a0", "e", "e2"],
            PanelModel::Gu300 | PanelModel::S20a => &["wr", "a0", "rd", "cs"],
            PanelModel::Gu3900
            | PanelModel::Gu3900Dma
            | PanelModel::Gu311
            | PanelModel::T20a
            | PanelModel::Gd120c280 => &["wr"],
            PanelModel::Gu7000
            | PanelModel::El320x240
            | PanelModel::El640x200Sk
            | PanelModel::Lcd4 => &[],
        }
    }
}

/// Serial parity as written in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SerialParity {
    None,
    Even,
    Odd,
}

impl From<SerialParity> for Parity {
    fn from(parity: SerialParity) -> Self {
        match parity {
            SerialParity::None => Parity::None,
            SerialParity::Even => Parity::Even,
            SerialParity::Odd => Parity::Odd,
        }
    }
}

/// Serial overrides; unset fields use the model's defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SerialConfig {
    pub baud: Option<u32>,
    pub parity: Option<SerialParity>,
    pub dsrdtr: Option<bool>,
}

/// Everything needed to bring up one panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct PanelConfig {
    pub model: PanelModel,
    /// Width override, pixels (characters for text panels)
    pub width: Option<u32>,
    /// Height override, pixels (lines for text panels)
    pub height: Option<u32>,
    /// Bus override, [`PanelModel::default_bus`] otherwise
    pub bus: Option<BusKind>,
    /// Device node, or device index for USB
    pub device: Option<String>,
    /// Controller oscillator frequency (SED1330 timing)
    #[cfg_attr(feature = "serde", serde(default = "default_oscillator_hz"))]
    pub oscillator_hz: u32,
    /// Initial brightness, percent
    #[cfg_attr(feature = "serde", serde(default = "default_brightness"))]
    pub brightness: u8,
    /// Skip control line writes that would not change the pin
    #[cfg_attr(feature = "serde", serde(default = "default_fast_write"))]
    pub fast_write: bool,
    /// Busy line polls before giving up with a timeout
    #[cfg_attr(feature = "serde", serde(default = "default_busy_timeout_polls"))]
    pub busy_timeout_polls: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wiring: WiringConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub serial: SerialConfig,
}

impl PanelConfig {
    /// Config with every setting at the model default
    pub fn new(model: PanelModel) -> Self {
        Self {
            model,
            width: None,
            height: None,
            bus: None,
            device: None,
            oscillator_hz: default_oscillator_hz(),
            brightness: default_brightness(),
            fast_write: default_fast_write(),
            busy_timeout_polls: default_busy_timeout_polls(),
            wiring: WiringConfig::default(),
            serial: SerialConfig::default(),
        }
    }

    /// Effective size after overrides
    pub fn size(&self) -> (u32, u32) {
        let (w, h) = self.model.default_size();
        (self.width.unwrap_or(w), self.height.unwrap_or(h))
    }

    /// Effective bus after overrides
    pub fn bus(&self) -> BusKind {
        self.bus.unwrap_or_else(|| self.model.default_bus())
    }

    /// Configured wiring merged over the stock cable
    pub fn wiring(&self) -> WiringConfig {
        self.wiring.or(WiringConfig::default_for(self.model))
    }

    /// Serial settings for the model, with overrides applied
    pub fn uart_config(&self) -> UartConfig {
        let mut config = match (self.model, self.bus()) {
            (_, BusKind::Ubw) => UartConfig {
                write_timeout_ms: 10_000,
                ..UartConfig::with_baudrate(115_200)
            },
            (PanelModel::Gu3900, _) => UartConfig {
                handshake: Handshake::DtrDsr,
                ..UartConfig::with_baudrate(38_400)
            },
            (PanelModel::T20a, _) => UartConfig {
                parity: Parity::Even,
                ..UartConfig::with_baudrate(19_200)
            },
            _ => UartConfig::with_baudrate(38_400),
        };
        if let Some(baud) = self.serial.baud {
            config.baudrate = baud;
        }
        if let Some(parity) = self.serial.parity {
            config.parity = parity.into();
        }
        if let Some(dsrdtr) = self.serial.dsrdtr {
            config.handshake = if dsrdtr {
                Handshake::DtrDsr
            } else {
                Handshake::None
            };
        }
        config
    }

    /// Check the combination can actually drive a panel
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bus = self.bus();
        if !self.model.supports_bus(bus) {
            return Err(ConfigError::UnsupportedBus {
                model: self.model,
                bus,
            });
        }

        if self.model.fixed_size() && self.size() != self.model.default_size() {
            return Err(ConfigError::FixedSize(self.model));
        }

        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroSize);
        }
        match self.model.layout() {
            MemoryLayout::Rows | MemoryLayout::Raster if width % 8 != 0 => {
                return Err(ConfigError::UnalignedWidth)
            }
            MemoryLayout::Columns | MemoryLayout::Pages if height % 8 != 0 => {
                return Err(ConfigError::UnalignedHeight)
            }
            _ => {}
        }

        if self.brightness > 100 {
            return Err(ConfigError::Brightness);
        }

        if bus == BusKind::Parallel {
            let wiring = self.wiring();
            for &role in WiringConfig::required_roles(self.model) {
                if wiring.control(role).is_none() {
                    return Err(ConfigError::MissingWiring(role));
                }
            }
        }
        Ok(())
    }
}
