//! Supported panel models and the buses they can hang off

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// How a panel is attached to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BusKind {
    /// PC parallel port (`/dev/parportN`)
    #[cfg_attr(feature = "serde", serde(alias = "par"))]
    Parallel,
    /// RS-232 tty
    #[cfg_attr(feature = "serde", serde(alias = "ser"))]
    Serial,
    /// FTDI FT232R in bit-bang mode
    #[cfg_attr(feature = "serde", serde(alias = "ftdi"))]
    Usb,
    /// USB Bit Whacker
    Ubw,
}

impl BusKind {
    pub const fn name(self) -> &'static str {
        match self {
            BusKind::Parallel => "parallel",
            BusKind::Serial => "serial",
            BusKind::Usb => "usb",
            BusKind::Ubw => "ubw",
        }
    }

    /// Parse a bus name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = |s: &str| name.eq_ignore_ascii_case(s);
        if lower("parallel") || lower("par") {
            Some(BusKind::Parallel)
        } else if lower("serial") || lower("ser") {
            Some(BusKind::Serial)
        } else if lower("usb") || lower("ftdi") {
            Some(BusKind::Usb)
        } else if lower("ubw") {
            Some(BusKind::Ubw)
        } else {
            None
        }
    }
}

/// Order in which a controller auto-increments through its memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryLayout {
    /// Horizontal bytes, row after row
    Rows,
    /// Vertical bytes, column after column
    Columns,
    /// Vertical bytes in 8-row pages, LSB on top
    Pages,
    /// No controller; whole frames are clocked in continuously
    Raster,
    /// Character display, no bitmap access
    Text,
}

/// Every supported panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "alloc::string::String", into = "&'static str")
)]
pub enum PanelModel {
    T6963c,
    Ks0108,
    Gu3900Dma,
    Gu3900,
    Gu7000,
    Gu311,
    Gu300,
    Sed1330,
    Sed1520,
    El320x240,
    El640x200Sk,
    Gd120c280,
    Lcd4,
    T20a,
    S20a,
}

/// Accepted names, matched case-insensitively
const ALIASES: &[(&str, PanelModel)] = &[
    ("T6963C", PanelModel::T6963c),
    ("KS0108", PanelModel::Ks0108),
    ("HD61202", PanelModel::Ks0108),
    ("GU3900DMA", PanelModel::Gu3900Dma),
    ("GU3900", PanelModel::Gu3900),
    ("GU7000", PanelModel::Gu7000),
    ("GU311", PanelModel::Gu311),
    ("GU300", PanelModel::Gu300),
    ("GU355", PanelModel::Gu300),
    ("GU372", PanelModel::Gu300),
    ("SED1330", PanelModel::Sed1330),
    ("SED1335", PanelModel::Sed1330),
    ("SED133X", PanelModel::Sed1330),
    ("S1D13305", PanelModel::Sed1330),
    ("SED1D13305", PanelModel::Sed1330),
    ("SED1520", PanelModel::Sed1520),
    ("EL320_240", PanelModel::El320x240),
    ("EL320.240", PanelModel::El320x240),
    ("EL640_200SK", PanelModel::El640x200Sk),
    ("EL640.200-SK", PanelModel::El640x200Sk),
    ("GD120C280", PanelModel::Gd120c280),
    ("LCD4", PanelModel::Lcd4),
    ("T20A", PanelModel::T20a),
    ("S20A", PanelModel::S20a),
];

impl PanelModel {
    /// All models, in registry order
    pub const ALL: [PanelModel; 15] = [
        PanelModel::T6963c,
        PanelModel::Ks0108,
        PanelModel::Gu3900Dma,
        PanelModel::Gu3900,
        PanelModel::Gu7000,
        PanelModel::Gu311,
        PanelModel::Gu300,
        PanelModel::Sed1330,
        PanelModel::Sed1520,
        PanelModel::El320x240,
        PanelModel::El640x200Sk,
        PanelModel::Gd120c280,
        PanelModel::Lcd4,
        PanelModel::T20a,
        PanelModel::S20a,
    ];

    /// Look a model up by name or alias
    pub fn from_name(name: &str) -> Option<Self> {
        ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name.trim()))
            .map(|&(_, model)| model)
    }

    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            PanelModel::T6963c => "T6963C",
            PanelModel::Ks0108 => "KS0108",
            PanelModel::Gu3900Dma => "GU3900DMA",
            PanelModel::Gu3900 => "GU3900",
            PanelModel::Gu7000 => "GU7000",
            PanelModel::Gu311 => "GU311",
            PanelModel::Gu300 => "GU300",
            PanelModel::Sed1330 => "SED1330",
            PanelModel::Sed1520 => "SED1520",
            PanelModel::El320x240 => "EL320_240",
            PanelModel::El640x200Sk => "EL640_200SK",
            PanelModel::Gd120c280 => "GD120C280",
            PanelModel::Lcd4 => "LCD4",
            PanelModel::T20a => "T20A",
            PanelModel::S20a => "S20A",
        }
    }

    /// Default size in pixels, or characters for text panels
    pub const fn default_size(self) -> (u32, u32) {
        match self {
            PanelModel::T6963c => (320, 240),
            PanelModel::Ks0108 => (128, 64),
            PanelModel::Gu3900Dma | PanelModel::Gu3900 | PanelModel::Gu300 => (256, 64),
            PanelModel::Gu7000 => (140, 16),
            PanelModel::Gu311 => (128, 32),
            PanelModel::Sed1330 => (320, 240),
            PanelModel::Sed1520 => (122, 32),
            PanelModel::El320x240 => (320, 240),
            PanelModel::El640x200Sk => (640, 200),
            PanelModel::Gd120c280 => (280, 120),
            PanelModel::Lcd4 => (320, 240),
            PanelModel::T20a | PanelModel::S20a => (40, 2),
        }
    }

    /// Whether the glass only comes in its default size
    pub const fn fixed_size(self) -> bool {
        matches!(
            self,
            PanelModel::Gu311
                | PanelModel::Sed1520
                | PanelModel::El320x240
                | PanelModel::El640x200Sk
                | PanelModel::Gd120c280
        )
    }

    /// Buses this model can be driven over, default first
    pub const fn buses(self) -> &'static [BusKind] {
        match self {
            PanelModel::Ks0108 | PanelModel::Sed1330 => &[BusKind::Ubw, BusKind::Parallel],
            PanelModel::Gu3900 => &[BusKind::Parallel, BusKind::Serial, BusKind::Usb],
            PanelModel::Gu7000 => &[BusKind::Usb, BusKind::Parallel, BusKind::Serial],
            PanelModel::El320x240 | PanelModel::Lcd4 => &[BusKind::Usb, BusKind::Parallel],
            PanelModel::El640x200Sk => &[BusKind::Parallel, BusKind::Usb],
            PanelModel::T20a => &[BusKind::Parallel, BusKind::Serial],
            PanelModel::T6963c
            | PanelModel::Gu3900Dma
            | PanelModel::Gu311
            | PanelModel::Gu300
            | PanelModel::Sed1520
            | PanelModel::Gd120c280
            | PanelModel::S20a => &[BusKind::Parallel],
        }
    }

    pub fn default_bus(self) -> BusKind {
        self.buses()[0]
    }

    pub fn supports_bus(self, bus: BusKind) -> bool {
        self.buses().contains(&bus)
    }

    pub const fn layout(self) -> MemoryLayout {
        match self {
            PanelModel::T6963c | PanelModel::Sed1330 => MemoryLayout::Rows,
            PanelModel::Gu3900Dma
            | PanelModel::Gu3900
            | PanelModel::Gu7000
            | PanelModel::Gu300
            | PanelModel::Gd120c280 => MemoryLayout::Columns,
            PanelModel::Ks0108 | PanelModel::Sed1520 | PanelModel::Gu311 => MemoryLayout::Pages,
            PanelModel::El320x240 | PanelModel::El640x200Sk | PanelModel::Lcd4 => {
                MemoryLayout::Raster
            }
            PanelModel::T20a | PanelModel::S20a => MemoryLayout::Text,
        }
    }

    /// Character display without bitmap access
    pub const fn is_text(self) -> bool {
        matches!(self.layout(), MemoryLayout::Text)
    }
}

impl core::fmt::Display for PanelModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for PanelModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelModel::from_name(s).ok_or(ConfigError::UnknownModel)
    }
}

impl TryFrom<alloc::string::String> for PanelModel {
    type Error = ConfigError;

    fn try_from(value: alloc::string::String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PanelModel> for &'static str {
    fn from(model: PanelModel) -> Self {
        model.name()
    }
}
