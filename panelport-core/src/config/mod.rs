//! Panel configuration
//!
//! A [`PanelConfig`] names the model and how it is attached. Everything else
//! has a per-model default, so a config file can be as short as:
//!
//! ```toml
//! model = "KS0108"
//! bus = "ubw"
//! device = "/dev/ttyACM0"
//! ```

mod model;
mod panel;

pub use model::{BusKind, MemoryLayout, PanelModel};
pub use panel::{PanelConfig, SerialConfig, SerialParity, WiringConfig};

/// Reasons a configuration cannot drive a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Model name not in the registry
    UnknownModel,
    /// The model cannot be attached over this bus
    UnsupportedBus { model: PanelModel, bus: BusKind },
    /// Width or height of zero
    ZeroSize,
    /// Width not a multiple of 8 on a row-addressed controller
    UnalignedWidth,
    /// Height not a multiple of 8 on a column- or page-addressed controller
    UnalignedHeight,
    /// Size override on glass that only comes in one size
    FixedSize(PanelModel),
    /// Brightness above 100 percent
    Brightness,
    /// A wiring role the driver needs has no line assigned
    MissingWiring(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnknownModel => f.write_str("unknown panel model"),
            ConfigError::UnsupportedBus { model, bus } => {
                write!(f, "{} cannot be driven over {}", model, bus.name())
            }
            ConfigError::ZeroSize => f.write_str("panel size must be non-zero"),
            ConfigError::UnalignedWidth => f.write_str("width must be a multiple of 8"),
            ConfigError::UnalignedHeight => f.write_str("height must be a multiple of 8"),
            ConfigError::FixedSize(model) => write!(f, "{} only comes in one size", model),
            ConfigError::Brightness => f.write_str("brightness must be 0..=100"),
            ConfigError::MissingWiring(role) => write!(f, "no line assigned to {}", role),
        }
    }
}
