//! Panel configuration from a TOML file and command line overrides

use std::fs;
use std::path::Path;

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use panelport_core::config::{BusKind, PanelConfig, PanelModel};

/// Settings given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub model: Option<String>,
    pub bus: Option<String>,
    pub device: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Parse a config file's contents
pub fn parse(text: &str) -> Result<PanelConfig> {
    toml::from_str(text).wrap_err("malformed panel configuration")
}

/// Build the effective configuration and check it can drive a panel
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<PanelConfig> {
    let base = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("cannot read {}", path.display()))?;
            Some(parse(&text).wrap_err_with(|| format!("in {}", path.display()))?)
        }
        None => None,
    };
    let config = apply(base, overrides)?;
    config
        .validate()
        .map_err(|e| eyre!("invalid configuration for {}: {}", config.model, e))?;
    log::debug!("effective configuration: {:?}", config);
    Ok(config)
}

/// Merge overrides into `base`; a model is needed from one or the other
fn apply(base: Option<PanelConfig>, overrides: &Overrides) -> Result<PanelConfig> {
    let model = match overrides.model.as_deref() {
        Some(name) => Some(PanelModel::from_name(name).ok_or_else(|| eyre!("unknown panel model {:?}", name))?),
        None => None,
    };
    let mut config = match (base, model) {
        (Some(mut config), Some(model)) => {
            config.model = model;
            config
        }
        (Some(config), None) => config,
        (None, Some(model)) => PanelConfig::new(model),
        (None, None) => bail!("no panel model given, pass --config or --model"),
    };

    if let Some(name) = overrides.bus.as_deref() {
        config.bus = Some(BusKind::from_name(name).ok_or_else(|| eyre!("unknown bus {:?}", name))?);
    }
    if let Some(device) = &overrides.device {
        config.device = Some(device.clone());
    }
    if let Some(width) = overrides.width {
        config.width = Some(width);
    }
    if let Some(height) = overrides.height {
        config.height = Some(height);
    }
    Ok(config)
}
