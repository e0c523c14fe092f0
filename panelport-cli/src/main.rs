//! `panelport`: bring up a display panel and put something on it

mod config;
mod demo;
mod hardware;
mod scan;
mod stats;
mod sysstat;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use embedded_graphics::prelude::Point;
use log::{info, warn};
use panelport_core::config::{BusKind, PanelConfig};
use panelport_core::Rect;
use panelport_display::{Compositor, DriverError, Panel, Ticker, Truchet};
use panelport_hal_linux::FtdiUsb;

use crate::config::Overrides;
use crate::demo::Pattern;
use crate::hardware::{open_panel, ReportDisplay};

#[derive(Parser, Debug)]
#[command(name = "panelport", version, about = "Drive VFD, EL, LCD and plasma panels", long_about = None)]
struct Args {
    /// Panel configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Panel model, e.g. GU7000 or KS0108
    #[arg(long, global = true)]
    model: Option<String>,

    /// parallel, serial, usb or ubw
    #[arg(long, global = true)]
    bus: Option<String>,

    /// Device node or number (USB: FTDI device index)
    #[arg(short, long, global = true)]
    device: Option<String>,

    #[arg(long, global = true)]
    width: Option<u32>,

    #[arg(long, global = true)]
    height: Option<u32>,

    /// More output; repeat for wire-level detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Subcommands,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// List adapters and show the effective configuration
    Probe,

    #[command(flatten)]
    Panel(PanelCommand),
}

/// Commands that bring up the configured panel
#[derive(Subcommand, Debug)]
enum PanelCommand {
    /// Blank the panel
    Clear,

    /// Print text (character cells on text panels, pixels otherwise)
    Text {
        text: String,
        #[arg(short, long, default_value_t = 0)]
        x: i32,
        #[arg(short, long, default_value_t = 0)]
        y: i32,
        /// Keep the process, and a rescanned image, alive this long
        #[arg(long, default_value_t = 0)]
        hold: u64,
    },

    /// Show a test pattern
    Pattern {
        #[arg(value_enum)]
        kind: Pattern,
        #[arg(long, default_value_t = 0)]
        hold: u64,
    },

    /// Truchet tiling demo
    Truchet {
        /// Passes to draw; runs until interrupted without
        #[arg(long)]
        frames: Option<u32>,
    },

    /// Clock and date
    Clock {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// System gauges: load, CPU, memory, swap and disks
    Stats {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Scroll text across the bottom of the screen
    Ticker {
        text: String,
        /// Strip height in pixels
        #[arg(long, default_value_t = 24)]
        band: u32,
        /// Times to scroll the text through; repeats until interrupted without
        #[arg(long)]
        passes: Option<u32>,
        /// Pause between one pixel steps
        #[arg(long, default_value_t = 5)]
        step_ms: u64,
    },

    /// Set the panel brightness
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);

    let overrides = Overrides {
        model: args.model.clone(),
        bus: args.bus.clone(),
        device: args.device.clone(),
        width: args.width,
        height: args.height,
    };

    let command = match args.command {
        Subcommands::Probe => return probe(args.config.as_deref(), &overrides),
        Subcommands::Panel(command) => command,
    };

    let config = config::load(args.config.as_deref(), &overrides)?;
    let mut display = Compositor::new(open_panel(&config)?).report("clearing panel")?;
    run(command, &config, &mut display)
}

fn run<P: Panel>(command: PanelCommand, config: &PanelConfig, display: &mut Compositor<P>) -> Result<()> {
    let (width, height) = display.size();
    match command {
        PanelCommand::Clear => {}
        PanelCommand::Text { text, x, y, hold } => {
            display.text(Point::new(x, y), &text).report("writing text")?;
            thread::sleep(Duration::from_secs(hold));
        }
        PanelCommand::Pattern { kind, hold } => {
            display
                .refresh(demo::pattern(kind, width, height), None)
                .report("drawing pattern")?;
            thread::sleep(Duration::from_secs(hold));
        }
        PanelCommand::Truchet { frames } => {
            if display.panel().character_cells().is_some() {
                bail!("{} has no bitmap to tile", config.model);
            }
            let mut truchet = Truchet::new(width, height, rand::random());
            let mut drawn = 0;
            while frames.map_or(true, |frames| drawn < frames) {
                truchet.step(display).report("truchet")?;
                drawn += 1;
            }
            info!("drew {} truchet passes", drawn);
        }
        PanelCommand::Clock { seconds } => {
            let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
            run_clock(display, deadline)?;
        }
        PanelCommand::Stats { seconds } => {
            if display.panel().character_cells().is_some() {
                bail!("{} has no bitmap for gauges", config.model);
            }
            let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
            let mut widgets = stats::host_widgets(width, height);
            demo::run_widgets(display, &mut widgets, deadline)?;
        }
        PanelCommand::Ticker {
            text,
            band,
            passes,
            step_ms,
        } => {
            if display.panel().character_cells().is_some() {
                bail!("{} has no bitmap to scroll", config.model);
            }
            let mut ticker = Ticker::new(ticker_rect(width, height, band));
            ticker.set_text(&text);
            let mut done = 0;
            while passes.map_or(true, |passes| done < passes) {
                display.start_ticker(&mut ticker).report("starting ticker")?;
                while display.step_ticker(&mut ticker).report("ticker")? {
                    thread::sleep(Duration::from_millis(step_ms));
                }
                done += 1;
            }
            info!("scrolled {} passes, hardware {}", done, ticker.hardware());
        }
        PanelCommand::Brightness { percent } => match display.panel_mut().set_brightness(percent) {
            Ok(()) => {}
            Err(DriverError::Unsupported) => bail!("{} has no brightness control", config.model),
            Err(e) => bail!("setting brightness: {}", e),
        },
    }
    Ok(())
}

/// Full width strip of `band` rows at the bottom, top on a byte row
fn ticker_rect(width: u32, height: u32, band: u32) -> Rect {
    let band = band.clamp(1, height.max(1));
    let top = height.saturating_sub(band) / 8 * 8;
    Rect::from_size(0, top, width, band)
}

fn run_clock<P: Panel>(display: &mut Compositor<P>, deadline: Option<Instant>) -> Result<()> {
    if display.panel().character_cells().is_none() {
        let (width, height) = display.size();
        let mut widgets = demo::clock_layout(width, height);
        return demo::run_widgets(display, &mut widgets, deadline);
    }
    loop {
        display
            .text(Point::zero(), &demo::clock_line())
            .report("writing clock")?;
        let next = Instant::now() + Duration::from_secs(5);
        let wake = deadline.map_or(next, |deadline| next.min(deadline));
        thread::sleep(wake.saturating_duration_since(Instant::now()));
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Ok(());
        }
    }
}

fn probe(config_path: Option<&Path>, overrides: &Overrides) -> Result<()> {
    match FtdiUsb::list() {
        Ok(devices) if devices.is_empty() => println!("no FTDI devices"),
        Ok(devices) => {
            for device in devices {
                println!(
                    "ftdi {}: bus {:03} address {:03} product {:04x} {}",
                    device.index,
                    device.bus,
                    device.address,
                    device.product_id,
                    device.product.as_deref().unwrap_or("")
                );
            }
        }
        Err(e) => warn!("cannot enumerate USB devices: {}", e),
    }

    if config_path.is_none() && overrides.model.is_none() {
        return Ok(());
    }
    let config = config::load(config_path, overrides)?;
    print!("{}", toml::to_string(&config).wrap_err("cannot print configuration")?);

    if config.bus() == BusKind::Ubw {
        let ubw = hardware::ubw(&config)?;
        println!("ubw firmware {}", ubw.version().as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_rect_sits_on_byte_rows() {
        assert_eq!(ticker_rect(256, 64, 24), Rect::new(0, 40, 256, 64));
        assert_eq!(ticker_rect(320, 240, 20), Rect::new(0, 216, 320, 236));
        assert_eq!(ticker_rect(128, 16, 40), Rect::new(0, 0, 128, 16));
    }

    #[test]
    fn test_ticker_arguments() {
        let args = Args::try_parse_from(["panelport", "ticker", "hello", "--passes", "2"]).unwrap();
        match args.command {
            Subcommands::Panel(PanelCommand::Ticker { text, band, passes, step_ms }) => {
                assert_eq!(text, "hello");
                assert_eq!((band, passes, step_ms), (24, Some(2), 5));
            }
            other => panic!("parsed {:?}", other),
        }
    }
}
