//! System gauges fed from the host

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use panelport_core::Rect;
use panelport_display::{Canvas, CpuModel, Gauge, Reading, Usage, UsageList, Widget};

use crate::sysstat::{self, CpuTimes};

/// Gauge cell: chart plus a line of text
const CELL: (u32, u32) = (104, 28);
const CPU_MODEL_HEIGHT: u32 = 24;

/// What a [`HostGauge`] samples
pub enum Source {
    LoadAverage,
    CpuBusy(Option<CpuTimes>),
    CpuTemperature,
    MemoryFree,
    DiskUsed(PathBuf),
}

impl Source {
    fn sample(&mut self) -> std::io::Result<Reading> {
        Ok(match self {
            Source::LoadAverage => Reading::LoadAverage(sysstat::read_loadavg()?),
            Source::CpuBusy(earlier) => {
                let now = sysstat::read_cpu_times()?;
                let busy = earlier.map_or(0.0, |earlier| now.busy_percent(&earlier));
                *earlier = Some(now);
                Reading::CpuBusy(busy)
            }
            Source::CpuTemperature => {
                let (celsius, critical) = sysstat::read_cpu_temperature()?;
                Reading::CpuTemperature { celsius, critical }
            }
            Source::MemoryFree => {
                let memory = sysstat::read_memory()?;
                Reading::MemoryFree {
                    free_mb: memory.free_mb,
                    total_mb: memory.total_mb,
                }
            }
            Source::DiskUsed(path) => {
                let usage = sysstat::disk_usage(path)?;
                Reading::DiskUsed {
                    used_gb: usage.used_gb(),
                    total_gb: usage.total_gb(),
                }
            }
        })
    }
}

/// A [`Gauge`] that samples its [`Source`] before every render
///
/// A failed sample keeps the previous reading.
pub struct HostGauge {
    gauge: Gauge,
    source: Source,
}

impl HostGauge {
    pub fn new(gauge: Gauge, source: Source) -> Self {
        Self { gauge, source }
    }
}

impl Widget for HostGauge {
    fn rect(&self) -> Rect {
        self.gauge.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        match self.source.sample() {
            Ok(reading) => self.gauge.set(reading),
            Err(e) => warn!("{:?} sample failed: {}", self.gauge.rect(), e),
        }
        self.gauge.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.gauge.interval()
    }
}

/// Swap bar, shown only while swap is in use
pub struct HostSwap(pub UsageList);

impl Widget for HostSwap {
    fn rect(&self) -> Rect {
        self.0.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        match sysstat::read_memory() {
            Ok(memory) => self.0.set(vec![Usage::new(
                "swap",
                memory.swap_used_mb(),
                memory.swap_total_mb,
                "MB",
            )]),
            Err(e) => warn!("reading swap: {}", e),
        }
        self.0.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.0.interval()
    }
}

/// Usage bar per mounted file system
pub struct HostMounts(pub UsageList);

impl Widget for HostMounts {
    fn rect(&self) -> Rect {
        self.0.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        match sysstat::read_mounts() {
            Ok(mounts) => {
                let entries = mounts
                    .iter()
                    .filter_map(|mount| {
                        let usage = sysstat::disk_usage(mount.mount_point.as_ref()).ok()?;
                        (usage.total > 0).then(|| {
                            Usage::new(&mount.mount_point, usage.used_gb(), usage.total_gb(), "GB")
                        })
                    })
                    .collect();
                self.0.set(entries);
            }
            Err(e) => warn!("reading mounts: {}", e),
        }
        self.0.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.0.interval()
    }
}

/// Processor model, read once
pub struct HostCpu(pub CpuModel);

impl HostCpu {
    pub fn new(rect: Rect) -> Self {
        let mut cpu = CpuModel::new(rect);
        match sysstat::read_cpu_info() {
            Ok(info) => cpu.set(&info.model, info.mhz),
            Err(e) => warn!("reading cpu info: {}", e),
        }
        Self(cpu)
    }
}

impl Widget for HostCpu {
    fn rect(&self) -> Rect {
        self.0.rect()
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        self.0.render(canvas);
    }

    fn interval(&self) -> Duration {
        self.0.interval()
    }
}

/// Gauge rectangles in rows of [`CELL`] under a processor line, then the
/// swap and mount bars in whatever height is left
pub struct StatsLayout {
    pub cpu: Option<Rect>,
    pub gauges: Vec<Rect>,
    pub swap: Option<Rect>,
    pub mounts: Option<Rect>,
}

pub fn stats_layout(width: u32, height: u32, gauges: usize) -> StatsLayout {
    let mut top = 0;
    let cpu = (height >= CPU_MODEL_HEIGHT + CELL.1).then(|| {
        top = CPU_MODEL_HEIGHT;
        Rect::from_size(0, 0, width, CPU_MODEL_HEIGHT)
    });

    let per_row = (width / CELL.0).max(1);
    let mut cells = Vec::new();
    for i in 0..gauges as u32 {
        let y = top + (i / per_row) * CELL.1;
        if y + CELL.1 > height {
            break;
        }
        cells.push(Rect::from_size((i % per_row) * CELL.0, y, CELL.0, CELL.1));
    }
    let rows = (cells.len() as u32).div_ceil(per_row);
    top += rows * CELL.1;

    let bar = 18;
    let swap = (top + bar <= height).then(|| {
        let rect = Rect::from_size(0, top, width, bar);
        top += bar;
        rect
    });
    let mounts = (top + bar <= height).then(|| Rect::new(0, top, width, height));
    StatsLayout {
        cpu,
        gauges: cells,
        swap,
        mounts,
    }
}

/// Every host widget that fits on a `width` x `height` screen
pub fn host_widgets(width: u32, height: u32) -> Vec<Box<dyn Widget>> {
    let sources = vec![
        Source::LoadAverage,
        Source::CpuBusy(None),
        Source::CpuTemperature,
        Source::MemoryFree,
        Source::DiskUsed(PathBuf::from("/")),
    ];
    let layout = stats_layout(width, height, sources.len());

    let mut widgets: Vec<Box<dyn Widget>> = Vec::new();
    if let Some(rect) = layout.cpu {
        widgets.push(Box::new(HostCpu::new(rect)));
    }
    for (rect, source) in layout.gauges.into_iter().zip(sources) {
        let gauge = match source {
            Source::DiskUsed(_) => Gauge::new(rect)
                .with_title("/ used")
                .with_interval(Duration::from_secs(60)),
            _ => Gauge::new(rect),
        };
        widgets.push(Box::new(HostGauge::new(gauge, source)));
    }
    if let Some(rect) = layout.swap {
        widgets.push(Box::new(HostSwap(UsageList::new(rect).hide_unused())));
    }
    if let Some(rect) = layout.mounts {
        widgets.push(Box::new(HostMounts(
            UsageList::new(rect).with_interval(Duration::from_secs(60)),
        )));
    }
    widgets
}
