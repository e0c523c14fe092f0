//! Host statistics from /proc and /sys
//!
//! Parsers take the file contents so they can be checked against captured
//! text; the `read_*` helpers do the I/O.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// File systems never worth a usage bar
const PSEUDO_FS: &[&str] = &[
    "tmpfs", "devtmpfs", "usbfs", "proc", "sysfs", "cgroup", "cgroup2", "devpts", "mqueue",
    "debugfs", "tracefs", "securityfs", "pstore", "configfs", "fusectl", "hugetlbfs", "bpf",
    "autofs", "overlay", "squashfs", "efivarfs", "binfmt_misc", "rpc_pipefs", "nsfs",
];

/// Jiffies from the aggregate `cpu` line of /proc/stat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuTimes {
    pub fn parse(stat: &str) -> Option<Self> {
        let line = stat.lines().find(|line| line.starts_with("cpu "))?;
        let mut fields = line.split_whitespace().skip(1).map(str::parse::<u64>);
        Some(Self {
            user: fields.next()?.ok()?,
            nice: fields.next()?.ok()?,
            system: fields.next()?.ok()?,
            idle: fields.next()?.ok()?,
        })
    }

    /// Percent of the time since `earlier` spent outside idle
    pub fn busy_percent(&self, earlier: &CpuTimes) -> f32 {
        let busy = (self.user + self.nice + self.system)
            .saturating_sub(earlier.user + earlier.nice + earlier.system);
        let idle = self.idle.saturating_sub(earlier.idle);
        if busy + idle == 0 {
            return 0.0;
        }
        100.0 * busy as f32 / (busy + idle) as f32
    }
}

/// One minute load average from /proc/loadavg
pub fn parse_loadavg(text: &str) -> Option<f32> {
    text.split_whitespace().next()?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuInfo {
    pub model: String,
    pub mhz: u32,
}

impl CpuInfo {
    /// First processor's `model name` and `cpu MHz` from /proc/cpuinfo
    pub fn parse(text: &str) -> Option<Self> {
        let field = |key: &str| {
            text.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                (name.trim() == key).then(|| value.trim())
            })
        };
        let model = field("model name")?.to_string();
        let mhz = field("cpu MHz").and_then(|mhz| mhz.parse::<f32>().ok()).unwrap_or(0.0);
        Some(Self {
            model,
            mhz: mhz as u32,
        })
    }
}

/// Memory and swap from /proc/meminfo, in MB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memory {
    pub total_mb: u64,
    pub free_mb: u64,
    pub swap_total_mb: u64,
    pub swap_free_mb: u64,
}

impl Memory {
    pub fn parse(text: &str) -> Option<Self> {
        let kb = |key: &str| {
            text.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name != key {
                    return None;
                }
                value.split_whitespace().next()?.parse::<u64>().ok()
            })
        };
        Some(Self {
            total_mb: kb("MemTotal")? / 1024,
            free_mb: kb("MemFree")? / 1024,
            swap_total_mb: kb("SwapTotal").unwrap_or(0) / 1024,
            swap_free_mb: kb("SwapFree").unwrap_or(0) / 1024,
        })
    }

    pub fn swap_used_mb(&self) -> u64 {
        self.swap_total_mb.saturating_sub(self.swap_free_mb)
    }
}

/// A sysfs thermal value, in millidegrees
pub fn parse_millidegrees(text: &str) -> Option<i32> {
    let milli: i32 = text.trim().parse().ok()?;
    Some(milli / 1000)
}

/// An ACPI thermal line such as `temperature:   45 C`
pub fn parse_acpi_celsius(text: &str) -> Option<i32> {
    let line = text.lines().next()?;
    let (_, value) = line.split_once(':')?;
    value.trim().trim_end_matches('C').trim().parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Real file systems from /proc/mounts, first mount of each device only
pub fn parse_mounts(text: &str) -> Vec<Mount> {
    let mut mounts: Vec<Mount> = Vec::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(mount_point), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if PSEUDO_FS.contains(&fs_type) || mounts.iter().any(|m| m.device == device) {
            continue;
        }
        mounts.push(Mount {
            device: device.to_string(),
            mount_point: unescape_mount(mount_point),
            fs_type: fs_type.to_string(),
        });
    }
    mounts
}

/// /proc/mounts writes space, tab, newline and backslash as octal escapes
fn unescape_mount(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).and_then(|digits| {
            let digits = std::str::from_utf8(digits).ok()?;
            u8::from_str_radix(digits, 8).ok()
        });
        match (bytes[i], octal) {
            (b'\\', Some(byte)) => {
                out.push(byte);
                i += 4;
            }
            (byte, _) => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Capacity of the file system holding a path, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
}

impl DiskUsage {
    pub fn total_gb(&self) -> u64 {
        self.total >> 30
    }

    pub fn used_gb(&self) -> u64 {
        self.used >> 30
    }
}

pub fn disk_usage(path: &Path) -> io::Result<DiskUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // SAFETY: statvfs is plain data, all zeroes is a valid value
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: `c_path` is NUL terminated and `stat` is valid for writes
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let block = stat.f_frsize as u64;
    Ok(DiskUsage {
        total: stat.f_blocks as u64 * block,
        used: (stat.f_blocks as u64).saturating_sub(stat.f_bfree as u64) * block,
    })
}

fn invalid(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("unexpected contents in {}", path))
}

fn read_parsed<T>(path: &str, parse: impl FnOnce(&str) -> Option<T>) -> io::Result<T> {
    parse(&fs::read_to_string(path)?).ok_or_else(|| invalid(path))
}

pub fn read_cpu_times() -> io::Result<CpuTimes> {
    read_parsed("/proc/stat", CpuTimes::parse)
}

pub fn read_loadavg() -> io::Result<f32> {
    read_parsed("/proc/loadavg", parse_loadavg)
}

pub fn read_cpu_info() -> io::Result<CpuInfo> {
    read_parsed("/proc/cpuinfo", CpuInfo::parse)
}

pub fn read_memory() -> io::Result<Memory> {
    read_parsed("/proc/meminfo", Memory::parse)
}

pub fn read_mounts() -> io::Result<Vec<Mount>> {
    Ok(parse_mounts(&fs::read_to_string("/proc/mounts")?))
}

/// (current, critical) in degrees Celsius
///
/// Thermal zone 0 in sysfs, falling back to the older ACPI proc files.
pub fn read_cpu_temperature() -> io::Result<(i32, i32)> {
    let sysfs = "/sys/class/thermal/thermal_zone0";
    match read_parsed(&format!("{}/temp", sysfs), parse_millidegrees) {
        Ok(celsius) => {
            let critical = (0..8)
                .find_map(|trip| {
                    let trip = format!("{}/trip_point_{}", sysfs, trip);
                    let kind = fs::read_to_string(format!("{}_type", trip)).ok()?;
                    if kind.trim() != "critical" {
                        return None;
                    }
                    read_parsed(&format!("{}_temp", trip), parse_millidegrees).ok()
                })
                .unwrap_or(100);
            Ok((celsius, critical))
        }
        Err(_) => {
            let acpi = "/proc/acpi/thermal_zone/THRM";
            let celsius = read_parsed(&format!("{}/temperature", acpi), parse_acpi_celsius)?;
            let critical = read_parsed(&format!("{}/trip_points", acpi), parse_acpi_celsius)?;
            Ok((celsius, critical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "\
cpu  4705 356 584 3699 23 23 0 0 0 0
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0
intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]
";

    const MEMINFO: &str = "\
MemTotal:        2052480 kB
MemFree:          524288 kB
MemAvailable:    1048576 kB
Buffers:           92596 kB
SwapTotal:       2096124 kB
SwapFree:        2096124 kB
";

    const CPUINFO: &str = "\
processor\t: 0
vendor_id\t: AuthenticAMD
cpu family\t: 15
model\t\t: 47
model name\t: AMD Athlon(tm) 64 Processor 3200+
stepping\t: 2
cpu MHz\t\t: 2009.438
cache size\t: 512 KB

processor\t: 1
model name\t: second core
";

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0
tmpfs /run tmpfs rw,nosuid,nodev,size=204800k 0 0
/dev/sdb1 /media/usb\\040disk vfat rw,relatime 0 0
/dev/sda1 /var/lib/docker ext4 rw,relatime 0 0
";

    #[test]
    fn test_cpu_times_and_busy() {
        let earlier = CpuTimes::parse(STAT).unwrap();
        assert_eq!(
            earlier,
            CpuTimes {
                user: 4705,
                nice: 356,
                system: 584,
                idle: 3699,
            }
        );
        let later = CpuTimes {
            user: 4735,
            nice: 356,
            system: 594,
            idle: 3759,
        };
        assert_eq!(later.busy_percent(&earlier), 40.0);
        assert_eq!(earlier.busy_percent(&earlier), 0.0);
        assert_eq!(CpuTimes::parse("cpu0 1 2 3 4\n"), None);
    }

    #[test]
    fn test_loadavg() {
        assert_eq!(parse_loadavg("0.42 0.36 0.30 1/123 4567\n"), Some(0.42));
        assert_eq!(parse_loadavg(""), None);
    }

    #[test]
    fn test_cpuinfo_first_processor() {
        let info = CpuInfo::parse(CPUINFO).unwrap();
        assert_eq!(info.model, "AMD Athlon(tm) 64 Processor 3200+");
        assert_eq!(info.mhz, 2009);
        assert_eq!(CpuInfo::parse("processor\t: 0\n"), None);
    }

    #[test]
    fn test_meminfo_in_megabytes() {
        let memory = Memory::parse(MEMINFO).unwrap();
        assert_eq!(memory.total_mb, 2004);
        assert_eq!(memory.free_mb, 512);
        assert_eq!(memory.swap_total_mb, 2047);
        assert_eq!(memory.swap_used_mb(), 0);
        assert_eq!(Memory::parse("SwapFree: 1 kB\n"), None);
    }

    #[test]
    fn test_temperatures() {
        assert_eq!(parse_millidegrees("45500\n"), Some(45));
        assert_eq!(parse_acpi_celsius("temperature:             45 C\n"), Some(45));
        assert_eq!(parse_acpi_celsius("critical (S5):           95 C\npassive: 80 C\n"), Some(95));
        assert_eq!(parse_acpi_celsius("garbage"), None);
    }

    #[test]
    fn test_mounts_skip_pseudo_and_repeats() {
        let mounts = parse_mounts(MOUNTS);
        let points: Vec<&str> = mounts.iter().map(|m| m.mount_point.as_str()).collect();
        assert_eq!(points, ["/", "/media/usb disk"]);
        assert_eq!(mounts[1].fs_type, "vfat");
    }

    #[test]
    fn test_disk_usage_in_gigabytes() {
        let usage = DiskUsage {
            total: 40 << 30,
            used: (12 << 30) + 5,
        };
        assert_eq!((usage.used_gb(), usage.total_gb()), (12, 40));
        assert!(disk_usage(Path::new("/nonexistent/panelport")).is_err());
    }
}
