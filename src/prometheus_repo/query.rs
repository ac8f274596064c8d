// PromQL for host (node_exporter) and per-container (cAdvisor) readings

use crate::models::Series;
use std::time::Duration;

/// Root filesystem plus the Unraid array/cache mounts, tmpfs excluded.
const FS_SELECTOR: &str = r#"mountpoint=~"/|/mnt/user|/mnt/cache",fstype!="tmpfs""#;
const NET_DEVICE_EXCLUDE: &str = r#"device!~"lo|docker.*|br-.*|veth.*""#;
const DISK_DEVICE_EXCLUDE: &str = r#"device!~"loop.*|sr.*""#;

/// Rate window used by every instant query.
pub const INSTANT_RATE_WINDOW: &str = "5m";

/// Granularity presets for ranged charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeWindow {
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
}

impl RangeWindow {
    /// Unknown values fall back to five minutes.
    pub fn parse(s: &str) -> Self {
        match s {
            "15m" => RangeWindow::FifteenMinutes,
            "1h" => RangeWindow::OneHour,
            "24h" => RangeWindow::OneDay,
            _ => RangeWindow::FiveMinutes,
        }
    }

    pub fn span(self) -> Duration {
        match self {
            RangeWindow::FiveMinutes => Duration::from_secs(5 * 60),
            RangeWindow::FifteenMinutes => Duration::from_secs(15 * 60),
            RangeWindow::OneHour => Duration::from_secs(60 * 60),
            RangeWindow::OneDay => Duration::from_secs(24 * 60 * 60),
        }
    }

    pub fn step(self) -> &'static str {
        match self {
            RangeWindow::FiveMinutes => "10s",
            RangeWindow::FifteenMinutes => "15s",
            RangeWindow::OneHour => "60s",
            RangeWindow::OneDay => "1440s",
        }
    }

    pub fn rate_window(self) -> &'static str {
        match self {
            RangeWindow::FiveMinutes | RangeWindow::FifteenMinutes => "1m",
            RangeWindow::OneHour => "5m",
            RangeWindow::OneDay => "15m",
        }
    }
}

/// Whole host, or one container by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricScope<'a> {
    Host,
    Container(&'a str),
}

impl<'a> MetricScope<'a> {
    /// Empty names mean host scope.
    pub fn from_name(name: &'a str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            MetricScope::Host
        } else {
            MetricScope::Container(name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub series: Series,
    pub expr: String,
}

/// Queries to issue for a chart. Container scope only yields cpu and memory.
pub fn compile_range(window: RangeWindow, scope: MetricScope<'_>) -> Vec<RangeQuery> {
    let rate = window.rate_window();
    Series::ALL
        .into_iter()
        .filter_map(|series| {
            let expr = match scope {
                MetricScope::Host => host_expr(series, rate),
                MetricScope::Container(_) if series.is_host_only() => return None,
                MetricScope::Container(name) => container_expr(series, name, rate)?,
            };
            Some(RangeQuery { series, expr })
        })
        .collect()
}

/// Named scalar queries for the node snapshot, fixed 5m rate window.
pub fn instant_queries() -> Vec<(&'static str, String)> {
    let rate = INSTANT_RATE_WINDOW;
    vec![
        ("cpu", host_expr(Series::Cpu, rate)),
        ("memory", host_expr(Series::Memory, rate)),
        ("disk", host_expr(Series::Disk, rate)),
        (
            "uptime",
            "node_time_seconds - node_boot_time_seconds".to_string(),
        ),
        ("totalMemory", "node_memory_MemTotal_bytes".to_string()),
        ("diskReadRate", host_expr(Series::DiskRead, rate)),
        ("diskWriteRate", host_expr(Series::DiskWrite, rate)),
        ("networkRxRate", host_expr(Series::NetworkRx, rate)),
        ("networkTxRate", host_expr(Series::NetworkTx, rate)),
    ]
}

fn host_expr(series: Series, rate: &str) -> String {
    match series {
        Series::Cpu => {
            format!(r#"100 - (avg(rate(node_cpu_seconds_total{{mode="idle"}}[{rate}])) * 100)"#)
        }
        Series::Memory => {
            "(1 - node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes) * 100".to_string()
        }
        Series::Disk => format!(
            "(1 - node_filesystem_avail_bytes{{{FS_SELECTOR}}} / node_filesystem_size_bytes{{{FS_SELECTOR}}}) * 100"
        ),
        Series::NetworkRx => {
            format!("sum(rate(node_network_receive_bytes_total{{{NET_DEVICE_EXCLUDE}}}[{rate}]))")
        }
        Series::NetworkTx => {
            format!("sum(rate(node_network_transmit_bytes_total{{{NET_DEVICE_EXCLUDE}}}[{rate}]))")
        }
        Series::DiskRead => {
            format!("sum(rate(node_disk_read_bytes_total{{{DISK_DEVICE_EXCLUDE}}}[{rate}]))")
        }
        Series::DiskWrite => {
            format!("sum(rate(node_disk_written_bytes_total{{{DISK_DEVICE_EXCLUDE}}}[{rate}]))")
        }
    }
}

/// cAdvisor labels the name `/foo` on older Docker and `foo` on Compose v2, hence `/?`.
fn container_expr(series: Series, name: &str, rate: &str) -> Option<String> {
    let name = escape_label_regex(name);
    match series {
        Series::Cpu => Some(format!(
            r#"sum(rate(container_cpu_usage_seconds_total{{name=~"/?{name}", image!=""}}[{rate}])) / scalar(count(node_cpu_seconds_total{{mode="idle"}})) * 100"#
        )),
        Series::Memory => Some(format!(
            r#"container_memory_working_set_bytes{{name=~"/?{name}", image!=""}} / scalar(node_memory_MemTotal_bytes) * 100"#
        )),
        _ => None,
    }
}

/// Escape a literal for use inside a double-quoted PromQL regex matcher.
fn escape_label_regex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                // `\\` in the PromQL string literal is one backslash in the regex.
                out.push_str(r"\\");
                out.push(c);
            }
            '\\' => out.push_str(r"\\\\"),
            '"' => out.push_str(r#"\""#),
            _ => out.push(c),
        }
    }
    out
}
