// Prometheus-derived time series

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric name -> latest scalar, `None` when that one query failed.
pub type NodeMetrics = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Local wall clock, `HH:MM:SS`.
    pub time: String,
    pub value: f64,
}

/// The seven ranged series a dashboard chart can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Cpu,
    Memory,
    Disk,
    NetworkRx,
    NetworkTx,
    DiskRead,
    DiskWrite,
}

impl Series {
    pub const ALL: [Series; 7] = [
        Series::Cpu,
        Series::Memory,
        Series::Disk,
        Series::NetworkRx,
        Series::NetworkTx,
        Series::DiskRead,
        Series::DiskWrite,
    ];

    /// Series that only exist for the whole host.
    pub fn is_host_only(self) -> bool {
        !matches!(self, Series::Cpu | Series::Memory)
    }
}

/// Every series is always present; an unavailable one is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRange {
    #[serde(default)]
    pub cpu: Vec<MetricPoint>,
    #[serde(default)]
    pub memory: Vec<MetricPoint>,
    #[serde(default)]
    pub disk: Vec<MetricPoint>,
    #[serde(default)]
    pub network_rx: Vec<MetricPoint>,
    #[serde(default)]
    pub network_tx: Vec<MetricPoint>,
    #[serde(default)]
    pub disk_read: Vec<MetricPoint>,
    #[serde(default)]
    pub disk_write: Vec<MetricPoint>,
}

impl MetricsRange {
    pub fn set(&mut self, series: Series, points: Vec<MetricPoint>) {
        let slot = match series {
            Series::Cpu => &mut self.cpu,
            Series::Memory => &mut self.memory,
            Series::Disk => &mut self.disk,
            Series::NetworkRx => &mut self.network_rx,
            Series::NetworkTx => &mut self.network_tx,
            Series::DiskRead => &mut self.disk_read,
            Series::DiskWrite => &mut self.disk_write,
        };
        *slot = points;
    }
}
