// Domain models served by the HTTP API

mod container;
mod metrics;
mod network;
mod system;

pub use container::{
    ContainerLogs, ContainerState, ContainerStats, ContainerSummary, CpuMemorySample,
    PortBinding, short_id,
};
pub use metrics::{MetricPoint, MetricsRange, NodeMetrics, Series};
pub use network::NetworkSummary;
pub use system::SystemSnapshot;
