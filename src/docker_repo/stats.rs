// Reduce a raw Docker stats response to the CPU/memory counters we derive from.

use crate::models::CpuMemorySample;
use bollard::models::ContainerStatsResponse;

/// Exposed for unit tests. `None` when either CPU snapshot is missing.
pub(crate) fn process_statistics(s: &ContainerStatsResponse) -> Option<CpuMemorySample> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let precpu_stats = s.precpu_stats.as_ref()?;

    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;
    let precpu_usage = precpu_stats.cpu_usage.as_ref();

    // Older daemons leave online_cpus unset; fall back to the per-CPU counters.
    let online_cpus = cpu_stats
        .online_cpus
        .map(|n| n as u32)
        .filter(|n| *n > 0)
        .or_else(|| {
            cpu_usage
                .percpu_usage
                .as_ref()
                .map(|p| p.len() as u32)
                .filter(|n| *n > 0)
        })
        .unwrap_or(1);

    let memory = s.memory_stats.as_ref();
    // cgroup v1 reports "cache"; cgroup v2 only has "inactive_file".
    let memory_cache = memory
        .and_then(|m| m.stats.as_ref())
        .and_then(|st| st.get("cache").or_else(|| st.get("inactive_file")))
        .copied()
        .unwrap_or(0);

    Some(CpuMemorySample {
        cpu_total: cpu_usage.total_usage.unwrap_or(0),
        precpu_total: precpu_usage.and_then(|u| u.total_usage).unwrap_or(0),
        system_total: cpu_stats.system_cpu_usage.unwrap_or(0),
        presystem_total: precpu_stats.system_cpu_usage.unwrap_or(0),
        online_cpus,
        memory_usage: memory.and_then(|m| m.usage).unwrap_or(0),
        memory_cache,
        memory_limit: memory.and_then(|m| m.limit).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainerStats;
    use bollard::models::{
        ContainerCpuStats, ContainerCpuUsage, ContainerMemoryStats, ContainerStatsResponse,
    };
    use std::collections::HashMap;

    fn minimal_cpu_stats(total_usage: u64, system_cpu_usage: u64) -> ContainerCpuStats {
        ContainerCpuStats {
            cpu_usage: Some(ContainerCpuUsage {
                total_usage: Some(total_usage),
                ..Default::default()
            }),
            system_cpu_usage: Some(system_cpu_usage),
            online_cpus: Some(2),
            throttling_data: None,
        }
    }

    #[test]
    fn process_statistics_returns_none_when_cpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: None,
            precpu_stats: Some(minimal_cpu_stats(0, 0)),
            ..Default::default()
        };
        assert!(process_statistics(&s).is_none());
    }

    #[test]
    fn process_statistics_returns_none_when_precpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 1000)),
            precpu_stats: None,
            ..Default::default()
        };
        assert!(process_statistics(&s).is_none());
    }

    #[test]
    fn process_statistics_excludes_cache_from_memory() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100_000_000, 1_000_000_000)),
            precpu_stats: Some(minimal_cpu_stats(50_000_000, 500_000_000)),
            memory_stats: Some(ContainerMemoryStats {
                usage: Some(300 * 1024 * 1024),
                limit: Some(512 * 1024 * 1024),
                stats: Some(HashMap::from([("cache".to_string(), 44 * 1024 * 1024)])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let sample = process_statistics(&s).unwrap();
        assert_eq!(sample.online_cpus, 2);
        assert_eq!(sample.memory_cache, 44 * 1024 * 1024);

        let stats = ContainerStats::from_sample(&sample);
        assert!((stats.cpu_percent - 20.0).abs() < 0.01); // (100M-50M)/(1000M-500M) * 2 * 100
        assert_eq!(stats.memory_usage, 256 * 1024 * 1024);
        assert_eq!(stats.memory_limit, 512 * 1024 * 1024);
        assert!((stats.memory_percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn process_statistics_uses_inactive_file_on_cgroup_v2() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(1, 1)),
            precpu_stats: Some(minimal_cpu_stats(0, 0)),
            memory_stats: Some(ContainerMemoryStats {
                usage: Some(1000),
                limit: Some(4000),
                stats: Some(HashMap::from([("inactive_file".to_string(), 200)])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let sample = process_statistics(&s).unwrap();
        assert_eq!(sample.memory_cache, 200);
    }

    #[test]
    fn process_statistics_falls_back_to_percpu_count() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(ContainerCpuStats {
                cpu_usage: Some(ContainerCpuUsage {
                    total_usage: Some(100),
                    percpu_usage: Some(vec![25, 25, 25, 25]),
                    ..Default::default()
                }),
                system_cpu_usage: Some(1000),
                online_cpus: None,
                throttling_data: None,
            }),
            precpu_stats: Some(minimal_cpu_stats(50, 500)),
            ..Default::default()
        };
        let sample = process_statistics(&s).unwrap();
        assert_eq!(sample.online_cpus, 4);
    }

    #[test]
    fn process_statistics_zero_system_delta_returns_zero_cpu_percent() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 500)),
            precpu_stats: Some(minimal_cpu_stats(50, 500)),
            ..Default::default()
        };
        let stats = ContainerStats::from_sample(&process_statistics(&s).unwrap());
        assert_eq!(stats.cpu_percent, 0.0);
    }
}
