//! # Configuration Tests
//!
//! Defaults, JSON deserialization (strings and files), and validation.

use std::io::Write;
use std::path::PathBuf;

use memhier_core::cache::policies::{PolicyChoice, ReplacementPolicy};
use memhier_core::cache::CacheLevel;
use memhier_core::common::{ConfigError, Frequency, MemorySize};
use memhier_core::config::*;
use memhier_core::core::CpuKind;
use memhier_core::sim::workload::Benchmark;
use memhier_core::soc::memory::MemoryControllerKind;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

#[test]
fn test_config_defaults() {
    let config = HierarchyConfig::default();
    assert_eq!(config.system.clock, Frequency::from_ghz(2));
    assert_eq!(config.system.mem_mode, MemMode::Timing);
    assert_eq!(config.system.mem_range.start, 0);
    assert_eq!(config.system.mem_range.size, MemorySize::from_mib(2048));
    assert_eq!(config.system.mem_ctrl, MemoryControllerKind::Ddr3_1600_8x8);
    assert_eq!(config.system.cache_line_size, 64);
    assert!(!config.system.full_system);
    assert_eq!(config.cpu.kind, CpuKind::DerivO3);
    assert_eq!(config.cpu.max_insts_any_thread, Some(500_000_000));
    assert_eq!(config.policy, PolicyChoice::CompiledDefault);
    assert_eq!(config.workload.benchmark, Benchmark::Hello);
    assert_eq!(config.workload.bench_root, PathBuf::from("test_bench"));
    assert!(!config.cache.l3_enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_json_is_default() {
    let config = HierarchyConfig::from_json_str("{}").unwrap();
    assert_eq!(config, HierarchyConfig::default());
}

#[test]
fn test_full_json() {
    let json = r#"{
        "system": {
            "clock": "3GHz",
            "voltage": "900mV",
            "mem_range": { "size": "4GB" },
            "mem_ctrl": "DDR4_2400_8x8"
        },
        "cpu": { "kind": "MinorCPU", "max_insts_any_thread": null },
        "cache": {
            "l2": { "size": "1MB", "assoc": 16 },
            "l3": { "size": "16MB" },
            "l3_enabled": true
        },
        "policy": "wlru",
        "workload": {
            "benchmark": "mcf",
            "bench_root": "/opt/bench",
            "entries": { "mcf": { "executable": "/opt/spec/mcf", "args": ["inp.in"] } }
        }
    }"#;
    let config = HierarchyConfig::from_json_str(json).unwrap();
    assert_eq!(config.system.clock.hz(), 3_000_000_000);
    assert_eq!(config.system.mem_range.size, MemorySize::from_mib(4096));
    assert_eq!(config.system.mem_ctrl, MemoryControllerKind::Ddr4_2400_8x8);
    assert_eq!(config.cpu.kind, CpuKind::Minor);
    assert_eq!(config.cpu.max_insts_any_thread, None);
    assert_eq!(config.cache.l2_spec().size, MemorySize::from_mib(1));
    assert_eq!(config.cache.l2_spec().assoc, 16);
    assert_eq!(config.cache.l3_spec().map(|s| s.size), Some(MemorySize::from_mib(16)));
    assert_eq!(config.policy, PolicyChoice::Explicit(ReplacementPolicy::WeightedLru));
    assert_eq!(config.workload.benchmark, Benchmark::Mcf);
    assert_eq!(config.workload.entries[&Benchmark::Mcf].args, vec!["inp.in".to_owned()]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_cpu_short_alias() {
    let config = HierarchyConfig::from_json_str(r#"{ "cpu": { "kind": "timing" } }"#).unwrap();
    assert_eq!(config.cpu.kind, CpuKind::TimingSimple);
}

#[test]
fn test_unknown_field_rejected() {
    let err = HierarchyConfig::from_json_str(r#"{ "cache": { "l4": {} } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_bad_size_string_rejected() {
    let err = HierarchyConfig::from_json_str(r#"{ "cache": { "l1_d": { "size": "big" } } }"#)
        .unwrap_err();
    assert!(err.to_string().contains("memory size"), "{err}");
}

#[test]
fn test_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{ "policy": "fifo", "cache": { "l1_i": { "assoc": 2 } } }"#)
        .unwrap();
    let config = HierarchyConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.policy, PolicyChoice::Explicit(ReplacementPolicy::Fifo));
    assert_eq!(config.cache.l1_i_spec().assoc, 2);
}

#[test]
fn test_missing_file() {
    let err = HierarchyConfig::from_json_file("/nonexistent/memhier.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_round_trip_through_json() {
    let mut config = HierarchyConfig::default();
    config.policy = PolicyChoice::Explicit(ReplacementPolicy::Random);
    config.cache.overrides_mut(CacheLevel::L2).assoc = Some(4);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(HierarchyConfig::from_json_str(&json).unwrap(), config);
}

// ══════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════

#[test]
fn test_l2_assoc_zero_rejected() {
    let mut config = HierarchyConfig::default();
    config.cache.overrides_mut(CacheLevel::L2).assoc = Some(0);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidCacheParameter { field: "assoc", .. })
    ));
}

#[test]
fn test_l3_settings_without_l3_rejected() {
    let mut config = HierarchyConfig::default();
    config.cache.overrides_mut(CacheLevel::L3).assoc = Some(0);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::LevelNotEnabled("l3")));
    assert_eq!(err.to_string(), "l3 settings were given but l3 is not enabled");

    config.cache.l3_enabled = true;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidCacheParameter { field: "assoc", .. })
    ));
}

#[test]
fn test_json_l3_settings_without_l3_rejected() {
    let config = HierarchyConfig::from_json_str(r#"{ "cache": { "l3": { "size": "16MB" } } }"#).unwrap();
    assert!(!config.cache.l3_enabled);
    assert!(matches!(config.validate(), Err(ConfigError::LevelNotEnabled(_))));
}

#[test]
fn test_line_size_must_be_power_of_two() {
    let mut config = HierarchyConfig::default();
    config.system.cache_line_size = 48;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidLineSize(48))));
    config.system.cache_line_size = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidLineSize(0))));
}

#[test]
fn test_empty_memory_range_rejected() {
    let mut config = HierarchyConfig::default();
    config.system.mem_range.size = MemorySize::from_bytes(0);
    assert!(matches!(config.validate(), Err(ConfigError::EmptyMemoryRange)));
}

#[test]
fn test_atomic_cpu_needs_atomic_mode() {
    let mut config = HierarchyConfig::default();
    config.cpu.kind = CpuKind::AtomicSimple;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MemModeMismatch { required: MemMode::Atomic, configured: MemMode::Timing, .. })
    ));
    config.system.mem_mode = MemMode::Atomic;
    assert!(config.validate().is_ok());
}

#[test]
fn test_mem_mode_parse() {
    assert_eq!("ATOMIC".parse::<MemMode>().unwrap(), MemMode::Atomic);
    assert!("functional".parse::<MemMode>().is_err());
}
