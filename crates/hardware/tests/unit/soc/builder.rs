//! # Hierarchy Builder Tests
//!
//! Assembled topology, replacement policy propagation, per-level overrides, validation before
//! wiring, and the optional L3.

use memhier_core::cache::policies::ReplacementPolicy;
use memhier_core::cache::{CacheLevel, CacheLevelOverrides};
use memhier_core::common::{ConfigError, MemorySize};
use memhier_core::core::CpuKind;
use memhier_core::soc::interconnect::CrossbarKind;
use memhier_core::{HierarchyError, Root};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestContext;

fn wiring(root: &Root) -> Vec<(String, String)> {
    root.system
        .netlist
        .connections()
        .iter()
        .map(|c| (c.request.to_string(), c.response.to_string()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|&(a, b)| (a.to_owned(), b.to_owned()))
        .collect()
}

// ══════════════════════════════════════════════════════════
// 1. Default topology
// ══════════════════════════════════════════════════════════

#[test]
fn test_default_topology() {
    let root = TestContext::new().build();
    let system = &root.system;

    assert_eq!(system.cpu.kind, CpuKind::DerivO3);
    assert_eq!(system.cpu.icache.spec.size, MemorySize::from_kib(32));
    assert_eq!(system.cpu.icache.spec.assoc, 4);
    assert_eq!(system.cpu.dcache.spec.size, MemorySize::from_kib(32));
    assert_eq!(system.cpu.dcache.spec.assoc, 4);
    assert_eq!(system.l2cache.spec.size, MemorySize::from_mib(2));
    assert_eq!(system.l2cache.spec.assoc, 8);
    assert!(system.l3cache.is_none());
    assert!(system.l3bus.is_none());

    for cache in system.caches() {
        assert_eq!(cache.replacement_policy, None, "{}", cache.path);
    }
    assert!(system.netlist.dangling_ports().is_empty());
    assert!(!root.has_workload());
    assert!(!root.full_system);
}

#[test]
fn test_default_wiring_order() {
    let root = TestContext::new().build();
    assert_eq!(
        wiring(&root),
        pairs(&[
            ("system.cpu.icache_port", "system.cpu.icache.cpu_side"),
            ("system.cpu.dcache_port", "system.cpu.dcache.cpu_side"),
            ("system.cpu.icache.mem_side", "system.l2bus.slave[0]"),
            ("system.cpu.dcache.mem_side", "system.l2bus.slave[1]"),
            ("system.l2bus.master[0]", "system.l2cache.cpu_side"),
            ("system.l2cache.mem_side", "system.membus.slave[0]"),
            ("system.membus.master[0]", "system.mem_ctrl.port"),
            ("system.system_port", "system.membus.slave[1]"),
        ])
    );
}

#[test]
fn test_system_parameters() {
    let root = TestContext::new().build();
    let system = &root.system;
    assert_eq!(system.clk_domain.clock.to_string(), "2GHz");
    assert_eq!(system.clk_domain.period_ticks(), 500);
    assert_eq!(system.clk_domain.voltage_domain.voltage.to_string(), "1.0V");
    assert_eq!(system.cache_line_size, 64);
    assert_eq!(system.mem_ranges.len(), 1);
    assert_eq!(system.mem_ranges[0].start, 0);
    assert_eq!(system.mem_ranges[0].size, MemorySize::from_mib(2048));
    assert_eq!(system.mem_ctrl.range, system.mem_ranges[0]);
    assert_eq!(system.mem_ctrl.kind.to_string(), "DDR3_1600_8x8");
    assert_eq!(system.l2bus.kind, CrossbarKind::L2XBar);
    assert_eq!(system.membus.kind, CrossbarKind::SystemXBar);
    assert_eq!(system.cpu.max_insts_any_thread, Some(500_000_000));
}

#[test]
fn test_interrupt_controller_created() {
    let root = TestContext::new().build();
    let cpu = &root.system.cpu;
    assert_eq!(cpu.interrupts.len(), 1);
    assert_eq!(root.system.netlist.deferred_ports().len(), 3);
}

// ══════════════════════════════════════════════════════════
// 2. Replacement policy
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(ReplacementPolicy::Lru)]
#[case(ReplacementPolicy::Fb)]
#[case(ReplacementPolicy::TreePlru)]
fn test_policy_applied_to_every_level(#[case] policy: ReplacementPolicy) {
    let root = TestContext::new().with_policy(policy).build();
    let levels: Vec<_> = root
        .system
        .caches()
        .iter()
        .map(|c| c.replacement_policy)
        .collect();
    assert_eq!(levels, vec![Some(policy); 3]);
}

#[test]
fn test_policy_reaches_l3() {
    let root = TestContext::new()
        .with_l3()
        .with_policy(ReplacementPolicy::Fifo)
        .build();
    let l3 = root.system.cache(CacheLevel::L3).unwrap();
    assert_eq!(l3.replacement_policy, Some(ReplacementPolicy::Fifo));
    assert_eq!(root.system.caches().len(), 4);
}

// ══════════════════════════════════════════════════════════
// 3. Overrides and validation
// ══════════════════════════════════════════════════════════

#[test]
fn test_l1d_override_leaves_other_levels() {
    let root = TestContext::new()
        .with_size_assoc(CacheLevel::L1Data, MemorySize::from_kib(64), 8)
        .build();
    let system = &root.system;
    assert_eq!(system.cpu.dcache.spec.size, MemorySize::from_kib(64));
    assert_eq!(system.cpu.dcache.spec.assoc, 8);
    assert_eq!(system.cpu.dcache.spec.tag_latency, 2);
    assert_eq!(system.cpu.dcache.spec.response_latency, 2);
    assert_eq!(system.cpu.icache.spec.size, MemorySize::from_kib(32));
    assert_eq!(system.l2cache.spec.assoc, 8);
}

#[test]
fn test_latency_overrides() {
    let root = TestContext::new()
        .with_level(
            CacheLevel::L2,
            CacheLevelOverrides {
                response_latency: Some(30),
                hit_latency: Some(12),
                ..CacheLevelOverrides::default()
            },
        )
        .build();
    let l2 = &root.system.l2cache.spec;
    assert_eq!(l2.response_latency, 30);
    assert_eq!(l2.tag_latency, 12);
    assert_eq!(l2.data_latency, 12);
    assert_eq!(l2.size, MemorySize::from_mib(2));
}

#[test]
fn test_l2_assoc_zero_fails_before_wiring() {
    let ctx = TestContext::new().with_level(
        CacheLevel::L2,
        CacheLevelOverrides {
            assoc: Some(0),
            ..CacheLevelOverrides::default()
        },
    );
    match ctx.try_build() {
        Err(HierarchyError::Config(ConfigError::InvalidCacheParameter { level, field, .. })) => {
            assert_eq!(level, "L2");
            assert_eq!(field, "assoc");
        }
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_cpu_mem_mode_mismatch_fails() {
    let mut ctx = TestContext::new();
    ctx.config.cpu.kind = CpuKind::AtomicSimple;
    assert!(matches!(
        ctx.try_build(),
        Err(HierarchyError::Config(ConfigError::MemModeMismatch { .. }))
    ));
}

#[rstest]
#[case(CpuKind::DerivO3)]
#[case(CpuKind::TimingSimple)]
#[case(CpuKind::Minor)]
#[case(CpuKind::AtomicSimple)]
fn test_every_cpu_kind_assembles(#[case] kind: CpuKind) {
    let mut ctx = TestContext::new();
    ctx.config.cpu.kind = kind;
    ctx.config.system.mem_mode = kind.required_mem_mode();
    let root = ctx.build();
    assert_eq!(root.system.cpu.kind, kind);
    assert!(root.system.netlist.dangling_ports().is_empty());
}

// ══════════════════════════════════════════════════════════
// 4. Optional L3
// ══════════════════════════════════════════════════════════

#[test]
fn test_l3_wiring() {
    let root = TestContext::new().with_l3().build();
    let system = &root.system;
    assert!(system.l3bus.is_some());
    let l3 = system.cache(CacheLevel::L3).unwrap();
    assert_eq!(l3.spec.size, MemorySize::from_mib(8));
    assert_eq!(l3.spec.assoc, 16);

    let conns = wiring(&root);
    for edge in pairs(&[
        ("system.l2cache.mem_side", "system.l3bus.slave[0]"),
        ("system.l3bus.master[0]", "system.l3cache.cpu_side"),
        ("system.l3cache.mem_side", "system.membus.slave[0]"),
        ("system.system_port", "system.membus.slave[1]"),
    ]) {
        assert!(conns.contains(&edge), "missing {edge:?}");
    }
    assert!(!conns
        .iter()
        .any(|(req, resp)| req == "system.l2cache.mem_side" && resp.starts_with("system.membus")));
    assert!(system.netlist.dangling_ports().is_empty());
    assert_eq!(system.crossbars().len(), 3);
}

#[test]
fn test_l3_overrides_need_l3_enabled() {
    let tiny = CacheLevelOverrides {
        size: Some(MemorySize::from_bytes(64)),
        ..CacheLevelOverrides::default()
    };
    let ctx = TestContext::new().with_level(CacheLevel::L3, tiny);
    assert!(matches!(
        ctx.try_build(),
        Err(HierarchyError::Config(ConfigError::LevelNotEnabled("l3")))
    ));
    assert!(matches!(
        ctx.with_l3().try_build(),
        Err(HierarchyError::Config(ConfigError::CapacityTooSmall { .. }))
    ));
}

// ══════════════════════════════════════════════════════════
// 5. Topology dump
// ══════════════════════════════════════════════════════════

#[test]
fn test_topology_json() {
    let root = TestContext::new()
        .with_policy(ReplacementPolicy::Lru)
        .build();
    let value: serde_json::Value = serde_json::from_str(&root.to_json().unwrap()).unwrap();
    let system = &value["system"];
    assert_eq!(system["l2cache"]["spec"]["size"], "2MB");
    assert_eq!(system["l2cache"]["replacement_policy"], "lru");
    assert_eq!(system["cpu"]["kind"], "DerivO3CPU");
    assert_eq!(system["clk_domain"]["clock"], "2GHz");
    assert!(system.get("l3cache").is_none());
    assert_eq!(system["netlist"]["connections"].as_array().map(Vec::len), Some(8));
}
