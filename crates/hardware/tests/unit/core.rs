//! # CPU Descriptor Tests
//!
//! CPU model names and memory modes, L1 port binding, the interrupt controller, and thread
//! creation.

use memhier_core::cache::{CacheLevel, CacheLevelSpec};
use memhier_core::common::ConfigError;
use memhier_core::config::MemMode;
use memhier_core::core::{Cpu, CpuKind};
use memhier_core::sim::workload::WorkloadSpec;
use memhier_core::soc::ports::{Netlist, PortId};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn cpu(netlist: &mut Netlist) -> Cpu {
    Cpu::new(
        CpuKind::DerivO3,
        CacheLevelSpec::preset(CacheLevel::L1Instruction),
        CacheLevelSpec::preset(CacheLevel::L1Data),
        Some(1_000),
        netlist,
    )
    .unwrap()
}

#[rstest]
#[case(CpuKind::DerivO3, "DerivO3CPU", "o3", MemMode::Timing)]
#[case(CpuKind::TimingSimple, "TimingSimpleCPU", "timing", MemMode::Timing)]
#[case(CpuKind::Minor, "MinorCPU", "minor", MemMode::Timing)]
#[case(CpuKind::AtomicSimple, "AtomicSimpleCPU", "atomic", MemMode::Atomic)]
fn test_cpu_kinds(
    #[case] kind: CpuKind,
    #[case] class: &str,
    #[case] short: &str,
    #[case] mode: MemMode,
) {
    assert_eq!(kind.to_string(), class);
    assert_eq!(class.parse::<CpuKind>().unwrap(), kind);
    assert_eq!(short.parse::<CpuKind>().unwrap(), kind);
    assert_eq!(kind.required_mem_mode(), mode);
}

#[test]
fn test_unknown_cpu_kind() {
    assert!(matches!(
        "KvmCPU".parse::<CpuKind>(),
        Err(ConfigError::UnknownVariant { kind: "CPU model", .. })
    ));
}

#[test]
fn test_l1_ports_bound_to_caches() {
    let mut netlist = Netlist::new();
    let cpu = cpu(&mut netlist);
    cpu.connect_l1_caches(&mut netlist).unwrap();

    assert_eq!(
        netlist.peer_of(&PortId::scalar("system.cpu", "icache_port")),
        Some(&PortId::scalar("system.cpu.icache", "cpu_side"))
    );
    assert_eq!(
        netlist.peer_of(&PortId::scalar("system.cpu", "dcache_port")),
        Some(&PortId::scalar("system.cpu.dcache", "cpu_side"))
    );
}

#[test]
fn test_interrupt_ports_are_deferred() {
    let mut netlist = Netlist::new();
    let mut cpu = cpu(&mut netlist);
    cpu.create_interrupt_controller(&mut netlist).unwrap();

    let controller = &cpu.interrupts[0];
    assert_eq!(controller.path, "system.cpu.interrupts0");
    let deferred = netlist.deferred_ports();
    for port in controller.deferred_ports() {
        assert!(deferred.contains(&port.id()), "{port} should be deferred");
    }
    let dangling = netlist.dangling_ports();
    assert!(dangling.iter().all(|p| p.owner != controller.path));
}

#[test]
fn test_threads_follow_workload() {
    let mut netlist = Netlist::new();
    let mut cpu = cpu(&mut netlist);
    cpu.create_threads();
    assert!(cpu.threads.is_empty());

    cpu.set_workload(WorkloadSpec::new("bin/hello").arg("-v")).unwrap();
    cpu.create_threads();
    assert_eq!(cpu.threads.len(), 1);
    assert_eq!(cpu.threads[0].argv, vec!["bin/hello".to_owned(), "-v".to_owned()]);
    assert_eq!(cpu.threads[0].max_insts, Some(1_000));
}

#[test]
fn test_second_workload_rejected() {
    let mut netlist = Netlist::new();
    let mut cpu = cpu(&mut netlist);
    cpu.set_workload(WorkloadSpec::new("a")).unwrap();
    assert!(matches!(
        cpu.set_workload(WorkloadSpec::new("b")),
        Err(ConfigError::WorkloadAlreadyBound(path)) if path == "system.cpu"
    ));
}
