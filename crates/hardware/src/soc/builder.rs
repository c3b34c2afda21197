//! Hierarchy construction and the top-level `Root` / `System` types.
//!
//! This module assembles the full memory hierarchy from a `HierarchyConfig`. It performs:
//! 1. **Validation:** Every cache level and the CPU/memory-mode pairing are checked first.
//! 2. **Instantiation:** CPU, L1 caches, L2 (and optional L3), crossbars, and memory controller.
//! 3. **Policy:** An explicit replacement policy is applied to every cache level.
//! 4. **Wiring:** Ports are bound through the netlist in a fixed order.
//! 5. **Verification:** The netlist is checked for dangling ports before the root is returned.
//!
//! A build either yields a complete, fully wired `Root` or an error; there is no partial result.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheLevel};
use crate::common::HierarchyError;
use crate::config::{HierarchyConfig, MemMode};
use crate::core::Cpu;
use crate::soc::clock::ClockDomain;
use crate::soc::interconnect::{Crossbar, CrossbarKind};
use crate::soc::memory::{AddrRange, MemoryController};
use crate::soc::ports::{Netlist, PortKind, PortRef, PortRole};

/// Path of the system object.
pub const SYSTEM_PATH: &str = "system";

/// The assembled system: every component plus the netlist binding them.
#[derive(Debug, Clone, Serialize)]
pub struct System {
    /// System clock and voltage.
    pub clk_domain: ClockDomain,
    /// Memory access mode.
    pub mem_mode: MemMode,
    /// Physical memory ranges.
    pub mem_ranges: Vec<AddrRange>,
    /// Line size shared by every cache level.
    pub cache_line_size: u32,
    /// The CPU with its L1 caches.
    pub cpu: Cpu,
    /// Crossbar between the L1s and the L2.
    pub l2bus: Crossbar,
    /// Shared L2 cache.
    pub l2cache: Cache,
    /// Crossbar between the L2 and the L3, when the L3 is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l3bus: Option<Crossbar>,
    /// Shared L3 cache, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l3cache: Option<Cache>,
    /// System crossbar in front of memory.
    pub membus: Crossbar,
    /// Memory controller.
    pub mem_ctrl: MemoryController,
    /// Functional access port of the system, bound to `membus`.
    pub system_port: PortRef,
    /// Every binding made during assembly.
    pub netlist: Netlist,
}

impl System {
    /// Every cache level, nearest the CPU first.
    pub fn caches(&self) -> Vec<&Cache> {
        let mut caches = vec![&self.cpu.icache, &self.cpu.dcache, &self.l2cache];
        caches.extend(self.l3cache.as_ref());
        caches
    }

    /// The cache at `level`, if instantiated.
    pub fn cache(&self, level: CacheLevel) -> Option<&Cache> {
        match level {
            CacheLevel::L1Instruction => Some(&self.cpu.icache),
            CacheLevel::L1Data => Some(&self.cpu.dcache),
            CacheLevel::L2 => Some(&self.l2cache),
            CacheLevel::L3 => self.l3cache.as_ref(),
        }
    }

    /// Every crossbar, nearest the CPU first.
    pub fn crossbars(&self) -> Vec<&Crossbar> {
        let mut buses = vec![&self.l2bus];
        buses.extend(self.l3bus.as_ref());
        buses.push(&self.membus);
        buses
    }
}

/// Top of the object tree handed to the simulation engine.
#[derive(Debug, Clone, Serialize)]
pub struct Root {
    /// Full-system (OS boot) rather than syscall-emulation mode.
    pub full_system: bool,
    /// The assembled system.
    pub system: System,
}

impl Root {
    /// Pretty-printed JSON description of the topology.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns `true` once a workload is attached to the CPU.
    pub const fn has_workload(&self) -> bool {
        self.system.cpu.workload.is_some()
    }
}

/// Builds a `Root` from a configuration.
///
/// # Examples
///
/// ```
/// use memhier_core::config::HierarchyConfig;
/// use memhier_core::soc::HierarchyBuilder;
///
/// let config = HierarchyConfig::default();
/// let root = HierarchyBuilder::new(&config).build().unwrap();
/// assert_eq!(root.system.l2cache.spec.assoc, 8);
/// assert!(root.system.netlist.dangling_ports().is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HierarchyBuilder<'a> {
    config: &'a HierarchyConfig,
}

impl<'a> HierarchyBuilder<'a> {
    /// Creates a builder over `config`.
    pub const fn new(config: &'a HierarchyConfig) -> Self {
        Self { config }
    }

    /// Validates the configuration, instantiates every component, and wires the hierarchy.
    pub fn build(self) -> Result<Root, HierarchyError> {
        let config = self.config;
        config.validate()?;

        let mut netlist = Netlist::new();
        let caches = &config.cache;

        let mut cpu = Cpu::new(
            config.cpu.kind,
            caches.l1_i_spec(),
            caches.l1_d_spec(),
            config.cpu.max_insts_any_thread,
            &mut netlist,
        )?;
        let mut l2cache = Cache::new(caches.l2_spec(), &mut netlist)?;
        let mut l3cache = caches
            .l3_spec()
            .map(|spec| Cache::new(spec, &mut netlist))
            .transpose()?;

        if let Some(policy) = config.policy.policy() {
            for cache in cpu
                .l1_caches_mut()
                .into_iter()
                .chain(std::iter::once(&mut l2cache))
                .chain(l3cache.as_mut())
            {
                cache.set_replacement_policy(policy);
            }
            debug!(policy = %policy, "applied replacement policy to every level");
        } else if l3cache.is_some() {
            warn!("L3 enabled without an explicit replacement policy; every level keeps its compiled default");
        }

        let l2bus = Crossbar::new("system.l2bus", CrossbarKind::L2XBar, &mut netlist)?;
        let l3bus = l3cache
            .is_some()
            .then(|| Crossbar::new("system.l3bus", CrossbarKind::L2XBar, &mut netlist))
            .transpose()?;
        let membus = Crossbar::new("system.membus", CrossbarKind::SystemXBar, &mut netlist)?;
        let mem_ctrl = MemoryController::new(
            "system.mem_ctrl",
            config.system.mem_ctrl,
            config.system.mem_range,
            &mut netlist,
        )?;
        let system_port =
            netlist.declare(SYSTEM_PATH, "system_port", PortRole::Request, PortKind::Scalar)?;

        cpu.connect_l1_caches(&mut netlist)?;
        for l1 in cpu.l1_caches() {
            let _ = netlist.connect(&l1.mem_side, &l2bus.slave)?;
        }
        let _ = netlist.connect(&l2bus.master, &l2cache.cpu_side)?;
        match (&l3bus, &l3cache) {
            (Some(l3bus), Some(l3cache)) => {
                let _ = netlist.connect(&l2cache.mem_side, &l3bus.slave)?;
                let _ = netlist.connect(&l3bus.master, &l3cache.cpu_side)?;
                let _ = netlist.connect(&l3cache.mem_side, &membus.slave)?;
            }
            _ => {
                let _ = netlist.connect(&l2cache.mem_side, &membus.slave)?;
            }
        }
        let _ = netlist.connect(&membus.master, &mem_ctrl.port)?;
        let _ = netlist.connect(&system_port, &membus.slave)?;
        cpu.create_interrupt_controller(&mut netlist)?;

        let clk_domain = ClockDomain::new(config.system.clock, config.system.voltage);

        netlist.validate()?;

        let system = System {
            clk_domain,
            mem_mode: config.system.mem_mode,
            mem_ranges: vec![config.system.mem_range],
            cache_line_size: config.system.cache_line_size,
            cpu,
            l2bus,
            l2cache,
            l3bus,
            l3cache,
            membus,
            mem_ctrl,
            system_port,
            netlist,
        };
        log_summary(&system);

        Ok(Root {
            full_system: config.system.full_system,
            system,
        })
    }
}

fn log_summary(system: &System) {
    for cache in system.caches() {
        info!(
            cache = %cache.path,
            size = %cache.spec.size,
            assoc = cache.spec.assoc,
            hit_latency = cache.spec.tag_latency,
            response_latency = cache.spec.response_latency,
            policy = cache.policy_name(),
            "cache level"
        );
    }
    let line = system.cache_line_size;
    for bus in system.crossbars() {
        info!(
            bus = %bus.path,
            kind = %bus.kind,
            fan_in = bus.fan_in(&system.netlist),
            fan_out = bus.fan_out(&system.netlist),
            line_transit_cycles = bus.transit_cycles(line),
            "crossbar"
        );
    }
    info!(
        cpu = %system.cpu.kind,
        clock = %system.clk_domain.clock,
        memory = %system.mem_ctrl.range,
        mem_ctrl = %system.mem_ctrl.kind,
        connections = system.netlist.connections().len(),
        "hierarchy assembled"
    );
}
