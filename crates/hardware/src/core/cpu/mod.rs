//! CPU Descriptor and Initialization.
//!
//! This module defines the `Cpu` object the hierarchy hangs off. It coordinates the following:
//! 1. **Model Selection:** Which microarchitecture the engine instantiates and the memory mode it needs.
//! 2. **Private Caches:** The L1 instruction and data caches and the CPU ports that feed them.
//! 3. **Interrupts:** The interrupt controller whose ports the engine wires into the platform.
//! 4. **Workload:** The bound program and the thread contexts materialized for it.

/// Interrupt controller descriptor.
pub mod interrupts;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::interrupts::InterruptController;
use crate::cache::{Cache, CacheLevelSpec};
use crate::common::{ConfigError, WiringError};
use crate::config::MemMode;
use crate::sim::workload::WorkloadSpec;
use crate::soc::ports::{Netlist, PortKind, PortRef, PortRole};

/// Path of the CPU object in the assembled system.
pub const CPU_PATH: &str = "system.cpu";

/// CPU microarchitecture model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CpuKind {
    /// Out-of-order superscalar core.
    #[default]
    #[serde(rename = "DerivO3CPU", alias = "o3")]
    DerivO3,
    /// Simple in-order core with timing memory accesses.
    #[serde(rename = "TimingSimpleCPU", alias = "timing")]
    TimingSimple,
    /// In-order pipelined core.
    #[serde(rename = "MinorCPU", alias = "minor")]
    Minor,
    /// Functional core with atomic memory accesses.
    #[serde(rename = "AtomicSimpleCPU", alias = "atomic")]
    AtomicSimple,
}

impl CpuKind {
    /// Every model.
    pub const ALL: [Self; 4] = [Self::DerivO3, Self::TimingSimple, Self::Minor, Self::AtomicSimple];

    /// Class name of the model.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::DerivO3 => "DerivO3CPU",
            Self::TimingSimple => "TimingSimpleCPU",
            Self::Minor => "MinorCPU",
            Self::AtomicSimple => "AtomicSimpleCPU",
        }
    }

    /// Short alias accepted on the command line.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::DerivO3 => "o3",
            Self::TimingSimple => "timing",
            Self::Minor => "minor",
            Self::AtomicSimple => "atomic",
        }
    }

    /// Memory mode the model must run in.
    pub const fn required_mem_mode(self) -> MemMode {
        match self {
            Self::AtomicSimple => MemMode::Atomic,
            Self::DerivO3 | Self::TimingSimple | Self::Minor => MemMode::Timing,
        }
    }
}

impl fmt::Display for CpuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for CpuKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.class_name().eq_ignore_ascii_case(s) || k.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                kind: "CPU model",
                input: s.to_owned(),
            })
    }
}

/// One hardware thread running the bound workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadContext {
    /// Thread index on the CPU.
    pub thread_id: usize,
    /// Command line the thread starts with.
    pub argv: Vec<String>,
    /// Instruction budget for this thread, if bounded.
    pub max_insts: Option<u64>,
}

/// The CPU and the objects it owns.
#[derive(Debug, Clone, Serialize)]
pub struct Cpu {
    /// Dotted path (`system.cpu`).
    pub path: String,
    /// Microarchitecture model.
    pub kind: CpuKind,
    /// Private L1 instruction cache.
    pub icache: Cache,
    /// Private L1 data cache.
    pub dcache: Cache,
    /// Instruction fetch request port.
    pub icache_port: PortRef,
    /// Load/store request port.
    pub dcache_port: PortRef,
    /// Interrupt controllers, one per thread group.
    pub interrupts: Vec<InterruptController>,
    /// Bound workload.
    pub workload: Option<WorkloadSpec>,
    /// Thread contexts; empty until `create_threads` runs.
    pub threads: Vec<ThreadContext>,
    /// Stop once any thread commits this many instructions.
    pub max_insts_any_thread: Option<u64>,
}

impl Cpu {
    /// Instantiates the CPU and its L1 caches and declares the CPU-side cache ports.
    pub fn new(
        kind: CpuKind,
        l1i: CacheLevelSpec,
        l1d: CacheLevelSpec,
        max_insts_any_thread: Option<u64>,
        netlist: &mut Netlist,
    ) -> Result<Self, WiringError> {
        let icache_port = netlist.declare(CPU_PATH, "icache_port", PortRole::Request, PortKind::Scalar)?;
        let dcache_port = netlist.declare(CPU_PATH, "dcache_port", PortRole::Request, PortKind::Scalar)?;
        let icache = Cache::new(l1i, netlist)?;
        let dcache = Cache::new(l1d, netlist)?;
        debug!(cpu = %kind, "instantiated CPU");
        Ok(Self {
            path: CPU_PATH.to_owned(),
            kind,
            icache,
            dcache,
            icache_port,
            dcache_port,
            interrupts: Vec::new(),
            workload: None,
            threads: Vec::new(),
            max_insts_any_thread,
        })
    }

    /// Binds the instruction and data ports to their L1 caches' `cpu_side`.
    pub fn connect_l1_caches(&self, netlist: &mut Netlist) -> Result<(), WiringError> {
        let _ = netlist.connect(&self.icache_port, &self.icache.cpu_side)?;
        let _ = netlist.connect(&self.dcache_port, &self.dcache.cpu_side)?;
        Ok(())
    }

    /// Creates the interrupt controller.
    ///
    /// Its ports are declared deferred: the simulation engine wires them into the platform's
    /// interrupt fabric.
    pub fn create_interrupt_controller(&mut self, netlist: &mut Netlist) -> Result<(), WiringError> {
        let controller = InterruptController::new(&self.path, self.interrupts.len(), netlist)?;
        self.interrupts.push(controller);
        Ok(())
    }

    /// Both L1 caches, instruction first.
    pub const fn l1_caches(&self) -> [&Cache; 2] {
        [&self.icache, &self.dcache]
    }

    /// Both L1 caches, mutably.
    pub const fn l1_caches_mut(&mut self) -> [&mut Cache; 2] {
        [&mut self.icache, &mut self.dcache]
    }

    /// Attaches the program this CPU runs. A CPU runs exactly one workload.
    pub fn set_workload(&mut self, workload: WorkloadSpec) -> Result<(), ConfigError> {
        if self.workload.is_some() {
            return Err(ConfigError::WorkloadAlreadyBound(self.path.clone()));
        }
        self.workload = Some(workload);
        Ok(())
    }

    /// Materializes one thread context per bound workload.
    pub fn create_threads(&mut self) {
        self.threads = self
            .workload
            .iter()
            .enumerate()
            .map(|(thread_id, workload)| ThreadContext {
                thread_id,
                argv: workload.cmd(),
                max_insts: self.max_insts_any_thread,
            })
            .collect();
        debug!(cpu = %self.path, threads = self.threads.len(), "created threads");
    }
}
