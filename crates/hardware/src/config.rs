//! Configuration system for hierarchy assembly.
//!
//! This module defines the configuration structures used to parameterize the hierarchy. It provides:
//! 1. **Defaults:** Baseline platform constants (clock, voltage, memory range, instruction budget).
//! 2. **Structures:** Sections for system, CPU, cache levels, replacement policy, and workload.
//! 3. **Validation:** Every parameter is checked before the builder wires anything.
//!
//! Configuration is produced once (from JSON, flags, or `HierarchyConfig::default()`), then passed
//! by reference into the builder and never mutated during assembly.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::policies::PolicyChoice;
use crate::cache::{CacheLevel, CacheLevelOverrides, CacheLevelSpec};
use crate::common::{ConfigError, Frequency, MemorySize, Voltage};
use crate::core::CpuKind;
use crate::sim::workload::{Benchmark, WorkloadSpec};
use crate::soc::memory::{AddrRange, MemoryControllerKind};

/// Default configuration constants for the platform.
///
/// These values define the baseline machine when not explicitly overridden.
mod defaults {
    use crate::common::{Frequency, MemorySize, Voltage};

    /// System clock (2 GHz).
    pub const CLOCK: Frequency = Frequency::from_ghz(2);

    /// Supply voltage of the system clock domain (1.0 V).
    pub const VOLTAGE: Voltage = Voltage::from_volts(1.0);

    /// Size of the single physical memory range, starting at address zero (2048 MiB).
    pub const MEM_SIZE: MemorySize = MemorySize::from_mib(2048);

    /// Cache line size in bytes shared by every level.
    pub const CACHE_LINE_SIZE: u32 = 64;

    /// Instruction budget before the run stops (500 million).
    pub const MAX_INSTS_ANY_THREAD: u64 = 500_000_000;

    /// Directory the benchmark catalog resolves relative entries against.
    pub const BENCH_ROOT: &str = "test_bench";
}

/// How the memory system services accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemMode {
    /// Cycle-timed accesses through the port graph.
    #[default]
    Timing,
    /// Single-call functional accesses.
    Atomic,
}

impl fmt::Display for MemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timing => f.write_str("timing"),
            Self::Atomic => f.write_str("atomic"),
        }
    }
}

impl FromStr for MemMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timing" => Ok(Self::Timing),
            "atomic" => Ok(Self::Atomic),
            _ => Err(ConfigError::UnknownVariant {
                kind: "memory mode",
                input: s.to_owned(),
            }),
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use memhier_core::config::HierarchyConfig;
///
/// let config = HierarchyConfig::default();
/// assert_eq!(config.system.clock.to_string(), "2GHz");
/// assert_eq!(config.cache.l2_spec().assoc, 8);
/// ```
///
/// Deserializing a partial file; every omitted field keeps its default:
///
/// ```
/// use memhier_core::cache::policies::{PolicyChoice, ReplacementPolicy};
/// use memhier_core::config::HierarchyConfig;
///
/// let json = r#"{
///     "cache": { "l1_d": { "size": "64kB", "assoc": 8 } },
///     "policy": "lru"
/// }"#;
///
/// let config = HierarchyConfig::from_json_str(json).unwrap();
/// assert_eq!(config.cache.l1_d_spec().size.bytes(), 64 * 1024);
/// assert_eq!(config.policy, PolicyChoice::Explicit(ReplacementPolicy::Lru));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HierarchyConfig {
    /// Clock, memory range, and memory controller.
    pub system: SystemConfig,
    /// CPU model and instruction budget.
    pub cpu: CpuConfig,
    /// Per-level cache overrides.
    pub cache: CacheHierarchyConfig,
    /// Replacement policy applied to every level, or the compiled defaults.
    pub policy: PolicyChoice,
    /// Benchmark selection and catalog entries.
    pub workload: WorkloadConfig,
}

impl HierarchyConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every parameter the builder depends on.
    ///
    /// Runs before any object is instantiated so a bad value never leaves a half-wired graph.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.system.validate()?;
        self.cache.validate()?;
        let line_size = self.system.cache_line_size;
        for spec in self.cache.active_specs() {
            spec.validate(line_size)?;
        }
        let required = self.cpu.kind.required_mem_mode();
        if required != self.system.mem_mode {
            return Err(ConfigError::MemModeMismatch {
                cpu: self.cpu.kind,
                required,
                configured: self.system.mem_mode,
            });
        }
        Ok(())
    }
}

/// Platform-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// System clock frequency.
    pub clock: Frequency,
    /// Voltage of the system clock domain.
    pub voltage: Voltage,
    /// Memory access mode.
    pub mem_mode: MemMode,
    /// Physical memory range served by the controller.
    pub mem_range: AddrRange,
    /// DRAM model behind the controller.
    pub mem_ctrl: MemoryControllerKind,
    /// Cache line size in bytes.
    pub cache_line_size: u32,
    /// Full-system (OS boot) rather than syscall-emulation mode.
    pub full_system: bool,
}

impl SystemConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.cache_line_size.is_power_of_two() {
            return Err(ConfigError::InvalidLineSize(self.cache_line_size));
        }
        if self.mem_range.size.is_zero() {
            return Err(ConfigError::EmptyMemoryRange);
        }
        Ok(())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            clock: defaults::CLOCK,
            voltage: defaults::VOLTAGE,
            mem_mode: MemMode::default(),
            mem_range: AddrRange::from_size(defaults::MEM_SIZE),
            mem_ctrl: MemoryControllerKind::default(),
            cache_line_size: defaults::CACHE_LINE_SIZE,
            full_system: false,
        }
    }
}

/// CPU parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuConfig {
    /// Microarchitecture model.
    pub kind: CpuKind,
    /// Stop once any thread commits this many instructions; `null` for no limit.
    pub max_insts_any_thread: Option<u64>,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            kind: CpuKind::default(),
            max_insts_any_thread: Some(defaults::MAX_INSTS_ANY_THREAD),
        }
    }
}

/// Cache hierarchy configuration, stored as overrides on top of each level's preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache
    pub l1_i: CacheLevelOverrides,
    /// L1 data cache
    pub l1_d: CacheLevelOverrides,
    /// Shared L2 cache
    pub l2: CacheLevelOverrides,
    /// Shared L3 cache; only built when `l3_enabled` is set
    pub l3: CacheLevelOverrides,
    /// Insert an L3 between the L2 and the system crossbar.
    pub l3_enabled: bool,
}

impl CacheHierarchyConfig {
    /// Overrides for `level`.
    pub const fn overrides(&self, level: CacheLevel) -> &CacheLevelOverrides {
        match level {
            CacheLevel::L1Instruction => &self.l1_i,
            CacheLevel::L1Data => &self.l1_d,
            CacheLevel::L2 => &self.l2,
            CacheLevel::L3 => &self.l3,
        }
    }

    /// Mutable overrides for `level`.
    pub const fn overrides_mut(&mut self, level: CacheLevel) -> &mut CacheLevelOverrides {
        match level {
            CacheLevel::L1Instruction => &mut self.l1_i,
            CacheLevel::L1Data => &mut self.l1_d,
            CacheLevel::L2 => &mut self.l2,
            CacheLevel::L3 => &mut self.l3,
        }
    }

    /// The preset for `level` with its overrides applied.
    pub fn spec(&self, level: CacheLevel) -> CacheLevelSpec {
        self.overrides(level).apply(CacheLevelSpec::preset(level))
    }

    /// Effective L1 instruction cache spec.
    pub fn l1_i_spec(&self) -> CacheLevelSpec {
        self.spec(CacheLevel::L1Instruction)
    }

    /// Effective L1 data cache spec.
    pub fn l1_d_spec(&self) -> CacheLevelSpec {
        self.spec(CacheLevel::L1Data)
    }

    /// Effective L2 spec.
    pub fn l2_spec(&self) -> CacheLevelSpec {
        self.spec(CacheLevel::L2)
    }

    /// Effective L3 spec, if the L3 is enabled.
    pub fn l3_spec(&self) -> Option<CacheLevelSpec> {
        self.l3_enabled.then(|| self.spec(CacheLevel::L3))
    }

    /// Rejects L3 overrides while the L3 is disabled, since they would be dropped.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.l3_enabled && self.l3 != CacheLevelOverrides::default() {
            return Err(ConfigError::LevelNotEnabled(CacheLevel::L3.prefix()));
        }
        Ok(())
    }

    /// Specs of every level that will be instantiated, nearest the CPU first.
    pub fn active_specs(&self) -> Vec<CacheLevelSpec> {
        let mut specs = vec![self.l1_i_spec(), self.l1_d_spec(), self.l2_spec()];
        specs.extend(self.l3_spec());
        specs
    }
}

/// Workload selection and benchmark catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Benchmark to run.
    pub benchmark: Benchmark,
    /// Directory the built-in catalog entries are resolved against.
    pub bench_root: PathBuf,
    /// Replacement entries, keyed by benchmark.
    pub entries: BTreeMap<Benchmark, WorkloadSpec>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            benchmark: Benchmark::default(),
            bench_root: PathBuf::from(defaults::BENCH_ROOT),
            entries: BTreeMap::new(),
        }
    }
}
