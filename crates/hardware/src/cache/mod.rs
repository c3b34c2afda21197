//! Cache level parameters and cache instances.
//!
//! This module describes one level of the hierarchy. It provides:
//! 1. **`CacheLevelSpec`:** Immutable size/associativity/latency/MSHR record with named presets.
//! 2. **Overrides:** Single-field (`CacheOverride`) and per-level (`CacheLevelOverrides`) updates.
//! 3. **`Cache`:** An instantiated level with its `cpu_side` and `mem_side` ports and optional
//!    explicit replacement policy.

/// Replacement policy catalog and flag resolution.
pub mod policies;

/// Baseline parameters per level.
pub mod presets;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::policies::ReplacementPolicy;
use crate::common::{ConfigError, MemorySize, WiringError};
use crate::soc::ports::{Netlist, PortKind, PortRef, PortRole};

/// The position of a cache in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CacheLevel {
    /// Private L1 instruction cache.
    #[serde(rename = "l1i")]
    L1Instruction,
    /// Private L1 data cache.
    #[serde(rename = "l1d")]
    L1Data,
    /// Shared L2 cache.
    #[serde(rename = "l2")]
    L2,
    /// Optional shared L3 cache.
    #[serde(rename = "l3")]
    L3,
}

impl CacheLevel {
    /// Short name used as the command-line flag prefix (`l1i`, `l1d`, `l2`, `l3`).
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::L1Instruction => "l1i",
            Self::L1Data => "l1d",
            Self::L2 => "l2",
            Self::L3 => "l3",
        }
    }

    /// Dotted path of the cache object in the assembled system.
    pub const fn path(self) -> &'static str {
        match self {
            Self::L1Instruction => "system.cpu.icache",
            Self::L1Data => "system.cpu.dcache",
            Self::L2 => "system.l2cache",
            Self::L3 => "system.l3cache",
        }
    }
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L1Instruction => f.write_str("L1I"),
            Self::L1Data => f.write_str("L1D"),
            Self::L2 => f.write_str("L2"),
            Self::L3 => f.write_str("L3"),
        }
    }
}

/// Parameters of one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheLevelSpec {
    /// Which level this spec describes.
    pub level: CacheLevel,
    /// Capacity.
    pub size: MemorySize,
    /// Associativity (ways per set).
    pub assoc: u32,
    /// Tag lookup latency in cycles.
    pub tag_latency: u32,
    /// Data array latency in cycles.
    pub data_latency: u32,
    /// Latency to return a response upstream, in cycles.
    pub response_latency: u32,
    /// Miss status holding registers.
    pub mshrs: u32,
    /// Requests that may coalesce onto one outstanding miss.
    pub tgts_per_mshr: u32,
}

/// A single-field change to a `CacheLevelSpec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOverride {
    /// Capacity.
    Size(MemorySize),
    /// Associativity.
    Assoc(u32),
    /// Response latency.
    ResponseLatency(u32),
    /// Hit latency: sets both tag and data latency.
    HitLatency(u32),
    /// Tag latency only.
    TagLatency(u32),
    /// Data latency only.
    DataLatency(u32),
    /// MSHR count.
    Mshrs(u32),
    /// Targets per MSHR.
    TargetsPerMshr(u32),
}

impl CacheLevelSpec {
    /// Baseline spec for `level`.
    pub const fn preset(level: CacheLevel) -> Self {
        presets::preset(level)
    }

    /// Returns a copy with one field replaced.
    #[must_use]
    pub const fn with_override(mut self, update: CacheOverride) -> Self {
        match update {
            CacheOverride::Size(size) => self.size = size,
            CacheOverride::Assoc(assoc) => self.assoc = assoc,
            CacheOverride::ResponseLatency(cycles) => self.response_latency = cycles,
            CacheOverride::HitLatency(cycles) => {
                self.tag_latency = cycles;
                self.data_latency = cycles;
            }
            CacheOverride::TagLatency(cycles) => self.tag_latency = cycles,
            CacheOverride::DataLatency(cycles) => self.data_latency = cycles,
            CacheOverride::Mshrs(n) => self.mshrs = n,
            CacheOverride::TargetsPerMshr(n) => self.tgts_per_mshr = n,
        }
        self
    }

    /// Number of sets for the given line size; zero if the spec is degenerate.
    pub fn num_sets(&self, line_size: u32) -> u64 {
        let set_bytes = u64::from(self.assoc) * u64::from(line_size);
        self.size.bytes().checked_div(set_bytes).unwrap_or(0)
    }

    /// Checks every count and latency is positive and the capacity holds at least one set.
    pub fn validate(&self, line_size: u32) -> Result<(), ConfigError> {
        let fields = [
            ("size", self.size.bytes()),
            ("assoc", u64::from(self.assoc)),
            ("tag_latency", u64::from(self.tag_latency)),
            ("data_latency", u64::from(self.data_latency)),
            ("response_latency", u64::from(self.response_latency)),
            ("mshrs", u64::from(self.mshrs)),
            ("tgts_per_mshr", u64::from(self.tgts_per_mshr)),
        ];
        if let Some(&(field, value)) = fields.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::InvalidCacheParameter {
                level: self.level.to_string(),
                field,
                value,
            });
        }
        if self.num_sets(line_size) == 0 {
            return Err(ConfigError::CapacityTooSmall {
                level: self.level.to_string(),
                size: self.size,
                assoc: self.assoc,
                line_size,
            });
        }
        Ok(())
    }
}

/// Optional per-level overrides, as supplied by flags or a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheLevelOverrides {
    /// Capacity (`--<level>_size`).
    pub size: Option<MemorySize>,
    /// Associativity (`--<level>_assoc`).
    pub assoc: Option<u32>,
    /// Response latency (`--<level>_resl`).
    pub response_latency: Option<u32>,
    /// Hit latency, applied to tag and data (`--<level>_hitl`).
    pub hit_latency: Option<u32>,
    /// Tag latency alone; applied after `hit_latency`.
    pub tag_latency: Option<u32>,
    /// Data latency alone; applied after `hit_latency`.
    pub data_latency: Option<u32>,
    /// MSHR count.
    pub mshrs: Option<u32>,
    /// Targets per MSHR.
    pub tgts_per_mshr: Option<u32>,
}

impl CacheLevelOverrides {
    /// The set overrides, in application order.
    pub fn to_overrides(&self) -> Vec<CacheOverride> {
        [
            self.size.map(CacheOverride::Size),
            self.assoc.map(CacheOverride::Assoc),
            self.response_latency.map(CacheOverride::ResponseLatency),
            self.hit_latency.map(CacheOverride::HitLatency),
            self.tag_latency.map(CacheOverride::TagLatency),
            self.data_latency.map(CacheOverride::DataLatency),
            self.mshrs.map(CacheOverride::Mshrs),
            self.tgts_per_mshr.map(CacheOverride::TargetsPerMshr),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Applies every set override to `spec`.
    pub fn apply(&self, spec: CacheLevelSpec) -> CacheLevelSpec {
        self.to_overrides()
            .into_iter()
            .fold(spec, CacheLevelSpec::with_override)
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merged_with(self, other: &Self) -> Self {
        Self {
            size: other.size.or(self.size),
            assoc: other.assoc.or(self.assoc),
            response_latency: other.response_latency.or(self.response_latency),
            hit_latency: other.hit_latency.or(self.hit_latency),
            tag_latency: other.tag_latency.or(self.tag_latency),
            data_latency: other.data_latency.or(self.data_latency),
            mshrs: other.mshrs.or(self.mshrs),
            tgts_per_mshr: other.tgts_per_mshr.or(self.tgts_per_mshr),
        }
    }
}

/// An instantiated cache level.
#[derive(Debug, Clone, Serialize)]
pub struct Cache {
    /// Dotted path, e.g. `system.cpu.icache`.
    pub path: String,
    /// Parameters the cache was built with.
    pub spec: CacheLevelSpec,
    /// Explicit policy; `None` keeps the level's compiled-in default.
    pub replacement_policy: Option<ReplacementPolicy>,
    /// Upstream (CPU-facing) response port.
    pub cpu_side: PortRef,
    /// Downstream (memory-facing) request port.
    pub mem_side: PortRef,
}

impl Cache {
    /// Instantiates a cache at `spec.level`'s path and declares its two ports.
    pub fn new(spec: CacheLevelSpec, netlist: &mut Netlist) -> Result<Self, WiringError> {
        let path = spec.level.path();
        let cpu_side = netlist.declare(path, "cpu_side", PortRole::Response, PortKind::Scalar)?;
        let mem_side = netlist.declare(path, "mem_side", PortRole::Request, PortKind::Scalar)?;
        debug!(
            cache = path,
            size = %spec.size,
            assoc = spec.assoc,
            mshrs = spec.mshrs,
            "instantiated cache"
        );
        Ok(Self {
            path: path.to_owned(),
            spec,
            replacement_policy: None,
            cpu_side,
            mem_side,
        })
    }

    /// Assigns an explicit replacement policy.
    pub fn set_replacement_policy(&mut self, policy: ReplacementPolicy) {
        self.replacement_policy = Some(policy);
    }

    /// Name of the policy the engine will instantiate.
    pub fn policy_name(&self) -> &'static str {
        self.replacement_policy
            .map_or("compiled default", ReplacementPolicy::class_name)
    }
}
