//! Error types for hierarchy assembly.
//!
//! This module defines every failure the assembly path can report. It provides:
//! 1. **`ConfigError`:** Invalid or conflicting parameters, rejected before wiring begins.
//! 2. **`WiringError`:** Port-graph violations (unknown, double-bound, or dangling ports).
//! 3. **`WorkloadError`:** Problems with the workload executable, detected by an engine.
//! 4. **`EngineError`:** Failures reported by the simulation driver.
//! 5. **`HierarchyError`:** Union of the configuration and wiring errors returned by the builder.
//!
//! None of these are retried; the hierarchy either assembles completely or the run does not start.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::CpuKind;
use crate::config::MemMode;
use crate::soc::ports::PortId;

use super::units::MemorySize;

/// An invalid or conflicting configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A size, frequency, or voltage token could not be parsed.
    #[error("invalid {kind} '{input}': {reason}")]
    InvalidQuantity {
        /// Which quantity was being parsed.
        kind: &'static str,
        /// The rejected token.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A cache parameter that must be positive was zero.
    #[error("{level}: {field} must be positive, got {value}")]
    InvalidCacheParameter {
        /// Name of the cache level.
        level: String,
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },

    /// A cache is too small to hold a single set.
    #[error("{level}: capacity {size} cannot hold one set of {assoc} x {line_size}-byte lines")]
    CapacityTooSmall {
        /// Name of the cache level.
        level: String,
        /// Configured capacity.
        size: MemorySize,
        /// Configured associativity.
        assoc: u32,
        /// System cache line size in bytes.
        line_size: u32,
    },

    /// The system cache line size is zero or not a power of two.
    #[error("cache_line_size must be a positive power of two, got {0}")]
    InvalidLineSize(u32),

    /// Overrides were given for a cache level that is not enabled.
    #[error("{0} settings were given but {0} is not enabled")]
    LevelNotEnabled(&'static str),

    /// The memory range has no bytes.
    #[error("memory range must be non-empty")]
    EmptyMemoryRange,

    /// More than one replacement policy flag was set.
    #[error("conflicting replacement policies selected: {}", .0.join(", "))]
    ConflictingPolicies(Vec<&'static str>),

    /// More than one benchmark flag was set.
    #[error("conflicting benchmarks selected: {}", .0.join(", "))]
    ConflictingBenchmarks(Vec<&'static str>),

    /// The CPU model cannot run in the configured memory mode.
    #[error("{cpu} requires memory mode '{required}', but the system uses '{configured}'")]
    MemModeMismatch {
        /// Requested CPU model.
        cpu: CpuKind,
        /// Mode that model needs.
        required: MemMode,
        /// Mode in the configuration.
        configured: MemMode,
    },

    /// A named variant (CPU kind, policy, benchmark) was not recognised.
    #[error("unknown {kind} '{input}'")]
    UnknownVariant {
        /// Which enumeration was being parsed.
        kind: &'static str,
        /// The rejected name.
        input: String,
    },

    /// A workload was bound to a CPU that already has one.
    #[error("a workload is already bound to {0}")]
    WorkloadAlreadyBound(String),

    /// The configuration file could not be read.
    #[error("failed to read config file '{}'", path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `HierarchyConfig`.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// A violation of the port-graph invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    /// A port was used without being declared by its owner.
    #[error("port {0} was never declared")]
    UndeclaredPort(PortId),

    /// The same port was declared twice.
    #[error("port {0} is declared more than once")]
    DuplicatePort(PortId),

    /// A scalar port already has a peer.
    #[error("port {port} is already bound to {peer}")]
    AlreadyBound {
        /// The port being connected again.
        port: PortId,
        /// Its existing peer.
        peer: PortId,
    },

    /// The two sides of a connection do not have complementary roles.
    #[error("cannot connect {request} to {response}: {reason}")]
    RoleMismatch {
        /// Side expected to issue requests.
        request: PortId,
        /// Side expected to accept requests.
        response: PortId,
        /// What was wrong.
        reason: &'static str,
    },

    /// A port was left without a peer after assembly.
    #[error("port {0} is left unconnected")]
    Unconnected(PortId),
}

/// A problem with the workload executable.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// The executable does not exist.
    #[error("workload executable '{}' does not exist", .0.display())]
    MissingExecutable(PathBuf),

    /// The path exists but is not a regular file.
    #[error("workload executable '{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),

    /// Reading the executable's metadata failed for a reason other than absence.
    #[error("cannot access workload executable '{}'", path.display())]
    Inaccessible {
        /// Path of the executable.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A failure reported while driving the simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The root was handed over without a workload on its CPU.
    #[error("no workload is bound to {0}")]
    NoWorkload(String),

    /// The engine rejected the workload at startup.
    #[error("fatal startup failure: {0}")]
    Workload(#[from] WorkloadError),

    /// Any other engine-side failure.
    #[error("simulation engine failed: {0}")]
    Engine(String),
}

/// Error returned by `HierarchyBuilder::build`.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// Rejected before wiring began.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The port graph is inconsistent.
    #[error(transparent)]
    Wiring(#[from] WiringError),
}
