//! Simulation driver.
//!
//! The assembled `Root` is handed to a `SimulationEngine`, which instantiates it and runs it to
//! completion. It provides:
//! 1. **`SimulationEngine`:** The two-call contract (instantiate, then simulate) an engine fulfils.
//! 2. **`Simulator`:** Owns the root and the engine, and refuses to start without a workload.
//! 3. **`DryRunEngine`:** Checks the workload can be loaded and stops at tick zero.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::common::{EngineError, WorkloadError};
use crate::soc::Root;

/// Cause reported by `DryRunEngine`.
pub const DRY_RUN_CAUSE: &str = "dry run: no timing engine attached";

/// Why and when a simulation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEvent {
    /// Simulated time of the exit, in ticks.
    pub tick: u64,
    /// Human-readable cause.
    pub cause: String,
}

impl ExitEvent {
    /// Creates an exit event.
    pub fn new(tick: u64, cause: impl Into<String>) -> Self {
        Self {
            tick,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ExitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exiting @ tick {} because {}", self.tick, self.cause)
    }
}

/// An engine that can execute an assembled hierarchy.
pub trait SimulationEngine {
    /// Materializes the object tree; called exactly once, before `simulate`.
    fn instantiate(&mut self, root: &Root) -> Result<(), EngineError>;

    /// Runs until the workload exits or a stop condition is hit.
    fn simulate(&mut self) -> Result<ExitEvent, EngineError>;
}

/// Owns a root and the engine that will run it.
#[derive(Debug)]
pub struct Simulator<E> {
    root: Root,
    engine: E,
}

impl<E: SimulationEngine> Simulator<E> {
    /// Pairs `root` with `engine`.
    pub const fn new(root: Root, engine: E) -> Self {
        Self { root, engine }
    }

    /// The root this simulator drives.
    pub const fn root(&self) -> &Root {
        &self.root
    }

    /// Instantiates the root and simulates it.
    ///
    /// Fails with `EngineError::NoWorkload` before touching the engine if the CPU has no
    /// bound workload.
    pub fn run(&mut self) -> Result<ExitEvent, EngineError> {
        if !self.root.has_workload() {
            return Err(EngineError::NoWorkload(self.root.system.cpu.path.clone()));
        }
        self.engine.instantiate(&self.root)?;
        let event = self.engine.simulate()?;
        info!(tick = event.tick, cause = %event.cause, "simulation finished");
        Ok(event)
    }
}

/// Engine that validates the workload and stops immediately.
#[derive(Debug, Default, Clone)]
pub struct DryRunEngine {
    executable: Option<PathBuf>,
}

impl DryRunEngine {
    /// Creates an engine with nothing instantiated.
    pub const fn new() -> Self {
        Self { executable: None }
    }
}

impl SimulationEngine for DryRunEngine {
    fn instantiate(&mut self, root: &Root) -> Result<(), EngineError> {
        let cpu = &root.system.cpu;
        let workload = cpu
            .workload
            .as_ref()
            .ok_or_else(|| EngineError::NoWorkload(cpu.path.clone()))?;
        let path = &workload.executable;
        let meta = fs::metadata(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => WorkloadError::MissingExecutable(path.clone()),
            _ => WorkloadError::Inaccessible {
                path: path.clone(),
                source,
            },
        })?;
        if !meta.is_file() {
            return Err(WorkloadError::NotAFile(path.clone()).into());
        }
        self.executable = Some(path.clone());
        Ok(())
    }

    fn simulate(&mut self) -> Result<ExitEvent, EngineError> {
        match &self.executable {
            Some(path) => {
                warn!(executable = %path.display(), "no timing engine attached; stopping at tick 0");
                Ok(ExitEvent::new(0, DRY_RUN_CAUSE))
            }
            None => Err(EngineError::Engine("simulate called before instantiate".to_owned())),
        }
    }
}
