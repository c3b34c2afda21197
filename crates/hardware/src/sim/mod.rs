//! Workload binding and the simulation driver.

/// Simulation engine contract, driver, and dry-run engine.
pub mod simulator;

/// Benchmark selection, catalog, and binding.
pub mod workload;

pub use simulator::{DryRunEngine, ExitEvent, SimulationEngine, Simulator};
pub use workload::{Benchmark, BenchmarkFlags, WorkloadCatalog, WorkloadSpec};
