//! Memory hierarchy assembly library.
//!
//! This crate builds the object tree of a single-CPU cache hierarchy for a cycle-level
//! simulation engine. It provides:
//! 1. **Cache:** Per-level parameter presets, overrides, and the replacement policy catalog.
//! 2. **Core:** The CPU descriptor, its L1 caches, interrupt controller, and thread contexts.
//! 3. **SoC:** Port netlist, crossbars, memory controller, clock domain, and the builder.
//! 4. **Simulation:** Benchmark selection, workload binding, and the engine driver.
//! 5. **Configuration:** A serde-backed `HierarchyConfig` validated before any wiring.
//!
//! # Examples
//!
//! ```
//! use memhier_core::config::HierarchyConfig;
//! use memhier_core::sim::workload::{self, Benchmark, WorkloadCatalog};
//! use memhier_core::soc::HierarchyBuilder;
//!
//! let config = HierarchyConfig::default();
//! let mut root = HierarchyBuilder::new(&config).build().unwrap();
//!
//! let catalog = WorkloadCatalog::from_config(&config.workload);
//! workload::bind(&mut root, catalog.spec(Benchmark::Hello)).unwrap();
//! assert_eq!(root.system.cpu.threads.len(), 1);
//! ```

/// Cache level specs, presets, and replacement policies.
pub mod cache;
/// Units and error types.
pub mod common;
/// Hierarchy configuration (defaults, sections, validation).
pub mod config;
/// CPU descriptor and interrupt controller.
pub mod core;
/// Workload binding and simulation driver.
pub mod sim;
/// System components, netlist, and the hierarchy builder.
pub mod soc;

/// Root configuration type; use `HierarchyConfig::default()` or deserialize from JSON.
pub use crate::config::HierarchyConfig;
/// Error returned by the builder.
pub use crate::common::HierarchyError;
/// Builder and assembled tree.
pub use crate::soc::{HierarchyBuilder, Root, System};
