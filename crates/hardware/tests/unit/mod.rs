//! # Unit Components
//!
//! One module per library module: cache parameters and policies, units and errors,
//! configuration, the CPU descriptor, the SoC (netlist and builder), and simulation.



/// JSON configuration, defaults, and validation.
pub mod config;

/// CPU model, L1 ports, interrupt controller, and threads.
pub mod core;

/// Workload catalog, binding, and the simulation driver.
pub mod sim;

/// Port netlist and hierarchy assembly.
pub mod soc;
