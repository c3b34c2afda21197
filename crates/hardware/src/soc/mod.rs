//! System-level components of the memory hierarchy.
//!
//! This module organizes the objects that surround the caches: the port netlist, crossbars,
//! memory controller, clock domain, and the builder that assembles them into a `Root`.

/// Hierarchy builder and the assembled `Root` / `System`.
pub mod builder;

/// Clock and voltage domains.
pub mod clock;

/// Crossbar interconnect stages.
pub mod interconnect;

/// Memory controller and address ranges.
pub mod memory;

/// Port declarations, bindings, and dangling-port validation.
pub mod ports;

pub use builder::{HierarchyBuilder, Root, System};
