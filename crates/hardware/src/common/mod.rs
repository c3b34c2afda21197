//! Common types shared by every part of the hierarchy assembler.
//!
//! This module provides:
//! 1. **Units:** Parsed memory sizes, frequencies, and voltages.
//! 2. **Error Handling:** Configuration, wiring, workload, and engine error types.

/// Error types for configuration, wiring, and simulation startup.
pub mod error;

/// Memory size, frequency, and voltage quantities.
pub mod units;

pub use error::{ConfigError, EngineError, HierarchyError, WiringError, WorkloadError};
pub use units::{Frequency, MemorySize, Voltage};
