//! Processor descriptor.
//!
//! This module holds the CPU side of the hierarchy: the CPU model, its private L1 caches, the
//! interrupt controller, and the thread contexts created once a workload is bound.

/// CPU model, cache ports, interrupt controller, and workload threads.
pub mod cpu;

pub use self::cpu::{Cpu, CpuKind, InterruptController, ThreadContext};
