//! Baseline parameters for each cache level.
//!
//! These are the values a level is built with when no override is supplied.

use super::{CacheLevel, CacheLevelSpec};
use crate::common::MemorySize;

/// L1 capacity per cache (32 KiB).
pub const L1_SIZE: MemorySize = MemorySize::from_kib(32);
/// L1 associativity.
pub const L1_ASSOC: u32 = 4;
/// L1 tag, data, and response latency in cycles.
pub const L1_LATENCY: u32 = 2;
/// L1 outstanding misses.
pub const L1_MSHRS: u32 = 4;
/// L1 requests coalesced per outstanding miss.
pub const L1_TGTS_PER_MSHR: u32 = 20;

/// L2 capacity (2 MiB).
pub const L2_SIZE: MemorySize = MemorySize::from_mib(2);
/// L2 associativity.
pub const L2_ASSOC: u32 = 8;
/// L2 tag, data, and response latency in cycles.
pub const L2_LATENCY: u32 = 20;
/// L2 outstanding misses.
pub const L2_MSHRS: u32 = 20;
/// L2 requests coalesced per outstanding miss.
pub const L2_TGTS_PER_MSHR: u32 = 12;

/// L3 capacity (8 MiB).
pub const L3_SIZE: MemorySize = MemorySize::from_mib(8);
/// L3 associativity.
pub const L3_ASSOC: u32 = 16;
/// L3 tag, data, and response latency in cycles.
pub const L3_LATENCY: u32 = 32;
/// L3 outstanding misses.
pub const L3_MSHRS: u32 = 32;
/// L3 requests coalesced per outstanding miss.
pub const L3_TGTS_PER_MSHR: u32 = 12;

const fn uniform(
    level: CacheLevel,
    size: MemorySize,
    assoc: u32,
    latency: u32,
    mshrs: u32,
    tgts_per_mshr: u32,
) -> CacheLevelSpec {
    CacheLevelSpec {
        level,
        size,
        assoc,
        tag_latency: latency,
        data_latency: latency,
        response_latency: latency,
        mshrs,
        tgts_per_mshr,
    }
}

/// Returns the baseline spec for `level`.
pub const fn preset(level: CacheLevel) -> CacheLevelSpec {
    match level {
        CacheLevel::L1Instruction | CacheLevel::L1Data => uniform(
            level,
            L1_SIZE,
            L1_ASSOC,
            L1_LATENCY,
            L1_MSHRS,
            L1_TGTS_PER_MSHR,
        ),
        CacheLevel::L2 => uniform(level, L2_SIZE, L2_ASSOC, L2_LATENCY, L2_MSHRS, L2_TGTS_PER_MSHR),
        CacheLevel::L3 => uniform(level, L3_SIZE, L3_ASSOC, L3_LATENCY, L3_MSHRS, L3_TGTS_PER_MSHR),
    }
}
