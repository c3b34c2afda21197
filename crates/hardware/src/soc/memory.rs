//! Memory controller descriptor.
//!
//! The controller terminates the hierarchy: its single response `port` is bound to the system
//! crossbar and it serves one physical address range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ports::{Netlist, PortKind, PortRef, PortRole};
use crate::common::{ConfigError, MemorySize, WiringError};

/// DRAM interface model used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemoryControllerKind {
    /// DDR3-1600, 8 devices of x8.
    #[default]
    #[serde(rename = "DDR3_1600_8x8")]
    Ddr3_1600_8x8,
    /// DDR4-2400, 8 devices of x8.
    #[serde(rename = "DDR4_2400_8x8")]
    Ddr4_2400_8x8,
    /// Fixed-latency memory without DRAM timing.
    #[serde(rename = "SimpleMemory")]
    Simple,
}

impl MemoryControllerKind {
    /// Class name of the controller model.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Ddr3_1600_8x8 => "DDR3_1600_8x8",
            Self::Ddr4_2400_8x8 => "DDR4_2400_8x8",
            Self::Simple => "SimpleMemory",
        }
    }
}

impl fmt::Display for MemoryControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for MemoryControllerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Ddr3_1600_8x8, Self::Ddr4_2400_8x8, Self::Simple]
            .into_iter()
            .find(|k| k.class_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                kind: "memory controller",
                input: s.to_owned(),
            })
    }
}

/// A contiguous physical address range `[start, start + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrRange {
    /// First address.
    #[serde(default)]
    pub start: u64,
    /// Length in bytes.
    pub size: MemorySize,
}

impl AddrRange {
    /// A range of `size` bytes starting at address zero.
    pub const fn from_size(size: MemorySize) -> Self {
        Self { start: 0, size }
    }

    /// One past the last address.
    pub const fn end(&self) -> u64 {
        self.start.saturating_add(self.size.bytes())
    }
}

impl fmt::Display for AddrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}:{:#x}]", self.start, self.end())
    }
}

/// The memory controller at the bottom of the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryController {
    /// Dotted path, e.g. `system.mem_ctrl`.
    pub path: String,
    /// DRAM model.
    pub kind: MemoryControllerKind,
    /// Address range served.
    pub range: AddrRange,
    /// Response port bound to the system crossbar.
    pub port: PortRef,
}

impl MemoryController {
    /// Creates a controller serving `range` and declares its port.
    pub fn new(
        path: &str,
        kind: MemoryControllerKind,
        range: AddrRange,
        netlist: &mut Netlist,
    ) -> Result<Self, WiringError> {
        let port = netlist.declare(path, "port", PortRole::Response, PortKind::Scalar)?;
        Ok(Self {
            path: path.to_owned(),
            kind,
            range,
            port,
        })
    }
}
