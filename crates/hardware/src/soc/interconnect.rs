//! Crossbar interconnect stages.
//!
//! A crossbar fans many request ports in through its `slave` vector port and fans out to many
//! response ports through its `master` vector port. Two flavours are used by the hierarchy:
//! 1. **`L2XBar`:** Core-side stage between the private L1s and the shared L2 (wide, low latency).
//! 2. **`SystemXBar`:** Memory-side stage in front of the memory controller and system port.

use std::fmt;

use serde::Serialize;

use super::ports::{Netlist, PortKind, PortRef, PortRole};
use crate::common::WiringError;

/// Crossbar flavour; selects default width and latencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrossbarKind {
    /// Core-side crossbar feeding a shared cache.
    L2XBar,
    /// Memory-side system crossbar.
    SystemXBar,
}

impl fmt::Display for CrossbarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2XBar => f.write_str("L2XBar"),
            Self::SystemXBar => f.write_str("SystemXBar"),
        }
    }
}

/// Fixed timing parameters of a crossbar, in cycles (width in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossbarTiming {
    /// Datapath width in bytes.
    pub width: u32,
    /// Cycles spent in the frontend before routing.
    pub frontend_latency: u32,
    /// Cycles to forward a request.
    pub forward_latency: u32,
    /// Cycles to return a response.
    pub response_latency: u32,
    /// Cycles to return a snoop response.
    pub snoop_response_latency: u32,
}

impl CrossbarKind {
    /// Default timing for this flavour.
    pub const fn timing(self) -> CrossbarTiming {
        match self {
            Self::L2XBar => CrossbarTiming {
                width: 32,
                frontend_latency: 1,
                forward_latency: 0,
                response_latency: 1,
                snoop_response_latency: 1,
            },
            Self::SystemXBar => CrossbarTiming {
                width: 16,
                frontend_latency: 3,
                forward_latency: 4,
                response_latency: 2,
                snoop_response_latency: 4,
            },
        }
    }
}

/// A crossbar instance in the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct Crossbar {
    /// Dotted path, e.g. `system.l2bus`.
    pub path: String,
    /// Flavour.
    pub kind: CrossbarKind,
    /// Width and latencies.
    pub timing: CrossbarTiming,
    /// Fan-in port; upstream `mem_side` ports bind here.
    pub slave: PortRef,
    /// Fan-out port; binds to downstream `cpu_side` or controller ports.
    pub master: PortRef,
}

impl Crossbar {
    /// Creates a crossbar and declares its `slave` and `master` vector ports.
    pub fn new(path: &str, kind: CrossbarKind, netlist: &mut Netlist) -> Result<Self, WiringError> {
        let slave = netlist.declare(path, "slave", PortRole::Response, PortKind::Vector)?;
        let master = netlist.declare(path, "master", PortRole::Request, PortKind::Vector)?;
        Ok(Self {
            path: path.to_owned(),
            kind,
            timing: kind.timing(),
            slave,
            master,
        })
    }

    /// Cycles for a request of `bytes` to cross this stage.
    ///
    /// Frontend plus forward latency, then one cycle per `width`-byte beat.
    pub fn transit_cycles(&self, bytes: u32) -> u32 {
        let beats = bytes.div_ceil(self.timing.width.max(1));
        self.timing.frontend_latency + self.timing.forward_latency + beats
    }

    /// Number of upstream ports bound to `slave`.
    pub fn fan_in(&self, netlist: &Netlist) -> usize {
        netlist.bound_count(&self.slave)
    }

    /// Number of downstream ports bound to `master`.
    pub fn fan_out(&self, netlist: &Netlist) -> usize {
        netlist.bound_count(&self.master)
    }
}
