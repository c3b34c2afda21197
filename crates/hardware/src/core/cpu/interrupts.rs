//! Interrupt controller descriptor.
//!
//! The controller is created with the CPU, but its three ports belong to the platform's
//! interrupt fabric. They are declared deferred so the simulation engine can bind them; the
//! dangling-port check skips them.

use serde::Serialize;

use crate::common::WiringError;
use crate::soc::ports::{Netlist, PortRef, PortRole};

/// Per-CPU interrupt controller.
#[derive(Debug, Clone, Serialize)]
pub struct InterruptController {
    /// Dotted path, e.g. `system.cpu.interrupts0`.
    pub path: String,
    /// Programmed I/O response port.
    pub pio: PortRef,
    /// Port that sends interrupt messages.
    pub int_requestor: PortRef,
    /// Port that receives interrupt messages.
    pub int_responder: PortRef,
}

impl InterruptController {
    /// Creates controller number `index` under `cpu_path`.
    pub fn new(cpu_path: &str, index: usize, netlist: &mut Netlist) -> Result<Self, WiringError> {
        let path = format!("{cpu_path}.interrupts{index}");
        let pio = netlist.declare_deferred(&path, "pio", PortRole::Response)?;
        let int_requestor = netlist.declare_deferred(&path, "int_requestor", PortRole::Request)?;
        let int_responder = netlist.declare_deferred(&path, "int_responder", PortRole::Response)?;
        Ok(Self {
            path,
            pio,
            int_requestor,
            int_responder,
        })
    }

    /// The ports the engine is expected to bind.
    pub fn deferred_ports(&self) -> [&PortRef; 3] {
        [&self.pio, &self.int_requestor, &self.int_responder]
    }
}
