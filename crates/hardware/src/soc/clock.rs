//! Clock and voltage domains.

use serde::Serialize;

use crate::common::{Frequency, Voltage};

/// Supply voltage shared by every object in a clock domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltageDomain {
    /// Supply voltage.
    pub voltage: Voltage,
}

/// The clock driving the system and everything without its own domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClockDomain {
    /// Clock frequency.
    pub clock: Frequency,
    /// Domain supplying this clock.
    pub voltage_domain: VoltageDomain,
}

impl ClockDomain {
    /// Creates a domain at `clock` powered at `voltage`.
    pub const fn new(clock: Frequency, voltage: Voltage) -> Self {
        Self {
            clock,
            voltage_domain: VoltageDomain { voltage },
        }
    }

    /// Clock period in simulator ticks (picoseconds).
    pub fn period_ticks(&self) -> u64 {
        self.clock.period_ticks()
    }
}
