//! Physical quantities used in hierarchy parameters.
//!
//! This module parses the string tokens the configuration layer accepts. It provides:
//! 1. **`MemorySize`:** Byte capacities such as `"32kB"`, `"2MB"`, `"2048MB"` (binary multipliers).
//! 2. **`Frequency`:** Clock rates such as `"2GHz"` (decimal multipliers).
//! 3. **`Voltage`:** Supply voltages such as `"1.0V"` or `"800mV"`.
//!
//! All three serialize back to their canonical string form so a dumped topology
//! reads the same way the configuration was written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Simulator ticks per second (one tick is one picosecond).
pub const TICKS_PER_SECOND: u64 = 1_000_000_000_000;

const SIZE_UNITS: &[(&str, u64)] = &[
    ("TiB", 1 << 40),
    ("TB", 1 << 40),
    ("GiB", 1 << 30),
    ("GB", 1 << 30),
    ("MiB", 1 << 20),
    ("MB", 1 << 20),
    ("KiB", 1 << 10),
    ("kB", 1 << 10),
    ("KB", 1 << 10),
    ("B", 1),
    ("T", 1 << 40),
    ("G", 1 << 30),
    ("M", 1 << 20),
    ("k", 1 << 10),
    ("K", 1 << 10),
];

const FREQ_UNITS: &[(&str, u64)] = &[
    ("THz", 1_000_000_000_000),
    ("GHz", 1_000_000_000),
    ("MHz", 1_000_000),
    ("kHz", 1_000),
    ("Hz", 1),
];

/// Splits `"32kB"` into `("32", "kB")`.
fn split_number(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    input.split_at(end)
}

/// A capacity in bytes.
///
/// Parsing follows the simulator convention where `k`, `M`, `G` are powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemorySize(u64);

impl MemorySize {
    /// Creates a size from a raw byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Creates a size of `kib` kibibytes.
    pub const fn from_kib(kib: u64) -> Self {
        Self(kib << 10)
    }

    /// Creates a size of `mib` mebibytes.
    pub const fn from_mib(mib: u64) -> Self {
        Self(mib << 20)
    }

    /// Returns the byte count.
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero-byte size.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for MemorySize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidQuantity {
            kind: "memory size",
            input: s.to_owned(),
            reason,
        };
        let (number, suffix) = split_number(s.trim());
        if number.is_empty() {
            return Err(invalid("missing numeric value"));
        }
        let value: u64 = number
            .parse()
            .map_err(|_| invalid("value must be a whole number"))?;
        let multiplier = if suffix.is_empty() {
            1
        } else {
            SIZE_UNITS
                .iter()
                .find(|(unit, _)| *unit == suffix)
                .map(|&(_, m)| m)
                .ok_or_else(|| invalid("unknown unit"))?
        };
        value
            .checked_mul(multiplier)
            .map(Self)
            .ok_or_else(|| invalid("value overflows 64 bits"))
    }
}

impl TryFrom<String> for MemorySize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemorySize> for String {
    fn from(size: MemorySize) -> Self {
        size.to_string()
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DISPLAY: &[(&str, u64)] =
            &[("TB", 1 << 40), ("GB", 1 << 30), ("MB", 1 << 20), ("kB", 1 << 10)];
        if self.0 != 0 {
            for &(unit, m) in DISPLAY {
                if self.0 % m == 0 {
                    return write!(f, "{}{unit}", self.0 / m);
                }
            }
        }
        write!(f, "{}B", self.0)
    }
}

/// A clock frequency in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency(u64);

impl Frequency {
    /// Creates a frequency from a raw hertz value.
    pub const fn from_hz(hz: u64) -> Self {
        Self(hz)
    }

    /// Creates a frequency of `ghz` gigahertz.
    pub const fn from_ghz(ghz: u64) -> Self {
        Self(ghz * 1_000_000_000)
    }

    /// Returns the frequency in hertz.
    pub const fn hz(self) -> u64 {
        self.0
    }

    /// Returns the clock period in simulator ticks, rounded to the nearest tick.
    pub fn period_ticks(self) -> u64 {
        let hz = self.0.max(1);
        (TICKS_PER_SECOND + hz / 2) / hz
    }
}

impl FromStr for Frequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidQuantity {
            kind: "frequency",
            input: s.to_owned(),
            reason,
        };
        let (number, suffix) = split_number(s.trim());
        let value: f64 = number.parse().map_err(|_| invalid("missing numeric value"))?;
        let multiplier = FREQ_UNITS
            .iter()
            .find(|(unit, _)| *unit == suffix)
            .map(|&(_, m)| m)
            .ok_or_else(|| invalid("expected a Hz, kHz, MHz, GHz or THz suffix"))?;
        let hz = (value * multiplier as f64).round();
        if !hz.is_finite() || hz < 1.0 || hz > TICKS_PER_SECOND as f64 {
            return Err(invalid("frequency must be between 1Hz and 1THz"));
        }
        Ok(Self(hz as u64))
    }
}

impl TryFrom<String> for Frequency {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> Self {
        freq.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(unit, m) in FREQ_UNITS {
            if self.0 >= m && self.0 % m == 0 {
                return write!(f, "{}{unit}", self.0 / m);
            }
        }
        write!(f, "{}Hz", self.0)
    }
}

/// A supply voltage in volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Voltage(f64);

impl Voltage {
    /// Creates a voltage from a value in volts.
    pub const fn from_volts(volts: f64) -> Self {
        Self(volts)
    }

    /// Returns the voltage in volts.
    pub const fn volts(self) -> f64 {
        self.0
    }
}

impl FromStr for Voltage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidQuantity {
            kind: "voltage",
            input: s.to_owned(),
            reason,
        };
        let (number, suffix) = split_number(s.trim());
        let value: f64 = number.parse().map_err(|_| invalid("missing numeric value"))?;
        let volts = match suffix {
            "V" => value,
            "mV" => value / 1000.0,
            _ => return Err(invalid("expected a V or mV suffix")),
        };
        if volts <= 0.0 || !volts.is_finite() {
            return Err(invalid("voltage must be positive"));
        }
        Ok(Self(volts))
    }
}

impl TryFrom<String> for Voltage {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Voltage> for String {
    fn from(v: Voltage) -> Self {
        v.to_string()
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{}` on f64 never switches to exponent form, so the output parses back.
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}V", self.0)
        } else {
            write!(f, "{}V", self.0)
        }
    }
}
