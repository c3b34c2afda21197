//! Cache Replacement Policies.
//!
//! Catalog of the eviction strategies a cache level can be built with. The policies themselves are
//! opaque to the assembler: each variant names the class the simulation engine instantiates.
//!
//! # Policies
//!
//! - `Fb`: Frequency-based, blends recency and access count.
//! - `Random`: Random selection.
//! - `Lru`: Least Recently Used.
//! - `Mru`: Most Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `TreePlru`: Pseudo-LRU (tree-based).
//! - `WeightedLru`: LRU weighted by per-set access history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// A replacement policy variant.
///
/// Declaration order is the legacy selection priority: when reporting conflicting flags
/// they are listed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    /// Frequency-based replacement.
    #[serde(rename = "fb", alias = "FBRP")]
    Fb,
    /// Random replacement.
    #[serde(rename = "random", alias = "RandomRP")]
    Random,
    /// Least Recently Used replacement.
    #[serde(rename = "lru", alias = "LRURP")]
    Lru,
    /// Most Recently Used replacement.
    #[serde(rename = "mru", alias = "MRURP")]
    Mru,
    /// First In First Out replacement.
    #[serde(rename = "fifo", alias = "FIFORP")]
    Fifo,
    /// Tree-based pseudo-LRU replacement.
    #[serde(rename = "tplru", alias = "TreePLRURP")]
    TreePlru,
    /// Weighted LRU replacement.
    #[serde(rename = "wlru", alias = "WeightedLRURP")]
    WeightedLru,
}

impl ReplacementPolicy {
    /// Every variant, in selection priority order.
    pub const ALL: [Self; 7] = [
        Self::Fb,
        Self::Random,
        Self::Lru,
        Self::Mru,
        Self::Fifo,
        Self::TreePlru,
        Self::WeightedLru,
    ];

    /// Command-line flag (without dashes) that selects this policy.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Fb => "fb",
            Self::Random => "random",
            Self::Lru => "lru",
            Self::Mru => "mru",
            Self::Fifo => "fifo",
            Self::TreePlru => "tplru",
            Self::WeightedLru => "wlru",
        }
    }

    /// Class name the simulation engine instantiates for this policy.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Fb => "FBRP",
            Self::Random => "RandomRP",
            Self::Lru => "LRURP",
            Self::Mru => "MRURP",
            Self::Fifo => "FIFORP",
            Self::TreePlru => "TreePLRURP",
            Self::WeightedLru => "WeightedLRURP",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    /// Accepts either the flag name (`lru`) or the class name (`LRURP`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.flag().eq_ignore_ascii_case(s) || p.class_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                kind: "replacement policy",
                input: s.to_owned(),
            })
    }
}

/// Outcome of policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<ReplacementPolicy>", into = "Option<ReplacementPolicy>")]
pub enum PolicyChoice {
    /// Leave every cache level on its compiled-in default policy.
    #[default]
    CompiledDefault,
    /// Apply this policy to every cache level.
    Explicit(ReplacementPolicy),
}

impl PolicyChoice {
    /// The explicit policy, if any.
    pub const fn policy(self) -> Option<ReplacementPolicy> {
        match self {
            Self::CompiledDefault => None,
            Self::Explicit(p) => Some(p),
        }
    }
}

impl From<Option<ReplacementPolicy>> for PolicyChoice {
    fn from(value: Option<ReplacementPolicy>) -> Self {
        value.map_or(Self::CompiledDefault, Self::Explicit)
    }
}

impl From<PolicyChoice> for Option<ReplacementPolicy> {
    fn from(choice: PolicyChoice) -> Self {
        choice.policy()
    }
}

/// One boolean per policy flag, as parsed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PolicyFlags {
    /// `--fb`
    pub fb: bool,
    /// `--random`
    pub random: bool,
    /// `--lru`
    pub lru: bool,
    /// `--mru`
    pub mru: bool,
    /// `--fifo`
    pub fifo: bool,
    /// `--tplru`
    pub tplru: bool,
    /// `--wlru`
    pub wlru: bool,
}

impl PolicyFlags {
    /// Flags with only `policy` set.
    pub fn only(policy: ReplacementPolicy) -> Self {
        let mut flags = Self::default();
        *flags.slot(policy) = true;
        flags
    }

    const fn get(&self, policy: ReplacementPolicy) -> bool {
        match policy {
            ReplacementPolicy::Fb => self.fb,
            ReplacementPolicy::Random => self.random,
            ReplacementPolicy::Lru => self.lru,
            ReplacementPolicy::Mru => self.mru,
            ReplacementPolicy::Fifo => self.fifo,
            ReplacementPolicy::TreePlru => self.tplru,
            ReplacementPolicy::WeightedLru => self.wlru,
        }
    }

    fn slot(&mut self, policy: ReplacementPolicy) -> &mut bool {
        match policy {
            ReplacementPolicy::Fb => &mut self.fb,
            ReplacementPolicy::Random => &mut self.random,
            ReplacementPolicy::Lru => &mut self.lru,
            ReplacementPolicy::Mru => &mut self.mru,
            ReplacementPolicy::Fifo => &mut self.fifo,
            ReplacementPolicy::TreePlru => &mut self.tplru,
            ReplacementPolicy::WeightedLru => &mut self.wlru,
        }
    }

    /// Policies whose flag is set, in priority order.
    pub fn selected(&self) -> Vec<ReplacementPolicy> {
        ReplacementPolicy::ALL
            .into_iter()
            .filter(|&p| self.get(p))
            .collect()
    }

    /// Resolves the flags to a single choice.
    ///
    /// No flag yields `CompiledDefault`. More than one flag is a configuration error listing
    /// every selected flag.
    pub fn resolve(&self) -> Result<PolicyChoice, ConfigError> {
        match self.selected().as_slice() {
            [] => Ok(PolicyChoice::CompiledDefault),
            [one] => Ok(PolicyChoice::Explicit(*one)),
            many => Err(ConfigError::ConflictingPolicies(
                many.iter().map(|p| p.flag()).collect(),
            )),
        }
    }
}
