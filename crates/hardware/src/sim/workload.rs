//! Workload selection and binding.
//!
//! This module decides which program the CPU runs. It provides:
//! 1. **Selection:** Mutually exclusive benchmark flags resolve to one `Benchmark`, `hello` by default.
//! 2. **Catalog:** A lookup table from benchmark to executable and arguments, rooted at a
//!    configurable directory and individually replaceable.
//! 3. **Binding:** Attaches the chosen `WorkloadSpec` to the CPU and creates its thread contexts.
//!
//! Executables are never checked here; a missing binary surfaces when the engine loads it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::ConfigError;
use crate::config::WorkloadConfig;
use crate::soc::Root;

/// A named workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Benchmark {
    /// PolyBench 2MM (two matrix multiplications).
    TwoMm,
    /// Breadth-first search over a road graph.
    Bfs,
    /// SPEC bzip2 compression.
    Bzip2,
    /// SPEC mcf network simplex.
    Mcf,
    /// Hello-world smoke test; used when no benchmark flag is given.
    #[default]
    Hello,
}

impl Benchmark {
    /// Every benchmark, flag-selectable ones first.
    pub const ALL: [Self; 5] = [Self::TwoMm, Self::Bfs, Self::Bzip2, Self::Mcf, Self::Hello];

    /// Command-line flag / config name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::TwoMm => "twomm",
            Self::Bfs => "bfs",
            Self::Bzip2 => "bzip2",
            Self::Mcf => "mcf",
            Self::Hello => "hello",
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownVariant {
                kind: "benchmark",
                input: s.to_owned(),
            })
    }
}

/// One boolean per benchmark flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct BenchmarkFlags {
    /// `--twomm`
    pub twomm: bool,
    /// `--bfs`
    pub bfs: bool,
    /// `--bzip2`
    pub bzip2: bool,
    /// `--mcf`
    pub mcf: bool,
}

impl BenchmarkFlags {
    /// Benchmarks whose flag is set.
    pub fn selected(&self) -> Vec<Benchmark> {
        [
            (self.twomm, Benchmark::TwoMm),
            (self.bfs, Benchmark::Bfs),
            (self.bzip2, Benchmark::Bzip2),
            (self.mcf, Benchmark::Mcf),
        ]
        .into_iter()
        .filter_map(|(set, bench)| set.then_some(bench))
        .collect()
    }

    /// Resolves the flags; none selects `Hello`, more than one is an error.
    pub fn select(&self) -> Result<Benchmark, ConfigError> {
        match self.selected().as_slice() {
            [] => Ok(Benchmark::Hello),
            [one] => Ok(*one),
            many => Err(ConfigError::ConflictingBenchmarks(
                many.iter().map(|b| b.name()).collect(),
            )),
        }
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSpec {
    /// Path of the executable.
    pub executable: PathBuf,
    /// Arguments, not including the executable.
    #[serde(default)]
    pub args: Vec<String>,
}

impl WorkloadSpec {
    /// A workload with no arguments.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Full argv, executable first.
    pub fn cmd(&self) -> Vec<String> {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Lookup table from benchmark to workload.
///
/// Every benchmark has a built-in entry resolved against `root`; `overrides` replace them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadCatalog {
    root: PathBuf,
    overrides: BTreeMap<Benchmark, WorkloadSpec>,
}

impl WorkloadCatalog {
    /// Built-in entries, with every path resolved against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Built-in entries rooted at `config.bench_root`, with `config.entries` replacing them.
    pub fn from_config(config: &WorkloadConfig) -> Self {
        config
            .entries
            .iter()
            .fold(Self::with_root(&config.bench_root), |catalog, (bench, spec)| {
                catalog.with_entry(*bench, spec.clone())
            })
    }

    /// Replaces the entry for `bench`.
    #[must_use]
    pub fn with_entry(mut self, bench: Benchmark, spec: WorkloadSpec) -> Self {
        let _ = self.overrides.insert(bench, spec);
        self
    }

    /// Directory the built-in entries are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The workload for `bench`.
    pub fn spec(&self, bench: Benchmark) -> WorkloadSpec {
        self.overrides
            .get(&bench)
            .cloned()
            .unwrap_or_else(|| self.builtin(bench))
    }

    fn builtin(&self, bench: Benchmark) -> WorkloadSpec {
        let path = |rel: &str| self.root.join(rel);
        let arg = |rel: &str| path(rel).display().to_string();
        match bench {
            Benchmark::TwoMm => WorkloadSpec::new(path("2MM/2mm_base")),
            Benchmark::Bfs => WorkloadSpec::new(path("BFS/bfs"))
                .arg("-f")
                .arg(arg("BFS/USA-road-d.NY.gr")),
            Benchmark::Bzip2 => WorkloadSpec::new(path("bzip2/bzip2_base.amd64-m64-gcc42-nn"))
                .arg(arg("bzip2/input.source"))
                .arg("280"),
            Benchmark::Mcf => {
                WorkloadSpec::new(path("mcf/mcf_base.amd64-m64-gcc42-nn")).arg(arg("mcf/inp.in"))
            }
            Benchmark::Hello => WorkloadSpec::new(path("hello/bin/arm/linux/hello")),
        }
    }
}

/// Attaches `workload` to the CPU of `root` and creates its threads.
pub fn bind(root: &mut Root, workload: WorkloadSpec) -> Result<(), ConfigError> {
    let cpu = &mut root.system.cpu;
    info!(cpu = %cpu.path, cmd = ?workload.cmd(), "binding workload");
    cpu.set_workload(workload)?;
    cpu.create_threads();
    Ok(())
}
