//! Memory hierarchy assembler CLI.
//!
//! This binary turns command-line flags into a fully wired hierarchy and hands it to the
//! simulation driver. It performs:
//! 1. **Configuration:** Loads an optional JSON base config and layers flag overrides on top.
//! 2. **Assembly:** Builds the hierarchy and binds the selected benchmark.
//! 3. **Driving:** Runs the driver and prints the `Exiting @ tick ...` line.
//!
//! Every configuration or wiring error is reported before the simulation starts and exits 1.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use memhier_core::cache::policies::PolicyFlags;
use memhier_core::cache::{CacheLevel, CacheLevelOverrides};
use memhier_core::common::{ConfigError, EngineError, MemorySize};
use memhier_core::config::HierarchyConfig;
use memhier_core::core::CpuKind;
use memhier_core::sim::workload::{self, BenchmarkFlags, WorkloadCatalog};
use memhier_core::sim::{DryRunEngine, Simulator};
use memhier_core::soc::memory::MemoryControllerKind;
use memhier_core::{HierarchyBuilder, HierarchyError};

#[derive(Parser, Debug)]
#[command(
    name = "memhier",
    author,
    version,
    about = "Assemble a cache hierarchy and run a benchmark on it",
    long_about = "Builds a single-CPU hierarchy (L1I/L1D, shared L2, optional L3, system crossbar, \
                  DDR3 controller), binds a benchmark, and runs it.\n\nExamples:\n  \
                  memhier --lru --bfs\n  \
                  memhier --l1d_size 64kB --l1d_assoc 8 --mcf\n  \
                  memhier --config base.json --l3 --dump-topology topo.json"
)]
struct Cli {
    /// JSON base configuration; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the benchmark catalog is resolved against.
    #[arg(long, value_name = "DIR")]
    bench_root: Option<PathBuf>,

    /// CPU model (DerivO3CPU, TimingSimpleCPU, MinorCPU, AtomicSimpleCPU or o3/timing/minor/atomic).
    #[arg(long, value_name = "KIND")]
    cpu: Option<CpuKind>,

    /// DRAM model behind the memory controller (DDR3_1600_8x8, DDR4_2400_8x8, SimpleMemory).
    #[arg(long, value_name = "MODEL")]
    mem_ctrl: Option<MemoryControllerKind>,

    /// Write the assembled topology as JSON.
    #[arg(long, value_name = "FILE")]
    dump_topology: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    policy: PolicyArgs,

    #[command(flatten)]
    bench: BenchArgs,

    #[command(flatten)]
    caches: CacheArgs,
}

/// Replacement policy flags; at most one may be given.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
struct PolicyArgs {
    /// FB replacement policy.
    #[arg(long)]
    fb: bool,
    /// Random replacement.
    #[arg(long)]
    random: bool,
    /// Least recently used.
    #[arg(long)]
    lru: bool,
    /// Most recently used.
    #[arg(long)]
    mru: bool,
    /// First in, first out.
    #[arg(long)]
    fifo: bool,
    /// Tree pseudo-LRU.
    #[arg(long)]
    tplru: bool,
    /// Weighted LRU.
    #[arg(long)]
    wlru: bool,
}

impl PolicyArgs {
    const fn flags(&self) -> PolicyFlags {
        PolicyFlags {
            fb: self.fb,
            random: self.random,
            lru: self.lru,
            mru: self.mru,
            fifo: self.fifo,
            tplru: self.tplru,
            wlru: self.wlru,
        }
    }
}

/// Benchmark flags; none runs `hello`.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
struct BenchArgs {
    /// PolyBench 2MM.
    #[arg(long)]
    twomm: bool,
    /// BFS on the NY road graph.
    #[arg(long)]
    bfs: bool,
    /// SPEC bzip2.
    #[arg(long)]
    bzip2: bool,
    /// SPEC mcf.
    #[arg(long)]
    mcf: bool,
}

impl BenchArgs {
    const fn flags(&self) -> BenchmarkFlags {
        BenchmarkFlags {
            twomm: self.twomm,
            bfs: self.bfs,
            bzip2: self.bzip2,
            mcf: self.mcf,
        }
    }

    const fn any(&self) -> bool {
        self.twomm || self.bfs || self.bzip2 || self.mcf
    }
}

/// Per-level size, associativity, response latency and hit latency.
#[derive(Args, Debug, Default)]
struct CacheArgs {
    /// L1I capacity (e.g. 32kB).
    #[arg(long = "l1i_size", value_name = "SIZE")]
    l1i_size: Option<MemorySize>,
    /// L1I associativity.
    #[arg(long = "l1i_assoc", value_name = "WAYS")]
    l1i_assoc: Option<u32>,
    /// L1I response latency in cycles.
    #[arg(long = "l1i_resl", value_name = "CYCLES")]
    l1i_resl: Option<u32>,
    /// L1I hit latency (tag and data) in cycles.
    #[arg(long = "l1i_hitl", value_name = "CYCLES")]
    l1i_hitl: Option<u32>,

    /// L1D capacity.
    #[arg(long = "l1d_size", value_name = "SIZE")]
    l1d_size: Option<MemorySize>,
    /// L1D associativity.
    #[arg(long = "l1d_assoc", value_name = "WAYS")]
    l1d_assoc: Option<u32>,
    /// L1D response latency in cycles.
    #[arg(long = "l1d_resl", value_name = "CYCLES")]
    l1d_resl: Option<u32>,
    /// L1D hit latency in cycles.
    #[arg(long = "l1d_hitl", value_name = "CYCLES")]
    l1d_hitl: Option<u32>,

    /// L2 capacity.
    #[arg(long = "l2_size", value_name = "SIZE")]
    l2_size: Option<MemorySize>,
    /// L2 associativity.
    #[arg(long = "l2_assoc", value_name = "WAYS")]
    l2_assoc: Option<u32>,
    /// L2 response latency in cycles.
    #[arg(long = "l2_resl", value_name = "CYCLES")]
    l2_resl: Option<u32>,
    /// L2 hit latency in cycles.
    #[arg(long = "l2_hitl", value_name = "CYCLES")]
    l2_hitl: Option<u32>,

    /// Insert a shared L3 between the L2 and the system crossbar.
    #[arg(long)]
    l3: bool,
    /// L3 capacity.
    #[arg(long = "l3_size", requires = "l3", value_name = "SIZE")]
    l3_size: Option<MemorySize>,
    /// L3 associativity.
    #[arg(long = "l3_assoc", requires = "l3", value_name = "WAYS")]
    l3_assoc: Option<u32>,
    /// L3 response latency in cycles.
    #[arg(long = "l3_resl", requires = "l3", value_name = "CYCLES")]
    l3_resl: Option<u32>,
    /// L3 hit latency in cycles.
    #[arg(long = "l3_hitl", requires = "l3", value_name = "CYCLES")]
    l3_hitl: Option<u32>,
}

const fn level(
    size: Option<MemorySize>,
    assoc: Option<u32>,
    response_latency: Option<u32>,
    hit_latency: Option<u32>,
) -> CacheLevelOverrides {
    CacheLevelOverrides {
        size,
        assoc,
        response_latency,
        hit_latency,
        tag_latency: None,
        data_latency: None,
        mshrs: None,
        tgts_per_mshr: None,
    }
}

impl CacheArgs {
    const fn overrides(&self) -> [(CacheLevel, CacheLevelOverrides); 4] {
        [
            (
                CacheLevel::L1Instruction,
                level(self.l1i_size, self.l1i_assoc, self.l1i_resl, self.l1i_hitl),
            ),
            (
                CacheLevel::L1Data,
                level(self.l1d_size, self.l1d_assoc, self.l1d_resl, self.l1d_hitl),
            ),
            (
                CacheLevel::L2,
                level(self.l2_size, self.l2_assoc, self.l2_resl, self.l2_hitl),
            ),
            (
                CacheLevel::L3,
                level(self.l3_size, self.l3_assoc, self.l3_resl, self.l3_hitl),
            ),
        ]
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to write topology to '{}'", path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize topology: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Cli {
    /// Base config from `--config` (or defaults) with every flag layered on top.
    fn to_config(&self) -> Result<HierarchyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => HierarchyConfig::from_json_file(path)?,
            None => HierarchyConfig::default(),
        };

        let policy_flags = self.policy.flags();
        if !policy_flags.selected().is_empty() {
            config.policy = policy_flags.resolve()?;
        }
        if self.bench.any() {
            config.workload.benchmark = self.bench.flags().select()?;
        }
        if let Some(root) = &self.bench_root {
            config.workload.bench_root.clone_from(root);
        }
        if let Some(kind) = self.cpu {
            config.cpu.kind = kind;
            config.system.mem_mode = kind.required_mem_mode();
        }
        if let Some(kind) = self.mem_ctrl {
            config.system.mem_ctrl = kind;
        }
        for (cache_level, flags) in self.caches.overrides() {
            let merged = config.cache.overrides(cache_level).merged_with(&flags);
            *config.cache.overrides_mut(cache_level) = merged;
        }
        config.cache.l3_enabled |= self.caches.l3;
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.to_config()?;
    debug!(?config, "effective configuration");

    let mut root = HierarchyBuilder::new(&config).build()?;
    let catalog = WorkloadCatalog::from_config(&config.workload);
    workload::bind(&mut root, catalog.spec(config.workload.benchmark))?;

    if let Some(path) = &cli.dump_topology {
        let json = root.to_json()?;
        fs::write(path, json).map_err(|source| CliError::Dump {
            path: path.clone(),
            source,
        })?;
    }

    let mut simulator = Simulator::new(root, DryRunEngine::new());
    let event = simulator.run()?;
    println!("{event}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
