//! # Workload Tests
//!
//! Benchmark flag selection, the catalog table, config overrides, and binding to the CPU.

use std::path::{Path, PathBuf};

use memhier_core::common::ConfigError;
use memhier_core::config::WorkloadConfig;
use memhier_core::sim::workload::{self, Benchmark, BenchmarkFlags, WorkloadCatalog, WorkloadSpec};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestContext;

#[test]
fn test_no_flag_selects_hello() {
    assert_eq!(BenchmarkFlags::default().select().unwrap(), Benchmark::Hello);
}

#[rstest]
#[case(BenchmarkFlags { twomm: true, ..BenchmarkFlags::default() }, Benchmark::TwoMm)]
#[case(BenchmarkFlags { bfs: true, ..BenchmarkFlags::default() }, Benchmark::Bfs)]
#[case(BenchmarkFlags { bzip2: true, ..BenchmarkFlags::default() }, Benchmark::Bzip2)]
#[case(BenchmarkFlags { mcf: true, ..BenchmarkFlags::default() }, Benchmark::Mcf)]
fn test_single_flag(#[case] flags: BenchmarkFlags, #[case] expected: Benchmark) {
    assert_eq!(flags.select().unwrap(), expected);
}

#[test]
fn test_conflicting_benchmarks() {
    let flags = BenchmarkFlags {
        bfs: true,
        mcf: true,
        ..BenchmarkFlags::default()
    };
    match flags.select() {
        Err(ConfigError::ConflictingBenchmarks(names)) => assert_eq!(names, vec!["bfs", "mcf"]),
        other => panic!("expected ConflictingBenchmarks, got {other:?}"),
    }
}

#[test]
fn test_benchmark_names() {
    for bench in Benchmark::ALL {
        assert_eq!(bench.name().parse::<Benchmark>().unwrap(), bench);
    }
    assert_eq!(serde_json::to_string(&Benchmark::TwoMm).unwrap(), "\"twomm\"");
    assert!("gcc".parse::<Benchmark>().is_err());
}

#[test]
fn test_bfs_entry() {
    let catalog = WorkloadCatalog::with_root("test_bench");
    let bfs = catalog.spec(Benchmark::Bfs);
    assert_eq!(bfs.executable, PathBuf::from("test_bench/BFS/bfs"));
    assert_eq!(
        bfs.args,
        vec!["-f".to_owned(), Path::new("test_bench/BFS/USA-road-d.NY.gr").display().to_string()]
    );
}

#[rstest]
#[case(Benchmark::TwoMm, "2MM/2mm_base", 0)]
#[case(Benchmark::Bzip2, "bzip2/bzip2_base.amd64-m64-gcc42-nn", 2)]
#[case(Benchmark::Mcf, "mcf/mcf_base.amd64-m64-gcc42-nn", 1)]
#[case(Benchmark::Hello, "hello/bin/arm/linux/hello", 0)]
fn test_catalog_entries(#[case] bench: Benchmark, #[case] rel: &str, #[case] nargs: usize) {
    let catalog = WorkloadCatalog::with_root("/srv/bench");
    let spec = catalog.spec(bench);
    assert_eq!(spec.executable, Path::new("/srv/bench").join(rel));
    assert_eq!(spec.args.len(), nargs);
}

#[test]
fn test_bzip2_arguments() {
    let spec = WorkloadCatalog::with_root("b").spec(Benchmark::Bzip2);
    assert_eq!(spec.args[1], "280");
}

#[test]
fn test_catalog_from_config() {
    let mut config = WorkloadConfig::default();
    config.bench_root = PathBuf::from("/data");
    let _ = config
        .entries
        .insert(Benchmark::Mcf, WorkloadSpec::new("/opt/mcf").arg("big.in"));

    let catalog = WorkloadCatalog::from_config(&config);
    assert_eq!(catalog.root(), Path::new("/data"));
    assert_eq!(catalog.spec(Benchmark::Mcf).cmd(), vec!["/opt/mcf".to_owned(), "big.in".to_owned()]);
    assert_eq!(catalog.spec(Benchmark::TwoMm).executable, PathBuf::from("/data/2MM/2mm_base"));
}

#[test]
fn test_every_benchmark_resolves_under_root() {
    let catalog = WorkloadCatalog::with_root("/srv/bench")
        .with_entry(Benchmark::Hello, WorkloadSpec::new("/bin/true"));
    for bench in Benchmark::ALL {
        let spec = catalog.spec(bench);
        if bench == Benchmark::Hello {
            assert_eq!(spec.executable, PathBuf::from("/bin/true"));
        } else {
            assert!(spec.executable.starts_with("/srv/bench"), "{bench}: {:?}", spec.executable);
        }
    }
}

#[test]
fn test_bind_creates_thread() {
    let mut root = TestContext::new().build();
    let spec = WorkloadCatalog::with_root("test_bench").spec(Benchmark::Bfs);
    workload::bind(&mut root, spec.clone()).unwrap();

    let cpu = &root.system.cpu;
    assert_eq!(cpu.workload.as_ref(), Some(&spec));
    assert_eq!(cpu.threads.len(), 1);
    assert_eq!(cpu.threads[0].argv, spec.cmd());
    assert_eq!(cpu.threads[0].argv.len(), 3);
}

#[test]
fn test_bind_twice_fails() {
    let mut root = TestContext::new().build();
    workload::bind(&mut root, WorkloadSpec::new("a")).unwrap();
    assert!(matches!(
        workload::bind(&mut root, WorkloadSpec::new("b")),
        Err(ConfigError::WorkloadAlreadyBound(_))
    ));
    assert_eq!(root.system.cpu.threads.len(), 1);
}

#[test]
fn test_bind_does_not_check_existence() {
    let mut root = TestContext::new().build();
    assert!(workload::bind(&mut root, WorkloadSpec::new("/no/such/binary")).is_ok());
}
