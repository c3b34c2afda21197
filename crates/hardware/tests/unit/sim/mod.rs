
/// Benchmark selection, catalog, and binding.
pub mod workload;
