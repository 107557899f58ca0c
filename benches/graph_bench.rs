/// Benchmarks for the ldgraph build and query pipeline.
///
/// Run with: `cargo bench`
///
/// - Graph build at various library counts, parallel vs sequential expansion
/// - ld cache lookups against a large synthetic table
/// - Query/traversal over a built graph

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ldgraph::application::builder::GraphBuilder;
use ldgraph::common::InspectError;
use ldgraph::domain::node::Architecture;
use ldgraph::infrastructure::LdCache;
use ldgraph::ports::{BinaryInfo, BinaryInspector, LibraryResolver};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory images: the root needs every library, library i needs i/2 .. i-1.
struct SyntheticImages {
    root: PathBuf,
    images: HashMap<PathBuf, BinaryInfo>,
}

impl BinaryInspector for SyntheticImages {
    fn inspect(&self, path: &Path) -> Result<BinaryInfo, InspectError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| InspectError::FileTooSmall {
                path: path.to_path_buf(),
            })
    }
}

fn soname(i: usize) -> String {
    format!("libsynthetic{}.so.1", i)
}

fn lib_path(i: usize) -> PathBuf {
    PathBuf::from(format!("/synthetic/lib/{}", soname(i)))
}

fn synthetic_cache(num_libs: usize) -> LdCache {
    LdCache::from_lines((0..num_libs).map(|i| {
        format!("\t{} (libc6,x86-64) => {}", soname(i), lib_path(i).display())
    }))
}

fn synthetic_images(root: &Path, num_libs: usize) -> SyntheticImages {
    let mut images = HashMap::new();
    let image = |needed: Vec<String>| BinaryInfo {
        architecture: Architecture::X86_64,
        interpreter: Some(PathBuf::from("/lib64/ld-linux-x86-64.so.2")),
        needed,
    };
    images.insert(root.to_path_buf(), image((0..num_libs).map(soname).collect()));
    for i in 0..num_libs {
        images.insert(lib_path(i), image((i / 2..i).map(soname).collect()));
    }
    SyntheticImages {
        root: root.to_path_buf(),
        images,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Build Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/build");
    let root_file = NamedTempFile::new().unwrap();
    let root = std::fs::canonicalize(root_file.path()).unwrap();

    for num_libs in [10, 50, 200].iter() {
        let cache = synthetic_cache(*num_libs);
        let images = synthetic_images(&root, *num_libs);
        group.throughput(Throughput::Elements(*num_libs as u64));

        group.bench_with_input(BenchmarkId::new("parallel", num_libs), &images, |b, images| {
            b.iter(|| {
                GraphBuilder::new(&cache, images)
                    .build(black_box(&images.root))
                    .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("sequential", num_libs), &images, |b, images| {
            b.iter(|| {
                GraphBuilder::new(&cache, images)
                    .parallel(false)
                    .build(black_box(&images.root))
                    .unwrap()
            })
        });
    }

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Resolver Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_ld_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ld_cache/resolve");
    let cache = synthetic_cache(2000);
    let aware = synthetic_cache(2000).with_arch_aware(true);
    let last = soname(1999);

    group.bench_function("first_match", |b| {
        b.iter(|| cache.resolve(black_box(&last)))
    });
    group.bench_function("arch_aware", |b| {
        b.iter(|| aware.resolve_for(black_box(&last), Architecture::X86_64))
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Query Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/queries");
    let root_file = NamedTempFile::new().unwrap();
    let root = std::fs::canonicalize(root_file.path()).unwrap();
    let cache = synthetic_cache(200);
    let images = synthetic_images(&root, 200);
    let graph = GraphBuilder::new(&cache, &images).build(&root).unwrap();

    group.bench_function("unique_dependencies", |b| {
        b.iter(|| black_box(&graph).unique_dependencies().len())
    });
    group.bench_function("dynamic_loaders", |b| {
        b.iter(|| black_box(&graph).dynamic_loaders().len())
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_ld_cache, bench_queries);
criterion_main!(benches);
