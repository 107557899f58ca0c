use std::path::Path;
use anyhow::{Context, Result};
use log::info;

use crate::domain::graph::DependencyGraph;
use crate::ports::{BinaryInspector, GraphExporter, LibraryResolver, PackageFinder};

pub mod attribution;
pub mod builder;

use attribution::{AttributionSummary, PackageAttributor};
use builder::GraphBuilder;

/// Build a graph for one binary, optionally attribute packages, and hand it to an exporter.
pub struct AnalyzeUsecase<'a> {
    pub resolver: &'a dyn LibraryResolver,
    pub inspector: &'a dyn BinaryInspector,
    pub finder: Option<&'a dyn PackageFinder>,
    pub lookup_pool: Option<&'a rayon::ThreadPool>,
    pub parallel: bool,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn analyze(&self, binary: &Path) -> Result<(DependencyGraph, Option<AttributionSummary>)> {
        let mut graph = GraphBuilder::new(self.resolver, self.inspector)
            .parallel(self.parallel)
            .build(binary)
            .with_context(|| format!("Cannot analyze {}", binary.display()))?;

        info!(
            "[ldgraph] {}: {} nodes, {} unresolved",
            graph.root_node().path.display(),
            graph.all_nodes().len(),
            graph.unresolved_count()
        );

        let summary = self.finder.map(|finder| {
            let mut attributor = PackageAttributor::new(finder);
            if let Some(pool) = self.lookup_pool {
                attributor = attributor.with_pool(pool);
            }
            let summary = attributor.annotate(&mut graph);
            info!(
                "[ldgraph] packages: {} attributed, {} missing, {} skipped",
                summary.attributed, summary.missing, summary.skipped
            );
            summary
        });

        Ok((graph, summary))
    }

    pub fn run(&self, binary: &Path, exporter: &dyn GraphExporter, export_path: &str) -> Result<()> {
        let (graph, _) = self.analyze(binary)?;
        exporter
            .export(&graph, export_path)
            .with_context(|| format!("Failed to write {}", export_path))
    }
}
