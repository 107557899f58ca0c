//! Package Attribution
//!
//! Enrichment pass that records the owning OS package of every inspected
//! file in a built graph. Lookups run on a bounded pool; results are written
//! back once all of them have finished, so each node is written at most once
//! per run. Running the pass again simply refreshes the package fields.

use log::{debug, warn};
use rayon::prelude::*;
use std::path::PathBuf;

use crate::domain::graph::DependencyGraph;
use crate::domain::node::NodeId;
use crate::ports::PackageFinder;

/// Counts from one attribution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributionSummary {
    pub attributed: usize,
    pub missing: usize,
    /// Nodes without metadata (unresolved or uninspectable).
    pub skipped: usize,
}

pub struct PackageAttributor<'a> {
    finder: &'a dyn PackageFinder,
    pool: Option<&'a rayon::ThreadPool>,
}

impl<'a> PackageAttributor<'a> {
    pub fn new(finder: &'a dyn PackageFinder) -> Self {
        Self { finder, pool: None }
    }

    /// Run lookups on `pool` instead of one at a time.
    pub fn with_pool(mut self, pool: &'a rayon::ThreadPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn annotate(&self, graph: &mut DependencyGraph) -> AttributionSummary {
        let mut summary = AttributionSummary::default();

        // Fresh visited set per run, independent of the build memo.
        let mut targets: Vec<(NodeId, PathBuf)> = Vec::new();
        for id in graph.walk(graph.root()) {
            let node = graph.node(id);
            if node.metadata.is_some() {
                targets.push((id, node.path.clone()));
            } else {
                summary.skipped += 1;
            }
        }

        let lookup = |(id, path): &(NodeId, PathBuf)| {
            let result = self.finder.find_package(path);
            (*id, path.clone(), result)
        };
        let results: Vec<_> = match self.pool {
            Some(pool) => pool.install(|| targets.par_iter().map(lookup).collect()),
            None => targets.iter().map(lookup).collect(),
        };

        for (id, path, result) in results {
            let package = match result {
                Ok(raw) => package_token(&raw),
                Err(e) => {
                    warn!("[package] {}", e);
                    None
                }
            };
            if package.is_some() {
                debug!("[package] {} -> {:?}", path.display(), package);
                summary.attributed += 1;
            } else {
                summary.missing += 1;
            }
            if let Some(meta) = graph.node_mut(id).metadata.as_mut() {
                meta.package = package;
            }
        }

        summary
    }
}

/// First whitespace-delimited token, with one trailing `:` removed.
///
/// `libc6:amd64: /lib/x86_64-linux-gnu/libc.so.6` yields `libc6:amd64`.
pub fn package_token(raw: &str) -> Option<String> {
    let token = raw.split_whitespace().next()?;
    let token = token.strip_suffix(':').unwrap_or(token);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_token() {
        assert_eq!(
            package_token("libc6:amd64: /lib/x86_64-linux-gnu/libc.so.6"),
            Some("libc6:amd64".to_string())
        );
        assert_eq!(
            package_token("glibc-2.39-6.fc40.x86_64"),
            Some("glibc-2.39-6.fc40.x86_64".to_string())
        );
        assert_eq!(package_token("zlib1g: /usr/lib/libz.so.1"), Some("zlib1g".to_string()));
        assert_eq!(package_token("   "), None);
        assert_eq!(package_token(":"), None);
    }
}
