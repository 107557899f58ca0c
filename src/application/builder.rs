//! Dependency Graph Builder
//!
//! Expands a root binary into its runtime dependency closure. Every canonical
//! path gets exactly one node; the memo table is consulted (and claimed)
//! atomically before any inspection or recursion happens, which also breaks
//! dependency cycles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use rayon::prelude::*;

use crate::common::GraphError;
use crate::domain::graph::DependencyGraph;
use crate::domain::node::{Architecture, BinaryMetadata, Node, NodeId};
use crate::ports::{BinaryInspector, LibraryResolver};

// ═══════════════════════════════════════════════════════════════════════════
// Memo table
// ═══════════════════════════════════════════════════════════════════════════

/// Outcome of trying to claim a canonical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The path was new; the caller owns expanding it.
    New(NodeId),
    /// Another visit already claimed the path.
    Existing(NodeId),
}

/// Thread-safe node storage plus the canonical-path index.
#[derive(Debug, Default)]
pub struct BuildMemo {
    index: DashMap<PathBuf, NodeId>,
    slots: DashMap<NodeId, Node>,
    next_id: AtomicUsize,
}

impl BuildMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node already registered for a canonical path.
    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        self.index.get(path).map(|r| *r)
    }

    /// Atomically return the existing node for `path` or register a placeholder.
    pub fn claim(&self, path: PathBuf) -> Claim {
        match self.index.entry(path) {
            Entry::Occupied(entry) => Claim::Existing(*entry.get()),
            Entry::Vacant(entry) => {
                let id = self.push(Node::placeholder(entry.key().clone()));
                entry.insert(id);
                Claim::New(id)
            }
        }
    }

    /// Store a node that is never indexed (unresolved leaves).
    pub fn push(&self, node: Node) -> NodeId {
        let id = NodeId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.slots.insert(id, node);
        id
    }

    fn set_metadata(&self, id: NodeId, metadata: BinaryMetadata) {
        if let Some(mut node) = self.slots.get_mut(&id) {
            node.metadata = Some(metadata);
        }
    }

    fn set_dependencies(&self, id: NodeId, dependencies: Vec<NodeId>) {
        if let Some(mut node) = self.slots.get_mut(&id) {
            node.dependencies = dependencies;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Freeze the memo into an arena rooted at `root`.
    pub fn into_graph(self, root: NodeId) -> DependencyGraph {
        let mut slots: Vec<(NodeId, Node)> = self.slots.into_iter().collect();
        slots.sort_by_key(|(id, _)| *id);
        let nodes = slots.into_iter().map(|(_, node)| node).collect();
        DependencyGraph::new(nodes, root)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════

pub struct GraphBuilder<'a> {
    resolver: &'a dyn LibraryResolver,
    inspector: &'a dyn BinaryInspector,
    parallel: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: &'a dyn LibraryResolver, inspector: &'a dyn BinaryInspector) -> Self {
        Self {
            resolver,
            inspector,
            parallel: true,
        }
    }

    /// Expand sibling dependencies on the rayon pool (default) or one by one.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build a fresh graph rooted at `root`.
    pub fn build(&self, root: &Path) -> Result<DependencyGraph, GraphError> {
        let memo = BuildMemo::new();
        let id = self.build_into(root, &memo)?;
        Ok(memo.into_graph(id))
    }

    /// Expand `root` into an existing memo, reusing nodes it already holds.
    pub fn build_into(&self, root: &Path, memo: &BuildMemo) -> Result<NodeId, GraphError> {
        let canonical = Self::canonical_root(root)?;
        debug!("[build] root {}", canonical.display());
        Ok(self.visit(canonical, memo))
    }

    /// The root must be an existing, readable regular file; anything else is fatal.
    fn canonical_root(root: &Path) -> Result<PathBuf, GraphError> {
        let canonical = fs::canonicalize(root).map_err(|source| GraphError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;
        let meta = fs::metadata(&canonical).map_err(|source| GraphError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(GraphError::NotAFile {
                path: root.to_path_buf(),
            });
        }
        fs::File::open(&canonical).map_err(|source| GraphError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(canonical)
    }

    /// Resolve symlinks, then make absolute. Paths that do not exist keep
    /// their lexical absolute form so they still get a stable identity.
    pub fn canonicalize(path: &Path) -> PathBuf {
        fs::canonicalize(path)
            .or_else(|_| std::path::absolute(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }

    fn visit(&self, canonical: PathBuf, memo: &BuildMemo) -> NodeId {
        let id = match memo.claim(canonical.clone()) {
            Claim::Existing(id) => return id,
            Claim::New(id) => id,
        };

        let info = match self.inspector.inspect(&canonical) {
            Ok(info) => info,
            Err(e) => {
                warn!("[build] cannot inspect {}: {}", canonical.display(), e);
                return id;
            }
        };

        let architecture = info.architecture;
        let needed = info.needed.clone();
        memo.set_metadata(
            id,
            BinaryMetadata {
                architecture: info.architecture,
                dynamic_loader: info.interpreter,
                shared_libraries: info.needed,
                abs_path: canonical,
                package: None,
            },
        );

        let dependencies: Vec<NodeId> = if self.parallel {
            needed
                .par_iter()
                .map(|name| self.visit_library(name, architecture, memo))
                .collect()
        } else {
            needed
                .iter()
                .map(|name| self.visit_library(name, architecture, memo))
                .collect()
        };
        memo.set_dependencies(id, dependencies);
        id
    }

    fn visit_library(&self, name: &str, arch: Architecture, memo: &BuildMemo) -> NodeId {
        match self.resolver.resolve_for(name, arch) {
            Some(resolved) => self.visit(Self::canonicalize(&resolved), memo),
            None => {
                debug!("[build] could not resolve {}", name);
                // Each unresolved mention gets its own leaf.
                memo.push(Node::unresolved(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_single_instance() {
        let memo = BuildMemo::new();
        let first = memo.claim(PathBuf::from("/lib/libc.so.6"));
        let second = memo.claim(PathBuf::from("/lib/libc.so.6"));
        let Claim::New(id) = first else {
            panic!("first claim should be new");
        };
        assert_eq!(second, Claim::Existing(id));
        assert_eq!(memo.lookup(Path::new("/lib/libc.so.6")), Some(id));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_unresolved_leaves_are_not_indexed() {
        let memo = BuildMemo::new();
        let a = memo.push(Node::unresolved("libgone.so"));
        let b = memo.push(Node::unresolved("libgone.so"));
        assert_ne!(a, b);
        assert_eq!(memo.lookup(Path::new("libgone.so")), None);
    }

    #[test]
    fn test_into_graph_orders_by_id() {
        let memo = BuildMemo::new();
        let root = memo.claim(PathBuf::from("/bin/app"));
        memo.push(Node::unresolved("libx.so"));
        let Claim::New(root) = root else { unreachable!() };
        let graph = memo.into_graph(root);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(NodeId(1)).path, PathBuf::from("libx.so"));
    }

    #[test]
    fn test_canonicalize_missing_path_is_absolute() {
        let path = GraphBuilder::canonicalize(Path::new("/nonexistent/ldgraph/libz.so.1"));
        assert_eq!(path, PathBuf::from("/nonexistent/ldgraph/libz.so.1"));
    }
}
