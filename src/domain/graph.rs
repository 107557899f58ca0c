//! Dependency Graph
//!
//! Arena of nodes produced by one build, rooted at the inspected binary,
//! plus the query operations over it.

use crate::domain::node::{Node, NodeId};
use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;

/// A built dependency graph. Nodes are owned by the arena; edges are `NodeId`s.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DependencyGraph {
    /// `nodes[i]` must be the node with `NodeId(i)`.
    pub fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Every node in the arena, reachable or not.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependencies of `id`, in declaration order.
    pub fn dependencies(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.node(id).dependencies.iter().map(move |dep| self.node(*dep))
    }

    /// Look up the resolved node for a canonical path.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.resolved && n.path == path)
            .map(NodeId)
    }

    /// Depth-first, pre-order walk from `start`, visiting each path once.
    pub fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !seen.insert(node.path.as_path()) {
                continue;
            }
            order.push(id);
            // Reverse so the first declared dependency is visited first.
            stack.extend(node.dependencies.iter().rev().copied());
        }
        order
    }

    /// Walk the graph and collect distinct keys. Nodes whose key is `None` are skipped.
    pub fn collect_unique<'a, K, F>(&'a self, key: F) -> Vec<K>
    where
        K: Eq + Hash + Clone,
        F: Fn(&'a Node) -> Option<K>,
    {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for id in self.walk(self.root) {
            if let Some(k) = key(self.node(id)) {
                if seen.insert(k.clone()) {
                    keys.push(k);
                }
            }
        }
        keys
    }

    /// Every reachable node once, root first.
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.walk(self.root).into_iter().map(|id| self.node(id)).collect()
    }

    /// Paths of everything the root needs, excluding the root itself.
    /// Unresolved libraries appear under their raw name.
    pub fn unique_dependencies(&self) -> Vec<&Path> {
        let root_path = self.root_node().path.as_path();
        self.collect_unique(|n| Some(n.path.as_path()))
            .into_iter()
            .filter(|p| *p != root_path)
            .collect()
    }

    /// Distinct interpreters named anywhere in the graph.
    pub fn dynamic_loaders(&self) -> Vec<&Path> {
        self.collect_unique(|n| n.dynamic_loader())
    }

    /// Number of reachable nodes that never resolved to a file.
    pub fn unresolved_count(&self) -> usize {
        self.all_nodes().iter().filter(|n| !n.resolved).count()
    }
}
