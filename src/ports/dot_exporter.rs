//! Dependency Graph DOT Exporter
//!
//! Exports a DependencyGraph as Graphviz DOT. Vertices are keyed by path.

use crate::domain::graph::DependencyGraph;
use crate::domain::node::Node;
use crate::ports::GraphExporter;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, Copy)]
pub struct DotExporter;

/// Visual role of a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VertexKind {
    Root,
    Library,
    Uninspectable,
    Missing,
}

impl DotExporter {
    /// Convert a DependencyGraph to a DOT string.
    pub fn to_dot(graph: &DependencyGraph) -> String {
        let mut lines = Vec::new();

        lines.push("digraph Dependencies {".to_string());
        lines.push("    rankdir=LR;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=11, shape=box];".to_string());
        lines.push("".to_string());

        let order = graph.walk(graph.root());
        for id in &order {
            let node = graph.node(*id);
            let kind = Self::vertex_kind(graph, node);
            let (color, style) = Self::vertex_style(kind);
            lines.push(format!(
                "    \"{}\" [label=\"{}\", style=\"{}\", fillcolor=\"{}\"];",
                Self::escape(&node.path.display().to_string()),
                Self::escape(&Self::vertex_label(node)),
                style,
                color
            ));
        }

        lines.push("".to_string());

        let mut emitted = HashSet::new();
        for id in &order {
            let node = graph.node(*id);
            let from = Self::escape(&node.path.display().to_string());
            for dep in graph.dependencies(*id) {
                let to = Self::escape(&dep.path.display().to_string());
                if emitted.insert((from.clone(), to.clone())) {
                    lines.push(format!("    \"{}\" -> \"{}\";", from, to));
                }
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn vertex_kind(graph: &DependencyGraph, node: &Node) -> VertexKind {
        if !node.resolved {
            VertexKind::Missing
        } else if node.path == graph.root_node().path {
            VertexKind::Root
        } else if node.metadata.is_none() {
            VertexKind::Uninspectable
        } else {
            VertexKind::Library
        }
    }

    fn vertex_label(node: &Node) -> String {
        let name = node
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| node.path.display().to_string());
        match node.package() {
            Some(pkg) => format!("{}\n{}", name, pkg),
            None => name,
        }
    }

    fn vertex_style(kind: VertexKind) -> (&'static str, &'static str) {
        match kind {
            VertexKind::Root => ("#a6e3a1", "filled,rounded"),       // Green
            VertexKind::Library => ("#89b4fa", "filled"),            // Blue
            VertexKind::Uninspectable => ("#f9e2af", "filled"),      // Yellow
            VertexKind::Missing => ("#6c7086", "filled,dashed"),     // Gray
        }
    }

    fn escape(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl GraphExporter for DotExporter {
    fn render(&self, graph: &DependencyGraph) -> String {
        Self::to_dot(graph)
    }
}
