//! Tree Renderer
//!
//! Depth-first text rendering of a DependencyGraph with box-drawing connectors.
//! A path is expanded the first time it is printed; later encounters collapse
//! to an `(already visited)` marker.

use crate::domain::graph::DependencyGraph;
use crate::domain::node::{Node, NodeId};
use crate::ports::GraphExporter;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct TreeRenderer {
    /// Append `[package]` to attributed nodes.
    pub show_packages: bool,
}

impl TreeRenderer {
    pub fn new(show_packages: bool) -> Self {
        Self { show_packages }
    }

    /// Render the whole graph, one line per printed node.
    pub fn to_tree(&self, graph: &DependencyGraph) -> String {
        let mut lines = Vec::new();
        let mut printed = HashSet::new();
        self.visit(graph, graph.root(), "", "", &mut printed, &mut lines);
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn visit<'g>(
        &self,
        graph: &'g DependencyGraph,
        id: NodeId,
        line_prefix: &str,
        child_prefix: &str,
        printed: &mut HashSet<&'g Path>,
        lines: &mut Vec<String>,
    ) {
        let node = graph.node(id);
        if !printed.insert(node.path.as_path()) {
            let marker = if node.resolved { "" } else { " (not found)" };
            lines.push(format!(
                "{}{}{} (already visited)",
                line_prefix,
                node.path.display(),
                marker
            ));
            return;
        }
        lines.push(format!("{}{}", line_prefix, self.label(node)));

        let count = node.dependencies.len();
        for (i, dep) in node.dependencies.iter().enumerate() {
            let (connector, continuation) = if i + 1 == count {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            self.visit(
                graph,
                *dep,
                &format!("{}{}", child_prefix, connector),
                &format!("{}{}", child_prefix, continuation),
                printed,
                lines,
            );
        }
    }

    fn label(&self, node: &Node) -> String {
        let mut label = node.path.display().to_string();
        if !node.resolved {
            label.push_str(" (not found)");
        } else if node.metadata.is_none() {
            label.push_str(" (not inspectable)");
        }
        if self.show_packages {
            if let Some(pkg) = node.package() {
                label.push_str(&format!(" [{}]", pkg));
            }
        }
        label
    }
}

impl GraphExporter for TreeRenderer {
    fn render(&self, graph: &DependencyGraph) -> String {
        self.to_tree(graph)
    }
}
