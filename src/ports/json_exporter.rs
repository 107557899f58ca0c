//! JSON Exporter
//!
//! Serializes the graph as nested `{path, metadata, deps}` objects.

use crate::api::dto::NodeDto;
use crate::domain::graph::DependencyGraph;
use crate::ports::GraphExporter;

#[derive(Debug, Clone, Copy)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl GraphExporter for JsonExporter {
    fn render(&self, graph: &DependencyGraph) -> String {
        let dto = NodeDto::from(graph);
        let json = if self.pretty {
            serde_json::to_string_pretty(&dto)
        } else {
            serde_json::to_string(&dto)
        };
        // NodeDto holds only strings and vectors; serialization cannot fail.
        json.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Node, NodeId};
    use std::path::PathBuf;

    #[test]
    fn test_compact_output() {
        let graph = DependencyGraph::new(
            vec![Node::placeholder(PathBuf::from("/bin/true"))],
            NodeId(0),
        );
        let out = JsonExporter { pretty: false }.render(&graph);
        assert_eq!(out, r#"{"path":"/bin/true"}"#);
    }
}
