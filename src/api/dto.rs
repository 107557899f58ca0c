use serde::{Serialize, Deserialize};
use crate::domain::graph::DependencyGraph;
use crate::domain::node::{BinaryMetadata, NodeId};

/// Nested JSON view of a node and everything below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<NodeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDto {
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_loader: Option<String>,
    pub shared_libraries: Vec<String>,
    pub abs_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl From<&BinaryMetadata> for MetadataDto {
    fn from(meta: &BinaryMetadata) -> Self {
        MetadataDto {
            architecture: meta.architecture.to_string(),
            dynamic_loader: meta
                .dynamic_loader
                .as_ref()
                .map(|p| p.display().to_string()),
            shared_libraries: meta.shared_libraries.clone(),
            abs_path: meta.abs_path.display().to_string(),
            package: meta.package.clone(),
        }
    }
}

impl NodeDto {
    /// Build the nested view rooted at `id`. Shared subtrees are repeated;
    /// a node already on the current branch is emitted without `deps`.
    pub fn from_graph(graph: &DependencyGraph, id: NodeId) -> Self {
        let mut branch = Vec::new();
        Self::build(graph, id, &mut branch)
    }

    fn build(graph: &DependencyGraph, id: NodeId, branch: &mut Vec<NodeId>) -> Self {
        let node = graph.node(id);
        let mut dto = NodeDto {
            path: node.path.display().to_string(),
            metadata: node.metadata.as_ref().map(MetadataDto::from),
            deps: Vec::new(),
        };
        if branch.contains(&id) {
            return dto;
        }
        branch.push(id);
        dto.deps = node
            .dependencies
            .iter()
            .map(|dep| Self::build(graph, *dep, branch))
            .collect();
        branch.pop();
        dto
    }
}

impl From<&DependencyGraph> for NodeDto {
    fn from(graph: &DependencyGraph) -> Self {
        NodeDto::from_graph(graph, graph.root())
    }
}
