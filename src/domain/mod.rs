// Domain model for ldgraph: nodes, the dependency graph, and host classification.

pub mod graph;
pub mod node;
pub mod os_family;
