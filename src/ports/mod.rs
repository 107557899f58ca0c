use std::path::{Path, PathBuf};

use crate::common::{AttributionError, InspectError};
use crate::domain::graph::DependencyGraph;
use crate::domain::node::Architecture;

pub mod dot_exporter;
pub mod json_exporter;
pub mod tree_renderer;

/// Maps a soname to the file the dynamic linker would load.
/// Implementations must be thread-safe (Send + Sync).
pub trait LibraryResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// Resolve with a hint about the requesting binary's architecture.
    fn resolve_for(&self, name: &str, _arch: Architecture) -> Option<PathBuf> {
        self.resolve(name)
    }
}

/// What the builder needs to know about one executable image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryInfo {
    pub architecture: Architecture,
    pub interpreter: Option<PathBuf>,
    pub needed: Vec<String>,
}

pub trait BinaryInspector: Send + Sync {
    fn inspect(&self, path: &Path) -> Result<BinaryInfo, InspectError>;
}

/// Maps a file to the OS package that installed it.
pub trait PackageFinder: Send + Sync {
    fn name(&self) -> &'static str;
    fn find_package(&self, path: &Path) -> Result<String, AttributionError>;
}

pub trait GraphExporter {
    fn render(&self, graph: &DependencyGraph) -> String;

    fn export(&self, graph: &DependencyGraph, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.render(graph))
    }
}
