// Dependency graph nodes for ldgraph.
// One node per canonical path; unresolved library names become leaf nodes.

use std::fmt;
use std::path::{Path, PathBuf};

/// Handle into the node arena of a `DependencyGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Machine type of an inspected image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_64,
    Aarch64,
    X86,
    Arm,
    RiscV,
    Unknown(u16),
}

impl Architecture {
    /// Map an ELF `e_machine` value to a tag. Unrecognized values are kept as `Unknown`.
    pub fn from_machine(machine: u16) -> Self {
        use goblin::elf::header::{EM_386, EM_AARCH64, EM_ARM, EM_RISCV, EM_X86_64};
        match machine {
            EM_X86_64 => Architecture::X86_64,
            EM_AARCH64 => Architecture::Aarch64,
            EM_386 => Architecture::X86,
            EM_ARM => Architecture::Arm,
            EM_RISCV => Architecture::RiscV,
            other => Architecture::Unknown(other),
        }
    }

    /// Flag ldconfig prints for libraries of this architecture, if it prints one.
    pub fn ld_cache_tag(&self) -> Option<&'static str> {
        match self {
            Architecture::X86_64 => Some("x86-64"),
            Architecture::Aarch64 => Some("AArch64"),
            _ => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86-64"),
            Architecture::Aarch64 => write!(f, "ARM64"),
            Architecture::X86 => write!(f, "x86"),
            Architecture::Arm => write!(f, "ARM"),
            Architecture::RiscV => write!(f, "RISC-V"),
            Architecture::Unknown(code) => write!(f, "unknown ({})", code),
        }
    }
}

/// Facts extracted from a binary, plus the package filled in by attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMetadata {
    pub architecture: Architecture,
    /// Interpreter named by `PT_INTERP`; `None` for static or non-executable images.
    pub dynamic_loader: Option<PathBuf>,
    /// Declared sonames, in the order the image lists them.
    pub shared_libraries: Vec<String>,
    pub abs_path: PathBuf,
    pub package: Option<String>,
}

/// A binary or library in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Canonical path, or the raw library name when resolution failed.
    pub path: PathBuf,
    pub resolved: bool,
    pub metadata: Option<BinaryMetadata>,
    pub dependencies: Vec<NodeId>,
}

impl Node {
    /// A resolved file whose inspection has not happened yet.
    pub fn placeholder(path: PathBuf) -> Self {
        Self {
            path,
            resolved: true,
            metadata: None,
            dependencies: Vec::new(),
        }
    }

    /// A library name that could not be mapped to a file. Always a leaf.
    pub fn unresolved(name: &str) -> Self {
        Self {
            path: PathBuf::from(name),
            resolved: false,
            metadata: None,
            dependencies: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn dynamic_loader(&self) -> Option<&Path> {
        self.metadata.as_ref()?.dynamic_loader.as_deref()
    }

    pub fn architecture(&self) -> Option<Architecture> {
        self.metadata.as_ref().map(|m| m.architecture)
    }

    pub fn package(&self) -> Option<&str> {
        self.metadata.as_ref()?.package.as_deref()
    }
}
