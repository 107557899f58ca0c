// In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use ldgraph::common::{AttributionError, InspectError};
use ldgraph::domain::node::Architecture;
use ldgraph::ports::{BinaryInfo, BinaryInspector, LibraryResolver, PackageFinder};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Soname -> path table.
#[derive(Default)]
pub struct FakeResolver {
    pub table: HashMap<String, PathBuf>,
}

impl FakeResolver {
    pub fn with(mut self, name: &str, path: &Path) -> Self {
        self.table.insert(name.to_string(), path.to_path_buf());
        self
    }
}

impl LibraryResolver for FakeResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.table.get(name).cloned()
    }
}

/// Canonical path -> inspection result; counts how often each path is opened.
#[derive(Default)]
pub struct FakeInspector {
    pub images: HashMap<PathBuf, BinaryInfo>,
    pub calls: Mutex<HashMap<PathBuf, usize>>,
}

impl FakeInspector {
    pub fn with(mut self, path: &Path, interpreter: Option<&str>, needed: &[&str]) -> Self {
        self.images.insert(
            path.to_path_buf(),
            BinaryInfo {
                architecture: Architecture::X86_64,
                interpreter: interpreter.map(PathBuf::from),
                needed: needed.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_arch(mut self, path: &Path, arch: Architecture, needed: &[&str]) -> Self {
        self.images.insert(
            path.to_path_buf(),
            BinaryInfo {
                architecture: arch,
                interpreter: None,
                needed: needed.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn calls_for(&self, path: &Path) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

impl BinaryInspector for FakeInspector {
    fn inspect(&self, path: &Path) -> Result<BinaryInfo, InspectError> {
        *self.calls.lock().unwrap().entry(path.to_path_buf()).or_default() += 1;
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| InspectError::FileTooSmall {
                path: path.to_path_buf(),
            })
    }
}

/// Path -> raw package-manager output.
#[derive(Default)]
pub struct FakeFinder {
    pub owners: HashMap<PathBuf, String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeFinder {
    pub fn with(mut self, path: &Path, raw: &str) -> Self {
        self.owners.insert(path.to_path_buf(), raw.to_string());
        self
    }
}

impl PackageFinder for FakeFinder {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn find_package(&self, path: &Path) -> Result<String, AttributionError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        self.owners
            .get(path)
            .cloned()
            .ok_or_else(|| AttributionError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Temporary directory of placeholder files, addressed by canonical path.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Create an empty file and return its canonical path.
    pub fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, b"placeholder").unwrap();
        fs::canonicalize(path).unwrap()
    }

    #[cfg(unix)]
    pub fn symlink(&self, name: &str, target: &Path) -> PathBuf {
        let link = self.dir.path().join(name);
        std::os::unix::fs::symlink(target, &link).unwrap();
        link
    }
}
