/// ELF binary inspector.
///
/// Maps the file with memmap2 and parses it with goblin to extract the
/// machine type, the `PT_INTERP` interpreter and the `DT_NEEDED` sonames.

use std::fs::File;
use std::path::{Path, PathBuf};
use goblin::elf::program_header::PT_INTERP;
use goblin::elf::Elf;
use memmap2::Mmap;

use crate::common::InspectError;
use crate::domain::node::Architecture;
use crate::ports::{BinaryInfo, BinaryInspector};

/// Smallest file that can hold an ELF header.
const MIN_ELF_SIZE: u64 = 52;

#[derive(Debug, Default, Clone, Copy)]
pub struct ElfInspector;

impl ElfInspector {
    /// Parse an in-memory image.
    pub fn inspect_bytes(path: &Path, bytes: &[u8]) -> Result<BinaryInfo, InspectError> {
        let elf = Elf::parse(bytes).map_err(|source| InspectError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let interpreter = Self::interpreter(path, &elf, bytes)?;

        Ok(BinaryInfo {
            architecture: Architecture::from_machine(elf.header.e_machine),
            interpreter,
            needed: elf.libraries.iter().map(|lib| lib.to_string()).collect(),
        })
    }

    /// Contents of the `PT_INTERP` segment with NUL padding trimmed.
    fn interpreter(path: &Path, elf: &Elf, bytes: &[u8]) -> Result<Option<PathBuf>, InspectError> {
        let Some(header) = elf.program_headers.iter().find(|ph| ph.p_type == PT_INTERP) else {
            return Ok(None);
        };

        let truncated = || InspectError::Truncated {
            path: path.to_path_buf(),
        };
        let start = usize::try_from(header.p_offset).map_err(|_| truncated())?;
        let len = usize::try_from(header.p_filesz).map_err(|_| truncated())?;
        let end = start.checked_add(len).ok_or_else(truncated)?;
        let raw = bytes.get(start..end).ok_or_else(truncated)?;

        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim_matches('\0');
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(trimmed)))
        }
    }
}

impl BinaryInspector for ElfInspector {
    fn inspect(&self, path: &Path) -> Result<BinaryInfo, InspectError> {
        let open_failed = |source| InspectError::OpenFailed {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_failed)?;
        let len = file.metadata().map_err(open_failed)?.len();
        if len < MIN_ELF_SIZE {
            return Err(InspectError::FileTooSmall {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: the map is read-only and dropped before this call returns.
        // Concurrent truncation of the file by another process is not guarded against.
        let mmap = unsafe { Mmap::map(&file) }.map_err(open_failed)?;
        Self::inspect_bytes(path, &mmap)
    }
}
