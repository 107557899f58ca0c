// Infrastructure implementations for ldgraph.

pub mod command;
pub mod concurrency;
pub mod config;
pub mod elf_inspector;
pub mod ld_cache;
pub mod package_finder;

pub use command::CommandSpec;
pub use config::Config;
pub use elf_inspector::ElfInspector;
pub use ld_cache::LdCache;
pub use package_finder::{detect_finder, ApkFinder, DebianFinder, RpmFinder};
