/// Dynamic-linker cache resolver.
///
/// Holds the text dump of the linker cache (`ldconfig -p`) and answers
/// soname lookups from it. A line looks like:
///
/// ```text
///     libc.so.6 (libc6,x86-64, OS ABI: Linux 3.2.0) => /lib/x86_64-linux-gnu/libc.so.6
/// ```

use std::path::PathBuf;
use log::{debug, info, warn};

use super::command::CommandSpec;
use super::config::Config;
use crate::common::CommandError;
use crate::domain::node::Architecture;
use crate::ports::LibraryResolver;

#[derive(Debug, Clone, Default)]
pub struct LdCache {
    lines: Vec<String>,
    arch_aware: bool,
}

impl LdCache {
    /// A table that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            arch_aware: false,
        }
    }

    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn with_arch_aware(mut self, enabled: bool) -> Self {
        self.arch_aware = enabled;
        self
    }

    /// Command used to enumerate the cache.
    pub fn command_spec(config: &Config) -> CommandSpec {
        CommandSpec::new(&config.ldconfig_program, config.ldconfig_args.iter().cloned())
    }

    pub fn try_load(config: &Config) -> Result<Self, CommandError> {
        let spec = Self::command_spec(config);
        let output = spec.run(config.lookup_timeout())?;
        let cache = Self::parse(&output.stdout).with_arch_aware(config.arch_aware);
        info!("[ld cache] loaded {} entries via {}", cache.len(), spec.program);
        Ok(cache)
    }

    /// Load the cache, degrading to an empty table if enumeration fails.
    pub fn load(config: &Config) -> Self {
        match Self::try_load(config) {
            Ok(cache) => cache,
            Err(e) => {
                warn!("[ld cache] enumeration failed, no library will resolve: {}", e);
                Self::empty().with_arch_aware(config.arch_aware)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(move |line| !name.is_empty() && line.contains(name))
    }

    fn last_token(line: &str) -> Option<PathBuf> {
        line.split_whitespace().last().map(PathBuf::from)
    }

    /// Comma-separated flags inside the first parenthesised group.
    fn flags(line: &str) -> Option<&str> {
        let start = line.find('(')?;
        let end = line[start..].find(')')? + start;
        Some(&line[start + 1..end])
    }

    fn has_tag(line: &str, tag: &str) -> bool {
        Self::flags(line)
            .map(|flags| flags.split(',').any(|f| f.trim() == tag))
            .unwrap_or(false)
    }
}

impl LibraryResolver for LdCache {
    /// First line containing `name` wins; its last token is the path.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.matching(name).next().and_then(Self::last_token)
    }

    fn resolve_for(&self, name: &str, arch: Architecture) -> Option<PathBuf> {
        if self.arch_aware {
            if let Some(tag) = arch.ld_cache_tag() {
                let hit = self
                    .matching(name)
                    .find(|line| Self::has_tag(line, tag))
                    .and_then(Self::last_token);
                if hit.is_some() {
                    return hit;
                }
                debug!("[ld cache] no {} entry for {}, using first match", tag, name);
            }
        }
        self.resolve(name)
    }
}
