/// Package finders, one per OS family.
///
/// Each finder tries its package manager's ownership query first and a
/// file-list search second. Both are external commands bounded by a timeout.

use std::fs;
use std::path::Path;
use std::time::Duration;
use log::{debug, info, warn};

use super::command::{CommandOutput, CommandSpec};
use super::config::Config;
use crate::common::{AttributionError, CommandError};
use crate::domain::os_family::OsFamily;
use crate::ports::PackageFinder;

// ═══════════════════════════════════════════════════════════════════════════
// Lookup plumbing
// ═══════════════════════════════════════════════════════════════════════════

/// How a lookup's stdout becomes a package identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputParser {
    /// Whole trimmed output (`dpkg -S`, `rpm -qf`).
    Trimmed,
    /// Text before the first `:` of the first line (`apt-file search`, `dnf provides`).
    BeforeColon,
    /// Text after `is owned by` (`apk info -W`).
    OwnedBy,
    /// First non-empty line (`apk search -x`).
    FirstLine,
}

impl OutputParser {
    pub fn parse(self, stdout: &str) -> Option<String> {
        let text = stdout.trim();
        let parsed = match self {
            OutputParser::Trimmed => Some(text),
            OutputParser::BeforeColon => text
                .lines()
                .next()
                .and_then(|line| line.split(':').next()),
            OutputParser::OwnedBy => text
                .lines()
                .find_map(|line| line.split_once("is owned by"))
                .map(|(_, pkg)| pkg),
            OutputParser::FirstLine => text.lines().map(str::trim).find(|l| !l.is_empty()),
        };
        parsed
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// One query against a package database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub command: CommandSpec,
    pub parser: OutputParser,
}

impl Lookup {
    fn new(command: CommandSpec, parser: OutputParser) -> Self {
        Self { command, parser }
    }

    fn run(&self, timeout: Duration) -> Result<Option<String>, CommandError> {
        let CommandOutput { stdout, .. } = self.command.run(timeout)?;
        Ok(self.parser.parse(&stdout))
    }
}

/// Try each lookup in order; the first one producing an identifier wins.
fn run_lookups(lookups: &[Lookup], path: &Path, timeout: Duration) -> Result<String, AttributionError> {
    let mut last_error = None;
    for lookup in lookups {
        match lookup.run(timeout) {
            Ok(Some(pkg)) => return Ok(pkg),
            Ok(None) => debug!("[package] {} gave no owner for {}", lookup.command.program, path.display()),
            Err(e) => {
                debug!("[package] {} failed for {}: {}", lookup.command.program, path.display(), e);
                last_error = Some(e);
            }
        }
    }
    match last_error {
        // Spawn/timeout errors mean the tooling is unusable; exit failures just mean "not owned".
        Some(source @ (CommandError::Spawn { .. } | CommandError::TimedOut { .. })) => {
            Err(AttributionError::Lookup {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(AttributionError::NotFound {
            path: path.to_path_buf(),
        }),
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ═══════════════════════════════════════════════════════════════════════════
// Finders
// ═══════════════════════════════════════════════════════════════════════════

/// dpkg database, falling back to apt-file.
#[derive(Debug, Clone)]
pub struct DebianFinder {
    timeout: Duration,
}

impl DebianFinder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn lookups(path: &Path) -> Vec<Lookup> {
        let arg = path_arg(path);
        vec![
            Lookup::new(CommandSpec::new("dpkg", ["-S".to_string(), arg.clone()]), OutputParser::Trimmed),
            Lookup::new(
                CommandSpec::new("apt-file", ["search".to_string(), arg]),
                OutputParser::BeforeColon,
            ),
        ]
    }
}

impl PackageFinder for DebianFinder {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn find_package(&self, path: &Path) -> Result<String, AttributionError> {
        run_lookups(&Self::lookups(path), path, self.timeout)
    }
}

/// rpm database, falling back to dnf.
#[derive(Debug, Clone)]
pub struct RpmFinder {
    timeout: Duration,
}

impl RpmFinder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn lookups(path: &Path) -> Vec<Lookup> {
        let arg = path_arg(path);
        vec![
            Lookup::new(CommandSpec::new("rpm", ["-qf".to_string(), arg.clone()]), OutputParser::Trimmed),
            Lookup::new(
                CommandSpec::new("dnf", ["provides".to_string(), arg]),
                OutputParser::BeforeColon,
            ),
        ]
    }
}

impl PackageFinder for RpmFinder {
    fn name(&self) -> &'static str {
        "rpm"
    }

    fn find_package(&self, path: &Path) -> Result<String, AttributionError> {
        run_lookups(&Self::lookups(path), path, self.timeout)
    }
}

/// apk ownership query, falling back to the `so:` provider index.
#[derive(Debug, Clone)]
pub struct ApkFinder {
    timeout: Duration,
}

impl ApkFinder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn lookups(path: &Path) -> Vec<Lookup> {
        let mut lookups = vec![Lookup::new(
            CommandSpec::new("apk", ["info".to_string(), "-W".to_string(), path_arg(path)]),
            OutputParser::OwnedBy,
        )];
        if let Some(file_name) = path.file_name() {
            lookups.push(Lookup::new(
                CommandSpec::new(
                    "apk",
                    [
                        "search".to_string(),
                        "-x".to_string(),
                        format!("so:{}", file_name.to_string_lossy()),
                    ],
                ),
                OutputParser::FirstLine,
            ));
        }
        lookups
    }
}

impl PackageFinder for ApkFinder {
    fn name(&self) -> &'static str {
        "alpine"
    }

    fn find_package(&self, path: &Path) -> Result<String, AttributionError> {
        run_lookups(&Self::lookups(path), path, self.timeout)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Detection
// ═══════════════════════════════════════════════════════════════════════════

/// Finder for a known family.
pub fn finder_for(family: OsFamily, timeout: Duration) -> Box<dyn PackageFinder> {
    match family {
        OsFamily::Debian => Box::new(DebianFinder::new(timeout)),
        OsFamily::Rpm => Box::new(RpmFinder::new(timeout)),
        OsFamily::Alpine => Box::new(ApkFinder::new(timeout)),
    }
}

/// Pick the host's family: the configured override, else the os-release descriptor.
pub fn detect_family(config: &Config) -> Option<OsFamily> {
    if let Some(family) = config.forced_family() {
        return Some(family);
    }
    match fs::read_to_string(&config.os_release) {
        Ok(text) => OsFamily::from_os_release(&text),
        Err(e) => {
            warn!("[package] cannot read {}: {}", config.os_release.display(), e);
            None
        }
    }
}

/// Finder for the host, or `None` when the distribution is not recognized.
pub fn detect_finder(config: &Config) -> Option<Box<dyn PackageFinder>> {
    let family = detect_family(config)?;
    info!("[package] using {} package database ({})", family, family.package_tool());
    Some(finder_for(family, config.lookup_timeout()))
}
