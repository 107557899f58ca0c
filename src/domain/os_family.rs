/// OS Family Domain Module
///
/// Classifies the host distribution so the matching package finder can be chosen.

/// Distribution families with a supported package database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Debian,
    Rpm,
    Alpine,
}

impl OsFamily {
    /// Parse a family from config or CLI input.
    pub fn from_name(s: &str) -> Option<OsFamily> {
        match s.to_lowercase().as_str() {
            "debian" | "ubuntu" | "dpkg" => Some(OsFamily::Debian),
            "rpm" | "fedora" | "rhel" | "centos" => Some(OsFamily::Rpm),
            "alpine" | "apk" => Some(OsFamily::Alpine),
            _ => None,
        }
    }

    /// Classify the contents of an os-release style descriptor.
    /// The first family whose vocabulary appears in the text wins.
    pub fn from_os_release(text: &str) -> Option<OsFamily> {
        const VOCABULARY: &[(&str, OsFamily)] = &[
            ("Ubuntu", OsFamily::Debian),
            ("Debian", OsFamily::Debian),
            ("Fedora", OsFamily::Rpm),
            ("Red Hat", OsFamily::Rpm),
            ("CentOS", OsFamily::Rpm),
            ("Rocky", OsFamily::Rpm),
            ("AlmaLinux", OsFamily::Rpm),
            ("Alpine", OsFamily::Alpine),
        ];
        VOCABULARY
            .iter()
            .find(|(needle, _)| text.contains(needle))
            .map(|(_, family)| *family)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OsFamily::Debian => "Debian",
            OsFamily::Rpm => "RPM",
            OsFamily::Alpine => "Alpine",
        }
    }

    /// Package manager queried first for this family.
    pub fn package_tool(&self) -> &'static str {
        match self {
            OsFamily::Debian => "dpkg",
            OsFamily::Rpm => "rpm",
            OsFamily::Alpine => "apk",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
