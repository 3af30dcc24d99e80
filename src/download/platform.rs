//! Runtime platform detection for home directory lookup

/// Operating system family, as far as home directory lookup is concerned
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Windows: home is `USERPROFILE`
    Windows,
    /// Linux, macOS and the BSDs: home is `HOME`
    Posix,
    /// Anything else, carrying the OS name
    Unsupported(String),
}

impl Platform {
    /// Classify an OS name as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" | "macos" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" => Platform::Posix,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Environment variable that holds the user's home directory
    pub fn home_variable(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("USERPROFILE"),
            Platform::Posix => Some("HOME"),
            Platform::Unsupported(_) => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Posix => f.write_str("posix"),
            Platform::Unsupported(os) => f.write_str(os),
        }
    }
}

/// Source of platform facts for the download pipeline
///
/// The pipeline never reads the process environment directly, so tests can
/// substitute a fake platform and home directory.
pub trait PlatformProvider: Send + Sync {
    /// The platform the pipeline runs on
    fn platform(&self) -> Platform;

    /// Read an environment variable
    fn env_var(&self, name: &str) -> Option<String>;
}

/// Platform provider backed by the real process
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPlatform;

impl PlatformProvider for SystemPlatform {
    fn platform(&self) -> Platform {
        Platform::from_os(std::env::consts::OS)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
