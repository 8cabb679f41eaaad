//! Platform descriptor.
//!
//! A [`Platform`] names the machine doxygen is fetched or built for. It is
//! supplied once per run (flags, environment or host detection) and never
//! mutated afterwards.
//!
//! # Example
//!
//! ```
//! use doxy_schema::{Arch, Os, Platform};
//!
//! let platform = Platform::new(Os::Linux, Arch::X86_64);
//! assert_eq!(platform.executable_name("doxygen"), "doxygen");
//! ```

use serde::{Deserialize, Serialize};

/// Operating system of the build machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Microsoft Windows
    Windows,
    /// Linux distributions
    Linux,
    /// Apple macOS
    Macos,
    /// FreeBSD (served by the generic Unix archive)
    FreeBsd,
}

impl Os {
    /// Operating system this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBsd
        } else {
            Self::Linux
        }
    }

    /// Canonical settings name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::FreeBsd => "FreeBSD",
        }
    }

    /// Suffix appended to executable names (`.exe` on Windows).
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            _ => "",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" | "win32" | "win64" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" | "osx" | "mac" => Ok(Self::Macos),
            "freebsd" => Ok(Self::FreeBsd),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

/// CPU architecture, using the package-manager spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit Intel
    X86,
    /// 64-bit Intel/AMD
    #[serde(rename = "x86_64")]
    X86_64,
    /// 64-bit ARM (Apple Silicon, aarch64 Linux)
    Armv8,
}

impl Arch {
    /// Architecture this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_arch = "x86") {
            Self::X86
        } else if cfg!(target_arch = "aarch64") {
            Self::Armv8
        } else {
            Self::X86_64
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv8 => "armv8",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" | "win32" => Ok(Self::X86),
            "x86_64" | "x64" | "amd64" => Ok(Self::X86_64),
            "armv8" | "arm64" | "aarch64" => Ok(Self::Armv8),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}

/// Compiler family of the build machine.
///
/// Only consulted when building from source; it never changes which
/// prebuilt archive is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
    /// GNU Compiler Collection
    Gcc,
    /// LLVM clang
    Clang,
    /// Xcode clang
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl Compiler {
    /// Conventional compiler for an operating system.
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Self::Msvc,
            Os::Macos => Self::AppleClang,
            Os::FreeBsd => Self::Clang,
            Os::Linux => Self::Gcc,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
        }
    }
}

impl std::fmt::Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" | "g++" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "apple-clang" | "apple_clang" | "appleclang" => Ok(Self::AppleClang),
            "msvc" | "visual studio" | "cl" => Ok(Self::Msvc),
            _ => Err(format!("Unknown compiler: {s}")),
        }
    }
}

/// The machine a run is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system doxygen runs on
    pub os: Os,
    /// Architecture of the build machine
    pub build_arch: Arch,
    /// Architecture the consumer targets
    pub target_arch: Arch,
    /// Compiler used for source builds
    pub compiler: Compiler,
}

impl Platform {
    /// Platform with `target_arch == build_arch` and the OS's default compiler.
    pub fn new(os: Os, build_arch: Arch) -> Self {
        Self {
            os,
            build_arch,
            target_arch: build_arch,
            compiler: Compiler::default_for(os),
        }
    }

    /// The machine this binary runs on.
    pub fn host() -> Self {
        Self::new(Os::current(), Arch::current())
    }

    /// Override the target architecture.
    pub fn with_target_arch(mut self, arch: Arch) -> Self {
        self.target_arch = arch;
        self
    }

    /// Override the compiler.
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// True when the packaged binaries cannot be executed on this host.
    pub fn is_cross_building(&self) -> bool {
        self.build_arch != self.target_arch || self.os != Os::current()
    }

    /// `program` with the OS executable suffix (`doxygen.exe` on Windows).
    pub fn executable_name(&self, program: &str) -> String {
        format!("{program}{}", self.os.exe_suffix())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} (target {}, {})",
            self.os, self.build_arch, self.target_arch, self.compiler
        )
    }
}
