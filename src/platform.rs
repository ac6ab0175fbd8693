use serde::Serialize;
use std::fmt;

/// Operating systems, named the way release assets name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    FreeBsd,
    NetBsd,
    OpenBsd,
    Android,
    Other(&'static str),
}

/// CPU architectures, named the way release assets name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Arch {
    Amd64,
    Arm64,
    Arm,
    X86,
    Ppc64,
    Ppc64le,
    Loong64,
    Riscv64,
    S390x,
    Other(&'static str),
}

impl Os {
    pub fn from_target(os: &'static str) -> Self {
        match os {
            "linux" => Os::Linux,
            "macos" => Os::Darwin,
            "windows" => Os::Windows,
            "freebsd" => Os::FreeBsd,
            "netbsd" => Os::NetBsd,
            "openbsd" => Os::OpenBsd,
            "android" => Os::Android,
            other => Os::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::FreeBsd => "freebsd",
            Os::NetBsd => "netbsd",
            Os::OpenBsd => "openbsd",
            Os::Android => "android",
            Os::Other(name) => name,
        }
    }
}

impl Arch {
    pub fn from_target(arch: &'static str) -> Self {
        match arch {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            "arm" => Arch::Arm,
            "x86" => Arch::X86,
            "powerpc64" if cfg!(target_endian = "little") => Arch::Ppc64le,
            "powerpc64" => Arch::Ppc64,
            "loongarch64" => Arch::Loong64,
            "riscv64" => Arch::Riscv64,
            "s390x" => Arch::S390x,
            other => Arch::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
            Arch::X86 => "386",
            Arch::Ppc64 => "ppc64",
            Arch::Ppc64le => "ppc64le",
            Arch::Loong64 => "loong64",
            Arch::Riscv64 => "riscv64",
            Arch::S390x => "s390x",
            Arch::Other(name) => name,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Os> for String {
    fn from(os: Os) -> Self {
        os.as_str().to_string()
    }
}

impl From<Arch> for String {
    fn from(arch: Arch) -> Self {
        arch.as_str().to_string()
    }
}

/// The OS/architecture pair assets are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

const SEPARATORS: [char; 2] = ['_', '-'];
const EXTENSIONS: [&str; 8] = [".zip", ".tar.gz", ".tgz", ".gzip", ".gz", ".tar.xz", ".xz", ""];

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        let platform = Self::new(
            Os::from_target(std::env::consts::OS),
            Arch::from_target(std::env::consts::ARCH),
        );
        tracing::trace!("Host platform: {}", platform);
        platform
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Every asset-name ending accepted for this platform, in match order.
    ///
    /// `linux_amd64.tar.gz`, `linux-amd64`, and on Windows also
    /// `windows_amd64.exe.zip`.
    pub fn asset_suffixes(&self) -> Vec<String> {
        let per_ext = if self.is_windows() { 2 } else { 1 };
        let mut suffixes = Vec::with_capacity(SEPARATORS.len() * EXTENSIONS.len() * per_ext);
        for sep in SEPARATORS {
            for ext in EXTENSIONS {
                suffixes.push(format!("{}{}{}{}", self.os, sep, self.arch, ext));
                if self.is_windows() {
                    suffixes.push(format!("{}{}{}.exe{}", self.os, sep, self.arch, ext));
                }
            }
        }
        suffixes
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
