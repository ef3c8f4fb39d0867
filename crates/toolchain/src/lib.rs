//! Cross-compilation toolchain descriptors
//!
//! A [`Toolchain`] is an immutable record of compiler paths, flags, and
//! target-platform predicates for one (target architecture, run)
//! combination. It is built once per run and shared by reference across
//! every dependency build; recipes never mutate it.

pub mod abi;
pub mod android;
pub mod mingw;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use abi::Abi;

/// Toolchain errors
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("Android NDK not found; set android.ndk_path or ANDROID_NDK_HOME")]
    NdkNotFound,
    #[error("Unsupported host platform")]
    UnsupportedHost,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable description of one cross-compilation target
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Target triplet; `None` means a native, non-cross build
    pub host_triplet: Option<String>,

    /// C compiler command, possibly ccache-prefixed
    pub cc: String,
    /// C++ compiler command, possibly ccache-prefixed
    pub cxx: String,
    /// Static archiver
    pub ar: String,
    /// Flags for the archiver
    pub arflags: String,
    /// Archive index tool
    pub ranlib: String,
    /// Symbol lister
    pub nm: String,
    /// Symbol stripper
    pub strip: String,
    /// Windows resource compiler, present only for MinGW targets
    pub windres: Option<String>,

    /// C compile flags
    pub cflags: String,
    /// C++ compile flags
    pub cxxflags: String,
    /// Preprocessor flags (sysroot include path, platform defines)
    pub cppflags: String,
    /// Link flags
    pub ldflags: String,
    /// Extra libraries appended to every link
    pub libs: String,

    /// Sysroot every dependency installs into
    pub install_prefix: PathBuf,
    /// Download cache for source tarballs
    pub tarball_path: PathBuf,
    /// Unpacked source trees, shared across targets
    pub src_path: PathBuf,
    /// Out-of-tree build directories for this target
    pub build_path: PathBuf,
    /// pkg-config wrapper pinned to the sysroot
    pub pkg_config: PathBuf,

    /// Environment overrides for every child build tool
    pub env: HashMap<String, String>,

    /// Target platform predicates
    pub is_windows: bool,
    pub is_android: bool,
    pub is_darwin: bool,
    pub is_arm: bool,
    pub is_armv7: bool,
    pub is_aarch64: bool,
}

impl Toolchain {
    /// Whether this run is cross-compiling at all
    pub fn is_cross(&self) -> bool {
        self.host_triplet.is_some()
    }

    /// CPU family name in meson nomenclature
    pub fn cpu_family(&self) -> &'static str {
        if self.is_aarch64 {
            "aarch64"
        } else if self.is_arm {
            "arm"
        } else if self
            .host_triplet
            .as_deref()
            .is_some_and(|t| t.starts_with("x86_64"))
        {
            "x86_64"
        } else {
            "x86"
        }
    }

    /// CPU name in meson nomenclature (the triplet's architecture prefix)
    pub fn cpu(&self) -> String {
        self.host_triplet
            .as_deref()
            .and_then(|t| t.split('-').next())
            .unwrap_or("x86_64")
            .to_string()
    }
}

/// Prefix a compiler command with ccache when it is available on `PATH`
pub(crate) fn with_ccache(command: &str) -> String {
    match which::which("ccache") {
        Ok(ccache) => format!("{} {}", ccache.display(), command),
        Err(_) => command.to_string(),
    }
}

/// Split a possibly launcher-prefixed compiler command into the launcher
/// and the compiler itself
pub fn split_launcher(command: &str) -> (Option<&str>, &str) {
    match command.split_once(' ') {
        Some((launcher, program)) => (Some(launcher), program),
        None => (None, command),
    }
}

/// Host platform tag used inside the NDK's `prebuilt` directory.
/// The Darwin prebuilts keep the x86_64 tag but ship fat binaries that
/// include arm64.
pub(crate) fn host_tag() -> Result<&'static str, ToolchainError> {
    if cfg!(target_os = "linux") {
        Ok("linux-x86_64")
    } else if cfg!(windows) {
        Ok("windows-x86_64")
    } else if cfg!(target_os = "macos") {
        Ok("darwin-x86_64")
    } else {
        Err(ToolchainError::UnsupportedHost)
    }
}

/// Generate the pkg-config wrapper inside the sysroot's `bin` directory.
///
/// Child configure steps must resolve `.pc` files from the target sysroot
/// instead of the build host's default search path, so the wrapper pins
/// `PKG_CONFIG_LIBDIR` before delegating to the real pkg-config.
pub(crate) async fn write_pkg_config_wrapper(
    install_prefix: &Path,
) -> Result<PathBuf, ToolchainError> {
    let bin_dir = install_prefix.join("bin");
    tokio::fs::create_dir_all(&bin_dir).await?;

    let wrapper = bin_dir.join("pkg-config");
    let script = format!(
        "#!/bin/sh\n\
         PKG_CONFIG_LIBDIR='{}'\n\
         export PKG_CONFIG_LIBDIR\n\
         unset PKG_CONFIG_PATH\n\
         exec pkg-config \"$@\"\n",
        install_prefix.join("lib").join("pkgconfig").display()
    );
    tokio::fs::write(&wrapper, script).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = tokio::fs::metadata(&wrapper).await?.permissions();
        perms.set_mode(0o755);
        tokio::fs::set_permissions(&wrapper, perms).await?;
    }

    debug!("Wrote pkg-config wrapper to {:?}", wrapper);
    Ok(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_launcher() {
        assert_eq!(split_launcher("clang"), (None, "clang"));
        assert_eq!(
            split_launcher("/usr/bin/ccache /ndk/bin/clang"),
            (Some("/usr/bin/ccache"), "/ndk/bin/clang")
        );
    }

    #[tokio::test]
    async fn test_pkg_config_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("root");

        let wrapper = write_pkg_config_wrapper(&prefix).await.unwrap();
        assert_eq!(wrapper, prefix.join("bin").join("pkg-config"));

        let script = tokio::fs::read_to_string(&wrapper).await.unwrap();
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("PKG_CONFIG_LIBDIR"));
        assert!(script.contains(&prefix.join("lib").join("pkgconfig").display().to_string()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&wrapper).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }
}
