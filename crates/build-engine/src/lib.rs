//! Dependency build engine
//!
//! Turns declarative build recipes into installed artifacts: fetch and
//! verify the source tarball, unpack and patch it, then drive the
//! project's own build system against a cross-compilation toolchain
//! descriptor. Everything runs sequentially; the first failure aborts the
//! whole run.

pub mod autotools;
pub mod cmake;
pub mod digest;
pub mod extract;
pub mod fetch;
pub mod makefile;
pub mod meson;
pub mod patch;
pub mod recipe;
pub mod runner;

use std::path::PathBuf;

pub use autotools::AutotoolsConfig;
pub use cmake::CMakeConfig;
pub use makefile::MakeConfig;
pub use meson::MesonConfig;
pub use patch::Edit;
pub use recipe::{BuildKind, Recipe};
pub use runner::{Buildable, Orchestrator, Outcome};

/// Build engine errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No source URLs declared")]
    NoUrls,

    #[error("Digest length {0} matches no supported algorithm (expected 32, 40, 64, or 128 hex characters)")]
    DigestLength(usize),

    #[error("Digest mismatch for {path:?}: expected {expected}, got {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("Extraction failed: {0}")]
    Archive(String),

    #[error("Patch {patch} failed: {stderr}")]
    PatchFailed { patch: String, stderr: String },

    #[error("Build failed: {0}")]
    BuildFailed(String),
}

/// Run an external build tool to completion; any non-zero exit aborts the
/// whole orchestration run
pub(crate) async fn run_tool(
    cmd: &mut tokio::process::Command,
    tool: &str,
) -> Result<(), BuildError> {
    tracing::debug!("Running {:?}", cmd.as_std());

    let output = cmd.output().await?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BuildError::BuildFailed(format!(
            "{} failed:\n{}\n{}",
            tool, stdout, stderr
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::collections::HashMap;
    use std::path::Path;

    use crossforge_toolchain::Toolchain;

    /// Minimal descriptor rooted at a scratch directory
    pub fn toolchain(root: &Path) -> Toolchain {
        Toolchain {
            host_triplet: Some("aarch64-linux-android".to_string()),
            cc: "clang".to_string(),
            cxx: "clang++".to_string(),
            ar: "llvm-ar".to_string(),
            arflags: "rcs".to_string(),
            ranlib: "llvm-ranlib".to_string(),
            nm: "llvm-nm".to_string(),
            strip: "llvm-strip".to_string(),
            windres: None,
            cflags: "-Os -g".to_string(),
            cxxflags: "-Os -g".to_string(),
            cppflags: String::new(),
            ldflags: String::new(),
            libs: String::new(),
            install_prefix: root.join("root"),
            tarball_path: root.join("download"),
            src_path: root.join("src"),
            build_path: root.join("build"),
            pkg_config: root.join("root").join("bin").join("pkg-config"),
            env: HashMap::new(),
            is_windows: false,
            is_android: true,
            is_darwin: false,
            is_arm: false,
            is_armv7: false,
            is_aarch64: true,
        }
    }

    /// Write a small gzipped tarball containing `<base>/<name>` entries
    pub fn make_tar_gz(path: &Path, base: &str, files: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(
                    &mut header,
                    format!("{}/{}", base, name),
                    contents.as_bytes(),
                )
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
}
