//! Build recipes
//!
//! A [`Recipe`] is the declarative unit: where to get one third-party
//! dependency, how to verify it, and how to turn it into installed
//! artifacts under the toolchain's sysroot. Recipes are constructed once
//! from static declaration data and never mutate the toolchain they build
//! against.

use std::path::{Path, PathBuf};

use crossforge_toolchain::Toolchain;
use tokio::process::Command;
use tracing::{debug, info};

use crate::autotools::AutotoolsConfig;
use crate::cmake::CMakeConfig;
use crate::extract::extract;
use crate::fetch::{fetch, filename_from_url};
use crate::makefile::MakeConfig;
use crate::meson::MesonConfig;
use crate::patch::{apply_edits, apply_series, Edit};
use crate::BuildError;

/// How a recipe's source tree is configured and compiled.
///
/// A closed set: each variant carries the explicit configuration payload
/// for its build system.
#[derive(Debug, Clone)]
pub enum BuildKind {
    Autotools(AutotoolsConfig),
    CMake(CMakeConfig),
    Meson(MesonConfig),
    Make(MakeConfig),
}

/// Everything a build-system adapter needs for one build
pub struct BuildContext<'a> {
    pub toolchain: &'a Toolchain,
    pub src_dir: &'a Path,
    pub build_dir: &'a Path,
    pub jobs: u32,
    pub subdirs: &'a [String],
}

impl BuildContext<'_> {
    /// Command with the toolchain environment applied
    pub(crate) fn command(&self, program: impl AsRef<std::ffi::OsStr>) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(&self.toolchain.env);
        cmd
    }
}

/// Strip a recognized archive extension from a tarball basename
fn strip_archive_ext(filename: &str) -> &str {
    const EXTENSIONS: [&str; 9] = [
        ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz", ".txz", ".tar.lzma", ".tar", ".zip",
    ];
    for ext in EXTENSIONS {
        if let Some(base) = filename.strip_suffix(ext) {
            return base;
        }
    }
    filename
}

/// Split `<name>-<version>` at the last dash that introduces a digit
fn split_name_version(base: &str) -> Option<(&str, &str)> {
    let bytes = base.as_bytes();
    for i in (0..bytes.len().saturating_sub(1)).rev() {
        if bytes[i] == b'-' && bytes[i + 1].is_ascii_digit() {
            return Some((&base[..i], &base[i + 1..]));
        }
    }
    None
}

/// Declarative description of one third-party dependency
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    version: String,
    base: String,
    urls: Vec<String>,
    digest: String,
    installed: PathBuf,
    patch_dir: Option<PathBuf>,
    edits: Vec<Edit>,
    subdirs: Vec<String>,
    kind: BuildKind,
}

impl Recipe {
    /// Declare a recipe from its mirror URLs, expected digest, installed
    /// marker (relative to the install prefix), and build kind.
    ///
    /// Name, version, and the archive's top-level directory are parsed
    /// from the first URL's `<name>-<version>.<ext>` basename; use the
    /// `with_*` builders when upstream deviates from that pattern.
    pub fn new<I, S>(urls: I, digest: &str, installed: impl Into<PathBuf>, kind: BuildKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let filename = urls
            .first()
            .map(|u| filename_from_url(u))
            .unwrap_or_default();
        let base = strip_archive_ext(filename).to_string();
        let (name, version) = split_name_version(&base)
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .unwrap_or_else(|| (base.clone(), String::new()));

        Self {
            name,
            version,
            base,
            urls,
            digest: digest.to_string(),
            installed: installed.into(),
            patch_dir: None,
            edits: Vec::new(),
            subdirs: Vec::new(),
            kind,
        }
    }

    /// Override the parsed name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Override the parsed version
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Override the archive's top-level directory name
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }

    /// Attach a quilt-style patch series directory
    pub fn with_patches(mut self, series_dir: impl Into<PathBuf>) -> Self {
        self.patch_dir = Some(series_dir.into());
        self
    }

    /// Attach a programmatic source edit, applied after patches
    pub fn with_edit(mut self, path: impl Into<PathBuf>, apply: fn(&str) -> String) -> Self {
        self.edits.push(Edit::new(path, apply));
        self
    }

    /// Restrict make invocations to the given subdirectories, in order
    pub fn with_subdirs<I, S>(mut self, subdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdirs = subdirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Whether the installed marker is at least as fresh as the source
    /// tarball.
    ///
    /// The tarball is fetched (or re-verified from cache) first, so this
    /// doubles as a connectivity and integrity precheck even when nothing
    /// needs building. An absent marker is a plain `false`, never an
    /// error. The marker does not encode flags or patch sets: changing
    /// those without touching the tarball does not trigger a rebuild.
    pub async fn is_installed(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
    ) -> Result<bool, BuildError> {
        let tarball = fetch(client, &self.urls, &self.digest, &toolchain.tarball_path).await?;

        let marker = toolchain.install_prefix.join(&self.installed);
        let marker_meta = match tokio::fs::metadata(&marker).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} is not installed", self.name);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let tarball_meta = tokio::fs::metadata(&tarball).await?;
        let fresh = marker_meta.modified()? >= tarball_meta.modified()?;
        if !fresh {
            debug!("{} is older than its tarball", self.name);
        }
        Ok(fresh)
    }

    /// Materialize the patched source tree: fetch, extract, patch, edit.
    ///
    /// Extraction is lazy only when the recipe rewrites nothing, so
    /// patched trees always start from pristine upstream sources.
    pub async fn unpack(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
    ) -> Result<PathBuf, BuildError> {
        let tarball = fetch(client, &self.urls, &self.digest, &toolchain.tarball_path).await?;

        let lazy = self.patch_dir.is_none() && self.edits.is_empty();
        let src = extract(&tarball, &toolchain.src_path, &self.base, lazy).await?;

        if let Some(series_dir) = &self.patch_dir {
            apply_series(&src, series_dir).await?;
        }
        apply_edits(&src, &self.edits).await?;

        Ok(src)
    }

    /// Unpack the source tree, recreate the out-of-tree build directory,
    /// and dispatch to the build-system adapter. On success the declared
    /// installed artifact is present and fresh under the install prefix.
    pub async fn build(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
        jobs: u32,
    ) -> Result<(), BuildError> {
        info!("Building {} {}", self.name, self.version);

        let src = self.unpack(client, toolchain).await?;

        let build_dir = toolchain.build_path.join(&self.base);
        match tokio::fs::remove_dir_all(&build_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&build_dir).await?;

        let ctx = BuildContext {
            toolchain,
            src_dir: &src,
            build_dir: &build_dir,
            jobs,
            subdirs: &self.subdirs,
        };

        match &self.kind {
            BuildKind::Autotools(config) => crate::autotools::build(&ctx, config).await,
            BuildKind::CMake(config) => crate::cmake::build(&ctx, config).await,
            BuildKind::Meson(config) => crate::meson::build(&ctx, config).await,
            BuildKind::Make(config) => crate::makefile::build(&ctx, config).await,
        }
    }
}
