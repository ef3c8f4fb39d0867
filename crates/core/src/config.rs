//! Run Configuration
//!
//! One immutable `Config` is constructed at process start (from
//! `crossforge.toml` plus command-line overrides) and passed by reference
//! into everything that needs paths or build options. Nothing in the
//! workspace reads ambient global state.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Jobs to pass to the underlying build tool when the CPU count cannot be
/// determined.
const FALLBACK_JOBS: u32 = 8;

/// Directory layout for downloads, sources, and per-target trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the working tree; everything else lives under it
    pub work_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let work_dir = dirs::cache_dir()
            .map(|d| d.join("crossforge"))
            .unwrap_or_else(|| PathBuf::from(".crossforge"));
        Self { work_dir }
    }
}

/// Options applied to every dependency build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Parallel jobs for the underlying build tool; `None` derives from the
    /// host CPU count
    pub jobs: Option<u32>,
    /// Android API level to target
    pub api_level: u32,
    /// Link the C++ runtime into the target flags
    pub use_cxx: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: None,
            api_level: 24,
            use_cxx: true,
        }
    }
}

/// Android NDK location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Path to the NDK root; falls back to `ANDROID_NDK_HOME`
    pub ndk_path: Option<PathBuf>,
}

/// MinGW cross toolchain location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MingwConfig {
    /// Root of the MinGW toolchain installation (contains `bin/`); when
    /// absent the triplet-prefixed tools are resolved from `PATH`
    pub toolchain_path: Option<PathBuf>,
}

/// Main crossforge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,
    /// Build options
    #[serde(default)]
    pub build: BuildOptions,
    /// Android NDK settings
    #[serde(default)]
    pub android: AndroidConfig,
    /// MinGW settings
    #[serde(default)]
    pub mingw: MingwConfig,
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "crossforge", "crossforge")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the default configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("crossforge.toml"))
    }

    /// Load configuration from an explicit file
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists
    pub async fn load() -> Result<Self> {
        match Self::config_file() {
            Some(config_file) if config_file.exists() => Self::load_from(&config_file).await,
            _ => {
                info!("Config file not found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let config_file = Self::config_file()
            .ok_or_else(|| Error::Config("Cannot determine config path".into()))?;

        if let Some(parent) = config_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(&config_file, contents).await?;

        debug!("Config saved to {:?}", config_file);
        Ok(())
    }

    /// Shared download cache for source tarballs
    pub fn tarball_dir(&self) -> PathBuf {
        self.paths.work_dir.join("download")
    }

    /// Shared unpacked-source tree, reused across target architectures
    pub fn src_dir(&self) -> PathBuf {
        self.paths.work_dir.join("src")
    }

    /// Per-target subtree keyed by the host triplet
    pub fn arch_dir(&self, triplet: &str) -> PathBuf {
        self.paths.work_dir.join(triplet)
    }

    /// Out-of-tree build directories for one target
    pub fn build_dir(&self, triplet: &str) -> PathBuf {
        self.arch_dir(triplet).join("build")
    }

    /// Install prefix (the sysroot) for one target
    pub fn install_prefix(&self, triplet: &str) -> PathBuf {
        self.arch_dir(triplet).join("root")
    }

    /// Android NDK root, from the config file or `ANDROID_NDK_HOME`
    pub fn ndk_path(&self) -> Option<PathBuf> {
        self.android.ndk_path.clone().or_else(|| {
            std::env::var("ANDROID_NDK_HOME")
                .or_else(|_| std::env::var("NDK_HOME"))
                .ok()
                .map(PathBuf::from)
        })
    }

    /// Parallel jobs for the underlying build tool: CPU count doubled, with
    /// a fixed fallback when the count is unavailable
    pub fn jobs(&self) -> u32 {
        self.build.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get() as u32 * 2)
                .unwrap_or(FALLBACK_JOBS)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.build.api_level, 24);
        assert!(config.build.use_cxx);
        assert!(config.build.jobs.is_none());
        assert!(config.jobs() >= 1);
    }

    #[test]
    fn test_explicit_jobs() {
        let mut config = Config::default();
        config.build.jobs = Some(3);
        assert_eq!(config.jobs(), 3);
    }

    #[test]
    fn test_arch_layout() {
        let mut config = Config::default();
        config.paths.work_dir = PathBuf::from("/work");
        assert_eq!(config.tarball_dir(), PathBuf::from("/work/download"));
        assert_eq!(config.src_dir(), PathBuf::from("/work/src"));
        assert_eq!(
            config.build_dir("aarch64-linux-android"),
            PathBuf::from("/work/aarch64-linux-android/build")
        );
        assert_eq!(
            config.install_prefix("aarch64-linux-android"),
            PathBuf::from("/work/aarch64-linux-android/root")
        );
    }

    #[tokio::test]
    async fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crossforge.toml");

        let mut config = Config::default();
        config.paths.work_dir = PathBuf::from("/tmp/forge");
        config.build.jobs = Some(4);

        let contents = toml::to_string_pretty(&config).unwrap();
        tokio::fs::write(&path, contents).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.paths.work_dir, PathBuf::from("/tmp/forge"));
        assert_eq!(loaded.jobs(), 4);
        assert_eq!(loaded.build.api_level, 24);
    }
}
