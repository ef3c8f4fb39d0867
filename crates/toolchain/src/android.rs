//! Android NDK toolchain construction
//!
//! Builds a [`Toolchain`] descriptor for one Android ABI from the NDK's
//! prebuilt LLVM toolchain.

use std::collections::HashMap;

use crossforge_core::Config;
use tracing::info;

use crate::{
    abi::Abi, host_tag, with_ccache, write_pkg_config_wrapper, Toolchain, ToolchainError,
};

/// Build the toolchain descriptor for one Android ABI
pub async fn toolchain(config: &Config, abi: Abi) -> Result<Toolchain, ToolchainError> {
    let ndk_path = config.ndk_path().ok_or(ToolchainError::NdkNotFound)?;

    let triplet = abi.ndk_triplet();
    let install_prefix = config.install_prefix(triplet);

    let llvm_bin = ndk_path
        .join("toolchains")
        .join("llvm")
        .join("prebuilt")
        .join(host_tag()?)
        .join("bin");

    // Clang selects the API level through the target triple suffix
    let llvm_triple = format!("{}{}", triplet, config.build.api_level);

    let mut common_flags = format!("-Os -g {}", abi.cflags());
    common_flags.push_str(&format!(" -target {}", llvm_triple));
    common_flags.push_str(" -fvisibility=hidden -fdata-sections -ffunction-sections");

    let cc = with_ccache(&llvm_bin.join("clang").display().to_string());
    let cxx = with_ccache(&llvm_bin.join("clang++").display().to_string());

    let cppflags = format!("-isystem {}", install_prefix.join("include").display());
    let ldflags = format!(
        "-L{} -Wl,--exclude-libs=ALL {}",
        install_prefix.join("lib").display(),
        common_flags
    );

    let is_arm = abi.ndk_arch() == "arm";
    let is_armv7 = abi == Abi::ArmeabiV7a;
    let is_aarch64 = abi.ndk_arch() == "arm64";

    let mut libs = String::new();
    if config.build.use_cxx {
        libs.push_str("-static-libstdc++");
        if is_armv7 {
            // On 32 bit ARM, clang emits no ".eh_frame" section; the LLVM
            // unwinder library unwinds the stack after a C++ throw instead.
            libs.push_str(" -lunwind");
        }
    }

    let pkg_config = write_pkg_config_wrapper(&install_prefix).await?;
    let mut env = HashMap::new();
    env.insert("PKG_CONFIG".to_string(), pkg_config.display().to_string());

    info!("Android toolchain for {} (API {})", abi.name(), config.build.api_level);

    Ok(Toolchain {
        host_triplet: Some(triplet.to_string()),
        cc,
        cxx,
        ar: llvm_bin.join("llvm-ar").display().to_string(),
        arflags: "rcs".to_string(),
        ranlib: llvm_bin.join("llvm-ranlib").display().to_string(),
        nm: llvm_bin.join("llvm-nm").display().to_string(),
        strip: llvm_bin.join("llvm-strip").display().to_string(),
        windres: None,
        cflags: common_flags.clone(),
        cxxflags: common_flags,
        cppflags,
        ldflags,
        libs,
        install_prefix,
        tarball_path: config.tarball_dir(),
        src_path: config.src_dir(),
        build_path: config.build_dir(triplet),
        pkg_config,
        env,
        is_windows: false,
        is_android: true,
        is_darwin: false,
        is_arm,
        is_armv7,
        is_aarch64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(work_dir: PathBuf, ndk: PathBuf) -> Config {
        let mut config = Config::default();
        config.paths.work_dir = work_dir;
        config.android.ndk_path = Some(ndk);
        config
    }

    #[tokio::test]
    async fn test_android_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().join("work"), dir.path().join("ndk"));

        let tc = toolchain(&config, Abi::Arm64V8a).await.unwrap();

        assert_eq!(tc.host_triplet.as_deref(), Some("aarch64-linux-android"));
        assert!(tc.cc.ends_with("clang"));
        assert!(tc.cflags.contains("-target aarch64-linux-android24"));
        assert!(tc.cflags.contains("-fvisibility=hidden"));
        assert!(tc.is_android && tc.is_aarch64);
        assert!(!tc.is_windows && !tc.is_arm);
        assert_eq!(tc.cpu_family(), "aarch64");
        assert_eq!(
            tc.install_prefix,
            dir.path().join("work").join("aarch64-linux-android").join("root")
        );
        let wrapper = tc.pkg_config.display().to_string();
        assert_eq!(tc.env.get("PKG_CONFIG"), Some(&wrapper));
    }

    #[tokio::test]
    async fn test_armv7_links_unwinder() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().join("work"), dir.path().join("ndk"));

        let tc = toolchain(&config, Abi::ArmeabiV7a).await.unwrap();

        assert!(tc.is_arm && tc.is_armv7);
        assert!(tc.libs.contains("-static-libstdc++"));
        assert!(tc.libs.contains("-lunwind"));
        assert_eq!(tc.cpu_family(), "arm");
    }

    #[tokio::test]
    async fn test_missing_ndk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.work_dir = dir.path().to_path_buf();
        // isolate from a developer's real environment
        if std::env::var("ANDROID_NDK_HOME").is_err() && std::env::var("NDK_HOME").is_err() {
            let result = toolchain(&config, Abi::X86_64).await;
            assert!(matches!(result, Err(ToolchainError::NdkNotFound)));
        }
    }
}
