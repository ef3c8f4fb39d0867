//! MinGW toolchain construction
//!
//! Builds a [`Toolchain`] descriptor for a Windows target from a
//! triplet-prefixed GNU cross toolchain.

use std::collections::HashMap;

use crossforge_core::Config;
use tracing::info;

use crate::{with_ccache, write_pkg_config_wrapper, Toolchain, ToolchainError};

/// Build the toolchain descriptor for a MinGW triplet such as
/// `x86_64-w64-mingw32` or `i686-w64-mingw32`
pub async fn toolchain(config: &Config, triplet: &str) -> Result<Toolchain, ToolchainError> {
    let install_prefix = config.install_prefix(triplet);

    let tool = |name: &str| -> String {
        match &config.mingw.toolchain_path {
            Some(root) => root
                .join("bin")
                .join(format!("{}-{}", triplet, name))
                .display()
                .to_string(),
            None => format!("{}-{}", triplet, name),
        }
    };

    let x64 = triplet.starts_with("x86_64");

    let mut common_flags = String::from("-O2 -g");
    if !x64 {
        // SSE support is required for LAME
        common_flags.push_str(" -march=pentium3");
    }

    // _FORTIFY_SOURCE is broken with mingw; some libraries such as libFLAC
    // would otherwise enable it.
    let cppflags = format!(
        "-isystem {} -DWINVER=0x0600 -D_WIN32_WINNT=0x0600 -D_FORTIFY_SOURCE=0",
        install_prefix.join("include").display()
    );
    let ldflags = format!(
        "-L{} -static-libstdc++ -static-libgcc",
        install_prefix.join("lib").display()
    );

    let is_arm = triplet.starts_with("arm");
    let is_aarch64 = triplet.starts_with("aarch64");

    let pkg_config = write_pkg_config_wrapper(&install_prefix).await?;
    let mut env = HashMap::new();
    env.insert("PKG_CONFIG".to_string(), pkg_config.display().to_string());

    info!("MinGW toolchain for {}", triplet);

    Ok(Toolchain {
        host_triplet: Some(triplet.to_string()),
        cc: with_ccache(&tool("gcc")),
        cxx: with_ccache(&tool("g++")),
        ar: tool("ar"),
        arflags: "rcs".to_string(),
        ranlib: tool("ranlib"),
        nm: tool("nm"),
        strip: tool("strip"),
        windres: Some(tool("windres")),
        cflags: common_flags.clone(),
        cxxflags: common_flags,
        cppflags,
        ldflags,
        libs: String::new(),
        install_prefix,
        tarball_path: config.tarball_dir(),
        src_path: config.src_dir(),
        build_path: config.build_dir(triplet),
        pkg_config,
        env,
        is_windows: triplet.contains("mingw32"),
        is_android: false,
        is_darwin: false,
        is_arm,
        is_armv7: false,
        is_aarch64,
    })
}
