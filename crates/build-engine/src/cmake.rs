//! CMake adapter
//!
//! Configures out-of-tree with the toolchain expressed as cache
//! definitions, then builds and installs through the cmake driver.

use crossforge_toolchain::split_launcher;

use crate::recipe::BuildContext;
use crate::{run_tool, BuildError};

/// Configuration payload for CMake builds
#[derive(Debug, Clone)]
pub struct CMakeConfig {
    /// Extra `-D` cache definitions
    pub defines: Vec<String>,
    /// `CMAKE_BUILD_TYPE` value
    pub build_type: String,
}

impl Default for CMakeConfig {
    fn default() -> Self {
        Self {
            defines: Vec::new(),
            build_type: "Release".to_string(),
        }
    }
}

impl CMakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one cache definition
    pub fn define(mut self, key: &str, value: &str) -> Self {
        self.defines.push(format!("-D{}={}", key, value));
        self
    }
}

pub(crate) async fn build(ctx: &BuildContext<'_>, config: &CMakeConfig) -> Result<(), BuildError> {
    let tc = ctx.toolchain;

    // ccache-style prefixes become compiler launchers; cmake rejects a
    // multi-word CMAKE_C_COMPILER
    let (cc_launcher, cc) = split_launcher(&tc.cc);
    let (cxx_launcher, cxx) = split_launcher(&tc.cxx);

    let mut cmd = ctx.command("cmake");
    cmd.current_dir(ctx.build_dir)
        .arg(ctx.src_dir)
        .arg(format!("-DCMAKE_INSTALL_PREFIX={}", tc.install_prefix.display()))
        .arg(format!("-DCMAKE_BUILD_TYPE={}", config.build_type))
        .arg(format!("-DCMAKE_C_COMPILER={}", cc))
        .arg(format!("-DCMAKE_CXX_COMPILER={}", cxx))
        .arg(format!("-DCMAKE_C_FLAGS={} {}", tc.cflags, tc.cppflags))
        .arg(format!("-DCMAKE_CXX_FLAGS={} {}", tc.cxxflags, tc.cppflags))
        .arg(format!("-DCMAKE_AR={}", tc.ar))
        .arg(format!("-DCMAKE_RANLIB={}", tc.ranlib))
        .arg("-DBUILD_SHARED_LIBS=OFF");

    if let Some(launcher) = cc_launcher {
        cmd.arg(format!("-DCMAKE_C_COMPILER_LAUNCHER={}", launcher));
    }
    if let Some(launcher) = cxx_launcher {
        cmd.arg(format!("-DCMAKE_CXX_COMPILER_LAUNCHER={}", launcher));
    }

    if tc.is_cross() {
        let system = if tc.is_android {
            "Android"
        } else if tc.is_windows {
            "Windows"
        } else {
            "Linux"
        };
        cmd.arg(format!("-DCMAKE_SYSTEM_NAME={}", system))
            .arg(format!("-DCMAKE_SYSTEM_PROCESSOR={}", tc.cpu()))
            .arg(format!("-DCMAKE_FIND_ROOT_PATH={}", tc.install_prefix.display()))
            .arg("-DCMAKE_FIND_ROOT_PATH_MODE_PROGRAM=NEVER")
            .arg("-DCMAKE_FIND_ROOT_PATH_MODE_LIBRARY=ONLY")
            .arg("-DCMAKE_FIND_ROOT_PATH_MODE_INCLUDE=ONLY");
    }

    cmd.args(&config.defines);
    run_tool(&mut cmd, "cmake").await?;

    let mut build = ctx.command("cmake");
    build
        .current_dir(ctx.build_dir)
        .arg("--build")
        .arg(".")
        .arg("--parallel")
        .arg(ctx.jobs.to_string());
    run_tool(&mut build, "cmake --build").await?;

    let mut install = ctx.command("cmake");
    install.current_dir(ctx.build_dir).arg("--install").arg(".");
    run_tool(&mut install, "cmake --install").await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CMakeConfig::new()
            .define("ZLIB_COMPAT", "ON")
            .define("WITH_GTEST", "OFF");
        assert_eq!(
            config.defines,
            vec!["-DZLIB_COMPAT=ON", "-DWITH_GTEST=OFF"]
        );
        assert_eq!(config.build_type, "Release");
    }
}
