//! Autotools adapter
//!
//! Runs a configure script out-of-tree with the toolchain's compilers and
//! flags passed as `VAR=value` arguments, then make and make install.

use crate::recipe::BuildContext;
use crate::{run_tool, BuildError};

/// Configuration payload for configure-script builds
#[derive(Debug, Clone)]
pub struct AutotoolsConfig {
    /// Arguments appended to the configure invocation
    pub configure_args: Vec<String>,
    /// Regenerate the configure script with autoreconf first
    pub autogen: bool,
    /// Make target that installs into the prefix
    pub install_target: String,
}

impl Default for AutotoolsConfig {
    fn default() -> Self {
        Self {
            configure_args: Vec::new(),
            autogen: false,
            install_target: "install".to_string(),
        }
    }
}

impl AutotoolsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append configure arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Regenerate the configure script before running it
    pub fn autogen(mut self) -> Self {
        self.autogen = true;
        self
    }
}

pub(crate) async fn build(
    ctx: &BuildContext<'_>,
    config: &AutotoolsConfig,
) -> Result<(), BuildError> {
    let tc = ctx.toolchain;

    if config.autogen {
        let mut cmd = ctx.command("autoreconf");
        cmd.args(["-f", "-i", "-v"]).current_dir(ctx.src_dir);
        run_tool(&mut cmd, "autoreconf").await?;
    }

    let mut cmd = ctx.command(ctx.src_dir.join("configure"));
    cmd.current_dir(ctx.build_dir)
        .arg(format!("CC={}", tc.cc))
        .arg(format!("CXX={}", tc.cxx))
        .arg(format!("CFLAGS={}", tc.cflags))
        .arg(format!("CXXFLAGS={}", tc.cxxflags))
        .arg(format!("CPPFLAGS={}", tc.cppflags))
        .arg(format!("LDFLAGS={}", tc.ldflags))
        .arg(format!("LIBS={}", tc.libs))
        .arg(format!("AR={}", tc.ar))
        .arg(format!("ARFLAGS={}", tc.arflags))
        .arg(format!("RANLIB={}", tc.ranlib))
        .arg(format!("STRIP={}", tc.strip))
        .arg(format!("--prefix={}", tc.install_prefix.display()));
    if let Some(triplet) = &tc.host_triplet {
        cmd.arg(format!("--host={}", triplet));
    }
    cmd.args(&config.configure_args);
    run_tool(&mut cmd, "configure").await?;

    let jobs = format!("-j{}", ctx.jobs);
    if ctx.subdirs.is_empty() {
        let mut make = ctx.command("make");
        make.current_dir(ctx.build_dir).arg("--quiet").arg(&jobs);
        run_tool(&mut make, "make").await?;

        let mut install = ctx.command("make");
        install
            .current_dir(ctx.build_dir)
            .arg("--quiet")
            .arg(&config.install_target);
        run_tool(&mut install, "make install").await?;
    } else {
        for subdir in ctx.subdirs {
            let cwd = ctx.build_dir.join(subdir);

            let mut make = ctx.command("make");
            make.current_dir(&cwd).arg("--quiet").arg(&jobs);
            run_tool(&mut make, "make").await?;

            let mut install = ctx.command("make");
            install
                .current_dir(&cwd)
                .arg("--quiet")
                .arg(&config.install_target);
            run_tool(&mut install, "make install").await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AutotoolsConfig::new()
            .args(["--disable-shared", "--enable-static"])
            .autogen();
        assert_eq!(
            config.configure_args,
            vec!["--disable-shared", "--enable-static"]
        );
        assert!(config.autogen);
        assert_eq!(config.install_target, "install");
    }
}
