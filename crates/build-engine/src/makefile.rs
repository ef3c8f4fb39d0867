//! Plain-Makefile adapter
//!
//! For upstreams with a hand-rolled Makefile and no configure step. These
//! rarely support out-of-tree builds, so make runs inside the source tree
//! with the toolchain passed as variable assignments.

use crate::recipe::BuildContext;
use crate::{run_tool, BuildError};

/// Configuration payload for plain make builds
#[derive(Debug, Clone)]
pub struct MakeConfig {
    /// Extra variable assignments and targets for the build invocation
    pub args: Vec<String>,
    /// Install target
    pub install_target: String,
}

impl Default for MakeConfig {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            install_target: "install".to_string(),
        }
    }
}

impl MakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append make arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override the install target
    pub fn install_target(mut self, target: &str) -> Self {
        self.install_target = target.to_string();
        self
    }
}

pub(crate) async fn build(ctx: &BuildContext<'_>, config: &MakeConfig) -> Result<(), BuildError> {
    let tc = ctx.toolchain;

    let assignments = [
        format!("CC={}", tc.cc),
        format!("CFLAGS={} {}", tc.cflags, tc.cppflags),
        format!("AR={}", tc.ar),
        format!("RANLIB={}", tc.ranlib),
    ];

    let mut make = ctx.command("make");
    make.current_dir(ctx.src_dir)
        .arg(format!("-j{}", ctx.jobs))
        .args(&assignments)
        .args(&config.args);
    run_tool(&mut make, "make").await?;

    let mut install = ctx.command("make");
    install
        .current_dir(ctx.src_dir)
        .args(&assignments)
        .arg(format!("PREFIX={}", tc.install_prefix.display()))
        .arg(&config.install_target);
    run_tool(&mut install, "make install").await?;

    Ok(())
}
