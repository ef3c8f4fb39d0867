//! Meson adapter
//!
//! Renders a cross file describing the toolchain, then drives
//! `meson setup` and `ninja install`.

use crossforge_toolchain::{split_launcher, Toolchain};

use crate::recipe::BuildContext;
use crate::{run_tool, BuildError};

/// Configuration payload for meson builds
#[derive(Debug, Clone, Default)]
pub struct MesonConfig {
    /// Extra `-Dkey=value` project options
    pub options: Vec<String>,
}

impl MesonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one project option
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.push(format!("-D{}={}", key, value));
        self
    }
}

fn quote_list(flags: &str) -> String {
    flags
        .split_whitespace()
        .map(|f| format!("'{}'", f))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A launcher-prefixed compiler becomes a meson argument array
fn binary_entry(command: &str) -> String {
    match split_launcher(command) {
        (Some(launcher), program) => format!("['{}', '{}']", launcher, program),
        (None, program) => format!("'{}'", program),
    }
}

/// Render the meson cross file for this toolchain
pub fn cross_file_contents(tc: &Toolchain) -> String {
    let system = if tc.is_android {
        "android"
    } else if tc.is_windows {
        "windows"
    } else if tc.is_darwin {
        "darwin"
    } else {
        "linux"
    };

    let c_args = quote_list(&format!("{} {}", tc.cflags, tc.cppflags));
    let cpp_args = quote_list(&format!("{} {}", tc.cxxflags, tc.cppflags));
    let link_args = quote_list(&format!("{} {}", tc.ldflags, tc.libs));

    format!(
        "[binaries]\n\
         c = {cc}\n\
         cpp = {cxx}\n\
         ar = '{ar}'\n\
         strip = '{strip}'\n\
         pkg-config = '{pkg_config}'\n\
         \n\
         [properties]\n\
         c_args = [{c_args}]\n\
         c_link_args = [{link_args}]\n\
         cpp_args = [{cpp_args}]\n\
         cpp_link_args = [{link_args}]\n\
         \n\
         [host_machine]\n\
         system = '{system}'\n\
         cpu_family = '{cpu_family}'\n\
         cpu = '{cpu}'\n\
         endian = 'little'\n",
        cc = binary_entry(&tc.cc),
        cxx = binary_entry(&tc.cxx),
        ar = tc.ar,
        strip = tc.strip,
        pkg_config = tc.pkg_config.display(),
        c_args = c_args,
        cpp_args = cpp_args,
        link_args = link_args,
        system = system,
        cpu_family = tc.cpu_family(),
        cpu = tc.cpu(),
    )
}

pub(crate) async fn build(ctx: &BuildContext<'_>, config: &MesonConfig) -> Result<(), BuildError> {
    let tc = ctx.toolchain;

    let mut cmd = ctx.command("meson");
    cmd.arg("setup")
        .arg(ctx.build_dir)
        .arg(ctx.src_dir)
        .arg(format!("--prefix={}", tc.install_prefix.display()))
        // flags come from the cross file, not from a buildtype profile
        .arg("--buildtype=plain")
        .arg("-Ddefault_library=static");

    if tc.is_cross() {
        let name = ctx
            .build_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("target");
        let cross_file = ctx
            .build_dir
            .parent()
            .unwrap_or(ctx.build_dir)
            .join(format!("{}.cross", name));
        tokio::fs::write(&cross_file, cross_file_contents(tc)).await?;
        cmd.arg(format!("--cross-file={}", cross_file.display()));
    }

    cmd.args(&config.options);
    run_tool(&mut cmd, "meson").await?;

    let mut ninja = ctx.command("ninja");
    ninja
        .arg("-C")
        .arg(ctx.build_dir)
        .arg(format!("-j{}", ctx.jobs))
        .arg("install");
    run_tool(&mut ninja, "ninja").await?;

    Ok(())
}
