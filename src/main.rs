//! crossforge — cross-compilation dependency forge
//!
//! Entry point: parses the target and options, loads the run
//! configuration, and hands the declared dependency set to the
//! orchestrator.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crossforge::commands::{BuildCommand, StatusCommand};
use crossforge_core::Config;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn usage() -> ! {
    eprintln!(
        r"usage: crossforge [options] [command] <target>

commands:
    build      fetch, verify, and build every stale dependency (default)
    status     report which dependencies are installed and fresh

targets:
    armeabi-v7a | arm64-v8a | x86 | x86_64     (Android, needs --ndk)
    i686-w64-mingw32 | x86_64-w64-mingw32      (Windows via MinGW)

options:
    --config <file>      read configuration from <file>
    --work-dir <dir>     override the working tree root
    --ndk <dir>          Android NDK root
    --mingw-root <dir>   MinGW toolchain root (tools on PATH otherwise)
    --jobs <n>           parallel jobs for the underlying build tool
    --version            print the version and exit"
    );
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config_path: Option<PathBuf> = None;
    let mut work_dir: Option<PathBuf> = None;
    let mut ndk_path: Option<PathBuf> = None;
    let mut mingw_root: Option<PathBuf> = None;
    let mut jobs: Option<u32> = None;
    let mut positionals: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(args.next().unwrap_or_else(|| usage()))),
            "--work-dir" => work_dir = Some(PathBuf::from(args.next().unwrap_or_else(|| usage()))),
            "--ndk" => ndk_path = Some(PathBuf::from(args.next().unwrap_or_else(|| usage()))),
            "--mingw-root" => {
                mingw_root = Some(PathBuf::from(args.next().unwrap_or_else(|| usage())))
            }
            "--jobs" => {
                jobs = Some(
                    args.next()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(|| usage()),
                )
            }
            "--version" => {
                println!("crossforge {}", VERSION);
                return Ok(());
            }
            "-h" | "--help" => usage(),
            s if s.starts_with('-') => usage(),
            _ => positionals.push(arg),
        }
    }

    let mut config = match &config_path {
        Some(path) => Config::load_from(path).await?,
        None => Config::load().await?,
    };
    if let Some(dir) = work_dir {
        config.paths.work_dir = dir;
    }
    if let Some(path) = ndk_path {
        config.android.ndk_path = Some(path);
    }
    if let Some(path) = mingw_root {
        config.mingw.toolchain_path = Some(path);
    }
    if let Some(n) = jobs {
        config.build.jobs = Some(n);
    }

    info!("crossforge v{}", VERSION);

    match positionals.as_slice() {
        [target] => {
            BuildCommand {
                target: target.clone(),
            }
            .execute(&config)
            .await
        }
        [command, target] if command == "build" => {
            BuildCommand {
                target: target.clone(),
            }
            .execute(&config)
            .await
        }
        [command, target] if command == "status" => {
            StatusCommand {
                target: target.clone(),
            }
            .execute(&config)
            .await
        }
        _ => usage(),
    }
}
