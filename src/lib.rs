//! crossforge — cross-compilation dependency forge
//!
//! Fetches, verifies, unpacks, patches, and builds a declared set of
//! third-party native libraries for cross-compilation targets (Android
//! NDK ABIs, Windows via MinGW), populating a per-target sysroot that a
//! downstream project configures against via pkg-config.
//!
//! ## Architecture
//!
//! crossforge is organized into specialized crates:
//!
//! - `crossforge-core`: immutable run configuration and shared errors
//! - `crossforge-toolchain`: Android NDK / MinGW toolchain descriptors
//! - `crossforge-build-engine`: fetch, verify, extract, patch, and the
//!   build-system adapters driven by the sequential orchestrator

#![warn(clippy::all)]

pub mod commands;
pub mod registry;

// Re-export main components for library usage
pub use crossforge_build_engine as build_engine;
pub use crossforge_core as core;
pub use crossforge_toolchain as toolchain;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crossforge_build_engine::{BuildKind, Orchestrator, Outcome, Recipe};
    pub use crossforge_core::Config;
    pub use crossforge_toolchain::{Abi, Toolchain};
}
