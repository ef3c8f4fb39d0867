//! Core configuration and shared types for crossforge
//!
//! Holds the immutable run configuration (directory layout, build options,
//! toolchain locations) and the central error type. The configuration is
//! constructed once at startup and passed by reference; there is no
//! process-global path state.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
