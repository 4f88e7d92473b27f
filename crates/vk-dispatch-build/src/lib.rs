//! Build-time utilities for vk-dispatch.
//!
//! This crate provides tools for:
//! - Parsing `commands.toml`, the ordered list of known command names per tier
//! - Selecting optional extensions from the enabled cargo features
//! - Generating Rust code with the `dispatch_commands!` macro
//!
//! # Usage in build.rs
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     let out_dir = std::env::var("OUT_DIR").unwrap();
//!     let output = std::path::Path::new(&out_dir).join("commands.rs");
//!     vk_dispatch_build::generate_for_cargo("commands.toml", output)
//!         .expect("Failed to generate dispatch commands");
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [global]
//! commands = ["vkGetInstanceProcAddr", "vkCreateInstance"]
//!
//! [instance]
//! commands = ["vkDestroyInstance"]
//!
//! [device]
//! commands = ["vkGetDeviceProcAddr", "vkDestroyDevice"]
//!
//! [[extensions]]
//! name = "VK_KHR_swapchain"
//! feature = "khr_swapchain"
//! requires = ["VK_KHR_surface"]
//! device = ["vkCreateSwapchainKHR"]
//! ```
//!
//! Each extension is compiled in when its cargo feature is enabled. Ordinals
//! therefore change between feature sets; name digests do not.

mod codegen;
mod resolve;
mod toml_parser;

pub use codegen::generate_dispatch_code;
pub use resolve::{fnv1a_64, ResolvedCommands};
pub use toml_parser::{
    CommandTier, CommandsConfig, ConfigError, Extension, DEVICE_LOADER, GLOBAL_LOADER,
};

use std::path::Path;

use thiserror::Error;

/// Generate the command modules for the features `enabled` reports as on.
///
/// # Arguments
///
/// * `config_path` - Path to `commands.toml`
/// * `output_path` - Path of the Rust file to write
/// * `enabled` - Whether a cargo feature name is enabled
///
/// # Errors
///
/// Returns an error if:
/// - `commands.toml` cannot be read, parsed, or validated
/// - An enabled extension requires one that is not enabled
/// - Two compiled-in names of one tier share a digest
/// - The output file cannot be written
pub fn generate(
    config_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    enabled: impl Fn(&str) -> bool,
) -> Result<ResolvedCommands, GenerateError> {
    let config = CommandsConfig::from_file(config_path)?;
    let resolved = ResolvedCommands::resolve(&config, enabled)?;

    let output_path = output_path.as_ref();
    let code = generate_dispatch_code(&resolved);
    std::fs::write(output_path, code).map_err(|source| GenerateError::Write {
        path: output_path.display().to_string(),
        source,
    })?;

    Ok(resolved)
}

/// Generate from within a build script, reading features from the
/// `CARGO_FEATURE_*` environment variables cargo sets.
pub fn generate_for_cargo(
    config_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<ResolvedCommands, GenerateError> {
    let config_path = config_path.as_ref();
    println!("cargo:rerun-if-changed={}", config_path.display());

    generate(config_path, output_path, |feature| {
        std::env::var_os(cargo_feature_var(feature)).is_some()
    })
}

/// The environment variable cargo sets for an enabled feature.
///
/// ```
/// assert_eq!(vk_dispatch_build::cargo_feature_var("khr-swapchain"), "CARGO_FEATURE_KHR_SWAPCHAIN");
/// ```
pub fn cargo_feature_var(feature: &str) -> String {
    format!(
        "CARGO_FEATURE_{}",
        feature.to_ascii_uppercase().replace('-', "_")
    )
}

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Failed to read, parse, or validate commands.toml
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Failed to write the generated file
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
