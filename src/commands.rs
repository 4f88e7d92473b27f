//! The compiled-in command list, generated from `commands.toml` by the build
//! script for the enabled extension features.

include!(concat!(env!("OUT_DIR"), "/commands.rs"));
