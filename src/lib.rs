//! # Vulkan Dispatch Tables (vk-dispatch)
//!
//! Resolves Vulkan entry points once, through the loader functions, and
//! caches them in fixed-size tables.
//!
//! ## Design
//!
//! Commands are grouped into three tiers, each with its own table:
//!
//! ```text
//! global::Table    ── vkGetInstanceProcAddr(NULL, name)
//!      │
//!      ▼
//! instance::Table  ── vkGetInstanceProcAddr(instance, name)
//!      │
//!      ▼
//! device::Table    ── vkGetDeviceProcAddr(device, name)
//! ```
//!
//! Every table slot can be addressed two ways:
//!
//! - by `Command`, a closed per-tier enumeration; this is plain array indexing
//! - by [`Digest`], the FNV-1a hash of the command name; this goes through an
//!   exhaustive match generated at compile time and returns `None` for
//!   commands that are not compiled in
//!
//! Which commands exist, and at which ordinal, depends on the enabled
//! extension features. Digests depend only on the name.
//!
//! ```ignore
//! use vk_dispatch::{device, global, instance, load, DispatchTable};
//!
//! let gdt = global::Table::new(Some(vkGetInstanceProcAddr))?;
//! let idt = instance::Table::new(&gdt, vk_instance)?;
//! let ddt = device::Table::new(&gdt, &idt, vk_device)?;
//!
//! let destroy: Option<PFN_vkDestroyDevice> =
//!     unsafe { load(ddt.get(device::Command::vkDestroyDevice)?) };
//! let same = ddt.get_by_hash(device::hashes::vkDestroyDevice);
//! ```
//!
//! Tables never validate resolved pointers and never manage handle lifetimes.

extern crate self as vk_dispatch;

mod commands;
pub mod device;
pub mod error;
pub mod ffi;
pub mod global;
pub mod hash;
pub mod instance;
pub mod slots;
pub mod traits;

pub use error::{Error, Result};
pub use ffi::{
    Device, GetDeviceProcAddr, GetInstanceProcAddr, HandleKind, Instance, Slot, VoidFunction,
};
pub use hash::{fnv1a_64, Digest};
pub use slots::{load, Slots};
pub use traits::{DispatchCommand, DispatchTable, Tier};

pub use vk_dispatch_macro::dispatch_commands;

#[doc(hidden)]
pub mod __private {
    use std::borrow::Cow;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use crate::{fnv1a_64, DispatchCommand, Error, Result};

    pub use serde;

    /// Parse a command from its exact API name.
    pub fn command_from_str<C: DispatchCommand>(name: &str) -> Result<C> {
        let hash = fnv1a_64(name.as_bytes());
        C::from_hash(hash)
            .filter(|command| command.as_str() == name)
            .ok_or(Error::UnknownHash {
                tier: C::TIER,
                hash,
            })
    }

    /// Deserialize a command from its API name.
    pub fn deserialize_command<'de, C, D>(deserializer: D) -> std::result::Result<C, D::Error>
    where
        C: DispatchCommand,
        D: Deserializer<'de>,
    {
        let name = Cow::<'de, str>::deserialize(deserializer)?;
        command_from_str(&name)
            .map_err(|_| D::Error::custom(format!("unknown {} command `{}`", C::TIER, name)))
    }
}
