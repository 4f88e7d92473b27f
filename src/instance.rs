//! Tier 1: commands scoped to a `VkInstance`.

use core::fmt;

use crate::error::{Error, Result};
use crate::ffi::{HandleKind, Instance, Slot};
use crate::global;
use crate::slots::Slots;
use crate::traits::DispatchTable;

pub use crate::commands::instance::{hashes, to_command, to_hash, Command, COUNT};

/// A dispatch table for instance-level commands.
///
/// Holds a copy of the instance handle it was built for. The table does not
/// own the instance: it must outlive every use of the table and of any
/// pointer taken from it.
#[derive(Clone)]
pub struct Table {
    instance: Instance,
    pfns: Slots<Command, COUNT>,
}

impl Table {
    /// Resolve every instance-level command for `instance` through the
    /// global loader held by `global`.
    ///
    /// # Errors
    ///
    /// [`Error::NullHandle`] if `instance` is null.
    pub fn new(global: &global::Table, instance: Instance) -> Result<Self> {
        if instance.is_null() {
            return Err(Error::NullHandle {
                handle: HandleKind::Instance,
            });
        }
        let loader = global.loader();
        let pfns: Slots<Command, COUNT> = Slots::resolve_names(|name| {
            // SAFETY: `instance` is a live handle and names are NUL-terminated.
            unsafe { loader(instance, name.as_ptr()) }
        });

        tracing::debug!(
            tier = "instance",
            ?instance,
            size = COUNT,
            resolved = pfns.resolved(),
            "populated dispatch table"
        );
        Ok(Self { instance, pfns })
    }

    /// The instance this table was built for.
    #[inline]
    pub fn instance(&self) -> Instance {
        self.instance
    }
}

impl DispatchTable for Table {
    type Command = Command;

    #[inline]
    fn slots(&self) -> &[Slot] {
        self.pfns.slots()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("instance::Table")
            .field("instance", &self.instance)
            .field("slots", &self.pfns)
            .finish()
    }
}
