//! Tier 0: commands available before any instance exists.

use core::fmt;

use crate::error::{Error, Result};
use crate::ffi::{GetInstanceProcAddr, Instance, Slot, VoidFunction};
use crate::slots::{load, Slots};
use crate::traits::DispatchTable;

pub use crate::commands::global::{hashes, to_command, to_hash, Command, COUNT};

/// A dispatch table for global commands.
///
/// Populated once from the global loader (`vkGetInstanceProcAddr`) and
/// immutable afterwards. Duplicate it with [`Clone`].
#[derive(Clone)]
pub struct Table {
    pfns: Slots<Command, COUNT>,
}

impl Table {
    /// Resolve every global command through `loader`.
    ///
    /// Each command is resolved with a null instance handle. The loader's own
    /// slot is filled with `loader` directly instead of asking it for itself.
    ///
    /// # Errors
    ///
    /// [`Error::NullLoader`] if `loader` is `None`.
    pub fn new(loader: Option<GetInstanceProcAddr>) -> Result<Self> {
        let Some(loader) = loader else {
            return Err(Error::NullLoader);
        };
        // SAFETY: function pointers share one representation.
        let own = unsafe { core::mem::transmute::<GetInstanceProcAddr, VoidFunction>(loader) };

        let pfns: Slots<Command, COUNT> = Slots::resolve(|command| match command {
            Command::vkGetInstanceProcAddr => Some(own),
            // SAFETY: the loader accepts a null instance and a NUL-terminated name.
            _ => unsafe { loader(Instance::null(), command.name().as_ptr()) },
        });

        tracing::debug!(
            tier = "global",
            size = COUNT,
            resolved = pfns.resolved(),
            "populated dispatch table"
        );
        Ok(Self { pfns })
    }

    /// The global loader this table was built from.
    #[inline]
    pub fn loader(&self) -> GetInstanceProcAddr {
        let slot = &self.pfns.slots()[Command::vkGetInstanceProcAddr.index()];
        // SAFETY: the slot holds the loader passed to `new`.
        match unsafe { load::<GetInstanceProcAddr>(slot) } {
            Some(loader) => loader,
            None => unreachable!("the global loader slot is always populated"),
        }
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
        f.debug_struct("global::Table")
            .field("slots", &self.pfns)
            .finish()
    }
}
