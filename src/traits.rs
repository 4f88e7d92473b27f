//! Traits shared by every command tier and dispatch table.

use core::ffi::CStr;
use core::fmt;
use core::hash::Hash;

use crate::error::{Error, Result};
use crate::ffi::Slot;
use crate::hash::{fnv1a_64, Digest};

/// The scope a command is resolved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Commands available without any handle.
    Global,
    /// Commands scoped to a `VkInstance`.
    Instance,
    /// Commands scoped to a `VkDevice`.
    Device,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::Instance => "instance-level",
            Self::Device => "device-level",
        })
    }
}

/// A closed enumeration of the commands compiled into one tier.
///
/// Implemented by the `Command` types that `dispatch_commands!` generates.
/// Ordinals (`index`) are only meaningful within one build configuration;
/// digests (`hash`) are stable across builds.
pub trait DispatchCommand: Copy + Eq + Hash + fmt::Debug + 'static {
    /// The tier this command set belongs to.
    const TIER: Tier;

    /// Number of compiled-in commands.
    const COUNT: usize;

    /// Every command, in ordinal order.
    const ALL: &'static [Self];

    /// Zero-based ordinal.
    fn index(self) -> usize;

    /// The API entry-point name, NUL-terminated for passing to a loader.
    fn name(self) -> &'static CStr;

    /// The API entry-point name.
    fn as_str(self) -> &'static str;

    /// The FNV-1a digest of [`name`](Self::name).
    fn hash(self) -> Digest;

    /// Map a digest back to a command, `None` if it is not compiled in.
    fn from_hash(hash: Digest) -> Option<Self>;

    /// Map an ordinal to a command, `None` if it is out of range.
    #[inline]
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Like [`from_hash`](Self::from_hash), but fails with
    /// [`Error::UnknownHash`].
    #[inline]
    fn try_from_hash(hash: Digest) -> Result<Self> {
        Self::from_hash(hash).ok_or(Error::UnknownHash {
            tier: Self::TIER,
            hash,
        })
    }

    /// Like [`from_index`](Self::from_index), but fails with
    /// [`Error::UnknownOrdinal`].
    #[inline]
    fn try_from_index(ordinal: usize) -> Result<Self> {
        Self::from_index(ordinal).ok_or(Error::UnknownOrdinal {
            tier: Self::TIER,
            ordinal,
        })
    }
}

/// The lookup surface shared by all dispatch tables.
///
/// There are two ways to address a slot. Ordinal lookups go through a
/// `Command` value and are plain array indexing. Hash lookups take a
/// [`Digest`] and go through the generated exhaustive match, which lets a
/// caller skip holding a `Command` at all at the cost of a `None` check.
pub trait DispatchTable {
    type Command: DispatchCommand;

    /// The slot array, one entry per command ordinal.
    fn slots(&self) -> &[Slot];

    /// Number of slots in this table.
    #[inline]
    fn size(&self) -> usize {
        self.slots().len()
    }

    /// Checked ordinal lookup.
    #[inline]
    fn get(&self, command: Self::Command) -> Result<&Slot> {
        self.get_ordinal(command.index())
    }

    /// Checked lookup by raw ordinal.
    #[inline]
    fn get_ordinal(&self, ordinal: usize) -> Result<&Slot> {
        let slots = self.slots();
        slots.get(ordinal).ok_or(Error::OrdinalOutOfRange {
            tier: <Self::Command as DispatchCommand>::TIER,
            ordinal,
            count: slots.len(),
        })
    }

    /// Unchecked ordinal lookup for hot paths.
    ///
    /// # Safety
    ///
    /// `command` must come from the same build configuration as this table,
    /// so that its ordinal is below [`size`](Self::size).
    #[inline]
    unsafe fn get_unchecked(&self, command: Self::Command) -> &Slot {
        // SAFETY: the caller guarantees the ordinal is in range.
        unsafe { self.slots().get_unchecked(command.index()) }
    }

    /// Hash lookup. Returns `None` for any digest not compiled into this tier.
    #[inline]
    fn get_by_hash(&self, hash: Digest) -> Option<&Slot> {
        <Self::Command as DispatchCommand>::from_hash(hash)
            .and_then(|command| self.slots().get(command.index()))
    }

    /// Hash lookup for a name only known at run time.
    #[inline]
    fn get_by_name(&self, name: &str) -> Option<&Slot> {
        self.get_by_hash(fnv1a_64(name.as_bytes()))
    }
}
