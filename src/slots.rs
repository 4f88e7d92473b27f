//! Fixed-size slot arrays and typed slot access.

use core::ffi::CStr;
use core::fmt;
use core::marker::PhantomData;

use crate::ffi::{Slot, VoidFunction};
use crate::traits::{DispatchCommand, DispatchTable};

/// One resolved function pointer per command of tier `C`.
///
/// `N` must equal `C::COUNT`; this is checked when the array is resolved.
pub struct Slots<C: DispatchCommand, const N: usize> {
    pfns: [Slot; N],
    _command: PhantomData<C>,
}

impl<C: DispatchCommand, const N: usize> Slots<C, N> {
    /// Resolve every command of `C` through `resolve`, in ordinal order.
    ///
    /// `resolve` receives the NUL-terminated command name and its result is
    /// stored as-is; null results are not rejected.
    pub fn resolve(mut resolve: impl FnMut(C) -> Slot) -> Self {
        const {
            assert!(N == C::COUNT, "slot count must match the command count");
        }
        let mut pfns = [None; N];
        for (pfn, &command) in pfns.iter_mut().zip(C::ALL) {
            *pfn = resolve(command);
            if pfn.is_none() {
                tracing::trace!(tier = %C::TIER, command = command.as_str(), "unresolved command");
            }
        }
        Self {
            pfns,
            _command: PhantomData,
        }
    }

    /// Resolve by name only.
    pub fn resolve_names(mut resolve: impl FnMut(&'static CStr) -> Slot) -> Self {
        Self::resolve(|command| resolve(command.name()))
    }

    /// Number of non-null slots.
    pub fn resolved(&self) -> usize {
        self.pfns.iter().filter(|pfn| pfn.is_some()).count()
    }
}

impl<C: DispatchCommand, const N: usize> Clone for Slots<C, N> {
    fn clone(&self) -> Self {
        Self {
            pfns: self.pfns,
            _command: PhantomData,
        }
    }
}

impl<C: DispatchCommand, const N: usize> fmt::Debug for Slots<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots")
            .field("tier", &C::TIER)
            .field("size", &N)
            .field("resolved", &self.resolved())
            .finish()
    }
}

impl<C: DispatchCommand, const N: usize> DispatchTable for Slots<C, N> {
    type Command = C;

    #[inline]
    fn slots(&self) -> &[Slot] {
        &self.pfns
    }
}

/// Reinterpret a slot as a typed function pointer.
///
/// Returns `None` when the slot is null.
///
/// # Safety
///
/// `F` must be the function pointer type of the command stored in `slot`.
#[inline]
pub unsafe fn load<F: Copy>(slot: &Slot) -> Option<F> {
    const {
        assert!(
            size_of::<F>() == size_of::<VoidFunction>(),
            "F must be a function pointer type"
        );
    }
    // SAFETY: sizes match and the caller vouches for the signature.
    slot.map(|pfn| unsafe { core::mem::transmute_copy::<VoidFunction, F>(&pfn) })
}
