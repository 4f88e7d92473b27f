//! Raw handle and loader types shared with the native library.
//!
//! These mirror the C declarations closely enough to be passed straight through
//! FFI. The handles are identifiers only: nothing in this crate creates,
//! destroys, or extends the lifetime of the objects they refer to.

use core::ffi::{c_char, c_void};
use core::fmt;

/// Untyped native function pointer, the value stored in every slot.
pub type VoidFunction = unsafe extern "system" fn();

/// One table cell: a resolved function pointer, or `None` when the loader
/// returned null.
pub type Slot = Option<VoidFunction>;

/// `vkGetInstanceProcAddr`.
pub type GetInstanceProcAddr =
    unsafe extern "system" fn(instance: Instance, name: *const c_char) -> Slot;

/// `vkGetDeviceProcAddr`.
pub type GetDeviceProcAddr = unsafe extern "system" fn(device: Device, name: *const c_char) -> Slot;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(*mut c_void);

        // Plain identifiers; the native API synchronizes the objects themselves.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}

        impl $name {
            /// The null handle.
            #[inline]
            pub const fn null() -> Self {
                Self(core::ptr::null_mut())
            }

            /// Wrap a raw handle value.
            #[inline]
            pub const fn from_raw(raw: *mut c_void) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn as_raw(self) -> *mut c_void {
                self.0
            }

            #[inline]
            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:p})"), self.0)
            }
        }
    };
}

define_handle!(
    /// A `VkInstance` handle, the context that scopes instance-level tables.
    Instance
);
define_handle!(
    /// A `VkDevice` handle, the child that scopes device-level tables.
    Device
);

/// Which handle an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Instance,
    Device,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instance => "VkInstance",
            Self::Device => "VkDevice",
        })
    }
}
