//! Tier 2: commands scoped to a `VkDevice`.
//!
//! A device table can be built four ways:
//!
//! | Constructor | Loader walked | Device set |
//! |---|---|---|
//! | [`Table::new`] | instance loader → `vkGetDeviceProcAddr` → asked again for itself with the device | yes |
//! | [`Table::from_instance`] | instance loader with the instance handle | no |
//! | [`Table::from_instance_table`] | same as `from_instance`, instance taken from the table | no |
//! | [`Table::with_device`] | the base table's own `vkGetDeviceProcAddr` slot | yes |
//!
//! Commands resolved without a device usually dispatch through a loader
//! trampoline. Resolving through the device-specific `vkGetDeviceProcAddr`
//! skips that indirection, which is why [`Table::new`] resolves the loader
//! twice.

use core::ffi::CStr;
use core::fmt;

use crate::error::{Error, Result};
use crate::ffi::{Device, GetDeviceProcAddr, GetInstanceProcAddr, HandleKind, Instance, Slot};
use crate::slots::{load, Slots};
use crate::traits::DispatchTable;
use crate::{global, instance};

pub use crate::commands::device::{hashes, to_command, to_hash, Command, COUNT};

const DEVICE_LOADER: &CStr = Command::vkGetDeviceProcAddr.name();

/// A dispatch table for device-level commands.
///
/// Holds copies of the instance handle and, when built for one, the device
/// handle. Neither is owned: both must outlive every use of the table and of
/// any pointer taken from it.
#[derive(Clone)]
pub struct Table {
    instance: Instance,
    device: Device,
    pfns: Slots<Command, COUNT>,
}

impl Table {
    /// Resolve every device-level command for `device`.
    ///
    /// The instance loader yields an instance-level `vkGetDeviceProcAddr`,
    /// which is then asked for the device's own `vkGetDeviceProcAddr`. The
    /// second loader is used for every command. If it comes back null the
    /// first one is used instead.
    ///
    /// # Errors
    ///
    /// [`Error::NullHandle`] if `device` is null.
    pub fn new(global: &global::Table, instance: &instance::Table, device: Device) -> Result<Self> {
        if device.is_null() {
            return Err(Error::NullHandle {
                handle: HandleKind::Device,
            });
        }

        let loader = device_loader(global.loader(), instance.instance()).and_then(|first| {
            // SAFETY: `device` is a live handle of this instance.
            let second = unsafe {
                let slot = first(device, DEVICE_LOADER.as_ptr());
                load::<GetDeviceProcAddr>(&slot)
            };
            if second.is_none() {
                tracing::warn!(?device, "no device-specific loader, using the instance-level one");
            }
            second.or(Some(first))
        });

        Ok(Self::resolve_with(loader, instance.instance(), device))
    }

    /// Resolve every device-level command through the instance loader,
    /// without a device.
    ///
    /// The resulting table has no device handle and can later be specialized
    /// with [`with_device`](Self::with_device).
    ///
    /// # Errors
    ///
    /// [`Error::NullHandle`] if `instance` is null.
    pub fn from_instance(global: &global::Table, instance: Instance) -> Result<Self> {
        if instance.is_null() {
            return Err(Error::NullHandle {
                handle: HandleKind::Instance,
            });
        }
        Ok(Self::resolve_from_instance(global.loader(), instance))
    }

    /// Same as [`from_instance`](Self::from_instance), using the instance
    /// captured by `instance`.
    pub fn from_instance_table(global: &global::Table, instance: &instance::Table) -> Self {
        Self::resolve_from_instance(global.loader(), instance.instance())
    }

    /// Specialize a device-less table for `device`, resolving through the
    /// base table's own `vkGetDeviceProcAddr` slot.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigurationConflict`] if `base` already has a device, and
    /// [`Error::NullHandle`] if `device` is null.
    pub fn with_device(base: &Table, device: Device) -> Result<Self> {
        if !base.device.is_null() {
            return Err(Error::ConfigurationConflict);
        }
        if device.is_null() {
            return Err(Error::NullHandle {
                handle: HandleKind::Device,
            });
        }

        let slot = &base.pfns.slots()[Command::vkGetDeviceProcAddr.index()];
        // SAFETY: the slot was resolved for `vkGetDeviceProcAddr`.
        let loader = unsafe { load::<GetDeviceProcAddr>(slot) };
        Ok(Self::resolve_with(loader, base.instance, device))
    }

    /// The instance this table was built for.
    #[inline]
    pub fn instance(&self) -> Instance {
        self.instance
    }

    /// The device this table was built for, null if it has none.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    fn resolve_with(loader: Option<GetDeviceProcAddr>, instance: Instance, device: Device) -> Self {
        let pfns: Slots<Command, COUNT> = match loader {
            Some(loader) => Slots::resolve_names(|name| {
                // SAFETY: `device` is a live handle and names are NUL-terminated.
                unsafe { loader(device, name.as_ptr()) }
            }),
            None => {
                tracing::warn!(?device, "no device loader available, every slot is null");
                Slots::resolve(|_| None)
            }
        };

        tracing::debug!(
            tier = "device",
            ?instance,
            ?device,
            size = COUNT,
            resolved = pfns.resolved(),
            "populated dispatch table"
        );
        Self {
            instance,
            device,
            pfns,
        }
    }

    fn resolve_from_instance(loader: GetInstanceProcAddr, instance: Instance) -> Self {
        let pfns: Slots<Command, COUNT> = Slots::resolve_names(|name| {
            // SAFETY: `instance` is a live handle and names are NUL-terminated.
            unsafe { loader(instance, name.as_ptr()) }
        });

        tracing::debug!(
            tier = "device",
            ?instance,
            size = COUNT,
            resolved = pfns.resolved(),
            "populated dispatch table"
        );
        Self {
            instance,
            device: Device::null(),
            pfns,
        }
    }
}

/// Ask the instance loader for the instance-level `vkGetDeviceProcAddr`.
fn device_loader(loader: GetInstanceProcAddr, instance: Instance) -> Option<GetDeviceProcAddr> {
    // SAFETY: `instance` is a live handle and the name is NUL-terminated.
    let slot = unsafe { loader(instance, DEVICE_LOADER.as_ptr()) };
    // SAFETY: the loader returned the pointer for `vkGetDeviceProcAddr`.
    unsafe { load::<GetDeviceProcAddr>(&slot) }
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
        f.debug_struct("device::Table")
            .field("instance", &self.instance)
            .field("device", &self.device)
            .field("slots", &self.pfns)
            .finish()
    }
}
