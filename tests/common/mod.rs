//! A stub loader that plays the native library in table tests.
//!
//! Every loader call is recorded per thread so tests can check which loader
//! was asked for what, and in which order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use vk_dispatch::{Device, GetDeviceProcAddr, GetInstanceProcAddr, Instance, Slot, VoidFunction};

/// One recorded loader invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub loader: &'static str,
    pub handle: *mut c_void,
    pub name: String,
}

thread_local! {
    static CALLS: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
}

fn record(loader: &'static str, handle: *mut c_void, name: *const c_char) -> String {
    // SAFETY: tables always pass NUL-terminated names.
    let name = unsafe { CStr::from_ptr(name) }
        .to_str()
        .unwrap_or_default()
        .to_owned();
    CALLS.with(|calls| {
        calls.borrow_mut().push(Call {
            loader,
            handle,
            name: name.clone(),
        })
    });
    name
}

/// Drain the calls recorded on this thread.
pub fn take_calls() -> Vec<Call> {
    CALLS.with(|calls| calls.borrow_mut().drain(..).collect())
}

pub fn instance_handle() -> Instance {
    Instance::from_raw(ptr::without_provenance_mut(0x1000))
}

pub fn device_handle() -> Device {
    Device::from_raw(ptr::without_provenance_mut(0x2000))
}

pub fn erase_instance_loader(loader: GetInstanceProcAddr) -> VoidFunction {
    // SAFETY: function pointers share one representation.
    unsafe { std::mem::transmute::<GetInstanceProcAddr, VoidFunction>(loader) }
}

pub fn erase_device_loader(loader: GetDeviceProcAddr) -> VoidFunction {
    // SAFETY: function pointers share one representation.
    unsafe { std::mem::transmute::<GetDeviceProcAddr, VoidFunction>(loader) }
}

/// Address of a slot's pointer, 0 for null.
pub fn addr(slot: &Slot) -> usize {
    slot.map_or(0, |pfn| pfn as usize)
}

pub fn addr_of(pfn: VoidFunction) -> usize {
    pfn as usize
}

macro_rules! stub_commands {
    ($($name:ident),* $(,)?) => {
        $(
            pub unsafe extern "system" fn $name() {
                CALLS.with(|calls| {
                    calls.borrow_mut().push(Call {
                        loader: stringify!($name),
                        handle: ptr::null_mut(),
                        name: String::new(),
                    })
                });
            }
        )*
    };
}

stub_commands!(
    enumerate_instance_version,
    create_instance,
    destroy_instance,
    enumerate_physical_devices,
    create_device,
    trampoline_destroy_device,
    trampoline_get_device_queue,
    direct_destroy_device,
    direct_get_device_queue,
);

/// Answers global commands for a null instance, and instance plus
/// trampoline device commands for a non-null one.
pub unsafe extern "system" fn stub_get_instance_proc_addr(
    instance: Instance,
    name: *const c_char,
) -> Slot {
    let name = record("vkGetInstanceProcAddr", instance.as_raw(), name);
    let pfn: VoidFunction = match (instance.is_null(), name.as_str()) {
        (_, "vkGetInstanceProcAddr") => erase_instance_loader(stub_get_instance_proc_addr),
        (true, "vkEnumerateInstanceVersion") => enumerate_instance_version,
        (true, "vkCreateInstance") => create_instance,
        (false, "vkDestroyInstance") => destroy_instance,
        (false, "vkEnumeratePhysicalDevices") => enumerate_physical_devices,
        (false, "vkCreateDevice") => create_device,
        (false, "vkGetDeviceProcAddr") => erase_device_loader(trampoline_get_device_proc_addr),
        (false, "vkDestroyDevice") => trampoline_destroy_device,
        (false, "vkGetDeviceQueue") => trampoline_get_device_queue,
        _ => return None,
    };
    Some(pfn)
}

/// The instance-level `vkGetDeviceProcAddr`; hands out the direct loader
/// when asked for itself with a device.
pub unsafe extern "system" fn trampoline_get_device_proc_addr(
    device: Device,
    name: *const c_char,
) -> Slot {
    let name = record("trampoline_get_device_proc_addr", device.as_raw(), name);
    let pfn: VoidFunction = match name.as_str() {
        "vkGetDeviceProcAddr" if !device.is_null() => {
            erase_device_loader(direct_get_device_proc_addr)
        }
        "vkGetDeviceProcAddr" => erase_device_loader(trampoline_get_device_proc_addr),
        "vkDestroyDevice" => trampoline_destroy_device,
        "vkGetDeviceQueue" => trampoline_get_device_queue,
        _ => return None,
    };
    Some(pfn)
}

/// The device-specific `vkGetDeviceProcAddr`.
pub unsafe extern "system" fn direct_get_device_proc_addr(
    device: Device,
    name: *const c_char,
) -> Slot {
    let name = record("direct_get_device_proc_addr", device.as_raw(), name);
    let pfn: VoidFunction = match name.as_str() {
        "vkGetDeviceProcAddr" => erase_device_loader(direct_get_device_proc_addr),
        "vkDestroyDevice" => direct_destroy_device,
        "vkGetDeviceQueue" => direct_get_device_queue,
        _ => return None,
    };
    Some(pfn)
}

/// Like [`stub_get_instance_proc_addr`], but its device loader never hands
/// out a more specific loader.
pub unsafe extern "system" fn legacy_get_instance_proc_addr(
    instance: Instance,
    name: *const c_char,
) -> Slot {
    let name = record("legacy_get_instance_proc_addr", instance.as_raw(), name);
    let pfn: VoidFunction = match (instance.is_null(), name.as_str()) {
        (_, "vkGetInstanceProcAddr") => erase_instance_loader(legacy_get_instance_proc_addr),
        (false, "vkGetDeviceProcAddr") => erase_device_loader(legacy_get_device_proc_addr),
        _ => return None,
    };
    Some(pfn)
}

pub unsafe extern "system" fn legacy_get_device_proc_addr(
    device: Device,
    name: *const c_char,
) -> Slot {
    let name = record("legacy_get_device_proc_addr", device.as_raw(), name);
    match name.as_str() {
        "vkDestroyDevice" => Some(trampoline_destroy_device as VoidFunction),
        _ => None,
    }
}

/// Answers nothing but itself.
pub unsafe extern "system" fn empty_get_instance_proc_addr(
    instance: Instance,
    name: *const c_char,
) -> Slot {
    let name = record("empty_get_instance_proc_addr", instance.as_raw(), name);
    match name.as_str() {
        "vkGetInstanceProcAddr" => Some(erase_instance_loader(empty_get_instance_proc_addr)),
        _ => None,
    }
}
