//! Dispatch tables over an in-process stub loader.
//!
//! This example shows how to:
//! - Build the global, instance, and device tables from a loader function
//! - Look slots up by `Command` and by name digest
//! - Turn a slot back into a typed function pointer and call it
//!
//! Run with `RUST_LOG=vk_dispatch=trace` to see every unresolved slot.

use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use tracing_subscriber::EnvFilter;
use vk_dispatch::{
    device, fnv1a_64, global, instance, load, Device, DispatchTable, GetDeviceProcAddr, Instance,
    Slot, VoidFunction,
};

// =============================================================================
// A tiny "driver"
// =============================================================================

type PfnDestroyDevice = unsafe extern "system" fn(device: Device, allocator: *const c_void);

unsafe extern "system" fn destroy_device(device: Device, _allocator: *const c_void) {
    println!("  driver: destroying {device:?}");
}

unsafe extern "system" fn enumerate_instance_version() {}

unsafe extern "system" fn get_device_proc_addr(_device: Device, name: *const c_char) -> Slot {
    // SAFETY: tables pass NUL-terminated names.
    let name = unsafe { CStr::from_ptr(name) };
    // SAFETY: only the pointer type is erased.
    unsafe {
        match name.to_bytes() {
            b"vkGetDeviceProcAddr" => Some(std::mem::transmute::<GetDeviceProcAddr, VoidFunction>(
                get_device_proc_addr,
            )),
            b"vkDestroyDevice" => Some(std::mem::transmute::<PfnDestroyDevice, VoidFunction>(
                destroy_device,
            )),
            _ => None,
        }
    }
}

unsafe extern "system" fn get_instance_proc_addr(instance: Instance, name: *const c_char) -> Slot {
    // SAFETY: tables pass NUL-terminated names.
    let name = unsafe { CStr::from_ptr(name) };
    match (instance.is_null(), name.to_bytes()) {
        (true, b"vkEnumerateInstanceVersion") => Some(enumerate_instance_version as VoidFunction),
        (false, b"vkGetDeviceProcAddr") => {
            // SAFETY: only the pointer type is erased.
            Some(unsafe {
                std::mem::transmute::<GetDeviceProcAddr, VoidFunction>(get_device_proc_addr)
            })
        }
        _ => None,
    }
}

fn main() -> vk_dispatch::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let instance_handle = Instance::from_raw(ptr::without_provenance_mut(0x1000));
    let device_handle = Device::from_raw(ptr::without_provenance_mut(0x2000));

    // 1. Build the table chain
    let gdt = global::Table::new(Some(get_instance_proc_addr))?;
    let idt = instance::Table::new(&gdt, instance_handle)?;
    let ddt = device::Table::new(&gdt, &idt, device_handle)?;

    println!("Table sizes:");
    println!("  global:   {}", gdt.size());
    println!("  instance: {}", idt.size());
    println!("  device:   {}", ddt.size());
    println!();

    // 2. Ordinal and hash lookups
    println!("Lookups:");
    let by_command = ddt.get(device::Command::vkDestroyDevice)?;
    let by_hash = ddt.get_by_hash(device::hashes::vkDestroyDevice);
    println!("  vkDestroyDevice by ordinal: {by_command:?}");
    println!("  vkDestroyDevice by hash:    {by_hash:?}");
    println!(
        "  vkCreateInstance in device tier: {:?}",
        ddt.get_by_hash(fnv1a_64(b"vkCreateInstance"))
    );
    println!(
        "  vkQueueSubmit resolved: {}",
        ddt.get_by_name("vkQueueSubmit").is_some_and(Option::is_some)
    );
    println!();

    // 3. Typed call
    println!("Calling through the table:");
    // SAFETY: the slot was resolved for `vkDestroyDevice`.
    if let Some(destroy) = unsafe { load::<PfnDestroyDevice>(by_command) } {
        // SAFETY: the stub accepts any handle and a null allocator.
        unsafe { destroy(ddt.device(), ptr::null()) };
    }
    println!();

    // 4. An instance-scoped table, specialized later
    let base = device::Table::from_instance_table(&gdt, &idt);
    let specialized = device::Table::with_device(&base, device_handle)?;
    println!("Specialized table: {specialized:?}");
    if let Err(err) = device::Table::with_device(&specialized, device_handle) {
        println!("  specializing again: {err}");
    }

    Ok(())
}
