//! A hand-declared tier, resolved through a loader that only knows some of
//! its commands.

use std::cell::RefCell;
use std::ffi::{c_char, CStr};

use vk_dispatch::{fnv1a_64, DispatchTable, Error, Slot, Slots, Tier, VoidFunction};

vk_dispatch::dispatch_commands! {
    #[tier = Global]
    mod stub {
        X;
        Y;
        W;
    }
}

thread_local! {
    static ASKED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

unsafe extern "system" fn x() {}

unsafe extern "system" fn y() {}

unsafe extern "system" fn loader(name: *const c_char) -> Slot {
    // SAFETY: names come from the generated `CStr` constants.
    let name = unsafe { CStr::from_ptr(name) }.to_str().unwrap_or_default();
    ASKED.with(|asked| asked.borrow_mut().push(name.to_owned()));
    match name {
        "X" => Some(x as VoidFunction),
        "Y" => Some(y as VoidFunction),
        _ => None,
    }
}

fn table() -> Slots<stub::Command, { stub::COUNT }> {
    // SAFETY: the loader only reads the NUL-terminated name.
    Slots::resolve_names(|name| unsafe { loader(name.as_ptr()) })
}

#[test]
fn ordinals_follow_declaration_order() {
    assert_eq!(stub::COUNT, 3);
    assert_eq!(stub::Command::X.index(), 0);
    assert_eq!(stub::Command::W.index(), 2);
    assert_eq!(
        stub::Command::ALL,
        [stub::Command::X, stub::Command::Y, stub::Command::W]
    );
    assert_eq!(stub::Command::W.name(), c"W");
}

#[test]
fn resolves_in_ordinal_order() {
    ASKED.with(|asked| asked.borrow_mut().clear());
    let slots = table();
    let asked = ASKED.with(|asked| asked.borrow().clone());
    assert_eq!(asked, ["X", "Y", "W"]);
    assert_eq!(slots.resolved(), 2);
}

#[test]
fn answered_commands_agree_across_lookups() {
    let slots = table();
    for (command, name) in [(stub::Command::X, "X"), (stub::Command::Y, "Y")] {
        let by_command = slots.get(command).unwrap();
        let by_hash = slots.get_by_hash(fnv1a_64(name.as_bytes())).unwrap();
        assert!(by_command.is_some());
        assert_eq!(by_command, by_hash);
    }
}

#[test]
fn compiled_in_but_unanswered_is_null() {
    let slots = table();
    assert_eq!(slots.get(stub::Command::W), Ok(&None));
    assert_eq!(slots.get_by_name("W"), Some(&None));
}

#[test]
fn commands_outside_the_tier_are_absent() {
    let slots = table();
    let hash = fnv1a_64(b"Z");
    assert!(slots.get_by_hash(hash).is_none());
    assert_eq!(
        stub::to_command(hash),
        Err(Error::UnknownHash {
            tier: Tier::Global,
            hash
        })
    );
    // Hashing stops at the first NUL.
    assert!(slots.get_by_name("X\0Y").is_some());
}
