//! Buffers handed to the host.
//!
//! The host releases everything we give it through `plugin_free_memory`, which calls `free`, so
//! every buffer here comes from `malloc`.

use std::ffi::{c_char, c_int};
use std::ptr;

use extinfo::utils::Truncatable;
use extinfo_plugin::MenuItem;

/// Size of the text and icon buffers of a menu item, including the terminator.
pub const MENU_BUFSZ: usize = 128;

/// A menu item as the host reads it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PluginMenuItem {
    /// Menu type, see [`MenuType`](extinfo_plugin::MenuType).
    pub kind: c_int,
    /// Id passed back when the item is triggered.
    pub id: c_int,
    /// NUL terminated label.
    pub text: [c_char; MENU_BUFSZ],
    /// NUL terminated icon file name, empty for none.
    pub icon: [c_char; MENU_BUFSZ],
}

impl PluginMenuItem {
    /// Converts a menu item, truncating its text and icon to fit.
    pub fn new(item: &MenuItem) -> Self {
        Self {
            kind: item.kind.as_raw(),
            id: item.id,
            text: fixed_c_string(&item.text),
            icon: fixed_c_string(&item.icon),
        }
    }
}

fn fixed_c_string(text: &str) -> [c_char; MENU_BUFSZ] {
    let mut buffer = [0; MENU_BUFSZ];
    let bytes = text
        .truncate_to_bytes(MENU_BUFSZ - 1)
        .bytes()
        .take_while(|&byte| byte != 0);

    for (slot, byte) in buffer.iter_mut().zip(bytes) {
        *slot = c_char::from_ne_bytes([byte]);
    }

    buffer
}

/// Copies `text` into a new NUL terminated buffer.
///
/// The text ends at its first NUL byte, if any. Returns null if the allocation fails.
pub fn c_string(text: &str) -> *mut c_char {
    let bytes = text.as_bytes();
    let len = bytes.iter().position(|&byte| byte == 0).unwrap_or(bytes.len());

    // SAFETY: plain allocation, checked for null below
    let buffer = unsafe { libc::malloc(len + 1) }.cast::<c_char>();

    if buffer.is_null() {
        return buffer;
    }

    // SAFETY: the buffer holds `len + 1` bytes and does not overlap `text`
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buffer, len);
        buffer.add(len).write(0);
    }

    buffer
}

/// Builds a NULL terminated array of menu items.
///
/// The array and every item are separate allocations. Returns null if any allocation fails, in
/// which case nothing is leaked.
pub fn menu_items(items: &[MenuItem]) -> *mut *mut PluginMenuItem {
    // SAFETY: plain allocation, checked for null below
    let array = unsafe { libc::malloc(size_of::<*mut PluginMenuItem>() * (items.len() + 1)) }
        .cast::<*mut PluginMenuItem>();

    if array.is_null() {
        return array;
    }

    for (index, item) in items.iter().enumerate() {
        // SAFETY: plain allocation, checked for null below
        let entry = unsafe { libc::malloc(size_of::<PluginMenuItem>()) }.cast::<PluginMenuItem>();

        // SAFETY: `array` holds `items.len() + 1` pointers and `entry` is either null, ending
        // the array early, or large enough for one item
        unsafe {
            array.add(index).write(entry);

            if entry.is_null() {
                free_menu_items(array);
                return ptr::null_mut();
            }

            entry.write(PluginMenuItem::new(item));
        }
    }

    // SAFETY: the last slot is within the allocation
    unsafe { array.add(items.len()).write(ptr::null_mut()) };

    array
}

/// Releases an array built by [`menu_items`].
///
/// # Safety
///
/// `array` must come from [`menu_items`] and must not be used afterwards.
pub unsafe fn free_menu_items(array: *mut *mut PluginMenuItem) {
    let mut index = 0;

    // SAFETY: the array is NULL terminated and every entry came from malloc
    unsafe {
        loop {
            let entry = array.add(index).read();

            if entry.is_null() {
                break;
            }

            libc::free(entry.cast());
            index += 1;
        }

        libc::free(array.cast());
    }
}
