//! Critical-section cell for state touched by more than one interrupt.
//!
//! The button interrupt and the USB interrupt both update the report
//! bytes and the pending-press count.  Wrapping the [`super::HidDevice`]
//! in [`Shared`] makes every event handler run inside one critical
//! section, so no read-modify-write is ever split across the two contexts.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

pub struct Shared<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<T> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access, interrupts masked.
    ///
    /// `f` must not call `lock` on the same cell.
    pub fn lock<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
