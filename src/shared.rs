//! Ownership cell for state shared with interrupt handlers
//!
//! The usual pattern for handing a driver to an interrupt handler is a
//! `Mutex<RefCell<Option<T>>>` in a `static`, filled in once by `main`. [`IsrCell`] wraps that
//! pattern. Access goes through a critical section so handlers run to completion against the
//! foreground, and a nested access (a handler re-entering state that is already borrowed)
//! is refused rather than panicking.

use core::cell::RefCell;
use critical_section::Mutex;

/// `static`-friendly slot for a value used from both `main` and interrupt handlers.
pub struct IsrCell<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> Default for IsrCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IsrCell<T> {
    /// Create an empty cell
    pub const fn new() -> Self {
        IsrCell {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move `value` into the cell, returning the previous occupant.
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(value))
    }

    /// Move the value back out of the cell.
    pub fn remove(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the value inside a critical section.
    ///
    /// Returns `None` if nothing has been installed yet or if the value is already borrowed
    /// further up the call stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_yields_none() {
        let cell: IsrCell<u32> = IsrCell::new();
        assert_eq!(cell.with(|v| *v), None);
    }

    #[test]
    fn installed_value_is_reachable() {
        let cell = IsrCell::new();
        assert_eq!(cell.install(5u32), None);
        assert_eq!(cell.with(|v| {
            *v += 1;
            *v
        }), Some(6));
        assert_eq!(cell.remove(), Some(6));
    }

    #[test]
    fn nested_access_is_refused() {
        let cell = IsrCell::new();
        cell.install(1u8);
        let inner = cell.with(|_| cell.with(|v| *v));
        assert_eq!(inner, Some(None));
    }
}
