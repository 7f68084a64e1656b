#![forbid(unsafe_code)]

//! Reference-counted page scroll lock.
//!
//! Any number of overlays may want page scrolling disabled at the same time.
//! [`ScrollLock`] is the single service that owns the "scroll disabled"
//! resource and counts its holders:
//!
//! - [`ScrollLock::retain`] increments, and applies the effect only on 0→1.
//! - [`ScrollLock::release`] decrements, and reverts the effect only on 1→0.
//!
//! Overlays should not call those directly. [`ScrollLock::acquire`] returns a
//! [`ScrollLockToken`] that releases exactly once, either explicitly or from
//! `Drop`, so the lock is given back on every exit path including unwinding.
//!
//! # Invariants
//!
//! 1. `is_locked() == (holders() > 0)`.
//! 2. The holder count never underflows. A `release()` with no live holder is
//!    clamped: nothing changes, a warning is logged, and `false` is returned.
//! 3. The surface sees exactly one `disable_scroll` per 0→1 edge and exactly
//!    one `restore_scroll` per 1→0 edge.
//!
//! # Process-wide instance
//!
//! The UI runs on a single event thread. [`ScrollLock::global`] returns that
//! thread's service, so every overlay on the UI thread shares one counter.
//! Callers that want isolation (tests, embedded documents) create their own
//! with [`ScrollLock::new`] or [`ScrollLock::detached`].
//!
//! The surface is borrowed only while an edge is applied. Do not hold a
//! mutable borrow of the host document across `acquire` or token drop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::host::ScrollSurface;

thread_local! {
    static GLOBAL_LOCK: ScrollLock = ScrollLock::detached();
}

struct LockInner {
    holders: Cell<usize>,
    surface: RefCell<Option<Box<dyn ScrollSurface>>>,
}

/// Shared handle to a reference-counted scroll-lock service.
///
/// Clones share the same counter and surface.
#[derive(Clone)]
pub struct ScrollLock {
    inner: Rc<LockInner>,
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.inner.holders.get())
            .field("has_surface", &self.inner.surface.borrow().is_some())
            .finish()
    }
}

impl ScrollLock {
    /// Create a service that applies its effect to `surface`.
    pub fn new(surface: impl ScrollSurface + 'static) -> Self {
        Self {
            inner: Rc::new(LockInner {
                holders: Cell::new(0),
                surface: RefCell::new(Some(Box::new(surface))),
            }),
        }
    }

    /// Create a service with no surface. It only counts holders.
    pub fn detached() -> Self {
        Self {
            inner: Rc::new(LockInner {
                holders: Cell::new(0),
                surface: RefCell::new(None),
            }),
        }
    }

    /// The UI thread's shared service.
    pub fn global() -> Self {
        GLOBAL_LOCK.with(Clone::clone)
    }

    /// Point the global service at `surface`.
    ///
    /// Live holders are kept. If the lock is currently held, the effect is
    /// reverted on the old surface and applied to the new one.
    pub fn install_global(surface: impl ScrollSurface + 'static) {
        Self::global().set_surface(Some(Box::new(surface)));
    }

    /// Replace this service's surface, migrating an active effect.
    pub fn set_surface(&self, surface: Option<Box<dyn ScrollSurface>>) {
        let locked = self.is_locked();
        let mut slot = self.inner.surface.borrow_mut();
        if locked && let Some(old) = slot.as_mut() {
            old.restore_scroll();
        }
        *slot = surface;
        if locked && let Some(new) = slot.as_mut() {
            new.disable_scroll();
        }
    }

    /// Take the lock, returning a token that gives it back exactly once.
    pub fn acquire(&self) -> ScrollLockToken {
        self.retain();
        ScrollLockToken {
            lock: Some(self.clone()),
        }
    }

    /// Increment the holder count. Returns the new count.
    ///
    /// Prefer [`acquire`](Self::acquire), which pairs the matching release.
    pub fn retain(&self) -> usize {
        let holders = self.inner.holders.get() + 1;
        self.inner.holders.set(holders);
        if holders == 1 {
            self.with_surface(|s| s.disable_scroll());
            tracing::debug!(target: "mfui_core::scroll_lock", "page scroll disabled");
        }
        tracing::trace!(target: "mfui_core::scroll_lock", holders, "scroll lock retained");
        holders
    }

    /// Decrement the holder count.
    ///
    /// Returns `false` (and changes nothing) when there was no live holder.
    pub fn release(&self) -> bool {
        let current = self.inner.holders.get();
        if current == 0 {
            tracing::warn!(
                target: "mfui_core::scroll_lock",
                "scroll lock released without a live holder; ignoring"
            );
            return false;
        }
        let holders = current - 1;
        self.inner.holders.set(holders);
        if holders == 0 {
            self.with_surface(|s| s.restore_scroll());
            tracing::debug!(target: "mfui_core::scroll_lock", "page scroll restored");
        }
        tracing::trace!(target: "mfui_core::scroll_lock", holders, "scroll lock released");
        true
    }

    /// Number of live holders.
    #[inline]
    pub fn holders(&self) -> usize {
        self.inner.holders.get()
    }

    /// Whether page scroll is currently disabled by this service.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }

    /// Whether two handles share the same service.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn with_surface(&self, f: impl FnOnce(&mut dyn ScrollSurface)) {
        if let Some(surface) = self.inner.surface.borrow_mut().as_mut() {
            f(surface.as_mut());
        }
    }
}

/// Ownership of one scroll-lock hold.
///
/// Released by [`release`](Self::release) or on drop, whichever comes first.
#[must_use = "dropping the token releases the scroll lock"]
pub struct ScrollLockToken {
    lock: Option<ScrollLock>,
}

impl ScrollLockToken {
    /// Give the hold back now.
    pub fn release(mut self) {
        self.release_once();
    }

    /// The service this token holds.
    pub fn lock(&self) -> Option<&ScrollLock> {
        self.lock.as_ref()
    }

    fn release_once(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
    }
}

impl fmt::Debug for ScrollLockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockToken")
            .field("live", &self.lock.is_some())
            .finish()
    }
}

impl Drop for ScrollLockToken {
    fn drop(&mut self) {
        self.release_once();
    }
}
