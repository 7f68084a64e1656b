#![forbid(unsafe_code)]

//! Dismissal triggers for an open overlay.
//!
//! The controller turns user gestures into close *requests*. It never closes
//! anything itself: `open` belongs to the caller, who decides whether to
//! honor a request by calling `set_open(false)` later.
//!
//! # Triggers
//!
//! | Gesture | Requests close when |
//! |---------|---------------------|
//! | Escape press (global) | armed and `close_on_escape` |
//! | Backdrop click | armed, `close_on_backdrop_click`, and the target *is* the backdrop |
//! | Close button click | armed |
//!
//! # Invariants
//!
//! - A key listener is registered iff the controller is armed.
//! - `arm()`/`disarm()` are idempotent, so redundant calls never register a
//!   second listener.
//! - One Escape press produces at most one request.
//! - Nothing is requested while disarmed.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use mfui_core::event::{KeyCode, PointerEvent};
use mfui_core::host::ElementId;
use mfui_runtime::keys::{KeyListeners, KeySubscription};

/// Why a close was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    EscapePressed,
    BackdropClicked,
    CloseButton,
}

/// Issues close requests for one overlay instance.
pub struct DismissalController {
    on_request_close: Rc<dyn Fn()>,
    keys: KeyListeners,
    subscription: Option<KeySubscription>,
    armed: Rc<Cell<bool>>,
    close_on_escape: Rc<Cell<bool>>,
}

impl fmt::Debug for DismissalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissalController")
            .field("armed", &self.armed.get())
            .field("close_on_escape", &self.close_on_escape.get())
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

impl DismissalController {
    /// Create a disarmed controller.
    pub fn new(on_request_close: Rc<dyn Fn()>, keys: KeyListeners) -> Self {
        Self {
            on_request_close,
            keys,
            subscription: None,
            armed: Rc::new(Cell::new(false)),
            close_on_escape: Rc::new(Cell::new(true)),
        }
    }

    /// Start listening. Returns `false` if already armed.
    pub fn arm(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }
        self.armed.set(true);

        let armed = Rc::clone(&self.armed);
        let close_on_escape = Rc::clone(&self.close_on_escape);
        let on_request_close = Rc::clone(&self.on_request_close);
        self.subscription = Some(self.keys.subscribe(move |event| {
            if armed.get() && close_on_escape.get() && event.is_press(KeyCode::Escape) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "mfui_widgets::modal",
                    reason = ?DismissReason::EscapePressed,
                    "close requested"
                );
                on_request_close();
            }
        }));
        true
    }

    /// Stop listening. Returns `false` if already disarmed.
    pub fn disarm(&mut self) -> bool {
        self.armed.set(false);
        match self.subscription.take() {
            Some(subscription) => {
                subscription.unsubscribe();
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Enable or disable Escape dismissal. Takes effect immediately.
    pub fn set_close_on_escape(&self, close: bool) {
        self.close_on_escape.set(close);
    }

    /// Handle a pointer activation somewhere in the overlay.
    ///
    /// Only a primary click whose innermost target is `backdrop` counts. A
    /// click on the panel, or anything inside it, never does.
    pub fn backdrop_activated(
        &self,
        event: &PointerEvent,
        backdrop: ElementId,
        close_on_backdrop_click: bool,
    ) -> Option<DismissReason> {
        if !close_on_backdrop_click || !event.is_primary_click() {
            return None;
        }
        if event.target != Some(backdrop) {
            return None;
        }
        self.request(DismissReason::BackdropClicked)
    }

    /// Handle activation of the header close button.
    pub fn close_button_activated(&self) -> Option<DismissReason> {
        self.request(DismissReason::CloseButton)
    }

    fn request(&self, reason: DismissReason) -> Option<DismissReason> {
        if !self.armed.get() {
            return None;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "mfui_widgets::modal", ?reason, "close requested");
        (self.on_request_close)();
        Some(reason)
    }
}

impl Drop for DismissalController {
    fn drop(&mut self) {
        self.disarm();
    }
}
