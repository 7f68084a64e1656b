#![forbid(unsafe_code)]

//! Capture and restore of the element focused before an overlay opened.
//!
//! [`FocusRestore`] holds at most one [`CapturedFocus`]. `capture()` records
//! the host's active element; `restore()` consumes the capture and tries to
//! put focus back.
//!
//! # Failure Modes
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Nothing captured (or already restored) | [`RestoreOutcome::NothingCaptured`] |
//! | Nothing was focused at capture time | [`RestoreOutcome::NoPreviousFocus`] |
//! | Element removed from the tree | [`RestoreOutcome::Detached`] |
//! | Element present but disabled/inert | [`RestoreOutcome::NotFocusable`] |
//! | Host refused to move focus | [`RestoreOutcome::Rejected`] |
//!
//! None of these are errors. Restore never panics and never reports failure
//! to the user.
//!
//! This does not trap focus or cycle tab order while an overlay is open.

use crate::host::{ElementId, FocusHost};

/// The element that held focus when an overlay opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedFocus {
    /// `None` when nothing was focused.
    pub element: Option<ElementId>,
}

/// Result of [`FocusRestore::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(ElementId),
    NothingCaptured,
    NoPreviousFocus,
    Detached(ElementId),
    NotFocusable(ElementId),
    Rejected(ElementId),
}

impl RestoreOutcome {
    /// Whether focus was moved back.
    #[inline]
    pub fn is_restored(self) -> bool {
        matches!(self, Self::Restored(_))
    }
}

/// Single-slot focus capture for one overlay instance.
#[derive(Debug, Clone, Default)]
pub struct FocusRestore {
    captured: Option<CapturedFocus>,
}

impl FocusRestore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host's currently focused element.
    ///
    /// A capture that is still live is replaced.
    pub fn capture<H: FocusHost + ?Sized>(&mut self, host: &H) -> CapturedFocus {
        let captured = CapturedFocus {
            element: host.active_element(),
        };
        if let Some(stale) = self.captured.replace(captured) {
            tracing::debug!(
                target: "mfui_core::focus",
                stale = ?stale.element,
                "replacing a focus capture that was never restored"
            );
        }
        captured
    }

    /// Consume the capture and try to move focus back to it.
    pub fn restore<H: FocusHost + ?Sized>(&mut self, host: &mut H) -> RestoreOutcome {
        let Some(captured) = self.captured.take() else {
            return RestoreOutcome::NothingCaptured;
        };
        let Some(id) = captured.element else {
            return RestoreOutcome::NoPreviousFocus;
        };

        let outcome = if !host.contains(id) {
            RestoreOutcome::Detached(id)
        } else if !host.is_focusable(id) {
            RestoreOutcome::NotFocusable(id)
        } else if host.focus(id) {
            RestoreOutcome::Restored(id)
        } else {
            RestoreOutcome::Rejected(id)
        };

        tracing::trace!(target: "mfui_core::focus", ?outcome, "focus restore");
        outcome
    }

    /// Drop the capture without restoring.
    pub fn discard(&mut self) -> Option<CapturedFocus> {
        self.captured.take()
    }

    /// Whether a capture is live.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.captured.is_some()
    }

    /// The live capture, if any.
    #[inline]
    pub fn captured(&self) -> Option<CapturedFocus> {
        self.captured
    }
}
