#![forbid(unsafe_code)]

//! In-memory host document.
//!
//! `VirtualDocument` implements [`Document`](crate::host::Document) without a
//! real rendering backend. It tracks elements, focus, and the body overflow
//! style, and records every side effect applied to it in a journal so callers
//! can assert on ordering.
//!
//! # Invariants
//!
//! 1. `active_element()` is always `None` or an attached element.
//! 2. Removing the focused element clears focus.
//! 3. `restore_scroll()` reinstates the overflow value seen by the matching
//!    `disable_scroll()`, not a hard-coded default.

use std::collections::BTreeMap;

use crate::host::{ElementId, FocusHost, ScrollSurface};

/// Overflow value applied while scrolling is disabled.
pub const OVERFLOW_HIDDEN: &str = "hidden";

/// Side effect recorded by a [`VirtualDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEffect {
    /// Body overflow switched to hidden.
    ScrollDisabled,
    /// Body overflow restored to its previous value.
    ScrollRestored,
    /// Focus moved to the element.
    Focused(ElementId),
}

#[derive(Debug, Clone)]
struct ElementState {
    tag: String,
    disabled: bool,
}

/// Headless document used by tests and the demo front-end.
#[derive(Debug, Clone)]
pub struct VirtualDocument {
    elements: BTreeMap<ElementId, ElementState>,
    next_id: u64,
    active: Option<ElementId>,
    overflow: String,
    saved_overflow: Option<String>,
    journal: Vec<HostEffect>,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// Create an empty document with no body overflow style set.
    pub fn new() -> Self {
        Self::with_overflow("")
    }

    /// Create an empty document whose body starts with the given overflow style.
    pub fn with_overflow(overflow: impl Into<String>) -> Self {
        Self {
            elements: BTreeMap::new(),
            next_id: 1,
            active: None,
            overflow: overflow.into(),
            saved_overflow: None,
            journal: Vec::new(),
        }
    }

    /// Attach a new element and return its id.
    pub fn create_element(&mut self, tag: impl Into<String>) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            ElementState {
                tag: tag.into(),
                disabled: false,
            },
        );
        id
    }

    /// Detach an element. Returns `false` if it was not attached.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        if self.elements.remove(&id).is_none() {
            return false;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        true
    }

    /// Mark an element disabled (not focusable) or enabled again.
    ///
    /// Disabling the focused element blurs it.
    pub fn set_disabled(&mut self, id: ElementId, disabled: bool) {
        if let Some(state) = self.elements.get_mut(&id) {
            state.disabled = disabled;
            if disabled && self.active == Some(id) {
                self.active = None;
            }
        }
    }

    /// Drop keyboard focus without moving it anywhere.
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Tag name of an attached element.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).map(|e| e.tag.as_str())
    }

    /// Current body overflow style.
    pub fn overflow(&self) -> &str {
        &self.overflow
    }

    /// Whether page scroll is currently disabled.
    pub fn is_scroll_disabled(&self) -> bool {
        self.saved_overflow.is_some()
    }

    /// Side effects applied so far, oldest first.
    pub fn journal(&self) -> &[HostEffect] {
        &self.journal
    }

    /// Forget recorded side effects.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }
}

impl FocusHost for VirtualDocument {
    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    fn is_focusable(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| !e.disabled)
    }

    fn focus(&mut self, id: ElementId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        self.active = Some(id);
        self.journal.push(HostEffect::Focused(id));
        true
    }
}

impl ScrollSurface for VirtualDocument {
    fn disable_scroll(&mut self) {
        if self.saved_overflow.is_some() {
            return;
        }
        let previous = std::mem::replace(&mut self.overflow, OVERFLOW_HIDDEN.to_owned());
        self.saved_overflow = Some(previous);
        self.journal.push(HostEffect::ScrollDisabled);
    }

    fn restore_scroll(&mut self) {
        if let Some(previous) = self.saved_overflow.take() {
            self.overflow = previous;
            self.journal.push(HostEffect::ScrollRestored);
        }
    }
}
