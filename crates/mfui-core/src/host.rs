#![forbid(unsafe_code)]

//! Host document capabilities.
//!
//! The overlay code never talks to a concrete rendering technology. It needs
//! two capabilities from whatever hosts it:
//!
//! - [`FocusHost`]: read which element holds keyboard focus and move focus.
//! - [`ScrollSurface`]: toggle the "page scroll disabled" effect.
//!
//! A [`Document`] is anything providing both. The UI model is single-threaded,
//! so documents are shared as `Rc<RefCell<dyn Document>>` ([`SharedDocument`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque identity of an element in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Keyboard focus capability of a host document.
pub trait FocusHost {
    /// The element currently holding keyboard focus, if any.
    fn active_element(&self) -> Option<ElementId>;

    /// Whether the element is still attached to the tree.
    fn contains(&self, id: ElementId) -> bool;

    /// Whether the element can take focus right now.
    ///
    /// Hosts report `false` for disabled or inert elements. Detached elements
    /// are never focusable.
    fn is_focusable(&self, id: ElementId) -> bool;

    /// Move focus to `id`. Returns whether focus actually moved.
    fn focus(&mut self, id: ElementId) -> bool;
}

/// The document-level scroll container.
pub trait ScrollSurface {
    /// Apply the "page scroll disabled" effect.
    fn disable_scroll(&mut self);

    /// Revert the effect to whatever the page had before [`disable_scroll`].
    ///
    /// [`disable_scroll`]: ScrollSurface::disable_scroll
    fn restore_scroll(&mut self);
}

impl<S: ScrollSurface + ?Sized> ScrollSurface for Rc<RefCell<S>> {
    fn disable_scroll(&mut self) {
        self.borrow_mut().disable_scroll();
    }

    fn restore_scroll(&mut self) {
        self.borrow_mut().restore_scroll();
    }
}

/// A host document: focus plus scroll.
pub trait Document: FocusHost + ScrollSurface {}

impl<T: FocusHost + ScrollSurface + ?Sized> Document for T {}

/// Shared handle to a host document.
pub type SharedDocument = Rc<RefCell<dyn Document>>;

/// Wrap a concrete document into a [`SharedDocument`], keeping a typed handle.
///
/// Returns `(typed, shared)` where both point at the same document. Tests keep
/// the typed handle to inspect host state while the overlay uses the shared one.
pub fn share<D: Document + 'static>(document: D) -> (Rc<RefCell<D>>, SharedDocument) {
    let typed = Rc::new(RefCell::new(document));
    let shared: SharedDocument = typed.clone();
    (typed, shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId::new(7).to_string(), "el-7");
        assert_eq!(ElementId::new(7).get(), 7);
    }

    #[test]
    fn share_points_at_same_document() {
        struct Probe {
            disabled: bool,
        }
        impl FocusHost for Probe {
            fn active_element(&self) -> Option<ElementId> {
                None
            }
            fn contains(&self, _id: ElementId) -> bool {
                false
            }
            fn is_focusable(&self, _id: ElementId) -> bool {
                false
            }
            fn focus(&mut self, _id: ElementId) -> bool {
                false
            }
        }
        impl ScrollSurface for Probe {
            fn disable_scroll(&mut self) {
                self.disabled = true;
            }
            fn restore_scroll(&mut self) {
                self.disabled = false;
            }
        }

        let (typed, shared) = share(Probe { disabled: false });
        shared.borrow_mut().disable_scroll();
        assert!(typed.borrow().disabled);
    }
}
