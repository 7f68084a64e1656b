#![forbid(unsafe_code)]

//! Host abstractions and overlay side-effect primitives for mfui.
//!
//! - [`host`]: the document capabilities overlays depend on.
//! - [`virtual_document`]: an in-memory host.
//! - [`event`]: key and pointer events.
//! - [`scroll_lock`]: the reference-counted page scroll lock.
//! - [`focus`]: capture/restore of the previously focused element.

pub mod event;
pub mod focus;
pub mod host;
pub mod scroll_lock;
pub mod virtual_document;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use focus::{CapturedFocus, FocusRestore, RestoreOutcome};
pub use host::{Document, ElementId, FocusHost, ScrollSurface, SharedDocument, share};
pub use scroll_lock::{ScrollLock, ScrollLockToken};
pub use virtual_document::{HostEffect, VirtualDocument};
