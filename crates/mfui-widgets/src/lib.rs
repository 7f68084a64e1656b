#![forbid(unsafe_code)]

//! Overlay widgets for mfui.
//!
//! - [`node`]: the markup tree components produce.
//! - [`portal`]: attachment points that let output escape its caller.
//! - [`modal`]: the modal dialog and the overlay lifecycle beneath it.

pub mod modal;
pub mod node;
pub mod portal;

pub use modal::{
    DismissReason, Modal, ModalConfig, ModalSize, OverlayEnv, OverlayLifecycle, OverlayPhase,
    Transition,
};
pub use node::Node;
pub use portal::{AttachmentPoint, OwnerId, Placement, Portal, PortalError, PortalHost};
