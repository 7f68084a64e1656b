#![forbid(unsafe_code)]

//! Modal dialogs.
//!
//! - [`config`]: size and behavior options.
//! - [`dismiss`]: Escape, backdrop and close-button requests.
//! - [`lifecycle`]: the Closed/Open state machine that owns portal output,
//!   focus capture, the scroll lock and the key listener.
//! - [`container`]: the [`Modal`] component.
//!
//! Opening and closing is driven by the caller through `set_open`. Every
//! dismissal gesture only calls the caller's `on_close`.

pub mod config;
pub mod container;
pub mod dismiss;
pub mod lifecycle;

pub use config::{ModalConfig, ModalSize};
pub use container::{Modal, ModalIds};
pub use dismiss::{DismissReason, DismissalController};
pub use lifecycle::{OverlayEnv, OverlayLifecycle, OverlayPhase, Transition};
