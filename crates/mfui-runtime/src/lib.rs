#![forbid(unsafe_code)]

//! Single-threaded runtime plumbing for mfui: reactive values, the global key
//! listener registry, and shared stores.

pub mod keys;
pub mod reactive;
pub mod store;

pub use keys::{KeyListeners, KeySubscription};
pub use reactive::{Observable, Subscription};
pub use store::{Store, Theme, ThemeStore, UnknownTheme};
