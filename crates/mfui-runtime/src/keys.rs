#![forbid(unsafe_code)]

//! Document-level key listeners.
//!
//! [`KeyListeners`] is the registry global keyboard observers subscribe to.
//! The host's event loop feeds every key event through
//! [`dispatch`](KeyListeners::dispatch). Each [`KeySubscription`] removes its
//! listener exactly once, either via [`unsubscribe`](KeySubscription::unsubscribe)
//! or on drop.
//!
//! # Re-entrancy
//!
//! `dispatch` snapshots the live listeners before calling any of them. A
//! listener may drop its own subscription (or subscribe new listeners) while
//! the dispatch runs; changes take effect from the next dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mfui_core::event::KeyEvent;

type Listener = dyn Fn(&KeyEvent);

thread_local! {
    static GLOBAL_LISTENERS: KeyListeners = KeyListeners::new();
}

/// Shared registry of global key listeners.
#[derive(Clone, Default)]
pub struct KeyListeners {
    listeners: Rc<RefCell<Vec<Weak<Listener>>>>,
}

impl fmt::Debug for KeyListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyListeners")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

impl KeyListeners {
    /// Create an isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The UI thread's document-level registry.
    pub fn global() -> Self {
        GLOBAL_LISTENERS.with(Clone::clone)
    }

    /// Add a listener. It stays registered while the returned guard lives.
    pub fn subscribe(&self, listener: impl Fn(&KeyEvent) + 'static) -> KeySubscription {
        let listener: Rc<Listener> = Rc::new(listener);
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|w| w.strong_count() > 0);
        listeners.push(Rc::downgrade(&listener));
        tracing::trace!(
            target: "mfui_runtime::keys",
            count = listeners.len(),
            "key listener subscribed"
        );
        KeySubscription {
            listener: Some(listener),
        }
    }

    /// Deliver `event` to every live listener. Returns how many ran.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        let snapshot: Vec<Rc<Listener>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Whether two handles share the same registry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.listeners, &other.listeners)
    }
}

/// RAII registration of one key listener.
#[must_use = "dropping the subscription removes the listener immediately"]
pub struct KeySubscription {
    listener: Option<Rc<Listener>>,
}

impl KeySubscription {
    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.listener.take();
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}

impl fmt::Debug for KeySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
