#![forbid(unsafe_code)]

//! Opaque key-value stores shared by pages.
//!
//! A [`Store`] is a string map behind an [`Observable`]. Pages own and write
//! stores; components such as the modal only read them.
//!
//! [`ThemeStore`] is the typed view over the `theme` key used by every
//! dashboard front-end.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::reactive::{Observable, Subscription};

/// Observable string key-value store.
#[derive(Clone, Default)]
pub struct Store {
    entries: Observable<BTreeMap<String, String>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entries
            .with(|entries| f.debug_struct("Store").field("entries", entries).finish())
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.with(|entries| entries.get(key).cloned())
    }

    /// Write a value. Writing the current value does not notify.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.entries.update(|entries| {
            entries.insert(key, value);
        });
    }

    /// Remove a key, returning the old value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let old = self.get(key)?;
        self.entries.update(|entries| {
            entries.remove(key);
        });
        Some(old)
    }

    /// Observe every change to the store.
    pub fn subscribe(
        &self,
        callback: impl Fn(&BTreeMap<String, String>) + 'static,
    ) -> Subscription {
        self.entries.subscribe(callback)
    }

    /// Number of changes since creation.
    pub fn version(&self) -> u64 {
        self.entries.version()
    }
}

/// Color theme of the front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {}", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

/// Typed facade over the `theme` entry of a [`Store`].
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    store: Store,
}

impl ThemeStore {
    /// Store key holding the theme name.
    pub const KEY: &'static str = "theme";

    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The current theme. Missing or unknown values read as the default.
    pub fn theme(&self) -> Theme {
        self.store
            .get(Self::KEY)
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.set(Self::KEY, theme.as_str());
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }
}
