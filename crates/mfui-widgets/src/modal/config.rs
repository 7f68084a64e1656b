#![forbid(unsafe_code)]

//! Modal size and behavior configuration.

use crate::portal::AttachmentPoint;

/// Panel width preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ModalSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl ModalSize {
    /// Class name applied to the panel.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Full => "full",
        }
    }
}

/// Modal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModalConfig {
    pub size: ModalSize,
    /// Close when the backdrop itself (not the panel) is activated.
    pub close_on_backdrop_click: bool,
    /// Close on a global Escape press.
    pub close_on_escape: bool,
    /// Where the markup is mounted.
    pub attachment: AttachmentPoint,
    /// Extra class names for the panel.
    pub class_name: Option<String>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            size: ModalSize::Medium,
            close_on_backdrop_click: true,
            close_on_escape: true,
            attachment: AttachmentPoint::BODY,
            class_name: None,
        }
    }
}

impl ModalConfig {
    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = size;
        self
    }

    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.close_on_backdrop_click = close;
        self
    }

    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    pub fn attachment(mut self, point: AttachmentPoint) -> Self {
        self.attachment = point;
        self
    }

    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }
}
