#![forbid(unsafe_code)]

//! The `Modal` component: dialog markup on top of [`OverlayLifecycle`].

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use mfui_core::event::{Event, PointerEvent};
use mfui_core::host::ElementId;
use mfui_runtime::store::ThemeStore;

use super::config::{ModalConfig, ModalSize};
use super::dismiss::DismissReason;
use super::lifecycle::{OverlayEnv, OverlayLifecycle, Transition};
use crate::node::Node;
use crate::portal::{AttachmentPoint, OwnerId, Placement, PortalError};

/// Markup ids are allocated above the range hosts hand out.
const MARKUP_ID_BASE: u64 = 1 << 48;

static MARKUP_ID_COUNTER: AtomicU64 = AtomicU64::new(MARKUP_ID_BASE);

fn next_markup_id() -> ElementId {
    ElementId::new(MARKUP_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Ids of the interactive parts of one modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalIds {
    pub backdrop: ElementId,
    pub panel: ElementId,
    pub title: ElementId,
    pub close_button: ElementId,
}

impl ModalIds {
    fn allocate() -> Self {
        Self {
            backdrop: next_markup_id(),
            panel: next_markup_id(),
            title: next_markup_id(),
            close_button: next_markup_id(),
        }
    }
}

#[derive(Debug)]
struct ModalParts {
    ids: ModalIds,
    config: ModalConfig,
    title: Option<String>,
    content: Node,
    footer: Option<Node>,
    theme: Option<ThemeStore>,
}

impl ModalParts {
    fn markup(&self) -> Node {
        let ids = self.ids;

        let mut header = Node::element("div").class("header");
        if let Some(title) = &self.title {
            header = header.child(
                Node::element("h2")
                    .with_id(ids.title)
                    .attr("id", ids.title.to_string())
                    .class("title")
                    .child(Node::text(title.as_str())),
            );
        }
        header = header.child(
            Node::element("button")
                .with_id(ids.close_button)
                .class("close-button")
                .attr("aria-label", "Close modal")
                .attr("type", "button")
                .child(close_icon()),
        );

        let mut panel = Node::element("div")
            .with_id(ids.panel)
            .class("modal")
            .class(self.config.size.class_name())
            .class(self.config.class_name.as_deref().unwrap_or_default())
            .attr("role", "dialog")
            .attr("aria-modal", "true");
        if self.title.is_some() {
            panel = panel.attr("aria-labelledby", ids.title.to_string());
        }
        panel = panel
            .child(header)
            .child(Node::element("div").class("content").child(self.content.clone()));
        if let Some(footer) = &self.footer {
            panel = panel.child(Node::element("div").class("footer").child(footer.clone()));
        }

        let mut backdrop = Node::element("div")
            .with_id(ids.backdrop)
            .class("backdrop")
            .attr("role", "presentation");
        if let Some(theme) = &self.theme {
            backdrop = backdrop.attr("data-theme", theme.theme().as_str());
        }
        backdrop.child(panel)
    }
}

fn close_icon() -> Node {
    Node::element("svg")
        .attr("width", "20")
        .attr("height", "20")
        .attr("viewBox", "0 0 20 20")
        .attr("fill", "none")
        .attr("aria-hidden", "true")
        .child(
            Node::element("path")
                .attr("d", "M15 5L5 15M5 5L15 15")
                .attr("stroke", "currentColor")
                .attr("stroke-width", "2")
                .attr("stroke-linecap", "round")
                .attr("stroke-linejoin", "round"),
        )
}

/// A dialog rendered into a portal.
///
/// The caller owns `open`. Escape, backdrop clicks and the close button only
/// call `on_close`; the caller decides whether to follow with
/// `set_open(false)`.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use mfui_core::{VirtualDocument, share};
/// use mfui_widgets::modal::{Modal, ModalSize, OverlayEnv};
/// use mfui_widgets::node::Node;
///
/// let (_doc, shared) = share(VirtualDocument::new());
/// let env = OverlayEnv::isolated(shared);
/// let wants_close = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&wants_close);
///
/// let mut modal = Modal::new(env, move || flag.set(true))
///     .title("Saved")
///     .size(ModalSize::Small)
///     .content(Node::text("Your settings were saved."));
///
/// modal.set_open(true).unwrap();
/// assert!(modal.is_open());
/// ```
#[derive(Debug)]
pub struct Modal {
    lifecycle: OverlayLifecycle,
    parts: ModalParts,
}

impl Modal {
    pub fn new(env: OverlayEnv, on_close: impl Fn() + 'static) -> Self {
        let config = ModalConfig::default();
        let on_close: Rc<dyn Fn()> = Rc::new(on_close);
        Self {
            lifecycle: OverlayLifecycle::new(env, config.attachment.clone(), on_close),
            parts: ModalParts {
                ids: ModalIds::allocate(),
                config,
                title: None,
                content: Node::element("div"),
                footer: None,
                theme: None,
            },
        }
    }

    /// Apply a whole configuration.
    ///
    /// On an open modal whose new attachment point is unknown, the modal
    /// stays mounted where it was and keeps its old attachment point.
    #[must_use]
    pub fn config(mut self, mut config: ModalConfig) -> Self {
        let point = std::mem::replace(
            &mut config.attachment,
            self.parts.config.attachment.clone(),
        );
        self.lifecycle
            .dismissal()
            .set_close_on_escape(config.close_on_escape);
        self.parts.config = config;
        let _ = self.set_attachment(point);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.parts.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn size(mut self, size: ModalSize) -> Self {
        self.parts.config.size = size;
        self
    }

    #[must_use]
    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.parts.config.close_on_backdrop_click = close;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.parts.config.close_on_escape = close;
        self.lifecycle.dismissal().set_close_on_escape(close);
        self
    }

    #[must_use]
    pub fn content(mut self, content: Node) -> Self {
        self.parts.content = content;
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: Node) -> Self {
        self.parts.footer = Some(footer);
        self
    }

    #[must_use]
    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.parts.config.class_name = Some(class.into());
        self
    }

    /// Builder form of [`set_attachment`](Self::set_attachment). An unknown
    /// point on an open modal is ignored.
    #[must_use]
    pub fn attachment(mut self, point: AttachmentPoint) -> Self {
        let _ = self.set_attachment(point);
        self
    }

    /// Tag the markup with the store's current theme.
    #[must_use]
    pub fn theme(mut self, theme: ThemeStore) -> Self {
        self.parts.theme = Some(theme);
        self
    }

    /// Replace the body. Call [`render`](Self::render) to show it.
    pub fn set_content(&mut self, content: Node) {
        self.parts.content = content;
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.parts.title = title;
    }

    /// Move the dialog to another attachment point.
    ///
    /// An open dialog is remounted there immediately. An unknown point on an
    /// open dialog is an error and leaves the dialog where it was.
    pub fn set_attachment(&mut self, point: AttachmentPoint) -> Result<(), PortalError> {
        let parts = &self.parts;
        self.lifecycle.set_attachment(point.clone(), || parts.markup())?;
        self.parts.config.attachment = point;
        Ok(())
    }

    /// Open or close the dialog.
    pub fn set_open(&mut self, open: bool) -> Result<Transition, PortalError> {
        let parts = &self.parts;
        self.lifecycle.set_open(open, || parts.markup())
    }

    /// Rebuild the mounted markup of an open dialog.
    pub fn render(&mut self) -> Result<Placement, PortalError> {
        let parts = &self.parts;
        self.lifecycle.render(|| parts.markup())
    }

    /// The markup this dialog produces when visible.
    pub fn markup(&self) -> Node {
        self.parts.markup()
    }

    /// Route a pointer event that hit this dialog's markup.
    ///
    /// Key events are ignored here; Escape arrives through the key registry.
    /// `on_close` runs before this returns, so it must not re-borrow the
    /// modal.
    pub fn handle_event(&self, event: &Event) -> Option<DismissReason> {
        match event {
            Event::Pointer(pointer) => self.handle_pointer(pointer),
            Event::Key(_) => None,
        }
    }

    fn handle_pointer(&self, event: &PointerEvent) -> Option<DismissReason> {
        let dismissal = self.lifecycle.dismissal();
        let ids = self.parts.ids;
        if event.target == Some(ids.close_button) && event.is_primary_click() {
            return dismissal.close_button_activated();
        }
        dismissal.backdrop_activated(
            event,
            ids.backdrop,
            self.parts.config.close_on_backdrop_click,
        )
    }

    /// Release everything held while open. Idempotent.
    pub fn teardown(&mut self) {
        self.lifecycle.teardown();
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    #[inline]
    pub fn ids(&self) -> ModalIds {
        self.parts.ids
    }

    #[inline]
    pub fn owner(&self) -> OwnerId {
        self.lifecycle.id()
    }

    pub fn config_ref(&self) -> &ModalConfig {
        &self.parts.config
    }

    pub fn lifecycle(&self) -> &OverlayLifecycle {
        &self.lifecycle
    }
}
