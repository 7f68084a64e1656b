//! A settings page that confirms a save with a modal.
//!
//! The page owns `show_modal`. The modal's `on_close` only flips that flag;
//! [`SettingsPage::sync`] then applies it with `set_open`.

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::rc::Rc;

use mfui_core::{
    ElementId, FocusHost, KeyEvent, PointerEvent, ScrollLock, VirtualDocument, share,
};
use mfui_runtime::{KeyListeners, ThemeStore};
use mfui_widgets::{
    AttachmentPoint, DismissReason, Modal, ModalSize, Node, OverlayEnv, PortalError, PortalHost,
};

pub struct SettingsPage {
    doc: Rc<RefCell<VirtualDocument>>,
    themes: ThemeStore,
    save_button: ElementId,
    ok_button: ElementId,
    show_modal: Rc<Cell<bool>>,
    modal: Modal,
}

impl SettingsPage {
    /// Build the page on the UI thread's global services.
    pub fn new(themes: ThemeStore) -> Self {
        let (doc, shared) = share(VirtualDocument::with_overflow("auto"));
        ScrollLock::install_global(doc.clone());

        let (save_button, ok_button) = {
            let mut d = doc.borrow_mut();
            d.create_element("input");
            let save = d.create_element("button");
            let ok = d.create_element("button");
            (save, ok)
        };

        let show_modal = Rc::new(Cell::new(false));
        let flag = Rc::clone(&show_modal);
        let modal = Modal::new(OverlayEnv::global(shared), move || flag.set(false))
            .title("Success")
            .size(ModalSize::Small)
            .theme(themes.clone())
            .content(
                Node::element("p")
                    .child(Node::text("Your settings have been saved successfully.")),
            )
            .footer(
                Node::element("button")
                    .with_id(ok_button)
                    .class("primary")
                    .child(Node::text("OK")),
            );

        Self {
            doc,
            themes,
            save_button,
            ok_button,
            show_modal,
            modal,
        }
    }

    /// Focus the save button and submit the form.
    pub fn click_save(&mut self) -> Result<(), PortalError> {
        self.doc.borrow_mut().focus(self.save_button);
        tracing::info!(target: "mfui_demo", "settings saved");
        self.show_modal.set(true);
        self.sync()
    }

    /// Deliver a key press to the document.
    pub fn press_key(&mut self, event: KeyEvent) -> Result<(), PortalError> {
        KeyListeners::global().dispatch(&event);
        self.sync()
    }

    /// Deliver a click to `target`.
    pub fn click(&mut self, target: ElementId) -> Result<Option<DismissReason>, PortalError> {
        let reason = if target == self.ok_button {
            self.show_modal.set(false);
            None
        } else {
            self.modal.handle_event(&PointerEvent::click(target).into())
        };
        self.sync()?;
        Ok(reason)
    }

    pub fn toggle_theme(&mut self) -> Result<(), PortalError> {
        let theme = self.themes.toggle();
        tracing::info!(target: "mfui_demo", %theme, "theme toggled");
        self.modal.render().map(|_| ())
    }

    /// Apply `show_modal` to the modal.
    pub fn sync(&mut self) -> Result<(), PortalError> {
        let transition = self.modal.set_open(self.show_modal.get())?;
        tracing::debug!(target: "mfui_demo", ?transition, "modal synced");
        Ok(())
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn save_button(&self) -> ElementId {
        self.save_button
    }

    /// One-line description of the document state.
    pub fn status(&self) -> String {
        let doc = self.doc.borrow();
        let focus = doc
            .active_element()
            .map_or_else(|| "none".to_owned(), |id| id.to_string());
        format!(
            "open={} overflow={} focus={} mounts={}",
            self.modal.is_open(),
            doc.overflow(),
            focus,
            PortalHost::global().mount_count(&AttachmentPoint::BODY),
        )
    }

    /// Everything mounted at the body, as HTML.
    pub fn body_html(&self) -> String {
        let mut out = String::new();
        for node in PortalHost::global().mounted(&AttachmentPoint::BODY) {
            write_html(&node, 0, &mut out);
        }
        out
    }
}

fn write_html(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Text(text) => {
            let _ = writeln!(out, "{indent}{}", escape(text));
        }
        Node::Element {
            tag,
            attrs,
            children,
            ..
        } => {
            let _ = write!(out, "{indent}<{tag}");
            for (name, value) in attrs {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
            if children.is_empty() {
                let _ = writeln!(out, "></{tag}>");
                return;
            }
            let _ = writeln!(out, ">");
            for child in children {
                write_html(child, depth + 1, out);
            }
            let _ = writeln!(out, "{indent}</{tag}>");
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
