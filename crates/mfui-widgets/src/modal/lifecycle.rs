#![forbid(unsafe_code)]

//! The Closed/Open state machine shared by every overlay.
//!
//! [`OverlayLifecycle`] sequences the four side effects an open overlay holds:
//! portal output, the focus capture, a scroll-lock hold, and the Escape
//! listener.
//!
//! ```text
//!            set_open(true)
//!   Closed ─────────────────▶ Open
//!     ▲  render → capture → acquire → arm
//!     │                          │
//!     └──────────────────────────┘
//!       disarm → release → restore → detach
//!            set_open(false) / teardown / drop
//! ```
//!
//! # Invariants
//!
//! - While Closed the instance holds no scroll token, no key listener, and no
//!   portal mount.
//! - While Open it holds exactly one of each.
//! - Closing runs the opening steps in exact reverse order, so scroll is
//!   restored before focus moves back.
//! - `set_open` with the current value does nothing.
//! - Moving an open overlay to another attachment point remounts it there
//!   in the same call.
//!
//! # Failure Modes
//!
//! Opening into an attachment point the host does not know returns
//! [`PortalError`] before any other effect runs; the instance stays Closed.
//! Closing never fails.

use std::fmt;
use std::rc::Rc;

use mfui_core::focus::{FocusRestore, RestoreOutcome};
use mfui_core::host::SharedDocument;
use mfui_core::scroll_lock::{ScrollLock, ScrollLockToken};
use mfui_runtime::keys::KeyListeners;

use super::dismiss::DismissalController;
use crate::node::Node;
use crate::portal::{AttachmentPoint, OwnerId, Placement, Portal, PortalError, PortalHost};

/// The services an overlay talks to.
#[derive(Clone)]
pub struct OverlayEnv {
    pub document: SharedDocument,
    pub scroll_lock: ScrollLock,
    pub keys: KeyListeners,
    pub portals: PortalHost,
}

impl fmt::Debug for OverlayEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayEnv")
            .field("scroll_lock", &self.scroll_lock)
            .field("keys", &self.keys)
            .field("portals", &self.portals)
            .finish_non_exhaustive()
    }
}

impl OverlayEnv {
    pub fn new(
        document: SharedDocument,
        scroll_lock: ScrollLock,
        keys: KeyListeners,
        portals: PortalHost,
    ) -> Self {
        Self {
            document,
            scroll_lock,
            keys,
            portals,
        }
    }

    /// Use the UI thread's shared scroll lock, key registry and portal host.
    ///
    /// The global scroll lock applies its effect to whatever surface was
    /// given to [`ScrollLock::install_global`].
    pub fn global(document: SharedDocument) -> Self {
        Self::new(
            document,
            ScrollLock::global(),
            KeyListeners::global(),
            PortalHost::global(),
        )
    }

    /// Private services around `document`, with the lock acting on it.
    pub fn isolated(document: SharedDocument) -> Self {
        Self::new(
            document.clone(),
            ScrollLock::new(document),
            KeyListeners::new(),
            PortalHost::new(),
        )
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Closed,
    Open,
}

/// What a `set_open` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Closed { focus: RestoreOutcome },
    Unchanged,
}

/// Side-effect owner for one overlay instance.
#[derive(Debug)]
pub struct OverlayLifecycle {
    id: OwnerId,
    phase: OverlayPhase,
    env: OverlayEnv,
    focus: FocusRestore,
    scroll: Option<ScrollLockToken>,
    dismissal: DismissalController,
    portal: Portal,
}

impl OverlayLifecycle {
    /// A closed overlay. `on_request_close` is what the dismissal triggers
    /// call; it should arrange for `set_open(false)`.
    pub fn new(env: OverlayEnv, point: AttachmentPoint, on_request_close: Rc<dyn Fn()>) -> Self {
        let id = OwnerId::next();
        Self {
            id,
            phase: OverlayPhase::Closed,
            focus: FocusRestore::new(),
            scroll: None,
            dismissal: DismissalController::new(on_request_close, env.keys.clone()),
            portal: Portal::new(env.portals.clone(), point, id),
            env,
        }
    }

    #[inline]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    #[inline]
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase == OverlayPhase::Open
    }

    pub fn env(&self) -> &OverlayEnv {
        &self.env
    }

    pub fn dismissal(&self) -> &DismissalController {
        &self.dismissal
    }

    pub fn portal(&self) -> &Portal {
        &self.portal
    }

    /// Whether this instance currently holds a scroll-lock token.
    pub fn holds_scroll_lock(&self) -> bool {
        self.scroll.is_some()
    }

    /// Move the output to another attachment point.
    ///
    /// An open overlay is remounted at `point` right away. If the host does
    /// not know `point`, nothing changes and the output stays where it was.
    pub fn set_attachment(
        &mut self,
        point: AttachmentPoint,
        build: impl FnOnce() -> Node,
    ) -> Result<(), PortalError> {
        if *self.portal.point() == point {
            return Ok(());
        }
        if !self.is_open() {
            self.portal.set_point(point);
            return Ok(());
        }
        if !self.env.portals.has_point(&point) {
            return Err(PortalError::UnknownAttachmentPoint(point.name().to_owned()));
        }
        self.portal.set_point(point);
        self.portal.render(true, build)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "mfui_widgets::modal",
            overlay = %self.id,
            point = %self.portal.point(),
            "overlay moved"
        );
        Ok(())
    }

    /// Drive the state machine. `build` runs only when opening.
    pub fn set_open(
        &mut self,
        open: bool,
        build: impl FnOnce() -> Node,
    ) -> Result<Transition, PortalError> {
        match (self.phase, open) {
            (OverlayPhase::Closed, true) => {
                self.open(build)?;
                Ok(Transition::Opened)
            }
            (OverlayPhase::Open, false) => Ok(Transition::Closed {
                focus: self.close(),
            }),
            _ => Ok(Transition::Unchanged),
        }
    }

    /// Rebuild the output of an open overlay. A closed overlay renders nothing.
    pub fn render(&mut self, build: impl FnOnce() -> Node) -> Result<Placement, PortalError> {
        self.portal.render(self.is_open(), build)
    }

    /// Release everything an open overlay holds. Idempotent.
    pub fn teardown(&mut self) -> Option<RestoreOutcome> {
        self.is_open().then(|| self.close())
    }

    fn open(&mut self, build: impl FnOnce() -> Node) -> Result<(), PortalError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("overlay_open", overlay = %self.id).entered();

        self.portal.render(true, build)?;
        self.focus.capture(&*self.env.document.borrow());
        self.scroll = Some(self.env.scroll_lock.acquire());
        self.dismissal.arm();
        self.phase = OverlayPhase::Open;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "mfui_widgets::modal",
            overlay = %self.id,
            point = %self.portal.point(),
            "overlay opened"
        );
        Ok(())
    }

    fn close(&mut self) -> RestoreOutcome {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("overlay_close", overlay = %self.id).entered();

        self.dismissal.disarm();
        if let Some(token) = self.scroll.take() {
            token.release();
        }
        let focus = self.focus.restore(&mut *self.env.document.borrow_mut());
        self.portal.detach();
        self.phase = OverlayPhase::Closed;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "mfui_widgets::modal",
            overlay = %self.id,
            ?focus,
            "overlay closed"
        );
        focus
    }
}

impl Drop for OverlayLifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfui_core::event::{KeyCode, KeyEvent};
    use mfui_core::host::{FocusHost, share};
    use mfui_core::virtual_document::{HostEffect, VirtualDocument};
    use std::cell::{Cell, RefCell};

    fn body() -> Node {
        Node::element("div").class("modal")
    }

    fn setup() -> (Rc<RefCell<VirtualDocument>>, OverlayEnv) {
        let (doc, shared) = share(VirtualDocument::with_overflow("auto"));
        (doc, OverlayEnv::isolated(shared))
    }

    fn noop() -> Rc<dyn Fn()> {
        Rc::new(|| {})
    }

    #[test]
    fn starts_closed_with_nothing_held() {
        let (doc, env) = setup();
        let overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        assert_eq!(overlay.phase(), OverlayPhase::Closed);
        assert!(!overlay.holds_scroll_lock());
        assert_eq!(env.keys.listener_count(), 0);
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 0);
        assert!(doc.borrow().journal().is_empty());
    }

    #[test]
    fn open_acquires_everything() {
        let (doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());

        assert_eq!(overlay.set_open(true, body), Ok(Transition::Opened));
        assert!(overlay.is_open());
        assert!(overlay.holds_scroll_lock());
        assert!(overlay.dismissal().is_armed());
        assert_eq!(env.scroll_lock.holders(), 1);
        assert_eq!(env.keys.listener_count(), 1);
        assert_eq!(env.portals.owners(&AttachmentPoint::BODY), vec![overlay.id()]);
        assert!(doc.borrow().is_scroll_disabled());
    }

    #[test]
    fn close_reverses_open_and_restores_focus_last() {
        let (doc, env) = setup();
        let trigger = doc.borrow_mut().create_element("button");
        doc.borrow_mut().focus(trigger);
        doc.borrow_mut().clear_journal();

        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        overlay.set_open(true, body).expect("open");
        let transition = overlay.set_open(false, body).expect("close");

        assert_eq!(
            transition,
            Transition::Closed {
                focus: RestoreOutcome::Restored(trigger)
            }
        );
        assert_eq!(
            doc.borrow().journal(),
            &[
                HostEffect::ScrollDisabled,
                HostEffect::ScrollRestored,
                HostEffect::Focused(trigger),
            ]
        );
        assert_eq!(doc.borrow().overflow(), "auto");
        assert_eq!(env.keys.listener_count(), 0);
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 0);
        assert!(!overlay.holds_scroll_lock());
    }

    #[test]
    fn redundant_transitions_are_noops() {
        let (_doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());

        assert_eq!(overlay.set_open(false, body), Ok(Transition::Unchanged));
        overlay.set_open(true, body).expect("open");
        let mut built = false;
        let again = overlay.set_open(true, || {
            built = true;
            body()
        });
        assert_eq!(again, Ok(Transition::Unchanged));
        assert!(!built);
        assert_eq!(env.scroll_lock.holders(), 1);
        assert_eq!(env.keys.listener_count(), 1);
    }

    #[test]
    fn unknown_point_leaves_overlay_closed() {
        let (doc, env) = setup();
        let mut overlay =
            OverlayLifecycle::new(env.clone(), AttachmentPoint::new("missing"), noop());

        let err = overlay.set_open(true, body).unwrap_err();
        assert_eq!(err, PortalError::UnknownAttachmentPoint("missing".into()));
        assert!(!overlay.is_open());
        assert_eq!(env.scroll_lock.holders(), 0);
        assert_eq!(env.keys.listener_count(), 0);
        assert!(doc.borrow().journal().is_empty());
    }

    #[test]
    fn escape_requests_close_without_closing() {
        let (_doc, env) = setup();
        let requests = Rc::new(Cell::new(0));
        let r = Rc::clone(&requests);
        let mut overlay = OverlayLifecycle::new(
            env.clone(),
            AttachmentPoint::BODY,
            Rc::new(move || r.set(r.get() + 1)),
        );

        env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(requests.get(), 0);

        overlay.set_open(true, body).expect("open");
        env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(requests.get(), 1);
        assert!(overlay.is_open());
    }

    #[test]
    fn render_only_mounts_while_open() {
        let (_doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());

        assert_eq!(overlay.render(body), Ok(Placement::Absent));
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 0);

        overlay.set_open(true, body).expect("open");
        overlay
            .render(|| Node::element("div").child(Node::text("updated")))
            .expect("render");
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 1);
        assert_eq!(
            env.portals
                .mounted_by(&AttachmentPoint::BODY, overlay.id())
                .map(|n| n.text_content()),
            Some("updated".to_string())
        );
    }

    #[test]
    fn moving_an_open_overlay_remounts_it() {
        let (_doc, env) = setup();
        let side = AttachmentPoint::new("dialogs");
        env.portals.register(side.clone());
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        overlay.set_open(true, body).expect("open");

        overlay.set_attachment(side.clone(), body).expect("move");
        assert!(overlay.is_open());
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 0);
        assert_eq!(env.portals.owners(&side), vec![overlay.id()]);
        assert_eq!(env.scroll_lock.holders(), 1);

        overlay.set_open(false, body).expect("close");
        assert_eq!(env.portals.mount_count(&side), 0);
    }

    #[test]
    fn moving_an_open_overlay_to_unknown_point_keeps_old_mount() {
        let (_doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        overlay.set_open(true, body).expect("open");

        let err = overlay
            .set_attachment(AttachmentPoint::new("missing"), body)
            .unwrap_err();
        assert_eq!(err, PortalError::UnknownAttachmentPoint("missing".into()));
        assert_eq!(overlay.portal().point(), &AttachmentPoint::BODY);
        assert_eq!(env.portals.owners(&AttachmentPoint::BODY), vec![overlay.id()]);
        assert!(overlay.is_open());
    }

    #[test]
    fn moving_a_closed_overlay_mounts_nothing() {
        let (_doc, env) = setup();
        let side = AttachmentPoint::new("dialogs");
        env.portals.register(side.clone());
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());

        let mut built = false;
        overlay
            .set_attachment(side.clone(), || {
                built = true;
                body()
            })
            .expect("move");
        assert!(!built);
        assert_eq!(env.portals.mount_count(&side), 0);

        overlay.set_open(true, body).expect("open");
        assert_eq!(env.portals.mount_count(&side), 1);
    }

    #[test]
    fn drop_while_open_releases_everything() {
        let (doc, env) = setup();
        {
            let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
            overlay.set_open(true, body).expect("open");
            assert!(doc.borrow().is_scroll_disabled());
        }
        assert!(!doc.borrow().is_scroll_disabled());
        assert_eq!(env.scroll_lock.holders(), 0);
        assert_eq!(env.keys.listener_count(), 0);
        assert_eq!(env.portals.mount_count(&AttachmentPoint::BODY), 0);
    }

    #[test]
    fn teardown_is_idempotent() {
        let (_doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        assert_eq!(overlay.teardown(), None);

        overlay.set_open(true, body).expect("open");
        assert_eq!(overlay.teardown(), Some(RestoreOutcome::NoPreviousFocus));
        assert_eq!(overlay.teardown(), None);
        assert_eq!(env.scroll_lock.holders(), 0);
    }

    #[test]
    fn reopen_after_close_works() {
        let (doc, env) = setup();
        let mut overlay = OverlayLifecycle::new(env.clone(), AttachmentPoint::BODY, noop());
        for _ in 0..3 {
            overlay.set_open(true, body).expect("open");
            overlay.set_open(false, body).expect("close");
        }
        let disabled = doc
            .borrow()
            .journal()
            .iter()
            .filter(|e| **e == HostEffect::ScrollDisabled)
            .count();
        assert_eq!(disabled, 3);
        assert_eq!(env.scroll_lock.holders(), 0);
    }
}
