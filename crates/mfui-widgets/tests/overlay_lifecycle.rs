//! End-to-end overlay behavior against a headless document.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use mfui_core::{
    FocusHost, HostEffect, KeyCode, KeyEvent, KeyEventKind, PointerEvent, RestoreOutcome,
    ScrollLock, VirtualDocument, share,
};
use mfui_runtime::KeyListeners;
use mfui_widgets::{
    AttachmentPoint, DismissReason, Modal, Node, OverlayEnv, PortalHost, Transition,
};
use proptest::prelude::*;

struct Fixture {
    doc: Rc<RefCell<VirtualDocument>>,
    env: OverlayEnv,
}

fn fixture() -> Fixture {
    let (doc, shared) = share(VirtualDocument::with_overflow("scroll"));
    Fixture {
        doc,
        env: OverlayEnv::isolated(shared),
    }
}

fn focused_trigger(doc: &Rc<RefCell<VirtualDocument>>) -> mfui_core::ElementId {
    let mut doc = doc.borrow_mut();
    let trigger = doc.create_element("button");
    doc.focus(trigger);
    doc.clear_journal();
    trigger
}

fn body_mounts(env: &OverlayEnv) -> usize {
    env.portals.mount_count(&AttachmentPoint::BODY)
}

#[test]
fn scroll_is_restored_before_focus_returns() {
    let fx = fixture();
    let trigger = focused_trigger(&fx.doc);

    let mut modal = Modal::new(fx.env.clone(), || {}).title("Success");
    modal.set_open(true).expect("open");
    assert_eq!(fx.doc.borrow().overflow(), "hidden");

    let closed = modal.set_open(false).expect("close");
    assert_eq!(
        closed,
        Transition::Closed {
            focus: RestoreOutcome::Restored(trigger)
        }
    );
    assert_eq!(
        fx.doc.borrow().journal(),
        &[
            HostEffect::ScrollDisabled,
            HostEffect::ScrollRestored,
            HostEffect::Focused(trigger),
        ]
    );
    assert_eq!(fx.doc.borrow().overflow(), "scroll");
    assert_eq!(fx.doc.borrow().active_element(), Some(trigger));
}

#[test]
fn hidden_overlay_holds_nothing() {
    let fx = fixture();
    let modal = Modal::new(fx.env.clone(), || {}).content(Node::text("hidden"));

    assert!(!modal.is_open());
    assert_eq!(body_mounts(&fx.env), 0);
    assert_eq!(fx.env.keys.listener_count(), 0);
    assert_eq!(fx.env.scroll_lock.holders(), 0);
    assert!(fx.doc.borrow().journal().is_empty());
}

#[test]
fn nested_overlays_share_one_lock_closing_inner_first() {
    let fx = fixture();
    let mut outer = Modal::new(fx.env.clone(), || {});
    let mut inner = Modal::new(fx.env.clone(), || {});

    outer.set_open(true).expect("open outer");
    inner.set_open(true).expect("open inner");
    assert_eq!(fx.env.scroll_lock.holders(), 2);
    assert_eq!(
        fx.env.portals.owners(&AttachmentPoint::BODY),
        vec![outer.owner(), inner.owner()]
    );

    inner.set_open(false).expect("close inner");
    assert!(fx.doc.borrow().is_scroll_disabled());

    outer.set_open(false).expect("close outer");
    assert!(!fx.doc.borrow().is_scroll_disabled());
    assert_eq!(fx.doc.borrow().overflow(), "scroll");
}

#[test]
fn nested_overlays_share_one_lock_closing_outer_first() {
    let fx = fixture();
    let mut outer = Modal::new(fx.env.clone(), || {});
    let mut inner = Modal::new(fx.env.clone(), || {});

    outer.set_open(true).expect("open outer");
    inner.set_open(true).expect("open inner");

    outer.set_open(false).expect("close outer");
    assert!(
        fx.doc.borrow().is_scroll_disabled(),
        "inner overlay still holds the lock"
    );

    inner.set_open(false).expect("close inner");
    assert!(!fx.doc.borrow().is_scroll_disabled());

    let disables = fx
        .doc
        .borrow()
        .journal()
        .iter()
        .filter(|e| **e == HostEffect::ScrollDisabled)
        .count();
    assert_eq!(disables, 1);
}

#[test]
fn sequential_overlays_unlock_between_and_after() {
    let fx = fixture();
    let mut first = Modal::new(fx.env.clone(), || {});
    let mut second = Modal::new(fx.env.clone(), || {});
    let state = |fx: &Fixture| {
        let disabled = fx.doc.borrow().is_scroll_disabled();
        (disabled, fx.env.scroll_lock.holders())
    };

    first.set_open(true).expect("open first");
    assert_eq!(state(&fx), (true, 1));

    first.set_open(false).expect("close first");
    assert_eq!(state(&fx), (false, 0));
    assert_eq!(fx.doc.borrow().overflow(), "scroll");

    second.set_open(true).expect("open second");
    assert_eq!(state(&fx), (true, 1));

    second.set_open(false).expect("close second");
    assert_eq!(state(&fx), (false, 0));
    assert_eq!(fx.doc.borrow().overflow(), "scroll");
    assert_eq!(
        fx.doc.borrow().journal(),
        &[
            HostEffect::ScrollDisabled,
            HostEffect::ScrollRestored,
            HostEffect::ScrollDisabled,
            HostEffect::ScrollRestored,
        ]
    );
}

#[test]
fn removed_focus_target_is_skipped() {
    let fx = fixture();
    let trigger = focused_trigger(&fx.doc);

    let mut modal = Modal::new(fx.env.clone(), || {});
    modal.set_open(true).expect("open");
    fx.doc.borrow_mut().remove_element(trigger);

    let closed = modal.set_open(false).expect("close");
    assert_eq!(
        closed,
        Transition::Closed {
            focus: RestoreOutcome::Detached(trigger)
        }
    );
    assert!(!fx.doc.borrow().is_scroll_disabled());
    assert_eq!(fx.doc.borrow().active_element(), None);
}

#[test]
fn disabled_focus_target_is_skipped() {
    let fx = fixture();
    let trigger = focused_trigger(&fx.doc);

    let mut modal = Modal::new(fx.env.clone(), || {});
    modal.set_open(true).expect("open");
    fx.doc.borrow_mut().set_disabled(trigger, true);

    let closed = modal.set_open(false).expect("close");
    assert_eq!(
        closed,
        Transition::Closed {
            focus: RestoreOutcome::NotFocusable(trigger)
        }
    );
    assert_eq!(body_mounts(&fx.env), 0);
}

#[test]
fn escape_close_from_inside_the_callback() {
    let fx = fixture();
    let trigger = focused_trigger(&fx.doc);
    let slot: Rc<RefCell<Option<Modal>>> = Rc::new(RefCell::new(None));
    let weak: Weak<RefCell<Option<Modal>>> = Rc::downgrade(&slot);

    let mut modal = Modal::new(fx.env.clone(), move || {
        let Some(slot) = weak.upgrade() else {
            return;
        };
        let mut guard = slot.borrow_mut();
        if let Some(modal) = guard.as_mut() {
            modal.set_open(false).expect("close");
        }
    });
    modal.set_open(true).expect("open");
    *slot.borrow_mut() = Some(modal);

    fx.env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));

    assert!(slot.borrow().as_ref().is_some_and(|m| !m.is_open()));
    assert_eq!(fx.env.keys.listener_count(), 0);
    assert_eq!(fx.env.scroll_lock.holders(), 0);
    assert_eq!(fx.doc.borrow().active_element(), Some(trigger));

    fx.env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));
    assert_eq!(fx.env.scroll_lock.holders(), 0);
}

#[test]
fn escape_repeat_and_release_do_not_dismiss() {
    let fx = fixture();
    let requests = Rc::new(Cell::new(0));
    let r = Rc::clone(&requests);
    let mut modal = Modal::new(fx.env.clone(), move || r.set(r.get() + 1));
    modal.set_open(true).expect("open");

    fx.env
        .keys
        .dispatch(&KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Repeat));
    fx.env
        .keys
        .dispatch(&KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
    assert_eq!(requests.get(), 0);

    fx.env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));
    assert_eq!(requests.get(), 1);
}

#[test]
fn caller_decides_whether_to_close() {
    let fx = fixture();
    let wants_close = Rc::new(Cell::new(false));
    let flag = Rc::clone(&wants_close);
    let mut modal = Modal::new(fx.env.clone(), move || flag.set(true));
    modal.set_open(true).expect("open");

    let backdrop = modal.ids().backdrop;
    let reason = modal.handle_event(&PointerEvent::click(backdrop).into());
    assert_eq!(reason, Some(DismissReason::BackdropClicked));
    assert!(wants_close.get());
    assert!(modal.is_open());

    if wants_close.replace(false) {
        modal.set_open(false).expect("close");
    }
    assert!(!modal.is_open());
    assert_eq!(body_mounts(&fx.env), 0);
}

#[test]
fn dropping_an_open_modal_releases_everything() {
    let fx = fixture();
    let trigger = focused_trigger(&fx.doc);
    {
        let mut modal = Modal::new(fx.env.clone(), || {});
        modal.set_open(true).expect("open");
        assert_eq!(body_mounts(&fx.env), 1);
    }
    assert_eq!(fx.env.scroll_lock.holders(), 0);
    assert_eq!(fx.env.keys.listener_count(), 0);
    assert_eq!(body_mounts(&fx.env), 0);
    assert_eq!(fx.doc.borrow().active_element(), Some(trigger));
}

#[test]
fn global_services_are_shared_across_overlays() {
    let (doc, shared) = share(VirtualDocument::new());
    ScrollLock::install_global(doc.clone());

    let mut a = Modal::new(OverlayEnv::global(shared.clone()), || {});
    let mut b = Modal::new(OverlayEnv::global(shared), || {});
    a.set_open(true).expect("open a");
    b.set_open(true).expect("open b");

    assert_eq!(ScrollLock::global().holders(), 2);
    assert_eq!(KeyListeners::global().listener_count(), 2);
    assert_eq!(PortalHost::global().mount_count(&AttachmentPoint::BODY), 2);

    a.teardown();
    b.teardown();
    assert!(!doc.borrow().is_scroll_disabled());
    assert_eq!(ScrollLock::global().holders(), 0);
}

#[cfg(feature = "tracing")]
mod logging {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};

    #[derive(Default, Clone)]
    struct Messages(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor<'a>(&'a mut Option<String>);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Messages {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != "mfui_widgets::modal" {
                return;
            }
            let mut message = None;
            event.record(&mut MessageVisitor(&mut message));
            if let Some(message) = message
                && let Ok(mut messages) = self.0.lock()
            {
                messages.push(message);
            }
        }
    }

    #[test]
    fn transitions_are_logged() {
        let messages = Messages::default();
        let subscriber = tracing_subscriber::registry().with(messages.clone());

        tracing::subscriber::with_default(subscriber, || {
            let fx = fixture();
            let mut modal = Modal::new(fx.env.clone(), || {});
            modal.set_open(true).expect("open");
            modal.set_open(false).expect("close");
        });

        let messages = messages.0.lock().expect("lock").clone();
        assert_eq!(messages, ["overlay opened", "overlay closed"]);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Open(usize),
    Close(usize),
    Escape,
}

fn op_strategy(overlays: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..overlays).prop_map(Op::Open),
        (0..overlays).prop_map(Op::Close),
        Just(Op::Escape),
    ]
}

proptest! {
    #[test]
    fn lock_and_mounts_track_open_overlays(ops in prop::collection::vec(op_strategy(3), 0..40)) {
        let fx = fixture();
        let requests = Rc::new(Cell::new(0usize));
        let mut modals: Vec<Modal> = (0..3)
            .map(|_| {
                let r = Rc::clone(&requests);
                Modal::new(fx.env.clone(), move || r.set(r.get() + 1))
            })
            .collect();

        for op in ops {
            let before = requests.get();
            match op {
                Op::Open(i) => { modals[i].set_open(true).expect("open"); }
                Op::Close(i) => { modals[i].set_open(false).expect("close"); }
                Op::Escape => {
                    fx.env.keys.dispatch(&KeyEvent::new(KeyCode::Escape));
                    let open = modals.iter().filter(|m| m.is_open()).count();
                    prop_assert_eq!(requests.get() - before, open);
                }
            }

            let open = modals.iter().filter(|m| m.is_open()).count();
            prop_assert_eq!(fx.env.scroll_lock.holders(), open);
            prop_assert_eq!(fx.doc.borrow().is_scroll_disabled(), open > 0);
            prop_assert_eq!(fx.env.keys.listener_count(), open);
            prop_assert_eq!(body_mounts(&fx.env), open);
        }

        for modal in &mut modals {
            modal.teardown();
        }
        prop_assert!(!fx.doc.borrow().is_scroll_disabled());
        let overflow = fx.doc.borrow().overflow().to_owned();
        prop_assert_eq!(overflow.as_str(), "scroll");
    }
}
