use super::ListenerSet;
use crate::core::{intent_for_key, InputIntents, Intent, SessionPhase};
use crate::dom;
use crate::viewer::ViewerState;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Space is matched on `code` as well; some layouts report other `key`s.
#[inline]
fn intent_for_event(ev: &web::KeyboardEvent) -> Option<Intent> {
    intent_for_key(&ev.key()).or_else(|| intent_for_key(&ev.code()))
}

fn handle_keydown(ev: &web::KeyboardEvent, viewer: &Rc<RefCell<ViewerState>>, document: &web::Document) {
    let typing = dom::typing_in_field(document);
    let mut v = viewer.borrow_mut();
    if !typing {
        if let Some(intent) = intent_for_event(ev) {
            v.input.intents.set(intent, true);
            let started = v
                .session
                .as_ref()
                .is_some_and(|s| s.phase() == SessionPhase::Started);
            // keep arrows and space from scrolling the page
            if started && intent != Intent::ToggleFlashlight {
                ev.prevent_default();
            }
        }
    }
    let key = ev.key();
    if let Some(session) = v.session.as_mut() {
        if let Some(cmd) = session.key_down(&key, typing) {
            log::info!("[keys] {:?}", cmd);
        }
    }
}

fn handle_keyup(ev: &web::KeyboardEvent, viewer: &Rc<RefCell<ViewerState>>) {
    if let Some(intent) = intent_for_event(ev) {
        viewer.borrow_mut().input.intents.set(intent, false);
    }
}

pub fn wire_keyboard(
    viewer: &Rc<RefCell<ViewerState>>,
    window: &web::Window,
    document: &web::Document,
    listeners: &mut ListenerSet,
) {
    let v = viewer.clone();
    let doc = document.clone();
    listeners.add(window, "keydown", move |ev: web::KeyboardEvent| {
        handle_keydown(&ev, &v, &doc);
    });

    let v = viewer.clone();
    listeners.add(window, "keyup", move |ev: web::KeyboardEvent| {
        handle_keyup(&ev, &v);
    });

    // Releasing keys while the tab is unfocused never reaches us.
    let v = viewer.clone();
    listeners.add(window, "blur", move |_ev: web::Event| {
        v.borrow_mut().input.intents = InputIntents::default();
    });
}
