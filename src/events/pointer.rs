use super::ListenerSet;
use crate::core::{EditorMode, SessionPhase};
use crate::dom;
use crate::viewer::ViewerState;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Pointer lock is only requested in free-walk: started, no editor, no story.
fn wants_pointer_lock(v: &ViewerState) -> bool {
    v.session.as_ref().is_some_and(|s| {
        s.phase() == SessionPhase::Started && s.editor_mode() == EditorMode::None && !s.story_mode()
    })
}

fn wire_look(viewer: &Rc<RefCell<ViewerState>>, document: &web::Document, listeners: &mut ListenerSet) {
    let v = viewer.clone();
    let doc = document.clone();
    listeners.add(document, "mousemove", move |ev: web::MouseEvent| {
        if doc.pointer_lock_element().is_none() {
            return;
        }
        let delta = Vec2::new(ev.movement_x() as f32, ev.movement_y() as f32);
        v.borrow_mut().input.look_delta += delta;
    });
}

fn wire_lock_request(viewer: &Rc<RefCell<ViewerState>>, canvas: &web::HtmlCanvasElement, listeners: &mut ListenerSet) {
    let v = viewer.clone();
    let target = canvas.clone();
    listeners.add(canvas, "click", move |_ev: web::MouseEvent| {
        if wants_pointer_lock(&v.borrow()) {
            target.request_pointer_lock();
        }
    });
}

fn wire_wheel(viewer: &Rc<RefCell<ViewerState>>, window: &web::Window, listeners: &mut ListenerSet) {
    let v = viewer.clone();
    listeners.add(window, "wheel", move |ev: web::WheelEvent| {
        if let Some(session) = v.borrow_mut().session.as_mut() {
            session.scroll_by_pixels(ev.delta_y() as f32, dom::viewport_height());
        }
    });
}

pub fn wire_pointer(
    viewer: &Rc<RefCell<ViewerState>>,
    window: &web::Window,
    document: &web::Document,
    canvas: &web::HtmlCanvasElement,
    listeners: &mut ListenerSet,
) {
    wire_look(viewer, document, listeners);
    wire_lock_request(viewer, canvas, listeners);
    wire_wheel(viewer, window, listeners);

    let c = canvas.clone();
    listeners.add(window, "resize", move |_ev: web::Event| {
        dom::sync_canvas_backing_size(&c);
    });
}

/// Leave pointer lock once the session no longer wants mouse-look.
pub fn release_pointer_lock_if_idle(v: &ViewerState, document: &web::Document) {
    if !wants_pointer_lock(v) && document.pointer_lock_element().is_some() {
        document.exit_pointer_lock();
    }
}
