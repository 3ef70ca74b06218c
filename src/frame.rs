use crate::audio::HtmlAudio;
use crate::core::AmbientFade;
use crate::viewer::ViewerState;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Clamp long stalls (background tabs) so rigs don't jump.
const MAX_FRAME_DT_SEC: f32 = 0.1;

pub struct FrameContext {
    pub viewer: Rc<RefCell<ViewerState>>,
    pub document: web::Document,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DT_SEC);
        self.last_instant = now;
        self.viewer.borrow_mut().step(dt_sec, &self.document);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(cb: &FrameCallback) {
    if let (Some(w), Some(closure)) = (web::window(), cb.borrow().as_ref()) {
        _ = w.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

/// Drive `step` on every animation frame until `running` is cleared.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>, running: Rc<Cell<bool>>) {
    let tick: FrameCallback = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !running.get() {
            return;
        }
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

/// Keep ticking the ambient fade-out after the session is gone, then stop.
pub fn start_fade_out(mut fade: AmbientFade, mut audio: HtmlAudio) {
    let tick: FrameCallback = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let mut last = Instant::now();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = Instant::now();
        let dt_ms = (now - last).as_secs_f64() * 1000.0;
        last = now;
        fade.tick(&mut audio, dt_ms);
        if fade.is_stopped() {
            log::info!("[audio] ambient stopped");
            return;
        }
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}
