pub mod keyboard;
pub mod pointer;

pub use keyboard::wire_keyboard;
pub use pointer::wire_pointer;

use crate::core::InputIntents;
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Raw input accumulated between frames.
#[derive(Default, Clone, Copy)]
pub struct InputState {
    pub intents: InputIntents,
    pub look_delta: Vec2,
}

impl InputState {
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }
}

struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

/// Owns every DOM listener the viewer registered; dropping it unhooks them.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Listener>,
}

impl ListenerSet {
    pub fn add<E>(&mut self, target: &web::EventTarget, kind: &'static str, mut handler: impl FnMut(E) + 'static)
    where
        E: JsCast + 'static,
    {
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Ok(ev) = ev.dyn_into::<E>() {
                handler(ev);
            }
        }) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
            log::warn!("[events] could not listen for {}: {:?}", kind, e);
            return;
        }
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        for l in self.listeners.drain(..) {
            _ = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref());
        }
    }
}
