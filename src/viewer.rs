//! JS-facing handle around one mounted scene session.
//!
//! The renderer owns drawing and hit testing. It reads `frame_json` (and
//! `marker_instances` for instanced drawing) every animation frame and
//! reports floor hits and panel edits back through the handle.

use crate::audio::HtmlAudio;
use crate::core::{
    AtmospherePatch, FrameInput, FrameOutput, HotspotId, HotspotInstance, HotspotPatch, SceneConfig,
    SceneSession, SessionEvent,
};
use crate::events::{self, InputState, ListenerSet};
use crate::frame::{self, FrameContext};
use crate::overlay::OverlayView;
use crate::persist::LocalStore;
use crate::dom;
use anyhow::anyhow;
use glam::Vec3;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct ViewerState {
    pub session: Option<SceneSession<LocalStore>>,
    pub audio: HtmlAudio,
    pub input: InputState,
    overlay: OverlayView,
    last_output: Option<FrameOutput>,
    events: Vec<SessionEvent>,
    epoch: Instant,
}

impl ViewerState {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    pub fn step(&mut self, dt_sec: f32, document: &web::Document) {
        let now_ms = self.now_ms();
        let typing = dom::typing_in_field(document);
        let look_delta = self.input.take_look_delta();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let input = FrameInput {
            dt: dt_sec,
            now_ms,
            intents: self.input.intents,
            look_delta,
            typing,
        };
        let mut out = session.tick(&input, &mut self.audio);
        self.events.append(&mut out.events);
        self.overlay.sync(document, &out);
        events::pointer::release_pointer_lock_if_idle(self, document);
        self.last_output = Some(out);
    }
}

#[inline]
fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[inline]
fn hotspot_id(id: f64) -> HotspotId {
    HotspotId(id.max(0.0) as u64)
}

#[wasm_bindgen]
pub struct ViewerHandle {
    state: Rc<RefCell<ViewerState>>,
    running: Rc<Cell<bool>>,
    listeners: Option<ListenerSet>,
    document: web::Document,
}

/// Mount the viewer for `scene_id` on the canvas with id `canvas_id`.
#[wasm_bindgen]
pub fn mount(canvas_id: &str, scene_id: &str) -> Result<ViewerHandle, JsValue> {
    mount_inner(canvas_id, scene_id).map_err(js_err)
}

fn mount_inner(canvas_id: &str, scene_id: &str) -> anyhow::Result<ViewerHandle> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("missing #{}", canvas_id))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow!("{:?}", e))?;
    dom::sync_canvas_backing_size(&canvas);

    let scene = SceneConfig::find(scene_id).unwrap_or_else(|| {
        log::warn!("[session] unknown scene {}, using defaults", scene_id);
        SceneConfig::bare(scene_id)
    });
    let mut audio = HtmlAudio::new();
    let session = SceneSession::activate(scene, LocalStore::open(), &mut audio);

    let state = Rc::new(RefCell::new(ViewerState {
        session: Some(session),
        audio,
        input: InputState::default(),
        overlay: OverlayView::default(),
        last_output: None,
        events: Vec::new(),
        epoch: Instant::now(),
    }));

    let mut listeners = ListenerSet::default();
    events::wire_keyboard(&state, &window, &document, &mut listeners);
    events::wire_pointer(&state, &window, &document, &canvas, &mut listeners);
    log::info!("[session] wired {} listeners", listeners.len());

    let running = Rc::new(Cell::new(true));
    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        viewer: state.clone(),
        document: document.clone(),
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx, running.clone());

    Ok(ViewerHandle {
        state,
        running,
        listeners: Some(listeners),
        document,
    })
}

impl ViewerHandle {
    fn with_session<R>(&self, f: impl FnOnce(&mut SceneSession<LocalStore>, f64) -> R) -> Option<R> {
        let mut state = self.state.borrow_mut();
        let now = state.now_ms();
        state.session.as_mut().map(|s| f(s, now))
    }
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Latest frame snapshot as JSON, or `null` before the first frame.
    pub fn frame_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.borrow().last_output).map_err(js_err)
    }

    /// Events emitted since the last call, as a JSON array.
    pub fn take_events_json(&self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.state.borrow_mut().events);
        serde_json::to_string(&events).map_err(js_err)
    }

    /// Marker instance data, `HotspotInstance`-strided, ready for a vertex buffer.
    pub fn marker_instances(&self) -> Vec<f32> {
        let state = self.state.borrow();
        let instances: Vec<HotspotInstance> = state
            .last_output
            .iter()
            .flat_map(|o| o.markers.iter().map(|m| m.instance))
            .collect();
        bytemuck::cast_slice(&instances).to_vec()
    }

    /// Column-major view-projection matrix for the current pose.
    pub fn view_projection(&self, aspect: f32) -> Vec<f32> {
        let state = self.state.borrow();
        let Some(pose) = state.session.as_ref().map(|s| *s.pose()) else {
            return Vec::new();
        };
        let vp = pose.projection_matrix(aspect, 0.1, 1000.0) * pose.view_matrix();
        vp.to_cols_array().to_vec()
    }

    pub fn hotspots_json(&self) -> Result<String, JsValue> {
        let hotspots = self.with_session(|s, _| s.hotspots().hotspots());
        serde_json::to_string(&hotspots.as_deref()).map_err(js_err)
    }

    pub fn atmosphere_json(&self) -> Result<String, JsValue> {
        let settings = self.with_session(|s, _| s.atmosphere());
        serde_json::to_string(&settings.as_deref()).map_err(js_err)
    }

    pub fn set_scroll(&self, progress: f32) {
        self.with_session(|s, _| s.set_scroll_target(progress));
    }

    pub fn exit(&self) -> bool {
        self.with_session(|s, now| s.request_exit(now)).unwrap_or(false)
    }

    pub fn toggle_story(&self) {
        self.with_session(|s, _| s.toggle_story_mode());
    }

    pub fn toggle_flashlight(&self) {
        self.with_session(|s, _| s.toggle_flashlight());
    }

    /// Floor click from the renderer's raycast. Returns the new hotspot id.
    pub fn floor_click(&self, x: f32, y: f32, z: f32) -> Option<f64> {
        self.with_session(|s, _| s.floor_click(Some(Vec3::new(x, y, z))))
            .flatten()
            .map(|id| id.0 as f64)
    }

    pub fn floor_hover(&self, x: f32, y: f32, z: f32) {
        self.with_session(|s, _| s.floor_hover(Some(Vec3::new(x, y, z))));
    }

    pub fn floor_leave(&self) {
        self.with_session(|s, _| s.floor_hover(None));
    }

    pub fn update_hotspot_json(&self, id: f64, patch_json: &str) -> Result<bool, JsValue> {
        let patch: HotspotPatch = serde_json::from_str(patch_json).map_err(js_err)?;
        Ok(self
            .with_session(|s, _| s.update_hotspot(hotspot_id(id), &patch))
            .unwrap_or(false))
    }

    pub fn translate_hotspot(&self, id: f64, x: f32, y: f32, z: f32) -> bool {
        self.with_session(|s, _| s.translate_hotspot(hotspot_id(id), Vec3::new(x, y, z)))
            .unwrap_or(false)
    }

    pub fn delete_hotspot(&self, id: f64) -> bool {
        self.with_session(|s, _| s.delete_hotspot(hotspot_id(id)))
            .unwrap_or(false)
    }

    pub fn select_hotspot(&self, id: Option<f64>) {
        self.with_session(|s, _| s.select_hotspot(id.map(hotspot_id)));
    }

    pub fn hover_hotspot(&self, id: f64, hovered: bool) {
        self.with_session(|s, _| s.hover_hotspot(hotspot_id(id), hovered));
    }

    pub fn set_atmosphere_json(&self, patch_json: &str) -> Result<(), JsValue> {
        let patch: AtmospherePatch = serde_json::from_str(patch_json).map_err(js_err)?;
        self.with_session(|s, _| s.set_atmosphere(&patch));
        Ok(())
    }

    /// Stop the frame loop, unhook listeners and fade the ambient track out.
    pub fn unmount(&mut self) {
        if !self.running.replace(false) {
            return;
        }
        self.listeners = None;
        let mut state = self.state.borrow_mut();
        state.overlay.clear(&self.document);
        if self.document.pointer_lock_element().is_some() {
            self.document.exit_pointer_lock();
        }
        let Some(session) = state.session.take() else {
            return;
        };
        let mut audio = std::mem::take(&mut state.audio);
        if let Some(fade) = session.teardown(&mut audio) {
            frame::start_fade_out(fade, audio);
        }
        state.last_output = None;
    }
}
