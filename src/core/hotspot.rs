//! Author-placed narrative markers: placement, editing, proximity triggers,
//! per-hotspot sound fades and the render descriptors the renderer draws.
//!
//! The collection is treated as immutable: every edit builds a new `Vec` and
//! swaps the shared snapshot, bumping `revision` so readers can detect
//! changes cheaply.

use super::atmosphere::parse_hex_color;
use super::audio_fade::{AudioBackend, HotspotFade};
use super::camera::{approach_factor, CameraPose};
use super::constants::*;
use super::spatial::clamped_floor_position;
use super::storage::{hotspots_key, legacy_key, load_json_any, save_json, KeyValueStore};
use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::rc::Rc;

/// Creation-time ordered identifier (milliseconds, bumped to stay unique).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotspotId(pub u64);

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_duration() -> f32 {
    DEFAULT_MESSAGE_DURATION_SEC
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: HotspotId,
    /// Kept in f64 so records written elsewhere survive a save unchanged.
    pub position: DVec3,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub message: String,
    /// Empty means the default whisper clip.
    #[serde(default)]
    pub sound_url: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Seconds the triggered message stays visible.
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Seconds of audible playback before the loop stops; 0 loops forever.
    #[serde(default)]
    pub sound_limit: f32,
}

impl Hotspot {
    pub fn effective_sound_url(&self) -> &str {
        if self.sound_url.is_empty() {
            DEFAULT_HOTSPOT_SOUND
        } else {
            &self.sound_url
        }
    }

    pub fn world_position(&self) -> Vec3 {
        self.position.as_vec3()
    }

    fn normalized(mut self) -> Self {
        self.position.y = HOTSPOT_HEIGHT_F64;
        self
    }
}

/// Partial edit from the hotspot panel or the translate gizmo.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotspotPatch {
    pub position: Option<DVec3>,
    pub label: Option<String>,
    pub message: Option<String>,
    pub sound_url: Option<String>,
    pub color: Option<String>,
    pub duration: Option<f32>,
    pub sound_limit: Option<f32>,
}

impl HotspotPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    fn apply(&self, h: &Hotspot) -> Hotspot {
        let mut out = h.clone();
        if let Some(p) = self.position {
            out.position = p;
        }
        if let Some(v) = &self.label {
            out.label = v.clone();
        }
        if let Some(v) = &self.message {
            out.message = v.clone();
        }
        if let Some(v) = &self.sound_url {
            out.sound_url = v.clone();
        }
        if let Some(v) = &self.color {
            out.color = v.clone();
        }
        if let Some(v) = self.duration {
            out.duration = v;
        }
        if let Some(v) = self.sound_limit {
            out.sound_limit = v;
        }
        out.normalized()
    }
}

/// Hands out strictly increasing ids based on wall-clock milliseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdClock {
    last: u64,
}

impl IdClock {
    pub fn seeded(last: u64) -> Self {
        Self { last }
    }

    pub fn next(&mut self, now_ms: f64) -> HotspotId {
        let candidate = now_ms.max(0.0) as u64;
        self.last = candidate.max(self.last.saturating_add(1));
        HotspotId(self.last)
    }
}

/// Proximity entry: the message to show.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub id: HotspotId,
    pub message: String,
    pub duration_sec: f32,
}

/// GPU-friendly marker descriptor; castable to `&[f32]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotInstance {
    pub position: [f32; 3],
    pub shell_scale: f32,
    pub color: [f32; 4],
    pub core_scale: f32,
    pub highlight: f32,
    #[serde(skip)]
    pub _pad: [f32; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotMarker {
    pub id: HotspotId,
    pub label: String,
    pub selected: bool,
    pub triggered: bool,
    pub instance: HotspotInstance,
}

#[derive(Debug)]
struct HotspotRuntime {
    triggered: bool,
    hovered: bool,
    scale: f32,
    sound: HotspotFade,
}

impl HotspotRuntime {
    fn new(url: &str) -> Self {
        Self {
            triggered: false,
            hovered: false,
            scale: 1.0,
            sound: HotspotFade::new(url),
        }
    }
}

pub struct HotspotEngine {
    scene_id: String,
    hotspots: Rc<Vec<Hotspot>>,
    revision: u64,
    selected: Option<HotspotId>,
    ghost: Option<Vec3>,
    runtime: FnvHashMap<HotspotId, HotspotRuntime>,
    ids: IdClock,
}

impl HotspotEngine {
    pub fn new(scene_id: &str, hotspots: Vec<Hotspot>) -> Self {
        let hotspots: Vec<Hotspot> = hotspots
            .into_iter()
            .filter(|h| {
                let ok = h.id.0 <= MAX_HOTSPOT_ID;
                if !ok {
                    log::warn!("[hotspots] skipping record with id {}", h.id.0);
                }
                ok
            })
            .map(Hotspot::normalized)
            .collect();
        let last = hotspots.iter().map(|h| h.id.0).max().unwrap_or(0);
        let runtime = hotspots
            .iter()
            .map(|h| (h.id, HotspotRuntime::new(h.effective_sound_url())))
            .collect();
        Self {
            scene_id: scene_id.to_string(),
            hotspots: Rc::new(hotspots),
            revision: 0,
            selected: None,
            ghost: None,
            runtime,
            ids: IdClock::seeded(last),
        }
    }

    /// Load the scene's hotspots, normalizing every height. Missing or
    /// malformed records yield an empty collection.
    pub fn load(store: &dyn KeyValueStore, scene_id: &str) -> Self {
        let keys = [hotspots_key(scene_id), legacy_key(scene_id, "hotspots")];
        let hotspots = load_json_any::<Vec<Hotspot>>(store, &keys).unwrap_or_default();
        log::info!("[hotspots] loaded {} for {}", hotspots.len(), scene_id);
        Self::new(scene_id, hotspots)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let key = hotspots_key(&self.scene_id);
        if let Err(e) = save_json(store, &key, self.hotspots.as_slice()) {
            log::warn!("[store] could not persist {}: {}", key, e);
        }
    }

    pub fn hotspots(&self) -> Rc<Vec<Hotspot>> {
        self.hotspots.clone()
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected(&self) -> Option<HotspotId> {
        self.selected
    }

    pub fn ghost(&self) -> Option<Vec3> {
        self.ghost
    }

    pub fn is_triggered(&self, id: HotspotId) -> bool {
        self.runtime.get(&id).is_some_and(|r| r.triggered)
    }

    pub fn sound_volume(&self, id: HotspotId) -> Option<f32> {
        self.runtime.get(&id).map(|r| r.sound.volume())
    }

    fn replace(&mut self, store: &mut dyn KeyValueStore, next: Vec<Hotspot>) {
        self.hotspots = Rc::new(next);
        self.revision += 1;
        self.save(store);
    }

    fn append(&mut self, store: &mut dyn KeyValueStore, hotspot: Hotspot) -> HotspotId {
        let id = hotspot.id;
        self.runtime
            .insert(id, HotspotRuntime::new(hotspot.effective_sound_url()));
        let mut next = self.hotspots.as_ref().clone();
        next.push(hotspot.normalized());
        self.replace(store, next);
        self.selected = Some(id);
        id
    }

    /// Place at a floor hit, clamped to the click-placement radius. A click
    /// that hit no floor is ignored.
    pub fn place_at_floor(
        &mut self,
        store: &mut dyn KeyValueStore,
        camera: Vec3,
        floor_point: Option<Vec3>,
        now_ms: f64,
    ) -> Option<HotspotId> {
        let floor_point = floor_point?;
        let position = clamped_floor_position(camera, floor_point, CLICK_PLACE_MAX_DIST);
        let hotspot = Hotspot {
            id: self.ids.next(now_ms),
            position: position.as_dvec3(),
            label: "New Point".to_string(),
            message: "Your message here...".to_string(),
            sound_url: String::new(),
            color: "#ffffff".to_string(),
            duration: DEFAULT_MESSAGE_DURATION_SEC,
            sound_limit: 0.0,
        };
        let id = self.append(store, hotspot);
        log::info!("[hotspots] placed {:?} at ({:.2}, {:.2})", id, position.x, position.z);
        Some(id)
    }

    /// Drop a hotspot a fixed distance in front of the camera.
    pub fn drop_ahead(
        &mut self,
        store: &mut dyn KeyValueStore,
        pose: &CameraPose,
        now_ms: f64,
    ) -> HotspotId {
        let ahead = pose.position + pose.forward() * DROP_AHEAD_DIST;
        let hotspot = Hotspot {
            id: self.ids.next(now_ms),
            position: DVec3::new(ahead.x as f64, HOTSPOT_HEIGHT_F64, ahead.z as f64),
            label: "Drop Point".to_string(),
            message: "Placed via Spacebar".to_string(),
            sound_url: String::new(),
            color: "#00ffaa".to_string(),
            duration: DEFAULT_MESSAGE_DURATION_SEC,
            sound_limit: 0.0,
        };
        let id = self.append(store, hotspot);
        log::info!("[hotspots] dropped {:?}", id);
        id
    }

    /// Merge `patch` into hotspot `id`. Unknown ids are a no-op.
    pub fn update(&mut self, store: &mut dyn KeyValueStore, id: HotspotId, patch: &HotspotPatch) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .hotspots
            .iter()
            .map(|h| if h.id == id { patch.apply(h) } else { h.clone() })
            .collect();
        self.replace(store, next);
        true
    }

    /// Gizmo drag result; height is renormalized.
    pub fn translate(&mut self, store: &mut dyn KeyValueStore, id: HotspotId, position: Vec3) -> bool {
        let patch = HotspotPatch {
            position: Some(position.as_dvec3()),
            ..HotspotPatch::default()
        };
        self.update(store, id, &patch)
    }

    pub fn delete(&mut self, store: &mut dyn KeyValueStore, id: HotspotId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self.hotspots.iter().filter(|h| h.id != id).cloned().collect();
        self.replace(store, next);
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Select an existing hotspot, or clear the selection.
    pub fn select(&mut self, id: Option<HotspotId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn set_hovered(&mut self, id: HotspotId, hovered: bool) {
        if let Some(r) = self.runtime.get_mut(&id) {
            r.hovered = hovered;
        }
    }

    /// Update the placement preview from a floor hover (`None` clears it).
    pub fn set_ghost(&mut self, camera: Vec3, floor_point: Option<Vec3>) {
        self.ghost = floor_point.map(|p| clamped_floor_position(camera, p, CLICK_PLACE_MAX_DIST));
    }

    pub fn clear_ghost(&mut self) {
        self.ghost = None;
    }

    /// Hysteresis trigger: enter below 2.5 units, leave at 3.0 or more.
    /// Frozen while the hotspot editor is open.
    pub fn evaluate_proximity(&mut self, camera: Vec3, editing: bool) -> SmallVec<[TriggerEvent; 2]> {
        let mut events = SmallVec::new();
        if editing {
            return events;
        }
        for h in self.hotspots.iter() {
            let r = self
                .runtime
                .entry(h.id)
                .or_insert_with(|| HotspotRuntime::new(h.effective_sound_url()));
            let dist = camera.distance(h.world_position());
            if dist < TRIGGER_ENTER_DIST && !r.triggered {
                r.triggered = true;
                r.sound.arm();
                log::debug!("[hotspots] triggered {:?} at {:.2}", h.id, dist);
                events.push(TriggerEvent {
                    id: h.id,
                    message: h.message.clone(),
                    duration_sec: h.duration,
                });
            } else if dist >= TRIGGER_EXIT_DIST && r.triggered {
                r.triggered = false;
            }
        }
        events
    }

    /// Reconcile sound sources with the collection, then advance every fade.
    pub fn tick_sounds(&mut self, audio: &mut dyn AudioBackend, editing: bool, dt: f32) {
        let hotspots = self.hotspots.clone();
        self.runtime.retain(|id, r| {
            let alive = hotspots.iter().any(|h| h.id == *id);
            if !alive {
                r.sound.release(audio);
            }
            alive
        });
        for h in hotspots.iter() {
            let url = h.effective_sound_url();
            let r = self
                .runtime
                .entry(h.id)
                .or_insert_with(|| HotspotRuntime::new(url));
            if r.sound.url() != url {
                r.sound.release(audio);
                let armed = r.sound.is_armed();
                r.sound = HotspotFade::new(url);
                if armed {
                    r.sound.arm();
                }
            }
            let audible = r.triggered && !editing;
            r.sound.tick(audio, audible, h.sound_limit, dt);
        }
    }

    pub fn release_sounds(&mut self, audio: &mut dyn AudioBackend) {
        for r in self.runtime.values_mut() {
            r.sound.release(audio);
        }
    }

    /// Ease hover/selection scale.
    pub fn tick_visuals(&mut self, dt: f32) {
        let a = approach_factor(MARKER_SCALE_RATE, dt);
        let selected = self.selected;
        for (id, r) in self.runtime.iter_mut() {
            let target = if r.hovered || selected == Some(*id) {
                MARKER_HIGHLIGHT_SCALE
            } else {
                1.0
            };
            r.scale += (target - r.scale) * a;
        }
    }

    /// Render descriptors in collection order at scene time `elapsed_sec`.
    pub fn markers(&self, elapsed_sec: f32) -> Vec<HotspotMarker> {
        let bob = MARKER_LIFT + (elapsed_sec * MARKER_BOB_FREQ).sin() * MARKER_BOB_AMPLITUDE;
        let core_scale = 1.0 + (elapsed_sec * MARKER_CORE_PULSE_FREQ).sin() * MARKER_CORE_PULSE_AMPLITUDE;
        self.hotspots
            .iter()
            .map(|h| {
                let r = self.runtime.get(&h.id);
                let selected = self.selected == Some(h.id);
                let hovered = r.is_some_and(|r| r.hovered);
                let [cr, cg, cb] = parse_hex_color(&h.color);
                let instance = HotspotInstance {
                    position: (h.world_position() + Vec3::new(0.0, bob, 0.0)).to_array(),
                    shell_scale: r.map_or(1.0, |r| r.scale),
                    color: [cr, cg, cb, 1.0],
                    core_scale,
                    highlight: if selected {
                        1.0
                    } else if hovered {
                        0.5
                    } else {
                        0.0
                    },
                    _pad: [0.0; 2],
                };
                HotspotMarker {
                    id: h.id,
                    label: h.label.clone(),
                    selected,
                    triggered: r.is_some_and(|r| r.triggered),
                    instance,
                }
            })
            .collect()
    }
}
