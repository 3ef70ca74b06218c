//! Top-level scene session: phase machine, editor sub-state and the single
//! per-frame driver.
//!
//! Phases cycle `scrolling -> started -> exiting -> scrolling`. Within one
//! `tick` the order is fixed: input routing, camera (rig or locomotion),
//! hotspot proximity, audio fades, then timers and output. Later stages see
//! this frame's pose.

use super::atmosphere::{AtmospherePatch, AtmosphereSettings, AtmosphereStore, RenderAtmosphere};
use super::audio_fade::{AmbientFade, AudioBackend};
use super::camera::CameraPose;
use super::choreo::{ExitRig, RigStatus, ScrollIntroRig, ScrollTracker, StoryRig};
use super::constants::*;
use super::hotspot::{HotspotEngine, HotspotId, HotspotMarker, HotspotPatch};
use super::input_router::{EditorCommand, EditorInputRouter, InputIntents, RouteContext};
use super::locomotion::{Locomotion, MouseLook};
use super::message::{MessageSlot, MessageView, TriggeredMessage};
use super::scene::SceneConfig;
use super::storage::KeyValueStore;
use glam::{Vec2, Vec3};
use serde::Serialize;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Scrolling,
    Started,
    Exiting,
}

/// Exclusive authoring sub-state; only meaningful while started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditorMode {
    #[default]
    None,
    Hotspot,
    Atmosphere,
}

/// Everything sampled from input collaborators for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub dt: f32,
    pub now_ms: f64,
    pub intents: InputIntents,
    /// Accumulated pointer-lock movement since the last frame.
    pub look_delta: Vec2,
    /// An editable text field has focus.
    pub typing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    PhaseChanged { phase: SessionPhase },
    EditorModeChanged { mode: EditorMode },
    HotspotTriggered { id: HotspotId },
    StoryStep { id: HotspotId, index: usize },
    HotspotPlaced { id: HotspotId },
    FlashlightToggled { on: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FlashlightRig {
    pub position: Vec3,
    pub target: Vec3,
}

/// Per-frame snapshot for the renderer and the DOM overlay.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutput {
    pub phase: SessionPhase,
    pub editor_mode: EditorMode,
    pub story_mode: bool,
    pub scroll_progress: f32,
    pub pose: CameraPose,
    pub markers: Vec<HotspotMarker>,
    pub hotspot_revision: u64,
    pub selected: Option<HotspotId>,
    pub ghost: Option<Vec3>,
    pub message: Option<MessageView>,
    pub flashlight: Option<FlashlightRig>,
    pub atmosphere: RenderAtmosphere,
    pub controls_hint: bool,
    pub events: Vec<SessionEvent>,
}

pub struct SceneSession<S: KeyValueStore> {
    scene: SceneConfig,
    store: S,
    phase: SessionPhase,
    mode: EditorMode,
    story_mode: bool,
    flashlight: bool,
    pose: CameraPose,
    scroll: ScrollTracker,
    intro: ScrollIntroRig,
    story: StoryRig,
    exit: Option<ExitRig>,
    locomotion: Locomotion,
    look: MouseLook,
    router: EditorInputRouter,
    hotspots: HotspotEngine,
    atmosphere: AtmosphereStore,
    ambient: Option<AmbientFade>,
    message: MessageSlot,
    started_at_ms: Option<f64>,
    elapsed_sec: f64,
    last_now_ms: f64,
    pending: Vec<SessionEvent>,
}

impl<S: KeyValueStore> SceneSession<S> {
    /// Load the scene's persisted state, place the camera at the aerial
    /// shot and start the ambient track fading in.
    pub fn activate(scene: SceneConfig, store: S, audio: &mut dyn AudioBackend) -> Self {
        let hotspots = HotspotEngine::load(&store, &scene.id);
        let atmosphere = AtmosphereStore::load(&store, &scene.id);
        let intro = ScrollIntroRig::new(scene.start_position);
        let pose = intro.scripted_pose(0.0);
        let ambient = AmbientFade::start(audio, &scene.audio_url);
        log::info!("[session] activated {}", scene.id);
        Self {
            scene,
            store,
            phase: SessionPhase::Scrolling,
            mode: EditorMode::None,
            story_mode: false,
            flashlight: false,
            pose,
            scroll: ScrollTracker::default(),
            intro,
            story: StoryRig::default(),
            exit: None,
            locomotion: Locomotion::default(),
            look: MouseLook::default(),
            router: EditorInputRouter::default(),
            hotspots,
            atmosphere,
            ambient: Some(ambient),
            message: MessageSlot::default(),
            started_at_ms: None,
            elapsed_sec: 0.0,
            last_now_ms: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn editor_mode(&self) -> EditorMode {
        self.mode
    }

    pub fn story_mode(&self) -> bool {
        self.story_mode
    }

    pub fn flashlight_on(&self) -> bool {
        self.flashlight
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn hotspots(&self) -> &HotspotEngine {
        &self.hotspots
    }

    pub fn atmosphere(&self) -> Rc<AtmosphereSettings> {
        self.atmosphere.get()
    }

    pub fn ambient(&self) -> Option<&AmbientFade> {
        self.ambient.as_ref()
    }

    pub fn active_message(&self) -> Option<&TriggeredMessage> {
        self.message.active()
    }

    fn route_context(&self, typing: bool) -> RouteContext {
        RouteContext {
            started: self.phase == SessionPhase::Started,
            mode: self.mode,
            typing,
        }
    }

    // ---------------- scrolling ----------------

    pub fn scroll_by_pixels(&mut self, delta_px: f32, viewport_px: f32) {
        if self.phase == SessionPhase::Scrolling {
            self.scroll.scroll_by_pixels(delta_px, viewport_px);
        }
    }

    pub fn set_scroll_target(&mut self, r: f32) {
        if self.phase == SessionPhase::Scrolling {
            self.scroll.set_target(r);
        }
    }

    // ---------------- keyboard / commands ----------------

    /// Key-down edge from the input collaborator.
    pub fn key_down(&mut self, key: &str, typing: bool) -> Option<EditorCommand> {
        let cmd = self.router.on_key_down(key, self.route_context(typing))?;
        self.apply_command(cmd, self.last_now_ms);
        Some(cmd)
    }

    fn apply_command(&mut self, cmd: EditorCommand, now_ms: f64) {
        match cmd {
            EditorCommand::ToggleHotspotEditor => self.toggle_editor(EditorMode::Hotspot),
            EditorCommand::ToggleAtmosphereEditor => self.toggle_editor(EditorMode::Atmosphere),
            EditorCommand::ToggleFlashlight => self.toggle_flashlight(),
            EditorCommand::DropHotspot => {
                if self.mode == EditorMode::Hotspot {
                    let id = self.hotspots.drop_ahead(&mut self.store, &self.pose, now_ms);
                    self.pending.push(SessionEvent::HotspotPlaced { id });
                }
            }
        }
    }

    fn toggle_editor(&mut self, target: EditorMode) {
        if self.phase != SessionPhase::Started {
            return;
        }
        self.set_mode(if self.mode == target {
            EditorMode::None
        } else {
            target
        });
    }

    fn set_mode(&mut self, mode: EditorMode) {
        self.hotspots.select(None);
        self.hotspots.clear_ghost();
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.locomotion.stop();
        if mode == EditorMode::None {
            self.look.sync_from(&self.pose);
        }
        log::info!("[session] editor mode {:?}", mode);
        self.pending.push(SessionEvent::EditorModeChanged { mode });
    }

    /// Flashlight button. The `F` key path goes through the router cooldown.
    pub fn toggle_flashlight(&mut self) {
        if self.phase != SessionPhase::Started {
            return;
        }
        self.flashlight = !self.flashlight;
        self.pending.push(SessionEvent::FlashlightToggled { on: self.flashlight });
    }

    /// Story mode restarts from the first hotspot every time it is enabled.
    pub fn set_story_mode(&mut self, on: bool) {
        if self.phase != SessionPhase::Started || on == self.story_mode {
            return;
        }
        self.story_mode = on;
        self.locomotion.stop();
        if on {
            self.story.restart();
        } else {
            self.look.sync_from(&self.pose);
        }
        log::info!("[session] story mode {}", on);
    }

    pub fn toggle_story_mode(&mut self) {
        let on = !self.story_mode;
        self.set_story_mode(on);
    }

    /// Explicit exit; only honored while started.
    pub fn request_exit(&mut self, now_ms: f64) -> bool {
        if self.phase != SessionPhase::Started {
            return false;
        }
        self.set_mode(EditorMode::None);
        self.story_mode = false;
        self.locomotion.stop();
        self.exit = Some(ExitRig::new(self.pose, now_ms));
        self.set_phase(SessionPhase::Exiting);
        true
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        log::info!("[session] phase {:?}", phase);
        self.pending.push(SessionEvent::PhaseChanged { phase });
    }

    fn enter_started(&mut self, now_ms: f64) {
        self.started_at_ms = Some(now_ms);
        self.look.sync_from(&self.pose);
        self.locomotion.stop();
        self.router.reset();
        // anything met on the way down is displayed from here
        self.message.restart(now_ms);
        self.set_phase(SessionPhase::Started);
    }

    fn enter_scrolling(&mut self) {
        self.exit = None;
        self.intro = ScrollIntroRig::new(self.scene.start_position);
        self.scroll.reset();
        self.started_at_ms = None;
        self.message.clear();
        self.set_phase(SessionPhase::Scrolling);
    }

    // ---------------- hotspot editing ----------------

    fn placing(&self) -> bool {
        self.phase == SessionPhase::Started && self.mode == EditorMode::Hotspot
    }

    /// Floor click from the renderer's hit test. `None` means the click
    /// missed the floor and is ignored.
    pub fn floor_click(&mut self, floor_point: Option<Vec3>) -> Option<HotspotId> {
        if !self.placing() {
            return None;
        }
        let id = self.hotspots.place_at_floor(
            &mut self.store,
            self.pose.position,
            floor_point,
            self.last_now_ms,
        )?;
        self.pending.push(SessionEvent::HotspotPlaced { id });
        Some(id)
    }

    pub fn floor_hover(&mut self, floor_point: Option<Vec3>) {
        if self.placing() {
            self.hotspots.set_ghost(self.pose.position, floor_point);
        } else {
            self.hotspots.clear_ghost();
        }
    }

    pub fn update_hotspot(&mut self, id: HotspotId, patch: &HotspotPatch) -> bool {
        self.hotspots.update(&mut self.store, id, patch)
    }

    pub fn translate_hotspot(&mut self, id: HotspotId, position: Vec3) -> bool {
        self.hotspots.translate(&mut self.store, id, position)
    }

    pub fn delete_hotspot(&mut self, id: HotspotId) -> bool {
        self.hotspots.delete(&mut self.store, id)
    }

    pub fn select_hotspot(&mut self, id: Option<HotspotId>) {
        if self.mode == EditorMode::Hotspot {
            self.hotspots.select(id);
        }
    }

    pub fn hover_hotspot(&mut self, id: HotspotId, hovered: bool) {
        self.hotspots.set_hovered(id, hovered);
    }

    pub fn set_atmosphere(&mut self, patch: &AtmospherePatch) {
        self.atmosphere.set(&mut self.store, patch);
    }

    // ---------------- frame driver ----------------

    pub fn tick(&mut self, input: &FrameInput, audio: &mut dyn AudioBackend) -> FrameOutput {
        let dt = input.dt.max(0.0);
        let now = input.now_ms;
        self.last_now_ms = now;
        self.elapsed_sec += dt as f64;

        // 1. held-intent commands
        let ctx = self.route_context(input.typing);
        for cmd in self.router.poll(&input.intents, ctx, now) {
            self.apply_command(cmd, now);
        }

        // 2. camera
        match self.phase {
            SessionPhase::Scrolling => {
                let r = self.scroll.tick(dt);
                if self.intro.tick(&mut self.pose, r, dt) == RigStatus::Arrived {
                    self.enter_started(now);
                }
            }
            SessionPhase::Started => {
                if self.story_mode {
                    let hotspots = self.hotspots.hotspots();
                    if let Some(step) = self.story.tick(&mut self.pose, &hotspots, dt, now) {
                        self.message.show(
                            TriggeredMessage {
                                text: step.message,
                                duration_sec: step.duration_sec,
                            },
                            now,
                        );
                        self.pending.push(SessionEvent::StoryStep {
                            id: step.id,
                            index: step.index,
                        });
                    }
                } else if self.mode == EditorMode::None {
                    self.look.apply(&mut self.pose, input.look_delta);
                    self.locomotion
                        .tick(&mut self.pose, input.intents.movement(), dt);
                }
            }
            SessionPhase::Exiting => {
                let arrived = self
                    .exit
                    .as_mut()
                    .map_or(true, |rig| rig.tick(&mut self.pose, now) == RigStatus::Arrived);
                if arrived {
                    self.enter_scrolling();
                }
            }
        }

        // 3. proximity
        let editing = self.mode == EditorMode::Hotspot;
        for ev in self.hotspots.evaluate_proximity(self.pose.position, editing) {
            self.message.show(
                TriggeredMessage {
                    text: ev.message,
                    duration_sec: ev.duration_sec,
                },
                now,
            );
            self.pending.push(SessionEvent::HotspotTriggered { id: ev.id });
        }

        // 4. audio
        self.hotspots.tick_sounds(audio, editing, dt);
        if let Some(ambient) = self.ambient.as_mut() {
            ambient.tick(audio, dt as f64 * 1000.0);
        }

        // 5. timers
        if self.phase == SessionPhase::Started {
            self.message.tick(now);
        }
        self.hotspots.tick_visuals(dt);

        self.output(now)
    }

    fn output(&mut self, now_ms: f64) -> FrameOutput {
        let started = self.phase == SessionPhase::Started;
        let controls_hint = self.started_at_ms.is_some_and(|t| {
            let since = now_ms - t;
            (CONTROLS_HINT_SHOW_MS..CONTROLS_HINT_HIDE_MS).contains(&since)
        });
        let flashlight = (started && self.flashlight).then(|| FlashlightRig {
            position: self.pose.position + FLASHLIGHT_OFFSET,
            target: self.pose.position + self.pose.forward() * FLASHLIGHT_REACH,
        });
        FrameOutput {
            phase: self.phase,
            editor_mode: self.mode,
            story_mode: self.story_mode,
            scroll_progress: self.scroll.progress(),
            pose: self.pose,
            markers: self.hotspots.markers(self.elapsed_sec as f32),
            hotspot_revision: self.hotspots.revision(),
            selected: self.hotspots.selected(),
            ghost: self.hotspots.ghost(),
            message: if started { self.message.view(now_ms) } else { None },
            flashlight,
            atmosphere: self.atmosphere.get().render_params(self.flashlight),
            controls_hint,
            events: std::mem::take(&mut self.pending),
        }
    }

    /// Release hotspot sounds and hand back the ambient track in its
    /// fade-out; the caller keeps ticking it until it stops.
    pub fn teardown(mut self, audio: &mut dyn AudioBackend) -> Option<AmbientFade> {
        self.hotspots.release_sounds(audio);
        let mut ambient = self.ambient.take()?;
        ambient.begin_fade_out();
        log::info!("[session] teardown {}", self.scene.id);
        Some(ambient)
    }
}
