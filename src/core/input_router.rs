//! Keyboard intent mapping and editor command dispatch.
//!
//! Editor toggles arrive as key-down edges; flashlight and placement are
//! polled from held intents each frame and gated by per-action cooldowns.
//! Everything here is suppressed while a text field has focus or the scene
//! has not started.

use super::constants::{FLASHLIGHT_COOLDOWN_MS, PLACE_COOLDOWN_MS};
use super::locomotion::MoveIntent;
use super::session::EditorMode;
use smallvec::SmallVec;

/// Named boolean intents exposed by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Forward,
    Backward,
    Left,
    Right,
    Run,
    Place,
    ToggleFlashlight,
}

/// Map a `KeyboardEvent.key` (or `.code` for Space) to its intent.
#[inline]
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Intent::Forward),
        "ArrowDown" | "s" | "S" => Some(Intent::Backward),
        "ArrowLeft" | "a" | "A" => Some(Intent::Left),
        "ArrowRight" | "d" | "D" => Some(Intent::Right),
        "Shift" => Some(Intent::Run),
        " " | "Space" => Some(Intent::Place),
        "f" | "F" => Some(Intent::ToggleFlashlight),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub place: bool,
    pub toggle_flashlight: bool,
}

impl InputIntents {
    pub fn set(&mut self, intent: Intent, down: bool) {
        let slot = match intent {
            Intent::Forward => &mut self.forward,
            Intent::Backward => &mut self.backward,
            Intent::Left => &mut self.left,
            Intent::Right => &mut self.right,
            Intent::Run => &mut self.run,
            Intent::Place => &mut self.place,
            Intent::ToggleFlashlight => &mut self.toggle_flashlight,
        };
        *slot = down;
    }

    pub fn movement(&self) -> MoveIntent {
        MoveIntent {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            run: self.run,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    ToggleHotspotEditor,
    ToggleAtmosphereEditor,
    ToggleFlashlight,
    DropHotspot,
}

#[inline]
pub fn editor_toggle_for_key(key: &str) -> Option<EditorCommand> {
    match key {
        "1" => Some(EditorCommand::ToggleHotspotEditor),
        "2" => Some(EditorCommand::ToggleAtmosphereEditor),
        _ => None,
    }
}

/// Timestamp-gated action: fires at most once per window.
#[derive(Clone, Copy, Debug)]
pub struct Cooldown {
    window_ms: f64,
    last_ms: Option<f64>,
}

impl Cooldown {
    pub const fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_ms: None,
        }
    }

    pub fn ready(&self, now_ms: f64) -> bool {
        self.last_ms.map_or(true, |last| now_ms - last >= self.window_ms)
    }

    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if self.ready(now_ms) {
            self.last_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Session state the router needs to gate commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteContext {
    pub started: bool,
    pub mode: EditorMode,
    pub typing: bool,
}

impl RouteContext {
    #[inline]
    fn accepts_keys(&self) -> bool {
        self.started && !self.typing
    }
}

#[derive(Clone, Debug)]
pub struct EditorInputRouter {
    flashlight: Cooldown,
    place: Cooldown,
}

impl Default for EditorInputRouter {
    fn default() -> Self {
        Self {
            flashlight: Cooldown::new(FLASHLIGHT_COOLDOWN_MS),
            place: Cooldown::new(PLACE_COOLDOWN_MS),
        }
    }
}

impl EditorInputRouter {
    pub fn on_key_down(&mut self, key: &str, ctx: RouteContext) -> Option<EditorCommand> {
        if !ctx.accepts_keys() {
            return None;
        }
        editor_toggle_for_key(key)
    }

    /// Held-intent commands for this frame.
    pub fn poll(
        &mut self,
        intents: &InputIntents,
        ctx: RouteContext,
        now_ms: f64,
    ) -> SmallVec<[EditorCommand; 2]> {
        let mut out = SmallVec::new();
        if !ctx.accepts_keys() {
            return out;
        }
        if intents.toggle_flashlight && self.flashlight.try_fire(now_ms) {
            out.push(EditorCommand::ToggleFlashlight);
        }
        if intents.place && ctx.mode == EditorMode::Hotspot && self.place.try_fire(now_ms) {
            out.push(EditorCommand::DropHotspot);
        }
        out
    }

    pub fn reset(&mut self) {
        self.flashlight.reset();
        self.place.reset();
    }
}
