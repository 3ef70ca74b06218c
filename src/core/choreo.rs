//! Time-driven camera rigs: scroll intro, guided story tour and exit.
//!
//! Exactly one rig owns the camera at a time, selected by the session phase.
//! Each rig is an explicit state value advanced by `tick`; none of them
//! block or schedule callbacks.

use super::camera::{approach_factor, ease_in_out_quad, lerp, look_rotation, smoothstep, CameraPose};
use super::constants::*;
use super::hotspot::{Hotspot, HotspotId};
use glam::{Quat, Vec3};

/// Whether a rig is still animating or has reached its end pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RigStatus {
    Running,
    Arrived,
}

/// Damped scroll offset over a fixed number of viewport-high pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollTracker {
    target: f32,
    offset: f32,
}

impl ScrollTracker {
    /// Accumulate a wheel delta measured in CSS pixels.
    pub fn scroll_by_pixels(&mut self, delta_px: f32, viewport_px: f32) {
        let span = viewport_px.max(1.0) * (SCROLL_PAGES - 1.0);
        self.set_target(self.target + delta_px / span);
    }

    pub fn set_target(&mut self, r: f32) {
        self.target = r.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, dt: f32) -> f32 {
        let alpha = 1.0 - (-dt / SCROLL_DAMPING_SEC).exp();
        self.offset += (self.target - self.offset) * alpha;
        if (self.target - self.offset).abs() < 1e-4 {
            self.offset = self.target;
        }
        self.offset
    }

    pub fn progress(&self) -> f32 {
        self.offset
    }
}

/// Aerial-to-ground glide driven by normalized scroll progress.
#[derive(Clone, Debug)]
pub struct ScrollIntroRig {
    end: Vec3,
    locking_in: bool,
    finished: bool,
}

impl ScrollIntroRig {
    pub fn new(end: Vec3) -> Self {
        Self {
            end,
            locking_in: false,
            finished: false,
        }
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn is_locking_in(&self) -> bool {
        self.locking_in
    }

    /// Pose for scroll progress `r` while the user is still scrolling.
    pub fn scripted_pose(&self, r: f32) -> CameraPose {
        let r = r.clamp(0.0, 1.0);
        let position = SKY_POSITION.lerp(self.end, r);
        let look_y = lerp(INTRO_LOOK_HEIGHT_START, EYE_HEIGHT, r);
        CameraPose::looking_at(
            position,
            Vec3::new(0.0, look_y, 0.0),
            lerp(INTRO_FOV_DEG, EXPLORE_FOV_DEG, r),
        )
    }

    pub fn tick(&mut self, pose: &mut CameraPose, r: f32, dt: f32) -> RigStatus {
        if self.finished {
            return RigStatus::Arrived;
        }
        if r > LOCK_IN_PROGRESS {
            self.locking_in = true;
        }
        if !self.locking_in {
            *pose = self.scripted_pose(r);
            return RigStatus::Running;
        }

        let a = approach_factor(LOCK_IN_RATE, dt);
        pose.position = pose.position.lerp(self.end, a);
        let target = look_rotation(pose.position, INTRO_LOOK_AT_END);
        pose.orientation = pose.orientation.slerp(target, a);
        pose.fov_deg = lerp(pose.fov_deg, EXPLORE_FOV_DEG, a);

        if pose.position.distance(self.end) < LOCK_IN_ARRIVAL_DIST {
            self.finished = true;
            *pose = CameraPose::new(self.end, Quat::IDENTITY, EXPLORE_FOV_DEG);
            return RigStatus::Arrived;
        }
        RigStatus::Running
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StoryPhase {
    Next,
    Moving { progress: f32 },
    Waiting { since_ms: f64 },
}

/// Emitted when the story rig arrives at a hotspot.
#[derive(Clone, Debug, PartialEq)]
pub struct StoryStep {
    pub index: usize,
    pub id: HotspotId,
    pub message: String,
    pub duration_sec: f32,
}

/// Guided tour cycling through the hotspot list in order.
#[derive(Clone, Debug)]
pub struct StoryRig {
    index: Option<usize>,
    phase: StoryPhase,
    start: CameraPose,
}

impl Default for StoryRig {
    fn default() -> Self {
        Self {
            index: None,
            phase: StoryPhase::Next,
            start: CameraPose::new(Vec3::ZERO, Quat::IDENTITY, EXPLORE_FOV_DEG),
        }
    }
}

impl StoryRig {
    /// Start the tour over from before the first hotspot.
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> StoryPhase {
        self.phase
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn tick(
        &mut self,
        pose: &mut CameraPose,
        hotspots: &[Hotspot],
        dt: f32,
        now_ms: f64,
    ) -> Option<StoryStep> {
        if hotspots.is_empty() {
            return None;
        }

        if self.phase == StoryPhase::Next {
            let next = self.index.map_or(0, |i| (i + 1) % hotspots.len());
            self.index = Some(next);
            self.start = *pose;
            self.phase = StoryPhase::Moving { progress: 0.0 };
        }

        let mut step = None;
        if let StoryPhase::Moving { progress } = self.phase {
            let Some(target) = self.index.and_then(|i| hotspots.get(i)) else {
                // List shrank under us; pick up from the next valid entry.
                self.phase = StoryPhase::Next;
                return None;
            };
            let dest = target.world_position() + STORY_VIEW_OFFSET;
            let look = target.world_position() + Vec3::new(0.0, STORY_LOOK_RAISE, 0.0);
            let progress = progress + dt * STORY_PROGRESS_RATE;
            let t = progress.min(1.0);
            pose.position = self.start.position.lerp(dest, ease_in_out_quad(t));
            let facing = look_rotation(pose.position, look);
            pose.orientation = pose
                .orientation
                .slerp(facing, approach_factor(STORY_SLERP_RATE, dt));

            if t >= 1.0 || pose.position.distance(dest) < STORY_ARRIVAL_DIST {
                self.phase = StoryPhase::Waiting { since_ms: now_ms };
                step = Some(StoryStep {
                    index: self.index.unwrap_or(0),
                    id: target.id,
                    message: target.message.clone(),
                    duration_sec: target.duration,
                });
            } else {
                self.phase = StoryPhase::Moving { progress };
            }
        } else if let StoryPhase::Waiting { since_ms } = self.phase {
            let bob = (now_ms * STORY_BOB_FREQ_PER_MS).sin() as f32 * STORY_BOB_AMPLITUDE;
            pose.position.y += bob;
            if now_ms - since_ms > STORY_DWELL_MS {
                self.phase = StoryPhase::Next;
            }
        }
        step
    }
}

/// Eases the camera from wherever it is back to the aerial shot.
#[derive(Clone, Debug)]
pub struct ExitRig {
    start: CameraPose,
    started_ms: f64,
}

impl ExitRig {
    pub fn new(start: CameraPose, now_ms: f64) -> Self {
        Self {
            start,
            started_ms: now_ms,
        }
    }

    pub fn tick(&mut self, pose: &mut CameraPose, now_ms: f64) -> RigStatus {
        let t = (((now_ms - self.started_ms) / EXIT_DURATION_MS) as f32).clamp(0.0, 1.0);
        let ease = smoothstep(t);
        let overhead = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        pose.position = self.start.position.lerp(SKY_POSITION, ease);
        pose.orientation = self.start.orientation.slerp(overhead, ease);
        pose.fov_deg = lerp(self.start.fov_deg, INTRO_FOV_DEG, ease);
        if t >= 1.0 {
            RigStatus::Arrived
        } else {
            RigStatus::Running
        }
    }
}
