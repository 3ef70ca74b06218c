//! Volume ramping for the ambient scene track and per-hotspot tracks.
//!
//! The ambient track fades in fixed steps on a timer cadence (slower in than
//! out); hotspot tracks fade continuously with frame time. Playback failures
//! are the backend's problem: fades keep their own volume bookkeeping and
//! carry on silently when a handle is missing.

use super::constants::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayOptions {
    pub looped: bool,
    pub volume: f32,
}

/// Audio collaborator. Decoding and output live behind this seam.
pub trait AudioBackend {
    /// Create a source for `url` and start playing it. `None` if the asset
    /// could not be opened at all.
    fn play(&mut self, url: &str, opts: PlayOptions) -> Option<SoundHandle>;
    /// Resume a paused source.
    fn resume(&mut self, handle: SoundHandle);
    fn set_volume(&mut self, handle: SoundHandle, volume: f32);
    fn pause(&mut self, handle: SoundHandle);
    /// Rewind to the start without changing play state.
    fn reset(&mut self, handle: SoundHandle);
    /// Drop the source; the handle is invalid afterwards.
    fn release(&mut self, handle: SoundHandle);
}

/// Backend that hands out handles and plays nothing.
#[derive(Debug, Default)]
pub struct SilentAudio {
    next: u32,
}

impl AudioBackend for SilentAudio {
    fn play(&mut self, _url: &str, _opts: PlayOptions) -> Option<SoundHandle> {
        self.next += 1;
        Some(SoundHandle(self.next))
    }
    fn resume(&mut self, _handle: SoundHandle) {}
    fn set_volume(&mut self, _handle: SoundHandle, _volume: f32) {}
    fn pause(&mut self, _handle: SoundHandle) {}
    fn reset(&mut self, _handle: SoundHandle) {}
    fn release(&mut self, _handle: SoundHandle) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmbientPhase {
    FadingIn,
    Holding,
    FadingOut,
    Stopped,
}

/// Looping scene soundtrack with stepped fade-in on mount and a faster
/// stepped fade-out on teardown.
#[derive(Debug)]
pub struct AmbientFade {
    handle: Option<SoundHandle>,
    // Volume in whole steps of AMBIENT_VOLUME_STEP; avoids float drift.
    level: u32,
    phase: AmbientPhase,
    accum_ms: f64,
}

impl AmbientFade {
    const TARGET_LEVEL: u32 = (AMBIENT_TARGET_VOLUME / AMBIENT_VOLUME_STEP + 0.5) as u32;

    /// Start `url` looped and silent. An empty url yields a silent fade that
    /// still runs its schedule.
    pub fn start(audio: &mut dyn AudioBackend, url: &str) -> Self {
        let handle = if url.is_empty() {
            None
        } else {
            audio.play(
                url,
                PlayOptions {
                    looped: true,
                    volume: 0.0,
                },
            )
        };
        if handle.is_none() && !url.is_empty() {
            log::debug!("[audio] ambient track unavailable: {}", url);
        }
        Self {
            handle,
            level: 0,
            phase: AmbientPhase::FadingIn,
            accum_ms: 0.0,
        }
    }

    pub fn phase(&self) -> AmbientPhase {
        self.phase
    }

    pub fn volume(&self) -> f32 {
        self.level as f32 * AMBIENT_VOLUME_STEP
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == AmbientPhase::Stopped
    }

    /// Switch to fade-out. The step cadence restarts from now.
    pub fn begin_fade_out(&mut self) {
        if matches!(self.phase, AmbientPhase::FadingIn | AmbientPhase::Holding) {
            self.phase = AmbientPhase::FadingOut;
            self.accum_ms = 0.0;
        }
    }

    pub fn tick(&mut self, audio: &mut dyn AudioBackend, dt_ms: f64) {
        let interval = match self.phase {
            AmbientPhase::FadingIn => AMBIENT_FADE_IN_INTERVAL_MS,
            AmbientPhase::FadingOut => AMBIENT_FADE_OUT_INTERVAL_MS,
            AmbientPhase::Holding | AmbientPhase::Stopped => return,
        };
        self.accum_ms += dt_ms;
        while self.accum_ms >= interval {
            self.accum_ms -= interval;
            match self.phase {
                AmbientPhase::FadingIn => {
                    self.level += 1;
                    self.push_volume(audio);
                    if self.level >= Self::TARGET_LEVEL {
                        self.phase = AmbientPhase::Holding;
                        break;
                    }
                }
                AmbientPhase::FadingOut => {
                    if self.level > 0 {
                        self.level -= 1;
                        self.push_volume(audio);
                    } else {
                        self.stop(audio);
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn push_volume(&self, audio: &mut dyn AudioBackend) {
        if let Some(h) = self.handle {
            audio.set_volume(h, self.volume());
        }
    }

    fn stop(&mut self, audio: &mut dyn AudioBackend) {
        if let Some(h) = self.handle.take() {
            audio.pause(h);
            audio.release(h);
        }
        self.phase = AmbientPhase::Stopped;
    }
}

/// Continuous fade for one hotspot's looping sound.
#[derive(Debug)]
pub struct HotspotFade {
    url: String,
    handle: Option<SoundHandle>,
    volume: f32,
    paused: bool,
    armed: bool,
    played_sec: f32,
}

impl HotspotFade {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            handle: None,
            volume: 0.0,
            paused: true,
            armed: false,
            played_sec: 0.0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Allow playback again (on trigger entry); restarts the sound limit.
    pub fn arm(&mut self) {
        self.armed = true;
        self.played_sec = 0.0;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Ramp toward the target while `audible`, toward silence otherwise.
    /// `limit_sec` > 0 disarms the fade after that much audible time.
    pub fn tick(&mut self, audio: &mut dyn AudioBackend, audible: bool, limit_sec: f32, dt: f32) {
        let step = dt * HOTSPOT_FADE_RATE;
        if audible && self.armed {
            if self.paused {
                self.start_or_resume(audio);
            }
            if self.volume < HOTSPOT_TARGET_VOLUME {
                self.volume = (self.volume + step).min(HOTSPOT_TARGET_VOLUME);
                self.push_volume(audio);
            }
            self.played_sec += dt;
            if limit_sec > 0.0 && self.played_sec >= limit_sec {
                self.armed = false;
            }
        } else if self.volume > 0.0 {
            self.volume = (self.volume - step).max(0.0);
            self.push_volume(audio);
        } else if !self.paused {
            if let Some(h) = self.handle {
                audio.pause(h);
                audio.reset(h);
            }
            self.paused = true;
        }
    }

    /// Release the underlying source, e.g. on teardown or url change.
    pub fn release(&mut self, audio: &mut dyn AudioBackend) {
        if let Some(h) = self.handle.take() {
            audio.pause(h);
            audio.release(h);
        }
        self.paused = true;
        self.volume = 0.0;
    }

    fn start_or_resume(&mut self, audio: &mut dyn AudioBackend) {
        match self.handle {
            Some(h) => audio.resume(h),
            None => {
                self.handle = audio.play(
                    &self.url,
                    PlayOptions {
                        looped: true,
                        volume: self.volume,
                    },
                );
                if self.handle.is_none() {
                    log::debug!("[audio] hotspot sound unavailable: {}", self.url);
                }
            }
        }
        self.paused = false;
    }

    fn push_volume(&self, audio: &mut dyn AudioBackend) {
        if let Some(h) = self.handle {
            audio.set_volume(h, self.volume);
        }
    }
}
