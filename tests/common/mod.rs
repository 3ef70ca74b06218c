// Shared host-side fakes for the integration tests.

#![allow(dead_code)]

use memory_viewer::core::{AudioBackend, PlayOptions, SoundHandle};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Play { url: String, looped: bool, volume: f32 },
    Resume(SoundHandle),
    Volume(SoundHandle, f32),
    Pause(SoundHandle),
    Reset(SoundHandle),
    Release(SoundHandle),
}

/// Records every backend call; optionally refuses to open anything.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<Call>,
    pub refuse: bool,
    next: u32,
}

impl RecordingAudio {
    /// A backend that records calls but never opens a sound.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn plays(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Play { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_volume(&self, handle: SoundHandle) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Volume(h, v) if *h == handle => Some(*v),
            _ => None,
        })
    }

    pub fn released(&self, handle: SoundHandle) -> bool {
        self.calls.contains(&Call::Release(handle))
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl AudioBackend for RecordingAudio {
    fn play(&mut self, url: &str, opts: PlayOptions) -> Option<SoundHandle> {
        self.calls.push(Call::Play {
            url: url.to_string(),
            looped: opts.looped,
            volume: opts.volume,
        });
        if self.refuse {
            return None;
        }
        self.next += 1;
        Some(SoundHandle(self.next))
    }

    fn resume(&mut self, handle: SoundHandle) {
        self.calls.push(Call::Resume(handle));
    }

    fn set_volume(&mut self, handle: SoundHandle, volume: f32) {
        self.calls.push(Call::Volume(handle, volume));
    }

    fn pause(&mut self, handle: SoundHandle) {
        self.calls.push(Call::Pause(handle));
    }

    fn reset(&mut self, handle: SoundHandle) {
        self.calls.push(Call::Reset(handle));
    }

    fn release(&mut self, handle: SoundHandle) {
        self.calls.push(Call::Release(handle));
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
