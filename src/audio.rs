use crate::core::{AudioBackend, PlayOptions, SoundHandle};
use fnv::FnvHashMap;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// `HTMLAudioElement` per sound. Autoplay refusals are logged and otherwise
/// ignored; the fade bookkeeping carries on either way.
#[derive(Default)]
pub struct HtmlAudio {
    elements: FnvHashMap<SoundHandle, web::HtmlAudioElement>,
    next: u32,
}

impl HtmlAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_playback(el: &web::HtmlAudioElement, url: &str) {
        match el.play() {
            Ok(promise) => {
                let url = url.to_string();
                spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        log::debug!("[audio] play refused for {}: {:?}", url, e);
                    }
                });
            }
            Err(e) => log::debug!("[audio] play failed for {}: {:?}", url, e),
        }
    }
}

impl AudioBackend for HtmlAudio {
    fn play(&mut self, url: &str, opts: PlayOptions) -> Option<SoundHandle> {
        if url.is_empty() {
            return None;
        }
        let el = match web::HtmlAudioElement::new_with_src(url) {
            Ok(el) => el,
            Err(e) => {
                log::warn!("[audio] could not open {}: {:?}", url, e);
                return None;
            }
        };
        el.set_loop(opts.looped);
        el.set_volume(opts.volume.clamp(0.0, 1.0) as f64);
        Self::start_playback(&el, url);
        self.next += 1;
        let handle = SoundHandle(self.next);
        self.elements.insert(handle, el);
        Some(handle)
    }

    fn resume(&mut self, handle: SoundHandle) {
        if let Some(el) = self.elements.get(&handle) {
            Self::start_playback(el, &el.src());
        }
    }

    fn set_volume(&mut self, handle: SoundHandle, volume: f32) {
        if let Some(el) = self.elements.get(&handle) {
            el.set_volume(volume.clamp(0.0, 1.0) as f64);
        }
    }

    fn pause(&mut self, handle: SoundHandle) {
        if let Some(el) = self.elements.get(&handle) {
            _ = el.pause();
        }
    }

    fn reset(&mut self, handle: SoundHandle) {
        if let Some(el) = self.elements.get(&handle) {
            el.set_current_time(0.0);
        }
    }

    fn release(&mut self, handle: SoundHandle) {
        if let Some(el) = self.elements.remove(&handle) {
            _ = el.pause();
            el.set_src("");
        }
    }
}
