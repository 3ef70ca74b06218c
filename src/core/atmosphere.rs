//! Per-scene visual tuning: fog, splat look and post-processing.
//!
//! Values are accepted as stored; range limits belong to the editor's sliders
//! and robustness to the renderer.

use super::constants::*;
use super::storage::{atmosphere_key, legacy_key, load_json_any, save_json, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtmosphereSettings {
    pub bg_color: String,
    pub fog_density: f32,
    /// Splat alpha-test threshold.
    pub splat_alpha: f32,
    pub splat_opacity: f32,
    pub splat_tint: String,
    pub contrast: f32,
    pub saturation: f32,
    pub chromatic: f32,
    pub vignette_darkness: f32,
    pub vignette_blur: f32,
    #[serde(rename = "halationIntensity")]
    pub bloom_intensity: f32,
    pub grain: f32,
    /// Environment lighting preset name.
    pub preset: String,
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            bg_color: "#e0e0e0".to_string(),
            fog_density: 0.02,
            splat_alpha: 0.1,
            splat_opacity: 1.0,
            splat_tint: "#ffffff".to_string(),
            contrast: 0.1,
            saturation: 0.0,
            chromatic: 0.0,
            vignette_darkness: 0.5,
            vignette_blur: 0.5,
            bloom_intensity: 0.5,
            grain: 0.0,
            preset: "city".to_string(),
        }
    }
}

/// Partial update from the atmosphere editor.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtmospherePatch {
    pub bg_color: Option<String>,
    pub fog_density: Option<f32>,
    pub splat_alpha: Option<f32>,
    pub splat_opacity: Option<f32>,
    pub splat_tint: Option<String>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub chromatic: Option<f32>,
    pub vignette_darkness: Option<f32>,
    pub vignette_blur: Option<f32>,
    #[serde(rename = "halationIntensity")]
    pub bloom_intensity: Option<f32>,
    pub grain: Option<f32>,
    pub preset: Option<String>,
}

impl AtmosphereSettings {
    pub fn merged(&self, patch: &AtmospherePatch) -> Self {
        let mut out = self.clone();
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = &patch.$field { out.$field = v.clone(); })*
            };
        }
        take!(
            bg_color,
            fog_density,
            splat_alpha,
            splat_opacity,
            splat_tint,
            contrast,
            saturation,
            chromatic,
            vignette_darkness,
            vignette_blur,
            bloom_intensity,
            grain,
            preset
        );
        out
    }

    pub fn render_params(&self, flashlight_on: bool) -> RenderAtmosphere {
        let pick = |levels: (f32, f32)| if flashlight_on { levels.0 } else { levels.1 };
        let background = if flashlight_on {
            FLASHLIGHT_BACKGROUND.to_string()
        } else {
            self.bg_color.clone()
        };
        let chroma = self.chromatic * CHROMATIC_OFFSET_SCALE;
        RenderAtmosphere {
            fog_color: parse_hex_color(&background),
            background,
            fog_density: self.fog_density,
            ambient_intensity: pick(AMBIENT_LIGHT),
            directional_intensity: pick(DIRECTIONAL_LIGHT),
            environment_intensity: pick(ENVIRONMENT_LIGHT),
            environment_preset: self.preset.clone(),
            splat_alpha_test: self.splat_alpha,
            splat_opacity: self.splat_opacity,
            splat_transparent: self.splat_opacity < 1.0,
            splat_tint: parse_hex_color(&self.splat_tint),
            post: PostProcessParams {
                contrast: self.contrast,
                saturation: self.saturation,
                chromatic_offset: [chroma, chroma],
                vignette_darkness: if flashlight_on {
                    FLASHLIGHT_VIGNETTE_DARKNESS
                } else {
                    self.vignette_darkness
                },
                vignette_blur: self.vignette_blur,
                bloom_intensity: self.bloom_intensity + BLOOM_BASE,
                grain: self.grain,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostProcessParams {
    pub contrast: f32,
    pub saturation: f32,
    pub chromatic_offset: [f32; 2],
    pub vignette_darkness: f32,
    pub vignette_blur: f32,
    pub bloom_intensity: f32,
    pub grain: f32,
}

/// Scene-wide parameters the renderer consumes each frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderAtmosphere {
    pub background: String,
    pub fog_color: [f32; 3],
    pub fog_density: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub environment_intensity: f32,
    pub environment_preset: String,
    pub splat_alpha_test: f32,
    pub splat_opacity: f32,
    pub splat_transparent: bool,
    pub splat_tint: [f32; 3],
    pub post: PostProcessParams,
}

/// `#rrggbb` (or `#rgb`) to linear-ish 0..1 RGB; anything else is white.
pub fn parse_hex_color(s: &str) -> [f32; 3] {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return [1.0; 3];
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return [1.0; 3],
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        _ => [1.0; 3],
    }
}

/// Owns one scene's settings. Every `set` replaces the snapshot and persists.
#[derive(Clone, Debug)]
pub struct AtmosphereStore {
    scene_id: String,
    current: Rc<AtmosphereSettings>,
}

impl AtmosphereStore {
    /// Load persisted settings for `scene_id` or start from defaults.
    pub fn load(store: &dyn KeyValueStore, scene_id: &str) -> Self {
        let keys = [atmosphere_key(scene_id), legacy_key(scene_id, "atmosphere")];
        let current = load_json_any::<AtmosphereSettings>(store, &keys).unwrap_or_default();
        Self {
            scene_id: scene_id.to_string(),
            current: Rc::new(current),
        }
    }

    pub fn get(&self) -> Rc<AtmosphereSettings> {
        self.current.clone()
    }

    pub fn set(&mut self, store: &mut dyn KeyValueStore, patch: &AtmospherePatch) {
        self.current = Rc::new(self.current.merged(patch));
        self.save(store);
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let key = atmosphere_key(&self.scene_id);
        if let Err(e) = save_json(store, &key, self.current.as_ref()) {
            log::warn!("[store] could not persist {}: {}", key, e);
        }
    }
}
