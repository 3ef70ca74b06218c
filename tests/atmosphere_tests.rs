// Host-side tests for atmosphere settings, persistence and render mapping.

use memory_viewer::core::constants::*;
use memory_viewer::core::{
    atmosphere_key, legacy_key, parse_hex_color, AtmospherePatch, AtmosphereSettings,
    AtmosphereStore, KeyValueStore, MemoryStore,
};

const SCENE: &str = "scene-test";

#[test]
fn defaults_match_the_shipped_look() {
    let s = AtmosphereSettings::default();
    assert_eq!(s.bg_color, "#e0e0e0");
    assert_eq!(s.fog_density, 0.02);
    assert_eq!(s.splat_opacity, 1.0);
    assert_eq!(s.vignette_darkness, 0.5);
    assert_eq!(s.preset, "city");
}

#[test]
fn missing_record_loads_defaults() {
    let store = MemoryStore::new();
    let atmo = AtmosphereStore::load(&store, SCENE);
    assert_eq!(*atmo.get(), AtmosphereSettings::default());
}

#[test]
fn set_merges_and_persists() {
    let mut store = MemoryStore::new();
    let mut atmo = AtmosphereStore::load(&store, SCENE);
    let patch = AtmospherePatch {
        fog_density: Some(0.05),
        bg_color: Some("#101010".to_string()),
        ..AtmospherePatch::default()
    };
    atmo.set(&mut store, &patch);
    assert_eq!(atmo.get().fog_density, 0.05);
    assert_eq!(atmo.get().contrast, AtmosphereSettings::default().contrast);

    let reloaded = AtmosphereStore::load(&store, SCENE);
    assert_eq!(*reloaded.get(), *atmo.get());
}

#[test]
fn applying_the_same_patch_twice_is_idempotent() {
    let mut store = MemoryStore::new();
    let mut atmo = AtmosphereStore::load(&store, SCENE);
    let patch = AtmospherePatch {
        grain: Some(0.3),
        ..AtmospherePatch::default()
    };
    atmo.set(&mut store, &patch);
    let first = store.get(&atmosphere_key(SCENE));
    atmo.set(&mut store, &patch);
    assert_eq!(store.get(&atmosphere_key(SCENE)), first);
}

#[test]
fn stored_json_uses_camel_case_and_halation_name() {
    let mut store = MemoryStore::new();
    let atmo = AtmosphereStore::load(&store, SCENE);
    atmo.save(&mut store);
    let raw = store.get(&atmosphere_key(SCENE)).unwrap();
    assert!(raw.contains("\"bgColor\""));
    assert!(raw.contains("\"halationIntensity\""));
    assert!(raw.contains("\"vignetteDarkness\""));
}

#[test]
fn partial_legacy_record_fills_defaults() {
    let mut store = MemoryStore::new();
    store
        .set(&legacy_key(SCENE, "atmosphere"), r##"{"bgColor":"#000000","fogDensity":0.1}"##)
        .unwrap();
    let s = AtmosphereStore::load(&store, SCENE).get();
    assert_eq!(s.bg_color, "#000000");
    assert_eq!(s.fog_density, 0.1);
    assert_eq!(s.grain, 0.0);
    assert_eq!(s.preset, "city");
}

#[test]
fn current_key_wins_over_legacy() {
    let mut store = MemoryStore::new();
    store
        .set(&legacy_key(SCENE, "atmosphere"), r#"{"grain":0.9}"#)
        .unwrap();
    store.set(&atmosphere_key(SCENE), r#"{"grain":0.2}"#).unwrap();
    assert_eq!(AtmosphereStore::load(&store, SCENE).get().grain, 0.2);
}

#[test]
fn render_params_without_flashlight() {
    let s = AtmosphereSettings {
        chromatic: 2.0,
        bloom_intensity: 0.25,
        splat_opacity: 0.5,
        ..AtmosphereSettings::default()
    };
    let r = s.render_params(false);
    assert_eq!(r.background, "#e0e0e0");
    assert_eq!(r.ambient_intensity, AMBIENT_LIGHT.1);
    assert_eq!(r.directional_intensity, DIRECTIONAL_LIGHT.1);
    assert_eq!(r.environment_intensity, ENVIRONMENT_LIGHT.1);
    assert!((r.post.bloom_intensity - 0.75).abs() < 1e-6);
    assert!((r.post.chromatic_offset[0] - 0.004).abs() < 1e-6);
    assert_eq!(r.post.vignette_darkness, 0.5);
    assert!(r.splat_transparent);
}

#[test]
fn flashlight_darkens_the_scene() {
    let r = AtmosphereSettings::default().render_params(true);
    assert_eq!(r.background, FLASHLIGHT_BACKGROUND);
    assert_eq!(r.ambient_intensity, AMBIENT_LIGHT.0);
    assert_eq!(r.directional_intensity, DIRECTIONAL_LIGHT.0);
    assert_eq!(r.environment_intensity, ENVIRONMENT_LIGHT.0);
    assert_eq!(r.post.vignette_darkness, FLASHLIGHT_VIGNETTE_DARKNESS);
    assert_eq!(r.fog_color, parse_hex_color(FLASHLIGHT_BACKGROUND));
    assert!(!r.splat_transparent);
}

#[test]
fn hex_colors_parse_or_fall_back_to_white() {
    assert_eq!(parse_hex_color("#ffffff"), [1.0, 1.0, 1.0]);
    assert_eq!(parse_hex_color("#000"), [0.0, 0.0, 0.0]);
    let c = parse_hex_color("#ff0080");
    assert_eq!(c[0], 1.0);
    assert_eq!(c[1], 0.0);
    assert!((c[2] - 128.0 / 255.0).abs() < 1e-6);
    assert_eq!(parse_hex_color("teal"), [1.0; 3]);
    assert_eq!(parse_hex_color("#zzzzzz"), [1.0; 3]);
    assert_eq!(parse_hex_color("#ééé"), [1.0; 3]);
}

#[test]
fn saving_an_untouched_legacy_record_keeps_it_intact() {
    let mut store = MemoryStore::new();
    let raw = r##"{"bgColor":"#202830","fogDensity":0.035,"splatAlpha":0.2,"splatOpacity":0.9,"splatTint":"#ffeedd","contrast":0.25,"saturation":-0.1,"chromatic":1.5,"vignetteDarkness":0.7,"vignetteBlur":0.4,"halationIntensity":1.2,"grain":0.05,"preset":"forest"}"##;
    store.set(&legacy_key(SCENE, "atmosphere"), raw).unwrap();

    let first = AtmosphereStore::load(&store, SCENE);
    first.save(&mut store);
    let saved = store.get(&atmosphere_key(SCENE)).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let original: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(saved, original);

    let second = AtmosphereStore::load(&store, SCENE);
    assert_eq!(second.get(), first.get());
}
