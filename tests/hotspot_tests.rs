// Host-side tests for hotspot placement, editing, persistence and triggers.

mod common;

use common::{Call, RecordingAudio};
use glam::{DVec3, Quat, Vec3};
use memory_viewer::core::constants::*;
use memory_viewer::core::{
    hotspots_key, legacy_key, planar_distance, CameraPose, HotspotEngine, HotspotId, HotspotPatch,
    IdClock, KeyValueStore, MemoryStore,
};

const SCENE: &str = "scene-test";

fn engine() -> (HotspotEngine, MemoryStore) {
    let store = MemoryStore::new();
    (HotspotEngine::load(&store, SCENE), store)
}

fn place(engine: &mut HotspotEngine, store: &mut MemoryStore, at: Vec3, now: f64) -> HotspotId {
    engine
        .place_at_floor(store, Vec3::new(0.0, EYE_HEIGHT, 0.0), Some(at), now)
        .expect("placement with a floor hit")
}

#[test]
fn id_clock_is_strictly_increasing() {
    let mut ids = IdClock::seeded(100);
    let a = ids.next(50.0);
    let b = ids.next(50.0);
    let c = ids.next(5000.0);
    assert!(a < b && b < c);
    assert_eq!(a, HotspotId(101));
    assert_eq!(c, HotspotId(5000));
}

#[test]
fn click_placement_clamps_and_selects() {
    let (mut e, mut store) = engine();
    let camera = Vec3::new(0.0, EYE_HEIGHT, 0.0);
    let id = e
        .place_at_floor(&mut store, camera, Some(Vec3::new(0.0, 0.0, -30.0)), 1000.0)
        .unwrap();
    let h = e.get(id).unwrap();
    assert_eq!(h.world_position().y, HOTSPOT_HEIGHT);
    assert!((planar_distance(camera, h.world_position()) - CLICK_PLACE_MAX_DIST).abs() < 1e-4);
    assert_eq!(h.label, "New Point");
    assert_eq!(h.message, "Your message here...");
    assert_eq!(h.color, "#ffffff");
    assert_eq!(e.selected(), Some(id));
    assert_eq!(e.revision(), 1);
}

#[test]
fn click_without_floor_hit_is_ignored() {
    let (mut e, mut store) = engine();
    assert!(e.place_at_floor(&mut store, Vec3::ZERO, None, 0.0).is_none());
    assert!(e.is_empty());
    assert_eq!(e.revision(), 0);
    assert!(store.is_empty());
}

#[test]
fn drop_ahead_lands_two_units_forward() {
    let (mut e, mut store) = engine();
    let pose = CameraPose::new(Vec3::new(1.0, EYE_HEIGHT, 1.0), Quat::IDENTITY, 60.0);
    let id = e.drop_ahead(&mut store, &pose, 10.0);
    let h = e.get(id).unwrap();
    assert!(h.world_position().distance(Vec3::new(1.0, HOTSPOT_HEIGHT, -1.0)) < 1e-5);
    assert_eq!(h.color, "#00ffaa");
    assert_eq!(h.label, "Drop Point");
}

#[test]
fn every_edit_persists_and_bumps_revision() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 1.0), 1.0);
    assert!(store.get(&hotspots_key(SCENE)).is_some());

    let r = e.revision();
    assert!(e.update(&mut store, id, &HotspotPatch::label("Bench")));
    assert_eq!(e.revision(), r + 1);

    let reloaded = HotspotEngine::load(&store, SCENE);
    assert_eq!(reloaded.get(id).unwrap().label, "Bench");
}

#[test]
fn position_edits_renormalize_height() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 1.0), 1.0);
    let patch = HotspotPatch {
        position: Some(DVec3::new(2.0, 9.0, 3.0)),
        ..HotspotPatch::default()
    };
    assert!(e.update(&mut store, id, &patch));
    assert_eq!(e.get(id).unwrap().position, DVec3::new(2.0, HOTSPOT_HEIGHT_F64, 3.0));

    assert!(e.translate(&mut store, id, Vec3::new(-1.0, -4.0, 0.5)));
    assert_eq!(e.get(id).unwrap().position, DVec3::new(-1.0, HOTSPOT_HEIGHT_F64, 0.5));
}

#[test]
fn unknown_ids_are_no_ops() {
    let (mut e, mut store) = engine();
    place(&mut e, &mut store, Vec3::new(1.0, 0.0, 1.0), 1.0);
    let r = e.revision();
    assert!(!e.update(&mut store, HotspotId(999_999), &HotspotPatch::label("x")));
    assert!(!e.delete(&mut store, HotspotId(999_999)));
    assert_eq!(e.revision(), r);
}

#[test]
fn delete_clears_selection() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 1.0), 1.0);
    assert_eq!(e.selected(), Some(id));
    assert!(e.delete(&mut store, id));
    assert_eq!(e.selected(), None);
    assert!(e.is_empty());
    e.select(Some(id));
    assert_eq!(e.selected(), None);
}

#[test]
fn load_normalizes_heights_and_reads_legacy_key() {
    let mut store = MemoryStore::new();
    let raw = r##"[{"id":5,"position":[1.0,3.0,2.0],"label":"old","message":"hi","color":"#ff0000"}]"##;
    store.set(&legacy_key(SCENE, "hotspots"), raw).unwrap();
    let e = HotspotEngine::load(&store, SCENE);
    let h = e.get(HotspotId(5)).unwrap();
    assert_eq!(h.position, DVec3::new(1.0, HOTSPOT_HEIGHT_F64, 2.0));
    assert_eq!(h.duration, DEFAULT_MESSAGE_DURATION_SEC);
    assert_eq!(h.effective_sound_url(), DEFAULT_HOTSPOT_SOUND);
}

#[test]
fn malformed_record_loads_empty() {
    let mut store = MemoryStore::new();
    store.set(&hotspots_key(SCENE), "{not json").unwrap();
    assert!(HotspotEngine::load(&store, SCENE).is_empty());
}

#[test]
fn proximity_uses_hysteresis() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::new(0.0, 0.0, 0.0), 1.0);
    let at = |d: f32| Vec3::new(0.0, HOTSPOT_HEIGHT, d);

    assert!(e.evaluate_proximity(at(2.6), false).is_empty());
    let entered = e.evaluate_proximity(at(2.4), false);
    assert_eq!(entered.len(), 1);
    assert_eq!(entered[0].id, id);
    assert_eq!(entered[0].message, "Your message here...");
    assert!(e.is_triggered(id));

    // inside the dead band: no new event, still triggered
    assert!(e.evaluate_proximity(at(2.8), false).is_empty());
    assert!(e.is_triggered(id));
    assert!(e.evaluate_proximity(at(2.4), false).is_empty());

    assert!(e.evaluate_proximity(at(3.0), false).is_empty());
    assert!(!e.is_triggered(id));
    assert_eq!(e.evaluate_proximity(at(2.0), false).len(), 1);
}

#[test]
fn editing_freezes_triggers() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::ZERO, 1.0);
    assert!(e.evaluate_proximity(Vec3::new(0.0, 0.2, 1.0), true).is_empty());
    assert!(!e.is_triggered(id));
}

#[test]
fn hotspot_sound_fades_with_proximity() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::ZERO, 1.0);
    let mut audio = RecordingAudio::default();

    e.evaluate_proximity(Vec3::new(0.0, 0.2, 1.0), false);
    for _ in 0..30 {
        e.tick_sounds(&mut audio, false, 1.0 / 60.0);
    }
    assert_eq!(audio.plays(), vec![DEFAULT_HOTSPOT_SOUND]);
    assert!((e.sound_volume(id).unwrap() - HOTSPOT_TARGET_VOLUME).abs() < 1e-5);

    e.evaluate_proximity(Vec3::new(0.0, 0.2, 10.0), false);
    for _ in 0..40 {
        e.tick_sounds(&mut audio, false, 1.0 / 60.0);
    }
    assert_eq!(e.sound_volume(id), Some(0.0));
    assert_eq!(audio.count(|c| matches!(c, Call::Pause(_))), 1);
    assert_eq!(audio.count(|c| matches!(c, Call::Reset(_))), 1);
}

#[test]
fn deleted_hotspot_releases_its_sound() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::ZERO, 1.0);
    let mut audio = RecordingAudio::default();
    e.evaluate_proximity(Vec3::new(0.0, 0.2, 1.0), false);
    e.tick_sounds(&mut audio, false, 0.1);
    assert!(e.delete(&mut store, id));
    e.tick_sounds(&mut audio, false, 0.1);
    assert_eq!(audio.count(|c| matches!(c, Call::Release(_))), 1);
}

#[test]
fn markers_follow_collection_order_and_selection() {
    let (mut e, mut store) = engine();
    let a = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 0.0), 1.0);
    let b = place(&mut e, &mut store, Vec3::new(2.0, 0.0, 0.0), 2.0);
    let markers = e.markers(0.0);
    assert_eq!(markers.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, b]);
    assert!(!markers[0].selected && markers[1].selected);
    assert_eq!(markers[1].instance.highlight, 1.0);
    assert!((markers[0].instance.position[1] - (HOTSPOT_HEIGHT + MARKER_LIFT)).abs() < 1e-5);
}

#[test]
fn hovered_marker_grows() {
    let (mut e, mut store) = engine();
    let id = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 0.0), 1.0);
    e.select(None);
    e.set_hovered(id, true);
    for _ in 0..120 {
        e.tick_visuals(1.0 / 60.0);
    }
    let m = &e.markers(0.0)[0];
    assert!((m.instance.shell_scale - MARKER_HIGHLIGHT_SCALE).abs() < 1e-3);
    assert_eq!(m.instance.highlight, 0.5);
}

#[test]
fn id_clock_saturates_instead_of_wrapping() {
    let mut ids = IdClock::seeded(u64::MAX);
    assert_eq!(ids.next(0.0), HotspotId(u64::MAX));
}

#[test]
fn unrepresentable_stored_ids_are_skipped() {
    let mut store = MemoryStore::new();
    let raw = r#"[{"id":18446744073709551615,"position":[0,0,0]},{"id":7,"position":[1,0,1]}]"#;
    store.set(&hotspots_key(SCENE), raw).unwrap();
    let mut e = HotspotEngine::load(&store, SCENE);
    assert_eq!(e.len(), 1);
    assert!(e.get(HotspotId(7)).is_some());

    let id = place(&mut e, &mut store, Vec3::new(1.0, 0.0, 0.0), 50.0);
    assert!(id > HotspotId(7));
    assert_eq!(e.len(), 2);
}

#[test]
fn saving_an_untouched_legacy_record_keeps_it_intact() {
    let mut store = MemoryStore::new();
    let raw = r##"[{"id":1700000000000,"position":[1.123456789012,0.2,-4.98765432101],"label":"Bench","message":"We sat here","soundUrl":"/a.mp3","color":"#ff8800","duration":6.0,"soundLimit":3.5}]"##;
    store.set(&legacy_key(SCENE, "hotspots"), raw).unwrap();

    let first = HotspotEngine::load(&store, SCENE);
    first.save(&mut store);
    let saved = store.get(&hotspots_key(SCENE)).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let original: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(saved, original);

    let second = HotspotEngine::load(&store, SCENE);
    assert_eq!(second.hotspots(), first.hotspots());
}

#[test]
fn repeating_a_label_update_keeps_length_and_order() {
    let (mut e, mut store) = engine();
    let ids: Vec<HotspotId> = (0..3)
        .map(|i| place(&mut e, &mut store, Vec3::new(i as f32, 0.0, 0.0), i as f64))
        .collect();
    for _ in 0..2 {
        assert!(e.update(&mut store, ids[1], &HotspotPatch::label("X")));
    }
    let after: Vec<HotspotId> = e.hotspots().iter().map(|h| h.id).collect();
    assert_eq!(after, ids);
    assert_eq!(e.get(ids[1]).unwrap().label, "X");
    assert_eq!(e.get(ids[0]).unwrap().label, "New Point");
}

#[test]
fn trigger_state_sweep_across_the_band() {
    for step in 0..=80 {
        let d = step as f32 * 0.05;
        for was_triggered in [false, true] {
            let (mut e, mut store) = engine();
            let id = place(&mut e, &mut store, Vec3::ZERO, 1.0);
            let prime = if was_triggered { 0.0 } else { 10.0 };
            e.evaluate_proximity(Vec3::new(0.0, HOTSPOT_HEIGHT, prime), false);
            assert_eq!(e.is_triggered(id), was_triggered);

            let events = e.evaluate_proximity(Vec3::new(0.0, HOTSPOT_HEIGHT, d), false);
            let expected = if d < TRIGGER_ENTER_DIST {
                true
            } else if d >= TRIGGER_EXIT_DIST {
                false
            } else {
                was_triggered
            };
            assert_eq!(e.is_triggered(id), expected, "d = {}, was {}", d, was_triggered);
            assert_eq!(events.len(), usize::from(expected && !was_triggered), "d = {}", d);
        }
    }
}
