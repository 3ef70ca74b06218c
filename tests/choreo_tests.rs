// Host-side tests for the scroll intro, story tour and exit camera rigs.

use glam::{DVec3, Quat, Vec3};
use memory_viewer::core::constants::*;
use memory_viewer::core::{
    CameraPose, ExitRig, Hotspot, HotspotId, RigStatus, ScrollIntroRig, ScrollTracker, StoryPhase,
    StoryRig,
};

const DT: f32 = 1.0 / 60.0;

fn hotspot(id: u64, x: f32, z: f32, message: &str) -> Hotspot {
    Hotspot {
        id: HotspotId(id),
        position: DVec3::new(x as f64, HOTSPOT_HEIGHT_F64, z as f64),
        label: format!("h{}", id),
        message: message.to_string(),
        sound_url: String::new(),
        color: "#ffffff".to_string(),
        duration: 4.0,
        sound_limit: 0.0,
    }
}

#[test]
fn scroll_tracker_damps_toward_target() {
    let mut s = ScrollTracker::default();
    s.scroll_by_pixels(800.0 * 3.0, 800.0);
    let first = s.tick(DT);
    assert!(first > 0.0 && first < 1.0);
    for _ in 0..120 {
        s.tick(DT);
    }
    assert_eq!(s.progress(), 1.0);
    s.scroll_by_pixels(1.0e6, 800.0);
    s.tick(DT);
    assert!(s.progress() <= 1.0);
}

#[test]
fn scripted_pose_spans_sky_to_ground() {
    let end = Vec3::new(0.0, 1.7, 5.0);
    let rig = ScrollIntroRig::new(end);
    let top = rig.scripted_pose(0.0);
    assert_eq!(top.position, SKY_POSITION);
    assert_eq!(top.fov_deg, INTRO_FOV_DEG);
    let bottom = rig.scripted_pose(1.0);
    assert!(bottom.position.distance(end) < 1e-5);
    assert!((bottom.fov_deg - EXPLORE_FOV_DEG).abs() < 1e-4);
    let mid = rig.scripted_pose(0.5);
    assert!(mid.position.y < SKY_POSITION.y && mid.position.y > end.y);
}

#[test]
fn intro_follows_scroll_until_lock_in() {
    let mut rig = ScrollIntroRig::new(DEFAULT_START_POSITION);
    let mut pose = rig.scripted_pose(0.0);
    assert_eq!(rig.tick(&mut pose, 0.5, DT), RigStatus::Running);
    assert_eq!(pose, rig.scripted_pose(0.5));
    assert!(!rig.is_locking_in());
}

#[test]
fn lock_in_is_sticky_and_lands_exactly() {
    let end = Vec3::new(0.0, 1.7, 5.0);
    let mut rig = ScrollIntroRig::new(end);
    let mut pose = rig.scripted_pose(0.99);
    assert_eq!(rig.tick(&mut pose, 0.99, DT), RigStatus::Running);
    assert!(rig.is_locking_in());

    // scrolling back up no longer matters
    let mut status = RigStatus::Running;
    for _ in 0..240 {
        status = rig.tick(&mut pose, 0.2, DT);
        if status == RigStatus::Arrived {
            break;
        }
    }
    assert_eq!(status, RigStatus::Arrived);
    assert_eq!(pose.position, end);
    assert_eq!(pose.orientation, Quat::IDENTITY);
    assert_eq!(pose.fov_deg, EXPLORE_FOV_DEG);
    assert_eq!(rig.tick(&mut pose, 0.0, DT), RigStatus::Arrived);
}

#[test]
fn exit_reaches_sky_after_fixed_duration() {
    let start = CameraPose::new(Vec3::new(3.0, 1.7, -4.0), Quat::from_rotation_y(1.0), 60.0);
    let mut rig = ExitRig::new(start, 1000.0);
    let mut pose = start;

    assert_eq!(rig.tick(&mut pose, 2000.0), RigStatus::Running);
    let halfway = start.position.lerp(SKY_POSITION, 0.5);
    assert!(pose.position.distance(halfway) < 1e-4);

    assert_eq!(rig.tick(&mut pose, 2999.0), RigStatus::Running);
    assert_eq!(rig.tick(&mut pose, 3000.0), RigStatus::Arrived);
    assert!(pose.position.distance(SKY_POSITION) < 1e-4);
    assert!((pose.fov_deg - INTRO_FOV_DEG).abs() < 1e-4);
    assert!(pose.forward().y < -0.999);
}

#[test]
fn story_without_hotspots_does_nothing() {
    let mut rig = StoryRig::default();
    let mut pose = CameraPose::new(DEFAULT_START_POSITION, Quat::IDENTITY, 60.0);
    let before = pose;
    assert!(rig.tick(&mut pose, &[], DT, 0.0).is_none());
    assert_eq!(pose, before);
    assert_eq!(rig.index(), None);
}

#[test]
fn story_visits_hotspots_in_order_and_wraps() {
    let hotspots = vec![hotspot(1, 0.0, 0.0, "first"), hotspot(2, 6.0, 0.0, "second")];
    let mut rig = StoryRig::default();
    let mut pose = CameraPose::new(Vec3::new(0.0, 1.7, 5.0), Quat::IDENTITY, 60.0);

    let step_dt = 0.05_f32;
    let mut now = 0.0_f64;
    let mut steps = Vec::new();
    // two full legs (travel + 8 s dwell each) plus the start of a third
    for _ in 0..520 {
        now += step_dt as f64 * 1000.0;
        if let Some(step) = rig.tick(&mut pose, &hotspots, step_dt, now) {
            steps.push(step);
        }
    }
    let order: Vec<usize> = steps.iter().map(|s| s.index).collect();
    assert!(order.len() >= 2);
    assert_eq!(&order[..2], &[0, 1]);
    assert_eq!(steps[0].message, "first");
    assert_eq!(steps[1].id, HotspotId(2));
    if order.len() > 2 {
        assert_eq!(order[2], 0);
    }
}

#[test]
fn story_arrives_at_view_offset_and_waits() {
    let hotspots = vec![hotspot(1, 2.0, -3.0, "hello")];
    let mut rig = StoryRig::default();
    let mut pose = CameraPose::new(Vec3::new(0.0, 1.7, 2.0), Quat::IDENTITY, 60.0);
    let mut now = 0.0;
    let mut arrived_at = None;
    for _ in 0..200 {
        now += 50.0;
        if rig.tick(&mut pose, &hotspots, 0.05, now).is_some() {
            arrived_at = Some(now);
            break;
        }
    }
    let arrived_at = arrived_at.expect("story never arrived");
    let dest = hotspots[0].world_position() + STORY_VIEW_OFFSET;
    assert!(pose.position.distance(dest) < 0.15);
    assert!(matches!(rig.phase(), StoryPhase::Waiting { .. }));

    // still waiting just before the dwell ends
    let mut p = pose;
    rig.tick(&mut p, &hotspots, 0.05, arrived_at + STORY_DWELL_MS - 10.0);
    assert!(matches!(rig.phase(), StoryPhase::Waiting { .. }));
    rig.tick(&mut p, &hotspots, 0.05, arrived_at + STORY_DWELL_MS + 10.0);
    assert_eq!(rig.phase(), StoryPhase::Next);
}

#[test]
fn restart_begins_from_first_hotspot() {
    let hotspots = vec![hotspot(1, 0.0, 0.0, "a"), hotspot(2, 4.0, 0.0, "b")];
    let mut rig = StoryRig::default();
    let mut pose = CameraPose::new(Vec3::new(0.0, 1.7, 5.0), Quat::IDENTITY, 60.0);
    rig.tick(&mut pose, &hotspots, 0.05, 50.0);
    assert_eq!(rig.index(), Some(0));
    rig.restart();
    assert_eq!(rig.index(), None);
    rig.tick(&mut pose, &hotspots, 0.05, 100.0);
    assert_eq!(rig.index(), Some(0));
}

#[test]
fn looking_at_faces_the_target() {
    let pose = CameraPose::looking_at(Vec3::new(0.0, 1.7, 5.0), Vec3::new(0.0, 1.7, 0.0), 60.0);
    assert!(pose.forward().distance(Vec3::NEG_Z) < 1e-5);
    let view = pose.view_matrix();
    let origin = view.transform_point3(pose.position);
    assert!(origin.length() < 1e-4);
    let ahead = view.transform_point3(Vec3::new(0.0, 1.7, 0.0));
    assert!(ahead.z < 0.0);
    let clip = pose.projection_matrix(16.0 / 9.0, 0.1, 100.0) * ahead.extend(1.0);
    assert!(clip.w > 0.0);
}
