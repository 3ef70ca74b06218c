use glam::Vec3;

/// Camera, locomotion, hotspot and audio tuning constants.
///
/// These constants express intended behavior (rates, thresholds, timings)
/// and keep magic numbers out of the state machines.

// Camera poses
pub const SKY_POSITION: Vec3 = Vec3::new(0.0, 20.0, 25.0); // aerial establishing shot
pub const DEFAULT_START_POSITION: Vec3 = Vec3::new(0.0, 1.7, 2.0);
pub const INTRO_LOOK_AT_END: Vec3 = Vec3::new(0.0, 1.7, 0.0);
pub const INTRO_LOOK_HEIGHT_START: f32 = 80.0;
pub const INTRO_FOV_DEG: f32 = 15.0;
pub const EXPLORE_FOV_DEG: f32 = 60.0;
pub const EYE_HEIGHT: f32 = 1.7;

// Scroll-intro lock-in
pub const LOCK_IN_PROGRESS: f32 = 0.98;
pub const LOCK_IN_RATE: f32 = 5.0; // per second
pub const LOCK_IN_ARRIVAL_DIST: f32 = 0.05;

// Scroll tracking
pub const SCROLL_PAGES: f32 = 4.0;
pub const SCROLL_DAMPING_SEC: f32 = 0.2;

// Exit rig
pub const EXIT_DURATION_MS: f64 = 2000.0;

// Story mode
pub const STORY_PROGRESS_RATE: f32 = 0.4; // progress units per second
pub const STORY_VIEW_OFFSET: Vec3 = Vec3::new(0.0, 0.7, 2.0); // up, back from hotspot
pub const STORY_LOOK_RAISE: f32 = 0.7;
pub const STORY_SLERP_RATE: f32 = 5.0;
pub const STORY_ARRIVAL_DIST: f32 = 0.1;
pub const STORY_DWELL_MS: f64 = 8000.0;
pub const STORY_BOB_AMPLITUDE: f32 = 0.0005;
pub const STORY_BOB_FREQ_PER_MS: f64 = 0.001;

// Locomotion
pub const WALK_SPEED: f32 = 4.0;
pub const RUN_SPEED: f32 = 10.0;
pub const ACCEL_RATE: f32 = 8.0;
pub const FRICTION_RATE: f32 = 10.0;
pub const LOOK_RAD_PER_PX: f32 = 0.002 * 0.5; // base rate * pointer speed

// Hotspot geometry
/// Stored height; positions persist at full precision.
pub const HOTSPOT_HEIGHT_F64: f64 = 0.2;
pub const HOTSPOT_HEIGHT: f32 = HOTSPOT_HEIGHT_F64 as f32;
pub const HOTSPOT_HEIGHT_TOLERANCE: f32 = 0.001;
pub const CLICK_PLACE_MAX_DIST: f32 = 7.0;
pub const DEFAULT_PLACE_MAX_DIST: f32 = 5.0;
pub const DROP_AHEAD_DIST: f32 = 2.0;
/// Largest id a stored record may carry (ids are JS millisecond numbers).
pub const MAX_HOTSPOT_ID: u64 = (1 << 53) - 1;

// Hotspot triggering (hysteresis band between enter and exit)
pub const TRIGGER_ENTER_DIST: f32 = 2.5;
pub const TRIGGER_EXIT_DIST: f32 = 3.0;

// Hotspot defaults
pub const DEFAULT_MESSAGE_DURATION_SEC: f32 = 4.0;
pub const MESSAGE_DURATIONS_SEC: [f32; 6] = [2.0, 4.0, 6.0, 8.0, 10.0, 15.0];
pub const HOTSPOT_COLORS: [&str; 6] = [
    "#ffffff", "#ff0055", "#00ffaa", "#00aaff", "#ffaa00", "#aa00ff",
];
pub const DEFAULT_HOTSPOT_SOUND: &str = "/whisper.mp3";

// Hotspot idle motion
pub const MARKER_LIFT: f32 = 0.15;
pub const MARKER_BOB_AMPLITUDE: f32 = 0.05;
pub const MARKER_BOB_FREQ: f32 = 1.5;
pub const MARKER_HIGHLIGHT_SCALE: f32 = 1.3;
pub const MARKER_SCALE_RATE: f32 = 5.0;
pub const MARKER_CORE_PULSE_FREQ: f32 = 3.0;
pub const MARKER_CORE_PULSE_AMPLITUDE: f32 = 0.1;

// Editor cooldowns
pub const PLACE_COOLDOWN_MS: f64 = 500.0;
pub const FLASHLIGHT_COOLDOWN_MS: f64 = 300.0;

// Ambient track: stepped fade, slower in than out
pub const AMBIENT_TARGET_VOLUME: f32 = 0.5;
pub const AMBIENT_VOLUME_STEP: f32 = 0.05;
pub const AMBIENT_FADE_IN_INTERVAL_MS: f64 = 200.0;
pub const AMBIENT_FADE_OUT_INTERVAL_MS: f64 = 100.0;

// Hotspot track: continuous fade
pub const HOTSPOT_TARGET_VOLUME: f32 = 0.5;
pub const HOTSPOT_FADE_RATE: f32 = 2.0; // volume units per second

// Messages
pub const MESSAGE_REVEAL_DELAY_MS: f64 = 50.0;
pub const MESSAGE_HIDE_GRACE_MS: f64 = 600.0;

// Controls hint window after entering the scene
pub const CONTROLS_HINT_SHOW_MS: f64 = 500.0;
pub const CONTROLS_HINT_HIDE_MS: f64 = 8500.0;

// Flashlight
pub const FLASHLIGHT_OFFSET: Vec3 = Vec3::new(0.2, -0.2, 0.0);
pub const FLASHLIGHT_REACH: f32 = 5.0;
pub const FLASHLIGHT_BACKGROUND: &str = "#050505";
pub const FLASHLIGHT_VIGNETTE_DARKNESS: f32 = 0.85;

// Lighting levels (flashlight on, off)
pub const AMBIENT_LIGHT: (f32, f32) = (0.1, 0.5);
pub const DIRECTIONAL_LIGHT: (f32, f32) = (0.2, 1.5);
pub const ENVIRONMENT_LIGHT: (f32, f32) = (0.1, 1.0);

// Post-processing mapping
pub const BLOOM_BASE: f32 = 0.5;
pub const CHROMATIC_OFFSET_SCALE: f32 = 0.002;
