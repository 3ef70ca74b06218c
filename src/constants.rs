/// DOM element ids and classes the overlay writes to. The host page owns the
/// markup; missing elements are skipped silently.
pub const MESSAGE_ID: &str = "memory-message";
pub const CONTROLS_HINT_ID: &str = "controls-hint";
pub const EDITOR_BADGE_ID: &str = "editor-badge";
pub const SCROLL_HINT_ID: &str = "scroll-hint";

pub const HIDDEN_CLASS: &str = "hidden";
pub const VISIBLE_CLASS: &str = "visible";
// Root element classes mirroring the editor mode
pub const EDIT_HOTSPOT_CLASS: &str = "editing-hotspots";
pub const EDIT_ATMOSPHERE_CLASS: &str = "editing-atmosphere";
pub const FLASHLIGHT_CLASS: &str = "flashlight-on";
