//! Scene catalogue: where each memory's assets live and where the intro
//! glide lands.

use super::constants::DEFAULT_START_POSITION;
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandingText {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub splat_url: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub preview_url: String,
    #[serde(default)]
    pub splat_position: Vec3,
    #[serde(default = "default_splat_scale")]
    pub splat_scale: Vec3,
    #[serde(default = "default_start")]
    pub start_position: Vec3,
    #[serde(default)]
    pub texts: Vec<LandingText>,
}

fn default_splat_scale() -> Vec3 {
    Vec3::splat(2.0)
}

fn default_start() -> Vec3 {
    DEFAULT_START_POSITION
}

fn text(title: &str, body: &str) -> LandingText {
    LandingText {
        title: title.to_string(),
        body: body.to_string(),
    }
}

impl SceneConfig {
    /// Minimal config for an unknown id: default start pose, no assets.
    pub fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            splat_url: "/scene.splat".to_string(),
            audio_url: String::new(),
            preview_url: String::new(),
            splat_position: Vec3::ZERO,
            splat_scale: default_splat_scale(),
            start_position: DEFAULT_START_POSITION,
            texts: Vec::new(),
        }
    }

    pub fn find(id: &str) -> Option<Self> {
        builtin_scenes().into_iter().find(|s| s.id == id)
    }
}

pub fn builtin_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            id: "scene-london".to_string(),
            name: "London".to_string(),
            description: "A spatial memory from London.".to_string(),
            splat_url: "/scene.splat".to_string(),
            audio_url: "/london.mp3".to_string(),
            preview_url: "/london-preview.png".to_string(),
            splat_position: Vec3::ZERO,
            splat_scale: default_splat_scale(),
            start_position: Vec3::new(0.0, 1.7, 5.0),
            texts: vec![
                text(
                    "An impression from a bus ride.",
                    "The moment has been frozen but still remains in a state of movement. Buildings blur while walking by, a visual noise is all around.",
                ),
                text(
                    "Guess where we were heading at?",
                    "You can look close by but also into the streets far away.",
                ),
            ],
        },
        SceneConfig {
            id: "scene-forest".to_string(),
            name: "Forest".to_string(),
            description: "Hiking in Tyrol.".to_string(),
            splat_url: "/forest.splat".to_string(),
            audio_url: "/forest.mp3".to_string(),
            preview_url: "/forest-preview.png".to_string(),
            splat_position: Vec3::ZERO,
            splat_scale: default_splat_scale(),
            start_position: Vec3::new(0.0, 1.6, 2.0),
            texts: vec![
                text(
                    "A lot of white and green.",
                    "There is not much diversity and color to look at. But have a look around the corner. Organic structures and airy depth can be all it needs.",
                ),
                text(
                    "My feet still hurt when thinking of that day.",
                    "Lucky you, we're not at this point of technology, which makes you feel wet and cold feet.",
                ),
            ],
        },
        SceneConfig {
            id: "scene-munich".to_string(),
            name: "Munich".to_string(),
            description: "My room in Munich.".to_string(),
            splat_url: "/munich.splat".to_string(),
            audio_url: "/munich.mp3".to_string(),
            preview_url: "/munich-preview.png".to_string(),
            splat_position: Vec3::new(0.0, -4.0, 0.0),
            splat_scale: Vec3::splat(5.0),
            start_position: Vec3::new(0.0, 1.5, 3.0),
            texts: vec![
                text(
                    "Chaos.",
                    "I still don't have a lot of personal stuff over here, but nonetheless, it is filled by some good and some weird books. Colors and textures I don't like. But the light is great.",
                ),
                text(
                    "Door to the hallway.",
                    "Take a look through the door into the hallway and tell me what you've found.",
                ),
            ],
        },
    ]
}
