pub mod atmosphere;
pub mod audio_fade;
pub mod camera;
pub mod choreo;
pub mod constants;
pub mod hotspot;
pub mod input_router;
pub mod locomotion;
pub mod message;
pub mod scene;
pub mod session;
pub mod spatial;
pub mod storage;

pub use atmosphere::*;
pub use audio_fade::*;
pub use camera::*;
pub use choreo::*;
pub use hotspot::*;
pub use input_router::*;
pub use locomotion::*;
pub use message::*;
pub use scene::*;
pub use session::*;
pub use spatial::*;
pub use storage::*;
