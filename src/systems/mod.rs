//! The simulation's resources and the systems that advance them.
//!
//! Every concern is a single resource in the world; systems are plain functions over those
//! resources, scheduled in a fixed order by [`Game`](crate::game::Game).

pub mod ammo;
pub mod audio;
pub mod camera;
pub mod collision;
pub mod combat;
pub mod components;
pub mod environment;
pub mod explosion;
pub mod input;
pub mod level;
pub mod player;
pub mod pool;
pub mod profiling;
pub mod scene;
pub mod target;
pub mod timer;

pub use self::ammo::{ammo_pickup_system, ammo_respawn_system, ammo_spin_system, AmmoBox, AmmoBoxes, AmmoKind};
pub use self::audio::{audio_system, AudioEvent, AudioResource, AudioState, SilentAudio, Sound, SoundService};
pub use self::camera::{camera_system, screen_shake_system, CameraRig, ScreenShake, ViewMode};
pub use self::combat::{
    bullet_system, fire_system, hit_system, reload_system, try_fire, Bullet, Bullets, ShotRejected, Weapon,
};
pub use self::components::{DeltaTime, GameRng, GlobalState, SimClock};
pub use self::environment::{environment_system, Environment};
pub use self::explosion::{explosion_system, Explosion, Explosions, Particle};
pub use self::input::{input_system, player_control_system, InputSource, InputSourceResource, InputState, ScriptedInput};
pub use self::level::{level_state_system, level_timer_system, Door, GameStage, LevelProfile, LevelState};
pub use self::player::{hazard_damage_system, jump_system, MoveDirection, PlayerState, TurnDirection};
pub use self::pool::{Pool, Poolable};
pub use self::profiling::{profile, SystemId, SystemTimings, Timing};
pub use self::scene::{AssetLoader, AssetLoaderResource, NullAssetLoader, SceneGeometry, SceneObject};
pub use self::target::{Target, TargetWave};
