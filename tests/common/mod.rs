#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::event::{Event, EventRegistry, Events};
use bevy_ecs::world::World;
use glam::Vec3;
use marksman::error::{AssetError, GameError};
use marksman::events::{GameCommand, GameEvent};
use marksman::game::{Game, GameOptions};
use marksman::systems::{
    AmmoBoxes, AssetLoader, AudioEvent, AudioState, Bullets, CameraRig, DeltaTime, Door, Environment, Explosions,
    GameRng, GlobalState, InputState, LevelProfile, LevelState, NullAssetLoader, PlayerState, SceneGeometry,
    SceneObject, ScreenShake, SilentAudio, SimClock, Sound, SoundService, SystemTimings, TargetWave, Timing, Weapon,
};

pub const SEED: u64 = 0x5EED;

/// A world holding every simulation resource, with an empty scene for `level`.
pub fn create_test_world(level: u8) -> World {
    let mut world = World::new();

    EventRegistry::register_event::<GameCommand>(&mut world);
    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);
    EventRegistry::register_event::<GameError>(&mut world);

    let level = LevelState::new(level).expect("test level must exist");
    world.insert_resource(SceneGeometry::empty(level.profile));
    world.insert_resource(level);
    world.insert_resource(GlobalState::default());
    world.insert_resource(DeltaTime::default());
    world.insert_resource(SimClock::default());
    world.insert_resource(Timing::default());
    world.insert_resource(SystemTimings::default());
    world.insert_resource(InputState::default());
    world.insert_resource(AudioState::default());
    world.insert_resource(PlayerState::default());
    world.insert_resource(Weapon::default());
    world.insert_resource(Bullets::default());
    world.insert_resource(Explosions::default());
    world.insert_resource(Door::default());
    world.insert_resource(CameraRig::default());
    world.insert_resource(ScreenShake::default());
    world.insert_resource(Environment::default());
    world.insert_resource(TargetWave::default());
    world.insert_resource(AmmoBoxes::default());
    world.insert_resource(GameRng::seeded(SEED));

    world
}

/// Events of type `E` written since the world was created (or last updated).
pub fn written<E: Event + Clone>(world: &World) -> Vec<E> {
    world.resource::<Events<E>>().iter_current_update_events().cloned().collect()
}

pub fn sounds(world: &World) -> Vec<Sound> {
    written::<AudioEvent>(world)
        .into_iter()
        .filter_map(|event| match event {
            AudioEvent::PlaySound(sound) => Some(sound),
            AudioEvent::StopAll => None,
        })
        .collect()
}

pub fn object(x: f32, z: f32, scale: f32) -> SceneObject {
    SceneObject {
        position: Vec3::new(x, 0.0, z),
        rotation: 0.0,
        scale,
    }
}

pub fn scene_with_obstacles(profile: LevelProfile, obstacles: Vec<SceneObject>) -> SceneGeometry {
    SceneGeometry {
        obstacles,
        ..SceneGeometry::empty(profile)
    }
}

pub fn create_game(level: u8) -> Game {
    Game::new(
        GameOptions {
            seed: Some(SEED),
            start_level: level,
        },
        Box::new(NullAssetLoader),
        Box::new(SilentAudio),
    )
    .expect("game should build")
}

/// Records every sound handed to the backend.
#[derive(Clone, Default)]
pub struct RecordingAudio {
    pub played: Rc<RefCell<Vec<Sound>>>,
    pub stops: Rc<RefCell<u32>>,
}

impl SoundService for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.played.borrow_mut().push(sound);
    }

    fn stop_all(&mut self) {
        *self.stops.borrow_mut() += 1;
    }
}

/// Records every level load, optionally failing for one profile.
#[derive(Clone, Default)]
pub struct RecordingLoader {
    pub loaded: Rc<RefCell<Vec<LevelProfile>>>,
    pub fail_on: Option<LevelProfile>,
}

impl AssetLoader for RecordingLoader {
    fn load_level(&mut self, profile: LevelProfile) -> Result<(), AssetError> {
        self.loaded.borrow_mut().push(profile);
        match self.fail_on {
            Some(failing) if failing == profile => Err(AssetError::NotFound(format!("{profile} meshes"))),
            _ => Ok(()),
        }
    }
}
