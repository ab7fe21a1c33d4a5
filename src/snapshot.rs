//! Read-only view of the world handed to renderers after each tick.

use bevy_ecs::world::World;

use crate::systems::ammo::AmmoBoxes;
use crate::systems::camera::CameraRig;
use crate::systems::combat::{Bullets, Weapon};
use crate::systems::environment::Environment;
use crate::systems::explosion::Explosions;
use crate::systems::input::InputState;
use crate::systems::level::{Door, LevelState};
use crate::systems::player::PlayerState;
use crate::systems::scene::SceneGeometry;
use crate::systems::target::TargetWave;

/// Everything a renderer may draw, borrowed from the world for the duration of one frame.
///
/// Pools are exposed whole; renderers skip inactive slots themselves.
#[derive(Debug, Clone, Copy)]
pub struct WorldSnapshot<'w> {
    pub tick: u64,
    pub player: &'w PlayerState,
    pub weapon: &'w Weapon,
    pub input: &'w InputState,
    pub level: &'w LevelState,
    pub door: &'w Door,
    pub scene: &'w SceneGeometry,
    pub targets: &'w TargetWave,
    pub bullets: &'w Bullets,
    pub explosions: &'w Explosions,
    pub ammo: &'w AmmoBoxes,
    pub camera: &'w CameraRig,
    pub environment: &'w Environment,
}

impl<'w> WorldSnapshot<'w> {
    /// Borrows every resource a renderer needs. The world must have been built by [`Game::new`](crate::game::Game::new).
    pub fn capture(world: &'w World, tick: u64) -> Self {
        Self {
            tick,
            player: world.resource(),
            weapon: world.resource(),
            input: world.resource(),
            level: world.resource(),
            door: world.resource(),
            scene: world.resource(),
            targets: world.resource(),
            bullets: world.resource(),
            explosions: world.resource(),
            ammo: world.resource(),
            camera: world.resource(),
            environment: world.resource(),
        }
    }

    pub fn active_bullets(&self) -> usize {
        self.bullets.0.active_count()
    }

    pub fn active_targets(&self) -> usize {
        self.targets.pool.active_count()
    }
}

/// Draws a snapshot. Implemented by the host; the core never renders.
pub trait Renderer {
    fn render(&mut self, snapshot: &WorldSnapshot);
}
