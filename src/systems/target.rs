//! Shooting targets, mounted in batches on the level's obstacles.

use bevy_ecs::resource::Resource;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, warn};

use crate::constants::target::{COUNT, TREE_OFFSET, TREE_SCALE, WALL_OFFSET, WALL_SCALE};
use crate::systems::components::GameRng;
use crate::systems::level::LevelProfile;
use crate::systems::pool::{Pool, Poolable};
use crate::systems::scene::{SceneGeometry, SceneObject};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vec3,
    /// Facing, in degrees about the vertical axis.
    pub rotation: f32,
    pub scale: f32,
    pub active: bool,
    /// Index of the obstacle this target hangs from.
    pub anchor: usize,
}

impl Target {
    /// Mounts a target on `obstacle` the way `profile` places them.
    pub fn mounted(profile: LevelProfile, obstacle: &SceneObject, anchor: usize, rng: &mut GameRng) -> Self {
        let base = obstacle.position;

        match profile {
            LevelProfile::Forest => {
                let angle = rng.whole_degrees().to_radians();
                let (sin, cos) = angle.sin_cos();
                let x = base.x + cos * TREE_OFFSET;
                let z = base.z + sin * TREE_OFFSET;

                Self {
                    position: Vec3::new(x, obstacle.scale * 3.0, z),
                    rotation: (z - base.z).atan2(x - base.x).to_degrees() + 90.0,
                    scale: TREE_SCALE,
                    active: true,
                    anchor,
                }
            }
            LevelProfile::Facility => {
                let height = 1.0 + rng.0.random_range(0..100u32) as f32 / 100.0 * 2.0;
                let along = (rng.0.random_range(0..100i32) - 50) as f32 / 100.0;

                let (x, z) = if obstacle.rotation == 0.0 {
                    (base.x + along, base.z + WALL_OFFSET)
                } else {
                    (base.x + WALL_OFFSET, base.z + along)
                };

                Self {
                    position: Vec3::new(x, height, z),
                    rotation: obstacle.rotation + 90.0,
                    scale: WALL_SCALE,
                    active: true,
                    anchor,
                }
            }
        }
    }
}

impl Poolable for Target {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// The current batch of targets.
#[derive(Resource, Debug, Default)]
pub struct TargetWave {
    pub pool: Pool<Target>,
    /// Batches spawned since the level started, including the first.
    pub batches: u32,
}

impl TargetWave {
    /// Replaces the current batch with up to [`COUNT`] targets on distinct, randomly chosen obstacles.
    ///
    /// Returns the number of targets placed, which is smaller than [`COUNT`] only when the scene has
    /// fewer obstacles than that.
    pub fn spawn_batch(&mut self, scene: &SceneGeometry, rng: &mut GameRng) -> usize {
        self.pool.release_all();

        let mut available: Vec<usize> = (0..scene.obstacles.len()).collect();
        let mut placed = 0;

        while placed < COUNT && !available.is_empty() {
            let anchor = available.remove(rng.0.random_range(0..available.len()));
            let target = Target::mounted(scene.profile, &scene.obstacles[anchor], anchor, rng);
            self.pool.acquire(target);
            placed += 1;
        }

        self.batches += 1;
        if placed < COUNT {
            warn!(placed, wanted = COUNT, "Not enough obstacles for a full target batch");
        }
        debug!(placed, batch = self.batches, profile = %scene.profile, "Spawned target batch");

        placed
    }

    /// A fresh wave for a newly loaded level.
    pub fn for_scene(scene: &SceneGeometry, rng: &mut GameRng) -> Self {
        let mut wave = Self::default();
        wave.spawn_batch(scene, rng);
        wave
    }

    pub fn cleared(&self) -> bool {
        !self.pool.any_active()
    }

    pub fn targets(&self) -> &[Target] {
        self.pool.slots()
    }
}
