//! Static scene geometry: the obstacles targets hang from and the hazards that hurt the player.
//!
//! Geometry is generated once per level load from the level's [`LevelProfile`] and is never mutated
//! afterwards. Mesh and texture loading is delegated to an [`AssetLoader`]; placement is owned here.

use bevy_ecs::resource::Resource;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::constants::arena;
use crate::error::AssetError;
use crate::systems::collision::{circle_overlap, rotated_box_contains};
use crate::systems::components::GameRng;
use crate::systems::level::LevelProfile;

/// A placed piece of static geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub position: Vec3,
    /// Rotation about the vertical axis, in degrees.
    pub rotation: f32,
    pub scale: f32,
}

impl SceneObject {
    fn on_ground(x: f32, z: f32, rotation: f32, scale: f32) -> Self {
        Self {
            position: Vec3::new(x, 0.0, z),
            rotation,
            scale,
        }
    }

    /// Planar distance from the world origin.
    fn distance_from_spawn(&self) -> f32 {
        self.position.x.hypot(self.position.z)
    }

    fn planar_distance(&self, other: &SceneObject) -> f32 {
        (self.position.x - other.position.x).hypot(self.position.z - other.position.z)
    }
}

/// How an obstacle blocks movement. Chosen by the level profile, not by the obstacle itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    /// A circle of `radius × scale` around the obstacle.
    Circle { radius: f32 },
    /// A box of `half_length × scale` by `half_thickness × scale`, rotated with the obstacle and
    /// grown by a fixed `buffer`.
    RotatedBox {
        half_length: f32,
        half_thickness: f32,
        buffer: f32,
    },
}

impl ObstacleShape {
    pub fn blocks(&self, obstacle: &SceneObject, x: f32, z: f32) -> bool {
        let centre = obstacle.position;
        match *self {
            ObstacleShape::Circle { radius } => circle_overlap(x, z, 0.0, centre.x, centre.z, radius * obstacle.scale),
            ObstacleShape::RotatedBox {
                half_length,
                half_thickness,
                buffer,
            } => rotated_box_contains(
                x,
                z,
                centre.x,
                centre.z,
                obstacle.rotation,
                half_length * obstacle.scale,
                half_thickness * obstacle.scale,
                buffer,
            ),
        }
    }
}

/// Obstacles (trees or walls) and hazards (rocks or chairs) for the current level.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneGeometry {
    pub profile: LevelProfile,
    pub obstacles: Vec<SceneObject>,
    pub hazards: Vec<SceneObject>,
}

impl SceneGeometry {
    /// Places the obstacles and hazards for `profile`.
    pub fn generate(profile: LevelProfile, rng: &mut GameRng) -> Self {
        let (obstacles, hazards) = match profile {
            LevelProfile::Forest => (
                scatter(rng, arena::TREE_COUNT, 0.5, 50),
                scatter(rng, arena::ROCK_COUNT, 0.3, 40),
            ),
            LevelProfile::Facility => (place_walls(rng), place_chairs(rng)),
        };

        if obstacles.is_empty() {
            warn!(%profile, "Scene generated without obstacles; no targets can be placed");
        }
        debug!(
            %profile,
            obstacles = obstacles.len(),
            hazards = hazards.len(),
            "Generated scene geometry"
        );

        Self {
            profile,
            obstacles,
            hazards,
        }
    }

    /// An empty scene, mostly useful for tests that place geometry by hand.
    pub fn empty(profile: LevelProfile) -> Self {
        Self {
            profile,
            obstacles: Vec::new(),
            hazards: Vec::new(),
        }
    }

    /// Whether any obstacle blocks the ground-plane point `(x, z)`.
    pub fn blocks(&self, x: f32, z: f32) -> bool {
        let shape = self.profile.obstacle_shape();
        self.obstacles.iter().any(|obstacle| shape.blocks(obstacle, x, z))
    }

    /// The first hazard whose contact radius contains `(x, z)`.
    pub fn hazard_at(&self, x: f32, z: f32, radius: f32) -> Option<&SceneObject> {
        self.hazards.iter().find(|hazard| {
            let reach = radius * hazard.scale;
            let dx = x - hazard.position.x;
            let dz = z - hazard.position.z;
            dx * dx + dz * dz < reach * reach
        })
    }
}

/// `count` objects anywhere in the arena, scaled `base + [0, spread)/100`.
fn scatter(rng: &mut GameRng, count: usize, base: f32, spread: u32) -> Vec<SceneObject> {
    (0..count)
        .map(|_| {
            let x = rng.coordinate(arena::SCENE_EXTENT);
            let z = rng.coordinate(arena::SCENE_EXTENT);
            let scale = rng.hundredths(base, spread);
            let rotation = rng.whole_degrees();
            SceneObject::on_ground(x, z, rotation, scale)
        })
        .collect()
}

fn place_walls(rng: &mut GameRng) -> Vec<SceneObject> {
    let mut walls: Vec<SceneObject> = Vec::with_capacity(arena::WALL_ATTEMPTS);

    for attempt in 0..arena::WALL_ATTEMPTS {
        let x = rng.coordinate(arena::SCENE_EXTENT);
        let z = rng.coordinate(arena::SCENE_EXTENT);
        let rotation = if rng.0.random_bool(0.5) { 90.0 } else { 0.0 };
        let wall = SceneObject::on_ground(x, z, rotation, 1.0);

        if wall.distance_from_spawn() < arena::WALL_SPAWN_CLEARANCE {
            trace!(attempt, x, z, "Wall rejected: too close to spawn");
            continue;
        }
        if walls.iter().any(|existing| wall.planar_distance(existing) < arena::WALL_SPACING) {
            trace!(attempt, x, z, "Wall rejected: too close to another wall");
            continue;
        }

        walls.push(wall);
    }

    walls
}

fn place_chairs(rng: &mut GameRng) -> Vec<SceneObject> {
    let mut chairs = Vec::with_capacity(arena::CHAIR_ATTEMPTS);

    for _ in 0..arena::CHAIR_ATTEMPTS {
        let x = rng.coordinate(arena::SCENE_EXTENT);
        let z = rng.coordinate(arena::SCENE_EXTENT);
        let scale = rng.hundredths(0.2, 10);
        let rotation = rng.whole_degrees();
        let chair = SceneObject::on_ground(x, z, rotation, scale);

        if chair.distance_from_spawn() >= arena::CHAIR_SPAWN_CLEARANCE {
            chairs.push(chair);
        }
    }

    chairs
}

/// Loads the meshes and textures a level needs. Invoked at startup and on every level transition.
pub trait AssetLoader {
    fn load_level(&mut self, profile: LevelProfile) -> Result<(), AssetError>;
}

/// Non-send resource wrapper for the host's asset loader.
///
/// Loaders typically own graphics handles that are not `Send`, so this lives in the world as a
/// non-send resource and is only touched from the main thread.
pub struct AssetLoaderResource(pub Box<dyn AssetLoader>);

/// Loader for hosts that have nothing to load, such as tests and the headless binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAssetLoader;

impl AssetLoader for NullAssetLoader {
    fn load_level(&mut self, profile: LevelProfile) -> Result<(), AssetError> {
        debug!(%profile, "Skipping asset load");
        Ok(())
    }
}
