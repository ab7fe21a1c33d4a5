//! This module contains all the constants used by the simulation.

use std::time::Duration;

use glam::Vec3;

/// The fixed duration of a single simulation tick.
pub const LOOP_TIME: Duration = Duration::from_millis(16);
/// The fixed duration of a single simulation tick, in seconds.
pub const TICK_SECONDS: f32 = 0.016;

/// Player movement, jumping and health.
pub mod player {
    /// Distance covered by a single move intent.
    pub const MOVE_STEP: f32 = 0.2;
    /// Degrees turned by a single turn intent.
    pub const TURN_STEP: f32 = 2.0;
    /// Initial upward velocity of a jump, per tick.
    pub const JUMP_FORCE: f32 = 0.3;
    /// Velocity lost per tick while airborne.
    pub const GRAVITY: f32 = 0.01;
    pub const MAX_HEALTH: f32 = 100.0;
    /// Height of the eyes above the player's feet.
    pub const EYE_HEIGHT: f32 = 1.7;
    /// Distance in front of the player where third-person shots spawn.
    pub const MUZZLE_DISTANCE: f32 = 1.0;
    /// Degrees of rotation per unit of mouse travel while aiming.
    pub const LOOK_SENSITIVITY: f32 = 0.2;
    /// Vertical look angle is clamped to this many degrees either way.
    pub const PITCH_LIMIT: f32 = 45.0;
}

/// Hazards (rocks, chairs) that hurt the player on contact.
pub mod hazard {
    pub const COLLISION_RADIUS: f32 = 1.0;
    pub const DAMAGE: f32 = 25.0;
    /// Minimum number of seconds between two damage applications.
    pub const DAMAGE_COOLDOWN: f32 = 1.0;
    /// Hazards only hurt when the player is at most this high.
    pub const GROUND_TOLERANCE: f32 = 0.1;
}

/// Magazine, reserves and weapon modifiers.
pub mod weapon {
    pub const MAX_AMMO: u32 = 5;
    pub const MAX_RESERVES: u32 = 30;
    /// Seconds needed to complete a reload.
    pub const RELOAD_TIME: f32 = 2.0;
    pub const NORMAL_FIRE_COOLDOWN: f32 = 0.2;
    pub const FAST_FIRE_COOLDOWN: f32 = 0.1;
    pub const REGULAR_DAMAGE: f32 = 1.0;
    pub const HIGH_DAMAGE: f32 = 2.0;
    pub const EXPLOSIVE_DAMAGE: f32 = 2.5;
}

pub mod bullet {
    pub const SPEED: f32 = 12.0;
    /// Seconds a bullet stays in flight before it is recycled.
    pub const MAX_LIFETIME: f32 = 3.5;
    pub const SCALE: f32 = 0.01;
    /// A bullet hits a target when it is at most this far from it.
    pub const HIT_DISTANCE: f32 = 0.5;
}

pub mod explosion {
    pub const PARTICLE_COUNT: usize = 30;
    /// Seconds an explosion (and each of its particles) lives.
    pub const LIFETIME: f32 = 0.5;
    pub const PARTICLE_SIZE: f32 = 0.05;
    /// Downward acceleration applied to particles.
    pub const GRAVITY: f32 = 5.0;
    pub const MIN_SPEED: f32 = 2.0;
    pub const SPEED_SPREAD: f32 = 1.0;
}

pub mod ammo {
    pub const BOX_COUNT: usize = 5;
    /// The first this-many boxes of a batch carry the level's special ammo.
    pub const SPECIAL_BOX_COUNT: usize = 2;
    pub const PICKUP_RADIUS: f32 = 1.0;
    /// Seconds before a collected box reappears.
    pub const RESPAWN_TIME: f32 = 30.0;
    pub const REGULAR_AMOUNT: u32 = 3;
    pub const SPECIAL_AMOUNT: u32 = 2;
    /// Boxes are placed on integer coordinates in `[-SPAWN_EXTENT, SPAWN_EXTENT)`.
    pub const SPAWN_EXTENT: i32 = 30;
    /// Boxes closer than this to the origin are pushed outward.
    pub const SPAWN_CLEARANCE: f32 = 5.0;
    pub const HEIGHT: f32 = 0.5;
    pub const SCALE: f32 = 0.3;
    /// Degrees per second.
    pub const MIN_SPIN: f32 = 50.0;
    pub const SPIN_SPREAD: u32 = 50;
}

pub mod target {
    /// Targets per batch.
    pub const COUNT: usize = 7;
    /// Distance from a tree trunk to the target mounted on it.
    pub const TREE_OFFSET: f32 = 0.7;
    /// Distance from a wall face to the target mounted on it.
    pub const WALL_OFFSET: f32 = 0.6;
    pub const TREE_SCALE: f32 = 0.005;
    pub const WALL_SCALE: f32 = 0.008;
}

pub mod level {
    pub const FIRST_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 2;
    /// Score required to open the door (or win on the last level).
    pub const WINNING_SCORE: u32 = 5;
    /// Seconds available to complete each level.
    pub const TIME_LIMIT: f32 = 120.0;
    /// Seconds the level-complete notice stays visible.
    pub const NOTICE_TIME: f32 = 2.0;
}

pub mod door {
    use glam::Vec3;

    pub const POSITION: Vec3 = Vec3::new(0.0, 1.0, -10.0);
    pub const SCALE: f32 = 2.0;
    pub const INTERACTION_RADIUS: f32 = 2.0;
}

/// Static arena layout.
pub mod arena {
    /// Players may not leave the square `[-MAP_BOUNDS, MAP_BOUNDS]`.
    pub const MAP_BOUNDS: f32 = 45.0;
    /// Scene objects are placed on integer coordinates in `[-SCENE_EXTENT, SCENE_EXTENT)`.
    pub const SCENE_EXTENT: i32 = 40;
    pub const TREE_COUNT: usize = 15;
    pub const ROCK_COUNT: usize = 10;
    pub const WALL_ATTEMPTS: usize = 15;
    pub const CHAIR_ATTEMPTS: usize = 15;
    pub const TREE_COLLISION_RADIUS: f32 = 1.0;
    pub const WALL_HALF_LENGTH: f32 = 4.0;
    pub const WALL_HALF_THICKNESS: f32 = 0.5;
    /// Extra margin around walls so the player never clips into them.
    pub const WALL_BUFFER: f32 = 0.3;
    pub const WALL_SPAWN_CLEARANCE: f32 = 10.0;
    pub const WALL_SPACING: f32 = 12.0;
    pub const CHAIR_SPAWN_CLEARANCE: f32 = 8.0;
}

pub mod camera {
    pub const DISTANCE: f32 = 3.0;
    pub const HEIGHT: f32 = 1.5;
    /// Fraction of the remaining distance the third-person eye covers each tick.
    pub const SMOOTHNESS: f32 = 0.2;
    /// The third-person camera pulls in to this fraction of its distance while aiming.
    pub const AIM_DISTANCE_FACTOR: f32 = 0.3;
    pub const LOOK_DISTANCE: f32 = 10.0;
    pub const NORMAL_FOV: f32 = 45.0;
    pub const ZOOM_FOV: f32 = 15.0;
    pub const ZOOM_SPEED: f32 = 0.15;
}

pub mod shake {
    pub const MAX_AMPLITUDE: f32 = 0.2;
    pub const DECAY: f32 = 0.9;
    /// Below this amplitude the shake stops entirely.
    pub const CUTOFF: f32 = 0.001;
}

pub mod environment {
    pub const SUNSET_SPEED: f32 = 0.2;
    pub const MAX_SUN_HEIGHT: f32 = 100.0;
    pub const MIN_SUN_HEIGHT: f32 = 5.0;
    pub const SUN_DISTANCE: f32 = 100.0;
    /// Radians per second.
    pub const LAMP_ROTATION_SPEED: f32 = 0.2;
    pub const MIN_LIGHT_INTENSITY: f32 = 0.6;
    pub const MAX_LIGHT_INTENSITY: f32 = 1.0;
    /// Intensity change per tick.
    pub const LIGHT_INTENSITY_STEP: f32 = 0.003;
}

/// Where the player (re)spawns at the start of every level.
pub const PLAYER_SPAWN: Vec3 = Vec3::ZERO;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_time_matches_tick_seconds() {
        assert!((LOOP_TIME.as_secs_f32() - TICK_SECONDS).abs() < f32::EPSILON);
    }

    #[test]
    fn test_door_is_inside_map() {
        assert!(door::POSITION.x.abs() < arena::MAP_BOUNDS);
        assert!(door::POSITION.z.abs() < arena::MAP_BOUNDS);
    }

    #[test]
    fn test_special_boxes_fit_in_batch() {
        assert!(ammo::SPECIAL_BOX_COUNT <= ammo::BOX_COUNT);
    }

    #[test]
    fn test_magazine_fits_in_reserves() {
        assert!(weapon::MAX_AMMO <= weapon::MAX_RESERVES);
    }

    #[test]
    fn test_ammo_spawn_area_inside_map() {
        assert!((ammo::SPAWN_EXTENT as f32) + ammo::SPAWN_CLEARANCE < arena::MAP_BOUNDS);
    }
}
