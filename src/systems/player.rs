//! The player controller: movement, jumping, looking around and taking damage.

use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use glam::Vec3;
use tracing::{debug, trace};

use crate::constants::arena::MAP_BOUNDS;
use crate::constants::player::{
    EYE_HEIGHT, GRAVITY, JUMP_FORCE, LOOK_SENSITIVITY, MAX_HEALTH, MOVE_STEP, PITCH_LIMIT, TURN_STEP,
};
use crate::constants::{hazard, PLAYER_SPAWN};
use crate::systems::audio::{AudioEvent, Sound};
use crate::systems::camera::ScreenShake;
use crate::systems::collision::map_bounds_contains;
use crate::systems::components::SimClock;
use crate::systems::scene::SceneGeometry;
use crate::systems::timer::Cooldown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Vertical movement state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Grounded,
    /// Airborne, rising while `velocity` is positive.
    Jumping { velocity: f32 },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Degrees in `[0, 360)`. Zero faces +Z.
    pub yaw: f32,
    /// Vertical look angle in degrees, positive up.
    pub pitch: f32,
    pub score: u32,
    pub motion: Motion,
    health: f32,
    damage_cooldown: Cooldown,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: PLAYER_SPAWN,
            yaw: 0.0,
            pitch: 0.0,
            score: 0,
            motion: Motion::Grounded,
            health: MAX_HEALTH,
            damage_cooldown: Cooldown::default(),
        }
    }
}

impl PlayerState {
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Sets health directly, clamped into `[0, MAX_HEALTH]`.
    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, MAX_HEALTH);
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self.motion, Motion::Grounded)
    }

    /// Unit vector on the ground plane the player is facing.
    pub fn heading(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    /// Unit vector along the player's line of sight, including pitch.
    pub fn aim_direction(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(yaw_sin * pitch_cos, pitch_sin, yaw_cos * pitch_cos).normalize_or_zero()
    }

    /// Where the player's eyes are.
    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * EYE_HEIGHT
    }

    /// Steps along the heading, unless the destination is off the map or `blocked` rejects it.
    ///
    /// Rejected moves leave the position untouched. Returns whether the move happened.
    pub fn request_move(&mut self, direction: MoveDirection, blocked: impl Fn(f32, f32) -> bool) -> bool {
        let step = match direction {
            MoveDirection::Forward => self.heading() * MOVE_STEP,
            MoveDirection::Backward => -self.heading() * MOVE_STEP,
        };
        let candidate = self.position + step;

        if !map_bounds_contains(candidate.x, candidate.z, MAP_BOUNDS) {
            trace!(x = candidate.x, z = candidate.z, "Move rejected: out of bounds");
            return false;
        }
        if blocked(candidate.x, candidate.z) {
            trace!(x = candidate.x, z = candidate.z, "Move rejected: blocked");
            return false;
        }

        self.position.x = candidate.x;
        self.position.z = candidate.z;
        true
    }

    /// Starts a jump if the player is standing on the ground.
    pub fn request_jump(&mut self) -> bool {
        if !self.is_grounded() || self.position.y > 0.0 {
            trace!(motion = ?self.motion, "Jump rejected: airborne");
            return false;
        }

        self.motion = Motion::Jumping { velocity: JUMP_FORCE };
        true
    }

    /// Advances a jump by one tick, returning `true` on the tick the player lands.
    pub fn integrate_jump(&mut self) -> bool {
        match self.motion {
            Motion::Jumping { velocity } => {
                let next_y = self.position.y + velocity;
                if next_y <= 0.0 {
                    self.position.y = 0.0;
                    self.motion = Motion::Grounded;
                    true
                } else {
                    self.position.y = next_y;
                    self.motion = Motion::Jumping {
                        velocity: velocity - GRAVITY,
                    };
                    false
                }
            }
            Motion::Grounded => {
                if self.position.y < 0.0 {
                    self.position.y = 0.0;
                }
                false
            }
        }
    }

    pub fn turn(&mut self, direction: TurnDirection) {
        let delta = match direction {
            TurnDirection::Left => TURN_STEP,
            TurnDirection::Right => -TURN_STEP,
        };
        self.yaw = (self.yaw + delta).rem_euclid(360.0);
    }

    /// Applies pointer motion: horizontal travel turns, vertical travel pitches within limits.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw = (self.yaw - dx * LOOK_SENSITIVITY).rem_euclid(360.0);
        self.pitch = (self.pitch + dy * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Removes `amount` health unless damage was already taken within the cooldown window.
    ///
    /// Returns whether damage was applied.
    pub fn apply_damage(&mut self, amount: f32, now: f32) -> bool {
        if !self.damage_cooldown.try_trigger(now, hazard::DAMAGE_COOLDOWN) {
            return false;
        }

        self.health = (self.health - amount).clamp(0.0, MAX_HEALTH);
        debug!(amount, health = self.health, "Player damaged");
        true
    }

    /// Returns the player to the spawn point facing forward. Health and score are untouched.
    pub fn reset_to_spawn(&mut self) {
        self.position = PLAYER_SPAWN;
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.motion = Motion::Grounded;
    }
}

pub fn jump_system(mut player: ResMut<PlayerState>) {
    if player.integrate_jump() {
        trace!("Player landed");
    }
}

/// Hurts the player while they stand on a hazard, at most once per cooldown window.
pub fn hazard_damage_system(
    clock: Res<SimClock>,
    scene: Res<SceneGeometry>,
    mut player: ResMut<PlayerState>,
    mut shake: ResMut<ScreenShake>,
    mut audio: EventWriter<AudioEvent>,
) {
    if player.position.y > hazard::GROUND_TOLERANCE {
        return;
    }
    if scene
        .hazard_at(player.position.x, player.position.z, hazard::COLLISION_RADIUS)
        .is_none()
    {
        return;
    }

    if player.apply_damage(hazard::DAMAGE, clock.elapsed) {
        audio.write(AudioEvent::PlaySound(Sound::Damage));
        shake.start();
    }
}
