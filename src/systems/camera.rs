//! The camera rig renderers look through, and the screen shake that rattles it.
//!
//! The rig keeps updating after the game ends so the final scene can still be framed.

use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::trace;

use crate::constants::camera::{
    AIM_DISTANCE_FACTOR, DISTANCE, HEIGHT, LOOK_DISTANCE, NORMAL_FOV, SMOOTHNESS, ZOOM_FOV, ZOOM_SPEED,
};
use crate::constants::player::EYE_HEIGHT;
use crate::constants::shake::{CUTOFF, DECAY, MAX_AMPLITUDE};
use crate::systems::components::GameRng;
use crate::systems::input::InputState;
use crate::systems::player::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    FirstPerson,
    #[default]
    ThirdPerson,
}

/// Decaying random camera offset, started by hazard damage.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenShake {
    pub amplitude: f32,
    /// Horizontal and vertical offset applied to both the eye and the look-at point.
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn start(&mut self) {
        self.amplitude = MAX_AMPLITUDE;
    }

    /// Rolls a new offset within the current amplitude and decays it, stopping once it is negligible.
    pub fn advance(&mut self, rng: &mut GameRng) {
        if self.amplitude > CUTOFF {
            let mut roll = || (rng.0.random_range(0..200i32) - 100) as f32 / 100.0;
            self.offset = Vec2::new(roll(), roll()) * self.amplitude;
            self.amplitude *= DECAY;
        } else {
            self.amplitude = 0.0;
            self.offset = Vec2::ZERO;
        }
    }

    pub fn is_active(&self) -> bool {
        self.amplitude > 0.0
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub view: ViewMode,
    /// Eye position, shake included.
    pub eye: Vec3,
    /// Look-at point, shake included.
    pub at: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Smoothed third-person eye before shake is applied.
    anchor: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        let anchor = Vec3::new(0.0, 2.0, 5.0);
        Self {
            view: ViewMode::default(),
            eye: anchor,
            at: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            fov: NORMAL_FOV,
            anchor,
        }
    }
}

impl CameraRig {
    /// Moves the rig to follow `player` for one tick.
    pub fn follow(&mut self, player: &PlayerState, aiming: bool, shake: &ScreenShake) {
        let target_fov = if aiming { ZOOM_FOV } else { NORMAL_FOV };
        self.fov += (target_fov - self.fov) * ZOOM_SPEED;

        let (yaw_sin, yaw_cos) = player.yaw.to_radians().sin_cos();
        let pitch_sin = player.pitch.to_radians().sin();
        let eye_level = player.position.y + EYE_HEIGHT;
        let sight = Vec3::new(
            player.position.x + yaw_sin * LOOK_DISTANCE,
            eye_level + pitch_sin * LOOK_DISTANCE,
            player.position.z + yaw_cos * LOOK_DISTANCE,
        );

        let at = match self.view {
            ViewMode::FirstPerson => {
                self.anchor = player.eye();
                sight
            }
            ViewMode::ThirdPerson => {
                let distance = if aiming { DISTANCE * AIM_DISTANCE_FACTOR } else { DISTANCE };
                let height = if aiming { EYE_HEIGHT } else { HEIGHT };
                let target = Vec3::new(
                    player.position.x - distance * yaw_sin,
                    player.position.y + height + distance * pitch_sin,
                    player.position.z - distance * yaw_cos,
                );
                self.anchor += (target - self.anchor) * SMOOTHNESS;

                if aiming {
                    sight
                } else {
                    player.eye()
                }
            }
        };

        let offset = Vec3::new(shake.offset.x, shake.offset.y, 0.0);
        self.eye = self.anchor + offset;
        self.at = at + offset;
    }
}

pub fn screen_shake_system(mut shake: ResMut<ScreenShake>, mut rng: ResMut<GameRng>) {
    if shake.is_active() {
        shake.advance(&mut rng);
        if !shake.is_active() {
            trace!("Screen shake settled");
        }
    }
}

pub fn camera_system(
    player: Res<PlayerState>,
    input: Res<InputState>,
    shake: Res<ScreenShake>,
    mut rig: ResMut<CameraRig>,
) {
    rig.follow(&player, input.aiming, &shake);
}
