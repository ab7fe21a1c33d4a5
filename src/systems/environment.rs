//! Ambient lighting: the forest's setting sun and the facility's pulsing lamps.
//!
//! Nothing here affects gameplay; it only feeds the renderer.

use std::f32::consts::PI;

use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use glam::Vec3;

use crate::constants::environment::{
    LAMP_ROTATION_SPEED, LIGHT_INTENSITY_STEP, MAX_LIGHT_INTENSITY, MAX_SUN_HEIGHT, MIN_LIGHT_INTENSITY,
    MIN_SUN_HEIGHT, SUNSET_SPEED, SUN_DISTANCE,
};
use crate::systems::components::DeltaTime;
use crate::systems::level::LevelState;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Position of the sun within its cycle, in `[0, 1)`.
    pub sunset_progress: f32,
    pub sun_position: Vec3,
    /// Light colour of the sun, reddening as it sets.
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    /// Radians.
    pub lamp_rotation: f32,
    pub light_intensity: f32,
    light_rising: bool,
}

impl Default for Environment {
    fn default() -> Self {
        let mut environment = Self {
            sunset_progress: 0.0,
            sun_position: Vec3::ZERO,
            sun_color: [1.0; 3],
            sun_intensity: 1.0,
            lamp_rotation: 0.0,
            light_intensity: MAX_LIGHT_INTENSITY,
            light_rising: false,
        };
        environment.place_sun();
        environment
    }
}

impl Environment {
    pub fn advance_sun(&mut self, dt: f32) {
        self.sunset_progress += dt * SUNSET_SPEED;
        if self.sunset_progress >= 1.0 {
            self.sunset_progress = 0.0;
        }
        self.place_sun();
    }

    fn place_sun(&mut self) {
        let angle = self.sunset_progress * PI;
        let height = (MAX_SUN_HEIGHT * (angle * 0.5).cos()).max(MIN_SUN_HEIGHT);

        self.sun_position = Vec3::new(SUN_DISTANCE * angle.sin(), height, -SUN_DISTANCE * angle.cos());
        self.sun_intensity = 1.0 - self.sunset_progress * 0.7;
        self.sun_color = [1.0, 1.0 - self.sunset_progress * 0.5, 1.0 - self.sunset_progress * 0.8];
    }

    /// Rotates the lamps and bounces the light intensity between its limits.
    pub fn advance_lights(&mut self, dt: f32) {
        self.lamp_rotation += LAMP_ROTATION_SPEED * dt;

        if self.light_rising {
            self.light_intensity += LIGHT_INTENSITY_STEP;
            if self.light_intensity >= MAX_LIGHT_INTENSITY {
                self.light_intensity = MAX_LIGHT_INTENSITY;
                self.light_rising = false;
            }
        } else {
            self.light_intensity -= LIGHT_INTENSITY_STEP;
            if self.light_intensity <= MIN_LIGHT_INTENSITY {
                self.light_intensity = MIN_LIGHT_INTENSITY;
                self.light_rising = true;
            }
        }
    }
}

pub fn environment_system(dt: Res<DeltaTime>, level: Res<LevelState>, mut environment: ResMut<Environment>) {
    environment.advance_lights(dt.seconds);
    if level.profile.has_sun_cycle() {
        environment.advance_sun(dt.seconds);
    }
}
