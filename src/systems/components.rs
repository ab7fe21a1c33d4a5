use bevy_ecs::resource::Resource;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::TICK_SECONDS;

/// Host-facing flags that outlive a single tick.
#[derive(Resource, Debug, Default)]
pub struct GlobalState {
    /// Set when the input source asked to quit; the host loop should stop.
    pub exit: bool,
}

#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime {
    /// Floating-point delta time in seconds
    pub seconds: f32,
}

impl Default for DeltaTime {
    fn default() -> Self {
        Self { seconds: TICK_SECONDS }
    }
}

impl DeltaTime {
    /// Creates a new DeltaTime from a floating-point delta time in seconds
    pub fn from_seconds(seconds: f32) -> Self {
        Self { seconds }
    }
}

/// Simulated seconds since the game started. Cooldowns are measured against this, never the wall clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub elapsed: f32,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

/// The single source of randomness for placement, particles and shake.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(SmallRng::from_os_rng())
    }

    /// Uniform integer in `[-extent, extent)`, as a coordinate.
    pub fn coordinate(&mut self, extent: i32) -> f32 {
        self.0.random_range(-extent..extent) as f32
    }

    /// Whole degrees in `[0, 360)`.
    pub fn whole_degrees(&mut self) -> f32 {
        self.0.random_range(0..360u32) as f32
    }

    /// `base + n / 100` for a uniform integer `n` in `[0, hundredths)`.
    pub fn hundredths(&mut self, base: f32, hundredths: u32) -> f32 {
        base + self.0.random_range(0..hundredths) as f32 / 100.0
    }
}
