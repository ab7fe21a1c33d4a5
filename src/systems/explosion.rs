//! Short-lived particle bursts spawned where a target is destroyed.

use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;
use tracing::trace;

use crate::constants::explosion::{GRAVITY, LIFETIME, MIN_SPEED, PARTICLE_COUNT, PARTICLE_SIZE, SPEED_SPREAD};
use crate::systems::components::{DeltaTime, GameRng};
use crate::systems::pool::{Pool, Poolable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub size: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub active: bool,
}

impl Particle {
    /// A particle leaving `origin` at a random yaw, elevation and speed, tinted orange.
    fn burst(origin: Vec3, rng: &mut GameRng) -> Self {
        let yaw = (rng.0.random_range(0..360u32) as f32).to_radians();
        let elevation = (rng.0.random_range(0..180u32) as f32).to_radians();
        let speed = rng.hundredths(MIN_SPEED, (SPEED_SPREAD * 100.0) as u32);

        let velocity = Vec3::new(
            yaw.sin() * elevation.cos(),
            elevation.sin(),
            yaw.cos() * elevation.cos(),
        ) * speed;

        Self {
            position: origin,
            velocity,
            lifetime: 0.0,
            max_lifetime: LIFETIME,
            size: PARTICLE_SIZE,
            color: [1.0, rng.hundredths(0.5, 50), 0.0],
            active: true,
        }
    }

    fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.position += self.velocity * dt;
        self.velocity.y -= GRAVITY * dt;

        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.active = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub origin: Vec3,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub active: bool,
    /// Fixed in size when the explosion is created.
    pub particles: SmallVec<[Particle; PARTICLE_COUNT]>,
}

impl Explosion {
    pub fn new(origin: Vec3, rng: &mut GameRng) -> Self {
        Self {
            origin,
            lifetime: 0.0,
            max_lifetime: LIFETIME,
            active: true,
            particles: (0..PARTICLE_COUNT).map(|_| Particle::burst(origin, rng)).collect(),
        }
    }

    /// Ages the explosion and moves its particles.
    ///
    /// The explosion expires on its own clock, whether or not its particles already have.
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.active = false;
            return;
        }

        for particle in self.particles.iter_mut() {
            particle.advance(dt);
        }
    }

    pub fn active_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|particle| particle.active)
    }
}

impl Poolable for Explosion {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

#[derive(Resource, Debug, Default)]
pub struct Explosions(pub Pool<Explosion>);

impl Explosions {
    pub fn spawn(&mut self, origin: Vec3, rng: &mut GameRng) -> usize {
        let slot = self.0.acquire(Explosion::new(origin, rng));
        trace!(slot, ?origin, "Explosion spawned");
        slot
    }
}

pub fn explosion_system(dt: Res<DeltaTime>, mut explosions: ResMut<Explosions>) {
    for explosion in explosions.0.iter_active_mut() {
        explosion.advance(dt.seconds);
    }
}
