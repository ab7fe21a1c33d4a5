//! Spinning ammo boxes: pickup effects, respawn and placement.

use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use bitflags::bitflags;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, trace};

use crate::constants::ammo::{
    BOX_COUNT, HEIGHT, MIN_SPIN, PICKUP_RADIUS, RESPAWN_TIME, SCALE, SPAWN_CLEARANCE, SPAWN_EXTENT, SPIN_SPREAD,
};
use crate::constants::weapon::MAX_RESERVES;
use crate::events::GameEvent;
use crate::systems::collision::circle_overlap;
use crate::systems::combat::Weapon;
use crate::systems::components::{DeltaTime, GameRng};
use crate::systems::level::{LevelProfile, LevelState};
use crate::systems::player::PlayerState;
use crate::systems::pool::{Pool, Poolable};
use crate::systems::timer::Timer;

bitflags! {
    /// What a box contains. Forest boxes are regular or high-damage, facility boxes explosive or
    /// fast-fire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AmmoKind: u8 {
        const REGULAR = 1 << 0;
        const HIGH_DAMAGE = 1 << 1;
        const EXPLOSIVE = 1 << 2;
        const FAST_FIRE = 1 << 3;
    }
}

/// What collecting a box does to the weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupEffect {
    pub damage: f32,
    /// `None` leaves the current fire cooldown untouched.
    pub fire_cooldown: Option<f32>,
    pub reserves: u32,
}

impl PickupEffect {
    pub fn apply(&self, weapon: &mut Weapon) {
        weapon.modifiers.damage = self.damage;
        if let Some(cooldown) = self.fire_cooldown {
            weapon.modifiers.fire_cooldown = cooldown;
        }
        weapon.add_reserves(self.reserves);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmmoBox {
    pub position: Vec3,
    /// Degrees about the vertical axis.
    pub rotation: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
    pub scale: f32,
    pub active: bool,
    pub kind: AmmoKind,
    /// Runs while the box is collected; the box reappears when it finishes.
    pub respawn: Timer,
}

impl AmmoBox {
    pub fn new(position: Vec3, rotation: f32, rotation_speed: f32, kind: AmmoKind) -> Self {
        Self {
            position,
            rotation,
            rotation_speed,
            scale: SCALE,
            active: true,
            kind,
            respawn: Timer::new(RESPAWN_TIME),
        }
    }

    /// Rolls a fresh position, facing and spin.
    fn reroll(&mut self, rng: &mut GameRng) {
        self.position = random_position(rng);
        self.rotation = rng.whole_degrees();
        self.rotation_speed = random_spin(rng);
    }

    fn spin(&mut self, dt: f32) {
        self.rotation = (self.rotation + self.rotation_speed * dt).rem_euclid(360.0);
    }
}

impl Poolable for AmmoBox {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

fn random_position(rng: &mut GameRng) -> Vec3 {
    let mut x = rng.coordinate(SPAWN_EXTENT);
    let mut z = rng.coordinate(SPAWN_EXTENT);

    // Keep boxes from spawning on top of the player.
    if x.hypot(z) < SPAWN_CLEARANCE {
        x += if x < 0.0 { -SPAWN_CLEARANCE } else { SPAWN_CLEARANCE };
        z += if z < 0.0 { -SPAWN_CLEARANCE } else { SPAWN_CLEARANCE };
    }

    Vec3::new(x, HEIGHT, z)
}

fn random_spin(rng: &mut GameRng) -> f32 {
    MIN_SPIN + rng.0.random_range(0..SPIN_SPREAD) as f32
}

#[derive(Resource, Debug, Default)]
pub struct AmmoBoxes {
    pub pool: Pool<AmmoBox>,
}

impl AmmoBoxes {
    /// Places a full set of boxes, with the level's special ammo in the first few.
    pub fn for_profile(profile: LevelProfile, rng: &mut GameRng) -> Self {
        let mut boxes = Self::default();
        for index in 0..BOX_COUNT {
            let position = random_position(rng);
            let rotation = rng.whole_degrees();
            let spin = random_spin(rng);
            boxes.pool.acquire(AmmoBox::new(position, rotation, spin, profile.ammo_kind(index)));
        }
        debug!(%profile, count = BOX_COUNT, "Placed ammo boxes");
        boxes
    }

    pub fn boxes(&self) -> &[AmmoBox] {
        self.pool.slots()
    }
}

/// Spins every active box.
pub fn ammo_spin_system(dt: Res<DeltaTime>, mut boxes: ResMut<AmmoBoxes>) {
    for ammo_box in boxes.pool.iter_active_mut() {
        ammo_box.spin(dt.seconds);
    }
}

/// Brings collected boxes back once their respawn timer runs out.
pub fn ammo_respawn_system(dt: Res<DeltaTime>, mut boxes: ResMut<AmmoBoxes>, mut rng: ResMut<GameRng>) {
    for ammo_box in boxes.pool.iter_mut().filter(|ammo_box| !ammo_box.active) {
        if ammo_box.respawn.tick(dt.seconds) {
            ammo_box.respawn.reset();
            // Pushed clear of spawn like the initial placement, so a box never reappears under the player.
            ammo_box.reroll(&mut rng);
            ammo_box.active = true;
            debug!(position = ?ammo_box.position, kind = ?ammo_box.kind, "Ammo box respawned");
        }
    }
}

/// Collects every active box within reach of the player.
pub fn ammo_pickup_system(
    player: Res<PlayerState>,
    level: Res<LevelState>,
    mut boxes: ResMut<AmmoBoxes>,
    mut weapon: ResMut<Weapon>,
    mut events: EventWriter<GameEvent>,
) {
    for ammo_box in boxes.pool.iter_active_mut() {
        let reached = circle_overlap(
            player.position.x,
            player.position.z,
            PICKUP_RADIUS,
            ammo_box.position.x,
            ammo_box.position.z,
            0.0,
        );
        if !reached {
            continue;
        }

        ammo_box.active = false;
        ammo_box.respawn.reset();

        let effect = level.profile.pickup_effect(ammo_box.kind);
        effect.apply(&mut weapon);
        trace!(kind = ?ammo_box.kind, reserves = weapon.reserves(), max = MAX_RESERVES, "Ammo box collected");
        events.write(GameEvent::AmmoCollected {
            kind: ammo_box.kind,
            reserves: weapon.reserves(),
        });
    }
}
