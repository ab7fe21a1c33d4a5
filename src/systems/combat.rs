//! Firing, bullet flight, reloading and target hits.

use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use glam::Vec3;
use strum_macros::IntoStaticStr;
use tracing::{debug, trace};

use crate::constants::bullet::{HIT_DISTANCE, MAX_LIFETIME, SCALE, SPEED};
use crate::constants::player::{EYE_HEIGHT, MUZZLE_DISTANCE};
use crate::constants::weapon::{MAX_AMMO, MAX_RESERVES, NORMAL_FIRE_COOLDOWN, REGULAR_DAMAGE, RELOAD_TIME};
use crate::events::GameEvent;
use crate::systems::audio::{AudioEvent, Sound};
use crate::systems::camera::{CameraRig, ViewMode};
use crate::systems::collision::sphere_overlap;
use crate::systems::components::{DeltaTime, GameRng, SimClock};
use crate::systems::explosion::Explosions;
use crate::systems::input::InputState;
use crate::systems::level::LevelState;
use crate::systems::player::PlayerState;
use crate::systems::pool::{Pool, Poolable};
use crate::systems::scene::SceneGeometry;
use crate::systems::target::{Target, TargetWave};
use crate::systems::timer::{Cooldown, Timer};

/// Weapon behaviour changed by ammo pickups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    /// Damage dealt per hit, read when a bullet lands rather than when it is fired.
    pub damage: f32,
    /// Minimum seconds between two shots.
    pub fire_cooldown: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            damage: REGULAR_DAMAGE,
            fire_cooldown: NORMAL_FIRE_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReloadState {
    Idle,
    Reloading(Timer),
}

/// Why a shot did not go off. Never surfaced as an error; rejected shots are simply dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum ShotRejected {
    GameOver,
    CoolingDown,
    Reloading,
    EmptyMagazine,
}

/// Magazine, reserves, reload progress and modifiers.
///
/// Counts are private so that `magazine <= MAX_AMMO` and `reserves <= MAX_RESERVES` always hold.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Weapon {
    magazine: u32,
    reserves: u32,
    reload: ReloadState,
    pub modifiers: Modifiers,
    last_shot: Cooldown,
}

impl Default for Weapon {
    fn default() -> Self {
        Self::with_ammo(MAX_AMMO, 0)
    }
}

impl Weapon {
    /// A weapon holding the given ammo, clamped to capacity.
    pub fn with_ammo(magazine: u32, reserves: u32) -> Self {
        Self {
            magazine: magazine.min(MAX_AMMO),
            reserves: reserves.min(MAX_RESERVES),
            reload: ReloadState::Idle,
            modifiers: Modifiers::default(),
            last_shot: Cooldown::default(),
        }
    }

    pub fn magazine(&self) -> u32 {
        self.magazine
    }

    pub fn reserves(&self) -> u32 {
        self.reserves
    }

    pub fn reload_state(&self) -> ReloadState {
        self.reload
    }

    pub fn is_reloading(&self) -> bool {
        matches!(self.reload, ReloadState::Reloading(_))
    }

    /// How far the current reload has got, in `[0, 1]`, or `None` when idle.
    pub fn reload_progress(&self) -> Option<f32> {
        match self.reload {
            ReloadState::Reloading(timer) => Some(timer.progress()),
            ReloadState::Idle => None,
        }
    }

    /// Simulation time of the last successful shot.
    pub fn last_shot(&self) -> Option<f32> {
        self.last_shot.last()
    }

    pub fn add_reserves(&mut self, amount: u32) {
        self.reserves = self.reserves.saturating_add(amount).min(MAX_RESERVES);
    }

    /// Begins a reload when idle, not full and there is something to load.
    ///
    /// Returns whether a reload started; calling it again mid-reload changes nothing.
    pub fn start_reload(&mut self) -> bool {
        if self.is_reloading() || self.magazine >= MAX_AMMO || self.reserves == 0 {
            trace!(
                reloading = self.is_reloading(),
                magazine = self.magazine,
                reserves = self.reserves,
                "Reload rejected"
            );
            return false;
        }

        self.reload = ReloadState::Reloading(Timer::new(RELOAD_TIME));
        true
    }

    /// Advances a reload in progress. Returns the number of rounds loaded on the tick it completes.
    pub fn advance_reload(&mut self, dt: f32) -> Option<u32> {
        let ReloadState::Reloading(timer) = &mut self.reload else {
            return None;
        };
        if !timer.tick(dt) {
            return None;
        }

        let loaded = (MAX_AMMO - self.magazine).min(self.reserves);
        self.magazine += loaded;
        self.reserves -= loaded;
        self.reload = ReloadState::Idle;
        Some(loaded)
    }

    /// Checks every weapon-side reason a shot could be refused.
    pub fn can_fire(&self, now: f32) -> Result<(), ShotRejected> {
        if !self.last_shot.ready(now, self.modifiers.fire_cooldown) {
            return Err(ShotRejected::CoolingDown);
        }
        if self.is_reloading() {
            return Err(ShotRejected::Reloading);
        }
        if self.magazine == 0 {
            return Err(ShotRejected::EmptyMagazine);
        }
        Ok(())
    }

    /// Restocks for a new level: full magazine, empty reserves, no reload. Modifiers carry over.
    pub fn reset_ammo(&mut self) {
        self.magazine = MAX_AMMO;
        self.reserves = 0;
        self.reload = ReloadState::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub position: Vec3,
    /// Unit vector.
    pub direction: Vec3,
    /// Yaw at the moment of firing, for presentation only.
    pub rotation: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub scale: f32,
    pub active: bool,
}

impl Bullet {
    pub fn fired(origin: Vec3, direction: Vec3, rotation: f32) -> Self {
        Self {
            position: origin,
            direction,
            rotation,
            speed: SPEED,
            lifetime: 0.0,
            max_lifetime: MAX_LIFETIME,
            scale: SCALE,
            active: true,
        }
    }

    /// Moves the bullet and ages it, deactivating it once its lifetime is spent.
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.position += self.direction * self.speed * dt;
        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.active = false;
        }
    }
}

impl Poolable for Bullet {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

#[derive(Resource, Debug, Default)]
pub struct Bullets(pub Pool<Bullet>);

/// Where a shot starts and where it goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub origin: Vec3,
    pub direction: Vec3,
    pub rotation: f32,
}

impl Aim {
    /// Shots leave the camera eye when aiming or in first person, otherwise just ahead of the player
    /// at eye height.
    pub fn from_player(player: &PlayerState, rig: &CameraRig, aiming: bool) -> Self {
        let direction = player.aim_direction();
        let origin = if aiming || rig.view == ViewMode::FirstPerson {
            rig.eye
        } else {
            Vec3::new(
                player.position.x + direction.x * MUZZLE_DISTANCE,
                player.position.y + EYE_HEIGHT,
                player.position.z + direction.z * MUZZLE_DISTANCE,
            )
        };

        Self {
            origin,
            direction,
            rotation: player.yaw,
        }
    }
}

/// Fires one bullet if nothing prevents it, returning the pool slot it occupies.
pub fn try_fire(
    now: f32,
    game_over: bool,
    weapon: &mut Weapon,
    bullets: &mut Bullets,
    aim: Aim,
) -> Result<usize, ShotRejected> {
    if game_over {
        return Err(ShotRejected::GameOver);
    }
    weapon.can_fire(now)?;

    let slot = bullets.0.acquire(Bullet::fired(aim.origin, aim.direction, aim.rotation));
    weapon.magazine -= 1;
    weapon.last_shot.trigger(now);
    Ok(slot)
}

/// The first bullet/target contact found this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub bullet: usize,
    pub target: usize,
    pub position: Vec3,
}

/// Scans bullets, then targets, in slot order and returns the first pair in contact.
///
/// Only one hit is ever reported per call: two bullets landing on the same tick score once, and the
/// second is left for the next tick.
pub fn find_hit(bullets: &[Bullet], targets: &[Target]) -> Option<Hit> {
    bullets.iter().enumerate().filter(|(_, bullet)| bullet.active).find_map(|(bullet_index, bullet)| {
        targets
            .iter()
            .enumerate()
            .filter(|(_, target)| target.active)
            .find(|(_, target)| sphere_overlap(bullet.position, target.position, HIT_DISTANCE))
            .map(|(target_index, target)| Hit {
                bullet: bullet_index,
                target: target_index,
                position: target.position,
            })
    })
}

pub fn bullet_system(dt: Res<DeltaTime>, mut bullets: ResMut<Bullets>) {
    for bullet in bullets.0.iter_active_mut() {
        bullet.advance(dt.seconds);
    }
}

pub fn reload_system(dt: Res<DeltaTime>, mut weapon: ResMut<Weapon>) {
    if let Some(loaded) = weapon.advance_reload(dt.seconds) {
        debug!(loaded, magazine = weapon.magazine(), reserves = weapon.reserves(), "Reload complete");
    }
}

/// Resolves at most one bullet/target hit, scoring it and replacing the wave once it is cleared.
#[allow(clippy::too_many_arguments)]
pub fn hit_system(
    scene: Res<SceneGeometry>,
    weapon: Res<Weapon>,
    mut bullets: ResMut<Bullets>,
    mut wave: ResMut<TargetWave>,
    mut explosions: ResMut<Explosions>,
    mut player: ResMut<PlayerState>,
    mut rng: ResMut<GameRng>,
    mut events: EventWriter<GameEvent>,
    mut audio: EventWriter<AudioEvent>,
) {
    let Some(hit) = find_hit(bullets.0.slots(), wave.targets()) else {
        return;
    };

    bullets.0.release(hit.bullet);
    wave.pool.release(hit.target);
    explosions.spawn(hit.position, &mut rng);
    player.score += 1;

    debug!(
        bullet = hit.bullet,
        target = hit.target,
        damage = weapon.modifiers.damage,
        score = player.score,
        "Target hit"
    );
    audio.write(AudioEvent::PlaySound(Sound::Hit));
    events.write(GameEvent::TargetHit {
        position: hit.position,
        damage: weapon.modifiers.damage,
        score: player.score,
    });

    if wave.cleared() {
        let spawned = wave.spawn_batch(&scene, &mut rng);
        events.write(GameEvent::WaveCleared { spawned });
    }
}

/// Fires while the trigger is held.
#[allow(clippy::too_many_arguments)]
pub fn fire_system(
    clock: Res<SimClock>,
    input: Res<InputState>,
    level: Res<LevelState>,
    player: Res<PlayerState>,
    rig: Res<CameraRig>,
    mut weapon: ResMut<Weapon>,
    mut bullets: ResMut<Bullets>,
    mut audio: EventWriter<AudioEvent>,
) {
    if !input.firing {
        return;
    }

    let aim = Aim::from_player(&player, &rig, input.aiming);
    match try_fire(clock.elapsed, level.is_over(), &mut weapon, &mut bullets, aim) {
        Ok(slot) => {
            trace!(slot, magazine = weapon.magazine(), "Shot fired");
            audio.write(AudioEvent::PlaySound(Sound::Shoot));
        }
        Err(reason) => {
            trace!(reason = <&'static str>::from(reason), "Shot rejected");
        }
    }
}
