//! Level progression: the per-level profile, the level clock, the door and the win/lose state machine.

use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{NonSendMut, Res, ResMut};
use glam::Vec3;
use strum_macros::{Display, EnumIter};
use tracing::{debug, error, info};

use crate::constants::ammo::{REGULAR_AMOUNT, SPECIAL_AMOUNT, SPECIAL_BOX_COUNT};
use crate::constants::arena::{TREE_COLLISION_RADIUS, WALL_BUFFER, WALL_HALF_LENGTH, WALL_HALF_THICKNESS};
use crate::constants::door;
use crate::constants::level::{MAX_LEVEL, NOTICE_TIME, TIME_LIMIT, WINNING_SCORE};
use crate::constants::weapon::{EXPLOSIVE_DAMAGE, FAST_FIRE_COOLDOWN, HIGH_DAMAGE, NORMAL_FIRE_COOLDOWN, REGULAR_DAMAGE};
use crate::error::{ConfigError, GameError};
use crate::events::GameEvent;
use crate::systems::ammo::{AmmoBoxes, AmmoKind, PickupEffect};
use crate::systems::audio::AudioEvent;
use crate::systems::combat::{Bullets, Weapon};
use crate::systems::components::{DeltaTime, GameRng};
use crate::systems::player::PlayerState;
use crate::systems::scene::{AssetLoaderResource, ObstacleShape, SceneGeometry};
use crate::systems::target::TargetWave;
use crate::systems::timer::Countdown;

/// Everything that differs between levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LevelProfile {
    /// Trees with targets strapped to them, rocks underfoot, and a setting sun.
    Forest,
    /// Walls with mounted targets, scattered chairs, and lamp lighting.
    Facility,
}

impl LevelProfile {
    pub fn for_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(LevelProfile::Forest),
            2 => Some(LevelProfile::Facility),
            _ => None,
        }
    }

    pub fn obstacle_shape(self) -> ObstacleShape {
        match self {
            LevelProfile::Forest => ObstacleShape::Circle {
                radius: TREE_COLLISION_RADIUS,
            },
            LevelProfile::Facility => ObstacleShape::RotatedBox {
                half_length: WALL_HALF_LENGTH,
                half_thickness: WALL_HALF_THICKNESS,
                buffer: WALL_BUFFER,
            },
        }
    }

    /// Contents of the `index`-th ammo box of a freshly placed set.
    pub fn ammo_kind(self, index: usize) -> AmmoKind {
        let special = index < SPECIAL_BOX_COUNT;
        match (self, special) {
            (LevelProfile::Forest, true) => AmmoKind::HIGH_DAMAGE,
            (LevelProfile::Forest, false) => AmmoKind::REGULAR,
            (LevelProfile::Facility, true) => AmmoKind::EXPLOSIVE,
            (LevelProfile::Facility, false) => AmmoKind::FAST_FIRE,
        }
    }

    /// What collecting a box of `kind` does on this level.
    pub fn pickup_effect(self, kind: AmmoKind) -> PickupEffect {
        match self {
            LevelProfile::Forest if kind.contains(AmmoKind::HIGH_DAMAGE) => PickupEffect {
                damage: HIGH_DAMAGE,
                fire_cooldown: None,
                reserves: SPECIAL_AMOUNT,
            },
            LevelProfile::Forest => PickupEffect {
                damage: REGULAR_DAMAGE,
                fire_cooldown: None,
                reserves: REGULAR_AMOUNT,
            },
            LevelProfile::Facility if kind.contains(AmmoKind::EXPLOSIVE) => PickupEffect {
                damage: EXPLOSIVE_DAMAGE,
                fire_cooldown: Some(NORMAL_FIRE_COOLDOWN),
                reserves: SPECIAL_AMOUNT,
            },
            LevelProfile::Facility => PickupEffect {
                damage: REGULAR_DAMAGE,
                fire_cooldown: Some(FAST_FIRE_COOLDOWN),
                reserves: REGULAR_AMOUNT,
            },
        }
    }

    pub fn has_sun_cycle(self) -> bool {
        matches!(self, LevelProfile::Forest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStage {
    #[default]
    Playing,
    /// The score threshold was met and the door is waiting to be entered.
    DoorOpen,
    GameOver {
        won: bool,
    },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LevelState {
    pub level: u8,
    pub profile: LevelProfile,
    pub timer: Countdown,
    pub stage: GameStage,
    /// Counts down while the "level complete" notice is on screen.
    pub notice: Option<Countdown>,
}

impl LevelState {
    /// State at the start of `level`, which must be between 1 and `MAX_LEVEL`.
    pub fn new(level: u8) -> Result<Self, ConfigError> {
        let profile = LevelProfile::for_level(level).ok_or(ConfigError::InvalidLevel(level))?;

        Ok(Self {
            level,
            profile,
            timer: Countdown::new(TIME_LIMIT),
            stage: GameStage::Playing,
            notice: None,
        })
    }

    pub fn is_over(&self) -> bool {
        matches!(self.stage, GameStage::GameOver { .. })
    }

    /// `Some(won)` once the game has ended.
    pub fn outcome(&self) -> Option<bool> {
        match self.stage {
            GameStage::GameOver { won } => Some(won),
            _ => None,
        }
    }

    pub fn is_last_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    pub fn door_spawned(&self) -> bool {
        self.stage == GameStage::DoorOpen
    }

    pub fn showing_notice(&self) -> bool {
        self.notice.is_some()
    }
}

/// The exit to the next level. There is only ever one.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Door {
    pub position: Vec3,
    pub rotation: f32,
    pub scale: f32,
    pub active: bool,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            position: door::POSITION,
            rotation: 0.0,
            scale: door::SCALE,
            active: false,
        }
    }
}

impl Door {
    pub fn spawn(&mut self) {
        *self = Self {
            active: true,
            ..Self::default()
        };
    }

    pub fn clear(&mut self) {
        self.active = false;
    }

    /// Whether the ground-plane point `(x, z)` is strictly inside the interaction radius.
    pub fn reaches(&self, x: f32, z: f32) -> bool {
        let dx = x - self.position.x;
        let dz = z - self.position.z;
        dx * dx + dz * dz < door::INTERACTION_RADIUS * door::INTERACTION_RADIUS
    }
}

/// The single state change a tick can cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Win,
    SpawnDoor,
    AdvanceLevel,
    Lose,
}

/// Decides which transition, if any, fires this tick. Earlier rules win when several apply.
pub fn evaluate(level: &LevelState, door: &Door, score: u32, health: f32, player: Vec3) -> Option<Transition> {
    if level.is_over() {
        return None;
    }

    let threshold_met = score >= WINNING_SCORE;
    if level.is_last_level() && threshold_met {
        Some(Transition::Win)
    } else if threshold_met && !level.door_spawned() {
        Some(Transition::SpawnDoor)
    } else if level.door_spawned() && door.active && door.reaches(player.x, player.z) {
        Some(Transition::AdvanceLevel)
    } else if level.timer.is_expired() || health <= 0.0 {
        Some(Transition::Lose)
    } else {
        None
    }
}

/// Counts down the level clock and the level-complete notice.
pub fn level_timer_system(dt: Res<DeltaTime>, mut level: ResMut<LevelState>) {
    level.timer.tick(dt.seconds);

    if let Some(notice) = level.notice.as_mut() {
        if notice.tick(dt.seconds) {
            level.notice = None;
        }
    }
}

/// Applies the transition chosen by [`evaluate`].
#[allow(clippy::too_many_arguments)]
pub fn level_state_system(
    loader: Option<NonSendMut<AssetLoaderResource>>,
    mut level: ResMut<LevelState>,
    mut door: ResMut<Door>,
    mut player: ResMut<PlayerState>,
    mut weapon: ResMut<Weapon>,
    mut bullets: ResMut<Bullets>,
    mut scene: ResMut<SceneGeometry>,
    mut wave: ResMut<TargetWave>,
    mut boxes: ResMut<AmmoBoxes>,
    mut rng: ResMut<GameRng>,
    mut events: EventWriter<GameEvent>,
    mut errors: EventWriter<GameError>,
    mut audio: EventWriter<AudioEvent>,
) {
    let Some(transition) = evaluate(&level, &door, player.score, player.health(), player.position) else {
        return;
    };

    match transition {
        Transition::Win | Transition::Lose => {
            let won = transition == Transition::Win;
            level.stage = GameStage::GameOver { won };
            info!(
                won,
                level = level.level,
                score = player.score,
                health = player.health(),
                remaining = level.timer.remaining(),
                "Game over"
            );
            events.write(GameEvent::GameEnded { won });
            audio.write(AudioEvent::StopAll);
        }
        Transition::SpawnDoor => {
            door.spawn();
            level.stage = GameStage::DoorOpen;
            info!(level = level.level, position = ?door.position, "Door opened");
            events.write(GameEvent::DoorSpawned);
        }
        Transition::AdvanceLevel => {
            let next = level.level + 1;
            let next_state = match LevelState::new(next) {
                Ok(state) => state,
                Err(err) => {
                    errors.write(err.into());
                    return;
                }
            };

            if let Some(mut loader) = loader {
                if let Err(err) = loader.0.load_level(next_state.profile) {
                    error!(profile = %next_state.profile, error = %err, "Asset loading failed");
                    errors.write(err.into());
                }
            }

            *level = LevelState {
                notice: Some(Countdown::new(NOTICE_TIME)),
                ..next_state
            };
            door.clear();

            *scene = SceneGeometry::generate(level.profile, &mut rng);
            *wave = TargetWave::for_scene(&scene, &mut rng);
            *boxes = AmmoBoxes::for_profile(level.profile, &mut rng);
            bullets.0.release_all();

            player.score = 0;
            player.reset_to_spawn();
            weapon.reset_ammo();

            info!(level = level.level, profile = %level.profile, "Advanced to next level");
            debug!(
                obstacles = scene.obstacles.len(),
                hazards = scene.hazards.len(),
                targets = wave.pool.active_count(),
                "Level rebuilt"
            );
            events.write(GameEvent::LevelAdvanced { level: level.level });
        }
    }
}
