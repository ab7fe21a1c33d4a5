//! The simulation aggregate and its fixed-order tick.

use std::time::Instant;

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use tracing::{debug, info, warn};

use crate::constants::level::FIRST_LEVEL;
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::snapshot::WorldSnapshot;
use crate::systems::{
    self, profile, AmmoBoxes, AssetLoader, AssetLoaderResource, AudioEvent, AudioResource, AudioState, Bullets,
    CameraRig, DeltaTime, Door, Environment, Explosions, GameRng, GlobalState, InputSource, InputSourceResource,
    InputState, LevelState, PlayerState, SceneGeometry, ScreenShake, SimClock, SoundService, SystemId, SystemTimings,
    TargetWave, Timing, Weapon,
};

/// Phases of a tick, run in declaration order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum TickSet {
    /// Polling the input source and applying its commands
    Input,
    /// Lighting, ammo spin and the level clock
    Ambient,
    /// The win/lose/door state machine
    Respond,
    /// Movement, damage, combat and pickups
    Update,
    /// Camera and audio, which keep running after the game ends
    Present,
}

/// Host-supplied options, validated by [`Game::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    /// Seed for all placement and effect randomness; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub start_level: u8,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: FIRST_LEVEL,
        }
    }
}

/// The main simulation state.
///
/// Owns the ECS world and the schedule that advances it one fixed tick at a time.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    /// Builds the world for `options.start_level` and loads its assets.
    pub fn new(options: GameOptions, mut loader: Box<dyn AssetLoader>, audio: Box<dyn SoundService>) -> GameResult<Game> {
        let level = LevelState::new(options.start_level)?;
        debug!(level = level.level, profile = %level.profile, seed = ?options.seed, "Creating game");

        loader.load_level(level.profile)?;

        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, options, level);
        world.insert_non_send_resource(AssetLoaderResource(loader));
        world.insert_non_send_resource(AudioResource(audio));
        Self::configure_schedule(&mut schedule);

        let game = Game { world, schedule };
        let snapshot = game.snapshot();
        info!(
            level = snapshot.level.level,
            profile = %snapshot.level.profile,
            obstacles = snapshot.scene.obstacles.len(),
            hazards = snapshot.scene.hazards.len(),
            targets = snapshot.active_targets(),
            "Game initialized"
        );
        Ok(game)
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameCommand>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<AudioEvent>(world);
        EventRegistry::register_event::<GameError>(world);
    }

    fn insert_resources(world: &mut World, options: GameOptions, level: LevelState) {
        let mut rng = match options.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::from_entropy(),
        };

        let scene = SceneGeometry::generate(level.profile, &mut rng);
        let wave = TargetWave::for_scene(&scene, &mut rng);
        let boxes = AmmoBoxes::for_profile(level.profile, &mut rng);

        world.insert_resource(GlobalState::default());
        world.insert_resource(DeltaTime::default());
        world.insert_resource(SimClock::default());
        world.insert_resource(Timing::default());
        world.insert_resource(SystemTimings::default());
        world.insert_resource(InputState::default());
        world.insert_resource(AudioState::default());
        world.insert_resource(PlayerState::default());
        world.insert_resource(Weapon::default());
        world.insert_resource(Bullets::default());
        world.insert_resource(Explosions::default());
        world.insert_resource(Door::default());
        world.insert_resource(CameraRig::default());
        world.insert_resource(ScreenShake::default());
        world.insert_resource(Environment::default());
        world.insert_resource(scene);
        world.insert_resource(wave);
        world.insert_resource(boxes);
        world.insert_resource(level);
        world.insert_resource(rng);
    }

    fn configure_schedule(schedule: &mut Schedule) {
        let input_system = profile(SystemId::Input, systems::input_system);
        let player_control_system = profile(SystemId::PlayerControls, systems::player_control_system);
        let environment_system = profile(SystemId::Environment, systems::environment_system);
        let ammo_spin_system = profile(SystemId::AmmoSpin, systems::ammo_spin_system);
        let level_timer_system = profile(SystemId::LevelTimer, systems::level_timer_system);
        let level_state_system = profile(SystemId::LevelState, systems::level_state_system);
        let jump_system = profile(SystemId::Jump, systems::jump_system);
        let screen_shake_system = profile(SystemId::ScreenShake, systems::screen_shake_system);
        let hazard_damage_system = profile(SystemId::Hazard, systems::hazard_damage_system);
        let bullet_system = profile(SystemId::Bullets, systems::bullet_system);
        let explosion_system = profile(SystemId::Explosions, systems::explosion_system);
        let reload_system = profile(SystemId::Reload, systems::reload_system);
        let hit_system = profile(SystemId::Hits, systems::hit_system);
        let ammo_respawn_system = profile(SystemId::AmmoRespawn, systems::ammo_respawn_system);
        let ammo_pickup_system = profile(SystemId::AmmoPickup, systems::ammo_pickup_system);
        let fire_system = profile(SystemId::Fire, systems::fire_system);
        let camera_system = profile(SystemId::Camera, systems::camera_system);
        let audio_system = profile(SystemId::Audio, systems::audio_system);

        let playing = |level: Res<LevelState>| !level.is_over();

        schedule
            .add_systems((
                (input_system, player_control_system).chain().in_set(TickSet::Input),
                (environment_system, ammo_spin_system, level_timer_system)
                    .chain()
                    .in_set(TickSet::Ambient),
                level_state_system.in_set(TickSet::Respond),
                (
                    jump_system,
                    screen_shake_system,
                    hazard_damage_system,
                    bullet_system,
                    explosion_system,
                    reload_system,
                    hit_system,
                    ammo_respawn_system,
                    ammo_pickup_system,
                    fire_system,
                )
                    .chain()
                    .in_set(TickSet::Update),
                (camera_system, audio_system).chain().in_set(TickSet::Present),
            ))
            .configure_sets(
                (
                    TickSet::Input,
                    TickSet::Ambient.run_if(playing),
                    TickSet::Respond,
                    TickSet::Update.run_if(playing),
                    TickSet::Present,
                )
                    .chain(),
            );
    }

    /// Installs the source polled at the start of every tick, replacing any previous one.
    pub fn set_input(&mut self, source: Box<dyn InputSource>) {
        self.world.insert_non_send_resource(InputSourceResource(source));
    }

    /// Queues a command for the next tick, alongside whatever the input source delivers.
    pub fn push_command(&mut self, command: GameCommand) {
        self.world.send_event(command);
    }

    /// Advances the simulation by one tick of `dt` seconds.
    ///
    /// Returns `true` once an exit has been requested.
    pub fn tick(&mut self, dt: f32) -> bool {
        // Events from two ticks ago are dropped; this tick's and last tick's stay readable.
        self.world.resource_mut::<Events<GameCommand>>().update();
        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<AudioEvent>>().update();
        self.world.resource_mut::<Events<GameError>>().update();

        self.world.insert_resource(DeltaTime::from_seconds(dt));
        self.world.resource_mut::<SimClock>().advance(dt);

        let start = Instant::now();
        self.schedule.run(&mut self.world);
        let total_duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (
            self.world.get_resource::<SystemTimings>(),
            self.world.get_resource::<Timing>(),
        ) {
            let new_tick = timing.increment_tick();
            formatter::set_tick(new_tick);
            timings.add_total_timing(total_duration, new_tick);

            let budget_ms = (dt * 1000.0 * 1.2) as u128;
            if total_duration.as_millis() > budget_ms {
                let slowest = timings.get_slowest_systems();
                let systems = if slowest.is_empty() {
                    "No specific systems identified".to_string()
                } else {
                    slowest
                        .iter()
                        .map(|(id, duration)| format!("{} ({:.2?})", id, duration))
                        .collect::<Vec<String>>()
                        .join(", ")
                };

                warn!(
                    total = format!("{:.3?}", total_duration),
                    tick = new_tick,
                    systems,
                    budget = format!("{}ms", budget_ms),
                    "Tick took longer than expected"
                );
            }
        }

        self.world.get_resource::<GlobalState>().is_some_and(|state| state.exit)
    }

    pub fn current_tick(&self) -> u64 {
        self.world.get_resource::<Timing>().map_or(0, Timing::get_current_tick)
    }

    pub fn is_over(&self) -> bool {
        self.world.get_resource::<LevelState>().is_some_and(LevelState::is_over)
    }

    /// `Some(won)` once the game has ended.
    pub fn outcome(&self) -> Option<bool> {
        self.world.get_resource::<LevelState>().and_then(LevelState::outcome)
    }

    pub fn snapshot(&self) -> WorldSnapshot<'_> {
        WorldSnapshot::capture(&self.world, self.current_tick())
    }

    /// Gameplay events written during the most recent tick.
    pub fn recent_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.world.resource::<Events<GameEvent>>().iter_current_update_events()
    }

    /// Errors raised during the most recent tick, such as a failed asset load on level transition.
    pub fn recent_errors(&self) -> impl Iterator<Item = &GameError> {
        self.world.resource::<Events<GameError>>().iter_current_update_events()
    }

    /// Aligned per-system timing lines, slowest first.
    pub fn timing_report(&self) -> Vec<String> {
        self.world
            .get_resource::<SystemTimings>()
            .map(|timings| timings.format_timing_display(self.current_tick()).into_vec())
            .unwrap_or_default()
    }
}
