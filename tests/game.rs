use glam::Vec3;
use marksman::constants::door;
use marksman::constants::level::WINNING_SCORE;
use marksman::constants::weapon::MAX_AMMO;
use marksman::constants::TICK_SECONDS;
use marksman::error::{ConfigError, GameError};
use marksman::events::{GameCommand, GameEvent};
use marksman::game::{Game, GameOptions};
use marksman::systems::timer::Countdown;
use marksman::systems::{
    AmmoBoxes, AudioState, CameraRig, GameStage, LevelProfile, LevelState, MoveDirection, NullAssetLoader,
    PlayerState, SceneGeometry, ScriptedInput, SilentAudio, Sound, TurnDirection, Weapon,
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

use common::{RecordingAudio, RecordingLoader};

fn options(start_level: u8) -> GameOptions {
    GameOptions {
        seed: Some(common::SEED),
        start_level,
    }
}

fn events(game: &Game) -> Vec<GameEvent> {
    game.recent_events().copied().collect()
}

#[test]
fn test_invalid_start_level_is_rejected() {
    let result = Game::new(options(3), Box::new(NullAssetLoader), Box::new(SilentAudio));

    assert!(matches!(
        result,
        Err(GameError::Config(ConfigError::InvalidLevel(3)))
    ));
}

#[test]
fn test_tick_advances_counter_and_timings() {
    let mut game = common::create_game(1);
    assert_eq!(game.current_tick(), 0);

    for _ in 0..3 {
        game.tick(TICK_SECONDS);
    }

    assert_eq!(game.current_tick(), 3);
    assert_eq!(game.snapshot().tick, 3);
    let report = game.timing_report();
    assert_that(&report.is_empty()).is_false();
    assert_that(&report[0].contains("TPS")).is_true();
}

#[test]
fn test_exit_command_stops_the_loop() {
    let mut game = common::create_game(1);

    assert_that(&game.tick(TICK_SECONDS)).is_false();

    game.push_command(GameCommand::Exit);
    assert_that(&game.tick(TICK_SECONDS)).is_true();
}

#[test]
fn test_same_seed_same_level() {
    let first = common::create_game(1);
    let second = common::create_game(1);

    let (a, b) = (first.snapshot(), second.snapshot());
    assert_eq!(a.scene.obstacles, b.scene.obstacles);
    assert_eq!(a.scene.hazards, b.scene.hazards);
    assert_eq!(a.targets.targets(), b.targets.targets());
    assert_eq!(a.ammo.boxes(), b.ammo.boxes());
}

#[test]
fn test_door_then_next_level() {
    let mut game = common::create_game(1);
    game.world.resource_mut::<PlayerState>().score = WINNING_SCORE;

    game.tick(TICK_SECONDS);

    {
        let snapshot = game.snapshot();
        assert_that(&snapshot.door.active).is_true();
        assert_eq!(snapshot.door.position, door::POSITION);
        assert_eq!(snapshot.level.stage, GameStage::DoorOpen);
    }
    assert_that(&events(&game)).contains(GameEvent::DoorSpawned);

    game.world.insert_resource(Weapon::with_ammo(1, 10));
    game.world.resource_mut::<PlayerState>().position = Vec3::new(0.0, 0.0, -9.0);
    game.tick(TICK_SECONDS);

    let snapshot = game.snapshot();
    assert_eq!(snapshot.level.level, 2);
    assert_eq!(snapshot.level.profile, LevelProfile::Facility);
    assert_eq!(snapshot.player.score, 0);
    assert_eq!(snapshot.player.position, Vec3::ZERO);
    assert_eq!(snapshot.weapon.magazine(), MAX_AMMO);
    assert_eq!(snapshot.weapon.reserves(), 0);
    assert_that(&snapshot.door.active).is_false();
    assert_that(&events(&game)).contains(GameEvent::LevelAdvanced { level: 2 });
}

#[test]
fn test_walking_into_door_advances_level() {
    let mut game = common::create_game(1);
    game.world.insert_resource(SceneGeometry::empty(LevelProfile::Forest));
    game.world.insert_resource(AmmoBoxes::default());
    game.world.resource_mut::<PlayerState>().score = WINNING_SCORE;
    game.tick(TICK_SECONDS);
    assert_eq!(game.snapshot().level.stage, GameStage::DoorOpen);

    for _ in 0..90 {
        game.push_command(GameCommand::Turn(TurnDirection::Left));
    }
    game.tick(TICK_SECONDS);
    assert_eq!(game.snapshot().player.yaw, 180.0);

    for step in 1..=40 {
        game.push_command(GameCommand::Move(MoveDirection::Forward));
        game.tick(TICK_SECONDS);
        assert_eq!(game.snapshot().level.level, 1, "advanced early at step {step}");
    }
    assert_that(&(game.snapshot().player.position.z + 8.0).abs()).is_less_than(1e-4);

    game.push_command(GameCommand::Move(MoveDirection::Forward));
    game.tick(TICK_SECONDS);

    let snapshot = game.snapshot();
    assert_eq!(snapshot.level.level, 2);
    assert_eq!(snapshot.player.score, 0);
    assert_eq!(snapshot.player.position, Vec3::ZERO);
    assert_eq!(snapshot.weapon.magazine(), MAX_AMMO);
    assert_eq!(snapshot.weapon.reserves(), 0);
}

#[test]
fn test_threshold_on_last_level_wins_immediately() {
    let mut game = common::create_game(2);
    game.world.resource_mut::<PlayerState>().score = WINNING_SCORE;

    game.tick(TICK_SECONDS);

    assert_eq!(game.outcome(), Some(true));
    assert_that(&game.snapshot().door.active).is_false();
    assert_that(&events(&game)).contains(GameEvent::GameEnded { won: true });
}

#[test]
fn test_running_out_of_time_loses() {
    let mut game = common::create_game(1);
    game.world.resource_mut::<LevelState>().timer = Countdown::new(0.01);

    game.tick(TICK_SECONDS);

    assert_that(&game.is_over()).is_true();
    assert_eq!(game.outcome(), Some(false));
}

#[test]
fn test_camera_keeps_following_after_game_over() {
    let mut game = common::create_game(1);
    game.world.resource_mut::<PlayerState>().set_health(0.0);
    game.tick(TICK_SECONDS);
    assert_that(&game.is_over()).is_true();

    let before = *game.world.resource::<CameraRig>();
    game.tick(TICK_SECONDS);
    let after = *game.world.resource::<CameraRig>();

    assert_ne!(before.eye, after.eye);
}

#[test]
fn test_commands_ignored_after_game_over() {
    let mut game = common::create_game(1);
    game.world.resource_mut::<PlayerState>().set_health(0.0);
    game.tick(TICK_SECONDS);

    game.push_command(GameCommand::Move(MoveDirection::Forward));
    game.push_command(GameCommand::FirePressed);
    game.tick(TICK_SECONDS);

    let snapshot = game.snapshot();
    assert_eq!(snapshot.player.position, Vec3::ZERO);
    assert_eq!(snapshot.weapon.magazine(), MAX_AMMO);
    assert_eq!(snapshot.active_bullets(), 0);
}

#[test]
fn test_loader_called_for_each_level() {
    let loader = RecordingLoader::default();
    let loaded = loader.loaded.clone();
    let mut game = Game::new(options(1), Box::new(loader), Box::new(SilentAudio)).expect("game should build");
    assert_eq!(*loaded.borrow(), vec![LevelProfile::Forest]);

    game.world.resource_mut::<PlayerState>().score = WINNING_SCORE;
    game.tick(TICK_SECONDS);
    game.world.resource_mut::<PlayerState>().position = Vec3::new(0.0, 0.0, -9.0);
    game.tick(TICK_SECONDS);

    assert_eq!(*loaded.borrow(), vec![LevelProfile::Forest, LevelProfile::Facility]);
}

#[test]
fn test_loader_failure_at_startup_is_an_error() {
    let loader = RecordingLoader {
        fail_on: Some(LevelProfile::Forest),
        ..RecordingLoader::default()
    };

    let result = Game::new(options(1), Box::new(loader), Box::new(SilentAudio));

    assert!(matches!(result, Err(GameError::Asset(_))));
}

#[test]
fn test_loader_failure_on_transition_is_reported() {
    let loader = RecordingLoader {
        fail_on: Some(LevelProfile::Facility),
        ..RecordingLoader::default()
    };
    let mut game = Game::new(options(1), Box::new(loader), Box::new(SilentAudio)).expect("game should build");

    game.world.resource_mut::<PlayerState>().score = WINNING_SCORE;
    game.tick(TICK_SECONDS);
    game.world.resource_mut::<PlayerState>().position = Vec3::new(0.0, 0.0, -9.0);
    game.tick(TICK_SECONDS);

    let errors: Vec<String> = game.recent_errors().map(ToString::to_string).collect();
    assert_that(&errors).has_length(1);
    assert_that(&errors[0].contains("Facility")).is_true();
    assert_eq!(game.snapshot().level.level, 2);
}

#[test]
fn test_shot_reaches_audio_backend() {
    let audio = RecordingAudio::default();
    let played = audio.played.clone();
    let mut game = Game::new(options(1), Box::new(NullAssetLoader), Box::new(audio)).expect("game should build");

    game.push_command(GameCommand::FirePressed);
    game.tick(TICK_SECONDS);

    assert_that(&*played.borrow()).contains(Sound::Shoot);
    assert_eq!(game.snapshot().weapon.magazine(), MAX_AMMO - 1);
    assert_eq!(game.snapshot().active_bullets(), 1);
}

#[test]
fn test_muted_game_plays_nothing_but_still_fires() {
    let audio = RecordingAudio::default();
    let played = audio.played.clone();
    let mut game = Game::new(options(1), Box::new(NullAssetLoader), Box::new(audio)).expect("game should build");

    game.push_command(GameCommand::ToggleMute);
    game.push_command(GameCommand::FirePressed);
    game.tick(TICK_SECONDS);

    assert_that(&game.world.resource::<AudioState>().muted).is_true();
    assert_that(&*played.borrow()).is_empty();
    assert_eq!(game.world.resource::<AudioState>().played, 0);
    assert_eq!(game.snapshot().weapon.magazine(), MAX_AMMO - 1);
}

#[test]
fn test_game_over_stops_audio() {
    let audio = RecordingAudio::default();
    let stops = audio.stops.clone();
    let mut game = Game::new(options(1), Box::new(NullAssetLoader), Box::new(audio)).expect("game should build");
    game.world.resource_mut::<PlayerState>().set_health(0.0);

    game.tick(TICK_SECONDS);

    assert_eq!(*stops.borrow(), 1);
}

#[test]
fn test_scripted_input_drives_the_player() {
    let mut game = common::create_game(1);
    game.set_input(Box::new(ScriptedInput::new([(0, GameCommand::JumpPressed)])));

    game.tick(TICK_SECONDS);

    let player = game.snapshot().player;
    assert_that(&player.is_grounded()).is_false();
    assert_that(&player.position.y).is_greater_than(0.0);
}
