use bevy_ecs::system::RunSystemOnce;
use glam::Vec3;
use marksman::constants::player::EYE_HEIGHT;
use marksman::constants::target::COUNT;
use marksman::constants::weapon::{MAX_AMMO, MAX_RESERVES};
use marksman::events::GameEvent;
use marksman::systems::combat::{find_hit, Aim, ReloadState};
use marksman::systems::{
    bullet_system, fire_system, hit_system, reload_system, try_fire, Bullet, Bullets, CameraRig, DeltaTime,
    Explosions, GameRng, InputState, LevelProfile, PlayerState, ShotRejected, SimClock, Sound, Target, TargetWave,
    ViewMode, Weapon,
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn straight_ahead() -> Aim {
    Aim {
        origin: Vec3::new(0.0, EYE_HEIGHT, 0.0),
        direction: Vec3::Z,
        rotation: 0.0,
    }
}

fn target_at(position: Vec3) -> Target {
    Target {
        position,
        rotation: 0.0,
        scale: 0.005,
        active: true,
        anchor: 0,
    }
}

#[test]
fn test_fire_consumes_one_round() {
    let mut weapon = Weapon::default();
    let mut bullets = Bullets::default();

    let slot = try_fire(0.0, false, &mut weapon, &mut bullets, straight_ahead());

    assert_eq!(slot, Ok(0));
    assert_eq!(weapon.magazine(), MAX_AMMO - 1);
    assert_eq!(weapon.last_shot(), Some(0.0));
    assert_that(&bullets.0.active_count()).is_equal_to(1);
}

#[test]
fn test_fire_respects_cooldown() {
    let mut weapon = Weapon::default();
    let mut bullets = Bullets::default();

    try_fire(1.0, false, &mut weapon, &mut bullets, straight_ahead()).expect("first shot fires");
    assert_eq!(
        try_fire(1.1, false, &mut weapon, &mut bullets, straight_ahead()),
        Err(ShotRejected::CoolingDown)
    );
    assert_that(&try_fire(1.2, false, &mut weapon, &mut bullets, straight_ahead())).is_ok();
    assert_eq!(weapon.magazine(), MAX_AMMO - 2);
}

#[test]
fn test_fire_with_empty_magazine_does_nothing() {
    let mut weapon = Weapon::with_ammo(0, 10);
    let mut bullets = Bullets::default();

    let result = try_fire(0.0, false, &mut weapon, &mut bullets, straight_ahead());

    assert_eq!(result, Err(ShotRejected::EmptyMagazine));
    assert_eq!(weapon.magazine(), 0);
    assert_that(&bullets.0.capacity()).is_equal_to(0);
}

#[test]
fn test_fire_rejected_while_reloading_or_game_over() {
    let mut weapon = Weapon::with_ammo(2, 10);
    let mut bullets = Bullets::default();

    assert_eq!(
        try_fire(0.0, true, &mut weapon, &mut bullets, straight_ahead()),
        Err(ShotRejected::GameOver)
    );

    weapon.start_reload();
    assert_eq!(
        try_fire(0.0, false, &mut weapon, &mut bullets, straight_ahead()),
        Err(ShotRejected::Reloading)
    );
    assert_eq!(weapon.magazine(), 2);
}

#[test]
fn test_reload_is_idempotent_while_reloading() {
    let mut weapon = Weapon::with_ammo(2, 10);

    assert_that(&weapon.start_reload()).is_true();
    weapon.advance_reload(0.5);
    let during = weapon.clone();

    assert_that(&weapon.start_reload()).is_false();
    assert_eq!(weapon, during);
}

#[test]
fn test_reload_rejected_when_full_or_no_reserves() {
    assert_that(&Weapon::with_ammo(MAX_AMMO, 10).start_reload()).is_false();
    assert_that(&Weapon::with_ammo(1, 0).start_reload()).is_false();
}

#[test]
fn test_reload_completes_after_two_seconds() {
    let mut weapon = Weapon::with_ammo(2, 10);
    weapon.start_reload();

    assert_that(&weapon.advance_reload(1.0)).is_none();
    assert_eq!(weapon.advance_reload(1.0), Some(3));
    assert_eq!(weapon.magazine(), MAX_AMMO);
    assert_eq!(weapon.reserves(), 7);
    assert_eq!(weapon.reload_state(), ReloadState::Idle);
}

#[test]
fn test_reload_progress_tracks_the_reload() {
    let mut weapon = Weapon::with_ammo(2, 10);
    assert_that(&weapon.reload_progress()).is_none();

    weapon.start_reload();
    assert_eq!(weapon.reload_progress(), Some(0.0));
    weapon.advance_reload(1.0);
    assert_eq!(weapon.reload_progress(), Some(0.5));

    weapon.advance_reload(1.0);
    assert_that(&weapon.reload_progress()).is_none();
}

#[test]
fn test_reload_loads_only_what_reserves_hold() {
    let mut weapon = Weapon::with_ammo(0, 2);
    weapon.start_reload();

    assert_eq!(weapon.advance_reload(2.0), Some(2));
    assert_eq!(weapon.magazine(), 2);
    assert_eq!(weapon.reserves(), 0);
}

#[test]
fn test_ammo_counts_stay_in_bounds() {
    let mut weapon = Weapon::with_ammo(99, 99);
    assert_eq!(weapon.magazine(), MAX_AMMO);
    assert_eq!(weapon.reserves(), MAX_RESERVES);

    weapon.add_reserves(u32::MAX);
    assert_eq!(weapon.reserves(), MAX_RESERVES);
}

#[test]
fn test_reset_ammo_keeps_modifiers() {
    let mut weapon = Weapon::with_ammo(1, 20);
    weapon.modifiers.damage = 2.5;
    weapon.start_reload();

    weapon.reset_ammo();

    assert_eq!(weapon.magazine(), MAX_AMMO);
    assert_eq!(weapon.reserves(), 0);
    assert_that(&weapon.is_reloading()).is_false();
    assert_eq!(weapon.modifiers.damage, 2.5);
}

#[test]
fn test_bullet_expires_at_max_lifetime() {
    let mut bullet = Bullet::fired(Vec3::ZERO, Vec3::X, 0.0);

    let mut last = bullet.lifetime;
    for _ in 0..3 {
        bullet.advance(1.0);
        assert_that(&bullet.lifetime).is_greater_than(last);
        last = bullet.lifetime;
    }
    assert_that(&bullet.active).is_true();
    assert_eq!(bullet.position, Vec3::new(36.0, 0.0, 0.0));

    bullet.advance(0.5);
    assert_that(&bullet.active).is_false();

    let frozen = bullet;
    bullet.advance(1.0);
    assert_eq!(bullet, frozen);
}

#[test]
fn test_aim_origin_depends_on_view() {
    let mut player = PlayerState::default();
    player.position = Vec3::new(2.0, 0.0, 3.0);
    let mut rig = CameraRig::default();

    let hip = Aim::from_player(&player, &rig, false);
    assert_eq!(hip.origin, Vec3::new(2.0, EYE_HEIGHT, 4.0));
    assert_eq!(hip.direction, Vec3::Z);

    let aimed = Aim::from_player(&player, &rig, true);
    assert_eq!(aimed.origin, rig.eye);

    rig.view = ViewMode::FirstPerson;
    let first_person = Aim::from_player(&player, &rig, false);
    assert_eq!(first_person.origin, rig.eye);
}

#[test]
fn test_find_hit_reports_first_pair_only() {
    let targets = [target_at(Vec3::new(0.0, 1.0, 5.0)), target_at(Vec3::new(3.0, 1.0, 5.0))];
    let bullets = [
        Bullet::fired(Vec3::new(3.0, 1.0, 5.2), Vec3::Z, 0.0),
        Bullet::fired(Vec3::new(0.0, 1.2, 5.0), Vec3::Z, 0.0),
    ];

    let hit = find_hit(&bullets, &targets).expect("a bullet is on a target");

    assert_eq!((hit.bullet, hit.target), (0, 1));
    assert_eq!(hit.position, targets[1].position);
}

#[test]
fn test_find_hit_ignores_inactive_entities() {
    let mut target = target_at(Vec3::ZERO);
    target.active = false;
    let bullets = [Bullet::fired(Vec3::ZERO, Vec3::Z, 0.0)];

    assert_that(&find_hit(&bullets, &[target])).is_none();
}

#[test]
fn test_bullet_system_moves_bullets() {
    let mut world = common::create_test_world(1);
    world.insert_resource(DeltaTime::from_seconds(0.5));
    world
        .resource_mut::<Bullets>()
        .0
        .acquire(Bullet::fired(Vec3::ZERO, Vec3::Z, 0.0));

    world.run_system_once(bullet_system).expect("System should run successfully");

    let bullet = world.resource::<Bullets>().0.get(0).copied().expect("bullet exists");
    assert_eq!(bullet.position, Vec3::new(0.0, 0.0, 6.0));
}

#[test]
fn test_reload_system_finishes_reload() {
    let mut world = common::create_test_world(1);
    let mut weapon = Weapon::with_ammo(0, 10);
    weapon.start_reload();
    world.insert_resource(weapon);
    world.insert_resource(DeltaTime::from_seconds(2.0));

    world.run_system_once(reload_system).expect("System should run successfully");

    assert_eq!(world.resource::<Weapon>().magazine(), MAX_AMMO);
}

#[test]
fn test_fire_system_only_fires_while_trigger_held() {
    let mut world = common::create_test_world(1);

    world.run_system_once(fire_system).expect("System should run successfully");
    assert_eq!(world.resource::<Weapon>().magazine(), MAX_AMMO);

    world.resource_mut::<InputState>().firing = true;
    world.run_system_once(fire_system).expect("System should run successfully");
    world.run_system_once(fire_system).expect("System should run successfully");

    assert_eq!(world.resource::<Weapon>().magazine(), MAX_AMMO - 1);
    assert_eq!(common::sounds(&world), vec![Sound::Shoot]);

    world.resource_mut::<SimClock>().advance(0.2);
    world.run_system_once(fire_system).expect("System should run successfully");
    assert_eq!(world.resource::<Weapon>().magazine(), MAX_AMMO - 2);
}

#[test]
fn test_hit_system_scores_and_explodes() {
    let mut world = common::create_test_world(1);
    let scene = common::scene_with_obstacles(
        LevelProfile::Forest,
        (0..10).map(|i| common::object(i as f32 * 4.0 - 20.0, 15.0, 1.0)).collect(),
    );
    let wave = {
        let mut rng = world.resource_mut::<GameRng>();
        TargetWave::for_scene(&scene, &mut rng)
    };
    let struck = wave.targets()[0].position;
    world.insert_resource(scene);
    world.insert_resource(wave);
    world.resource_mut::<Weapon>().modifiers.damage = 2.0;
    world
        .resource_mut::<Bullets>()
        .0
        .acquire(Bullet::fired(struck, Vec3::Z, 0.0));

    world.run_system_once(hit_system).expect("System should run successfully");

    assert_eq!(world.resource::<PlayerState>().score, 1);
    assert_that(&world.resource::<Bullets>().0.active_count()).is_equal_to(0);
    assert_that(&world.resource::<TargetWave>().pool.active_count()).is_equal_to(COUNT - 1);
    assert_that(&world.resource::<Explosions>().0.active_count()).is_equal_to(1);
    assert_eq!(common::sounds(&world), vec![Sound::Hit]);
    assert_eq!(
        common::written::<GameEvent>(&world),
        vec![GameEvent::TargetHit {
            position: struck,
            damage: 2.0,
            score: 1,
        }]
    );
}

#[test]
fn test_clearing_the_wave_spawns_exactly_one_new_batch() {
    let mut world = common::create_test_world(1);
    let scene = common::scene_with_obstacles(
        LevelProfile::Forest,
        (0..10).map(|i| common::object(i as f32 * 4.0 - 20.0, 15.0, 1.0)).collect(),
    );
    let mut wave = {
        let mut rng = world.resource_mut::<GameRng>();
        TargetWave::for_scene(&scene, &mut rng)
    };
    for index in 1..COUNT {
        wave.pool.release(index);
    }
    let last = wave.targets()[0].position;
    world.insert_resource(scene);
    world.insert_resource(wave);
    world.resource_mut::<Bullets>().0.acquire(Bullet::fired(last, Vec3::Z, 0.0));

    world.run_system_once(hit_system).expect("System should run successfully");

    let wave = world.resource::<TargetWave>();
    assert_eq!(wave.batches, 2);
    assert_that(&wave.pool.active_count()).is_equal_to(COUNT);
    assert_that(&wave.targets().iter().filter(|target| target.active).count()).is_equal_to(COUNT);
    assert_that(&common::written::<GameEvent>(&world)).contains(GameEvent::WaveCleared { spawned: COUNT });
}
