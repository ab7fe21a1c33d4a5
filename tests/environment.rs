use bevy_ecs::system::RunSystemOnce;
use marksman::constants::environment::{
    LIGHT_INTENSITY_STEP, MAX_LIGHT_INTENSITY, MAX_SUN_HEIGHT, MIN_LIGHT_INTENSITY, MIN_SUN_HEIGHT,
};
use marksman::systems::{environment_system, DeltaTime, Environment};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

#[test]
fn test_sun_starts_high() {
    let environment = Environment::default();

    assert_eq!(environment.sun_position.y, MAX_SUN_HEIGHT);
    assert_eq!(environment.sun_intensity, 1.0);
}

#[test]
fn test_sun_sets_and_wraps() {
    let mut environment = Environment::default();

    environment.advance_sun(4.5);
    assert_that(&(environment.sunset_progress - 0.9).abs()).is_less_than(1e-5);
    assert_that(&environment.sun_position.y).is_greater_than_or_equal_to(MIN_SUN_HEIGHT);
    assert_that(&environment.sun_position.y).is_less_than(MAX_SUN_HEIGHT);

    environment.advance_sun(1.0);
    assert_eq!(environment.sunset_progress, 0.0);
    assert_eq!(environment.sun_position.y, MAX_SUN_HEIGHT);
}

#[test]
fn test_light_intensity_bounces_between_limits() {
    let mut environment = Environment::default();
    let steps = ((MAX_LIGHT_INTENSITY - MIN_LIGHT_INTENSITY) / LIGHT_INTENSITY_STEP).ceil() as usize;

    environment.advance_lights(0.016);
    assert_that(&environment.light_intensity).is_less_than(MAX_LIGHT_INTENSITY);

    for _ in 0..steps {
        environment.advance_lights(0.016);
    }
    assert_that(&environment.light_intensity).is_greater_than_or_equal_to(MIN_LIGHT_INTENSITY);
    let low = environment.light_intensity;

    environment.advance_lights(0.016);
    assert_that(&environment.light_intensity).is_greater_than(low);
    assert_that(&environment.lamp_rotation).is_greater_than(0.0);
}

#[test]
fn test_facility_has_no_sun_cycle() {
    let mut world = common::create_test_world(2);
    world.insert_resource(DeltaTime::from_seconds(1.0));

    world.run_system_once(environment_system).expect("System should run successfully");

    let environment = world.resource::<Environment>();
    assert_eq!(environment.sunset_progress, 0.0);
    assert_that(&environment.lamp_rotation).is_greater_than(0.0);
}

#[test]
fn test_forest_sun_advances() {
    let mut world = common::create_test_world(1);
    world.insert_resource(DeltaTime::from_seconds(1.0));

    world.run_system_once(environment_system).expect("System should run successfully");

    assert_that(&world.resource::<Environment>().sunset_progress).is_greater_than(0.0);
}
