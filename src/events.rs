use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::systems::ammo::AmmoKind;
use crate::systems::camera::ViewMode;
use crate::systems::player::{MoveDirection, TurnDirection};

/// A discrete intent delivered by the input source, at most a handful per tick.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameCommand {
    Exit,
    Move(MoveDirection),
    Turn(TurnDirection),
    JumpPressed,
    JumpReleased,
    FirePressed,
    FireReleased,
    AimPressed,
    AimReleased,
    Reload,
    /// Relative pointer motion; only turns the player while aiming.
    Look { dx: f32, dy: f32 },
    SetView(ViewMode),
    ToggleMute,
}

/// Notable gameplay moments, published for the host (HUD, achievements, logging).
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    TargetHit {
        position: Vec3,
        /// Damage of the weapon modifier equipped at the moment of impact.
        damage: f32,
        score: u32,
    },
    AmmoCollected {
        kind: AmmoKind,
        /// Reserves after the pickup was applied.
        reserves: u32,
    },
    WaveCleared {
        spawned: usize,
    },
    DoorSpawned,
    LevelAdvanced {
        level: u8,
    },
    GameEnded {
        won: bool,
    },
}
