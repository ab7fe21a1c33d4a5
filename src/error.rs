//! Centralized error types for the simulation core.
//!
//! Gameplay never fails: firing on an empty magazine, reloading a full one or walking into a wall
//! are rejected silently by the systems involved. The types here only cover the setup boundary,
//! where collaborators outside the core (asset loading, host options) can actually go wrong.

use bevy_ecs::event::Event;

/// Main error type for the simulation core.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported by an [`AssetLoader`](crate::systems::scene::AssetLoader).
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
}

/// Errors in the options a host passes to [`Game::new`](crate::game::Game::new).
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Level {0} does not exist (levels run from 1 to {max})", max = crate::constants::level::MAX_LEVEL)]
    InvalidLevel(u8),
}

/// Result type for simulation operations.
pub type GameResult<T> = Result<T, GameError>;
