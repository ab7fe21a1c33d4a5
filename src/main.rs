//! Headless host: runs a scripted session at the fixed tick rate and logs what a renderer would draw.

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use marksman::constants::level::{FIRST_LEVEL, MAX_LEVEL, TIME_LIMIT};
use marksman::constants::{LOOP_TIME, TICK_SECONDS};
use marksman::events::GameCommand;
use marksman::formatter::TickFormatter;
use marksman::game::{Game, GameOptions};
use marksman::snapshot::{Renderer, WorldSnapshot};
use marksman::systems::{MoveDirection, NullAssetLoader, ScriptedInput, SilentAudio, TurnDirection, ViewMode};

/// Ticks between two renderer log lines.
const RENDER_LOG_INTERVAL: u64 = 60;

/// Renderer that describes each frame in the log instead of drawing it.
struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &WorldSnapshot) {
        if snapshot.tick % RENDER_LOG_INTERVAL != 0 {
            return;
        }

        debug!(
            tick = snapshot.tick,
            level = snapshot.level.level,
            position = ?snapshot.player.position,
            yaw = snapshot.player.yaw,
            health = snapshot.player.health(),
            score = snapshot.player.score,
            magazine = snapshot.weapon.magazine(),
            reserves = snapshot.weapon.reserves(),
            reload = ?snapshot.weapon.reload_progress(),
            bullets = snapshot.active_bullets(),
            targets = snapshot.active_targets(),
            remaining = snapshot.level.timer.remaining(),
            "Frame"
        );
    }
}

fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Could not set tracing subscriber")
}

fn read_options() -> Result<GameOptions> {
    let seed = env::var("MARKSMAN_SEED")
        .ok()
        .map(|value| value.parse::<u64>())
        .transpose()
        .context("MARKSMAN_SEED must be an unsigned integer")?;
    let start_level = env::var("MARKSMAN_LEVEL")
        .ok()
        .map(|value| value.parse::<u8>())
        .transpose()
        .context("MARKSMAN_LEVEL must be a level number")?
        .unwrap_or(FIRST_LEVEL);

    Ok(GameOptions { seed, start_level })
}

/// A short patrol: look around, walk, jump, shoot, reload, then keep turning and firing.
fn demo_script() -> ScriptedInput {
    let mut script = vec![
        (5, GameCommand::SetView(ViewMode::FirstPerson)),
        (10, GameCommand::AimPressed),
        (12, GameCommand::Look { dx: 25.0, dy: 10.0 }),
        (20, GameCommand::FirePressed),
        (40, GameCommand::FireReleased),
        (41, GameCommand::AimReleased),
        (50, GameCommand::Reload),
        (60, GameCommand::JumpPressed),
        (61, GameCommand::JumpReleased),
    ];

    for step in 0..200u64 {
        let tick = 200 + step * 4;
        script.push((tick, GameCommand::Move(MoveDirection::Forward)));
        if step % 10 == 0 {
            script.push((tick, GameCommand::Turn(TurnDirection::Left)));
        }
    }

    script.push((1100, GameCommand::SetView(ViewMode::ThirdPerson)));
    script.push((1100, GameCommand::FirePressed));
    script.push((1300, GameCommand::FireReleased));
    script.push((1400, GameCommand::Reload));

    ScriptedInput::new(script)
}

fn main() -> Result<()> {
    init_tracing()?;

    let options = read_options()?;
    info!(seed = ?options.seed, level = options.start_level, "Starting headless session");

    let mut game = Game::new(options, Box::new(NullAssetLoader), Box::new(SilentAudio))?;
    game.set_input(Box::new(demo_script()));

    let mut renderer = LogRenderer;
    // Every level can run out its clock, plus a little slack for the transitions.
    let max_ticks = (TIME_LIMIT / TICK_SECONDS) as u64 * u64::from(MAX_LEVEL) + 60;
    let started = Instant::now();

    loop {
        let tick_start = Instant::now();

        let exit = game.tick(TICK_SECONDS);
        renderer.render(&game.snapshot());

        for event in game.recent_events() {
            debug!(?event, "Game event");
        }

        if exit {
            info!("Exit requested");
            break;
        }
        if let Some(won) = game.outcome() {
            info!(won, "Session finished");
            break;
        }
        if game.current_tick() >= max_ticks {
            info!(ticks = max_ticks, "Tick limit reached");
            break;
        }

        if let Some(remaining) = LOOP_TIME.checked_sub(tick_start.elapsed()) {
            spin_sleep::sleep(remaining);
        }
    }

    let snapshot = game.snapshot();
    info!(
        ticks = snapshot.tick,
        elapsed = format!("{:.2?}", started.elapsed()),
        level = snapshot.level.level,
        score = snapshot.player.score,
        health = snapshot.player.health(),
        "Session summary"
    );
    for line in game.timing_report() {
        info!("{}", line);
    }

    Ok(())
}
