//! Per-system tick timings, kept over a short rolling window.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bevy_ecs::resource::Resource;
use bevy_ecs::system::{IntoSystem, System};
use bevy_ecs::world::World;
use circular_buffer::CircularBuffer;
use num_width::NumberWidth;
use parking_lot::Mutex;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thousands::Separable;
use tracing::warn;

const MAX_SYSTEMS: usize = SystemId::COUNT;
/// Number of ticks kept per system.
const TIMING_WINDOW_SIZE: usize = 30;
/// A single system taking at least this long on a tick is always reported as slow.
const SLOW_SYSTEM_THRESHOLD: Duration = Duration::from_millis(2);
/// Systems listed in the timing report, besides the total.
const REPORTED_SYSTEMS: usize = 9;

/// Rolling window of durations, padded with zeroes for ticks where the system did not run.
#[derive(Debug, Default)]
pub struct TimingBuffer {
    buffer: CircularBuffer<TIMING_WINDOW_SIZE, Duration>,
    last_tick: u64,
}

impl TimingBuffer {
    fn pad_to(&mut self, current_tick: u64) {
        if current_tick > self.last_tick + 1 {
            for _ in 0..(current_tick - self.last_tick - 1) {
                self.buffer.push_back(Duration::ZERO);
            }
        }
    }

    /// Records the duration for `current_tick`. Ticks older than the last recorded one are dropped.
    pub fn add_timing(&mut self, duration: Duration, current_tick: u64) {
        if current_tick < self.last_tick {
            warn!(current_tick, last_tick = self.last_tick, "Dropping timing from an earlier tick");
            return;
        }

        self.pad_to(current_tick);
        self.buffer.push_back(duration);
        self.last_tick = current_tick;
    }

    pub fn get_most_recent_timing(&self) -> Duration {
        self.buffer.back().copied().unwrap_or(Duration::ZERO)
    }

    /// Mean and sample standard deviation over the window, as of `current_tick`.
    pub fn get_stats(&mut self, current_tick: u64) -> TimingStats {
        if current_tick > self.last_tick {
            self.pad_to(current_tick);
            self.last_tick = current_tick;
        }

        // Welford's online algorithm
        let mut count = 0u16;
        let mut mean = 0.0f32;
        let mut squared = 0.0f32;
        for duration in self.buffer.iter() {
            let value = duration.as_secs_f32();
            count += 1;
            let delta = value - mean;
            mean += delta / count as f32;
            squared += delta * (value - mean);
        }

        match count {
            0 => TimingStats::default(),
            1 => TimingStats {
                average: Duration::from_secs_f32(mean),
                deviation: Duration::ZERO,
            },
            n => TimingStats {
                average: Duration::from_secs_f32(mean),
                deviation: Duration::from_secs_f32((squared / (n - 1) as f32).sqrt()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingStats {
    pub average: Duration,
    pub deviation: Duration,
}

/// Number of ticks the simulation has completed.
#[derive(Resource, Debug, Default)]
pub struct Timing {
    current_tick: AtomicU64,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_current_tick(&self) -> u64 {
        self.current_tick.load(Ordering::Relaxed)
    }

    /// Returns the new tick number.
    pub fn increment_tick(&self) -> u64 {
        self.current_tick.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(EnumCount, EnumIter, IntoStaticStr, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SystemId {
    Total,
    Input,
    PlayerControls,
    Environment,
    AmmoSpin,
    LevelTimer,
    LevelState,
    Jump,
    ScreenShake,
    Hazard,
    Bullets,
    Explosions,
    Reload,
    Hits,
    AmmoRespawn,
    AmmoPickup,
    Fire,
    Camera,
    Audio,
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(self).to_ascii_lowercase())
    }
}

#[derive(Resource, Debug)]
pub struct SystemTimings {
    pub timings: micromap::Map<SystemId, Mutex<TimingBuffer>, MAX_SYSTEMS>,
}

impl Default for SystemTimings {
    fn default() -> Self {
        let mut timings = micromap::Map::new();
        for id in SystemId::iter() {
            timings.insert(id, Mutex::new(TimingBuffer::default()));
        }
        Self { timings }
    }
}

impl SystemTimings {
    pub fn add_timing(&self, id: SystemId, duration: Duration, current_tick: u64) {
        if let Some(buffer) = self.timings.get(&id) {
            buffer.lock().add_timing(duration, current_tick);
        }
    }

    /// Records the time taken by the whole tick, scheduler included.
    pub fn add_total_timing(&self, duration: Duration, current_tick: u64) {
        self.add_timing(SystemId::Total, duration, current_tick);
    }

    pub fn get_stats(&self, current_tick: u64) -> micromap::Map<SystemId, TimingStats, MAX_SYSTEMS> {
        let mut stats = micromap::Map::new();
        for (id, buffer) in self.timings.iter() {
            stats.insert(*id, buffer.lock().get_stats(current_tick));
        }
        stats
    }

    /// Aligned report lines: the effective tick rate first, then the most expensive systems.
    pub fn format_timing_display(&self, current_tick: u64) -> SmallVec<[String; SystemId::COUNT]> {
        let stats = self.get_stats(current_tick);
        let total = stats.get(&SystemId::Total).copied().unwrap_or_default();

        let rate = match total.average.as_secs_f64() {
            secs if secs <= 0.0 => "  --- TPS".to_string(),
            secs => match 1.0 / secs {
                f if f > 100.0 => format!("{:>5} TPS", (f as u32).separate_with_commas()),
                f if f < 10.0 => format!("{:.1} TPS", f),
                f => format!("{:5.0} TPS", f),
            },
        };

        let mut systems: SmallVec<[(SystemId, TimingStats); SystemId::COUNT]> = stats
            .iter()
            .filter(|(id, _)| **id != SystemId::Total)
            .map(|(id, stats)| (*id, *stats))
            .collect();
        systems.sort_by(|a, b| b.1.average.cmp(&a.1.average));

        let rows = std::iter::once((rate, total)).chain(
            systems
                .into_iter()
                .take(REPORTED_SYSTEMS)
                .map(|(id, stats)| (id.to_string(), stats)),
        );
        format_timing_display(rows)
    }

    /// Systems most likely responsible for a slow tick, judged by their latest timing.
    ///
    /// Any system over [`SLOW_SYSTEM_THRESHOLD`] is returned. Failing that, the slowest systems are
    /// accumulated until they make up 30% of the tick, up to five of them.
    pub fn get_slowest_systems(&self) -> SmallVec<[(SystemId, Duration); 5]> {
        let mut recent: SmallVec<[(SystemId, Duration); SystemId::COUNT]> = self
            .timings
            .iter()
            .filter(|(id, _)| **id != SystemId::Total)
            .map(|(id, buffer)| (*id, buffer.lock().get_most_recent_timing()))
            .collect();
        recent.sort_by(|a, b| b.1.cmp(&a.1));

        let over_threshold: SmallVec<[(SystemId, Duration); 5]> = recent
            .iter()
            .filter(|(_, duration)| *duration >= SLOW_SYSTEM_THRESHOLD)
            .take(5)
            .copied()
            .collect();
        if !over_threshold.is_empty() {
            return over_threshold;
        }

        let total: Duration = recent.iter().map(|(_, duration)| *duration).sum();
        let threshold = total.as_nanos() as f64 * 0.3;
        let mut accumulated = 0u128;
        let mut result = SmallVec::new();
        for (id, duration) in recent.iter().take(5) {
            result.push((*id, *duration));
            accumulated += duration.as_nanos();
            if accumulated as f64 >= threshold {
                break;
            }
        }
        result
    }
}

/// Wraps a system so each run is timed under `id`.
pub fn profile<S, M>(id: SystemId, system: S) -> impl FnMut(&mut World)
where
    S: IntoSystem<(), (), M> + 'static,
{
    let mut system: S::System = IntoSystem::into_system(system);
    let mut initialized = false;
    move |world: &mut World| {
        if !initialized {
            system.initialize(world);
            initialized = true;
        }

        let start = Instant::now();
        system.run((), world);
        let duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (world.get_resource::<SystemTimings>(), world.get_resource::<Timing>()) {
            timings.add_timing(id, duration, timing.get_current_tick());
        }
    }
}

/// Splits a duration into whole units, the thousandths below them, and the unit's suffix.
fn split_duration(duration: Duration) -> (u64, u32, &'static str) {
    if duration >= Duration::from_secs(1) {
        (duration.as_secs(), duration.subsec_millis(), "s")
    } else if duration >= Duration::from_millis(1) {
        (duration.as_millis() as u64, (duration.as_micros() % 1000) as u32, "ms")
    } else if duration >= Duration::from_micros(1) {
        (duration.as_micros() as u64, (duration.as_nanos() % 1000) as u32, "µs")
    } else {
        (duration.as_nanos() as u64, 0, "ns")
    }
}

/// Formats `(name, stats)` rows into lines with aligned columns.
pub fn format_timing_display(
    rows: impl IntoIterator<Item = (String, TimingStats)>,
) -> SmallVec<[String; SystemId::COUNT]> {
    struct Row {
        name: String,
        average: (u64, u32, &'static str),
        deviation: (u64, u32, &'static str),
    }

    let rows: SmallVec<[Row; SystemId::COUNT]> = rows
        .into_iter()
        .map(|(name, stats)| Row {
            name,
            average: split_duration(stats.average),
            deviation: split_duration(stats.deviation),
        })
        .collect();

    let (avg_int_w, avg_dec_w, dev_int_w, dev_dec_w) = rows.iter().fold((0, 3, 0, 3), |(ai, ad, di, dd), row| {
        (
            ai.max(row.average.0.width() as usize),
            ad.max(row.average.1.width() as usize),
            di.max(row.deviation.0.width() as usize),
            dd.max(row.deviation.1.width() as usize),
        )
    });
    let name_w = SystemId::iter()
        .map(|id| id.to_string().len())
        .chain(rows.iter().map(|row| row.name.len()))
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let (avg_int, avg_dec, avg_unit) = row.average;
            let (dev_int, dev_dec, dev_unit) = row.deviation;
            format!(
                "{name:name_w$} : {avg_int:avg_int_w$}.{avg_dec:<avg_dec_w$}{avg_unit} ± {dev_int:dev_int_w$}.{dev_dec:<dev_dec_w$}{dev_unit}",
                name = row.name,
            )
        })
        .collect()
}
