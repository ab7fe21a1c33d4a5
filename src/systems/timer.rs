//! Time-based value objects.
//!
//! Reloads, respawns, cooldowns and the level clock are all driven by these instead of loose floats,
//! so each can be ticked and inspected on its own without running the whole schedule.

/// Counts down from a budget towards zero, e.g. the level clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Advances the countdown, returning `true` once it has run out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left, never negative.
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn reset(&mut self, seconds: f32) {
        self.remaining = seconds;
    }
}

/// Accumulates elapsed time until a fixed duration is reached, e.g. a reload or a respawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    elapsed: f32,
    duration: f32,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self { elapsed: 0.0, duration }
    }

    /// Advances the timer, returning `true` once the duration has been reached.
    ///
    /// The timer does not reset itself; callers decide what finishing means.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.finished()
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Completion ratio in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Gates an action to at most once per window, measured against the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cooldown {
    last: Option<f32>,
}

impl Cooldown {
    /// Whether `window` seconds have passed since the last trigger (or it never triggered).
    pub fn ready(&self, now: f32, window: f32) -> bool {
        match self.last {
            Some(last) => now - last >= window,
            None => true,
        }
    }

    pub fn trigger(&mut self, now: f32) {
        self.last = Some(now);
    }

    /// Triggers the cooldown if it is ready, returning whether it was.
    pub fn try_trigger(&mut self, now: f32, window: f32) -> bool {
        if self.ready(now, window) {
            self.trigger(now);
            true
        } else {
            false
        }
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }
}
