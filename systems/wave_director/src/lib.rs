#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director responsible for spawn cadence and wave advancement.

use std::time::Duration;

use sentinel_core::{Command, Event, Phase, WaveProgress};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence.
    #[must_use]
    pub const fn new(spawn_interval: Duration) -> Self {
        Self { spawn_interval }
    }
}

/// Pure system that emits spawn and wave-advance commands while playing.
#[derive(Debug)]
pub struct WaveDirector {
    spawn_interval: Duration,
    accumulator: Duration,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and the current wave progress to emit commands.
    ///
    /// Time only accrues while the wave still has enemies to spawn; once the
    /// cap is reached the director waits for the field to clear and then
    /// requests the next wave.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        progress: WaveProgress,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Playing {
            self.accumulator = Duration::ZERO;
            return;
        }

        if !progress.has_spawns_remaining() {
            self.accumulator = Duration::ZERO;
            if progress.is_complete() {
                out.push(Command::AdvanceWave);
            }
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let remaining = progress.cap.saturating_sub(progress.spawned);
        let spawn_attempts = self.resolve_spawn_attempts(remaining);

        for _ in 0..spawn_attempts {
            out.push(Command::SpawnEnemy {
                wave: progress.wave,
            });
        }
    }

    fn resolve_spawn_attempts(&mut self, remaining: u32) -> u32 {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while attempts < remaining && self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        if attempts == remaining {
            self.accumulator = Duration::ZERO;
        }
        attempts
    }
}
