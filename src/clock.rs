//! Playback time with pause and frame stepping.

use std::time::{Duration, Instant};

/// Length of one step when scrubbing a paused clock.
pub const STEP: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Shader time that can be paused, stepped and restarted.
///
/// While playing, time is measured from `start`. Pausing freezes the current
/// value in `frozen`; resuming shifts `start` so playback continues from it.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    frozen: Duration,
    paused: bool,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            frozen: Duration::ZERO,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current playback time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    fn elapsed_at(&self, now: Instant) -> Duration {
        if self.paused {
            self.frozen
        } else {
            now.saturating_duration_since(self.start)
        }
    }

    /// Current playback time in seconds.
    pub fn time(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Flips between playing and paused. Returns `true` if now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.toggle_pause_at(Instant::now())
    }

    fn toggle_pause_at(&mut self, now: Instant) -> bool {
        if self.paused {
            self.start = now.checked_sub(self.frozen).unwrap_or(now);
            self.paused = false;
        } else {
            self.pause_at(now);
        }
        self.paused
    }

    fn pause_at(&mut self, now: Instant) {
        if !self.paused {
            self.frozen = self.elapsed_at(now);
            self.paused = true;
        }
    }

    /// Pauses if needed, then moves one step back. Never goes below zero.
    pub fn step_back(&mut self) {
        self.pause_at(Instant::now());
        self.frozen = self.frozen.saturating_sub(STEP);
    }

    /// Pauses if needed, then moves one step forward.
    pub fn step_forward(&mut self) {
        self.pause_at(Instant::now());
        self.frozen += STEP;
    }

    /// Back to zero, keeping the play/pause state.
    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.frozen = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_from_start() {
        let t0 = Instant::now();
        let clock = Clock::starting_at(t0);
        assert!(!clock.is_paused());
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(2)), Duration::from_secs(2));
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(t0);

        assert!(clock.toggle_pause_at(t0 + Duration::from_secs(3)));
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(10)), Duration::from_secs(3));

        assert!(!clock.toggle_pause_at(t0 + Duration::from_secs(10)));
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(11)), Duration::from_secs(4));
    }

    #[test]
    fn stepping_pauses_first() {
        let mut clock = Clock::new();
        clock.step_forward();
        assert!(clock.is_paused());

        let before = clock.elapsed();
        clock.step_forward();
        assert_eq!(clock.elapsed(), before + STEP);
        clock.step_back();
        assert_eq!(clock.elapsed(), before);
    }

    #[test]
    fn step_back_saturates_at_zero() {
        let mut clock = Clock::new();
        clock.restart();
        clock.step_back();
        clock.step_back();
        assert!(clock.elapsed() < STEP);
        clock.restart();
        clock.step_back();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn restart_while_paused_stays_paused() {
        let mut clock = Clock::new();
        clock.step_forward();
        clock.step_forward();
        clock.restart();
        assert!(clock.is_paused());
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn step_is_one_sixtieth() {
        assert!((STEP.as_secs_f32() - 1.0 / 60.0).abs() < 1e-6);
    }
}
