//! Clocks and frame timing.

use std::time::{Duration, Instant};

/// Source of monotonic milliseconds. Message expiry and the perf refresh
/// interval are both measured against this.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Never goes backwards.
    fn now_ms(&self) -> u64;
}

/// `Instant`-backed clock counting from its own construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Host-loop frame timer. Real time is banked each frame and paid out in
/// fixed simulation steps.
#[derive(Debug)]
pub struct Time {
    origin: Instant,
    previous: Instant,
    frames: u64,
    step: Duration,
    banked: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Timer with a 60 Hz simulation step.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            previous: now,
            frames: 0,
            step: Duration::from_secs_f64(1.0 / 60.0),
            banked: Duration::ZERO,
        }
    }

    /// Start a frame: bank the real time since the previous one.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.banked += now.saturating_duration_since(self.previous);
        self.previous = now;
        self.frames += 1;
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.previous.saturating_duration_since(self.origin).as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Simulation steps per second.
    pub fn fixed_rate(&self) -> f64 {
        self.step.as_secs_f64().recip()
    }

    /// Take one step from the bank if a full one is available.
    pub fn should_fixed_update(&mut self) -> bool {
        match self.banked.checked_sub(self.step) {
            Some(rest) => {
                self.banked = rest;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn fixed_steps_drain_the_bank() {
        let mut time = Time::new();
        assert!(!time.should_fixed_update());
        time.banked = time.step * 3 + Duration::from_micros(10);
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn new_timer_runs_at_sixty_hz() {
        let time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert!((time.fixed_rate() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn update_counts_frames() {
        let mut time = Time::new();
        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.elapsed_seconds() >= 0.0);
    }
}
