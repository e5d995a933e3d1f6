//! Performance statistics consumed by the overlay's perf line.

use std::cell::RefCell;
use std::rc::Rc;

/// One snapshot of the host's performance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStats {
    /// Presented frames per second.
    pub game_fps: f64,
    /// Simulation updates per second.
    pub system_fps: f64,
    /// Simulation speed relative to real time (1.0 = full speed).
    pub emulation_speed: f64,
}

/// Anything that can hand out a [`PerfStats`] snapshot.
///
/// Reading is get-and-reset: each call reports the rates accumulated since
/// the previous call.
pub trait PerfStatsSource {
    fn take_perf_stats(&mut self) -> PerfStats;
}

impl<T: PerfStatsSource + ?Sized> PerfStatsSource for Rc<RefCell<T>> {
    fn take_perf_stats(&mut self) -> PerfStats {
        self.borrow_mut().take_perf_stats()
    }
}

impl<T: PerfStatsSource + ?Sized> PerfStatsSource for Box<T> {
    fn take_perf_stats(&mut self) -> PerfStats {
        (**self).take_perf_stats()
    }
}

/// Counts frames and simulation updates between reads.
#[derive(Debug)]
pub struct FrameCounter {
    /// Expected simulation rate, used for `emulation_speed`.
    target_update_rate: f64,
    frames: u64,
    updates: u64,
    /// Window start, in ms of the owner's clock.
    window_start_ms: u64,
    /// Latest timestamp reported through `frame()`/`update()`.
    last_ms: u64,
}

impl FrameCounter {
    pub fn new(target_update_rate: f64, now_ms: u64) -> Self {
        Self {
            target_update_rate,
            frames: 0,
            updates: 0,
            window_start_ms: now_ms,
            last_ms: now_ms,
        }
    }

    /// Record a presented frame.
    pub fn frame(&mut self, now_ms: u64) {
        self.frames = self.frames.saturating_add(1);
        self.last_ms = self.last_ms.max(now_ms);
    }

    /// Record a simulation update.
    pub fn update(&mut self, now_ms: u64) {
        self.updates = self.updates.saturating_add(1);
        self.last_ms = self.last_ms.max(now_ms);
    }
}

impl PerfStatsSource for FrameCounter {
    fn take_perf_stats(&mut self) -> PerfStats {
        let window_ms = self.last_ms.saturating_sub(self.window_start_ms);
        let stats = if window_ms == 0 {
            PerfStats::default()
        } else {
            let secs = window_ms as f64 / 1000.0;
            let system_fps = self.updates as f64 / secs;
            PerfStats {
                game_fps: self.frames as f64 / secs,
                system_fps,
                emulation_speed: if self.target_update_rate > 0.0 {
                    system_fps / self.target_update_rate
                } else {
                    0.0
                },
            }
        };

        self.frames = 0;
        self.updates = 0;
        self.window_start_ms = self.last_ms;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counter_reports_rates_over_window() {
        let mut counter = FrameCounter::new(60.0, 1_000);
        for i in 1..=30 {
            counter.frame(1_000 + i * 16);
            counter.update(1_000 + i * 16);
        }
        counter.frame(1_500);
        // 31 frames and 30 updates over half a second.
        let stats = counter.take_perf_stats();
        assert!((stats.game_fps - 62.0).abs() < 1e-9);
        assert!((stats.system_fps - 60.0).abs() < 1e-9);
        assert!((stats.emulation_speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frame_counter_resets_after_read() {
        let mut counter = FrameCounter::new(60.0, 0);
        counter.frame(250);
        counter.take_perf_stats();
        let stats = counter.take_perf_stats();
        assert_eq!(stats, PerfStats::default());
    }

    #[test]
    fn counters_saturate_when_never_read() {
        let mut counter = FrameCounter::new(60.0, 0);
        counter.frames = u64::MAX;
        counter.updates = u64::MAX;
        counter.frame(10);
        counter.update(10);
        assert_eq!(counter.frames, u64::MAX);
        assert_eq!(counter.updates, u64::MAX);
    }

    #[test]
    fn shared_counter_reads_through_handle() {
        let counter = Rc::new(RefCell::new(FrameCounter::new(60.0, 0)));
        counter.borrow_mut().frame(1_000);
        let mut handle = counter.clone();
        let stats = handle.take_perf_stats();
        assert!((stats.game_fps - 1.0).abs() < 1e-9);
    }
}
