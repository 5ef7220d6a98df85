use std::thread;
use std::time::{Duration, Instant};

/// Paces a render loop so per-frame work does not shift the cadence.
pub struct IntervalTimer {
    last_tick: Instant,
    thread_name: String,
}

impl IntervalTimer {
    pub fn new() -> IntervalTimer {
        let cur_thread = thread::current();
        let thread_name = if let Some(name) = cur_thread.name() {
            name
        } else {
            "unnamed"
        };

        IntervalTimer {
            last_tick: Instant::now(),
            thread_name: thread_name.to_string(),
        }
    }

    pub fn wait(&mut self, interval: Duration) {
        if interval.is_zero() {
            self.last_tick = Instant::now();
            return;
        }

        let next_tick = if self.last_tick + interval > Instant::now() {
            self.last_tick + interval
        } else {
            log::debug!("{} skipped a frame", self.thread_name);
            Instant::now() + interval
        };

        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
        self.last_tick = next_tick;
    }
}
