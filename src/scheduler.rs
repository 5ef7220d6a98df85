use std::fmt;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::effects::{self, Effect, Step};
use crate::intervaltimer::IntervalTimer;
use crate::strip::StripDriver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The strip driver failed to initialize or was never handed over.
    StripUnavailable,
    /// The soft power toggle is off. Requests are still accepted by the
    /// callers, but nothing is written to the hardware.
    LightsOff,
    UnknownEffect(String),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::StripUnavailable => write!(f, "no usable strip driver"),
            SchedulerError::LightsOff => write!(f, "lights are switched off"),
            SchedulerError::UnknownEffect(name) => write!(f, "unknown effect \"{}\"", name),
        }
    }
}

/// Everything one `run` call needs to know about the animation to start.
#[derive(Debug, Clone)]
pub struct EffectRequest {
    pub effect: String,
    pub color: Color,
    pub delay_ms: u64,
    pub iterations: u32,
    /// Protected window: a non-forced switch away from this effect waits
    /// until this much time has passed since it started.
    pub min_runtime: Duration,
    pub reverse: bool,
    /// Skip the previous effect's protected window.
    pub force: bool,
}

struct RunningEffect {
    handle: thread::JoinHandle<()>,
    cancel_tx: mpsc::Sender<()>,
    name: String,
    protected_until: Instant,
}

/// Owns the single worker thread that may animate the strip.
///
/// At most one `RunningEffect` exists at any time. Every `run` routes
/// through `kill` before a new worker is spawned, and the worker holds the
/// strip mutex for its whole life, so the strip never sees two writers.
pub struct EffectScheduler {
    strip: Option<Arc<Mutex<Box<dyn StripDriver>>>>,
    running: Option<RunningEffect>,
    lights_on: bool,
    brightness: u8,
}

impl EffectScheduler {
    pub fn new(strip: Option<Box<dyn StripDriver>>, brightness: u8) -> EffectScheduler {
        EffectScheduler {
            strip: strip.map(|strip| Arc::new(Mutex::new(strip))),
            running: None,
            lights_on: true,
            brightness,
        }
    }

    /// Stops the current effect per the `kill` policy, then starts the
    /// requested one on a fresh worker thread.
    pub fn run(&mut self, request: EffectRequest) -> Result<(), SchedulerError> {
        if !self.lights_on {
            return Err(SchedulerError::LightsOff);
        }
        let strip = match &self.strip {
            Some(strip) => Arc::clone(strip),
            None => return Err(SchedulerError::StripUnavailable),
        };

        self.kill(request.force);

        let Some(effect) = effects::create(
            &request.effect,
            request.color,
            request.delay_ms,
            request.iterations,
            request.reverse,
        ) else {
            return Err(SchedulerError::UnknownEffect(request.effect));
        };

        let (cancel_tx, cancel_rx) = mpsc::channel();
        let brightness = self.brightness;
        let handle = match thread::Builder::new()
            .name(format!("effect-{}", request.effect))
            .spawn(move || run_worker(strip, effect, cancel_rx, brightness))
        {
            Ok(handle) => handle,
            Err(error) => panic!("Failed to create thread: {}", error),
        };

        log::info!("Started effect \"{}\"", request.effect);
        self.running = Some(RunningEffect {
            handle,
            cancel_tx,
            name: request.effect,
            protected_until: Instant::now() + request.min_runtime,
        });
        Ok(())
    }

    /// Stops the running worker, if any. Returns whether one was stopped.
    ///
    /// Without `force` this call blocks until the worker's protected window
    /// has elapsed, then until the worker acknowledges the cancellation.
    /// The window wait is the documented contract of the protected-runtime
    /// policy, bounded by the `min_runtime` the requesting caller chose; the
    /// acknowledgement wait is bounded by one frame interval.
    pub fn kill(&mut self, force: bool) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        if !force {
            let now = Instant::now();
            if now < running.protected_until {
                let remaining = running.protected_until - now;
                log::debug!(
                    "Letting \"{}\" finish its protected window, {:?} left",
                    running.name,
                    remaining
                );
                thread::sleep(remaining);
            }
        }

        // A worker that already completed naturally has dropped its
        // receiver; the failed send is fine either way.
        let _ = running.cancel_tx.send(());
        if running.handle.join().is_err() {
            log::error!("Effect worker \"{}\" panicked", running.name);
        }

        log::debug!("Stopped effect \"{}\"", running.name);
        true
    }

    /// Whether a worker is currently executing. A worker that completed
    /// naturally but has not been reaped yet does not count.
    pub fn is_animating(&self) -> bool {
        self.running
            .as_ref()
            .map_or(false, |running| !running.handle.is_finished())
    }

    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    /// The soft power toggle. Switching off stops the worker immediately
    /// and blanks the strip; `run` reports `LightsOff` until switched back
    /// on.
    pub fn set_lights(&mut self, on: bool) {
        if self.lights_on == on {
            return;
        }

        self.lights_on = on;
        if !on {
            self.kill(true);
            if let Ok(Err(error)) = self.with_strip(|strip| strip.blackout()) {
                log::warn!("Failed to blank the strip: {}", error);
            }
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Brightness for subsequent workers. Applied to the strip right away
    /// when no worker is animating; a live worker keeps its claim and the
    /// next one picks the value up.
    pub fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
        if self.is_animating() {
            return;
        }

        if let Ok(Err(error)) = self.with_strip(|strip| {
            strip.set_brightness(level);
            strip.show()
        }) {
            log::warn!("Failed to apply brightness: {}", error);
        }
    }

    /// Runs `f` against the strip. The strip mutex is the advisory
    /// backstop behind the single-writer rule: callers must stop the
    /// worker first, otherwise this blocks until the worker exits.
    pub fn with_strip<T>(&self, f: impl FnOnce(&mut dyn StripDriver) -> T) -> Result<T, SchedulerError> {
        let Some(strip) = &self.strip else {
            return Err(SchedulerError::StripUnavailable);
        };

        let mut guard = match strip.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(f(guard.as_mut()))
    }
}

/// The worker: claims the strip, then alternates between polling the
/// cancel channel and rendering one frame until cancelled, complete, or
/// the driver fails. Runs on its own thread so a panicking effect only
/// takes the worker down; the scheduler notices at join time.
fn run_worker(
    strip: Arc<Mutex<Box<dyn StripDriver>>>,
    mut effect: Box<dyn Effect>,
    cancel_rx: mpsc::Receiver<()>,
    brightness: u8,
) {
    // A panicking predecessor leaves the mutex poisoned; its frame buffer
    // is still usable.
    let mut strip = match strip.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    strip.set_brightness(brightness);

    let mut timer = IntervalTimer::new();
    loop {
        match cancel_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match effect.step(strip.as_mut()) {
            Ok(Step::Continue(delay)) => timer.wait(delay),
            Ok(Step::Done) => break,
            Err(error) => {
                log::warn!("Effect stopped by driver write failure: {}", error);
                break;
            }
        }
    }
}
