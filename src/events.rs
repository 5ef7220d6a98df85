use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::color::hex_to_rgb;
use crate::config::{EffectsConfig, ProgressConfig, StateEffectConfig};
use crate::progress;
use crate::scheduler::{EffectRequest, EffectScheduler};

/// Printer lifecycle notifications as published by the OctoPrint MQTT
/// plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterEvent {
    Connected,
    Disconnected,
    PrintStarted,
    PrintPaused,
    PrintFailed,
    PrintDone,
    PrintCancelled,
}

impl PrinterEvent {
    pub fn parse(name: &str) -> Option<PrinterEvent> {
        match name {
            "Connected" => Some(PrinterEvent::Connected),
            "Disconnected" => Some(PrinterEvent::Disconnected),
            "PrintStarted" => Some(PrinterEvent::PrintStarted),
            "PrintPaused" => Some(PrinterEvent::PrintPaused),
            "PrintFailed" => Some(PrinterEvent::PrintFailed),
            "PrintDone" => Some(PrinterEvent::PrintDone),
            "PrintCancelled" => Some(PrinterEvent::PrintCancelled),
            _ => None,
        }
    }
}

/// Translates printer events, progress ticks and power commands into
/// scheduler calls. This is the single control context issuing `run` and
/// `kill`; messages arrive serialized from the MQTT consumer.
pub struct Controller {
    scheduler: Arc<Mutex<EffectScheduler>>,
    effects: EffectsConfig,
    progress: ProgressConfig,
    /// The request for the current printer state, replayed when the
    /// lights come back on.
    current: Option<EffectRequest>,
}

impl Controller {
    pub fn new(
        scheduler: Arc<Mutex<EffectScheduler>>,
        effects: EffectsConfig,
        progress: ProgressConfig,
    ) -> Controller {
        Controller {
            scheduler,
            effects,
            progress,
            current: None,
        }
    }

    /// Startup sequence: the init effect plays out its protected window,
    /// then the strip settles on the idle effect.
    pub fn startup(&mut self) {
        self.apply(request_from(&self.effects.init, false));
        self.apply(request_from(&self.effects.idle, false));
    }

    pub fn handle_event(&mut self, event: PrinterEvent) {
        log::info!("Printer event: {:?}", event);
        let request = match event {
            PrinterEvent::Connected | PrinterEvent::PrintCancelled => {
                request_from(&self.effects.idle, false)
            }
            PrinterEvent::Disconnected => request_from(&self.effects.disconnected, false),
            PrinterEvent::PrintStarted => self.print_started_request(),
            PrinterEvent::PrintPaused => request_from(&self.effects.paused, false),
            PrinterEvent::PrintFailed => request_from(&self.effects.failed, false),
            PrinterEvent::PrintDone => request_from(&self.effects.done, false),
        };
        self.apply(request);
    }

    /// A print begins: wipe the strip over to the progress base color so
    /// the first ticks paint onto a defined background.
    fn print_started_request(&self) -> EffectRequest {
        EffectRequest {
            effect: "Color Wipe".to_string(),
            color: hex_to_rgb(self.progress.base_color.as_deref()),
            delay_ms: 10,
            iterations: 1,
            min_runtime: Duration::ZERO,
            reverse: self.progress.reverse,
            force: false,
        }
    }

    fn apply(&mut self, request: EffectRequest) {
        self.current = Some(request.clone());
        let mut scheduler = lock(&self.scheduler);
        if let Err(error) = scheduler.run(request) {
            log::warn!("Not starting effect: {}", error);
        }
    }

    /// A progress tick pre-empts whatever ambient animation is running,
    /// bypassing its protected window, and paints one frame directly.
    pub fn handle_progress(&mut self, percent: u8) {
        if !self.progress.enabled {
            return;
        }

        let mut scheduler = lock(&self.scheduler);
        if percent == 100 && scheduler.is_animating() {
            // The final tick can race the PrintDone event; the ambient
            // effect that is already running wins.
            log::debug!("Ignoring stale 100% progress tick");
            return;
        }
        if !scheduler.lights_on() {
            return;
        }

        log::info!("Updating progress LEDs: {}", percent);
        scheduler.kill(true);

        let base = hex_to_rgb(self.progress.base_color.as_deref());
        let target = hex_to_rgb(self.progress.color.as_deref());
        let reverse = self.progress.reverse;
        match scheduler.with_strip(|strip| progress::paint(strip, base, target, percent, reverse)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => log::warn!("Progress frame failed: {}", error),
            Err(error) => log::warn!("Cannot paint progress: {}", error),
        }
    }

    pub fn set_lights(&mut self, on: bool) {
        log::info!("Lights switched {}", if on { "on" } else { "off" });
        let mut scheduler = lock(&self.scheduler);
        scheduler.set_lights(on);
        if on {
            if let Some(request) = self.current.clone() {
                if let Err(error) = scheduler.run(request) {
                    log::warn!("Not resuming effect: {}", error);
                }
            }
        }
    }

    pub fn set_brightness(&mut self, level: u8) {
        lock(&self.scheduler).set_brightness(level);
    }

    pub fn lights_on(&self) -> bool {
        lock(&self.scheduler).lights_on()
    }

    pub fn brightness(&self) -> u8 {
        lock(&self.scheduler).brightness()
    }
}

fn request_from(config: &StateEffectConfig, force: bool) -> EffectRequest {
    EffectRequest {
        effect: config.effect.clone(),
        color: hex_to_rgb(config.color.as_deref()),
        delay_ms: config.delay_ms,
        iterations: config.iterations,
        min_runtime: Duration::from_millis(config.min_runtime_ms),
        reverse: config.reverse,
        force,
    }
}

fn lock(scheduler: &Arc<Mutex<EffectScheduler>>) -> MutexGuard<'_, EffectScheduler> {
    match scheduler.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::config::Config;
    use crate::strip::testing::{Frame, MockStrip};

    fn controller(pixel_count: usize) -> (Controller, Arc<Mutex<Vec<Frame>>>) {
        let (strip, frames) = MockStrip::new(pixel_count);
        let scheduler = Arc::new(Mutex::new(EffectScheduler::new(
            Some(Box::new(strip)),
            255,
        )));
        let config = Config::default();
        (
            Controller::new(scheduler, config.effects, config.progress),
            frames,
        )
    }

    #[test]
    fn event_names_parse() {
        assert_eq!(PrinterEvent::parse("PrintDone"), Some(PrinterEvent::PrintDone));
        assert_eq!(PrinterEvent::parse("Connected"), Some(PrinterEvent::Connected));
        assert_eq!(PrinterEvent::parse("ClientOpened"), None);
    }

    #[test]
    fn done_event_paints_the_done_color() {
        let (mut controller, frames) = controller(4);
        controller.handle_event(PrinterEvent::PrintDone);
        thread::sleep(Duration::from_millis(100));

        // Default done effect: solid #00ff00.
        assert_eq!(
            frames.lock().unwrap().last().unwrap().pixels,
            vec![(0, 255, 0); 4]
        );
    }

    #[test]
    fn progress_tick_preempts_the_ambient_effect() {
        let (mut controller, frames) = controller(10);
        controller.effects.idle = StateEffectConfig {
            effect: "Rainbow".to_string(),
            delay_ms: 50,
            iterations: 1000,
            ..StateEffectConfig::default()
        };
        controller.handle_event(PrinterEvent::Connected);
        thread::sleep(Duration::from_millis(30));
        assert!(lock(&controller.scheduler).is_animating());

        controller.handle_progress(35);
        assert!(!lock(&controller.scheduler).is_animating());

        let frames = frames.lock().unwrap();
        let last = frames.last().unwrap();
        assert_eq!(last.pixels[0], (0, 255, 0));
        assert_eq!(last.pixels[3], (180, 255, 180));
        assert_eq!(last.pixels[9], (255, 255, 255));
    }

    #[test]
    fn stale_final_tick_is_ignored_while_animating() {
        let (mut controller, _frames) = controller(10);
        controller.effects.idle = StateEffectConfig {
            effect: "Rainbow".to_string(),
            delay_ms: 50,
            iterations: 1000,
            ..StateEffectConfig::default()
        };
        controller.handle_event(PrinterEvent::Connected);
        thread::sleep(Duration::from_millis(30));

        controller.handle_progress(100);
        assert!(lock(&controller.scheduler).is_animating());
    }

    #[test]
    fn lights_off_suppresses_progress_frames() {
        let (mut controller, frames) = controller(10);
        controller.set_lights(false);
        let frames_before = frames.lock().unwrap().len();

        controller.handle_progress(42);
        assert_eq!(frames.lock().unwrap().len(), frames_before);
    }

    #[test]
    fn lights_on_replays_the_current_state_effect() {
        let (mut controller, frames) = controller(4);
        controller.handle_event(PrinterEvent::PrintDone);
        thread::sleep(Duration::from_millis(100));

        controller.set_lights(false);
        assert_eq!(
            frames.lock().unwrap().last().unwrap().pixels,
            vec![(0, 0, 0); 4]
        );

        controller.set_lights(true);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(
            frames.lock().unwrap().last().unwrap().pixels,
            vec![(0, 255, 0); 4]
        );
    }
}
