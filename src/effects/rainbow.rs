use std::time::Duration;

use crate::color::wheel;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// All pixels walk the hue wheel in step, one wheel position per frame.
/// `iterations` is the number of full 256-step cycles before completion.
pub struct Rainbow {
    delay_ms: u64,
    cycles: u32,
    frame: u32,
}

impl Rainbow {
    pub fn new(delay_ms: u64, iterations: u32) -> Rainbow {
        Rainbow {
            delay_ms,
            cycles: iterations,
            frame: 0,
        }
    }
}

impl Effect for Rainbow {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.frame >= self.cycles.saturating_mul(256) {
            return Ok(Step::Done);
        }

        let f = self.frame as usize;
        for p in 0..strip.pixel_count() {
            let c = wheel(((p + f) & 255) as u8);
            strip.set_pixel_rgb(p, c.r, c.g, c.b);
        }
        strip.show()?;

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms)))
    }
}

/// One full hue wheel stretched across the strip, rotating per frame.
pub struct RainbowCycle {
    delay_ms: u64,
    cycles: u32,
    frame: u32,
}

impl RainbowCycle {
    pub fn new(delay_ms: u64, iterations: u32) -> RainbowCycle {
        RainbowCycle {
            delay_ms,
            cycles: iterations,
            frame: 0,
        }
    }
}

impl Effect for RainbowCycle {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.frame >= self.cycles.saturating_mul(256) {
            return Ok(Step::Done);
        }

        let n = strip.pixel_count();
        if n == 0 {
            return Ok(Step::Done);
        }

        let f = self.frame as usize;
        for p in 0..n {
            let c = wheel(((p * 256 / n + f) & 255) as u8);
            strip.set_pixel_rgb(p, c.r, c.g, c.b);
        }
        strip.show()?;

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms)))
    }
}

/// The marquee chaser with the hue wheel cycling underneath it. The wheel
/// position advances once per full three-frame chase round.
pub struct TheaterChaseRainbow {
    delay_ms: u64,
    cycles: u32,
    frame: u32,
}

impl TheaterChaseRainbow {
    pub fn new(delay_ms: u64, iterations: u32) -> TheaterChaseRainbow {
        TheaterChaseRainbow {
            delay_ms,
            cycles: iterations,
            frame: 0,
        }
    }
}

impl Effect for TheaterChaseRainbow {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.frame >= self.cycles.saturating_mul(256 * 3) {
            return Ok(Step::Done);
        }

        let n = strip.pixel_count();
        let f = (self.frame / 3) as usize;
        let offset = (self.frame % 3) as usize;
        for p in (0..n).step_by(3) {
            if p + offset < n {
                let c = wheel(((p + f) % 255) as u8);
                strip.set_pixel_rgb(p + offset, c.r, c.g, c.b);
            }
        }
        strip.show()?;

        for p in (0..n).step_by(3) {
            if p + offset < n {
                strip.set_pixel_rgb(p + offset, 0, 0, 0);
            }
        }

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms)))
    }
}
