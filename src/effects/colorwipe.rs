use std::time::Duration;

use crate::color::Color;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// Fills the strip one pixel per frame, then blanks it and starts over
/// until the configured number of passes is done.
pub struct ColorWipe {
    color: Color,
    delay_ms: u64,
    iterations: u32,
    reverse: bool,
    iteration: u32,
    cursor: usize,
}

impl ColorWipe {
    pub fn new(color: Color, delay_ms: u64, iterations: u32, reverse: bool) -> ColorWipe {
        ColorWipe {
            color,
            delay_ms,
            iterations,
            reverse,
            iteration: 0,
            cursor: 0,
        }
    }

    fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms * 10)
    }
}

impl Effect for ColorWipe {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.iteration >= self.iterations {
            return Ok(Step::Done);
        }

        let n = strip.pixel_count();
        if self.cursor < n {
            let p = if self.reverse { n - 1 - self.cursor } else { self.cursor };
            strip.set_pixel_rgb(p, self.color.r, self.color.g, self.color.b);
            strip.show()?;
            self.cursor += 1;
            return Ok(Step::Continue(self.frame_delay()));
        }

        // Wipe finished, blank the strip for the next pass.
        for p in 0..n {
            strip.set_pixel_rgb(p, 0, 0, 0);
        }
        strip.show()?;
        self.cursor = 0;
        self.iteration += 1;
        Ok(Step::Continue(self.frame_delay()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    fn run_to_completion(effect: &mut ColorWipe, strip: &mut MockStrip) -> usize {
        let mut steps = 0;
        loop {
            match effect.step(strip).unwrap() {
                Step::Continue(_) => steps += 1,
                Step::Done => return steps,
            }
        }
    }

    #[test]
    fn wipes_forward_then_blanks() {
        let (mut strip, frames) = MockStrip::new(3);
        let mut effect = ColorWipe::new(Color::new(255, 0, 0), 1, 1, false);

        let steps = run_to_completion(&mut effect, &mut strip);
        assert_eq!(steps, 4);

        let frames = frames.lock().unwrap();
        let red = (255, 0, 0);
        let off = (0, 0, 0);
        assert_eq!(frames[0].pixels, vec![red, off, off]);
        assert_eq!(frames[1].pixels, vec![red, red, off]);
        assert_eq!(frames[2].pixels, vec![red, red, red]);
        assert_eq!(frames[3].pixels, vec![off, off, off]);
    }

    #[test]
    fn reverse_starts_at_the_far_end() {
        let (mut strip, frames) = MockStrip::new(3);
        let mut effect = ColorWipe::new(Color::new(0, 0, 255), 1, 1, true);

        effect.step(&mut strip).unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames[0].pixels, vec![(0, 0, 0), (0, 0, 0), (0, 0, 255)]);
    }

    #[test]
    fn runs_the_configured_number_of_passes() {
        let (mut strip, frames) = MockStrip::new(2);
        let mut effect = ColorWipe::new(Color::new(1, 2, 3), 0, 3, false);

        run_to_completion(&mut effect, &mut strip);
        // Three passes of two pixels plus a blank frame each.
        assert_eq!(frames.lock().unwrap().len(), 9);
    }
}
