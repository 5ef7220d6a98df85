use std::time::Duration;

use crate::color::Color;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// Breathes the whole strip by ramping output brightness from dark to
/// full and back down. The brightness left behind is restored when the
/// next worker claims the strip.
pub struct Pulse {
    color: Color,
    delay_ms: u64,
    frame: u32,
}

const RAMP: u32 = 255;

impl Pulse {
    pub fn new(color: Color, delay_ms: u64) -> Pulse {
        Pulse {
            color,
            delay_ms,
            frame: 0,
        }
    }
}

impl Effect for Pulse {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.frame >= 2 * RAMP {
            return Ok(Step::Done);
        }

        if self.frame == 0 {
            for p in 0..strip.pixel_count() {
                strip.set_pixel_rgb(p, self.color.r, self.color.g, self.color.b);
            }
        }

        let level = if self.frame < RAMP {
            self.frame
        } else {
            2 * RAMP - 1 - self.frame
        };
        strip.set_brightness(level as u8);
        strip.show()?;

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    #[test]
    fn ramps_brightness_up_and_back_down() {
        let (mut strip, frames) = MockStrip::new(2);
        let mut effect = Pulse::new(Color::new(0, 0, 255), 0);

        let mut steps = 0;
        while let Ok(Step::Continue(_)) = effect.step(&mut strip) {
            steps += 1;
        }
        assert_eq!(steps, 510);

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 510);
        assert_eq!(frames[0].brightness, 0);
        assert_eq!(frames[254].brightness, 254);
        assert_eq!(frames[255].brightness, 254);
        assert_eq!(frames[509].brightness, 0);
        assert_eq!(frames[0].pixels, vec![(0, 0, 255); 2]);
    }
}
