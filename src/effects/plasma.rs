use std::time::Duration;

use palette::FromColor;

use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// A layered sine field mapped onto the hue circle. The frame counter
/// runs up to the configured iteration count and back down, so the field
/// retreats the way it came.
pub struct Plasma {
    delay_ms: u64,
    iterations: u32,
    frame: u32,
}

impl Plasma {
    pub fn new(delay_ms: u64, iterations: u32) -> Plasma {
        Plasma {
            delay_ms,
            iterations,
            frame: 0,
        }
    }
}

impl Effect for Plasma {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        let total = self.iterations.saturating_mul(2);
        if self.frame >= total {
            return Ok(Step::Done);
        }

        let f = if self.frame < self.iterations {
            self.frame
        } else {
            total - 1 - self.frame
        };

        for i in 0..strip.pixel_count() {
            let fi = i as f32;
            let x = f as f32 + fi;
            let hue = 4.0
                + (x / 19.0).sin()
                + (fi / 9.0).sin()
                + ((x + fi) / 25.0).sin()
                + ((x * x + fi * fi).sqrt() / 8.0).sin();

            let hsv = palette::Hsv::new(hue / 8.0 * 360.0, 1.0, 1.0);
            let rgb = palette::Srgb::from_color(hsv);
            strip.set_pixel_rgb(
                i,
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            );
        }
        strip.show()?;

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms * 20)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    #[test]
    fn first_pixel_of_the_first_frame_is_cyan() {
        let (mut strip, frames) = MockStrip::new(1);
        let mut effect = Plasma::new(0, 2);

        effect.step(&mut strip).unwrap();

        // f = 0, i = 0: all sine terms vanish, hue = 4/8 of the circle.
        assert_eq!(frames.lock().unwrap()[0].pixels[0], (0, 255, 255));
    }

    #[test]
    fn runs_the_counter_up_and_back_down() {
        let (mut strip, _frames) = MockStrip::new(2);
        let mut effect = Plasma::new(0, 2);

        let mut steps = 0;
        while let Ok(Step::Continue(_)) = effect.step(&mut strip) {
            steps += 1;
        }
        assert_eq!(steps, 4);
    }
}
