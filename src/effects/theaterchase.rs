use std::time::Duration;

use crate::color::Color;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// Marquee-style chaser: every third pixel lit, with the lit offset
/// rotating one position per frame.
pub struct TheaterChase {
    color: Color,
    delay_ms: u64,
    iterations: u32,
    frame: u32,
}

impl TheaterChase {
    pub fn new(color: Color, delay_ms: u64, iterations: u32) -> TheaterChase {
        TheaterChase {
            color,
            delay_ms,
            iterations,
            frame: 0,
        }
    }
}

impl Effect for TheaterChase {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        if self.frame >= self.iterations.saturating_mul(3) {
            return Ok(Step::Done);
        }

        let n = strip.pixel_count();
        let offset = (self.frame % 3) as usize;
        for p in (0..n).step_by(3) {
            if p + offset < n {
                strip.set_pixel_rgb(p + offset, self.color.r, self.color.g, self.color.b);
            }
        }
        strip.show()?;

        // Clear in the buffer only; the cleared frame is never shown on its own.
        for p in (0..n).step_by(3) {
            if p + offset < n {
                strip.set_pixel_rgb(p + offset, 0, 0, 0);
            }
        }

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    #[test]
    fn lights_every_third_pixel_with_rotating_offset() {
        let (mut strip, frames) = MockStrip::new(7);
        let mut effect = TheaterChase::new(Color::new(9, 9, 9), 0, 1);

        for _ in 0..3 {
            assert!(matches!(effect.step(&mut strip), Ok(Step::Continue(_))));
        }
        assert!(matches!(effect.step(&mut strip), Ok(Step::Done)));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 3);
        let lit = |frame: &Vec<(u8, u8, u8)>| -> Vec<usize> {
            frame
                .iter()
                .enumerate()
                .filter(|(_, &p)| p != (0, 0, 0))
                .map(|(i, _)| i)
                .collect()
        };
        assert_eq!(lit(&frames[0].pixels), vec![0, 3, 6]);
        assert_eq!(lit(&frames[1].pixels), vec![1, 4]);
        assert_eq!(lit(&frames[2].pixels), vec![2, 5]);
    }
}
