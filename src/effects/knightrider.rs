use std::time::Duration;

use crate::color::Color;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// A three-pixel wide scanner sweeping to the far end of the strip and
/// back once.
pub struct KnightRider {
    color: Color,
    delay_ms: u64,
    frame: usize,
}

impl KnightRider {
    pub fn new(color: Color, delay_ms: u64) -> KnightRider {
        KnightRider {
            color,
            delay_ms,
            frame: 0,
        }
    }
}

impl Effect for KnightRider {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        let n = strip.pixel_count();
        if n == 0 || self.frame >= 2 * n {
            return Ok(Step::Done);
        }

        let active = if self.frame < n {
            self.frame
        } else {
            2 * n - 1 - self.frame
        };
        for i in 0..n {
            if i == active || i + 1 == active || i == active + 1 {
                strip.set_pixel_rgb(i, self.color.r, self.color.g, self.color.b);
            } else {
                strip.set_pixel_rgb(i, 0, 0, 0);
            }
        }
        strip.show()?;

        self.frame += 1;
        Ok(Step::Continue(Duration::from_millis(self.delay_ms * 10)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    fn lit(pixels: &[(u8, u8, u8)]) -> Vec<usize> {
        pixels
            .iter()
            .enumerate()
            .filter(|(_, &p)| p != (0, 0, 0))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn sweeps_out_and_back() {
        let (mut strip, frames) = MockStrip::new(4);
        let mut effect = KnightRider::new(Color::new(255, 0, 0), 0);

        let mut steps = 0;
        while let Ok(Step::Continue(_)) = effect.step(&mut strip) {
            steps += 1;
        }
        assert_eq!(steps, 8);

        let frames = frames.lock().unwrap();
        assert_eq!(lit(&frames[0].pixels), vec![0, 1]);
        assert_eq!(lit(&frames[1].pixels), vec![0, 1, 2]);
        assert_eq!(lit(&frames[3].pixels), vec![2, 3]);
        // Turnaround: the sweep comes back from the far end.
        assert_eq!(lit(&frames[4].pixels), vec![2, 3]);
        assert_eq!(lit(&frames[7].pixels), vec![0, 1]);
    }
}
