use crate::color::Color;
use crate::effects::{Effect, Step};
use crate::strip::{StripDriver, StripError};

/// Paints every pixel in one color and leaves the frame standing.
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> SolidColor {
        SolidColor { color }
    }
}

impl Effect for SolidColor {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError> {
        for p in 0..strip.pixel_count() {
            strip.set_pixel_rgb(p, self.color.r, self.color.g, self.color.b);
        }
        strip.show()?;
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    #[test]
    fn paints_one_frame_and_completes() {
        let (mut strip, frames) = MockStrip::new(4);
        let mut effect = SolidColor::new(Color::new(10, 20, 30));

        assert!(matches!(effect.step(&mut strip), Ok(Step::Done)));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixels, vec![(10, 20, 30); 4]);
    }
}
