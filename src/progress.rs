use crate::color::{blend_colors, Color};
use crate::strip::{StripDriver, StripError};

/// Per-pixel colors for one progress frame: completed pixels take the
/// progress color, the boundary pixel is blended by the fractional
/// remainder, everything beyond it keeps the base color. `reverse`
/// mirrors the traversal, nothing else.
pub fn render(
    pixel_count: usize,
    base: Color,
    target: Color,
    percent: u8,
    reverse: bool,
) -> Vec<Color> {
    let position = percent as f32 / 100.0 * pixel_count as f32;
    let whole = position as usize;
    let frac = position.fract();

    let mut frame = vec![base; pixel_count];
    for i in 0..pixel_count {
        let p = if reverse { pixel_count - 1 - i } else { i };
        if i < whole {
            frame[p] = target;
        } else if i == whole {
            frame[p] = blend_colors(base, target, frac);
        }
    }
    frame
}

/// Paints one progress frame directly, outside any worker. The caller
/// must have stopped the animation worker first; progress always
/// pre-empts ambient effects.
pub fn paint(
    strip: &mut dyn StripDriver,
    base: Color,
    target: Color,
    percent: u8,
    reverse: bool,
) -> Result<(), StripError> {
    let frame = render(strip.pixel_count(), base, target, percent, reverse);
    for (i, color) in frame.iter().enumerate() {
        strip.set_pixel_rgb(i, color.r, color.g, color.b);
    }
    strip.show()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::testing::MockStrip;

    const WHITE: Color = Color::new(255, 255, 255);
    const GREEN: Color = Color::new(0, 255, 0);

    #[test]
    fn splits_the_strip_at_the_fractional_position() {
        let frame = render(10, WHITE, GREEN, 35, false);

        // 35% of ten pixels: three full, the fourth blended halfway.
        for p in 0..3 {
            assert_eq!(frame[p], GREEN);
        }
        assert_eq!(frame[3], Color::new(180, 255, 180));
        for p in 4..10 {
            assert_eq!(frame[p], WHITE);
        }
    }

    #[test]
    fn reverse_mirrors_the_assignment() {
        let frame = render(10, WHITE, GREEN, 35, true);

        for p in 7..10 {
            assert_eq!(frame[p], GREEN);
        }
        assert_eq!(frame[6], Color::new(180, 255, 180));
        for p in 0..6 {
            assert_eq!(frame[p], WHITE);
        }
    }

    #[test]
    fn zero_percent_keeps_the_base_color() {
        assert_eq!(render(5, WHITE, GREEN, 0, false), vec![WHITE; 5]);
    }

    #[test]
    fn hundred_percent_fills_the_strip() {
        assert_eq!(render(5, WHITE, GREEN, 100, false), vec![GREEN; 5]);
    }

    #[test]
    fn paint_pushes_exactly_one_frame() {
        let (mut strip, frames) = MockStrip::new(5);
        paint(&mut strip, WHITE, GREEN, 50, false).unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].pixels,
            vec![
                (0, 255, 0),
                (0, 255, 0),
                (180, 255, 180),
                (255, 255, 255),
                (255, 255, 255)
            ]
        );
    }
}
