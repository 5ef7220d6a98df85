/// One pixel's worth of color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

/// Decodes a "#rrggbb" string. A missing or malformed value maps to black
/// so that an unset color in the configuration simply keeps pixels dark.
pub fn hex_to_rgb(hex: Option<&str>) -> Color {
    let Some(hex) = hex else {
        return BLACK;
    };

    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };

    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::new(r, g, b),
        _ => BLACK,
    }
}

/// Interpolates between two channel values at position t in [0, 1].
///
/// This is quadratic, not linear: blending happens on the squared values,
/// which reads much smoother on LEDs than naive RGB interpolation.
pub fn blend(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    ((1.0 - t) * a * a + t * b * b).sqrt().round() as u8
}

pub fn blend_colors(a: Color, b: Color, t: f32) -> Color {
    Color::new(blend(a.r, b.r, t), blend(a.g, b.g, t), blend(a.b, b.b, t))
}

/// Maps a position on a 256-step hue wheel to a color. The wheel walks
/// green -> red -> blue -> green with integer arithmetic only.
pub fn wheel(pos: u8) -> Color {
    if pos < 85 {
        Color::new(pos * 3, 255 - pos * 3, 0)
    } else if pos < 170 {
        let pos = pos - 85;
        Color::new(255 - pos * 3, 0, pos * 3)
    } else {
        let pos = pos - 170;
        Color::new(0, pos * 3, 255 - pos * 3)
    }
}
