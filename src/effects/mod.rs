pub(crate) mod colorwipe;
pub(crate) mod knightrider;
pub(crate) mod plasma;
pub(crate) mod pulse;
pub(crate) mod rainbow;
pub(crate) mod solidcolor;
pub(crate) mod theaterchase;

use std::time::Duration;

use crate::color::Color;
use crate::strip::{StripDriver, StripError};

/// What a rendered frame asks of the worker loop.
pub enum Step {
    /// Keep going, and wait this long before the next frame.
    Continue(Duration),
    /// The effect has played out its configured cycles.
    Done,
}

/// A resumable animation. One `step` call renders at most one frame (one
/// `show`), so a cancellation request is observed within one frame
/// interval. All per-run state lives in the implementing struct; a fresh
/// instance is built for every run.
pub trait Effect: Send {
    fn step(&mut self, strip: &mut dyn StripDriver) -> Result<Step, StripError>;
}

/// Resolves a configured effect name to a fresh instance.
pub fn create(
    name: &str,
    color: Color,
    delay_ms: u64,
    iterations: u32,
    reverse: bool,
) -> Option<Box<dyn Effect>> {
    match name {
        "Solid Color" => Some(Box::new(solidcolor::SolidColor::new(color))),
        "Color Wipe" => Some(Box::new(colorwipe::ColorWipe::new(
            color, delay_ms, iterations, reverse,
        ))),
        "Theater Chase" => Some(Box::new(theaterchase::TheaterChase::new(
            color, delay_ms, iterations,
        ))),
        "Rainbow" => Some(Box::new(rainbow::Rainbow::new(delay_ms, iterations))),
        "Rainbow Cycle" => Some(Box::new(rainbow::RainbowCycle::new(delay_ms, iterations))),
        "Theater Chase Rainbow" => Some(Box::new(rainbow::TheaterChaseRainbow::new(
            delay_ms, iterations,
        ))),
        "Pulse" => Some(Box::new(pulse::Pulse::new(color, delay_ms))),
        "Knight Rider" => Some(Box::new(knightrider::KnightRider::new(color, delay_ms))),
        "Plasma" => Some(Box::new(plasma::Plasma::new(delay_ms, iterations))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;

    #[test]
    fn registry_resolves_all_known_names() {
        for name in [
            "Solid Color",
            "Color Wipe",
            "Theater Chase",
            "Rainbow",
            "Rainbow Cycle",
            "Theater Chase Rainbow",
            "Pulse",
            "Knight Rider",
            "Plasma",
        ] {
            assert!(create(name, BLACK, 10, 1, false).is_some(), "{}", name);
        }
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        assert!(create("Disco Inferno", BLACK, 10, 1, false).is_none());
    }
}
