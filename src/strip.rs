use std::fmt;
use std::io;

/// Capability surface of an addressable pixel strip.
///
/// Implementations own the frame buffer; pixel writes only touch the
/// buffer, nothing reaches the hardware before `show`.
pub trait StripDriver: Send {
    fn pixel_count(&self) -> usize;

    fn set_pixel_rgb(&mut self, index: usize, r: u8, g: u8, b: u8);

    /// Output scaling applied to the whole frame at `show` time, 0-255.
    fn set_brightness(&mut self, level: u8);

    /// Pushes the current frame buffer to the hardware.
    fn show(&mut self) -> Result<(), StripError>;

    /// Zeroes the frame buffer and pushes it out.
    fn blackout(&mut self) -> Result<(), StripError>;
}

/// A failed hardware write. Ends the current effect run, never the process.
#[derive(Debug)]
pub struct StripError {
    source: io::Error,
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "strip write failed: {}", self.source)
    }
}

impl From<io::Error> for StripError {
    fn from(source: io::Error) -> StripError {
        StripError { source }
    }
}
