use std::net::{SocketAddr, UdpSocket};
use std::str::FromStr;

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::config::ColorOrder;
use crate::strip::{StripDriver, StripError};

const DMX_CHANNELS: usize = 512;

/// Drives the strip through an OLA daemon's OSC input, one DMX universe
/// per frame. The buffer persists between `show` calls so effects can
/// build frames incrementally.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    universe: usize,
    buffer: Vec<u8>,
    pixel_count: usize,
    color_order: ColorOrder,
    brightness: u8,
}

impl OlaOutput {
    pub fn new(
        target_addr: SocketAddr,
        universe: usize,
        pixel_count: usize,
        color_order: ColorOrder,
    ) -> Result<Self, String> {
        if pixel_count * 3 > DMX_CHANNELS {
            return Err(format!("{} pixels do not fit one DMX universe", pixel_count));
        }

        let our_addr = SocketAddr::from_str("0.0.0.0:0").unwrap();
        let sock = match UdpSocket::bind(our_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OlaOutput {
            sock,
            target_addr,
            universe,
            buffer: vec![0; DMX_CHANNELS],
            pixel_count,
            color_order,
            brightness: 255,
        })
    }
}

impl StripDriver for OlaOutput {
    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn set_pixel_rgb(&mut self, index: usize, r: u8, g: u8, b: u8) {
        if index >= self.pixel_count {
            return;
        }

        let channels = self.color_order.reorder(r, g, b);
        let base = index * 3;
        self.buffer[base..base + 3].copy_from_slice(&channels);
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn show(&mut self) -> Result<(), StripError> {
        let scale = self.brightness as u16;
        let scaled: Vec<u8> = self
            .buffer
            .iter()
            .map(|&v| ((v as u16 * scale) / 255) as u8)
            .collect();

        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: format!("/dmx/universe/{}", self.universe),
            args: vec![OscType::Blob(scaled)],
        }))
        .unwrap();
        self.sock.send_to(&msg_buf, self.target_addr)?;
        Ok(())
    }

    fn blackout(&mut self) -> Result<(), StripError> {
        self.buffer.fill(0);
        self.show()
    }
}
