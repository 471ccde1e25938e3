//! Status LED and LED strip traits

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Check if the LED is dark
    pub const fn is_off(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Well-known colour name, for logs
    pub fn name(self) -> Option<&'static str> {
        match self {
            Rgb::BLACK => Some("black"),
            Rgb::WHITE => Some("white"),
            Rgb::RED => Some("red"),
            Rgb::GREEN => Some("green"),
            Rgb::BLUE => Some("blue"),
            Rgb::YELLOW => Some("yellow"),
            Rgb::ORANGE => Some("orange"),
            _ => None,
        }
    }
}

/// Single RGB status LED
pub trait StatusLed {
    /// Show `color`
    fn set_color(&mut self, color: Rgb);
}

/// Addressable LED strip, updated a whole frame at a time
pub trait LedStrip {
    /// Show one colour per LED
    fn show(&mut self, frame: &[Rgb]);
}
