//! Hardware capability traits
//!
//! Devices never touch hardware. Their outputs describe what changed in a
//! tick, and the host applies them through these traits.

pub mod actuator;
pub mod display;
pub mod light;

pub use actuator::{RangeSensor, ServoChannel, Servos};
pub use display::{Page, Screen, ScreenView};
pub use light::{LedStrip, Rgb, StatusLed};
