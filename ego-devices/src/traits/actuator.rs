//! Servo and range sensor traits

use ego_protocol::Range;

/// Servo outputs of the drive unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoChannel {
    /// Left wheel
    Left = 1,
    /// Right wheel, mounted mirrored
    Right = 3,
}

/// Continuous rotation servos driven by pulse width
pub trait Servos {
    /// Set the pulse width in microseconds (1500 = stop)
    fn set_pulse(&mut self, channel: ServoChannel, micros: u16);
}

/// Time-of-flight distance sensor in continuous mode
pub trait RangeSensor {
    /// Start continuous measurements
    fn start(&mut self);

    /// Stop continuous measurements
    fn stop(&mut self);

    /// Latest measurement, [`Range::UNDEF`] on timeout
    fn read(&mut self) -> Range;
}
