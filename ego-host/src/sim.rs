//! Simulated hardware
//!
//! Stand-ins for the LEDs, servos, range sensor and screen of the real
//! devices. They keep their last state and log every change.

use ego_devices::traits::{
    LedStrip, RangeSensor, Rgb, Screen, ScreenView, ServoChannel, Servos, StatusLed,
};
use ego_protocol::Range;
use tracing::info;

fn label(color: Rgb) -> String {
    match color.name() {
        Some(name) => name.to_string(),
        None => format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b),
    }
}

#[derive(Debug, Default)]
pub struct SimLed {
    pub color: Rgb,
}

impl StatusLed for SimLed {
    fn set_color(&mut self, color: Rgb) {
        if color != self.color {
            info!(target: "sim::led", color = %label(color), "status LED");
        }
        self.color = color;
    }
}

#[derive(Debug, Default)]
pub struct SimStrip {
    pub frame: Vec<Rgb>,
}

impl LedStrip for SimStrip {
    fn show(&mut self, frame: &[Rgb]) {
        let labels: Vec<_> = frame.iter().map(|&c| label(c)).collect();
        info!(target: "sim::strip", "traffic [{}]", labels.join(", "));
        self.frame = frame.to_vec();
    }
}

#[derive(Debug)]
pub struct SimServos {
    pub left: u16,
    pub right: u16,
}

impl Default for SimServos {
    fn default() -> Self {
        Self {
            left: 1500,
            right: 1500,
        }
    }
}

impl Servos for SimServos {
    fn set_pulse(&mut self, channel: ServoChannel, micros: u16) {
        match channel {
            ServoChannel::Left => self.left = micros,
            ServoChannel::Right => self.right = micros,
        }
        info!(target: "sim::servo", ?channel, micros, "servo pulse");
    }
}

/// Sensor reporting a settable range while running
#[derive(Debug)]
pub struct SimRangeSensor {
    pub running: bool,
    pub range: Range,
}

impl SimRangeSensor {
    pub fn new(range_mm: Option<u16>) -> Self {
        Self {
            running: false,
            range: range_mm.map_or(Range::UNDEF, Range),
        }
    }
}

impl RangeSensor for SimRangeSensor {
    fn start(&mut self) {
        info!(target: "sim::ranger", "continuous ranging started");
        self.running = true;
    }

    fn stop(&mut self) {
        info!(target: "sim::ranger", "continuous ranging stopped");
        self.running = false;
    }

    fn read(&mut self) -> Range {
        if self.running {
            self.range
        } else {
            Range::UNDEF
        }
    }
}

#[derive(Debug)]
pub struct SimScreen {
    pub view: ScreenView,
    pub brightness: u8,
}

impl SimScreen {
    pub fn new(brightness: u8) -> Self {
        Self {
            view: ScreenView::default(),
            brightness,
        }
    }
}

impl Screen for SimScreen {
    fn draw(&mut self, view: &ScreenView) {
        info!(
            target: "sim::screen",
            page = ?view.page,
            text = %view.page.lines().join(" / "),
            border = ?view.border.map(label),
            spinner = ?view.spinner.map(label),
            "draw"
        );
        self.view = *view;
    }

    fn set_brightness(&mut self, level: u8) {
        info!(target: "sim::screen", level, "brightness");
        self.brightness = level;
    }
}

/// All simulated parts of one device
#[derive(Debug)]
pub struct SimHardware {
    pub led: SimLed,
    pub strip: SimStrip,
    pub servos: SimServos,
    pub sensor: SimRangeSensor,
    pub screen: SimScreen,
}

impl SimHardware {
    pub fn new(range_mm: Option<u16>, brightness: u8) -> Self {
        Self {
            led: SimLed::default(),
            strip: SimStrip::default(),
            servos: SimServos::default(),
            sensor: SimRangeSensor::new(range_mm),
            screen: SimScreen::new(brightness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_reads_only_while_running() {
        let mut sensor = SimRangeSensor::new(Some(250));
        assert_eq!(sensor.read(), Range::UNDEF);
        sensor.start();
        assert_eq!(sensor.read(), Range(250));
        sensor.stop();
        assert_eq!(sensor.read(), Range::UNDEF);
    }

    #[test]
    fn test_label_falls_back_to_hex() {
        assert_eq!(label(Rgb::ORANGE), "orange");
        assert_eq!(label(Rgb::new(1, 2, 255)), "#0102ff");
    }
}
