//! Device hosting
//!
//! Wraps the three controllers behind one object-safe trait, so the runner,
//! the recorder and the replayer do not care which device they drive.

use ego_core::{Activity, Scheduler};
use ego_devices::common::Inbox;
use ego_devices::motion::{self, MotionButtons, MotionEnv, MotionInputs, MotionOutputs};
use ego_devices::ranger::{self, RangerEnv, RangerInputs, RangerOutputs};
use ego_devices::remote::{self, RemoteEnv, RemoteInputs, RemoteOutputs};
use ego_protocol::{Datagram, Joystick, Range};
use serde::{Deserialize, Serialize};

use crate::config::{DeviceKind, HostConfig};
use crate::sim::SimHardware;

/// Everything sampled before one tick, for any device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub main: bool,
    pub red: bool,
    pub blue: bool,
    pub button_a: bool,
    pub button_b: bool,
    pub range: Option<u16>,
    pub joystick: Option<Joystick>,
    pub link_up: bool,
    pub frames: Inbox,
}

impl Sample {
    fn range(&self) -> Range {
        self.range.map_or(Range::UNDEF, Range)
    }
}

/// Outputs of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outputs {
    Motion(MotionOutputs),
    Ranger(RangerOutputs),
    Remote(RemoteOutputs),
}

impl Outputs {
    /// Datagrams to broadcast
    pub fn publishes(&self) -> &[Datagram] {
        match self {
            Outputs::Motion(out) => &out.publishes,
            Outputs::Ranger(out) => &out.publishes,
            Outputs::Remote(out) => &out.publishes,
        }
    }

    /// Apply the hardware writes to the simulated parts
    pub fn apply(&self, hw: &mut SimHardware) {
        match self {
            Outputs::Motion(out) => out.apply(&mut hw.led, &mut hw.strip, &mut hw.servos),
            Outputs::Ranger(out) => out.apply(&mut hw.led, &mut hw.sensor),
            Outputs::Remote(out) => out.apply(&mut hw.screen),
        }
    }

    /// Check if the tick changed nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Outputs::Motion(out) => *out == MotionOutputs::default(),
            Outputs::Ranger(out) => *out == RangerOutputs::default(),
            Outputs::Remote(out) => *out == RemoteOutputs::default(),
        }
    }
}

/// A controller the host can tick
pub trait Device {
    /// Run one tick on `sample`
    fn step(&mut self, sample: Sample) -> Outputs;

    /// Ticks run so far
    fn ticks(&self) -> u64;

    /// Check if the controller has nothing left to do
    fn is_finished(&self) -> bool;
}

impl<A: Activity<MotionEnv>> Device for Scheduler<MotionEnv, A> {
    fn step(&mut self, sample: Sample) -> Outputs {
        Outputs::Motion(self.react(MotionInputs {
            buttons: MotionButtons {
                main: sample.main,
                red: sample.red,
                blue: sample.blue,
            },
            link_up: sample.link_up,
            frames: sample.frames,
        }))
    }

    fn ticks(&self) -> u64 {
        Scheduler::ticks(self)
    }

    fn is_finished(&self) -> bool {
        Scheduler::is_finished(self)
    }
}

impl<A: Activity<RangerEnv>> Device for Scheduler<RangerEnv, A> {
    fn step(&mut self, sample: Sample) -> Outputs {
        let range = sample.range();
        Outputs::Ranger(self.react(RangerInputs {
            button: sample.main,
            range,
            link_up: sample.link_up,
            frames: sample.frames,
        }))
    }

    fn ticks(&self) -> u64 {
        Scheduler::ticks(self)
    }

    fn is_finished(&self) -> bool {
        Scheduler::is_finished(self)
    }
}

impl<A: Activity<RemoteEnv>> Device for Scheduler<RemoteEnv, A> {
    fn step(&mut self, sample: Sample) -> Outputs {
        Outputs::Remote(self.react(RemoteInputs {
            button_a: sample.button_a,
            button_b: sample.button_b,
            joystick: sample.joystick,
            link_up: sample.link_up,
            frames: sample.frames,
        }))
    }

    fn ticks(&self) -> u64 {
        Scheduler::ticks(self)
    }

    fn is_finished(&self) -> bool {
        Scheduler::is_finished(self)
    }
}

/// Build the configured device
pub fn build(config: &HostConfig) -> Box<dyn Device> {
    match config.device {
        DeviceKind::Motion => Box::new(motion::build(config.motion)),
        DeviceKind::Ranger => Box::new(ranger::build(config.ranger, config.setup_ok)),
        DeviceKind::Remote => Box::new(remote::build(config.remote, config.setup_ok)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ego_protocol::{Intent, Payload};

    #[test]
    fn test_motion_boots_on_link() {
        let mut device = build(&HostConfig::default());
        let out = device.step(Sample {
            link_up: true,
            ..Sample::default()
        });
        assert_eq!(out.publishes(), [Intent::Stop.to_datagram()]);
        assert_eq!(device.ticks(), 1);
        assert!(!device.is_finished());
    }

    #[test]
    fn test_ranger_reads_sample_range() {
        let config = HostConfig {
            device: DeviceKind::Ranger,
            ..HostConfig::default()
        };
        let mut device = build(&config);
        let out = device.step(Sample {
            link_up: true,
            range: Some(1500),
            ..Sample::default()
        });
        assert_eq!(out.publishes(), [Range(1500).to_datagram()]);

        let mut hw = SimHardware::new(None, 10);
        out.apply(&mut hw);
        assert!(hw.sensor.running);
        assert_eq!(hw.led.color, ego_devices::traits::Rgb::GREEN);
    }
}
