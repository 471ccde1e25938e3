//! Device task
//!
//! Samples the simulated hardware and the bus, runs one tick and applies
//! the outputs. Console commands change the simulated inputs in between.

use std::fs::File;
use std::io::BufWriter;
use std::ops::ControlFlow;
use std::process;

use anyhow::Context;
use embassy_futures::select::{select, Either};
use ego_devices::traits::RangeSensor;
use ego_protocol::{Joystick, Range};
use tracing::{debug, error, info};

use crate::channels::{COMMANDS, TICK_SIGNAL};
use crate::config::{DeviceKind, HostConfig};
use crate::device::{self, Device, Sample};
use crate::keyboard::{Button, ButtonScript, Command};
use crate::replay::Recorder;
use crate::sim::SimHardware;
use crate::transport::UdpBus;

/// Owns everything one hosted device needs
pub struct DeviceRunner {
    config: HostConfig,
    device: Box<dyn Device>,
    hw: SimHardware,
    bus: UdpBus,
    recorder: Option<Recorder<BufWriter<File>>>,
    script: ButtonScript,
    joystick: Joystick,
    link_up: bool,
    finished: bool,
}

impl DeviceRunner {
    pub fn new(
        config: HostConfig,
        bus: UdpBus,
        recorder: Option<Recorder<BufWriter<File>>>,
    ) -> Self {
        let hw = SimHardware::new(config.sim.range_mm, config.remote.dimmer.max_brightness);
        Self {
            device: device::build(&config),
            config,
            hw,
            bus,
            recorder,
            script: ButtonScript::default(),
            joystick: Joystick::default(),
            link_up: true,
            finished: false,
        }
    }

    /// Apply a console command, breaks on quit
    pub fn handle(&mut self, command: Command) -> ControlFlow<()> {
        debug!(?command, "command");
        match command {
            Command::Button(button, gesture) => {
                let long_ticks = match self.config.device {
                    DeviceKind::Motion => self.config.motion.press.long_ticks,
                    DeviceKind::Ranger => self.config.ranger.press.long_ticks,
                    DeviceKind::Remote => self.config.remote.press.long_ticks,
                };
                self.script
                    .push(button, gesture, self.config.sim.press_ticks, long_ticks);
            }
            Command::Range(mm) => {
                self.hw.sensor.range = mm.map_or(Range::UNDEF, Range);
            }
            Command::Joystick { x, y } => {
                self.joystick.x = x;
                self.joystick.y = y;
            }
            Command::Click => self.joystick.button = true,
            Command::Link(up) => {
                info!(up, "link state");
                self.link_up = up;
            }
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Run one tick
    pub fn tick(&mut self) -> anyhow::Result<()> {
        let levels = self.script.next_levels();
        let sample = Sample {
            main: levels.get(Button::Main),
            red: levels.get(Button::Red),
            blue: levels.get(Button::Blue),
            button_a: levels.get(Button::A),
            button_b: levels.get(Button::B),
            range: self.hw.sensor.read().millimetres(),
            joystick: Some(self.joystick),
            link_up: self.link_up,
            frames: self.bus.receive()?,
        };
        self.joystick.button = false;

        if let Some(recorder) = &mut self.recorder {
            recorder.record(&sample).context("recording sample")?;
        }

        let out = self.device.step(sample);
        out.apply(&mut self.hw);
        self.bus.send(out.publishes());

        if self.device.is_finished() && !self.finished {
            info!(ticks = self.device.ticks(), "device finished");
            self.finished = true;
        }
        Ok(())
    }
}

#[embassy_executor::task]
pub async fn device_task(mut runner: DeviceRunner) {
    info!(device = ?runner.config.device, "device task started");

    loop {
        match select(TICK_SIGNAL.wait(), COMMANDS.receive()).await {
            Either::First(_tick) => {
                if let Err(err) = runner.tick() {
                    error!("tick failed: {err:#}");
                    process::exit(1);
                }
            }
            Either::Second(command) => {
                if runner.handle(command).is_break() {
                    info!("quit");
                    process::exit(0);
                }
            }
        }
    }
}
