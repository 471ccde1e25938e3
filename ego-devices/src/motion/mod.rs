//! Drive unit
//!
//! Recognizes the operating intent from its own buttons and the remote,
//! publishes it, and drives two continuous rotation servos either from the
//! remote joystick (manual) or around obstacles reported by the ranger
//! (auto). Six traffic LEDs show the driving direction.

mod drive;
mod intent;
mod lights;

use ego_core::combinators::{action, await_until, par, seq, strong, sustain, weak, while_loop};
use ego_core::{Activity, Environment, Scheduler};
use ego_protocol::{Intent, Press, Range};
use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{blink, connect, receiver, Bus, HasBus, Inbox, Publishes, StatusLight};
use crate::config::{BlinkPattern, MotionConfig};
use crate::traits::{LedStrip, Rgb, ServoChannel, Servos, StatusLed};

pub use drive::{is_clear, is_collision, pulses_for};
pub use intent::resolve_intent;
pub use lights::{LatDir, LightState, LongDir, TrafficLed, TRAFFIC_LEDS};

/// Servo pulse width that stops a wheel
pub const STOP_PULSE: u16 = 1500;

/// Button levels sampled before a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionButtons {
    /// Button on top of the controller
    pub main: bool,
    pub red: bool,
    pub blue: bool,
}

/// Everything the drive unit samples per tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionInputs {
    pub buttons: MotionButtons,
    /// Network link state
    pub link_up: bool,
    /// Frames received since the previous tick
    pub frames: Inbox,
}

/// Pulse widths for both wheels in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoPulses {
    pub left: u16,
    pub right: u16,
}

impl ServoPulses {
    /// Both wheels stopped
    pub const STOP: ServoPulses = ServoPulses {
        left: STOP_PULSE,
        right: STOP_PULSE,
    };
}

impl Default for ServoPulses {
    fn default() -> Self {
        Self::STOP
    }
}

/// Hardware writes produced by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionOutputs {
    /// New status LED colour
    pub status_led: Option<Rgb>,
    /// New traffic LED frame
    pub traffic: Option<[Rgb; TRAFFIC_LEDS]>,
    /// New servo pulses
    pub servos: Option<ServoPulses>,
    /// Datagrams to broadcast
    pub publishes: Publishes,
}

impl MotionOutputs {
    /// Apply the hardware writes
    pub fn apply<L: StatusLed, S: LedStrip, V: Servos>(
        &self,
        led: &mut L,
        strip: &mut S,
        servos: &mut V,
    ) {
        if let Some(color) = self.status_led {
            led.set_color(color);
        }
        if let Some(frame) = &self.traffic {
            strip.show(frame);
        }
        if let Some(pulses) = self.servos {
            servos.set_pulse(ServoChannel::Left, pulses.left);
            servos.set_pulse(ServoChannel::Right, pulses.right);
        }
    }
}

/// Gestures recognized in the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presses {
    pub main: Press,
    pub red: Press,
    pub blue: Press,
    /// Press received from the remote in this tick
    pub remote: Press,
}

/// Joystick or drive speed, each axis -128..=127
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Speed {
    pub x: i8,
    pub y: i8,
}

/// Drive unit environment
#[derive(Debug, Clone)]
pub struct MotionEnv {
    pub config: MotionConfig,
    pub buttons: MotionButtons,
    pub presses: Presses,
    /// PRESS datagrams seen so far, to spot fresh remote presses
    pub remote_updates: u32,
    pub intent: Intent,
    /// Speed requested by the remote joystick
    pub joystick: Speed,
    pub range: Range,
    /// Speed the actuator drives with
    pub speed: Speed,
    pub pulses: ServoPulses,
    pub rotate_clockwise: bool,
    pub lights: LightState,
    pub(crate) bus: Bus,
    traffic: [Rgb; TRAFFIC_LEDS],
    traffic_dirty: bool,
    out: MotionOutputs,
}

impl MotionEnv {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            buttons: MotionButtons::default(),
            presses: Presses::default(),
            remote_updates: 0,
            intent: Intent::Stop,
            joystick: Speed::default(),
            range: Range::UNDEF,
            speed: Speed::default(),
            pulses: ServoPulses::STOP,
            rotate_clockwise: false,
            lights: LightState::default(),
            bus: Bus::default(),
            traffic: [Rgb::BLACK; TRAFFIC_LEDS],
            traffic_dirty: false,
            out: MotionOutputs::default(),
        }
    }

    /// Current traffic LED colours
    pub fn traffic(&self) -> &[Rgb; TRAFFIC_LEDS] {
        &self.traffic
    }

    pub(crate) fn set_traffic(&mut self, leds: &[TrafficLed], color: Rgb) {
        for led in leds {
            self.traffic[led.index()] = color;
        }
        self.traffic_dirty = true;
    }

    pub(crate) fn write_servos(&mut self, pulses: ServoPulses) {
        self.out.servos = Some(pulses);
    }

    fn stop_actuator(&mut self) {
        self.write_servos(ServoPulses::STOP);
    }
}

impl HasBus for MotionEnv {
    fn bus(&self) -> &Bus {
        &self.bus
    }

    fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl StatusLight for MotionEnv {
    fn set_status_led(&mut self, color: Rgb) {
        self.out.status_led = Some(color);
    }
}

impl Environment for MotionEnv {
    type Inputs = MotionInputs;
    type Outputs = MotionOutputs;

    fn latch(&mut self, inputs: MotionInputs) {
        self.buttons = inputs.buttons;
        self.bus.latch(inputs.link_up, inputs.frames);
    }

    fn take_outputs(&mut self) -> MotionOutputs {
        let mut out = core::mem::take(&mut self.out);
        if self.traffic_dirty {
            out.traffic = Some(self.traffic);
            self.traffic_dirty = false;
        }
        out.publishes = self.bus.take_publishes();
        out
    }
}

fn wants_to_run_or_quit(env: &MotionEnv) -> bool {
    matches!(
        env.intent,
        Intent::StartAuto | Intent::StartManu | Intent::Quit
    )
}

fn logger() -> impl Activity<MotionEnv> {
    sustain(|env: &mut MotionEnv| {
        debug!(
            "speed x: {}, y: {}, range: {}",
            env.speed.x, env.speed.y, env.range.0
        );
    })
}

/// Runs one drive session per start intent until QUIT
fn controller(config: &MotionConfig) -> impl Activity<MotionEnv> {
    seq((
        action(|env: &mut MotionEnv| env.set_status_led(Rgb::RED)),
        await_until(wants_to_run_or_quit),
        while_loop(
            |env: &MotionEnv| env.intent != Intent::Quit,
            seq((
                action(|env: &mut MotionEnv| info!("run {:?}", env.intent)),
                par((
                    weak(drive::joystick_subscriber()),
                    weak(drive::range_subscriber()),
                    strong(drive::run(config)),
                    weak(drive::actuator()),
                    weak(lights::lights()),
                    weak(logger()),
                )),
                action(|env: &mut MotionEnv| {
                    env.stop_actuator();
                    lights::stop_lights(env);
                    env.set_status_led(Rgb::RED);
                }),
                await_until(wants_to_run_or_quit),
            )),
        ),
    ))
}

fn main_activity(config: &MotionConfig) -> impl Activity<MotionEnv> {
    seq((
        action(|_: &mut MotionEnv| info!("start")),
        par((
            strong(connect::<MotionEnv>(config.network)),
            weak(blink::<MotionEnv>(Rgb::ORANGE, BlinkPattern::new(5, 5))),
        )),
        action(|env: &mut MotionEnv| env.set_status_led(Rgb::BLACK)),
        par((
            weak(receiver::<MotionEnv>()),
            weak(intent::intent_recognizer(config)),
            weak(intent::intent_publisher()),
            strong(controller(config)),
        )),
        action(|_: &mut MotionEnv| info!("done")),
        blink::<MotionEnv>(Rgb::RED, BlinkPattern::new(10, 5)),
    ))
}

/// Build the drive unit
pub fn build(config: MotionConfig) -> Scheduler<MotionEnv, impl Activity<MotionEnv>> {
    let root = main_activity(&config);
    Scheduler::new(MotionEnv::new(config), root)
}

#[cfg(test)]
mod tests;
