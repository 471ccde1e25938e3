//! Handheld remote
//!
//! Shows the drive unit's intent on the screen, turns button gestures into
//! PRESS datagrams and, while the drive unit runs manually, publishes the
//! joystick position. The screen dims down when nothing happens for a while.

mod dimmer;
mod screens;

use ego_core::combinators::{action, branch, par, seq, strong, sustain, weak};
use ego_core::library::{change_detector, on_change, rising_edge};
use ego_core::{Activity, Environment, Scheduler};
use ego_protocol::{Intent, Joystick, Press, Topic};
use log::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{connect, dual_press_recognizer, receiver, Bus, HasBus, Inbox, Publishes};
use crate::config::RemoteConfig;
use crate::traits::{Rgb, Screen, ScreenView};

pub use dimmer::dim_steps;

/// Everything the remote samples per tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteInputs {
    pub button_a: bool,
    pub button_b: bool,
    /// Joystick position, `None` when the read failed
    pub joystick: Option<Joystick>,
    pub link_up: bool,
    pub frames: Inbox,
}

/// Hardware writes produced by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutputs {
    /// View to push to the display
    pub screen: Option<ScreenView>,
    /// New backlight level
    pub brightness: Option<u8>,
    pub publishes: Publishes,
}

impl RemoteOutputs {
    /// Apply the hardware writes
    pub fn apply<S: Screen>(&self, screen: &mut S) {
        if let Some(view) = &self.screen {
            screen.draw(view);
        }
        if let Some(level) = self.brightness {
            screen.set_brightness(level);
        }
    }
}

/// Remote environment
#[derive(Debug, Clone)]
pub struct RemoteEnv {
    pub config: RemoteConfig,
    /// Joystick unit came up
    pub setup_ok: bool,
    pub button_a: bool,
    pub button_b: bool,
    joystick_sample: Option<Joystick>,
    /// Last joystick position read
    pub joystick: Joystick,
    /// Joystick button went down in this tick
    pub stop_button: bool,
    /// Gesture on the A/B buttons, before the dimmer
    pub raw_press: Press,
    /// Press to publish
    pub press: Press,
    pub intent: Intent,
    pub intent_changed: bool,
    /// Screen is dimmed, the next press only wakes it up
    pub dimmed: bool,
    pub(crate) dim_level: u8,
    view: ScreenView,
    view_dirty: bool,
    bus: Bus,
    out: RemoteOutputs,
}

impl RemoteEnv {
    pub fn new(config: RemoteConfig, setup_ok: bool) -> Self {
        Self {
            config,
            setup_ok,
            button_a: false,
            button_b: false,
            joystick_sample: None,
            joystick: Joystick::default(),
            stop_button: false,
            raw_press: Press::No,
            press: Press::No,
            intent: Intent::Stop,
            intent_changed: false,
            dimmed: false,
            dim_level: config.dimmer.max_brightness,
            view: ScreenView::default(),
            view_dirty: false,
            bus: Bus::default(),
            out: RemoteOutputs::default(),
        }
    }

    /// What the screen currently shows
    pub fn view(&self) -> &ScreenView {
        &self.view
    }

    pub(crate) fn show(&mut self, view: ScreenView) {
        self.view = view;
        self.view_dirty = true;
    }

    pub(crate) fn set_border(&mut self, color: Rgb) {
        self.view.border = Some(color);
        self.view_dirty = true;
    }

    pub(crate) fn set_spinner(&mut self, color: Rgb) {
        self.view.spinner = Some(color);
        self.view_dirty = true;
    }

    pub(crate) fn set_brightness(&mut self, level: u8) {
        self.out.brightness = Some(level);
    }
}

impl HasBus for RemoteEnv {
    fn bus(&self) -> &Bus {
        &self.bus
    }

    fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Environment for RemoteEnv {
    type Inputs = RemoteInputs;
    type Outputs = RemoteOutputs;

    fn latch(&mut self, inputs: RemoteInputs) {
        self.button_a = inputs.button_a;
        self.button_b = inputs.button_b;
        self.joystick_sample = inputs.joystick;
        self.bus.latch(inputs.link_up, inputs.frames);
    }

    fn take_outputs(&mut self) -> RemoteOutputs {
        let mut out = core::mem::take(&mut self.out);
        if self.view_dirty {
            out.screen = Some(self.view);
            self.view_dirty = false;
        }
        out.publishes = self.bus.take_publishes();
        out
    }
}

fn intent_subscriber() -> impl Activity<RemoteEnv> {
    seq((
        action(|env: &mut RemoteEnv| env.bus.subscribe(Topic::Intent)),
        sustain(|env: &mut RemoteEnv| {
            if let Some(intent) = env.bus.latest::<Intent>() {
                env.intent = intent;
            }
        }),
    ))
}

fn joystick_reader() -> impl Activity<RemoteEnv> {
    sustain(|env: &mut RemoteEnv| {
        if let Some(joystick) = env.joystick_sample {
            env.joystick = joystick;
        }
    })
}

/// A joystick click stops a running drive unit
fn input_combiner() -> impl Activity<RemoteEnv> {
    sustain(|env: &mut RemoteEnv| {
        if env.intent != Intent::Stop && env.stop_button {
            env.press = Press::Short;
        }
    })
}

fn press_publisher() -> impl Activity<RemoteEnv> {
    on_change(
        "PressPublisher",
        |env: &RemoteEnv| env.press,
        |env: &mut RemoteEnv, press: Press| {
            info!("publishing press {:?}", press);
            env.bus.publish(&press);
        },
    )
}

fn main_activity(config: &RemoteConfig) -> impl Activity<RemoteEnv> {
    branch(
        |env: &RemoteEnv| env.setup_ok,
        seq((
            par((
                strong(connect::<RemoteEnv>(config.network)),
                weak(screens::connecting_screen()),
            )),
            par((
                strong(receiver::<RemoteEnv>()),
                strong(intent_subscriber()),
                strong(joystick_reader()),
                strong(screens::main_screen()),
                strong(dual_press_recognizer(
                    config.press,
                    |env: &RemoteEnv| env.button_a,
                    |env: &RemoteEnv| env.button_b,
                    |env: &mut RemoteEnv, press| env.raw_press = press,
                )),
                strong(change_detector(
                    |env: &RemoteEnv| env.intent,
                    |env: &mut RemoteEnv, changed| env.intent_changed = changed,
                )),
                strong(dimmer::dimmer(config.dimmer)),
                strong(rising_edge(
                    |env: &RemoteEnv| env.joystick.button,
                    |env: &mut RemoteEnv, edge| env.stop_button = edge,
                )),
                strong(input_combiner()),
                strong(press_publisher()),
            )),
        )),
        screens::error_screen(),
    )
}

/// Build the remote, `setup_ok` tells if the joystick unit came up
pub fn build(
    config: RemoteConfig,
    setup_ok: bool,
) -> Scheduler<RemoteEnv, impl Activity<RemoteEnv>> {
    let root = main_activity(&config);
    Scheduler::new(RemoteEnv::new(config, setup_ok), root)
}

#[cfg(test)]
mod tests;
