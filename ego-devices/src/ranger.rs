//! Ranging unit
//!
//! Measures the distance to the next obstacle, shows it as a colour on the
//! status LED and publishes it whenever it changes. A short press pauses
//! ranging, the next one resumes it.

use ego_core::combinators::{
    action, branch, forever, par, seq, strong, sustain, weak, when_abort,
};
use ego_core::library::on_change;
use ego_core::{Activity, Environment, Scheduler};
use ego_protocol::{Press, Range};
use log::{error, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::common::{blink, connect, press_recognizer, Bus, HasBus, Inbox, Publishes, StatusLight};
use crate::config::{BlinkPattern, RangerConfig};
use crate::traits::{RangeSensor, Rgb, StatusLed};

/// Distance class shown on the status LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorLevel {
    Undef,
    Near,
    Medium,
    Far,
}

impl IndicatorLevel {
    pub fn for_range(range: Range, config: &RangerConfig) -> Self {
        match range.millimetres() {
            None => IndicatorLevel::Undef,
            Some(mm) if mm > config.far_mm => IndicatorLevel::Far,
            Some(mm) if mm > config.medium_mm => IndicatorLevel::Medium,
            Some(_) => IndicatorLevel::Near,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            IndicatorLevel::Undef => Rgb::BLACK,
            IndicatorLevel::Near => Rgb::RED,
            IndicatorLevel::Medium => Rgb::YELLOW,
            IndicatorLevel::Far => Rgb::GREEN,
        }
    }
}

/// Everything the ranging unit samples per tick
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangerInputs {
    pub button: bool,
    /// Latest sensor measurement
    pub range: Range,
    pub link_up: bool,
    pub frames: Inbox,
}

impl Default for RangerInputs {
    fn default() -> Self {
        Self {
            button: false,
            range: Range::UNDEF,
            link_up: false,
            frames: Inbox::new(),
        }
    }
}

/// Hardware writes produced by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangerOutputs {
    pub status_led: Option<Rgb>,
    /// `Some(true)` starts continuous ranging, `Some(false)` stops it
    pub ranging: Option<bool>,
    pub publishes: Publishes,
}

impl RangerOutputs {
    /// Apply the hardware writes
    pub fn apply<L: StatusLed, S: RangeSensor>(&self, led: &mut L, sensor: &mut S) {
        if let Some(color) = self.status_led {
            led.set_color(color);
        }
        match self.ranging {
            Some(true) => sensor.start(),
            Some(false) => sensor.stop(),
            None => {}
        }
    }
}

/// Ranging unit environment
#[derive(Debug, Clone)]
pub struct RangerEnv {
    pub config: RangerConfig,
    /// Sensor and bus came up
    pub setup_ok: bool,
    pub button: bool,
    pub press: Press,
    /// Measurement latched for this tick
    pub sample: Range,
    /// Range while ranging, [`Range::UNDEF`] otherwise
    pub range: Range,
    bus: Bus,
    out: RangerOutputs,
}

impl RangerEnv {
    pub fn new(config: RangerConfig, setup_ok: bool) -> Self {
        Self {
            config,
            setup_ok,
            button: false,
            press: Press::No,
            sample: Range::UNDEF,
            range: Range::UNDEF,
            bus: Bus::default(),
            out: RangerOutputs::default(),
        }
    }

    fn set_ranging(&mut self, on: bool) {
        self.out.ranging = Some(on);
    }
}

impl HasBus for RangerEnv {
    fn bus(&self) -> &Bus {
        &self.bus
    }

    fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl StatusLight for RangerEnv {
    fn set_status_led(&mut self, color: Rgb) {
        self.out.status_led = Some(color);
    }
}

impl Environment for RangerEnv {
    type Inputs = RangerInputs;
    type Outputs = RangerOutputs;

    fn latch(&mut self, inputs: RangerInputs) {
        self.button = inputs.button;
        self.sample = inputs.range;
        self.bus.latch(inputs.link_up, inputs.frames);
    }

    fn take_outputs(&mut self) -> RangerOutputs {
        let mut out = core::mem::take(&mut self.out);
        out.publishes = self.bus.take_publishes();
        out
    }
}

fn ranger() -> impl Activity<RangerEnv> {
    seq((
        action(|env: &mut RangerEnv| {
            info!("start ranging");
            env.set_ranging(true);
        }),
        sustain(|env: &mut RangerEnv| env.range = env.sample),
    ))
}

fn range_publisher() -> impl Activity<RangerEnv> {
    on_change(
        "RangePublisher",
        |env: &RangerEnv| env.range,
        |env: &mut RangerEnv, range: Range| {
            info!("publishing range: {}", range.0);
            env.bus.publish(&range);
        },
    )
}

fn range_indicator() -> impl Activity<RangerEnv> {
    on_change(
        "RangeIndicator",
        |env: &RangerEnv| IndicatorLevel::for_range(env.range, &env.config),
        |env: &mut RangerEnv, level: IndicatorLevel| env.set_status_led(level.color()),
    )
}

fn range_controller() -> impl Activity<RangerEnv> {
    par((
        strong(ranger()),
        strong(range_publisher()),
        strong(range_indicator()),
    ))
}

fn short_pressed(env: &RangerEnv) -> bool {
    env.press == Press::Short
}

/// Alternate between ranging and a paused blink on every short press
fn mode_controller(config: &RangerConfig) -> impl Activity<RangerEnv> {
    forever(seq((
        when_abort(short_pressed, range_controller()),
        action(|env: &mut RangerEnv| {
            info!("pause ranging");
            env.set_ranging(false);
            env.range = Range::UNDEF;
        }),
        when_abort(
            short_pressed,
            blink::<RangerEnv>(Rgb::WHITE, config.paused_blink),
        ),
    )))
}

fn main_activity(config: &RangerConfig) -> impl Activity<RangerEnv> {
    branch(
        |env: &RangerEnv| env.setup_ok,
        seq((
            par((
                strong(connect::<RangerEnv>(config.network)),
                weak(blink::<RangerEnv>(Rgb::ORANGE, BlinkPattern::new(5, 5))),
            )),
            action(|env: &mut RangerEnv| env.set_status_led(Rgb::BLACK)),
            par((
                strong(press_recognizer(
                    config.press,
                    |env: &RangerEnv| env.button,
                    |env: &mut RangerEnv, press| env.press = press,
                )),
                strong(mode_controller(config)),
            )),
        )),
        seq((
            action(|_: &mut RangerEnv| error!("ranging setup failed")),
            blink::<RangerEnv>(Rgb::RED, BlinkPattern::new(10, 10)),
        )),
    )
}

/// Build the ranging unit, `setup_ok` tells if the sensor came up
pub fn build(
    config: RangerConfig,
    setup_ok: bool,
) -> Scheduler<RangerEnv, impl Activity<RangerEnv>> {
    let root = main_activity(&config);
    Scheduler::new(RangerEnv::new(config, setup_ok), root)
}
