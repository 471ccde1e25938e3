//! Traffic lights
//!
//! Blinkers follow the lateral direction, the front/back center lights the
//! longitudinal one. Each light restarts from scratch whenever its direction
//! changes.

use ego_core::combinators::{
    action, branch, delay, forever, par, seq, strong, sustain, when_abort, Halt,
};
use ego_core::Activity;

use super::MotionEnv;
use crate::traits::Rgb;

/// Number of traffic LEDs on the strip
pub const TRAFFIC_LEDS: usize = 6;

const BLINK_TICKS: u32 = 5;

/// Position of a LED on the traffic strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrafficLed {
    FrontRight = 0,
    FrontCenter = 1,
    FrontLeft = 2,
    BackLeft = 3,
    BackCenter = 4,
    BackRight = 5,
}

impl TrafficLed {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Longitudinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LongDir {
    #[default]
    Stop,
    Forward,
    Backward,
}

/// Lateral direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatDir {
    #[default]
    Center,
    Left,
    Right,
}

/// Directions derived from the speed, plus the values each light started with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightState {
    pub long_dir: LongDir,
    pub lat_dir: LatDir,
    long_started: LongDir,
    lat_started: LatDir,
}

impl LongDir {
    /// Direction of a forward/backward speed, with a dead zone
    pub fn from_speed(y: i8) -> Self {
        if y > 10 {
            LongDir::Forward
        } else if y < -10 {
            LongDir::Backward
        } else {
            LongDir::Stop
        }
    }
}

impl LatDir {
    /// Direction of a left/right speed, with a dead zone
    pub fn from_speed(x: i8) -> Self {
        if x > 20 {
            LatDir::Right
        } else if x < -20 {
            LatDir::Left
        } else {
            LatDir::Center
        }
    }
}

const LEFT_SIDE: [TrafficLed; 2] = [TrafficLed::FrontLeft, TrafficLed::BackLeft];
const RIGHT_SIDE: [TrafficLed; 2] = [TrafficLed::FrontRight, TrafficLed::BackRight];

fn stop_blinker(env: &mut MotionEnv) {
    env.set_traffic(&LEFT_SIDE, Rgb::BLACK);
    env.set_traffic(&RIGHT_SIDE, Rgb::BLACK);
}

fn stop_main_lights(env: &mut MotionEnv) {
    env.set_traffic(&[TrafficLed::FrontCenter, TrafficLed::BackCenter], Rgb::BLACK);
}

/// Switch every traffic LED off
pub(super) fn stop_lights(env: &mut MotionEnv) {
    stop_main_lights(env);
    stop_blinker(env);
}

fn flash(leds: &'static [TrafficLed], color: Rgb) -> impl Activity<MotionEnv> {
    forever(seq((
        action(move |env: &mut MotionEnv| env.set_traffic(leds, color)),
        delay(BLINK_TICKS),
        action(move |env: &mut MotionEnv| env.set_traffic(leds, Rgb::BLACK)),
        delay(BLINK_TICKS),
    )))
}

fn dir_generator() -> impl Activity<MotionEnv> {
    sustain(|env: &mut MotionEnv| {
        env.lights.long_dir = LongDir::from_speed(env.speed.y);
        env.lights.lat_dir = LatDir::from_speed(env.speed.x);
    })
}

fn blinker() -> impl Activity<MotionEnv> {
    forever(seq((
        action(|env: &mut MotionEnv| env.lights.lat_started = env.lights.lat_dir),
        when_abort(
            |env: &MotionEnv| env.lights.lat_dir != env.lights.lat_started,
            branch(
                |env: &MotionEnv| env.lights.lat_dir == LatDir::Left,
                flash(&LEFT_SIDE, Rgb::YELLOW),
                branch(
                    |env: &MotionEnv| env.lights.lat_dir == LatDir::Right,
                    flash(&RIGHT_SIDE, Rgb::YELLOW),
                    Halt::new(),
                ),
            ),
        ),
        action(stop_blinker),
    )))
}

fn main_lights() -> impl Activity<MotionEnv> {
    forever(seq((
        action(|env: &mut MotionEnv| env.lights.long_started = env.lights.long_dir),
        when_abort(
            |env: &MotionEnv| env.lights.long_dir != env.lights.long_started,
            branch(
                |env: &MotionEnv| env.lights.long_dir == LongDir::Forward,
                seq((
                    action(|env: &mut MotionEnv| {
                        env.set_traffic(&[TrafficLed::FrontCenter], Rgb::WHITE);
                        env.set_traffic(&[TrafficLed::BackCenter], Rgb::RED);
                    }),
                    Halt::new(),
                )),
                branch(
                    |env: &MotionEnv| env.lights.long_dir == LongDir::Backward,
                    seq((
                        action(|env: &mut MotionEnv| {
                            env.set_traffic(&[TrafficLed::FrontCenter], Rgb::WHITE)
                        }),
                        flash(&[TrafficLed::BackCenter], Rgb::RED),
                    )),
                    Halt::new(),
                ),
            ),
        ),
        action(stop_main_lights),
    )))
}

pub(super) fn lights() -> impl Activity<MotionEnv> {
    par((
        strong(dir_generator()),
        strong(blinker()),
        strong(main_lights()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::motion::Speed;

    fn tick_with(env: &mut MotionEnv, lights: &mut impl Activity<MotionEnv>, speed: Speed) {
        env.speed = speed;
        lights.tick(env);
    }

    #[test]
    fn test_direction_dead_zones() {
        assert_eq!(LongDir::from_speed(10), LongDir::Stop);
        assert_eq!(LongDir::from_speed(11), LongDir::Forward);
        assert_eq!(LongDir::from_speed(-11), LongDir::Backward);
        assert_eq!(LatDir::from_speed(20), LatDir::Center);
        assert_eq!(LatDir::from_speed(-21), LatDir::Left);
    }

    #[test]
    fn test_forward_lights() {
        let mut env = MotionEnv::new(MotionConfig::default());
        let mut l = lights();
        tick_with(&mut env, &mut l, Speed { x: 0, y: 80 });
        // the direction is picked up by the lights in the same tick
        let traffic = env.traffic();
        assert_eq!(traffic[TrafficLed::FrontCenter.index()], Rgb::WHITE);
        assert_eq!(traffic[TrafficLed::BackCenter.index()], Rgb::RED);
    }

    #[test]
    fn test_left_blinker_blinks() {
        let mut env = MotionEnv::new(MotionConfig::default());
        let mut l = lights();
        let left = Speed { x: -50, y: 0 };
        tick_with(&mut env, &mut l, left);
        assert_eq!(env.traffic()[TrafficLed::FrontLeft.index()], Rgb::YELLOW);
        assert_eq!(env.traffic()[TrafficLed::BackLeft.index()], Rgb::YELLOW);
        for _ in 0..5 {
            tick_with(&mut env, &mut l, left);
        }
        assert_eq!(env.traffic()[TrafficLed::FrontLeft.index()], Rgb::BLACK);
    }

    #[test]
    fn test_direction_change_restarts_light() {
        let mut env = MotionEnv::new(MotionConfig::default());
        let mut l = lights();
        tick_with(&mut env, &mut l, Speed { x: -50, y: 0 });
        tick_with(&mut env, &mut l, Speed { x: 50, y: 0 });
        // abort clears the left side and the right side starts in the same tick
        assert_eq!(env.traffic()[TrafficLed::FrontLeft.index()], Rgb::BLACK);
        assert_eq!(env.traffic()[TrafficLed::FrontRight.index()], Rgb::YELLOW);
    }

    #[test]
    fn test_reverse_flashes_back_light() {
        let mut env = MotionEnv::new(MotionConfig::default());
        let mut l = lights();
        let back = Speed { x: 0, y: -40 };
        tick_with(&mut env, &mut l, back);
        assert_eq!(env.traffic()[TrafficLed::FrontCenter.index()], Rgb::WHITE);
        assert_eq!(env.traffic()[TrafficLed::BackCenter.index()], Rgb::RED);
        for _ in 0..5 {
            tick_with(&mut env, &mut l, back);
        }
        assert_eq!(env.traffic()[TrafficLed::BackCenter.index()], Rgb::BLACK);
    }
}
