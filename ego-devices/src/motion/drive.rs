//! Driving: subscribers, manual and auto runs, servo actuator

use ego_core::combinators::{
    action, branch, delay, forever, only_if, par, seq, strong, sustain, weak, when_abort, Halt,
};
use ego_core::library::on_change;
use ego_core::Activity;
use ego_protocol::{Intent, Joystick, Range, Topic};

use super::{MotionEnv, ServoPulses, Speed, STOP_PULSE};
use crate::common::StatusLight;
use crate::config::MotionConfig;
use crate::traits::Rgb;

const MIN_PULSE: i32 = 500;
const MAX_PULSE: i32 = 2500;

/// Check if the road ahead is free, an undefined range never is
pub fn is_clear(range: Range, clear_mm: u16) -> bool {
    range.millimetres().is_some_and(|mm| mm > clear_mm)
}

/// Check if pushing `speed` forward would hit the obstacle at `range`
pub fn is_collision(speed: Speed, range: Range, collision_mm: u16) -> bool {
    speed.y > 10 && range.millimetres().is_some_and(|mm| mm < collision_mm)
}

/// Servo pulses for a speed
///
/// The right servo is mounted mirrored, so its pulse is reflected around the
/// stop pulse. Steering is mirrored too when reversing.
pub fn pulses_for(speed: Speed, trim: i16) -> ServoPulses {
    let stop = STOP_PULSE as i32;
    let pulse = stop + 4 * speed.y as i32;
    let mut steer = trim as i32 + 2 * speed.x as i32;
    if speed.y < -10 {
        steer = -steer;
    }
    let left = pulse + steer;
    let right = 2 * stop - (pulse - steer);
    ServoPulses {
        left: left.clamp(MIN_PULSE, MAX_PULSE) as u16,
        right: right.clamp(MIN_PULSE, MAX_PULSE) as u16,
    }
}

pub(super) fn joystick_subscriber() -> impl Activity<MotionEnv> {
    seq((
        action(|env: &mut MotionEnv| env.bus.subscribe(Topic::Joystick)),
        sustain(|env: &mut MotionEnv| {
            if let Some(joy) = env.bus.latest::<Joystick>() {
                env.joystick = Speed { x: joy.x, y: joy.y };
            }
        }),
    ))
}

pub(super) fn range_subscriber() -> impl Activity<MotionEnv> {
    seq((
        action(|env: &mut MotionEnv| env.bus.subscribe(Topic::Range)),
        sustain(|env: &mut MotionEnv| {
            if let Some(range) = env.bus.latest::<Range>() {
                env.range = range;
            }
        }),
    ))
}

/// Follow the joystick, holding forward motion while an obstacle is close
fn run_manual() -> impl Activity<MotionEnv> {
    seq((
        action(|env: &mut MotionEnv| env.set_status_led(Rgb::GREEN)),
        sustain(|env: &mut MotionEnv| {
            let mut speed = env.joystick;
            if is_collision(speed, env.range, env.config.collision_range_mm) {
                speed.y = 0;
            }
            env.speed = speed;
        }),
    ))
}

fn drive_forward(cruise: i8) -> impl Activity<MotionEnv> {
    seq((
        action(move |env: &mut MotionEnv| env.speed = Speed { x: 0, y: cruise }),
        Halt::new(),
    ))
}

fn toggle_after(ticks: u32) -> impl Activity<MotionEnv> {
    seq((
        delay(ticks),
        action(|env: &mut MotionEnv| env.rotate_clockwise = !env.rotate_clockwise),
    ))
}

fn rotate(rotate_speed: i8) -> impl Activity<MotionEnv> {
    seq((
        action(move |env: &mut MotionEnv| {
            let x = if env.rotate_clockwise {
                rotate_speed
            } else {
                rotate_speed.saturating_neg()
            };
            env.speed = Speed { x, y: 0 };
        }),
        Halt::new(),
    ))
}

/// Drive forward while the road is clear, otherwise rotate in place
///
/// The rotation direction flips after every long enough stretch of forward
/// driving, so the unit does not get stuck turning into the same corner.
fn run_auto(config: &MotionConfig) -> impl Activity<MotionEnv> {
    let clear_mm = config.clear_range_mm;
    seq((
        action(|env: &mut MotionEnv| env.set_status_led(Rgb::BLUE)),
        forever(seq((
            only_if(
                move |env: &MotionEnv| is_clear(env.range, clear_mm),
                when_abort(
                    move |env: &MotionEnv| !is_clear(env.range, clear_mm),
                    par((
                        strong(drive_forward(config.cruise_speed)),
                        weak(toggle_after(config.rotation_toggle_ticks)),
                    )),
                ),
            ),
            when_abort(
                move |env: &MotionEnv| is_clear(env.range, clear_mm),
                rotate(config.rotate_speed),
            ),
        ))),
    ))
}

/// One drive session in the mode the intent asks for
pub(super) fn run(config: &MotionConfig) -> impl Activity<MotionEnv> {
    branch(
        |env: &MotionEnv| env.intent == Intent::StartManu,
        when_abort(
            |env: &MotionEnv| env.intent != Intent::StartManu,
            run_manual(),
        ),
        when_abort(
            |env: &MotionEnv| env.intent != Intent::StartAuto,
            run_auto(config),
        ),
    )
}

/// Compute servo pulses from the speed, write them when they change
pub(super) fn actuator() -> impl Activity<MotionEnv> {
    par((
        strong(sustain(|env: &mut MotionEnv| {
            env.pulses = pulses_for(env.speed, env.config.servo_trim);
        })),
        strong(on_change(
            "Servo",
            |env: &MotionEnv| env.pulses,
            |env: &mut MotionEnv, pulses: ServoPulses| env.write_servos(pulses),
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_needs_forward_push() {
        let close = Range(50);
        assert!(is_collision(Speed { x: 0, y: 50 }, close, 80));
        assert!(!is_collision(Speed { x: 0, y: -50 }, close, 80));
        assert!(!is_collision(Speed { x: 0, y: 50 }, Range(80), 80));
        assert!(!is_collision(Speed { x: 0, y: 50 }, Range::UNDEF, 80));
    }

    #[test]
    fn test_pulses_standing_still() {
        assert_eq!(pulses_for(Speed::default(), 0), ServoPulses::STOP);
    }

    #[test]
    fn test_pulses_forward_mirrored() {
        let pulses = pulses_for(Speed { x: 0, y: 80 }, 0);
        assert_eq!(pulses, ServoPulses { left: 1820, right: 1180 });
    }

    #[test]
    fn test_pulses_rotate_in_place() {
        let pulses = pulses_for(Speed { x: 100, y: 0 }, 0);
        assert_eq!(pulses, ServoPulses { left: 1700, right: 1700 });
    }

    #[test]
    fn test_pulses_reverse_mirrors_steering() {
        let pulses = pulses_for(Speed { x: 10, y: -50 }, 0);
        // pulse 1300, steering -20
        assert_eq!(pulses, ServoPulses { left: 1280, right: 1680 });
    }

    #[test]
    fn test_pulses_clamped() {
        let pulses = pulses_for(Speed { x: 127, y: 127 }, 300);
        assert_eq!(pulses.left, 2500);
        assert!(pulses.right >= 500);
    }

    #[test]
    fn test_trim_shifts_both_wheels() {
        let pulses = pulses_for(Speed::default(), 20);
        assert_eq!(pulses, ServoPulses { left: 1520, right: 1520 });
    }

    #[test]
    fn test_undefined_range_is_not_clear() {
        assert!(!is_clear(Range::UNDEF, 300));
        assert!(!is_clear(Range(300), 300));
        assert!(is_clear(Range(301), 300));
    }
}
