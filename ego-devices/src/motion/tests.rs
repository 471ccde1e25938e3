//! Whole drive unit scenarios, driven tick by tick through `react`

use std::vec::Vec;

use ego_core::{Activity, Scheduler};
use ego_protocol::{Datagram, Intent, Joystick, Payload, Press, Range, Topic};

use super::*;
use crate::common::{Frame, Inbox};
use crate::config::{Arbitration, MotionConfig};

const SHORT: &[bool] = &[true, false, false, false, false];
const DOUBLE: &[bool] = &[true, false, true, false];
const LONG: &[bool] = &[true, true, true, true, true, true, true, true];

struct Rig<A: Activity<MotionEnv>> {
    sched: Scheduler<MotionEnv, A>,
}

fn inbox(datagrams: &[Datagram]) -> Inbox {
    datagrams
        .iter()
        .map(|d| -> Frame { d.encode_to_vec() })
        .collect()
}

fn intents(outs: &[MotionOutputs]) -> Vec<Intent> {
    outs.iter()
        .flat_map(|o| o.publishes.iter())
        .filter(|d| d.topic == Topic::Intent.id())
        .map(|d| Intent::from_bytes(&d.payload).unwrap())
        .collect()
}

impl<A: Activity<MotionEnv>> Rig<A> {
    fn step(&mut self, buttons: MotionButtons, datagrams: &[Datagram]) -> MotionOutputs {
        self.sched.react(MotionInputs {
            buttons,
            link_up: true,
            frames: inbox(datagrams),
        })
    }

    fn idle(&mut self) -> MotionOutputs {
        self.step(MotionButtons::default(), &[])
    }

    fn receive(&mut self, datagrams: &[Datagram]) -> MotionOutputs {
        self.step(MotionButtons::default(), datagrams)
    }

    fn gesture(
        &mut self,
        levels: &[bool],
        button: fn(&mut MotionButtons) -> &mut bool,
    ) -> Vec<MotionOutputs> {
        levels
            .iter()
            .map(|&level| {
                let mut buttons = MotionButtons::default();
                *button(&mut buttons) = level;
                self.step(buttons, &[])
            })
            .collect()
    }

    fn env(&self) -> &MotionEnv {
        self.sched.env()
    }
}

fn main_button(b: &mut MotionButtons) -> &mut bool {
    &mut b.main
}

fn blue_button(b: &mut MotionButtons) -> &mut bool {
    &mut b.blue
}

fn booted(config: MotionConfig) -> Rig<impl Activity<MotionEnv>> {
    let mut rig = Rig {
        sched: build(config),
    };
    rig.idle();
    rig
}

fn driving_auto(config: MotionConfig) -> Rig<impl Activity<MotionEnv>> {
    let mut rig = booted(config);
    rig.gesture(DOUBLE, blue_button);
    rig.receive(&[Range(500).to_datagram()]);
    rig
}

#[test]
fn test_boot_blinks_until_link_up() {
    let mut sched = build(MotionConfig::default());
    let out = sched.react(MotionInputs::default());
    assert_eq!(out.status_led, Some(Rgb::ORANGE));
    assert!(out.publishes.is_empty());

    let out = sched.react(MotionInputs::default());
    assert_eq!(out.status_led, None);

    let out = sched.react(MotionInputs {
        link_up: true,
        ..Default::default()
    });
    assert_eq!(out.status_led, Some(Rgb::RED));
    assert_eq!(intents(&[out]), [Intent::Stop]);
    assert_eq!(sched.env().intent, Intent::Stop);
}

#[test]
fn test_blue_double_starts_auto_rotating() {
    let mut rig = booted(MotionConfig::default());
    let outs = rig.gesture(DOUBLE, blue_button);
    let last = outs.last().unwrap();

    assert_eq!(rig.env().intent, Intent::StartAuto);
    assert_eq!(intents(&outs), [Intent::StartAuto]);
    assert_eq!(last.status_led, Some(Rgb::BLUE));
    // range still unknown, so the unit turns in place
    assert_eq!(last.servos, Some(ServoPulses { left: 1300, right: 1300 }));
}

#[test]
fn test_clear_road_drives_forward() {
    let mut rig = booted(MotionConfig::default());
    rig.gesture(DOUBLE, blue_button);
    let out = rig.receive(&[Range(500).to_datagram()]);
    assert_eq!(out.servos, Some(ServoPulses { left: 1820, right: 1180 }));
    assert_eq!(rig.env().speed, Speed { x: 0, y: 80 });

    let out = rig.idle();
    assert_eq!(out.servos, None);
}

#[test]
fn test_rotation_direction_alternates() {
    let mut rig = driving_auto(MotionConfig::default());
    assert!(!rig.env().rotate_clockwise);
    for _ in 0..50 {
        rig.idle();
    }
    assert!(rig.env().rotate_clockwise);

    let out = rig.receive(&[Range(200).to_datagram()]);
    assert_eq!(out.servos, Some(ServoPulses { left: 1700, right: 1700 }));
}

#[test]
fn test_main_short_stops() {
    let mut rig = driving_auto(MotionConfig::default());
    let outs = rig.gesture(SHORT, main_button);
    let last = outs.last().unwrap();

    assert_eq!(rig.env().intent, Intent::Stop);
    assert_eq!(intents(&outs), [Intent::Stop]);
    assert_eq!(last.servos, Some(ServoPulses::STOP));
    assert_eq!(last.status_led, Some(Rgb::RED));
    assert_eq!(last.traffic, Some([Rgb::BLACK; TRAFFIC_LEDS]));
}

#[test]
fn test_remote_short_toggles_manual() {
    let mut rig = booted(MotionConfig::default());
    let out = rig.receive(&[Press::Short.to_datagram()]);
    assert_eq!(rig.env().intent, Intent::StartManu);
    assert_eq!(out.status_led, Some(Rgb::GREEN));
    assert_eq!(out.servos, Some(ServoPulses::STOP));

    let push = Joystick {
        x: 0,
        y: 60,
        button: false,
    };
    let out = rig.receive(&[push.to_datagram()]);
    assert_eq!(out.servos, Some(ServoPulses { left: 1740, right: 1260 }));

    // the same press again is a fresh press
    let out = rig.receive(&[Press::Short.to_datagram()]);
    assert_eq!(rig.env().intent, Intent::Stop);
    assert_eq!(out.servos, Some(ServoPulses::STOP));
    assert_eq!(intents(&[out]), [Intent::Stop]);
}

#[test]
fn test_remote_idle_press_is_ignored() {
    let mut rig = booted(MotionConfig::default());
    rig.receive(&[Press::No.to_datagram()]);
    assert_eq!(rig.env().intent, Intent::Stop);
}

#[test]
fn test_collision_holds_forward_motion() {
    let mut rig = booted(MotionConfig::default());
    rig.receive(&[Press::Short.to_datagram()]);

    let forward = Joystick {
        x: 0,
        y: 60,
        button: false,
    };
    rig.receive(&[forward.to_datagram(), Range(50).to_datagram()]);
    assert_eq!(rig.env().speed, Speed { x: 0, y: 0 });
    assert_eq!(rig.env().pulses, ServoPulses::STOP);

    let turning = Joystick {
        x: 50,
        y: 60,
        button: false,
    };
    rig.receive(&[turning.to_datagram()]);
    assert_eq!(rig.env().speed, Speed { x: 50, y: 0 });

    rig.receive(&[Range(500).to_datagram()]);
    assert_eq!(rig.env().speed, Speed { x: 50, y: 60 });
    assert_eq!(rig.env().intent, Intent::StartManu);
}

#[test]
fn test_long_press_quits_and_blinks_red() {
    let mut rig = driving_auto(MotionConfig::default());
    let outs = rig.gesture(LONG, main_button);
    let last = outs.last().unwrap();

    assert_eq!(rig.env().intent, Intent::Quit);
    assert_eq!(intents(&outs), [Intent::Quit]);
    assert_eq!(last.servos, Some(ServoPulses::STOP));
    assert_eq!(last.status_led, Some(Rgb::RED));

    let leds: Vec<_> = (0..10).map(|_| rig.idle().status_led).collect();
    assert!(leds[..9].iter().all(Option::is_none));
    assert_eq!(leds[9], Some(Rgb::BLACK));
    assert!(!rig.sched.is_finished());

    // no more sessions after quitting
    let outs = rig.gesture(DOUBLE, blue_button);
    assert!(intents(&outs).is_empty());
}

fn stop_and_remote_in_same_tick(arbitration: Arbitration) -> Intent {
    let mut rig = driving_auto(MotionConfig {
        arbitration,
        ..MotionConfig::default()
    });
    let (held, released) = SHORT.split_at(SHORT.len() - 1);
    rig.gesture(held, main_button);
    assert_eq!(released, [false]);
    rig.receive(&[Press::Short.to_datagram()]);
    rig.env().intent
}

#[test]
fn test_suppress_ignores_remote_during_local_press() {
    assert_eq!(
        stop_and_remote_in_same_tick(Arbitration::Suppress),
        Intent::Stop
    );
}

#[test]
fn test_layered_applies_remote_after_local_press() {
    assert_eq!(
        stop_and_remote_in_same_tick(Arbitration::Layered),
        Intent::StartManu
    );
}
