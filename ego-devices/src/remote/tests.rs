//! Whole remote scenarios, driven tick by tick through `react`

use std::vec::Vec;

use ego_core::{Activity, Scheduler};
use ego_protocol::{Datagram, Intent, Joystick, Payload, Press};

use super::*;
use crate::common::Frame;
use crate::traits::Page;

const SHORT: &[bool] = &[true, false, false, false, false];

struct Rig<A: Activity<RemoteEnv>> {
    sched: Scheduler<RemoteEnv, A>,
    joystick: Joystick,
}

fn published<P: Payload>(outs: &[RemoteOutputs]) -> Vec<P> {
    outs.iter()
        .flat_map(|o| o.publishes.iter())
        .filter(|d| d.topic == P::TOPIC.id())
        .map(|d| P::from_bytes(&d.payload).unwrap())
        .collect()
}

impl<A: Activity<RemoteEnv>> Rig<A> {
    fn step(&mut self, button_a: bool, datagrams: &[Datagram]) -> RemoteOutputs {
        self.sched.react(RemoteInputs {
            button_a,
            button_b: false,
            joystick: Some(self.joystick),
            link_up: true,
            frames: datagrams
                .iter()
                .map(|d| -> Frame { d.encode_to_vec() })
                .collect(),
        })
    }

    fn idle(&mut self) -> RemoteOutputs {
        self.step(false, &[])
    }

    fn intent(&mut self, intent: Intent) -> RemoteOutputs {
        self.step(false, &[intent.to_datagram()])
    }

    fn short_a(&mut self) -> Vec<RemoteOutputs> {
        SHORT.iter().map(|&level| self.step(level, &[])).collect()
    }

    fn env(&self) -> &RemoteEnv {
        self.sched.env()
    }
}

fn booted() -> Rig<impl Activity<RemoteEnv>> {
    let mut rig = Rig {
        sched: build(RemoteConfig::default(), true),
        joystick: Joystick::default(),
    };
    rig.idle();
    rig
}

#[test]
fn test_failed_setup_shows_error() {
    let mut sched = build(RemoteConfig::default(), false);
    let out = sched.react(RemoteInputs::default());
    assert_eq!(out.screen, Some(ScreenView::page(Page::Error)));
    for _ in 0..10 {
        let out = sched.react(RemoteInputs {
            button_a: true,
            link_up: true,
            ..Default::default()
        });
        assert_eq!(out.screen, None);
        assert!(out.publishes.is_empty());
    }
}

#[test]
fn test_connecting_spinner_blinks() {
    let mut sched = build(RemoteConfig::default(), true);
    let out = sched.react(RemoteInputs::default());
    assert_eq!(
        out.screen,
        Some(ScreenView {
            page: Page::Connecting,
            border: Some(Rgb::ORANGE),
            spinner: Some(Rgb::ORANGE),
        })
    );
    let spinners: Vec<_> = (0..5)
        .map(|_| sched.react(RemoteInputs::default()).screen)
        .collect();
    assert!(spinners[..4].iter().all(Option::is_none));
    assert_eq!(spinners[4].and_then(|v| v.spinner), Some(Rgb::WHITE));
}

#[test]
fn test_connected_shows_stop_screen() {
    let mut rig = Rig {
        sched: build(RemoteConfig::default(), true),
        joystick: Joystick::default(),
    };
    let out = rig.idle();
    assert_eq!(
        out.screen,
        Some(ScreenView {
            page: Page::Stop,
            border: Some(Rgb::RED),
            spinner: None,
        })
    );
    assert_eq!(published::<Press>(&[out]), [Press::No]);
}

#[test]
fn test_screens_follow_intent() {
    let mut rig = booted();
    let out = rig.intent(Intent::StartAuto);
    let view = out.screen.unwrap();
    assert_eq!((view.page, view.border), (Page::Auto, Some(Rgb::BLUE)));

    let out = rig.intent(Intent::Stop);
    assert_eq!(out.screen.map(|v| v.page), Some(Page::Stop));

    let out = rig.intent(Intent::Quit);
    assert_eq!(out.screen.map(|v| v.page), Some(Page::Quit));
    assert_eq!(rig.env().view().border, Some(Rgb::RED));
    for _ in 0..5 {
        rig.idle();
    }
    assert_eq!(rig.env().view().border, Some(Rgb::WHITE));
}

#[test]
fn test_manual_publishes_joystick_changes() {
    let mut rig = booted();
    rig.joystick = Joystick {
        x: 10,
        y: 20,
        button: false,
    };
    let out = rig.intent(Intent::StartManu);
    assert_eq!(out.screen.map(|v| v.page), Some(Page::Manual));
    assert_eq!(
        published::<Joystick>(&[out]),
        [Joystick {
            x: 10,
            y: 20,
            button: false
        }]
    );

    assert!(published::<Joystick>(&[rig.idle()]).is_empty());

    rig.joystick.y = -30;
    let out = rig.idle();
    assert_eq!(published::<Joystick>(&[out])[0].y, -30);

    // leaving manual mode stops the joystick traffic
    rig.intent(Intent::Stop);
    rig.joystick.x = -90;
    assert!(published::<Joystick>(&[rig.idle()]).is_empty());
}

#[test]
fn test_button_short_is_published_once() {
    let mut rig = booted();
    let outs = rig.short_a();
    assert_eq!(published::<Press>(&outs), [Press::Short]);
    assert_eq!(published::<Press>(&[rig.idle()]), [Press::No]);
}

#[test]
fn test_joystick_click_stops_running_unit() {
    let mut rig = booted();
    rig.joystick.button = true;
    assert!(published::<Press>(&[rig.idle()]).is_empty());
    rig.joystick.button = false;
    rig.idle();

    rig.intent(Intent::StartAuto);
    rig.joystick.button = true;
    assert_eq!(published::<Press>(&[rig.idle()]), [Press::Short]);
    // held down, no new edge
    assert_eq!(published::<Press>(&[rig.idle()]), [Press::No]);
}

#[test]
fn test_dimmed_screen_swallows_waking_press() {
    let mut rig = booted();
    let mut levels = Vec::new();
    for _ in 0..70 {
        levels.extend(rig.idle().brightness);
    }
    assert_eq!(levels, [10, 9, 8, 7]);
    assert!(rig.env().dimmed);

    let outs = rig.short_a();
    assert!(published::<Press>(&outs).is_empty());
    assert!(outs.iter().any(|o| o.brightness == Some(10)));

    let outs = rig.short_a();
    assert_eq!(published::<Press>(&outs), [Press::Short]);
}

#[test]
fn test_intent_change_wakes_screen() {
    let mut rig = booted();
    for _ in 0..70 {
        rig.idle();
    }
    assert!(rig.env().dimmed);
    let out = rig.intent(Intent::StartAuto);
    assert_eq!(out.brightness, Some(10));
}
