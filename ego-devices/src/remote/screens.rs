//! Screens, one activity per page

use ego_core::combinators::{
    action, delay, forever, only_if, par, seq, strong, sustain, when_abort, Halt,
};
use ego_core::library::on_change;
use ego_core::Activity;
use ego_protocol::{Intent, Joystick};
use log::{debug, error, info};

use super::RemoteEnv;
use crate::traits::{Page, Rgb, ScreenView};

const BLINK_TICKS: u32 = 5;

fn show(page: Page, border: Option<Rgb>) -> impl Activity<RemoteEnv> {
    action(move |env: &mut RemoteEnv| {
        env.show(ScreenView {
            page,
            border,
            spinner: None,
        })
    })
}

pub(super) fn error_screen() -> impl Activity<RemoteEnv> {
    seq((
        action(|_: &mut RemoteEnv| error!("setup failed")),
        show(Page::Error, None),
        Halt::new(),
    ))
}

pub(super) fn connecting_screen() -> impl Activity<RemoteEnv> {
    seq((
        show(Page::Connecting, Some(Rgb::ORANGE)),
        forever(seq((
            action(|env: &mut RemoteEnv| env.set_spinner(Rgb::ORANGE)),
            delay(BLINK_TICKS),
            action(|env: &mut RemoteEnv| env.set_spinner(Rgb::WHITE)),
            delay(BLINK_TICKS),
        ))),
    ))
}

fn stop_screen() -> impl Activity<RemoteEnv> {
    seq((show(Page::Stop, Some(Rgb::RED)), Halt::new()))
}

fn joystick_publisher() -> impl Activity<RemoteEnv> {
    on_change(
        "JoystickPublisher",
        |env: &RemoteEnv| Joystick {
            x: env.joystick.x,
            y: env.joystick.y,
            button: false,
        },
        |env: &mut RemoteEnv, joystick: Joystick| {
            env.bus.publish(&joystick);
        },
    )
}

fn joystick_logger() -> impl Activity<RemoteEnv> {
    sustain(|env: &mut RemoteEnv| {
        debug!("x: {}, y: {}", env.joystick.x, env.joystick.y);
    })
}

fn manual_screen() -> impl Activity<RemoteEnv> {
    seq((
        show(Page::Manual, Some(Rgb::GREEN)),
        par((strong(joystick_publisher()), strong(joystick_logger()))),
    ))
}

fn auto_screen() -> impl Activity<RemoteEnv> {
    seq((show(Page::Auto, Some(Rgb::BLUE)), Halt::new()))
}

fn quit_screen() -> impl Activity<RemoteEnv> {
    seq((
        show(Page::Quit, None),
        forever(seq((
            action(|env: &mut RemoteEnv| env.set_border(Rgb::RED)),
            delay(BLINK_TICKS),
            action(|env: &mut RemoteEnv| env.set_border(Rgb::WHITE)),
            delay(BLINK_TICKS),
        ))),
    ))
}

/// Show the screen for `intent` until the intent changes
fn screen_for<A: Activity<RemoteEnv>>(intent: Intent, screen: A) -> impl Activity<RemoteEnv> {
    only_if(
        move |env: &RemoteEnv| env.intent == intent,
        when_abort(move |env: &RemoteEnv| env.intent != intent, screen),
    )
}

/// Follow the intent with the matching screen
pub(super) fn main_screen() -> impl Activity<RemoteEnv> {
    forever(seq((
        action(|env: &mut RemoteEnv| info!("screen for {:?}", env.intent)),
        screen_for(Intent::Stop, stop_screen()),
        screen_for(Intent::StartManu, manual_screen()),
        screen_for(Intent::StartAuto, auto_screen()),
        screen_for(Intent::Quit, quit_screen()),
    )))
}
