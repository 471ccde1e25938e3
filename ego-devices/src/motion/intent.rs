//! Intent recognition and publishing

use ego_core::combinators::{action, par, seq, strong, sustain};
use ego_core::library::on_change;
use ego_core::Activity;
use ego_protocol::{Intent, Press, Topic};
use log::info;

use super::{MotionEnv, Presses};
use crate::common::press_recognizer;
use crate::config::{Arbitration, MotionConfig};

/// Compute the next intent from the presses of one tick
///
/// Local buttons are applied blue, main, red. Under
/// [`Arbitration::Suppress`] the remote press only counts in ticks without
/// a local press; under [`Arbitration::Layered`] it is applied last on top.
pub fn resolve_intent(current: Intent, presses: &Presses, arbitration: Arbitration) -> Intent {
    let mut intent = current;
    intent = match presses.blue {
        Press::Short => Intent::StartManu,
        Press::Double => Intent::StartAuto,
        Press::No | Press::Long => intent,
    };
    intent = match presses.main {
        Press::Short => Intent::Stop,
        Press::Long => Intent::Quit,
        Press::Double => Intent::StartAuto,
        Press::No => intent,
    };
    intent = match presses.red {
        Press::Short => Intent::Stop,
        Press::Long => Intent::Quit,
        Press::No | Press::Double => intent,
    };

    let local = presses.blue.is_some() || presses.main.is_some() || presses.red.is_some();
    if local && arbitration == Arbitration::Suppress {
        return intent;
    }
    match presses.remote {
        Press::Short if intent == Intent::Stop => Intent::StartManu,
        Press::Short => Intent::Stop,
        Press::Long => Intent::Quit,
        Press::Double => Intent::StartAuto,
        Press::No => intent,
    }
}

/// Reports a remote press in the tick its datagram arrives
fn remote_press_subscriber() -> impl Activity<MotionEnv> {
    seq((
        action(|env: &mut MotionEnv| env.bus.subscribe(Topic::Press)),
        sustain(|env: &mut MotionEnv| {
            let updates = env.bus.updates(Topic::Press);
            env.presses.remote = if updates != env.remote_updates {
                env.remote_updates = updates;
                env.bus.latest::<Press>().unwrap_or(Press::No)
            } else {
                Press::No
            };
        }),
    ))
}

fn intent_computer() -> impl Activity<MotionEnv> {
    sustain(|env: &mut MotionEnv| {
        let next = resolve_intent(env.intent, &env.presses, env.config.arbitration);
        if next != env.intent {
            info!("intent {:?} -> {:?}", env.intent, next);
        }
        env.intent = next;
    })
}

pub(super) fn intent_recognizer(config: &MotionConfig) -> impl Activity<MotionEnv> {
    let timing = config.press;
    par((
        strong(press_recognizer(
            timing,
            |env: &MotionEnv| env.buttons.main,
            |env: &mut MotionEnv, press| env.presses.main = press,
        )),
        strong(press_recognizer(
            timing,
            |env: &MotionEnv| env.buttons.red,
            |env: &mut MotionEnv, press| env.presses.red = press,
        )),
        strong(press_recognizer(
            timing,
            |env: &MotionEnv| env.buttons.blue,
            |env: &mut MotionEnv, press| env.presses.blue = press,
        )),
        strong(remote_press_subscriber()),
        strong(intent_computer()),
    ))
}

pub(super) fn intent_publisher() -> impl Activity<MotionEnv> {
    on_change(
        "IntentPublisher",
        |env: &MotionEnv| env.intent,
        |env: &mut MotionEnv, intent: Intent| {
            info!("publishing intent {:?}", intent);
            env.bus.publish(&intent);
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presses(main: Press, red: Press, blue: Press, remote: Press) -> Presses {
        Presses {
            main,
            red,
            blue,
            remote,
        }
    }

    const ALL_INTENTS: [Intent; 4] = [
        Intent::Stop,
        Intent::StartManu,
        Intent::StartAuto,
        Intent::Quit,
    ];

    #[test]
    fn test_main_short_always_stops() {
        let p = presses(Press::Short, Press::No, Press::No, Press::No);
        for arbitration in [Arbitration::Suppress, Arbitration::Layered] {
            for current in ALL_INTENTS {
                assert_eq!(resolve_intent(current, &p, arbitration), Intent::Stop);
            }
        }
    }

    #[test]
    fn test_blue_double_starts_auto() {
        let p = presses(Press::No, Press::No, Press::Double, Press::No);
        for arbitration in [Arbitration::Suppress, Arbitration::Layered] {
            for current in ALL_INTENTS {
                assert_eq!(resolve_intent(current, &p, arbitration), Intent::StartAuto);
            }
        }
    }

    #[test]
    fn test_nothing_pressed_keeps_intent() {
        let p = Presses::default();
        for current in ALL_INTENTS {
            assert_eq!(resolve_intent(current, &p, Arbitration::Suppress), current);
        }
    }

    #[test]
    fn test_red_overrides_blue() {
        let p = presses(Press::No, Press::Long, Press::Short, Press::No);
        assert_eq!(
            resolve_intent(Intent::Stop, &p, Arbitration::Suppress),
            Intent::Quit
        );
    }

    #[test]
    fn test_remote_short_toggles() {
        let p = presses(Press::No, Press::No, Press::No, Press::Short);
        assert_eq!(
            resolve_intent(Intent::Stop, &p, Arbitration::Suppress),
            Intent::StartManu
        );
        assert_eq!(
            resolve_intent(Intent::StartAuto, &p, Arbitration::Suppress),
            Intent::Stop
        );
    }

    #[test]
    fn test_arbitration_policies_differ() {
        // main stops, the remote toggles the stopped unit back to manual
        let p = presses(Press::Short, Press::No, Press::No, Press::Short);
        assert_eq!(
            resolve_intent(Intent::StartAuto, &p, Arbitration::Suppress),
            Intent::Stop
        );
        assert_eq!(
            resolve_intent(Intent::StartAuto, &p, Arbitration::Layered),
            Intent::StartManu
        );
    }
}
