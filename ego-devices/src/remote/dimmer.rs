//! Screen dimmer
//!
//! After `awake_period` quiet ticks the backlight steps down from the
//! maximum to [`MIN_BRIGHTNESS`], one level every `step_period` ticks. A
//! button gesture or an intent change wakes the screen up again. The gesture
//! that wakes a dimmed screen is swallowed.

use ego_core::combinators::{
    action, delay, forever, par, pause, repeat, seq, strong, sustain, when_abort, when_reset,
    Halt,
};
use ego_core::Activity;
use ego_protocol::Press;
use log::debug;

use super::RemoteEnv;
use crate::config::{DimmerConfig, MIN_BRIGHTNESS};

/// Number of levels the dim-down passes through, both ends included
pub fn dim_steps(config: &DimmerConfig) -> u32 {
    if config.max_brightness < MIN_BRIGHTNESS {
        0
    } else {
        u32::from(config.max_brightness - MIN_BRIGHTNESS) + 1
    }
}

fn wakeup(env: &RemoteEnv) -> bool {
    env.raw_press != Press::No || env.intent_changed
}

fn dim_down(config: DimmerConfig) -> impl Activity<RemoteEnv> {
    seq((
        action(move |env: &mut RemoteEnv| env.dim_level = config.max_brightness),
        repeat(
            dim_steps(&config),
            seq((
                action(|env: &mut RemoteEnv| env.set_brightness(env.dim_level)),
                delay(config.step_period),
                action(|env: &mut RemoteEnv| env.dim_level = env.dim_level.saturating_sub(1)),
            )),
        ),
        Halt::new(),
    ))
}

fn dim_controller(config: DimmerConfig) -> impl Activity<RemoteEnv> {
    forever(seq((
        when_reset(wakeup, delay(config.awake_period)),
        action(|env: &mut RemoteEnv| {
            debug!("dimming screen");
            env.dimmed = true;
        }),
        when_abort(wakeup, dim_down(config)),
        action(move |env: &mut RemoteEnv| env.set_brightness(config.max_brightness)),
        pause(),
        action(|env: &mut RemoteEnv| env.dimmed = false),
    )))
}

fn press_copy() -> impl Activity<RemoteEnv> {
    sustain(|env: &mut RemoteEnv| {
        env.press = if env.dimmed { Press::No } else { env.raw_press };
    })
}

pub(super) fn dimmer(config: DimmerConfig) -> impl Activity<RemoteEnv> {
    par((strong(dim_controller(config)), strong(press_copy())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use std::vec::Vec;

    fn env() -> RemoteEnv {
        RemoteEnv::new(RemoteConfig::default(), true)
    }

    fn config() -> DimmerConfig {
        DimmerConfig {
            max_brightness: 10,
            awake_period: 3,
            step_period: 2,
        }
    }

    #[test]
    fn test_dim_steps() {
        assert_eq!(dim_steps(&DimmerConfig::default()), 4);
        let dark = DimmerConfig {
            max_brightness: 5,
            ..DimmerConfig::default()
        };
        assert_eq!(dim_steps(&dark), 0);
    }

    #[test]
    fn test_dims_down_after_awake_period() {
        let mut env = env();
        let mut d = dimmer(config());
        let mut levels = Vec::new();
        for _ in 0..14 {
            env.out.brightness = None;
            d.tick(&mut env);
            levels.push(env.out.brightness);
        }
        assert_eq!(
            levels,
            [
                None,
                None,
                None,
                Some(10),
                None,
                Some(9),
                None,
                Some(8),
                None,
                Some(7),
                None,
                None,
                None,
                None
            ]
        );
        assert!(env.dimmed);
    }

    #[test]
    fn test_waking_press_is_swallowed() {
        let mut env = env();
        let mut d = dimmer(config());
        for _ in 0..4 {
            d.tick(&mut env);
        }
        assert!(env.dimmed);

        env.raw_press = Press::Short;
        env.out.brightness = None;
        d.tick(&mut env);
        assert_eq!(env.press, Press::No);
        assert_eq!(env.out.brightness, Some(10));

        env.raw_press = Press::No;
        d.tick(&mut env);
        assert!(!env.dimmed);

        env.raw_press = Press::Double;
        d.tick(&mut env);
        assert_eq!(env.press, Press::Double);
    }

    #[test]
    fn test_activity_keeps_screen_awake() {
        let mut env = env();
        let mut d = dimmer(config());
        for tick in 0..20 {
            env.intent_changed = tick % 2 == 0;
            d.tick(&mut env);
            assert!(!env.dimmed);
        }
    }
}
