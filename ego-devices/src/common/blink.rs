//! Blinking status LED

use ego_core::combinators::{action, delay, forever, seq};
use ego_core::Activity;

use crate::config::BlinkPattern;
use crate::traits::Rgb;

/// Environments with a single status LED
pub trait StatusLight {
    /// Show `color` on the status LED from this tick on
    fn set_status_led(&mut self, color: Rgb);
}

/// Blink the status LED with `color` forever
///
/// Each phase lasts at least one tick.
pub fn blink<E: StatusLight>(color: Rgb, pattern: BlinkPattern) -> impl Activity<E> {
    forever(seq((
        action(move |env: &mut E| env.set_status_led(color)),
        delay(pattern.on_ticks.max(1)),
        action(|env: &mut E| env.set_status_led(Rgb::BLACK)),
        delay(pattern.off_ticks.max(1)),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Env {
        led: Option<Rgb>,
    }

    impl StatusLight for Env {
        fn set_status_led(&mut self, color: Rgb) {
            self.led = Some(color);
        }
    }

    #[test]
    fn test_blink_pattern() {
        let mut env = Env::default();
        let mut b = blink::<Env>(Rgb::ORANGE, BlinkPattern::new(2, 3));
        let mut trace = std::vec::Vec::new();
        for _ in 0..10 {
            env.led = None;
            b.tick(&mut env);
            trace.push(env.led);
        }
        let on = Some(Rgb::ORANGE);
        let off = Some(Rgb::BLACK);
        assert_eq!(
            trace,
            [on, None, off, None, None, on, None, off, None, None]
        );
    }
}
