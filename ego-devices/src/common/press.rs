//! Press gesture recognition
//!
//! Turns a debounced button level into one-tick press gestures:
//!
//! ```text
//! Idle --press--> Held --release--> Released --gap over--> Idle  (SHORT)
//!                  |                   |
//!                  | held long         +--press--> SecondHeld --release--> Idle  (DOUBLE)
//!                  v
//!             AwaitRelease --release--> Idle                             (LONG when entered)
//! ```

use ego_core::{Activity, Node, NodeKind, ResumePoint, Status};
use ego_protocol::Press;

use crate::config::PressTiming;

/// Recognizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Button up, nothing pending
    Idle,
    /// Button down for the given number of ticks
    Held(u16),
    /// Released for the given number of ticks, a second press may follow
    Released(u16),
    /// Second press of a double press is down
    SecondHeld,
    /// Long press reported, waiting for the release
    AwaitRelease,
}

impl Phase {
    /// Advance by one tick with the current button level
    ///
    /// Returns the next phase and the gesture recognized in this tick.
    pub fn step(self, pressed: bool, timing: &PressTiming) -> (Phase, Press) {
        match (self, pressed) {
            (Phase::Idle, false) => (Phase::Idle, Press::No),
            (Phase::Idle, true) => Self::held(1, timing),
            (Phase::Held(ticks), true) => Self::held(ticks.saturating_add(1), timing),
            (Phase::Held(_), false) => (Phase::Released(0), Press::No),
            (Phase::Released(_), true) => (Phase::SecondHeld, Press::No),
            (Phase::Released(ticks), false) => {
                let ticks = ticks.saturating_add(1);
                if ticks >= timing.double_gap_ticks {
                    (Phase::Idle, Press::Short)
                } else {
                    (Phase::Released(ticks), Press::No)
                }
            }
            (Phase::SecondHeld, true) => (Phase::SecondHeld, Press::No),
            (Phase::SecondHeld, false) => (Phase::Idle, Press::Double),
            (Phase::AwaitRelease, true) => (Phase::AwaitRelease, Press::No),
            (Phase::AwaitRelease, false) => (Phase::Idle, Press::No),
        }
    }

    fn held(ticks: u16, timing: &PressTiming) -> (Phase, Press) {
        if ticks >= timing.long_ticks {
            (Phase::AwaitRelease, Press::Long)
        } else {
            (Phase::Held(ticks), Press::No)
        }
    }
}

/// Recognizes gestures on one button, writing a press every tick
pub struct PressRecognizer<R, W> {
    timing: PressTiming,
    read: R,
    write: W,
    phase: Phase,
    running: bool,
}

/// Recognize gestures on the level `read` returns, report them via `write`
pub fn press_recognizer<E: ?Sized, R, W>(
    timing: PressTiming,
    read: R,
    write: W,
) -> PressRecognizer<R, W>
where
    R: FnMut(&E) -> bool,
    W: FnMut(&mut E, Press),
{
    PressRecognizer {
        timing,
        read,
        write,
        phase: Phase::Idle,
        running: false,
    }
}

impl<R, W> PressRecognizer<R, W> {
    /// Current recognizer state
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R, W> Node for PressRecognizer<R, W> {
    fn kind(&self) -> NodeKind {
        NodeKind::Custom("PressRecognizer")
    }

    fn resume_point(&self) -> ResumePoint {
        if self.running {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.running = false;
    }
}

impl<E: ?Sized, R, W> Activity<E> for PressRecognizer<R, W>
where
    R: FnMut(&E) -> bool,
    W: FnMut(&mut E, Press),
{
    fn tick(&mut self, env: &mut E) -> Status {
        let (phase, press) = self.phase.step((self.read)(env), &self.timing);
        self.phase = phase;
        self.running = true;
        (self.write)(env, press);
        Status::Suspended
    }
}

/// Recognizes gestures on two buttons and merges them into one press
///
/// The first button wins when both complete a gesture in the same tick.
pub struct DualPressRecognizer<R1, R2, W> {
    timing: PressTiming,
    first: R1,
    second: R2,
    write: W,
    phases: (Phase, Phase),
    running: bool,
}

/// Merge the gestures of two buttons into one press signal
pub fn dual_press_recognizer<E: ?Sized, R1, R2, W>(
    timing: PressTiming,
    first: R1,
    second: R2,
    write: W,
) -> DualPressRecognizer<R1, R2, W>
where
    R1: FnMut(&E) -> bool,
    R2: FnMut(&E) -> bool,
    W: FnMut(&mut E, Press),
{
    DualPressRecognizer {
        timing,
        first,
        second,
        write,
        phases: (Phase::Idle, Phase::Idle),
        running: false,
    }
}

impl<R1, R2, W> Node for DualPressRecognizer<R1, R2, W> {
    fn kind(&self) -> NodeKind {
        NodeKind::Custom("DualPressRecognizer")
    }

    fn resume_point(&self) -> ResumePoint {
        if self.running {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.phases = (Phase::Idle, Phase::Idle);
        self.running = false;
    }
}

impl<E: ?Sized, R1, R2, W> Activity<E> for DualPressRecognizer<R1, R2, W>
where
    R1: FnMut(&E) -> bool,
    R2: FnMut(&E) -> bool,
    W: FnMut(&mut E, Press),
{
    fn tick(&mut self, env: &mut E) -> Status {
        let (first, first_press) = self.phases.0.step((self.first)(env), &self.timing);
        let (second, second_press) = self.phases.1.step((self.second)(env), &self.timing);
        self.phases = (first, second);
        self.running = true;
        let press = if first_press.is_some() {
            first_press
        } else {
            second_press
        };
        (self.write)(env, press);
        Status::Suspended
    }
}
