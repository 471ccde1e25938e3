//! Reusable signal activities
//!
//! Small never-ending activities that derive one signal from another. They
//! read and write the environment through accessor closures, so the same
//! activity works on any device environment.

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

/// Writes `true` for exactly one tick when the input goes from low to high
pub struct RisingEdge<R, W> {
    read: R,
    write: W,
    prev: bool,
    running: bool,
}

/// Detect rising edges of `read` and report them through `write`
pub fn rising_edge<E: ?Sized, R, W>(read: R, write: W) -> RisingEdge<R, W>
where
    R: FnMut(&E) -> bool,
    W: FnMut(&mut E, bool),
{
    RisingEdge {
        read,
        write,
        prev: false,
        running: false,
    }
}

impl<R, W> Node for RisingEdge<R, W> {
    fn kind(&self) -> NodeKind {
        NodeKind::Custom("RisingEdge")
    }

    fn resume_point(&self) -> ResumePoint {
        if self.running {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.prev = false;
        self.running = false;
    }
}

impl<E: ?Sized, R, W> Activity<E> for RisingEdge<R, W>
where
    R: FnMut(&E) -> bool,
    W: FnMut(&mut E, bool),
{
    fn tick(&mut self, env: &mut E) -> Status {
        let level = (self.read)(env);
        (self.write)(env, level && !self.prev);
        self.prev = level;
        self.running = true;
        Status::Suspended
    }
}

/// Writes `true` in every tick in which the input differs from the previous
/// tick
///
/// The value seen on entry is the baseline, so entering never reports a
/// change.
pub struct ChangeDetector<T, R, W> {
    read: R,
    write: W,
    prev: Option<T>,
}

/// Report changes of `read` through `write`
pub fn change_detector<E: ?Sized, T, R, W>(read: R, write: W) -> ChangeDetector<T, R, W>
where
    T: PartialEq + Copy,
    R: FnMut(&E) -> T,
    W: FnMut(&mut E, bool),
{
    ChangeDetector {
        read,
        write,
        prev: None,
    }
}

impl<T, R, W> Node for ChangeDetector<T, R, W> {
    fn kind(&self) -> NodeKind {
        NodeKind::Custom("ChangeDetector")
    }

    fn resume_point(&self) -> ResumePoint {
        if self.prev.is_some() {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.prev = None;
    }
}

impl<E: ?Sized, T, R, W> Activity<E> for ChangeDetector<T, R, W>
where
    T: PartialEq + Copy,
    R: FnMut(&E) -> T,
    W: FnMut(&mut E, bool),
{
    fn tick(&mut self, env: &mut E) -> Status {
        let value = (self.read)(env);
        let changed = matches!(self.prev, Some(prev) if prev != value);
        (self.write)(env, changed);
        self.prev = Some(value);
        Status::Suspended
    }
}

/// Runs an effect on entry and again every time the value changes
///
/// This is the "publish, remember, await a different value" loop that every
/// publisher and actuator uses. Never terminates.
pub struct OnChange<T, R, F> {
    read: R,
    effect: F,
    last: Option<T>,
    name: &'static str,
}

/// Run `effect` with the current value of `read` on entry and on every change
pub fn on_change<E: ?Sized, T, R, F>(name: &'static str, read: R, effect: F) -> OnChange<T, R, F>
where
    T: PartialEq + Copy,
    R: FnMut(&E) -> T,
    F: FnMut(&mut E, T),
{
    OnChange {
        read,
        effect,
        last: None,
        name,
    }
}

impl<T: Copy, R, F> OnChange<T, R, F> {
    /// Value the effect last ran with
    pub fn last(&self) -> Option<T> {
        self.last
    }
}

impl<T, R, F> Node for OnChange<T, R, F> {
    fn kind(&self) -> NodeKind {
        NodeKind::Custom(self.name)
    }

    fn resume_point(&self) -> ResumePoint {
        if self.last.is_some() {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

impl<E: ?Sized, T, R, F> Activity<E> for OnChange<T, R, F>
where
    T: PartialEq + Copy,
    R: FnMut(&E) -> T,
    F: FnMut(&mut E, T),
{
    fn tick(&mut self, env: &mut E) -> Status {
        let value = (self.read)(env);
        if self.last != Some(value) {
            (self.effect)(env, value);
            self.last = Some(value);
        }
        Status::Suspended
    }
}
