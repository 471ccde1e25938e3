//! Leaf statements: instantaneous actions and suspension points

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

/// Instantaneous statement, runs once on entry and terminates
pub struct Action<F> {
    run: F,
    done: bool,
}

/// Run `run` once and terminate in the same tick
pub fn action<E: ?Sized, F: FnMut(&mut E)>(run: F) -> Action<F> {
    Action { run, done: false }
}

impl<F> Node for Action<F> {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn resume_point(&self) -> ResumePoint {
        if self.done {
            ResumePoint::Terminated
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.done = false;
    }
}

impl<E: ?Sized, F: FnMut(&mut E)> Activity<E> for Action<F> {
    fn tick(&mut self, env: &mut E) -> Status {
        if !self.done {
            (self.run)(env);
            self.done = true;
        }
        Status::Terminated
    }
}

/// Empty statement
#[derive(Debug, Clone, Copy, Default)]
pub struct Nothing;

impl Node for Nothing {
    fn kind(&self) -> NodeKind {
        NodeKind::Nothing
    }

    fn resume_point(&self) -> ResumePoint {
        ResumePoint::NotStarted
    }

    fn reset(&mut self) {}
}

impl<E: ?Sized> Activity<E> for Nothing {
    fn tick(&mut self, _env: &mut E) -> Status {
        Status::Terminated
    }
}

/// Suspend until a condition holds
///
/// The condition is also checked on the entry tick, so an await whose
/// condition already holds costs no time.
pub struct Await<G> {
    cond: G,
    point: ResumePoint,
}

/// Suspend until `cond` is true
pub fn await_until<E: ?Sized, G: FnMut(&E) -> bool>(cond: G) -> Await<G> {
    Await {
        cond,
        point: ResumePoint::NotStarted,
    }
}

impl<G> Node for Await<G> {
    fn kind(&self) -> NodeKind {
        NodeKind::Await
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.point = ResumePoint::NotStarted;
    }
}

impl<E: ?Sized, G: FnMut(&E) -> bool> Activity<E> for Await<G> {
    fn tick(&mut self, env: &mut E) -> Status {
        if self.point == ResumePoint::Terminated {
            return Status::Terminated;
        }
        if (self.cond)(env) {
            self.point = ResumePoint::Terminated;
            Status::Terminated
        } else {
            self.point = ResumePoint::At(0);
            Status::Suspended
        }
    }
}

/// Suspend for exactly one tick
#[derive(Debug, Clone, Copy)]
pub struct Pause {
    point: ResumePoint,
}

/// Suspend for exactly one tick
pub fn pause() -> Pause {
    Pause {
        point: ResumePoint::NotStarted,
    }
}

impl Node for Pause {
    fn kind(&self) -> NodeKind {
        NodeKind::Pause
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.point = ResumePoint::NotStarted;
    }
}

impl<E: ?Sized> Activity<E> for Pause {
    fn tick(&mut self, _env: &mut E) -> Status {
        match self.point {
            ResumePoint::NotStarted => {
                self.point = ResumePoint::At(0);
                Status::Suspended
            }
            _ => {
                self.point = ResumePoint::Terminated;
                Status::Terminated
            }
        }
    }
}

/// Suspend for a fixed number of ticks
///
/// `Delay` of `n` behaves like `n` consecutive pauses: entered on tick `t`,
/// it terminates on tick `t + n`. A zero delay terminates on entry.
#[derive(Debug, Clone, Copy)]
pub struct Delay {
    ticks: u32,
    remaining: u32,
    point: ResumePoint,
}

/// Suspend for `ticks` ticks
pub fn delay(ticks: u32) -> Delay {
    Delay {
        ticks,
        remaining: 0,
        point: ResumePoint::NotStarted,
    }
}

impl Delay {
    /// Ticks left before the delay terminates
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Node for Delay {
    fn kind(&self) -> NodeKind {
        NodeKind::Delay
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.remaining = 0;
        self.point = ResumePoint::NotStarted;
    }
}

impl<E: ?Sized> Activity<E> for Delay {
    fn tick(&mut self, _env: &mut E) -> Status {
        match self.point {
            ResumePoint::Terminated => return Status::Terminated,
            ResumePoint::NotStarted => self.remaining = self.ticks,
            ResumePoint::At(_) => {}
        }
        if self.remaining == 0 {
            self.point = ResumePoint::Terminated;
            Status::Terminated
        } else {
            self.remaining -= 1;
            self.point = ResumePoint::At(0);
            Status::Suspended
        }
    }
}

/// Park forever
///
/// Never terminates; only an enclosing preemption or an ending parallel
/// group removes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Halt {
    parked: bool,
}

impl Halt {
    pub fn new() -> Self {
        Self { parked: false }
    }
}

impl Node for Halt {
    fn kind(&self) -> NodeKind {
        NodeKind::Halt
    }

    fn resume_point(&self) -> ResumePoint {
        if self.parked {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.parked = false;
    }
}

impl<E: ?Sized> Activity<E> for Halt {
    fn tick(&mut self, _env: &mut E) -> Status {
        self.parked = true;
        Status::Suspended
    }
}

/// Run a body every tick, starting with the entry tick, forever
pub struct Sustain<F> {
    body: F,
    running: bool,
}

/// Run `body` on every tick the node is active
pub fn sustain<E: ?Sized, F: FnMut(&mut E)>(body: F) -> Sustain<F> {
    Sustain {
        body,
        running: false,
    }
}

impl<F> Node for Sustain<F> {
    fn kind(&self) -> NodeKind {
        NodeKind::Sustain
    }

    fn resume_point(&self) -> ResumePoint {
        if self.running {
            ResumePoint::At(0)
        } else {
            ResumePoint::NotStarted
        }
    }

    fn reset(&mut self) {
        self.running = false;
    }
}

impl<E: ?Sized, F: FnMut(&mut E)> Activity<E> for Sustain<F> {
    fn tick(&mut self, env: &mut E) -> Status {
        (self.body)(env);
        self.running = true;
        Status::Suspended
    }
}
