//! Preemption: abort and reset on a condition
//!
//! The guard is evaluated at the start of every tick in which the block
//! resumes, before the body runs. It is not evaluated on the tick the block
//! is entered, so `loop { when_abort(pressed, a); when_abort(pressed, b) }`
//! does not spin within one tick while the press is visible.

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

/// Abort the body when the guard holds
pub struct Abort<G, A> {
    guard: G,
    body: A,
    point: ResumePoint,
    aborted: bool,
}

/// Run `body` until it terminates or `guard` becomes true
///
/// On abort the body is not ticked at all in that tick, it is reset to
/// `NotStarted` and the block terminates so the enclosing sequence continues
/// within the same tick.
pub fn when_abort<E: ?Sized, G: FnMut(&E) -> bool, A>(guard: G, body: A) -> Abort<G, A> {
    Abort {
        guard,
        body,
        point: ResumePoint::NotStarted,
        aborted: false,
    }
}

impl<G, A> Abort<G, A> {
    /// Check if the last run ended through the guard
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }
}

impl<G, A: Node> Node for Abort<G, A> {
    fn kind(&self) -> NodeKind {
        NodeKind::Abort
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.body.reset();
        self.point = ResumePoint::NotStarted;
        self.aborted = false;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

impl<E: ?Sized, G: FnMut(&E) -> bool, A: Activity<E>> Activity<E> for Abort<G, A> {
    fn tick(&mut self, env: &mut E) -> Status {
        match self.point {
            ResumePoint::Terminated => return Status::Terminated,
            ResumePoint::NotStarted => {
                self.body.reset();
                self.aborted = false;
            }
            ResumePoint::At(_) => {
                if (self.guard)(env) {
                    self.body.reset();
                    self.aborted = true;
                    self.point = ResumePoint::Terminated;
                    return Status::Terminated;
                }
            }
        }
        let status = self.body.tick(env);
        self.point = match status {
            Status::Suspended => ResumePoint::At(0),
            Status::Terminated => ResumePoint::Terminated,
        };
        status
    }
}

/// Restart the body whenever the guard holds
pub struct Reset<G, A> {
    guard: G,
    body: A,
    point: ResumePoint,
    restarts: u32,
}

/// Run `body`; whenever `guard` is true it is reset and ticked afresh in the
/// same tick
///
/// The block terminates when the body terminates.
pub fn when_reset<E: ?Sized, G: FnMut(&E) -> bool, A>(guard: G, body: A) -> Reset<G, A> {
    Reset {
        guard,
        body,
        point: ResumePoint::NotStarted,
        restarts: 0,
    }
}

impl<G, A> Reset<G, A> {
    /// Number of guard-triggered restarts since the block was entered
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl<G, A: Node> Node for Reset<G, A> {
    fn kind(&self) -> NodeKind {
        NodeKind::Reset
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.body.reset();
        self.point = ResumePoint::NotStarted;
        self.restarts = 0;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

impl<E: ?Sized, G: FnMut(&E) -> bool, A: Activity<E>> Activity<E> for Reset<G, A> {
    fn tick(&mut self, env: &mut E) -> Status {
        match self.point {
            ResumePoint::Terminated => return Status::Terminated,
            ResumePoint::NotStarted => {
                self.body.reset();
                self.restarts = 0;
            }
            ResumePoint::At(_) => {
                if (self.guard)(env) {
                    self.body.reset();
                    self.restarts = self.restarts.saturating_add(1);
                }
            }
        }
        let status = self.body.tick(env);
        self.point = match status {
            Status::Suspended => ResumePoint::At(0),
            Status::Terminated => ResumePoint::Terminated,
        };
        status
    }
}
