//! Loops and branches

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

use super::suspend::Nothing;

/// Restart the body every time it terminates
pub struct Loop<A> {
    body: A,
    point: ResumePoint,
    iterations: u32,
}

/// Repeat `body` forever
///
/// # Panics
///
/// Ticking panics if the body runs a whole iteration without suspending
/// (instantaneous loop).
pub fn forever<A>(body: A) -> Loop<A> {
    Loop {
        body,
        point: ResumePoint::NotStarted,
        iterations: 0,
    }
}

impl<A> Loop<A> {
    /// Completed iterations since entry
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl<A: Node> Node for Loop<A> {
    fn kind(&self) -> NodeKind {
        NodeKind::Loop
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.body.reset();
        self.point = ResumePoint::NotStarted;
        self.iterations = 0;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

impl<E: ?Sized, A: Activity<E>> Activity<E> for Loop<A> {
    fn tick(&mut self, env: &mut E) -> Status {
        if self.point == ResumePoint::NotStarted {
            self.body.reset();
            self.iterations = 0;
        }
        self.point = ResumePoint::At(0);
        let mut restarted = false;
        loop {
            if self.body.tick(env).is_suspended() {
                return Status::Suspended;
            }
            if restarted {
                panic!("instantaneous loop: body terminated without suspending");
            }
            restarted = true;
            self.iterations = self.iterations.wrapping_add(1);
            self.body.reset();
        }
    }
}

/// Loop while a condition holds at the start of each iteration
pub struct While<G, A> {
    cond: G,
    body: A,
    point: ResumePoint,
    in_body: bool,
}

/// Run `body` as long as `cond` holds when an iteration starts
///
/// # Panics
///
/// Ticking panics on an instantaneous loop, like [`forever`].
pub fn while_loop<E: ?Sized, G: FnMut(&E) -> bool, A>(cond: G, body: A) -> While<G, A> {
    While {
        cond,
        body,
        point: ResumePoint::NotStarted,
        in_body: false,
    }
}

impl<G, A: Node> Node for While<G, A> {
    fn kind(&self) -> NodeKind {
        NodeKind::While
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.body.reset();
        self.point = ResumePoint::NotStarted;
        self.in_body = false;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

impl<E: ?Sized, G: FnMut(&E) -> bool, A: Activity<E>> Activity<E> for While<G, A> {
    fn tick(&mut self, env: &mut E) -> Status {
        match self.point {
            ResumePoint::Terminated => return Status::Terminated,
            ResumePoint::NotStarted => self.in_body = false,
            ResumePoint::At(_) => {}
        }
        let mut finished_one = false;
        loop {
            if !self.in_body {
                if !(self.cond)(env) {
                    self.point = ResumePoint::Terminated;
                    return Status::Terminated;
                }
                self.body.reset();
                self.in_body = true;
            }
            if self.body.tick(env).is_suspended() {
                self.point = ResumePoint::At(0);
                return Status::Suspended;
            }
            if finished_one {
                panic!("instantaneous loop: body terminated without suspending");
            }
            finished_one = true;
            self.in_body = false;
        }
    }
}

/// Run the body a fixed number of times
///
/// Bounded, so iterations without suspension are allowed.
pub struct Repeat<A> {
    body: A,
    times: u32,
    done: u32,
    point: ResumePoint,
}

/// Run `body` `times` times in a row
pub fn repeat<A>(times: u32, body: A) -> Repeat<A> {
    Repeat {
        body,
        times,
        done: 0,
        point: ResumePoint::NotStarted,
    }
}

impl<A> Repeat<A> {
    /// Completed iterations since entry
    pub fn completed(&self) -> u32 {
        self.done
    }
}

impl<A: Node> Node for Repeat<A> {
    fn kind(&self) -> NodeKind {
        NodeKind::Repeat
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.body.reset();
        self.done = 0;
        self.point = ResumePoint::NotStarted;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

impl<E: ?Sized, A: Activity<E>> Activity<E> for Repeat<A> {
    fn tick(&mut self, env: &mut E) -> Status {
        match self.point {
            ResumePoint::Terminated => return Status::Terminated,
            ResumePoint::NotStarted => {
                self.done = 0;
                self.body.reset();
            }
            ResumePoint::At(_) => {}
        }
        while self.done < self.times {
            if self.body.tick(env).is_suspended() {
                self.point = ResumePoint::At(0);
                return Status::Suspended;
            }
            self.done += 1;
            self.body.reset();
        }
        self.point = ResumePoint::Terminated;
        Status::Terminated
    }
}

/// If/else, the condition is evaluated once when the branch is entered
pub struct Branch<G, A, B> {
    cond: G,
    then: A,
    otherwise: B,
    taken: Option<bool>,
    point: ResumePoint,
}

/// Run `then` if `cond` holds on entry, `otherwise` if not
pub fn branch<E: ?Sized, G: FnMut(&E) -> bool, A, B>(
    cond: G,
    then: A,
    otherwise: B,
) -> Branch<G, A, B> {
    Branch {
        cond,
        then,
        otherwise,
        taken: None,
        point: ResumePoint::NotStarted,
    }
}

/// Run `then` only if `cond` holds on entry
pub fn only_if<E: ?Sized, G: FnMut(&E) -> bool, A>(cond: G, then: A) -> Branch<G, A, Nothing> {
    branch(cond, then, Nothing)
}

impl<G, A: Node, B: Node> Node for Branch<G, A, B> {
    fn kind(&self) -> NodeKind {
        NodeKind::Branch
    }

    fn resume_point(&self) -> ResumePoint {
        self.point
    }

    fn reset(&mut self) {
        self.then.reset();
        self.otherwise.reset();
        self.taken = None;
        self.point = ResumePoint::NotStarted;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.then);
        visit(&self.otherwise);
    }
}

impl<E: ?Sized, G: FnMut(&E) -> bool, A: Activity<E>, B: Activity<E>> Activity<E>
    for Branch<G, A, B>
{
    fn tick(&mut self, env: &mut E) -> Status {
        let taken = match (self.point, self.taken) {
            (ResumePoint::Terminated, _) => return Status::Terminated,
            (ResumePoint::At(_), Some(taken)) => taken,
            _ => {
                let taken = (self.cond)(env);
                if taken {
                    self.then.reset();
                } else {
                    self.otherwise.reset();
                }
                self.taken = Some(taken);
                taken
            }
        };
        let status = if taken {
            self.then.tick(env)
        } else {
            self.otherwise.tick(env)
        };
        self.point = match status {
            Status::Suspended => ResumePoint::At(if taken { 0 } else { 1 }),
            Status::Terminated => ResumePoint::Terminated,
        };
        status
    }
}
