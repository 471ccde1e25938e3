//! Strong/weak parallel composition
//!
//! All branches are ticked once per tick in declaration order, which is the
//! tie-break for same-tick writes: later branches see what earlier branches
//! wrote in this tick, earlier branches see the later branches' writes on the
//! next tick.
//!
//! The group ends in the first tick in which every strong branch has
//! terminated. Weak branches still running at that point are abandoned where
//! they are. A group without strong branches never ends on its own.

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

/// One branch of a parallel group, classified at construction
pub struct Arm<A> {
    body: A,
    strong: bool,
    done: bool,
}

/// Branch whose termination is required for the group to end
pub fn strong<A>(body: A) -> Arm<A> {
    Arm {
        body,
        strong: true,
        done: false,
    }
}

/// Branch that is abandoned when the strong branches are done
pub fn weak<A>(body: A) -> Arm<A> {
    Arm {
        body,
        strong: false,
        done: false,
    }
}

impl<A> Arm<A> {
    /// Check if this branch is strong
    pub fn is_strong(&self) -> bool {
        self.strong
    }

    /// Check if this branch terminated on its own
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Tick the body unless it already terminated, returns `true` once done
    fn step<E: ?Sized>(&mut self, env: &mut E) -> bool
    where
        A: Activity<E>,
    {
        if !self.done && self.body.tick(env).is_terminated() {
            self.done = true;
        }
        self.done
    }
}

impl<A: Node> Node for Arm<A> {
    fn kind(&self) -> NodeKind {
        if self.strong {
            NodeKind::Strong
        } else {
            NodeKind::Weak
        }
    }

    fn resume_point(&self) -> ResumePoint {
        self.body.resume_point()
    }

    fn reset(&mut self) {
        self.body.reset();
        self.done = false;
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
        visit(&self.body);
    }
}

/// Parallel group over a tuple of [`Arm`]s
pub struct Par<T> {
    arms: T,
    point: ResumePoint,
}

/// Parallel group of 1 to 10 branches built with [`strong`] and [`weak`]
pub fn par<T>(arms: T) -> Par<T> {
    Par {
        arms,
        point: ResumePoint::NotStarted,
    }
}

impl<T> Par<T> {
    /// Access the branches
    pub fn arms(&self) -> &T {
        &self.arms
    }
}

macro_rules! par_impl {
    ($($idx:tt $T:ident),+) => {
        impl<$($T: Node),+> Node for Par<($(Arm<$T>,)+)> {
            fn kind(&self) -> NodeKind {
                NodeKind::Par
            }

            fn resume_point(&self) -> ResumePoint {
                self.point
            }

            fn reset(&mut self) {
                $(self.arms.$idx.reset();)+
                self.point = ResumePoint::NotStarted;
            }

            fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
                $(visit(&self.arms.$idx);)+
            }
        }

        impl<Env: ?Sized, $($T: Activity<Env>),+> Activity<Env> for Par<($(Arm<$T>,)+)> {
            fn tick(&mut self, env: &mut Env) -> Status {
                match self.point {
                    ResumePoint::Terminated => return Status::Terminated,
                    ResumePoint::NotStarted => {
                        $(self.arms.$idx.reset();)+
                    }
                    ResumePoint::At(_) => {}
                }
                let mut strong = 0usize;
                let mut strong_done = 0usize;
                $(
                    let done = self.arms.$idx.step(env);
                    if self.arms.$idx.strong {
                        strong += 1;
                        if done {
                            strong_done += 1;
                        }
                    }
                )+
                if strong > 0 && strong_done == strong {
                    self.point = ResumePoint::Terminated;
                    Status::Terminated
                } else {
                    self.point = ResumePoint::At(0);
                    Status::Suspended
                }
            }
        }
    };
}

par_impl!(0 A);
par_impl!(0 A, 1 B);
par_impl!(0 A, 1 B, 2 C);
par_impl!(0 A, 1 B, 2 C, 3 D);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F, 5 G);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H, 7 I);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H, 7 I, 8 J);
par_impl!(0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H, 7 I, 8 J, 9 K);
