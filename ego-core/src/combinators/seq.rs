//! Sequential composition

use crate::activity::{Activity, Node, NodeKind, ResumePoint, Status};

/// Run a tuple of activities one after the other
///
/// When a step terminates the next one is entered within the same tick.
/// The sequence terminates when its last step does.
pub struct Seq<T> {
    steps: T,
    cursor: usize,
    point: ResumePoint,
}

/// Sequence of 2 to 8 activities
pub fn seq<T>(steps: T) -> Seq<T> {
    Seq {
        steps,
        cursor: 0,
        point: ResumePoint::NotStarted,
    }
}

impl<T> Seq<T> {
    /// Index of the step that runs next
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

macro_rules! seq_impl {
    ($len:expr; $($idx:tt $T:ident),+) => {
        impl<$($T: Node),+> Node for Seq<($($T,)+)> {
            fn kind(&self) -> NodeKind {
                NodeKind::Seq
            }

            fn resume_point(&self) -> ResumePoint {
                self.point
            }

            fn reset(&mut self) {
                $(self.steps.$idx.reset();)+
                self.cursor = 0;
                self.point = ResumePoint::NotStarted;
            }

            fn for_each_child(&self, visit: &mut dyn FnMut(&dyn Node)) {
                $(visit(&self.steps.$idx);)+
            }
        }

        impl<Env: ?Sized, $($T: Activity<Env>),+> Activity<Env> for Seq<($($T,)+)> {
            fn tick(&mut self, env: &mut Env) -> Status {
                match self.point {
                    ResumePoint::Terminated => return Status::Terminated,
                    ResumePoint::NotStarted => {
                        self.cursor = 0;
                        self.steps.0.reset();
                    }
                    ResumePoint::At(_) => {}
                }
                loop {
                    let status = match self.cursor {
                        $($idx => self.steps.$idx.tick(env),)+
                        _ => unreachable!("sequence cursor past the last step"),
                    };
                    if status.is_suspended() {
                        self.point = ResumePoint::At(self.cursor as u8);
                        return Status::Suspended;
                    }
                    self.cursor += 1;
                    if self.cursor == $len {
                        self.point = ResumePoint::Terminated;
                        return Status::Terminated;
                    }
                    match self.cursor {
                        $($idx => self.steps.$idx.reset(),)+
                        _ => {}
                    }
                }
            }
        }
    };
}

seq_impl!(2; 0 A, 1 B);
seq_impl!(3; 0 A, 1 B, 2 C);
seq_impl!(4; 0 A, 1 B, 2 C, 3 D);
seq_impl!(5; 0 A, 1 B, 2 C, 3 D, 4 F);
seq_impl!(6; 0 A, 1 B, 2 C, 3 D, 4 F, 5 G);
seq_impl!(7; 0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H);
seq_impl!(8; 0 A, 1 B, 2 C, 3 D, 4 F, 5 G, 6 H, 7 I);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{action, await_until, pause};

    #[derive(Default)]
    struct Env {
        go: bool,
        trace: heapless::Vec<u8, 16>,
    }

    fn mark(n: u8) -> impl FnMut(&mut Env) {
        move |env: &mut Env| {
            let _ = env.trace.push(n);
        }
    }

    #[test]
    fn test_steps_run_in_order_within_one_tick() {
        let mut env = Env::default();
        let mut s = seq((action(mark(1)), action(mark(2)), action(mark(3))));

        assert_eq!(s.tick(&mut env), Status::Terminated);
        assert_eq!(env.trace.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_await_continues_in_the_same_tick() {
        let mut env = Env::default();
        let mut s = seq((
            action(mark(1)),
            await_until(|env: &Env| env.go),
            action(mark(2)),
        ));

        for _ in 0..3 {
            assert_eq!(s.tick(&mut env), Status::Suspended);
        }
        assert_eq!(env.trace.as_slice(), &[1]);
        assert_eq!(s.cursor(), 1);

        env.go = true;
        assert_eq!(s.tick(&mut env), Status::Terminated);
        assert_eq!(env.trace.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_pause_splits_ticks() {
        let mut env = Env::default();
        let mut s = seq((action(mark(1)), pause(), action(mark(2))));

        assert_eq!(s.tick(&mut env), Status::Suspended);
        assert_eq!(env.trace.as_slice(), &[1]);
        assert_eq!(s.tick(&mut env), Status::Terminated);
        assert_eq!(env.trace.as_slice(), &[1, 2]);
        assert_eq!(s.tick(&mut env), Status::Terminated);
        assert_eq!(env.trace.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_reset_restarts_from_first_step() {
        let mut env = Env::default();
        let mut s = seq((action(mark(1)), pause(), action(mark(2))));

        s.tick(&mut env);
        s.reset();
        assert_eq!(s.resume_point(), ResumePoint::NotStarted);
        s.tick(&mut env);
        assert_eq!(env.trace.as_slice(), &[1, 1]);
    }
}
