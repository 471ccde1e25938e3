//! Root driver
//!
//! Owns a device environment and its root activity, and performs one
//! synchronous pass per call. The scheduler never fails: given the same
//! state and the same inputs it always produces the same outputs.

use crate::activity::tree::StateTree;
use crate::activity::{Activity, Environment, Status};

/// Drives a root activity over an owned environment
pub struct Scheduler<E, A> {
    env: E,
    root: A,
    ticks: u64,
    finished: bool,
}

impl<E, A: Activity<E>> Scheduler<E, A> {
    /// Create a scheduler; nothing runs until the first tick
    pub fn new(env: E, root: A) -> Self {
        Self {
            env,
            root,
            ticks: 0,
            finished: false,
        }
    }

    /// Perform one synchronous pass from the root
    ///
    /// Once the root has terminated further ticks are no-ops.
    pub fn tick(&mut self) -> Status {
        self.ticks = self.ticks.wrapping_add(1);
        if self.finished {
            return Status::Terminated;
        }
        let status = self.root.tick(&mut self.env);
        self.finished = status.is_terminated();
        status
    }

    /// Latch `inputs`, tick once and return the outputs of that tick
    pub fn react(&mut self, inputs: E::Inputs) -> E::Outputs
    where
        E: Environment,
    {
        self.env.latch(inputs);
        self.tick();
        self.env.take_outputs()
    }

    /// Number of passes performed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Check if the root activity has terminated
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Shared access to the environment
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Mutable access to the environment, for hosts and tests that poke
    /// signals directly between ticks
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// The root activity
    pub fn root(&self) -> &A {
        &self.root
    }

    /// Flatten the current state tree into an arena of `N` records
    pub fn snapshot<const N: usize>(&self) -> StateTree<N> {
        StateTree::capture(&self.root)
    }

    /// Put the root back to `NotStarted` so the next tick enters it afresh
    pub fn restart(&mut self) {
        self.root.reset();
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{
        action, await_until, delay, forever, par, pause, seq, strong, sustain, weak, when_abort,
    };
    use crate::{Node, ResumePoint};
    use proptest::prelude::*;

    #[derive(Debug, Default, Clone)]
    struct Env {
        button: bool,
        stop: bool,
        count: u32,
        out: heapless::Vec<u32, 4>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Inputs {
        button: bool,
        stop: bool,
    }

    impl Environment for Env {
        type Inputs = Inputs;
        type Outputs = heapless::Vec<u32, 4>;

        fn latch(&mut self, inputs: Inputs) {
            self.button = inputs.button;
            self.stop = inputs.stop;
        }

        fn take_outputs(&mut self) -> Self::Outputs {
            core::mem::take(&mut self.out)
        }
    }

    fn counter() -> impl Activity<Env> {
        forever(seq((
            await_until(|env: &Env| env.button),
            action(|env: &mut Env| {
                env.count += 1;
                let _ = env.out.push(env.count);
            }),
            when_abort(
                |env: &Env| env.stop,
                par((
                    strong(delay(3)),
                    weak(sustain(|env: &mut Env| {
                        let _ = env.out.push(1000);
                    })),
                )),
            ),
            pause(),
        )))
    }

    #[test]
    fn test_tick_counts_and_finishes() {
        let mut sched = Scheduler::new(Env::default(), seq((pause(), pause())));
        assert_eq!(sched.tick(), Status::Suspended);
        assert_eq!(sched.tick(), Status::Suspended);
        assert_eq!(sched.tick(), Status::Terminated);
        assert!(sched.is_finished());
        // finished roots stay finished
        assert_eq!(sched.tick(), Status::Terminated);
        assert_eq!(sched.ticks(), 4);

        sched.restart();
        assert_eq!(sched.root().resume_point(), ResumePoint::NotStarted);
        assert_eq!(sched.tick(), Status::Suspended);
    }

    #[test]
    fn test_react_latches_and_collects() {
        let mut sched = Scheduler::new(Env::default(), counter());
        let idle = Inputs {
            button: false,
            stop: false,
        };
        let press = Inputs {
            button: true,
            stop: false,
        };

        assert!(sched.react(idle).is_empty());
        assert_eq!(sched.react(press).as_slice(), &[1, 1000]);
        assert_eq!(sched.react(idle).as_slice(), &[1000]);
        let stop = Inputs {
            button: false,
            stop: true,
        };
        // abort suppresses the weak sustain entirely in this tick
        assert!(sched.react(stop).is_empty());
    }

    #[test]
    fn test_snapshot_tracks_progress() {
        let mut sched = Scheduler::new(Env::default(), counter());
        let fresh: StateTree<32> = sched.snapshot();
        sched.env_mut().button = true;
        sched.tick();
        let running: StateTree<32> = sched.snapshot();
        assert!(fresh.same_shape(&running));
        assert_eq!(fresh.active_count(), 0);
        assert!(running.active_count() > 0);
    }

    fn run(inputs: &[(bool, bool)]) -> std::vec::Vec<heapless::Vec<u32, 4>> {
        let mut sched = Scheduler::new(Env::default(), counter());
        inputs
            .iter()
            .map(|&(button, stop)| sched.react(Inputs { button, stop }))
            .collect()
    }

    proptest! {
        #[test]
        fn test_same_inputs_same_outputs(inputs in proptest::collection::vec(any::<(bool, bool)>(), 0..64)) {
            prop_assert_eq!(run(&inputs), run(&inputs));
        }

        #[test]
        fn test_counter_never_skips(inputs in proptest::collection::vec(any::<(bool, bool)>(), 0..64)) {
            let outputs = run(&inputs);
            let counts: std::vec::Vec<u32> = outputs
                .iter()
                .flat_map(|o| o.iter().copied())
                .filter(|&v| v != 1000)
                .collect();
            for (i, c) in counts.iter().enumerate() {
                prop_assert_eq!(*c, i as u32 + 1);
            }
        }
    }
}
