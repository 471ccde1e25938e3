//! Activity contract
//!
//! An activity is a resumable state machine. It owns its children, keeps its
//! resume point and locals in plain fields, and is advanced by
//! [`Activity::tick`] exactly once per scheduler pass in which it is active.

pub mod tree;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of ticking an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Waiting at a suspension point, continues on a later tick
    Suspended,
    /// Ran past its last statement
    Terminated,
}

impl Status {
    /// Check if the activity suspended
    pub const fn is_suspended(self) -> bool {
        matches!(self, Status::Suspended)
    }

    /// Check if the activity terminated
    pub const fn is_terminated(self) -> bool {
        matches!(self, Status::Terminated)
    }
}

/// Where an activity continues on its next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResumePoint {
    /// Never ticked since construction or the last reset
    NotStarted,
    /// Suspended at the given suspension point
    At(u8),
    /// Finished, further ticks are no-ops
    Terminated,
}

impl ResumePoint {
    /// Check if the activity is somewhere between entry and termination
    pub const fn is_active(self) -> bool {
        matches!(self, ResumePoint::At(_))
    }
}

/// Tag describing what a node in the state tree is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeKind {
    Action,
    Nothing,
    Await,
    Pause,
    Delay,
    Halt,
    Sustain,
    Seq,
    Par,
    Strong,
    Weak,
    Abort,
    Reset,
    Loop,
    While,
    Repeat,
    Branch,
    /// Application-defined leaf or wrapper, tagged with its name
    Custom(&'static str),
}

/// Structural part of an activity: reset and introspection
///
/// Kept separate from [`Activity`] so the state tree can be walked without
/// knowing the environment type.
pub trait Node {
    /// What kind of node this is
    fn kind(&self) -> NodeKind;

    /// Current resume point
    fn resume_point(&self) -> ResumePoint;

    /// Force this node and all of its children back to `NotStarted`
    fn reset(&mut self);

    /// Visit the direct children in declaration order
    fn for_each_child(&self, _visit: &mut dyn FnMut(&dyn Node)) {}
}

/// A resumable activity over an environment `E`
///
/// The environment holds every value that more than one activity touches:
/// latched inputs, shared signals and pending outputs.
pub trait Activity<E: ?Sized>: Node {
    /// Resume from the current resume point and run until the next
    /// suspension point or termination
    fn tick(&mut self, env: &mut E) -> Status;
}

/// Device environment that can be driven through [`Scheduler::react`]
///
/// [`Scheduler::react`]: crate::Scheduler::react
pub trait Environment {
    /// Values sampled by the host before a tick
    type Inputs;
    /// Values produced by a tick for the host to apply
    type Outputs;

    /// Store the inputs for the coming tick
    fn latch(&mut self, inputs: Self::Inputs);

    /// Take the outputs written during the last tick
    fn take_outputs(&mut self) -> Self::Outputs;
}
