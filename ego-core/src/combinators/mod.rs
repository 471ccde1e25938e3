//! Control-flow combinators
//!
//! Each combinator is a plain generic struct built by a constructor function,
//! so a device's whole behavior is one concrete type with no allocation.
//!
//! Entry discipline: a combinator resets a child right before entering it.
//! Trees are therefore always entered from `NotStarted`, no matter how the
//! previous run of the same subtree ended.

mod control;
mod par;
mod preempt;
mod seq;
mod suspend;

pub use control::{branch, forever, only_if, repeat, while_loop, Branch, Loop, Repeat, While};
pub use par::{par, strong, weak, Arm, Par};
pub use preempt::{when_abort, when_reset, Abort, Reset};
pub use seq::{seq, Seq};
pub use suspend::{
    action, await_until, delay, pause, sustain, Action, Await, Delay, Halt, Nothing, Pause,
    Sustain,
};
