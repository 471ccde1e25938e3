//! Synchronous, tick-driven activity engine
//!
//! Every controller behavior is a static tree of activities. One call to
//! [`Scheduler::tick`] performs a synchronous pass over that tree: each
//! activity resumes where it suspended on the previous tick and runs until it
//! suspends again or terminates.
//!
//! - Activity contract and state-tree introspection ([`activity`])
//! - Control-flow combinators: sequencing, suspension, strong/weak parallel
//!   composition, abort/reset preemption, loops and branches ([`combinators`])
//! - Reusable signal activities: edges and change detection ([`library`])
//! - The root driver ([`scheduler`])
//!
//! ```text
//!            react(inputs)
//!                 |
//!     +-----------v-----------+
//!     |       Scheduler       |  latch -> tick -> outputs
//!     +-----------+-----------+
//!                 | tick(env)
//!          +------v------+
//!          |  seq / par  |  fixed left-to-right order
//!          +--+-------+--+
//!             |       |
//!          await    abort(guard, body)
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod activity;
pub mod combinators;
pub mod library;
pub mod scheduler;

pub use activity::tree::{NodeRecord, StateTree};
pub use activity::{Activity, Environment, Node, NodeKind, ResumePoint, Status};
pub use scheduler::Scheduler;
