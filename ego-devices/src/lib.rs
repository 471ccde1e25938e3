//! Robot controllers
//!
//! Each device is a [`Scheduler`](ego_core::Scheduler) over a device
//! environment and one root activity:
//!
//! - [`motion`]: drive unit with servos, traffic lights and intent buttons
//! - [`ranger`]: distance sensor publishing the range to the next obstacle
//! - [`remote`]: handheld remote with screen, joystick and two buttons
//!
//! The hosting loop samples hardware into the device's `Inputs`, calls
//! `react` once per period and applies the returned `Outputs` through the
//! capability traits in [`traits`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod common;
pub mod config;
pub mod motion;
pub mod ranger;
pub mod remote;
pub mod traits;

pub use config::{
    Arbitration, BlinkPattern, DimmerConfig, MotionConfig, NetworkRole, PressTiming,
    RangerConfig, RemoteConfig,
};
