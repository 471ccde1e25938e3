//! Channels between the reader thread and the embassy tasks

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::keyboard::Command;

/// Console commands waiting for the device task
const COMMAND_CHANNEL_SIZE: usize = 16;

/// Commands typed on the console
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Raised by the tick task once per period, carries the tick number
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u64> = Signal::new();
