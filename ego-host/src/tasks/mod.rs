//! Embassy tasks of the host runner

mod device;
mod tick;

pub use device::{device_task, DeviceRunner};
pub use tick::tick_task;
