//! Activities shared by all devices

pub mod blink;
pub mod bus;
pub mod press;

pub use blink::{blink, StatusLight};
pub use bus::{
    access_point, connect, connector, receiver, Bus, Frame, HasBus, Inbox, Publishes,
    INBOX_CAPACITY, OUTBOX_CAPACITY,
};
pub use press::{dual_press_recognizer, press_recognizer, DualPressRecognizer, PressRecognizer};
