//! Broadcast topic protocol
//!
//! Devices exchange small datagrams broadcast on a shared UDP port. There is
//! no acknowledgement, ordering or retransmission: a subscriber only ever
//! looks at the last value received for each topic.
//!
//! # Wire format
//!
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │ TOPIC        │ PAYLOAD              │
//! │ 4B (u32 LE)  │ 1-28B, topic-defined │
//! └──────────────┴──────────────────────┘
//! ```
//!
//! Datagrams of 4 bytes or fewer carry no payload and are ignored.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod board;
pub mod datagram;
pub mod topics;

pub use board::{BoardError, Outbox, TopicBoard};
pub use datagram::{CodecError, Datagram, MAX_DATAGRAM_SIZE, MAX_PAYLOAD_SIZE, TOPIC_HEADER_SIZE};
pub use topics::{Intent, Joystick, Payload, Press, Range, Topic, UNDEF_RANGE};

/// UDP port shared by every device on the bus
pub const BUS_PORT: u16 = 4839;
