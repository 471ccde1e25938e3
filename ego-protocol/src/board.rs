//! Last-value-wins topic board and publish queue
//!
//! The board keeps one slot per subscribed topic. Every received datagram for
//! a subscribed topic overwrites that slot, so readers always see the latest
//! value and never a queue of stale ones.

use heapless::Vec;

use crate::datagram::{Datagram, MAX_PAYLOAD_SIZE};
use crate::topics::{Payload, Topic};

/// Errors from board and outbox bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// No free subscription slot
    TooManySubscriptions,
    /// Publish queue is full for this tick
    OutboxFull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    topic: u32,
    data: Vec<u8, MAX_PAYLOAD_SIZE>,
    updates: u32,
}

/// Latest payload per subscribed topic, for up to `N` topics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicBoard<const N: usize> {
    slots: Vec<Slot, N>,
}

impl<const N: usize> TopicBoard<N> {
    /// Create an empty board with no subscriptions
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Subscribe to `topic`
    ///
    /// Returns `Ok(false)` if the topic was already subscribed.
    pub fn subscribe(&mut self, topic: Topic) -> Result<bool, BoardError> {
        self.subscribe_id(topic.id())
    }

    /// Subscribe to a raw topic identifier
    pub fn subscribe_id(&mut self, topic: u32) -> Result<bool, BoardError> {
        if self.is_subscribed_id(topic) {
            return Ok(false);
        }
        self.slots
            .push(Slot {
                topic,
                data: Vec::new(),
                updates: 0,
            })
            .map_err(|_| BoardError::TooManySubscriptions)?;
        Ok(true)
    }

    /// Check if `topic` is subscribed
    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.is_subscribed_id(topic.id())
    }

    fn is_subscribed_id(&self, topic: u32) -> bool {
        self.slots.iter().any(|slot| slot.topic == topic)
    }

    /// Store a received datagram
    ///
    /// Returns `false` (and drops the datagram) if its topic is not
    /// subscribed.
    pub fn ingest(&mut self, datagram: &Datagram) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|slot| slot.topic == datagram.topic)
        {
            Some(slot) => {
                slot.data.clone_from(&datagram.payload);
                slot.updates = slot.updates.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    /// Latest raw payload of `topic`, `None` if never received
    pub fn read(&self, topic: Topic) -> Option<&[u8]> {
        self.slots
            .iter()
            .find(|slot| slot.topic == topic.id() && !slot.data.is_empty())
            .map(|slot| slot.data.as_slice())
    }

    /// Latest value of a typed payload
    ///
    /// `None` if nothing was received yet or the stored payload does not
    /// parse.
    pub fn latest<P: Payload>(&self) -> Option<P> {
        self.read(P::TOPIC).and_then(|bytes| P::from_bytes(bytes).ok())
    }

    /// Number of datagrams stored for `topic` so far
    pub fn updates(&self, topic: Topic) -> u32 {
        self.slots
            .iter()
            .find(|slot| slot.topic == topic.id())
            .map_or(0, |slot| slot.updates)
    }

    /// Number of subscribed topics
    pub fn subscriptions(&self) -> usize {
        self.slots.len()
    }
}

/// Datagrams published during one tick, for up to `N` per tick
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outbox<const N: usize> {
    queue: Vec<Datagram, N>,
}

impl<const N: usize> Outbox<N> {
    pub const fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queue a typed value for broadcast
    pub fn publish<P: Payload>(&mut self, value: &P) -> Result<(), BoardError> {
        self.push(value.to_datagram())
    }

    /// Queue a raw datagram for broadcast
    pub fn push(&mut self, datagram: Datagram) -> Result<(), BoardError> {
        self.queue.push(datagram).map_err(|_| BoardError::OutboxFull)
    }

    /// Number of queued datagrams
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued datagram, leaving the outbox empty
    pub fn take(&mut self) -> Vec<Datagram, N> {
        core::mem::take(&mut self.queue)
    }
}
