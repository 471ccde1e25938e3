//! Bus bring-up and polling
//!
//! The host hands every received frame to the device as part of the tick's
//! inputs. [`receiver`] moves them onto the topic board, subscribers read the
//! board, publishers queue datagrams that the host broadcasts after the tick.
//! Nothing is received or sent before the bus is open.

use ego_core::combinators::{action, await_until, branch, seq, sustain};
use ego_core::Activity;
use ego_protocol::{Datagram, Payload, Topic, TopicBoard, MAX_DATAGRAM_SIZE};
use heapless::Vec;
use log::{debug, info, trace, warn};

use crate::config::NetworkRole;

/// Frames received per tick
pub const INBOX_CAPACITY: usize = 8;

/// Datagrams published per tick
pub const OUTBOX_CAPACITY: usize = 4;

const SUBSCRIPTIONS: usize = 4;

/// Raw frame as received from the network
pub type Frame = Vec<u8, MAX_DATAGRAM_SIZE>;

/// Frames received since the previous tick
pub type Inbox = Vec<Frame, INBOX_CAPACITY>;

/// Datagrams to broadcast after a tick
pub type Publishes = Vec<Datagram, OUTBOX_CAPACITY>;

/// Per-device view of the broadcast bus
#[derive(Debug, Clone, Default)]
pub struct Bus {
    link_up: bool,
    open: bool,
    inbox: Inbox,
    board: TopicBoard<SUBSCRIPTIONS>,
    outbox: ego_protocol::Outbox<OUTBOX_CAPACITY>,
}

impl Bus {
    /// Store the link state and the frames received for the coming tick
    ///
    /// Frames arriving while the bus is closed are discarded.
    pub fn latch(&mut self, link_up: bool, frames: Inbox) {
        self.link_up = link_up;
        if self.open {
            self.inbox = frames;
        } else {
            self.inbox.clear();
        }
    }

    /// Check if the network link is up
    pub fn link_up(&self) -> bool {
        self.link_up
    }

    /// Start receiving and sending
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Check if the bus is open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Move pending frames onto the board, returns the number stored
    pub fn poll(&mut self) -> usize {
        let frames = core::mem::take(&mut self.inbox);
        let mut stored = 0;
        for frame in frames.iter() {
            match Datagram::decode(frame) {
                Ok(datagram) => {
                    if self.board.ingest(&datagram) {
                        stored += 1;
                    } else {
                        trace!("dropping datagram for topic {}", datagram.topic);
                    }
                }
                Err(err) => trace!("ignoring frame of {} bytes: {:?}", frame.len(), err),
            }
        }
        stored
    }

    /// Subscribe to `topic`, repeated subscriptions are ignored
    pub fn subscribe(&mut self, topic: Topic) {
        if let Err(err) = self.board.subscribe(topic) {
            warn!("cannot subscribe to {:?}: {:?}", topic, err);
        }
    }

    /// Latest value received on the payload's topic
    pub fn latest<P: Payload>(&self) -> Option<P> {
        self.board.latest::<P>()
    }

    /// Number of datagrams received on `topic`
    pub fn updates(&self, topic: Topic) -> u32 {
        self.board.updates(topic)
    }

    /// Queue `value` for broadcast, returns `false` if it was dropped
    pub fn publish<P: Payload + core::fmt::Debug>(&mut self, value: &P) -> bool {
        if !self.open {
            debug!("bus closed, not publishing {:?}", value);
            return false;
        }
        match self.outbox.publish(value) {
            Ok(()) => true,
            Err(err) => {
                warn!("dropping {:?}: {:?}", value, err);
                false
            }
        }
    }

    /// Take the datagrams queued during the tick
    pub fn take_publishes(&mut self) -> Publishes {
        self.outbox.take()
    }
}

/// Environments that own a bus
pub trait HasBus {
    fn bus(&self) -> &Bus;
    fn bus_mut(&mut self) -> &mut Bus;
}

/// Wait for the network link, then open the bus
pub fn connector<E: HasBus>() -> impl Activity<E> {
    seq((
        action(|_: &mut E| info!("connecting to WLAN...")),
        await_until(|env: &E| env.bus().link_up()),
        action(|env: &mut E| {
            info!("connecting to WLAN...done");
            env.bus_mut().open();
        }),
    ))
}

/// Host the network and open the bus right away
pub fn access_point<E: HasBus>() -> impl Activity<E> {
    action(|env: &mut E| {
        info!("starting WLAN access point...done");
        env.bus_mut().open();
    })
}

/// Bring the bus up according to `role`
pub fn connect<E: HasBus>(role: NetworkRole) -> impl Activity<E> {
    branch(
        move |_: &E| role == NetworkRole::AccessPoint,
        access_point(),
        connector(),
    )
}

/// Poll the bus every tick
pub fn receiver<E: HasBus>() -> impl Activity<E> {
    sustain(|env: &mut E| {
        env.bus_mut().poll();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ego_core::Status;
    use ego_protocol::{Intent, Press};

    #[derive(Default)]
    struct Env {
        bus: Bus,
    }

    impl HasBus for Env {
        fn bus(&self) -> &Bus {
            &self.bus
        }
        fn bus_mut(&mut self) -> &mut Bus {
            &mut self.bus
        }
    }

    fn frame(datagram: &Datagram) -> Frame {
        datagram.encode_to_vec()
    }

    fn inbox(frames: &[Frame]) -> Inbox {
        Vec::from_slice(frames).unwrap()
    }

    #[test]
    fn test_connector_waits_for_link() {
        let mut env = Env::default();
        let mut link = connector::<Env>();

        assert_eq!(link.tick(&mut env), Status::Suspended);
        assert!(!env.bus.is_open());
        env.bus.latch(true, Inbox::new());
        assert_eq!(link.tick(&mut env), Status::Terminated);
        assert!(env.bus.is_open());
    }

    #[test]
    fn test_access_point_opens_immediately() {
        let mut env = Env::default();
        let mut link = connect::<Env>(NetworkRole::AccessPoint);
        assert_eq!(link.tick(&mut env), Status::Terminated);
        assert!(env.bus.is_open());
    }

    #[test]
    fn test_closed_bus_drops_traffic() {
        let mut bus = Bus::default();
        bus.subscribe(Topic::Intent);
        bus.latch(false, inbox(&[frame(&Intent::Quit.to_datagram())]));
        assert_eq!(bus.poll(), 0);
        assert!(!bus.publish(&Press::Short));
        assert!(bus.take_publishes().is_empty());
    }

    #[test]
    fn test_poll_filters_and_keeps_last() {
        let mut bus = Bus::default();
        bus.open();
        bus.subscribe(Topic::Intent);

        let short: Frame = Vec::from_slice(&[54, 0, 0, 0]).unwrap();
        bus.latch(
            true,
            inbox(&[
                frame(&Intent::StartManu.to_datagram()),
                short,
                frame(&Press::Long.to_datagram()),
                frame(&Intent::StartAuto.to_datagram()),
            ]),
        );

        assert_eq!(bus.poll(), 2);
        assert_eq!(bus.latest::<Intent>(), Some(Intent::StartAuto));
        assert_eq!(bus.latest::<Press>(), None);
        // frames are consumed by the poll
        assert_eq!(bus.poll(), 0);
    }

    #[test]
    fn test_receiver_polls_every_tick() {
        let mut env = Env::default();
        env.bus.open();
        env.bus.subscribe(Topic::Press);
        let mut recv = receiver::<Env>();

        env.bus.latch(true, inbox(&[frame(&Press::Short.to_datagram())]));
        recv.tick(&mut env);
        assert_eq!(env.bus.updates(Topic::Press), 1);
        env.bus.latch(true, inbox(&[frame(&Press::No.to_datagram())]));
        recv.tick(&mut env);
        assert_eq!(env.bus.latest::<Press>(), Some(Press::No));
    }
}
