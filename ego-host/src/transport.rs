//! UDP broadcast transport
//!
//! Every device binds the bus port and broadcasts its datagrams to it, so
//! each device also receives its own datagrams. The topic board ignores the
//! topics a device does not subscribe to, so no filtering happens here.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use ego_devices::common::{Frame, Inbox};
use ego_protocol::{Datagram, MAX_DATAGRAM_SIZE};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::NetworkConfig;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("socket setup failed: {0}")]
    Setup(io::Error),
    #[error("receive failed: {0}")]
    Receive(io::Error),
}

/// Non-blocking broadcast socket
#[derive(Debug)]
pub struct UdpBus {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpBus {
    pub fn bind(config: &NetworkConfig) -> Result<Self, TransportError> {
        let addr = SocketAddr::new(config.bind, config.port);
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket.set_broadcast(true).map_err(TransportError::Setup)?;
        socket.set_nonblocking(true).map_err(TransportError::Setup)?;
        debug!(%addr, "bus socket bound");
        Ok(Self {
            socket,
            target: SocketAddr::new(config.broadcast, config.port),
        })
    }

    /// Collect the frames that arrived since the last call
    ///
    /// Frames beyond the inbox capacity wait for the next tick; oversized
    /// frames are dropped.
    pub fn receive(&self) -> Result<Inbox, TransportError> {
        let mut inbox = Inbox::new();
        let mut buf = [0u8; 512];
        while !inbox.is_full() {
            match self.socket.recv_from(&mut buf) {
                Ok((len, peer)) => {
                    if len > MAX_DATAGRAM_SIZE {
                        warn!(%peer, len, "dropping oversized datagram");
                        continue;
                    }
                    trace!(%peer, len, "datagram received");
                    let mut frame = Frame::new();
                    // length checked above
                    let _ = frame.extend_from_slice(&buf[..len]);
                    let _ = inbox.push(frame);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Receive(err)),
            }
        }
        Ok(inbox)
    }

    /// Broadcast the datagrams of one tick
    ///
    /// Send failures are logged, a lost datagram is not fatal on a
    /// best-effort bus.
    pub fn send(&self, publishes: &[Datagram]) {
        for datagram in publishes {
            let frame = datagram.encode_to_vec();
            match self.socket.send_to(&frame, self.target) {
                Ok(_) => trace!(topic = datagram.topic, "datagram sent"),
                Err(err) => warn!(topic = datagram.topic, %err, "send failed"),
            }
        }
    }
}
