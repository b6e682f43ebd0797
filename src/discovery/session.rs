use super::presence::DiscoveredPeer;
use crate::message::{self, DiscoveryMessage};
use std::{net::SocketAddr, time::Duration};

/// Where a one-shot attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
	AwaitingReplies,
	TimedOut,
}

/// One collect-until-timeout discovery attempt: a deadline plus the replies
/// absorbed so far. Lives for exactly one probe.
pub(super) struct DiscoverySession {
	marker: String,
	deadline: tokio::time::Instant,
	state: SessionState,
	peers: Vec<DiscoveredPeer>,
}

impl DiscoverySession {
	pub(super) fn new(marker: String, timeout: Duration) -> Self {
		Self {
			marker,
			deadline: tokio::time::Instant::now() + timeout,
			state: SessionState::AwaitingReplies,
			peers: Vec::new(),
		}
	}

	pub(super) fn probe_packet(&self) -> &[u8] {
		self.marker.as_bytes()
	}

	pub(super) fn deadline(&self) -> tokio::time::Instant {
		self.deadline
	}

	pub(super) fn is_awaiting(&self) -> bool {
		self.state == SessionState::AwaitingReplies
	}

	/// The deadline passed with the session still open. Not an error: it is
	/// the expected terminal state of every attempt.
	pub(super) fn expire(&mut self) {
		self.state = SessionState::TimedOut;
	}

	/// Classifies one received datagram and records it if it is an
	/// announcement. One entry per peer address; a repeat reply replaces
	/// the earlier one.
	pub(super) fn absorb(&mut self, addr: SocketAddr, payload: &[u8]) {
		if payload.is_empty() {
			return;
		}

		match message::decode(payload, &self.marker) {
			Some(DiscoveryMessage::Announce(identity)) => {
				let peer = DiscoveredPeer::new(addr, identity);
				match self.peers.iter_mut().find(|p| p.addr == addr) {
					Some(existing) => *existing = peer,
					None => self.peers.push(peer),
				}
			}

			Some(DiscoveryMessage::Request) => {
				// Our own broadcast looping back, or another requester probing.
				log::trace!("ignoring discovery probe from {addr}");
			}

			None => {
				log::debug!(
					"unknown datagram from {addr}: {:?}",
					String::from_utf8_lossy(payload)
				);
			}
		}
	}

	pub(super) fn into_peers(self) -> Vec<DiscoveredPeer> {
		self.peers
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{message::Identity, REQUEST_MARKER};

	fn session() -> DiscoverySession {
		DiscoverySession::new(REQUEST_MARKER.to_string(), Duration::from_secs(1))
	}

	fn addr(s: &str) -> SocketAddr {
		s.parse().unwrap()
	}

	#[test]
	fn collects_every_responder_that_answers() {
		let mut session = session();
		session.absorb(addr("10.0.0.5:4211"), b"SERVER;MQTT");
		session.absorb(addr("10.0.0.6:4211"), b"SERVER;MQTT;SKILL2");

		let peers = session.into_peers();
		assert_eq!(peers.len(), 2);
		assert_eq!(peers[0].addr, addr("10.0.0.5:4211"));
		assert_eq!(peers[0].identity, Identity::server(["MQTT"]));
		assert_eq!(peers[1].addr, addr("10.0.0.6:4211"));
		assert_eq!(peers[1].identity, Identity::server(["MQTT", "SKILL2"]));
	}

	#[test]
	fn own_probe_loopback_is_not_a_peer() {
		let mut session = session();
		session.absorb(addr("192.168.1.10:4211"), REQUEST_MARKER.as_bytes());

		// The loop must keep going and the echo must not be recorded.
		assert!(session.is_awaiting());
		assert!(session.into_peers().is_empty());
	}

	#[test]
	fn foreign_traffic_is_ignored() {
		let mut session = session();
		session.absorb(addr("10.0.0.9:4211"), b"hello");
		session.absorb(addr("10.0.0.9:4211"), &[0xff, 0x00]);

		assert!(session.is_awaiting());
		assert!(session.into_peers().is_empty());
	}

	#[test]
	fn repeat_reply_replaces_earlier_entry() {
		let mut session = session();
		session.absorb(addr("10.0.0.5:4211"), b"SERVER;MQTT");
		session.absorb(addr("10.0.0.5:4211"), b"SERVER;MQTT;SKILL2");

		let peers = session.into_peers();
		assert_eq!(peers.len(), 1);
		assert_eq!(peers[0].identity, Identity::server(["MQTT", "SKILL2"]));
	}

	#[test]
	fn devices_are_collected_alongside_servers() {
		let mut session = session();
		session.absorb(addr("10.0.0.5:4211"), b"SERVER;MQTT");
		session.absorb(addr("10.0.0.7:4211"), b"DEVICE8211476");

		let peers = session.into_peers();
		assert_eq!(peers.len(), 2);
		assert_eq!(peers[1].identity, Identity::device("8211476"));
		assert!(peers[0].has_skill("MQTT"));
		assert!(!peers[1].has_skill("MQTT"));
	}

	#[test]
	fn expiry_ends_the_attempt_with_what_was_collected() {
		let mut session = session();
		session.absorb(addr("10.0.0.5:4211"), b"SERVER");
		session.expire();

		assert!(!session.is_awaiting());
		assert_eq!(session.into_peers().len(), 1);
	}
}
