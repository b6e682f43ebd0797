use super::event::{DiscoveryEvent, EventHandler};
use crate::message::Identity;
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Instant};

/// A peer that has answered a discovery probe.
#[derive(Debug, Clone)]
pub struct DiscoveredPeer {
	/// Where the announcement came from.
	pub addr: SocketAddr,

	/// What the peer announced: a server with skills, or a device with an id.
	pub identity: Identity,

	/// When the announcement was received.
	pub last_responded: Instant,
}

impl DiscoveredPeer {
	pub(super) fn new(addr: SocketAddr, identity: Identity) -> Self {
		Self {
			addr,
			identity,
			last_responded: Instant::now(),
		}
	}

	/// Whether this peer advertises the given skill (exact match).
	pub fn has_skill(&self, skill: &str) -> bool {
		self.identity.has_skill(skill)
	}
}

struct PeerMemoryEntry {
	peer: Arc<DiscoveredPeer>,
	ignored_probes: u8,
}

/// The continuous mode's record of who has answered, keyed by peer address.
#[derive(Default)]
pub(super) struct PeerMemory(HashMap<SocketAddr, PeerMemoryEntry>);

impl PeerMemory {
	/// Records an announcement and returns the event it amounts to.
	pub(super) fn record(&mut self, addr: SocketAddr, identity: Identity) -> DiscoveryEvent {
		let new = Arc::new(DiscoveredPeer::new(addr, identity));

		let old = self.0.insert(
			addr,
			PeerMemoryEntry {
				peer: new.clone(),
				ignored_probes: 0,
			},
		);

		match old {
			Some(old) => DiscoveryEvent::ResponseUpdate { old: old.peer, new },
			None => DiscoveryEvent::ResponderFound(new),
		}
	}

	/// Ages every known peer by one probe, dropping and reporting those
	/// that have ignored `max_ignored_probes` in a row.
	pub(super) fn sweep(&mut self, event_handler: &EventHandler, max_ignored_probes: u8) {
		self.0.retain(|_, entry| {
			if entry.ignored_probes < max_ignored_probes {
				entry.ignored_probes += 1;
				true
			} else {
				let event_handler = event_handler.clone();
				let peer = entry.peer.clone();
				tokio::task::spawn_blocking(move || event_handler(DiscoveryEvent::ResponderLost(peer)));
				false
			}
		});
	}
}
