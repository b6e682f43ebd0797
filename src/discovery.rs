//! The requester role: broadcast a probe, collect the announcements that
//! come back.
//!
//! Two modes share one socket layout. [`Discovery::collect`] is a one-shot
//! attempt that gathers every responder answering within a timeout.
//! [`Discovery::run`] / [`Discovery::run_in_background`] is a continuous
//! loop that re-probes on an interval and reports peers appearing and
//! disappearing through [`DiscoveryEvent`]s.

use crate::{
	message::{self, DiscoveryMessage},
	socket::{AsyncDiscoverySocket, AsyncProbeSocket, DiscoverySocket, ProbeSocket},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};

mod builder;
pub use builder::DiscoveryBuilder;

mod event;
pub use event::DiscoveryEvent;
use event::*;

mod handle;
pub use handle::DiscoveryHandle;
use handle::*;

mod presence;
pub use presence::DiscoveredPeer;
use presence::*;

mod session;
use session::DiscoverySession;

/// How long after each probe the continuous loop keeps draining replies
/// before sweeping for peers that stopped answering.
const REPLY_GRACE: Duration = Duration::from_secs(2);

/// A configured discovery requester. Build one with [`DiscoveryBuilder`].
pub struct Discovery {
	listener: DiscoverySocket,
	probe: ProbeSocket,
	marker: String,
	interval: Duration,
	max_ignored_probes: u8,
}

impl Discovery {
	/// Runs one discovery attempt, collecting until the timeout expires.
	///
	/// Returns every peer that answered, in the order first heard from,
	/// possibly none. An empty result means no responder is on the network
	/// right now; only transport failures return an error.
	pub fn collect(self, timeout: Duration) -> Result<Vec<DiscoveredPeer>, std::io::Error> {
		tokio::runtime::Builder::new_current_thread()
			.thread_name("Floodlight Discovery (Tokio)")
			.enable_all()
			.build()
			.unwrap()
			.block_on(self.impl_collect(timeout))
	}

	/// Runs the continuous discovery loop on a background thread.
	///
	/// The returned handle shuts the loop down when dropped.
	pub fn run_in_background<F>(self, handler: F) -> DiscoveryHandle
	where
		F: Fn(DiscoveryEvent) + Send + Sync + 'static,
	{
		let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

		let thread = std::thread::spawn(move || {
			tokio::runtime::Builder::new_current_thread()
				.thread_name("Floodlight Discovery (Tokio)")
				.enable_all()
				.build()
				.unwrap()
				.block_on(self.impl_run(Arc::new(handler), Some(shutdown_rx)))
		});

		DiscoveryHandle(DiscoveryHandleDrop(Some(DiscoveryHandleInner {
			thread,
			shutdown_tx,
		})))
	}

	/// Runs the continuous discovery loop on the current thread, blocking
	/// until a transport error occurs.
	pub fn run<F>(self, handler: F) -> Result<(), std::io::Error>
	where
		F: Fn(DiscoveryEvent) + Send + Sync + 'static,
	{
		tokio::runtime::Builder::new_current_thread()
			.thread_name("Floodlight Discovery (Tokio)")
			.enable_all()
			.build()
			.unwrap()
			.block_on(self.impl_run(Arc::new(handler), None))
	}
}

impl Discovery {
	async fn impl_collect(self, timeout: Duration) -> Result<Vec<DiscoveredPeer>, std::io::Error> {
		let Discovery {
			listener,
			probe,
			marker,
			..
		} = self;

		let listener = listener.into_async().await?;
		let probe = probe.into_async().await?;

		let mut session = DiscoverySession::new(marker, timeout);
		probe.send_probe(session.probe_packet()).await?;
		log::trace!("discovery probe sent");

		let mut listener_recv = listener.recv(vec![0; 4096]);
		while session.is_awaiting() {
			match tokio::time::timeout_at(session.deadline(), listener_recv.recv_from()).await {
				Ok(Ok(((count, addr), packet))) => session.absorb(addr, &packet[..count]),
				Ok(Err(err)) => return Err(err),
				Err(_) => session.expire(),
			}
		}

		Ok(session.into_peers())
	}

	async fn impl_run(
		self,
		handler: EventHandler,
		shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
	) -> Result<(), std::io::Error> {
		let Discovery {
			listener,
			probe,
			marker,
			interval,
			max_ignored_probes,
		} = self;

		let listener = listener.into_async().await?;
		let probe = probe.into_async().await?;

		let shutdown = async move {
			if let Some(shutdown_rx) = shutdown_rx {
				shutdown_rx.await
			} else {
				std::future::pending().await
			}
		};

		tokio::select! {
			biased;
			res = Self::discovery_loop(handler, &marker, interval, max_ignored_probes, &listener, &probe) => res,
			_ = shutdown => Ok(()),
		}
	}

	async fn discovery_loop(
		event_handler: EventHandler,
		marker: &str,
		probe_interval: Duration,
		max_ignored_probes: u8,
		listener: &AsyncDiscoverySocket,
		probe: &AsyncProbeSocket,
	) -> Result<(), std::io::Error> {
		// Reply listening
		let mut listener_recv = listener.recv(vec![0; 4096]);

		// Probing
		let mut probe_interval = tokio::time::interval(probe_interval);
		probe_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

		// Presence
		let mut peer_memory = PeerMemory::default();

		loop {
			tokio::select! {
				biased; // Prefer handling packets
				recv = listener_recv.recv_from() => {
					let recv = recv?;
					Self::handle_datagram(marker, &event_handler, &mut peer_memory, recv).await;
				}

				_ = probe_interval.tick() => {
					probe.send_probe(marker.as_bytes()).await?;
					log::trace!("discovery probe sent");

					if max_ignored_probes == 0 {
						continue;
					}

					// Give responders a chance to answer
					let mut deadline = tokio::time::Instant::now() + REPLY_GRACE;
					loop {
						let recv = match tokio::time::timeout_at(deadline, listener_recv.recv_from()).await {
							Ok(Ok(recv)) => recv,
							Ok(Err(err)) => return Err(err),
							Err(_) => break,
						};

						let forgiveness = tokio::time::Instant::now();
						Self::handle_datagram(marker, &event_handler, &mut peer_memory, recv).await;
						deadline += forgiveness.elapsed(); // Add the time we spent processing the packet to the deadline
					}

					// Drop peers that stopped answering
					peer_memory.sweep(&event_handler, max_ignored_probes);
				}
			}
		}
	}

	async fn handle_datagram(
		marker: &str,
		event_handler: &EventHandler,
		peer_memory: &mut PeerMemory,
		recv: ((usize, SocketAddr), &[u8]),
	) {
		let ((count, addr), packet) = recv;

		if count == 0 {
			return;
		}

		let identity = match message::decode(&packet[..count], marker) {
			Some(DiscoveryMessage::Announce(identity)) => identity,

			Some(DiscoveryMessage::Request) => {
				// Our own broadcast looping back, or another requester probing.
				log::trace!("ignoring discovery probe from {addr}");
				return;
			}

			None => {
				log::debug!(
					"unknown datagram from {addr}: {:?}",
					String::from_utf8_lossy(&packet[..count])
				);
				return;
			}
		};

		let event = peer_memory.record(addr, identity);

		let event_handler = event_handler.clone();
		tokio::task::spawn_blocking(move || event_handler(event)).await.ok();
	}
}
