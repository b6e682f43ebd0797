//! The responder role: listen on the discovery port and answer every probe
//! with this host's identity and capability list.
//!
//! The responder is stateless per request: every valid probe gets an
//! independent unicast reply, addressed to the sender's IP at the
//! discovery port.

use crate::{
	message::{self, DiscoveryMessage},
	socket::{AsyncDiscoverySocket, DiscoverySocket, SocketRecv},
};
use std::{
	net::SocketAddr,
	sync::{Arc, RwLock},
};

mod builder;
pub use builder::ResponderBuilder;

mod config;
use config::ResponderConfig;

mod handle;
pub use handle::ResponderHandle;
use handle::*;

/// A configured responder. Build one with [`ResponderBuilder`].
pub struct Responder {
	socket: DiscoverySocket,
	config: Arc<RwLock<ResponderConfig>>,
}

impl Responder {
	/// Runs the responder on a background thread.
	///
	/// The returned handle can mutate the advertised skills while the loop
	/// runs, and shuts the loop down when dropped.
	pub fn run_in_background(self) -> ResponderHandle {
		let Responder { socket, config } = self;

		let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

		let config_ref = config.clone();
		let thread = std::thread::spawn(move || {
			tokio::runtime::Builder::new_current_thread()
				.thread_name("Floodlight Responder (Tokio)")
				.enable_all()
				.build()
				.unwrap()
				.block_on(async move {
					let socket = socket.into_async().await?;
					Self::impl_run(
						&socket,
						socket.recv(vec![0; 4096]),
						config_ref,
						Some(shutdown_rx),
					)
					.await
				})
		});

		ResponderHandle(ResponderHandleDrop(Some(ResponderHandleInner {
			config,
			thread,
			shutdown_tx,
		})))
	}

	/// Runs the responder on the current thread, blocking until a transport
	/// error occurs.
	pub fn run(self) -> Result<(), std::io::Error> {
		let Responder { socket, config } = self;

		tokio::runtime::Builder::new_current_thread()
			.thread_name("Floodlight Responder (Tokio)")
			.enable_all()
			.build()
			.unwrap()
			.block_on(async move {
				let socket = socket.into_async().await?;
				Self::impl_run(&socket, socket.recv(vec![0; 4096]), config, None).await
			})
	}
}

impl Responder {
	async fn impl_run(
		socket: &AsyncDiscoverySocket,
		mut rx: SocketRecv<'_>,
		config: Arc<RwLock<ResponderConfig>>,
		shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
	) -> Result<(), std::io::Error> {
		if let Some(shutdown_rx) = shutdown_rx {
			tokio::select! {
				biased;
				res = Self::recv_loop(socket, &mut rx, &config) => res,
				_ = shutdown_rx => Ok(()),
			}
		} else {
			Self::recv_loop(socket, &mut rx, &config).await
		}
	}

	async fn recv_loop(
		socket: &AsyncDiscoverySocket,
		rx: &mut SocketRecv<'_>,
		config: &RwLock<ResponderConfig>,
	) -> Result<(), std::io::Error> {
		loop {
			let ((count, addr), packet) = rx.recv_from().await?;
			if count == 0 {
				continue;
			}

			// Lock scope ends before the reply send awaits.
			let reply = {
				let config = config.read().unwrap();
				match message::decode(&packet[..count], config.marker()) {
					Some(DiscoveryMessage::Request) => config.payload().to_vec(),

					Some(DiscoveryMessage::Announce(_)) => {
						// Another responder answering somebody's probe.
						log::trace!("ignoring announcement from {addr}");
						continue;
					}

					None => {
						log::debug!(
							"unknown datagram from {addr}: {:?}",
							String::from_utf8_lossy(&packet[..count])
						);
						continue;
					}
				}
			};

			// To the sender's IP at the discovery port, not the probe's
			// source port: requesters listen on the fixed port.
			socket
				.send_to(&reply, SocketAddr::new(addr.ip(), socket.port()))
				.await?;

			log::info!("discovery probe answered: {}", addr.ip());
		}
	}
}
