use super::Discovery;
use crate::{
	net::TargetInterface,
	socket::{DiscoverySocket, ProbeSocket},
	DISCOVERY_PORT, LOOPBACK_BROADCAST, REQUEST_MARKER,
};
use std::{net::Ipv4Addr, time::Duration};

/// Configures a discovery requester.
///
/// Every parameter is explicit, with no process-wide state, so independent
/// sessions with different ports or markers can run concurrently in one
/// process.
pub struct DiscoveryBuilder {
	port: u16,
	marker: String,
	interval: Duration,
	max_ignored_probes: u8,
	bind_addr: Ipv4Addr,
	interface: TargetInterface,
	loopback: bool,
}

impl DiscoveryBuilder {
	pub fn new() -> Self {
		Self {
			port: DISCOVERY_PORT,
			marker: REQUEST_MARKER.to_string(),
			interval: Duration::from_secs(10),
			max_ignored_probes: 2,
			bind_addr: Ipv4Addr::UNSPECIFIED,
			interface: TargetInterface::All,
			loopback: false,
		}
	}

	/// The discovery port. Must match the responders'.
	pub fn port(mut self, port: u16) -> Self {
		self.port = port;
		self
	}

	/// The probe marker. Opaque, compared byte-exact; must match the
	/// responders'.
	pub fn marker(mut self, marker: impl Into<String>) -> Self {
		self.marker = marker.into();
		self
	}

	/// How often the continuous mode re-sends its probe.
	pub fn interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	/// The number of probes a responder must ignore before the continuous
	/// mode reports it lost.
	///
	/// If set to zero, a responder is never reported lost.
	pub fn max_ignored_probes(mut self, max: u8) -> Self {
		self.max_ignored_probes = max;
		self
	}

	/// The local address the reply listener binds to.
	pub fn bind_addr(mut self, addr: Ipv4Addr) -> Self {
		self.bind_addr = addr;
		self
	}

	/// Which interface(s) the probe is broadcast on.
	pub fn interface(mut self, interface: TargetInterface) -> Self {
		self.interface = interface;
		self
	}

	/// Also probe the loopback broadcast address, so responders on this
	/// host are found.
	pub fn loopback(mut self) -> Self {
		self.loopback = true;
		self
	}

	pub fn build(self) -> Result<Discovery, std::io::Error> {
		let DiscoveryBuilder {
			port,
			marker,
			interval,
			max_ignored_probes,
			bind_addr,
			interface,
			loopback,
		} = self;

		let mut targets = interface.broadcast_addrs()?;
		if loopback {
			targets.insert(LOOPBACK_BROADCAST);
		}

		Ok(Discovery {
			listener: DiscoverySocket::bind(bind_addr, port)?,
			probe: ProbeSocket::open(targets, port)?,
			marker,
			interval,
			max_ignored_probes,
		})
	}
}

impl Default for DiscoveryBuilder {
	fn default() -> Self {
		Self::new()
	}
}
