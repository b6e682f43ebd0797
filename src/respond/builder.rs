use super::{config::ResponderConfig, Responder};
use crate::{message::Identity, socket::DiscoverySocket, DISCOVERY_PORT, REQUEST_MARKER};
use std::{
	net::Ipv4Addr,
	sync::{Arc, RwLock},
};

/// Configures a responder. Defaults to a server identity with no skills.
pub struct ResponderBuilder {
	port: u16,
	marker: String,
	bind_addr: Ipv4Addr,
	identity: Identity,
}

impl ResponderBuilder {
	pub fn new() -> Self {
		Self {
			port: DISCOVERY_PORT,
			marker: REQUEST_MARKER.to_string(),
			bind_addr: Ipv4Addr::UNSPECIFIED,
			identity: Identity::server(Vec::<String>::new()),
		}
	}

	/// The discovery port. Must match the requesters'.
	pub fn port(mut self, port: u16) -> Self {
		self.port = port;
		self
	}

	/// The probe marker answered to. Opaque, compared byte-exact; must
	/// match the requesters'.
	pub fn marker(mut self, marker: impl Into<String>) -> Self {
		self.marker = marker.into();
		self
	}

	/// The local address the responder binds to.
	pub fn bind_addr(mut self, addr: Ipv4Addr) -> Self {
		self.bind_addr = addr;
		self
	}

	/// Advertise this skill, appended in order. Switches a device identity
	/// back to a server.
	pub fn add_skill(mut self, skill: impl Into<String>) -> Self {
		match &mut self.identity {
			Identity::Server { skills } => skills.push(skill.into()),
			Identity::Device { .. } => self.identity = Identity::server([skill.into()]),
		}
		self
	}

	/// Announce as a device with this id instead of a server.
	pub fn device(mut self, id: impl Into<String>) -> Self {
		self.identity = Identity::device(id);
		self
	}

	/// Announce exactly this identity.
	pub fn identity(mut self, identity: Identity) -> Self {
		self.identity = identity;
		self
	}

	pub fn build(self) -> Result<Responder, std::io::Error> {
		let ResponderBuilder {
			port,
			marker,
			bind_addr,
			identity,
		} = self;

		Ok(Responder {
			socket: DiscoverySocket::bind(bind_addr, port)?,
			config: Arc::new(RwLock::new(ResponderConfig::new(marker, identity))),
		})
	}
}

impl Default for ResponderBuilder {
	fn default() -> Self {
		Self::new()
	}
}
