use std::{
	collections::BTreeSet,
	net::{Ipv4Addr, SocketAddr, SocketAddrV4},
};
use tokio::net::UdpSocket as AsyncUdpSocket;

pub(crate) type AsyncDiscoverySocket = DiscoverySocket<AsyncUdpSocket>;

/// The receive side of a role: one UDP socket bound to the discovery port
/// with address/port reuse, so a requester's listener and a responder can
/// coexist on the same host.
pub(crate) struct DiscoverySocket<S = std::net::UdpSocket> {
	socket: S,
	port: u16,
}

impl DiscoverySocket {
	pub fn bind(bind_addr: Ipv4Addr, port: u16) -> Result<Self, std::io::Error> {
		let socket = socket2::Socket::new(
			socket2::Domain::IPV4,
			socket2::Type::DGRAM,
			Some(socket2::Protocol::UDP),
		)?;
		socket.set_reuse_address(true)?;

		#[cfg(unix)]
		{
			socket.set_reuse_port(true)?;
		}

		// Subnet-directed probes arrive with a broadcast destination.
		socket.set_broadcast(true)?;

		socket.bind(&socket2::SockAddr::from(SocketAddr::new(
			bind_addr.into(),
			port,
		)))?;
		socket.set_nonblocking(true)?;

		Ok(Self {
			socket: socket.into(),
			port,
		})
	}

	pub async fn into_async(self) -> Result<AsyncDiscoverySocket, std::io::Error> {
		Ok(DiscoverySocket {
			socket: AsyncUdpSocket::from_std(self.socket)?,
			port: self.port,
		})
	}
}

impl AsyncDiscoverySocket {
	/// The discovery port this socket is bound to, which is also the
	/// destination port of every reply sent through it.
	pub fn port(&self) -> u16 {
		self.port
	}

	pub async fn send_to(&self, packet: &[u8], addr: SocketAddr) -> Result<(), std::io::Error> {
		self.socket.send_to(packet, addr).await.map(|_| ())
	}

	pub fn recv(&self, buffer: Vec<u8>) -> SocketRecv {
		SocketRecv(&self.socket, buffer)
	}
}

pub(crate) struct SocketRecv<'a>(&'a AsyncUdpSocket, Vec<u8>);

impl SocketRecv<'_> {
	pub async fn recv_from(&mut self) -> Result<((usize, SocketAddr), &[u8]), std::io::Error> {
		let Self(socket, buf) = self;
		Ok((socket.recv_from(buf).await?, buf))
	}
}

pub(crate) type AsyncProbeSocket = ProbeSocket<AsyncUdpSocket>;

/// The send side of a discovery attempt: a second, ephemeral
/// broadcast-capable socket, owned separately from the listener and
/// released with it when the attempt ends.
pub(crate) struct ProbeSocket<S = std::net::UdpSocket> {
	socket: S,
	targets: BTreeSet<Ipv4Addr>,
	port: u16,
}

impl ProbeSocket {
	pub fn open(targets: BTreeSet<Ipv4Addr>, port: u16) -> Result<Self, std::io::Error> {
		let socket = socket2::Socket::new(
			socket2::Domain::IPV4,
			socket2::Type::DGRAM,
			Some(socket2::Protocol::UDP),
		)?;
		socket.set_broadcast(true)?;
		socket.bind(&socket2::SockAddr::from(SocketAddr::new(
			Ipv4Addr::UNSPECIFIED.into(),
			0,
		)))?;
		socket.set_nonblocking(true)?;

		Ok(Self {
			socket: socket.into(),
			targets,
			port,
		})
	}

	pub async fn into_async(self) -> Result<AsyncProbeSocket, std::io::Error> {
		Ok(ProbeSocket {
			socket: AsyncUdpSocket::from_std(self.socket)?,
			targets: self.targets,
			port: self.port,
		})
	}
}

impl AsyncProbeSocket {
	/// Sends one probe datagram to every configured broadcast target.
	pub async fn send_probe(&self, packet: &[u8]) -> Result<(), std::io::Error> {
		for target in &self.targets {
			self.socket
				.send_to(packet, SocketAddrV4::new(*target, self.port))
				.await?;
		}

		Ok(())
	}
}
