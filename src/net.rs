//! Networking utilities and abstractions

use std::{collections::BTreeSet, net::Ipv4Addr};

/// The [`if_addrs`](https://crates.io/crates/if_addrs) crate is used to discover network interfaces on the system.
///
/// Here is a re-export for your convenience.
pub use if_addrs;

/// The interface(s) whose broadcast address a discovery probe is sent to.
///
/// Discovery is IPv4-only: IPv6 has no broadcast, and the protocol targets
/// flat LANs where subnet-directed (or limited) broadcast reaches every
/// candidate responder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetInterface {
	/// Probe the limited broadcast address (255.255.255.255) and let the OS
	/// pick the interface.
	Default,

	/// Probe the subnet-directed broadcast address of every non-loopback
	/// IPv4 interface, falling back to `Default` if none are available.
	All,

	/// Probe the subnet-directed broadcast address of the interface with the
	/// given address.
	Specific(Ipv4Addr),

	/// Probe the subnet-directed broadcast addresses of the interfaces with
	/// the given addresses.
	Multi(BTreeSet<Ipv4Addr>),
}

impl TargetInterface {
	/// Resolves this target to the set of broadcast addresses a probe is
	/// sent to.
	pub(crate) fn broadcast_addrs(&self) -> Result<BTreeSet<Ipv4Addr>, std::io::Error> {
		Ok(match self {
			Self::Default => BTreeSet::from([Ipv4Addr::BROADCAST]),

			Self::Specific(addr) => BTreeSet::from([resolve_broadcast(*addr)?]),

			Self::Multi(addrs) => {
				let mut resolved = BTreeSet::new();
				for addr in addrs {
					resolved.insert(resolve_broadcast(*addr)?);
				}
				resolved
			}

			Self::All => {
				let all = if_addrs::get_if_addrs()
					.map(|ifaces| {
						ifaces
							.iter()
							.filter(|iface| !iface.is_loopback())
							.filter_map(|iface| match &iface.addr {
								if_addrs::IfAddr::V4(v4) => Some(directed_broadcast(v4)),
								_ => None,
							})
							.collect::<BTreeSet<Ipv4Addr>>()
					})
					.unwrap_or_default();

				if all.is_empty() {
					// Fallback to default
					BTreeSet::from([Ipv4Addr::BROADCAST])
				} else {
					all
				}
			}
		})
	}
}

/// The subnet-directed broadcast address of an interface, computed from the
/// netmask when the OS does not report one.
fn directed_broadcast(v4: &if_addrs::Ifv4Addr) -> Ipv4Addr {
	v4.broadcast
		.unwrap_or_else(|| Ipv4Addr::from(u32::from(v4.ip) | !u32::from(v4.netmask)))
}

fn resolve_broadcast(addr: Ipv4Addr) -> Result<Ipv4Addr, std::io::Error> {
	if_addrs::get_if_addrs()?
		.iter()
		.find_map(|iface| match &iface.addr {
			if_addrs::IfAddr::V4(v4) if v4.ip == addr => Some(directed_broadcast(v4)),
			_ => None,
		})
		.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "Interface not found"))
}
