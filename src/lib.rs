#![cfg_attr(docsrs, feature(doc_cfg))]

//! UDP broadcast discovery for headless devices on a local network.
//!
//! Two roles share one wire protocol: a [`discovery`] requester broadcasts a
//! probe to the discovery port and collects the unicast announcements that
//! come back, and a [`respond`] responder listens on the same port and
//! answers every probe with its identity and capability list.

use std::net::Ipv4Addr;

#[macro_use]
extern crate thiserror;

mod socket;

pub mod errors;
pub mod message;
pub mod net;

#[cfg(feature = "discovery")]
#[cfg_attr(docsrs, doc(cfg(feature = "discovery")))]
pub mod discovery;

#[cfg(feature = "respond")]
#[cfg_attr(docsrs, doc(cfg(feature = "respond")))]
pub mod respond;

/// The well-known UDP port both roles bind to. Must match between a
/// requester and the responders it is meant to find.
pub const DISCOVERY_PORT: u16 = 4211;

/// Default probe marker. Opaque, compared byte-exact.
pub const REQUEST_MARKER: &str = "MVP3000";

/// Marker prefixing a server announcement (`SERVER;<skill>;...`).
pub const SERVER_MARKER: &str = "SERVER";

/// Marker prefixing a device announcement (`DEVICE<id>`).
pub const DEVICE_MARKER: &str = "DEVICE";

/// Delimiter between the server marker and its skill tokens.
pub const SKILL_DELIMITER: char = ';';

/// Broadcast address of the loopback interface, targeted by
/// [`DiscoveryBuilder::loopback`](discovery::DiscoveryBuilder::loopback)
/// for same-host discovery.
pub const LOOPBACK_BROADCAST: Ipv4Addr = Ipv4Addr::new(127, 255, 255, 255);
