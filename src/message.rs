//! The discovery wire codec.
//!
//! Every datagram is a short UTF-8 string. A probe is the bare request
//! marker. An announcement is either `SERVER;<skill>;<skill>;...` (skill
//! list may be empty, in which case the payload is just `SERVER`) or
//! `DEVICE<id>`. Anything else is foreign traffic sharing the port and
//! decodes to `None`, never to an error.

use crate::{DEVICE_MARKER, SERVER_MARKER, SKILL_DELIMITER};

/// What a responder announces about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
	/// A coordinating server advertising zero or more skills.
	Server {
		/// Opaque skill tokens, order-preserving, duplicates permitted.
		skills: Vec<String>,
	},

	/// A device advertising only an opaque id.
	Device {
		/// The device id, e.g. a chip serial.
		id: String,
	},
}

impl Identity {
	pub fn server<I, S>(skills: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Server {
			skills: skills.into_iter().map(Into::into).collect(),
		}
	}

	pub fn device(id: impl Into<String>) -> Self {
		Self::Device { id: id.into() }
	}

	/// The advertised skill list. Empty for devices.
	pub fn skills(&self) -> &[String] {
		match self {
			Self::Server { skills } => skills,
			Self::Device { .. } => &[],
		}
	}

	/// Whether this identity advertises the given skill (exact match).
	pub fn has_skill(&self, skill: &str) -> bool {
		self.skills().iter().any(|s| s == skill)
	}

	/// Serializes this identity to its wire payload.
	pub fn to_payload(&self) -> Vec<u8> {
		match self {
			Self::Server { skills } => {
				let mut payload = String::from(SERVER_MARKER);
				for skill in skills {
					payload.push(SKILL_DELIMITER);
					payload.push_str(skill);
				}
				payload.into_bytes()
			}

			Self::Device { id } => format!("{DEVICE_MARKER}{id}").into_bytes(),
		}
	}
}

/// A classified discovery datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryMessage {
	/// A discovery probe: the payload equals the request marker byte-exact.
	Request,

	/// An announcement from a responder.
	Announce(Identity),
}

/// Classifies a raw datagram payload.
///
/// Pure and infallible: malformed, truncated or non-UTF-8 payloads simply
/// fail to match any known marker and yield `None`.
pub fn decode(payload: &[u8], request_marker: &str) -> Option<DiscoveryMessage> {
	let text = std::str::from_utf8(payload).ok()?;

	if text == request_marker {
		return Some(DiscoveryMessage::Request);
	}

	let mut tokens = text.split(SKILL_DELIMITER);
	let head = tokens.next()?;

	if head == SERVER_MARKER {
		return Some(DiscoveryMessage::Announce(Identity::Server {
			skills: tokens.map(String::from).collect(),
		}));
	}

	// Device ids carry no delimiter and are never empty.
	if tokens.next().is_none() {
		if let Some(id) = head.strip_prefix(DEVICE_MARKER) {
			if !id.is_empty() {
				return Some(DiscoveryMessage::Announce(Identity::device(id)));
			}
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::REQUEST_MARKER;

	#[test]
	fn probe_is_exact_match() {
		assert_eq!(
			decode(b"MVP3000", REQUEST_MARKER),
			Some(DiscoveryMessage::Request)
		);
		assert_eq!(decode(b"MVP300", REQUEST_MARKER), None);
		assert_eq!(decode(b"mvp3000", REQUEST_MARKER), None);
		assert_eq!(decode(b"MVP3000 ", REQUEST_MARKER), None);
	}

	#[test]
	fn probe_marker_is_configurable() {
		assert_eq!(decode(b"PING42", "PING42"), Some(DiscoveryMessage::Request));
		assert_eq!(decode(b"MVP3000", "PING42"), None);
	}

	#[test]
	fn server_round_trip_preserves_skill_order() {
		let identity = Identity::server(["MQTT", "SKILL2"]);
		let payload = identity.to_payload();
		assert_eq!(payload, b"SERVER;MQTT;SKILL2");
		assert_eq!(
			decode(&payload, REQUEST_MARKER),
			Some(DiscoveryMessage::Announce(identity))
		);
	}

	#[test]
	fn server_without_skills() {
		let identity = Identity::server(Vec::<String>::new());
		assert_eq!(identity.to_payload(), b"SERVER");
		assert_eq!(
			decode(b"SERVER", REQUEST_MARKER),
			Some(DiscoveryMessage::Announce(Identity::server(
				Vec::<String>::new()
			)))
		);
	}

	#[test]
	fn duplicate_skills_are_not_deduplicated() {
		match decode(b"SERVER;MQTT;MQTT", REQUEST_MARKER) {
			Some(DiscoveryMessage::Announce(identity)) => {
				assert_eq!(identity.skills(), ["MQTT", "MQTT"]);
			}
			other => panic!("unexpected classification: {other:?}"),
		}
	}

	#[test]
	fn trailing_delimiter_yields_empty_skill() {
		// Skills are opaque tokens, kept verbatim.
		match decode(b"SERVER;", REQUEST_MARKER) {
			Some(DiscoveryMessage::Announce(identity)) => {
				assert_eq!(identity.skills(), [""]);
			}
			other => panic!("unexpected classification: {other:?}"),
		}
	}

	#[test]
	fn has_skill_is_exact() {
		let identity = Identity::server(["MQTT"]);
		assert!(identity.has_skill("MQTT"));
		assert!(!identity.has_skill("MQT"));
		assert!(!identity.has_skill("mqtt"));
	}

	#[test]
	fn device_round_trip() {
		let identity = Identity::device("8211476");
		assert_eq!(identity.to_payload(), b"DEVICE8211476");
		assert_eq!(
			decode(b"DEVICE8211476", REQUEST_MARKER),
			Some(DiscoveryMessage::Announce(identity))
		);
	}

	#[test]
	fn device_requires_an_id_and_no_delimiter() {
		assert_eq!(decode(b"DEVICE", REQUEST_MARKER), None);
		assert_eq!(decode(b"DEVICE123;MQTT", REQUEST_MARKER), None);
	}

	#[test]
	fn foreign_traffic_is_unknown() {
		assert_eq!(decode(b"hello", REQUEST_MARKER), None);
		assert_eq!(decode(b"", REQUEST_MARKER), None);
		assert_eq!(decode(&[0xff, 0xfe, 0x00], REQUEST_MARKER), None);
		assert_eq!(decode(b"SERVE;MQTT", REQUEST_MARKER), None);
	}
}
