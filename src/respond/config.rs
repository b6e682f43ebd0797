use crate::message::Identity;

/// A responder's live configuration: the probe marker it answers to, the
/// identity it announces, and the wire payload pre-encoded from it.
pub(super) struct ResponderConfig {
	marker: String,
	identity: Identity,
	payload: Vec<u8>,
}

impl ResponderConfig {
	pub(super) fn new(marker: String, identity: Identity) -> Self {
		let payload = identity.to_payload();
		Self {
			marker,
			identity,
			payload,
		}
	}

	pub(super) fn marker(&self) -> &str {
		&self.marker
	}

	pub(super) fn payload(&self) -> &[u8] {
		&self.payload
	}

	pub(super) fn set_identity(&mut self, identity: Identity) {
		self.identity = identity;
		self.payload = self.identity.to_payload();
	}

	/// Appends a skill to a server identity. No effect on a device identity.
	pub(super) fn add_skill(&mut self, skill: String) {
		if let Identity::Server { skills } = &mut self.identity {
			skills.push(skill);
		}
		self.payload = self.identity.to_payload();
	}

	/// Removes every occurrence of the skill, reporting whether any was
	/// found.
	pub(super) fn remove_skill(&mut self, skill: &str) -> bool {
		let mut found = false;
		if let Identity::Server { skills } = &mut self.identity {
			skills.retain(|s| {
				if s == skill {
					found = true;
					false
				} else {
					true
				}
			});
		}
		self.payload = self.identity.to_payload();
		found
	}

	/// Replaces the advertised skill list, making the identity a server.
	pub(super) fn set_skills(&mut self, skills: Vec<String>) {
		self.set_identity(Identity::Server { skills });
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::REQUEST_MARKER;

	fn config() -> ResponderConfig {
		ResponderConfig::new(REQUEST_MARKER.to_string(), Identity::server(["MQTT"]))
	}

	#[test]
	fn payload_tracks_skill_mutations() {
		let mut config = config();
		assert_eq!(config.payload(), b"SERVER;MQTT");

		config.add_skill("SKILL2".to_string());
		assert_eq!(config.payload(), b"SERVER;MQTT;SKILL2");

		assert!(config.remove_skill("MQTT"));
		assert_eq!(config.payload(), b"SERVER;SKILL2");

		assert!(!config.remove_skill("MQTT"));
	}

	#[test]
	fn set_skills_replaces_the_whole_list() {
		let mut config = config();
		config.set_skills(vec!["A".to_string(), "B".to_string()]);
		assert_eq!(config.payload(), b"SERVER;A;B");
	}

	#[test]
	fn device_identity_ignores_skill_mutations() {
		let mut config =
			ResponderConfig::new(REQUEST_MARKER.to_string(), Identity::device("8211476"));
		assert_eq!(config.payload(), b"DEVICE8211476");

		config.add_skill("MQTT".to_string());
		assert!(!config.remove_skill("MQTT"));
		assert_eq!(config.payload(), b"DEVICE8211476");
	}
}
