use floodlight::{
	discovery::{DiscoveryBuilder, DiscoveryEvent},
	message::Identity,
};

fn describe(identity: &Identity) -> String {
	match identity {
		Identity::Server { skills } => format!("server [{}]", skills.join(", ")),
		Identity::Device { id } => format!("device {id}"),
	}
}

fn main() {
	simple_logger::init_with_level(log::Level::Info).unwrap();

	DiscoveryBuilder::new()
		.build()
		.unwrap()
		.run(|event| match event {
			DiscoveryEvent::ResponderFound(peer) => {
				println!("Found {} at {}", describe(&peer.identity), peer.addr.ip());
			}

			DiscoveryEvent::ResponderLost(peer) => {
				println!(
					"{} at {} has gone away",
					describe(&peer.identity),
					peer.addr.ip()
				);
			}

			DiscoveryEvent::ResponseUpdate { .. } => {}
		})
		.unwrap();
}
