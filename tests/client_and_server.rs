use floodlight::{
	discovery::{DiscoveryBuilder, DiscoveryEvent},
	net::TargetInterface,
	respond::ResponderBuilder,
};
use std::{
	collections::BTreeSet,
	net::Ipv4Addr,
	sync::{Arc, Mutex},
	time::Duration,
};

const TEST_PORT: u16 = 41211;

#[test]
fn client_and_server() {
	simple_logger::init_with_level(log::Level::Debug).ok();

	let (test_tx, test_rx) = std::sync::mpsc::sync_channel(0);

	std::thread::spawn(move || {
		let (tx, rx) = std::sync::mpsc::sync_channel(0);

		println!("Starting responder");

		let server = Arc::new(Mutex::new(Some(
			ResponderBuilder::new()
				.port(TEST_PORT)
				.add_skill("MQTT")
				.add_skill("SKILL2")
				.build()
				.expect("Failed to create responder")
				.run_in_background(),
		)));

		println!("Responder is running");

		println!("Starting discovery");

		// Probe only the loopback so the test stays on this host, and bind
		// the reply listener to 127.0.0.1 so the unicast reply reaches it
		// rather than the responder's wildcard socket.
		let server_ref = server.clone();
		let client = DiscoveryBuilder::new()
			.port(TEST_PORT)
			.bind_addr(Ipv4Addr::LOCALHOST)
			.interface(TargetInterface::Multi(BTreeSet::new()))
			.loopback()
			.interval(Duration::from_millis(250))
			.max_ignored_probes(2)
			.build()
			.unwrap()
			.run_in_background(move |event| match event {
				DiscoveryEvent::ResponderFound(peer) => {
					println!("Got ResponderFound for {}", peer.addr);

					assert_eq!(peer.addr.ip(), Ipv4Addr::LOCALHOST);
					assert_eq!(peer.identity.skills(), ["MQTT", "SKILL2"]);
					assert!(peer.has_skill("MQTT"));

					// Shut down the responder so we can get a ResponderLost event
					if let Some(server) = server_ref.lock().unwrap().take() {
						server.shutdown().unwrap();
					}
				}

				DiscoveryEvent::ResponderLost(peer) => {
					println!("Got ResponderLost for {}", peer.addr);
					// We're done here
					tx.try_send(()).ok();
				}

				DiscoveryEvent::ResponseUpdate { .. } => {}
			});

		println!("Discovery is running");

		let res = rx.recv_timeout(Duration::from_secs(30));

		println!("Shutting down responder");
		if let Some(server) = server.lock().unwrap().take() {
			println!("Responder status: {:?}", server.shutdown());
		} else {
			println!("Responder status: Shutdown");
		}

		println!("Shutting down discovery");
		println!("Discovery status: {:?}", client.shutdown());

		res.expect("Timed out waiting for the responder to be found and lost");

		test_tx.send(()).ok();
	});

	test_rx
		.recv_timeout(Duration::from_secs(60))
		.expect("Timed out waiting for test to finish");
}
