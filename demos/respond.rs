use floodlight::respond::ResponderBuilder;

fn main() {
	simple_logger::init_with_level(log::Level::Info).unwrap();

	// Pretend an MQTT broker is running here. Devices that discover us will
	// try to connect to it; add further skills for custom modules.
	ResponderBuilder::new()
		.add_skill("MQTT")
		.add_skill("SKILL2")
		.build()
		.expect("Failed to bind the discovery port")
		.run()
		.unwrap();
}
