use super::presence::DiscoveredPeer;
use std::sync::Arc;

pub type EventHandler = Arc<dyn Fn(DiscoveryEvent) + Send + Sync + 'static>;

#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
	/// A peer answered a probe for the first time.
	ResponderFound(Arc<DiscoveredPeer>),

	/// A known peer ignored too many consecutive probes.
	ResponderLost(Arc<DiscoveredPeer>),

	/// A known peer answered again, possibly with a changed identity.
	ResponseUpdate {
		old: Arc<DiscoveredPeer>,
		new: Arc<DiscoveredPeer>,
	},
}
