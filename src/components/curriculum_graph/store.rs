use log::info;

use super::error::SaveError;
use super::types::Node;

/// Persistence hook called whenever a node becomes pinned at a new position.
///
/// Calls are fire-and-forget from the engine's point of view: a failure is
/// recorded as an unsaved node and can be retried, never raised to the
/// caller of the gesture that triggered it.
pub trait NodeStore {
	fn save(&mut self, node: &Node) -> Result<(), SaveError>;
}

/// Store that only logs; used by the demo page.
#[derive(Clone, Debug, Default)]
pub struct LogStore;

impl NodeStore for LogStore {
	fn save(&mut self, node: &Node) -> Result<(), SaveError> {
		info!("saved `{}` at ({}, {})", node.id, node.x, node.y);
		Ok(())
	}
}

impl<F> NodeStore for F
where
	F: FnMut(&Node) -> Result<(), SaveError>,
{
	fn save(&mut self, node: &Node) -> Result<(), SaveError> {
		self(node)
	}
}
