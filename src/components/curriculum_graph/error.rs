use thiserror::Error;

/// Errors raised by the graph engine.
#[derive(Debug, Error)]
pub enum EngineError {
	/// A camera or view operation ran before the engine was attached to a
	/// drawing surface.
	#[error("engine is not attached to a drawing surface")]
	Detached,
	/// A lecture key outside the loaded set.
	#[error("no lecture with key {0}")]
	UnknownLecture(usize),
	/// Configuration JSON could not be decoded.
	#[error("invalid engine configuration: {0}")]
	Config(#[source] serde_json::Error),
	/// Graph data JSON could not be decoded.
	#[error("invalid graph data: {0}")]
	Data(#[source] serde_json::Error),
}

/// Failure reported by a [`NodeStore`](super::store::NodeStore).
#[derive(Debug, Error)]
#[error("failed to save node `{node}`: {reason}")]
pub struct SaveError {
	/// Id of the node that was not saved.
	pub node: String,
	/// Store-specific failure description.
	pub reason: String,
}
