use kurbo::Point;
use serde::Deserialize;

use super::error::EngineError;

/// A domain as handed over by the graph data provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DomainRecord {
	/// Stable provider id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Fill color; domains without one are not shown.
	#[serde(default)]
	pub style: Option<String>,
	/// Persisted x coordinate.
	#[serde(default)]
	pub x: f64,
	/// Persisted y coordinate.
	#[serde(default)]
	pub y: f64,
}

/// A subject as handed over by the graph data provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubjectRecord {
	/// Stable provider id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Id of the owning domain.
	pub domain: String,
	/// Persisted x coordinate.
	#[serde(default)]
	pub x: f64,
	/// Persisted y coordinate.
	#[serde(default)]
	pub y: f64,
}

/// Directed relation: `source` is a prerequisite of `target`.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Id of the prerequisite.
	pub source: String,
	/// Id of the dependent.
	pub target: String,
}

/// A lecture as handed over by the graph data provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LectureRecord {
	/// Stable provider id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Ids of the subjects covered by the lecture, in lecture order.
	#[serde(default)]
	pub subjects: Vec<String>,
}

/// Everything the engine needs for one graph load.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphData {
	/// All domains, styled or not.
	pub domains: Vec<DomainRecord>,
	/// All subjects.
	pub subjects: Vec<SubjectRecord>,
	/// Prerequisite links between domains.
	pub domain_links: Vec<GraphLink>,
	/// Prerequisite links between subjects.
	pub subject_links: Vec<GraphLink>,
	/// Lectures in display order.
	pub lectures: Vec<LectureRecord>,
}

impl GraphData {
	/// Decodes provider data from JSON.
	pub fn from_json(json: &str) -> Result<Self, EngineError> {
		serde_json::from_str(json).map_err(EngineError::Data)
	}
}

/// Arena index of a [`Node`] inside a loaded graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub usize);

/// Index of a [`Lecture`] inside a loaded graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LectureKey(pub usize);

/// A domain or subject node.
///
/// `x`/`y` is the authoritative position and is mutated in place by drags,
/// physics ticks and view transforms. A node is pinned when both pinned
/// coordinates are set.
#[derive(Clone, Debug, Default)]
pub struct Node {
	/// Provider id.
	pub id: String,
	/// Display name.
	pub label: String,
	/// Fill color as loaded, if any.
	pub style: Option<String>,
	/// Current x position.
	pub x: f64,
	/// Current y position.
	pub y: f64,
	/// Pinned x, mirrored from `x` while pinned.
	pub pinned_x: Option<f64>,
	/// Pinned y, mirrored from `y` while pinned.
	pub pinned_y: Option<f64>,
	/// Owning domain of a subject, `None` for domains.
	pub parent: Option<NodeKey>,
}

impl Node {
	/// Current position as a point.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Moves the node without touching its pin state.
	pub fn set_position(&mut self, p: Point) {
		self.x = p.x;
		self.y = p.y;
	}

	/// True when both pinned coordinates are set.
	pub fn is_pinned(&self) -> bool {
		self.pinned_x.is_some() && self.pinned_y.is_some()
	}
}

/// Key of an edge, derived from its endpoints so that deriving the same edge
/// twice yields an equal key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	/// Prerequisite end.
	pub source: NodeKey,
	/// Dependent end.
	pub target: NodeKey,
}

/// A directed prerequisite edge between two loaded nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	/// Prerequisite end.
	pub source: NodeKey,
	/// Dependent end.
	pub target: NodeKey,
}

impl Edge {
	/// Edge from `source` to `target`.
	pub fn new(source: NodeKey, target: NodeKey) -> Self {
		Self { source, target }
	}

	/// Identity key of the edge.
	pub fn key(&self) -> EdgeKey {
		EdgeKey {
			source: self.source,
			target: self.target,
		}
	}

	/// True when `key` is either endpoint.
	pub fn touches(&self, key: NodeKey) -> bool {
		self.source == key || self.target == key
	}
}

/// A node set plus the edges between them.
#[derive(Clone, Debug, Default)]
pub struct Projection {
	/// Nodes in display order.
	pub nodes: Vec<NodeKey>,
	/// Edges between those nodes.
	pub edges: Vec<Edge>,
}

/// A lecture split into the subjects it requires, covers and unlocks.
#[derive(Clone, Debug, Default)]
pub struct Lecture {
	/// Provider id.
	pub id: String,
	/// Display name.
	pub label: String,
	/// Prerequisites of the covered subjects that the lecture does not cover itself.
	pub past_nodes: Vec<NodeKey>,
	/// Covered subjects, in lecture order.
	pub present_nodes: Vec<NodeKey>,
	/// Subjects unlocked by the covered ones.
	pub future_nodes: Vec<NodeKey>,
	/// Domains owning the covered subjects.
	pub domain_nodes: Vec<NodeKey>,
	/// Past, present and future nodes, in that order.
	pub nodes: Vec<NodeKey>,
	/// Subject edges with both ends in `nodes`.
	pub edges: Vec<Edge>,
}

/// Pan/zoom state of the drawing surface: the world-space focus point and
/// the scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
	/// Focus x in world space.
	pub x: f64,
	/// Focus y in world space.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for CameraTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl CameraTransform {
	/// Transform focusing `(x, y)` at scale `k`.
	pub fn new(x: f64, y: f64, k: f64) -> Self {
		Self { x, y, k }
	}

	/// The focus point.
	pub fn focus(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// Which projection of the graph is on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
	/// One node per styled domain.
	#[default]
	Domains,
	/// One node per subject of a shown domain.
	Subjects,
	/// The selected lecture laid out in columns.
	Lectures,
}

impl View {
	/// Toolbar label.
	pub fn label(self) -> &'static str {
		match self {
			View::Domains => "Domains",
			View::Subjects => "Subjects",
			View::Lectures => "Lectures",
		}
	}

	/// Views in which the user may pan, zoom, drag and run auto-layout.
	pub fn is_editable(self) -> bool {
		matches!(self, View::Domains | View::Subjects)
	}
}

/// What the engine is busy with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
	/// Nothing running.
	#[default]
	Idle,
	/// Auto-layout running.
	Simulating,
	/// A view transition is in flight.
	Transitioning,
}

/// Snapshot pushed to the engine observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewStatus {
	/// Committed view.
	pub view: View,
	/// Current run state.
	pub run: RunState,
	/// Selected lecture, if any.
	pub lecture: Option<LectureKey>,
	/// Whether the zoom-lock warning is showing.
	pub zoom_warning: bool,
	/// Number of nodes whose last save failed.
	pub unsaved: usize,
}
