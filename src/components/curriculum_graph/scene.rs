//! Retained content layer: which nodes and edges are on screen, where they
//! are drawn and how opaque they are.

use std::collections::HashSet;
use std::hash::Hash;

use kurbo::{Line, Point, Size};

use super::geometry::route_edge;
use super::projection::Graph;
use super::timing::Tween;
use super::types::{Edge, EdgeKey, NodeKey};

/// Result of diffing two keyed sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedDiff<K> {
	pub entering: Vec<K>,
	pub updating: Vec<K>,
	pub exiting: Vec<K>,
}

/// Splits `next` against `previous` into entering, updating and exiting keys.
/// Entering and updating keep the order of `next`, exiting the order of
/// `previous`.
pub fn diff_keys<K: Copy + Eq + Hash>(previous: &[K], next: &[K]) -> KeyedDiff<K> {
	let before: HashSet<K> = previous.iter().copied().collect();
	let after: HashSet<K> = next.iter().copied().collect();
	let mut seen = HashSet::new();
	let (mut entering, mut updating) = (Vec::new(), Vec::new());
	for key in next {
		if !seen.insert(*key) {
			continue;
		}
		if before.contains(key) {
			updating.push(*key);
		} else {
			entering.push(*key);
		}
	}
	let exiting = previous.iter().copied().filter(|k| !after.contains(k)).collect();
	KeyedDiff {
		entering,
		updating,
		exiting,
	}
}

/// Counts of the work one reconciliation performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub entered: usize,
	pub updated: usize,
	pub exited: usize,
}

impl ReconcileReport {
	pub fn is_noop(&self) -> bool {
		self.entered == 0 && self.exited == 0
	}
}

/// Opacity of one scene element, fading toward 0 or 1.
#[derive(Clone, Debug)]
struct Fade {
	opacity: f64,
	tween: Option<Tween<f64>>,
	exiting: bool,
}

impl Fade {
	fn entering(now: f64, duration: f64) -> Self {
		let mut fade = Fade {
			opacity: 0.0,
			tween: None,
			exiting: false,
		};
		fade.fade_to(1.0, now, duration);
		fade
	}

	fn fade_to(&mut self, target: f64, now: f64, duration: f64) {
		if duration <= 0.0 {
			self.opacity = target;
			self.tween = None;
		} else {
			self.tween = Some(Tween::new(self.opacity, target, now, duration));
		}
	}

	fn advance(&mut self, now: f64) {
		if let Some(tween) = self.tween {
			self.opacity = tween.sample(now);
			if tween.is_done(now) {
				self.tween = None;
			}
		}
	}

	/// An exiting element whose fade has run out.
	fn is_gone(&self) -> bool {
		self.exiting && self.tween.is_none()
	}
}

/// A node as drawn.
#[derive(Clone, Debug)]
pub struct SceneNode {
	/// Record the node draws.
	pub key: NodeKey,
	/// Where the node is drawn; trails the record position while animating.
	pub position: Point,
	motion: Option<Tween<Point>>,
	fade: Fade,
}

impl SceneNode {
	/// Current opacity in `0..=1`.
	pub fn opacity(&self) -> f64 {
		self.fade.opacity
	}

	/// True while fading out before removal.
	pub fn is_exiting(&self) -> bool {
		self.fade.exiting
	}
}

/// An edge as drawn.
#[derive(Clone, Debug)]
pub struct SceneEdge {
	/// The edge drawn.
	pub edge: Edge,
	/// Routed segment, refreshed whenever either end moves.
	pub route: Line,
	fade: Fade,
}

impl SceneEdge {
	/// Identity key of the edge.
	pub fn key(&self) -> EdgeKey {
		self.edge.key()
	}

	/// Current opacity in `0..=1`.
	pub fn opacity(&self) -> f64 {
		self.fade.opacity
	}

	/// True while fading out before removal.
	pub fn is_exiting(&self) -> bool {
		self.fade.exiting
	}
}

/// The rendered content layer, keyed by node and edge identity.
///
/// Elements list in draw order; later entries are drawn on top.
#[derive(Clone, Debug)]
pub struct Scene {
	nodes: Vec<SceneNode>,
	edges: Vec<SceneEdge>,
	node_size: Size,
	node_margin: f64,
}

impl Scene {
	/// Empty scene for nodes of `node_size` with `node_margin` around them.
	pub fn new(node_size: Size, node_margin: f64) -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			node_size,
			node_margin,
		}
	}

	/// Rendered nodes in draw order, exiting ones included.
	pub fn nodes(&self) -> &[SceneNode] {
		&self.nodes
	}

	/// Rendered edges, exiting ones included.
	pub fn edges(&self) -> &[SceneEdge] {
		&self.edges
	}

	/// Keys of nodes that are rendered and not fading out.
	pub fn live_nodes(&self) -> Vec<NodeKey> {
		self.nodes.iter().filter(|n| !n.is_exiting()).map(|n| n.key).collect()
	}

	/// Edges that are rendered and not fading out.
	pub fn live_edges(&self) -> Vec<Edge> {
		self.edges.iter().filter(|e| !e.is_exiting()).map(|e| e.edge).collect()
	}

	/// The rendered node for `key`, exiting or not.
	pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
		self.nodes.iter().find(|n| n.key == key)
	}

	/// True while any fade or move is in flight.
	pub fn is_animating(&self) -> bool {
		self.nodes.iter().any(|n| n.motion.is_some() || n.fade.tween.is_some())
			|| self.edges.iter().any(|e| e.fade.tween.is_some())
	}

	/// Diffs the rendered scene against `nodes`/`edges`.
	///
	/// Entering elements start transparent at their record position and fade
	/// in; exiting elements fade out and are only dropped by [`advance`] once
	/// the fade has finished. An element that is still fading out and shows
	/// up again is revived in place.
	///
	/// [`advance`]: Scene::advance
	pub fn reconcile(
		&mut self,
		graph: &Graph,
		nodes: &[NodeKey],
		edges: &[Edge],
		now: f64,
		duration: f64,
	) -> ReconcileReport {
		if nodes.is_empty() && edges.is_empty() {
			return self.clear(now, duration);
		}

		let node_diff = diff_keys(&self.live_nodes(), nodes);
		let live_edges: Vec<EdgeKey> = self.live_edges().iter().map(Edge::key).collect();
		let wanted: Vec<Edge> = edges
			.iter()
			.filter(|e| nodes.contains(&e.source) && nodes.contains(&e.target))
			.copied()
			.collect();
		let edge_keys: Vec<EdgeKey> = wanted.iter().map(Edge::key).collect();
		let edge_diff = diff_keys(&live_edges, &edge_keys);

		for key in &node_diff.exiting {
			if let Some(node) = self.nodes.iter_mut().find(|n| n.key == *key) {
				node.fade.exiting = true;
				node.fade.fade_to(0.0, now, duration);
			}
		}
		for key in &edge_diff.exiting {
			if let Some(edge) = self.edges.iter_mut().find(|e| e.key() == *key) {
				edge.fade.exiting = true;
				edge.fade.fade_to(0.0, now, duration);
			}
		}

		for key in &node_diff.entering {
			match self.nodes.iter_mut().find(|n| n.key == *key) {
				Some(node) => {
					node.fade.exiting = false;
					node.fade.fade_to(1.0, now, duration);
				}
				None => self.nodes.push(SceneNode {
					key: *key,
					position: graph.node(*key).position(),
					motion: None,
					fade: Fade::entering(now, duration),
				}),
			}
		}
		for key in &edge_diff.entering {
			match self.edges.iter_mut().find(|e| e.key() == *key) {
				Some(edge) => {
					edge.fade.exiting = false;
					edge.fade.fade_to(1.0, now, duration);
				}
				None => {
					let edge = Edge::new(key.source, key.target);
					self.edges.push(SceneEdge {
						edge,
						route: Line::new(Point::ZERO, Point::ZERO),
						fade: Fade::entering(now, duration),
					});
				}
			}
		}

		self.sweep();
		self.refresh_routes();
		ReconcileReport {
			entered: node_diff.entering.len() + edge_diff.entering.len(),
			updated: node_diff.updating.len() + edge_diff.updating.len(),
			exited: node_diff.exiting.len() + edge_diff.exiting.len(),
		}
	}

	/// Fades every live element out.
	fn clear(&mut self, now: f64, duration: f64) -> ReconcileReport {
		let mut exited = 0;
		for fade in self
			.nodes
			.iter_mut()
			.map(|n| &mut n.fade)
			.chain(self.edges.iter_mut().map(|e| &mut e.fade))
			.filter(|f| !f.exiting)
		{
			fade.exiting = true;
			fade.fade_to(0.0, now, duration);
			exited += 1;
		}
		self.sweep();
		ReconcileReport {
			exited,
			..ReconcileReport::default()
		}
	}

	/// Moves every rendered node to its record position, animated when
	/// `duration` is positive, and re-routes the edges.
	pub fn reposition_all(&mut self, graph: &Graph, now: f64, duration: f64) {
		for node in &mut self.nodes {
			let target = graph.node(node.key).position();
			if duration <= 0.0 {
				node.position = target;
				node.motion = None;
			} else {
				node.motion = Some(Tween::new(node.position, target, now, duration));
			}
		}
		self.refresh_routes();
	}

	/// Moves `key` to the end of the draw order so it renders on top.
	pub fn raise(&mut self, key: NodeKey) {
		if let Some(i) = self.nodes.iter().position(|n| n.key == key) {
			let node = self.nodes.remove(i);
			self.nodes.push(node);
		}
	}

	/// Advances fades and moves to `now`, dropping elements that finished
	/// fading out.
	pub fn advance(&mut self, now: f64) {
		for node in &mut self.nodes {
			node.fade.advance(now);
			if let Some(motion) = node.motion {
				node.position = motion.sample(now);
				if motion.is_done(now) {
					node.motion = None;
				}
			}
		}
		for edge in &mut self.edges {
			edge.fade.advance(now);
		}
		self.sweep();
		self.refresh_routes();
	}

	/// Topmost live node whose rectangle contains the world point.
	pub fn node_at(&self, world: Point) -> Option<NodeKey> {
		let (hw, hh) = (self.node_size.width / 2.0, self.node_size.height / 2.0);
		self.nodes
			.iter()
			.rev()
			.filter(|n| !n.is_exiting())
			.find(|n| (n.position.x - world.x).abs() <= hw && (n.position.y - world.y).abs() <= hh)
			.map(|n| n.key)
	}

	fn sweep(&mut self) {
		self.nodes.retain(|n| !n.fade.is_gone());
		self.edges.retain(|e| !e.fade.is_gone());
	}

	fn refresh_routes(&mut self) {
		let (size, margin) = (self.node_size, self.node_margin);
		let nodes = &self.nodes;
		let position = |key: NodeKey| nodes.iter().find(|n| n.key == key).map(|n| n.position);
		for edge in &mut self.edges {
			if let (Some(source), Some(target)) = (position(edge.edge.source), position(edge.edge.target)) {
				edge.route = route_edge(source, target, size, margin);
			}
		}
	}
}
