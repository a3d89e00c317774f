use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::config::EngineConfig;
use super::projection::Graph;
use super::types::{Edge, NodeKey};

pub fn snap_to_grid(value: f64, unit: f64) -> f64 {
	if unit <= 0.0 {
		return value.round();
	}
	(value / unit).round() * unit
}

/// Pins or frees `keys`. Pinning snaps the position to the grid and mirrors
/// it into the pinned coordinates; freeing clears them so the simulation may
/// move the node. Returns the keys whose pin state actually changed.
pub fn set_pinned(graph: &mut Graph, keys: &[NodeKey], pinned: bool, grid_unit: f64) -> Vec<NodeKey> {
	let mut changed = Vec::new();
	for &key in keys {
		let node = graph.node_mut(key);
		let was_pinned = node.is_pinned();
		if pinned {
			node.x = snap_to_grid(node.x, grid_unit);
			node.y = snap_to_grid(node.y, grid_unit);
			node.pinned_x = Some(node.x);
			node.pinned_y = Some(node.y);
		} else {
			node.pinned_x = None;
			node.pinned_y = None;
		}
		if was_pinned != pinned {
			changed.push(key);
		}
	}
	changed
}

/// Continuous force layout over the rendered node set.
///
/// Repulsion and the link springs come from [`ForceGraph`]; two centering
/// forces pull free nodes toward the world origin on each axis. Pinned nodes
/// are anchors. Energy (`alpha`) decays every tick and the layout goes quiet
/// below `alpha_min`.
pub struct ForceLayout {
	sim: ForceGraph<NodeKey, ()>,
	index: HashMap<NodeKey, DefaultNodeIdx>,
	links: usize,
	alpha: f64,
	running: bool,
	config: EngineConfig,
}

impl ForceLayout {
	pub fn new(config: &EngineConfig) -> Self {
		Self {
			sim: ForceGraph::new(config.simulation_parameters()),
			index: HashMap::new(),
			links: 0,
			alpha: 0.0,
			running: false,
			config: config.clone(),
		}
	}

	/// Replaces the simulated node set and link force with exactly `nodes`
	/// and the `edges` between them.
	pub fn reseed(&mut self, graph: &Graph, nodes: &[NodeKey], edges: &[Edge]) {
		self.sim = ForceGraph::new(self.config.simulation_parameters());
		self.index.clear();
		self.links = 0;
		for &key in nodes {
			let node = graph.node(key);
			let idx = self.sim.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: self.config.node_mass,
				is_anchor: node.is_pinned(),
				user_data: key,
			});
			self.index.insert(key, idx);
		}
		for edge in edges {
			if let (Some(&src), Some(&tgt)) = (self.index.get(&edge.source), self.index.get(&edge.target)) {
				self.sim.add_edge(src, tgt, EdgeData::default());
				self.links += 1;
			}
		}
	}

	/// Nodes in the simulation.
	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn link_count(&self) -> usize {
		self.links
	}

	#[cfg(test)]
	pub fn contains(&self, key: NodeKey) -> bool {
		self.index.contains_key(&key)
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Copies every simulated node's record position and pin state into the
	/// simulation. Records are authoritative; this must run before the
	/// simulation moves anything after the records were changed elsewhere.
	pub fn sync(&mut self, graph: &Graph) {
		self.sim.visit_nodes_mut(|node| {
			let record = graph.node(node.data.user_data);
			node.data.x = record.x as f32;
			node.data.y = record.y as f32;
			node.data.is_anchor = record.is_pinned();
		});
	}

	/// Starts from a high-energy state at the current record positions.
	pub fn restart(&mut self, graph: &Graph) {
		self.sync(graph);
		self.alpha = 1.0;
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Bumps the energy of a running layout, e.g. while a node is dragged.
	pub fn reheat(&mut self) {
		if self.running {
			self.alpha = self.alpha.max(self.config.drag_alpha);
		}
	}

	/// Advances the layout by `dt` seconds and writes free node positions back
	/// into `graph`. Returns whether anything moved.
	pub fn tick(&mut self, dt: f64, graph: &mut Graph) -> bool {
		if !self.running || self.alpha < self.config.alpha_min {
			return false;
		}

		self.sim.visit_nodes_mut(|node| {
			let record = graph.node(node.data.user_data);
			match (record.pinned_x, record.pinned_y) {
				(Some(px), Some(py)) => {
					node.data.is_anchor = true;
					node.data.x = px as f32;
					node.data.y = py as f32;
				}
				_ => node.data.is_anchor = false,
			}
		});

		self.sim.update((dt * self.alpha) as f32);

		let pull = (self.config.centering_strength * self.alpha) as f32;
		let mut moved = Vec::new();
		self.sim.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			node.data.x -= node.data.x * pull;
			node.data.y -= node.data.y * pull;
			moved.push((node.data.user_data, node.data.x as f64, node.data.y as f64));
		});
		for (key, x, y) in moved {
			let record = graph.node_mut(key);
			record.x = x;
			record.y = y;
		}

		self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
		true
	}
}
