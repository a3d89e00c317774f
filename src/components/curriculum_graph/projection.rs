//! One-time load step: turns provider records into the node arena and the
//! three projections the views render.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::layout::snap_to_grid;
use super::types::{
	Edge, GraphData, GraphLink, Lecture, LectureKey, LectureRecord, Node, NodeKey, Projection,
};

const FALLBACK_COLOR: &str = "#7f7f7f";

/// The loaded curriculum. Owns every node; projections refer to nodes by
/// [`NodeKey`], so a subject is the same record in the subject view and in
/// every lecture that shows it.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	index: HashMap<String, NodeKey>,
	domains: Projection,
	subjects: Projection,
	lectures: Vec<Lecture>,
}

impl Graph {
	/// Builds the graph, silently dropping records that cannot be rendered:
	/// unstyled domains, subjects without a domain, links with a missing
	/// endpoint and duplicate ids.
	pub fn from_data(data: &GraphData, grid_unit: f64) -> Self {
		let mut graph = Graph::default();

		for record in &data.domains {
			let Some(style) = record.style.clone().filter(|s| !s.trim().is_empty()) else {
				debug!("dropping unstyled domain `{}`", record.id);
				continue;
			};
			let node = Node {
				id: record.id.clone(),
				label: record.name.clone(),
				style: Some(style),
				x: record.x,
				y: record.y,
				..Node::default()
			};
			if let Some(key) = graph.insert(node, grid_unit) {
				graph.domains.nodes.push(key);
			}
		}

		let domain_set: HashSet<NodeKey> = graph.domains.nodes.iter().copied().collect();
		for record in &data.subjects {
			let parent = graph.index.get(&record.domain).copied().filter(|k| domain_set.contains(k));
			let Some(parent) = parent else {
				debug!("dropping subject `{}`: domain `{}` is not shown", record.id, record.domain);
				continue;
			};
			let node = Node {
				id: record.id.clone(),
				label: record.name.clone(),
				x: record.x,
				y: record.y,
				parent: Some(parent),
				..Node::default()
			};
			if let Some(key) = graph.insert(node, grid_unit) {
				graph.subjects.nodes.push(key);
			}
		}

		let subject_set: HashSet<NodeKey> = graph.subjects.nodes.iter().copied().collect();
		let domain_edges = graph.resolve_links(&data.domain_links, &domain_set);
		let subject_edges = graph.resolve_links(&data.subject_links, &subject_set);
		graph.domains.edges = domain_edges;
		graph.subjects.edges = subject_edges;

		let lectures: Vec<Lecture> = data
			.lectures
			.iter()
			.map(|record| graph.project_lecture(record, &subject_set))
			.collect();
		graph.lectures = lectures;

		debug!(
			"graph loaded: {} domains, {} subjects, {} lectures",
			graph.domains.nodes.len(),
			graph.subjects.nodes.len(),
			graph.lectures.len()
		);
		graph
	}

	fn insert(&mut self, mut node: Node, grid_unit: f64) -> Option<NodeKey> {
		if self.index.contains_key(&node.id) {
			debug!("dropping duplicate node id `{}`", node.id);
			return None;
		}
		node.x = snap_to_grid(node.x, grid_unit);
		node.y = snap_to_grid(node.y, grid_unit);
		node.pinned_x = Some(node.x);
		node.pinned_y = Some(node.y);
		let key = NodeKey(self.nodes.len());
		self.index.insert(node.id.clone(), key);
		self.nodes.push(node);
		Some(key)
	}

	fn resolve_links(&self, links: &[GraphLink], allowed: &HashSet<NodeKey>) -> Vec<Edge> {
		let mut seen = HashSet::new();
		let mut edges = Vec::new();
		for link in links {
			let endpoint = |id: &str| self.index.get(id).copied().filter(|k| allowed.contains(k));
			let (Some(source), Some(target)) = (endpoint(&link.source), endpoint(&link.target))
			else {
				debug!("dropping link `{}` -> `{}`: endpoint missing", link.source, link.target);
				continue;
			};
			if source == target {
				continue;
			}
			let edge = Edge::new(source, target);
			if seen.insert(edge.key()) {
				edges.push(edge);
			}
		}
		edges
	}

	fn project_lecture(&self, record: &LectureRecord, subjects: &HashSet<NodeKey>) -> Lecture {
		let mut present = Vec::new();
		for id in &record.subjects {
			match self.index.get(id).copied().filter(|k| subjects.contains(k)) {
				Some(key) if !present.contains(&key) => present.push(key),
				Some(_) => {}
				None => debug!("lecture `{}` skips unknown subject `{}`", record.id, id),
			}
		}

		let (mut past, mut future) = (Vec::new(), Vec::new());
		for key in &present {
			for edge in &self.subjects.edges {
				if edge.target == *key && !present.contains(&edge.source) && !past.contains(&edge.source) {
					past.push(edge.source);
				}
			}
		}
		for key in &present {
			for edge in &self.subjects.edges {
				let dependent = edge.target;
				if edge.source == *key
					&& !present.contains(&dependent)
					&& !past.contains(&dependent)
					&& !future.contains(&dependent)
				{
					future.push(dependent);
				}
			}
		}

		let mut domains = Vec::new();
		for key in &present {
			if let Some(parent) = self.node(*key).parent {
				if !domains.contains(&parent) {
					domains.push(parent);
				}
			}
		}

		let nodes: Vec<NodeKey> = past.iter().chain(&present).chain(&future).copied().collect();
		let edges = self
			.subjects
			.edges
			.iter()
			.filter(|edge| nodes.contains(&edge.source) && nodes.contains(&edge.target))
			.copied()
			.collect();

		Lecture {
			id: record.id.clone(),
			label: record.name.clone(),
			past_nodes: past,
			present_nodes: present,
			future_nodes: future,
			domain_nodes: domains,
			nodes,
			edges,
		}
	}

	/// Record for `key`.
	pub fn node(&self, key: NodeKey) -> &Node {
		&self.nodes[key.0]
	}

	/// Mutable record for `key`.
	pub fn node_mut(&mut self, key: NodeKey) -> &mut Node {
		&mut self.nodes[key.0]
	}

	/// Key of the node with provider id `id`.
	pub fn key_of(&self, id: &str) -> Option<NodeKey> {
		self.index.get(id).copied()
	}

	/// The domain view: styled domains and the links between them.
	pub fn domains(&self) -> &Projection {
		&self.domains
	}

	/// The subject view.
	pub fn subjects(&self) -> &Projection {
		&self.subjects
	}

	/// Projected lecture for `key`.
	pub fn lecture(&self, key: LectureKey) -> &Lecture {
		&self.lectures[key.0]
	}

	/// Every lecture key in load order.
	pub fn lecture_keys(&self) -> Vec<LectureKey> {
		(0..self.lectures.len()).map(LectureKey).collect()
	}

	/// True when `key` names a loaded lecture.
	pub fn has_lecture(&self, key: LectureKey) -> bool {
		key.0 < self.lectures.len()
	}

	/// Fill color of a node: its own style, or its domain's.
	pub fn color_of(&self, key: NodeKey) -> &str {
		let node = self.node(key);
		node.style
			.as_deref()
			.or_else(|| node.parent.and_then(|p| self.node(p).style.as_deref()))
			.unwrap_or(FALLBACK_COLOR)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::Graph;
	use crate::components::curriculum_graph::types::{
		DomainRecord, GraphData, GraphLink, LectureRecord, NodeKey, SubjectRecord,
	};

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Domains `A -> B -> C`, subjects `x in A`, `y in B`, `z in C` with
	/// `x -> y -> z`, and one lecture covering `y`.
	pub(crate) fn chain_data(style_b: bool) -> GraphData {
		let domain = |id: &str, x: f64, styled: bool| DomainRecord {
			id: id.into(),
			name: format!("Domain {id}"),
			style: styled.then(|| "#1f77b4".to_string()),
			x,
			y: 0.0,
		};
		let subject = |id: &str, domain: &str, x: f64| SubjectRecord {
			id: id.into(),
			name: format!("Subject {id}"),
			domain: domain.into(),
			x,
			y: 120.4,
		};
		GraphData {
			domains: vec![domain("A", 0.0, true), domain("B", 300.0, style_b), domain("C", 600.0, true)],
			subjects: vec![subject("x", "A", -20.0), subject("y", "B", 310.0), subject("z", "C", 640.0)],
			domain_links: vec![link("A", "B"), link("B", "C")],
			subject_links: vec![link("x", "y"), link("y", "z")],
			lectures: vec![LectureRecord {
				id: "L1".into(),
				name: "Lecture 1".into(),
				subjects: vec!["y".into()],
			}],
		}
	}

	pub(crate) fn chain_graph(style_b: bool) -> Graph {
		Graph::from_data(&chain_data(style_b), 1.0)
	}

	fn ids(graph: &Graph, keys: &[NodeKey]) -> Vec<String> {
		keys.iter().map(|k| graph.node(*k).id.clone()).collect()
	}

	#[test]
	fn chain_projects_all_three_views() {
		let graph = chain_graph(true);
		assert_eq!(graph.domains().nodes.len(), 3);
		assert_eq!(graph.domains().edges.len(), 2);
		assert_eq!(graph.subjects().nodes.len(), 3);
		assert_eq!(graph.subjects().edges.len(), 2);

		let lecture = graph.lecture(graph.lecture_keys()[0]);
		assert_eq!(ids(&graph, &lecture.present_nodes), ["y"]);
		assert_eq!(ids(&graph, &lecture.past_nodes), ["x"]);
		assert_eq!(ids(&graph, &lecture.future_nodes), ["z"]);
		assert_eq!(ids(&graph, &lecture.domain_nodes), ["B"]);
		assert_eq!(lecture.nodes.len(), 3);
		assert_eq!(lecture.edges.len(), 2);
	}

	#[test]
	fn unstyled_domain_drops_its_subjects_and_links() {
		let graph = chain_graph(false);
		assert_eq!(ids(&graph, &graph.domains().nodes), ["A", "C"]);
		assert!(graph.domains().edges.is_empty());
		assert_eq!(ids(&graph, &graph.subjects().nodes), ["x", "z"]);
		assert!(graph.subjects().edges.is_empty());

		let lecture = graph.lecture(graph.lecture_keys()[0]);
		assert!(lecture.present_nodes.is_empty());
		assert!(lecture.past_nodes.is_empty());
		assert!(lecture.future_nodes.is_empty());
		assert!(lecture.nodes.is_empty());
		assert!(lecture.edges.is_empty());
	}

	#[test]
	fn loaded_nodes_are_pinned_on_the_grid() {
		let graph = chain_graph(true);
		let y = graph.node(graph.key_of("y").unwrap());
		assert_eq!(y.y, 120.0);
		assert!(y.is_pinned());
		assert_eq!(y.pinned_y, Some(120.0));
	}

	#[test]
	fn subject_between_two_present_subjects_is_past_only() {
		let mut data = chain_data(true);
		data.lectures[0].subjects = vec!["x".into(), "z".into(), "x".into(), "ghost".into()];
		let graph = Graph::from_data(&data, 1.0);
		let lecture = graph.lecture(graph.lecture_keys()[0]);
		assert_eq!(ids(&graph, &lecture.present_nodes), ["x", "z"]);
		assert_eq!(ids(&graph, &lecture.past_nodes), ["y"]);
		assert!(lecture.future_nodes.is_empty());
		assert_eq!(lecture.nodes.len(), 3);
	}

	#[test]
	fn dangling_and_duplicate_links_are_filtered() {
		let mut data = chain_data(true);
		data.subject_links.push(link("x", "y"));
		data.subject_links.push(link("x", "nowhere"));
		data.subject_links.push(link("z", "z"));
		let graph = Graph::from_data(&data, 1.0);
		assert_eq!(graph.subjects().edges.len(), 2);
	}

	#[test]
	fn subjects_inherit_domain_color() {
		let graph = chain_graph(true);
		assert_eq!(graph.color_of(graph.key_of("x").unwrap()), "#1f77b4");
	}
}
