//! Position transforms mapping a node to where a view wants it.

use std::collections::HashMap;

use kurbo::{Point, Rect};

use super::config::EngineConfig;
use super::projection::Graph;
use super::types::{Lecture, NodeKey};

/// Moves a subject onto its domain. Domains are left alone.
pub fn to_parent_position(graph: &mut Graph, key: NodeKey) {
	let Some(parent) = graph.node(key).parent else {
		return;
	};
	let target = graph.node(parent).position();
	graph.node_mut(key).set_position(target);
}

/// Which lecture column a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
	/// Subjects the lecture unlocks, drawn on the left.
	Future,
	/// Subjects the lecture covers.
	Present,
	/// Prerequisites, drawn on the right.
	Past,
}

impl Column {
	/// Columns left to right.
	pub const ALL: [Column; 3] = [Column::Future, Column::Present, Column::Past];

	fn index(self) -> usize {
		match self {
			Column::Future => 0,
			Column::Present => 1,
			Column::Past => 2,
		}
	}

	/// Column heading.
	pub fn title(self) -> &'static str {
		match self {
			Column::Future => "After",
			Column::Present => "Now",
			Column::Past => "Before",
		}
	}
}

/// Column geometry for one lecture, centered on `origin`.
///
/// The tallest of the three lists sets the panel height; slots stack top to
/// bottom in list order.
#[derive(Clone, Debug)]
pub struct LectureColumns {
	origin: Point,
	column_width: f64,
	row_height: f64,
	padding: f64,
	rows: usize,
	slots: HashMap<NodeKey, (Column, usize)>,
}

impl LectureColumns {
	/// Column geometry for `lecture` centered on `origin`.
	pub fn new(lecture: &Lecture, origin: Point, config: &EngineConfig) -> Self {
		let padding = config.column_padding;
		let mut slots = HashMap::new();
		for (column, list) in [
			(Column::Past, &lecture.past_nodes),
			(Column::Present, &lecture.present_nodes),
			(Column::Future, &lecture.future_nodes),
		] {
			for (row, key) in list.iter().enumerate() {
				slots.entry(*key).or_insert((column, row));
			}
		}
		let rows = lecture
			.past_nodes
			.len()
			.max(lecture.present_nodes.len())
			.max(lecture.future_nodes.len());
		Self {
			origin,
			column_width: config.node_width + 2.0 * padding,
			row_height: config.node_height + padding,
			padding,
			rows,
			slots,
		}
	}

	/// The panel holding all three columns.
	pub fn panel(&self) -> Rect {
		let width = 3.0 * self.column_width;
		let height = self.rows as f64 * self.row_height + self.padding;
		Rect::from_center_size(self.origin, (width, height))
	}

	/// Bounds of one column.
	pub fn column_rect(&self, column: Column) -> Rect {
		let panel = self.panel();
		let x0 = panel.x0 + column.index() as f64 * self.column_width;
		Rect::new(x0, panel.y0, x0 + self.column_width, panel.y1)
	}

	/// Slot center for `key`, or `None` when the lecture does not contain it.
	pub fn slot(&self, key: NodeKey) -> Option<Point> {
		let (column, row) = *self.slots.get(&key)?;
		let rect = self.column_rect(column);
		let y = rect.y0 + self.padding + self.row_height * row as f64 + (self.row_height - self.padding) / 2.0;
		Some(Point::new(rect.center().x, y))
	}

	/// Assigns the node its column slot. Nodes outside the lecture keep their
	/// position.
	pub fn place(&self, graph: &mut Graph, key: NodeKey) {
		if let Some(slot) = self.slot(key) {
			graph.node_mut(key).set_position(slot);
		}
	}
}

/// Remembers node positions that a view transform is about to overwrite so
/// they can be put back when the view is left.
#[derive(Clone, Debug, Default)]
pub struct PositionStash {
	saved: HashMap<NodeKey, Point>,
}

impl PositionStash {
	/// Records the current position of each node not already stashed.
	pub fn stash(&mut self, graph: &Graph, keys: &[NodeKey]) {
		for key in keys {
			self.saved.entry(*key).or_insert_with(|| graph.node(*key).position());
		}
	}

	/// Position the node had when it was stashed.
	#[cfg(test)]
	pub fn original(&self, key: NodeKey) -> Option<Point> {
		self.saved.get(&key).copied()
	}

	/// Puts every stashed node back and empties the stash.
	pub fn restore(&mut self, graph: &mut Graph) {
		for (key, position) in self.saved.drain() {
			graph.node_mut(key).set_position(position);
		}
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.saved.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use kurbo::Point;

	use super::{Column, LectureColumns, PositionStash, to_parent_position};
	use crate::components::curriculum_graph::config::EngineConfig;
	use crate::components::curriculum_graph::projection::Graph;
	use crate::components::curriculum_graph::projection::tests::chain_graph;
	use crate::components::curriculum_graph::types::{Lecture, NodeKey};

	fn key(graph: &Graph, id: &str) -> NodeKey {
		graph.key_of(id).unwrap()
	}

	#[test]
	fn subjects_collapse_onto_their_domain() {
		let mut graph = chain_graph(true);
		let (x, a) = (key(&graph, "x"), key(&graph, "A"));
		to_parent_position(&mut graph, x);
		assert_eq!(graph.node(x).position(), graph.node(a).position());

		let before = graph.node(a).position();
		to_parent_position(&mut graph, a);
		assert_eq!(graph.node(a).position(), before);
	}

	#[test]
	fn lecture_columns_run_future_present_past() {
		let mut graph = chain_graph(true);
		let config = EngineConfig::default();
		let lecture = graph.lecture(graph.lecture_keys()[0]).clone();
		let columns = LectureColumns::new(&lecture, Point::new(100.0, 50.0), &config);
		for key in lecture.nodes.clone() {
			columns.place(&mut graph, key);
		}
		let (x, y, z) = (key(&graph, "x"), key(&graph, "y"), key(&graph, "z"));
		// past on the right, future on the left
		assert!(graph.node(z).x < graph.node(y).x);
		assert!(graph.node(y).x < graph.node(x).x);
		assert_eq!(graph.node(y).x, 100.0);
		assert_eq!(graph.node(x).y, graph.node(z).y);
		assert!(columns.panel().contains(graph.node(y).position()));
		assert_eq!(columns.column_rect(Column::Present).center().x, 100.0);
	}

	#[test]
	fn tallest_column_sets_panel_height() {
		let config = EngineConfig::default();
		let mut lecture = Lecture::default();
		lecture.present_nodes = (0..3).map(NodeKey).collect();
		lecture.past_nodes = vec![NodeKey(9)];
		let columns = LectureColumns::new(&lecture, Point::ZERO, &config);
		let expected = 3.0 * (config.node_height + config.column_padding) + config.column_padding;
		assert!((columns.panel().height() - expected).abs() < 1e-9);

		let first = columns.slot(NodeKey(0)).unwrap();
		let third = columns.slot(NodeKey(2)).unwrap();
		assert!(first.y < third.y);
		assert!(columns.slot(NodeKey(42)).is_none());
	}

	#[test]
	fn stash_keeps_first_position_and_restores_it() {
		let mut graph = chain_graph(true);
		let x = key(&graph, "x");
		let original = graph.node(x).position();
		let mut stash = PositionStash::default();
		stash.stash(&graph, &[x]);
		graph.node_mut(x).set_position(Point::new(-5.0, -5.0));
		stash.stash(&graph, &[x]);
		assert_eq!(stash.original(x), Some(original));
		stash.restore(&mut graph);
		assert!(stash.is_empty());
		assert_eq!(graph.node(x).position(), original);
	}
}
