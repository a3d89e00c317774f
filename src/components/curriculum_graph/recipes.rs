//! Transition recipes: the ordered steps that take the canvas from one view
//! to another. Each step starts only once the previous one has fully played.

use kurbo::{Point, Rect};

use super::config::EngineConfig;
use super::positions::LectureColumns;
use super::projection::Graph;
use super::types::{Edge, Lecture, LectureKey, NodeKey, View};

/// What is drawn behind the content layer.
#[derive(Clone, Debug, Default)]
pub enum Background {
	/// Nothing behind the content.
	#[default]
	Blank,
	/// Dot grid.
	Grid,
	/// The lecture columns.
	Columns(LectureColumns),
}

#[derive(Clone, Debug)]
pub enum FrameTarget {
	/// Fit the current positions of these nodes.
	Nodes(Vec<NodeKey>),
	Rect(Rect),
}

#[derive(Clone, Debug)]
pub enum Step {
	Frame { target: FrameTarget, animated: bool },
	Background(Background),
	/// Reconcile the scene with these nodes and edges and reseed the layout.
	Show { nodes: Vec<NodeKey>, edges: Vec<Edge>, animated: bool },
	Stash(Vec<NodeKey>),
	Restore,
	Collapse(Vec<NodeKey>),
	Place { columns: LectureColumns, nodes: Vec<NodeKey> },
	Reposition { animated: bool },
}

fn show(nodes: &[NodeKey], edges: &[Edge], animated: bool) -> Step {
	Step::Show {
		nodes: nodes.to_vec(),
		edges: edges.to_vec(),
		animated,
	}
}

fn frame(nodes: &[NodeKey], animated: bool) -> Step {
	Step::Frame {
		target: FrameTarget::Nodes(nodes.to_vec()),
		animated,
	}
}

/// Columns for `lecture`, centered on its domains.
pub fn lecture_columns(graph: &Graph, lecture: &Lecture, config: &EngineConfig) -> LectureColumns {
	let origin = lecture
		.domain_nodes
		.iter()
		.map(|k| graph.node(*k).position())
		.map(|p| Rect::from_points(p, p))
		.reduce(|a, b| a.union(b))
		.map_or(Point::ZERO, |r| r.center());
	LectureColumns::new(lecture, origin, config)
}

/// Steps for jumping straight to `view` with nothing animated, used on first
/// load and whenever there is nothing meaningful to animate.
pub fn snap(view: View, lecture: Option<LectureKey>, graph: &Graph, config: &EngineConfig) -> Vec<Step> {
	let mut steps = vec![Step::Restore];
	match (view, lecture) {
		(View::Domains, _) => {
			let domains = graph.domains();
			steps.extend([
				Step::Background(Background::Grid),
				show(&domains.nodes, &domains.edges, false),
				frame(&domains.nodes, false),
			]);
		}
		(View::Subjects, _) => {
			let subjects = graph.subjects();
			steps.extend([
				Step::Background(Background::Grid),
				show(&subjects.nodes, &subjects.edges, false),
				frame(&subjects.nodes, false),
			]);
		}
		(View::Lectures, Some(key)) => {
			let lecture = graph.lecture(key);
			let columns = lecture_columns(graph, lecture, config);
			let panel = columns.panel();
			steps.extend([
				Step::Background(Background::Columns(columns.clone())),
				Step::Stash(lecture.nodes.clone()),
				Step::Place {
					columns,
					nodes: lecture.nodes.clone(),
				},
				show(&lecture.nodes, &lecture.edges, false),
				Step::Frame {
					target: FrameTarget::Rect(panel),
					animated: false,
				},
			]);
		}
		(View::Lectures, None) => {
			steps.extend([
				Step::Background(Background::Blank),
				show(&[], &[], false),
				frame(&[], false),
			]);
		}
	}
	steps.push(Step::Reposition { animated: false });
	steps
}

/// Steps for an animated switch from `from` to `to`. Switches into or out of
/// the lecture view without a selected lecture fall back to [`snap`].
pub fn plan(
	from: View,
	to: View,
	lecture: Option<LectureKey>,
	graph: &Graph,
	config: &EngineConfig,
) -> Vec<Step> {
	let Some(key) = lecture.filter(|_| from == View::Lectures || to == View::Lectures) else {
		return match (from, to) {
			(View::Domains, View::Subjects) => domains_to_subjects(graph),
			(View::Subjects, View::Domains) => subjects_to_domains(graph),
			_ => snap(to, lecture, graph, config),
		};
	};
	let lecture = graph.lecture(key);
	match (from, to) {
		(View::Domains, View::Lectures) => domains_to_lecture(graph, lecture, config),
		(View::Subjects, View::Lectures) => subjects_to_lecture(graph, lecture, config),
		(View::Lectures, View::Domains) => lecture_to_domains(graph, lecture),
		(View::Lectures, View::Subjects) => lecture_to_subjects(graph, lecture),
		_ => snap(to, Some(key), graph, config),
	}
}

/// Subjects grow out of their domains, then spread to their own positions.
fn domains_to_subjects(graph: &Graph) -> Vec<Step> {
	let subjects = graph.subjects();
	vec![
		frame(&subjects.nodes, true),
		Step::Stash(subjects.nodes.clone()),
		Step::Collapse(subjects.nodes.clone()),
		show(&subjects.nodes, &subjects.edges, true),
		Step::Restore,
		Step::Reposition { animated: true },
	]
}

/// Subjects converge onto their domains, then the domains replace them.
fn subjects_to_domains(graph: &Graph) -> Vec<Step> {
	let (subjects, domains) = (graph.subjects(), graph.domains());
	vec![
		Step::Stash(subjects.nodes.clone()),
		Step::Collapse(subjects.nodes.clone()),
		Step::Reposition { animated: true },
		show(&domains.nodes, &domains.edges, true),
		Step::Restore,
		frame(&domains.nodes, true),
	]
}

/// Close in on the lecture's domains, swap them for the lecture's subjects,
/// then lay the subjects out in columns.
fn domains_to_lecture(graph: &Graph, lecture: &Lecture, config: &EngineConfig) -> Vec<Step> {
	let columns = lecture_columns(graph, lecture, config);
	let panel = columns.panel();
	vec![
		frame(&lecture.domain_nodes, true),
		show(&lecture.domain_nodes, &[], true),
		Step::Stash(lecture.nodes.clone()),
		Step::Collapse(lecture.nodes.clone()),
		show(&lecture.nodes, &lecture.edges, true),
		Step::Background(Background::Columns(columns.clone())),
		Step::Frame {
			target: FrameTarget::Rect(panel),
			animated: true,
		},
		Step::Place {
			columns,
			nodes: lecture.nodes.clone(),
		},
		Step::Reposition { animated: true },
	]
}

/// Keep the lecture's subjects, fade the rest, then lay them out in columns.
fn subjects_to_lecture(graph: &Graph, lecture: &Lecture, config: &EngineConfig) -> Vec<Step> {
	let columns = lecture_columns(graph, lecture, config);
	let panel = columns.panel();
	vec![
		frame(&lecture.nodes, true),
		show(&lecture.nodes, &lecture.edges, true),
		Step::Stash(lecture.nodes.clone()),
		Step::Background(Background::Columns(columns.clone())),
		Step::Frame {
			target: FrameTarget::Rect(panel),
			animated: true,
		},
		Step::Place {
			columns,
			nodes: lecture.nodes.clone(),
		},
		Step::Reposition { animated: true },
	]
}

/// Lecture subjects fold into their domains, which then fade back in with
/// the rest of the domain view.
fn lecture_to_domains(graph: &Graph, lecture: &Lecture) -> Vec<Step> {
	let domains = graph.domains();
	vec![
		Step::Collapse(lecture.nodes.clone()),
		Step::Reposition { animated: true },
		Step::Background(Background::Grid),
		frame(&lecture.domain_nodes, true),
		show(&domains.nodes, &domains.edges, true),
		Step::Restore,
		frame(&domains.nodes, true),
	]
}

/// Lecture subjects return to their own positions and the remaining
/// subjects fade in around them.
fn lecture_to_subjects(graph: &Graph, lecture: &Lecture) -> Vec<Step> {
	let subjects = graph.subjects();
	vec![
		Step::Restore,
		Step::Reposition { animated: true },
		Step::Background(Background::Grid),
		frame(&lecture.nodes, true),
		show(&subjects.nodes, &subjects.edges, true),
		frame(&subjects.nodes, true),
	]
}

#[cfg(test)]
mod tests {
	use super::{Step, plan, snap};
	use crate::components::curriculum_graph::config::EngineConfig;
	use crate::components::curriculum_graph::projection::tests::chain_graph;
	use crate::components::curriculum_graph::types::View;

	fn animated(steps: &[Step]) -> bool {
		steps.iter().any(|step| match step {
			Step::Frame { animated, .. } | Step::Show { animated, .. } | Step::Reposition { animated } => {
				*animated
			}
			_ => false,
		})
	}

	#[test]
	fn snap_never_animates() {
		let graph = chain_graph(true);
		let config = EngineConfig::default();
		let lecture = graph.lecture_keys().first().copied();
		for view in [View::Domains, View::Subjects, View::Lectures] {
			assert!(!animated(&snap(view, lecture, &graph, &config)));
			assert!(!animated(&snap(view, None, &graph, &config)));
		}
	}

	#[test]
	fn every_pairwise_switch_animates() {
		let graph = chain_graph(true);
		let config = EngineConfig::default();
		let lecture = graph.lecture_keys().first().copied();
		let views = [View::Domains, View::Subjects, View::Lectures];
		for from in views {
			for to in views.into_iter().filter(|v| *v != from) {
				assert!(animated(&plan(from, to, lecture, &graph, &config)), "{from:?} -> {to:?}");
			}
		}
	}

	#[test]
	fn lecture_switch_without_selection_snaps() {
		let graph = chain_graph(true);
		let config = EngineConfig::default();
		assert!(!animated(&plan(View::Domains, View::Lectures, None, &graph, &config)));
		assert!(!animated(&plan(View::Lectures, View::Subjects, None, &graph, &config)));
		assert!(animated(&plan(View::Subjects, View::Domains, None, &graph, &config)));
	}

	#[test]
	fn leaving_a_lecture_restores_stashed_positions() {
		let graph = chain_graph(true);
		let config = EngineConfig::default();
		let lecture = graph.lecture_keys().first().copied();
		for to in [View::Domains, View::Subjects] {
			let steps = plan(View::Lectures, to, lecture, &graph, &config);
			assert!(steps.iter().any(|s| matches!(s, Step::Restore)));
		}
	}
}
