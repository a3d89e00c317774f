use curriculum_graph_canvas::{
	EngineConfig, GraphData, GraphEngine, LectureKey, LogStore, NodeKey, RunState, View,
};
use kurbo::{Point, Size};

const CHAIN: &str = r##"{
	"domains": [
		{ "id": "A", "name": "Domain A", "style": "#1f77b4", "x": 0, "y": 0 },
		{ "id": "B", "name": "Domain B", "style": "#ff7f0e", "x": 300, "y": 0 },
		{ "id": "C", "name": "Domain C", "style": "#2ca02c", "x": 600, "y": 0 }
	],
	"subjects": [
		{ "id": "x", "name": "Subject x", "domain": "A", "x": -20, "y": 140 },
		{ "id": "y", "name": "Subject y", "domain": "B", "x": 310, "y": 140 },
		{ "id": "z", "name": "Subject z", "domain": "C", "x": 640, "y": 140 }
	],
	"domain_links": [
		{ "source": "A", "target": "B" },
		{ "source": "B", "target": "C" }
	],
	"subject_links": [
		{ "source": "x", "target": "y" },
		{ "source": "y", "target": "z" }
	],
	"lectures": [
		{ "id": "L1", "name": "Lecture 1", "subjects": ["y"] }
	]
}"##;

fn chain(style_b: bool) -> GraphData {
	let mut data = GraphData::from_json(CHAIN).unwrap();
	if !style_b {
		data.domains[1].style = None;
	}
	data
}

fn engine(data: &GraphData) -> GraphEngine {
	let mut engine = GraphEngine::new(data, EngineConfig::default(), Box::new(LogStore));
	engine.attach(Size::new(1024.0, 768.0));
	engine.snap_to(View::Domains).unwrap();
	engine
}

fn settle(engine: &mut GraphEngine) {
	for _ in 0..10_000 {
		if engine.is_settled() {
			return;
		}
		engine.tick(0.016);
	}
	panic!("engine did not settle");
}

fn switch(engine: &mut GraphEngine, view: View) {
	assert!(engine.set_view(view).unwrap());
	assert_eq!(engine.run_state(), RunState::Transitioning);
	settle(engine);
	assert_eq!(engine.view(), view);
	assert_eq!(engine.run_state(), RunState::Idle);
}

fn shown(engine: &GraphEngine) -> Vec<String> {
	let mut ids: Vec<String> = engine
		.scene()
		.live_nodes()
		.into_iter()
		.map(|k| engine.graph().node(k).id.clone())
		.collect();
	ids.sort();
	ids
}

fn key(engine: &GraphEngine, id: &str) -> NodeKey {
	engine.graph().key_of(id).unwrap()
}

fn positions(engine: &GraphEngine) -> Vec<Point> {
	["A", "B", "C", "x", "y", "z"]
		.iter()
		.map(|id| engine.graph().node(key(engine, id)).position())
		.collect()
}

#[test]
fn styled_chain_renders_every_view() {
	let mut engine = engine(&chain(true));
	assert_eq!(shown(&engine), ["A", "B", "C"]);
	assert_eq!(engine.scene().live_edges().len(), 2);

	switch(&mut engine, View::Subjects);
	assert_eq!(shown(&engine), ["x", "y", "z"]);
	assert_eq!(engine.scene().live_edges().len(), 2);

	engine.select_lecture(Some(LectureKey(0))).unwrap();
	switch(&mut engine, View::Lectures);
	assert_eq!(shown(&engine), ["x", "y", "z"]);
	assert_eq!(engine.scene().live_edges().len(), 2);

	let lecture = engine.graph().lecture(LectureKey(0));
	assert_eq!(lecture.present_nodes, [key(&engine, "y")]);
	assert_eq!(lecture.past_nodes, [key(&engine, "x")]);
	assert_eq!(lecture.future_nodes, [key(&engine, "z")]);
	assert_eq!(lecture.domain_nodes, [key(&engine, "B")]);

	// Future on the left, past on the right, present between them.
	let (x, y, z) = (
		engine.graph().node(key(&engine, "x")).position(),
		engine.graph().node(key(&engine, "y")).position(),
		engine.graph().node(key(&engine, "z")).position(),
	);
	assert!(z.x < y.x && y.x < x.x);
	assert_eq!(x.y, y.y);
	assert_eq!(y.y, z.y);
}

#[test]
fn unstyled_domain_drops_its_subtree() {
	let mut engine = engine(&chain(false));
	assert_eq!(shown(&engine), ["A", "C"]);
	assert!(engine.scene().live_edges().is_empty());
	assert!(engine.graph().key_of("y").is_none());

	switch(&mut engine, View::Subjects);
	assert_eq!(shown(&engine), ["x", "z"]);
	assert!(engine.scene().live_edges().is_empty());

	let lecture = engine.graph().lecture(LectureKey(0));
	assert!(lecture.present_nodes.is_empty());
	assert!(lecture.past_nodes.is_empty());
	assert!(lecture.future_nodes.is_empty());
	assert!(lecture.nodes.is_empty());
	assert!(lecture.edges.is_empty());

	engine.select_lecture(Some(LectureKey(0))).unwrap();
	switch(&mut engine, View::Lectures);
	assert!(shown(&engine).is_empty());
}

#[test]
fn lecture_round_trip_restores_positions() {
	let mut engine = engine(&chain(true));
	let before = positions(&engine);

	engine.select_lecture(Some(LectureKey(0))).unwrap();
	switch(&mut engine, View::Lectures);
	assert_ne!(positions(&engine), before);
	switch(&mut engine, View::Domains);
	assert_eq!(positions(&engine), before);

	switch(&mut engine, View::Subjects);
	switch(&mut engine, View::Lectures);
	switch(&mut engine, View::Subjects);
	assert_eq!(positions(&engine), before);
	switch(&mut engine, View::Domains);
	assert_eq!(positions(&engine), before);
}

#[test]
fn view_requests_during_a_transition_are_ignored() {
	let mut engine = engine(&chain(true));
	assert!(engine.set_view(View::Subjects).unwrap());
	for _ in 0..5 {
		engine.tick(0.016);
		assert!(!engine.set_view(View::Lectures).unwrap());
		assert!(!engine.set_view(View::Domains).unwrap());
		assert_eq!(engine.view(), View::Domains);
		assert_eq!(engine.run_state(), RunState::Transitioning);
	}
	settle(&mut engine);
	assert_eq!(engine.view(), View::Subjects);
}

#[test]
fn rendered_positions_follow_the_records_once_settled() {
	let mut engine = engine(&chain(true));
	switch(&mut engine, View::Subjects);
	for node in engine.scene().nodes() {
		assert_eq!(node.position, engine.graph().node(node.key).position());
		assert_eq!(node.opacity(), 1.0);
	}
}
