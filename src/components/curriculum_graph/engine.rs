use std::collections::{BTreeSet, VecDeque};

use kurbo::{Point, Size};
use log::{debug, info, warn};

use super::camera::Camera;
use super::config::EngineConfig;
use super::error::EngineError;
use super::geometry::{bounding_frame, frame_rect};
use super::layout::{ForceLayout, set_pinned};
use super::positions::{PositionStash, to_parent_position};
use super::projection::Graph;
use super::recipes::{self, Background, FrameTarget, Step};
use super::scene::Scene;
use super::state::{DragState, PanState, ViewState};
use super::store::NodeStore;
use super::types::{
	CameraTransform, GraphData, Lecture, LectureKey, NodeKey, RunState, View, ViewStatus,
};

/// What a wheel event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelOutcome {
	/// The camera zoomed about the pointer.
	Zoomed,
	/// Zoom is locked and no modifier was held; the warning overlay is up.
	Warned,
	/// Zooming is not allowed in the current view or run state.
	Blocked,
}

/// A transition in flight: the remaining steps and the engine time at which
/// the next one may start.
struct Transition {
	view: View,
	lecture: Option<LectureKey>,
	steps: VecDeque<Step>,
	resume_at: f64,
}

type Observer = Box<dyn FnMut(ViewStatus)>;

/// Orchestrates the camera, the rendered scene, the force layout and the
/// background for one loaded curriculum graph.
///
/// All timing is driven by [`tick`](GraphEngine::tick); the engine never
/// reads a wall clock.
pub struct GraphEngine {
	config: EngineConfig,
	graph: Graph,
	state: ViewState,
	camera: Camera,
	scene: Scene,
	layout: ForceLayout,
	background: Background,
	stash: PositionStash,
	transition: Option<Transition>,
	clock: f64,
	viewport: Option<Size>,
	store: Box<dyn NodeStore>,
	drag: DragState,
	pan: PanState,
	zoom_locked: bool,
	zoom_warning: bool,
	unsaved: BTreeSet<NodeKey>,
	observer: Option<Observer>,
	last_status: ViewStatus,
}

impl GraphEngine {
	/// Loads `data`. The engine stays detached until [`attach`](Self::attach).
	pub fn new(data: &GraphData, config: EngineConfig, store: Box<dyn NodeStore>) -> Self {
		let graph = Graph::from_data(data, config.grid_unit);
		Self {
			camera: Camera::new(config.transition_secs()),
			scene: Scene::new(config.node_size(), config.node_margin),
			layout: ForceLayout::new(&config),
			config,
			graph,
			state: ViewState::default(),
			background: Background::default(),
			stash: PositionStash::default(),
			transition: None,
			clock: 0.0,
			viewport: None,
			store,
			drag: DragState::default(),
			pan: PanState::default(),
			zoom_locked: true,
			zoom_warning: false,
			unsaved: BTreeSet::new(),
			observer: None,
			last_status: ViewStatus::default(),
		}
	}

	/// Attaches the engine to a drawing surface of the given size, or updates
	/// the size after a resize.
	pub fn attach(&mut self, viewport: Size) {
		self.viewport = Some(viewport);
	}

	/// Size of the attached surface.
	pub fn viewport(&self) -> Option<Size> {
		self.viewport
	}

	fn require_attached(&self) -> Result<Size, EngineError> {
		self.viewport.ok_or(EngineError::Detached)
	}

	/// Registers the single observer of view and run-state changes. It is
	/// called once immediately with the current status.
	pub fn set_observer(&mut self, observer: impl FnMut(ViewStatus) + 'static) {
		let mut observer: Observer = Box::new(observer);
		observer(self.status());
		self.observer = Some(observer);
	}

	/// Snapshot of what the observer is told.
	pub fn status(&self) -> ViewStatus {
		ViewStatus {
			view: self.state.view(),
			run: self.state.run(),
			lecture: self.state.lecture(),
			zoom_warning: self.zoom_warning,
			unsaved: self.unsaved.len(),
		}
	}

	fn notify(&mut self) {
		let status = self.status();
		if status == self.last_status {
			return;
		}
		self.last_status = status;
		if let Some(observer) = self.observer.as_mut() {
			observer(status);
		}
	}

	/// Tunables in effect.
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// The loaded graph records.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// The rendered content layer.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// The current background layer.
	pub fn background(&self) -> &Background {
		&self.background
	}

	/// Current camera transform, mid-animation included.
	pub fn camera_transform(&self) -> CameraTransform {
		self.camera.transform()
	}

	/// Screen position of a world point under the current camera, or `None`
	/// while detached.
	pub fn world_to_screen(&self, world: Point) -> Option<Point> {
		Some(self.camera.world_to_screen(world, self.viewport?))
	}

	/// Committed view; changes only when a transition finishes.
	pub fn view(&self) -> View {
		self.state.view()
	}

	/// Current run state.
	pub fn run_state(&self) -> RunState {
		self.state.run()
	}

	/// Selected lecture, if any.
	pub fn selected_lecture(&self) -> Option<LectureKey> {
		self.state.lecture()
	}

	/// Every loaded lecture with its key.
	pub fn lectures(&self) -> impl Iterator<Item = (LectureKey, &Lecture)> {
		self.graph.lecture_keys().into_iter().map(move |k| (k, self.graph.lecture(k)))
	}

	/// Nodes whose last save failed.
	pub fn unsaved(&self) -> impl Iterator<Item = NodeKey> {
		self.unsaved.iter().copied()
	}

	/// True once no transition is in flight and every fade, move and camera
	/// animation has settled.
	pub fn is_settled(&self) -> bool {
		self.transition.is_none() && !self.scene.is_animating() && !self.camera.is_animating()
	}

	/// Jumps to `view` without animation. Used for the first render and for
	/// deep links.
	pub fn snap_to(&mut self, view: View) -> Result<bool, EngineError> {
		self.begin(view, self.state.lecture(), true)
	}

	/// Requests an animated switch to `view`.
	///
	/// Returns `Ok(false)` without touching anything when a transition is
	/// already in flight or `view` is already current. A running auto-layout
	/// is frozen and persisted first.
	pub fn set_view(&mut self, view: View) -> Result<bool, EngineError> {
		self.begin(view, self.state.lecture(), false)
	}

	/// Selects the lecture shown by the lecture view. While that view is
	/// current the canvas snaps to the new lecture.
	pub fn select_lecture(&mut self, lecture: Option<LectureKey>) -> Result<bool, EngineError> {
		if let Some(key) = lecture {
			if !self.graph.has_lecture(key) {
				return Err(EngineError::UnknownLecture(key.0));
			}
		}
		if self.state.is_transitioning() {
			debug!("lecture selection rejected: transition in flight");
			return Ok(false);
		}
		if lecture == self.state.lecture() {
			return Ok(false);
		}
		if self.state.view() == View::Lectures {
			return self.begin(View::Lectures, lecture, true);
		}
		self.state.select_lecture(lecture);
		self.notify();
		Ok(true)
	}

	fn begin(&mut self, view: View, lecture: Option<LectureKey>, snap: bool) -> Result<bool, EngineError> {
		self.require_attached()?;
		if self.state.is_transitioning() {
			debug!("view change to {view:?} rejected: transition in flight");
			return Ok(false);
		}
		let from = self.state.view();
		if !snap && view == from {
			return Ok(false);
		}
		if self.state.is_simulating() {
			self.freeze_layout();
		}
		self.drag_end();
		self.pan.active = false;

		self.state.begin_transition();
		let steps = if snap {
			recipes::snap(view, lecture, &self.graph, &self.config)
		} else {
			recipes::plan(from, view, lecture, &self.graph, &self.config)
		};
		info!("{} view: {from:?} -> {view:?} ({} steps)", if snap { "snapping" } else { "switching" }, steps.len());
		self.transition = Some(Transition {
			view,
			lecture,
			steps: steps.into(),
			resume_at: self.clock,
		});
		self.notify();
		self.pump();
		Ok(true)
	}

	/// Runs every step that is due, finishing the transition when none are
	/// left.
	fn pump(&mut self) {
		loop {
			let Some(transition) = self.transition.as_mut() else {
				return;
			};
			if self.clock < transition.resume_at {
				return;
			}
			match transition.steps.pop_front() {
				Some(step) => {
					let wait = self.run_step(step);
					if let Some(transition) = self.transition.as_mut() {
						transition.resume_at = self.clock + wait;
					}
				}
				None => {
					if let Some(done) = self.transition.take() {
						self.state.finish_transition(done.view, done.lecture);
						info!("view {:?} committed", done.view);
					}
					self.notify();
					return;
				}
			}
		}
	}

	/// Applies one step and returns how long its animation runs.
	fn run_step(&mut self, step: Step) -> f64 {
		let transition = self.config.transition_secs();
		let duration = |animated: bool| if animated { transition } else { 0.0 };
		match step {
			Step::Frame { target, animated } => {
				let Some(viewport) = self.viewport else {
					return 0.0;
				};
				let padding = self.config.frame_padding;
				let transform = match target {
					FrameTarget::Nodes(keys) => bounding_frame(
						keys.iter().map(|k| self.graph.node(*k).position()),
						self.config.frame_margin,
						padding,
						viewport,
						self.config.node_size(),
					),
					FrameTarget::Rect(rect) => frame_rect(rect.inflate(padding, padding), viewport),
				};
				self.camera.frame_to(transform, animated, self.clock)
			}
			Step::Background(background) => {
				self.background = background;
				0.0
			}
			Step::Show { nodes, edges, animated } => {
				let wait = duration(animated);
				let report = self.scene.reconcile(&self.graph, &nodes, &edges, self.clock, wait);
				if !report.is_noop() {
					debug!("scene reconciled: {report:?}");
				}
				self.layout.reseed(&self.graph, &nodes, &edges);
				wait
			}
			Step::Stash(keys) => {
				self.stash.stash(&self.graph, &keys);
				0.0
			}
			Step::Restore => {
				self.stash.restore(&mut self.graph);
				0.0
			}
			Step::Collapse(keys) => {
				for key in keys {
					to_parent_position(&mut self.graph, key);
				}
				0.0
			}
			Step::Place { columns, nodes } => {
				for key in nodes {
					columns.place(&mut self.graph, key);
				}
				0.0
			}
			Step::Reposition { animated } => {
				let wait = duration(animated);
				self.scene.reposition_all(&self.graph, self.clock, wait);
				wait
			}
		}
	}

	/// Advances engine time by `dt` seconds: camera and scene animations,
	/// due transition steps, and the force layout while simulating.
	pub fn tick(&mut self, dt: f64) {
		self.clock += dt;
		self.camera.advance(self.clock);
		self.scene.advance(self.clock);
		self.pump();
		if self.state.is_simulating() && self.layout.tick(dt, &mut self.graph) {
			self.scene.reposition_all(&self.graph, self.clock, 0.0);
		}
	}

	/// Toggles auto-layout over the rendered nodes. With any node free, every
	/// node is pinned, persisted and the simulation stops; with all pinned,
	/// every node is freed and the simulation restarts at full energy.
	pub fn toggle_autolayout(&mut self) -> bool {
		if !self.state.accepts_manipulation() {
			debug!("auto-layout toggle rejected in {:?}/{:?}", self.state.view(), self.state.run());
			return false;
		}
		let keys = self.scene.live_nodes();
		if keys.iter().any(|k| !self.graph.node(*k).is_pinned()) {
			self.freeze_layout();
		} else {
			set_pinned(&mut self.graph, &keys, false, self.config.grid_unit);
			self.layout.restart(&self.graph);
			self.state.start_simulation();
			info!(
				"auto-layout started for {} nodes, {} links",
				self.layout.node_count(),
				self.layout.link_count()
			);
		}
		self.notify();
		true
	}

	/// Stops the simulation and pins every rendered node where it is,
	/// persisting the ones that were free.
	fn freeze_layout(&mut self) {
		let keys = self.scene.live_nodes();
		let pinned = set_pinned(&mut self.graph, &keys, true, self.config.grid_unit);
		self.layout.stop();
		self.state.stop_simulation();
		self.scene.reposition_all(&self.graph, self.clock, 0.0);
		info!("auto-layout frozen, {} nodes pinned", pinned.len());
		self.persist(&pinned);
	}

	fn persist(&mut self, keys: &[NodeKey]) {
		for &key in keys {
			match self.store.save(self.graph.node(key)) {
				Ok(()) => {
					self.unsaved.remove(&key);
				}
				Err(err) => {
					warn!("{err}");
					self.unsaved.insert(key);
				}
			}
		}
		self.notify();
	}

	/// Tries to save every node whose last save failed. Returns how many are
	/// still unsaved.
	pub fn retry_unsaved(&mut self) -> usize {
		let keys: Vec<NodeKey> = self.unsaved.iter().copied().collect();
		self.persist(&keys);
		self.unsaved.len()
	}

	/// Topmost rendered node under a screen point.
	pub fn node_at(&self, screen: Point) -> Option<NodeKey> {
		let viewport = self.viewport?;
		self.scene.node_at(self.camera.screen_to_world(screen, viewport))
	}

	/// Starts dragging `key`, pinning it and raising it above the others.
	pub fn drag_start(&mut self, key: NodeKey, screen: Point) -> bool {
		if !self.state.accepts_manipulation() || self.scene.node(key).is_none_or(|n| n.is_exiting()) {
			return false;
		}
		set_pinned(&mut self.graph, &[key], true, self.config.grid_unit);
		self.scene.raise(key);
		self.drag = DragState {
			node: Some(key),
			start: screen,
			node_start: self.graph.node(key).position(),
		};
		true
	}

	/// Moves the dragged node by the pointer delta since the drag started.
	pub fn drag_move(&mut self, screen: Point) -> bool {
		let Some(key) = self.drag.node else {
			return false;
		};
		let position = self.drag.node_start + (screen - self.drag.start) / self.camera.transform().k;
		let node = self.graph.node_mut(key);
		node.set_position(position);
		node.pinned_x = Some(position.x);
		node.pinned_y = Some(position.y);
		if self.state.is_simulating() {
			self.layout.reheat();
		}
		self.scene.reposition_all(&self.graph, self.clock, 0.0);
		true
	}

	/// Ends the drag, snapping the node to the grid and saving it.
	pub fn drag_end(&mut self) -> bool {
		let Some(key) = self.drag.node.take() else {
			return false;
		};
		set_pinned(&mut self.graph, &[key], true, self.config.grid_unit);
		self.scene.reposition_all(&self.graph, self.clock, 0.0);
		self.persist(&[key]);
		true
	}

	/// Starts a node drag when a node is under the pointer, a background pan
	/// otherwise.
	pub fn pointer_down(&mut self, screen: Point) -> bool {
		if let Some(key) = self.node_at(screen) {
			return self.drag_start(key, screen);
		}
		if !self.state.accepts_manipulation() {
			return false;
		}
		self.pan = PanState {
			active: true,
			last: screen,
		};
		true
	}

	/// Continues the gesture started by [`pointer_down`](Self::pointer_down).
	pub fn pointer_move(&mut self, screen: Point) {
		if self.drag.is_active() {
			self.drag_move(screen);
		} else if self.pan.active {
			if self.state.accepts_manipulation() {
				self.camera.pan_by_screen(screen - self.pan.last);
			}
			self.pan.last = screen;
		}
	}

	/// Ends any drag or pan.
	pub fn pointer_up(&mut self) {
		self.drag_end();
		self.pan.active = false;
	}

	/// Wheel zoom about `anchor`. Honored only when a modifier is held or the
	/// zoom lock was dismissed; checked on every event.
	pub fn wheel(&mut self, anchor: Point, delta_y: f64, modifier: bool) -> WheelOutcome {
		let Some(viewport) = self.viewport else {
			return WheelOutcome::Blocked;
		};
		if !self.state.accepts_manipulation() {
			return WheelOutcome::Blocked;
		}
		if self.zoom_locked && !modifier {
			self.zoom_warning = true;
			self.notify();
			return WheelOutcome::Warned;
		}
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		self.camera.zoom_about(anchor, factor, viewport);
		WheelOutcome::Zoomed
	}

	/// Hides the zoom warning and lifts the zoom lock for the session.
	pub fn dismiss_zoom_warning(&mut self) {
		self.zoom_locked = false;
		self.zoom_warning = false;
		self.notify();
	}

	/// Moves the camera to `transform`. Rejected outside the domain and subject views and while transitioning.
	pub fn frame_to(&mut self, transform: CameraTransform, animated: bool) -> Result<bool, EngineError> {
		self.require_attached()?;
		if !self.state.accepts_manipulation() {
			return Ok(false);
		}
		self.camera.frame_to(transform, animated, self.clock);
		Ok(true)
	}

	/// Pans to `(x, y)` keeping the zoom.
	pub fn pan_to(&mut self, x: f64, y: f64, animated: bool) -> Result<bool, EngineError> {
		self.require_attached()?;
		if !self.state.accepts_manipulation() {
			return Ok(false);
		}
		self.camera.pan_to(x, y, animated, self.clock);
		Ok(true)
	}

	/// Zooms to `k` keeping the focus.
	pub fn zoom_to(&mut self, k: f64, animated: bool) -> Result<bool, EngineError> {
		self.require_attached()?;
		if !self.state.accepts_manipulation() {
			return Ok(false);
		}
		self.camera.zoom_to(k, animated, self.clock);
		Ok(true)
	}

	/// Multiplies the zoom by `multiplier`.
	pub fn zoom_step(&mut self, multiplier: f64, animated: bool) -> Result<bool, EngineError> {
		self.require_attached()?;
		if !self.state.accepts_manipulation() {
			return Ok(false);
		}
		self.camera.zoom_step(multiplier, animated, self.clock);
		Ok(true)
	}

	/// Frames every rendered node.
	pub fn fit_content(&mut self, animated: bool) -> Result<bool, EngineError> {
		let viewport = self.require_attached()?;
		let transform = bounding_frame(
			self.scene.live_nodes().iter().map(|k| self.graph.node(*k).position()),
			self.config.frame_margin,
			self.config.frame_padding,
			viewport,
			self.config.node_size(),
		);
		self.frame_to(transform, animated)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use kurbo::{Point, Size};

	use super::{GraphEngine, WheelOutcome};
	use crate::components::curriculum_graph::config::EngineConfig;
	use crate::components::curriculum_graph::error::{EngineError, SaveError};
	use crate::components::curriculum_graph::projection::tests::chain_data;
	use crate::components::curriculum_graph::store::LogStore;
	use crate::components::curriculum_graph::types::{
		LectureKey, LectureRecord, Node, NodeKey, RunState, View, ViewStatus,
	};

	const VIEWPORT: Size = Size::new(800.0, 600.0);

	fn engine() -> GraphEngine {
		let mut engine = GraphEngine::new(&chain_data(true), EngineConfig::default(), Box::new(LogStore));
		engine.attach(VIEWPORT);
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

	fn screen_of(engine: &GraphEngine, key: NodeKey) -> Point {
		engine.world_to_screen(engine.graph().node(key).position()).unwrap()
	}

	#[test]
	fn detached_engine_refuses_camera_and_view_changes() {
		let mut engine = GraphEngine::new(&chain_data(true), EngineConfig::default(), Box::new(LogStore));
		assert!(matches!(engine.set_view(View::Subjects), Err(EngineError::Detached)));
		assert!(matches!(engine.zoom_step(1.2, false), Err(EngineError::Detached)));
		assert_eq!(engine.wheel(Point::ZERO, 1.0, true), WheelOutcome::Blocked);
		assert!(engine.world_to_screen(Point::ZERO).is_none());
		assert_eq!(engine.run_state(), RunState::Idle);
	}

	#[test]
	fn snap_completes_synchronously() {
		let engine = engine();
		assert_eq!(engine.view(), View::Domains);
		assert_eq!(engine.run_state(), RunState::Idle);
		assert_eq!(engine.scene().live_nodes().len(), 3);
		assert_eq!(engine.scene().live_edges().len(), 2);
	}

	#[test]
	fn view_change_during_transition_is_rejected() {
		let mut engine = engine();
		assert!(engine.set_view(View::Subjects).unwrap());
		assert_eq!(engine.run_state(), RunState::Transitioning);
		assert_eq!(engine.view(), View::Domains);

		assert!(!engine.set_view(View::Lectures).unwrap());
		assert!(!engine.select_lecture(Some(LectureKey(0))).unwrap());
		assert_eq!(engine.run_state(), RunState::Transitioning);
		assert_eq!(engine.view(), View::Domains);

		settle(&mut engine);
		assert_eq!(engine.view(), View::Subjects);
		assert_eq!(engine.run_state(), RunState::Idle);
		assert_eq!(engine.scene().nodes().len(), 3);
	}

	#[test]
	fn same_view_request_is_a_noop() {
		let mut engine = engine();
		assert!(!engine.set_view(View::Domains).unwrap());
		assert_eq!(engine.run_state(), RunState::Idle);
	}

	#[test]
	fn unknown_lecture_is_an_error() {
		let mut engine = engine();
		assert!(matches!(engine.select_lecture(Some(LectureKey(7))), Err(EngineError::UnknownLecture(7))));
	}

	#[test]
	fn wheel_zoom_respects_lock_and_view() {
		let mut engine = engine();
		let k = engine.camera_transform().k;
		assert_eq!(engine.wheel(Point::new(400.0, 300.0), -1.0, false), WheelOutcome::Warned);
		assert!(engine.status().zoom_warning);
		assert_eq!(engine.camera_transform().k, k);

		assert_eq!(engine.wheel(Point::new(400.0, 300.0), -1.0, true), WheelOutcome::Zoomed);
		assert!(engine.camera_transform().k > k);

		engine.dismiss_zoom_warning();
		assert!(!engine.status().zoom_warning);
		assert_eq!(engine.wheel(Point::new(400.0, 300.0), 1.0, false), WheelOutcome::Zoomed);

		engine.select_lecture(Some(LectureKey(0))).unwrap();
		engine.set_view(View::Lectures).unwrap();
		assert_eq!(engine.wheel(Point::new(400.0, 300.0), 1.0, true), WheelOutcome::Blocked);
		settle(&mut engine);
		assert_eq!(engine.wheel(Point::new(400.0, 300.0), 1.0, true), WheelOutcome::Blocked);
	}

	#[test]
	fn dragging_pins_rounds_and_saves() {
		let saved = Rc::new(RefCell::new(Vec::new()));
		let sink = saved.clone();
		let store = move |node: &Node| -> Result<(), SaveError> {
			sink.borrow_mut().push((node.id.clone(), node.x, node.y));
			Ok(())
		};
		let mut engine = GraphEngine::new(&chain_data(true), EngineConfig::default(), Box::new(store));
		engine.attach(VIEWPORT);
		engine.snap_to(View::Domains).unwrap();

		let a = engine.graph().key_of("A").unwrap();
		let start = screen_of(&engine, a);
		assert!(engine.pointer_down(start));
		let k = engine.camera_transform().k;
		engine.pointer_move(start + kurbo::Vec2::new(10.3 * k, -4.6 * k));
		engine.pointer_up();

		let node = engine.graph().node(a);
		assert_eq!((node.x, node.y), (10.0, -5.0));
		assert_eq!((node.pinned_x, node.pinned_y), (Some(10.0), Some(-5.0)));
		assert_eq!(saved.borrow().as_slice(), [("A".to_string(), 10.0, -5.0)]);
		assert_eq!(engine.scene().nodes().last().map(|n| n.key), Some(a));
	}

	#[test]
	fn failed_saves_are_tracked_and_retried() {
		let fail = Rc::new(RefCell::new(true));
		let flag = fail.clone();
		let store = move |node: &Node| -> Result<(), SaveError> {
			if *flag.borrow() {
				return Err(SaveError {
					node: node.id.clone(),
					reason: "offline".into(),
				});
			}
			Ok(())
		};
		let mut engine = GraphEngine::new(&chain_data(true), EngineConfig::default(), Box::new(store));
		engine.attach(VIEWPORT);
		engine.snap_to(View::Domains).unwrap();
		let statuses = Rc::new(RefCell::new(Vec::<ViewStatus>::new()));
		let seen = statuses.clone();
		engine.set_observer(move |status| seen.borrow_mut().push(status));

		let a = engine.graph().key_of("A").unwrap();
		assert!(engine.drag_start(a, Point::ZERO));
		assert!(engine.drag_end());
		assert_eq!(engine.unsaved().collect::<Vec<_>>(), [a]);
		assert_eq!(statuses.borrow().last().map(|s| s.unsaved), Some(1));

		assert_eq!(engine.retry_unsaved(), 1);
		*fail.borrow_mut() = false;
		assert_eq!(engine.retry_unsaved(), 0);
		assert_eq!(statuses.borrow().last().map(|s| s.unsaved), Some(0));
	}

	#[test]
	fn autolayout_toggles_between_free_and_pinned() {
		let mut engine = engine();
		assert!(engine.toggle_autolayout());
		assert_eq!(engine.run_state(), RunState::Simulating);
		let keys = engine.scene().live_nodes();
		assert!(keys.iter().all(|k| !engine.graph().node(*k).is_pinned()));

		for _ in 0..10 {
			engine.tick(0.016);
		}
		assert!(engine.toggle_autolayout());
		assert_eq!(engine.run_state(), RunState::Idle);
		for key in keys {
			let node = engine.graph().node(key);
			assert!(node.is_pinned());
			assert_eq!(node.x, node.x.round());
			assert_eq!(node.y, node.y.round());
		}
	}

	fn assert_near_records(engine: &GraphEngine, before: &[(NodeKey, Point)]) {
		for (key, start) in before {
			let now = engine.graph().node(*key).position();
			assert!((now - *start).hypot() < 10.0, "{key:?} jumped from {start:?} to {now:?}");
		}
	}

	fn record_positions(engine: &GraphEngine) -> Vec<(NodeKey, Point)> {
		engine
			.scene()
			.live_nodes()
			.into_iter()
			.map(|k| (k, engine.graph().node(k).position()))
			.collect()
	}

	#[test]
	fn autolayout_starts_from_dragged_positions() {
		let mut engine = engine();
		let a = engine.graph().key_of("A").unwrap();
		let k = engine.camera_transform().k;
		assert!(engine.drag_start(a, Point::ZERO));
		engine.drag_move(Point::new(0.0, 200.0 * k));
		engine.drag_end();
		assert_eq!(engine.graph().node(a).position(), Point::new(0.0, 200.0));

		let before = record_positions(&engine);
		assert!(engine.toggle_autolayout());
		engine.tick(0.016);
		assert_near_records(&engine, &before);
	}

	#[test]
	fn autolayout_starts_from_positions_reached_by_a_transition() {
		let mut engine = engine();
		engine.set_view(View::Subjects).unwrap();
		settle(&mut engine);
		let x = engine.graph().key_of("x").unwrap();
		assert_eq!(engine.graph().node(x).position(), Point::new(-20.0, 120.0));

		let before = record_positions(&engine);
		assert!(engine.toggle_autolayout());
		engine.tick(0.016);
		assert_near_records(&engine, &before);
	}

	#[test]
	fn view_switch_freezes_a_running_layout() {
		let mut engine = engine();
		engine.toggle_autolayout();
		for _ in 0..5 {
			engine.tick(0.016);
		}
		assert!(engine.set_view(View::Subjects).unwrap());
		assert_eq!(engine.run_state(), RunState::Transitioning);
		let domains = engine.graph().domains().nodes.clone();
		assert!(domains.iter().all(|k| engine.graph().node(*k).is_pinned()));
		settle(&mut engine);
		assert_eq!(engine.run_state(), RunState::Idle);
	}

	#[test]
	fn lecture_view_rejects_manipulation() {
		let mut engine = engine();
		engine.select_lecture(Some(LectureKey(0))).unwrap();
		engine.set_view(View::Lectures).unwrap();
		settle(&mut engine);
		assert_eq!(engine.view(), View::Lectures);
		assert!(!engine.toggle_autolayout());
		let y = engine.graph().key_of("y").unwrap();
		assert!(!engine.drag_start(y, Point::ZERO));
		assert!(!engine.zoom_step(1.2, false).unwrap());
	}

	#[test]
	fn selecting_another_lecture_in_lecture_view_snaps() {
		let mut data = chain_data(true);
		data.lectures.push(LectureRecord {
			id: "L2".into(),
			name: "Lecture 2".into(),
			subjects: vec!["z".into()],
		});
		let mut engine = GraphEngine::new(&data, EngineConfig::default(), Box::new(LogStore));
		engine.attach(VIEWPORT);
		engine.select_lecture(Some(LectureKey(0))).unwrap();
		engine.snap_to(View::Lectures).unwrap();
		assert_eq!(engine.scene().live_nodes().len(), 3);

		assert!(engine.select_lecture(Some(LectureKey(1))).unwrap());
		assert_eq!(engine.run_state(), RunState::Idle);
		assert_eq!(engine.selected_lecture(), Some(LectureKey(1)));
		// z with its prerequisite y
		assert_eq!(engine.scene().live_nodes().len(), 2);
	}

	#[test]
	fn lecture_view_without_selection_is_empty() {
		let mut engine = engine();
		assert!(engine.set_view(View::Lectures).unwrap());
		assert_eq!(engine.run_state(), RunState::Idle);
		assert_eq!(engine.view(), View::Lectures);
		assert!(engine.scene().live_nodes().is_empty());
	}

	#[test]
	fn observer_sees_transition_start_and_commit() {
		let mut engine = engine();
		let statuses = Rc::new(RefCell::new(Vec::<ViewStatus>::new()));
		let seen = statuses.clone();
		engine.set_observer(move |status| seen.borrow_mut().push(status));
		engine.set_view(View::Subjects).unwrap();
		settle(&mut engine);
		let runs: Vec<RunState> = statuses.borrow().iter().map(|s| s.run).collect();
		assert_eq!(runs, [RunState::Idle, RunState::Transitioning, RunState::Idle]);
		assert_eq!(statuses.borrow().last().map(|s| s.view), Some(View::Subjects));
	}
}
