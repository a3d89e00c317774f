use kurbo::Point;

use super::types::{LectureKey, NodeKey, RunState, View};

/// The view / run-state machine.
///
/// The engine is its only writer. A transition may only begin while not
/// already transitioning, and beginning one always leaves the simulation
/// stopped. The selected lecture is kept across views but only means
/// something in [`View::Lectures`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
	view: View,
	run: RunState,
	lecture: Option<LectureKey>,
}

impl ViewState {
	pub fn view(&self) -> View {
		self.view
	}

	pub fn run(&self) -> RunState {
		self.run
	}

	pub fn lecture(&self) -> Option<LectureKey> {
		self.lecture
	}

	pub fn is_transitioning(&self) -> bool {
		self.run == RunState::Transitioning
	}

	pub fn is_simulating(&self) -> bool {
		self.run == RunState::Simulating
	}

	/// Pan, zoom and node drags are only honored while idle or simulating in
	/// the domain or subject view.
	pub fn accepts_manipulation(&self) -> bool {
		!self.is_transitioning() && self.view.is_editable()
	}

	/// Enters `Transitioning`. Returns the run state that was left, or `None`
	/// if a transition is already in flight.
	pub fn begin_transition(&mut self) -> Option<RunState> {
		if self.is_transitioning() {
			return None;
		}
		let previous = self.run;
		self.run = RunState::Transitioning;
		Some(previous)
	}

	/// Commits the destination view and returns to `Idle`.
	pub fn finish_transition(&mut self, view: View, lecture: Option<LectureKey>) {
		debug_assert!(self.is_transitioning());
		self.view = view;
		self.lecture = lecture;
		self.run = RunState::Idle;
	}

	pub fn select_lecture(&mut self, lecture: Option<LectureKey>) -> bool {
		if self.is_transitioning() {
			return false;
		}
		self.lecture = lecture;
		true
	}

	pub fn start_simulation(&mut self) -> bool {
		if self.run != RunState::Idle || !self.view.is_editable() {
			return false;
		}
		self.run = RunState::Simulating;
		true
	}

	pub fn stop_simulation(&mut self) -> bool {
		if self.run != RunState::Simulating {
			return false;
		}
		self.run = RunState::Idle;
		true
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeKey>,
	pub start: Point,
	pub node_start: Point,
}

impl DragState {
	pub fn is_active(&self) -> bool {
		self.node.is_some()
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last: Point,
}
