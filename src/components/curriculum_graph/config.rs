use force_graph::SimulationParameters;
use kurbo::Size;
use serde::Deserialize;

use super::error::EngineError;

/// Tunables for the engine. Every field has a default, so a host only needs
/// to supply the values it wants to override.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Duration of every animated step, in milliseconds.
	pub transition_ms: f64,
	/// Node rectangle width.
	pub node_width: f64,
	/// Node rectangle height.
	pub node_height: f64,
	/// Gap between a node outline and the arrowhead of an incoming edge.
	pub node_margin: f64,
	/// Margin added around each node when framing.
	pub frame_margin: f64,
	/// Padding added around the framed box.
	pub frame_padding: f64,
	/// Pinned coordinates snap to multiples of this.
	pub grid_unit: f64,
	/// Spacing of the dot grid drawn behind the domain and subject views.
	pub grid_spacing: f64,
	/// Padding inside lecture columns and between slots.
	pub column_padding: f64,
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Spring strength of links.
	pub force_spring: f32,
	/// Upper bound on any single force.
	pub force_max: f32,
	/// Node speed factor.
	pub node_speed: f32,
	/// Velocity damping per update.
	pub damping_factor: f32,
	/// Mass of every simulated node.
	pub node_mass: f32,
	/// Pull of free nodes toward the world origin at full energy.
	pub centering_strength: f64,
	/// Energy below which the layout stops moving nodes.
	pub alpha_min: f64,
	/// Fraction of the remaining energy lost per tick.
	pub alpha_decay: f64,
	/// Energy a running simulation is bumped back to while a node is dragged.
	pub drag_alpha: f64,
	/// Multiplier of the toolbar zoom buttons.
	pub zoom_step: f64,
	/// Multiplier per wheel notch.
	pub wheel_factor: f64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			transition_ms: 750.0,
			node_width: 160.0,
			node_height: 48.0,
			node_margin: 6.0,
			frame_margin: 20.0,
			frame_padding: 40.0,
			grid_unit: 1.0,
			grid_spacing: 40.0,
			column_padding: 24.0,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			centering_strength: 0.02,
			alpha_min: 0.001,
			alpha_decay: 0.0228,
			drag_alpha: 0.3,
			zoom_step: 1.25,
			wheel_factor: 1.1,
		}
	}
}

impl EngineConfig {
	/// Parses a configuration, filling unspecified fields with defaults.
	pub fn from_json(json: &str) -> Result<Self, EngineError> {
		serde_json::from_str(json).map_err(EngineError::Config)
	}

	/// Transition duration in seconds.
	pub fn transition_secs(&self) -> f64 {
		self.transition_ms / 1000.0
	}

	/// Node rectangle size.
	pub fn node_size(&self) -> Size {
		Size::new(self.node_width, self.node_height)
	}

	/// Parameters for the `force_graph` simulation.
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
