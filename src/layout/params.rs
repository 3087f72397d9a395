use serde::{Deserialize, Serialize};

/// Alpha at which a run counts as converged.
pub const TARGET_ALPHA: f64 = 0.001;

/// Tunables of the layout simulation.
///
/// The force fields feed straight into [`force_graph::SimulationParameters`];
/// the rest drive the cooling schedule and the centering forces layered on
/// top of it. Missing fields deserialize to the interactive preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	/// Velocity kept per step. Lower is more damped.
	pub damping_factor: f32,
	/// Mass of a node with size multiplier 1.
	pub mass: f32,
	pub time_step: f32,
	pub alpha: f64,
	/// Fraction of alpha lost per step.
	pub alpha_decay: f64,
	pub target_alpha: f64,
	/// Pull of the node centroid toward the origin.
	pub center_strength: f32,
	/// Per-axis pull of every node toward the origin, scaled by alpha.
	pub axis_strength: f32,
	/// Step budget of a batch run.
	pub max_steps: usize,
	pub initial_radius: f32,
	/// Ring document nodes start on.
	pub document_radius: f32,
}

/// Decay that takes alpha from 1 to `target` in `steps` steps.
pub fn decay_for(steps: usize, target: f64) -> f64 {
	1.0 - target.powf(1.0 / steps.max(1) as f64)
}

impl SimulationParams {
	/// One synchronous settle pass per graph fetch: heavily damped, slow
	/// cooling, documents parked far outside the field.
	pub fn batch() -> Self {
		Self {
			damping_factor: 0.1,
			alpha_decay: decay_for(10_000, TARGET_ALPHA),
			max_steps: 10_000,
			document_radius: 3000.0,
			..Self::interactive()
		}
	}

	/// Host-driven pass while the user can drag nodes.
	pub fn interactive() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.6,
			mass: 10.0,
			time_step: 0.016,
			alpha: 1.0,
			alpha_decay: decay_for(300, TARGET_ALPHA),
			target_alpha: TARGET_ALPHA,
			center_strength: 1.0,
			axis_strength: 0.05,
			max_steps: 300,
			initial_radius: 100.0,
			document_radius: 100.0,
		}
	}

	pub(crate) fn forces(&self) -> force_graph::SimulationParameters {
		force_graph::SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

impl Default for SimulationParams {
	fn default() -> Self {
		Self::interactive()
	}
}
