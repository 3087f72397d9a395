//! Graph derivation and layout for a people/organization relationship
//! tracker.
//!
//! Entity and relationship records are normalized into [`graph::Node`]s and
//! [`graph::Edge`]s, every organization and region gets a
//! [`graph::NodeGroup`] of what is reachable from it, and
//! [`layout::LayoutSimulation`] assigns 2-D coordinates.

use log::{LevelFilter, info};

// Modules
mod error;
pub mod graph;
pub mod layout;

pub use error::{GraphError, Result};
pub use graph::{GraphPayload, GraphSources, build_graph};
pub use layout::{Layout, LayoutCache, LayoutSimulation, SimulationParams, settle};

/// Initialize logging from `RUST_LOG`, defaulting to `info`. Calling it again
/// is a no-op.
pub fn init_logging() {
	let initialized = env_logger::Builder::new()
		.filter_level(LevelFilter::Info)
		.parse_default_env()
		.try_init()
		.is_ok();
	if initialized {
		info!("Logging initialized");
	}
}
