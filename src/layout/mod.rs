mod cache;
mod params;
mod simulation;

pub use cache::LayoutCache;
pub use params::{SimulationParams, TARGET_ALPHA, decay_for};
pub use simulation::{Layout, LayoutSimulation, LayoutState, NodeLayout, Point, Tick, settle};
