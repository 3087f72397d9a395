use std::collections::HashMap;
use std::f32::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::params::SimulationParams;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Node, NodeCategory};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

/// Node id to position, in node order.
pub type Layout = IndexMap<String, Point>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
	pub x: f64,
	pub y: f64,
	pub pinned: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
	pub alpha: f64,
	pub nodes: IndexMap<String, NodeLayout>,
}

/// Result of one interactive step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
	/// 0 at the start of a run, 100 once alpha reaches its target.
	pub progress: f64,
	/// Set on the single tick where the run converged.
	pub converged: bool,
}

#[derive(Clone, Debug, Default)]
struct LayoutNode {
	last_finite: (f32, f32),
}

pub struct LayoutSimulation {
	graph: ForceGraph<LayoutNode, ()>,
	index: IndexMap<String, DefaultNodeIdx>,
	params: SimulationParams,
	alpha: f64,
	done: bool,
	steps: usize,
}

impl LayoutSimulation {
	/// Nodes are placed on a ring around the origin, documents on their own
	/// outer ring. Positions found in `seed` win over the ring. Self-loops and
	/// edges with an unknown endpoint are left out.
	pub fn new(
		nodes: &IndexMap<String, Node>,
		edges: &[Edge],
		params: SimulationParams,
		seed: Option<&Layout>,
	) -> Self {
		let mut graph = ForceGraph::new(params.forces());
		let mut index = IndexMap::with_capacity(nodes.len());
		let count = nodes.len().max(1) as f32;

		for (i, node) in nodes.values().enumerate() {
			let angle = i as f32 * 2.0 * PI / count;
			let radius = match node.category {
				NodeCategory::Document => params.document_radius,
				_ => params.initial_radius,
			};
			let (x, y) = seed
				.and_then(|layout| layout.get(&node.id))
				.filter(|p| p.x.is_finite() && p.y.is_finite())
				.map(|p| (p.x as f32, p.y as f32))
				.unwrap_or((radius * angle.cos(), radius * angle.sin()));

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: params.mass * node.size() as f32,
				is_anchor: false,
				user_data: LayoutNode {
					last_finite: (x, y),
				},
			});
			index.insert(node.id.clone(), idx);
		}

		for edge in edges {
			match (index.get(&edge.source), index.get(&edge.target)) {
				(Some(&src), Some(&tgt)) if src == tgt => {
					debug!("layout ignores edge {:?}: self-loop", edge.id);
				}
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				_ => debug!("layout ignores edge {:?}: unknown endpoint", edge.id),
			}
		}

		let alpha = params.alpha;
		Self {
			graph,
			index,
			params,
			alpha,
			done: false,
			steps: 0,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn steps(&self) -> usize {
		self.steps
	}

	pub fn is_converged(&self) -> bool {
		self.alpha <= self.params.target_alpha
	}

	/// Maps the exponential alpha decay onto a roughly linear 0..=100 scale.
	pub fn progress(&self) -> f64 {
		let progress = 100.0 * self.alpha.log10() / self.params.target_alpha.log10();
		if progress.is_finite() {
			progress.clamp(0.0, 100.0)
		} else {
			100.0
		}
	}

	/// One discrete step: cool, move, recenter.
	fn step(&mut self) {
		self.alpha *= 1.0 - self.params.alpha_decay;
		self.steps += 1;

		self.graph.update(self.params.time_step * self.alpha as f32);
		self.recenter();
		self.keep_finite();
	}

	/// Shifts free nodes so their centroid moves toward the origin, then pulls
	/// each one toward the axes.
	fn recenter(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0usize);
		self.graph.visit_nodes(|node| {
			if !node.data.is_anchor && node.x().is_finite() && node.y().is_finite() {
				sx += node.x();
				sy += node.y();
				n += 1;
			}
		});
		if n == 0 {
			return;
		}

		let center = self.params.center_strength;
		let (cx, cy) = (sx / n as f32 * center, sy / n as f32 * center);
		let pull = self.params.axis_strength * self.alpha as f32;
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			node.data.x -= cx;
			node.data.y -= cy;
			node.data.x -= node.data.x * pull;
			node.data.y -= node.data.y * pull;
		});
	}

	fn keep_finite(&mut self) {
		self.graph.visit_nodes_mut(|node| {
			let data = &mut node.data;
			if data.x.is_finite() && data.y.is_finite() {
				data.user_data.last_finite = (data.x, data.y);
			} else {
				(data.x, data.y) = data.user_data.last_finite;
			}
		});
	}

	/// Interactive step, called once per animation frame by the host. After
	/// convergence further ticks do nothing until [`reheat`](Self::reheat).
	pub fn tick(&mut self) -> Tick {
		if self.done {
			return Tick {
				progress: 100.0,
				converged: false,
			};
		}

		self.step();
		if self.is_converged() {
			self.done = true;
			debug!("simulation converged after {} steps", self.steps);
			return Tick {
				progress: 100.0,
				converged: true,
			};
		}
		Tick {
			progress: self.progress(),
			converged: false,
		}
	}

	/// Runs synchronously until alpha converges or the step budget is spent.
	/// Returns the number of steps taken.
	pub fn run_batch(&mut self) -> usize {
		let mut taken = 0;
		while taken < self.params.max_steps && !self.is_converged() {
			self.step();
			taken += 1;
		}
		self.done = true;
		info!(
			"batch layout of {} nodes finished after {} steps (alpha {:.5})",
			self.index.len(),
			taken,
			self.alpha
		);
		taken
	}

	/// Starts a new run from `alpha`.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.done = false;
	}

	/// Fixes a node at `(x, y)` until released.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
		let idx = self.idx(id)?;
		let (x, y) = (x as f32, y as f32);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
				node.data.user_data.last_finite = (x, y);
			}
		});
		Ok(())
	}

	pub fn release(&mut self, id: &str) -> Result<()> {
		let idx = self.idx(id)?;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
		Ok(())
	}

	pub fn position(&self, id: &str) -> Result<NodeLayout> {
		let idx = self.idx(id)?;
		let mut found = NodeLayout::default();
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = NodeLayout {
					x: node.x() as f64,
					y: node.y() as f64,
					pinned: node.data.is_anchor,
				};
			}
		});
		Ok(found)
	}

	/// Closest node within `radius` of `(x, y)`, for hit-testing drags.
	pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<String> {
		let mut best: Option<(f64, DefaultNodeIdx)> = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - x, node.y() as f64 - y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < radius && best.is_none_or(|(d, _)| dist < d) {
				best = Some((dist, node.index()));
			}
		});
		let (_, idx) = best?;
		self.index
			.iter()
			.find(|&(_, &i)| i == idx)
			.map(|(id, _)| id.clone())
	}

	pub fn snapshot(&self) -> LayoutState {
		let mut by_idx: HashMap<DefaultNodeIdx, NodeLayout> = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			by_idx.insert(
				node.index(),
				NodeLayout {
					x: node.x() as f64,
					y: node.y() as f64,
					pinned: node.data.is_anchor,
				},
			);
		});
		let nodes = self
			.index
			.iter()
			.filter_map(|(id, idx)| by_idx.get(idx).map(|n| (id.clone(), *n)))
			.collect();
		LayoutState {
			alpha: self.alpha,
			nodes,
		}
	}

	pub fn layout(&self) -> Layout {
		self.snapshot()
			.nodes
			.into_iter()
			.map(|(id, n)| (id, Point { x: n.x, y: n.y }))
			.collect()
	}

	fn idx(&self, id: &str) -> Result<DefaultNodeIdx> {
		self.index
			.get(id)
			.copied()
			.ok_or_else(|| GraphError::UnknownNode(id.to_owned()))
	}
}

/// Batch-settles the graph and returns the final positions.
pub fn settle(nodes: &IndexMap<String, Node>, edges: &[Edge], params: SimulationParams) -> Layout {
	let mut sim = LayoutSimulation::new(nodes, edges, params, None);
	sim.run_batch();
	sim.layout()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeType, EntityKind, RelationshipRecord, relationship_edge};
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	fn sample() -> (IndexMap<String, Node>, Vec<Edge>) {
		let nodes: IndexMap<String, Node> = [
			("org", EntityKind::Organization),
			("a", EntityKind::Person),
			("b", EntityKind::Person),
			("art", EntityKind::Article),
		]
		.into_iter()
		.map(|(id, kind)| (id.to_string(), Node::new(id, id, kind, "#000")))
		.collect();
		let edges = [
			("a", "org", EdgeType::Employment),
			("b", "a", EdgeType::PersonalConnection),
			("art", "a", EdgeType::Mentions),
			("art", "ghost", EdgeType::Mentions),
		]
		.into_iter()
		.enumerate()
		.map(|(i, (s, t, kind))| relationship_edge(i, &RelationshipRecord::new(s, t, kind)))
		.collect();
		(nodes, edges)
	}

	fn distance(p: NodeLayout) -> f64 {
		(p.x * p.x + p.y * p.y).sqrt()
	}

	#[test]
	fn batch_settles_within_budget_with_finite_positions() {
		let (nodes, edges) = sample();
		let params = SimulationParams::batch();
		let budget = params.max_steps;

		let mut sim = LayoutSimulation::new(&nodes, &edges, params, None);
		let taken = sim.run_batch();
		let layout = sim.layout();

		assert!(taken <= budget);
		assert_eq!(layout.keys().collect::<Vec<_>>(), vec!["org", "a", "b", "art"]);
		assert!(layout.values().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn batch_stops_at_step_budget_when_not_converged() {
		let (nodes, edges) = sample();
		let params = SimulationParams {
			max_steps: 25,
			..SimulationParams::batch()
		};

		let mut sim = LayoutSimulation::new(&nodes, &edges, params, None);
		assert_eq!(sim.run_batch(), 25);
		assert!(!sim.is_converged());
		assert_eq!(sim.steps(), 25);
	}

	#[test]
	fn documents_start_outside_the_field_in_batch_mode() {
		let (nodes, edges) = sample();
		let params = SimulationParams::batch();
		let sim = LayoutSimulation::new(&nodes, &edges, params.clone(), None);

		let art = distance(sim.position("art").unwrap());
		let person = distance(sim.position("a").unwrap());
		assert!((art - params.document_radius as f64).abs() < 1.0);
		assert!((person - params.initial_radius as f64).abs() < 1.0);
	}

	#[test]
	fn interactive_progress_is_monotone_and_converges_once() {
		let (nodes, edges) = sample();
		let mut sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), None);

		let mut last = sim.progress();
		let mut completions = 0;
		for _ in 0..1000 {
			let tick = sim.tick();
			assert!(tick.progress >= last);
			last = tick.progress;
			if tick.converged {
				completions += 1;
			}
		}
		assert_eq!(completions, 1);
		assert_eq!(last, 100.0);
	}

	#[test]
	fn reheat_starts_a_new_run() {
		let (nodes, edges) = sample();
		let mut sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), None);
		while !sim.tick().converged {}

		sim.reheat(0.3);
		assert!(sim.progress() < 100.0);
		let fired = (0..1000).filter(|_| sim.tick().converged).count();
		assert_eq!(fired, 1);
	}

	#[test]
	fn pinned_nodes_stay_put() {
		let (nodes, edges) = sample();
		let mut sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), None);
		sim.pin("a", 40.0, -25.0).unwrap();

		for _ in 0..50 {
			sim.tick();
		}
		let a = sim.position("a").unwrap();
		assert_eq!((a.x, a.y, a.pinned), (40.0, -25.0, true));
		assert!(sim.snapshot().nodes["a"].pinned);

		sim.release("a").unwrap();
		assert!(!sim.position("a").unwrap().pinned);
	}

	#[test]
	fn unknown_nodes_are_reported() {
		let (nodes, edges) = sample();
		let mut sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), None);

		assert_eq!(sim.pin("ghost", 0.0, 0.0), Err(GraphError::UnknownNode("ghost".into())));
		assert!(sim.release("ghost").is_err());
		assert!(sim.position("ghost").is_err());
	}

	#[test]
	fn seed_positions_are_reused() {
		let (nodes, edges) = sample();
		let mut seed = Layout::new();
		seed.insert("b".into(), Point { x: 500.0, y: 250.0 });
		seed.insert("nobody".into(), Point { x: 1.0, y: 1.0 });

		let sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), Some(&seed));
		let b = sim.position("b").unwrap();
		assert_eq!((b.x, b.y), (500.0, 250.0));
		assert_eq!(sim.node_at(498.0, 251.0, 5.0).as_deref(), Some("b"));
		assert_eq!(sim.node_at(-900.0, -900.0, 5.0), None);
	}

	#[test]
	fn self_loops_do_not_reach_the_force_graph() {
		let (nodes, mut edges) = sample();
		edges.push(relationship_edge(
			9,
			&RelationshipRecord::new("a", "a", EdgeType::PersonalConnection),
		));

		let layout = settle(&nodes, &edges, SimulationParams::batch());
		assert_eq!(layout.len(), nodes.len());
		assert!(layout.values().all(|p| p.x.is_finite() && p.y.is_finite()));

		let mut sim = LayoutSimulation::new(&nodes, &edges, SimulationParams::interactive(), None);
		let fired = (0..1000).filter(|_| sim.tick().converged).count();
		assert_eq!(fired, 1);
	}

	#[test]
	fn empty_graph_settles_to_empty_layout() {
		let layout = settle(&IndexMap::new(), &[], SimulationParams::batch());
		assert!(layout.is_empty());
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(16))]

		#[test]
		fn short_batches_always_return_finite_positions(
			n in 1usize..8,
			links in prop::collection::vec((0usize..8, 0usize..8), 0..12),
		) {
			let nodes: IndexMap<String, Node> = (0..n)
				.map(|i| {
					let kind = if i % 3 == 0 { EntityKind::Article } else { EntityKind::Person };
					let id = format!("n{i}");
					(id.clone(), Node::new(id.clone(), id, kind, "#000"))
				})
				.collect();
			let edges: Vec<Edge> = links
				.into_iter()
				.enumerate()
				.map(|(i, (s, t))| {
					relationship_edge(i, &RelationshipRecord::new(format!("n{s}"), format!("n{t}"), EdgeType::PersonalConnection))
				})
				.collect();
			let params = SimulationParams { max_steps: 200, ..SimulationParams::batch() };

			let layout = settle(&nodes, &edges, params);
			prop_assert_eq!(layout.len(), n);
			prop_assert!(layout.values().all(|p| p.x.is_finite() && p.y.is_finite()));
		}
	}
}
