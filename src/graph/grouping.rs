/*!
Reachability grouping.

Every node is split into two vertices, `active` and `dead_end`. An edge whose
policy says `forward: S` becomes `source/active -> target/S`, and `backward: S`
becomes `target/active -> source/S`. `dead_end` vertices never get outgoing
edges, so plain reachability from `root/active` stops exactly where the policy
table says it should. The traversal itself knows nothing about edge types.
*/

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use super::types::{Diagnostic, Edge, GroupStats, Node, NodeCategory, NodeGroup, TraversalState};

/// The doubled graph. Vertex `2 * i` is node `i` active, `2 * i + 1` is node
/// `i` as a dead end, where `i` is the node's position in the node map.
pub struct StateGraph<'a> {
	nodes: &'a IndexMap<String, Node>,
	graph: DiGraph<(), ()>,
}

impl<'a> StateGraph<'a> {
	/// Edges with an unknown endpoint or no policy at all are skipped and
	/// reported.
	pub fn build(
		nodes: &'a IndexMap<String, Node>,
		edges: &[Edge],
		diagnostics: &mut Vec<Diagnostic>,
	) -> Self {
		let mut graph = DiGraph::with_capacity(nodes.len() * 2, edges.len() * 2);
		for _ in 0..nodes.len() * 2 {
			graph.add_node(());
		}

		for edge in edges {
			let policy = edge.traversal_policy;
			if policy.is_absent() {
				warn!("skipping edge {:?}: no traversal policy", edge.id);
				diagnostics.push(Diagnostic::MissingTraversalPolicy {
					edge: edge.id.clone(),
				});
				continue;
			}
			let (Some(source), Some(target)) = (
				nodes.get_index_of(&edge.source),
				nodes.get_index_of(&edge.target),
			) else {
				let node = if nodes.contains_key(&edge.source) {
					&edge.target
				} else {
					&edge.source
				};
				warn!("skipping edge {:?}: unknown endpoint {:?}", edge.id, node);
				diagnostics.push(Diagnostic::UnknownEndpoint {
					edge: edge.id.clone(),
					node: node.clone(),
				});
				continue;
			};

			if let Some(state) = policy.forward {
				graph.add_edge(vertex(source, TraversalState::Active), vertex(target, state), ());
			}
			if let Some(state) = policy.backward {
				graph.add_edge(vertex(target, TraversalState::Active), vertex(source, state), ());
			}
		}

		Self { nodes, graph }
	}

	/// Ids reachable from `root` as an active vertex, root included, in
	/// discovery order. Hidden nodes other than the root are left out.
	pub fn reachable(&self, root: usize) -> IndexSet<String> {
		let mut seen = IndexSet::new();
		let mut dfs = Dfs::new(&self.graph, vertex(root, TraversalState::Active));
		while let Some(v) = dfs.next(&self.graph) {
			let idx = v.index() / 2;
			if idx != root && self.nodes[idx].hidden {
				continue;
			}
			if let Some((id, _)) = self.nodes.get_index(idx) {
				seen.insert(id.clone());
			}
		}
		seen
	}

	pub fn vertex_count(&self) -> usize {
		self.graph.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}
}

fn vertex(idx: usize, state: TraversalState) -> NodeIndex {
	let offset = match state {
		TraversalState::Active => 0,
		TraversalState::DeadEnd => 1,
	};
	NodeIndex::new(idx * 2 + offset)
}

fn count_people<'n>(nodes: &IndexMap<String, Node>, ids: impl Iterator<Item = &'n String>) -> usize {
	ids.filter(|id| {
		nodes
			.get(id.as_str())
			.is_some_and(|n| n.category == NodeCategory::Circle)
	})
	.count()
}

/// One group per visible organization/region plus the synthetic all-group,
/// sorted by person count, descending. Ties keep node order, with the
/// all-group last.
pub fn compute_groups(
	nodes: &IndexMap<String, Node>,
	edges: &[Edge],
	diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NodeGroup> {
	let state_graph = StateGraph::build(nodes, edges, diagnostics);
	debug!(
		"state graph: {} vertices, {} edges",
		state_graph.vertex_count(),
		state_graph.edge_count()
	);

	let mut groups: Vec<NodeGroup> = nodes
		.values()
		.enumerate()
		.filter(|(_, node)| node.kind.is_grouping() && !node.hidden)
		.map(|(idx, node)| {
			let connected = state_graph.reachable(idx);
			let people = count_people(nodes, connected.iter());
			NodeGroup {
				id: node.id.clone(),
				name: node.name.clone(),
				connected,
				stats: GroupStats { people },
			}
		})
		.collect();

	groups.push(NodeGroup {
		id: NodeGroup::ALL_ID.to_owned(),
		name: NodeGroup::ALL_NAME.to_owned(),
		connected: nodes.keys().cloned().collect(),
		stats: GroupStats {
			people: count_people(nodes, nodes.keys()),
		},
	});

	// sort_by is stable
	groups.sort_by(|a, b| b.stats.people.cmp(&a.stats.people));
	groups
}
