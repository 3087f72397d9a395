mod grouping;
mod normalize;
mod records;
mod types;

use log::info;

use crate::error::{GraphError, Result};

pub use grouping::{StateGraph, compute_groups};
pub use normalize::{
	DOCUMENT_COLOR, NEUTRAL_COLOR, ORGANIZATION_COLOR, REGION_COLOR, affiliation_color, article_node,
	normalize_edges, normalize_nodes, organization_node, person_node, region_node, relationship_edge,
	resolve_edges, size_multiplier,
};
pub use records::{
	ArticleRecord, GraphSources, OrganizationRecord, PersonRecord, RegionRecord, RelationshipRecord,
	Visibility,
};
pub use types::{
	Diagnostic, Edge, EdgeType, EntityKind, GraphPayload, GroupStats, Node, NodeCategory, NodeGroup,
	Subgraph, TraversalPolicy, TraversalState, UnknownEdgeType,
};

/// Normalizes the sources and computes every node group.
pub fn build_graph(sources: &GraphSources) -> GraphPayload {
	let mut diagnostics = Vec::new();
	let nodes = normalize_nodes(sources);
	let edges = resolve_edges(&nodes, normalize_edges(&sources.relationships), &mut diagnostics);
	let node_groups = compute_groups(&nodes, &edges, &mut diagnostics);

	info!(
		"graph built: {} nodes, {} edges, {} groups, {} dropped relationships",
		nodes.len(),
		edges.len(),
		node_groups.len(),
		diagnostics.len()
	);

	GraphPayload {
		nodes,
		edges,
		node_groups,
		diagnostics,
	}
}

impl GraphPayload {
	pub fn group(&self, id: &str) -> Option<&NodeGroup> {
		self.node_groups.iter().find(|g| g.id == id)
	}

	/// Nodes of one group and the edges running between them.
	pub fn subgraph(&self, group_id: &str) -> Result<Subgraph> {
		let group = self
			.group(group_id)
			.ok_or_else(|| GraphError::UnknownSubgraph(group_id.to_owned()))?;

		let nodes = self
			.nodes
			.iter()
			.filter(|(id, _)| group.contains(id))
			.map(|(id, node)| (id.clone(), node.clone()))
			.collect();
		let edges = self
			.edges
			.iter()
			.filter(|e| group.contains(&e.source) && group.contains(&e.target))
			.cloned()
			.collect();
		Ok(Subgraph { nodes, edges })
	}
}
