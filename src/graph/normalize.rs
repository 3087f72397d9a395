//! Entity and relationship normalizers: typed records in, uniform
//! [`Node`]/[`Edge`] records out. Pure functions, no I/O.

use indexmap::{IndexMap, IndexSet};
use log::warn;

use super::records::{
	ArticleRecord, GraphSources, OrganizationRecord, PersonRecord, RegionRecord, RelationshipRecord,
};
use super::types::{Diagnostic, Edge, EdgeType, EntityKind, Node};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NEUTRAL_COLOR: &str = "#9e9e9e";
pub const ORGANIZATION_COLOR: &str = "#4a6fa5";
pub const REGION_COLOR: &str = "#3f8f5a";
pub const DOCUMENT_COLOR: &str = "#c9b458";

/// Sub-linear exponent applied to the unresolved reference count.
const SIZE_EXPONENT: f64 = 0.3;

/// Palette color for an affiliation. Stable across runs and platforms.
pub fn affiliation_color(affiliation: &str) -> &'static str {
	let hash = affiliation
		.bytes()
		.fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
	COLORS[hash as usize % COLORS.len()]
}

pub fn person_node(id: &str, person: &PersonRecord) -> Node {
	let color = person
		.affiliations
		.first()
		.map(|a| affiliation_color(a))
		.unwrap_or(NEUTRAL_COLOR);
	let mut node = Node::new(id, &person.name, EntityKind::Person, color);
	node.hidden = person.visibility.is_hidden();
	node
}

pub fn organization_node(id: &str, org: &OrganizationRecord) -> Node {
	let mut node = Node::new(id, &org.name, EntityKind::Organization, ORGANIZATION_COLOR);
	node.hidden = org.visibility.is_hidden();
	node
}

pub fn region_node(id: &str, region: &RegionRecord) -> Node {
	let mut node = Node::new(id, &region.name, EntityKind::Region, REGION_COLOR);
	node.hidden = region.visibility.is_hidden();
	node
}

/// `resolved` is how many of the article's references already exist as
/// mention edges.
pub fn article_node(id: &str, article: &ArticleRecord, resolved: u32) -> Node {
	let mut node = Node::new(id, &article.title, EntityKind::Article, DOCUMENT_COLOR);
	node.size_multiplier = Some(size_multiplier(article.estimated_reference_count, resolved));
	node.hidden = article.visibility.is_hidden();
	node
}

pub fn size_multiplier(estimated: Option<u32>, resolved: u32) -> f64 {
	let unresolved = estimated.unwrap_or(0).saturating_sub(resolved).max(1);
	(unresolved as f64).powf(SIZE_EXPONENT)
}

/// `index` is the record's position, used only when it has no id of its own.
pub fn relationship_edge(index: usize, rel: &RelationshipRecord) -> Edge {
	let id = rel
		.id
		.clone()
		.unwrap_or_else(|| format!("{}>{}#{}", rel.source, rel.target, index));
	Edge {
		id,
		source: rel.source.clone(),
		target: rel.target.clone(),
		kind: rel.kind,
		label: rel
			.name
			.clone()
			.unwrap_or_else(|| rel.kind.label().to_owned()),
		traversal_policy: rel.kind.traversal_policy(),
	}
}

/// Normalizes every entity record. Order: people, organizations, regions,
/// articles, each in source order.
pub fn normalize_nodes(sources: &GraphSources) -> IndexMap<String, Node> {
	let known = |id: &str| {
		sources.people.contains_key(id)
			|| sources.organizations.contains_key(id)
			|| sources.regions.contains_key(id)
			|| sources.articles.contains_key(id)
	};
	// distinct known targets per mentioning article
	let mut resolved: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
	for rel in &sources.relationships {
		if rel.kind == EdgeType::Mentions && known(&rel.target) {
			resolved
				.entry(rel.source.as_str())
				.or_default()
				.insert(rel.target.as_str());
		}
	}

	let people = sources.people.iter().map(|(id, p)| person_node(id, p));
	let orgs = sources
		.organizations
		.iter()
		.map(|(id, o)| organization_node(id, o));
	let regions = sources.regions.iter().map(|(id, r)| region_node(id, r));
	let articles = sources.articles.iter().map(|(id, a)| {
		let count = resolved.get(id.as_str()).map_or(0, |targets| targets.len() as u32);
		article_node(id, a, count)
	});

	let mut nodes = IndexMap::new();
	for node in people.chain(orgs).chain(regions).chain(articles) {
		if nodes.contains_key(&node.id) {
			warn!("duplicate entity id {:?}, keeping the first record", node.id);
			continue;
		}
		nodes.insert(node.id.clone(), node);
	}
	nodes
}

pub fn normalize_edges(relationships: &[RelationshipRecord]) -> Vec<Edge> {
	relationships
		.iter()
		.enumerate()
		.map(|(i, rel)| relationship_edge(i, rel))
		.collect()
}

/// Drops edges whose endpoints are not both known nodes.
pub fn resolve_edges(
	nodes: &IndexMap<String, Node>,
	edges: Vec<Edge>,
	diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Edge> {
	edges
		.into_iter()
		.filter(|edge| {
			let missing = [&edge.source, &edge.target]
				.into_iter()
				.find(|id| !nodes.contains_key(id.as_str()));
			match missing {
				Some(node) => {
					warn!("dropping edge {:?}: unknown endpoint {:?}", edge.id, node);
					diagnostics.push(Diagnostic::UnknownEndpoint {
						edge: edge.id.clone(),
						node: node.clone(),
					});
					false
				}
				None => true,
			}
		})
		.collect()
}
