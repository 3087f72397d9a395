use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of domain entity a node stands for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
	#[default]
	Person,
	Organization,
	Region,
	Article,
}

impl EntityKind {
	/// Rendering category the kind is drawn with.
	pub const fn category(self) -> NodeCategory {
		match self {
			EntityKind::Person => NodeCategory::Circle,
			EntityKind::Organization | EntityKind::Region => NodeCategory::Rect,
			EntityKind::Article => NodeCategory::Document,
		}
	}

	/// Organizations and regions are hubs that get their own [`NodeGroup`].
	pub const fn is_grouping(self) -> bool {
		matches!(self, EntityKind::Organization | EntityKind::Region)
	}
}

/// Rendering category of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
	/// A person.
	#[default]
	Circle,
	/// An organization or region.
	Rect,
	/// An article or other mention source.
	Document,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	pub name: String,
	pub kind: EntityKind,
	pub category: NodeCategory,
	pub color: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size_multiplier: Option<f64>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub hidden: bool,
}

impl Node {
	pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind, color: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind,
			category: kind.category(),
			color: color.into(),
			size_multiplier: None,
			hidden: false,
		}
	}

	/// Size multiplier, 1 when none was derived.
	pub fn size(&self) -> f64 {
		self.size_multiplier.unwrap_or(1.0)
	}
}

/// Closed set of relationship types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
	Employment,
	PersonalConnection,
	Mentions,
	Ownership,
	CommentThread,
	ElectionCandidacy,
}

impl EdgeType {
	pub const ALL: [EdgeType; 6] = [
		EdgeType::Employment,
		EdgeType::PersonalConnection,
		EdgeType::Mentions,
		EdgeType::Ownership,
		EdgeType::CommentThread,
		EdgeType::ElectionCandidacy,
	];

	/// Default label used when the relationship carries no explicit name.
	pub const fn label(self) -> &'static str {
		match self {
			EdgeType::Employment => "pracuje w",
			EdgeType::PersonalConnection => "zna",
			EdgeType::Mentions => "wspomina",
			EdgeType::Ownership => "jest właścicielem",
			EdgeType::CommentThread => "komentuje",
			EdgeType::ElectionCandidacy => "kandyduje w",
		}
	}

	/// How grouping propagates across an edge of this type.
	pub const fn traversal_policy(self) -> TraversalPolicy {
		use TraversalState::{Active, DeadEnd};

		let (forward, backward) = match self {
			EdgeType::Employment => (Active, DeadEnd),
			EdgeType::PersonalConnection => (Active, Active),
			EdgeType::Mentions => (DeadEnd, Active),
			EdgeType::Ownership => (Active, DeadEnd),
			EdgeType::CommentThread => (DeadEnd, DeadEnd),
			EdgeType::ElectionCandidacy => (DeadEnd, Active),
		};
		TraversalPolicy {
			forward: Some(forward),
			backward: Some(backward),
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			EdgeType::Employment => "employment",
			EdgeType::PersonalConnection => "personal-connection",
			EdgeType::Mentions => "mentions",
			EdgeType::Ownership => "ownership",
			EdgeType::CommentThread => "comment-thread",
			EdgeType::ElectionCandidacy => "election-candidacy",
		}
	}
}

impl fmt::Display for EdgeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string tag names no [`EdgeType`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown relationship type {0:?}")]
pub struct UnknownEdgeType(pub String);

impl FromStr for EdgeType {
	type Err = UnknownEdgeType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		EdgeType::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| UnknownEdgeType(s.to_owned()))
	}
}

/// Outcome of reaching a node through an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalState {
	/// Propagation continues from the reached node.
	Active,
	/// The reached node joins the group but propagates no further.
	DeadEnd,
}

/// Per-direction propagation rule. `None` hides the edge from grouping in
/// that direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPolicy {
	pub forward: Option<TraversalState>,
	pub backward: Option<TraversalState>,
}

impl TraversalPolicy {
	pub const fn is_absent(&self) -> bool {
		self.forward.is_none() && self.backward.is_none()
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeType,
	pub label: String,
	pub traversal_policy: TraversalPolicy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
	pub people: usize,
}

/// Reachable subgraph rooted at one grouping entity, or the synthetic
/// all-entities group (id `""`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
	pub id: String,
	pub name: String,
	pub connected: IndexSet<String>,
	pub stats: GroupStats,
}

impl NodeGroup {
	pub const ALL_ID: &'static str = "";
	pub const ALL_NAME: &'static str = "all";

	pub fn is_all(&self) -> bool {
		self.id == Self::ALL_ID
	}

	pub fn contains(&self, id: &str) -> bool {
		self.connected.contains(id)
	}
}

/// A relationship dropped before grouping or layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "problem", rename_all = "kebab-case")]
pub enum Diagnostic {
	UnknownEndpoint { edge: String, node: String },
	MissingTraversalPolicy { edge: String },
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Diagnostic::UnknownEndpoint { edge, node } => {
				write!(f, "edge {edge:?} references unknown node {node:?}")
			}
			Diagnostic::MissingTraversalPolicy { edge } => {
				write!(f, "edge {edge:?} has no traversal policy")
			}
		}
	}
}

/// Filtered view of the graph restricted to one group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
	pub nodes: IndexMap<String, Node>,
	pub edges: Vec<Edge>,
}

/// Full derived graph handed to the UI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
	pub nodes: IndexMap<String, Node>,
	pub edges: Vec<Edge>,
	pub node_groups: Vec<NodeGroup>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}
