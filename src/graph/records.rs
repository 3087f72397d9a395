//! Records as produced by the data-fetching collaborators. Visibility
//! filtering of relationships has already happened upstream.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::EdgeType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
	#[default]
	Public,
	Hidden,
}

impl Visibility {
	pub fn is_hidden(self) -> bool {
		self == Visibility::Hidden
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRecord {
	pub name: String,
	/// Ordered, primary affiliation first.
	pub affiliations: Vec<String>,
	pub visibility: Visibility,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationRecord {
	pub name: String,
	pub visibility: Visibility,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionRecord {
	pub name: String,
	pub visibility: Visibility,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleRecord {
	pub title: String,
	/// How many people the article is believed to mention.
	pub estimated_reference_count: Option<u32>,
	pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
	#[serde(default)]
	pub id: Option<String>,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeType,
	/// Explicit label, overrides the per-type default.
	#[serde(default)]
	pub name: Option<String>,
}

impl RelationshipRecord {
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeType) -> Self {
		Self {
			id: None,
			source: source.into(),
			target: target.into(),
			kind,
			name: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

/// Everything one graph fetch works from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSources {
	pub people: IndexMap<String, PersonRecord>,
	pub organizations: IndexMap<String, OrganizationRecord>,
	pub regions: IndexMap<String, RegionRecord>,
	pub articles: IndexMap<String, ArticleRecord>,
	pub relationships: Vec<RelationshipRecord>,
}
