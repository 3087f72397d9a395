use indexmap::IndexMap;
use log::debug;

use super::params::SimulationParams;
use super::simulation::{Layout, settle};
use crate::graph::{Edge, Node};

/// Last settled layout, keyed by the node count it was computed for.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
	entry: Option<(usize, Layout)>,
}

impl LayoutCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// The cached layout, if it was computed for `node_count` nodes.
	pub fn get(&self, node_count: usize) -> Option<&Layout> {
		match &self.entry {
			Some((count, layout)) if *count == node_count => Some(layout),
			_ => None,
		}
	}

	pub fn store(&mut self, node_count: usize, layout: Layout) {
		self.entry = Some((node_count, layout));
	}

	pub fn get_or_settle(
		&mut self,
		nodes: &IndexMap<String, Node>,
		edges: &[Edge],
		params: &SimulationParams,
	) -> &Layout {
		let count = nodes.len();
		if matches!(&self.entry, Some((cached, _)) if *cached == count) {
			debug!("layout cache hit for {count} nodes");
		} else {
			debug!("layout cache miss for {count} nodes, settling");
			self.entry = Some((count, settle(nodes, edges, params.clone())));
		}
		let (_, layout) = self.entry.as_ref().expect("entry populated above");
		layout
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::EntityKind;
	use crate::layout::simulation::Point;

	fn nodes(n: usize) -> IndexMap<String, Node> {
		(0..n)
			.map(|i| {
				let id = format!("p{i}");
				(id.clone(), Node::new(id.clone(), id, EntityKind::Person, "#000"))
			})
			.collect()
	}

	#[test]
	fn hit_requires_matching_node_count() {
		let mut cache = LayoutCache::new();
		assert!(cache.get(2).is_none());

		let mut layout = Layout::new();
		layout.insert("p0".into(), Point { x: 1.0, y: 2.0 });
		cache.store(2, layout.clone());

		assert_eq!(cache.get(2), Some(&layout));
		assert_eq!(cache.get(3), None);
	}

	#[test]
	fn settles_on_miss_and_reuses_on_hit() {
		let mut cache = LayoutCache::new();
		let params = SimulationParams {
			max_steps: 20,
			..SimulationParams::batch()
		};

		let first = cache.get_or_settle(&nodes(3), &[], &params).clone();
		assert_eq!(first.len(), 3);

		// same count, different ids: still a hit
		let mut renamed = nodes(3);
		renamed.shift_remove("p0");
		renamed.insert("q".into(), Node::new("q", "q", EntityKind::Person, "#000"));
		assert_eq!(cache.get_or_settle(&renamed, &[], &params), &first);

		let grown = cache.get_or_settle(&nodes(4), &[], &params);
		assert_eq!(grown.len(), 4);
	}
}
