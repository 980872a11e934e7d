//! Region markers.
//!
//! A region is a start/end sentinel pair bracketing content that can be
//! replaced wholesale without touching its siblings. Emptying cleans up each
//! node strictly between the markers; replacing empties and then inserts the
//! new content before the end marker. List views, dynamic views and head
//! relocation are all built on these two operations.

use crate::dom::{Marker, NodeId, NodeKind};
use crate::runtime::Runtime;
use crate::view::ViewContent;

/// A start/end marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
	/// Opening sentinel
	pub start: NodeId,
	/// Closing sentinel
	pub end: NodeId,
}

impl Runtime {
	/// Appends a new marker pair to `parent` before `reference`.
	pub fn create_region(&mut self, parent: NodeId, reference: Option<NodeId>) -> Region {
		let (start, end) = self.document.create_marker_pair();
		self.document.insert_before(parent, start, reference);
		self.document.insert_before(parent, end, reference);
		Region { start, end }
	}

	/// The region opened by `start`, if it is a start marker.
	pub fn region_of(&self, start: NodeId) -> Option<Region> {
		match self.document.kind(start) {
			NodeKind::Marker(Marker::Start { end }) => Some(Region { start, end: *end }),
			_ => None,
		}
	}

	/// Nodes strictly between the markers.
	pub fn region_nodes(&self, region: Region) -> Vec<NodeId> {
		self.document.between(region.start, region.end)
	}

	fn region_parent(&self, region: Region) -> Option<NodeId> {
		let parent = self.document.parent(region.start);
		if parent.is_none()
			|| !self.document.is_alive(region.start)
			|| parent != self.document.parent(region.end)
		{
			tracing::warn!(?region, "region markers missing, update ignored");
			return None;
		}
		parent
	}

	/// Cleans up every node between the markers.
	pub fn empty_region(&mut self, region: Region) {
		if self.region_parent(region).is_none() {
			return;
		}
		for node in self.region_nodes(region) {
			self.cleanup(node);
		}
	}

	/// Empties the region and inserts `content` before its end marker.
	/// Returns the inserted nodes.
	pub fn replace_region(&mut self, region: Region, content: ViewContent) -> Vec<NodeId> {
		let Some(parent) = self.region_parent(region) else {
			self.discard(content);
			return Vec::new();
		};
		for node in self.region_nodes(region) {
			self.cleanup(node);
		}
		self.insert_content(parent, Some(region.end), content)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn rt() -> Runtime {
		Runtime::new()
	}

	#[rstest]
	fn test_replace_keeps_siblings(mut rt: Runtime) {
		let body = rt.document().body();
		let before = rt.document_mut().create_text("<");
		rt.document_mut().append_child(body, before);
		let region = rt.create_region(body, None);
		let after = rt.document_mut().create_text(">");
		rt.document_mut().append_child(body, after);

		rt.replace_region(region, ViewContent::from("a"));
		rt.replace_region(region, ViewContent::List(vec!["b".into(), "c".into()]));

		assert_eq!(rt.document().text_content(body), "<bc>");
		assert_eq!(rt.region_nodes(region).len(), 2);
	}

	#[rstest]
	fn test_empty_cleans_up_contents(mut rt: Runtime) {
		let body = rt.document().body();
		let region = rt.create_region(body, None);
		let nodes = rt.replace_region(region, ViewContent::from("x"));

		rt.empty_region(region);

		assert!(rt.region_nodes(region).is_empty());
		assert!(!rt.document().is_alive(nodes[0]));
		assert_eq!(rt.document().to_html(body), "<body><!--[--><!--]--></body>");
	}

	#[rstest]
	fn test_missing_markers_degrade_to_noop(mut rt: Runtime) {
		let body = rt.document().body();
		let region = rt.create_region(body, None);
		rt.cleanup(region.start);

		assert!(rt.replace_region(region, ViewContent::from("x")).is_empty());
		assert_eq!(rt.document().to_html(body), "<body></body>");
	}

	#[rstest]
	fn test_region_of(mut rt: Runtime) {
		let body = rt.document().body();
		let region = rt.create_region(body, None);
		assert_eq!(rt.region_of(region.start), Some(region));
		assert_eq!(rt.region_of(region.end), None);
	}
}
