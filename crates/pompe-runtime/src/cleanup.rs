//! Node cleanup.
//!
//! A node leaves the tree only after it and everything it owns has left every
//! subscriber list. Owned means its subtree, the contents and end marker of a
//! region it opens, and regions it relocated elsewhere.

use crate::binding::Target;
use crate::dom::{Marker, NodeId, NodeKind};
use crate::runtime::Runtime;

impl Runtime {
	/// Releases `node` and everything it owns, then detaches it.
	pub fn cleanup(&mut self, node: NodeId) {
		if !self.document.is_alive(node) {
			return;
		}
		self.release(node);
		self.document.detach(node);
	}

	fn release(&mut self, node: NodeId) {
		if !self.document.is_alive(node) {
			return;
		}

		for child in self.document.children(node).to_vec() {
			self.release(child);
		}
		if let NodeKind::Marker(Marker::Start { end }) = *self.document.kind(node) {
			for inner in self.document.between(node, end) {
				self.cleanup(inner);
			}
			self.cleanup(end);
		}
		for owned in std::mem::take(&mut self.document.data_mut(node).owned) {
			self.cleanup(owned);
		}

		self.unsubscribe_all(Target::Node(node));
		self.stop_poll(node);
		if let Some(destroy) = self.document.data_mut(node).destroy.take() {
			destroy(self, node);
		}
		self.document.kill(node);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Namespace;
	use crate::view::{Children, MutatorGroup, ViewContent};
	use rstest::rstest;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[rstest]
	fn test_teardown_runs_before_detach() {
		let mut rt = Runtime::new();
		let body = rt.document().body();
		let node = rt.construct("div", Vec::new(), Children::none(), Namespace::Html);
		rt.document_mut().append_child(body, node);
		let attached = Rc::new(RefCell::new(None));
		let a = Rc::clone(&attached);
		rt.set_destroy(node, move |rt, el| {
			*a.borrow_mut() = Some(rt.document().parent(el).is_some());
		});

		rt.cleanup(node);

		assert_eq!(*attached.borrow(), Some(true));
		assert!(rt.document().children(body).is_empty());
	}

	#[rstest]
	fn test_subtree_leaves_subscriber_lists() {
		let mut rt = Runtime::new();
		let flag = rt.create_binding(false);
		let f = flag.clone();
		let child = rt.construct(
			"input",
			vec![
				MutatorGroup::new(move |rt, el| {
					let checked = f.get();
					rt.document_mut().set_prop(el, "checked", checked);
				})
				.with_deps([flag.id()]),
			],
			Children::none(),
			Namespace::Html,
		);
		let parent = rt.construct(
			"form",
			Vec::new(),
			vec![ViewContent::from(child)].into(),
			Namespace::Html,
		);
		assert_eq!(rt.subscribers(flag.id()).len(), 2);

		rt.cleanup(parent);

		assert!(rt.subscribers(flag.id()).is_empty());
		assert!(!rt.document().is_alive(child));
	}

	#[rstest]
	fn test_cleanup_stops_media_poll() {
		let mut rt = Runtime::new();
		let video = rt.construct("video", Vec::new(), Children::none(), Namespace::Html);
		rt.start_poll(video, Rc::new(|_, _| {}));
		assert_eq!(rt.active_intervals(), 1);

		rt.cleanup(video);
		assert_eq!(rt.active_intervals(), 0);
	}
}
