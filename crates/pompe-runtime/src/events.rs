//! Node-side events and the echo guard.
//!
//! A two-way bound property is written from both sides. When the node changes
//! it first sets its echo slot to the property name and then sets the
//! binding; the binding-side mutator sees the slot, clears it and skips its
//! write.

use std::rc::Rc;

use crate::dom::{NodeCallback, NodeId};
use crate::runtime::Runtime;

impl Runtime {
	/// Registers a listener for `event` (`"input"`, `"click"`, …).
	pub fn add_listener(
		&mut self,
		node: NodeId,
		event: &str,
		listener: impl Fn(&mut Runtime, NodeId) + 'static,
	) {
		let listener: NodeCallback = Rc::new(listener);
		self.document
			.data_mut(node)
			.listeners
			.push((event.to_string(), listener));
	}

	/// Invokes every listener of `event` on `node` in registration order.
	/// Returns the number of listeners run.
	pub fn dispatch_event(&mut self, node: NodeId, event: &str) -> usize {
		if !self.document.is_alive(node) {
			tracing::warn!(?node, event, "event dispatched to a cleaned up node");
			return 0;
		}
		let listeners: Vec<NodeCallback> = self
			.document
			.data(node)
			.listeners
			.iter()
			.filter(|(name, _)| name == event)
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in &listeners {
			listener(self, node);
		}
		listeners.len()
	}

	/// Stores the teardown hook run when the node is cleaned up.
	pub fn set_destroy(&mut self, node: NodeId, hook: impl Fn(&mut Runtime, NodeId) + 'static) {
		self.document.data_mut(node).destroy = Some(Rc::new(hook));
	}

	/// Marks `property` as written from the node side.
	pub fn set_echo(&mut self, node: NodeId, property: &str) {
		self.document.data_mut(node).echo = Some(property.to_string());
	}

	/// Returns `true` and clears the slot when `property` is the echo in
	/// flight, meaning the binding-side write must be skipped.
	pub fn echo_guard(&mut self, node: NodeId, property: &str) -> bool {
		let echo = &mut self.document.data_mut(node).echo;
		if echo.as_deref() == Some(property) {
			*echo = None;
			true
		} else {
			false
		}
	}
}
