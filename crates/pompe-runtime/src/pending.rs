//! Subscriptions for a node that does not exist yet.
//!
//! Dependency arrays are evaluated before the node owning them is built. A
//! [`PendingBindings`] context collects those subscriptions under a
//! placeholder target and patches them onto the finished node. Each context
//! has its own placeholder, so constructions can nest.

use crate::binding::{BindingId, Mutator, Target, dep_list};
use crate::dom::NodeId;
use crate::runtime::Runtime;

/// Identifier of a placeholder target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingId(u32);

/// Placeholder subscriptions awaiting their owner.
#[derive(Debug)]
pub struct PendingBindings {
	id: PendingId,
	bindings: Vec<BindingId>,
}

impl PendingBindings {
	/// Opens a context with a fresh placeholder.
	pub fn new(rt: &mut Runtime) -> Self {
		let id = PendingId(rt.next_pending);
		rt.next_pending += 1;
		Self {
			id,
			bindings: Vec::new(),
		}
	}

	/// Placeholder target used by this context.
	pub fn target(&self) -> Target {
		Target::Pending(self.id)
	}

	/// Subscribes `mutator` to every dependency under the placeholder.
	pub fn subscribe<I, D>(&mut self, rt: &mut Runtime, deps: I, mutator: Mutator)
	where
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		for dep in dep_list(deps) {
			rt.subscribe(dep, self.target(), Mutator::clone(&mutator));
			if !self.bindings.contains(&dep) {
				self.bindings.push(dep);
			}
		}
	}

	/// Whether nothing was subscribed.
	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Moves every placeholder run onto `node`.
	pub fn resolve(self, rt: &mut Runtime, node: NodeId) {
		tracing::trace!(?node, bindings = self.bindings.len(), "resolving pending bindings");
		for binding in self.bindings {
			rt.replace_target(binding, Target::Pending(self.id), Target::Node(node));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[rstest]
	fn test_pending_runs_skip_until_resolved() {
		let mut rt = Runtime::new();
		let b = rt.create_binding(0);
		let seen = Rc::new(RefCell::new(Vec::new()));
		let s = Rc::clone(&seen);
		let mut pending = PendingBindings::new(&mut rt);
		pending.subscribe(
			&mut rt,
			[b.id()],
			Rc::new(move |_, target| s.borrow_mut().push(target)),
		);

		rt.set_value(&b, 1, None);
		assert!(seen.borrow().is_empty());

		let node = rt.document_mut().create_text("");
		pending.resolve(&mut rt, node);
		rt.set_value(&b, 2, None);
		assert_eq!(*seen.borrow(), vec![Target::Node(node)]);
		assert_eq!(rt.subscribers(b.id())[0].target(), Some(Target::Node(node)));
	}

	#[rstest]
	fn test_nested_contexts_are_independent() {
		let mut rt = Runtime::new();
		let outer = PendingBindings::new(&mut rt);
		let inner = PendingBindings::new(&mut rt);
		assert_ne!(outer.target(), inner.target());
	}
}
