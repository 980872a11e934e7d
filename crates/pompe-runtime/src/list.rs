//! Stateful arrays and list views.
//!
//! A stateful array is a positional sequence of independent bindings plus the
//! registry of list views rendering it. Updates only ever grow or shrink the
//! tail: a bulk replace re-stamps the common prefix in place and then adjusts
//! the length. There is no reordering.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::binding::Binding;
use crate::dom::NodeId;
use crate::region::Region;
use crate::runtime::Runtime;
use crate::view::ViewContent;

/// Renders one item from its binding and index.
pub type ItemCtor<T> = Rc<dyn Fn(&mut Runtime, Binding<T>, usize) -> ViewContent>;

struct ListView<T: 'static> {
	region: Region,
	item: ItemCtor<T>,
	/// Top-level nodes rendered for each index
	rendered: Vec<Vec<NodeId>>,
}

struct ArrayState<T: 'static> {
	items: Vec<Binding<T>>,
	views: Vec<ListView<T>>,
}

/// An array of bindings, one per index.
pub struct StatefulArray<T: 'static> {
	state: Rc<RefCell<ArrayState<T>>>,
}

impl<T: 'static> Clone for StatefulArray<T> {
	fn clone(&self) -> Self {
		Self {
			state: Rc::clone(&self.state),
		}
	}
}

impl<T: 'static> fmt::Debug for StatefulArray<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("StatefulArray")
			.field("len", &state.items.len())
			.field("views", &state.views.len())
			.finish()
	}
}

impl<T: PartialEq + 'static> StatefulArray<T> {
	/// Creates an array with one binding per value.
	pub fn new(rt: &mut Runtime, values: impl IntoIterator<Item = T>) -> Self {
		let items = values
			.into_iter()
			.map(|value| rt.create_binding(value))
			.collect();
		Self {
			state: Rc::new(RefCell::new(ArrayState {
				items,
				views: Vec::new(),
			})),
		}
	}

	/// Creates an array of `len` values built from their index.
	pub fn from_fn(rt: &mut Runtime, len: usize, f: impl FnMut(usize) -> T) -> Self {
		Self::new(rt, (0..len).map(f))
	}

	/// Number of items.
	pub fn len(&self) -> usize {
		self.state.borrow().items.len()
	}

	/// Whether the array has no items.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Binding at `index`.
	pub fn binding(&self, index: usize) -> Option<Binding<T>> {
		self.state.borrow().items.get(index).cloned()
	}

	/// Value at `index`.
	pub fn get(&self, index: usize) -> Option<T>
	where
		T: Clone,
	{
		self.binding(index).map(|binding| binding.get())
	}

	/// Current values in order.
	pub fn values(&self) -> Vec<T>
	where
		T: Clone,
	{
		self.state.borrow().items.iter().map(Binding::get).collect()
	}

	/// Number of live list views over this array.
	pub fn view_count(&self, rt: &Runtime) -> usize {
		self.live_views(rt).len()
	}

	/// Sets the value at `index`. Returns whether a binding changed.
	pub fn set(&self, rt: &mut Runtime, index: usize, value: T) -> bool {
		match self.binding(index) {
			Some(binding) => rt.set_value(&binding, value, None),
			None => {
				tracing::warn!(index, len = self.len(), "stateful array write out of range ignored");
				false
			}
		}
	}

	/// Appends a value and renders it in every live view.
	pub fn push(&self, rt: &mut Runtime, value: T) {
		let binding = rt.create_binding(value);
		let index = {
			let mut state = self.state.borrow_mut();
			state.items.push(binding.clone());
			state.items.len() - 1
		};
		for (region, item) in self.live_views(rt) {
			let content = item(rt, binding.clone(), index);
			let nodes = match rt.document.parent(region.end) {
				Some(parent) => rt.insert_content(parent, Some(region.end), content),
				None => {
					tracing::warn!(?region, "list view markers missing, item dropped");
					rt.discard(content);
					Vec::new()
				}
			};
			let mut state = self.state.borrow_mut();
			if let Some(view) = state.views.iter_mut().find(|v| v.region == region) {
				view.rendered.push(nodes);
			}
		}
	}

	/// Removes and returns the last value.
	pub fn pop(&self, rt: &mut Runtime) -> Option<T>
	where
		T: Clone,
	{
		let len = self.len();
		let last = self.get(len.checked_sub(1)?)?;
		self.truncate(rt, len - 1);
		Some(last)
	}

	/// Drops trailing items, removing their rendered nodes from every view.
	pub fn truncate(&self, rt: &mut Runtime, len: usize) {
		let (dropped, stale) = {
			let mut state = self.state.borrow_mut();
			if len >= state.items.len() {
				return;
			}
			let dropped = state.items.split_off(len);
			let stale: Vec<NodeId> = state
				.views
				.iter_mut()
				.flat_map(|view| {
					let keep = len.min(view.rendered.len());
					view.rendered.split_off(keep)
				})
				.flatten()
				.collect();
			(dropped, stale)
		};
		for node in stale {
			rt.cleanup(node);
		}
		for binding in dropped {
			rt.release_binding(binding.id());
		}
	}

	/// Re-stamps the common prefix in place, then grows or shrinks the tail.
	pub fn replace_all(&self, rt: &mut Runtime, values: impl IntoIterator<Item = T>) {
		let mut values = values.into_iter();
		let current: Vec<Binding<T>> = self.state.borrow().items.clone();
		let mut kept = 0;
		for binding in &current {
			match values.next() {
				Some(value) => {
					rt.set_value(binding, value, None);
					kept += 1;
				}
				None => break,
			}
		}
		if kept < current.len() {
			self.truncate(rt, kept);
		}
		for value in values {
			self.push(rt, value);
		}
	}

	/// Views whose start marker is still alive; stale views are dropped.
	fn live_views(&self, rt: &Runtime) -> Vec<(Region, ItemCtor<T>)> {
		let mut state = self.state.borrow_mut();
		state
			.views
			.retain(|view| rt.document.is_alive(view.region.start));
		state
			.views
			.iter()
			.map(|view| (view.region, Rc::clone(&view.item)))
			.collect()
	}
}

impl Runtime {
	/// Renders every item of `array` between region markers and registers the
	/// view so later pushes and truncations update it. Returns a fragment
	/// holding the region.
	pub fn construct_list_view<T, F>(&mut self, array: &StatefulArray<T>, item: F) -> NodeId
	where
		T: PartialEq + 'static,
		F: Fn(&mut Runtime, Binding<T>, usize) -> ViewContent + 'static,
	{
		let fragment = self.document.create_fragment();
		let region = self.create_region(fragment, None);
		let item: ItemCtor<T> = Rc::new(item);

		let items: Vec<Binding<T>> = array.state.borrow().items.clone();
		let mut rendered = Vec::with_capacity(items.len());
		for (index, binding) in items.into_iter().enumerate() {
			let content = item(self, binding, index);
			rendered.push(self.insert_content(fragment, Some(region.end), content));
		}
		tracing::trace!(items = rendered.len(), "constructed list view");

		array.state.borrow_mut().views.push(ListView {
			region,
			item,
			rendered,
		});
		fragment
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Namespace;
	use crate::view::Children;
	use rstest::{fixture, rstest};

	fn li(rt: &mut Runtime, binding: Binding<String>, index: usize) -> ViewContent {
		let b = binding.clone();
		rt.construct(
			"li",
			Vec::new(),
			Children::fused(move |_| format!("{}:{}", index, b.get()).into(), [binding.id()]),
			Namespace::Html,
		)
		.into()
	}

	#[fixture]
	fn rt() -> Runtime {
		Runtime::new()
	}

	fn mounted(rt: &mut Runtime, array: &StatefulArray<String>) -> NodeId {
		let view = rt.construct_list_view(array, li);
		rt.construct("ul", Vec::new(), vec![ViewContent::from(view)].into(), Namespace::Html)
	}

	fn words(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[rstest]
	fn test_initial_render(mut rt: Runtime) {
		let array = StatefulArray::new(&mut rt, words(&["a", "b"]));
		let ul = mounted(&mut rt, &array);
		assert_eq!(
			rt.document().to_html(ul),
			"<ul><!--[--><li>0:a</li><li>1:b</li><!--]--></ul>"
		);
	}

	#[rstest]
	fn test_set_updates_rendered_item(mut rt: Runtime) {
		let array = StatefulArray::new(&mut rt, words(&["a", "b"]));
		let ul = mounted(&mut rt, &array);
		assert!(array.set(&mut rt, 1, "z".into()));
		assert!(!array.set(&mut rt, 9, "z".into()));
		assert_eq!(rt.document().text_content(ul), "0:a1:z");
	}

	#[rstest]
	fn test_pop_and_replace_all(mut rt: Runtime) {
		let array = StatefulArray::new(&mut rt, words(&["a", "b", "c"]));
		let ul = mounted(&mut rt, &array);

		assert_eq!(array.pop(&mut rt), Some("c".to_string()));
		assert_eq!(rt.document().text_content(ul), "0:a1:b");

		array.replace_all(&mut rt, words(&["x", "y", "z", "w"]));
		assert_eq!(rt.document().text_content(ul), "0:x1:y2:z3:w");

		array.replace_all(&mut rt, words(&["q"]));
		assert_eq!(rt.document().text_content(ul), "0:q");
		assert_eq!(array.values(), words(&["q"]));
	}

	#[rstest]
	fn test_from_fn_builder(mut rt: Runtime) {
		let array = StatefulArray::from_fn(&mut rt, 3, |i| i * 10);
		assert_eq!(array.values(), vec![0, 10, 20]);
		assert_eq!(StatefulArray::<i32>::new(&mut rt, []).pop(&mut rt), None);
	}

	#[rstest]
	fn test_cleaned_up_view_is_unregistered(mut rt: Runtime) {
		let array = StatefulArray::new(&mut rt, words(&["a"]));
		let ul = mounted(&mut rt, &array);
		assert_eq!(array.view_count(&rt), 1);

		rt.cleanup(ul);
		array.push(&mut rt, "b".into());

		assert_eq!(array.view_count(&rt), 0);
		assert_eq!(array.len(), 2);
	}
}
