//! Element construction and dynamic views.
//!
//! Children reach the runtime already tagged as [`ViewContent`], so insertion
//! switches on the variant instead of inspecting the value's shape.

use std::rc::Rc;

use serde_json::Value;

use crate::binding::{BindingId, Mutator, Target, dep_list};
use crate::dom::{Namespace, NodeCallback, NodeId};
use crate::pending::PendingBindings;
use crate::region::Region;
use crate::runtime::Runtime;

/// Deferred content, re-evaluated on every update.
pub type Thunk = Rc<dyn Fn(&mut Runtime) -> ViewContent>;

/// Tagged child content.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewContent {
	/// Nothing (`null`, `false`, `undefined`)
	#[default]
	Empty,
	/// Text node content
	Text(String),
	/// An existing node or fragment
	Node(NodeId),
	/// Several children in order
	List(Vec<ViewContent>),
}

impl ViewContent {
	/// Text content from any displayable value.
	pub fn text(value: impl ToString) -> Self {
		ViewContent::Text(value.to_string())
	}
}

impl From<NodeId> for ViewContent {
	fn from(node: NodeId) -> Self {
		ViewContent::Node(node)
	}
}

impl From<&str> for ViewContent {
	fn from(text: &str) -> Self {
		ViewContent::Text(text.to_string())
	}
}

impl From<String> for ViewContent {
	fn from(text: String) -> Self {
		ViewContent::Text(text)
	}
}

impl From<Vec<ViewContent>> for ViewContent {
	fn from(items: Vec<ViewContent>) -> Self {
		ViewContent::List(items)
	}
}

impl<T: Into<ViewContent>> From<Option<T>> for ViewContent {
	fn from(value: Option<T>) -> Self {
		value.map_or(ViewContent::Empty, Into::into)
	}
}

/// Tags a plain value once: `null` and `false` are empty, arrays are lists,
/// anything else renders as text.
impl From<Value> for ViewContent {
	fn from(value: Value) -> Self {
		match value {
			Value::Null | Value::Bool(false) => ViewContent::Empty,
			Value::String(text) => ViewContent::Text(text),
			Value::Array(items) => ViewContent::List(items.into_iter().map(Into::into).collect()),
			other => ViewContent::Text(other.to_string()),
		}
	}
}

/// One attribute update closure and the bindings it reads.
#[derive(Clone)]
pub struct MutatorGroup {
	mutator: NodeCallback,
	deps: Vec<BindingId>,
}

impl MutatorGroup {
	/// A group with no dependencies, run once at construction.
	pub fn new(mutator: impl Fn(&mut Runtime, NodeId) + 'static) -> Self {
		Self {
			mutator: Rc::new(mutator),
			deps: Vec::new(),
		}
	}

	/// Re-runs the group whenever any of `deps` changes.
	pub fn with_deps<I, D>(mut self, deps: I) -> Self
	where
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		self.deps = dep_list(deps);
		self
	}

	/// Bindings the group reads.
	pub fn deps(&self) -> &[BindingId] {
		&self.deps
	}
}

/// Children argument of [`Runtime::construct`].
#[derive(Clone)]
pub enum Children {
	/// Tagged children appended in order
	Content(Vec<ViewContent>),
	/// A single dynamic child fused into the element itself
	Fused { thunk: Thunk, deps: Vec<BindingId> },
}

impl Children {
	/// No children.
	pub fn none() -> Self {
		Children::Content(Vec::new())
	}

	/// A single dynamic child owning the whole element content.
	pub fn fused<F, I, D>(thunk: F, deps: I) -> Self
	where
		F: Fn(&mut Runtime) -> ViewContent + 'static,
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		Children::Fused {
			thunk: Rc::new(thunk),
			deps: dep_list(deps),
		}
	}
}

impl From<Vec<ViewContent>> for Children {
	fn from(items: Vec<ViewContent>) -> Self {
		Children::Content(items)
	}
}

/// Where replaceable content lives.
#[derive(Debug, Clone, Copy)]
enum Slot {
	/// Between two region markers
	Region(Region),
	/// The whole child list of an element
	Element(NodeId),
}

fn node_mutator(f: NodeCallback) -> Mutator {
	Rc::new(move |rt, target| {
		if let Target::Node(node) = target {
			f(rt, node);
		}
	})
}

impl Runtime {
	/// Builds an element, wires its mutator groups and appends its children.
	pub fn construct(
		&mut self,
		tag: &str,
		groups: Vec<MutatorGroup>,
		children: Children,
		namespace: Namespace,
	) -> NodeId {
		let mut pending = PendingBindings::new(self);
		for group in &groups {
			pending.subscribe(self, group.deps.clone(), node_mutator(Rc::clone(&group.mutator)));
		}

		let node = self.document.create_element(tag, namespace);
		match children {
			Children::Content(items) => {
				for item in items {
					self.insert_content(node, None, item);
				}
			}
			Children::Fused { thunk, deps } => {
				let content = thunk(self);
				self.insert_content(node, None, content);
				let mutator: Mutator = Rc::new(move |rt, target| {
					if let Target::Node(node) = target {
						let content = thunk(rt);
						rt.update_slot(Slot::Element(node), content);
					}
				});
				pending.subscribe(self, deps, mutator);
			}
		}
		pending.resolve(self, node);

		for group in &groups {
			(group.mutator)(self, node);
		}
		tracing::trace!(?node, tag, groups = groups.len(), "constructed element");
		node
	}

	/// Runs each group on `node` once and re-runs it on dependency changes.
	pub fn attach_mutators(&mut self, node: NodeId, groups: Vec<MutatorGroup>) {
		for group in groups {
			(group.mutator)(self, node);
			let mutator = node_mutator(group.mutator);
			for dep in group.deps {
				self.subscribe(dep, Target::Node(node), Rc::clone(&mutator));
			}
		}
	}

	/// Appends tagged children to `node`.
	pub fn append_children(&mut self, node: NodeId, children: Vec<ViewContent>) {
		for child in children {
			self.insert_content(node, None, child);
		}
	}

	/// Renders `thunk` between region markers and re-renders it whenever any
	/// of `deps` changes. Returns a fragment holding the region.
	pub fn construct_dynamic_view<F, I, D>(&mut self, thunk: F, deps: I) -> NodeId
	where
		F: Fn(&mut Runtime) -> ViewContent + 'static,
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		let fragment = self.document.create_fragment();
		let region = self.create_region(fragment, None);
		let content = thunk(self);
		self.insert_content(fragment, Some(region.end), content);

		let mutator: Mutator = Rc::new(move |rt, _| {
			let content = thunk(rt);
			rt.update_slot(Slot::Region(region), content);
		});
		for dep in dep_list(deps) {
			self.subscribe(dep, Target::Node(region.start), Rc::clone(&mutator));
		}
		fragment
	}

	/// Moves children into a region appended to the document head. Returns
	/// the placeholder left in their original position, which owns the region.
	pub fn relocate_to_head(&mut self, children: Vec<ViewContent>) -> NodeId {
		let head = self.document.head();
		let region = self.create_region(head, None);
		self.insert_content(head, Some(region.end), ViewContent::List(children));
		let placeholder = self.document.create_placeholder();
		self.document.data_mut(placeholder).owned.push(region.start);
		placeholder
	}

	/// Inserts content into `parent` before `reference`. Returns the inserted
	/// top-level nodes.
	pub(crate) fn insert_content(
		&mut self,
		parent: NodeId,
		reference: Option<NodeId>,
		content: ViewContent,
	) -> Vec<NodeId> {
		match content {
			ViewContent::Empty => Vec::new(),
			ViewContent::Text(text) => {
				let node = self.document.create_text(text);
				self.document.insert_before(parent, node, reference)
			}
			ViewContent::Node(node) => self.document.insert_before(parent, node, reference),
			ViewContent::List(items) => items
				.into_iter()
				.flat_map(|item| self.insert_content(parent, reference, item))
				.collect(),
		}
	}

	/// Cleans up nodes referenced by content that will never be inserted.
	pub(crate) fn discard(&mut self, content: ViewContent) {
		match content {
			ViewContent::Node(node) => self.cleanup(node),
			ViewContent::List(items) => {
				for item in items {
					self.discard(item);
				}
			}
			ViewContent::Empty | ViewContent::Text(_) => {}
		}
	}

	/// Dynamic view update: empty content clears the slot, a lone text node is
	/// rewritten in place for text content, anything else replaces the slot.
	fn update_slot(&mut self, slot: Slot, content: ViewContent) {
		let (parent, reference, current) = match slot {
			Slot::Region(region) => match self.document.parent(region.start) {
				Some(parent) if self.document.is_alive(region.start) => {
					(parent, Some(region.end), self.region_nodes(region))
				}
				_ => {
					tracing::warn!(?region, "dynamic view markers missing, update ignored");
					self.discard(content);
					return;
				}
			},
			Slot::Element(node) => (node, None, self.document.children(node).to_vec()),
		};

		if let ViewContent::Text(text) = &content
			&& let [only] = current.as_slice()
			&& self.document.text(*only).is_some()
		{
			self.document.set_text(*only, text.as_str());
			return;
		}

		for node in current {
			self.cleanup(node);
		}
		self.insert_content(parent, reference, content);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn rt() -> Runtime {
		Runtime::new()
	}

	fn mount(rt: &mut Runtime, node: NodeId) {
		let body = rt.document().body();
		rt.document_mut().append_child(body, node);
	}

	#[rstest]
	#[case(json!(null), ViewContent::Empty)]
	#[case(json!(false), ViewContent::Empty)]
	#[case(json!(true), ViewContent::Text("true".into()))]
	#[case(json!(3), ViewContent::Text("3".into()))]
	#[case(json!("hi"), ViewContent::Text("hi".into()))]
	#[case(json!(["a", null]), ViewContent::List(vec!["a".into(), ViewContent::Empty]))]
	fn test_child_tagging(#[case] value: Value, #[case] expected: ViewContent) {
		assert_eq!(ViewContent::from(value), expected);
	}

	#[rstest]
	fn test_construct_runs_groups_and_tracks_deps(mut rt: Runtime) {
		let title = rt.create_binding("a".to_string());
		let t = title.clone();
		let node = rt.construct(
			"div",
			vec![
				MutatorGroup::new(|rt, el| rt.document_mut().set_prop(el, "id", "x")),
				MutatorGroup::new(move |rt, el| {
					let value = t.get();
					rt.document_mut().set_attribute(el, "title", value);
				})
				.with_deps([title.id()]),
			],
			vec![ViewContent::from("hello")].into(),
			Namespace::Html,
		);

		assert_eq!(rt.document().prop(node, "id"), Some(&json!("x")));
		assert_eq!(rt.document().attribute(node, "title"), Some("a"));
		assert_eq!(rt.subscribers(title.id())[0].target(), Some(Target::Node(node)));

		rt.set_value(&title, "b".to_string(), None);
		assert_eq!(rt.document().attribute(node, "title"), Some("b"));
		assert_eq!(rt.document().to_html(node), "<div title=\"b\">hello</div>");
	}

	#[rstest]
	fn test_fused_child_updates_text_in_place(mut rt: Runtime) {
		let count = rt.create_binding(1);
		let c = count.clone();
		let node = rt.construct(
			"span",
			Vec::new(),
			Children::fused(move |_| ViewContent::text(c.get()), [count.id()]),
			Namespace::Html,
		);
		let text = rt.document().children(node)[0];

		rt.set_value(&count, 2, None);

		assert_eq!(rt.document().children(node), &[text]);
		assert_eq!(rt.document().text_content(node), "2");
	}

	#[rstest]
	fn test_dynamic_view_variants(mut rt: Runtime) {
		let mode = rt.create_binding(0);
		let m = mode.clone();
		let view = rt.construct_dynamic_view(
			move |rt| match m.get() {
				0 => ViewContent::from("zero"),
				1 => ViewContent::Empty,
				2 => ViewContent::List(vec!["a".into(), "b".into()]),
				_ => rt.construct("b", Vec::new(), Children::none(), Namespace::Html).into(),
			},
			[mode.id()],
		);
		mount(&mut rt, view);
		let body = rt.document().body();
		assert_eq!(rt.document().to_html(body), "<body><!--[-->zero<!--]--></body>");

		rt.set_value(&mode, 1, None);
		assert_eq!(rt.document().to_html(body), "<body><!--[--><!--]--></body>");

		rt.set_value(&mode, 2, None);
		assert_eq!(rt.document().to_html(body), "<body><!--[-->ab<!--]--></body>");

		rt.set_value(&mode, 3, None);
		assert_eq!(rt.document().to_html(body), "<body><!--[--><b></b><!--]--></body>");
	}

	#[rstest]
	fn test_dynamic_view_rewrites_lone_text_node(mut rt: Runtime) {
		let name = rt.create_binding("a".to_string());
		let n = name.clone();
		let view = rt.construct_dynamic_view(move |_| n.get().into(), [name.id()]);
		mount(&mut rt, view);
		let body = rt.document().body();
		let text = rt.document().children(body)[1];

		rt.set_value(&name, "b".to_string(), None);

		assert_eq!(rt.document().children(body)[1], text);
		assert_eq!(rt.document().text(text), Some("b"));
	}

	#[rstest]
	fn test_relocate_to_head(mut rt: Runtime) {
		let title = rt.construct(
			"title",
			Vec::new(),
			vec![ViewContent::from("Home")].into(),
			Namespace::Html,
		);
		let placeholder = rt.relocate_to_head(vec![title.into()]);
		mount(&mut rt, placeholder);

		let head = rt.document().head();
		assert_eq!(
			rt.document().to_html(head),
			"<head><!--[--><title>Home</title><!--]--></head>"
		);

		rt.cleanup(placeholder);
		assert_eq!(rt.document().to_html(head), "<head></head>");
		assert!(!rt.document().is_alive(title));
	}

	#[rstest]
	fn test_append_children(mut rt: Runtime) {
		let list = rt.document_mut().create_element("ul", Namespace::Html);
		let item = rt.document_mut().create_element("li", Namespace::Html);

		rt.append_children(
			list,
			vec![
				ViewContent::from("a"),
				ViewContent::Empty,
				item.into(),
				ViewContent::List(vec!["b".into(), "c".into()]),
			],
		);

		assert_eq!(rt.document().to_html(list), "<ul>a<li></li>bc</ul>");
	}

	#[rstest]
	fn test_attach_mutators(mut rt: Runtime) {
		let value = rt.create_binding(1);
		let node = rt.document_mut().create_element("x-counter", Namespace::Html);
		let v = value.clone();
		rt.attach_mutators(
			node,
			vec![
				MutatorGroup::new(move |rt, el| {
					let count = v.get();
					rt.document_mut().set_prop(el, "count", count);
				})
				.with_deps([value.id()]),
			],
		);
		rt.set_value(&value, 5, None);
		assert_eq!(rt.document().prop(node, "count"), Some(&json!(5)));
	}
}
