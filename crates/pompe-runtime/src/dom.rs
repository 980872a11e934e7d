//! Live node tree.
//!
//! [`Document`] is an arena of nodes with a `head` and a `body` root. Node ids
//! are never reused, so a stale id keeps pointing at a dead node instead of at
//! an unrelated one.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use serde_json::Value;

use crate::binding::BindingId;
use crate::runtime::Runtime;
use crate::timer::TimerId;

/// Event listener or mutator invoked with the node it belongs to.
pub type NodeCallback = Rc<dyn Fn(&mut Runtime, NodeId)>;

/// Identifier of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
	fn index(self) -> usize {
		self.0 as usize
	}
}

/// Element namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
	/// Plain HTML
	#[default]
	Html,
	/// SVG drawing namespace
	Svg,
	/// MathML drawing namespace
	MathMl,
}

impl Namespace {
	/// Resolves the namespace argument of `construct`.
	pub fn from_arg(arg: Option<&str>) -> Self {
		match arg {
			Some("svg") => Namespace::Svg,
			Some("math") => Namespace::MathMl,
			_ => Namespace::Html,
		}
	}

	/// Namespace URI.
	pub fn uri(&self) -> &'static str {
		match self {
			Namespace::Html => "http://www.w3.org/1999/xhtml",
			Namespace::Svg => "http://www.w3.org/2000/svg",
			Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
		}
	}
}

/// Zero-content sentinel nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	/// Opens a region; points at its end
	Start { end: NodeId },
	/// Closes a region; points at its start
	End { start: NodeId },
	/// Stands in for content rendered elsewhere
	Placeholder,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// Element with a tag name
	Element { tag: String, namespace: Namespace },
	/// Text node
	Text(String),
	/// Detached container whose children move on insertion
	Fragment,
	/// Region or placeholder sentinel
	Marker(Marker),
}

pub(crate) struct NodeData {
	pub(crate) kind: NodeKind,
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
	pub(crate) props: BTreeMap<String, Value>,
	pub(crate) attributes: BTreeMap<String, String>,
	pub(crate) styles: BTreeMap<String, String>,
	pub(crate) listeners: Vec<(String, NodeCallback)>,
	/// Name of the property whose node-side write is in flight
	pub(crate) echo: Option<String>,
	/// Teardown hook, run once during cleanup
	pub(crate) destroy: Option<NodeCallback>,
	/// Media polling interval
	pub(crate) poll: Option<TimerId>,
	/// Region starts this node owns outside its own subtree
	pub(crate) owned: Vec<NodeId>,
	/// Bindings holding a run for this node
	pub(crate) subscriptions: Vec<BindingId>,
	pub(crate) alive: bool,
}

impl NodeData {
	fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			parent: None,
			children: Vec::new(),
			props: BTreeMap::new(),
			attributes: BTreeMap::new(),
			styles: BTreeMap::new(),
			listeners: Vec::new(),
			echo: None,
			destroy: None,
			poll: None,
			owned: Vec::new(),
			subscriptions: Vec::new(),
			alive: true,
		}
	}
}

/// Arena-backed node tree.
pub struct Document {
	nodes: Vec<NodeData>,
	head: NodeId,
	body: NodeId,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates a document holding an empty `head` and `body`.
	pub fn new() -> Self {
		let mut document = Self {
			nodes: Vec::new(),
			head: NodeId(0),
			body: NodeId(0),
		};
		document.head = document.create_element("head", Namespace::Html);
		document.body = document.create_element("body", Namespace::Html);
		document
	}

	/// The `head` root.
	pub fn head(&self) -> NodeId {
		self.head
	}

	/// The `body` root.
	pub fn body(&self) -> NodeId {
		self.body
	}

	/// Number of nodes ever created.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no node was ever created. Never true once constructed.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(NodeData::new(kind));
		id
	}

	pub(crate) fn data(&self, id: NodeId) -> &NodeData {
		&self.nodes[id.index()]
	}

	pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
		&mut self.nodes[id.index()]
	}

	/// Creates a detached element.
	pub fn create_element(&mut self, tag: &str, namespace: Namespace) -> NodeId {
		self.push(NodeKind::Element {
			tag: tag.to_string(),
			namespace,
		})
	}

	/// Creates a detached text node.
	pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
		self.push(NodeKind::Text(text.into()))
	}

	/// Creates an empty fragment.
	pub fn create_fragment(&mut self) -> NodeId {
		self.push(NodeKind::Fragment)
	}

	/// Creates a detached placeholder marker.
	pub fn create_placeholder(&mut self) -> NodeId {
		self.push(NodeKind::Marker(Marker::Placeholder))
	}

	/// Creates a detached start/end marker pair pointing at each other.
	pub fn create_marker_pair(&mut self) -> (NodeId, NodeId) {
		let start = self.push(NodeKind::Marker(Marker::Placeholder));
		let end = self.push(NodeKind::Marker(Marker::End { start }));
		self.data_mut(start).kind = NodeKind::Marker(Marker::Start { end });
		(start, end)
	}

	/// Node kind.
	pub fn kind(&self, id: NodeId) -> &NodeKind {
		&self.data(id).kind
	}

	/// Tag name of an element.
	pub fn tag(&self, id: NodeId) -> Option<&str> {
		match &self.data(id).kind {
			NodeKind::Element { tag, .. } => Some(tag),
			_ => None,
		}
	}

	/// Whether the node has not been cleaned up.
	pub fn is_alive(&self, id: NodeId) -> bool {
		self.nodes.get(id.index()).is_some_and(|node| node.alive)
	}

	pub(crate) fn kill(&mut self, id: NodeId) {
		self.data_mut(id).alive = false;
	}

	/// Parent node, if attached.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.data(id).parent
	}

	/// Children in order.
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		&self.data(id).children
	}

	/// Nodes strictly between two siblings.
	pub fn between(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
		let Some(parent) = self.parent(start) else {
			return Vec::new();
		};
		let children = self.children(parent);
		let Some(from) = children.iter().position(|c| *c == start) else {
			return Vec::new();
		};
		children[from + 1..]
			.iter()
			.take_while(|c| **c != end)
			.copied()
			.collect()
	}

	/// Inserts `child` into `parent` before `reference`, or appends it.
	///
	/// A fragment moves its children instead of itself. Returns the nodes that
	/// ended up in `parent`.
	pub fn insert_before(
		&mut self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
	) -> Vec<NodeId> {
		let moved = if matches!(self.data(child).kind, NodeKind::Fragment) {
			std::mem::take(&mut self.data_mut(child).children)
		} else {
			self.detach(child);
			vec![child]
		};

		let mut index = reference
			.and_then(|r| self.children(parent).iter().position(|c| *c == r))
			.unwrap_or(self.children(parent).len());
		for node in &moved {
			self.data_mut(*node).parent = Some(parent);
			self.data_mut(parent).children.insert(index, *node);
			index += 1;
		}
		moved
	}

	/// Appends `child` to `parent`.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Vec<NodeId> {
		self.insert_before(parent, child, None)
	}

	/// Removes a node from its parent.
	pub fn detach(&mut self, id: NodeId) {
		if let Some(parent) = self.data_mut(id).parent.take() {
			self.data_mut(parent).children.retain(|c| *c != id);
		}
	}

	/// Text of a text node.
	pub fn text(&self, id: NodeId) -> Option<&str> {
		match &self.data(id).kind {
			NodeKind::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Replaces the text of a text node in place.
	pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
		if let NodeKind::Text(current) = &mut self.data_mut(id).kind {
			*current = text.into();
		}
	}

	/// Concatenated text of a subtree.
	pub fn text_content(&self, id: NodeId) -> String {
		let mut out = String::new();
		self.collect_text(id, &mut out);
		out
	}

	fn collect_text(&self, id: NodeId, out: &mut String) {
		match &self.data(id).kind {
			NodeKind::Text(text) => out.push_str(text),
			_ => {
				for child in self.children(id) {
					self.collect_text(*child, out);
				}
			}
		}
	}

	/// Property value.
	pub fn prop(&self, id: NodeId, name: &str) -> Option<&Value> {
		self.data(id).props.get(name)
	}

	/// Writes a property.
	pub fn set_prop(&mut self, id: NodeId, name: &str, value: impl Into<Value>) {
		self.data_mut(id).props.insert(name.to_string(), value.into());
	}

	/// Attribute value.
	pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		self.data(id).attributes.get(name).map(String::as_str)
	}

	/// Writes an attribute.
	pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
		self.data_mut(id)
			.attributes
			.insert(name.to_string(), value.into());
	}

	/// Inline style value.
	pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
		self.data(id).styles.get(property).map(String::as_str)
	}

	/// Writes an inline style property.
	pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
		self.data_mut(id)
			.styles
			.insert(property.to_string(), value.into());
	}

	/// Serializes a subtree. Region markers render as `<!--[-->` / `<!--]-->`.
	pub fn to_html(&self, id: NodeId) -> String {
		let mut out = String::new();
		self.write_html(id, &mut out);
		out
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		let node = self.data(id);
		match &node.kind {
			NodeKind::Element { tag, .. } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in &node.attributes {
					let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
				}
				if !node.styles.is_empty() {
					let style = node
						.styles
						.iter()
						.map(|(k, v)| format!("{}: {}", k, v))
						.collect::<Vec<_>>()
						.join("; ");
					let _ = write!(out, " style=\"{}\"", escape(&style, true));
				}
				out.push('>');
				for child in &node.children {
					self.write_html(*child, out);
				}
				let _ = write!(out, "</{}>", tag);
			}
			NodeKind::Text(text) => out.push_str(&escape(text, false)),
			NodeKind::Fragment => {
				for child in &node.children {
					self.write_html(*child, out);
				}
			}
			NodeKind::Marker(Marker::Start { .. }) => out.push_str("<!--[-->"),
			NodeKind::Marker(Marker::End { .. }) => out.push_str("<!--]-->"),
			NodeKind::Marker(Marker::Placeholder) => out.push_str("<!---->"),
		}
	}
}

fn escape(s: &str, attribute: bool) -> String {
	let s = s
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;");
	if attribute { s.replace('"', "&quot;") } else { s }
}
