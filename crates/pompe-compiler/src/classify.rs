//! Attribute classifier.
//!
//! Pure lookup from `(tag, namespace, raw attribute name)` to a canonical
//! name and a write [`Category`]. Precedence, highest first:
//!
//! 1. host-supplied overrides ([`AttributeTable`])
//! 2. fixed tag/attribute special cases
//! 3. CSS property names (style)
//! 4. event names
//! 5. element-specific DOM properties
//! 6. global DOM properties
//! 7. global attributes
//! 8. element-specific attributes
//! 9. anything else: a generic attribute write
//!
//! The drawing namespaces (SVG, MathML) skip the CSS and property tables:
//! their presentation lives in attributes.

use serde::Deserialize;

use crate::config::{AttributeOverride, AttributeTable};
use crate::html_spec::{
	CSS_PROPERTIES, ELEMENT_ATTRS, ELEMENT_PROPS, EVENTS, GLOBAL_ATTRS, GLOBAL_PROPS,
	MATHML_ATTRS, SPECIAL_CASES, SVG_ATTRS,
};

/// How an attribute is written to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// `node.style.<name> = v`
	Style,
	/// `node.<name> = handler`
	Event,
	/// `node.<name> = v`
	Prop,
	/// `node.setAttribute("<name>", v)`
	Attribute,
}

/// Markup namespace of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
	/// Plain HTML
	#[default]
	Html,
	/// SVG drawing namespace
	Svg,
	/// MathML drawing namespace
	#[serde(rename = "mathml")]
	MathMl,
}

impl Namespace {
	/// Namespace argument passed to `construct`, `None` for HTML.
	pub fn as_arg(&self) -> Option<&'static str> {
		match self {
			Namespace::Html => None,
			Namespace::Svg => Some("svg"),
			Namespace::MathMl => Some("math"),
		}
	}

	/// Resolves the namespace of an element named `tag` whose parent is in `self`.
	pub fn enter(self, tag: &str) -> Namespace {
		match tag {
			"svg" => Namespace::Svg,
			"math" => Namespace::MathMl,
			_ => self,
		}
	}

	/// Namespace of the children of an element named `tag` in `self`.
	pub fn children_of(self, tag: &str) -> Namespace {
		match (self, tag) {
			(Namespace::Svg, "foreignObject") => Namespace::Html,
			(Namespace::MathMl, "annotation-xml") => Namespace::Html,
			_ => self,
		}
	}
}

/// A classified attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
	/// Write category
	pub category: Category,
	/// Canonical (DOM) name
	pub name: String,
}

impl Classified {
	fn new(category: Category, name: impl Into<String>) -> Self {
		Self {
			category,
			name: name.into(),
		}
	}

	/// Returns true for the class name slot, in either namespace.
	pub fn is_class(&self) -> bool {
		matches!(
			(self.category, self.name.as_str()),
			(Category::Prop, "className") | (Category::Attribute, "class")
		)
	}
}

/// Classifier over the built-in tables plus host overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier<'a> {
	overrides: &'a [AttributeOverride],
}

impl<'a> Classifier<'a> {
	/// Creates a classifier consulting `table` before the built-in tables.
	pub fn new(table: Option<&'a AttributeTable>) -> Self {
		Self {
			overrides: table.map(|t| t.overrides.as_slice()).unwrap_or(&[]),
		}
	}

	/// Classifies `raw` on `tag` in `namespace`.
	pub fn classify(&self, tag: &str, namespace: Namespace, raw: &str) -> Classified {
		if let Some(found) = self
			.overrides
			.iter()
			.find(|o| o.matches(tag, namespace, raw))
		{
			let name = found.canonical.clone().unwrap_or_else(|| raw.to_string());
			return Classified::new(found.category, name);
		}
		classify(tag, namespace, raw)
	}
}

/// Classifies `raw` on `tag` in `namespace` using the built-in tables only.
pub fn classify(tag: &str, namespace: Namespace, raw: &str) -> Classified {
	let lower = raw.to_ascii_lowercase();

	if let Some((_, _, category, name)) = SPECIAL_CASES
		.iter()
		.find(|(t, a, _, _)| *t == tag && *a == lower)
	{
		return Classified::new(*category, *name);
	}

	if namespace == Namespace::Html {
		let camel = style_property(raw);
		if camel.starts_with("--") || CSS_PROPERTIES.contains(&camel.as_str()) {
			return Classified::new(Category::Style, camel);
		}
	}

	if let Some(event) = lower.strip_prefix("on")
		&& EVENTS.contains(&event)
	{
		return Classified::new(Category::Event, lower);
	}

	match namespace {
		Namespace::Html => classify_html(tag, raw, &lower),
		Namespace::Svg => {
			if raw == "className" {
				return Classified::new(Category::Attribute, "class");
			}
			Classified::new(Category::Attribute, table_spelling(SVG_ATTRS, raw))
		}
		Namespace::MathMl => Classified::new(Category::Attribute, table_spelling(MATHML_ATTRS, raw)),
	}
}

/// Returns the table's spelling of `raw` (`viewbox` → `viewBox`), or `raw` itself.
fn table_spelling<'a>(table: &'static [&'static str], raw: &'a str) -> &'a str {
	table
		.iter()
		.find(|name| name.eq_ignore_ascii_case(raw))
		.copied()
		.unwrap_or(raw)
}

fn classify_html(tag: &str, raw: &str, lower: &str) -> Classified {
	if let Some((_, _, name)) = ELEMENT_PROPS
		.iter()
		.find(|(t, r, _)| *t == tag && *r == lower)
	{
		return Classified::new(Category::Prop, *name);
	}
	if let Some((_, name)) = GLOBAL_PROPS.iter().find(|(r, _)| *r == lower) {
		return Classified::new(Category::Prop, *name);
	}
	if GLOBAL_ATTRS.contains(&lower) || lower.starts_with("aria-") || lower.starts_with("data-") {
		return Classified::new(Category::Attribute, lower);
	}
	if ELEMENT_ATTRS.iter().any(|(t, a)| *t == tag && *a == lower) {
		return Classified::new(Category::Attribute, lower);
	}
	Classified::new(Category::Attribute, raw)
}

/// Camel-cases a CSS property name (`font-size` → `fontSize`).
///
/// Custom properties (`--accent`) are returned unchanged.
pub fn style_property(raw: &str) -> String {
	if raw.starts_with("--") {
		return raw.to_string();
	}
	let mut out = String::with_capacity(raw.len());
	let mut upper = false;
	for c in raw.chars() {
		if c == '-' {
			upper = !out.is_empty();
		} else if upper {
			out.push(c.to_ascii_uppercase());
			upper = false;
		} else {
			out.push(c);
		}
	}
	out
}
