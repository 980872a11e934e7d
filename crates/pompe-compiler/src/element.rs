//! Element codegen.
//!
//! Turns one markup element into the runtime calls that build it. The tag
//! decides the variant:
//!
//! | Tag | Variant | Emitted |
//! |-----|---------|---------|
//! | `for` | list | `$.constructListView($$xs, (item, i) => …)` |
//! | `head` | head relocation | `$.relocateToHead([…])` |
//! | `lazy` | lazy load | `$.constructLazy(path, ctor, loader?, fallback?)` |
//! | `t` | text template | `$.constructText(id, params, ranges)` |
//! | `div`, `svg`, … | native | `$.construct(tag, groups, children, ns?)` |
//! | `Card`, `ui.Card`, `$Page` | component | `Card(props)` |
//!
//! A fragment compiles to the array of its children.

use pompe_ast::ast::*;
use pompe_ast::{GetSpan, Span, fold_markup_text};

use crate::classify::{Category, Namespace, style_property};
use crate::deps::DepSet;
use crate::emit::{
	Code, NODE_PARAM, Shape, array, arrow, arrow_block, assign, call, get_value, node_prop,
	object, object_key, rt_call, set_value, stmt, thunk,
};
use crate::error::{CompileError, CompileErrorKind, Result};
use crate::group::{AttrEntry, ECHO_SLOT, emit_groups, group_attributes};
use crate::html_spec::bound_field;
use crate::rewrite::Rewriter;
use crate::scope::{is_component_name, is_reactive_name, is_stateful_array_name};

/// Interval between `currentTime` polls of a playing media element.
pub const MEDIA_POLL_INTERVAL_MS: u32 = 250;

/// Private node slot holding the `currentTime` poll interval id.
pub const POLL_SLOT: &str = "$poll";

/// Kind of element, decided by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
	/// Plain element
	Native,
	/// User component, possibly selected dynamically
	Component,
	/// `<for>`
	List,
	/// `<head>`
	Head,
	/// `<lazy>`
	Lazy,
	/// `<t>`
	Text,
}

impl TagKind {
	/// Classifies a tag name.
	pub fn of(tag: &str) -> TagKind {
		match tag {
			"for" => TagKind::List,
			"head" => TagKind::Head,
			"lazy" => TagKind::Lazy,
			"t" => TagKind::Text,
			_ if is_reactive_name(tag) || is_component_name(tag) || tag.contains('.') => {
				TagKind::Component
			}
			_ => TagKind::Native,
		}
	}
}

fn node() -> Code {
	Code::primary(NODE_PARAM)
}

/// Statements run on the constructed value before it is returned.
#[derive(Debug, Default)]
struct CreateHooks(Vec<String>);

impl CreateHooks {
	fn push(&mut self, stmt: String) {
		self.0.push(stmt);
	}

	/// `((el$) => { hooks…; return el$; })(constructed)`
	fn wrap(self, constructed: Code) -> Code {
		if self.0.is_empty() {
			return constructed;
		}
		let mut body = self.0;
		body.push(format!("return {NODE_PARAM};"));
		call(&arrow_block(&[NODE_PARAM], &body), &[constructed])
	}
}

/// A named attribute, split into its parts.
struct NamedAttr<'e, 'a> {
	namespace: Option<&'e str>,
	name: &'e str,
	value: Option<&'e JSXAttributeValue<'a>>,
	span: Span,
}

fn named_attrs<'e, 'a>(element: &'e JSXElement<'a>, tag: &str) -> Result<Vec<NamedAttr<'e, 'a>>> {
	element
		.opening_element
		.attributes
		.iter()
		.map(|item| match item {
			JSXAttributeItem::Attribute(attr) => {
				let (namespace, name) = match &attr.name {
					JSXAttributeName::Identifier(id) => (None, id.name.as_str()),
					JSXAttributeName::NamespacedName(ns) => {
						(Some(ns.namespace.name.as_str()), ns.name.name.as_str())
					}
				};
				Ok(NamedAttr {
					namespace,
					name,
					value: attr.value.as_ref(),
					span: attr.span,
				})
			}
			JSXAttributeItem::SpreadAttribute(spread) => Err(CompileError::new(
				spread.span,
				CompileErrorKind::SpreadAttribute(tag.to_string()),
			)),
		})
		.collect()
}

/// A child that produces output.
enum Child<'e, 'a> {
	/// Folded text and the raw text node
	Text(String, &'e JSXText<'a>),
	/// `{expr}` and the span of its braces
	Expr(&'e Expression<'a>, Span),
	Element(&'e JSXElement<'a>),
	Fragment(&'e JSXFragment<'a>),
}

impl Child<'_, '_> {
	fn span(&self) -> Span {
		match self {
			Child::Text(_, text) => text.span,
			Child::Expr(_, span) => *span,
			Child::Element(element) => element.span,
			Child::Fragment(fragment) => fragment.span,
		}
	}
}

/// Children other than whitespace-only text and empty `{}` slots.
fn significant<'e, 'a>(tag: &str, children: &'e [JSXChild<'a>]) -> Result<Vec<Child<'e, 'a>>> {
	let mut out = Vec::with_capacity(children.len());
	for child in children {
		match child {
			JSXChild::Text(text) => {
				let folded = fold_markup_text(&text.value);
				if !folded.is_empty() {
					out.push(Child::Text(folded, text));
				}
			}
			JSXChild::ExpressionContainer(container) => {
				if let Some(expr) = container.expression.as_expression() {
					out.push(Child::Expr(expr, container.span));
				}
			}
			JSXChild::Element(element) => out.push(Child::Element(element)),
			JSXChild::Fragment(fragment) => out.push(Child::Fragment(fragment)),
			JSXChild::Spread(spread) => {
				return Err(CompileError::malformed(
					spread.span,
					tag,
					"spread children are not supported",
				));
			}
		}
	}
	Ok(out)
}

/// String literal value of an attribute, if it is one.
fn literal_str<'e>(value: Option<&'e JSXAttributeValue<'_>>) -> Option<&'e str> {
	match value? {
		JSXAttributeValue::StringLiteral(lit) => Some(lit.value.as_str()),
		JSXAttributeValue::ExpressionContainer(container) => {
			match container.expression.as_expression()?.without_parentheses() {
				Expression::StringLiteral(lit) => Some(lit.value.as_str()),
				_ => None,
			}
		}
		_ => None,
	}
}

fn unsupported(attr: &NamedAttr<'_, '_>) -> CompileError {
	CompileError::new(
		attr.span,
		CompileErrorKind::UnsupportedDirective(format!(
			"{}:{}",
			attr.namespace.unwrap_or_default(),
			attr.name
		)),
	)
}

/// Expression value of an attribute that requires one.
fn expr_value<'e, 'a>(tag: &str, attr: &NamedAttr<'e, 'a>) -> Result<&'e Expression<'a>> {
	match attr.value {
		Some(JSXAttributeValue::ExpressionContainer(container)) => {
			container.expression.as_expression().ok_or_else(|| {
				CompileError::malformed(
					container.span,
					tag,
					format!("`{}` has an empty expression", attr.name),
				)
			})
		}
		_ => Err(CompileError::malformed(
			attr.span,
			tag,
			format!("`{}` expects an expression value", attr.name),
		)),
	}
}

/// Where a two-way binding writes back to.
#[derive(Debug, Clone, PartialEq)]
enum BindTarget {
	/// `$name`
	Binding(String),
	/// `$name.field` or `$name[key]`: replaced as a whole on write
	Field {
		root: String,
		/// `.field` or `[key]`
		access: String,
		/// `field` or `[key]`
		key: String,
	},
	/// Anything assignable that is not reactive
	Plain(Code),
}

impl BindTarget {
	/// Reactive targets echo their own writes back to the node.
	fn echoes(&self) -> bool {
		!matches!(self, BindTarget::Plain(_))
	}

	fn read(&self) -> Code {
		match self {
			BindTarget::Binding(name) => get_value(name),
			BindTarget::Field { root, access, .. } => {
				Code::primary(format!("{}{access}", get_value(root)))
			}
			BindTarget::Plain(code) => code.clone(),
		}
	}

	/// `$.setValue($x, { ...$.getValue($x), field: v }, origin)` for a field.
	fn write(&self, value: &Code, origin: Option<&str>) -> Code {
		match self {
			BindTarget::Binding(name) => set_value(name, value, origin),
			BindTarget::Field { root, key, .. } => {
				let replaced = Code::new(
					format!("{{ ...{}, {key}: {} }}", get_value(root), value.arg()),
					Shape::Object,
				);
				set_value(root, &replaced, origin)
			}
			BindTarget::Plain(code) => assign(&code.text, value),
		}
	}
}

impl Rewriter<'_, '_> {
	/// Generates the construction of one element.
	pub(crate) fn element(&mut self, element: &JSXElement<'_>) -> Result<Code> {
		let tag = self.edits.text(element.opening_element.name.span());
		let kind = TagKind::of(tag);
		tracing::trace!(tag, ?kind, start = element.span.start, "generating element");
		match kind {
			TagKind::Native => self.native(element, tag),
			TagKind::Component => self.component(element, tag),
			TagKind::List => self.list(element),
			TagKind::Head => self.head(element),
			TagKind::Lazy => self.lazy(element),
			TagKind::Text => self.text_template(element),
		}
	}

	/// `<>…</>` becomes the array of its children.
	pub(crate) fn fragment(&mut self, fragment: &JSXFragment<'_>) -> Result<Code> {
		Ok(array(&self.children("", &fragment.children)?))
	}

	/// Value expression and tracked dependencies of an attribute value.
	fn attr_value(&mut self, tag: &str, attr: &NamedAttr<'_, '_>) -> Result<(Code, DepSet)> {
		Ok(match attr.value {
			None => (Code::primary("true"), DepSet::new()),
			Some(JSXAttributeValue::StringLiteral(lit)) => (Code::str(&lit.value), DepSet::new()),
			Some(JSXAttributeValue::ExpressionContainer(_)) => {
				let expr = expr_value(tag, attr)?;
				(self.expr(expr)?, self.analysis.tracked(expr.span()))
			}
			Some(JSXAttributeValue::Element(element)) => {
				(self.element(element)?, self.analysis.tracked(element.span))
			}
			Some(JSXAttributeValue::Fragment(fragment)) => {
				(self.fragment(fragment)?, self.analysis.tracked(fragment.span))
			}
		})
	}

	// ========================================================================
	// Native elements
	// ========================================================================

	fn native(&mut self, element: &JSXElement<'_>, tag: &str) -> Result<Code> {
		let namespace = self.namespace.enter(tag);
		let attrs = named_attrs(element, tag)?;

		let mut entries = Vec::new();
		let mut hooks = CreateHooks::default();
		let mut node_ref = false;

		for attr in &attrs {
			match attr.namespace {
				None => {
					let classified = self.classifier.classify(tag, namespace, attr.name);
					let (value, deps) = self.attr_value(tag, attr)?;
					if classified.category == Category::Event && classified.name == "oncreate" {
						hooks.push(stmt(&call(&value, &[node()])));
						continue;
					}
					entries.push(AttrEntry::new(
						classified.category,
						classified.name,
						value,
						deps,
					));
				}
				Some("style") => {
					let (value, deps) = self.attr_value(tag, attr)?;
					entries.push(AttrEntry::new(
						Category::Style,
						style_property(attr.name),
						value,
						deps,
					));
				}
				Some("on") => {
					let (value, deps) = self.attr_value(tag, attr)?;
					let name = format!("on{}", attr.name.to_ascii_lowercase());
					entries.push(AttrEntry::new(Category::Event, name, value, deps));
				}
				Some("bind") if attr.name == "this" => {
					if node_ref {
						return Err(CompileError::new(
							attr.span,
							CompileErrorKind::MultipleNodeReferences(tag.to_string()),
						));
					}
					node_ref = true;
					hooks.push(self.node_reference(tag, attr)?);
				}
				Some("bind") => self.bind_native(tag, &attrs, attr, &mut entries)?,
				Some(ns @ ("xlink" | "xml" | "xmlns")) => {
					let (value, deps) = self.attr_value(tag, attr)?;
					let name = format!("{ns}:{}", attr.name);
					entries.push(AttrEntry::new(Category::Attribute, name, value, deps));
				}
				Some(_) => return Err(unsupported(attr)),
			}
		}

		let groups = group_attributes(entries);
		let groups = emit_groups(&groups, |deps| self.deps_array(deps));

		let outer = std::mem::replace(&mut self.namespace, namespace.children_of(tag));
		let children = self.native_children(tag, &element.children);
		self.namespace = outer;

		let mut args = vec![Code::str(tag), groups, children?];
		if let Some(ns) = namespace.as_arg() {
			args.push(Code::str(ns));
		}
		Ok(hooks.wrap(rt_call("construct", &args)))
	}

	/// Children argument of `construct`: a list, or a fused single dynamic child.
	fn native_children(&mut self, tag: &str, children: &[JSXChild<'_>]) -> Result<Code> {
		if let [Child::Expr(expr, _)] = significant(tag, children)?.as_slice()
			&& !matches!(
				expr.without_parentheses(),
				Expression::JSXElement(_) | Expression::JSXFragment(_)
			) {
			let deps = self.analysis.tracked(expr.span());
			if !deps.is_empty() {
				// { thunk: () => expr, deps: [deps] }
				let value = self.expr(expr)?;
				return Ok(object(&[
					("thunk".to_string(), thunk(&value)),
					("deps".to_string(), self.deps_array(&deps)),
				]));
			}
		}
		Ok(array(&self.children(tag, children)?))
	}

	/// Tagged children; nested fragments are spliced in place.
	pub(crate) fn children(&mut self, tag: &str, children: &[JSXChild<'_>]) -> Result<Vec<Code>> {
		let mut out = Vec::with_capacity(children.len());
		for child in significant(tag, children)? {
			match child {
				Child::Text(text, _) => out.push(rt_call("text", &[Code::str(&text)])),
				Child::Element(nested) => out.push(self.element(nested)?),
				Child::Fragment(nested) => out.extend(self.children("", &nested.children)?),
				Child::Expr(expr, _) => out.push(self.child_expr(expr)?),
			}
		}
		Ok(out)
	}

	fn child_expr(&mut self, expr: &Expression<'_>) -> Result<Code> {
		match expr.without_parentheses() {
			Expression::JSXElement(nested) => return self.element(nested),
			Expression::JSXFragment(nested) => return self.fragment(nested),
			Expression::StringLiteral(_) | Expression::NumericLiteral(_) => {
				return Ok(rt_call("text", &[self.expr(expr)?]));
			}
			_ => {}
		}
		let deps = self.analysis.tracked(expr.span());
		let value = self.expr(expr)?;
		if deps.is_empty() {
			return Ok(rt_call("child", &[value]));
		}
		Ok(rt_call(
			"constructDynamicView",
			&[thunk(&value), self.deps_array(&deps)],
		))
	}

	/// Resolves the target of `bind:` into where writes go.
	///
	/// Reactive targets are a binding or one property of one. A write to a
	/// property replaces the whole value so the binding notifies.
	fn bind_target(
		&mut self,
		attr: &NamedAttr<'_, '_>,
		target: &Expression<'_>,
	) -> Result<BindTarget> {
		let read_only = |name: &str| {
			CompileError::new(attr.span, CompileErrorKind::ReadOnlyMutation(name.to_string()))
		};
		let text = self.edits.text(target.span());
		let unsupported = || {
			CompileError::new(
				attr.span,
				CompileErrorKind::UnsupportedBindTarget(text.to_string()),
			)
		};
		let bare = target.without_parentheses();

		if let Expression::Identifier(ident) = bare {
			if self.analysis.is_prop(ident.span) {
				return Err(read_only(&ident.name));
			}
			if is_reactive_name(&ident.name) {
				return Ok(BindTarget::Binding(ident.name.to_string()));
			}
			return Ok(BindTarget::Plain(Code::primary(ident.name.as_str())));
		}

		let Some(member) = bare.as_member_expression() else {
			return Err(unsupported());
		};
		if let Expression::Identifier(root) = member.object().without_parentheses() {
			if self.analysis.is_prop(root.span) {
				return Err(read_only(&root.name));
			}
			if is_reactive_name(&root.name) {
				let (access, key) = match member {
					MemberExpression::StaticMemberExpression(field) => {
						let name = field.property.name.as_str();
						(format!(".{name}"), object_key(name))
					}
					MemberExpression::ComputedMemberExpression(computed) => {
						let key = self.expr(&computed.expression)?;
						(format!("[{}]", key.arg()), format!("[{}]", key.arg()))
					}
					MemberExpression::PrivateFieldExpression(_) => return Err(unsupported()),
				};
				return Ok(BindTarget::Field {
					root: root.name.to_string(),
					access,
					key,
				});
			}
		}
		// a deeper path through a reactive value cannot be written back
		if !self.analysis.deps(target.span()).is_empty() {
			return Err(unsupported());
		}
		Ok(BindTarget::Plain(self.expr(target)?))
	}

	/// `bind:this={target}`: stores the constructed node into `target`.
	fn node_reference(&mut self, tag: &str, attr: &NamedAttr<'_, '_>) -> Result<String> {
		let target = expr_value(tag, attr)?;
		let target = self.bind_target(attr, target)?;
		Ok(stmt(&target.write(&node(), None)))
	}

	/// `bind:field={target}` on a native element.
	///
	/// Emits the binding-to-node mutator plus one listener per change event
	/// writing the node value back with the node as origin. Reactive targets
	/// are echo guarded.
	fn bind_native(
		&mut self,
		tag: &str,
		attrs: &[NamedAttr<'_, '_>],
		attr: &NamedAttr<'_, '_>,
		entries: &mut Vec<AttrEntry>,
	) -> Result<()> {
		let input_type = attrs
			.iter()
			.find(|a| a.namespace.is_none() && a.name == "type")
			.and_then(|a| literal_str(a.value))
			.unwrap_or("text");

		let (property, events, numeric): (&str, &[&str], bool) = match (tag, attr.name) {
			("input", "value") => match input_type {
				"checkbox" | "radio" => ("checked", &["click"], false),
				"file" => ("files", &["input"], false),
				"number" | "range" => ("value", &["input"], true),
				_ => ("value", &["input"], false),
			},
			(_, field) => match bound_field(field) {
				Some((property, events)) => (property, events, false),
				None => return Err(unsupported(attr)),
			},
		};

		let target_expr = expr_value(tag, attr)?;
		let target = self.bind_target(attr, target_expr)?;

		// binding → node
		entries.push(AttrEntry {
			category: Category::Prop,
			name: property.to_string(),
			value: target.read(),
			deps: self.analysis.tracked(target_expr.span()),
			bound: target.echoes(),
		});

		// node → binding
		let node_value = Code::primary(node_prop(property));
		let node_value = if numeric {
			call(&Code::primary("parseFloat"), &[node_value])
		} else {
			node_value
		};
		let mut sync = Vec::with_capacity(2);
		if target.echoes() {
			sync.push(stmt(&assign(&node_prop(ECHO_SLOT), &Code::str(property))));
		}
		sync.push(stmt(&target.write(&node_value, Some(NODE_PARAM))));

		if property == "currentTime" {
			poll_listeners(&sync, entries);
			return Ok(());
		}
		for event in events {
			entries.push(AttrEntry::new(
				Category::Event,
				format!("on{event}"),
				arrow_block(&[], &sync),
				DepSet::new(),
			));
		}
		Ok(())
	}

	// ========================================================================
	// Components
	// ========================================================================

	/// Prop value: bindings and props pass through, reactive expressions are
	/// wrapped in a fresh derived binding.
	fn prop_value(&mut self, tag: &str, attr: &NamedAttr<'_, '_>) -> Result<Code> {
		let Some(JSXAttributeValue::ExpressionContainer(_)) = attr.value else {
			return Ok(self.attr_value(tag, attr)?.0);
		};
		let expr = expr_value(tag, attr)?;
		if let Expression::Identifier(ident) = expr.without_parentheses()
			&& (is_reactive_name(&ident.name) || self.analysis.is_prop(ident.span))
		{
			return Ok(Code::primary(ident.name.as_str()));
		}
		let deps = self.analysis.tracked(expr.span());
		let value = self.expr(expr)?;
		if deps.is_empty() {
			return Ok(value);
		}
		Ok(rt_call(
			"createBinding",
			&[thunk(&value), self.deps_array(&deps)],
		))
	}

	fn component(&mut self, element: &JSXElement<'_>, tag: &str) -> Result<Code> {
		let attrs = named_attrs(element, tag)?;

		let mut props = Vec::new();
		let mut mutators = Vec::new();
		let mut hooks = CreateHooks::default();
		let mut node_ref = false;

		for attr in &attrs {
			match attr.namespace {
				None if attr.name == "oncreate" => {
					let (handler, _) = self.attr_value(tag, attr)?;
					hooks.push(stmt(&call(&handler, &[node()])));
				}
				None => {
					let key = self.config.prop_name(attr.name).to_string();
					props.push((key, self.prop_value(tag, attr)?));
				}
				Some("bind") if attr.name == "this" => {
					if node_ref {
						return Err(CompileError::new(
							attr.span,
							CompileErrorKind::MultipleNodeReferences(tag.to_string()),
						));
					}
					node_ref = true;
					hooks.push(self.node_reference(tag, attr)?);
				}
				Some("bind") => {
					let target = expr_value(tag, attr)?;
					let value = self.expr(target)?;
					mutators.push(AttrEntry::new(
						Category::Prop,
						attr.name,
						value,
						self.analysis.tracked(target.span()),
					));
				}
				Some(_) => return Err(unsupported(attr)),
			}
		}

		if !mutators.is_empty() {
			let groups = group_attributes(mutators);
			let groups = emit_groups(&groups, |deps| self.deps_array(deps));
			// attachMutators runs before any other create hook
			hooks
				.0
				.insert(0, stmt(&rt_call("attachMutators", &[node(), groups])));
		}

		let children = self.children(tag, &element.children)?;
		if !children.is_empty() {
			props.push(("children".to_string(), array(&children)));
		}
		let props = object(&props);

		if is_reactive_name(tag) {
			// a dynamically selected component re-renders when the tag changes
			let selected = call(&get_value(tag), &[props]);
			let deps: DepSet = [tag].into_iter().collect();
			return Ok(rt_call(
				"constructDynamicView",
				&[thunk(&hooks.wrap(selected)), self.deps_array(&deps)],
			));
		}
		Ok(hooks.wrap(call(&Code::primary(tag), &[props])))
	}

	// ========================================================================
	// Constructs
	// ========================================================================

	/// `<for of={$$xs}>{(item, index) => …}</for>`
	fn list(&mut self, element: &JSXElement<'_>) -> Result<Code> {
		let attrs = named_attrs(element, "for")?;
		let mut source = None;
		for attr in &attrs {
			if attr.namespace.is_some() || attr.name != "of" {
				return Err(CompileError::malformed(
					attr.span,
					"for",
					format!("unexpected attribute `{}`", attr.name),
				));
			}
			let array = match expr_value("for", attr)?.without_parentheses() {
				Expression::Identifier(ident) if is_stateful_array_name(&ident.name) => {
					Some(ident.name.as_str())
				}
				_ => None,
			};
			match array {
				Some(name) => source = Some(name),
				None => {
					return Err(CompileError::malformed(
						attr.span,
						"for",
						"`of` must be a stateful array (`$$name`)",
					));
				}
			}
		}
		let Some(source) = source else {
			return Err(CompileError::missing_attr(element.span, "for", "of"));
		};

		let item_ctor = match significant("for", &element.children)?.as_slice() {
			[Child::Expr(expr, _)] => match expr.without_parentheses() {
				Expression::ArrowFunctionExpression(func)
					if (1..=2).contains(&func.params.items.len())
						&& func.params.rest.is_none()
						&& func.params.items.iter().all(|p| {
							matches!(p.pattern, BindingPattern::BindingIdentifier(_))
								&& p.initializer.is_none()
						}) =>
				{
					Some(*expr)
				}
				_ => None,
			},
			_ => None,
		};
		let Some(item_ctor) = item_ctor else {
			return Err(CompileError::malformed(
				element.span,
				"for",
				"expected a single `(item, index) => …` child",
			));
		};

		Ok(rt_call(
			"constructListView",
			&[Code::primary(source), self.expr(item_ctor)?],
		))
	}

	/// `<head>…</head>`
	fn head(&mut self, element: &JSXElement<'_>) -> Result<Code> {
		if let Some(attr) = element.opening_element.attributes.first() {
			return Err(CompileError::new(
				attr.span(),
				CompileErrorKind::ForbiddenAttributes("head".to_string()),
			));
		}
		let outer = std::mem::replace(&mut self.namespace, Namespace::Html);
		let children = self.children("head", &element.children);
		self.namespace = outer;
		Ok(rt_call("relocateToHead", &[array(&children?)]))
	}

	/// `<lazy src="./Page.js" …props />`
	fn lazy(&mut self, element: &JSXElement<'_>) -> Result<Code> {
		let attrs = named_attrs(element, "lazy")?;
		if let Some(child) = significant("lazy", &element.children)?.first() {
			return Err(CompileError::malformed(
				child.span(),
				"lazy",
				"children are not supported; use `fallback`",
			));
		}

		let mut src = None;
		let mut key = None;
		let mut loader = None;
		let mut fallback = None;
		let mut props = Vec::new();
		for attr in &attrs {
			match (attr.namespace, attr.name) {
				(None, "src") => match literal_str(attr.value) {
					Some(path) => src = Some(path),
					None => {
						return Err(CompileError::malformed(
							attr.span,
							"lazy",
							"`src` must be a string literal",
						));
					}
				},
				(None, "key") => key = Some(expr_value("lazy", attr)?),
				(None, "loader") => loader = Some(self.attr_value("lazy", attr)?.0),
				(None, "fallback") => fallback = Some(self.attr_value("lazy", attr)?.0),
				(None, name) => {
					let name = self.config.prop_name(name).to_string();
					props.push((name, self.prop_value("lazy", attr)?));
				}
				(Some(_), _) => return Err(unsupported(attr)),
			}
		}
		let Some(src) = src else {
			return Err(CompileError::missing_attr(element.span, "lazy", "src"));
		};

		let mut deps = DepSet::new();
		let path = match src.split_once('*') {
			Some((prefix, suffix)) => {
				let Some(key) = key else {
					return Err(CompileError::missing_attr(element.span, "lazy", "key"));
				};
				deps = self.analysis.tracked(key.span());
				let suffix = match (self.config.locale(), suffix.strip_suffix(".js")) {
					(Some(locale), Some(stem)) => format!("{stem}.{locale}.js"),
					_ => suffix.to_string(),
				};
				let key = self.expr(key)?;
				Code::new(
					format!(
						"{} + {} + {}",
						Code::str(prefix),
						key.operand(),
						Code::str(&suffix)
					),
					Shape::Compound,
				)
			}
			None => Code::str(src),
		};

		// () => import(path).then((m) => m.default(props))
		let instantiate = arrow(&["m"], &call(&Code::primary("m.default"), &[object(&props)]));
		let ctor = thunk(&Code::primary(format!(
			"import({}).then({})",
			path.arg(),
			instantiate.arg()
		)));

		let mut args = vec![path, ctor];
		match (loader, fallback) {
			(loader, Some(fallback)) => {
				args.push(loader.unwrap_or_else(|| Code::primary("null")));
				args.push(fallback);
			}
			(Some(loader), None) => args.push(loader),
			(None, None) => {}
		}
		let construct = rt_call("constructLazy", &args);

		if deps.is_empty() {
			return Ok(construct);
		}
		Ok(rt_call(
			"constructDynamicView",
			&[thunk(&construct), self.deps_array(&deps)],
		))
	}

	/// `<t id="greeting" params={{ name }}>Hello {name}</t>`
	///
	/// Ranges cover the literal text and the `{name}` placeholders, braces
	/// included, in the source.
	fn text_template(&mut self, element: &JSXElement<'_>) -> Result<Code> {
		let attrs = named_attrs(element, "t")?;
		let mut id = None;
		let mut params = None;
		for attr in &attrs {
			match (attr.namespace, attr.name) {
				(None, "id") => match literal_str(attr.value) {
					Some(text) => id = Some(text),
					None => {
						return Err(CompileError::malformed(
							attr.span,
							"t",
							"`id` must be a string literal",
						));
					}
				},
				(None, "params") => params = Some(expr_value("t", attr)?),
				_ => {
					return Err(CompileError::malformed(
						attr.span,
						"t",
						format!("unexpected attribute `{}`", attr.name),
					));
				}
			}
		}
		let Some(id) = id else {
			return Err(CompileError::missing_attr(element.span, "t", "id"));
		};

		let mut ranges = Vec::new();
		for child in significant("t", &element.children)? {
			match child {
				Child::Text(..) => {}
				Child::Expr(expr, _)
					if matches!(expr.without_parentheses(), Expression::Identifier(_)) => {}
				Child::Expr(expr, _) => {
					return Err(CompileError::malformed(
						expr.span(),
						"t",
						"placeholders must be plain names",
					));
				}
				Child::Element(_) | Child::Fragment(_) => {
					return Err(CompileError::malformed(
						child.span(),
						"t",
						"nested elements are not supported",
					));
				}
			}
			let span = child.span();
			ranges.push(array(&[Code::number(span.start), Code::number(span.end)]));
		}

		let (params, deps) = match params {
			Some(expr) => (self.expr(expr)?, self.analysis.tracked(expr.span())),
			None => (object(&[]), DepSet::new()),
		};
		let construct = rt_call("constructText", &[Code::str(id), params, array(&ranges)]);
		if deps.is_empty() {
			return Ok(construct);
		}
		Ok(rt_call(
			"constructDynamicView",
			&[thunk(&construct), self.deps_array(&deps)],
		))
	}
}

/// `currentTime` has no change event: poll while playing.
fn poll_listeners(sync: &[String], entries: &mut Vec<AttrEntry>) {
	let clear = || {
		let poll = Code::primary(node_prop(POLL_SLOT));
		stmt(&call(&Code::primary("clearInterval"), &[poll]))
	};
	let start = || {
		let interval = call(
			&Code::primary("setInterval"),
			&[arrow_block(&[], sync), Code::number(MEDIA_POLL_INTERVAL_MS)],
		);
		stmt(&assign(&node_prop(POLL_SLOT), &interval))
	};

	let mut on_pause = vec![clear()];
	on_pause.extend(sync.iter().cloned());
	let mut on_seeked = vec![clear()];
	on_seeked.extend(sync.iter().cloned());
	on_seeked.push(format!("if (!{}) {}", node_prop("paused"), start()));

	let listeners = [
		("onplay", vec![clear(), start()]),
		("onpause", on_pause),
		("onseeked", on_seeked),
		("ondestroy", vec![clear()]),
	];
	for (event, body) in listeners {
		entries.push(AttrEntry::new(
			Category::Event,
			event,
			arrow_block(&[], &body),
			DepSet::new(),
		));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("div", TagKind::Native)]
	#[case("my-widget", TagKind::Native)]
	#[case("Card", TagKind::Component)]
	#[case("ui.Card", TagKind::Component)]
	#[case("$Page", TagKind::Component)]
	#[case("for", TagKind::List)]
	#[case("head", TagKind::Head)]
	#[case("lazy", TagKind::Lazy)]
	#[case("t", TagKind::Text)]
	fn test_tag_kind(#[case] tag: &str, #[case] expected: TagKind) {
		assert_eq!(TagKind::of(tag), expected);
	}

	#[rstest]
	fn test_field_target_replaces_whole_value() {
		let target = BindTarget::Field {
			root: "$form".into(),
			access: ".name".into(),
			key: "name".into(),
		};
		assert!(target.echoes());
		assert_eq!(target.read().text, "$.getValue($form).name");
		assert_eq!(
			target.write(&Code::primary("v"), Some(NODE_PARAM)).text,
			"$.setValue($form, { ...$.getValue($form), name: v }, el$)"
		);
	}

	#[rstest]
	fn test_plain_target_is_assigned() {
		let target = BindTarget::Plain(Code::primary("draft"));
		assert!(!target.echoes());
		assert_eq!(
			target.write(&Code::primary("v"), Some(NODE_PARAM)).text,
			"draft = v"
		);
	}
}
