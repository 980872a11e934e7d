//! Attribute grouper.
//!
//! Attributes of one element are grouped by dependency signature. Each group
//! compiles to a single `(el$) => { … }` closure, paired with its dependency
//! array unless the group is static. Inside a closure statements keep their
//! declaration order.

use crate::classify::Category;
use crate::deps::DepSet;
use crate::emit::{
	Code, NODE_PARAM, Shape, array, arrow_block, assign, call, node_prop, rt_call, stmt,
};
use crate::html_spec::is_unitless;

/// Private node slot holding the teardown handler.
pub const DESTROY_SLOT: &str = "$destroy";

/// Private node slot holding the echo guard.
pub const ECHO_SLOT: &str = "$echo";

/// One classified attribute ready for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrEntry {
	/// Write category
	pub category: Category,
	/// Canonical name
	pub name: String,
	/// Rewritten value expression
	pub value: Code,
	/// Reactive values the value reads
	pub deps: DepSet,
	/// Two-way bound: guarded by the node's echo slot
	pub bound: bool,
}

impl AttrEntry {
	/// Creates an unbound entry.
	pub fn new(category: Category, name: impl Into<String>, value: Code, deps: DepSet) -> Self {
		Self {
			category,
			name: name.into(),
			value,
			deps,
			bound: false,
		}
	}

	fn is_class(&self) -> bool {
		matches!(
			(self.category, self.name.as_str()),
			(Category::Prop, "className") | (Category::Attribute, "class")
		)
	}
}

/// Entries sharing one dependency signature.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrGroup {
	/// Shared dependencies
	pub deps: DepSet,
	/// Entries in declaration order
	pub entries: Vec<AttrEntry>,
}

/// Merges class entries, composes repeated events and groups by signature.
pub fn group_attributes(entries: Vec<AttrEntry>) -> Vec<AttrGroup> {
	let entries = compose_events(merge_classes(entries));

	let mut groups: Vec<AttrGroup> = Vec::new();
	for entry in entries {
		match groups.iter_mut().find(|g| g.deps == entry.deps) {
			Some(group) => group.entries.push(entry),
			None => groups.push(AttrGroup {
				deps: entry.deps.clone(),
				entries: vec![entry],
			}),
		}
	}
	groups
}

/// Concatenates every class entry into the position of the first one.
fn merge_classes(entries: Vec<AttrEntry>) -> Vec<AttrEntry> {
	if entries.iter().filter(|e| e.is_class()).count() < 2 {
		return entries;
	}

	let mut operands = Vec::new();
	let mut deps = DepSet::new();
	let mut slot = None;
	let mut out = Vec::with_capacity(entries.len());
	for entry in entries {
		if entry.is_class() {
			operands.push(entry.value);
			deps.extend(&entry.deps);
			if slot.is_none() {
				slot = Some((out.len(), entry.category, entry.name));
			}
		} else {
			out.push(entry);
		}
	}

	if let Some((index, category, name)) = slot {
		let joined = Code::primary(format!(
			"{}.filter(Boolean).join(\" \")",
			array(&operands)
		));
		out.insert(index, AttrEntry::new(category, name, joined, deps));
	}
	out
}

/// Folds handlers of the same event into one function calling each in order.
fn compose_events(entries: Vec<AttrEntry>) -> Vec<AttrEntry> {
	let mut out: Vec<AttrEntry> = Vec::with_capacity(entries.len());
	let mut handlers: Vec<(usize, Vec<Code>)> = Vec::new();

	for entry in entries {
		if entry.category == Category::Event
			&& let Some(index) = out
				.iter()
				.position(|e| e.category == Category::Event && e.name == entry.name)
		{
			out[index].deps.extend(&entry.deps);
			match handlers.iter_mut().find(|(i, _)| *i == index) {
				Some((_, list)) => list.push(entry.value),
				None => handlers.push((index, vec![entry.value])),
			}
			continue;
		}
		out.push(entry);
	}

	for (index, rest) in handlers {
		let first = out[index].value.clone();
		let event = Code::primary("e");
		let body: Vec<String> = std::iter::once(first)
			.chain(rest)
			.map(|handler| stmt(&call(&handler, std::slice::from_ref(&event))))
			.collect();
		out[index].value = arrow_block(&["e"], &body);
	}
	out
}

/// Emits `[[(el$) => { … }, [deps]], [(el$) => { … }]]`.
///
/// `deps_array` turns a dependency set into its emitted array.
pub fn emit_groups(groups: &[AttrGroup], deps_array: impl Fn(&DepSet) -> Code) -> Code {
	let items: Vec<Code> = groups
		.iter()
		.map(|group| {
			let body: Vec<String> = group.entries.iter().map(entry_stmt).collect();
			let closure = arrow_block(&[NODE_PARAM], &body);
			if group.deps.is_empty() {
				array(&[closure])
			} else {
				array(&[closure, deps_array(&group.deps)])
			}
		})
		.collect();
	array(&items)
}

/// Statement writing one entry onto `el$`.
pub fn entry_stmt(entry: &AttrEntry) -> String {
	let write = stmt(&write_expr(entry));
	if !entry.bound {
		return write;
	}
	let echo = node_prop(ECHO_SLOT);
	format!(
		"if ({echo} === {}) {echo} = null; else {write}",
		Code::str(&entry.name)
	)
}

fn write_expr(entry: &AttrEntry) -> Code {
	let value = &entry.value;
	match entry.category {
		Category::Style => style_write(&entry.name, value),
		Category::Event if entry.name == "ondestroy" => assign(&node_prop(DESTROY_SLOT), value),
		Category::Event => assign(&node_prop(&entry.name), value),
		Category::Prop if entry.name == "paused" => Code::new(
			format!(
				"{} ? {NODE_PARAM}.pause() : {NODE_PARAM}.play()",
				value.operand()
			),
			Shape::Compound,
		),
		Category::Prop => assign(&node_prop(&entry.name), value),
		Category::Attribute => Code::primary(format!(
			"{NODE_PARAM}.setAttribute({}, {})",
			Code::str(&entry.name),
			value.arg()
		)),
	}
}

fn style_write(property: &str, value: &Code) -> Code {
	let style = node_prop("style");
	if property.starts_with("--") {
		return Code::primary(format!(
			"{style}.setProperty({}, {})",
			Code::str(property),
			value.arg()
		));
	}
	let value = match value.shape {
		_ if is_unitless(property) => value.clone(),
		Shape::Number => Code::str(&format!("{}px", value.text.replace(' ', ""))),
		Shape::Str => value.clone(),
		_ => rt_call("px", std::slice::from_ref(value)),
	};
	assign(&format!("{style}.{property}"), &value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn deps(names: &[&str]) -> DepSet {
		names.iter().copied().collect()
	}

	fn entry(category: Category, name: &str, value: Code, names: &[&str]) -> AttrEntry {
		AttrEntry::new(category, name, value, deps(names))
	}

	fn ident(name: &str) -> Code {
		Code::primary(name)
	}

	fn emitted(entries: Vec<AttrEntry>) -> String {
		let groups = group_attributes(entries);
		emit_groups(&groups, |d| {
			Code::primary(format!("[{}]", d.iter().collect::<Vec<_>>().join(", ")))
		})
		.text
	}

	#[rstest]
	fn test_same_signature_shares_closure() {
		let groups = group_attributes(vec![
			entry(Category::Prop, "title", ident("a"), &["$b", "$a"]),
			entry(Category::Prop, "id", Code::str("x"), &[]),
			entry(Category::Attribute, "role", ident("b"), &["$a", "$b"]),
		]);
		assert_eq!(groups.len(), 2);
		assert_eq!(groups[0].deps.signature(), "$a,$b");
		assert_eq!(groups[0].entries.len(), 2);
		assert_eq!(groups[0].entries[0].name, "title");
		assert_eq!(groups[0].entries[1].name, "role");
	}

	#[rstest]
	fn test_static_group_has_no_deps_array() {
		let out = emitted(vec![entry(Category::Prop, "id", Code::str("x"), &[])]);
		assert_eq!(out, "[[(el$) => { el$.id = \"x\"; }]]");
	}

	#[rstest]
	fn test_dynamic_group_has_deps_array() {
		let out = emitted(vec![
			entry(Category::Prop, "title", ident("t"), &["$t"]),
			entry(Category::Prop, "id", ident("i"), &["$t"]),
		]);
		assert_eq!(out, "[[(el$) => { el$.title = t; el$.id = i; }, [$t]]]");
	}

	#[rstest]
	fn test_class_entries_are_concatenated() {
		let groups = group_attributes(vec![
			entry(Category::Prop, "className", Code::str("card"), &[]),
			entry(Category::Prop, "id", Code::str("x"), &[]),
			entry(Category::Prop, "className", ident("extra"), &["$extra"]),
		]);
		assert_eq!(groups.len(), 1);
		let merged = &groups[0].entries[0];
		assert_eq!(merged.name, "className");
		assert_eq!(merged.deps.signature(), "$extra");
		assert_eq!(
			merged.value.text,
			"[\"card\", extra].filter(Boolean).join(\" \")"
		);
	}

	#[rstest]
	fn test_repeated_events_are_composed() {
		let groups = group_attributes(vec![
			entry(Category::Event, "onclick", ident("first"), &[]),
			entry(
				Category::Event,
				"onclick",
				Code::new("(e) => log(e)", Shape::Compound),
				&[],
			),
		]);
		assert_eq!(groups[0].entries.len(), 1);
		assert_eq!(
			groups[0].entries[0].value.text,
			"(e) => { first(e); ((e) => log(e))(e); }"
		);
	}

	#[rstest]
	#[case("width", Code::number(10), "el$.style.width = \"10px\";")]
	#[case("width", Code::new("-4", Shape::Number), "el$.style.width = \"-4px\";")]
	#[case("opacity", Code::number(0.5), "el$.style.opacity = 0.5;")]
	#[case("width", Code::str("50%"), "el$.style.width = \"50%\";")]
	#[case("width", ident("w"), "el$.style.width = $.px(w);")]
	#[case("--accent", ident("c"), "el$.style.setProperty(\"--accent\", c);")]
	fn test_style_writes(#[case] name: &str, #[case] value: Code, #[case] expected: &str) {
		let stmt = entry_stmt(&entry(Category::Style, name, value, &[]));
		assert_eq!(stmt, expected);
	}

	#[rstest]
	#[case(Category::Event, "ondestroy", "f", "el$.$destroy = f;")]
	#[case(Category::Prop, "paused", "p", "p ? el$.pause() : el$.play();")]
	#[case(Category::Attribute, "role", "r", "el$.setAttribute(\"role\", r);")]
	fn test_special_writes(
		#[case] category: Category,
		#[case] name: &str,
		#[case] value: &str,
		#[case] expected: &str,
	) {
		assert_eq!(entry_stmt(&entry(category, name, ident(value), &[])), expected);
	}

	#[rstest]
	fn test_bound_entry_is_echo_guarded() {
		let mut bound = entry(Category::Prop, "value", ident("v"), &["$v"]);
		bound.bound = true;
		assert_eq!(
			entry_stmt(&bound),
			"if (el$.$echo === \"value\") el$.$echo = null; else el$.value = v;"
		);
	}
}
