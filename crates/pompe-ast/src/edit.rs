//! Span-addressed rewrites over the original source text.
//!
//! The compiler never prints a tree. It records replacements keyed by the
//! source span they cover and renders the text with those replacements
//! applied. Code nobody rewrites is emitted exactly as written.

use std::collections::BTreeMap;

use oxc_span::Span;

/// Pending replacements over one source text.
///
/// Replacing a span drops every edit nested inside it: a parent built from
/// its rendered children supersedes them. Edits never partially overlap,
/// which holds as long as replaced spans follow the tree.
#[derive(Debug, Clone)]
pub struct SourceEdits<'s> {
	source: &'s str,
	edits: BTreeMap<(u32, u32), String>,
}

impl<'s> SourceEdits<'s> {
	/// Creates an empty edit set over `source`.
	pub fn new(source: &'s str) -> Self {
		Self {
			source,
			edits: BTreeMap::new(),
		}
	}

	/// The original text.
	pub fn source(&self) -> &'s str {
		self.source
	}

	/// Original text of `span`, ignoring edits.
	pub fn text(&self, span: Span) -> &'s str {
		span.source_text(self.source)
	}

	/// Replaces `span` with `text`, dropping the edits inside it.
	pub fn replace(&mut self, span: Span, text: impl Into<String>) {
		let nested: Vec<(u32, u32)> = self
			.edits
			.range((span.start, 0)..(span.end, 0))
			.map(|(key, _)| *key)
			.collect();
		for key in nested {
			self.edits.remove(&key);
		}
		self.edits.insert((span.start, span.end), text.into());
	}

	/// Inserts `text` at `offset`, after anything already inserted there.
	pub fn insert(&mut self, offset: u32, text: &str) {
		self.edits
			.entry((offset, offset))
			.or_default()
			.push_str(text);
	}

	/// Text of `span` with every edit inside it applied.
	///
	/// An insertion exactly at `span.end` belongs to what follows the span.
	pub fn render(&self, span: Span) -> String {
		let mut out = String::with_capacity(span.size() as usize);
		let mut pos = span.start;
		for (&(start, end), text) in self.edits.range((span.start, 0)..(span.end, 0)) {
			if start < pos {
				continue;
			}
			out.push_str(&self.source[pos as usize..start as usize]);
			out.push_str(text);
			pos = end;
		}
		out.push_str(&self.source[pos as usize..span.end as usize]);
		out
	}

	/// The whole source with every edit applied.
	pub fn render_all(&self) -> String {
		let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
		let mut out = self.render(Span::new(0, end));
		if let Some(tail) = self.edits.get(&(end, end)) {
			out.push_str(tail);
		}
		out
	}

	/// Number of pending edits.
	pub fn len(&self) -> usize {
		self.edits.len()
	}

	/// Returns true if nothing was rewritten.
	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const SOURCE: &str = "let a = f(b, c);";

	#[rstest]
	fn test_untouched_source_renders_verbatim() {
		let edits = SourceEdits::new(SOURCE);
		assert_eq!(edits.render_all(), SOURCE);
	}

	#[rstest]
	fn test_replacements_apply_in_order() {
		let mut edits = SourceEdits::new(SOURCE);
		edits.replace(Span::new(13, 14), "g(c)");
		edits.replace(Span::new(10, 11), "B");
		assert_eq!(edits.render_all(), "let a = f(B, g(c));");
		assert_eq!(edits.render(Span::new(8, 15)), "f(B, g(c))");
	}

	#[rstest]
	fn test_parent_replacement_supersedes_children() {
		let mut edits = SourceEdits::new(SOURCE);
		edits.replace(Span::new(10, 11), "B");
		let call = edits.render(Span::new(8, 15));
		edits.replace(Span::new(8, 15), format!("wrap({call})"));
		assert_eq!(edits.len(), 1);
		assert_eq!(edits.render_all(), "let a = wrap(f(B, c));");
	}

	#[rstest]
	fn test_insertions_accumulate() {
		let mut edits = SourceEdits::new(SOURCE);
		edits.insert(5, " /* x */");
		edits.insert(5, " /* y */");
		edits.insert(16, "\n");
		assert_eq!(edits.render_all(), "let a /* x */ /* y */ = f(b, c);\n");
	}
}
