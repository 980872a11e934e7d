//! Line and column lookup for diagnostics.

use oxc_data_structures::rope::{Rope, get_line_column};

/// A 1-based source position. Columns count UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
	/// 1-based line
	pub line: u32,
	/// 1-based column
	pub column: u32,
}

/// Offset to position mapping for one source text.
#[derive(Debug)]
pub struct LineMap<'s> {
	source: &'s str,
	rope: Rope,
}

impl<'s> LineMap<'s> {
	/// Indexes the lines of `source`.
	pub fn new(source: &'s str) -> Self {
		Self {
			source,
			rope: Rope::from_str(source),
		}
	}

	/// Position of the byte `offset`, clamped to the end of the text.
	pub fn location(&self, offset: u32) -> Location {
		let len = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
		let (line, column) = get_line_column(&self.rope, offset.min(len), self.source);
		Location {
			line: line + 1,
			column: column + 1,
		}
	}

	/// Text of the 1-based `line`, without its line break.
	pub fn line_text(&self, line: u32) -> &'s str {
		let index = line.saturating_sub(1) as usize;
		let lines = self.rope.len_lines();
		if index >= lines {
			return "";
		}
		let start = self.rope.line_to_byte(index);
		let end = if index + 1 < lines {
			self.rope.line_to_byte(index + 1)
		} else {
			self.source.len()
		};
		self.source[start..end].trim_end_matches(['\n', '\r'])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const SOURCE: &str = "let a = 1;\n\ttitle = 2;\r\nend";

	#[rstest]
	#[case(0, 1, 1)]
	#[case(12, 2, 2)]
	#[case(24, 3, 1)]
	#[case(999, 3, 4)]
	fn test_location(#[case] offset: u32, #[case] line: u32, #[case] column: u32) {
		assert_eq!(LineMap::new(SOURCE).location(offset), Location { line, column });
	}

	#[rstest]
	#[case(1, "let a = 1;")]
	#[case(2, "\ttitle = 2;")]
	#[case(3, "end")]
	#[case(9, "")]
	fn test_line_text(#[case] line: u32, #[case] expected: &str) {
		assert_eq!(LineMap::new(SOURCE).line_text(line), expected);
	}

	#[rstest]
	fn test_columns_count_utf16_units() {
		let map = LineMap::new("é = 1;");
		assert_eq!(map.location(2), Location { line: 1, column: 2 });
	}
}
