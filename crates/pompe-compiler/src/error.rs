//! Compile error types and source-mapped diagnostics.

use core::fmt;

use oxc_diagnostics::OxcDiagnostic;
use pompe_ast::{LineMap, ParseError, Span};
use thiserror::Error;

/// An error that aborts compilation of a source unit.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct CompileError {
	/// The span where the error occurred
	pub span: Span,
	/// The kind of error
	pub kind: CompileErrorKind,
}

/// The kind of compile error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
	/// Component props destructured with a non-identifier pattern
	#[error("component props must be destructured into plain identifiers (prop `{0}`)")]
	InvalidPropPattern(String),
	/// Component props destructured with a rest element
	#[error("rest elements are not supported in component props (`...{0}`)")]
	RestProps(String),
	/// More than one `bind:this` on an element
	#[error("element `<{0}>` has more than one node reference")]
	MultipleNodeReferences(String),
	/// Assignment to a component prop
	#[error("cannot assign to `{0}`: component props are read-only")]
	ReadOnlyMutation(String),
	/// Two-way binding to something that cannot be written back
	#[error(
		"cannot bind to `{0}`: expected a name or a property of a reactive binding (`$name.field`)"
	)]
	UnsupportedBindTarget(String),
	/// A construct element whose attributes or children have the wrong shape
	#[error("malformed `<{element}>`: {reason}")]
	MalformedConstruct {
		/// Construct tag
		element: String,
		/// What is wrong with it
		reason: String,
	},
	/// `{...spread}` attribute
	#[error("spread attributes are not supported on `<{0}>`")]
	SpreadAttribute(String),
	/// Namespaced attribute that is not a known directive
	#[error("unsupported directive `{0}`")]
	UnsupportedDirective(String),
	/// Construct element missing an attribute it needs
	#[error("missing required attribute `{attr}` on `<{element}>`")]
	MissingRequiredAttribute {
		/// Construct tag
		element: String,
		/// Missing attribute
		attr: String,
	},
	/// Construct element that takes no attributes
	#[error("`<{0}>` does not accept attributes")]
	ForbiddenAttributes(String),
}

impl CompileError {
	/// Creates a new compile error.
	pub fn new(span: Span, kind: CompileErrorKind) -> Self {
		Self { span, kind }
	}

	/// Shorthand for [`CompileErrorKind::MalformedConstruct`].
	pub fn malformed(span: Span, element: &str, reason: impl Into<String>) -> Self {
		Self::new(
			span,
			CompileErrorKind::MalformedConstruct {
				element: element.to_string(),
				reason: reason.into(),
			},
		)
	}

	/// Shorthand for [`CompileErrorKind::MissingRequiredAttribute`].
	pub fn missing_attr(span: Span, element: &str, attr: &str) -> Self {
		Self::new(
			span,
			CompileErrorKind::MissingRequiredAttribute {
				element: element.to_string(),
				attr: attr.to_string(),
			},
		)
	}
}

/// Either stage of [`compile_source`](crate::compile_source) can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// The source could not be parsed
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// The source parsed but could not be compiled
	#[error(transparent)]
	Compile(#[from] CompileError),
}

impl Error {
	/// Location of the failure.
	pub fn span(&self) -> Span {
		match self {
			Error::Parse(err) => err.span,
			Error::Compile(err) => err.span,
		}
	}

	/// Message without location.
	pub fn message(&self) -> String {
		match self {
			Error::Parse(err) => err.message.clone(),
			Error::Compile(err) => err.kind.to_string(),
		}
	}

	/// The failure as an oxc diagnostic, labelled at its span.
	///
	/// Parse failures hand back the parser's own first diagnostic.
	pub fn to_oxc_diagnostic(&self) -> OxcDiagnostic {
		if let Error::Parse(err) = self
			&& let Some(first) = err.diagnostics.first()
		{
			return first.clone();
		}
		OxcDiagnostic::error(self.message()).with_label(self.span())
	}
}

/// A rendered, source-mapped error report.
///
/// ```text
/// src/App.jsx:3:5: error: cannot assign to `title`: component props are read-only
///   |     title = "x";
///   |     ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	/// File name as given by the caller
	pub file: String,
	/// 1-based line
	pub line: u32,
	/// 1-based column, in UTF-16 code units
	pub column: u32,
	/// Error message
	pub message: String,
	/// Text of the offending line
	pub source_line: String,
}

impl Diagnostic {
	/// Builds a diagnostic for `error` against the unit's `source`.
	pub fn new(file: &str, source: &str, error: &Error) -> Self {
		let map = LineMap::new(source);
		let location = map.location(error.span().start);
		Self {
			file: file.to_string(),
			line: location.line,
			column: location.column,
			message: error.message(),
			source_line: map.line_text(location.line).to_string(),
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"{}:{}:{}: error: {}",
			self.file, self.line, self.column, self.message
		)?;
		writeln!(f, "  | {}", self.source_line)?;
		let pad: String = self
			.source_line
			.encode_utf16()
			.take(self.column.saturating_sub(1) as usize)
			.map(|unit| if unit == u16::from(b'\t') { '\t' } else { ' ' })
			.collect();
		write!(f, "  | {}^", pad)
	}
}

/// Result type for compiler passes.
pub type Result<T> = core::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn read_only(start: u32, end: u32) -> Error {
		Error::Compile(CompileError::new(
			Span::new(start, end),
			CompileErrorKind::ReadOnlyMutation("title".into()),
		))
	}

	#[rstest]
	fn test_diagnostic_rendering() {
		let source = "let a = 1;\n\ttitle = 2;";
		let diagnostic = Diagnostic::new("App.jsx", source, &read_only(12, 17));
		assert_eq!(
			diagnostic.to_string(),
			"App.jsx:2:2: error: cannot assign to `title`: component props are read-only\n  | \ttitle = 2;\n  | \t^"
		);
	}

	#[rstest]
	#[case("let a = 1;\r\ntitle = 2;", 12, 2, 1)]
	#[case("const s = \"é\"; title = 2;", 16, 1, 16)]
	#[case("title", 0, 1, 1)]
	fn test_diagnostic_location(
		#[case] source: &str,
		#[case] start: u32,
		#[case] line: u32,
		#[case] column: u32,
	) {
		let diagnostic = Diagnostic::new("App.jsx", source, &read_only(start, start + 5));
		assert_eq!((diagnostic.line, diagnostic.column), (line, column));
	}

	#[rstest]
	fn test_oxc_diagnostic_is_labelled() {
		let diagnostic = read_only(12, 17).to_oxc_diagnostic();
		assert_eq!(
			diagnostic.to_string(),
			"cannot assign to `title`: component props are read-only"
		);
		let labels = diagnostic.labels.as_ref().unwrap();
		assert_eq!((labels[0].offset(), labels[0].len()), (12, 5));
	}
}
