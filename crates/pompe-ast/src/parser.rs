//! Parser front-end.
//!
//! Source units are ES modules with embedded markup, parsed by `oxc_parser`.
//! Any syntax error aborts the unit: the compiler never sees a recovered tree.

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use thiserror::Error;

/// Source type every unit is parsed as: a module with markup.
pub const fn source_type() -> SourceType {
	SourceType::jsx()
}

/// A source unit that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
	/// Location of the first error
	pub span: Span,
	/// Message of the first error
	pub message: String,
	/// Every diagnostic the parser reported
	pub diagnostics: Vec<OxcDiagnostic>,
}

impl ParseError {
	fn from_diagnostics(diagnostics: Vec<OxcDiagnostic>) -> Self {
		let first = diagnostics.first();
		let span = first
			.and_then(|diagnostic| diagnostic.labels.as_ref())
			.and_then(|labels| labels.first())
			.map(|label| {
				let start = offset(label.offset());
				Span::new(start, start.saturating_add(offset(label.len())))
			})
			.unwrap_or_default();
		let message = first.map_or_else(
			|| "unexpected end of input".to_string(),
			|diagnostic| diagnostic.message.to_string(),
		);
		Self {
			span,
			message,
			diagnostics,
		}
	}
}

fn offset(value: usize) -> u32 {
	u32::try_from(value).unwrap_or(u32::MAX)
}

/// Parses one source unit.
///
/// The returned tree borrows both the allocator and the source text.
pub fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> Result<Program<'a>, ParseError> {
	let ret = Parser::new(allocator, source, source_type()).parse();
	if ret.panicked || !ret.errors.is_empty() {
		tracing::debug!(
			errors = ret.errors.len(),
			panicked = ret.panicked,
			"source unit failed to parse"
		);
		return Err(ParseError::from_diagnostics(ret.errors));
	}
	tracing::trace!(statements = ret.program.body.len(), "parsed source unit");
	Ok(ret.program)
}
