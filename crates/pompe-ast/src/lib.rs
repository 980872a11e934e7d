//! JavaScript front-end for the pompe template compiler.
//!
//! Source units are ES modules with embedded markup. Parsing is done by
//! `oxc_parser`; this crate adds what the compiler needs on top of the oxc
//! tree: span-addressed rewriting, line lookup for diagnostics and a few
//! text helpers for emitted code.
//!
//! ## Source Structure
//!
//! ```text
//! import { api } from "./api.js";
//!
//! function Counter({ start = 0 }) {
//!     let $count = start;
//!     $: console.log($count);
//!     return <button onclick={() => $count++}>{$count}</button>;
//! }
//! ```
//!
//! ## Main Types
//!
//! - [`parse`] - oxc parse of one unit, failing on the first syntax error
//! - [`SourceEdits`] - replacements keyed by source span, rendered on demand
//! - [`LineMap`] / [`Location`] - 1-based line and column of an offset
//! - [`ast`] - the oxc tree, re-exported
//!
//! ## Usage
//!
//! ```rust
//! use pompe_ast::{Allocator, GetSpan, SourceEdits, ast::Statement, parse};
//!
//! let source = "let a = 1 + 2;\nclass A {}";
//! let allocator = Allocator::default();
//! let program = parse(&allocator, source).unwrap();
//!
//! let Statement::VariableDeclaration(decl) = &program.body[0] else {
//! 	unreachable!()
//! };
//! let init = decl.declarations[0].init.as_ref().unwrap();
//!
//! let mut edits = SourceEdits::new(source);
//! edits.replace(init.span(), "3");
//! assert_eq!(edits.render_all(), "let a = 3;\nclass A {}");
//! ```

mod edit;
mod location;
mod parser;
mod text;

pub use edit::SourceEdits;
pub use location::{LineMap, Location};
pub use oxc_allocator::Allocator;
pub use oxc_ast::ast;
pub use oxc_span::{GetSpan, SourceType, Span};
pub use parser::{ParseError, parse, source_type};
pub use text::{fold_markup_text, indentation_at, quote_str};
