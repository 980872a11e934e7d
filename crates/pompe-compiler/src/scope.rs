//! Naming conventions, lexical scopes and component prop declarations.

use std::collections::HashMap;

use pompe_ast::GetSpan;
use pompe_ast::ast::{
	BindingPattern, Declaration, ExportDefaultDeclarationKind, Expression, FormalParameters,
	PropertyKey, Statement,
};

use crate::error::{CompileError, CompileErrorKind, Result};

/// Runtime-provided props argument of a compiled component.
pub const PROPS_PARAM: &str = "$props";

/// Suffix of the "was this prop provided" flag of a defaulted prop.
pub const GIVEN_SUFFIX: &str = "$given";

/// Label marking a reactive statement (`$: …`).
pub const REACTIVE_LABEL: &str = "$";

/// Returns true for reactive binding names: a single leading `$`.
pub fn is_reactive_name(name: &str) -> bool {
	name.len() > 1 && name.starts_with('$') && !name.starts_with("$$") && name != PROPS_PARAM
}

/// Returns true for stateful array names: a leading `$$`.
pub fn is_stateful_array_name(name: &str) -> bool {
	name.len() > 2 && name.starts_with("$$")
}

/// Returns true for component names: a leading upper-case letter.
pub fn is_component_name(name: &str) -> bool {
	name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
	/// Ordinary local binding
	Local,
	/// Read-only, externally supplied component prop
	Prop {
		/// Declared with a default value
		defaulted: bool,
	},
}

/// Stack of lexical scopes.
#[derive(Debug, Default)]
pub struct Scope {
	frames: Vec<HashMap<String, Symbol>>,
}

impl Scope {
	/// Creates a scope stack with the module frame.
	pub fn new() -> Self {
		Self {
			frames: vec![HashMap::new()],
		}
	}

	/// Opens a nested frame.
	pub fn push(&mut self) {
		self.frames.push(HashMap::new());
	}

	/// Closes the innermost frame, returning its declarations.
	pub fn pop(&mut self) -> HashMap<String, Symbol> {
		self.frames.pop().unwrap_or_default()
	}

	/// Declares `name` in the innermost frame.
	pub fn declare(&mut self, name: impl Into<String>, symbol: Symbol) {
		if let Some(frame) = self.frames.last_mut() {
			frame.insert(name.into(), symbol);
		}
	}

	/// Declares every name bound by `pattern` as a local.
	pub fn declare_pattern(&mut self, pattern: &BindingPattern<'_>) {
		for ident in pattern.get_binding_identifiers() {
			self.declare(ident.name.as_str(), Symbol::Local);
		}
	}

	/// Declares every parameter of a plain function as a local.
	pub fn declare_params(&mut self, params: &FormalParameters<'_>) {
		for item in &params.items {
			self.declare_pattern(&item.pattern);
		}
		if let Some(rest) = &params.rest {
			self.declare_pattern(&rest.rest.argument);
		}
	}

	/// Resolves `name` from the innermost frame outwards.
	pub fn resolve(&self, name: &str) -> Option<Symbol> {
		self.frames
			.iter()
			.rev()
			.find_map(|frame| frame.get(name).copied())
	}

	/// Returns true if `name` resolves to a component prop.
	pub fn is_prop(&self, name: &str) -> bool {
		matches!(self.resolve(name), Some(Symbol::Prop { .. }))
	}

	/// Declares the names a block introduces before any of it runs.
	pub fn hoist(&mut self, body: &[Statement<'_>]) {
		for stmt in body {
			match stmt {
				Statement::ImportDeclaration(import) => {
					for specifier in import.specifiers.iter().flatten() {
						self.declare(specifier.local().name.as_str(), Symbol::Local);
					}
				}
				Statement::ExportNamedDeclaration(export) => {
					if let Some(declaration) = &export.declaration {
						self.hoist_declaration(declaration);
					}
				}
				Statement::ExportDefaultDeclaration(export) => match &export.declaration {
					ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
						if let Some(id) = &func.id {
							self.declare(id.name.as_str(), Symbol::Local);
						}
					}
					ExportDefaultDeclarationKind::ClassDeclaration(class) => {
						if let Some(id) = &class.id {
							self.declare(id.name.as_str(), Symbol::Local);
						}
					}
					_ => {}
				},
				_ => {
					if let Some(declaration) = stmt.as_declaration() {
						self.hoist_declaration(declaration);
					}
				}
			}
		}
	}

	fn hoist_declaration(&mut self, declaration: &Declaration<'_>) {
		match declaration {
			Declaration::VariableDeclaration(decl) => {
				for declarator in &decl.declarations {
					self.declare_pattern(&declarator.id);
				}
			}
			Declaration::FunctionDeclaration(func) => {
				if let Some(id) = &func.id {
					self.declare(id.name.as_str(), Symbol::Local);
				}
			}
			Declaration::ClassDeclaration(class) => {
				if let Some(id) = &class.id {
					self.declare(id.name.as_str(), Symbol::Local);
				}
			}
			_ => {}
		}
	}
}

/// One destructured prop of a component.
#[derive(Debug, Clone, Copy)]
pub struct PropDecl<'n, 'a> {
	/// Prop name as passed by callers
	pub key: &'n str,
	/// Local name inside the component
	pub local: &'n str,
	/// Default value, if any
	pub default: Option<&'n Expression<'a>>,
}

/// Extracts the destructured props of a component's parameters.
///
/// Returns `Ok(None)` when the component does not destructure a single
/// object parameter (no props, or a plain props identifier).
pub fn component_props<'n, 'a>(
	params: &'n FormalParameters<'a>,
) -> Result<Option<Vec<PropDecl<'n, 'a>>>> {
	let [param] = params.items.as_slice() else {
		return Ok(None);
	};
	if params.rest.is_some() {
		return Ok(None);
	}
	let object = match &param.pattern {
		BindingPattern::BindingIdentifier(_) if param.initializer.is_none() => return Ok(None),
		BindingPattern::ObjectPattern(object) if param.initializer.is_none() => object,
		other => {
			return Err(CompileError::new(
				param.span,
				CompileErrorKind::InvalidPropPattern(pattern_label(other)),
			));
		}
	};
	if let Some(rest) = &object.rest {
		return Err(CompileError::new(
			rest.span,
			CompileErrorKind::RestProps(pattern_label(&rest.argument)),
		));
	}

	let mut decls = Vec::with_capacity(object.properties.len());
	for prop in &object.properties {
		let key = match &prop.key {
			PropertyKey::StaticIdentifier(id) if !prop.computed => id.name.as_str(),
			PropertyKey::StringLiteral(lit) if !prop.computed => lit.value.as_str(),
			_ => {
				return Err(CompileError::new(
					prop.key.span(),
					CompileErrorKind::InvalidPropPattern(pattern_label(&prop.value)),
				));
			}
		};
		let invalid = || {
			CompileError::new(
				prop.value.span(),
				CompileErrorKind::InvalidPropPattern(key.to_string()),
			)
		};
		let (local, default) = match &prop.value {
			BindingPattern::BindingIdentifier(local) => (local, None),
			BindingPattern::AssignmentPattern(assign) => match &assign.left {
				BindingPattern::BindingIdentifier(local) => (local, Some(&assign.right)),
				_ => return Err(invalid()),
			},
			_ => return Err(invalid()),
		};
		decls.push(PropDecl {
			key,
			local: local.name.as_str(),
			default,
		});
	}
	Ok(Some(decls))
}

fn pattern_label(pattern: &BindingPattern<'_>) -> String {
	pattern
		.get_binding_identifiers()
		.iter()
		.map(|ident| ident.name.as_str())
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use pompe_ast::{Allocator, parse};
	use rstest::rstest;

	#[rstest]
	#[case("$count", true)]
	#[case("$", false)]
	#[case("$$todos", false)]
	#[case("$props", false)]
	#[case("count", false)]
	fn test_is_reactive_name(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(is_reactive_name(name), expected);
	}

	fn with_params<R>(source: &str, check: impl FnOnce(&FormalParameters<'_>) -> R) -> R {
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let Statement::FunctionDeclaration(func) = &program.body[0] else {
			panic!("expected function");
		};
		check(&func.params)
	}

	#[rstest]
	fn test_component_props() {
		with_params(
			"function Card({ title, size = 1, label: text }) {}",
			|params| {
				let props = component_props(params).unwrap().unwrap();
				assert_eq!(props.len(), 3);
				assert!(props[1].default.is_some());
				assert_eq!(props[2].key, "label");
				assert_eq!(props[2].local, "text");
			},
		);
	}

	#[rstest]
	#[case(
		"function Card({ title, ...others }) {}",
		CompileErrorKind::RestProps("others".into())
	)]
	#[case(
		"function Card({ user: { name } }) {}",
		CompileErrorKind::InvalidPropPattern("user".into())
	)]
	#[case(
		"function Card([first]) {}",
		CompileErrorKind::InvalidPropPattern("first".into())
	)]
	fn test_invalid_prop_patterns(#[case] source: &str, #[case] expected: CompileErrorKind) {
		with_params(source, |params| {
			assert_eq!(component_props(params).unwrap_err().kind, expected);
		});
	}

	#[rstest]
	#[case("function Card(props) {}")]
	#[case("function Card() {}")]
	#[case("function Card(a, b) {}")]
	fn test_no_destructured_props(#[case] source: &str) {
		with_params(source, |params| {
			assert!(component_props(params).unwrap().is_none());
		});
	}

	#[rstest]
	fn test_shadowing() {
		let mut scope = Scope::new();
		scope.push();
		scope.declare("title", Symbol::Prop { defaulted: false });
		scope.push();
		scope.declare("title", Symbol::Local);
		assert_eq!(scope.resolve("title"), Some(Symbol::Local));
		scope.pop();
		assert!(scope.is_prop("title"));
	}

	#[rstest]
	fn test_hoist_declarations() {
		let allocator = Allocator::default();
		let program = parse(
			&allocator,
			"import api, { get as fetch } from \"./api.js\";\nexport const a = 1;\nfunction f() {}\nclass C {}\nlet { b, c: [d] } = o;",
		)
		.unwrap();
		let mut scope = Scope::new();
		scope.hoist(&program.body);
		for name in ["api", "fetch", "a", "f", "C", "b", "d"] {
			assert_eq!(scope.resolve(name), Some(Symbol::Local), "{name}");
		}
		assert_eq!(scope.resolve("c"), None);
	}
}
