//! Compiler orchestrator.
//!
//! A single pass over an analysed source unit:
//!
//! - injects the runtime namespace import
//! - turns reactive reads into `$.getValue(x)` and writes into `$.setValue`
//! - turns reactive declarations into binding and stateful array constructors
//! - rewrites component prop destructuring into reads off `$props`
//! - compiles `$:` statements into effects
//! - hands every markup element to the element codegen
//!
//! The tree is never mutated. Rewrites are recorded as [`SourceEdits`] over
//! the original text, children before parents, so any statement the pass
//! does not touch is emitted exactly as written.

use std::collections::HashSet;

use oxc_ast_visit::{Visit, walk};
use oxc_syntax::scope::ScopeFlags;
use pompe_ast::ast::*;
use pompe_ast::{Allocator, GetSpan, SourceEdits, Span, indentation_at, parse, quote_str};

use crate::ABI_VERSION;
use crate::analysis::{Analysis, analyze};
use crate::classify::{Classifier, Namespace};
use crate::config::CompilerConfig;
use crate::deps::DepSet;
use crate::emit::{
	Code, RUNTIME_NAMESPACE, array, binary, get_value, object_key, rt, rt_call, set_value, thunk,
};
use crate::error::{CompileError, CompileErrorKind, Error, Result};
use crate::scope::{
	GIVEN_SUFFIX, PROPS_PARAM, PropDecl, REACTIVE_LABEL, component_props, is_reactive_name,
	is_stateful_array_name,
};

/// Compiles a parsed source unit into JavaScript calling the runtime.
///
/// The output starts with the ABI marker and the runtime namespace import.
pub fn compile(program: &Program<'_>, config: &CompilerConfig) -> Result<String> {
	let analysis = analyze(program)?;
	let mut rewriter = Rewriter::new(config, analysis, program.source_text);
	rewriter.visit_program(program);
	if let Some(err) = rewriter.error.take() {
		return Err(err);
	}

	tracing::debug!(
		statements = program.body.len(),
		components = rewriter.component_count,
		edits = rewriter.edits.len(),
		development = config.development,
		"compiled source unit"
	);

	let mut out = format!(
		"// pompe abi v{ABI_VERSION}\nimport * as {RUNTIME_NAMESPACE} from {};\n",
		quote_str(&config.runtime_module)
	);
	out.push_str(&rewriter.edits.render_all());
	if !out.ends_with('\n') {
		out.push('\n');
	}
	Ok(out)
}

/// Parses and compiles `source`.
pub fn compile_source(
	source: &str,
	config: &CompilerConfig,
) -> core::result::Result<String, Error> {
	let allocator = Allocator::default();
	let program = parse(&allocator, source)?;
	Ok(compile(&program, config)?)
}

#[derive(Debug, Default)]
struct ComponentFrame {
	defaulted: HashSet<String>,
}

/// Rewriting state for one source unit.
pub(crate) struct Rewriter<'c, 's> {
	pub(crate) config: &'c CompilerConfig,
	pub(crate) classifier: Classifier<'c>,
	pub(crate) analysis: Analysis,
	pub(crate) edits: SourceEdits<'s>,
	/// Namespace of the element currently being generated
	pub(crate) namespace: Namespace,
	components: Vec<ComponentFrame>,
	component_count: usize,
	error: Option<CompileError>,
}

impl<'c, 's> Rewriter<'c, 's> {
	fn new(config: &'c CompilerConfig, analysis: Analysis, source: &'s str) -> Self {
		Self {
			config,
			classifier: Classifier::new(config.attribute_table.as_ref()),
			analysis,
			edits: SourceEdits::new(source),
			namespace: Namespace::Html,
			components: Vec::new(),
			component_count: 0,
			error: None,
		}
	}

	fn fail(&mut self, err: CompileError) {
		self.error.get_or_insert(err);
	}

	/// Rewrites `expr` and returns its new text.
	pub(crate) fn expr(&mut self, expr: &Expression<'_>) -> Result<Code> {
		self.visit_expression(expr);
		if let Some(err) = self.error.take() {
			return Err(err);
		}
		Ok(Code::of(expr, self.edits.render(expr.span())))
	}

	/// Records the outcome of a rewrite producing the replacement of `span`.
	fn apply(&mut self, span: Span, result: Result<Code>) {
		match result {
			Ok(code) => self.edits.replace(span, code.text),
			Err(err) => self.fail(err),
		}
	}

	/// Emitted dependency array for `deps`.
	///
	/// A defaulted prop is only a dependency when the caller provided it, so
	/// its entry reads `(name$given ? name : null)`.
	pub(crate) fn deps_array(&self, deps: &DepSet) -> Code {
		let items: Vec<Code> = deps
			.iter()
			.map(|name| {
				if self.is_defaulted_prop(name) {
					Code::primary(format!("({name}{GIVEN_SUFFIX} ? {name} : null)"))
				} else {
					Code::primary(name)
				}
			})
			.collect();
		array(&items)
	}

	fn is_defaulted_prop(&self, name: &str) -> bool {
		!is_reactive_name(name)
			&& self
				.components
				.iter()
				.rev()
				.any(|frame| frame.defaulted.contains(name))
	}

	fn read_only(span: Span, name: &str) -> CompileError {
		CompileError::new(span, CompileErrorKind::ReadOnlyMutation(name.to_string()))
	}

	// ========================================================================
	// Declarations
	// ========================================================================

	/// `$.createBinding(v)` or, when `v` tracks dependencies,
	/// `$.createBinding(() => v, [deps])`.
	fn binding_init(&mut self, init: &Expression<'_>) -> Result<Code> {
		let deps = self.analysis.tracked(init.span());
		let value = self.expr(init)?;
		if deps.is_empty() {
			return Ok(rt_call("createBinding", &[value]));
		}
		Ok(rt_call(
			"createBinding",
			&[thunk(&value), self.deps_array(&deps)],
		))
	}

	/// `$.statefulArray(items)` or the keyed builder `$.statefulArray(n, f)`.
	fn stateful_array_init(&mut self, init: &Expression<'_>) -> Result<Code> {
		if let Expression::ParenthesizedExpression(paren) = init
			&& let Expression::SequenceExpression(sequence) = &paren.expression
			&& let [length, builder] = sequence.expressions.as_slice()
		{
			let args = [self.expr(length)?, self.expr(builder)?];
			return Ok(rt_call("statefulArray", &args));
		}
		Ok(rt_call("statefulArray", &[self.expr(init)?]))
	}

	// ========================================================================
	// Components
	// ========================================================================

	/// `$props.key`, or `$props["key"]` when the key is not an identifier.
	fn prop_read(&self, key: &str) -> Code {
		let key = self.config.prop_name(key);
		if object_key(key) == key {
			Code::primary(format!("{PROPS_PARAM}.{key}"))
		} else {
			Code::primary(format!("{PROPS_PARAM}[{}]", quote_str(key)))
		}
	}

	/// Declarations reading each prop off `$props`.
	fn prop_prelude(&mut self, props: &[PropDecl<'_, '_>]) -> Result<Vec<String>> {
		let mut prelude = Vec::with_capacity(props.len() * 2);
		for prop in props {
			let read = self.prop_read(prop.key);
			let local = prop.local;
			match prop.default {
				None => prelude.push(format!("const {local} = {read};")),
				Some(default) => {
					let fallback = self.expr(default)?;
					let given = binary(&read, "!==", &Code::primary("undefined"));
					prelude.push(format!("const {local}{GIVEN_SUFFIX} = {given};"));
					prelude.push(format!(
						"const {local} = {};",
						binary(&read, "??", &fallback)
					));
				}
			}
		}
		Ok(prelude)
	}

	/// Replaces the destructured parameter with `$props` and returns the
	/// prelude, or `None` when the function is compiled as written.
	fn enter_component(
		&mut self,
		span: Span,
		params: &FormalParameters<'_>,
	) -> Result<Option<Vec<String>>> {
		if !self.analysis.is_component(span) {
			return Ok(None);
		}
		let Some(props) = component_props(params)? else {
			return Ok(None);
		};
		self.component_count += 1;
		tracing::debug!(start = span.start, props = props.len(), "rewriting component");

		let prelude = self.prop_prelude(&props)?;
		if let Some(param) = params.items.first() {
			self.edits.replace(param.span, PROPS_PARAM);
		}
		self.components.push(ComponentFrame {
			defaulted: props
				.iter()
				.filter(|p| p.default.is_some())
				.map(|p| p.local.to_string())
				.collect(),
		});
		Ok(Some(prelude))
	}

	/// Inserts the prelude at the top of a block body.
	fn insert_prelude(&mut self, owner: Span, body: &FunctionBody<'_>, prelude: &[String]) {
		let indent = indentation_at(self.edits.source(), owner.start).to_string();
		let text: String = prelude
			.iter()
			.map(|line| format!("\n{indent}\t{line}"))
			.collect();
		self.edits.insert(body.span.start + 1, &text);
	}

	// ========================================================================
	// Reads and writes
	// ========================================================================

	/// `$a = v` → `$.setValue($a, v)`; `$a += v` → `$.setValue($a, $.getValue($a) + v)`.
	fn assignment(&mut self, it: &AssignmentExpression<'_>) -> Result<Option<Code>> {
		let AssignmentTarget::AssignmentTargetIdentifier(ident) = &it.left else {
			return Ok(None);
		};
		if self.analysis.is_prop(ident.span) {
			return Err(Self::read_only(ident.span, &ident.name));
		}
		if !is_reactive_name(&ident.name) {
			return Ok(None);
		}
		let value = self.expr(&it.right)?;
		let current = get_value(&ident.name);
		let value = match (
			it.operator.to_binary_operator(),
			it.operator.to_logical_operator(),
		) {
			(Some(op), _) => binary(&current, op.as_str(), &value),
			(_, Some(op)) => binary(&current, op.as_str(), &value),
			_ => value,
		};
		Ok(Some(set_value(&ident.name, &value, None)))
	}

	/// `$a++` / `--$a` → `$.setValue($a, $.getValue($a) ± 1)`; evaluates to the new value.
	fn update(&mut self, it: &UpdateExpression<'_>) -> Result<Option<Code>> {
		let SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) = &it.argument else {
			return Ok(None);
		};
		if self.analysis.is_prop(ident.span) {
			return Err(Self::read_only(ident.span, &ident.name));
		}
		if !is_reactive_name(&ident.name) {
			return Ok(None);
		}
		let op = match it.operator {
			UpdateOperator::Increment => "+",
			UpdateOperator::Decrement => "-",
		};
		let value = binary(&get_value(&ident.name), op, &Code::number(1));
		Ok(Some(set_value(&ident.name, &value, None)))
	}

	/// `$: body` becomes `$.constructEffect(() => { body }, [deps], true);`.
	fn reactive_stmt(&mut self, it: &LabeledStatement<'_>) -> Result<String> {
		let deps = self.analysis.deps(it.span).clone();
		self.visit_statement(&it.body);
		if let Some(err) = self.error.take() {
			return Err(err);
		}
		let body = self.edits.render(it.body.span());
		let body = match &it.body {
			Statement::BlockStatement(_) => body,
			_ => {
				let indent = indentation_at(self.edits.source(), it.span.start);
				format!("{{\n{indent}\t{body}\n{indent}}}")
			}
		};
		tracing::trace!(deps = %deps, "compiled reactive statement");
		Ok(format!(
			"{}(() => {body}, {}, true);",
			rt("constructEffect"),
			self.deps_array(&deps)
		))
	}
}

impl<'a> Visit<'a> for Rewriter<'_, '_> {
	fn visit_expression(&mut self, it: &Expression<'a>) {
		if self.error.is_some() {
			return;
		}
		match it {
			Expression::Identifier(ident) => {
				if !self.analysis.deps(ident.span).is_empty() {
					self.edits.replace(ident.span, get_value(&ident.name).text);
				}
			}
			Expression::AssignmentExpression(assign) => match self.assignment(assign) {
				Ok(Some(code)) => self.edits.replace(assign.span, code.text),
				Ok(None) => walk::walk_assignment_expression(self, assign),
				Err(err) => self.fail(err),
			},
			Expression::UpdateExpression(update) => match self.update(update) {
				Ok(Some(code)) => self.edits.replace(update.span, code.text),
				Ok(None) => walk::walk_update_expression(self, update),
				Err(err) => self.fail(err),
			},
			Expression::JSXElement(element) => {
				let result = self.element(element);
				self.apply(element.span, result);
			}
			Expression::JSXFragment(fragment) => {
				let result = self.fragment(fragment);
				self.apply(fragment.span, result);
			}
			_ => walk::walk_expression(self, it),
		}
	}

	fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
		// { $a } reads the binding: { $a: $.getValue($a) }
		if it.shorthand
			&& let Expression::Identifier(ident) = &it.value
			&& !self.analysis.deps(ident.span).is_empty()
		{
			let text = format!("{}: {}", ident.name, get_value(&ident.name));
			self.edits.replace(it.span, text);
			return;
		}
		walk::walk_object_property(self, it);
	}

	fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
		match it {
			SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) => {
				if self.analysis.is_prop(ident.span) {
					self.fail(Self::read_only(ident.span, &ident.name));
				}
			}
			_ => walk::walk_simple_assignment_target(self, it),
		}
	}

	fn visit_assignment_target_property_identifier(
		&mut self,
		it: &AssignmentTargetPropertyIdentifier<'a>,
	) {
		if self.analysis.is_prop(it.binding.span) {
			self.fail(Self::read_only(it.binding.span, &it.binding.name));
			return;
		}
		if let Some(init) = &it.init {
			self.visit_expression(init);
		}
	}

	fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
		let BindingPattern::BindingIdentifier(id) = &it.id else {
			return walk::walk_variable_declarator(self, it);
		};
		let name = id.name.as_str();
		let reactive = is_reactive_name(name);
		let stateful = is_stateful_array_name(name);
		match &it.init {
			Some(init) if reactive => {
				let result = self.binding_init(init);
				self.apply(init.span(), result);
			}
			Some(init) if stateful => {
				let result = self.stateful_array_init(init);
				self.apply(init.span(), result);
			}
			None if reactive => {
				let text = format!("{name} = {}", rt_call("createBinding", &[]));
				self.edits.replace(id.span, text);
			}
			None if stateful => {
				let text = format!("{name} = {}", rt_call("statefulArray", &[array(&[])]));
				self.edits.replace(id.span, text);
			}
			_ => walk::walk_variable_declarator(self, it),
		}
	}

	fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
		let prelude = match self.enter_component(it.span, &it.params) {
			Ok(Some(prelude)) => prelude,
			Ok(None) => return walk::walk_function(self, it, flags),
			Err(err) => return self.fail(err),
		};
		if let Some(body) = &it.body {
			self.insert_prelude(it.span, body, &prelude);
			self.visit_function_body(body);
		}
		self.components.pop();
	}

	fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
		let prelude = match self.enter_component(it.span, &it.params) {
			Ok(Some(prelude)) => prelude,
			Ok(None) => return walk::walk_arrow_function_expression(self, it),
			Err(err) => return self.fail(err),
		};
		match it.get_expression() {
			// expression body: a block returning it
			Some(expr) if it.expression => match self.expr(expr) {
				Ok(value) => {
					let indent = indentation_at(self.edits.source(), it.span.start);
					let mut text = String::from("{");
					for line in &prelude {
						text.push_str(&format!("\n{indent}\t{line}"));
					}
					text.push_str(&format!("\n{indent}\treturn {value};\n{indent}}}"));
					self.edits.replace(expr.span(), text);
				}
				Err(err) => self.fail(err),
			},
			_ => {
				self.insert_prelude(it.span, &it.body, &prelude);
				self.visit_function_body(&it.body);
			}
		}
		self.components.pop();
	}

	fn visit_labeled_statement(&mut self, it: &LabeledStatement<'a>) {
		if it.label.name != REACTIVE_LABEL {
			return walk::walk_labeled_statement(self, it);
		}
		match self.reactive_stmt(it) {
			Ok(text) => self.edits.replace(it.span, text),
			Err(err) => self.fail(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const HEADER: &str = "// pompe abi v1\nimport * as $ from \"pompe/runtime\";\n";

	fn compiled(source: &str) -> String {
		let out = compile_source(source, &CompilerConfig::default()).unwrap();
		out.strip_prefix(HEADER).unwrap().trim_end().to_string()
	}

	#[rstest]
	#[case("let $count = 0;", "let $count = $.createBinding(0);")]
	#[case("let $name;", "let $name = $.createBinding();")]
	#[case(
		"let $double = $count * 2;",
		"let $double = $.createBinding(() => $.getValue($count) * 2, [$count]);"
	)]
	#[case("let $$todos = [];", "let $$todos = $.statefulArray([]);")]
	#[case("let $$todos;", "let $$todos = $.statefulArray([]);")]
	#[case(
		"let $$grid = (3, (i) => i * 2);",
		"let $$grid = $.statefulArray(3, (i) => i * 2);"
	)]
	#[case("$count = 5;", "$.setValue($count, 5);")]
	#[case("$count += 2;", "$.setValue($count, $.getValue($count) + 2);")]
	#[case("$count *= a + b;", "$.setValue($count, $.getValue($count) * (a + b));")]
	#[case("$flag ||= x;", "$.setValue($flag, $.getValue($flag) || x);")]
	#[case("$count++;", "$.setValue($count, $.getValue($count) + 1);")]
	#[case("--$count;", "$.setValue($count, $.getValue($count) - 1);")]
	#[case("f({ $count });", "f({ $count: $.getValue($count) });")]
	#[case("f({ $count: 1, a });", "f({ $count: 1, a });")]
	#[case("$$todos.push(1);", "$$todos.push(1);")]
	#[case("$user.name = x;", "$.getValue($user).name = x;")]
	fn test_rewrites(#[case] source: &str, #[case] expected: &str) {
		assert_eq!(compiled(source), expected);
	}

	#[rstest]
	#[case("class A extends B {\n\t#x = 1;\n\tget x() { return this.#x; }\n}")]
	#[case("try {\n\tf();\n} catch (e) {\n\tg(e);\n} finally {\n\th();\n}")]
	#[case("do {\n\ti++;\n} while (i < 3);")]
	#[case("switch (k) {\n\tcase 1: f(); break;\n\tdefault: g();\n}")]
	#[case("const f = async () => {\n\tawait g();\n};")]
	#[case("const re = /a+/g;")]
	#[case("const p = 2 ** 3;")]
	#[case("for (const x of xs) {\n\tuse(x);\n}")]
	#[case("label: for (;;) {\n\tbreak label;\n}")]
	fn test_plain_code_is_preserved(#[case] source: &str) {
		assert_eq!(compiled(source), source);
	}

	#[rstest]
	fn test_reactive_reads_inside_untouched_constructs() {
		assert_eq!(
			compiled("class A {\n\tv = $a;\n}\ntry { f($b); } catch { }"),
			"class A {\n\tv = $.getValue($a);\n}\ntry { f($.getValue($b)); } catch { }"
		);
	}

	#[rstest]
	fn test_reactive_statement_becomes_effect() {
		assert_eq!(
			compiled("$: console.log($b, $a);"),
			"$.constructEffect(() => {\n\tconsole.log($.getValue($b), $.getValue($a));\n}, [$a, $b], true);"
		);
	}

	#[rstest]
	fn test_reactive_block_keeps_its_braces() {
		assert_eq!(
			compiled("$: {\n\tconst d = $a * 2;\n\tlog(d);\n}"),
			"$.constructEffect(() => {\n\tconst d = $.getValue($a) * 2;\n\tlog(d);\n}, [$a], true);"
		);
	}

	#[rstest]
	fn test_runtime_import_is_injected() {
		let config = CompilerConfig {
			runtime_module: "/rt.js".into(),
			..CompilerConfig::default()
		};
		let out = compile_source("let a = 1;", &config).unwrap();
		assert_eq!(out, "// pompe abi v1\nimport * as $ from \"/rt.js\";\nlet a = 1;\n");
	}

	#[rstest]
	#[case("function Card({ title }) { title = 1; }")]
	#[case("function Card({ title }) { title++; }")]
	#[case("function Card({ title }) { [title] = xs; }")]
	#[case("function Card({ title }) { ({ title } = o); }")]
	fn test_prop_mutation_is_rejected(#[case] source: &str) {
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let err = compile(&program, &CompilerConfig::default()).unwrap_err();
		assert_eq!(err.kind, CompileErrorKind::ReadOnlyMutation("title".into()));
	}

	#[rstest]
	fn test_string_keyed_prop_is_read_with_brackets() {
		assert_eq!(
			compiled("function Card({ \"aria-label\": label }) {\n\treturn label;\n}"),
			"function Card($props) {\n\tconst label = $props[\"aria-label\"];\n\treturn $.getValue(label);\n}"
		);
	}
}
