//! Dependency analyzer.
//!
//! One pass over a source unit computes, for every expression, element and
//! reactive statement, the set of reactive values it reads. Results go into
//! an [`Analysis`] side-table keyed by source [`Span`]; the tree itself is
//! never annotated, and the table is read-only once built.
//!
//! ## Rules
//!
//! An identifier counts when it follows the reactive naming convention
//! (`$name`) or resolves to an unshadowed component prop. It does not count
//! as a declaration or assignment target, a label, a parameter or a property
//! key.
//!
//! A markup element whose tag is itself reactive (`<$Page />`) contributes
//! only its tag: the selected component tracks its own reads.
//!
//! Pure literals and function values are flagged static, meaning they never
//! need wrapping whatever their dependency set says.

use std::collections::{HashMap, HashSet};

use oxc_ast_visit::{Visit, walk};
use oxc_syntax::scope::ScopeFlags;
use pompe_ast::ast::*;
use pompe_ast::{GetSpan, Span};

use crate::deps::DepSet;
use crate::error::{CompileError, Result};
use crate::scope::{
	REACTIVE_LABEL, Scope, Symbol, component_props, is_component_name, is_reactive_name,
};

/// Analysis results for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInfo {
	/// Reactive values read by the node
	pub deps: DepSet,
	/// Literal or function value; never needs tracking
	pub is_static: bool,
}

/// Side-table produced by [`analyze`].
#[derive(Debug, Default)]
pub struct Analysis {
	info: HashMap<Span, NodeInfo>,
	props: HashSet<Span>,
	components: HashSet<Span>,
}

static EMPTY: NodeInfo = NodeInfo {
	deps: DepSet::EMPTY,
	is_static: false,
};

impl Analysis {
	/// Results for the node at `span`; unknown nodes read nothing.
	pub fn info(&self, span: Span) -> &NodeInfo {
		self.info.get(&span).unwrap_or(&EMPTY)
	}

	/// Reactive values read by the node at `span`.
	pub fn deps(&self, span: Span) -> &DepSet {
		&self.info(span).deps
	}

	/// Returns true if the node at `span` is a literal or function value.
	pub fn is_static(&self, span: Span) -> bool {
		self.info(span).is_static
	}

	/// Dependencies that need tracking: empty for static nodes.
	pub fn tracked(&self, span: Span) -> DepSet {
		let info = self.info(span);
		if info.is_static {
			DepSet::new()
		} else {
			info.deps.clone()
		}
	}

	/// Returns true if the identifier at `span` refers to a component prop.
	pub fn is_prop(&self, span: Span) -> bool {
		self.props.contains(&span)
	}

	/// Returns true if the function at `span` is compiled as a component.
	pub fn is_component(&self, span: Span) -> bool {
		self.components.contains(&span)
	}

	/// Number of analysed nodes.
	pub fn len(&self) -> usize {
		self.info.len()
	}

	/// Returns true if nothing was analysed.
	pub fn is_empty(&self) -> bool {
		self.info.is_empty()
	}
}

/// Analyzes a whole source unit.
pub fn analyze(program: &Program<'_>) -> Result<Analysis> {
	let mut analyzer = Analyzer {
		scope: Scope::new(),
		stack: vec![DepSet::new()],
		out: Analysis::default(),
		error: None,
	};
	analyzer.visit_program(program);
	if let Some(err) = analyzer.error {
		return Err(err);
	}
	tracing::trace!(
		nodes = analyzer.out.len(),
		components = analyzer.out.components.len(),
		"analysed source unit"
	);
	Ok(analyzer.out)
}

/// Returns true if `expr` is a pure literal.
pub fn is_literal(expr: &Expression<'_>) -> bool {
	match expr {
		Expression::TemplateLiteral(template) => template.expressions.is_empty(),
		Expression::Identifier(ident) => ident.name == "undefined",
		Expression::UnaryExpression(unary) => {
			matches!(
				unary.operator,
				UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus
			) && matches!(unary.argument, Expression::NumericLiteral(_))
		}
		Expression::ParenthesizedExpression(paren) => is_literal(&paren.expression),
		other => other.is_literal(),
	}
}

struct Analyzer {
	scope: Scope,
	/// One accumulator per node being visited
	stack: Vec<DepSet>,
	out: Analysis,
	error: Option<CompileError>,
}

impl Analyzer {
	fn read(&mut self, name: &str) {
		if let Some(top) = self.stack.last_mut() {
			top.insert(name);
		}
	}

	fn fail(&mut self, err: CompileError) {
		self.error.get_or_insert(err);
	}

	/// Runs `visit` with a fresh accumulator, merges what it read into the
	/// enclosing node and returns it.
	fn collect(&mut self, visit: impl FnOnce(&mut Self)) -> DepSet {
		self.stack.push(DepSet::new());
		visit(self);
		let deps = self.stack.pop().unwrap_or_default();
		if let Some(top) = self.stack.last_mut() {
			top.extend(&deps);
		}
		deps
	}

	fn record(&mut self, span: Span, deps: DepSet, is_static: bool) {
		self.out.info.insert(span, NodeInfo { deps, is_static });
	}

	/// Runs `visit` in a nested frame; names it declares stop being reads.
	fn framed(&mut self, visit: impl FnOnce(&mut Self)) {
		self.stack.push(DepSet::new());
		self.scope.push();
		visit(self);
		let frame = self.scope.pop();
		let mut deps = self.stack.pop().unwrap_or_default();
		deps.retain(|name| !frame.contains_key(name));
		if let Some(top) = self.stack.last_mut() {
			top.extend(&deps);
		}
	}

	/// Shared walk of functions and arrows: parameters, then the body.
	fn function_like(
		&mut self,
		span: Span,
		params: &FormalParameters<'_>,
		body: Option<&FunctionBody<'_>>,
		own_name: Option<&str>,
	) {
		let component = self.out.is_component(span);
		let deps = self.collect(|this| {
			this.framed(|this| {
				if let Some(name) = own_name {
					this.scope.declare(name, Symbol::Local);
				}
				this.params(params, component, span);
				if let Some(body) = body {
					this.scope.hoist(&body.statements);
					this.visit_function_body(body);
				}
			});
		});
		self.record(span, deps, true);
	}

	fn params(&mut self, params: &FormalParameters<'_>, component: bool, span: Span) {
		if component {
			match component_props(params) {
				Err(err) => return self.fail(err),
				Ok(Some(props)) => {
					for prop in &props {
						if let Some(default) = prop.default {
							self.visit_expression(default);
						}
						self.scope.declare(
							prop.local,
							Symbol::Prop {
								defaulted: prop.default.is_some(),
							},
						);
					}
					tracing::trace!(
						start = span.start,
						props = props.len(),
						"declared component props"
					);
					return;
				}
				Ok(None) => {}
			}
		}
		self.visit_formal_parameters(params);
		self.scope.declare_params(params);
	}
}

impl<'a> Visit<'a> for Analyzer {
	fn visit_program(&mut self, it: &Program<'a>) {
		self.scope.hoist(&it.body);
		walk::walk_program(self, it);
	}

	fn visit_expression(&mut self, it: &Expression<'a>) {
		let deps = self.collect(|this| walk::walk_expression(this, it));
		let is_static = match it {
			Expression::ParenthesizedExpression(paren) => {
				self.out.is_static(paren.expression.span())
			}
			Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_) => true,
			other => is_literal(other),
		};
		self.record(it.span(), deps, is_static);
	}

	fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
		if is_reactive_name(&it.name) {
			self.read(&it.name);
		} else if self.scope.is_prop(&it.name) {
			self.out.props.insert(it.span);
			self.read(&it.name);
		}
	}

	fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
		match it {
			// a write, not a read
			SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) => {
				if self.scope.is_prop(&ident.name) {
					self.out.props.insert(ident.span);
				}
			}
			_ => walk::walk_simple_assignment_target(self, it),
		}
	}

	fn visit_assignment_target_property_identifier(
		&mut self,
		it: &AssignmentTargetPropertyIdentifier<'a>,
	) {
		if self.scope.is_prop(&it.binding.name) {
			self.out.props.insert(it.binding.span);
		}
		if let Some(init) = &it.init {
			self.visit_expression(init);
		}
	}

	fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
		if let BindingPattern::BindingIdentifier(id) = &it.id
			&& is_component_name(&id.name)
			&& let Some(init) = &it.init
			&& matches!(
				init,
				Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_)
			) {
			self.out.components.insert(init.span());
		}
		walk::walk_variable_declarator(self, it);
	}

	fn visit_function(&mut self, it: &Function<'a>, _flags: ScopeFlags) {
		if it.r#type == FunctionType::FunctionDeclaration
			&& it.id.as_ref().is_some_and(|id| is_component_name(&id.name))
		{
			self.out.components.insert(it.span);
		}
		let own_name = match it.r#type {
			FunctionType::FunctionExpression => it.id.as_ref().map(|id| id.name.as_str()),
			_ => None,
		};
		self.function_like(it.span, &it.params, it.body.as_deref(), own_name);
	}

	fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
		self.function_like(it.span, &it.params, Some(&*it.body), None);
	}

	fn visit_block_statement(&mut self, it: &BlockStatement<'a>) {
		self.framed(|this| {
			this.scope.hoist(&it.body);
			walk::walk_block_statement(this, it);
		});
	}

	fn visit_static_block(&mut self, it: &StaticBlock<'a>) {
		self.framed(|this| {
			this.scope.hoist(&it.body);
			walk::walk_static_block(this, it);
		});
	}

	fn visit_switch_statement(&mut self, it: &SwitchStatement<'a>) {
		self.framed(|this| {
			for case in &it.cases {
				this.scope.hoist(&case.consequent);
			}
			walk::walk_switch_statement(this, it);
		});
	}

	fn visit_for_statement(&mut self, it: &ForStatement<'a>) {
		self.framed(|this| {
			if let Some(ForStatementInit::VariableDeclaration(decl)) = &it.init {
				for declarator in &decl.declarations {
					this.scope.declare_pattern(&declarator.id);
				}
			}
			walk::walk_for_statement(this, it);
		});
	}

	fn visit_for_in_statement(&mut self, it: &ForInStatement<'a>) {
		self.framed(|this| {
			if let ForStatementLeft::VariableDeclaration(decl) = &it.left {
				for declarator in &decl.declarations {
					this.scope.declare_pattern(&declarator.id);
				}
			}
			walk::walk_for_in_statement(this, it);
		});
	}

	fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
		self.framed(|this| {
			if let ForStatementLeft::VariableDeclaration(decl) = &it.left {
				for declarator in &decl.declarations {
					this.scope.declare_pattern(&declarator.id);
				}
			}
			walk::walk_for_of_statement(this, it);
		});
	}

	fn visit_catch_clause(&mut self, it: &CatchClause<'a>) {
		self.framed(|this| {
			if let Some(param) = &it.param {
				this.scope.declare_pattern(&param.pattern);
			}
			walk::walk_catch_clause(this, it);
		});
	}

	fn visit_labeled_statement(&mut self, it: &LabeledStatement<'a>) {
		let deps = self.collect(|this| walk::walk_labeled_statement(this, it));
		if it.label.name == REACTIVE_LABEL {
			self.record(it.span, deps, false);
		}
	}

	fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
		self.stack.push(DepSet::new());
		walk::walk_jsx_element(self, it);
		let mut deps = self.stack.pop().unwrap_or_default();

		// a reactive tag is an opacity boundary
		if let JSXElementName::IdentifierReference(tag) = &it.opening_element.name
			&& is_reactive_name(&tag.name)
		{
			deps = DepSet::new();
			deps.insert(tag.name.as_str());
		}
		if let Some(top) = self.stack.last_mut() {
			top.extend(&deps);
		}
		self.record(it.span, deps, false);
	}

	fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
		let deps = self.collect(|this| walk::walk_jsx_fragment(this, it));
		self.record(it.span, deps, false);
	}

	fn visit_jsx_element_name(&mut self, _it: &JSXElementName<'a>) {}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pompe_ast::{Allocator, parse};
	use rstest::rstest;

	fn first_expression<'p, 'a>(program: &'p Program<'a>) -> &'p Expression<'a> {
		match &program.body[0] {
			Statement::ExpressionStatement(stmt) => &stmt.expression,
			other => panic!("expected expression statement, got {:?}", other.span()),
		}
	}

	fn expr_deps(source: &str) -> (Vec<String>, bool) {
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let analysis = analyze(&program).unwrap();
		let info = analysis.info(first_expression(&program).span());
		(
			info.deps.iter().map(str::to_string).collect(),
			info.is_static,
		)
	}

	#[rstest]
	#[case("$b + $a", &["$a", "$b"])]
	#[case("$a + $a * 2", &["$a"])]
	#[case("$user.name", &["$user"])]
	#[case("obj.$notRead", &[])]
	#[case("({ $key: 1 })", &[])]
	#[case("({ $a })", &["$a"])]
	#[case("$$todos.length", &[])]
	#[case("$a = $b", &["$b"])]
	#[case("$a++", &[])]
	#[case("(x) => x + $a", &["$a"])]
	#[case("($item) => $item", &[])]
	#[case("async () => { await $a; }", &["$a"])]
	#[case("$n ** 2", &["$n"])]
	#[case("<p class={$cls}>{$text}</p>", &["$cls", "$text"])]
	#[case("<$Page title={$title}>{$body}</$Page>", &["$Page"])]
	#[case("<>{$a}<b>{$b}</b></>", &["$a", "$b"])]
	fn test_expression_deps(#[case] source: &str, #[case] expected: &[&str]) {
		let (deps, _) = expr_deps(source);
		assert_eq!(deps, expected);
	}

	#[rstest]
	#[case("1", true)]
	#[case("\"text\"", true)]
	#[case("-2", true)]
	#[case("(`plain`)", true)]
	#[case("/a+/g", true)]
	#[case("() => $a", true)]
	#[case("$a", false)]
	#[case("[1, 2]", false)]
	fn test_static_flag(#[case] source: &str, #[case] expected: bool) {
		assert_eq!(expr_deps(source).1, expected);
	}

	#[rstest]
	fn test_props_resolve_and_shadow() {
		let source = "function Card({ title, size = 1 }) {\n\
			\tconst a = title + size;\n\
			\tconst f = (title) => title + size;\n\
			}";
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let analysis = analyze(&program).unwrap();
		let Statement::FunctionDeclaration(func) = &program.body[0] else {
			panic!("expected function");
		};
		assert!(analysis.is_component(func.span));
		let body = func.body.as_ref().unwrap();

		let Statement::VariableDeclaration(first) = &body.statements[0] else {
			panic!("expected declaration");
		};
		let sum = first.declarations[0].init.as_ref().unwrap();
		assert_eq!(analysis.deps(sum.span()).signature(), "size,title");
		let title = source.find("title +").unwrap() as u32;
		assert!(analysis.is_prop(Span::new(title, title + 5)));

		let Statement::VariableDeclaration(second) = &body.statements[1] else {
			panic!("expected declaration");
		};
		let arrow = second.declarations[0].init.as_ref().unwrap();
		assert_eq!(analysis.deps(arrow.span()).signature(), "size");
	}

	#[rstest]
	fn test_reactive_statement_deps() {
		let allocator = Allocator::default();
		let program = parse(&allocator, "$: console.log($b, $a);").unwrap();
		let analysis = analyze(&program).unwrap();
		assert_eq!(analysis.deps(program.body[0].span()).signature(), "$a,$b");
	}

	#[rstest]
	#[case("const f = () => { let $tmp = 1; return $tmp + $outer; };")]
	#[case("const f = () => { for (const $tmp of xs) use($tmp, $outer); };")]
	#[case("const f = () => { try { g(); } catch ($tmp) { h($tmp, $outer); } };")]
	#[case("const f = () => { class $tmp {} return [$tmp, $outer]; };")]
	fn test_block_locals_do_not_leak(#[case] source: &str) {
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let analysis = analyze(&program).unwrap();
		let Statement::VariableDeclaration(decl) = &program.body[0] else {
			panic!("expected declaration");
		};
		let arrow = decl.declarations[0].init.as_ref().unwrap();
		assert_eq!(analysis.deps(arrow.span()).signature(), "$outer");
	}

	#[rstest]
	#[case("const Badge = ({ label }) => label;", true)]
	#[case("const badge = ({ label }) => label;", false)]
	#[case("const Badge = 1;", false)]
	#[case("export default function App() {}", true)]
	#[case("function helper() {}", false)]
	fn test_component_detection(#[case] source: &str, #[case] expected: bool) {
		let allocator = Allocator::default();
		let program = parse(&allocator, source).unwrap();
		let analysis = analyze(&program).unwrap();
		assert_eq!(!analysis.components.is_empty(), expected);
	}
}
