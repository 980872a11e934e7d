//! Front-end integration tests
//!
//! Covers:
//! 1. Modern syntax accepted by the parser front-end
//! 2. Markup elements, namespaced attributes and construct tags
//! 3. Parse errors with source locations
//! 4. Span edits rendered back over the source

use pompe_ast::ast::*;
use pompe_ast::*;
use proptest::prelude::*;
use rstest::rstest;

fn statement_count(source: &str) -> usize {
	let allocator = Allocator::default();
	parse(&allocator, source).unwrap().body.len()
}

fn with_element<R>(source: &str, check: impl FnOnce(&JSXElement<'_>) -> R) -> R {
	let allocator = Allocator::default();
	let program = parse(&allocator, source).unwrap();
	let Statement::ExpressionStatement(stmt) = &program.body[0] else {
		panic!("expected expression statement");
	};
	let Expression::JSXElement(element) = stmt.expression.without_parentheses() else {
		panic!("expected element");
	};
	check(element)
}

// ============================================================================
// Syntax coverage
// ============================================================================

#[rstest]
#[case("const f = async () => { await g(); };", 1)]
#[case("const re = /a+/g;", 1)]
#[case("switch (x) { case 1: y(); break; default: z(); }", 1)]
#[case("const n = 2 ** 3;", 1)]
#[case("for (const x of xs) { use(x); }", 1)]
#[case("class Counter extends Base { #n = 0; get n() { return this.#n; } }", 1)]
#[case("try { risky(); } catch (e) { log(e); } finally { done(); }", 1)]
#[case("do { i++; } while (i < 3)", 1)]
#[case("let $count = 0\n$: console.log($count)\nexport default $count", 3)]
#[case("const v = a?.b ?? `t${c}`;", 1)]
fn test_modern_syntax_parses(#[case] source: &str, #[case] statements: usize) {
	assert_eq!(statement_count(source), statements);
}

#[rstest]
fn test_reactive_label() {
	let allocator = Allocator::default();
	let program = parse(&allocator, "$: console.log($count);").unwrap();
	let Statement::LabeledStatement(labeled) = &program.body[0] else {
		panic!("expected labeled statement");
	};
	assert_eq!(labeled.label.name, "$");
}

// ============================================================================
// Markup
// ============================================================================

#[rstest]
fn test_namespaced_attributes() {
	with_element("<input bind:value={$name} style:font-size={10} disabled />;", |element| {
		let names: Vec<String> = element
			.opening_element
			.attributes
			.iter()
			.map(|item| match item {
				JSXAttributeItem::Attribute(attr) => match &attr.name {
					JSXAttributeName::Identifier(id) => id.name.to_string(),
					JSXAttributeName::NamespacedName(ns) => {
						format!("{}:{}", ns.namespace.name, ns.name.name)
					}
				},
				JSXAttributeItem::SpreadAttribute(_) => "...".to_string(),
			})
			.collect();
		assert_eq!(names, ["bind:value", "style:font-size", "disabled"]);
	});
}

#[rstest]
#[case("<for of={$$xs}>{(x) => x}</for>;", "for")]
#[case("<t id=\"hi\">Hello</t>;", "t")]
#[case("<ui.Card />;", "ui.Card")]
#[case("<$Page />;", "$Page")]
fn test_tag_names(#[case] source: &str, #[case] expected: &str) {
	with_element(source, |element| {
		assert_eq!(element.opening_element.name.span().source_text(source), expected);
	});
}

#[rstest]
fn test_placeholder_container_span_covers_braces() {
	let source = "<t id=\"g\">Hi { name }!</t>;";
	with_element(source, |element| {
		let spans: Vec<&str> = element
			.children
			.iter()
			.map(|child| child.span().source_text(source))
			.collect();
		assert_eq!(spans, ["Hi ", "{ name }", "!"]);
	});
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("let = ;")]
#[case("const v = <div>;")]
#[case("function (")]
fn test_syntax_errors_fail_fast(#[case] source: &str) {
	let allocator = Allocator::default();
	let err = parse(&allocator, source).unwrap_err();
	assert!(!err.message.is_empty());
	assert!(err.span.end as usize <= source.len());
}

#[rstest]
fn test_error_location_maps_to_line() {
	let source = "let ok = 1;\nlet = 2;";
	let allocator = Allocator::default();
	let err = parse(&allocator, source).unwrap_err();
	let location = LineMap::new(source).location(err.span.start);
	assert_eq!(location.line, 2);
}

// ============================================================================
// Rendering
// ============================================================================

#[rstest]
fn test_edit_inside_untouched_statements() {
	let source = "class A { m() { return x; } }\ntry { f(x); } catch (e) {}";
	let allocator = Allocator::default();
	let program = parse(&allocator, source).unwrap();
	let Statement::TryStatement(stmt) = &program.body[1] else {
		panic!("expected try statement");
	};
	let Statement::ExpressionStatement(call) = &stmt.block.body[0] else {
		panic!("expected call");
	};
	let mut edits = SourceEdits::new(source);
	edits.replace(call.expression.span(), "g(x)");
	assert_eq!(
		edits.render_all(),
		"class A { m() { return x; } }\ntry { g(x); } catch (e) {}"
	);
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: a unit nobody edits renders back byte for byte
	#[test]
	fn test_unedited_source_is_verbatim(
		names in prop::collection::vec("[a-z][a-z0-9]{0,5}", 1..6),
		spaces in 0usize..3,
	) {
		prop_assume!(names.iter().all(|n| !matches!(
			n.as_str(),
			"do" | "if" | "in" | "for" | "let" | "new" | "try" | "var" | "case" | "else" | "enum"
				| "null" | "this" | "true" | "void" | "with" | "break" | "catch" | "class"
				| "const" | "false" | "super" | "throw" | "while" | "yield" | "delete"
				| "export" | "import" | "public" | "return" | "static" | "switch" | "typeof"
				| "await"
		)));
		let pad = " ".repeat(spaces);
		let source: String = names
			.iter()
			.map(|n| format!("let {n}{pad}={pad}{n}_v;\n"))
			.collect();
		let allocator = Allocator::default();
		prop_assert!(parse(&allocator, &source).is_ok());
		prop_assert_eq!(SourceEdits::new(&source).render_all(), source);
	}
}
