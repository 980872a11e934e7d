//! Builders for the runtime call surface.
//!
//! Generated code is assembled as text. Every fragment carries a [`Shape`]
//! so builders know when a fragment needs parentheses to stay one operand.
//! Every emitted runtime reference goes through [`rt`], so the namespace
//! identifier lives in one place.

use core::fmt;

use pompe_ast::ast::{Expression, UnaryOperator};
use pompe_ast::quote_str;

/// Namespace identifier the runtime module is imported as.
pub const RUNTIME_NAMESPACE: &str = "$";

/// Parameter name of the node inside emitted mutator closures.
pub const NODE_PARAM: &str = "el$";

/// Syntactic shape of a generated fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
	/// Binds tighter than any operator: names, calls, members, arrays, parenthesized
	Primary,
	/// Numeric literal, possibly negated
	Number,
	/// String literal
	Str,
	/// Object literal
	Object,
	/// Comma sequence
	Sequence,
	/// Anything else
	Compound,
}

/// A generated JavaScript expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
	/// Source text
	pub text: String,
	/// How the text parses
	pub shape: Shape,
}

impl Code {
	/// Fragment with an explicit shape.
	pub fn new(text: impl Into<String>, shape: Shape) -> Self {
		Self {
			text: text.into(),
			shape,
		}
	}

	/// Primary fragment.
	pub fn primary(text: impl Into<String>) -> Self {
		Self::new(text, Shape::Primary)
	}

	/// String literal for `value`.
	pub fn str(value: &str) -> Self {
		Self::new(quote_str(value), Shape::Str)
	}

	/// Numeric literal.
	pub fn number(value: impl fmt::Display) -> Self {
		Self::new(value.to_string(), Shape::Number)
	}

	/// Rendered text of a source expression, shaped after that expression.
	pub fn of(expr: &Expression<'_>, text: String) -> Self {
		Self::new(text, shape_of(expr))
	}

	/// Text usable as a call argument or array element.
	pub fn arg(&self) -> String {
		self.wrapped(matches!(self.shape, Shape::Sequence))
	}

	/// Text usable as a binary operand or callee.
	pub fn operand(&self) -> String {
		self.wrapped(matches!(self.shape, Shape::Sequence | Shape::Compound))
	}

	/// Text usable as a concise arrow body.
	pub fn arrow_body(&self) -> String {
		self.wrapped(matches!(self.shape, Shape::Sequence | Shape::Object))
	}

	fn wrapped(&self, wrap: bool) -> String {
		if wrap {
			format!("({})", self.text)
		} else {
			self.text.clone()
		}
	}
}

impl fmt::Display for Code {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Shape of a source expression as written.
pub fn shape_of(expr: &Expression<'_>) -> Shape {
	match expr {
		Expression::NumericLiteral(_) => Shape::Number,
		Expression::UnaryExpression(unary)
			if matches!(
				unary.operator,
				UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus
			) && matches!(unary.argument, Expression::NumericLiteral(_)) =>
		{
			Shape::Number
		}
		Expression::StringLiteral(_) => Shape::Str,
		Expression::ObjectExpression(_) => Shape::Object,
		Expression::SequenceExpression(_) => Shape::Sequence,
		Expression::Identifier(_)
		| Expression::ThisExpression(_)
		| Expression::BooleanLiteral(_)
		| Expression::NullLiteral(_)
		| Expression::BigIntLiteral(_)
		| Expression::RegExpLiteral(_)
		| Expression::TemplateLiteral(_)
		| Expression::ArrayExpression(_)
		| Expression::ParenthesizedExpression(_)
		| Expression::CallExpression(_)
		| Expression::NewExpression(_)
		| Expression::ChainExpression(_)
		| Expression::ImportExpression(_)
		| Expression::StaticMemberExpression(_)
		| Expression::ComputedMemberExpression(_)
		| Expression::PrivateFieldExpression(_)
		| Expression::TaggedTemplateExpression(_)
		| Expression::JSXElement(_)
		| Expression::JSXFragment(_) => Shape::Primary,
		_ => Shape::Compound,
	}
}

/// `$.name`
pub fn rt(name: &str) -> String {
	format!("{RUNTIME_NAMESPACE}.{name}")
}

/// `$.name(args…)`
pub fn rt_call(name: &str, args: &[Code]) -> Code {
	Code::primary(format!("{}({})", rt(name), join_args(args)))
}

/// `callee(args…)`
pub fn call(callee: &Code, args: &[Code]) -> Code {
	Code::primary(format!("{}({})", callee.operand(), join_args(args)))
}

fn join_args(args: &[Code]) -> String {
	args.iter().map(Code::arg).collect::<Vec<_>>().join(", ")
}

/// `$.getValue(target)`
pub fn get_value(target: &str) -> Code {
	rt_call("getValue", &[Code::primary(target)])
}

/// `$.setValue(target, value[, origin])`
pub fn set_value(target: &str, value: &Code, origin: Option<&str>) -> Code {
	let mut args = vec![Code::primary(target), value.clone()];
	args.extend(origin.map(Code::primary));
	rt_call("setValue", &args)
}

/// `el$.name`
pub fn node_prop(name: &str) -> String {
	format!("{NODE_PARAM}.{name}")
}

/// `target = value`
pub fn assign(target: &str, value: &Code) -> Code {
	Code::new(format!("{target} = {}", value.arg()), Shape::Compound)
}

/// `left op right`
pub fn binary(left: &Code, op: &str, right: &Code) -> Code {
	Code::new(
		format!("{} {op} {}", left.operand(), right.operand()),
		Shape::Compound,
	)
}

/// `(params) => body`
pub fn arrow(params: &[&str], body: &Code) -> Code {
	Code::new(
		format!("({}) => {}", params.join(", "), body.arrow_body()),
		Shape::Compound,
	)
}

/// `(params) => { a; b; }` on one line.
pub fn arrow_block(params: &[&str], body: &[String]) -> Code {
	Code::new(
		format!("({}) => {}", params.join(", "), block(body)),
		Shape::Compound,
	)
}

/// `{ a; b; }` on one line; `{}` when empty.
pub fn block(body: &[String]) -> String {
	if body.is_empty() {
		return "{}".to_string();
	}
	format!("{{ {} }}", body.join(" "))
}

/// `() => expr`
pub fn thunk(expr: &Code) -> Code {
	arrow(&[], expr)
}

/// Expression statement for `expr`.
pub fn stmt(expr: &Code) -> String {
	match expr.shape {
		Shape::Object => format!("({});", expr.text),
		_ => format!("{};", expr.text),
	}
}

/// `[a, b]`
pub fn array(items: &[Code]) -> Code {
	Code::primary(format!("[{}]", join_args(items)))
}

/// `{ key: value, … }`
pub fn object(entries: &[(String, Code)]) -> Code {
	if entries.is_empty() {
		return Code::new("{}", Shape::Object);
	}
	let body = entries
		.iter()
		.map(|(key, value)| format!("{}: {}", object_key(key), value.arg()))
		.collect::<Vec<_>>()
		.join(", ");
	Code::new(format!("{{ {body} }}"), Shape::Object)
}

/// Identifier key when `key` is a valid identifier, string key otherwise.
pub fn object_key(key: &str) -> String {
	let valid = key
		.chars()
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
		&& key
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
	if valid {
		key.to_string()
	} else {
		quote_str(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_set_value_with_origin() {
		let call = set_value("$a", &Code::number(1), Some(NODE_PARAM));
		assert_eq!(call.text, "$.setValue($a, 1, el$)");
	}

	#[rstest]
	fn test_object_keys() {
		let obj = object(&[
			("title".into(), Code::number(1)),
			("aria-label".into(), Code::number(2)),
		]);
		assert_eq!(obj.text, "{ title: 1, \"aria-label\": 2 }");
	}

	#[rstest]
	#[case(Shape::Sequence, "a, b", "(a, b)", "(a, b)")]
	#[case(Shape::Compound, "a + b", "(a + b)", "a + b")]
	#[case(Shape::Object, "{ a: 1 }", "{ a: 1 }", "({ a: 1 })")]
	#[case(Shape::Primary, "f(x)", "f(x)", "f(x)")]
	fn test_wrapping(
		#[case] shape: Shape,
		#[case] text: &str,
		#[case] as_operand: &str,
		#[case] as_body: &str,
	) {
		let code = Code::new(text, shape);
		assert_eq!(code.operand(), as_operand);
		assert_eq!(code.arrow_body(), as_body);
	}

	#[rstest]
	fn test_single_line_blocks() {
		let body = vec!["first(e);".to_string(), "second(e);".to_string()];
		assert_eq!(arrow_block(&["e"], &body).text, "(e) => { first(e); second(e); }");
		assert_eq!(arrow_block(&[], &[]).text, "() => {}");
	}

	#[rstest]
	fn test_compound_callee_is_wrapped() {
		let handler = arrow(&["x"], &Code::primary("x"));
		assert_eq!(call(&handler, &[Code::primary("el$")]).text, "((x) => x)(el$)");
	}
}
