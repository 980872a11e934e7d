//! Text helpers shared by the compiler's emitters.

/// Folds raw markup text the way JSX does: lines are trimmed (except the
/// outer edges of the first and last line), blank lines dropped and the
/// remaining lines joined with a single space.
pub fn fold_markup_text(raw: &str) -> String {
	let lines: Vec<&str> = raw.split('\n').collect();
	let last = lines.len() - 1;
	let mut out = String::new();
	for (i, line) in lines.iter().enumerate() {
		let line = line.trim_end_matches('\r').replace('\t', " ");
		let mut text = line.as_str();
		if i != 0 {
			text = text.trim_start();
		}
		if i != last {
			text = text.trim_end();
		}
		if text.is_empty() {
			continue;
		}
		if !out.is_empty() {
			out.push(' ');
		}
		out.push_str(text);
	}
	out
}

/// Double-quoted JavaScript string literal for `value`.
pub fn quote_str(value: &str) -> String {
	let mut out = String::with_capacity(value.len() + 2);
	out.push('"');
	for c in value.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
				out.push_str(&format!("\\u{:04x}", c as u32));
			}
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

/// Leading whitespace of the line containing byte `offset`.
pub fn indentation_at(source: &str, offset: u32) -> &str {
	let offset = (offset as usize).min(source.len());
	let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
	let line = &source[start..];
	let end = line
		.find(|c: char| c != ' ' && c != '\t')
		.unwrap_or(line.len());
	&line[..end]
}
