//! Compiling source files from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::compiler::{CompilerConfig, Diagnostic, compile_source};

/// Failure to compile a file.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The file could not be read
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// The file could not be parsed or compiled
	#[error("{0}")]
	Compile(Diagnostic),
}

/// Reads, compiles and prints the file at `path`.
///
/// Failures are reported as a [`Diagnostic`] naming the file.
pub fn compile_file(
	path: impl AsRef<Path>,
	config: &CompilerConfig,
) -> Result<String, BuildError> {
	let path = path.as_ref();
	let source = fs::read_to_string(path)?;
	let name = path.display().to_string();
	tracing::debug!(file = %name, bytes = source.len(), "compiling file");
	compile_source(&source, config)
		.map_err(|error| BuildError::Compile(Diagnostic::new(&name, &source, &error)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_compile_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "let $n = 1;\n$n++;").unwrap();

		let out = compile_file(file.path(), &CompilerConfig::default()).unwrap();

		assert!(out.starts_with("// pompe abi v1\n"));
		assert!(out.contains("$.setValue($n, "));
	}

	#[rstest]
	fn test_compile_error_names_the_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "const v = <div {{...rest}} />;").unwrap();

		let err = compile_file(file.path(), &CompilerConfig::default()).unwrap_err();

		let BuildError::Compile(diagnostic) = err else {
			panic!("expected a compile error");
		};
		assert_eq!(diagnostic.file, file.path().display().to_string());
		assert_eq!(diagnostic.line, 1);
	}

	#[rstest]
	fn test_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = compile_file(dir.path().join("Missing.jsx"), &CompilerConfig::default());
		assert!(matches!(err, Err(BuildError::Io(_))));
	}
}
