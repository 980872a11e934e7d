//! # pompe
//!
//! A template compiler and a fine-grained reactive runtime.
//!
//! Components written with embedded markup compile to imperative calls
//! against a runtime that mutates the live node tree directly. There is no
//! virtual tree and no diffing pass: when a reactive value changes, only the
//! statements that read it run again.
//!
//! ## Feature Flags
//!
//! - `full` (default) - compiler and runtime
//! - `compiler` - parser front-end and compiler
//! - `runtime` - reactive runtime
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "compiler")]
//! # {
//! use pompe::compiler::CompilerConfig;
//!
//! let out = pompe::compile_source(
//! 	"let $count = 0;\n$: console.log($count);",
//! 	&CompilerConfig::default(),
//! )
//! .unwrap();
//! assert!(out.starts_with("// pompe abi v1\n"));
//! assert!(out.contains("$.constructEffect("));
//! # }
//! ```

#[cfg(feature = "compiler")]
pub mod ast;
#[cfg(feature = "compiler")]
pub mod compiler;
#[cfg(feature = "compiler")]
mod file;
#[cfg(feature = "runtime")]
pub mod runtime;

#[cfg(feature = "compiler")]
pub use compiler::{ABI_VERSION, compile_source};
#[cfg(feature = "compiler")]
pub use file::{BuildError, compile_file};
