//! Template compiler
//!
//! This module provides access to pompe-compiler.
//!
//! ## Pipeline
//!
//! - **Dependency Analyzer**: sorted reactive reads per expression
//! - **Attribute Classifier**: category and canonical name per attribute
//! - **Attribute Grouper**: one update closure per dependency signature
//! - **Element Codegen**: runtime calls per tag kind
//!
//! ## Example
//!
//! ```rust
//! use pompe::compiler::{CompilerConfig, compile_source};
//!
//! let config = CompilerConfig::from_toml_str("development = true").unwrap();
//! let out = compile_source("let $$todos = [];", &config).unwrap();
//! assert!(out.contains("$.statefulArray([])"));
//! ```

// Re-export all pompe-compiler functionality
pub use pompe_compiler::*;
