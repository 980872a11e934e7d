//! # pompe-compiler
//!
//! Compiles markup-embedded components into imperative calls against the
//! pompe runtime.
//!
//! ## Pipeline
//!
//! ```text
//! source ──parse──▶ Program ──analyze──▶ Analysis ──rewrite──▶ SourceEdits ──render──▶ JavaScript
//! ```
//!
//! - [`analyze`]: scopes and dependency sets, keyed by source span
//! - [`classify`]: attribute category and canonical name lookup
//! - [`group_attributes`]: one update closure per dependency signature
//! - [`compile`]: identifier, declaration and element rewriting
//!
//! Rewrites are spliced into the original text: code the compiler has no
//! reason to touch comes out exactly as written.
//!
//! ## Example
//!
//! ```
//! use pompe_compiler::{CompilerConfig, compile_source};
//!
//! let out = compile_source("let $count = 0;", &CompilerConfig::default()).unwrap();
//! assert!(out.contains("$.createBinding(0)"));
//! ```

pub mod analysis;
pub mod classify;
pub mod config;
pub mod deps;
mod element;
pub mod emit;
pub mod error;
pub mod group;
mod html_spec;
mod rewrite;
pub mod scope;

pub use analysis::{Analysis, NodeInfo, analyze};
pub use classify::{Category, Classified, Classifier, Namespace, classify};
pub use config::{
	AttributeOverride, AttributeTable, CompilerConfig, ConfigError, LocalizationConfig,
};
pub use deps::DepSet;
pub use emit::{Code, Shape};
pub use element::{MEDIA_POLL_INTERVAL_MS, TagKind};
pub use error::{CompileError, CompileErrorKind, Diagnostic, Error};
pub use group::{AttrEntry, AttrGroup, emit_groups, group_attributes};
pub use rewrite::{compile, compile_source};

/// Version of the emitted runtime call surface.
pub const ABI_VERSION: u32 = 1;
