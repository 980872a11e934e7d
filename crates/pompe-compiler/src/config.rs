//! Compiler configuration.
//!
//! The host toolchain passes environment flags, the prop rename table and any
//! attribute metadata overrides through [`CompilerConfig`]. Configuration can
//! be built in code or loaded from TOML:
//!
//! ```toml
//! development = false
//! runtime_module = "pompe/runtime"
//!
//! [localization]
//! locale = "fr"
//!
//! [prop_renames]
//! title = "a"
//!
//! [[attribute_table.overrides]]
//! tag = "my-chart"
//! name = "series"
//! category = "prop"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::classify::{Category, Namespace};

/// Default import path of the runtime namespace.
pub const DEFAULT_RUNTIME_MODULE: &str = "pompe/runtime";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The configuration file could not be read
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// The configuration file is not valid TOML for [`CompilerConfig`]
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Compiler options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
	/// Development build; disables prop renaming
	pub development: bool,
	/// Import path of the runtime namespace
	pub runtime_module: String,
	/// Active localization, if any
	pub localization: Option<LocalizationConfig>,
	/// Prop name optimization table, applied in optimized builds
	pub prop_renames: BTreeMap<String, String>,
	/// Host-supplied attribute metadata, consulted before the built-in tables
	pub attribute_table: Option<AttributeTable>,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			development: true,
			runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
			localization: None,
			prop_renames: BTreeMap::new(),
			attribute_table: None,
		}
	}
}

impl CompilerConfig {
	/// Parses configuration from a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	/// Reads configuration from a TOML file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Returns the emitted name of a component prop.
	pub fn prop_name<'a>(&'a self, name: &'a str) -> &'a str {
		if self.development {
			return name;
		}
		self.prop_renames
			.get(name)
			.map(String::as_str)
			.unwrap_or(name)
	}

	/// Returns the active locale, if localization is enabled.
	pub fn locale(&self) -> Option<&str> {
		self.localization.as_ref().map(|l| l.locale.as_str())
	}
}

/// Localization settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalizationConfig {
	/// Locale appended to lazily loaded module names
	pub locale: String,
}

/// Attribute metadata supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeTable {
	/// Overrides, most specific first
	pub overrides: Vec<AttributeOverride>,
}

/// A single attribute classification supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeOverride {
	/// Tag the override applies to, `None` for every tag
	#[serde(default)]
	pub tag: Option<String>,
	/// Namespace the override applies to, `None` for every namespace
	#[serde(default)]
	pub namespace: Option<Namespace>,
	/// Raw attribute name as written in markup
	pub name: String,
	/// Category to classify the attribute as
	pub category: Category,
	/// Canonical name, defaults to `name`
	#[serde(default)]
	pub canonical: Option<String>,
}

impl AttributeOverride {
	/// Returns true when this override covers `(tag, namespace, raw)`.
	pub fn matches(&self, tag: &str, namespace: Namespace, raw: &str) -> bool {
		self.name == raw
			&& self.tag.as_deref().is_none_or(|t| t == tag)
			&& self.namespace.is_none_or(|ns| ns == namespace)
	}
}
