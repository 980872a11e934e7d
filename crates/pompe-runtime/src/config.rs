//! Runtime configuration.

use serde::Deserialize;

/// Default bound on nested flushes.
pub const DEFAULT_MAX_FLUSH_DEPTH: usize = 64;

/// Default media polling period in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 250;

/// Runtime options.
///
/// ```
/// use pompe_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::from_json_str(r#"{ "max_flush_depth": 8 }"#).unwrap();
/// assert_eq!(config.max_flush_depth, 8);
/// assert_eq!(config.poll_interval_ms, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
	/// Maximum number of flushes running inside one another
	pub max_flush_depth: usize,
	/// Period of the interval that polls a playing media element
	pub poll_interval_ms: u32,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			max_flush_depth: DEFAULT_MAX_FLUSH_DEPTH,
			poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
		}
	}
}

impl RuntimeConfig {
	/// Parses configuration from a JSON document.
	pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(content)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = RuntimeConfig::default();
		assert_eq!(config.max_flush_depth, 64);
		assert_eq!(config.poll_interval_ms, 250);
	}

	#[rstest]
	fn test_unknown_field_rejected() {
		assert!(RuntimeConfig::from_json_str(r#"{ "depth": 1 }"#).is_err());
	}
}
