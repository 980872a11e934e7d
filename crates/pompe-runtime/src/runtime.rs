//! Reactive runtime state.
//!
//! Every operation takes `&mut Runtime`. A mutator that sets another binding
//! runs that binding's flush inline on the same borrow, so re-entrancy needs
//! no interior mutability. Nested flushes are bounded by
//! [`RuntimeConfig::max_flush_depth`].

use crate::binding::BindingStore;
use crate::config::RuntimeConfig;
use crate::dom::Document;
use crate::effect::EffectStore;
use crate::timer::Timers;

/// Owner of the node tree, subscriber lists, effects and timers.
pub struct Runtime {
	pub(crate) config: RuntimeConfig,
	pub(crate) document: Document,
	pub(crate) bindings: BindingStore,
	pub(crate) effects: EffectStore,
	pub(crate) timers: Timers,
	pub(crate) flush_depth: usize,
	pub(crate) next_pending: u32,
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new()
	}
}

impl Runtime {
	/// Creates a runtime with the default configuration.
	pub fn new() -> Self {
		Self::with_config(RuntimeConfig::default())
	}

	/// Creates a runtime with the given configuration.
	pub fn with_config(config: RuntimeConfig) -> Self {
		Self {
			config,
			document: Document::new(),
			bindings: BindingStore::default(),
			effects: EffectStore::default(),
			timers: Timers::default(),
			flush_depth: 0,
			next_pending: 0,
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	/// The live node tree.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Mutable access to the live node tree.
	pub fn document_mut(&mut self) -> &mut Document {
		&mut self.document
	}

	/// Depth of the flush currently running, `0` outside any flush.
	pub fn flush_depth(&self) -> usize {
		self.flush_depth
	}
}
