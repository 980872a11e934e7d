//! # pompe-runtime
//!
//! The reactive runtime targeted by compiled pompe components.
//!
//! Bindings carry ordered subscriber runs; setting a binding runs the
//! mutators of a snapshot of its subscribers synchronously. The live tree is
//! updated in place: regions are replaced wholesale between sentinel markers,
//! with no virtual tree and no diffing.
//!
//! ## Example
//!
//! ```
//! use pompe_runtime::{Children, Namespace, Runtime, ViewContent};
//!
//! let mut rt = Runtime::new();
//! let count = rt.create_binding(0);
//! let label = count.clone();
//! let span = rt.construct(
//! 	"span",
//! 	Vec::new(),
//! 	Children::fused(move |_| ViewContent::text(label.get()), [count.id()]),
//! 	Namespace::Html,
//! );
//!
//! rt.set_value(&count, 1, None);
//! assert_eq!(rt.document().to_html(span), "<span>1</span>");
//! ```

pub mod binding;
mod cleanup;
pub mod config;
pub mod dom;
pub mod effect;
mod events;
pub mod lazy;
pub mod list;
pub mod pending;
pub mod rebind;
pub mod region;
pub mod runtime;
pub mod timer;
pub mod view;

pub use binding::{Binding, BindingId, Mutator, SubscriberEntry, Target};
pub use config::RuntimeConfig;
pub use dom::{Document, Marker, Namespace, NodeCallback, NodeId, NodeKind};
pub use effect::EffectId;
pub use lazy::{ComponentCtor, LazyHandle, LoadError};
pub use list::{ItemCtor, StatefulArray};
pub use pending::{PendingBindings, PendingId};
pub use rebind::{ComponentFactory, RebindStrategy, RegionRebinder, Usage};
pub use region::Region;
pub use runtime::Runtime;
pub use timer::TimerId;
pub use view::{Children, MutatorGroup, Thunk, ViewContent};

/// Converts a style value to pixels: numbers get a `px` suffix, anything else
/// is kept as written.
pub fn px(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::Number(number) => format!("{}px", number),
		serde_json::Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(10), "10px")]
	#[case(json!(1.5), "1.5px")]
	#[case(json!("2em"), "2em")]
	fn test_px(#[case] value: serde_json::Value, #[case] expected: &str) {
		assert_eq!(px(&value), expected);
	}
}
