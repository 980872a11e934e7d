//! Hot component rebinding.
//!
//! Swapping live subtrees for newly compiled components sits behind
//! [`RebindStrategy`], so bindings, views and cleanup never know about it.
//! [`RegionRebinder`] mounts each component instance inside its own region
//! and rebinding replaces the region contents.

use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::region::Region;
use crate::runtime::Runtime;
use crate::view::ViewContent;

/// Renders a component instance.
pub type ComponentFactory = Rc<dyn Fn(&mut Runtime) -> ViewContent>;

/// One live instance of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage<'a> {
	/// Component name
	pub component: &'a str,
	/// Region holding the instance
	pub region: Region,
}

/// Replaces live component instances with new implementations.
pub trait RebindStrategy {
	/// Live instances that could be rebound.
	fn describe_usages(&self, rt: &Runtime) -> Vec<Usage<'_>>;

	/// Re-renders every live instance of `component` with `factory`.
	/// Returns the number of instances replaced.
	fn rebind(&mut self, rt: &mut Runtime, component: &str, factory: ComponentFactory) -> usize;
}

/// Region-per-instance rebinding.
#[derive(Default)]
pub struct RegionRebinder {
	mounts: Vec<(String, Region)>,
}

impl fmt::Debug for RegionRebinder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegionRebinder")
			.field("mounts", &self.mounts.len())
			.finish()
	}
}

impl RegionRebinder {
	/// Creates a rebinder with no instances.
	pub fn new() -> Self {
		Self::default()
	}

	/// Renders an instance of `component` inside a new region. Returns the
	/// fragment to insert.
	pub fn mount(
		&mut self,
		rt: &mut Runtime,
		component: &str,
		factory: &ComponentFactory,
	) -> NodeId {
		let fragment = rt.document.create_fragment();
		let region = rt.create_region(fragment, None);
		let content = factory(rt);
		rt.insert_content(fragment, Some(region.end), content);
		self.mounts.push((component.to_string(), region));
		fragment
	}
}

impl RebindStrategy for RegionRebinder {
	fn describe_usages(&self, rt: &Runtime) -> Vec<Usage<'_>> {
		self.mounts
			.iter()
			.filter(|(_, region)| rt.document.is_alive(region.start))
			.map(|(component, region)| Usage {
				component,
				region: *region,
			})
			.collect()
	}

	fn rebind(&mut self, rt: &mut Runtime, component: &str, factory: ComponentFactory) -> usize {
		self.mounts
			.retain(|(_, region)| rt.document.is_alive(region.start));
		let regions: Vec<Region> = self
			.mounts
			.iter()
			.filter(|(name, _)| name == component)
			.map(|(_, region)| *region)
			.collect();
		for region in &regions {
			let content = factory(rt);
			rt.replace_region(*region, content);
		}
		tracing::debug!(component, instances = regions.len(), "rebound component");
		regions.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn text(value: &'static str) -> ComponentFactory {
		Rc::new(move |_: &mut Runtime| ViewContent::from(value))
	}

	#[rstest]
	fn test_rebind_replaces_live_instances() {
		let mut rt = Runtime::new();
		let mut rebinder = RegionRebinder::new();
		let body = rt.document().body();
		for name in ["Card", "Card", "Nav"] {
			let fragment = rebinder.mount(&mut rt, name, &text("old"));
			rt.document_mut().append_child(body, fragment);
		}
		assert_eq!(rebinder.describe_usages(&rt).len(), 3);

		let replaced = rebinder.rebind(&mut rt, "Card", text("new"));

		assert_eq!(replaced, 2);
		assert_eq!(rt.document().text_content(body), "newnewold");
	}

	#[rstest]
	fn test_cleaned_up_instances_are_forgotten() {
		let mut rt = Runtime::new();
		let mut rebinder = RegionRebinder::new();
		let body = rt.document().body();
		let fragment = rebinder.mount(&mut rt, "Card", &text("old"));
		rt.document_mut().append_child(body, fragment);
		let start = rebinder.describe_usages(&rt)[0].region.start;

		rt.cleanup(start);

		assert!(rebinder.describe_usages(&rt).is_empty());
		assert_eq!(rebinder.rebind(&mut rt, "Card", text("new")), 0);
	}
}
