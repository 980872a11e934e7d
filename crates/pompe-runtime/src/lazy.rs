//! Lazily loaded components.
//!
//! [`Runtime::construct_lazy`] reserves a region showing the optional loader.
//! The host fetches the module and settles the returned [`LazyHandle`] with
//! the component constructor or a [`LoadError`]; a failed load renders the
//! fallback instead.

use thiserror::Error;

use crate::dom::NodeId;
use crate::region::Region;
use crate::runtime::Runtime;
use crate::view::ViewContent;

/// Instantiates a loaded component.
pub type ComponentCtor = Box<dyn FnOnce(&mut Runtime) -> ViewContent>;

/// Failure to load a lazy component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
	/// No module exists at the path
	#[error("module not found: {path}")]
	NotFound { path: String },

	/// The module exists but could not be loaded or instantiated
	#[error("failed to load {path}: {message}")]
	Failed { path: String, message: String },
}

/// A pending lazy component.
#[derive(Debug)]
pub struct LazyHandle {
	path: String,
	node: NodeId,
	region: Region,
	fallback: Option<ViewContent>,
}

impl LazyHandle {
	/// Fragment to insert where the component belongs.
	pub fn node(&self) -> NodeId {
		self.node
	}

	/// Module path being loaded.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Region the component renders into.
	pub fn region(&self) -> Region {
		self.region
	}

	/// Replaces the loader with the loaded component, or with the fallback
	/// when loading failed. The error is handed back to the caller.
	pub fn resolve(
		self,
		rt: &mut Runtime,
		result: Result<ComponentCtor, LoadError>,
	) -> Result<(), LoadError> {
		let Self {
			path,
			region,
			fallback,
			..
		} = self;

		if !rt.document.is_alive(region.start) {
			tracing::debug!(path = %path, "lazy component settled after its region was cleaned up");
			if let Some(fallback) = fallback {
				rt.discard(fallback);
			}
			return result.map(|_| ());
		}

		match result {
			Ok(ctor) => {
				tracing::debug!(path = %path, "lazy component loaded");
				let content = ctor(rt);
				rt.replace_region(region, content);
				if let Some(fallback) = fallback {
					rt.discard(fallback);
				}
				Ok(())
			}
			Err(error) => {
				tracing::warn!(path = %path, %error, "lazy component failed to load");
				rt.replace_region(region, fallback.unwrap_or_default());
				Err(error)
			}
		}
	}
}

impl Runtime {
	/// Reserves a region for the component at `path`, showing `loader` until
	/// the handle is settled.
	pub fn construct_lazy(
		&mut self,
		path: impl Into<String>,
		loader: Option<ViewContent>,
		fallback: Option<ViewContent>,
	) -> LazyHandle {
		let node = self.document.create_fragment();
		let region = self.create_region(node, None);
		if let Some(loader) = loader {
			self.insert_content(node, Some(region.end), loader);
		}
		LazyHandle {
			path: path.into(),
			node,
			region,
			fallback,
		}
	}
}
