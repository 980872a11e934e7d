//! Reactive bindings and their subscriber lists.
//!
//! A binding's subscriber list is a flat sequence of entries. Each *run* is a
//! [`Target`] entry followed by the mutators that belong to it:
//!
//! ```text
//! [Target(Node 4), Mutator, Mutator, Target(Effect 0), Mutator, Target(Pending 2), Mutator]
//! ```
//!
//! A target and its mutators are always contiguous, and removing a target
//! removes exactly its run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::effect::EffectId;
use crate::pending::PendingId;
use crate::runtime::Runtime;

/// Identifier of a binding's subscriber list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(u32);

impl BindingId {
	fn index(self) -> usize {
		self.0 as usize
	}
}

/// Owner of a subscriber run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
	/// A live node
	Node(NodeId),
	/// An effect handle
	Effect(EffectId),
	/// A derived binding
	Binding(BindingId),
	/// A node that does not exist yet
	Pending(PendingId),
}

/// Closure invoked with the target of its run when the binding changes.
pub type Mutator = Rc<dyn Fn(&mut Runtime, Target)>;

/// One entry of a subscriber list.
#[derive(Clone)]
pub enum SubscriberEntry {
	/// Starts a run
	Target(Target),
	/// Belongs to the closest preceding target
	Mutator(Mutator),
}

impl SubscriberEntry {
	/// Target of this entry, if it starts a run.
	pub fn target(&self) -> Option<Target> {
		match self {
			SubscriberEntry::Target(target) => Some(*target),
			SubscriberEntry::Mutator(_) => None,
		}
	}
}

impl PartialEq for SubscriberEntry {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(SubscriberEntry::Target(a), SubscriberEntry::Target(b)) => a == b,
			(SubscriberEntry::Mutator(a), SubscriberEntry::Mutator(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for SubscriberEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubscriberEntry::Target(target) => f.debug_tuple("Target").field(target).finish(),
			SubscriberEntry::Mutator(mutator) => {
				write!(f, "Mutator({:p})", Rc::as_ptr(mutator) as *const ())
			}
		}
	}
}

/// A reactive value.
///
/// The value is shared between clones; the subscriber list lives in the
/// [`Runtime`] under [`Binding::id`].
pub struct Binding<T: 'static> {
	id: BindingId,
	value: Rc<RefCell<T>>,
}

impl<T: 'static> Clone for Binding<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			value: Rc::clone(&self.value),
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binding")
			.field("id", &self.id)
			.field("value", &self.value.borrow())
			.finish()
	}
}

impl<T: 'static> Binding<T> {
	/// Identifier of the subscriber list.
	pub fn id(&self) -> BindingId {
		self.id
	}

	/// Current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Reads the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}
}

#[derive(Default)]
pub(crate) struct BindingStore {
	lists: Vec<Vec<SubscriberEntry>>,
	/// Derived binding -> bindings it re-derives from
	sources: HashMap<BindingId, Vec<BindingId>>,
}

impl BindingStore {
	fn allocate(&mut self) -> BindingId {
		let id = BindingId(self.lists.len() as u32);
		self.lists.push(Vec::new());
		id
	}

	fn list(&self, id: BindingId) -> &[SubscriberEntry] {
		self.lists.get(id.index()).map_or(&[], Vec::as_slice)
	}

	fn list_mut(&mut self, id: BindingId) -> Option<&mut Vec<SubscriberEntry>> {
		self.lists.get_mut(id.index())
	}
}

/// Flattens a dependency array, skipping absent entries and duplicates.
pub(crate) fn dep_list<I, D>(deps: I) -> Vec<BindingId>
where
	I: IntoIterator<Item = D>,
	D: Into<Option<BindingId>>,
{
	let mut out: Vec<BindingId> = Vec::new();
	for dep in deps.into_iter().filter_map(Into::into) {
		if !out.contains(&dep) {
			out.push(dep);
		}
	}
	out
}

impl Runtime {
	/// Wraps a value in a new binding.
	pub fn create_binding<T: 'static>(&mut self, value: T) -> Binding<T> {
		Binding {
			id: self.bindings.allocate(),
			value: Rc::new(RefCell::new(value)),
		}
	}

	/// Creates a binding derived from `derive`, re-derived whenever any of
	/// `deps` changes. `None` entries are ignored.
	pub fn create_derived<T, F, I, D>(&mut self, derive: F, deps: I) -> Binding<T>
	where
		T: PartialEq + 'static,
		F: Fn(&mut Runtime) -> T + 'static,
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		let initial = derive(self);
		let binding = self.create_binding(initial);
		let derived = binding.clone();
		let mutator: Mutator = Rc::new(move |rt, _| {
			let value = derive(rt);
			rt.set_value(&derived, value, None);
		});
		for dep in dep_list(deps) {
			self.subscribe(dep, Target::Binding(binding.id), Rc::clone(&mutator));
		}
		binding
	}

	/// Current value of a binding.
	pub fn get_value<T: Clone + 'static>(&self, binding: &Binding<T>) -> T {
		binding.get()
	}

	/// Stores `value` and runs every subscriber.
	///
	/// Setting a value equal to the current one runs nothing and only clears
	/// the echo guard of `origin`. Returns whether the value changed.
	pub fn set_value<T: PartialEq + 'static>(
		&mut self,
		binding: &Binding<T>,
		value: T,
		origin: Option<NodeId>,
	) -> bool {
		if *binding.value.borrow() == value {
			if let Some(origin) = origin
				&& self.document.is_alive(origin)
			{
				self.document.data_mut(origin).echo = None;
			}
			return false;
		}
		*binding.value.borrow_mut() = value;
		self.flush(binding.id);
		true
	}

	/// Mutates the value in place and runs every subscriber.
	pub fn update_value<T: 'static>(&mut self, binding: &Binding<T>, f: impl FnOnce(&mut T)) {
		f(&mut binding.value.borrow_mut());
		self.flush(binding.id);
	}

	/// Subscriber list of a binding.
	pub fn subscribers(&self, binding: BindingId) -> &[SubscriberEntry] {
		self.bindings.list(binding)
	}

	/// Adds `mutator` to the run of `target`, starting a new run at the end
	/// of the list if the target has none.
	pub fn subscribe(&mut self, binding: BindingId, target: Target, mutator: Mutator) {
		let Some(list) = self.bindings.list_mut(binding) else {
			tracing::warn!(?binding, "subscribe on unknown binding ignored");
			return;
		};
		match run_range(list, target) {
			Some((_, end)) => list.insert(end, SubscriberEntry::Mutator(mutator)),
			None => {
				list.push(SubscriberEntry::Target(target));
				list.push(SubscriberEntry::Mutator(mutator));
			}
		}
		self.record_subscription(binding, target);
	}

	/// Removes the run of `target`. Returns the number of entries removed.
	pub fn unsubscribe(&mut self, binding: BindingId, target: Target) -> usize {
		let removed = match self.bindings.list_mut(binding) {
			Some(list) => match run_range(list, target) {
				Some((start, end)) => {
					list.drain(start..end);
					end - start
				}
				None => 0,
			},
			None => 0,
		};
		if removed > 0 {
			self.forget_subscription(binding, target);
		}
		removed
	}

	/// Removes the runs of `target` from every binding it subscribes to.
	pub fn unsubscribe_all(&mut self, target: Target) {
		let bindings = match target {
			Target::Node(node) => std::mem::take(&mut self.document.data_mut(node).subscriptions),
			Target::Effect(effect) => self.effects.deps(effect).to_vec(),
			Target::Binding(derived) => self.bindings.sources.remove(&derived).unwrap_or_default(),
			Target::Pending(_) => Vec::new(),
		};
		for binding in bindings {
			self.unsubscribe(binding, target);
		}
	}

	/// Drops a binding's subscriber list and its own derivation runs.
	pub fn release_binding(&mut self, binding: BindingId) {
		self.unsubscribe_all(Target::Binding(binding));
		if let Some(list) = self.bindings.list_mut(binding) {
			list.clear();
		}
	}

	pub(crate) fn replace_target(&mut self, binding: BindingId, from: Target, to: Target) {
		if let Some(list) = self.bindings.list_mut(binding) {
			for entry in list.iter_mut() {
				if *entry == SubscriberEntry::Target(from) {
					*entry = SubscriberEntry::Target(to);
				}
			}
		}
		self.record_subscription(binding, to);
	}

	fn record_subscription(&mut self, binding: BindingId, target: Target) {
		let list = match target {
			Target::Node(node) => &mut self.document.data_mut(node).subscriptions,
			Target::Effect(effect) => match self.effects.deps_mut(effect) {
				Some(deps) => deps,
				None => return,
			},
			Target::Binding(derived) => self.bindings.sources.entry(derived).or_default(),
			Target::Pending(_) => return,
		};
		if !list.contains(&binding) {
			list.push(binding);
		}
	}

	fn forget_subscription(&mut self, binding: BindingId, target: Target) {
		match target {
			Target::Node(node) => self
				.document
				.data_mut(node)
				.subscriptions
				.retain(|b| *b != binding),
			Target::Effect(effect) => {
				if let Some(deps) = self.effects.deps_mut(effect) {
					deps.retain(|b| *b != binding);
				}
			}
			Target::Binding(derived) => {
				if let Some(sources) = self.bindings.sources.get_mut(&derived) {
					sources.retain(|b| *b != binding);
				}
			}
			Target::Pending(_) => {}
		}
	}

	fn target_alive(&self, target: Target) -> bool {
		match target {
			Target::Node(node) => self.document.is_alive(node),
			Target::Effect(effect) => self.effects.contains(effect),
			Target::Binding(_) => true,
			Target::Pending(_) => false,
		}
	}

	/// Runs every mutator of a snapshot of the subscriber list.
	///
	/// Entries added during the flush are not visited by it. Runs whose target
	/// was cleaned up or is still pending are skipped.
	pub(crate) fn flush(&mut self, binding: BindingId) {
		let snapshot = self.bindings.list(binding).to_vec();
		if snapshot.is_empty() {
			return;
		}
		if self.flush_depth >= self.config.max_flush_depth {
			tracing::warn!(
				?binding,
				depth = self.flush_depth,
				"flush depth bound reached, nested flush dropped"
			);
			return;
		}

		tracing::trace!(?binding, entries = snapshot.len(), "flushing binding");
		self.flush_depth += 1;
		let mut current = None;
		for entry in snapshot {
			match entry {
				SubscriberEntry::Target(target) => current = Some(target),
				SubscriberEntry::Mutator(mutator) => {
					if let Some(target) = current
						&& self.target_alive(target)
					{
						mutator(self, target);
					}
				}
			}
		}
		self.flush_depth -= 1;
	}
}

/// `[start, end)` of the run owned by `target`.
fn run_range(list: &[SubscriberEntry], target: Target) -> Option<(usize, usize)> {
	let start = list
		.iter()
		.position(|entry| entry.target() == Some(target))?;
	let end = list[start + 1..]
		.iter()
		.position(|entry| entry.target().is_some())
		.map_or(list.len(), |offset| start + 1 + offset);
	Some((start, end))
}
