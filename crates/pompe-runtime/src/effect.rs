//! Effects.
//!
//! An effect handle is its own dependency list: subscribing to a dependency
//! uses the handle as the run's target, and destroying the handle removes
//! that run from every dependency.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::binding::{BindingId, Mutator, Target, dep_list};
use crate::runtime::Runtime;

/// Identifier of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(u32);

type EffectFn = Rc<dyn Fn(&mut Runtime)>;

struct EffectSlot {
	run: EffectFn,
	deps: Vec<BindingId>,
}

#[derive(Default)]
pub(crate) struct EffectStore {
	slots: BTreeMap<EffectId, EffectSlot>,
	next: u32,
}

impl EffectStore {
	pub(crate) fn contains(&self, id: EffectId) -> bool {
		self.slots.contains_key(&id)
	}

	pub(crate) fn deps(&self, id: EffectId) -> &[BindingId] {
		self.slots.get(&id).map_or(&[], |slot| slot.deps.as_slice())
	}

	pub(crate) fn deps_mut(&mut self, id: EffectId) -> Option<&mut Vec<BindingId>> {
		self.slots.get_mut(&id).map(|slot| &mut slot.deps)
	}
}

impl Runtime {
	/// Runs `f` whenever any of `deps` changes, and once now when `immediate`.
	pub fn create_effect<F, I, D>(&mut self, f: F, deps: I, immediate: bool) -> EffectId
	where
		F: Fn(&mut Runtime) + 'static,
		I: IntoIterator<Item = D>,
		D: Into<Option<BindingId>>,
	{
		let id = EffectId(self.effects.next);
		self.effects.next += 1;
		let run: EffectFn = Rc::new(f);
		self.effects.slots.insert(
			id,
			EffectSlot {
				run: Rc::clone(&run),
				deps: Vec::new(),
			},
		);

		let mutator: Mutator = Rc::new(move |rt, _| run(rt));
		for dep in dep_list(deps) {
			self.subscribe(dep, Target::Effect(id), Rc::clone(&mutator));
		}
		tracing::trace!(?id, deps = self.effects.deps(id).len(), "created effect");

		if immediate {
			self.run_effect(id);
		}
		id
	}

	/// Runs an effect now, outside any flush.
	pub fn run_effect(&mut self, id: EffectId) {
		if let Some(run) = self.effects.slots.get(&id).map(|slot| Rc::clone(&slot.run)) {
			run(self);
		}
	}

	/// Unsubscribes an effect from every dependency and drops it.
	pub fn destroy_effect(&mut self, id: EffectId) {
		self.unsubscribe_all(Target::Effect(id));
		self.effects.slots.remove(&id);
	}

	/// Dependencies an effect is subscribed to.
	pub fn effect_deps(&self, id: EffectId) -> &[BindingId] {
		self.effects.deps(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_effect_runs_immediately_and_on_change() {
		let mut rt = Runtime::new();
		let count = rt.create_binding(0);
		let log = Rc::new(RefCell::new(Vec::new()));
		let (c, l) = (count.clone(), Rc::clone(&log));
		rt.create_effect(move |_| l.borrow_mut().push(c.get()), [count.id()], true);

		rt.set_value(&count, 10, None);
		rt.set_value(&count, 20, None);
		assert_eq!(*log.borrow(), vec![0, 10, 20]);
	}

	#[rstest]
	fn test_effect_not_immediate() {
		let mut rt = Runtime::new();
		let count = rt.create_binding(0);
		let runs = Rc::new(RefCell::new(0));
		let r = Rc::clone(&runs);
		rt.create_effect(move |_| *r.borrow_mut() += 1, [count.id()], false);
		assert_eq!(*runs.borrow(), 0);

		rt.set_value(&count, 1, None);
		assert_eq!(*runs.borrow(), 1);
	}

	#[rstest]
	fn test_destroy_effect_unsubscribes_every_dependency() {
		let mut rt = Runtime::new();
		let a = rt.create_binding(0);
		let b = rt.create_binding(0);
		let runs = Rc::new(RefCell::new(0));
		let r = Rc::clone(&runs);
		let effect = rt.create_effect(move |_| *r.borrow_mut() += 1, [a.id(), b.id()], false);
		assert_eq!(rt.effect_deps(effect), &[a.id(), b.id()]);

		rt.destroy_effect(effect);
		rt.set_value(&a, 1, None);
		rt.set_value(&b, 1, None);

		assert_eq!(*runs.borrow(), 0);
		assert!(rt.subscribers(a.id()).is_empty());
		assert!(rt.subscribers(b.id()).is_empty());
	}

	#[rstest]
	fn test_effect_chain_is_bounded() {
		let mut rt = Runtime::with_config(crate::RuntimeConfig {
			max_flush_depth: 4,
			..Default::default()
		});
		let ping = rt.create_binding(0u32);
		let pong = rt.create_binding(0u32);
		let (p1, q1) = (ping.clone(), pong.clone());
		rt.create_effect(
			move |rt| {
				let next = p1.get() + 1;
				rt.set_value(&q1, next, None);
			},
			[ping.id()],
			false,
		);
		let (p2, q2) = (ping.clone(), pong.clone());
		rt.create_effect(
			move |rt| {
				let next = q2.get() + 1;
				rt.set_value(&p2, next, None);
			},
			[pong.id()],
			false,
		);

		rt.set_value(&ping, 1, None);

		assert_eq!(rt.flush_depth(), 0);
		assert_eq!(ping.get(), 5);
		assert_eq!(pong.get(), 4);
	}
}
