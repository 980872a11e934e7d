//! Interval timers driven by the host clock.
//!
//! The runtime never sleeps: the host advances virtual time with
//! [`Runtime::advance_time`] and due intervals fire in order.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::{NodeCallback, NodeId};
use crate::runtime::Runtime;

/// Identifier of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u32);

type TimerFn = Rc<dyn Fn(&mut Runtime)>;

struct Interval {
	period_ms: u64,
	due_ms: u64,
	callback: TimerFn,
}

#[derive(Default)]
pub(crate) struct Timers {
	intervals: BTreeMap<TimerId, Interval>,
	now_ms: u64,
	next: u32,
}

impl Runtime {
	/// Calls `callback` every `period_ms` milliseconds of host time.
	pub fn set_interval(
		&mut self,
		period_ms: u32,
		callback: impl Fn(&mut Runtime) + 'static,
	) -> TimerId {
		let id = TimerId(self.timers.next);
		self.timers.next += 1;
		let period_ms = u64::from(period_ms.max(1));
		self.timers.intervals.insert(
			id,
			Interval {
				period_ms,
				due_ms: self.timers.now_ms + period_ms,
				callback: Rc::new(callback),
			},
		);
		id
	}

	/// Cancels an interval. Unknown ids are ignored.
	pub fn clear_interval(&mut self, id: TimerId) {
		self.timers.intervals.remove(&id);
	}

	/// Number of live intervals.
	pub fn active_intervals(&self) -> usize {
		self.timers.intervals.len()
	}

	/// Advances host time, firing every interval that falls due.
	pub fn advance_time(&mut self, ms: u64) {
		let until = self.timers.now_ms + ms;
		loop {
			let next = self
				.timers
				.intervals
				.iter()
				.filter(|(_, interval)| interval.due_ms <= until)
				.min_by_key(|(id, interval)| (interval.due_ms, **id))
				.map(|(id, interval)| (*id, interval.due_ms));
			let Some((id, due)) = next else {
				break;
			};
			self.timers.now_ms = due;
			let callback = match self.timers.intervals.get_mut(&id) {
				Some(interval) => {
					interval.due_ms += interval.period_ms;
					Rc::clone(&interval.callback)
				}
				None => break,
			};
			callback(self);
		}
		self.timers.now_ms = until;
	}

	/// Starts polling `sync` on a media node, replacing any running poll.
	pub fn start_poll(&mut self, node: NodeId, sync: NodeCallback) {
		self.stop_poll(node);
		let period = self.config.poll_interval_ms;
		let id = self.set_interval(period, move |rt| sync(rt, node));
		self.document.data_mut(node).poll = Some(id);
	}

	/// Stops polling a media node.
	pub fn stop_poll(&mut self, node: NodeId) {
		if let Some(id) = self.document.data_mut(node).poll.take() {
			self.clear_interval(id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;

	#[rstest]
	fn test_interval_fires_per_period() {
		let mut rt = Runtime::new();
		let ticks = Rc::new(RefCell::new(0));
		let t = Rc::clone(&ticks);
		let id = rt.set_interval(250, move |_| *t.borrow_mut() += 1);

		rt.advance_time(1000);
		assert_eq!(*ticks.borrow(), 4);

		rt.clear_interval(id);
		rt.advance_time(1000);
		assert_eq!(*ticks.borrow(), 4);
	}

	#[rstest]
	fn test_poll_uses_configured_period() {
		let mut rt = Runtime::new();
		let node = rt.document_mut().create_element("video", Default::default());
		let ticks = Rc::new(RefCell::new(0));
		let t = Rc::clone(&ticks);
		rt.start_poll(node, Rc::new(move |_, _| *t.borrow_mut() += 1));

		rt.advance_time(500);
		assert_eq!(*ticks.borrow(), 2);

		rt.stop_poll(node);
		assert_eq!(rt.active_intervals(), 0);
	}
}
