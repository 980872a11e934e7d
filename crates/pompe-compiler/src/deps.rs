//! Dependency sets.

use std::collections::BTreeSet;
use std::fmt;

/// Sorted, deduplicated names of the reactive values an expression reads.
///
/// Two expressions reading the same names always produce the same
/// [`signature`](DepSet::signature), whatever the order of the reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DepSet(BTreeSet<String>);

impl DepSet {
	/// The empty set.
	pub const EMPTY: DepSet = DepSet(BTreeSet::new());

	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Keeps only the names for which `keep` returns true.
	pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
		self.0.retain(|name| keep(name));
	}

	/// Adds a name.
	pub fn insert(&mut self, name: impl Into<String>) {
		self.0.insert(name.into());
	}

	/// Adds every name of `other`.
	pub fn extend(&mut self, other: &DepSet) {
		self.0.extend(other.0.iter().cloned());
	}

	/// Returns the union of `self` and `other`.
	pub fn union(&self, other: &DepSet) -> DepSet {
		let mut out = self.clone();
		out.extend(other);
		out
	}

	/// Returns true when nothing reactive is read.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of names.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if `name` is in the set.
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains(name)
	}

	/// Names in alphabetical order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Grouping key: the names joined with `,`.
	pub fn signature(&self) -> String {
		self.iter().collect::<Vec<_>>().join(",")
	}
}

impl<S: Into<String>> FromIterator<S> for DepSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

impl fmt::Display for DepSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}]", self.signature())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	fn test_signature_is_sorted() {
		let deps: DepSet = ["$b", "$a", "$b"].into_iter().collect();
		assert_eq!(deps.signature(), "$a,$b");
		assert_eq!(deps.len(), 2);
	}

	#[rstest]
	#[case(&[], "")]
	#[case(&["$a"], "$a")]
	#[case(&["$c", "$a", "$b"], "$a,$b,$c")]
	fn test_signature(#[case] names: &[&str], #[case] expected: &str) {
		let deps: DepSet = names.iter().copied().collect();
		assert_eq!(deps.signature(), expected);
	}

	proptest! {
		/// Property: insertion order never changes the signature
		#[test]
		fn test_signature_order_independent(mut names in prop::collection::vec("\\$[a-z]{1,4}", 0..8)) {
			let forward: DepSet = names.iter().cloned().collect();
			names.reverse();
			let backward: DepSet = names.iter().cloned().collect();
			prop_assert_eq!(forward.signature(), backward.signature());
		}
	}
}
