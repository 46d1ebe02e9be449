use std::collections::BTreeMap;

use log::warn;

use super::random::RandomSource;
use crate::error::{MarkovError, Result};

/// Suffix counts observed after one prefix.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate suffix occurrences while a table is built or decoded
/// - Pick the next word using weighted random sampling
/// - Merge with the counts of the same prefix from another table
///
/// ## Invariants
/// - Each count is strictly positive
/// - `total` is the exact sum of all counts and fits in a `u64`
/// - Suffixes iterate in lexicographic order, so a given sequence of draws
///   always picks the same words
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuffixCounts {
	/// Example: { "cat" => 42, "mat" => 3 }
	counts: BTreeMap<String, u64>,
	total: u64,
}

impl SuffixCounts {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more occurrence of `suffix`.
	///
	/// An occurrence that would overflow the total is dropped.
	pub fn add(&mut self, suffix: &str) {
		if self.add_count(suffix, 1).is_err() {
			warn!("suffix counts overflow, dropping an occurrence of '{}'", suffix);
		}
	}

	/// Adds `count` occurrences of `suffix`. A zero count is ignored.
	///
	/// # Errors
	/// Returns `CountOverflow`, leaving the counts unchanged, if the total
	/// would exceed `u64::MAX`.
	pub fn add_count(&mut self, suffix: &str, count: u64) -> Result<()> {
		if count == 0 {
			return Ok(());
		}
		let total = self.total.checked_add(count).ok_or(MarkovError::CountOverflow)?;
		// Never exceeds the new total
		*self.counts.entry(suffix.to_owned()).or_insert(0) += count;
		self.total = total;
		Ok(())
	}

	/// Sets the count of `suffix`, replacing any previous value.
	///
	/// # Errors
	/// Returns `CountOverflow`, leaving the counts unchanged, if the total
	/// would exceed `u64::MAX`.
	pub(crate) fn set_count(&mut self, suffix: &str, count: u64) -> Result<()> {
		let previous = self.count(suffix);
		let total = (self.total - previous).checked_add(count).ok_or(MarkovError::CountOverflow)?;
		if count == 0 {
			self.counts.remove(suffix);
		} else {
			self.counts.insert(suffix.to_owned(), count);
		}
		self.total = total;
		Ok(())
	}

	/// Occurrences of `suffix`, 0 if never seen.
	pub fn count(&self, suffix: &str) -> u64 {
		self.counts.get(suffix).copied().unwrap_or(0)
	}

	/// Sum of all counts.
	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// `(suffix, count)` pairs in lexicographic order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.counts.iter().map(|(suffix, count)| (suffix.as_str(), *count))
	}

	/// Picks a suffix with probability `count / total`.
	///
	/// Draws `r` in `[0, total)` and walks the suffixes in order,
	/// subtracting each count until `r` falls inside one.
	///
	/// Returns `None` if there is no suffix.
	pub fn select<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.below(self.total);
		for (suffix, count) in &self.counts {
			if r < *count {
				return Some(suffix.as_str());
			}
			r -= count;
		}

		// r < total, so the loop always returns
		None
	}

	/// Sums the counts of `other` into this one.
	///
	/// # Errors
	/// Returns `CountOverflow`, leaving the counts unchanged, if the
	/// combined total would exceed `u64::MAX`.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		self.total.checked_add(other.total).ok_or(MarkovError::CountOverflow)?;
		for (suffix, count) in &other.counts {
			self.add_count(suffix, *count)?;
		}
		Ok(())
	}
}

impl<S: AsRef<str>> FromIterator<S> for SuffixCounts {
	/// Counts every occurrence of an iterator of words.
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut counts = Self::new();
		for suffix in iter {
			counts.add(suffix.as_ref());
		}
		counts
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::random::testing::{Counter, Fixed};
	use std::collections::HashMap;

	#[test]
	fn counts_occurrences() {
		let counts: SuffixCounts = ["sat", "ran", "sat"].into_iter().collect();
		assert_eq!(counts.count("sat"), 2);
		assert_eq!(counts.count("ran"), 1);
		assert_eq!(counts.count("flew"), 0);
		assert_eq!(counts.total(), 3);
		assert_eq!(counts.len(), 2);
	}

	#[test]
	fn zero_counts_are_not_stored() {
		let mut counts = SuffixCounts::new();
		counts.add_count("a", 0).unwrap();
		counts.set_count("b", 0).unwrap();
		assert!(counts.is_empty());
		assert_eq!(counts.select(&mut Fixed(0)), None);
	}

	#[test]
	fn iterates_in_lexicographic_order() {
		let counts: SuffixCounts = ["mat", "cat", "hat", "cat"].into_iter().collect();
		let pairs: Vec<(&str, u64)> = counts.iter().collect();
		assert_eq!(pairs, vec![("cat", 2), ("hat", 1), ("mat", 1)]);
	}

	#[test]
	fn selection_boundaries() {
		// a:[0,2) b:[2,3) c:[3,6)
		let mut counts = SuffixCounts::new();
		counts.add_count("a", 2).unwrap();
		counts.add_count("b", 1).unwrap();
		counts.add_count("c", 3).unwrap();

		let picks: Vec<&str> = (0..6).map(|r| counts.select(&mut Fixed(r)).unwrap()).collect();
		assert_eq!(picks, vec!["a", "a", "b", "c", "c", "c"]);
	}

	#[test]
	fn every_draw_selects_proportionally() {
		let mut counts = SuffixCounts::new();
		counts.add_count("rare", 1).unwrap();
		counts.add_count("common", 5).unwrap();
		counts.add_count("usual", 3).unwrap();
		let total = counts.total();

		// Each value of [0, total) is drawn exactly `rounds` times
		let rounds = 100;
		let mut source = Counter(0);
		let mut histogram: HashMap<&str, u64> = HashMap::new();
		for _ in 0..total * rounds {
			*histogram.entry(counts.select(&mut source).unwrap()).or_insert(0) += 1;
		}

		for (suffix, count) in counts.iter() {
			assert_eq!(histogram[suffix], count * rounds);
		}
	}

	#[test]
	fn merge_sums_counts() {
		let mut left: SuffixCounts = ["a", "b"].into_iter().collect();
		let right: SuffixCounts = ["b", "c", "c"].into_iter().collect();
		left.merge(&right).unwrap();
		assert_eq!(left.count("a"), 1);
		assert_eq!(left.count("b"), 2);
		assert_eq!(left.count("c"), 2);
		assert_eq!(left.total(), 5);
	}

	#[test]
	fn set_count_replaces_and_keeps_total() {
		let mut counts: SuffixCounts = ["a", "a", "b"].into_iter().collect();
		counts.set_count("a", 5).unwrap();
		assert_eq!(counts.total(), 6);
		counts.set_count("b", 0).unwrap();
		assert_eq!(counts.total(), 5);
		assert_eq!(counts.len(), 1);
	}

	#[test]
	fn overflowing_counts_are_rejected() {
		let mut counts = SuffixCounts::new();
		counts.add_count("a", u64::MAX).unwrap();
		assert!(matches!(counts.add_count("b", 1), Err(MarkovError::CountOverflow)));
		assert!(matches!(counts.set_count("b", 1), Err(MarkovError::CountOverflow)));
		// Replacing the only count stays in range
		counts.set_count("a", 7).unwrap();
		assert_eq!(counts.total(), 7);
		assert_eq!(counts.count("b"), 0);
	}

	#[test]
	fn overflowing_merge_leaves_counts_unchanged() {
		let mut left = SuffixCounts::new();
		left.add_count("a", u64::MAX - 1).unwrap();
		let right: SuffixCounts = ["b", "c"].into_iter().collect();
		assert!(matches!(left.merge(&right), Err(MarkovError::CountOverflow)));
		assert_eq!(left.total(), u64::MAX - 1);
		assert_eq!(left.len(), 1);
	}

	#[test]
	fn selection_at_maximal_total() {
		let mut counts = SuffixCounts::new();
		counts.add_count("a", u64::MAX - 1).unwrap();
		counts.add_count("b", 1).unwrap();
		assert_eq!(counts.select(&mut Fixed(u64::MAX - 2)), Some("a"));
		assert_eq!(counts.select(&mut Fixed(u64::MAX - 1)), Some("b"));
	}
}
