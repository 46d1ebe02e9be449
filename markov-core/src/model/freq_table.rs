use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::chain::ChainBuilder;
use super::prefix::Prefix;
use super::random::RandomSource;
use super::suffixes::SuffixCounts;
use crate::error::{MarkovError, Result};

/// Prefix → (suffix → count) aggregation of a word chain.
///
/// The `FrequencyTable` is what gets persisted and what text is generated
/// from. It is built once, from a `ChainBuilder` or by decoding a file,
/// and only changes afterwards through `merge`.
///
/// # Invariants
/// - `prefix_len` is always >= 1 and never changes
/// - Keys are canonical prefix keys of exactly `prefix_len` words
/// - No stored `SuffixCounts` is empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
	prefix_len: usize,
	table: BTreeMap<String, SuffixCounts>,
}

/// Summary of a table's size.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableStats {
	pub prefix_len: usize,
	/// Number of distinct prefixes
	pub prefixes: usize,
	/// Number of (prefix, suffix) observations, saturating at `u64::MAX`
	pub observations: u64,
}

impl FrequencyTable {
	/// Creates an empty table for prefixes of `prefix_len` words.
	///
	/// # Errors
	/// Returns an error if `prefix_len == 0`.
	pub fn new(prefix_len: usize) -> Result<Self> {
		if prefix_len == 0 {
			return Err(MarkovError::InvalidPrefixLen(prefix_len));
		}
		Ok(Self { prefix_len, table: BTreeMap::new() })
	}

	/// Counts the suffix occurrences of every prefix in a chain.
	///
	/// The chain is only read, so more sources may still be ingested into
	/// it and a new table built later.
	pub fn build_from(chain: &ChainBuilder) -> Self {
		let mut table = BTreeMap::new();
		for (key, suffixes) in chain.chain() {
			let counts: SuffixCounts = suffixes.iter().collect();
			if !counts.is_empty() {
				table.insert(key.clone(), counts);
			}
		}
		debug!("built frequency table with {} prefixes", table.len());
		Self { prefix_len: chain.prefix_len(), table }
	}

	pub fn prefix_len(&self) -> usize {
		self.prefix_len
	}

	/// Number of prefixes with at least one suffix.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Suffix counts of a prefix key, `None` if the prefix was never followed.
	pub fn suffixes(&self, key: &str) -> Option<&SuffixCounts> {
		self.table.get(key)
	}

	/// `(key, suffix counts)` pairs in key order.
	pub fn prefixes(&self) -> impl Iterator<Item = (&str, &SuffixCounts)> {
		self.table.iter().map(|(key, counts)| (key.as_str(), counts))
	}

	/// Number of times `key` was followed by any word, 0 if unknown.
	pub fn total_freq(&self, key: &str) -> u64 {
		self.table.get(key).map(SuffixCounts::total).unwrap_or(0)
	}

	pub fn stats(&self) -> TableStats {
		TableStats {
			prefix_len: self.prefix_len,
			prefixes: self.table.len(),
			observations: self.table.values().fold(0, |sum, counts| sum.saturating_add(counts.total())),
		}
	}

	/// Installs the counts of one prefix, replacing any previous entry.
	///
	/// Empty counts remove the prefix, since empty and absent are equivalent.
	/// Returns `true` if an entry was replaced.
	pub(crate) fn insert(&mut self, key: String, counts: SuffixCounts) -> bool {
		if counts.is_empty() {
			return self.table.remove(&key).is_some();
		}
		self.table.insert(key, counts).is_some()
	}

	/// Generates a text of at most `max_words` words.
	///
	/// Starting from an all-placeholder prefix, repeatedly picks a weighted
	/// random suffix and slides the prefix over it. Stops early, without
	/// error, as soon as the current prefix has no suffix; the result is
	/// empty if the table does not know how a text starts.
	pub fn generate<R: RandomSource + ?Sized>(&self, max_words: usize, rng: &mut R) -> String {
		let mut prefix = match Prefix::new(self.prefix_len) {
			Ok(prefix) => prefix,
			Err(_) => return String::new(),
		};
		let mut text: Vec<&str> = Vec::new();
		for _ in 0..max_words {
			let next = match self.table.get(&prefix.key()).and_then(|counts| counts.select(&mut *rng)) {
				Some(next) => next,
				None => break,
			};
			text.push(next);
			prefix.shift(next);
		}
		text.join(" ")
	}

	/// Merges another table into this one.
	///
	/// Counts of matching prefixes and suffixes are summed; missing prefixes
	/// are cloned. Either every prefix is merged or the table is unchanged.
	///
	/// # Errors
	/// - `PrefixLenMismatch` if the prefix lengths differ
	/// - `CountOverflow` if a prefix's summed counts do not fit in a `u64`
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.prefix_len != other.prefix_len {
			return Err(MarkovError::PrefixLenMismatch { expected: self.prefix_len, got: other.prefix_len });
		}

		let mut merged = self.table.clone();
		for (key, counts) in &other.table {
			if let Some(existing) = merged.get_mut(key) {
				existing.merge(counts)?;
			} else if !counts.is_empty() {
				merged.insert(key.clone(), counts.clone());
			}
		}
		self.table = merged;

		Ok(())
	}
}

impl From<&ChainBuilder> for FrequencyTable {
	fn from(chain: &ChainBuilder) -> Self {
		Self::build_from(chain)
	}
}

/// One prefix per line: `prefix | suffix count, suffix count, `
impl fmt::Display for FrequencyTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (key, counts) in &self.table {
			write!(f, "{} | ", key)?;
			for (suffix, count) in counts.iter() {
				write!(f, "{} {}, ", suffix, count)?;
			}
			writeln!(f)?;
		}
		Ok(())
	}
}
