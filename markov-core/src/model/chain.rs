use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use log::debug;

use super::freq_table::FrequencyTable;
use super::prefix::Prefix;
use super::random::RandomSource;
use crate::error::Result;
use crate::io::{read_words, read_words_from_file};

/// Mapping from a prefix key to every suffix observed after it, in order.
pub type ChainTable = HashMap<String, Vec<String>>;

/// Accumulates (prefix, suffix) occurrences from one or more word sources.
///
/// Each call to `ingest` restarts from an all-placeholder prefix and appends
/// to the same table, so several corpora can be combined before building a
/// single `FrequencyTable`.
///
/// # Invariants
/// - Every key is the canonical key of a prefix of exactly `prefix_len` words
/// - Occurrence lists are never empty and keep duplicates
#[derive(Clone, Debug)]
pub struct ChainBuilder {
	start: Prefix,
	chain: ChainTable,
}

impl ChainBuilder {
	/// Creates an empty builder for prefixes of `prefix_len` words.
	///
	/// # Errors
	/// Returns an error if `prefix_len == 0`.
	pub fn new(prefix_len: usize) -> Result<Self> {
		Ok(Self { start: Prefix::new(prefix_len)?, chain: HashMap::new() })
	}

	pub fn prefix_len(&self) -> usize {
		self.start.len()
	}

	/// Read-only view of the collected chain.
	pub fn chain(&self) -> &ChainTable {
		&self.chain
	}

	/// Occurrences recorded after `key`, in ingestion order.
	pub fn suffixes(&self, key: &str) -> Option<&[String]> {
		self.chain.get(key).map(Vec::as_slice)
	}

	/// Number of distinct prefixes seen so far.
	pub fn len(&self) -> usize {
		self.chain.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}

	/// Records every token as a suffix of the prefix preceding it.
	///
	/// An empty sequence leaves the table unchanged.
	pub fn ingest<I, S>(&mut self, tokens: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut prefix = self.start.clone();
		let mut count = 0usize;
		for token in tokens {
			let token = token.as_ref();
			self.chain.entry(prefix.key()).or_default().push(token.to_owned());
			prefix.shift(token);
			count += 1;
		}
		debug!("ingested {} words, {} prefixes in chain", count, self.chain.len());
	}

	/// Tokenizes a reader on whitespace and ingests the words.
	pub fn ingest_reader<R: Read>(&mut self, reader: R) -> Result<()> {
		let words = read_words(reader)?;
		self.ingest(&words);
		Ok(())
	}

	/// Reads a corpus file and ingests its words.
	pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let words = read_words_from_file(&path)?;
		debug!("read {} words from {}", words.len(), path.as_ref().display());
		self.ingest(&words);
		Ok(())
	}

	/// Generates at most `max_words` words straight from the chain.
	///
	/// Picks a uniformly random occurrence for the current prefix, which
	/// weights suffixes by how often they were seen. Stops early when the
	/// prefix has no recorded suffix.
	pub fn generate<R: RandomSource + ?Sized>(&self, max_words: usize, rng: &mut R) -> String {
		let mut prefix = self.start.clone();
		let mut text: Vec<&str> = Vec::new();
		for _ in 0..max_words {
			let choices = match self.chain.get(&prefix.key()) {
				Some(choices) if !choices.is_empty() => choices,
				_ => break,
			};
			let next = &choices[rng.below(choices.len() as u64) as usize];
			text.push(next.as_str());
			prefix.shift(next);
		}
		text.join(" ")
	}

	/// Collapses the chain into a frequency table.
	pub fn into_frequency_table(self) -> FrequencyTable {
		FrequencyTable::build_from(&self)
	}
}
