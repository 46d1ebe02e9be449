//! Word-level Markov model.
//!
//! - Sliding word windows (`Prefix`)
//! - Occurrence collection from corpora (`ChainBuilder`)
//! - Per-prefix suffix counts with weighted sampling (`SuffixCounts`)
//! - The aggregated, persistable model (`FrequencyTable`)
//! - Injectable randomness (`RandomSource`)

/// Collects every (prefix, suffix) occurrence of one or more corpora.
///
/// Can also generate text straight from the collected occurrences.
pub mod chain;

/// Prefix → suffix counts table, built from a chain or decoded from a file.
///
/// Supports weighted generation and merging of tables.
pub mod freq_table;

/// Fixed-length sliding window of words and its canonical key.
pub mod prefix;

/// Uniform integer sources: seeded, thread-local, or scripted.
pub mod random;

/// Suffix counts of a single prefix.
///
/// Tracks occurrences and supports weighted random sampling.
pub mod suffixes;
