use crate::error::{MarkovError, Result};

/// Sliding window over the last `len` words of a text.
///
/// A fresh prefix holds `len` empty placeholders, standing for "start of
/// text". Its canonical key (the words joined by one space) identifies
/// entries in chain and frequency tables.
///
/// # Invariants
/// - The window always holds exactly `len` words, `len >= 1`
/// - Words keep their order: the oldest word comes first in the key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
	words: Vec<String>,
}

impl Prefix {
	/// Creates a window of `len` empty placeholders.
	///
	/// # Errors
	/// Returns an error if `len == 0`.
	pub fn new(len: usize) -> Result<Self> {
		if len == 0 {
			return Err(MarkovError::InvalidPrefixLen(len));
		}
		Ok(Self { words: vec![String::new(); len] })
	}

	/// Builds a prefix from explicit words; used when decoding a key.
	pub(crate) fn from_words(words: Vec<String>) -> Self {
		Self { words }
	}

	/// Number of words in the window.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	/// Words of the window, oldest first.
	pub fn words(&self) -> &[String] {
		&self.words
	}

	/// Canonical lookup key.
	pub fn key(&self) -> String {
		self.words.join(" ")
	}

	/// Drops the oldest word and appends `word`.
	pub fn shift(&mut self, word: &str) {
		self.words.rotate_left(1);
		if let Some(last) = self.words.last_mut() {
			word.clone_into(last);
		}
	}

	/// Splits a canonical key back into its words.
	///
	/// Exact as long as no word contains a space, which holds for tokenized input.
	pub fn split_key(key: &str) -> impl Iterator<Item = &str> {
		key.split(' ')
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fresh_prefix_is_all_placeholders() {
		let prefix = Prefix::new(3).unwrap();
		assert_eq!(prefix.len(), 3);
		assert!(prefix.words().iter().all(String::is_empty));
		assert_eq!(prefix.key(), "  ");
	}

	#[test]
	fn zero_length_is_rejected() {
		assert!(matches!(Prefix::new(0), Err(MarkovError::InvalidPrefixLen(0))));
	}

	#[test]
	fn shift_drops_oldest_word() {
		let mut prefix = Prefix::new(2).unwrap();
		prefix.shift("the");
		assert_eq!(prefix.key(), " the");
		prefix.shift("cat");
		assert_eq!(prefix.key(), "the cat");
		prefix.shift("sat");
		assert_eq!(prefix.key(), "cat sat");
		assert_eq!(prefix.len(), 2);
	}

	#[test]
	fn split_key_keeps_placeholders() {
		let words: Vec<&str> = Prefix::split_key(" the").collect();
		assert_eq!(words, vec!["", "the"]);
		let words: Vec<&str> = Prefix::split_key("").collect();
		assert_eq!(words, vec![""]);
	}
}
