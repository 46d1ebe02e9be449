//! Flat text encoding of a `FrequencyTable`.
//!
//! ```text
//! 2
//! "" "" the 2
//! "" the cat 2
//! the cat ran 1 sat 1
//! ```
//!
//! The first line holds the prefix length. Every other line holds the
//! prefix words (empty placeholders written as `""`), followed by
//! `suffix count` pairs. Words are not escaped: a word equal to `""` or
//! containing whitespace does not survive a round trip.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use crate::error::{MarkovError, Result};
use crate::model::freq_table::FrequencyTable;
use crate::model::prefix::Prefix;
use crate::model::suffixes::SuffixCounts;

/// Token standing for an empty prefix word.
pub const EMPTY_MARKER: &str = "\"\"";

/// Writes `table` to `writer`, one prefix per line in key order.
pub fn encode<W: Write>(table: &FrequencyTable, mut writer: W) -> Result<()> {
	writeln!(writer, "{}", table.prefix_len())?;

	for (key, counts) in table.prefixes() {
		let mut fields: Vec<String> = Prefix::split_key(key)
			.map(|word| if word.is_empty() { EMPTY_MARKER.to_owned() } else { word.to_owned() })
			.collect();
		for (suffix, count) in counts.iter() {
			fields.push(suffix.to_owned());
			fields.push(count.to_string());
		}
		writeln!(writer, "{}", fields.join(" "))?;
	}

	writer.flush()?;
	Ok(())
}

/// Encodes `table` into a `String`.
pub fn encode_to_string(table: &FrequencyTable) -> Result<String> {
	let mut bytes = Vec::new();
	encode(table, &mut bytes)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes `table` to a file, replacing it if it exists.
pub fn save_to_file<P: AsRef<Path>>(table: &FrequencyTable, path: P) -> Result<()> {
	let file = File::create(&path)?;
	encode(table, BufWriter::new(file))?;
	debug!("saved {} prefixes to {}", table.len(), path.as_ref().display());
	Ok(())
}

/// Parses the prefix length from the header line.
fn parse_header(line: Option<&str>) -> Result<usize> {
	let field = line
		.and_then(|line| line.split_whitespace().next())
		.ok_or_else(|| MarkovError::format(1, "missing prefix length header"))?;
	let prefix_len: usize = field
		.parse()
		.map_err(|_| MarkovError::format(1, format!("prefix length '{}' is not a number", field)))?;
	if prefix_len == 0 {
		return Err(MarkovError::format(1, "prefix length must be at least 1"));
	}
	Ok(prefix_len)
}

/// Parses one data line into its prefix key and suffix counts.
fn parse_line(line_no: usize, line: &str, prefix_len: usize) -> Result<(String, SuffixCounts)> {
	let fields: Vec<&str> = line.split_whitespace().collect();
	if fields.len() < prefix_len {
		return Err(MarkovError::format(
			line_no,
			format!("expected {} prefix words, found {}", prefix_len, fields.len()),
		));
	}

	let (words, pairs) = fields.split_at(prefix_len);
	if pairs.len() % 2 != 0 {
		return Err(MarkovError::format(line_no, "suffix without a count"));
	}

	let words: Vec<String> = words
		.iter()
		.map(|word| if *word == EMPTY_MARKER { String::new() } else { (*word).to_owned() })
		.collect();
	let key = Prefix::from_words(words).key();

	let mut counts = SuffixCounts::new();
	for pair in pairs.chunks_exact(2) {
		let (suffix, count) = (pair[0], pair[1]);
		let count: u64 = count
			.parse()
			.map_err(|_| MarkovError::format(line_no, format!("count '{}' of '{}' is not a number", count, suffix)))?;
		if count == 0 {
			return Err(MarkovError::format(line_no, format!("count of '{}' must be at least 1", suffix)));
		}
		counts
			.set_count(suffix, count)
			.map_err(|_| MarkovError::format(line_no, "counts overflow"))?;
	}

	Ok((key, counts))
}

/// Reads a table written by `encode`.
///
/// Every line after the header is parsed; blank lines are skipped.
///
/// # Errors
/// - `Format` if the header is missing, not a number or zero, if a line has
///   fewer words than the prefix length, an odd number of suffix/count
///   tokens, a count that is not a positive integer, or counts whose sum
///   does not fit in a `u64`
/// - `Io` if reading fails
///
/// Any error aborts the decode; no partial table is returned.
pub fn decode<R: BufRead>(reader: R) -> Result<FrequencyTable> {
	let mut lines = reader.lines();
	let header = lines.next().transpose()?;
	let mut table = FrequencyTable::new(parse_header(header.as_deref())?)?;

	for (index, line) in lines.enumerate() {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}
		// Header is line 1
		let line_no = index + 2;
		let (key, counts) = parse_line(line_no, &line, table.prefix_len())?;
		if table.insert(key.clone(), counts) {
			warn!("line {}: prefix '{}' already defined, replacing it", line_no, key);
		}
	}

	debug!("decoded frequency table with {} prefixes", table.len());
	Ok(table)
}

/// Decodes a table held in memory.
pub fn decode_str(text: &str) -> Result<FrequencyTable> {
	decode(text.as_bytes())
}

/// Reads a table file.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<FrequencyTable> {
	let file = File::open(&path)?;
	let table = decode(BufReader::new(file))?;
	debug!("loaded {} prefixes from {}", table.len(), path.as_ref().display());
	Ok(table)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::chain::ChainBuilder;

	const CORPUS: &str = "the cat sat on the mat the cat ran";

	fn table(prefix_len: usize, text: &str) -> FrequencyTable {
		let mut builder = ChainBuilder::new(prefix_len).unwrap();
		builder.ingest(text.split_whitespace());
		builder.into_frequency_table()
	}

	fn assert_format_error(result: Result<FrequencyTable>, expected_line: usize) {
		match result {
			Err(MarkovError::Format { line, .. }) => assert_eq!(line, expected_line),
			other => panic!("expected a format error, got {:?}", other),
		}
	}

	#[test]
	fn encodes_header_and_placeholders() {
		let encoded = encode_to_string(&table(2, CORPUS)).unwrap();
		let lines: Vec<&str> = encoded.lines().collect();
		assert_eq!(lines[0], "2");
		assert!(lines.contains(&"\"\" \"\" the 1"));
		assert!(lines.contains(&"\"\" the cat 1"));
		assert!(lines.contains(&"the cat ran 1 sat 1"));
		assert_eq!(lines.len(), 1 + 8);
	}

	#[test]
	fn round_trip_keeps_every_prefix() {
		let original = table(2, CORPUS);
		let decoded = decode_str(&encode_to_string(&original).unwrap()).unwrap();
		assert_eq!(decoded.len(), original.len());
		for (key, counts) in original.prefixes() {
			assert_eq!(decoded.suffixes(key), Some(counts), "prefix '{}'", key);
		}
		assert_eq!(decoded, original);
	}

	#[test]
	fn round_trip_with_repeated_counts() {
		let text = "a rose is a rose is a rose but a daisy is a flower and a rose is red";
		for prefix_len in 1..=3 {
			let original = table(prefix_len, text);
			let decoded = decode_str(&encode_to_string(&original).unwrap()).unwrap();
			assert_eq!(decoded, original, "prefix length {}", prefix_len);
		}
	}

	#[test]
	fn decodes_every_data_line() {
		let decoded = decode_str("1\n\"\" a 1\na b 2 c 1\nb a 1\nc d 4\n").unwrap();
		assert_eq!(decoded.len(), 4);
		assert_eq!(decoded.total_freq(""), 1);
		assert_eq!(decoded.suffixes("a").unwrap().count("b"), 2);
		assert_eq!(decoded.total_freq("b"), 1);
		assert_eq!(decoded.suffixes("c").unwrap().count("d"), 4);
	}

	#[test]
	fn skips_blank_lines() {
		let decoded = decode_str("2\n\n\"\" \"\" hi 1\n   \n").unwrap();
		assert_eq!(decoded.len(), 1);
		assert_eq!(decoded.total_freq(" "), 1);
	}

	#[test]
	fn prefix_without_suffixes_is_absent() {
		let decoded = decode_str("2\nthe cat\n").unwrap();
		assert!(decoded.is_empty());
		assert!(decoded.suffixes("the cat").is_none());
	}

	#[test]
	fn header_only_is_an_empty_table() {
		let decoded = decode_str("3\n").unwrap();
		assert_eq!(decoded.prefix_len(), 3);
		assert!(decoded.is_empty());
	}

	#[test]
	fn missing_header_is_a_format_error() {
		assert_format_error(decode_str(""), 1);
		assert_format_error(decode_str("\n\"\" a 1\n"), 1);
	}

	#[test]
	fn non_numeric_header_is_a_format_error() {
		assert_format_error(decode_str("two\n\"\" \"\" a 1\n"), 1);
		assert_format_error(decode_str("0\n"), 1);
	}

	#[test]
	fn odd_suffix_tokens_are_a_format_error() {
		assert_format_error(decode_str("2\n\"\" \"\" the 1\nthe cat sat 1 ran\n"), 3);
	}

	#[test]
	fn non_numeric_count_is_a_format_error() {
		assert_format_error(decode_str("1\na b many\n"), 2);
		assert_format_error(decode_str("1\na b -1\n"), 2);
		assert_format_error(decode_str("1\na b 0\n"), 2);
	}

	#[test]
	fn short_prefix_is_a_format_error() {
		assert_format_error(decode_str("3\n\"\" \"\" \"\" a 1\nonly two\n"), 3);
	}

	#[test]
	fn overflowing_counts_are_a_format_error() {
		assert_format_error(decode_str("1\n\"\" a 18446744073709551615 b 1\n"), 2);
		assert_format_error(decode_str("1\n\"\" a 1\nx y 18446744073709551614 z 2\n"), 3);
		// A single maximal count still fits
		let decoded = decode_str("1\n\"\" a 18446744073709551615\n").unwrap();
		assert_eq!(decoded.total_freq(""), u64::MAX);
		assert_eq!(decoded.generate(1, &mut crate::model::random::RngSource::seeded(1)), "a");
	}

	#[test]
	fn count_beyond_u64_is_a_format_error() {
		assert_format_error(decode_str("1\n\"\" a 18446744073709551616\n"), 2);
	}

	#[test]
	fn repeated_prefix_keeps_last_line() {
		let decoded = decode_str("1\na b 1\na c 2\n").unwrap();
		let counts = decoded.suffixes("a").unwrap();
		assert_eq!(counts.count("b"), 0);
		assert_eq!(counts.count("c"), 2);
	}

	#[test]
	fn file_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.txt");
		let original = table(2, CORPUS);

		save_to_file(&original, &path).unwrap();
		let loaded = load_from_file(&path).unwrap();
		assert_eq!(loaded, original);
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(load_from_file(dir.path().join("none.txt")), Err(MarkovError::Io(_))));
	}
}
