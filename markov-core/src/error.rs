use thiserror::Error;

/// Errors surfaced by the chain builder, the frequency table and the table codec.
///
/// Generation never fails: running out of model data is a normal, possibly
/// empty, result rather than an error.
#[derive(Debug, Error)]
pub enum MarkovError {
	/// The source or destination could not be read or written.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// A persisted table is malformed. `line` is 1-based.
	#[error("Format error on line {line}: {reason}")]
	Format {
		line: usize,
		reason: String,
	},

	/// A prefix must hold at least one word.
	#[error("Invalid prefix length: {0} (must be >= 1)")]
	InvalidPrefixLen(usize),

	/// The counts of one prefix no longer fit in a `u64`.
	#[error("Suffix counts overflow")]
	CountOverflow,

	/// Two tables built with different prefix lengths cannot be combined.
	#[error("Prefix length mismatch: expected {expected}, got {got}")]
	PrefixLenMismatch {
		expected: usize,
		got: usize,
	},
}

impl MarkovError {
	pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
		MarkovError::Format { line, reason: reason.into() }
	}
}

/// Result type for markov operations
pub type Result<T> = std::result::Result<T, MarkovError>;
