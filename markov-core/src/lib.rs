//! Markov-chain text generation over words.
//!
//! This crate provides a word-level Markov model including:
//! - Chain construction from one or more whitespace-delimited corpora
//! - Prefix → suffix frequency tables with weighted random generation
//! - A flat text format to persist and reload frequency tables
//! - I/O helpers (tokenizing, listing table files)

/// Chain builder, frequency table and the random source used for generation.
pub mod model;

/// Flat text encoding and decoding of frequency tables.
pub mod codec;

/// Error taxonomy shared by the whole crate.
pub mod error;

/// I/O utilities (tokenizing, path helpers).
pub mod io;
