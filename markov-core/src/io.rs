use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole source and splits it into whitespace-delimited words.
///
/// - Reads the entire input into memory
/// - Any run of whitespace (spaces, tabs, newlines) separates two words
pub fn read_words<R: Read>(mut reader: R) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	reader.read_to_string(&mut contents)?;
	Ok(contents.split_whitespace().map(str::to_owned).collect())
}

/// Reads a corpus file and returns its words.
pub fn read_words_from_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	read_words(File::open(filename)?)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/poe.txt"` → `"poe"`
/// - `"poe.txt"` → `"poe"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn words_are_split_on_any_whitespace() {
		let words = read_words("  the cat\n\tsat   on\r\nthe mat ".as_bytes()).unwrap();
		assert_eq!(words, vec!["the", "cat", "sat", "on", "the", "mat"]);
	}

	#[test]
	fn empty_source_yields_no_words() {
		assert!(read_words(" \n ".as_bytes()).unwrap().is_empty());
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_words_from_file(dir.path().join("nope.txt")).is_err());
	}

	#[test]
	fn lists_only_matching_extension() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["b.txt", "a.txt", "c.bin"] {
			let mut f = File::create(dir.path().join(name)).unwrap();
			writeln!(f, "1").unwrap();
		}
		fs::create_dir(dir.path().join("sub.txt")).unwrap();

		assert_eq!(list_files(dir.path(), "txt").unwrap(), vec!["a.txt", "b.txt"]);
	}

	#[test]
	fn filename_drops_folder_and_extension() {
		assert_eq!(get_filename("./data/poe.txt").unwrap(), "poe");
		assert_eq!(get_filename("poe.txt").unwrap(), "poe");
	}
}
