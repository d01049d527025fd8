use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SynthesisError};
use crate::io::read_file;

/// The known words of a synthesis run, each with a frequency weight.
///
/// Entries keep the order in which words were first seen, so iterating a
/// corpus (and everything derived from it) is reproducible.
///
/// # Invariants
/// - Words are unique, non-empty and contain no whitespace
/// - Whitespace is therefore free to serve as the boundary symbol
#[derive(Clone, Debug, Default)]
pub struct Corpus {
	entries: Vec<(String, u64)>,
	index: HashMap<String, usize>,
}

impl Corpus {
	/// Creates an empty corpus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses `word<whitespace>frequency` lines.
	///
	/// Blank lines are skipped. A word seen twice keeps its first position
	/// and takes the last frequency.
	///
	/// # Errors
	/// `MalformedCorpus` with the 1-based line number when a line does not
	/// hold exactly a word and a non-negative integer.
	pub fn parse<I, S>(lines: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut corpus = Self::new();
		for (i, line) in lines.into_iter().enumerate() {
			let line = line.as_ref();
			if line.trim().is_empty() {
				continue;
			}

			let malformed = |reason: String| SynthesisError::MalformedCorpus { line: i + 1, reason };
			let mut parts = line.split_whitespace();
			let (word, frequency) = match (parts.next(), parts.next(), parts.next()) {
				(Some(word), Some(frequency), None) => (word, frequency),
				_ => return Err(malformed(format!("expected `word frequency`, got {line:?}"))),
			};
			let frequency = frequency
				.parse::<u64>()
				.map_err(|e| malformed(format!("invalid frequency {frequency:?}: {e}")))?;

			corpus.upsert(word, frequency);
		}

		debug!(words = corpus.len(), "corpus parsed");
		Ok(corpus)
	}

	/// Reads and parses a corpus file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let lines = read_file(path)?;
		Self::parse(lines)
	}

	/// Builds a corpus from in-memory pairs.
	///
	/// # Errors
	/// `MalformedCorpus` if a word is empty or contains whitespace; `line`
	/// is the 1-based position of the pair.
	pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
	where
		I: IntoIterator<Item = (S, u64)>,
		S: Into<String>,
	{
		let mut corpus = Self::new();
		for (i, (word, frequency)) in pairs.into_iter().enumerate() {
			let word = word.into();
			if word.is_empty() || word.chars().any(char::is_whitespace) {
				return Err(SynthesisError::MalformedCorpus {
					line: i + 1,
					reason: format!("word {word:?} is empty or contains whitespace"),
				});
			}
			corpus.upsert(&word, frequency);
		}
		Ok(corpus)
	}

	fn upsert(&mut self, word: &str, frequency: u64) {
		match self.index.get(word) {
			Some(&i) => self.entries[i].1 = frequency,
			None => {
				self.index.insert(word.to_owned(), self.entries.len());
				self.entries.push((word.to_owned(), frequency));
			}
		}
	}

	/// Returns `true` if `word` is a corpus entry, whatever its frequency.
	pub fn contains(&self, word: &str) -> bool {
		self.index.contains_key(word)
	}

	/// Returns the frequency of `word`.
	pub fn frequency(&self, word: &str) -> Option<u64> {
		self.index.get(word).map(|&i| self.entries[i].1)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates `(word, frequency)` in first-insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.entries.iter().map(|(word, frequency)| (word.as_str(), *frequency))
	}

	/// Sums frequencies by word length (in characters).
	///
	/// # Errors
	/// `WeightOverflow` if a length's total does not fit in a `u64`.
	pub fn length_frequencies(&self) -> Result<BTreeMap<usize, u64>> {
		let mut lengths: BTreeMap<usize, u64> = BTreeMap::new();
		for (word, frequency) in self.iter() {
			let length = word.chars().count();
			let total = lengths.entry(length).or_insert(0);
			*total = total
				.checked_add(frequency)
				.ok_or_else(|| SynthesisError::WeightOverflow { what: format!("words of length {length}") })?;
		}
		Ok(lengths)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_reads_words_and_frequencies() {
		let corpus = Corpus::parse(["cat 5", "dog\t5", "  bat   3  "]).unwrap();
		assert_eq!(corpus.len(), 3);
		assert_eq!(corpus.frequency("cat"), Some(5));
		assert_eq!(corpus.frequency("dog"), Some(5));
		assert_eq!(corpus.frequency("bat"), Some(3));
		let words: Vec<&str> = corpus.iter().map(|(w, _)| w).collect();
		assert_eq!(words, vec!["cat", "dog", "bat"]);
	}

	#[test]
	fn parse_skips_blank_lines() {
		let corpus = Corpus::parse(["", "cat 1", "   ", "dog 2", ""]).unwrap();
		assert_eq!(corpus.len(), 2);
	}

	#[test]
	fn parse_accepts_zero_frequency() {
		let corpus = Corpus::parse(["ghost 0"]).unwrap();
		assert!(corpus.contains("ghost"));
		assert_eq!(corpus.frequency("ghost"), Some(0));
	}

	#[test]
	fn duplicate_word_keeps_position_and_last_frequency() {
		let corpus = Corpus::parse(["cat 1", "dog 2", "cat 9"]).unwrap();
		assert_eq!(corpus.len(), 2);
		let entries: Vec<(&str, u64)> = corpus.iter().collect();
		assert_eq!(entries, vec![("cat", 9), ("dog", 2)]);
	}

	#[test]
	fn parse_rejects_missing_frequency() {
		let err = Corpus::parse(["cat 1", "dog"]).unwrap_err();
		assert!(matches!(err, SynthesisError::MalformedCorpus { line: 2, .. }), "{err}");
	}

	#[test]
	fn parse_rejects_extra_tokens() {
		let err = Corpus::parse(["cat 1 2"]).unwrap_err();
		assert!(matches!(err, SynthesisError::MalformedCorpus { line: 1, .. }));
	}

	#[test]
	fn parse_rejects_negative_and_non_numeric_frequencies() {
		for line in ["cat -1", "cat x", "cat 1.5"] {
			let err = Corpus::parse([line]).unwrap_err();
			assert!(matches!(err, SynthesisError::MalformedCorpus { line: 1, .. }), "{line}");
		}
	}

	#[test]
	fn from_pairs_rejects_whitespace_words() {
		assert!(Corpus::from_pairs([("ok", 1), ("not ok", 1)]).is_err());
		assert!(Corpus::from_pairs([("", 1)]).is_err());
	}

	#[test]
	fn length_frequencies_sum_by_char_count() {
		let corpus = Corpus::from_pairs([("cat", 5), ("dog", 5), ("horse", 2), ("été", 1)]).unwrap();
		let lengths = corpus.length_frequencies().unwrap();
		assert_eq!(lengths.get(&3), Some(&11));
		assert_eq!(lengths.get(&5), Some(&2));
		assert_eq!(lengths.len(), 2);
	}

	#[test]
	fn length_frequencies_report_overflow() {
		let corpus = Corpus::parse(["abc 18446744073709551615", "abd 2", "wxyz 7"]).unwrap();
		let err = corpus.length_frequencies().unwrap_err();
		assert!(matches!(err, SynthesisError::WeightOverflow { .. }), "{err}");
	}

	#[test]
	fn load_reports_missing_file() {
		let err = Corpus::load("/nonexistent/corpus.txt").unwrap_err();
		assert!(matches!(err, SynthesisError::Io(_)));
	}
}
