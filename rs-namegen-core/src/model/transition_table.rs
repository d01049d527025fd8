use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, debug_span};

use super::corpus::Corpus;
use super::sampler::WeightedSampler;
use crate::error::{Result, SynthesisError};

/// Marks the start and end of a word. Corpus words never contain it.
pub const BOUNDARY: char = ' ';

/// Two characters adjacent to the symbol being predicted.
///
/// Forward tables key on the two characters to the left of the symbol,
/// backward tables on the two characters to its right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context(pub [char; 2]);

impl Context {
	/// Both positions on the boundary: where every walk starts.
	pub const EDGE: Context = Context([BOUNDARY, BOUNDARY]);
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.0[0], self.0[1])
	}
}

/// Reading direction of a table and of the names generated from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// Left to right: context precedes the symbol, names grow at the end.
	Forward,
	/// Right to left: context follows the symbol, names grow at the front.
	Backward,
}

/// Accumulated symbol weights per context, before conversion to samplers.
///
/// # Invariants
/// - Every recorded weight comes from a word with positive frequency
/// - Both maps are ordered, so tables built from the same corpus are identical
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
	direction: Direction,
	contexts: BTreeMap<Context, BTreeMap<char, u64>>,
}

impl FrequencyTable {
	fn empty(direction: Direction) -> Self {
		Self { direction, contexts: BTreeMap::new() }
	}

	fn record(&mut self, context: Context, symbol: char, frequency: u64) -> Result<()> {
		let weight = self.contexts.entry(context).or_default().entry(symbol).or_insert(0);
		*weight = weight.checked_add(frequency).ok_or_else(|| SynthesisError::WeightOverflow {
			what: format!("symbol {symbol:?} after context \"{context}\""),
		})?;
		Ok(())
	}

	/// Pads every word as `"  " + word + "  "` and records, for each
	/// position up to one past the last letter, the two characters before
	/// it against the character at it.
	///
	/// The final position always records the boundary, so every suffix
	/// context can end a name.
	///
	/// # Errors
	/// `WeightOverflow` if a symbol's accumulated weight exceeds `u64::MAX`.
	pub fn forward(corpus: &Corpus) -> Result<Self> {
		let _span = debug_span!("forward_table", words = corpus.len()).entered();
		let mut table = Self::empty(Direction::Forward);
		for (word, frequency) in corpus.iter().filter(|(_, f)| *f > 0) {
			let padded = pad(word);
			let letters = padded.len() - 4;
			for j in 0..=letters {
				let context = Context([padded[j], padded[j + 1]]);
				table.record(context, padded[j + 2], frequency)?;
			}
		}
		debug!(contexts = table.len(), "forward table built");
		Ok(table)
	}

	/// Mirror of [`FrequencyTable::forward`]: records the two characters
	/// after each position against the character at it, from the leading
	/// padding through the last letter.
	pub fn backward(corpus: &Corpus) -> Result<Self> {
		let _span = debug_span!("backward_table", words = corpus.len()).entered();
		let mut table = Self::empty(Direction::Backward);
		for (word, frequency) in corpus.iter().filter(|(_, f)| *f > 0) {
			let padded = pad(word);
			let letters = padded.len() - 4;
			for j in 0..letters + 2 {
				let context = Context([padded[j + 1], padded[j + 2]]);
				table.record(context, padded[j], frequency)?;
			}
		}
		debug!(contexts = table.len(), "backward table built");
		Ok(table)
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Returns the symbol weights recorded for `context`.
	pub fn symbols(&self, context: &Context) -> Option<&BTreeMap<char, u64>> {
		self.contexts.get(context)
	}

	/// Converts each context's symbol weights into a sampler.
	///
	/// # Errors
	/// - `EmptyDistribution` if the table holds no context, which happens
	///   when no corpus word has a positive frequency
	/// - `WeightOverflow` if one context's symbol weights sum past `u64::MAX`
	pub fn into_bias_table(self) -> Result<BiasTable> {
		if self.contexts.is_empty() {
			return Err(SynthesisError::EmptyDistribution);
		}
		let mut samplers = HashMap::with_capacity(self.contexts.len());
		for (context, symbols) in self.contexts {
			samplers.insert(context, WeightedSampler::new(symbols)?);
		}
		Ok(BiasTable { direction: self.direction, samplers })
	}
}

/// Splits `"  " + word + "  "` into characters.
fn pad(word: &str) -> Vec<char> {
	let mut padded = Vec::with_capacity(word.len() + 4);
	padded.extend([BOUNDARY, BOUNDARY]);
	padded.extend(word.chars());
	padded.extend([BOUNDARY, BOUNDARY]);
	padded
}

/// Read-only context → sampler lookup used during generation.
#[derive(Clone, Debug)]
pub struct BiasTable {
	direction: Direction,
	samplers: HashMap<Context, WeightedSampler<char>>,
}

impl BiasTable {
	/// Builds the left-to-right bias table of `corpus`.
	pub fn forward(corpus: &Corpus) -> Result<Self> {
		FrequencyTable::forward(corpus)?.into_bias_table()
	}

	/// Builds the right-to-left bias table of `corpus`.
	pub fn backward(corpus: &Corpus) -> Result<Self> {
		FrequencyTable::backward(corpus)?.into_bias_table()
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	pub fn get(&self, context: &Context) -> Option<&WeightedSampler<char>> {
		self.samplers.get(context)
	}

	pub fn len(&self) -> usize {
		self.samplers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.samplers.is_empty()
	}
}
