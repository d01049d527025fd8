use std::collections::VecDeque;

use rand::Rng;
use tracing::error;

use super::transition_table::{BiasTable, Context, Direction, BOUNDARY};
use crate::error::{Result, SynthesisError};

/// Safety bounds for a single name walk.
///
/// Walks end on their own with probability 1, but nothing bounds their
/// length. An attempt longer than `max_name_length` is thrown away and
/// restarted; `max_attempts` consecutive throw-aways is a fatal error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorLimits {
	pub max_name_length: usize,
	pub max_attempts: usize,
}

impl Default for GeneratorLimits {
	fn default() -> Self {
		Self { max_name_length: 256, max_attempts: 1000 }
	}
}

/// Produces names by walking a bias table from the word boundary.
///
/// The walk direction follows the table: a forward table appends symbols
/// and looks up the last two characters, a backward table prepends them
/// and looks up the first two. The boundary symbol ends the name.
///
/// Each name is independent; the generator holds no state besides the
/// table and its limits.
#[derive(Clone, Copy, Debug)]
pub struct NameGenerator<'t> {
	table: &'t BiasTable,
	limits: GeneratorLimits,
}

impl<'t> NameGenerator<'t> {
	pub fn new(table: &'t BiasTable, limits: GeneratorLimits) -> Self {
		Self { table, limits }
	}

	pub fn direction(&self) -> Direction {
		self.table.direction()
	}

	/// Generates one name, retrying walks that overrun the length cap.
	///
	/// # Errors
	/// - `GenerationExhausted` after `max_attempts` overruns in a row
	/// - `MissingContext` if the table is not closed under its own walks
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		for _ in 0..self.limits.max_attempts {
			if let Some(name) = self.walk(rng)? {
				return Ok(name);
			}
		}
		error!(
			direction = ?self.direction(),
			attempts = self.limits.max_attempts,
			max_name_length = self.limits.max_name_length,
			"name generation never reached a boundary"
		);
		Err(SynthesisError::GenerationExhausted {
			attempts: self.limits.max_attempts,
			max_name_length: self.limits.max_name_length,
		})
	}

	/// Lazy, endless stream of names.
	pub fn names<'a, R: Rng + ?Sized>(&'a self, rng: &'a mut R) -> impl Iterator<Item = Result<String>> + 'a {
		std::iter::repeat_with(move || self.generate(rng))
	}

	/// One walk from the boundary. `None` if it overran the length cap.
	fn walk<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<String>> {
		let mut name: VecDeque<char> = VecDeque::new();
		let mut context = Context::EDGE;
		loop {
			let sampler = self
				.table
				.get(&context)
				.ok_or_else(|| SynthesisError::MissingContext { context: context.to_string() })?;
			let symbol = *sampler.pick(rng);
			if symbol == BOUNDARY {
				return Ok(Some(name.into_iter().collect()));
			}
			if name.len() >= self.limits.max_name_length {
				return Ok(None);
			}

			let [first, second] = context.0;
			context = match self.table.direction() {
				Direction::Forward => {
					name.push_back(symbol);
					Context([second, symbol])
				}
				Direction::Backward => {
					name.push_front(symbol);
					Context([symbol, first])
				}
			};
		}
	}
}
