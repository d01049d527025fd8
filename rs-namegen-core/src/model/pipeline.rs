use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use super::corpus::Corpus;
use super::generator::{GeneratorLimits, NameGenerator};
use super::sampler::WeightedSampler;
use super::transition_table::{BiasTable, Direction};
use crate::error::Result;

/// Parameters of one synthesis pass.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
	/// Unique names to collect from the left-to-right model.
	pub forward_pool_size: usize,

	/// Unique names to collect from the right-to-left model.
	pub backward_pool_size: usize,

	/// Length draws made while resampling; upper bound of the result size.
	pub output_size: usize,

	/// Consecutive duplicate draws after which a pool stops growing.
	/// Some corpora admit fewer distinct names than the pool size.
	pub stall_limit: usize,

	/// Longest name a walk may build before it is restarted.
	pub max_name_length: usize,

	/// Restarts allowed for a single name before giving up.
	pub max_attempts: usize,
}

impl Default for SynthesisConfig {
	fn default() -> Self {
		let limits = GeneratorLimits::default();
		Self {
			forward_pool_size: 100_000,
			backward_pool_size: 100_000,
			output_size: 1_200,
			stall_limit: 10_000,
			max_name_length: limits.max_name_length,
			max_attempts: limits.max_attempts,
		}
	}
}

impl SynthesisConfig {
	pub fn limits(&self) -> GeneratorLimits {
		GeneratorLimits { max_name_length: self.max_name_length, max_attempts: self.max_attempts }
	}
}

/// Unique generated names from one direction, in generation order.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
	names: Vec<String>,
	seen: HashSet<String>,
}

impl CandidatePool {
	/// Draws from `names` until `size` distinct names are held.
	///
	/// Duplicates are dropped without counting. Collection also stops,
	/// with a warning, once `stall_limit` draws in a row were duplicates.
	pub fn collect<I>(names: I, size: usize, stall_limit: usize) -> Result<Self>
	where
		I: IntoIterator<Item = Result<String>>,
	{
		let mut names = names.into_iter();
		let mut pool = Self::default();
		let mut stalled = 0;
		while pool.len() < size {
			let Some(name) = names.next() else { break };
			if pool.insert(name?) {
				stalled = 0;
				continue;
			}
			stalled += 1;
			if stalled >= stall_limit {
				warn!(collected = pool.len(), requested = size, stall_limit, "candidate pool stopped growing");
				break;
			}
		}
		Ok(pool)
	}

	/// Adds `name`; returns `false` if it was already present.
	pub fn insert(&mut self, name: String) -> bool {
		if self.seen.contains(&name) {
			return false;
		}
		self.seen.insert(name.clone());
		self.names.push(name);
		true
	}

	pub fn contains(&self, name: &str) -> bool {
		self.seen.contains(name)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.names.iter().map(String::as_str)
	}
}

/// Models derived from one corpus, reusable across synthesis passes.
///
/// # Responsibilities
/// - Build the forward and backward bias tables once
/// - Build the length sampler from the corpus length profile
/// - Run passes: pools, consensus, corpus exclusion, length resampling
#[derive(Clone, Debug)]
pub struct Synthesizer<'c> {
	corpus: &'c Corpus,
	forward: BiasTable,
	backward: BiasTable,
	length_bias: WeightedSampler<usize>,
}

impl<'c> Synthesizer<'c> {
	/// # Errors
	/// - `EmptyDistribution` if no corpus word has a positive frequency
	/// - `WeightOverflow` if summed frequencies do not fit in a `u64`
	pub fn new(corpus: &'c Corpus) -> Result<Self> {
		let _span = debug_span!("build_models", words = corpus.len()).entered();
		Ok(Self {
			corpus,
			forward: BiasTable::forward(corpus)?,
			backward: BiasTable::backward(corpus)?,
			length_bias: WeightedSampler::new(corpus.length_frequencies()?)?,
		})
	}

	pub fn corpus(&self) -> &Corpus {
		self.corpus
	}

	pub fn table(&self, direction: Direction) -> &BiasTable {
		match direction {
			Direction::Forward => &self.forward,
			Direction::Backward => &self.backward,
		}
	}

	pub fn length_bias(&self) -> &WeightedSampler<usize> {
		&self.length_bias
	}

	/// Collects a candidate pool from the model of `direction`.
	pub fn pool<R: Rng + ?Sized>(
		&self,
		direction: Direction,
		size: usize,
		config: &SynthesisConfig,
		rng: &mut R,
	) -> Result<CandidatePool> {
		let generator = NameGenerator::new(self.table(direction), config.limits());
		let pool = CandidatePool::collect(generator.names(rng), size, config.stall_limit)?;
		debug!(?direction, requested = size, collected = pool.len(), "candidate pool ready");
		Ok(pool)
	}

	/// Names present in both pools and absent from the corpus, in
	/// `forward` order.
	pub fn consensus(&self, forward: &CandidatePool, backward: &CandidatePool) -> Vec<String> {
		let shared: Vec<&str> = forward.iter().filter(|name| backward.contains(name)).collect();
		let novel: Vec<String> = shared
			.iter()
			.filter(|name| !self.corpus.contains(name))
			.map(|name| (*name).to_owned())
			.collect();
		debug!(shared = shared.len(), novel = novel.len(), "consensus computed");
		novel
	}

	/// Runs one synthesis pass.
	///
	/// The result may hold fewer than `output_size` names: length draws
	/// that find their length group empty are skipped.
	pub fn synthesize<R: Rng + ?Sized>(&self, config: &SynthesisConfig, rng: &mut R) -> Result<BTreeSet<String>> {
		let _span = debug_span!(
			"synthesize",
			forward_pool = config.forward_pool_size,
			backward_pool = config.backward_pool_size,
			output = config.output_size
		)
		.entered();

		let forward = self.pool(Direction::Forward, config.forward_pool_size, config, rng)?;
		let backward = self.pool(Direction::Backward, config.backward_pool_size, config, rng)?;
		let candidates = self.consensus(&forward, &backward);
		let names = resample_by_length(candidates, &self.length_bias, config.output_size, rng);
		debug!(names = names.len(), "synthesis done");
		Ok(names)
	}
}

/// Builds the models of `corpus` and runs a single pass.
pub fn synthesize<R: Rng + ?Sized>(corpus: &Corpus, config: &SynthesisConfig, rng: &mut R) -> Result<BTreeSet<String>> {
	Synthesizer::new(corpus)?.synthesize(config, rng)
}

/// Draws `output_size` lengths from `length_bias`; each draw moves one
/// random candidate of that length into the result, or does nothing if
/// none is left.
pub fn resample_by_length<I, R>(
	candidates: I,
	length_bias: &WeightedSampler<usize>,
	output_size: usize,
	rng: &mut R,
) -> BTreeSet<String>
where
	I: IntoIterator<Item = String>,
	R: Rng + ?Sized,
{
	let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
	for name in candidates {
		groups.entry(name.chars().count()).or_default().push(name);
	}

	let mut result = BTreeSet::new();
	for _ in 0..output_size {
		let length = *length_bias.pick(rng);
		if let Some(group) = groups.get_mut(&length).filter(|group| !group.is_empty()) {
			let index = rng.random_range(0..group.len());
			result.insert(group.swap_remove(index));
		}
	}
	result
}
