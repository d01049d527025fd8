use rand::Rng;

use crate::error::{Result, SynthesisError};

/// Draws outcomes with probability proportional to their weight.
///
/// Outcomes are stored by descending weight (ties keep their input order)
/// alongside a running cumulative sum, so a draw is a single search over
/// the cumulative sequence.
///
/// ## Invariants
/// - At least one outcome, every stored weight strictly positive
/// - `cumulative` is strictly increasing and its last element is `total`
#[derive(Clone, Debug)]
pub struct WeightedSampler<T> {
	outcomes: Vec<T>,
	cumulative: Vec<u64>,
	total: u64,
}

impl<T> WeightedSampler<T> {
	/// Builds a sampler from `(outcome, weight)` pairs.
	///
	/// Zero weights are dropped, they could never be drawn.
	///
	/// # Errors
	/// - `EmptyDistribution` if no outcome carries a positive weight
	/// - `WeightOverflow` if the weights sum past `u64::MAX`
	pub fn new<I>(weights: I) -> Result<Self>
	where
		I: IntoIterator<Item = (T, u64)>,
	{
		let mut entries: Vec<(T, u64)> = weights.into_iter().filter(|(_, weight)| *weight > 0).collect();
		if entries.is_empty() {
			return Err(SynthesisError::EmptyDistribution);
		}

		// `sort_by` is stable, equal weights stay in input order
		entries.sort_by(|a, b| b.1.cmp(&a.1));

		let mut outcomes = Vec::with_capacity(entries.len());
		let mut cumulative = Vec::with_capacity(entries.len());
		let mut total: u64 = 0;
		for (outcome, weight) in entries {
			total = total
				.checked_add(weight)
				.ok_or_else(|| SynthesisError::WeightOverflow { what: "sampler weights".to_owned() })?;
			outcomes.push(outcome);
			cumulative.push(total);
		}

		Ok(Self { outcomes, cumulative, total })
	}

	/// Draws one outcome using `rng`.
	///
	/// The draw is an integer in `[0, total)`, so it always lands inside
	/// the cumulative range.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
		let r = rng.random_range(0..self.total);
		self.select(r)
	}

	/// Maps a uniform value `u` in `[0, 1)` to an outcome.
	///
	/// Entry point for callers that bring their own float random source
	/// (a `() -> f64` in `[0, 1)`) instead of a `rand::Rng`.
	///
	/// `u` is clamped into the half-open range first: `1.0`, negatives
	/// and NaN still return an outcome instead of running off the end.
	pub fn pick_unit(&self, u: f64) -> &T {
		let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
		let r = ((u * self.total as f64) as u64).min(self.total - 1);
		self.select(r)
	}

	/// Returns the first outcome whose cumulative weight exceeds `r`.
	fn select(&self, r: u64) -> &T {
		let index = self.cumulative.partition_point(|&c| c <= r);
		&self.outcomes[index]
	}

	/// Sum of all weights.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct outcomes.
	pub fn len(&self) -> usize {
		self.outcomes.len()
	}

	/// Always `false`: an empty sampler cannot be constructed.
	pub fn is_empty(&self) -> bool {
		self.outcomes.is_empty()
	}

	/// Iterates `(outcome, weight)` in descending weight order.
	pub fn outcomes(&self) -> impl Iterator<Item = (&T, u64)> {
		let previous = std::iter::once(0).chain(self.cumulative.iter().copied());
		self.outcomes
			.iter()
			.zip(self.cumulative.iter().zip(previous))
			.map(|(outcome, (&cumulative, previous))| (outcome, cumulative - previous))
	}

	/// Returns the weight of `outcome`, or `None` if it cannot be drawn.
	pub fn weight_of(&self, outcome: &T) -> Option<u64>
	where
		T: PartialEq,
	{
		self.outcomes().find(|(o, _)| *o == outcome).map(|(_, weight)| weight)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn empty_mapping_is_rejected() {
		let result = WeightedSampler::<char>::new(Vec::new());
		assert!(matches!(result, Err(SynthesisError::EmptyDistribution)));
	}

	#[test]
	fn all_zero_weights_are_rejected() {
		let result = WeightedSampler::new(vec![('a', 0), ('b', 0)]);
		assert!(matches!(result, Err(SynthesisError::EmptyDistribution)));
	}

	#[test]
	fn zero_weights_are_dropped() {
		let sampler = WeightedSampler::new(vec![('a', 0), ('b', 2)]).unwrap();
		assert_eq!(sampler.len(), 1);
		assert_eq!(sampler.weight_of(&'a'), None);
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..100 {
			assert_eq!(*sampler.pick(&mut rng), 'b');
		}
	}

	#[test]
	fn outcomes_sorted_by_descending_weight_with_stable_ties() {
		let sampler = WeightedSampler::new(vec![('x', 2), ('y', 5), ('z', 2), ('w', 1)]).unwrap();
		let ordered: Vec<(char, u64)> = sampler.outcomes().map(|(c, w)| (*c, w)).collect();
		assert_eq!(ordered, vec![('y', 5), ('x', 2), ('z', 2), ('w', 1)]);
		assert_eq!(sampler.cumulative, vec![5, 7, 9, 10]);
		assert_eq!(sampler.total(), 10);
	}

	#[test]
	fn pick_always_returns_a_known_outcome() {
		let weights = vec![("alpha", 7), ("beta", 1), ("gamma", 30), ("delta", 2)];
		let sampler = WeightedSampler::new(weights.clone()).unwrap();
		let mut rng = StdRng::seed_from_u64(42);
		for _ in 0..10_000 {
			let picked = sampler.pick(&mut rng);
			assert!(weights.iter().any(|(name, _)| name == picked));
		}
	}

	#[test]
	fn overflowing_total_is_rejected() {
		let result = WeightedSampler::new(vec![('a', u64::MAX), ('b', 1)]);
		assert!(matches!(result, Err(SynthesisError::WeightOverflow { .. })));
		let sampler = WeightedSampler::new(vec![('a', u64::MAX)]).unwrap();
		assert_eq!(sampler.total(), u64::MAX);
	}

	#[test]
	fn empirical_ratio_matches_weights() {
		let sampler = WeightedSampler::new(vec![('a', 1), ('b', 3)]).unwrap();
		let mut rng = StdRng::seed_from_u64(7);
		let draws = 100_000;
		let mut count_a = 0u64;
		for _ in 0..draws {
			if *sampler.pick(&mut rng) == 'a' {
				count_a += 1;
			}
		}
		let count_b = draws - count_a;

		let expected_a = draws as f64 * 0.25;
		let expected_b = draws as f64 * 0.75;
		let chi_square = (count_a as f64 - expected_a).powi(2) / expected_a
			+ (count_b as f64 - expected_b).powi(2) / expected_b;
		// 1 degree of freedom, p = 0.001
		assert!(chi_square < 10.828, "chi_square={chi_square}, a={count_a}, b={count_b}");
	}

	#[test]
	fn unit_draw_boundaries() {
		let sampler = WeightedSampler::new(vec![('a', 1), ('b', 3)]).unwrap();
		// Ordered b (0..3), a (3..4)
		assert_eq!(*sampler.pick_unit(0.0), 'b');
		assert_eq!(*sampler.pick_unit(0.74), 'b');
		assert_eq!(*sampler.pick_unit(0.75), 'a');
		assert_eq!(*sampler.pick_unit(1.0 - f64::EPSILON), 'a');
		assert_eq!(*sampler.pick_unit(1.0), 'a');
		assert_eq!(*sampler.pick_unit(7.5), 'a');
		assert_eq!(*sampler.pick_unit(-1.0), 'b');
		assert_eq!(*sampler.pick_unit(f64::NAN), 'b');
	}

	#[test]
	fn last_integer_draw_hits_last_outcome() {
		let sampler = WeightedSampler::new(vec![(1usize, 4), (2usize, 6)]).unwrap();
		assert_eq!(*sampler.select(sampler.total() - 1), 1);
		assert_eq!(*sampler.select(0), 2);
	}

	proptest! {
		#[test]
		fn pick_is_member_of_mapping(
			weights in prop::collection::btree_map(any::<char>(), 1u64..1_000, 1..20),
			seed in any::<u64>(),
		) {
			let sampler = WeightedSampler::new(weights.clone()).unwrap();
			prop_assert_eq!(sampler.total(), weights.values().sum::<u64>());
			let mut rng = StdRng::seed_from_u64(seed);
			for _ in 0..200 {
				prop_assert!(weights.contains_key(sampler.pick(&mut rng)));
			}
		}
	}
}
