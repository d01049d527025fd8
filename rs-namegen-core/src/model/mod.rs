//! Top-level module for the name synthesis system.
//!
//! Components, leaves first:
//! - Weighted random selection (`WeightedSampler`)
//! - The input word list (`Corpus`)
//! - Directional transition tables (`FrequencyTable`, `BiasTable`)
//! - Name walks over a table (`NameGenerator`)
//! - The consensus and resampling pipeline (`Synthesizer`)

/// Weighted random selection over a fixed set of outcomes.
pub mod sampler;

/// Word → frequency mapping and its length profile.
pub mod corpus;

/// Forward and backward context tables built from a corpus.
///
/// A context is the two characters next to the symbol being predicted,
/// with the word padded by boundary spaces.
pub mod transition_table;

/// Name generation by walking a bias table one symbol at a time.
pub mod generator;

/// End-to-end synthesis: candidate pools, consensus, exclusion, resampling.
pub mod pipeline;
