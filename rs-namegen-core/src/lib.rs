//! Corpus-driven name synthesis library.
//!
//! This crate invents novel words that statistically resemble a weighted
//! corpus without reproducing it:
//! - Forward and backward character transition models (2-character contexts)
//! - Weighted sampling over observed transitions
//! - Consensus filtering between both directions
//! - Length-biased resampling toward the corpus length profile
//!
//! All state is owned by the caller; the random source is always injected.

/// Corpus, transition models and the synthesis pipeline.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (file loading).
///
/// Not exposed
pub(crate) mod io;

pub use error::{Result, SynthesisError};
pub use model::corpus::Corpus;
pub use model::pipeline::{synthesize, SynthesisConfig, Synthesizer};
