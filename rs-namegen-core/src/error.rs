use std::io;

/// Errors raised while loading a corpus or synthesizing names.
///
/// Running out of candidates during resampling is not an error: a
/// smaller-than-requested result is a valid outcome of a synthesis pass.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
	/// A corpus entry could not be read as `word frequency`.
	/// `line` is 1-based.
	#[error("malformed corpus entry at line {line}: {reason}")]
	MalformedCorpus { line: usize, reason: String },

	/// A weighted sampler was built from no outcomes, or only zero weights.
	#[error("cannot sample from an empty or all-zero distribution")]
	EmptyDistribution,

	/// Summed frequencies no longer fit in a `u64`.
	#[error("frequency total overflows u64 while summing {what}")]
	WeightOverflow { what: String },

	/// The walk reached a context the bias table does not know.
	/// Tables produced by the builder never trigger this.
	#[error("no transitions recorded for context {context:?}")]
	MissingContext { context: String },

	/// Every attempt to generate a name ran past the length cap.
	#[error("generation did not terminate after {attempts} attempts (cap {max_name_length} chars)")]
	GenerationExhausted { attempts: usize, max_name_length: usize },

	#[error("IO error: {0}")]
	Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
