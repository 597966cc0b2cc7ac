//! Cat face recognition primitives.
//!
//! - [`features`] -- image → embedding extraction behind the [`FeatureExtractor`] trait.
//! - [`signature`] -- embeddings, binary hashes, and the distance metrics between them.
//! - [`matcher`] -- ranking a query signature against stored reference images.
//!
//! Everything here is synchronous and CPU-bound; callers in async contexts
//! should run it on a blocking thread.

pub mod features;
pub mod matcher;
pub mod signature;

pub use features::{ColorLayoutExtractor, FeatureExtractor};
pub use matcher::{match_against, MatchOptions, RecognitionResult, Reference};
pub use signature::{CatRecognizer, Signature};
