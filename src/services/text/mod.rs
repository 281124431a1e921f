//! Text canonicalization and approximate string similarity for card names.

pub mod normalizer;
pub mod trigram;

pub use normalizer::normalize;
