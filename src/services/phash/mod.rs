//! Perceptual image hashing (64-bit dHash) and Hamming-distance search.

pub mod dhash;
pub mod visual_search;

pub use dhash::{compute_image_hash, dhash_image, hamming_distance, is_hex16, PerceptualHash};
pub use visual_search::{search_by_hash, VisualCandidate, VisualQuery};
