//! Trigram similarity with the same semantics as PostgreSQL `pg_trgm`:
//! every alphanumeric word is padded with two leading spaces and one trailing
//! space, and similarity is |shared| / |union| over the trigram sets.

use std::collections::HashSet;

/// Precomputed trigram set of one string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrigramSet {
    grams: HashSet<[char; 3]>,
}

impl TrigramSet {
    pub fn new(text: &str) -> Self {
        let mut grams = HashSet::new();
        let lower = text.to_lowercase();
        for word in lower.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
            for window in padded.windows(3) {
                grams.insert([window[0], window[1], window[2]]);
            }
        }
        Self { grams }
    }

    pub fn len(&self) -> usize {
        self.grams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    /// Similarity in [0, 1]. Two empty sets have similarity 0.
    pub fn similarity(&self, other: &TrigramSet) -> f64 {
        if self.grams.is_empty() || other.grams.is_empty() {
            return 0.0;
        }
        let shared = self.grams.intersection(&other.grams).count();
        let union = self.grams.len() + other.grams.len() - shared;
        shared as f64 / union as f64
    }

    /// The `<->` distance operator: `1 - similarity`.
    pub fn distance(&self, other: &TrigramSet) -> f64 {
        1.0 - self.similarity(other)
    }
}

pub fn similarity(a: &str, b: &str) -> f64 {
    TrigramSet::new(a).similarity(&TrigramSet::new(b))
}

pub fn distance(a: &str, b: &str) -> f64 {
    1.0 - similarity(a, b)
}

#[cfg(test)]
#[path = "tests/trigram_tests.rs"]
mod tests;
