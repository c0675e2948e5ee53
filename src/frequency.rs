//! Per-letter frequency analysis.
//!
//! Counts the occurrence of each letter (`a`–`z`) and computes Shannon
//! entropy. Workers build a local [`Histogram`] from their finished run
//! list, then fold it into the shared one with [`Histogram::merge_from`].

use crate::alphabet::{letter_index, ALPHABET_LEN};
use crate::rle::Run;

/// A histogram of letter occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Histogram {
    /// Count of each letter (index = `letter - b'a'`).
    pub counts: [u64; ALPHABET_LEN],
}

impl Histogram {
    /// Create a new, zeroed histogram.
    pub fn new() -> Self {
        Self {
            counts: [0u64; ALPHABET_LEN],
        }
    }

    /// Tally a finished run list.
    pub fn from_runs(runs: &[Run]) -> Self {
        let mut hist = Self::new();
        hist.add_runs(runs);
        hist
    }

    /// Add every run's count to its letter.
    ///
    /// Runs whose symbol is outside the alphabet are ignored; validated
    /// input never produces them.
    pub fn add_runs(&mut self, runs: &[Run]) {
        for run in runs {
            if let Some(i) = letter_index(run.symbol) {
                self.counts[i] += run.count as u64;
            }
        }
    }

    /// Add all 26 counts of `other` into `self`.
    pub fn merge_from(&mut self, other: &Histogram) {
        for (dst, &src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += src;
        }
    }

    /// Get the count for a letter; 0 for bytes outside `a`–`z`.
    pub fn get(&self, letter: u8) -> u64 {
        letter_index(letter).map_or(0, |i| self.counts[i])
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of distinct letters with nonzero count.
    pub fn used(&self) -> u32 {
        self.counts.iter().filter(|&&c| c > 0).count() as u32
    }

    /// Compute the Shannon entropy of the distribution (in bits per symbol).
    ///
    /// Returns 0.0 if the histogram is empty.
    pub fn entropy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let total = total as f32;
        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let prob = c as f32 / total;
                -prob * prob.log2()
            })
            .sum()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function: count letters directly from raw input.
pub fn get_frequency(input: &[u8]) -> Histogram {
    let mut hist = Histogram::new();
    for &b in input {
        if let Some(i) = letter_index(b) {
            hist.counts[i] += 1;
        }
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle;

    #[test]
    fn test_empty() {
        let hist = Histogram::from_runs(&[]);
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.used(), 0);
        assert_eq!(hist.entropy(), 0.0);
    }

    #[test]
    fn test_known_frequencies() {
        let hist = Histogram::from_runs(&rle::encode(b"aaabbbcccd"));
        assert_eq!(hist.get(b'a'), 3);
        assert_eq!(hist.get(b'b'), 3);
        assert_eq!(hist.get(b'c'), 3);
        assert_eq!(hist.get(b'd'), 1);
        assert_eq!(hist.get(b'e'), 0);
        assert_eq!(hist.total(), 10);
        assert_eq!(hist.used(), 4);
    }

    #[test]
    fn test_from_runs_matches_direct_count() {
        let input = b"thequickbrownfoxjumpsoverthelazydog";
        assert_eq!(Histogram::from_runs(&rle::encode(input)), get_frequency(input));
    }

    #[test]
    fn test_merge_is_additive() {
        let mut a = get_frequency(b"aabz");
        let b = get_frequency(b"abzz");
        a.merge_from(&b);
        assert_eq!(a.get(b'a'), 3);
        assert_eq!(a.get(b'b'), 2);
        assert_eq!(a.get(b'z'), 3);
        assert_eq!(a.total(), 8);
    }

    #[test]
    fn test_get_outside_alphabet() {
        let hist = get_frequency(b"abc");
        assert_eq!(hist.get(b'A'), 0);
        assert_eq!(hist.get(0xFF), 0);
    }

    #[test]
    fn test_uniform_distribution() {
        let input: Vec<u8> = (b'a'..=b'z').collect();
        let hist = get_frequency(&input);
        assert_eq!(hist.used(), 26);
        let expected = (26f32).log2();
        let entropy = hist.entropy();
        assert!((entropy - expected).abs() < 0.01, "entropy was {}", entropy);
    }

    #[test]
    fn test_two_equal_symbols() {
        let mut input = vec![b'a'; 50];
        input.extend(vec![b'b'; 50]);
        let entropy = get_frequency(&input).entropy();
        assert!((entropy - 1.0).abs() < 0.01, "entropy was {}", entropy);
    }
}
