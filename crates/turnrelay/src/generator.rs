//! Synthetic text for the Produce stage.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Space-separated random lowercase words.
#[derive(Debug, Clone)]
pub struct WordGenerator {
    word_count: usize,
    min_length: usize,
    max_length: usize,
    alphabet: Vec<char>,
}

impl Default for WordGenerator {
    fn default() -> Self {
        Self {
            word_count: Self::DEFAULT_WORD_COUNT,
            min_length: Self::DEFAULT_MIN_LENGTH,
            max_length: Self::DEFAULT_MAX_LENGTH,
            alphabet: Self::DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl WordGenerator {
    pub const DEFAULT_WORD_COUNT: usize = 1000;
    pub const DEFAULT_MIN_LENGTH: usize = 3;
    pub const DEFAULT_MAX_LENGTH: usize = 15;
    pub const DEFAULT_ALPHABET: &'static str = "abcdefghijklmnopqrstuvwxyz";

    pub fn new(word_count: usize, min_length: usize, max_length: usize) -> Self {
        Self {
            word_count,
            min_length,
            max_length,
            ..Self::default()
        }
    }

    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = alphabet.chars().collect();
        self
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Generate with `rng`. Word lengths are uniform in `min_length..=max_length`.
    ///
    /// An empty alphabet or an inverted length range yields an empty string.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        if self.alphabet.is_empty() || self.min_length > self.max_length {
            return String::new();
        }

        let mut text =
            String::with_capacity(self.word_count.saturating_mul(self.max_length.saturating_add(1)));
        for i in 0..self.word_count {
            if i > 0 {
                text.push(' ');
            }
            let length = rng.gen_range(self.min_length..=self.max_length);
            text.extend((0..length).map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())]));
        }
        text
    }

    /// Generate from a fixed seed, or from OS entropy when `seed` is `None`.
    pub fn generate_seeded(&self, seed: Option<u64>) -> String {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::split_words;

    #[test]
    fn default_generator_matches_word_count_and_lengths() {
        let text = WordGenerator::default().generate_seeded(Some(7));
        let words = split_words(&text);

        assert_eq!(words.len(), 1000);
        assert!(words.iter().all(|w| (3..=15).contains(&w.len())));
        assert!(words.iter().all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
        assert!(!text.contains("  "));
    }

    #[test]
    fn same_seed_same_text() {
        let generator = WordGenerator::new(50, 2, 6);
        assert_eq!(
            generator.generate_seeded(Some(42)),
            generator.generate_seeded(Some(42))
        );
        assert_ne!(
            generator.generate_seeded(Some(42)),
            generator.generate_seeded(Some(43))
        );
    }

    #[test]
    fn custom_alphabet_is_respected() {
        let text = WordGenerator::new(20, 1, 4)
            .with_alphabet("xy")
            .generate_seeded(Some(1));
        assert!(text.chars().all(|c| c == 'x' || c == 'y' || c == ' '));
    }

    #[test]
    fn degenerate_settings_yield_empty_text() {
        assert!(WordGenerator::new(10, 5, 4).generate_seeded(Some(1)).is_empty());
        assert!(
            WordGenerator::new(10, 1, 4)
                .with_alphabet("")
                .generate_seeded(Some(1))
                .is_empty()
        );
        assert!(WordGenerator::new(0, 1, 4).generate_seeded(Some(1)).is_empty());
    }

    #[test]
    fn extreme_sizes_do_not_overflow_capacity() {
        assert!(WordGenerator::new(0, 1, usize::MAX).generate_seeded(Some(1)).is_empty());
    }
}
