//! Word-length counting over a shared, concurrently filled table.

use std::collections::BTreeMap;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::FanOutError;

/// Word length → number of words with exactly that length.
///
/// Keys are partitioned between counting tasks, so every length is written
/// once. A second write for the same length is rejected.
#[derive(Debug, Default)]
pub struct CountTable {
    counts: DashMap<usize, usize>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the count for `length`. Fails if the length already has one.
    pub fn record(&self, length: usize, count: usize) -> Result<(), FanOutError> {
        match self.counts.entry(length) {
            Entry::Occupied(_) => Err(FanOutError::DuplicateLength { length }),
            Entry::Vacant(slot) => {
                slot.insert(count);
                Ok(())
            }
        }
    }

    pub fn get(&self, length: usize) -> Option<usize> {
        self.counts.get(&length).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Ordered copy of the table.
    pub fn snapshot(&self) -> BTreeMap<usize, usize> {
        self.counts
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

impl FromIterator<(usize, usize)> for CountTable {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Split a blob into words on whitespace.
pub fn split_words(blob: &str) -> Vec<String> {
    blob.split_whitespace().map(str::to_owned).collect()
}

/// Number of words whose length (in characters) is exactly `length`.
pub fn words_of_length<S: AsRef<str>>(length: usize, words: &[S]) -> usize {
    words
        .iter()
        .filter(|word| word.as_ref().chars().count() == length)
        .count()
}

/// Count the words of `length` and store the result in `table`.
pub fn count_into<S: AsRef<str>>(
    length: usize,
    words: &[S],
    table: &CountTable,
) -> Result<usize, FanOutError> {
    let count = words_of_length(length, words);
    table.record(length, count)?;
    tracing::trace!(length, count, "Counted words");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_exact_length_only() {
        assert_eq!(words_of_length(2, &["a", "bb", "cc", "ddd"]), 2);
        assert_eq!(words_of_length(2, &["ab", "abc", "de", "fg"]), 3);
        assert_eq!(words_of_length(3, &["ab", "abc", "de", "fg"]), 1);
    }

    #[test]
    fn empty_word_list_counts_zero() {
        let words: [&str; 0] = [];
        assert_eq!(words_of_length(4, &words), 0);

        let table = CountTable::new();
        assert_eq!(count_into(4, &words, &table).unwrap(), 0);
        assert_eq!(table.get(4), Some(0));
    }

    #[test]
    fn length_is_measured_in_characters() {
        assert_eq!(words_of_length(3, &["née", "abc", "ab"]), 2);
    }

    #[test]
    fn split_ignores_repeated_whitespace() {
        assert_eq!(split_words("ab  cde\nf "), vec!["ab", "cde", "f"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn second_record_for_a_length_is_rejected() {
        let table = CountTable::new();
        table.record(5, 1).unwrap();

        let err = table.record(5, 7).unwrap_err();
        assert!(matches!(err, FanOutError::DuplicateLength { length: 5 }));
        assert_eq!(table.get(5), Some(1));
    }

    #[test]
    fn snapshot_is_ordered_by_length() {
        let table: CountTable = [(4, 2), (2, 5), (3, 5)].into_iter().collect();
        let snapshot: Vec<_> = table.snapshot().into_iter().collect();
        assert_eq!(snapshot, vec![(2, 5), (3, 5), (4, 2)]);
    }

    #[test]
    fn disjoint_lengths_can_be_counted_from_many_threads() {
        let words = split_words("a bb cc ddd eeee ffff gggg");
        let table = CountTable::new();

        std::thread::scope(|scope| {
            for length in 1..=4 {
                let words = &words;
                let table = &table;
                scope.spawn(move || count_into(length, words, table).unwrap());
            }
        });

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(1), Some(1));
        assert_eq!(table.get(2), Some(2));
        assert_eq!(table.get(3), Some(1));
        assert_eq!(table.get(4), Some(3));
    }
}
