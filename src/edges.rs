//! Flat storage of all edge records
//!
//! Edge `i` owns words `i * words_per_edge .. (i + 1) * words_per_edge`. The store
//! keeps the edge count separately so a layout without any registered value
//! (zero words per edge) still knows how many edges it holds.

use crate::ev::EncodedValueLookup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeStore {
    words_per_edge: usize,
    edge_count: usize,
    words: Vec<u32>,
}

impl EdgeStore {
    /// `edge_count` zeroed records
    pub fn new(words_per_edge: usize, edge_count: usize) -> Self {
        Self {
            words_per_edge,
            edge_count,
            words: vec![0; words_per_edge * edge_count],
        }
    }

    /// Store sized for a frozen lookup's record layout
    pub fn for_lookup(lookup: &EncodedValueLookup, edge_count: usize) -> Self {
        Self::new(lookup.words_per_edge(), edge_count)
    }

    /// Rebuild from raw words; `None` if the word count does not match the layout
    pub fn from_words(words_per_edge: usize, edge_count: usize, words: Vec<u32>) -> Option<Self> {
        (words.len() == words_per_edge.checked_mul(edge_count)?).then_some(Self {
            words_per_edge,
            edge_count,
            words,
        })
    }

    pub fn words_per_edge(&self) -> usize {
        self.words_per_edge
    }

    pub fn len(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    pub fn record(&self, edge: usize) -> Option<&[u32]> {
        if edge >= self.edge_count {
            return None;
        }
        let start = edge * self.words_per_edge;
        Some(&self.words[start..start + self.words_per_edge])
    }

    pub fn record_mut(&mut self, edge: usize) -> Option<&mut [u32]> {
        if edge >= self.edge_count {
            return None;
        }
        let start = edge * self.words_per_edge;
        Some(&mut self.words[start..start + self.words_per_edge])
    }

    /// Append a zeroed record and return its edge index
    pub fn push(&mut self) -> usize {
        self.words
            .extend(std::iter::repeat(0).take(self.words_per_edge));
        self.edge_count += 1;
        self.edge_count - 1
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    pub(crate) fn as_words_mut(&mut self) -> &mut [u32] {
        &mut self.words
    }
}
