//! Padded batch of event sequences

use ndarray::{s, Array3, ArrayView2};

use crate::core::types::{Event, EventSequence, EVENT_DIMS};

/// Sequences packed into a `[batch_size, max_len, 3]` array.
///
/// Shorter sequences are right-padded with zero events; `lengths` keeps the
/// true event count of each sequence so padding can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    data: Array3<f64>,
    lengths: Vec<usize>,
}

impl Batch {
    pub fn from_sequences(sequences: Vec<EventSequence>) -> Self {
        let max_len = sequences.iter().map(Vec::len).max().unwrap_or(0);
        let mut data = Array3::zeros((sequences.len(), max_len, EVENT_DIMS));

        for (b, sequence) in sequences.iter().enumerate() {
            for (i, event) in sequence.iter().enumerate() {
                for (d, value) in event.to_array().into_iter().enumerate() {
                    data[[b, i, d]] = value;
                }
            }
        }

        let lengths = sequences.iter().map(Vec::len).collect();
        Self { data, lengths }
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn into_parts(self) -> (Array3<f64>, Vec<usize>) {
        (self.data, self.lengths)
    }

    pub fn batch_size(&self) -> usize {
        self.lengths.len()
    }

    pub fn max_len(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn total_events(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Unpadded `[len, 3]` view of sequence `index`
    pub fn sequence(&self, index: usize) -> ArrayView2<'_, f64> {
        self.data.slice(s![index, ..self.lengths[index], ..])
    }

    pub fn events(&self, index: usize) -> EventSequence {
        self.sequence(index)
            .rows()
            .into_iter()
            .map(|row| Event::new(row[0], row[1], row[2]))
            .collect()
    }
}
