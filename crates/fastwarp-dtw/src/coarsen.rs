//! Halving a sequence's resolution by pairwise averaging.

use crate::sequence::{Sequence, SequenceView};

/// Halve the length of a sequence.
///
/// Element `k` of the result is the elementwise mean of elements `2k` and
/// `2k + 1`. A trailing unpaired element is dropped, so the result has
/// `floor(len / 2)` elements and the same width as the input.
#[must_use]
pub fn reduce_by_half(seq: SequenceView<'_>) -> Sequence {
    let width = seq.width();
    let pairs = seq.len() / 2;
    let mut values = Vec::with_capacity(pairs * width);
    for pair in seq.as_slice().chunks_exact(2 * width) {
        let (first, second) = pair.split_at(width);
        values.extend(first.iter().zip(second).map(|(a, b)| (a + b) / 2.0));
    }
    Sequence::from_raw(values, width)
}
