//! Level runs and isolating run sequences (BD7, BD13, X10)

use crate::paragraph::IsolatePairs;
use crate::types::{BidiType, Level};

/// Level runs linked across isolate boundaries; the unit of weak and
/// neutral type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatingRunSequence {
    /// Paragraph-relative indices in logical order; characters removed by X9 are not included
    pub indices: Vec<usize>,
    pub level: Level,
    /// Start-of-sequence type, L or R
    pub sos: BidiType,
    /// End-of-sequence type, L or R
    pub eos: BidiType,
}

impl IsolatingRunSequence {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Embedding direction of the sequence, L for even levels and R for odd ones
    #[inline]
    pub fn embedding_type(&self) -> BidiType {
        self.level.embedding_type()
    }
}

/// BD7: maximal runs of equal explicit level over the characters X9 keeps.
///
/// `types` are the original types of the paragraph.
pub fn level_runs(types: &[BidiType], levels: &[Level]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for (i, &ty) in types.iter().enumerate() {
        if ty.is_removed_by_x9() {
            continue;
        }
        if let Some(&last) = current.last() {
            if levels[last] != levels[i] {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(i);
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// X10: group level runs into isolating run sequences and compute sos/eos.
pub fn isolating_run_sequences(
    types: &[BidiType],
    levels: &[Level],
    pairs: &IsolatePairs,
    paragraph_level: Level,
) -> Vec<IsolatingRunSequence> {
    let runs = level_runs(types, levels);

    let mut run_starting_at = vec![None; types.len()];
    for (run_index, run) in runs.iter().enumerate() {
        run_starting_at[run[0]] = Some(run_index);
    }

    // Run that directly continues the run ending with an isolate initiator
    let continuation = |run: &[usize]| -> Option<usize> {
        let last = *run.last()?;
        if !types[last].is_isolate_initiator() {
            return None;
        }
        pairs
            .matching_pdi(last)
            .and_then(|pdi| run_starting_at[pdi])
    };

    let mut is_continuation = vec![false; runs.len()];
    for run in &runs {
        if let Some(next) = continuation(run) {
            is_continuation[next] = true;
        }
    }

    let mut sequences = Vec::new();
    for (run_index, run) in runs.iter().enumerate() {
        if is_continuation[run_index] {
            continue;
        }

        let mut indices = run.clone();
        let mut tail = run_index;
        while let Some(next) = continuation(&runs[tail]) {
            indices.extend_from_slice(&runs[next]);
            tail = next;
        }

        let level = levels[indices[0]];
        let (sos, eos) = sequence_boundaries(&indices, types, levels, level, paragraph_level);
        sequences.push(IsolatingRunSequence {
            indices,
            level,
            sos,
            eos,
        });
    }

    sequences
}

fn sequence_boundaries(
    indices: &[usize],
    types: &[BidiType],
    levels: &[Level],
    level: Level,
    paragraph_level: Level,
) -> (BidiType, BidiType) {
    let first = indices[0];
    let last = indices[indices.len() - 1];

    let before = (0..first)
        .rev()
        .find(|&i| !types[i].is_removed_by_x9())
        .map_or(paragraph_level, |i| levels[i]);

    let after = if types[last].is_isolate_initiator() {
        paragraph_level
    } else {
        (last + 1..types.len())
            .find(|&i| !types[i].is_removed_by_x9())
            .map_or(paragraph_level, |i| levels[i])
    };

    (
        level.max(before).embedding_type(),
        level.max(after).embedding_type(),
    )
}
