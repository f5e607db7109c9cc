//! Paired bracket and neutral type resolution (N0-N2)

use arrayvec::ArrayVec;

use crate::classify::{canonical_bracket, BracketKind, CharProperties};
use crate::sequence::IsolatingRunSequence;
use crate::types::BidiType;

/// BD16 opener stack depth
const MAX_BRACKET_DEPTH: usize = 63;

/// Opening and closing positions of a bracket pair, relative to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    pub open: usize,
    pub close: usize,
}

/// BD16: locate bracket pairs in `sequence`, sorted by opener position.
///
/// Only characters whose current type is ON take part. `text` holds the
/// code points of the paragraph the sequence belongs to.
pub fn locate_bracket_pairs(
    sequence: &IsolatingRunSequence,
    types: &[BidiType],
    text: &[u32],
    properties: &dyn CharProperties,
) -> Vec<BracketPair> {
    // (canonical closing bracket expected, opener position)
    let mut openers: ArrayVec<(char, usize), MAX_BRACKET_DEPTH> = ArrayVec::new();
    let mut pairs = Vec::new();

    for (pos, &index) in sequence.indices.iter().enumerate() {
        if types[pos] != BidiType::ON {
            continue;
        }
        let code_point = text[index];
        let Some(bracket) = properties.paired_bracket(code_point) else {
            continue;
        };

        match bracket.kind {
            BracketKind::Open => {
                if openers
                    .try_push((canonical_bracket(bracket.pair), pos))
                    .is_err()
                {
                    log::debug!("bracket pair stack full at sequence position {}", pos);
                    break;
                }
            }
            BracketKind::Close => {
                let Some(closing) = char::from_u32(code_point).map(canonical_bracket) else {
                    continue;
                };
                if let Some(depth) = openers.iter().rposition(|&(expected, _)| expected == closing) {
                    pairs.push(BracketPair {
                        open: openers[depth].1,
                        close: pos,
                    });
                    openers.truncate(depth);
                }
            }
        }
    }

    pairs.sort_unstable_by_key(|pair| pair.open);
    pairs
}

/// N0: resolve paired brackets to a strong direction.
///
/// `original` holds the Bidi_Class of every character of the paragraph; a
/// bracket's new type spreads to the nonspacing marks that originally
/// followed it.
pub fn resolve_paired_brackets(
    sequence: &IsolatingRunSequence,
    types: &mut [BidiType],
    text: &[u32],
    original: &[BidiType],
    properties: &dyn CharProperties,
) {
    let pairs = locate_bracket_pairs(sequence, types, text, properties);
    if pairs.is_empty() {
        return;
    }

    let embedding = sequence.embedding_type();

    for pair in pairs {
        let mut found_embedding = false;
        let mut found_opposite = false;
        for &ty in &types[pair.open + 1..pair.close] {
            match ty.strong_direction() {
                Some(dir) if dir == embedding => {
                    found_embedding = true;
                    break;
                }
                Some(_) => found_opposite = true,
                None => {}
            }
        }

        let resolved = if found_embedding {
            embedding
        } else if found_opposite {
            let context = types[..pair.open]
                .iter()
                .rev()
                .find_map(|ty| ty.strong_direction())
                .unwrap_or(sequence.sos);
            if context != embedding {
                context
            } else {
                embedding
            }
        } else {
            continue;
        };

        for pos in [pair.open, pair.close] {
            types[pos] = resolved;
            for next in pos + 1..types.len() {
                if original[sequence.indices[next]] != BidiType::NSM {
                    break;
                }
                types[next] = resolved;
            }
        }
    }
}

/// N1/N2: resolve runs of neutral and isolate formatting types.
pub fn resolve_neutrals(sequence: &IsolatingRunSequence, types: &mut [BidiType]) {
    let embedding = sequence.embedding_type();
    let mut i = 0;

    while i < types.len() {
        if !types[i].is_neutral_or_isolate() {
            i += 1;
            continue;
        }

        let start = i;
        while i < types.len() && types[i].is_neutral_or_isolate() {
            i += 1;
        }

        let leading = if start == 0 {
            sequence.sos
        } else {
            types[start - 1].strong_direction().unwrap_or(embedding)
        };
        let trailing = if i == types.len() {
            sequence.eos
        } else {
            types[i].strong_direction().unwrap_or(embedding)
        };

        let resolved = if leading == trailing { leading } else { embedding };
        types[start..i].fill(resolved);
    }
}
