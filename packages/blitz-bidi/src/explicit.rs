//! Explicit embedding level resolution (X1-X9)
//!
//! Runs the directional status stack over one paragraph, assigning every
//! character an explicit level and override status. Overflowing pushes are
//! counted instead of stacked so that their terminators are ignored without
//! disturbing valid entries.

use arrayvec::ArrayVec;

use crate::paragraph::{first_strong_level, IsolatePairs};
use crate::types::{BidiType, DirectionalStatus, Level, OverrideStatus, MAX_DEPTH};

/// Paragraph entry, up to `MAX_DEPTH` pushed entries, and one spare slot
const STACK_CAPACITY: usize = MAX_DEPTH as usize + 2;

/// Output of the explicit resolver for one paragraph
#[derive(Debug, Clone)]
pub struct ExplicitLevels {
    pub levels: Vec<Level>,
    pub overrides: Vec<OverrideStatus>,
    /// Working types: overrides applied, X9-removed characters set to BN
    pub types: Vec<BidiType>,
    /// Whether any push was refused because of the depth limit
    pub overflowed: bool,
}

/// Bounded directional status stack. The paragraph entry is never popped.
struct StatusStack {
    entries: ArrayVec<DirectionalStatus, STACK_CAPACITY>,
}

impl StatusStack {
    fn new(paragraph_level: Level) -> Self {
        let mut entries = ArrayVec::new();
        entries.push(DirectionalStatus {
            level: paragraph_level,
            override_status: OverrideStatus::Neutral,
            isolate_status: false,
        });
        Self { entries }
    }

    #[inline]
    fn top(&self) -> DirectionalStatus {
        self.entries[self.entries.len() - 1]
    }

    #[inline]
    fn push(&mut self, entry: DirectionalStatus) -> bool {
        self.entries.try_push(entry).is_ok()
    }

    fn pop_embedding(&mut self) {
        if self.entries.len() >= 2 && !self.top().isolate_status {
            self.entries.pop();
        }
    }

    /// Pop every entry down to and including the innermost isolate entry
    fn pop_isolate(&mut self) {
        while self.entries.len() >= 2 && !self.top().isolate_status {
            self.entries.pop();
        }
        if self.entries.len() >= 2 {
            self.entries.pop();
        }
    }
}

/// Resolve explicit levels for one paragraph.
///
/// `types` are the original Bidi_Class values of the paragraph, `pairs` its
/// BD9 isolate pairing.
pub fn resolve_explicit(
    types: &[BidiType],
    pairs: &IsolatePairs,
    paragraph_level: Level,
) -> ExplicitLevels {
    let n = types.len();
    let mut levels = vec![paragraph_level; n];
    let mut overrides = vec![OverrideStatus::Neutral; n];
    let mut working = types.to_vec();
    let mut overflowed = false;

    let mut stack = StatusStack::new(paragraph_level);
    let mut overflow_isolates = 0usize;
    let mut overflow_embeddings = 0usize;
    let mut valid_isolates = 0usize;

    for i in 0..n {
        let top = stack.top();
        let ty = types[i];

        match ty {
            // X2-X5
            BidiType::RLE | BidiType::LRE | BidiType::RLO | BidiType::LRO => {
                levels[i] = top.level;
                overrides[i] = top.override_status;

                let new_level = if matches!(ty, BidiType::RLE | BidiType::RLO) {
                    top.level.next_rtl()
                } else {
                    top.level.next_ltr()
                };
                let override_status = match ty {
                    BidiType::RLO => OverrideStatus::RightToLeft,
                    BidiType::LRO => OverrideStatus::LeftToRight,
                    _ => OverrideStatus::Neutral,
                };

                let pushed = new_level <= MAX_DEPTH
                    && overflow_isolates == 0
                    && overflow_embeddings == 0
                    && stack.push(DirectionalStatus {
                        level: Level::new_unchecked(new_level),
                        override_status,
                        isolate_status: false,
                    });
                if !pushed {
                    if overflow_isolates == 0 {
                        overflow_embeddings += 1;
                    }
                    overflowed = true;
                }
            }

            // X5a-X5c
            BidiType::RLI | BidiType::LRI | BidiType::FSI => {
                levels[i] = top.level;
                overrides[i] = top.override_status;
                if let Some(forced) = top.override_status.forced_type() {
                    working[i] = forced;
                }

                let rtl = match ty {
                    BidiType::RLI => true,
                    BidiType::LRI => false,
                    _ => {
                        let end = pairs.matching_pdi(i).unwrap_or(n);
                        first_strong_level(&types[i + 1..end]) == Some(Level::rtl())
                    }
                };
                let new_level = if rtl {
                    top.level.next_rtl()
                } else {
                    top.level.next_ltr()
                };

                let pushed = new_level <= MAX_DEPTH
                    && overflow_isolates == 0
                    && overflow_embeddings == 0
                    && stack.push(DirectionalStatus {
                        level: Level::new_unchecked(new_level),
                        override_status: OverrideStatus::Neutral,
                        isolate_status: true,
                    });
                if pushed {
                    valid_isolates += 1;
                } else {
                    overflow_isolates += 1;
                    overflowed = true;
                }
            }

            // X6a
            BidiType::PDI => {
                if overflow_isolates > 0 {
                    overflow_isolates -= 1;
                } else if valid_isolates > 0 {
                    overflow_embeddings = 0;
                    stack.pop_isolate();
                    valid_isolates -= 1;
                }

                let top = stack.top();
                levels[i] = top.level;
                overrides[i] = top.override_status;
                if let Some(forced) = top.override_status.forced_type() {
                    working[i] = forced;
                }
            }

            // X7
            BidiType::PDF => {
                levels[i] = top.level;
                overrides[i] = top.override_status;

                if overflow_isolates > 0 {
                    // inside an overflowed isolate: ignored
                } else if overflow_embeddings > 0 {
                    overflow_embeddings -= 1;
                } else {
                    stack.pop_embedding();
                }
            }

            // X8
            BidiType::B => {
                levels[i] = paragraph_level;
            }

            BidiType::BN => {
                levels[i] = top.level;
                overrides[i] = top.override_status;
            }

            // X6
            _ => {
                levels[i] = top.level;
                overrides[i] = top.override_status;
                if let Some(forced) = top.override_status.forced_type() {
                    working[i] = forced;
                }
            }
        }

        // X9
        if ty.is_removed_by_x9() {
            working[i] = BidiType::BN;
        }
    }

    if overflowed {
        log::debug!(
            "directional status stack overflow in paragraph of {} characters at level {}",
            n,
            paragraph_level
        );
    }

    ExplicitLevels {
        levels,
        overrides,
        types: working,
        overflowed,
    }
}
