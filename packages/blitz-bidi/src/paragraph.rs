//! Paragraph segmentation and paragraph level detection (P1-P3)
//!
//! Splits text into paragraphs on type B characters, detects the paragraph
//! embedding level from the first strong character, and computes the BD9
//! pairing between isolate initiators and PDIs.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::{BidiType, Direction, Level};

const CARRIAGE_RETURN: u32 = 0x0D;
const LINE_FEED: u32 = 0x0A;

/// How a paragraph's embedding level was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelSource {
    /// Fixed by the caller's base direction
    Explicit,
    /// First strong character outside isolates (P2/P3)
    FirstStrong,
    /// Auto direction without any strong character, LTR
    Default,
}

/// A paragraph of the input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    /// Code point indices of the paragraph, separator included
    pub range: Range<usize>,
    /// Index where the paragraph separator starts (`range.end` when there is none)
    pub content_end: usize,
    pub level: Level,
    pub level_source: LevelSource,
}

impl Paragraph {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn content_range(&self) -> Range<usize> {
        self.range.start..self.content_end
    }

    pub fn separator_range(&self) -> Range<usize> {
        self.content_end..self.range.end
    }

    pub fn has_separator(&self) -> bool {
        self.content_end < self.range.end
    }

    pub fn direction(&self) -> Direction {
        self.level.direction()
    }
}

/// Split `text` into paragraphs and resolve each paragraph's level.
///
/// `types` holds the Bidi_Class of every code point of `text`. Every index of
/// the input belongs to exactly one paragraph.
pub fn segment(text: &[u32], types: &[BidiType], base_direction: Direction) -> Vec<Paragraph> {
    debug_assert_eq!(text.len(), types.len());

    split_paragraphs(text, types)
        .into_iter()
        .enumerate()
        .map(|(index, (range, content_end))| {
            let (level, level_source) = match base_direction.level() {
                Some(level) => (level, LevelSource::Explicit),
                None => match first_strong_level(&types[range.start..content_end]) {
                    Some(level) => (level, LevelSource::FirstStrong),
                    None => (Level::ltr(), LevelSource::Default),
                },
            };
            Paragraph {
                index,
                range,
                content_end,
                level,
                level_source,
            }
        })
        .collect()
}

/// P1: paragraph boundaries as `(range, content_end)` pairs.
///
/// A CR LF pair is a single separator.
pub fn split_paragraphs(text: &[u32], types: &[BidiType]) -> Vec<(Range<usize>, usize)> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < types.len() {
        if types[i] == BidiType::B {
            let content_end = i;
            let mut end = i + 1;
            if text[i] == CARRIAGE_RETURN && text.get(end) == Some(&LINE_FEED) {
                end += 1;
            }
            paragraphs.push((start..end, content_end));
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }

    if start < types.len() {
        paragraphs.push((start..types.len(), types.len()));
    }

    paragraphs
}

/// P2/P3: level implied by the first strong character of `types`.
///
/// Characters between an isolate initiator and its matching PDI (or the end
/// of `types`) are skipped. Returns `None` when no strong character is found.
pub fn first_strong_level(types: &[BidiType]) -> Option<Level> {
    let mut isolate_depth = 0usize;
    for &ty in types {
        match ty {
            BidiType::LRI | BidiType::RLI | BidiType::FSI => isolate_depth += 1,
            BidiType::PDI if isolate_depth > 0 => isolate_depth -= 1,
            BidiType::L if isolate_depth == 0 => return Some(Level::ltr()),
            BidiType::R | BidiType::AL if isolate_depth == 0 => return Some(Level::rtl()),
            BidiType::B => break,
            _ => {}
        }
    }
    None
}

/// BD9 pairing of isolate initiators with PDIs inside one paragraph
#[derive(Debug, Clone, Default)]
pub struct IsolatePairs {
    partner: Vec<Option<usize>>,
}

impl IsolatePairs {
    pub fn new(types: &[BidiType]) -> Self {
        let mut partner = vec![None; types.len()];
        let mut open = Vec::new();

        for (i, &ty) in types.iter().enumerate() {
            match ty {
                BidiType::LRI | BidiType::RLI | BidiType::FSI => open.push(i),
                BidiType::PDI => {
                    if let Some(initiator) = open.pop() {
                        partner[initiator] = Some(i);
                        partner[i] = Some(initiator);
                    }
                }
                _ => {}
            }
        }

        Self { partner }
    }

    fn partner(&self, index: usize) -> Option<usize> {
        self.partner.get(index).copied().flatten()
    }

    /// Matching PDI of the isolate initiator at `index`
    pub fn matching_pdi(&self, index: usize) -> Option<usize> {
        self.partner(index).filter(|&pdi| pdi > index)
    }

    /// Isolate initiator matched by the PDI at `index`
    pub fn matching_initiator(&self, index: usize) -> Option<usize> {
        self.partner(index).filter(|&initiator| initiator < index)
    }
}
