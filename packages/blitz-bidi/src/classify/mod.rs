//! Character type classification
//!
//! Maps code points to their bidirectional character type, mirrored glyph and
//! paired-bracket properties. The data comes from an injected
//! [`CharProperties`] provider; [`UnicodeTables`] is the built-in one, backed by
//! the `unicode-bidi` UCD tables plus the static tables in [`tables`].
//!
//! Providers are immutable once built and shared as `Arc<dyn CharProperties>`,
//! so any number of paragraph workers can read them concurrently.

mod tables;

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_bidi::BidiClass;

use crate::types::BidiType;
use tables::{BRACKET_PAIRS, MIRRORING_GLYPHS};

/// Paired bracket role (Bidi_Paired_Bracket_Type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketKind {
    Open,
    Close,
}

/// Paired bracket property of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bracket {
    pub kind: BracketKind,
    /// The bracket this one pairs with (Bidi_Paired_Bracket)
    pub pair: char,
}

/// Source of the Unicode character properties the resolver consults
pub trait CharProperties: Send + Sync {
    /// Bidi_Class of `code_point`. Must be total: any `u32` gets a type.
    fn bidi_type(&self, code_point: u32) -> BidiType;

    /// Bidi_Mirroring_Glyph of `code_point`, if it has one
    fn mirrored(&self, code_point: u32) -> Option<char>;

    /// Bidi_Paired_Bracket and Bidi_Paired_Bracket_Type of `code_point`
    fn paired_bracket(&self, code_point: u32) -> Option<Bracket>;
}

/// Built-in property tables
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTables;

static CLOSING_BRACKETS: Lazy<AHashMap<char, char>> = Lazy::new(|| {
    BRACKET_PAIRS
        .iter()
        .map(|&(open, close)| (close, open))
        .collect()
});

static DEFAULT_PROPERTIES: Lazy<Arc<dyn CharProperties>> =
    Lazy::new(|| Arc::new(UnicodeTables));

impl CharProperties for UnicodeTables {
    fn bidi_type(&self, code_point: u32) -> BidiType {
        // DerivedBidiClass.txt: unlisted code points default to L
        char::from_u32(code_point)
            .map(|ch| BidiType::from(unicode_bidi::bidi_class(ch)))
            .unwrap_or(BidiType::L)
    }

    fn mirrored(&self, code_point: u32) -> Option<char> {
        let ch = char::from_u32(code_point)?;
        MIRRORING_GLYPHS
            .binary_search_by_key(&ch, |&(from, _)| from)
            .ok()
            .map(|idx| MIRRORING_GLYPHS[idx].1)
    }

    fn paired_bracket(&self, code_point: u32) -> Option<Bracket> {
        let ch = char::from_u32(code_point)?;
        if let Ok(idx) = BRACKET_PAIRS.binary_search_by_key(&ch, |&(open, _)| open) {
            return Some(Bracket {
                kind: BracketKind::Open,
                pair: BRACKET_PAIRS[idx].1,
            });
        }
        CLOSING_BRACKETS.get(&ch).map(|&open| Bracket {
            kind: BracketKind::Close,
            pair: open,
        })
    }
}

/// Process-wide default property provider
pub fn default_properties() -> Arc<dyn CharProperties> {
    Arc::clone(&DEFAULT_PROPERTIES)
}

/// Classify a code point with the built-in tables
#[inline]
pub fn classify(code_point: u32) -> BidiType {
    UnicodeTables.bidi_type(code_point)
}

/// Classify every code point of `text` with `properties`
pub fn classify_all(properties: &dyn CharProperties, text: &[u32]) -> Vec<BidiType> {
    text.iter().map(|&cp| properties.bidi_type(cp)).collect()
}

/// Map brackets to their canonical decomposition so that
/// U+2329/U+232A pair with U+3008/U+3009.
#[inline]
pub(crate) fn canonical_bracket(ch: char) -> char {
    match ch {
        '\u{2329}' => '\u{3008}',
        '\u{232A}' => '\u{3009}',
        _ => ch,
    }
}

impl From<BidiClass> for BidiType {
    fn from(class: BidiClass) -> Self {
        match class {
            BidiClass::L => BidiType::L,
            BidiClass::R => BidiType::R,
            BidiClass::AL => BidiType::AL,
            BidiClass::EN => BidiType::EN,
            BidiClass::ES => BidiType::ES,
            BidiClass::ET => BidiType::ET,
            BidiClass::AN => BidiType::AN,
            BidiClass::CS => BidiType::CS,
            BidiClass::NSM => BidiType::NSM,
            BidiClass::BN => BidiType::BN,
            BidiClass::B => BidiType::B,
            BidiClass::S => BidiType::S,
            BidiClass::WS => BidiType::WS,
            BidiClass::ON => BidiType::ON,
            BidiClass::LRE => BidiType::LRE,
            BidiClass::LRO => BidiType::LRO,
            BidiClass::RLE => BidiType::RLE,
            BidiClass::RLO => BidiType::RLO,
            BidiClass::PDF => BidiType::PDF,
            BidiClass::LRI => BidiType::LRI,
            BidiClass::RLI => BidiType::RLI,
            BidiClass::FSI => BidiType::FSI,
            BidiClass::PDI => BidiType::PDI,
        }
    }
}
