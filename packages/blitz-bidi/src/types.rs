//! BiDi types and data structures
//!
//! This module contains the core types shared by every stage of the
//! resolver: bidirectional character types, embedding levels, directional
//! status stack entries and the per-character resolution record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BidiError;

/// Maximum explicit embedding depth (UAX #9 BD2 `max_depth`).
pub const MAX_DEPTH: u8 = 125;

/// Bidirectional character type (Bidi_Class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BidiType {
    // Strong
    L,
    R,
    AL,

    // Weak
    EN,
    ES,
    ET,
    AN,
    CS,
    NSM,
    BN,

    // Neutral
    B,
    S,
    WS,
    ON,

    // Explicit formatting
    LRE,
    LRO,
    RLE,
    RLO,
    PDF,
    LRI,
    RLI,
    FSI,
    PDI,
}

impl BidiType {
    /// L, R or AL.
    #[inline]
    pub fn is_strong(self) -> bool {
        matches!(self, BidiType::L | BidiType::R | BidiType::AL)
    }

    #[inline]
    pub fn is_weak(self) -> bool {
        matches!(
            self,
            BidiType::EN
                | BidiType::ES
                | BidiType::ET
                | BidiType::AN
                | BidiType::CS
                | BidiType::NSM
                | BidiType::BN
        )
    }

    #[inline]
    pub fn is_neutral(self) -> bool {
        matches!(self, BidiType::B | BidiType::S | BidiType::WS | BidiType::ON)
    }

    #[inline]
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, BidiType::LRI | BidiType::RLI | BidiType::FSI)
    }

    #[inline]
    pub fn is_isolate_control(self) -> bool {
        self.is_isolate_initiator() || self == BidiType::PDI
    }

    #[inline]
    pub fn is_embedding_initiator(self) -> bool {
        matches!(
            self,
            BidiType::LRE | BidiType::RLE | BidiType::LRO | BidiType::RLO
        )
    }

    /// Explicit formatting characters (embeddings, overrides, isolates and their terminators)
    #[inline]
    pub fn is_explicit(self) -> bool {
        self.is_embedding_initiator() || self.is_isolate_control() || self == BidiType::PDF
    }

    /// Types that rule X9 removes from further processing
    #[inline]
    pub fn is_removed_by_x9(self) -> bool {
        self.is_embedding_initiator() || matches!(self, BidiType::PDF | BidiType::BN)
    }

    /// Neutral or isolate formatting character (the "NI" class of rules N1 and N2)
    #[inline]
    pub fn is_neutral_or_isolate(self) -> bool {
        self.is_neutral() || self.is_isolate_control()
    }

    /// Direction this type counts as for neutral and bracket resolution.
    ///
    /// European and Arabic numbers count as R; everything that is not strong
    /// or a number has no direction.
    #[inline]
    pub fn strong_direction(self) -> Option<BidiType> {
        match self {
            BidiType::L => Some(BidiType::L),
            BidiType::R | BidiType::AL | BidiType::EN | BidiType::AN => Some(BidiType::R),
            _ => None,
        }
    }
}

impl fmt::Display for BidiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Text direction for bidi text processing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Direction {
    #[serde(rename = "ltr")]
    LeftToRight,
    #[serde(rename = "rtl")]
    RightToLeft,
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

impl Direction {
    /// Paragraph level for an explicit direction, `None` for `Auto`
    pub fn level(self) -> Option<Level> {
        match self {
            Direction::LeftToRight => Some(Level::ltr()),
            Direction::RightToLeft => Some(Level::rtl()),
            Direction::Auto => None,
        }
    }
}

impl FromStr for Direction {
    type Err = BidiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Direction::LeftToRight),
            "rtl" => Ok(Direction::RightToLeft),
            "auto" => Ok(Direction::Auto),
            _ => Err(BidiError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::LeftToRight => "ltr",
            Direction::RightToLeft => "rtl",
            Direction::Auto => "auto",
        })
    }
}

/// Embedding level. Even levels are left-to-right, odd levels right-to-left.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Level(u8);

impl Level {
    /// Highest level implicit resolution can produce (`max_depth + 1`)
    pub const MAX: u8 = MAX_DEPTH + 1;

    #[inline]
    pub const fn ltr() -> Self {
        Level(0)
    }

    #[inline]
    pub const fn rtl() -> Self {
        Level(1)
    }

    /// Create a level, rejecting values above [`Level::MAX`]
    pub fn new(number: u8) -> Result<Self, BidiError> {
        if number > Self::MAX {
            return Err(BidiError::InvalidLevel(number));
        }
        Ok(Level(number))
    }

    #[inline]
    pub(crate) const fn new_unchecked(number: u8) -> Self {
        Level(number)
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_rtl(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline]
    pub fn is_ltr(self) -> bool {
        !self.is_rtl()
    }

    pub fn direction(self) -> Direction {
        if self.is_rtl() {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        }
    }

    /// Strong type matching this level's direction (the "embedding direction")
    #[inline]
    pub fn embedding_type(self) -> BidiType {
        if self.is_rtl() {
            BidiType::R
        } else {
            BidiType::L
        }
    }

    /// Least odd level greater than this one
    #[inline]
    pub(crate) fn next_rtl(self) -> u8 {
        (self.0 + 1) | 1
    }

    /// Least even level greater than this one
    #[inline]
    pub(crate) fn next_ltr(self) -> u8 {
        (self.0 + 2) & !1
    }

    #[inline]
    pub(crate) fn raised(self, amount: u8) -> Level {
        Level(self.0 + amount)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Override status of a directional status stack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OverrideStatus {
    #[default]
    Neutral,
    LeftToRight,
    RightToLeft,
}

impl OverrideStatus {
    /// Type forced onto characters under this override, if any
    #[inline]
    pub fn forced_type(self) -> Option<BidiType> {
        match self {
            OverrideStatus::Neutral => None,
            OverrideStatus::LeftToRight => Some(BidiType::L),
            OverrideStatus::RightToLeft => Some(BidiType::R),
        }
    }
}

/// Entry on the directional status stack (X1-X8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalStatus {
    pub level: Level,
    pub override_status: OverrideStatus,
    pub isolate_status: bool,
}

/// Resolution record for one input code point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCharacter {
    pub code_point: u32,
    /// Bidi_Class from the character property tables
    pub original_type: BidiType,
    /// Level assigned by the explicit resolver (X1-X8)
    pub explicit_level: Level,
    pub override_status: OverrideStatus,
    /// Type after weak, bracket and neutral resolution; `BN` for characters removed by X9
    pub resolved_type: BidiType,
    /// Level after implicit resolution and L1
    pub final_level: Level,
    /// Mirrored glyph substituted for display (L4)
    pub mirrored: Option<char>,
}

impl ResolvedCharacter {
    /// Whether rule X9 removed this character from type resolution
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.original_type.is_removed_by_x9()
    }

    /// Character to paint: the mirrored glyph when present, else the code point itself.
    /// Non-scalar code points map to U+FFFD.
    pub fn display_char(&self) -> char {
        self.mirrored
            .or_else(|| char::from_u32(self.code_point))
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Visual run with a single embedding level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualRun {
    /// Logical index of the first character of the run
    pub start_index: usize,
    /// Logical index one past the last character of the run
    pub end_index: usize,
    pub direction: Direction,
    pub level: Level,
    pub visual_order: usize,
}

impl VisualRun {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parity_helpers() {
        assert_eq!(Level::ltr().next_rtl(), 1);
        assert_eq!(Level::ltr().next_ltr(), 2);
        assert_eq!(Level::rtl().next_rtl(), 3);
        assert_eq!(Level::rtl().next_ltr(), 2);
        assert_eq!(Level::new_unchecked(124).next_rtl(), 125);
        assert_eq!(Level::new_unchecked(125).next_ltr(), 126);
        assert!(Level::rtl().is_rtl());
        assert_eq!(Level::new_unchecked(4).embedding_type(), BidiType::L);
    }

    #[test]
    fn level_rejects_values_above_max() {
        assert!(Level::new(126).is_ok());
        assert!(matches!(Level::new(127), Err(BidiError::InvalidLevel(127))));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("RTL".parse::<Direction>().unwrap(), Direction::RightToLeft);
        assert_eq!(" ltr ".parse::<Direction>().unwrap(), Direction::LeftToRight);
        assert_eq!("auto".parse::<Direction>().unwrap(), Direction::Auto);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(BidiError::InvalidDirection(_))
        ));
    }

    #[test]
    fn numbers_count_as_rtl_for_neutrals() {
        assert_eq!(BidiType::EN.strong_direction(), Some(BidiType::R));
        assert_eq!(BidiType::AN.strong_direction(), Some(BidiType::R));
        assert_eq!(BidiType::L.strong_direction(), Some(BidiType::L));
        assert_eq!(BidiType::ON.strong_direction(), None);
    }

    #[test]
    fn x9_removal_classes() {
        for ty in [
            BidiType::LRE,
            BidiType::RLE,
            BidiType::LRO,
            BidiType::RLO,
            BidiType::PDF,
            BidiType::BN,
        ] {
            assert!(ty.is_removed_by_x9());
        }
        assert!(!BidiType::LRI.is_removed_by_x9());
        assert!(!BidiType::PDI.is_removed_by_x9());
    }
}
