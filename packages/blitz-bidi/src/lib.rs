//! Unicode Bidirectional Algorithm for Blitz
//!
//! This crate resolves mixed left-to-right and right-to-left text into
//! display order following UAX #9:
//! - Paragraph segmentation and base level detection (P1-P3)
//! - Explicit embeddings, overrides and isolates with a bounded status stack (X1-X10)
//! - Weak, bracket-pair and neutral type resolution (W1-W7, N0-N2)
//! - Implicit levels, line reordering and glyph mirroring (I1-I2, L1, L2, L4)
//!
//! ```
//! use blitz_bidi::{resolve, Direction};
//!
//! let text: Vec<u32> = "abc \u{05D0}\u{05D1}".chars().map(u32::from).collect();
//! let result = resolve(&text, Direction::Auto);
//! assert_eq!(result.reordered_string(), "abc \u{05D1}\u{05D0}");
//! ```

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod explicit;
pub mod implicit;
pub mod neutral;
pub mod paragraph;
pub mod reorder;
pub mod resolver;
pub mod sequence;
pub mod types;
pub mod weak;

pub use cache::{CacheStats, ResolutionCache};
pub use classify::{
    classify, default_properties, Bracket, BracketKind, CharProperties, UnicodeTables,
};
pub use config::BidiConfig;
pub use error::{BidiError, BidiResult};
pub use paragraph::{LevelSource, Paragraph};
pub use resolver::{resolve, BidiResolver, DisplayOrderResult};
pub use types::{
    BidiType, Direction, Level, OverrideStatus, ResolvedCharacter, VisualRun, MAX_DEPTH,
};
