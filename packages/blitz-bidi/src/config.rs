//! Resolver configuration

use serde::{Deserialize, Serialize};

use crate::error::BidiResult;
use crate::types::Direction;

/// Options used when constructing a [`BidiResolver`](crate::BidiResolver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidiConfig {
    /// Direction used when the caller does not pass one
    pub base_direction: Direction,
    /// Leave characters removed by rule X9 (embedding controls, BN) out of the visual order
    pub remove_explicit_controls: bool,
    /// Substitute mirrored glyphs for characters displayed right-to-left (L4)
    pub mirroring: bool,
    /// Reset trailing whitespace and separators to the paragraph level (L1)
    pub reset_trailing_whitespace: bool,
    /// Paragraph count from which paragraphs are resolved on worker threads, 0 disables
    pub parallel_threshold: usize,
    /// Number of resolved texts kept by the resolution cache, 0 disables caching
    pub cache_capacity: usize,
}

impl Default for BidiConfig {
    fn default() -> Self {
        Self {
            base_direction: Direction::Auto,
            remove_explicit_controls: true,
            mirroring: true,
            reset_trailing_whitespace: true,
            parallel_threshold: 8,
            cache_capacity: 0,
        }
    }
}

impl BidiConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> BidiResult<Self> {
        let config: BidiConfig = serde_json::from_str(json)?;
        Ok(config.validate())
    }

    /// Normalise values the resolver cannot honour as given
    pub fn validate(mut self) -> Self {
        if self.parallel_threshold == 1 {
            log::warn!("parallel_threshold of 1 would spawn a worker per single paragraph, using 2");
            self.parallel_threshold = 2;
        }
        self
    }

    pub fn with_base_direction(mut self, direction: Direction) -> Self {
        self.base_direction = direction;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self.validate()
    }

    /// Keep explicit formatting characters and BN in the visual order
    pub fn retaining_controls(mut self) -> Self {
        self.remove_explicit_controls = false;
        self
    }
}

#[cfg(test)]
impl BidiConfig {
    /// Sequential, uncached configuration for deterministic tests
    pub fn for_testing() -> Self {
        Self {
            parallel_threshold: 0,
            ..Default::default()
        }
    }
}
