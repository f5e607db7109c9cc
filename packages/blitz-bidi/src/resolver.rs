//! Bidi resolution pipeline and display order output
//!
//! [`BidiResolver`] drives the stages of the algorithm for every paragraph of
//! a text (explicit levels, isolating run sequences, weak, bracket and neutral
//! types, implicit levels, line reordering) and assembles the per-character
//! results into a [`DisplayOrderResult`].
//!
//! Paragraphs share nothing but the character property snapshot, so large
//! texts are split across scoped worker threads and merged back in order.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, ResolutionCache, ResolutionKey};
use crate::classify::{classify_all, default_properties, CharProperties};
use crate::config::BidiConfig;
use crate::error::{BidiError, BidiResult};
use crate::explicit::resolve_explicit;
use crate::implicit::{implicit_level, resolve_implicit};
use crate::neutral::{resolve_neutrals, resolve_paired_brackets};
use crate::paragraph::{segment, IsolatePairs, Paragraph};
use crate::reorder::{assign_removed_levels, reset_whitespace, visual_order, visual_runs};
use crate::sequence::isolating_run_sequences;
use crate::types::{BidiType, Direction, Level, ResolvedCharacter, VisualRun};
use crate::weak::resolve_weak;

/// Resolved levels and display order of a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOrderResult {
    characters: Vec<ResolvedCharacter>,
    paragraphs: Vec<Paragraph>,
    /// Visual position of each logical index, `None` for removed controls
    logical_to_visual: Vec<Option<usize>>,
    visual_to_logical: Vec<usize>,
    remove_explicit_controls: bool,
    reset_trailing_whitespace: bool,
}

impl DisplayOrderResult {
    /// Number of input code points
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn characters(&self) -> &[ResolvedCharacter] {
        &self.characters
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn logical_to_visual(&self) -> &[Option<usize>] {
        &self.logical_to_visual
    }

    pub fn visual_to_logical(&self) -> &[usize] {
        &self.visual_to_logical
    }

    /// Final level of every character in logical order
    pub fn levels(&self) -> Vec<Level> {
        self.characters.iter().map(|c| c.final_level).collect()
    }

    pub fn character(&self, index: usize) -> BidiResult<&ResolvedCharacter> {
        self.characters.get(index).ok_or(BidiError::IndexOutOfRange {
            index,
            len: self.characters.len(),
        })
    }

    pub fn level_at(&self, index: usize) -> BidiResult<Level> {
        self.character(index).map(|c| c.final_level)
    }

    /// Visual position of the character at logical `index`; `Ok(None)` if it
    /// was removed from display
    pub fn visual_index(&self, index: usize) -> BidiResult<Option<usize>> {
        self.character(index)?;
        Ok(self.logical_to_visual[index])
    }

    /// Logical index of the character displayed at visual position `visual`
    pub fn logical_index(&self, visual: usize) -> BidiResult<usize> {
        self.visual_to_logical
            .get(visual)
            .copied()
            .ok_or(BidiError::IndexOutOfRange {
                index: visual,
                len: self.visual_to_logical.len(),
            })
    }

    pub fn is_mirrored(&self, index: usize) -> BidiResult<bool> {
        self.character(index).map(|c| c.mirrored.is_some())
    }

    pub fn display_char(&self, index: usize) -> BidiResult<char> {
        self.character(index).map(ResolvedCharacter::display_char)
    }

    /// Displayed characters in visual order, mirrored glyphs substituted
    pub fn reordered_string(&self) -> String {
        self.visual_to_logical
            .iter()
            .map(|&index| self.characters[index].display_char())
            .collect()
    }

    /// Maximal same-level runs in visual order.
    ///
    /// Runs never cross a paragraph boundary. Each run's index range is the
    /// logical span it covers, which may include controls removed from display.
    pub fn visual_runs(&self) -> Vec<VisualRun> {
        let levels = self.levels();
        let mut runs = Vec::new();
        let mut offset = 0;
        for paragraph in &self.paragraphs {
            let shown = self.visual_to_logical[offset..]
                .iter()
                .take_while(|&&i| paragraph.range.contains(&i))
                .count();
            for mut run in visual_runs(&self.visual_to_logical[offset..offset + shown], &levels) {
                run.visual_order = runs.len();
                runs.push(run);
            }
            offset += shown;
        }
        runs
    }

    pub fn has_rtl(&self) -> bool {
        self.characters.iter().any(|c| c.final_level.is_rtl())
    }

    /// Visual order of one line.
    ///
    /// `line` must be non-empty and lie inside a single paragraph. Trailing whitespace is reset
    /// relative to the end of the line rather than the end of the paragraph.
    /// Returns the logical indices of the line in visual order.
    pub fn reorder_line(&self, line: Range<usize>) -> BidiResult<Vec<usize>> {
        let len = self.characters.len();
        let invalid = BidiError::InvalidLineRange {
            start: line.start,
            end: line.end,
            len,
        };
        if line.is_empty() || line.end > len {
            return Err(invalid);
        }

        let paragraph = self
            .paragraphs
            .iter()
            .find(|p| p.range.start <= line.start && line.end <= p.range.end)
            .ok_or(invalid)?;

        let characters = &self.characters[line.clone()];
        let original: Vec<BidiType> = characters.iter().map(|c| c.original_type).collect();
        let mut levels: Vec<Level> = characters
            .iter()
            .map(|c| implicit_level(c.explicit_level, c.resolved_type))
            .collect();
        if !self.remove_explicit_controls {
            assign_removed_levels(&original, &mut levels, paragraph.level);
        }
        if self.reset_trailing_whitespace {
            reset_whitespace(&original, &mut levels, paragraph.level);
        }

        let kept: Vec<usize> = (0..characters.len())
            .filter(|&i| !(self.remove_explicit_controls && characters[i].is_removed()))
            .collect();

        Ok(visual_order(&kept, &levels)
            .into_iter()
            .map(|i| i + line.start)
            .collect())
    }
}

/// Resolution of a single paragraph, indices relative to the whole text
struct ParagraphOutput {
    characters: Vec<ResolvedCharacter>,
    visual: Vec<usize>,
}

fn resolve_paragraph(
    text: &[u32],
    original: &[BidiType],
    paragraph: &Paragraph,
    properties: &dyn CharProperties,
    config: &BidiConfig,
) -> ParagraphOutput {
    let range = paragraph.range.clone();
    let text = &text[range.clone()];
    let original = &original[range.clone()];
    let level = paragraph.level;

    let pairs = IsolatePairs::new(original);
    let explicit = resolve_explicit(original, &pairs, level);
    let sequences = isolating_run_sequences(original, &explicit.levels, &pairs, level);

    log::trace!(
        "paragraph {} ({}..{}) at level {} ({:?}), {} isolating run sequences",
        paragraph.index,
        range.start,
        range.end,
        level,
        paragraph.level_source,
        sequences.len()
    );

    let mut resolved = explicit.types.clone();
    for sequence in sequences {
        let mut types: Vec<BidiType> = sequence.indices.iter().map(|&i| resolved[i]).collect();
        resolve_weak(&sequence, &mut types);
        resolve_paired_brackets(&sequence, &mut types, text, original, properties);
        resolve_neutrals(&sequence, &mut types);
        for (&i, ty) in sequence.indices.iter().zip(types) {
            resolved[i] = ty;
        }
    }

    let mut levels = resolve_implicit(&explicit.levels, &resolved);
    if !config.remove_explicit_controls {
        assign_removed_levels(original, &mut levels, level);
    }
    if config.reset_trailing_whitespace {
        reset_whitespace(original, &mut levels, level);
    }

    let characters = (0..text.len())
        .map(|i| {
            let final_level = levels[i];
            let mirrored = if config.mirroring && final_level.is_rtl() {
                properties.mirrored(text[i])
            } else {
                None
            };
            ResolvedCharacter {
                code_point: text[i],
                original_type: original[i],
                explicit_level: explicit.levels[i],
                override_status: explicit.overrides[i],
                resolved_type: resolved[i],
                final_level,
                mirrored,
            }
        })
        .collect();

    let kept: Vec<usize> = (0..text.len())
        .filter(|&i| !(config.remove_explicit_controls && original[i].is_removed_by_x9()))
        .collect();
    let visual = visual_order(&kept, &levels)
        .into_iter()
        .map(|i| i + range.start)
        .collect();

    ParagraphOutput { characters, visual }
}

/// Bidi resolver with a swappable character property provider and an
/// optional resolution cache
pub struct BidiResolver {
    config: BidiConfig,
    properties: ArcSwap<Arc<dyn CharProperties>>,
    cache: Option<ResolutionCache>,
}

impl BidiResolver {
    pub fn new(config: BidiConfig) -> Self {
        Self::with_properties(config, default_properties())
    }

    pub fn with_properties(config: BidiConfig, properties: Arc<dyn CharProperties>) -> Self {
        let config = config.validate();
        let cache = NonZeroUsize::new(config.cache_capacity).map(ResolutionCache::new);
        Self {
            config,
            properties: ArcSwap::from_pointee(properties),
            cache,
        }
    }

    pub fn config(&self) -> &BidiConfig {
        &self.config
    }

    /// Current property provider
    pub fn properties(&self) -> Arc<dyn CharProperties> {
        let guard = self.properties.load();
        Arc::clone(&**guard)
    }

    /// Replace the property provider.
    ///
    /// Resolutions already running finish with the provider they started
    /// with. Cached results are dropped.
    pub fn set_properties(&self, properties: Arc<dyn CharProperties>) {
        self.properties.store(Arc::new(properties));
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        log::debug!("character property provider replaced");
    }

    /// Resolve `text` with `base_direction`
    pub fn resolve(&self, text: &[u32], base_direction: Direction) -> DisplayOrderResult {
        Arc::unwrap_or_clone(self.resolve_shared(text, base_direction))
    }

    /// Resolve a string; `None` uses the configured base direction
    pub fn resolve_str(&self, text: &str, base_direction: Option<Direction>) -> DisplayOrderResult {
        let code_points: Vec<u32> = text.chars().map(u32::from).collect();
        self.resolve(
            &code_points,
            base_direction.unwrap_or(self.config.base_direction),
        )
    }

    /// Like [`resolve`](Self::resolve), sharing the result with the cache
    pub fn resolve_shared(&self, text: &[u32], base_direction: Direction) -> Arc<DisplayOrderResult> {
        let Some(cache) = &self.cache else {
            return Arc::new(self.resolve_uncached(text, base_direction));
        };

        let key = ResolutionKey::new(text, base_direction);
        if let Some(hit) = cache.get(&key) {
            log::trace!("resolution cache hit for {} code points", text.len());
            return hit;
        }

        let result = Arc::new(self.resolve_uncached(text, base_direction));
        cache.insert(key, Arc::clone(&result));
        result
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResolutionCache::stats)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    fn resolve_uncached(&self, text: &[u32], base_direction: Direction) -> DisplayOrderResult {
        let snapshot = self.properties.load_full();
        let properties: &dyn CharProperties = &**snapshot;

        let original = classify_all(properties, text);
        let paragraphs = segment(text, &original, base_direction);

        let parallel = self.should_parallelize(paragraphs.len());
        log::debug!(
            "resolving {} code points in {} paragraphs, base direction {}, parallel: {}",
            text.len(),
            paragraphs.len(),
            base_direction,
            parallel
        );

        let outputs = if parallel {
            self.resolve_parallel(text, &original, &paragraphs, properties)
        } else {
            paragraphs
                .iter()
                .map(|p| resolve_paragraph(text, &original, p, properties, &self.config))
                .collect()
        };

        let mut characters = Vec::with_capacity(text.len());
        let mut visual_to_logical = Vec::with_capacity(text.len());
        for output in outputs {
            characters.extend(output.characters);
            visual_to_logical.extend(output.visual);
        }

        let mut logical_to_visual = vec![None; text.len()];
        for (visual, &logical) in visual_to_logical.iter().enumerate() {
            logical_to_visual[logical] = Some(visual);
        }

        DisplayOrderResult {
            characters,
            paragraphs,
            logical_to_visual,
            visual_to_logical,
            remove_explicit_controls: self.config.remove_explicit_controls,
            reset_trailing_whitespace: self.config.reset_trailing_whitespace,
        }
    }

    fn should_parallelize(&self, paragraph_count: usize) -> bool {
        self.config.parallel_threshold > 0 && paragraph_count >= self.config.parallel_threshold
    }

    fn resolve_parallel(
        &self,
        text: &[u32],
        original: &[BidiType],
        paragraphs: &[Paragraph],
        properties: &dyn CharProperties,
    ) -> Vec<ParagraphOutput> {
        let config = &self.config;
        let workers = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(paragraphs.len());

        if workers <= 1 {
            return paragraphs
                .iter()
                .map(|p| resolve_paragraph(text, original, p, properties, config))
                .collect();
        }

        let chunk_size = paragraphs.len().div_ceil(workers);
        log::debug!(
            "resolving {} paragraphs on {} workers",
            paragraphs.len(),
            workers
        );

        let joined = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = paragraphs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move |_| {
                        chunk
                            .iter()
                            .map(|p| resolve_paragraph(text, original, p, properties, config))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut outputs = Vec::with_capacity(paragraphs.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => outputs.extend(chunk),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            outputs
        });

        match joined {
            Ok(outputs) => outputs,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

impl Default for BidiResolver {
    fn default() -> Self {
        Self::new(BidiConfig::default())
    }
}

impl std::fmt::Debug for BidiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BidiResolver")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

static DEFAULT_RESOLVER: Lazy<BidiResolver> = Lazy::new(BidiResolver::default);

/// Resolve `text` with the default configuration and property tables
pub fn resolve(text: &[u32], base_direction: Direction) -> DisplayOrderResult {
    DEFAULT_RESOLVER.resolve(text, base_direction)
}
