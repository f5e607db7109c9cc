//! Line-level reordering (L1, L2) and visual run extraction

use crate::types::{BidiType, Level, VisualRun};

/// L1: reset segment separators, paragraph separators and trailing
/// whitespace of one line to the paragraph level.
///
/// `original` holds the Bidi_Class of each character of the line; `levels`
/// is updated in place. Isolate formatting characters and characters removed
/// by X9 count as whitespace here.
pub fn reset_whitespace(original: &[BidiType], levels: &mut [Level], paragraph_level: Level) {
    debug_assert_eq!(original.len(), levels.len());

    let mut trailing = true;
    for i in (0..original.len()).rev() {
        let ty = original[i];
        if matches!(ty, BidiType::B | BidiType::S) {
            levels[i] = paragraph_level;
            trailing = true;
        } else if ty == BidiType::WS || ty.is_isolate_control() || ty.is_removed_by_x9() {
            if trailing {
                levels[i] = paragraph_level;
            }
        } else {
            trailing = false;
        }
    }
}

/// Level for characters removed by X9 that stay in the display.
///
/// Each takes the level of the character before it, or `paragraph_level`
/// at the start, so it never splits a run of equal levels.
pub fn assign_removed_levels(original: &[BidiType], levels: &mut [Level], paragraph_level: Level) {
    debug_assert_eq!(original.len(), levels.len());

    for i in 0..original.len() {
        if original[i].is_removed_by_x9() {
            levels[i] = if i == 0 { paragraph_level } else { levels[i - 1] };
        }
    }
}

/// L2: visual order of `indices`, given in logical order.
///
/// From the highest level down to the lowest odd level, every maximal run of
/// characters at that level or above is reversed. `levels` is indexed by the
/// values in `indices`.
pub fn visual_order(indices: &[usize], levels: &[Level]) -> Vec<usize> {
    let mut order = indices.to_vec();

    let Some(highest) = order.iter().map(|&i| levels[i]).max() else {
        return order;
    };
    let Some(lowest_odd) = order
        .iter()
        .map(|&i| levels[i])
        .filter(|level| level.is_rtl())
        .min()
    else {
        return order;
    };

    for threshold in (lowest_odd.number()..=highest.number()).rev() {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]].number() < threshold {
                i += 1;
                continue;
            }
            let start = i;
            while i < order.len() && levels[order[i]].number() >= threshold {
                i += 1;
            }
            order[start..i].reverse();
        }
    }

    order
}

/// Group consecutive visual positions of equal level into runs.
///
/// `visual` maps visual position to logical index.
pub fn visual_runs(visual: &[usize], levels: &[Level]) -> Vec<VisualRun> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < visual.len() {
        let level = levels[visual[i]];
        let start = i;
        while i < visual.len() && levels[visual[i]] == level {
            i += 1;
        }

        let span = &visual[start..i];
        let (min, max) = span
            .iter()
            .fold((usize::MAX, 0), |(lo, hi), &idx| (lo.min(idx), hi.max(idx)));
        runs.push(VisualRun {
            start_index: min,
            end_index: max + 1,
            direction: level.direction(),
            level,
            visual_order: runs.len(),
        });
    }

    runs
}
