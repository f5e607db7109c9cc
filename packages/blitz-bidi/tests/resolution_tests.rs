use std::sync::Arc;
use std::thread;

use blitz_bidi::{
    resolve, BidiConfig, BidiError, BidiResolver, BidiType, Direction, DisplayOrderResult,
    LevelSource, OverrideStatus,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn resolve_str(s: &str, direction: Direction) -> DisplayOrderResult {
    let text: Vec<u32> = s.chars().map(u32::from).collect();
    resolve(&text, direction)
}

fn level_numbers(result: &DisplayOrderResult) -> Vec<u8> {
    result.levels().iter().map(|l| l.number()).collect()
}

#[cfg(test)]
mod resolution_tests {
    use super::*;

    #[test]
    fn test_arabic_letters_turn_digits_into_arabic_numbers() {
        init_logging();
        // alef lam space 1 2 3
        let result = resolve_str("\u{0627}\u{0644} 123", Direction::Auto);
        assert_eq!(result.paragraphs()[0].level_source, LevelSource::FirstStrong);
        assert_eq!(result.characters()[3].resolved_type, BidiType::AN);
        assert_eq!(level_numbers(&result), vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(result.reordered_string(), "123 \u{0644}\u{0627}");
    }

    #[test]
    fn test_currency_and_decimal_separators_join_numbers() {
        init_logging();
        let result = resolve_str("\u{05D0} $12.50", Direction::RightToLeft);
        assert_eq!(level_numbers(&result), vec![1, 1, 2, 2, 2, 2, 2, 2]);
        assert_eq!(result.reordered_string(), "$12.50 \u{05D0}");
    }

    #[test]
    fn test_brackets_resolve_as_a_pair_and_mirror() {
        init_logging();
        let result = resolve_str("\u{05D0} (a b) \u{05D1}", Direction::RightToLeft);
        assert_eq!(result.characters()[2].resolved_type, BidiType::R);
        assert_eq!(result.characters()[6].resolved_type, BidiType::R);
        assert_eq!(result.is_mirrored(2), Ok(true));
        assert_eq!(result.reordered_string(), "\u{05D1} (a b) \u{05D0}");
    }

    #[test]
    fn test_override_reverses_latin_text() {
        init_logging();
        let result = resolve_str("x\u{202E}abc\u{202C}y", Direction::LeftToRight);
        assert_eq!(result.characters()[2].override_status, OverrideStatus::RightToLeft);
        assert_eq!(result.characters()[2].resolved_type, BidiType::R);
        assert_eq!(result.reordered_string(), "xcbay");
    }

    #[test]
    fn test_first_strong_isolate_picks_its_own_direction() {
        init_logging();
        let result = resolve_str("x \u{2068}\u{05D0}\u{05D1}\u{2069} y", Direction::LeftToRight);
        assert_eq!(result.level_at(3), Ok(blitz_bidi::Level::rtl()));
        assert_eq!(result.reordered_string(), "x \u{2068}\u{05D1}\u{05D0}\u{2069} y");
    }

    #[test]
    fn test_unbalanced_controls_degrade_gracefully() {
        init_logging();
        for text in [
            "\u{202C}\u{2069}abc",
            "abc\u{2067}\u{05D0}",
            "\u{202B}\u{202B}\u{2066}",
            "\u{2069}\u{2069}\u{202C}\u{05D0}",
        ] {
            let result = resolve_str(text, Direction::Auto);
            assert_eq!(result.len(), text.chars().count());
            assert!(result.visual_to_logical().len() <= result.len());
        }

        // unmatched initiator runs to the end of the paragraph
        let result = resolve_str("abc\u{2067}\u{05D0}\u{05D1}", Direction::LeftToRight);
        assert_eq!(level_numbers(&result), vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_explicit_base_direction_overrides_first_strong() {
        init_logging();
        let result = resolve_str("abc", Direction::RightToLeft);
        assert_eq!(result.paragraphs()[0].level_source, LevelSource::Explicit);
        assert_eq!(level_numbers(&result), vec![2, 2, 2]);
        assert_eq!(result.reordered_string(), "abc");

        let result = resolve_str("123", Direction::Auto);
        assert_eq!(result.paragraphs()[0].level_source, LevelSource::Default);
    }

    #[test]
    fn test_configured_direction_applies_to_strings() {
        init_logging();
        let config = BidiConfig::from_json_str(r#"{ "base_direction": "rtl" }"#).unwrap();
        let resolver = BidiResolver::new(config);
        let result = resolver.resolve_str("abc!", None);
        assert_eq!(result.paragraphs()[0].level.number(), 1);
        assert_eq!(result.reordered_string(), "!abc");

        let result = resolver.resolve_str("abc!", Some(Direction::LeftToRight));
        assert_eq!(result.reordered_string(), "abc!");
    }

    #[test]
    fn test_direction_strings() {
        assert_eq!("rtl".parse::<Direction>(), Ok(Direction::RightToLeft));
        assert_eq!(Direction::Auto.to_string(), "auto");
        assert_eq!(
            "up".parse::<Direction>(),
            Err(BidiError::InvalidDirection("up".to_string()))
        );
    }

    #[test]
    fn test_lines_break_inside_a_paragraph() {
        init_logging();
        // "abc alef bet gimel" broken after the space
        let result = resolve_str("abc \u{05D0}\u{05D1}\u{05D2}", Direction::LeftToRight);
        assert_eq!(result.reorder_line(0..4), Ok(vec![0, 1, 2, 3]));
        assert_eq!(result.reorder_line(4..7), Ok(vec![6, 5, 4]));
        let (start, end) = (5, 3);
        assert!(matches!(
            result.reorder_line(start..end),
            Err(BidiError::InvalidLineRange { .. })
        ));
    }

    #[test]
    fn test_visual_and_logical_indices_are_inverse() {
        init_logging();
        let result = resolve_str(
            "one \u{05D0}\u{05D1} (2) \u{0627}\u{0661}\u{0662}\ntwo",
            Direction::Auto,
        );
        for (visual, &logical) in result.visual_to_logical().iter().enumerate() {
            assert_eq!(result.visual_index(logical), Ok(Some(visual)));
            assert_eq!(result.logical_index(visual), Ok(logical));
        }
    }

    #[test]
    fn test_shared_resolver_across_threads() {
        init_logging();
        let resolver = Arc::new(BidiResolver::new(
            BidiConfig::default().with_cache_capacity(16),
        ));
        let text: Vec<u32> = "abc \u{05D0}\u{05D1}\u{05D2} 42".chars().map(u32::from).collect();
        let expected = resolver.resolve(&text, Direction::Auto);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let text = text.clone();
                thread::spawn(move || {
                    (0..10)
                        .map(|_| resolver.resolve(&text, Direction::Auto))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for result in handle.join().unwrap() {
                assert_eq!(result, expected);
            }
        }

        let stats = resolver.cache_stats().unwrap();
        assert_eq!(stats.hits + stats.misses, 41);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_many_paragraphs_use_workers() {
        init_logging();
        let text = "\u{05D0}\u{05D1} abc\n".repeat(64);
        let parallel = BidiResolver::new(BidiConfig::default().with_parallel_threshold(2))
            .resolve_str(&text, None);
        let sequential = BidiResolver::new(BidiConfig::default().with_parallel_threshold(0))
            .resolve_str(&text, None);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.paragraphs().len(), 64);
        assert!(parallel.paragraphs().iter().all(|p| p.level.is_rtl()));
    }
}
