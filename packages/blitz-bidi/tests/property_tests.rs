use std::sync::Arc;

use blitz_bidi::{
    BidiConfig, BidiResolver, BidiType, Bracket, CharProperties, Direction, DisplayOrderResult,
    Level, UnicodeTables,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn code_points(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}

fn resolve(s: &str, direction: Direction) -> DisplayOrderResult {
    BidiResolver::default().resolve(&code_points(s), direction)
}

/// Reordered string without isolate formatting characters
fn visible(result: &DisplayOrderResult) -> String {
    result
        .reordered_string()
        .chars()
        .filter(|c| !matches!(c, '\u{2066}'..='\u{2069}'))
        .collect()
}

/// Uppercase ASCII letters are strong right-to-left
struct UppercaseRtl;

impl CharProperties for UppercaseRtl {
    fn bidi_type(&self, code_point: u32) -> BidiType {
        match char::from_u32(code_point) {
            Some('A'..='Z') => BidiType::R,
            _ => UnicodeTables.bidi_type(code_point),
        }
    }

    fn mirrored(&self, code_point: u32) -> Option<char> {
        UnicodeTables.mirrored(code_point)
    }

    fn paired_bracket(&self, code_point: u32) -> Option<Bracket> {
        UnicodeTables.paired_bracket(code_point)
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_pure_ltr_display_order_is_identity() {
        init_logging();
        for text in [
            "hello",
            "12 apples, 3.5 pears!",
            "tab\tseparated words (and brackets)",
            "",
        ] {
            for direction in [Direction::LeftToRight, Direction::Auto] {
                let result = resolve(text, direction);
                let identity: Vec<usize> = (0..result.len()).collect();
                assert_eq!(result.visual_to_logical(), identity.as_slice(), "{text:?}");
                assert_eq!(result.reordered_string(), text);
            }
        }
    }

    #[test]
    fn test_all_rtl_text_is_reversed() {
        init_logging();
        for text in ["\u{05D0}\u{05D1}\u{05D2}\u{05D3}", "\u{05D0}\u{05D1} \u{05D2}\u{05D3}"] {
            let result = resolve(text, Direction::RightToLeft);
            let reversed: Vec<usize> = (0..result.len()).rev().collect();
            assert_eq!(result.visual_to_logical(), reversed.as_slice());
            assert_eq!(result.reordered_string(), text.chars().rev().collect::<String>());
        }
    }

    #[test]
    fn test_deep_nesting_terminates_with_valid_levels() {
        init_logging();
        let mut embeddings = String::new();
        for i in 0..200 {
            embeddings.push(if i % 2 == 0 { '\u{202B}' } else { '\u{202A}' });
            embeddings.push('x');
        }
        embeddings.push_str(&"\u{202C}".repeat(200));

        let mut isolates = "\u{2067}a".repeat(200);
        isolates.push_str(&"\u{2069}".repeat(200));

        let mixed = "\u{202E}\u{2066}\u{202B}\u{2068}".repeat(60) + "\u{05D0}1b";

        for text in [embeddings, isolates, mixed] {
            let result = resolve(&text, Direction::Auto);
            assert_eq!(result.len(), text.chars().count());
            assert!(result.levels().iter().all(|l| l.number() <= Level::MAX));
            assert!(result
                .characters()
                .iter()
                .all(|c| c.explicit_level.number() <= blitz_bidi::MAX_DEPTH));
        }
    }

    #[test]
    fn test_isolate_contents_do_not_affect_surroundings() {
        init_logging();
        let prefix = "\u{05D0} ";
        let suffix = " 12 b";
        let prefix_len = prefix.chars().count();
        let suffix_len = suffix.chars().count();

        let outside = |inner: &str| {
            let text = format!("{prefix}\u{2066}{inner}\u{2069}{suffix}");
            let result = resolve(&text, Direction::LeftToRight);
            let chars = result.characters();
            let mut kept: Vec<(BidiType, Level)> = chars[..prefix_len]
                .iter()
                .map(|c| (c.resolved_type, c.final_level))
                .collect();
            kept.extend(
                chars[chars.len() - suffix_len..]
                    .iter()
                    .map(|c| (c.resolved_type, c.final_level)),
            );
            kept
        };

        let baseline = outside("");
        for inner in ["abc", "\u{05D1}\u{05D2}", "123", "\u{0627}\u{0661}", "(\u{202E}x"] {
            assert_eq!(outside(inner), baseline, "isolate content {inner:?}");
        }
    }

    #[test]
    fn test_numbers_stay_ordered_in_rtl_paragraph() {
        init_logging();
        let result = resolve("page 123 of book", Direction::RightToLeft);
        assert!(result.reordered_string().contains("123"));

        let result = resolve("\u{05E2}\u{05DE}\u{05D5}\u{05D3} 123 \u{05DE}\u{05EA}\u{05D5}\u{05DA}", Direction::RightToLeft);
        let display = result.reordered_string();
        assert!(display.contains("123"), "{display:?}");

        let digits: Vec<usize> = (5..8)
            .map(|i| result.visual_index(i).unwrap().unwrap())
            .collect();
        assert!(digits.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn test_paragraph_segmentation_round_trips() {
        init_logging();
        let text = "first\nsecond\r\nthird\u{2029}\u{05D0}fourth\u{001C}\n\nlast\n";
        let input = code_points(text);
        let result = BidiResolver::default().resolve(&input, Direction::Auto);

        let mut rebuilt = Vec::new();
        let mut expected_start = 0;
        for paragraph in result.paragraphs() {
            assert_eq!(paragraph.range.start, expected_start);
            rebuilt.extend_from_slice(&input[paragraph.range.clone()]);
            expected_start = paragraph.range.end;
        }
        assert_eq!(rebuilt, input);
        assert_eq!(result.paragraphs().len(), 7);
    }

    #[test]
    fn test_rtl_isolate_in_ltr_text() {
        init_logging();
        let resolver =
            BidiResolver::with_properties(BidiConfig::default(), Arc::new(UppercaseRtl));

        let result = resolver.resolve_str("abc\u{2067}DEF\u{2069}ghi", Some(Direction::LeftToRight));
        assert_eq!(visible(&result), "abcFEDghi");

        let result = resolver.resolve_str("abc \u{2067}DEF\u{2069} ghi", Some(Direction::LeftToRight));
        assert_eq!(visible(&result), "abc FED ghi");
        let levels: Vec<u8> = result.levels().iter().map(|l| l.number()).collect();
        assert_eq!(levels, vec![0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0]);
    }
}
