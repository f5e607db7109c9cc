//! Implicit embedding levels (I1, I2)

use crate::types::{BidiType, Level};

/// Level of a character at explicit level `level` whose resolved type is `ty`.
#[inline]
pub fn implicit_level(level: Level, ty: BidiType) -> Level {
    if level.is_ltr() {
        match ty {
            BidiType::R => level.raised(1),
            BidiType::EN | BidiType::AN => level.raised(2),
            _ => level,
        }
    } else {
        match ty {
            BidiType::L | BidiType::EN | BidiType::AN => level.raised(1),
            _ => level,
        }
    }
}

/// Apply I1/I2 to a paragraph.
///
/// `resolved` holds the types after neutral resolution; characters removed by
/// X9 (type BN) keep their explicit level.
pub fn resolve_implicit(explicit: &[Level], resolved: &[BidiType]) -> Vec<Level> {
    explicit
        .iter()
        .zip(resolved)
        .map(|(&level, &ty)| implicit_level(level, ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_levels() {
        let level = Level::ltr();
        assert_eq!(implicit_level(level, BidiType::L).number(), 0);
        assert_eq!(implicit_level(level, BidiType::R).number(), 1);
        assert_eq!(implicit_level(level, BidiType::EN).number(), 2);
        assert_eq!(implicit_level(level, BidiType::AN).number(), 2);
    }

    #[test]
    fn odd_levels() {
        let level = Level::rtl();
        assert_eq!(implicit_level(level, BidiType::R).number(), 1);
        assert_eq!(implicit_level(level, BidiType::L).number(), 2);
        assert_eq!(implicit_level(level, BidiType::EN).number(), 2);
        assert_eq!(implicit_level(level, BidiType::AN).number(), 2);
    }

    #[test]
    fn removed_characters_keep_their_level() {
        let levels = resolve_implicit(&[Level::rtl(), Level::ltr()], &[BidiType::BN, BidiType::BN]);
        assert_eq!(levels, vec![Level::rtl(), Level::ltr()]);
    }

    #[test]
    fn deepest_level_reaches_max() {
        let deepest = Level::new(125).unwrap();
        assert_eq!(implicit_level(deepest, BidiType::L).number(), Level::MAX);
        let deepest_even = Level::new(124).unwrap();
        assert_eq!(implicit_level(deepest_even, BidiType::EN).number(), Level::MAX);
    }
}
