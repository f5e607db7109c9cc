//! Weak type resolution (W1-W7)
//!
//! Every pass works on the types of one isolating run sequence, in sequence
//! order, and must run in the order given by [`resolve_weak`].

use crate::sequence::IsolatingRunSequence;
use crate::types::BidiType;

/// Apply W1 through W7 to `types`, the working types of `sequence`.
pub fn resolve_weak(sequence: &IsolatingRunSequence, types: &mut [BidiType]) {
    debug_assert_eq!(sequence.len(), types.len());

    resolve_nonspacing_marks(sequence.sos, types);
    resolve_arabic_numbers(sequence.sos, types);
    resolve_arabic_letters(types);
    resolve_single_separators(types);
    resolve_terminators(types);
    resolve_remaining_separators(types);
    resolve_european_numbers(sequence.sos, types);
}

/// W1
fn resolve_nonspacing_marks(sos: BidiType, types: &mut [BidiType]) {
    let mut previous = sos;
    for ty in types.iter_mut() {
        if *ty == BidiType::NSM {
            *ty = if previous.is_isolate_control() {
                BidiType::ON
            } else {
                previous
            };
        }
        previous = *ty;
    }
}

/// W2: EN preceded by AL (through any non-strong types) becomes AN
fn resolve_arabic_numbers(sos: BidiType, types: &mut [BidiType]) {
    let mut last_strong = sos;
    for ty in types.iter_mut() {
        match *ty {
            BidiType::L | BidiType::R | BidiType::AL => last_strong = *ty,
            BidiType::EN if last_strong == BidiType::AL => *ty = BidiType::AN,
            _ => {}
        }
    }
}

/// W3
fn resolve_arabic_letters(types: &mut [BidiType]) {
    for ty in types.iter_mut().filter(|ty| **ty == BidiType::AL) {
        *ty = BidiType::R;
    }
}

/// W4: EN ES EN, EN CS EN and AN CS AN
fn resolve_single_separators(types: &mut [BidiType]) {
    for i in 1..types.len().saturating_sub(1) {
        let (before, after) = (types[i - 1], types[i + 1]);
        if before != after {
            continue;
        }
        match (types[i], before) {
            (BidiType::ES, BidiType::EN)
            | (BidiType::CS, BidiType::EN)
            | (BidiType::CS, BidiType::AN) => types[i] = before,
            _ => {}
        }
    }
}

/// W5: runs of ET adjacent to EN become EN
fn resolve_terminators(types: &mut [BidiType]) {
    let mut i = 0;
    while i < types.len() {
        if types[i] != BidiType::ET {
            i += 1;
            continue;
        }

        let start = i;
        while i < types.len() && types[i] == BidiType::ET {
            i += 1;
        }

        let after_en = start > 0 && types[start - 1] == BidiType::EN;
        let before_en = types.get(i) == Some(&BidiType::EN);
        if after_en || before_en {
            types[start..i].fill(BidiType::EN);
        }
    }
}

/// W6
fn resolve_remaining_separators(types: &mut [BidiType]) {
    for ty in types.iter_mut() {
        if matches!(*ty, BidiType::ES | BidiType::ET | BidiType::CS) {
            *ty = BidiType::ON;
        }
    }
}

/// W7: EN preceded by L (or an L sos) becomes L
fn resolve_european_numbers(sos: BidiType, types: &mut [BidiType]) {
    let mut last_strong = sos;
    for ty in types.iter_mut() {
        match *ty {
            BidiType::L | BidiType::R => last_strong = *ty,
            BidiType::EN if last_strong == BidiType::L => *ty = BidiType::L,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;
    use crate::types::BidiType::*;

    fn resolve(types: &[BidiType], sos: BidiType) -> Vec<BidiType> {
        let sequence = IsolatingRunSequence {
            indices: (0..types.len()).collect(),
            level: if sos == R { Level::rtl() } else { Level::ltr() },
            sos,
            eos: sos,
        };
        let mut types = types.to_vec();
        resolve_weak(&sequence, &mut types);
        types
    }

    #[test]
    fn nsm_follows_previous_type() {
        assert_eq!(resolve(&[NSM, R, NSM], L), vec![L, R, R]);
        assert_eq!(resolve(&[LRI, NSM], R), vec![LRI, ON]);
        assert_eq!(resolve(&[PDI, NSM], L), vec![PDI, ON]);
    }

    #[test]
    fn european_numbers_after_arabic_letters() {
        assert_eq!(resolve(&[AL, EN], L), vec![R, AN]);
        assert_eq!(resolve(&[AL, ON, EN], L), vec![R, ON, AN]);
        assert_eq!(resolve(&[AL, L, EN], R), vec![R, L, L]);
    }

    #[test]
    fn single_separators_between_numbers() {
        assert_eq!(resolve(&[EN, ES, EN], R), vec![EN, EN, EN]);
        assert_eq!(resolve(&[EN, CS, EN], R), vec![EN, EN, EN]);
        assert_eq!(resolve(&[AN, CS, AN], R), vec![AN, AN, AN]);
        assert_eq!(resolve(&[AN, ES, AN], R), vec![AN, ON, AN]);
        assert_eq!(resolve(&[EN, CS, CS, EN], R), vec![EN, ON, ON, EN]);
    }

    #[test]
    fn terminators_join_adjacent_numbers() {
        assert_eq!(resolve(&[ET, ET, EN], R), vec![EN, EN, EN]);
        assert_eq!(resolve(&[EN, ET], R), vec![EN, EN]);
        assert_eq!(resolve(&[AN, ET], R), vec![AN, ON]);
        assert_eq!(resolve(&[AL, ET, EN], L), vec![R, ON, AN]);
    }

    #[test]
    fn numbers_after_l_become_l() {
        assert_eq!(resolve(&[L, ON, EN], R), vec![L, ON, L]);
        assert_eq!(resolve(&[EN], L), vec![L]);
        assert_eq!(resolve(&[R, EN], L), vec![R, EN]);
    }
}
