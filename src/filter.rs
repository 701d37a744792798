use crate::structures::TargetSets;

/// Whether `candidate` is barred from being a clue.
///
/// Friendly and enemy words can't be clues, and neither can any word that
/// contains one of them or is contained in one. Civilian words are never
/// checked.
pub fn is_disqualified(candidate: &str, targets: &TargetSets) -> bool {
    targets
        .friendly()
        .keys()
        .chain(targets.enemy().keys())
        .any(|target| {
            let target = target.as_str();
            target == candidate || target.contains(candidate) || candidate.contains(target)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::WordMap;
    use ndarray::arr1;

    fn targets() -> TargetSets {
        let set = |words: &[&str]| -> WordMap {
            words.iter().map(|w| (w.to_string(), arr1(&[0.0]))).collect()
        };
        TargetSets::new(set(&["apple", "war"]), set(&["pipe"]), set(&["rock"])).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let t = targets();
        assert!(is_disqualified("apple", &t));
        assert!(is_disqualified("rock", &t));
    }

    #[test]
    fn test_substring_both_ways() {
        let t = targets();
        assert!(is_disqualified("app", &t));
        assert!(is_disqualified("warfare", &t));
        assert!(is_disqualified("rocks", &t));
        assert!(is_disqualified("", &t));
    }

    #[test]
    fn test_civilian_words_allowed() {
        let t = targets();
        assert!(!is_disqualified("pipe", &t));
        assert!(!is_disqualified("fruit", &t));
    }
}
