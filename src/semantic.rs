use ndarray::ArrayView1;
use rayon::prelude::*;
use tracing::debug;

use crate::error::RankError;
use crate::structures::VocabularyTable;

/// Euclidean (L2) distance between two equal-length vectors.
pub fn euclidean_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> Result<f32, RankError> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let sum_sq: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    Ok(sum_sq.sqrt())
}

/// Distance between two vocabulary words.
pub fn word_distance(vocabulary: &VocabularyTable, a: &str, b: &str) -> Result<f32, RankError> {
    let va = vocabulary
        .get(a)
        .ok_or_else(|| RankError::UnknownWord { word: a.to_string() })?;
    let vb = vocabulary
        .get(b)
        .ok_or_else(|| RankError::UnknownWord { word: b.to_string() })?;
    euclidean_distance(va.view(), vb.view())
}

/// Every vocabulary word with its distance to `word`, nearest first.
/// The word itself is included at distance zero.
fn ranked_neighbors(vocabulary: &VocabularyTable, word: &str) -> Result<Vec<(String, f32)>, RankError> {
    let target = vocabulary
        .get(word)
        .ok_or_else(|| RankError::UnknownWord { word: word.to_string() })?;

    let mut distances: Vec<(String, f32)> = vocabulary
        .candidates()
        .into_par_iter()
        .map(|(candidate, vector)| {
            euclidean_distance(target.view(), vector.view()).map(|d| (candidate.to_string(), d))
        })
        .collect::<Result<_, _>>()?;

    distances.sort_by(|a, b| {
        a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
    });
    debug!("Ranked {} neighbors of '{}'", distances.len(), word);
    Ok(distances)
}

/// The `n` vocabulary entries closest to `word`.
pub fn closest(vocabulary: &VocabularyTable, word: &str, n: usize) -> Result<Vec<(String, f32)>, RankError> {
    let mut ranked = ranked_neighbors(vocabulary, word)?;
    ranked.truncate(n);
    Ok(ranked)
}

/// The `n` vocabulary entries farthest from `word`, farthest last.
pub fn farthest(vocabulary: &VocabularyTable, word: &str, n: usize) -> Result<Vec<(String, f32)>, RankError> {
    let ranked = ranked_neighbors(vocabulary, word)?;
    let skip = ranked.len().saturating_sub(n);
    Ok(ranked.into_iter().skip(skip).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyStyle;
    use ndarray::arr1;

    fn vocab() -> VocabularyTable {
        VocabularyTable::from_words(
            KeyStyle::Plain,
            vec![
                ("apple", arr1(&[0.0, 0.0])),
                ("fruit", arr1(&[0.0, 1.0])),
                ("rock", arr1(&[5.0, 5.0])),
                ("danger", arr1(&[0.0, 0.5])),
            ],
        )
    }

    #[test]
    fn test_euclidean_distance() {
        let a = arr1(&[0.0, 0.0]);
        let b = arr1(&[3.0, 4.0]);
        assert!((euclidean_distance(a.view(), b.view()).unwrap() - 5.0).abs() < 1e-6);
        assert_eq!(euclidean_distance(a.view(), a.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = arr1(&[0.0, 0.0]);
        let b = arr1(&[0.0, 0.0, 1.0]);
        let err = euclidean_distance(a.view(), b.view()).unwrap_err();
        assert!(matches!(err, RankError::DimensionMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_word_distance() {
        let v = vocab();
        assert!((word_distance(&v, "apple", "fruit").unwrap() - 1.0).abs() < 1e-6);
        assert!(word_distance(&v, "apple", "pear").is_err());
    }

    #[test]
    fn test_closest_and_farthest() {
        let v = vocab();
        let near = closest(&v, "apple", 3).unwrap();
        let words: Vec<&str> = near.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["apple", "danger", "fruit"]);

        let far = farthest(&v, "apple", 1).unwrap();
        assert_eq!(far[0].0, "rock");
        assert_eq!(farthest(&v, "apple", 10).unwrap().len(), 4);
    }

    #[test]
    fn test_neighbor_order_ties_and_nan() {
        let v = VocabularyTable::from_words(
            KeyStyle::Plain,
            vec![
                ("broken", arr1(&[f32::NAN, 0.0])),
                ("north", arr1(&[0.0, 1.0])),
                ("origin", arr1(&[0.0, 0.0])),
                ("east", arr1(&[1.0, 0.0])),
            ],
        );
        // Equal distances fall back to the word; NaN sorts after every number
        let near = closest(&v, "origin", 4).unwrap();
        let words: Vec<&str> = near.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["origin", "east", "north", "broken"]);
        assert_eq!(farthest(&v, "origin", 1).unwrap()[0].0, "broken");
    }
}
