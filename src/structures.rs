use ahash::RandomState;
use indexmap::IndexMap;
use ndarray::Array1;
use serde::Serialize;

use crate::config::KeyStyle;
use crate::error::RankError;

/// A word's embedding. Immutable once loaded.
pub type WordVector = Array1<f32>;

/// Word -> vector map with deterministic iteration order
pub type WordMap = IndexMap<String, WordVector, RandomState>;

// =============================================================================
// Vocabulary
// =============================================================================

/// Every candidate word known to the session, keyed by stored embedding key.
///
/// The key style maps plain words to keys and back, so the engine can compare
/// display words while the table keeps whatever keys the store produced.
#[derive(Debug, Clone, Default)]
pub struct VocabularyTable {
    style: KeyStyle,
    entries: WordMap,
}

impl VocabularyTable {
    pub fn new(style: KeyStyle) -> Self {
        Self {
            style,
            entries: IndexMap::with_hasher(RandomState::new()),
        }
    }

    /// Build a table from plain words, transforming each through `style`.
    pub fn from_words<I, S>(style: KeyStyle, words: I) -> Self
    where
        I: IntoIterator<Item = (S, WordVector)>,
        S: AsRef<str>,
    {
        let mut table = Self::new(style);
        for (word, vector) in words {
            table.insert_key(style.transform(word.as_ref()), vector);
        }
        table
    }

    pub fn style(&self) -> KeyStyle {
        self.style
    }

    /// Insert under an already-transformed key; returns the replaced vector.
    pub fn insert_key(&mut self, key: String, vector: WordVector) -> Option<WordVector> {
        self.entries.insert(key, vector)
    }

    pub fn remove_key(&mut self, key: &str) -> Option<WordVector> {
        self.entries.shift_remove(key)
    }

    /// Look up a plain word.
    pub fn get(&self, word: &str) -> Option<&WordVector> {
        self.entries.get(&self.style.transform(word))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn display_word<'a>(&self, key: &'a str) -> &'a str {
        self.style.untransform(key)
    }

    /// Candidates as (display word, vector), in table order.
    pub fn candidates(&self) -> Vec<(&str, &WordVector)> {
        self.entries
            .iter()
            .map(|(key, vector)| (self.style.untransform(key), vector))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Consume the table, yielding (stored key, vector) pairs.
    pub fn into_entries(self) -> impl Iterator<Item = (String, WordVector)> {
        self.entries.into_iter()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &WordVector) -> bool,
    {
        self.entries.retain(|key, vector| keep(key, vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Target sets
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Friendly,
    Civilian,
    Enemy,
}

/// The three disjoint word sets on the board.
#[derive(Debug, Clone, Default)]
pub struct TargetSets {
    friendly: WordMap,
    civilian: WordMap,
    enemy: WordMap,
}

impl TargetSets {
    /// Build target sets, rejecting any word assigned to more than one team.
    ///
    /// An empty friendly set is accepted here and rejected when a session runs,
    /// so that eliminating the last friendly word is not itself an error.
    pub fn new(friendly: WordMap, civilian: WordMap, enemy: WordMap) -> Result<Self, RankError> {
        let sets = [&friendly, &civilian, &enemy];
        for (i, set) in sets.iter().enumerate() {
            for word in set.keys() {
                if sets[i + 1..].iter().any(|other| other.contains_key(word)) {
                    return Err(RankError::DuplicateTarget { word: word.clone() });
                }
            }
        }
        Ok(Self { friendly, civilian, enemy })
    }

    /// Resolve plain words to vectors through the vocabulary.
    pub fn resolve<S: AsRef<str>>(
        vocabulary: &VocabularyTable,
        friendly: &[S],
        civilian: &[S],
        enemy: &[S],
    ) -> Result<Self, RankError> {
        let lookup = |words: &[S]| -> Result<WordMap, RankError> {
            let mut map = IndexMap::with_hasher(RandomState::new());
            for word in words {
                let word = word.as_ref();
                let vector = vocabulary
                    .get(word)
                    .ok_or_else(|| RankError::UnknownWord { word: word.to_string() })?;
                if map.insert(word.to_string(), vector.clone()).is_some() {
                    return Err(RankError::DuplicateTarget { word: word.to_string() });
                }
            }
            Ok(map)
        };
        Self::new(lookup(friendly)?, lookup(civilian)?, lookup(enemy)?)
    }

    pub fn friendly(&self) -> &WordMap {
        &self.friendly
    }

    pub fn civilian(&self) -> &WordMap {
        &self.civilian
    }

    pub fn enemy(&self) -> &WordMap {
        &self.enemy
    }

    pub fn team_of(&self, word: &str) -> Option<Team> {
        if self.friendly.contains_key(word) {
            Some(Team::Friendly)
        } else if self.civilian.contains_key(word) {
            Some(Team::Civilian)
        } else if self.enemy.contains_key(word) {
            Some(Team::Enemy)
        } else {
            None
        }
    }

    /// Every target word with its team, friendly first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Team, &WordVector)> {
        tagged(&self.friendly, Team::Friendly)
            .chain(tagged(&self.civilian, Team::Civilian))
            .chain(tagged(&self.enemy, Team::Enemy))
    }

    /// Remove a word from whichever set holds it.
    pub fn remove(&mut self, word: &str) -> Option<Team> {
        if self.friendly.shift_remove(word).is_some() {
            Some(Team::Friendly)
        } else if self.civilian.shift_remove(word).is_some() {
            Some(Team::Civilian)
        } else if self.enemy.shift_remove(word).is_some() {
            Some(Team::Enemy)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.friendly.len() + self.civilian.len() + self.enemy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tagged(set: &WordMap, team: Team) -> impl Iterator<Item = (&str, Team, &WordVector)> {
    set.iter().map(move |(word, vector)| (word.as_str(), team, vector))
}

// =============================================================================
// Clue records
// =============================================================================

/// Distance from one candidate to one target word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceEntry {
    pub target: String,
    pub team: Team,
    pub distance: f32,
}

/// One candidate's claim on a tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClueRecord {
    /// Number of friendly words this clue points to (the tier index)
    pub covered: usize,
    /// Gap between the last two covered distances, or the raw distance at tier 1
    pub frenemy_diff: f32,
    /// Snapshot of the covered prefix, nearest first
    pub distances: Vec<DistanceEntry>,
    pub word: String,
}

/// Clue records grouped by covered count. Index 0 is never populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierTable {
    tiers: Vec<Vec<ClueRecord>>,
}

impl TierTable {
    /// Tiers 0..=friendly_len.
    pub fn new(friendly_len: usize) -> Self {
        Self {
            tiers: vec![Vec::new(); friendly_len + 1],
        }
    }

    pub fn push(&mut self, record: ClueRecord) {
        let tier = record.covered;
        if tier >= self.tiers.len() {
            self.tiers.resize_with(tier + 1, Vec::new);
        }
        self.tiers[tier].push(record);
    }

    /// Concatenate another table onto this one, tier by tier.
    pub fn absorb(&mut self, other: TierTable) {
        if other.tiers.len() > self.tiers.len() {
            self.tiers.resize_with(other.tiers.len(), Vec::new);
        }
        for (tier, records) in other.tiers.into_iter().enumerate() {
            self.tiers[tier].extend(records);
        }
    }

    pub fn tier(&self, covered: usize) -> &[ClueRecord] {
        self.tiers.get(covered).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn tiers_mut(&mut self) -> impl Iterator<Item = &mut Vec<ClueRecord>> {
        self.tiers.iter_mut()
    }

    /// Number of tier slots, including the unused tier 0.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(Vec::is_empty)
    }

    pub fn record_count(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    /// Per-tier record counts from tier 1 upward.
    pub fn counts(&self) -> Vec<usize> {
        self.tiers.iter().skip(1).map(Vec::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn map(words: &[(&str, [f32; 2])]) -> WordMap {
        words
            .iter()
            .map(|(w, v)| (w.to_string(), arr1(v)))
            .collect()
    }

    #[test]
    fn test_duplicate_across_sets_rejected() {
        let result = TargetSets::new(
            map(&[("apple", [0.0, 0.0])]),
            map(&[]),
            map(&[("apple", [0.0, 0.0])]),
        );
        assert!(matches!(result, Err(RankError::DuplicateTarget { word }) if word == "apple"));
    }

    #[test]
    fn test_resolve_unknown_word() {
        let vocab = VocabularyTable::from_words(KeyStyle::Plain, vec![("apple", arr1(&[0.0, 0.0]))]);
        let result = TargetSets::resolve(&vocab, &["apple"], &[], &["pear"]);
        assert!(matches!(result, Err(RankError::UnknownWord { word }) if word == "pear"));
    }

    #[test]
    fn test_resolve_through_key_style() {
        let vocab = VocabularyTable::from_words(
            KeyStyle::Meaning,
            vec![("apple", arr1(&[0.0, 0.0])), ("rock", arr1(&[5.0, 5.0]))],
        );
        let targets = TargetSets::resolve(&vocab, &["apple"], &[], &["rock"]).unwrap();
        assert_eq!(targets.team_of("apple"), Some(Team::Friendly));
        assert_eq!(targets.team_of("rock"), Some(Team::Enemy));
        assert_eq!(vocab.candidates()[0].0, "apple");
    }

    #[test]
    fn test_remove_reports_team() {
        let mut targets = TargetSets::new(
            map(&[("apple", [0.0, 0.0])]),
            map(&[("pipe", [1.0, 0.0])]),
            map(&[("rock", [5.0, 5.0])]),
        )
        .unwrap();
        assert_eq!(targets.remove("rock"), Some(Team::Enemy));
        assert_eq!(targets.remove("rock"), None);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_tier_table_absorb_grows() {
        let record = |covered| ClueRecord {
            covered,
            frenemy_diff: 0.1,
            distances: Vec::new(),
            word: "x".to_string(),
        };
        let mut a = TierTable::new(1);
        a.push(record(1));
        let mut b = TierTable::new(2);
        b.push(record(2));
        b.push(record(1));
        a.absorb(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.counts(), vec![2, 1]);
        assert!(a.tier(0).is_empty());
        assert!(a.tier(9).is_empty());
    }
}
