//! Per-candidate tier construction.
//!
//! For one vocabulary word, the ranker measures the distance to every target
//! word, drops the word outright when an enemy sits inside the enemy cutoff,
//! and otherwise walks the nearest-first distance list emitting one
//! [`ClueRecord`] per run length of close friendly words.

use ndarray::ArrayView1;
use serde::Serialize;

use crate::config::RankingConfig;
use crate::error::RankError;
use crate::filter;
use crate::semantic::euclidean_distance;
use crate::structures::{ClueRecord, DistanceEntry, TargetSets, Team};

/// Distance thresholds applied during the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoffs {
    /// An enemy at or inside this distance disqualifies the candidate.
    pub enemy: f32,
    /// Friendly words beyond this distance are not covered.
    pub friendly: f32,
}

impl From<&RankingConfig> for Cutoffs {
    fn from(config: &RankingConfig) -> Self {
        Self {
            enemy: config.enemy_cutoff,
            friendly: config.friendly_cutoff,
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    /// Equal to, or a sub-string match with, a friendly or enemy word.
    Filtered,
    /// An enemy word lies within the enemy cutoff.
    TooCloseToEnemy,
    /// Records for tiers 1..=n. Empty when the nearest target isn't a close
    /// friendly word.
    Ranked(Vec<ClueRecord>),
}

/// Counters accumulated over a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub scanned: usize,
    pub filtered: usize,
    pub enemy_rejected: usize,
    pub records: usize,
}

impl ScanStats {
    pub fn observe(&mut self, outcome: &CandidateOutcome) {
        self.scanned += 1;
        match outcome {
            CandidateOutcome::Filtered => self.filtered += 1,
            CandidateOutcome::TooCloseToEnemy => self.enemy_rejected += 1,
            CandidateOutcome::Ranked(records) => self.records += records.len(),
        }
    }

    pub fn merge(&mut self, other: &ScanStats) {
        self.scanned += other.scanned;
        self.filtered += other.filtered;
        self.enemy_rejected += other.enemy_rejected;
        self.records += other.records;
    }
}

/// Distances from `vector` to every target, nearest first, ties by word.
pub fn sorted_distances(
    word: &str,
    vector: ArrayView1<f32>,
    targets: &TargetSets,
) -> Result<Vec<DistanceEntry>, RankError> {
    let mut entries = Vec::with_capacity(targets.len());
    for (target, team, target_vector) in targets.iter() {
        let distance = euclidean_distance(target_vector.view(), vector)?;
        if !distance.is_finite() {
            return Err(RankError::MalformedVector {
                word: word.to_string(),
            });
        }
        entries.push(DistanceEntry {
            target: target.to_string(),
            team,
            distance,
        });
    }

    entries.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.target.cmp(&b.target))
    });
    Ok(entries)
}

/// Whether an enemy appears in the list before the enemy cutoff is passed.
fn enemy_within(distances: &[DistanceEntry], cutoff: f32) -> bool {
    distances
        .iter()
        .take_while(|entry| entry.distance <= cutoff)
        .any(|entry| entry.team == Team::Enemy)
}

/// Rank one candidate against the board.
pub fn rank_candidate(
    word: &str,
    vector: ArrayView1<f32>,
    targets: &TargetSets,
    cutoffs: &Cutoffs,
) -> Result<CandidateOutcome, RankError> {
    if filter::is_disqualified(word, targets) {
        return Ok(CandidateOutcome::Filtered);
    }

    let distances = sorted_distances(word, vector, targets)?;
    if enemy_within(&distances, cutoffs.enemy) {
        return Ok(CandidateOutcome::TooCloseToEnemy);
    }

    let mut records = Vec::new();
    let mut prefix: Vec<DistanceEntry> = Vec::new();
    for entry in distances {
        if entry.team != Team::Friendly || entry.distance > cutoffs.friendly {
            break;
        }

        let frenemy_diff = match prefix.last() {
            Some(previous) => entry.distance - previous.distance,
            None => entry.distance,
        };
        let at_cutoff = entry.distance >= cutoffs.friendly;
        prefix.push(entry);

        // Each record owns its own copy of the prefix
        records.push(ClueRecord {
            covered: prefix.len(),
            frenemy_diff,
            distances: prefix.clone(),
            word: word.to_string(),
        });

        if at_cutoff {
            break;
        }
    }

    Ok(CandidateOutcome::Ranked(records))
}
