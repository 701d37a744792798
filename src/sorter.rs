use std::cmp::Ordering;

use crate::config::TieBreakStrategy;
use crate::structures::{ClueRecord, TierTable};

/// Sort key for records within a tier. Lower keys surface first.
pub trait TieBreak: Send + Sync {
    fn key(&self, record: &ClueRecord) -> f32;
}

impl TieBreak for TieBreakStrategy {
    fn key(&self, record: &ClueRecord) -> f32 {
        let distances = &record.distances;
        match self {
            // Single-entry records fall back to their one raw distance
            TieBreakStrategy::Penultimate => match distances.len() {
                0 => f32::INFINITY,
                1 => distances[0].distance,
                n => distances[n - 2].distance,
            },
            TieBreakStrategy::Nearest => distances
                .first()
                .map(|entry| entry.distance)
                .unwrap_or(f32::INFINITY),
            TieBreakStrategy::Sum => distances.iter().map(|entry| entry.distance).sum(),
            TieBreakStrategy::MaxDifferential => -record.frenemy_diff,
        }
    }
}

/// Adapts a plain key function into a [`TieBreak`].
pub struct KeyFn<F>(pub F);

impl<F> TieBreak for KeyFn<F>
where
    F: Fn(&ClueRecord) -> f32 + Send + Sync,
{
    fn key(&self, record: &ClueRecord) -> f32 {
        (self.0)(record)
    }
}

/// Stable sort of every tier by tie-break key, then candidate word, so the
/// result does not depend on which worker produced which record.
pub fn sort_tiers(tiers: &mut TierTable, tie_break: &dyn TieBreak) {
    for tier in tiers.tiers_mut() {
        tier.sort_by(|a, b| compare(a, b, tie_break));
    }
}

fn compare(a: &ClueRecord, b: &ClueRecord, tie_break: &dyn TieBreak) -> Ordering {
    tie_break
        .key(a)
        .total_cmp(&tie_break.key(b))
        .then_with(|| a.word.cmp(&b.word))
}
