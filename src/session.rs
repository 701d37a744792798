use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::RankingConfig;
use crate::error::RankError;
use crate::jobs::{self, CancelToken};
use crate::ranker::{Cutoffs, ScanStats};
use crate::sorter::{self, TieBreak};
use crate::structures::{ClueRecord, TargetSets, Team, TierTable, VocabularyTable};

/// Top records for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReport {
    pub covered: usize,
    pub clues: Vec<ClueRecord>,
}

/// Sorted output of one run.
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub tiers: TierTable,
    pub stats: ScanStats,
    pub elapsed: Duration,
}

impl RankingOutcome {
    /// Top `per_tier` records for tiers 1, 2, ... up to the first empty tier.
    pub fn report(&self, per_tier: usize) -> Vec<TierReport> {
        (1..self.tiers.len())
            .map(|covered| (covered, self.tiers.tier(covered)))
            .take_while(|(_, records)| !records.is_empty())
            .map(|(covered, records)| TierReport {
                covered,
                clues: records.iter().take(per_tier).cloned().collect(),
            })
            .collect()
    }
}

/// Entry point for ranking clues against one board.
pub struct RankingSession {
    vocabulary: Arc<VocabularyTable>,
    targets: TargetSets,
    config: RankingConfig,
    tie_break: Box<dyn TieBreak>,
    cancel: CancelToken,
}

impl RankingSession {
    pub fn new(
        vocabulary: Arc<VocabularyTable>,
        targets: TargetSets,
        config: RankingConfig,
    ) -> Result<Self, RankError> {
        config.validate()?;
        if targets.friendly().is_empty() {
            return Err(RankError::EmptyTargetSet);
        }
        let tie_break = Box::new(config.tie_break);
        Ok(Self {
            vocabulary,
            targets,
            config,
            tie_break,
            cancel: CancelToken::new(),
        })
    }

    /// Replace the configured tie-break with a custom one.
    pub fn with_tie_break(mut self, tie_break: impl TieBreak + 'static) -> Self {
        self.tie_break = Box::new(tie_break);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn targets(&self) -> &TargetSets {
        &self.targets
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &VocabularyTable {
        &self.vocabulary
    }

    /// Scan, merge and sort. Fails as a whole; no partial table is returned.
    pub fn run(&self) -> Result<RankingOutcome, RankError> {
        if self.targets.friendly().is_empty() {
            return Err(RankError::EmptyTargetSet);
        }
        let start = Instant::now();
        let candidates = self.vocabulary.candidates();
        let cutoffs = Cutoffs::from(&self.config);
        info!(
            "Ranking {} candidates for {} friendly, {} civilian, {} enemy words",
            candidates.len(),
            self.targets.friendly().len(),
            self.targets.civilian().len(),
            self.targets.enemy().len()
        );

        let merged = jobs::scan_vocabulary(
            &candidates,
            &self.targets,
            &cutoffs,
            self.config.workers,
            &self.cancel,
        )?;

        let mut tiers = merged.tiers;
        sorter::sort_tiers(&mut tiers, self.tie_break.as_ref());
        debug!("Records per tier: {:?}", tiers.counts());

        Ok(RankingOutcome {
            tiers,
            stats: merged.stats,
            elapsed: start.elapsed(),
        })
    }

    /// Drop guessed words from the board. Returns each removed word with the
    /// team it belonged to; words not on the board are ignored.
    pub fn eliminate<S: AsRef<str>>(&mut self, words: &[S]) -> Vec<(String, Team)> {
        let removed: Vec<(String, Team)> = words
            .iter()
            .filter_map(|word| {
                let word = word.as_ref();
                self.targets.remove(word).map(|team| (word.to_string(), team))
            })
            .collect();
        if !removed.is_empty() {
            info!("Eliminated {} words, {} friendly left", removed.len(), self.targets.friendly().len());
        }
        removed
    }
}
