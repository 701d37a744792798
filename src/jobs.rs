//! Parallel scan of the vocabulary.
//!
//! The vocabulary is cut into one contiguous partition per worker. Each worker
//! ranks its own slice into a private [`TierTable`]; the tables are concatenated
//! tier by tier once every worker has returned. A single failing partition
//! fails the whole scan.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::RankError;
use crate::ranker::{self, CandidateOutcome, Cutoffs, ScanStats};
use crate::structures::{TargetSets, TierTable, WordVector};

/// Shared flag for stopping a scan early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of scanning one partition, or of merging all of them.
#[derive(Debug, Clone, Default)]
pub struct PartialTiers {
    pub tiers: TierTable,
    pub stats: ScanStats,
}

/// Split `items` into `workers` contiguous slices of `len / workers` items.
/// Any remainder goes to the last slice instead of a short extra one.
pub fn partition<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, items.len());
    let step = items.len() / workers;

    (0..workers)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == workers { items.len() } else { start + step };
            &items[start..end]
        })
        .collect()
}

/// Rank every entry of one partition.
pub fn scan_partition(
    entries: &[(&str, &WordVector)],
    targets: &TargetSets,
    cutoffs: &Cutoffs,
    cancel: &CancelToken,
) -> Result<PartialTiers, RankError> {
    let mut partial = PartialTiers {
        tiers: TierTable::new(targets.friendly().len()),
        stats: ScanStats::default(),
    };

    for (word, vector) in entries {
        if cancel.is_cancelled() {
            return Err(RankError::Cancelled);
        }
        let outcome = ranker::rank_candidate(word, vector.view(), targets, cutoffs)?;
        partial.stats.observe(&outcome);
        if let CandidateOutcome::Ranked(records) = outcome {
            for record in records {
                partial.tiers.push(record);
            }
        }
    }

    Ok(partial)
}

/// Scan the whole vocabulary on a pool of `workers` threads and merge.
pub fn scan_vocabulary(
    entries: &[(&str, &WordVector)],
    targets: &TargetSets,
    cutoffs: &Cutoffs,
    workers: usize,
    cancel: &CancelToken,
) -> Result<PartialTiers, RankError> {
    let partitions = partition(entries, workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(partitions.len().max(1))
        .thread_name(|i| format!("cluemap-worker-{}", i))
        .build()
        .map_err(|e| RankError::WorkerPool(e.to_string()))?;

    info!(
        "Scanning {} candidates across {} partitions",
        entries.len(),
        partitions.len()
    );
    let start = Instant::now();

    let results: Vec<PartialTiers> = pool.install(|| {
        partitions
            .par_iter()
            .enumerate()
            .map(|(index, slice)| -> Result<PartialTiers, RankError> {
                let t = Instant::now();
                let partial = scan_partition(slice, targets, cutoffs, cancel).map_err(|e| match e {
                    RankError::Cancelled => RankError::Cancelled,
                    other => RankError::WorkerFailure {
                        partition: index,
                        source: Box::new(other),
                    },
                })?;
                debug!(
                    "Partition {} ({} entries) produced {} records in {:?}",
                    index,
                    slice.len(),
                    partial.tiers.record_count(),
                    t.elapsed()
                );
                Ok(partial)
            })
            .collect::<Result<Vec<_>, RankError>>()
    })?;

    let mut merged = PartialTiers {
        tiers: TierTable::new(targets.friendly().len()),
        stats: ScanStats::default(),
    };
    for partial in results {
        merged.tiers.absorb(partial.tiers);
        merged.stats.merge(&partial.stats);
    }

    info!(
        "Finished calculating distances in {:.2}s ({} records)",
        start.elapsed().as_secs_f64(),
        merged.stats.records
    );
    Ok(merged)
}
