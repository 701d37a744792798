pub mod config;
pub mod error;
pub mod filter;
pub mod jobs;
pub mod normalization;
pub mod ranker;
pub mod render;
pub mod semantic;
pub mod session;
pub mod sorter;
pub mod store;
pub mod structures;

pub use config::{AppConfig, KeyStyle, RankingConfig, StoreConfig, TieBreakStrategy};
pub use error::{RankError, StoreError};
pub use session::{RankingOutcome, RankingSession, TierReport};
pub use structures::{ClueRecord, DistanceEntry, TargetSets, Team, TierTable, VocabularyTable};
