//! Embedding store adapter.
//!
//! Loads word vectors with finalfusion and flattens them into a
//! [`VocabularyTable`]. Three on-disk formats are accepted:
//! - finalfusion binary (`.fifu`)
//! - word2vec-style text with a `<count> <dims>` header line
//! - headerless GloVe text
//!
//! A secondary "missing words" file can be merged over the primary table, and
//! excluded words are removed after the merge.

use finalfusion::compat::text::{ReadText, ReadTextDims};
use finalfusion::io::{ReadEmbeddings, WriteEmbeddings};
use finalfusion::prelude::*;
use finalfusion::storage::{NdArray, Storage};
use finalfusion::vocab::{SimpleVocab, Vocab};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{KeyStyle, StoreConfig};
use crate::error::StoreError;
use crate::structures::VocabularyTable;

type WrappedEmbeddings = Embeddings<VocabWrap, StorageWrap>;

/// Load the primary table, merge the overlay and drop excluded words.
pub fn load(config: &StoreConfig) -> Result<VocabularyTable, StoreError> {
    let start = Instant::now();
    let mut table = load_table(&config.embeddings, config.style, config.cache_binary)?;

    if let Some(overlay_path) = &config.overlay {
        let overlay = load_table(overlay_path, config.style, config.cache_binary)?;
        let replaced = merge_overlay(&mut table, overlay);
        debug!("Overlay {:?} replaced {} existing entries", overlay_path, replaced);
    }

    let removed = remove_excluded(&mut table, &config.exclude);
    if removed > 0 {
        debug!("Removed {} excluded entries", removed);
    }

    info!(
        "Loaded {} word vectors in {:.2}s",
        table.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(table)
}

/// Load a single embeddings file into a table.
pub fn load_table(path: &Path, style: KeyStyle, cache_binary: bool) -> Result<VocabularyTable, StoreError> {
    let embeddings = read_embeddings(path, cache_binary)?;
    let vocab = embeddings.vocab();
    let storage = embeddings.storage();
    // Text readers store unit vectors and keep the original lengths aside
    let norms = embeddings.norms();

    let mut table = VocabularyTable::new(style);
    for (idx, key) in vocab.words().iter().enumerate() {
        let mut vector = storage.embedding(idx).into_owned();
        if let Some(norms) = norms {
            vector *= norms[idx];
        }
        table.insert_key(key.clone(), vector);
    }
    Ok(table)
}

/// Insert every overlay entry into `table`. Returns how many keys were
/// already present (and so replaced).
pub fn merge_overlay(table: &mut VocabularyTable, overlay: VocabularyTable) -> usize {
    overlay
        .into_entries()
        .filter_map(|(key, vector)| table.insert_key(key, vector))
        .count()
}

/// Remove excluded display words and entries whose display word is empty.
/// Returns the number of entries removed.
pub fn remove_excluded(table: &mut VocabularyTable, exclude: &[String]) -> usize {
    let style = table.style();
    let before = table.len();
    table.retain(|key, _| {
        let word = style.untransform(key);
        !word.is_empty() && !exclude.iter().any(|bad| bad.trim() == word)
    });
    before - table.len()
}

fn open(path: &Path) -> Result<File, StoreError> {
    File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn read_embeddings(path: &Path, cache_binary: bool) -> Result<WrappedEmbeddings, StoreError> {
    let is_binary = path
        .extension()
        .map(|ext| ext == "fifu")
        .unwrap_or(false);

    if is_binary {
        debug!("Loading finalfusion embeddings from {:?}", path);
        let mut reader = BufReader::new(open(path)?);
        return WrappedEmbeddings::read_embeddings(&mut reader).map_err(|e| parse_error(path, e));
    }

    // Prefer a cached binary copy when one exists
    let fifu_path = path.with_extension("fifu");
    if fifu_path.exists() {
        debug!("Found cached binary {:?}", fifu_path);
        match open(&fifu_path).and_then(|f| {
            WrappedEmbeddings::read_embeddings(&mut BufReader::new(f))
                .map_err(|e| parse_error(&fifu_path, e))
        }) {
            Ok(embeddings) => return Ok(embeddings),
            Err(e) => warn!("Ignoring unreadable cache: {}", e),
        }
    }

    let embeddings = read_text(path)?;
    if cache_binary {
        write_cache(&embeddings, &fifu_path);
    }
    Ok(embeddings)
}

fn read_text(path: &Path) -> Result<WrappedEmbeddings, StoreError> {
    // word2vec text starts with a "<count> <dims>" header, GloVe goes straight
    // to a word
    let has_header = {
        let mut first = [0u8; 1];
        let mut f = open(path)?;
        match f.read(&mut first) {
            Ok(1) => first[0].is_ascii_digit(),
            Ok(_) => false,
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    };

    let mut reader = BufReader::new(open(path)?);
    if has_header {
        debug!("Loading word2vec text embeddings from {:?}", path);
        let embeddings: Embeddings<SimpleVocab, NdArray> =
            Embeddings::read_text_dims(&mut reader).map_err(|e| parse_error(path, e))?;
        Ok(embeddings.into())
    } else {
        debug!("Loading GloVe text embeddings from {:?}", path);
        let embeddings: Embeddings<SimpleVocab, NdArray> =
            Embeddings::read_text(&mut reader).map_err(|e| parse_error(path, e))?;
        Ok(embeddings.into())
    }
}

fn write_cache(embeddings: &WrappedEmbeddings, fifu_path: &Path) {
    match File::create(fifu_path) {
        Ok(mut out) => {
            if let Err(e) = embeddings.write_embeddings(&mut out) {
                warn!("Failed to save binary embeddings: {}", e);
            } else {
                debug!("Saved binary embeddings to {:?}", fifu_path);
            }
        }
        Err(e) => warn!("Could not create binary file {:?}: {}", fifu_path, e),
    }
}
