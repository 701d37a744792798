use cluemap::config::{KeyStyle, StoreConfig};
use cluemap::{semantic, store};
use cluemap::StoreError;
use std::fs;
use tempfile::tempdir;

fn approx(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn test_glove_text_with_overlay_and_exclusions() {
    let dir = tempdir().unwrap();
    let primary = dir.path().join("primary.txt");
    let overlay = dir.path().join("missing.txt");
    fs::write(&primary, "apple 1 0\nfruit 0 1\nrock -1 0\n").unwrap();
    fs::write(&overlay, "kiwi 0.6 0.8\nfruit 1 0\n").unwrap();

    let config = StoreConfig {
        embeddings: primary.clone(),
        overlay: Some(overlay),
        style: KeyStyle::Plain,
        exclude: vec!["rock".to_string()],
        cache_binary: true,
    };

    let table = store::load(&config).unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.contains("kiwi"));
    assert!(!table.contains("rock"));
    assert!(approx(table.get("fruit").unwrap().as_slice().unwrap(), &[1.0, 0.0]));
    assert!(approx(table.get("kiwi").unwrap().as_slice().unwrap(), &[0.6, 0.8]));

    // Text files are cached as finalfusion binaries on first load
    assert!(dir.path().join("primary.fifu").exists());
    let reloaded = store::load(&config).unwrap();
    assert_eq!(reloaded.len(), 3);
    assert!(approx(reloaded.get("apple").unwrap().as_slice().unwrap(), &[1.0, 0.0]));
}

#[test]
fn test_vectors_keep_their_length() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw.txt");
    fs::write(&path, "apple 3 4\nfruit 0 2\n").unwrap();

    let table = store::load_table(&path, KeyStyle::Plain, true).unwrap();
    assert!(approx(table.get("apple").unwrap().as_slice().unwrap(), &[3.0, 4.0]));
    assert!(approx(table.get("fruit").unwrap().as_slice().unwrap(), &[0.0, 2.0]));
    let distance = semantic::word_distance(&table, "apple", "fruit").unwrap();
    assert!((distance - 13f32.sqrt()).abs() < 1e-4);

    // The binary cache keeps the norms as well
    assert!(dir.path().join("raw.fifu").exists());
    let cached = store::load_table(&path, KeyStyle::Plain, true).unwrap();
    assert!(approx(cached.get("apple").unwrap().as_slice().unwrap(), &[3.0, 4.0]));
}

#[test]
fn test_word2vec_header_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vectors.txt");
    fs::write(&path, "2 3\napple 1 0 0\nfruit 0 0 1\n").unwrap();

    let table = store::load_table(&path, KeyStyle::Plain, false).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("fruit").unwrap().len(), 3);
    assert!(!dir.path().join("vectors.fifu").exists());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let config = StoreConfig {
        embeddings: dir.path().join("absent.txt"),
        cache_binary: false,
        ..StoreConfig::default()
    };
    assert!(matches!(store::load(&config), Err(StoreError::Io { .. })));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cluemap.toml");
    fs::write(
        &path,
        "[ranking]\nworkers = 2\nenemy_cutoff = 0.5\n\n[store]\nstyle = \"spaces\"\n",
    )
    .unwrap();

    let config = cluemap::AppConfig::load(&path).unwrap();
    assert_eq!(config.ranking.workers, 2);
    assert_eq!(config.ranking.enemy_cutoff, 0.5);
    assert_eq!(config.store.style, KeyStyle::Spaces);
    assert!(config.ranking.validate().is_ok());
}
